//! Clock-driven playback over a decoded recording: linear catch-up, speed
//! scaling, and seeks. Backward seeks rewind the game state and re-apply
//! frames from the start; there are no snapshots.

use replay_state::GameState;

use crate::{Recording, Version};

/// The shell's clock. Milliseconds from an arbitrary epoch; only
/// differences matter.
pub trait PlaybackClock {
    fn tell_ms(&self) -> u32;
}

/// Sink for rendered frames, implemented by the media encoder. The core
/// never calls it; the rendering shell does, once per output frame.
pub trait FrameSink {
    /// `pixels` is RGBA rows of `width` pixels at `stride` bytes apart;
    /// `pts` is the presentation timestamp in milliseconds.
    fn accept(&mut self, pixels: &[u8], stride: usize, width: usize, height: usize, pts: u32);
}

/// Replays a recording against a game state under an external clock.
pub struct Playback<'a> {
    recording: Recording,
    state: GameState<'a>,

    needle: usize,

    /// Playback position when the speed last changed, and the wall-clock
    /// anchor it maps to.
    base_tick: u32,
    anchor_ms: u32,
    scale: f64,
}

impl<'a> Playback<'a> {
    pub fn new(version: &'a Version, recording: Recording, clock: &impl PlaybackClock) -> Self {
        Self {
            recording,
            state: GameState::new(&version.profile, &version.catalogue),
            needle: 0,
            base_tick: 0,
            anchor_ms: clock.tell_ms(),
            scale: 1.0,
        }
    }

    pub fn state(&self) -> &GameState<'a> {
        &self.state
    }

    pub fn recording(&self) -> &Recording {
        &self.recording
    }

    pub fn speed(&self) -> f64 {
        self.scale
    }

    pub fn is_finished(&self) -> bool {
        self.needle >= self.recording.frames.len()
    }

    /// The playback tick the clock maps to, clamped to the recording's
    /// runtime.
    pub fn playback_tick(&self, clock: &impl PlaybackClock) -> u32 {
        let elapsed = f64::from(clock.tell_ms().wrapping_sub(self.anchor_ms));
        let tick = self.base_tick as f64 + elapsed * self.scale;

        (tick as u32).min(self.recording.runtime)
    }

    /// Applies every frame that is due at the clock's current tick, then
    /// advances the game state's notion of time.
    pub fn process_packets(&mut self, clock: &impl PlaybackClock) {
        let tick = self.playback_tick(clock);
        self.catch_up(tick);
    }

    fn catch_up(&mut self, tick: u32) {
        while let Some(frame) = self.recording.frames.get(self.needle) {
            if frame.timestamp > tick {
                break;
            }

            for event in &frame.events {
                self.state.apply(event);
            }

            self.needle += 1;
        }

        self.state.advance_to(tick);
    }

    /// Pauses at the current position or resumes at normal speed.
    pub fn toggle(&mut self, clock: &impl PlaybackClock) {
        if self.scale > 0.0 {
            self.set_speed(0.0, clock);
        } else {
            self.set_speed(1.0, clock);
        }
    }

    pub fn set_speed(&mut self, speed: f64, clock: &impl PlaybackClock) {
        self.base_tick = self.playback_tick(clock);
        self.anchor_ms = clock.tell_ms();
        self.scale = speed;
    }

    /// Seeks by a signed offset. Forward seeks just advance the clock
    /// mapping; the next catch-up replays the skipped frames. Backward
    /// seeks rewind to the start, fast-forward until the world is
    /// initialized, and then replay up to the target tick.
    pub fn skip(&mut self, by: i32, clock: &impl PlaybackClock) {
        self.base_tick = self.playback_tick(clock);
        self.anchor_ms = clock.tell_ms();

        if by < 0 {
            self.needle = 0;
            self.state.reset();

            /* The map is unusable until the player creature is known. */
            while !self.state.is_initialized() {
                let Some(frame) = self.recording.frames.get(self.needle) else {
                    break;
                };

                for event in &frame.events {
                    self.state.apply(event);
                }

                self.needle += 1;
            }

            self.base_tick = self.base_tick.saturating_sub(by.unsigned_abs());
            self.catch_up(self.base_tick);
        } else {
            self.base_tick = self
                .base_tick
                .saturating_add(by.unsigned_abs())
                .min(self.recording.runtime);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use replay_core::{VersionProfile, VersionTriplet};
    use replay_protocol::Event;

    use super::*;
    use crate::Frame;

    struct TestClock(Cell<u32>);

    impl PlaybackClock for TestClock {
        fn tell_ms(&self) -> u32 {
            self.0.get()
        }
    }

    fn version() -> Version {
        let profile = VersionProfile::new(VersionTriplet::new(8, 55, 0)).unwrap();
        let catalogue = replay_assets::testing::small_catalogue(&profile);

        Version { profile, catalogue }
    }

    fn recording() -> Recording {
        let light = |intensity| Event::AmbientLightChanged {
            intensity,
            color: 215,
        };

        Recording {
            runtime: 3000,
            frames: vec![
                Frame {
                    timestamp: 0,
                    events: vec![light(10)],
                },
                Frame {
                    timestamp: 1000,
                    events: vec![light(20)],
                },
                Frame {
                    timestamp: 2000,
                    events: vec![light(30)],
                },
            ],
        }
    }

    #[test]
    fn frames_apply_in_timestamp_order() {
        let version = version();
        let clock = TestClock(Cell::new(0));
        let mut playback = Playback::new(&version, recording(), &clock);

        playback.process_packets(&clock);
        assert_eq!(playback.state().map.light_intensity, 10);

        clock.0.set(1500);
        playback.process_packets(&clock);
        assert_eq!(playback.state().map.light_intensity, 20);
        assert_eq!(playback.state().current_tick, 1500);

        clock.0.set(2500);
        playback.process_packets(&clock);
        assert_eq!(playback.state().map.light_intensity, 30);
    }

    #[test]
    fn paused_playback_stands_still() {
        let version = version();
        let clock = TestClock(Cell::new(0));
        let mut playback = Playback::new(&version, recording(), &clock);

        playback.process_packets(&clock);
        playback.toggle(&clock);

        clock.0.set(5000);
        playback.process_packets(&clock);
        assert_eq!(playback.state().map.light_intensity, 10);

        playback.toggle(&clock);
        clock.0.set(6000);
        playback.process_packets(&clock);
        assert_eq!(playback.state().map.light_intensity, 20);
    }

    #[test]
    fn ticks_clamp_to_the_runtime() {
        let version = version();
        let clock = TestClock(Cell::new(60_000));
        let mut playback = Playback::new(&version, recording(), &clock);

        /* Anchored at 60s; jumping far past the runtime clamps. */
        clock.0.set(120_000);
        playback.process_packets(&clock);

        assert_eq!(playback.state().current_tick, 3000);
        assert!(playback.is_finished());
    }

    #[test]
    fn backward_seeks_replay_from_the_start() {
        let version = version();
        let clock = TestClock(Cell::new(0));
        let mut playback = Playback::new(&version, recording(), &clock);

        clock.0.set(2500);
        playback.process_packets(&clock);
        assert_eq!(playback.state().map.light_intensity, 30);

        playback.skip(-2000, &clock);
        assert_eq!(playback.state().current_tick, 500);
        assert_eq!(playback.state().map.light_intensity, 10);
    }
}
