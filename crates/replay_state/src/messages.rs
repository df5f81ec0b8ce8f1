use std::collections::VecDeque;

use replay_core::{MessageMode, Position};

/// How long a freshly-coalesced or new message stays visible.
const DEFAULT_LIFETIME_MS: u32 = 5000;
/// Notification-style modes linger a bit longer, like the client does.
const NOTIFICATION_LIFETIME_MS: u32 = 7500;

/// On-map messages from the same author within this window merge into one
/// block instead of stacking a new popup per line.
const MERGE_WINDOW_MS: u32 = 1000;

#[derive(Clone, Debug)]
pub struct Message {
    pub mode: MessageMode,
    pub author_name: String,
    pub author_level: u16,
    pub channel_id: Option<u16>,
    pub position: Option<Position>,
    pub text: String,

    pub start_tick: u32,
    pub expire_tick: u32,
}

fn lifetime(mode: MessageMode) -> u32 {
    match mode {
        MessageMode::Login
        | MessageMode::Warning
        | MessageMode::Game
        | MessageMode::Failure
        | MessageMode::Status
        | MessageMode::Look
        | MessageMode::Loot
        | MessageMode::Hotkey => NOTIFICATION_LIFETIME_MS,
        _ => DEFAULT_LIFETIME_MS,
    }
}

/// Messages in insertion order with per-mode lifetimes.
#[derive(Clone, Default, Debug)]
pub struct MessageList {
    messages: VecDeque<Message>,
}

impl MessageList {
    pub fn iter(&self) -> impl Iterator<Item = &Message> {
        self.messages.iter()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn add(
        &mut self,
        mode: MessageMode,
        author_name: String,
        author_level: u16,
        channel_id: Option<u16>,
        position: Option<Position>,
        text: String,
        current_tick: u32,
    ) {
        if position.is_some() {
            /* Coalesce with a recent on-map message from the same author.
             * The scan is bounded: anything past the merge window cannot
             * match, and the list is in insertion order. */
            for message in self.messages.iter_mut().rev() {
                if message.start_tick + MERGE_WINDOW_MS < current_tick {
                    break;
                }

                if message.position.is_some()
                    && message.mode == mode
                    && message.author_name == author_name
                {
                    message.text.push('\n');
                    message.text.push_str(&text);
                    message.position = position;
                    message.start_tick = current_tick;
                    message.expire_tick = current_tick + lifetime(mode);

                    return;
                }
            }
        }

        let expire_tick = current_tick + lifetime(mode);

        self.messages.push_back(Message {
            mode,
            author_name,
            author_level,
            channel_id,
            position,
            text,
            start_tick: current_tick,
            expire_tick,
        });
    }

    /// Drops everything that has expired by `current_tick`.
    pub fn prune(&mut self, current_tick: u32) {
        self.messages
            .retain(|message| message.expire_tick > current_tick);
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn position() -> Option<Position> {
        Some(Position::new(100, 100, 7))
    }

    #[test]
    fn same_author_coalesces_within_the_window() {
        let mut list = MessageList::default();

        list.add(
            MessageMode::Say,
            "Bubba".into(),
            10,
            None,
            position(),
            "hi".into(),
            1000,
        );
        list.add(
            MessageMode::Say,
            "Bubba".into(),
            10,
            None,
            position(),
            "anyone home?".into(),
            1500,
        );

        assert_eq!(list.len(), 1);
        assert_eq!(list.iter().next().unwrap().text, "hi\nanyone home?");
    }

    #[test]
    fn different_authors_stack() {
        let mut list = MessageList::default();

        list.add(
            MessageMode::Say,
            "Bubba".into(),
            10,
            None,
            position(),
            "hi".into(),
            1000,
        );
        list.add(
            MessageMode::Say,
            "Eclesia".into(),
            10,
            None,
            position(),
            "hi".into(),
            1000,
        );

        assert_eq!(list.len(), 2);
    }

    #[test]
    fn stale_messages_do_not_merge() {
        let mut list = MessageList::default();

        list.add(
            MessageMode::Say,
            "Bubba".into(),
            10,
            None,
            position(),
            "hi".into(),
            1000,
        );
        list.add(
            MessageMode::Say,
            "Bubba".into(),
            10,
            None,
            position(),
            "again".into(),
            5000,
        );

        assert_eq!(list.len(), 2);
    }

    #[test]
    fn pruning_respects_per_mode_lifetimes() {
        let mut list = MessageList::default();

        list.add(
            MessageMode::Say,
            "Bubba".into(),
            10,
            None,
            position(),
            "hi".into(),
            0,
        );
        list.add(
            MessageMode::Warning,
            String::new(),
            0,
            None,
            None,
            "Server is saving game".into(),
            0,
        );

        list.prune(6000);
        assert_eq!(list.len(), 1);
        assert_eq!(list.iter().next().unwrap().mode, MessageMode::Warning);

        list.prune(8000);
        assert!(list.is_empty());
    }
}
