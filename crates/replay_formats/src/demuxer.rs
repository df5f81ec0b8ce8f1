use byteorder::{ByteOrder, LittleEndian};
use bytes::Bytes;
use replay_core::{ensure_data, DataReader, Error, Result};

/// The demuxer's reassembly buffer; payloads larger than this fail the
/// recording.
pub const DEMUXER_BUFFER_SIZE: usize = 128 << 10;

/// A reassembled protocol payload with the timestamp of the container frame
/// whose bytes completed its header.
#[derive(Clone, Debug)]
pub struct Packet {
    pub timestamp: u32,
    pub payload: Bytes,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum State {
    Header,
    Payload,
}

/// Recovers length-prefixed payload records from arbitrarily-chopped input.
///
/// Containers hand the demuxer whatever byte ranges they stored; payload
/// boundaries rarely coincide with container frames. The machine alternates
/// between collecting a 2- or 4-byte little-endian length header and the
/// payload it announces, emitting a [`Packet`] per completed payload.
pub struct Demuxer {
    header_size: usize,
    state: State,

    remaining: usize,
    used: usize,
    buffer: Box<[u8]>,

    timestamp: u32,
    packets: Vec<Packet>,
}

impl Demuxer {
    pub fn new(header_size: usize) -> Self {
        assert!(header_size == 2 || header_size == 4);

        Self {
            header_size,
            state: State::Header,
            remaining: header_size,
            used: 0,
            buffer: vec![0u8; DEMUXER_BUFFER_SIZE].into_boxed_slice(),
            timestamp: 0,
            packets: Vec::new(),
        }
    }

    /// Drains `reader`, attributing any payload whose header completes
    /// during this call to `timestamp`.
    pub fn submit(&mut self, timestamp: u32, reader: &mut DataReader<'_>) -> Result<()> {
        loop {
            if self.remaining == 0 {
                match self.state {
                    State::Header => {
                        let header = &self.buffer[..self.header_size];
                        let length = if self.header_size == 2 {
                            usize::from(LittleEndian::read_u16(header))
                        } else {
                            LittleEndian::read_u32(header) as usize
                        };

                        ensure_data!(
                            length <= DEMUXER_BUFFER_SIZE,
                            "payload of {length} bytes exceeds the demuxer buffer"
                        );

                        self.state = State::Payload;
                        self.remaining = length;
                        self.used = 0;
                        self.timestamp = timestamp;
                    }
                    State::Payload => {
                        self.packets.push(Packet {
                            timestamp: self.timestamp,
                            payload: Bytes::copy_from_slice(&self.buffer[..self.used]),
                        });

                        self.state = State::Header;
                        self.remaining = self.header_size;
                        self.used = 0;
                    }
                }

                continue;
            }

            if reader.is_empty() {
                return Ok(());
            }

            let count = reader.remaining().min(self.remaining);
            reader.copy_to(&mut self.buffer[self.used..self.used + count])?;

            self.remaining -= count;
            self.used += count;
        }
    }

    /// Ends the stream. Succeeds only when the machine sits at a clean
    /// packet boundary with at least one packet recovered, returning the
    /// packets and the last attributed timestamp as the runtime.
    pub fn finish(self) -> Result<(Vec<Packet>, u32)> {
        if self.state == State::Header
            && self.remaining == self.header_size
            && self.used == 0
            && !self.packets.is_empty()
        {
            let runtime = self.timestamp;
            Ok((self.packets, runtime))
        } else {
            Err(Error::invalid_data("container ended mid-payload"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn submit(demuxer: &mut Demuxer, timestamp: u32, bytes: &[u8]) {
        demuxer
            .submit(timestamp, &mut DataReader::new(bytes))
            .unwrap();
    }

    #[test]
    fn reassembles_across_arbitrary_chops() {
        let mut stream = Vec::new();
        stream.extend_from_slice(&3u16.to_le_bytes());
        stream.extend_from_slice(&[0xA, 0xB, 0xC]);
        stream.extend_from_slice(&1u16.to_le_bytes());
        stream.push(0xD);

        let mut demuxer = Demuxer::new(2);

        /* One byte at a time, with advancing timestamps. */
        for (index, byte) in stream.iter().enumerate() {
            submit(&mut demuxer, index as u32 * 100, &[*byte]);
        }

        let (packets, runtime) = demuxer.finish().unwrap();

        assert_eq!(packets.len(), 2);
        assert_eq!(packets[0].payload.as_ref(), &[0xA, 0xB, 0xC]);
        assert_eq!(packets[1].payload.as_ref(), &[0xD]);

        /* Headers completed at bytes 1 and 6. */
        assert_eq!(packets[0].timestamp, 100);
        assert_eq!(packets[1].timestamp, 600);
        assert_eq!(runtime, 600);
    }

    #[test]
    fn oversized_payloads_are_rejected() {
        let mut demuxer = Demuxer::new(4);
        let header = ((DEMUXER_BUFFER_SIZE + 1) as u32).to_le_bytes();

        assert!(demuxer.submit(0, &mut DataReader::new(&header)).is_err());
    }

    #[test]
    fn truncated_streams_fail_finish() {
        let mut demuxer = Demuxer::new(2);
        submit(&mut demuxer, 0, &[5, 0, 1, 2]);

        assert!(demuxer.finish().is_err());
    }

    #[test]
    fn empty_payloads_are_emitted() {
        let mut demuxer = Demuxer::new(2);
        submit(&mut demuxer, 42, &[0, 0]);

        let (packets, runtime) = demuxer.finish().unwrap();
        assert_eq!(packets.len(), 1);
        assert!(packets[0].payload.is_empty());
        assert_eq!(runtime, 42);
    }
}
