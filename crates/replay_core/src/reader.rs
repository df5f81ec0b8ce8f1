use std::fmt::Display;

use byteorder::{ByteOrder, LittleEndian};

use crate::{Error, Result};

mod sealed {
    pub trait Sealed {}
}

/// Fixed-width little-endian integers the [`DataReader`] knows how to decode.
pub trait WireInt: Copy + PartialOrd + Display + sealed::Sealed {
    const SIZE: usize;

    fn get_le(buf: &[u8]) -> Self;
}

macro_rules! impl_wire_int {
    ($($ty:ty => $get:expr),* $(,)?) => {
        $(
            impl sealed::Sealed for $ty {}

            impl WireInt for $ty {
                const SIZE: usize = std::mem::size_of::<$ty>();

                #[allow(clippy::redundant_closure_call)]
                fn get_le(buf: &[u8]) -> Self {
                    ($get)(buf)
                }
            }
        )*
    };
}

impl_wire_int! {
    u8 => |buf: &[u8]| buf[0],
    i8 => |buf: &[u8]| buf[0] as i8,
    u16 => LittleEndian::read_u16,
    i16 => LittleEndian::read_i16,
    u32 => LittleEndian::read_u32,
    i32 => LittleEndian::read_i32,
    u64 => LittleEndian::read_u64,
    i64 => LittleEndian::read_i64,
}

/// Wire enums occupy a single byte with an inclusive `[FIRST, LAST]` range;
/// values outside the range are protocol violations.
pub trait WireEnum: Copy + Sized {
    const FIRST: u8;
    const LAST: u8;

    fn from_wire(raw: u8) -> Option<Self>;
}

/// Defines a `#[repr(u8)]` enum readable straight off the wire.
#[macro_export]
macro_rules! wire_enum {
    (
        $(#[$attrs:meta])*
        $vis:vis enum $name:ident {
            $($variant:ident = $value:literal),* $(,)?
        }
    ) => {
        $(#[$attrs])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
        #[repr(u8)]
        $vis enum $name {
            $($variant = $value),*
        }

        impl $crate::WireEnum for $name {
            const FIRST: u8 = {
                let values = [$($value),*];
                let mut min = values[0];
                let mut i = 1;
                while i < values.len() {
                    if values[i] < min {
                        min = values[i];
                    }
                    i += 1;
                }
                min
            };
            const LAST: u8 = {
                let values = [$($value),*];
                let mut max = values[0];
                let mut i = 1;
                while i < values.len() {
                    if values[i] > max {
                        max = values[i];
                    }
                    i += 1;
                }
                max
            };

            fn from_wire(raw: u8) -> Option<Self> {
                match raw {
                    $($value => Some($name::$variant),)*
                    _ => None,
                }
            }
        }
    };
}

/// A bounded little-endian cursor over a borrowed byte slice.
///
/// All reads are checked: running off the end of the slice or failing a range
/// predicate raises [`Error::InvalidData`] and leaves the cursor untouched.
#[derive(Clone, Copy, Debug)]
pub struct DataReader<'a> {
    data: &'a [u8],
    position: usize,
}

impl<'a> DataReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, position: 0 }
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.position
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn tell(&self) -> usize {
        self.position
    }

    /// The bytes not yet consumed.
    pub fn raw(&self) -> &'a [u8] {
        &self.data[self.position..]
    }

    /// A new reader over the same backing slice, positioned at `to`.
    pub fn seek(&self, to: usize) -> Result<DataReader<'a>> {
        ensure_remaining(to <= self.data.len(), "seek")?;

        Ok(DataReader {
            data: self.data,
            position: to,
        })
    }

    pub fn skip(&mut self, count: usize) -> Result<()> {
        ensure_remaining(count <= self.remaining(), "skip")?;
        self.position += count;

        Ok(())
    }

    /// Consumes `count` bytes, returning a sub-reader over exactly those
    /// bytes with its own cursor starting at 0.
    pub fn slice(&mut self, count: usize) -> Result<DataReader<'a>> {
        ensure_remaining(count <= self.remaining(), "slice")?;

        let base = &self.data[self.position..self.position + count];
        self.position += count;

        Ok(DataReader::new(base))
    }

    pub fn copy_to(&mut self, destination: &mut [u8]) -> Result<()> {
        ensure_remaining(destination.len() <= self.remaining(), "copy")?;

        destination
            .copy_from_slice(&self.data[self.position..self.position + destination.len()]);
        self.position += destination.len();

        Ok(())
    }

    #[track_caller]
    pub fn peek<T: WireInt>(&self) -> Result<T> {
        if T::SIZE > self.remaining() {
            return Err(Error::invalid_data("short read"));
        }

        Ok(T::get_le(&self.data[self.position..]))
    }

    #[track_caller]
    pub fn read<T: WireInt>(&mut self) -> Result<T> {
        let result = self.peek::<T>()?;
        self.position += T::SIZE;

        Ok(result)
    }

    /// Reads an integer, failing unless it lands in `[min, max]`. The cursor
    /// is unchanged on failure.
    #[track_caller]
    pub fn read_in<T: WireInt>(&mut self, min: T, max: T) -> Result<T> {
        let result = self.peek::<T>()?;

        if result < min || result > max {
            return Err(Error::invalid_data(format!(
                "value {result} outside [{min}, {max}]"
            )));
        }

        self.position += T::SIZE;
        Ok(result)
    }

    #[track_caller]
    pub fn read_enum<E: WireEnum>(&mut self) -> Result<E> {
        let raw = self.read_in::<u8>(E::FIRST, E::LAST)?;

        // Covers enums with holes in their value range.
        E::from_wire(raw).ok_or_else(|| Error::invalid_data(format!("bad enum value {raw}")))
    }

    /// The 5-byte fixed-point float: a base-10 exponent followed by a
    /// significand biased by `i32::MAX`.
    #[track_caller]
    pub fn read_float(&mut self) -> Result<f64> {
        let exponent = self.read::<u8>()?;
        let significand = self.read::<u32>()?;

        Ok((f64::from(significand) - f64::from(i32::MAX)) / 10f64.powi(i32::from(exponent)))
    }

    /// A u16-length-prefixed string of raw latin-1 bytes.
    #[track_caller]
    pub fn read_string(&mut self) -> Result<String> {
        let count = self.read::<u16>()? as usize;
        ensure_remaining(count <= self.remaining(), "string")?;

        let base = &self.data[self.position..self.position + count];
        self.position += count;

        Ok(base.iter().map(|&byte| char::from(byte)).collect())
    }

    #[track_caller]
    pub fn skip_string(&mut self) -> Result<()> {
        let count = self.read::<u16>()? as usize;
        self.skip(count)
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        self.read()
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        self.read()
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        self.read()
    }

    pub fn read_u64(&mut self) -> Result<u64> {
        self.read()
    }

    pub fn read_i16(&mut self) -> Result<i16> {
        self.read()
    }

    pub fn read_i32(&mut self) -> Result<i32> {
        self.read()
    }
}

#[track_caller]
fn ensure_remaining(ok: bool, what: &'static str) -> Result<()> {
    if ok {
        Ok(())
    } else {
        Err(Error::invalid_data(format!("{what} past end of input")))
    }
}

#[cfg(test)]
mod tests {
    use rand::{thread_rng, Rng};

    use super::*;

    #[test]
    fn little_endian_u16() {
        let mut reader = DataReader::new(&[0x2A, 0x00]);
        assert_eq!(reader.read_u16().unwrap(), 0x002A);
        assert!(reader.is_empty());
    }

    #[test]
    fn short_read_fails_without_consuming() {
        let mut reader = DataReader::new(&[0xFF]);
        assert!(reader.read_u16().is_err());
        assert_eq!(reader.tell(), 0);
        assert_eq!(reader.read_u8().unwrap(), 0xFF);
    }

    #[test]
    fn range_check_leaves_cursor() {
        let mut reader = DataReader::new(&[0x10]);
        assert!(reader.read_in::<u8>(0, 15).is_err());
        assert_eq!(reader.tell(), 0);
        assert_eq!(reader.read_in::<u8>(0, 16).unwrap(), 0x10);
    }

    #[test]
    fn seek_to_tell_is_a_no_op() {
        let data = [1u8, 2, 3, 4, 5];
        let mut reader = DataReader::new(&data);
        reader.skip(2).unwrap();

        let seeked = reader.seek(reader.tell()).unwrap();
        assert_eq!(seeked.tell(), reader.tell());
        assert_eq!(seeked.raw(), reader.raw());
    }

    #[test]
    fn slices_are_rebased() {
        let data = [9u8, 8, 7, 6];
        let mut reader = DataReader::new(&data);
        reader.skip(1).unwrap();

        let slice = reader.slice(2).unwrap();
        assert_eq!(slice.tell(), 0);
        assert_eq!(slice.len(), 2);
        assert_eq!(slice.raw(), &[8, 7]);
        assert_eq!(reader.remaining(), 1);
    }

    #[test]
    fn float_encoding() {
        // exponent 3, significand i32::MAX + 857000 => 857.0
        let significand = (i32::MAX as u32).wrapping_add(857_000);
        let mut bytes = vec![3u8];
        bytes.extend_from_slice(&significand.to_le_bytes());

        let mut reader = DataReader::new(&bytes);
        let value = reader.read_float().unwrap();
        assert!((value - 857.0).abs() < 1e-9);
    }

    #[test]
    fn strings_are_length_prefixed() {
        let mut bytes = vec![5u8, 0];
        bytes.extend_from_slice(b"Rashid");

        let mut reader = DataReader::new(&bytes);
        assert_eq!(reader.read_string().unwrap(), "Rashi");
        assert_eq!(reader.remaining(), 1);
    }

    #[test]
    fn integer_round_trips() {
        let mut rng = thread_rng();

        for _ in 0..10_000 {
            let value: u64 = rng.gen();
            let bytes = value.to_le_bytes();

            let mut reader = DataReader::new(&bytes);
            assert_eq!(reader.peek::<u64>().unwrap(), value);
            assert_eq!(reader.read::<u64>().unwrap(), value);
            assert!(reader.is_empty());
        }
    }
}
