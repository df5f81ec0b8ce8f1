use std::borrow::Cow;
use std::panic::Location;

use thiserror::Error;

/// The two failure kinds of the decoder core.
///
/// `InvalidData` covers every byte-level inconsistency: short reads, range
/// violations, unknown wire values, malformed container frames. `NotSupported`
/// covers versions or container revisions the decoder has not been taught.
/// Both carry the source location where the failure was raised so a bad
/// recording can be traced back to the exact check that rejected it.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid data: {what} (at {location})")]
    InvalidData {
        what: Cow<'static, str>,
        location: &'static Location<'static>,
    },
    #[error("not supported: {what} (at {location})")]
    NotSupported {
        what: Cow<'static, str>,
        location: &'static Location<'static>,
    },
}

impl Error {
    #[track_caller]
    pub fn invalid_data(what: impl Into<Cow<'static, str>>) -> Self {
        Error::InvalidData {
            what: what.into(),
            location: Location::caller(),
        }
    }

    #[track_caller]
    pub fn not_supported(what: impl Into<Cow<'static, str>>) -> Self {
        Error::NotSupported {
            what: what.into(),
            location: Location::caller(),
        }
    }

    pub fn is_invalid_data(&self) -> bool {
        matches!(self, Error::InvalidData { .. })
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Returns `Error::InvalidData` from the enclosing function.
#[macro_export]
macro_rules! invalid_data {
    ($($arg:tt)*) => {
        return Err($crate::Error::invalid_data(format!($($arg)*)))
    };
}

/// Checks a parse-level condition, raising `Error::InvalidData` on failure.
#[macro_export]
macro_rules! ensure_data {
    ($cond:expr, $($arg:tt)*) => {
        if !$cond {
            $crate::invalid_data!($($arg)*);
        }
    };
}

/// Returns `Error::NotSupported` from the enclosing function.
#[macro_export]
macro_rules! not_supported {
    ($($arg:tt)*) => {
        return Err($crate::Error::not_supported(format!($($arg)*)))
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn errors_carry_their_capture_site() {
        let err = Error::invalid_data("truncated frame");
        let Error::InvalidData { what, location } = err else {
            panic!("wrong kind");
        };

        assert_eq!(what, "truncated frame");
        assert!(location.file().ends_with("error.rs"));
    }

    #[test]
    fn ensure_data_raises_on_failure() {
        fn check(value: u8) -> crate::Result<u8> {
            ensure_data!(value < 16, "value {value} out of range");
            Ok(value)
        }

        assert!(check(3).is_ok());
        assert!(check(200).unwrap_err().is_invalid_data());
    }
}
