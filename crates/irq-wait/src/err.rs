use nix::errno::Errno;
use thiserror::Error;

use crate::TriggerMask;

pub type DriverResult<T = ()> = core::result::Result<T, Error>;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum ErrorKind {
    /// The device node is missing, or the driver behind it is not bound.
    DeviceUnavailable,
    /// A configuration value is out of range.
    InvalidArgument,
    /// A blocking wait was cancelled. The caller may retry.
    Interrupted,
    /// Any other failure reported by the driver.
    IoError,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("device unavailable: {0}")]
    DeviceUnavailable(String),
    #[error("trigger mask {mask} exceeds the {lines} lines of the device")]
    MaskOutOfRange { mask: TriggerMask, lines: u32 },
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("wait interrupted")]
    Interrupted,
    #[error("driver error [{code}][{}]", describe(.code))]
    Io { code: i32 },
}

fn describe(code: &i32) -> &'static str {
    Errno::from_i32(*code).desc()
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::DeviceUnavailable(_) => ErrorKind::DeviceUnavailable,
            Error::MaskOutOfRange { .. } | Error::InvalidArgument(_) => ErrorKind::InvalidArgument,
            Error::Interrupted => ErrorKind::Interrupted,
            Error::Io { .. } => ErrorKind::IoError,
        }
    }

    /// Raw error code of an `IoError`.
    pub fn code(&self) -> Option<i32> {
        match self {
            Error::Io { code } => Some(*code),
            _ => None,
        }
    }

    pub fn io(errno: Errno) -> Self {
        Error::Io { code: errno as i32 }
    }
}
