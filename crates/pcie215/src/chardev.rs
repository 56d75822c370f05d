use std::{
    fs::{File, OpenOptions},
    os::fd::{AsRawFd, RawFd},
    path::{Path, PathBuf},
};

use irq_wait::{
    CancelToken, DriverResult, Error, TriggerMask,
    device::{Hardware, Interface, Register},
};
use log::{debug, trace, warn};
use nix::errno::Errno;

use crate::{LINE_COUNT, ioctl, wake};

/// Opens sessions on pcie215 device nodes.
#[derive(Debug, Clone)]
pub struct Pcie215 {
    lines: u32,
}

impl Default for Pcie215 {
    fn default() -> Self {
        Self { lines: LINE_COUNT }
    }
}

impl Pcie215 {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overrides the number of trigger lines checked before a mask is sent.
    pub fn with_lines(lines: u32) -> Self {
        Self { lines }
    }
}

impl Register for Pcie215 {
    fn name(&self) -> &str {
        "pcie215"
    }

    fn open(&self, path: &Path) -> DriverResult<Hardware> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(path)
            .map_err(|e| open_error(path, errno_of(&e)))?;

        debug!("{}: fd {}", path.display(), file.as_raw_fd());
        Ok(Box::new(CharDev {
            file,
            path: path.to_path_buf(),
            lines: self.lines,
        }))
    }
}

/// An open pcie215 device node.
pub struct CharDev {
    file: File,
    path: PathBuf,
    lines: u32,
}

impl CharDev {
    fn fd(&self) -> RawFd {
        self.file.as_raw_fd()
    }
}

impl Interface for CharDev {
    fn line_count(&self) -> u32 {
        self.lines
    }

    fn set_interrupt_enable(&mut self, enabled: bool) -> DriverResult {
        ioctl::irq_enable(self.fd(), enabled).map_err(|e| control_error(&self.path, e))
    }

    fn set_trigger_mask(&mut self, mask: TriggerMask) -> DriverResult {
        ioctl::irq_triggers_enable(self.fd(), mask.raw())
            .map_err(|e| control_error(&self.path, e))
    }

    fn wait(&mut self, cancel: &CancelToken) -> DriverResult {
        let fd = self.fd();
        trace!("{}: read(fd {fd}, NULL, 0)", self.path.display());

        match wake::interruptible(cancel, || nix::unistd::read(fd, &mut [0u8; 0])) {
            Ok(0) => Ok(()),
            Ok(n) => {
                warn!("{}: zero-length read returned {n}", self.path.display());
                Err(Error::io(Errno::EIO))
            }
            Err(e) => Err(wait_error(e)),
        }
    }
}

fn errno_of(e: &std::io::Error) -> Errno {
    e.raw_os_error().map(Errno::from_i32).unwrap_or(Errno::EIO)
}

/// A missing node or an unbound driver means the device is unavailable.
pub fn open_error(path: &Path, errno: Errno) -> Error {
    match errno {
        Errno::ENOENT | Errno::ENODEV | Errno::ENXIO => {
            Error::DeviceUnavailable(format!("{}: {}", path.display(), errno.desc()))
        }
        _ => Error::io(errno),
    }
}

pub fn control_error(path: &Path, errno: Errno) -> Error {
    match errno {
        Errno::EINVAL => Error::InvalidArgument(format!("{}: {}", path.display(), errno.desc())),
        Errno::ENODEV | Errno::ENXIO | Errno::EBADF | Errno::ENOTTY => {
            Error::DeviceUnavailable(format!("{}: {}", path.display(), errno.desc()))
        }
        _ => Error::io(errno),
    }
}

pub fn wait_error(errno: Errno) -> Error {
    match errno {
        Errno::EINTR => Error::Interrupted,
        _ => Error::io(errno),
    }
}
