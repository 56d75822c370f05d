//! In-process interrupt-wait driver.
//!
//! Behaves like the character device seen from userspace: configuration is
//! device-wide and shared by every session, a wait blocks until an enabled
//! line asserts, and every waiter blocked at that moment is released.

use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError},
    time::{Duration, Instant},
};

use log::{debug, trace};
use nix::errno::Errno;

use crate::{
    CancelToken, DriverResult, Error, TriggerMask,
    device::{Hardware, Interface, Register},
};

/// Snapshot of the simulated driver's configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Status {
    pub present: bool,
    pub enabled: bool,
    pub mask: TriggerMask,
    pub lines: u32,
    pub waiting: usize,
}

struct DeviceState {
    present: bool,
    enabled: bool,
    mask: TriggerMask,
    lines: u32,
    fired: u64,
    waiting: usize,
    pending_error: Option<i32>,
}

struct Shared {
    state: Mutex<DeviceState>,
    changed: Condvar,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, DeviceState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// A simulated device. Clones refer to the same device.
#[derive(Clone)]
pub struct SimDevice {
    shared: Arc<Shared>,
}

impl SimDevice {
    pub fn new(lines: u32) -> Self {
        Self {
            shared: Arc::new(Shared {
                state: Mutex::new(DeviceState {
                    present: true,
                    enabled: false,
                    mask: TriggerMask::NONE,
                    lines,
                    fired: 0,
                    waiting: 0,
                    pending_error: None,
                }),
                changed: Condvar::new(),
            }),
        }
    }

    pub fn status(&self) -> Status {
        let s = self.shared.lock();
        Status {
            present: s.present,
            enabled: s.enabled,
            mask: s.mask,
            lines: s.lines,
            waiting: s.waiting,
        }
    }

    /// Raises the input lines in `lines`. Returns whether an interrupt was
    /// generated.
    pub fn assert_lines(&self, lines: TriggerMask) -> bool {
        let mut s = self.shared.lock();
        let fire = s.present && s.enabled && s.mask.intersects(lines);
        trace!(
            "sim: lines {lines} asserted, enabled={} mask={} -> fire={fire}",
            s.enabled, s.mask
        );
        if fire {
            s.fired += 1;
            self.shared.changed.notify_all();
        }
        fire
    }

    /// Clears the enable flag and the trigger mask.
    pub fn reset(&self) {
        let mut s = self.shared.lock();
        s.enabled = false;
        s.mask = TriggerMask::NONE;
    }

    /// Unplugs the device. Blocked waits fail with `ENODEV`.
    pub fn remove(&self) {
        let mut s = self.shared.lock();
        s.present = false;
        self.shared.changed.notify_all();
    }

    /// Makes the next wait (or one already blocked) fail with `code`.
    pub fn fail_next_wait(&self, code: i32) {
        let mut s = self.shared.lock();
        s.pending_error = Some(code);
        self.shared.changed.notify_all();
    }

    /// Blocks until at least `count` sessions are inside a wait.
    pub fn await_waiters(&self, count: usize, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut s = self.shared.lock();
        while s.waiting < count {
            let now = Instant::now();
            if now >= deadline {
                return false;
            }
            s = self
                .shared
                .changed
                .wait_timeout(s, deadline - now)
                .unwrap_or_else(PoisonError::into_inner)
                .0;
        }
        true
    }

    pub fn session(&self) -> SimSession {
        SimSession {
            device: self.clone(),
        }
    }
}

/// One open session on a [`SimDevice`].
pub struct SimSession {
    device: SimDevice,
}

impl SimSession {
    fn present(&self) -> DriverResult<MutexGuard<'_, DeviceState>> {
        let s = self.device.shared.lock();
        if !s.present {
            return Err(Error::DeviceUnavailable("simulated device removed".into()));
        }
        Ok(s)
    }
}

impl Interface for SimSession {
    fn line_count(&self) -> u32 {
        self.device.shared.lock().lines
    }

    fn set_interrupt_enable(&mut self, enabled: bool) -> DriverResult {
        self.present()?.enabled = enabled;
        Ok(())
    }

    fn set_trigger_mask(&mut self, mask: TriggerMask) -> DriverResult {
        let mut s = self.present()?;
        if !mask.fits(s.lines) {
            return Err(Error::MaskOutOfRange {
                mask,
                lines: s.lines,
            });
        }
        s.mask = mask;
        Ok(())
    }

    fn wait(&mut self, cancel: &CancelToken) -> DriverResult {
        let shared = self.device.shared.clone();
        let _registration = cancel.on_cancel(move || {
            let _s = shared.lock();
            shared.changed.notify_all();
        });

        let shared = &self.device.shared;
        let mut s = shared.lock();
        let seen = s.fired;
        s.waiting += 1;
        shared.changed.notify_all();

        let result = loop {
            if let Some(code) = s.pending_error.take() {
                break Err(Error::Io { code });
            }
            if !s.present {
                break Err(Error::io(Errno::ENODEV));
            }
            if s.fired != seen {
                break Ok(());
            }
            if cancel.is_cancelled() {
                break Err(Error::Interrupted);
            }
            s = shared.changed.wait(s).unwrap_or_else(PoisonError::into_inner);
        };

        s.waiting -= 1;
        result
    }
}

/// Binds simulated devices to paths, like device nodes under `/dev`.
#[derive(Default)]
pub struct SimBus {
    devices: Mutex<HashMap<PathBuf, SimDevice>>,
}

impl SimBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bind(&self, path: impl Into<PathBuf>, lines: u32) -> SimDevice {
        let path = path.into();
        let device = SimDevice::new(lines);
        debug!("sim: bound {} ({lines} lines)", path.display());
        self.devices
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(path, device.clone());
        device
    }

    pub fn unbind(&self, path: impl AsRef<Path>) -> Option<SimDevice> {
        self.devices
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(path.as_ref())
    }
}

impl Register for SimBus {
    fn name(&self) -> &str {
        "sim"
    }

    fn open(&self, path: &Path) -> DriverResult<Hardware> {
        let devices = self.devices.lock().unwrap_or_else(PoisonError::into_inner);
        match devices.get(path) {
            Some(device) if device.status().present => Ok(Box::new(device.session())),
            _ => Err(Error::DeviceUnavailable(format!(
                "no driver bound to {}",
                path.display()
            ))),
        }
    }
}
