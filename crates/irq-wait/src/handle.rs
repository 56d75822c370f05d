use std::{
    fmt::Debug,
    path::{Path, PathBuf},
    sync::{
        Arc,
        atomic::{AtomicU8, Ordering},
    },
    time::Duration,
};

use log::{debug, warn};

use crate::{
    CancelToken, DriverResult, Error, ErrorKind, TriggerMask,
    device::{Hardware, Register},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum State {
    Idle,
    Waiting,
}

/// How the last wait on a handle ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Fired,
    Interrupted,
    Failed(ErrorKind),
}

/// Read-only view of a handle's [`State`], usable from other threads.
#[derive(Clone)]
pub struct StateWatch(Arc<AtomicU8>);

impl StateWatch {
    pub fn get(&self) -> State {
        match self.0.load(Ordering::Acquire) {
            v if v == State::Waiting as u8 => State::Waiting,
            _ => State::Idle,
        }
    }

    fn set(&self, state: State) {
        self.0.store(state as u8, Ordering::Release);
    }
}

/// An open session with an interrupt-wait device.
///
/// All calls take `&mut self`: sharing a handle between threads needs
/// external locking.
pub struct Handle {
    hardware: Hardware,
    path: PathBuf,
    state: StateWatch,
    last_outcome: Option<Outcome>,
}

impl Handle {
    pub fn open(register: &dyn Register, path: impl AsRef<Path>) -> DriverResult<Self> {
        let path = path.as_ref();
        let hardware = register.open(path)?;
        debug!(
            "opened {} via {} ({} lines)",
            path.display(),
            register.name(),
            hardware.line_count()
        );
        Ok(Self::new(hardware, path))
    }

    pub fn new(hardware: Hardware, path: impl Into<PathBuf>) -> Self {
        Self {
            hardware,
            path: path.into(),
            state: StateWatch(Arc::new(AtomicU8::new(State::Idle as u8))),
            last_outcome: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn line_count(&self) -> u32 {
        self.hardware.line_count()
    }

    pub fn state(&self) -> State {
        self.state.get()
    }

    pub fn state_watch(&self) -> StateWatch {
        self.state.clone()
    }

    pub fn last_outcome(&self) -> Option<Outcome> {
        self.last_outcome
    }

    pub fn set_interrupt_enable(&mut self, enabled: bool) -> DriverResult {
        debug!("{}: irq enable = {enabled}", self.path.display());
        self.hardware.set_interrupt_enable(enabled)
    }

    pub fn set_trigger_mask(&mut self, mask: TriggerMask) -> DriverResult {
        let lines = self.hardware.line_count();
        if !mask.fits(lines) {
            return Err(Error::MaskOutOfRange { mask, lines });
        }

        debug!("{}: trigger mask = {mask}", self.path.display());
        self.hardware.set_trigger_mask(mask)
    }

    /// Blocks until an enabled trigger fires. Without any enable/mask
    /// configuration on the device this never returns.
    pub fn wait_for_interrupt(&mut self) -> DriverResult {
        self.wait_for_interrupt_until(&CancelToken::new())
    }

    /// Like [`Handle::wait_for_interrupt`], but gives up with
    /// [`Error::Interrupted`] once `cancel` is cancelled.
    pub fn wait_for_interrupt_until(&mut self, cancel: &CancelToken) -> DriverResult {
        let result = if cancel.is_cancelled() {
            Err(Error::Interrupted)
        } else {
            self.state.set(State::Waiting);
            let result = self.hardware.wait(cancel);
            self.state.set(State::Idle);
            result
        };

        let outcome = match &result {
            Ok(()) => Outcome::Fired,
            Err(Error::Interrupted) => Outcome::Interrupted,
            Err(e) => {
                warn!("{}: wait failed: {e}", self.path.display());
                Outcome::Failed(e.kind())
            }
        };
        debug!("{}: wait -> {outcome:?}", self.path.display());
        self.last_outcome = Some(outcome);

        result
    }

    pub fn wait_for_interrupt_timeout(&mut self, timeout: Duration) -> DriverResult {
        let cancel = CancelToken::new();
        let _alarm = cancel.cancel_after(timeout);
        self.wait_for_interrupt_until(&cancel)
    }

    pub fn close(self) {
        debug!("closing {}", self.path.display());
    }
}

impl Debug for Handle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Handle")
            .field("path", &self.path)
            .field("state", &self.state())
            .field("last_outcome", &self.last_outcome)
            .finish()
    }
}
