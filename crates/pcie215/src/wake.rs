//! Pulling a thread out of a blocking syscall when a [`CancelToken`] fires.
//!
//! The waiting thread is sent [`WAKE_SIGNAL`], whose handler does nothing
//! and is installed without `SA_RESTART`, so the syscall fails with `EINTR`.
//! The signal is re-sent until the waiter is out of the syscall.

use std::{
    os::raw::c_int,
    sync::{
        Arc, OnceLock,
        atomic::{AtomicBool, Ordering},
    },
    thread,
    time::Duration,
};

use irq_wait::CancelToken;
use log::{trace, warn};
use nix::{
    errno::Errno,
    sys::{
        pthread::{pthread_kill, pthread_self},
        signal::{SaFlags, SigAction, SigHandler, SigSet, Signal, sigaction},
    },
};

/// Replaces any handler the process had for this signal.
pub const WAKE_SIGNAL: Signal = Signal::SIGUSR1;

const RESEND: Duration = Duration::from_millis(1);

extern "C" fn on_wake(_: c_int) {}

fn install() -> Result<(), Errno> {
    static INSTALLED: OnceLock<Result<(), Errno>> = OnceLock::new();

    *INSTALLED.get_or_init(|| {
        let action = SigAction::new(
            SigHandler::Handler(on_wake),
            SaFlags::empty(),
            SigSet::empty(),
        );
        trace!("installing {WAKE_SIGNAL:?} wake handler");
        unsafe { sigaction(WAKE_SIGNAL, &action) }.map(drop)
    })
}

/// Runs `syscall` on the calling thread. Cancelling `cancel` while it blocks
/// makes it fail with `EINTR`; an already cancelled token skips it.
pub fn interruptible<T>(
    cancel: &CancelToken,
    syscall: impl FnOnce() -> Result<T, Errno>,
) -> Result<T, Errno> {
    install()?;

    let waiter = pthread_self();
    let inside = Arc::new(AtomicBool::new(false));
    let flag = inside.clone();
    let _registration = cancel.on_cancel(move || {
        while flag.load(Ordering::SeqCst) {
            if let Err(e) = pthread_kill(waiter, WAKE_SIGNAL) {
                warn!("failed to signal waiting thread: {e}");
                break;
            }
            thread::sleep(RESEND);
        }
    });

    inside.store(true, Ordering::SeqCst);
    let result = if cancel.is_cancelled() {
        Err(Errno::EINTR)
    } else {
        syscall()
    };
    inside.store(false, Ordering::SeqCst);

    result
}
