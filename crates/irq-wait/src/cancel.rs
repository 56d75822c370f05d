use std::{
    fmt::Debug,
    sync::{
        Arc, Mutex, MutexGuard, PoisonError,
        atomic::{AtomicBool, AtomicU64, Ordering},
        mpsc::{self, RecvTimeoutError},
    },
    thread,
    time::Duration,
};

use log::trace;

type Waker = Arc<dyn Fn() + Send + Sync>;

/// Aborts blocking waits from another thread.
///
/// Clones share the same state. Once cancelled a token stays cancelled; waits
/// started on it return `Interrupted` right away.
#[derive(Clone, Default)]
pub struct CancelToken {
    inner: Arc<Inner>,
}

#[derive(Default)]
struct Inner {
    cancelled: AtomicBool,
    next_id: AtomicU64,
    wakers: Mutex<Vec<(u64, Waker)>>,
}

impl Inner {
    fn wakers(&self) -> MutexGuard<'_, Vec<(u64, Waker)>> {
        self.wakers.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::SeqCst)
    }

    /// Cancels the token and wakes registered waiters. Returns once every
    /// waker has run; backends may hold it until their waiter has left the
    /// blocking call.
    pub fn cancel(&self) {
        if self.inner.cancelled.swap(true, Ordering::SeqCst) {
            return;
        }

        // Wakers may block until their waiter leaves, so run them unlocked.
        let wakers: Vec<Waker> = self
            .inner
            .wakers()
            .iter()
            .map(|(_, w)| w.clone())
            .collect();
        trace!("cancel: waking {} waiter(s)", wakers.len());
        for waker in wakers {
            waker();
        }
    }

    /// Cancels the token once `timeout` elapses, unless the returned [`Alarm`]
    /// is dropped first.
    pub fn cancel_after(&self, timeout: Duration) -> Alarm {
        let (disarm, rx) = mpsc::channel::<()>();
        let token = self.clone();

        thread::spawn(move || {
            if let Err(RecvTimeoutError::Timeout) = rx.recv_timeout(timeout) {
                trace!("alarm fired after {timeout:?}");
                token.cancel();
            }
        });

        Alarm { _disarm: disarm }
    }

    /// Runs `waker` on cancellation for as long as the registration lives.
    ///
    /// If the token is already cancelled `waker` runs before this returns.
    pub fn on_cancel(&self, waker: impl Fn() + Send + Sync + 'static) -> Registration {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        let waker: Waker = Arc::new(waker);
        self.inner.wakers().push((id, waker.clone()));

        if self.is_cancelled() {
            waker();
        }

        Registration {
            inner: self.inner.clone(),
            id,
        }
    }
}

impl Debug for CancelToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CancelToken")
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}

#[must_use = "dropping the registration unregisters the waker"]
pub struct Registration {
    inner: Arc<Inner>,
    id: u64,
}

impl Drop for Registration {
    fn drop(&mut self) {
        self.inner.wakers().retain(|(id, _)| *id != self.id);
    }
}

/// Pending [`CancelToken::cancel_after`]. Dropping it disarms the timer.
#[must_use = "dropping the alarm disarms it"]
pub struct Alarm {
    _disarm: mpsc::Sender<()>,
}
