//! Client side of an interrupt-wait character device.
//!
//! A driver exposes two control calls (interrupt enable, trigger mask) and a
//! blocking wait that returns once an enabled trigger line asserts. Backends
//! implement [`device::Interface`]; [`Handle`] adds argument checks, the
//! per-session state machine and cancellation on top.

#[macro_use]
mod _macro;

mod cancel;
pub mod device;
mod err;
mod handle;
mod mask;
pub mod sim;

pub use cancel::{Alarm, CancelToken, Registration};
pub use err::{DriverResult, Error, ErrorKind};
pub use handle::{Handle, Outcome, State, StateWatch};
pub use mask::TriggerMask;
