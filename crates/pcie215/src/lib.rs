//! PCIe-215 interrupt device, seen from userspace.
//!
//! The driver exposes `/dev/pcie215`. Two ioctls configure interrupt
//! generation and the trigger lines; a zero-length `read` blocks until an
//! enabled line asserts.
//!
//! ```no_run
//! use irq_wait::Handle;
//! use pcie215::{DEVICE_PATH, Pcie215, lines};
//!
//! let mut handle = Handle::open(&Pcie215::new(), DEVICE_PATH)?;
//! handle.set_interrupt_enable(true)?;
//! handle.set_trigger_mask(lines::PPI_X_C0 | lines::PPI_Y_C0)?;
//! handle.wait_for_interrupt()?;
//! # Ok::<(), irq_wait::Error>(())
//! ```

mod chardev;
pub mod ioctl;
pub mod wake;

pub use chardev::{CharDev, Pcie215, control_error, open_error, wait_error};

pub const DEVICE_PATH: &str = "/dev/pcie215";

/// Interrupt sources of the board.
pub const LINE_COUNT: u32 = 6;

/// Trigger mask bits, one per interrupt source.
pub mod lines {
    use irq_wait::TriggerMask;

    pub const PPI_X_C0: TriggerMask = TriggerMask::line(0);
    pub const PPI_X_C3: TriggerMask = TriggerMask::line(1);
    pub const PPI_Y_C0: TriggerMask = TriggerMask::line(2);
    pub const PPI_Y_C3: TriggerMask = TriggerMask::line(3);
    pub const CTR_Z1: TriggerMask = TriggerMask::line(4);
    pub const CTR_Z2: TriggerMask = TriggerMask::line(5);

    pub const ALL: [(&str, TriggerMask); 6] = [
        ("PPI X C0", PPI_X_C0),
        ("PPI X C3", PPI_X_C3),
        ("PPI Y C0", PPI_Y_C0),
        ("PPI Y C3", PPI_Y_C3),
        ("CTR Z1", CTR_Z1),
        ("CTR Z2", CTR_Z2),
    ];
}
