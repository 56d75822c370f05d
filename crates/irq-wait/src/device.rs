use std::path::Path;

use crate::{CancelToken, DriverResult, TriggerMask};

pub type Hardware = Box<dyn Interface>;
pub type BoxRegister = Box<dyn Register>;

/// One open session with an interrupt-wait device.
pub trait Interface: Send {
    /// Number of physical trigger lines.
    fn line_count(&self) -> u32;
    fn set_interrupt_enable(&mut self, enabled: bool) -> DriverResult;
    fn set_trigger_mask(&mut self, mask: TriggerMask) -> DriverResult;
    /// Blocks until an enabled trigger fires or `cancel` is cancelled.
    fn wait(&mut self, cancel: &CancelToken) -> DriverResult;
}

/// Opens sessions on the devices a driver backs.
pub trait Register: Send + Sync {
    fn name(&self) -> &str;
    fn open(&self, path: &Path) -> DriverResult<Hardware>;
}
