//! Control codes of the pcie215 driver.
//!
//! Both take their argument by value as an `int`.

use std::os::fd::RawFd;

use nix::{errno::Errno, sys::ioctl::ioctl_param_type};

pub const PCIE215_IOC_MAGIC: u8 = b'p';
pub const PCIE215_IOC_IRQ_ENABLE: u8 = 1;
pub const PCIE215_IOC_IRQ_TRIGGERS_ENABLE: u8 = 2;

nix::ioctl_write_int!(ioctl_irq_enable, PCIE215_IOC_MAGIC, PCIE215_IOC_IRQ_ENABLE);
nix::ioctl_write_int!(
    ioctl_irq_triggers_enable,
    PCIE215_IOC_MAGIC,
    PCIE215_IOC_IRQ_TRIGGERS_ENABLE
);

pub fn irq_enable(fd: RawFd, enabled: bool) -> Result<(), Errno> {
    unsafe { ioctl_irq_enable(fd, enabled as ioctl_param_type) }.map(drop)
}

pub fn irq_triggers_enable(fd: RawFd, mask: u32) -> Result<(), Errno> {
    unsafe { ioctl_irq_triggers_enable(fd, mask as ioctl_param_type) }.map(drop)
}
