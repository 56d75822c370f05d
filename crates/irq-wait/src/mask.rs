use core::{ops::BitOr, str::FromStr};

use crate::{custom_type, err::Error};

custom_type!(TriggerMask, u32, "{:#x}");

impl TriggerMask {
    pub const NONE: TriggerMask = TriggerMask(0);

    /// Mask with only `line` set.
    pub const fn line(line: u32) -> Self {
        Self(1 << line)
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub const fn intersects(self, other: TriggerMask) -> bool {
        self.0 & other.0 != 0
    }

    /// Whether every set bit addresses one of the first `lines` lines.
    pub const fn fits(self, lines: u32) -> bool {
        if lines >= u32::BITS {
            return true;
        }
        self.0 >> lines == 0
    }

    pub fn iter_lines(self) -> impl Iterator<Item = u32> {
        (0..u32::BITS).filter(move |bit| self.0 & (1 << bit) != 0)
    }
}

impl BitOr for TriggerMask {
    type Output = TriggerMask;

    fn bitor(self, rhs: Self) -> Self::Output {
        Self(self.0 | rhs.0)
    }
}

/// Accepts decimal, `0x` hex and `0b` binary.
impl FromStr for TriggerMask {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let parsed = if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
            u32::from_str_radix(hex, 16)
        } else if let Some(bin) = s.strip_prefix("0b") {
            u32::from_str_radix(bin, 2)
        } else {
            s.parse::<u32>()
        };

        parsed
            .map(TriggerMask)
            .map_err(|e| Error::InvalidArgument(format!("trigger mask `{s}`: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fits_line_count() {
        assert!(TriggerMask::new(0x3f).fits(6));
        assert!(!TriggerMask::new(0x40).fits(6));
        assert!(TriggerMask::NONE.fits(0));
        assert!(!TriggerMask::new(1).fits(0));
        assert!(TriggerMask::new(u32::MAX).fits(32));
    }

    #[test]
    fn parse() {
        assert_eq!("0x11".parse::<TriggerMask>().unwrap(), TriggerMask::new(0x11));
        assert_eq!("17".parse::<TriggerMask>().unwrap(), TriggerMask::new(17));
        assert_eq!("0b101".parse::<TriggerMask>().unwrap(), TriggerMask::new(5));
        assert!("0xzz".parse::<TriggerMask>().is_err());
        assert!("-1".parse::<TriggerMask>().is_err());
    }

    #[test]
    fn lines() {
        let mask = TriggerMask::line(0) | TriggerMask::line(3);
        assert_eq!(mask.raw(), 0b1001);
        assert_eq!(mask.iter_lines().collect::<Vec<_>>(), vec![0, 3]);
        assert!(mask.intersects(TriggerMask::line(3)));
        assert!(!mask.intersects(TriggerMask::line(1)));
        assert_eq!(format!("{mask:?}"), "0x9");
    }
}
