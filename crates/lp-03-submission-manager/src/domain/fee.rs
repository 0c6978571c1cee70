use serde::{Deserialize, Serialize};

/// Server load figures used to price a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeSchedule {
    pub fee_base: u64,
    pub fee_ref: u64,
    pub load_base: u64,
    pub load_factor: u64,
}

impl FeeSchedule {
    /// Unloaded server: base fee 10 drops per 10 reference units.
    pub const UNLOADED: Self = Self {
        fee_base: 10,
        fee_ref: 10,
        load_base: 256,
        load_factor: 256,
    };

    /// `⌈fee_base / fee_ref × units × load_factor / load_base × cushion⌉` drops.
    ///
    /// `None` if either divisor is zero.
    pub fn fee_for(&self, units: u64, cushion: f64) -> Option<u64> {
        if self.fee_ref == 0 || self.load_base == 0 {
            return None;
        }
        let drops = self.fee_base as f64 / self.fee_ref as f64
            * units as f64
            * (self.load_factor as f64 / self.load_base as f64)
            * cushion;
        Some(drops.ceil() as u64)
    }
}

impl Default for FeeSchedule {
    fn default() -> Self {
        Self::UNLOADED
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_doubled_load_with_cushion() {
        let schedule = FeeSchedule {
            load_factor: 512,
            ..FeeSchedule::UNLOADED
        };
        assert_eq!(schedule.fee_for(10, 1.2), Some(24));
    }

    #[test]
    fn test_unloaded_fee() {
        assert_eq!(FeeSchedule::UNLOADED.fee_for(10, 1.2), Some(12));
        assert_eq!(FeeSchedule::UNLOADED.fee_for(10, 1.0), Some(10));
    }

    #[test]
    fn test_zero_divisor_has_no_fee() {
        let schedule = FeeSchedule {
            load_base: 0,
            ..FeeSchedule::UNLOADED
        };
        assert_eq!(schedule.fee_for(10, 1.2), None);
    }
}
