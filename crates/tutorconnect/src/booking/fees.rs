//! Fee rules for a single lesson.

use serde::{Deserialize, Serialize};

/// Flat platform fee added to every lesson, in Rand.
pub const PLATFORM_FEE: u32 = 30;

/// Lessons are always exactly one hour.
pub const LESSON_DURATION_HOURS: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeBreakdown {
    pub tutor_fee: u32,
    pub platform_fee: u32,
    pub total: u32,
}

impl FeeBreakdown {
    /// Fees for one lesson with a teacher charging `hourly_rate`.
    pub fn for_lesson(hourly_rate: u32) -> Self {
        let tutor_fee = hourly_rate * LESSON_DURATION_HOURS;
        Self {
            tutor_fee,
            platform_fee: PLATFORM_FEE,
            total: tutor_fee + PLATFORM_FEE,
        }
    }

    /// Amount formatted the way payment gateways expect it ("280.00").
    pub fn total_as_decimal(&self) -> String {
        format!("{}.00", self.total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fee_breakdown() {
        let fees = FeeBreakdown::for_lesson(250);
        assert_eq!(fees.tutor_fee, 250);
        assert_eq!(fees.platform_fee, 30);
        assert_eq!(fees.total, 280);
        assert_eq!(fees.total_as_decimal(), "280.00");
    }

    #[test]
    fn test_platform_fee_is_flat() {
        for rate in [1, 180, 220, 10_000] {
            let fees = FeeBreakdown::for_lesson(rate);
            assert_eq!(fees.platform_fee, PLATFORM_FEE);
            assert_eq!(fees.total, fees.tutor_fee + fees.platform_fee);
        }
    }
}
