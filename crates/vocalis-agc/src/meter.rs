//! Display meters.
//!
//! Three linear values are latched every 8th output position for a GUI or log
//! line. They are metadata only and never feed back into the control path.

use vocalis_core::attenuation_db;

/// Latched linear meter values; 1.0 means no attenuation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Meters {
    /// Headroom used by the level control: `target / ratio`.
    pub red: f32,
    /// De-esser attenuation.
    pub yellow: f32,
    /// Noise gate attenuation.
    pub green: f32,
}

impl Meters {
    /// All meters at unity.
    pub const UNITY: Self = Self {
        red: 1.0,
        yellow: 1.0,
        green: 1.0,
    };

    /// Convert to dB of attenuation.
    pub fn levels(&self) -> MeterLevels {
        MeterLevels {
            red_db: attenuation_db(self.red),
            yellow_db: attenuation_db(self.yellow),
            green_db: attenuation_db(self.green),
        }
    }
}

impl Default for Meters {
    fn default() -> Self {
        Self::UNITY
    }
}

/// Meter readings in dB of attenuation (`-20·log10(value)`).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MeterLevels {
    /// Overall gain reduction.
    pub red_db: f32,
    /// De-esser reduction.
    pub yellow_db: f32,
    /// Noise gate reduction.
    pub green_db: f32,
}

impl MeterLevels {
    /// Readings truncated to whole dB, as an integer meter display shows them.
    pub fn whole_db(&self) -> (i32, i32, i32) {
        (
            self.red_db as i32,
            self.yellow_db as i32,
            self.green_db as i32,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unity_reads_zero() {
        assert_eq!(Meters::UNITY.levels(), MeterLevels::default());
        assert_eq!(Meters::default().levels().whole_db(), (0, 0, 0));
    }

    #[test]
    fn half_reads_six_db() {
        let m = Meters {
            red: 1.0,
            yellow: 0.5,
            green: 0.25,
        };
        assert_eq!(m.levels().whole_db(), (0, 6, 12));
    }
}
