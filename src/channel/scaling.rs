//! Affine mapping between raw SBUS values and PWM microseconds.
//!
//! `pwm = (raw - SBUS_CENTER) / SBUS_SCALE + ppm_center`, clamped to
//! `[min_pwm, max_pwm]`. The inverse maps PWM back onto the 11-bit SBUS range.

use super::{MAX_PWM, MIN_PWM, PPM_CENTER};
use crate::sbus::protocol::{SBUS_CENTER, SBUS_SCALE, SBUS_VALUE_MAX};

/// Largest PWM error (in microseconds) introduced by a PWM -> SBUS -> PWM trip.
pub const SBUS_ROUND_TRIP_TOLERANCE: u16 = 1;

/// PWM range used when converting SBUS raw values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelScaling {
    pub min_pwm: u16,
    pub max_pwm: u16,
    pub ppm_center: u16,
}

impl Default for ChannelScaling {
    fn default() -> Self {
        Self {
            min_pwm: MIN_PWM,
            max_pwm: MAX_PWM,
            ppm_center: PPM_CENTER,
        }
    }
}

impl ChannelScaling {
    /// Clamps a PWM value to the configured range.
    #[must_use]
    pub fn clamp(&self, pwm: u16) -> u16 {
        pwm.clamp(self.min_pwm, self.max_pwm)
    }

    /// Converts an 11-bit SBUS value to a clamped PWM value.
    #[must_use]
    pub fn sbus_to_pwm(&self, raw: u16) -> u16 {
        let pwm = (f32::from(raw) - f32::from(SBUS_CENTER)) / SBUS_SCALE + f32::from(self.ppm_center);
        let pwm = pwm
            .round()
            .clamp(f32::from(self.min_pwm), f32::from(self.max_pwm));
        pwm as u16
    }

    /// Converts a PWM value to an 11-bit SBUS value.
    ///
    /// The PWM value is clamped to the configured range first.
    #[must_use]
    pub fn pwm_to_sbus(&self, pwm: u16) -> u16 {
        let pwm = self.clamp(pwm);
        let raw = (f32::from(pwm) - f32::from(self.ppm_center)) * SBUS_SCALE + f32::from(SBUS_CENTER);
        raw.round().clamp(0.0, f32::from(SBUS_VALUE_MAX)) as u16
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_center_maps_to_center() {
        let scaling = ChannelScaling::default();
        assert_eq!(scaling.sbus_to_pwm(SBUS_CENTER), PPM_CENTER);
        assert_eq!(scaling.pwm_to_sbus(PPM_CENTER), SBUS_CENTER);
    }

    #[test]
    fn test_sbus_extremes_clamp_to_pwm_range() {
        let scaling = ChannelScaling::default();
        assert_eq!(scaling.sbus_to_pwm(0), MIN_PWM);
        assert_eq!(scaling.sbus_to_pwm(SBUS_VALUE_MAX), MAX_PWM);
    }

    #[test]
    fn test_standard_endpoints() {
        let scaling = ChannelScaling::default();
        // 172 and 1811 are the conventional SBUS endpoints
        assert_eq!(scaling.pwm_to_sbus(MIN_PWM), 173);
        assert_eq!(scaling.pwm_to_sbus(MAX_PWM), 1811);
        assert_eq!(scaling.sbus_to_pwm(1811), MAX_PWM);
    }

    #[test]
    fn test_pwm_to_sbus_clamps_input() {
        let scaling = ChannelScaling::default();
        assert_eq!(scaling.pwm_to_sbus(0), scaling.pwm_to_sbus(MIN_PWM));
        assert_eq!(scaling.pwm_to_sbus(5000), scaling.pwm_to_sbus(MAX_PWM));
    }

    #[test]
    fn test_round_trip_within_tolerance() {
        let scaling = ChannelScaling::default();
        for pwm in MIN_PWM..=MAX_PWM {
            let back = scaling.sbus_to_pwm(scaling.pwm_to_sbus(pwm));
            assert!(
                back.abs_diff(pwm) <= SBUS_ROUND_TRIP_TOLERANCE,
                "PWM {} came back as {}",
                pwm,
                back
            );
        }
    }
}
