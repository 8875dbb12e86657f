//! Unit conversion and angle normalization
//!
//! Every stored field uses one base unit per quantity kind: meters, knots,
//! degrees Celsius, degrees, pascals, volts, liters, percent. Conversions are
//! applied at the handler boundary, never downstream.

pub const METERS_PER_FOOT: f64 = 0.3048;
pub const METERS_PER_FATHOM: f64 = 1.8288;

const KNOTS_PER_MPS: f64 = 3600.0 / 1852.0;

pub fn knots_from_mps(mps: f64) -> f64 {
    mps * KNOTS_PER_MPS
}

pub fn knots_from_kmh(kmh: f64) -> f64 {
    kmh / 1.852
}

pub fn celsius_from_kelvin(kelvin: f64) -> f64 {
    kelvin - 273.15
}

pub fn degrees_from_radians(radians: f64) -> f64 {
    radians.to_degrees()
}

pub fn pascals_from_bar(bar: f64) -> f64 {
    bar * 100_000.0
}

/// Normalize an absolute bearing to [0, 360)
pub fn normalize_bearing(degrees: f64) -> f64 {
    let mut angle = degrees % 360.0;
    if angle < 0.0 {
        angle += 360.0;
    }
    // -1e-10 % 360 rounds back up to 360.0
    if angle >= 360.0 {
        angle = 0.0;
    }
    angle
}

/// Normalize a relative angle to [-180, 180], negative to port
///
/// Accepts any input convention: already-signed values, 0-360 values and
/// magnitudes; idempotent on values already in range.
pub fn normalize_relative(degrees: f64) -> f64 {
    let mut angle = degrees % 360.0;
    if angle > 180.0 {
        angle -= 360.0;
    }
    if angle < -180.0 {
        angle += 360.0;
    }
    angle
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_speed_conversions() {
        assert!((knots_from_mps(10.0) - 19.438_444).abs() < 1e-5);
        assert!((knots_from_kmh(1.852) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_temperature() {
        assert!((celsius_from_kelvin(293.15) - 20.0).abs() < 1e-12);
    }

    #[test]
    fn test_bearing_normalization() {
        assert_eq!(normalize_bearing(0.0), 0.0);
        assert_eq!(normalize_bearing(360.0), 0.0);
        assert_eq!(normalize_bearing(-90.0), 270.0);
        assert_eq!(normalize_bearing(725.0), 5.0);
    }

    #[test]
    fn test_relative_normalization() {
        // 200 degrees apparent reads as 160 degrees to port
        assert_eq!(normalize_relative(200.0), -160.0);
        assert_eq!(normalize_relative(-200.0), 160.0);
        assert_eq!(normalize_relative(45.0), 45.0);
        assert_eq!(normalize_relative(-45.0), -45.0);
    }

    #[test]
    fn test_relative_normalization_idempotent() {
        for v in [-180.0, -160.0, -0.5, 0.0, 90.0, 180.0] {
            assert_eq!(normalize_relative(normalize_relative(v)), normalize_relative(v));
            assert_eq!(normalize_relative(v), v);
        }
    }
}
