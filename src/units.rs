//! Module to deal with units, using zero-cost compile-time checking to ensure angles given in
//! degrees are never mixed with angles in radians.

pub use uom::si::angle::{degree, radian};
pub use uom::si::f64::Angle;

/// Converts a plain number of degrees to radians.
pub fn to_radians(degrees: f64) -> f64 {
    Angle::new::<degree>(degrees).get::<radian>()
}

/// Converts a plain number of radians to degrees.
pub fn to_degrees(radians: f64) -> f64 {
    Angle::new::<radian>(radians).get::<degree>()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::PI;

    #[test]
    fn test_conversion() {
        assert_relative_eq!(to_radians(180.0), PI);
        assert_relative_eq!(to_degrees(PI / 2.0), 90.0);
        assert_relative_eq!(to_degrees(to_radians(37.5)), 37.5);
    }
}
