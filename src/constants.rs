//! Constants that fix the conventions and numerical tolerances used throughout the crate. These
//! are deliberately compile-time values: there is no way to switch conventions at runtime, so two
//! calls can never disagree about what a quaternion means.

use std::f64::consts::PI;

/// The sign convention for the cross product term in the quaternion product and in the
/// conversions. Following Rowenhorst et al., Modelling Simul. Mater. Sci. Eng. 23 (2015) 083501,
/// rotations are passive and P = -1.
pub const P: f64 = -1.0;

/// Absolute tolerance for treating two unit quaternions, and so two rotations, as equal.
pub const UNIT_TOLERANCE: f64 = 1.0e-7;

/// Absolute tolerance for treating a value as exactly zero. Used for the singular branches of the
/// conversions (identity rotations, half turns, gimbal lock).
pub const ZERO_TOLERANCE: f64 = 1.0e-12;

/// Absolute part of the closeness check used when validating user input, e.g., that an axis is of
/// unit length.
pub const VALIDATION_ABS_TOLERANCE: f64 = 1.0e-8;

/// Relative part of the closeness check used when validating user input.
pub const VALIDATION_REL_TOLERANCE: f64 = 1.0e-5;

/// Number of decimals the standard stereographic triangle test rounds its components to, so that
/// poles lying on an edge of the triangle are counted as inside.
pub const SST_DECIMALS: i32 = 12;

/// Coefficients of the polynomial fit in |h|² that inverts the homochoric radius back to
/// cos(ω/2).
pub const HOMOCHORIC_FIT: [f64; 16] = [
    1.0000000000018852,
    -0.5000000002194847,
    -0.024999992127593126,
    -0.003928701544781374,
    -0.0008152701535450438,
    -0.0002009500426119712,
    -0.00002397986776071756,
    -0.00008202868926605841,
    0.00012448715042090092,
    -0.0001749114214822577,
    0.0001703481934140054,
    -0.00012062065004116828,
    0.000059719705868660826,
    -0.00001980756723965647,
    0.000003953714684212874,
    -0.00000036555001439719544,
];

/// Radius of the homochoric ball, (3π/4)^(1/3).
pub fn homochoric_radius() -> f64 {
    (0.75 * PI).cbrt()
}

/// Half the edge length of the cubochoric cube, π^(2/3) / 2.
pub fn cubochoric_half_edge() -> f64 {
    PI.powf(2.0 / 3.0) * 0.5
}

/// Checks closeness the way input validation does throughout the crate: within an absolute
/// tolerance plus a tolerance relative to `b`.
pub(crate) fn is_close(a: f64, b: f64) -> bool {
    (a - b).abs() <= VALIDATION_ABS_TOLERANCE + VALIDATION_REL_TOLERANCE * b.abs()
}

/// Whether `a` is zero within [`ZERO_TOLERANCE`].
pub(crate) fn is_zero(a: f64) -> bool {
    a.abs() <= ZERO_TOLERANCE
}
