//! The volume-preserving bijection between the homochoric ball and the cubochoric cube, following
//! D. Roşca et al., Modelling Simul. Mater. Sci. Eng. 22 (2014) 075013. The cube is split into six
//! square pyramids with their apex at the origin; each pyramid is mapped to the corresponding
//! sixth of the ball.
//!
//! Neither function checks its domain. [`crate::rotation::Rotation`] validates user input before
//! calling into this module.

use std::f64::consts::{PI, SQRT_2};

use nalgebra::{Vector2, Vector3};

use crate::constants::homochoric_radius;

/// Anything this small is the origin. The mapping is exact there, so this is not a tolerance.
const ORIGIN_CUTOFF: f64 = 1.0e-300;

/// Grid parameter ratio between cube and ball.
fn sc() -> f64 {
    (PI / 6.0).powf(1.0 / 6.0)
}

fn beta() -> f64 {
    PI.powf(5.0 / 6.0) / 6.0_f64.powf(1.0 / 6.0) / 2.0
}

/// Finds the pyramid containing the point, returning the permutation that moves the pyramid's axis
/// into z and the permutation that moves it back.
fn pyramid_order(xyz: &Vector3<f64>) -> ([usize; 3], [usize; 3]) {
    let (x, y, z) = (xyz.x, xyz.y, xyz.z);
    if (x.abs() <= z && y.abs() <= z) || (x.abs() <= -z && y.abs() <= -z) {
        ([0, 1, 2], [0, 1, 2])
    } else if (z.abs() <= x && y.abs() <= x) || (z.abs() <= -x && y.abs() <= -x) {
        ([1, 2, 0], [2, 0, 1])
    } else {
        // the largest component is y
        ([2, 0, 1], [1, 2, 0])
    }
}

fn permute(v: &Vector3<f64>, p: [usize; 3]) -> Vector3<f64> {
    Vector3::new(v[p[0]], v[p[1]], v[p[2]])
}

/// Maps a point of the cube with half edge π^(2/3)/2 into the ball of radius (3π/4)^(1/3).
pub fn cube_to_ball(cube: &Vector3<f64>) -> Vector3<f64> {
    if cube.iter().all(|c| c.abs() <= ORIGIN_CUTOFF) {
        return Vector3::zeros();
    }

    let (forward, backward) = pyramid_order(cube);
    let xyz = permute(cube, forward) * sc();

    let lambert = if xyz.x.abs() <= ORIGIN_CUTOFF && xyz.y.abs() <= ORIGIN_CUTOFF {
        // on the pyramid axis
        Vector3::new(0.0, 0.0, (6.0 / PI).sqrt() * xyz.z)
    } else {
        let (small, large) = if xyz.y.abs() <= xyz.x.abs() {
            (1, 0)
        } else {
            (0, 1)
        };
        let (s, c) = (PI / 12.0 * xyz[small] / xyz[large]).sin_cos();
        let q = homochoric_radius() * 2.0_f64.powf(0.25) / beta() * xyz[large] / (SQRT_2 - c).sqrt();
        let t = Vector2::new(SQRT_2 * c - 1.0, SQRT_2 * s) * q;

        // inverse Lambert projection onto the sphere; xyz.z cannot vanish here
        let t2 = t.norm_squared();
        let s = t2 * PI / 24.0 / (xyz.z * xyz.z);
        let c = t2 * (PI / 24.0).sqrt() / xyz.z;
        let q = (1.0 - s).sqrt();
        Vector3::new(t[large] * q, t[small] * q, (6.0 / PI).sqrt() * xyz.z - c)
    };

    permute(&lambert, backward)
}

/// Maps a point of the ball of radius (3π/4)^(1/3) into the cube with half edge π^(2/3)/2.
pub fn ball_to_cube(ball: &Vector3<f64>) -> Vector3<f64> {
    if ball.iter().all(|c| c.abs() <= ORIGIN_CUTOFF) {
        return Vector3::zeros();
    }

    let rs = ball.norm();
    let (forward, backward) = pyramid_order(ball);
    let xyz3 = permute(ball, forward);

    // inverse M_3
    let xyz2 = Vector2::new(xyz3.x, xyz3.y) * (2.0 * rs / (rs + xyz3.z.abs())).sqrt();

    // inverse M_2
    let qxy = xyz2.norm_squared();
    let t_inv = if qxy <= ORIGIN_CUTOFF {
        Vector2::zeros()
    } else {
        let max = xyz2.x.abs().max(xyz2.y.abs());
        let min = xyz2.x.abs().min(xyz2.y.abs());
        let q2 = qxy + max * max;
        let sq2 = q2.sqrt();
        let q = (beta() / SQRT_2 / homochoric_radius()) * (q2 * qxy / (q2 - max * sq2)).sqrt();
        let tt = ((min * min + max * sq2) / SQRT_2 / qxy).clamp(-1.0, 1.0);
        let ratio = tt.acos() / PI * 12.0;
        let t = if xyz2.y.abs() <= xyz2.x.abs() {
            Vector2::new(1.0, ratio)
        } else {
            Vector2::new(ratio, 1.0)
        };
        Vector2::new(
            if xyz2.x < 0.0 { -t.x } else { t.x },
            if xyz2.y < 0.0 { -t.y } else { t.y },
        ) * q
    };

    // inverse M_1
    let z_sign = if xyz3.z < 0.0 { -1.0 } else { 1.0 };
    let cube = Vector3::new(t_inv.x, t_inv.y, z_sign * rs / (6.0 / PI).sqrt()) / sc();

    permute(&cube, backward)
}
