//! Closed-form conversions between the rotation representations. These functions perform no
//! validation: they assume their input already satisfies the conventions (unit quaternion with a
//! non-negative real part, unit axes, angles in range). Validation happens once, in the
//! constructors of [`crate::rotation::Rotation`].
//!
//! The quaternion is the hub: every representation has a direct conversion from the quaternion,
//! and the way back goes either directly or through axis-angle pairs. Homochoric vectors go back
//! through axis-angle pairs using a polynomial fit, and cubochoric vectors go through homochoric
//! ones.
//!
//! Layouts: quaternions are `(w, x, y, z)`, Euler angles are Bunge `(φ1, Φ, φ2)` in radians,
//! axis-angle pairs are `(n1, n2, n3, ω)` and Rodrigues-Frank vectors are `(n1, n2, n3, tan(ω/2))`.
//!
//! See D. Rowenhorst et al., Modelling Simul. Mater. Sci. Eng. 23 (2015) 083501.

use std::f64::consts::PI;

use nalgebra::{Matrix3, Quaternion, Vector3, Vector4};

use crate::{
    constants::{is_zero, HOMOCHORIC_FIT, P},
    lambert::{ball_to_cube, cube_to_ball},
};

/// Reduces negative Euler angles to the ranges [0, 2π], [0, π], [0, 2π].
fn reduce_euler(eu: Vector3<f64>) -> Vector3<f64> {
    let periods = [2.0 * PI, PI, 2.0 * PI];
    Vector3::from_fn(|i, _| {
        if eu[i] < 0.0 {
            (eu[i] + 2.0 * PI) % periods[i]
        } else {
            eu[i]
        }
    })
}

/// The vector part of the quaternion.
fn imaginary(qu: &Quaternion<f64>) -> Vector3<f64> {
    Vector3::new(qu.i, qu.j, qu.k)
}

// quaternion

/// Quaternion to rotation matrix.
pub fn quaternion_to_matrix(qu: &Quaternion<f64>) -> Matrix3<f64> {
    let (w, x, y, z) = (qu.w, qu.i, qu.j, qu.k);
    let qq = w * w - (x * x + y * y + z * z);
    let mut om = Matrix3::from_diagonal(&Vector3::new(
        qq + 2.0 * x * x,
        qq + 2.0 * y * y,
        qq + 2.0 * z * z,
    ));

    om[(1, 0)] = 2.0 * (y * x + w * z);
    om[(0, 1)] = 2.0 * (x * y - w * z);
    om[(2, 1)] = 2.0 * (z * y + w * x);
    om[(1, 2)] = 2.0 * (y * z - w * x);
    om[(0, 2)] = 2.0 * (x * z + w * y);
    om[(2, 0)] = 2.0 * (z * x - w * y);

    if P > 0.0 {
        om
    } else {
        om.transpose()
    }
}

/// Quaternion to Bunge-Euler angles.
pub fn quaternion_to_euler(qu: &Quaternion<f64>) -> Vector3<f64> {
    let (w, x, y, z) = (qu.w, qu.i, qu.j, qu.k);
    let q03 = w * w + z * z;
    let q12 = x * x + y * y;
    let chi = (q03 * q12).sqrt();

    let eu = if is_zero(chi) {
        // gimbal lock: only the combined first and last angle is defined, Φ is 0 or π
        if is_zero(q12) {
            Vector3::new((-P * 2.0 * w * z).atan2(w * w - z * z), 0.0, 0.0)
        } else {
            Vector3::new((2.0 * x * y).atan2(x * x - y * y), PI, 0.0)
        }
    } else {
        Vector3::new(
            ((-P * w * y + x * z) * chi).atan2((-P * w * x - y * z) * chi),
            (2.0 * chi).atan2(q03 - q12),
            ((P * w * y + x * z) * chi).atan2((-P * w * x + y * z) * chi),
        )
    };

    reduce_euler(eu)
}

/// Quaternion to axis-angle pair. The identity has the axis [0, 0, 1].
pub fn quaternion_to_axis_angle(qu: &Quaternion<f64>) -> Vector4<f64> {
    let v = imaginary(qu);
    if is_zero(v.norm_squared()) {
        Vector4::new(0.0, 0.0, 1.0, 0.0)
    } else if !is_zero(qu.w) {
        let s = qu.w.signum() / v.norm();
        let omega = 2.0 * qu.w.clamp(-1.0, 1.0).acos();
        Vector4::new(v.x * s, v.y * s, v.z * s, omega)
    } else {
        Vector4::new(v.x, v.y, v.z, PI)
    }
}

/// Quaternion to Rodrigues-Frank vector. A half turn has an infinite last component, and the
/// identity is the sentinel (0, 0, P, 0).
pub fn quaternion_to_rodrigues(qu: &Quaternion<f64>) -> Vector4<f64> {
    let v = imaginary(qu);
    if is_zero(qu.w) {
        Vector4::new(v.x, v.y, v.z, f64::INFINITY)
    } else {
        let s = v.norm();
        if is_zero(s) {
            Vector4::new(0.0, 0.0, P, 0.0)
        } else {
            Vector4::new(
                v.x / s,
                v.y / s,
                v.z / s,
                qu.w.clamp(-1.0, 1.0).acos().tan(),
            )
        }
    }
}

/// Quaternion to homochoric vector.
pub fn quaternion_to_homochoric(qu: &Quaternion<f64>) -> Vector3<f64> {
    let omega = 2.0 * qu.w.clamp(-1.0, 1.0).acos();
    if is_zero(omega) {
        Vector3::zeros()
    } else {
        let f = 0.75 * (omega - omega.sin());
        imaginary(qu).normalize() * f.cbrt()
    }
}

/// Quaternion to cubochoric vector.
pub fn quaternion_to_cubochoric(qu: &Quaternion<f64>) -> Vector3<f64> {
    homochoric_to_cubochoric(&quaternion_to_homochoric(qu))
}

// rotation matrix

/// Rotation matrix to quaternion. Goes through the Euler angles, which is better behaved
/// numerically than the direct formulation.
pub fn matrix_to_quaternion(om: &Matrix3<f64>) -> Quaternion<f64> {
    euler_to_quaternion(&matrix_to_euler(om))
}

/// Rotation matrix to Bunge-Euler angles.
pub fn matrix_to_euler(om: &Matrix3<f64>) -> Vector3<f64> {
    let eu = if om[(2, 2)].abs() < 1.0 {
        let zeta = 1.0 / (1.0 - om[(2, 2)] * om[(2, 2)]).sqrt();
        Vector3::new(
            (om[(2, 0)] * zeta).atan2(-om[(2, 1)] * zeta),
            om[(2, 2)].acos(),
            (om[(0, 2)] * zeta).atan2(om[(1, 2)] * zeta),
        )
    } else {
        // Φ is 0 or π; round-off can push |om33| past 1, so pick by sign
        let big_phi = if om[(2, 2)] > 0.0 { 0.0 } else { PI };
        Vector3::new(om[(0, 1)].atan2(om[(0, 0)]), big_phi, 0.0)
    };

    reduce_euler(eu)
}

/// Rotation matrix to axis-angle pair.
pub fn matrix_to_axis_angle(om: &Matrix3<f64>) -> Vector4<f64> {
    quaternion_to_axis_angle(&matrix_to_quaternion(om))
}

// Bunge-Euler angles

/// Bunge-Euler angles to quaternion. The result has a non-negative real part.
pub fn euler_to_quaternion(eu: &Vector3<f64>) -> Quaternion<f64> {
    let ee = eu * 0.5;
    let (s_phi, c_phi) = ee.y.sin_cos();
    let sum = ee.x + ee.z;
    let diff = ee.x - ee.z;
    let qu = Quaternion::new(
        c_phi * sum.cos(),
        -P * s_phi * diff.cos(),
        -P * s_phi * diff.sin(),
        -P * c_phi * sum.sin(),
    );
    if qu.w < 0.0 {
        -qu
    } else {
        qu
    }
}

/// Bunge-Euler angles to rotation matrix.
pub fn euler_to_matrix(eu: &Vector3<f64>) -> Matrix3<f64> {
    let (s0, c0) = eu.x.sin_cos();
    let (s1, c1) = eu.y.sin_cos();
    let (s2, c2) = eu.z.sin_cos();

    let om = Matrix3::new(
        c0 * c2 - s0 * s2 * c1,
        s0 * c2 + c0 * s2 * c1,
        s2 * s1,
        -c0 * s2 - s0 * c2 * c1,
        -s0 * s2 + c0 * c2 * c1,
        c2 * s1,
        s0 * s1,
        -c0 * s1,
        c1,
    );

    om.map(|e| if is_zero(e) { 0.0 } else { e })
}

/// Bunge-Euler angles to axis-angle pair.
pub fn euler_to_axis_angle(eu: &Vector3<f64>) -> Vector4<f64> {
    let t = (eu.y * 0.5).tan();
    let sigma = 0.5 * (eu.x + eu.z);
    let delta = 0.5 * (eu.x - eu.z);
    let tau = t.hypot(sigma.sin());
    let alpha = if is_zero(sigma.cos()) {
        PI
    } else {
        2.0 * (tau / sigma.cos()).atan()
    };

    if is_zero(alpha) {
        Vector4::new(0.0, 0.0, 1.0, 0.0)
    } else {
        // passive rotation, hence the minus sign
        let axis = Vector3::new(t * delta.cos(), t * delta.sin(), sigma.sin()) * (-P / tau);
        let ax = Vector4::new(axis.x, axis.y, axis.z, alpha);
        if alpha < 0.0 {
            -ax
        } else {
            ax
        }
    }
}

// axis-angle pair

/// Axis-angle pair to quaternion.
pub fn axis_angle_to_quaternion(ax: &Vector4<f64>) -> Quaternion<f64> {
    if is_zero(ax.w) {
        Quaternion::identity()
    } else {
        let (s, c) = (ax.w * 0.5).sin_cos();
        Quaternion::new(c, ax.x * s, ax.y * s, ax.z * s)
    }
}

/// Axis-angle pair to rotation matrix.
pub fn axis_angle_to_matrix(ax: &Vector4<f64>) -> Matrix3<f64> {
    let (s, c) = ax.w.sin_cos();
    let omc = 1.0 - c;
    let n = ax.xyz();
    let mut om = Matrix3::from_diagonal(&n.map(|e| e * e * omc + c));

    for [i, j, k] in [[0, 1, 2], [1, 2, 0], [2, 0, 1]] {
        let q = omc * n[i] * n[j];
        om[(i, j)] = q + s * n[k];
        om[(j, i)] = q - s * n[k];
    }

    if P < 0.0 {
        om
    } else {
        om.transpose()
    }
}

/// Axis-angle pair to Bunge-Euler angles.
pub fn axis_angle_to_euler(ax: &Vector4<f64>) -> Vector3<f64> {
    matrix_to_euler(&axis_angle_to_matrix(ax))
}

/// Axis-angle pair to Rodrigues-Frank vector.
pub fn axis_angle_to_rodrigues(ax: &Vector4<f64>) -> Vector4<f64> {
    if is_zero(ax.w) {
        Vector4::new(0.0, 0.0, P, 0.0)
    } else if (ax.w - PI).abs() <= 1.0e-15 {
        Vector4::new(ax.x, ax.y, ax.z, f64::INFINITY)
    } else {
        Vector4::new(ax.x, ax.y, ax.z, (ax.w * 0.5).tan())
    }
}

/// Axis-angle pair to homochoric vector.
pub fn axis_angle_to_homochoric(ax: &Vector4<f64>) -> Vector3<f64> {
    let f = (0.75 * (ax.w - ax.w.sin())).cbrt();
    ax.xyz() * f
}

// Rodrigues-Frank vector

/// Rodrigues-Frank vector to axis-angle pair.
pub fn rodrigues_to_axis_angle(ro: &Vector4<f64>) -> Vector4<f64> {
    let t = ro.w;
    if is_zero(t) {
        Vector4::new(0.0, 0.0, 1.0, 0.0)
    } else if !t.is_finite() {
        Vector4::new(ro.x, ro.y, ro.z, PI)
    } else {
        let axis = ro.xyz().normalize();
        Vector4::new(axis.x, axis.y, axis.z, 2.0 * t.atan())
    }
}

/// Rodrigues-Frank vector to quaternion.
pub fn rodrigues_to_quaternion(ro: &Vector4<f64>) -> Quaternion<f64> {
    axis_angle_to_quaternion(&rodrigues_to_axis_angle(ro))
}

/// Rodrigues-Frank vector to homochoric vector.
pub fn rodrigues_to_homochoric(ro: &Vector4<f64>) -> Vector3<f64> {
    if is_zero(ro.xyz().norm_squared()) {
        Vector3::zeros()
    } else {
        let f = if ro.w.is_finite() {
            let omega = 2.0 * ro.w.atan();
            omega - omega.sin()
        } else {
            PI
        };
        ro.xyz() * (0.75 * f).cbrt()
    }
}

// homochoric vector

/// Homochoric vector to axis-angle pair, inverting the radial rescaling with a 16-term fit.
pub fn homochoric_to_axis_angle(ho: &Vector3<f64>) -> Vector4<f64> {
    let h2 = ho.norm_squared();
    if is_zero(h2) {
        return Vector4::new(0.0, 0.0, 1.0, 0.0);
    }

    let mut hm = h2;
    let mut s = HOMOCHORIC_FIT[0] + HOMOCHORIC_FIT[1] * h2;
    for coef in &HOMOCHORIC_FIT[2..] {
        hm *= h2;
        s += coef * hm;
    }

    let axis = ho / h2.sqrt();
    Vector4::new(axis.x, axis.y, axis.z, 2.0 * s.clamp(-1.0, 1.0).acos())
}

/// Homochoric vector to quaternion.
pub fn homochoric_to_quaternion(ho: &Vector3<f64>) -> Quaternion<f64> {
    axis_angle_to_quaternion(&homochoric_to_axis_angle(ho))
}

/// Homochoric vector to cubochoric vector.
pub fn homochoric_to_cubochoric(ho: &Vector3<f64>) -> Vector3<f64> {
    ball_to_cube(ho)
}

// cubochoric vector

/// Cubochoric vector to homochoric vector.
pub fn cubochoric_to_homochoric(cu: &Vector3<f64>) -> Vector3<f64> {
    cube_to_ball(cu)
}

/// Cubochoric vector to quaternion.
pub fn cubochoric_to_quaternion(cu: &Vector3<f64>) -> Quaternion<f64> {
    homochoric_to_quaternion(&cubochoric_to_homochoric(cu))
}
