//! The rotation value type. A [`Rotation`] is a unit quaternion with a non-negative real part,
//! following the conventions of D. Rowenhorst et al., Modelling Simul. Mater. Sci. Eng. 23 (2015)
//! 083501:
//!
//! - coordinate frames are right-handed;
//! - a positive rotation angle is counterclockwise when looking from the tip of the axis towards
//!   the origin;
//! - rotations are passive: a vector `a` expressed in frame A has coordinates `b = R * a` in frame B;
//! - Euler angles follow the Bunge convention with ranges [0, 2π], [0, π], [0, 2π];
//! - the rotation angle lies in [0, π];
//! - the real part of the quaternion is non-negative;
//! - [`P`] = -1.
//!
//! Every constructor validates its input once. After that, conversions never re-check.

use std::{
    f64::consts::{PI, TAU},
    fmt::Display,
    ops::Mul,
};

use approx::AbsDiffEq;
use nalgebra::{Matrix3, Matrix4, Quaternion, Vector3, Vector4};
use rand::Rng;
use thiserror::Error;

use crate::{
    constants::{
        cubochoric_half_edge, homochoric_radius, is_close, P, UNIT_TOLERANCE, ZERO_TOLERANCE,
    },
    conversions::{
        axis_angle_to_quaternion, cubochoric_to_homochoric, euler_to_quaternion,
        homochoric_to_quaternion, matrix_to_quaternion, quaternion_to_axis_angle,
        quaternion_to_cubochoric, quaternion_to_euler, quaternion_to_homochoric,
        quaternion_to_matrix, quaternion_to_rodrigues, rodrigues_to_quaternion,
    },
    units::{to_degrees, to_radians},
};

#[derive(Debug, Error, Clone, PartialEq)]
pub enum RotationError {
    #[error("Quaternion is not of unit length: {0:?}")]
    InvalidQuaternion([f64; 4]),
    #[error("Quaternion has negative real part {0}")]
    NegativeQuaternionReal(f64),
    #[error("Euler angles {0:?} outside of [0, 2π], [0, π], [0, 2π]")]
    InvalidEulerRange([f64; 3]),
    #[error("Rotation axis is not of unit length: {0:?}")]
    InvalidAxis([f64; 3]),
    #[error("Rotation angle {0} outside of [0, π]")]
    InvalidAngleRange(f64),
    #[error("Rodrigues-Frank axis is not of unit length: {0:?}")]
    InvalidRodriguesAxis([f64; 3]),
    #[error("Rodrigues-Frank angle parameter {0} is not positive")]
    NegativeRodriguesAngle(f64),
    #[error("Matrix is not a proper rotation:\n{0}")]
    NotARotationMatrix(Matrix3<f64>),
    #[error("Homochoric vector {0:?} lies outside the ball of radius (3π/4)^(1/3)")]
    HomochoricOutOfRange([f64; 3]),
    #[error("Cubochoric vector {0:?} lies outside the cube of half edge π^(2/3)/2")]
    CubochoricOutOfRange([f64; 3]),
    #[error("Cannot average an empty list of rotations")]
    EmptyAverage,
    #[error("Expected {expected} weights, got {found}")]
    WeightCountMismatch { expected: usize, found: usize },
    #[error("Rotation of fourth order tensors is not implemented")]
    NotImplemented,
}

/// The sign convention of externally supplied rotation data. Everything inside this crate uses
/// [`P`] = -1; data written with P = +1 has the vector part of its quaternion, the axis of its
/// axis-angle pair and Rodrigues vector, and its homochoric vector negated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Convention {
    /// P = -1, the convention used throughout.
    #[default]
    NegativeP,
    /// P = +1.
    PositiveP,
}

impl Convention {
    /// The factor that brings a vector part written in this convention to P = -1.
    fn vector_sign(self) -> f64 {
        match self {
            Self::NegativeP => 1.0,
            Self::PositiveP => -1.0,
        }
    }
}

/// A tensor a rotation can act on.
#[derive(Debug, Clone, PartialEq)]
pub enum Tensor {
    /// A vector.
    First(Vector3<f64>),
    /// A second-order tensor, e.g., stress.
    Second(Matrix3<f64>),
    /// A fourth-order tensor, e.g., stiffness.
    Fourth(Box<[[[[f64; 3]; 3]; 3]; 3]>),
}

/// A rotation, stored as a unit quaternion `(w, x, y, z)` with `w >= 0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rotation {
    quaternion: Quaternion<f64>,
}

impl Default for Rotation {
    fn default() -> Self {
        Self::identity()
    }
}

impl Rotation {
    /// Wraps a quaternion that is already known to have unit length, flipping its sign if needed.
    pub(crate) fn new_unchecked(quaternion: Quaternion<f64>) -> Self {
        Self { quaternion }.standardized()
    }

    /// The identity rotation.
    pub fn identity() -> Self {
        Self {
            quaternion: Quaternion::identity(),
        }
    }

    /// Creates a rotation from a unit quaternion `(w, x, y, z)`. A negative real part is an error
    /// unless `accept_homomorph` is set, in which case the quaternion is negated, which describes
    /// the same rotation.
    pub fn from_quaternion(
        quaternion: Quaternion<f64>,
        accept_homomorph: bool,
    ) -> Result<Self, RotationError> {
        Self::from_quaternion_with(quaternion, accept_homomorph, Convention::NegativeP)
    }

    /// [`Rotation::from_quaternion`] for a quaternion written in the given sign convention.
    pub fn from_quaternion_with(
        quaternion: Quaternion<f64>,
        accept_homomorph: bool,
        convention: Convention,
    ) -> Result<Self, RotationError> {
        let quaternion =
            Quaternion::from_parts(quaternion.w, quaternion.imag() * convention.vector_sign());
        let qu = if quaternion.w < 0.0 {
            if accept_homomorph {
                -quaternion
            } else {
                return Err(RotationError::NegativeQuaternionReal(quaternion.w));
            }
        } else {
            quaternion
        };

        if !is_close(qu.norm(), 1.0) {
            return Err(RotationError::InvalidQuaternion([qu.w, qu.i, qu.j, qu.k]));
        }

        Ok(Self { quaternion: qu })
    }

    /// Creates a rotation from an array `[w, x, y, z]`.
    pub fn from_array(wxyz: [f64; 4], accept_homomorph: bool) -> Result<Self, RotationError> {
        let [w, x, y, z] = wxyz;
        Self::from_quaternion(Quaternion::new(w, x, y, z), accept_homomorph)
    }

    /// Creates a rotation from Bunge-Euler angles `(φ1, Φ, φ2)` in radians.
    pub fn from_euler_angles(eulers: &Vector3<f64>) -> Result<Self, RotationError> {
        let full_turn = 0.0..=TAU;
        if !full_turn.contains(&eulers.x)
            || !full_turn.contains(&eulers.z)
            || !(0.0..=PI).contains(&eulers.y)
        {
            return Err(RotationError::InvalidEulerRange([
                eulers.x, eulers.y, eulers.z,
            ]));
        }

        Ok(Self::new_unchecked(euler_to_quaternion(eulers)))
    }

    /// Creates a rotation from Bunge-Euler angles `(φ1, Φ, φ2)` in degrees.
    pub fn from_euler_degrees(eulers: &Vector3<f64>) -> Result<Self, RotationError> {
        Self::from_euler_angles(&eulers.map(to_radians))
    }

    /// Creates a rotation from a unit axis and an angle in radians within [0, π].
    pub fn from_axis_angle(axis: &Vector3<f64>, angle: f64) -> Result<Self, RotationError> {
        Self::from_axis_angle_with(axis, angle, Convention::NegativeP, false)
    }

    /// [`Rotation::from_axis_angle`] for an axis written in the given sign convention. With
    /// `normalise`, an axis of any non-zero length is rescaled instead of rejected.
    pub fn from_axis_angle_with(
        axis: &Vector3<f64>,
        angle: f64,
        convention: Convention,
        normalise: bool,
    ) -> Result<Self, RotationError> {
        let axis = normalised(&(axis * convention.vector_sign()), normalise);
        if !(0.0..=PI).contains(&angle) {
            return Err(RotationError::InvalidAngleRange(angle));
        }
        if !is_close(axis.norm(), 1.0) {
            return Err(RotationError::InvalidAxis([axis.x, axis.y, axis.z]));
        }

        let ax = Vector4::new(axis.x, axis.y, axis.z, angle);
        Ok(Self::new_unchecked(axis_angle_to_quaternion(&ax)))
    }

    /// Creates a rotation from a unit axis and an angle in degrees within [0, 180].
    pub fn from_axis_angle_degrees(axis: &Vector3<f64>, angle: f64) -> Result<Self, RotationError> {
        Self::from_axis_angle(axis, to_radians(angle))
    }

    /// Creates a rotation from a proper orthogonal matrix.
    pub fn from_matrix(om: &Matrix3<f64>) -> Result<Self, RotationError> {
        Self::from_basis(om, true, false)
    }

    /// Creates a rotation from a set of basis vectors, given as the rows of `basis`. If the basis
    /// is not declared `orthonormal`, the closest rotation is found through the singular value
    /// decomposition, discarding any stretch. A `reciprocal` basis is first transformed by its
    /// inverse transpose (scaled by π) and is always orthonormalized.
    pub fn from_basis(
        basis: &Matrix3<f64>,
        orthonormal: bool,
        reciprocal: bool,
    ) -> Result<Self, RotationError> {
        let (om, orthonormal) = if reciprocal {
            let direct = (basis.transpose() / PI)
                .try_inverse()
                .ok_or(RotationError::NotARotationMatrix(*basis))?;
            // a reciprocal basis contains stretch
            (direct, false)
        } else {
            (*basis, orthonormal)
        };

        let om = if orthonormal {
            om
        } else {
            let svd = om.svd(true, true);
            // a rank-deficient basis has no unique closest rotation
            let s = svd.singular_values;
            if !(s.min() > ZERO_TOLERANCE * s.max()) {
                return Err(RotationError::NotARotationMatrix(om));
            }
            match (svd.u, svd.v_t) {
                (Some(u), Some(v_t)) => u * v_t,
                _ => return Err(RotationError::NotARotationMatrix(om)),
            }
        };

        let orthogonal = [(0, 1), (1, 2), (2, 0)]
            .iter()
            .all(|&(i, j)| is_close(om.row(i).dot(&om.row(j)), 0.0));
        if !is_close(om.determinant(), 1.0) || !orthogonal {
            return Err(RotationError::NotARotationMatrix(om));
        }

        Ok(Self::new_unchecked(matrix_to_quaternion(&om)))
    }

    /// Creates a rotation from a unit axis and the Rodrigues-Frank parameter tan(ω/2), which may be
    /// infinite for a half turn.
    pub fn from_rodrigues(axis: &Vector3<f64>, tan_half_angle: f64) -> Result<Self, RotationError> {
        Self::from_rodrigues_with(axis, tan_half_angle, Convention::NegativeP, false)
    }

    /// [`Rotation::from_rodrigues`] for an axis written in the given sign convention. With
    /// `normalise`, an axis of any non-zero length is rescaled instead of rejected.
    pub fn from_rodrigues_with(
        axis: &Vector3<f64>,
        tan_half_angle: f64,
        convention: Convention,
        normalise: bool,
    ) -> Result<Self, RotationError> {
        let axis = normalised(&(axis * convention.vector_sign()), normalise);
        if !is_close(axis.norm(), 1.0) {
            return Err(RotationError::InvalidRodriguesAxis([axis.x, axis.y, axis.z]));
        }
        if !(tan_half_angle >= 0.0) {
            return Err(RotationError::NegativeRodriguesAngle(tan_half_angle));
        }

        let ro = Vector4::new(axis.x, axis.y, axis.z, tan_half_angle);
        Ok(Self::new_unchecked(rodrigues_to_quaternion(&ro)))
    }

    /// Creates a rotation from a homochoric vector.
    pub fn from_homochoric(ho: &Vector3<f64>) -> Result<Self, RotationError> {
        Self::from_homochoric_with(ho, Convention::NegativeP)
    }

    /// [`Rotation::from_homochoric`] for a vector written in the given sign convention.
    pub fn from_homochoric_with(
        ho: &Vector3<f64>,
        convention: Convention,
    ) -> Result<Self, RotationError> {
        let radius = ho.norm();
        if !(radius <= homochoric_radius() || is_close(radius, homochoric_radius())) {
            return Err(RotationError::HomochoricOutOfRange([ho.x, ho.y, ho.z]));
        }

        Ok(Self::new_unchecked(homochoric_to_quaternion(
            &(ho * convention.vector_sign()),
        )))
    }

    /// Creates a rotation from a cubochoric vector.
    pub fn from_cubochoric(cu: &Vector3<f64>) -> Result<Self, RotationError> {
        Self::from_cubochoric_with(cu, Convention::NegativeP)
    }

    /// [`Rotation::from_cubochoric`] for a vector written in the given sign convention.
    pub fn from_cubochoric_with(
        cu: &Vector3<f64>,
        convention: Convention,
    ) -> Result<Self, RotationError> {
        let extent = cu.amax();
        if !(extent <= cubochoric_half_edge() || is_close(extent, cubochoric_half_edge())) {
            return Err(RotationError::CubochoricOutOfRange([cu.x, cu.y, cu.z]));
        }

        let ho = cubochoric_to_homochoric(cu) * convention.vector_sign();
        Ok(Self::new_unchecked(homochoric_to_quaternion(&ho)))
    }

    /// The (weighted) average rotation: the eigenvector of Σ wᵢ qᵢ⊗qᵢ with the largest eigenvalue.
    /// See F. L. Markley et al., J. Guid. Control Dyn. 30 (2007) 1193.
    pub fn from_average(
        rotations: &[Rotation],
        weights: Option<&[f64]>,
    ) -> Result<Self, RotationError> {
        if rotations.is_empty() {
            return Err(RotationError::EmptyAverage);
        }
        if let Some(w) = weights {
            if w.len() != rotations.len() {
                return Err(RotationError::WeightCountMismatch {
                    expected: rotations.len(),
                    found: w.len(),
                });
            }
        }

        Self::from_quaternion(markley_average(rotations, weights), true)
    }

    /// A uniformly distributed random rotation, using Shoemake's algorithm.
    pub fn from_random<R: Rng>(rng: &mut R) -> Self {
        let r: [f64; 3] = [rng.random(), rng.random(), rng.random()];
        let a = r[2].sqrt();
        let b = (1.0 - r[2]).sqrt();
        let (s0, c0) = (TAU * r[0]).sin_cos();
        let (s1, c1) = (TAU * r[1]).sin_cos();
        Self::new_unchecked(Quaternion::new(c0 * a, s1 * b, c1 * b, s0 * a))
    }

    /// A uniformly distributed random rotation from the thread-local generator.
    pub fn random() -> Self {
        Self::from_random(&mut rand::rng())
    }
}

impl Rotation {
    /// The unit quaternion.
    pub fn as_quaternion(&self) -> Quaternion<f64> {
        self.quaternion
    }

    /// The quaternion as `[w, x, y, z]`.
    pub fn as_array(&self) -> [f64; 4] {
        let q = self.quaternion;
        [q.w, q.i, q.j, q.k]
    }

    /// Bunge-Euler angles `(φ1, Φ, φ2)` in radians.
    pub fn as_euler_angles(&self) -> Vector3<f64> {
        quaternion_to_euler(&self.quaternion)
    }

    /// Bunge-Euler angles `(φ1, Φ, φ2)` in degrees.
    pub fn as_euler_degrees(&self) -> Vector3<f64> {
        self.as_euler_angles().map(to_degrees)
    }

    /// Axis-angle pair `(n1, n2, n3, ω)`, ω in radians.
    pub fn as_axis_angle(&self) -> Vector4<f64> {
        quaternion_to_axis_angle(&self.quaternion)
    }

    /// Axis-angle pair `(n1, n2, n3, ω)`, ω in degrees.
    pub fn as_axis_angle_degrees(&self) -> Vector4<f64> {
        let mut ax = self.as_axis_angle();
        ax.w = to_degrees(ax.w);
        ax
    }

    /// The rotation angle in radians, within [0, π].
    pub fn angle(&self) -> f64 {
        self.as_axis_angle().w
    }

    /// The rotation matrix.
    pub fn as_matrix(&self) -> Matrix3<f64> {
        quaternion_to_matrix(&self.quaternion)
    }

    /// Rodrigues-Frank parameters `(n1, n2, n3, tan(ω/2))`.
    pub fn as_rodrigues(&self) -> Vector4<f64> {
        quaternion_to_rodrigues(&self.quaternion)
    }

    /// The Rodrigues-Frank vector, the axis scaled by tan(ω/2). Components along which the axis
    /// has no extent stay zero for half turns instead of becoming NaN.
    pub fn as_rodrigues_vector(&self) -> Vector3<f64> {
        let ro = self.as_rodrigues();
        ro.xyz().map(|n| if n == 0.0 { 0.0 } else { n * ro.w })
    }

    /// The homochoric vector.
    pub fn as_homochoric(&self) -> Vector3<f64> {
        quaternion_to_homochoric(&self.quaternion)
    }

    /// The cubochoric vector.
    pub fn as_cubochoric(&self) -> Vector3<f64> {
        quaternion_to_cubochoric(&self.quaternion)
    }

    /// The outer product q⊗q of `(w, x, y, z)` with itself, the summand of the average.
    pub fn as_m(&self) -> Matrix4<f64> {
        let [w, x, y, z] = self.as_array();
        let v = Vector4::new(w, x, y, z);
        v * v.transpose()
    }
}

impl Rotation {
    /// The inverse (backward) rotation.
    pub fn inverse(&self) -> Self {
        Self {
            quaternion: self.quaternion.conjugate(),
        }
    }

    /// The same rotation, represented with a non-negative real part.
    pub fn standardized(&self) -> Self {
        if self.quaternion.w < 0.0 {
            Self {
                quaternion: -self.quaternion,
            }
        } else {
            *self
        }
    }

    /// The misorientation from this rotation to `other`.
    pub fn misorientation(&self, other: &Rotation) -> Self {
        *other * self.inverse()
    }

    /// The average of this rotation and `other`.
    pub fn average(&self, other: &Rotation) -> Self {
        Self::new_unchecked(markley_average(&[*self, *other], None))
    }

    /// Rotates a tensor. Vectors and second-order tensors are supported.
    pub fn rotate(&self, tensor: &Tensor) -> Result<Tensor, RotationError> {
        match tensor {
            Tensor::First(v) => Ok(Tensor::First(*self * *v)),
            Tensor::Second(m) => Ok(Tensor::Second(*self * *m)),
            Tensor::Fourth(_) => Err(RotationError::NotImplemented),
        }
    }
}

/// Rescales `axis` to unit length if asked to. A zero axis turns into NaN and fails validation.
fn normalised(axis: &Vector3<f64>, normalise: bool) -> Vector3<f64> {
    if normalise {
        axis / axis.norm()
    } else {
        *axis
    }
}

/// The eigenvector of Σ wᵢ qᵢ⊗qᵢ with the largest eigenvalue. `weights`, if given, must match
/// `rotations` in length.
fn markley_average(rotations: &[Rotation], weights: Option<&[f64]>) -> Quaternion<f64> {
    let m: Matrix4<f64> = rotations
        .iter()
        .enumerate()
        .map(|(i, r)| r.as_m() * weights.map_or(1.0, |w| w[i]))
        .sum();
    let eigen = (m / rotations.len() as f64).symmetric_eigen();
    let q = eigen.eigenvectors.column(eigen.eigenvalues.imax());
    Quaternion::new(q[0], q[1], q[2], q[3])
}

impl Mul for Rotation {
    type Output = Self;

    /// Composes two rotations. The result is standardized again, since the product of two
    /// standardized quaternions can have a negative real part.
    fn mul(self, rhs: Rotation) -> Self::Output {
        let (a, b) = (self.quaternion, rhs.quaternion);
        let (pa, pb) = (a.imag(), b.imag());
        let w = a.w * b.w - pa.dot(&pb);
        let v = pb * a.w + pa * b.w + pa.cross(&pb) * P;
        Self::new_unchecked(Quaternion::from_parts(w, v))
    }
}

impl Mul<Vector3<f64>> for Rotation {
    type Output = Vector3<f64>;

    /// Rotates a vector using the quaternion directly, without building a matrix.
    fn mul(self, v: Vector3<f64>) -> Self::Output {
        let q = self.quaternion;
        let p = q.imag();
        let a = q.w * q.w - p.dot(&p);
        let b = 2.0 * p.dot(&v);
        let c = 2.0 * P * q.w;
        v * a + p * b + p.cross(&v) * c
    }
}

impl Mul<Matrix3<f64>> for Rotation {
    type Output = Matrix3<f64>;

    /// Rotates a second-order tensor: R M Rᵗ.
    fn mul(self, m: Matrix3<f64>) -> Self::Output {
        let r = self.as_matrix();
        r * m * r.transpose()
    }
}

impl AbsDiffEq for Rotation {
    type Epsilon = f64;

    fn default_epsilon() -> Self::Epsilon {
        UNIT_TOLERANCE
    }

    /// Two rotations are equal if their quaternions agree up to global sign.
    fn abs_diff_eq(&self, other: &Self, epsilon: Self::Epsilon) -> bool {
        let (a, b) = (self.quaternion.coords, other.quaternion.coords);
        a.abs_diff_eq(&b, epsilon) || a.abs_diff_eq(&(-b), epsilon)
    }
}

impl Display for Rotation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let [w, x, y, z] = self.as_array();
        let eu = self.as_euler_degrees();
        writeln!(
            f,
            "Quaternion: (real={:.3}, imag=<{:+.3}, {:+.3}, {:+.3}>)",
            w, x, y, z
        )?;
        write!(f, "Matrix:{}", self.as_matrix())?;
        write!(
            f,
            "Bunge Eulers / deg: ({:3.2}, {:3.2}, {:3.2})",
            eu.x, eu.y, eu.z
        )
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use std::f64::consts::FRAC_PI_2;

    prop_compose! {
        /// Uniformly distributed rotations from a seeded generator.
        pub(crate) fn arb_rotation()(seed in any::<u64>()) -> Rotation {
            Rotation::from_random(&mut ChaCha8Rng::seed_from_u64(seed))
        }
    }

    #[test]
    fn test_literal_cases() {
        let id = Rotation::identity();
        assert_eq!(
            Rotation::from_euler_angles(&Vector3::zeros()).unwrap().as_array(),
            [1.0, 0.0, 0.0, 0.0]
        );
        assert_eq!(
            Rotation::from_axis_angle(&Vector3::z(), 0.0).unwrap().as_array(),
            [1.0, 0.0, 0.0, 0.0]
        );
        assert_abs_diff_eq!(Rotation::from_matrix(&Matrix3::identity()).unwrap(), id);
        assert_eq!(
            Rotation::from_matrix(&Matrix3::identity()).unwrap().as_array()[0],
            1.0
        );

        let ro = Rotation::from_rodrigues(&Vector3::z(), 1.0).unwrap();
        let ax = Rotation::from_axis_angle(&Vector3::z(), FRAC_PI_2).unwrap();
        assert_abs_diff_eq!(ro.angle(), FRAC_PI_2, epsilon = 1e-12);
        assert_abs_diff_eq!(ro, ax, epsilon = 1e-12);
        assert_abs_diff_eq!(
            ro.as_axis_angle(),
            Vector4::new(0.0, 0.0, 1.0, FRAC_PI_2),
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_degrees() {
        let r = Rotation::from_euler_degrees(&Vector3::new(90.0, 0.0, 0.0)).unwrap();
        assert_abs_diff_eq!(
            r.as_euler_degrees(),
            Vector3::new(90.0, 0.0, 0.0),
            epsilon = 1e-9
        );
        let r = Rotation::from_axis_angle_degrees(&Vector3::x(), 180.0).unwrap();
        assert_abs_diff_eq!(r.as_axis_angle_degrees().w, 180.0, epsilon = 1e-9);
    }

    #[test]
    fn test_invalid_inputs() {
        assert_eq!(
            Rotation::from_array([-1.0, 0.0, 0.0, 0.0], false),
            Err(RotationError::NegativeQuaternionReal(-1.0))
        );
        assert_abs_diff_eq!(
            Rotation::from_array([-1.0, 0.0, 0.0, 0.0], true).unwrap(),
            Rotation::identity()
        );
        assert!(matches!(
            Rotation::from_array([1.0, 1.0, 0.0, 0.0], false),
            Err(RotationError::InvalidQuaternion(_))
        ));
        assert!(matches!(
            Rotation::from_euler_angles(&Vector3::new(0.0, 4.0, 0.0)),
            Err(RotationError::InvalidEulerRange(_))
        ));
        assert!(matches!(
            Rotation::from_euler_angles(&Vector3::new(-0.1, 0.0, 0.0)),
            Err(RotationError::InvalidEulerRange(_))
        ));
        assert!(matches!(
            Rotation::from_axis_angle(&Vector3::new(1.0, 1.0, 0.0), 1.0),
            Err(RotationError::InvalidAxis(_))
        ));
        assert_eq!(
            Rotation::from_axis_angle(&Vector3::z(), 4.0),
            Err(RotationError::InvalidAngleRange(4.0))
        );
        assert!(matches!(
            Rotation::from_rodrigues(&Vector3::new(0.0, 0.0, 2.0), 1.0),
            Err(RotationError::InvalidRodriguesAxis(_))
        ));
        assert_eq!(
            Rotation::from_rodrigues(&Vector3::z(), -1.0),
            Err(RotationError::NegativeRodriguesAngle(-1.0))
        );
        assert!(matches!(
            Rotation::from_matrix(&Matrix3::from_diagonal(&Vector3::new(1.0, 1.0, -1.0))),
            Err(RotationError::NotARotationMatrix(_))
        ));
        assert!(matches!(
            Rotation::from_matrix(&(Matrix3::identity() * 2.0)),
            Err(RotationError::NotARotationMatrix(_))
        ));
        assert!(matches!(
            Rotation::from_homochoric(&Vector3::new(2.0, 0.0, 0.0)),
            Err(RotationError::HomochoricOutOfRange(_))
        ));
        assert!(matches!(
            Rotation::from_cubochoric(&Vector3::new(0.0, 1.5, 0.0)),
            Err(RotationError::CubochoricOutOfRange(_))
        ));
        assert_eq!(
            Rotation::from_average(&[], None),
            Err(RotationError::EmptyAverage)
        );
        assert_eq!(
            Rotation::from_average(&[Rotation::identity()], Some(&[1.0, 2.0])),
            Err(RotationError::WeightCountMismatch {
                expected: 1,
                found: 2
            })
        );
    }

    #[test]
    fn test_positive_p_input_is_inverse() {
        let q = Quaternion::new(0.8, 0.36, 0.48, 0.0);
        let standard = Rotation::from_quaternion(q, false).unwrap();
        let flipped = Rotation::from_quaternion_with(q, false, Convention::PositiveP).unwrap();
        assert_abs_diff_eq!(flipped, standard.inverse(), epsilon = 1e-12);

        let axis = Vector3::new(0.0, 0.6, 0.8);
        let standard = Rotation::from_axis_angle(&axis, 1.2).unwrap();
        let flipped =
            Rotation::from_axis_angle_with(&axis, 1.2, Convention::PositiveP, false).unwrap();
        assert_abs_diff_eq!(flipped, standard.inverse(), epsilon = 1e-12);

        let standard = Rotation::from_rodrigues(&axis, 0.5).unwrap();
        let flipped =
            Rotation::from_rodrigues_with(&axis, 0.5, Convention::PositiveP, false).unwrap();
        assert_abs_diff_eq!(flipped, standard.inverse(), epsilon = 1e-12);

        let r = Rotation::from_euler_angles(&Vector3::new(0.4, 1.0, 2.0)).unwrap();
        let flipped =
            Rotation::from_homochoric_with(&r.as_homochoric(), Convention::PositiveP).unwrap();
        assert_abs_diff_eq!(flipped, r.inverse(), epsilon = 1e-7);
        let flipped =
            Rotation::from_cubochoric_with(&r.as_cubochoric(), Convention::PositiveP).unwrap();
        assert_abs_diff_eq!(flipped, r.inverse(), epsilon = 1e-7);
    }

    #[test]
    fn test_normalised_axis() {
        let long = Vector3::new(0.0, 0.0, 2.0);
        let expected = Rotation::from_axis_angle(&Vector3::z(), 0.7).unwrap();
        assert!(Rotation::from_axis_angle(&long, 0.7).is_err());
        assert_abs_diff_eq!(
            Rotation::from_axis_angle_with(&long, 0.7, Convention::NegativeP, true).unwrap(),
            expected,
            epsilon = 1e-12
        );

        let expected = Rotation::from_rodrigues(&Vector3::z(), 0.5).unwrap();
        assert_abs_diff_eq!(
            Rotation::from_rodrigues_with(&long, 0.5, Convention::NegativeP, true).unwrap(),
            expected,
            epsilon = 1e-12
        );

        // a zero axis has no direction to keep
        assert!(matches!(
            Rotation::from_axis_angle_with(&Vector3::zeros(), 0.7, Convention::NegativeP, true),
            Err(RotationError::InvalidAxis(_))
        ));
    }

    #[test]
    fn test_rank_deficient_basis() {
        assert!(matches!(
            Rotation::from_basis(&Matrix3::zeros(), false, false),
            Err(RotationError::NotARotationMatrix(_))
        ));
        let flat = Matrix3::from_diagonal(&Vector3::new(1.0, 1.0, 0.0));
        assert!(matches!(
            Rotation::from_basis(&flat, false, false),
            Err(RotationError::NotARotationMatrix(_))
        ));
        assert_abs_diff_eq!(
            Rotation::from_basis(&(Matrix3::identity() * 0.5), false, false).unwrap(),
            Rotation::identity(),
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_half_turn() {
        let r = Rotation::from_axis_angle(&Vector3::y(), PI).unwrap();
        assert!(r.as_rodrigues().w.is_infinite());
        assert_eq!(
            r.as_rodrigues_vector(),
            Vector3::new(0.0, f64::INFINITY, 0.0)
        );
        assert_abs_diff_eq!(
            Rotation::from_rodrigues(&Vector3::y(), f64::INFINITY).unwrap(),
            r
        );
    }

    #[test]
    fn test_basis_orthonormalization() {
        let r = Rotation::from_euler_angles(&Vector3::new(0.4, 1.0, 2.0)).unwrap();
        let stretched = r.as_matrix() * 3.0;
        assert!(Rotation::from_matrix(&stretched).is_err());
        let fixed = Rotation::from_basis(&stretched, false, false).unwrap();
        assert_abs_diff_eq!(fixed, r, epsilon = 1e-9);

        // the reciprocal of π times a rotation matrix is the rotation itself
        let reciprocal = Rotation::from_basis(&(r.as_matrix() * PI), true, true).unwrap();
        assert_abs_diff_eq!(reciprocal, r, epsilon = 1e-9);
    }

    #[test]
    fn test_vector_rotation_matches_matrix() {
        let r = Rotation::from_euler_angles(&Vector3::new(1.0, 0.5, 3.0)).unwrap();
        let v = Vector3::new(0.3, -1.2, 2.0);
        assert_abs_diff_eq!(r * v, r.as_matrix() * v, epsilon = 1e-12);

        // passive: rotating the frame by +90° about z moves x to -y
        let quarter = Rotation::from_axis_angle(&Vector3::z(), FRAC_PI_2).unwrap();
        assert_abs_diff_eq!(quarter * Vector3::x(), -Vector3::y(), epsilon = 1e-12);
    }

    #[test]
    fn test_tensor_rotation() {
        let r = Rotation::from_euler_angles(&Vector3::new(1.0, 0.5, 3.0)).unwrap();
        let Ok(Tensor::Second(m)) = r.rotate(&Tensor::Second(Matrix3::identity())) else {
            panic!("second-order tensors are supported");
        };
        assert_abs_diff_eq!(m, Matrix3::identity(), epsilon = 1e-12);

        let hydrostatic = Matrix3::from_diagonal(&Vector3::new(1.0, 2.0, 3.0));
        assert_abs_diff_eq!((r * hydrostatic).trace(), 6.0, epsilon = 1e-12);

        assert_eq!(
            r.rotate(&Tensor::Fourth(Box::new([[[[0.0; 3]; 3]; 3]; 3]))),
            Err(RotationError::NotImplemented)
        );
    }

    #[test]
    fn test_composition_about_common_axis() {
        let a = Rotation::from_axis_angle(&Vector3::z(), 0.3).unwrap();
        let b = Rotation::from_axis_angle(&Vector3::z(), 0.5).unwrap();
        let ab = a * b;
        assert_abs_diff_eq!(ab.angle(), 0.8, epsilon = 1e-12);
        assert_abs_diff_eq!(ab.as_axis_angle().xyz(), Vector3::z(), epsilon = 1e-12);

        // passing 2π wraps around and must come back standardized
        let c = Rotation::from_axis_angle(&Vector3::z(), 3.0).unwrap();
        let cc = c * c;
        assert!(cc.as_array()[0] >= 0.0);
        assert_abs_diff_eq!(cc.angle(), 2.0 * PI - 6.0, epsilon = 1e-12);
    }

    #[test]
    fn test_average() {
        let a = Rotation::from_axis_angle(&Vector3::z(), 0.2).unwrap();
        let b = Rotation::from_axis_angle(&Vector3::z(), 0.4).unwrap();
        let mid = Rotation::from_axis_angle(&Vector3::z(), 0.3).unwrap();
        assert_abs_diff_eq!(a.average(&b), mid, epsilon = 1e-12);
        assert_abs_diff_eq!(
            a.average(&b),
            Rotation::from_average(&[a, b], None).unwrap(),
            epsilon = 1e-12
        );

        // all the weight on one rotation
        let avg = Rotation::from_average(&[a, b], Some(&[1.0, 0.0])).unwrap();
        assert_abs_diff_eq!(avg, a, epsilon = 1e-12);
    }

    #[test]
    fn test_display() {
        let s = Rotation::identity().to_string();
        assert!(s.starts_with("Quaternion: (real=1.000"));
        assert!(s.contains("Bunge Eulers / deg"));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]
        #[test]
        fn test_random_is_standardized(r in arb_rotation()) {
            prop_assert!(r.as_array()[0] >= 0.0);
            prop_assert!((r.as_quaternion().norm() - 1.0).abs() < 1e-12);
        }

        #[test]
        fn test_matrix_roundtrip(r in arb_rotation()) {
            let back = Rotation::from_matrix(&r.as_matrix()).unwrap();
            prop_assert!(back.abs_diff_eq(&r, 1e-7), "{} != {}", back, r);
        }

        #[test]
        fn test_euler_roundtrip(r in arb_rotation()) {
            let back = Rotation::from_euler_angles(&r.as_euler_angles()).unwrap();
            prop_assert!(back.abs_diff_eq(&r, 1e-7), "{} != {}", back, r);
        }

        #[test]
        fn test_axis_angle_roundtrip(r in arb_rotation()) {
            let ax = r.as_axis_angle();
            let back = Rotation::from_axis_angle(&ax.xyz(), ax.w).unwrap();
            prop_assert!(back.abs_diff_eq(&r, 1e-7), "{} != {}", back, r);
        }

        #[test]
        fn test_rodrigues_roundtrip(r in arb_rotation()) {
            let ro = r.as_rodrigues();
            let back = Rotation::from_rodrigues(&ro.xyz(), ro.w).unwrap();
            prop_assert!(back.abs_diff_eq(&r, 1e-7), "{} != {}", back, r);
        }

        #[test]
        fn test_homochoric_roundtrip(r in arb_rotation()) {
            let back = Rotation::from_homochoric(&r.as_homochoric()).unwrap();
            prop_assert!(back.abs_diff_eq(&r, 1e-7), "{} != {}", back, r);
        }

        #[test]
        fn test_cubochoric_roundtrip(r in arb_rotation()) {
            let back = Rotation::from_cubochoric(&r.as_cubochoric()).unwrap();
            prop_assert!(back.abs_diff_eq(&r, 1e-7), "{} != {}", back, r);
        }

        #[test]
        fn test_associativity(a in arb_rotation(), b in arb_rotation(), c in arb_rotation()) {
            let left = (a * b) * c;
            let right = a * (b * c);
            prop_assert!(left.abs_diff_eq(&right, 1e-12));
        }

        #[test]
        fn test_inverse(r in arb_rotation()) {
            prop_assert!((r * r.inverse()).abs_diff_eq(&Rotation::identity(), 1e-12));
            prop_assert!((r.inverse() * r).abs_diff_eq(&Rotation::identity(), 1e-12));
            prop_assert!(r.misorientation(&r).abs_diff_eq(&Rotation::identity(), 1e-12));
        }

        #[test]
        fn test_composition_matches_matrices(a in arb_rotation(), b in arb_rotation()) {
            // passive rotations compose right to left like their matrices
            let v = Vector3::new(0.2, 0.5, -0.7);
            prop_assert!(((a * b) * v - a * (b * v)).amax() < 1e-12);
            prop_assert!(((a * b).as_matrix() - a.as_matrix() * b.as_matrix()).amax() < 1e-12);
        }

        #[test]
        fn test_single_average(r in arb_rotation()) {
            let avg = Rotation::from_average(&[r], None).unwrap();
            prop_assert!(avg.abs_diff_eq(&r, 1e-9));
        }
    }
}
