//! The rotational point groups of the crystal systems. Each [`CrystalSystem`] carries an ordered
//! table of symmetry operations, the shape of its fundamental zone in Rodrigues-Frank space, and
//! the standard stereographic triangle used for inverse pole figures.

use std::{f64::consts::FRAC_1_SQRT_2, fmt::Display, str::FromStr};

use approx::AbsDiffEq;
use nalgebra::{Matrix3, Quaternion, Vector3};
use phf::phf_map;
use thiserror::Error;

use crate::{
    algebra::{FiniteGroup, FinitelyGeneratedGroup, Group},
    constants::{SST_DECIMALS, UNIT_TOLERANCE},
    rotation::Rotation,
};

/// √3 / 2, which can't be computed in a constant.
const HALF_SQRT_3: f64 = 0.866_025_403_784_438_6;

const CUBIC_OPERATIONS: [[f64; 4]; 24] = [
    [1.0, 0.0, 0.0, 0.0],
    [0.0, 1.0, 0.0, 0.0],
    [0.0, 0.0, 1.0, 0.0],
    [0.0, 0.0, 0.0, 1.0],
    [0.0, 0.0, FRAC_1_SQRT_2, FRAC_1_SQRT_2],
    [0.0, 0.0, FRAC_1_SQRT_2, -FRAC_1_SQRT_2],
    [0.0, FRAC_1_SQRT_2, 0.0, FRAC_1_SQRT_2],
    [0.0, FRAC_1_SQRT_2, 0.0, -FRAC_1_SQRT_2],
    [0.0, FRAC_1_SQRT_2, -FRAC_1_SQRT_2, 0.0],
    [0.0, -FRAC_1_SQRT_2, -FRAC_1_SQRT_2, 0.0],
    [0.5, 0.5, 0.5, 0.5],
    [-0.5, 0.5, 0.5, 0.5],
    [-0.5, 0.5, 0.5, -0.5],
    [-0.5, 0.5, -0.5, 0.5],
    [-0.5, -0.5, 0.5, 0.5],
    [-0.5, -0.5, 0.5, -0.5],
    [-0.5, -0.5, -0.5, 0.5],
    [-0.5, 0.5, -0.5, -0.5],
    [-FRAC_1_SQRT_2, 0.0, 0.0, FRAC_1_SQRT_2],
    [FRAC_1_SQRT_2, 0.0, 0.0, FRAC_1_SQRT_2],
    [-FRAC_1_SQRT_2, 0.0, FRAC_1_SQRT_2, 0.0],
    [-FRAC_1_SQRT_2, 0.0, -FRAC_1_SQRT_2, 0.0],
    [-FRAC_1_SQRT_2, FRAC_1_SQRT_2, 0.0, 0.0],
    [-FRAC_1_SQRT_2, -FRAC_1_SQRT_2, 0.0, 0.0],
];

const HEXAGONAL_OPERATIONS: [[f64; 4]; 12] = [
    [1.0, 0.0, 0.0, 0.0],
    [-HALF_SQRT_3, 0.0, 0.0, -0.5],
    [0.5, 0.0, 0.0, HALF_SQRT_3],
    [0.0, 0.0, 0.0, 1.0],
    [-0.5, 0.0, 0.0, HALF_SQRT_3],
    [-HALF_SQRT_3, 0.0, 0.0, 0.5],
    [0.0, 1.0, 0.0, 0.0],
    [0.0, -HALF_SQRT_3, 0.5, 0.0],
    [0.0, 0.5, -HALF_SQRT_3, 0.0],
    [0.0, 0.0, 1.0, 0.0],
    [0.0, -0.5, -HALF_SQRT_3, 0.0],
    [0.0, HALF_SQRT_3, 0.5, 0.0],
];

const TETRAGONAL_OPERATIONS: [[f64; 4]; 8] = [
    [1.0, 0.0, 0.0, 0.0],
    [0.0, 1.0, 0.0, 0.0],
    [0.0, 0.0, 1.0, 0.0],
    [0.0, 0.0, 0.0, 1.0],
    [0.0, FRAC_1_SQRT_2, FRAC_1_SQRT_2, 0.0],
    [0.0, -FRAC_1_SQRT_2, FRAC_1_SQRT_2, 0.0],
    [FRAC_1_SQRT_2, 0.0, 0.0, FRAC_1_SQRT_2],
    [-FRAC_1_SQRT_2, 0.0, 0.0, FRAC_1_SQRT_2],
];

const ORTHORHOMBIC_OPERATIONS: [[f64; 4]; 4] = [
    [1.0, 0.0, 0.0, 0.0],
    [0.0, 1.0, 0.0, 0.0],
    [0.0, 0.0, 1.0, 0.0],
    [0.0, 0.0, 0.0, 1.0],
];

const TRICLINIC_OPERATIONS: [[f64; 4]; 1] = [[1.0, 0.0, 0.0, 0.0]];

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SymmetryError {
    #[error("Unknown symmetry class: {0}")]
    UnknownSymmetryClass(String),
    #[error("Symmetry operation {index} out of range for a group of {size}")]
    OperationIndex { index: usize, size: usize },
}

/// A crystal system, identified with the proper rotational point group of its holohedry. The
/// variants are ordered from least to most symmetric.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(test, derive(proptest_derive::Arbitrary))]
pub enum CrystalSystem {
    /// No symmetry beyond the identity.
    #[default]
    Triclinic,
    /// 222
    Orthorhombic,
    /// 422
    Tetragonal,
    /// 622
    Hexagonal,
    /// 432
    Cubic,
}

static SYSTEM_NAMES: phf::Map<&'static str, CrystalSystem> = phf_map! {
    "none" => CrystalSystem::Triclinic,
    "triclinic" => CrystalSystem::Triclinic,
    "orthorhombic" => CrystalSystem::Orthorhombic,
    "tetragonal" => CrystalSystem::Tetragonal,
    "hexagonal" => CrystalSystem::Hexagonal,
    "cubic" => CrystalSystem::Cubic,
};

impl FromStr for CrystalSystem {
    type Err = SymmetryError;

    /// Parses a system name, ignoring case. `none` is an alias of `triclinic`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SYSTEM_NAMES
            .get(s.trim().to_lowercase().as_str())
            .copied()
            .ok_or_else(|| SymmetryError::UnknownSymmetryClass(s.to_owned()))
    }
}

impl Display for CrystalSystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Triclinic => "triclinic",
            Self::Orthorhombic => "orthorhombic",
            Self::Tetragonal => "tetragonal",
            Self::Hexagonal => "hexagonal",
            Self::Cubic => "cubic",
        };
        write!(f, "{}", name)
    }
}

fn round_decimals(x: f64) -> f64 {
    let scale = 10f64.powi(SST_DECIMALS);
    (x * scale).round() / scale
}

impl CrystalSystem {
    fn table(&self) -> &'static [[f64; 4]] {
        match self {
            Self::Triclinic => &TRICLINIC_OPERATIONS,
            Self::Orthorhombic => &ORTHORHOMBIC_OPERATIONS,
            Self::Tetragonal => &TETRAGONAL_OPERATIONS,
            Self::Hexagonal => &HEXAGONAL_OPERATIONS,
            Self::Cubic => &CUBIC_OPERATIONS,
        }
    }

    /// The number of symmetry operations.
    pub fn num_operations(&self) -> usize {
        self.table().len()
    }

    /// The symmetry operations, in their conventional order. The first is always the identity.
    pub fn operations(&self) -> Vec<Rotation> {
        self.table()
            .iter()
            .map(|&[w, x, y, z]| Rotation::new_unchecked(Quaternion::new(w, x, y, z)))
            .collect()
    }

    /// A single symmetry operation.
    pub fn operation(&self, index: usize) -> Result<Rotation, SymmetryError> {
        self.table()
            .get(index)
            .map(|&[w, x, y, z]| Rotation::new_unchecked(Quaternion::new(w, x, y, z)))
            .ok_or(SymmetryError::OperationIndex {
                index,
                size: self.num_operations(),
            })
    }

    /// The symmetry operations at the given indices, in the order given.
    pub fn select_operations(&self, indices: &[usize]) -> Result<Vec<Rotation>, SymmetryError> {
        indices.iter().map(|&i| self.operation(i)).collect()
    }

    /// Whether a Rodrigues-Frank vector lies in the fundamental zone of this system. The zone is
    /// point symmetric around the origin.
    pub fn in_fundamental_zone(&self, rodrigues: &Vector3<f64>) -> bool {
        if *self == Self::Triclinic {
            return true;
        }
        if rodrigues.iter().any(|r| !r.is_finite()) {
            return false;
        }

        let r = rodrigues.abs();
        let sqrt_2 = 2f64.sqrt();
        let sqrt_3 = 3f64.sqrt();
        match self {
            Self::Cubic => {
                r.iter().all(|&ri| ri <= sqrt_2 - 1.0) && r.x + r.y + r.z <= 1.0
            }
            Self::Hexagonal => {
                r.iter().all(|&ri| ri <= 1.0)
                    && sqrt_3 * r.x + r.y <= 2.0
                    && sqrt_3 * r.y + r.x <= 2.0
                    && sqrt_3 + r.z <= 2.0
            }
            Self::Tetragonal => {
                r.x <= 1.0 && r.y <= 1.0 && r.x + r.y <= sqrt_2 && r.z + 1.0 <= sqrt_2
            }
            Self::Orthorhombic => r.iter().all(|&ri| ri <= 1.0),
            Self::Triclinic => true,
        }
    }

    /// Whether the Rodrigues-Frank vector of a misorientation lies in the standard stereographic
    /// triangle of this system. See A. Heinz and P. Neumann, Acta Cryst. A 47 (1991) 780.
    pub fn in_disorientation_sst(&self, rodrigues: &Vector3<f64>) -> bool {
        let r = rodrigues;
        match self {
            Self::Cubic => r.x >= r.y && r.y >= r.z && r.z >= 0.0,
            Self::Hexagonal => r.x >= 3f64.sqrt() * r.y && r.y >= 0.0 && r.z >= 0.0,
            Self::Tetragonal => r.x >= r.y && r.y >= 0.0 && r.z >= 0.0,
            Self::Orthorhombic => r.x >= 0.0 && r.y >= 0.0 && r.z >= 0.0,
            Self::Triclinic => true,
        }
    }

    /// The change of basis into the corners of the standard stereographic triangle, for the
    /// improper and the proper triangle. The rows map onto the red, green and blue corners.
    fn sst_bases(&self) -> Option<(Matrix3<f64>, Matrix3<f64>)> {
        let sqrt_2 = 2f64.sqrt();
        let sqrt_3 = 3f64.sqrt();
        match self {
            Self::Cubic => Some((
                Matrix3::new(-1.0, 0.0, 1.0, sqrt_2, -sqrt_2, 0.0, 0.0, sqrt_3, 0.0),
                Matrix3::new(0.0, -1.0, 1.0, -sqrt_2, sqrt_2, 0.0, sqrt_3, 0.0, 0.0),
            )),
            Self::Hexagonal => Some((
                Matrix3::new(0.0, 0.0, 1.0, 1.0, -sqrt_3, 0.0, 0.0, 2.0, 0.0),
                Matrix3::new(0.0, 0.0, 1.0, -1.0, sqrt_3, 0.0, sqrt_3, -1.0, 0.0),
            )),
            Self::Tetragonal => Some((
                Matrix3::new(0.0, 0.0, 1.0, 1.0, -1.0, 0.0, 0.0, sqrt_2, 0.0),
                Matrix3::new(0.0, 0.0, 1.0, -1.0, 1.0, 0.0, sqrt_2, 0.0, 0.0),
            )),
            Self::Orthorhombic => Some((
                Matrix3::new(0.0, 0.0, 1.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0),
                Matrix3::new(0.0, 0.0, 1.0, -1.0, 0.0, 0.0, 0.0, 1.0, 0.0),
            )),
            Self::Triclinic => None,
        }
    }

    /// Whether a vector lies in the standard stereographic triangle. With `proper`, only vectors
    /// with z >= 0 are considered, so the two neighboring triangles are both tested; otherwise the
    /// sign of z is ignored.
    pub fn in_sst(&self, vector: &Vector3<f64>, proper: bool) -> bool {
        self.sst_color(vector, proper).0
    }

    /// Like [`Self::in_sst`], but also returns the inverse pole figure color of the vector. The
    /// color is black outside the triangle and for triclinic crystals.
    pub fn sst_color(&self, vector: &Vector3<f64>, proper: bool) -> (bool, Vector3<f64>) {
        let Some((improper_basis, proper_basis)) = self.sst_bases() else {
            return (true, Vector3::zeros());
        };

        let components = |basis: &Matrix3<f64>, v: &Vector3<f64>| (basis * v).map(round_decimals);
        let inside = |c: &Vector3<f64>| c.iter().all(|&ci| ci >= 0.0);

        let (in_sst, c) = if proper {
            let c = components(&improper_basis, vector);
            if inside(&c) {
                (true, c)
            } else {
                let c = components(&proper_basis, vector);
                (inside(&c), c)
            }
        } else {
            // z projects identically for positive and negative values
            let v = Vector3::new(vector.x, vector.y, vector.z.abs());
            let c = components(&improper_basis, &v);
            (inside(&c), c)
        };

        let norm = c.norm();
        let rgb = if in_sst && norm > 0.0 {
            // the square root smoothens the color ramps
            let rgb = (c / norm).map(|ci| ci.sqrt().min(1.0));
            rgb / rgb.max()
        } else {
            Vector3::zeros()
        };

        (in_sst, rgb)
    }
}

impl Group<Rotation> for CrystalSystem {
    fn identity(&self) -> Rotation {
        Rotation::identity()
    }

    fn inv(&self, element: &Rotation) -> Rotation {
        element.inverse()
    }

    fn compose(&self, a: &Rotation, b: &Rotation) -> Rotation {
        *a * *b
    }

    fn equiv(&self, a: &Rotation, b: &Rotation) -> bool {
        a.abs_diff_eq(b, UNIT_TOLERANCE)
    }

    fn residue(&self, el: &Rotation) -> Rotation {
        el.standardized()
    }
}

impl FinitelyGeneratedGroup<Rotation> for CrystalSystem {
    type Generators = Vec<Rotation>;

    fn generators(&self) -> Self::Generators {
        let fourfold_z = [FRAC_1_SQRT_2, 0.0, 0.0, FRAC_1_SQRT_2];
        let twofold_x = [0.0, 1.0, 0.0, 0.0];
        let gens = match self {
            Self::Triclinic => vec![],
            Self::Orthorhombic => vec![twofold_x, [0.0, 0.0, 1.0, 0.0]],
            Self::Tetragonal => vec![fourfold_z, twofold_x],
            Self::Hexagonal => vec![[HALF_SQRT_3, 0.0, 0.0, 0.5], twofold_x],
            // threefold about [111]
            Self::Cubic => vec![fourfold_z, [0.5, 0.5, 0.5, 0.5]],
        };
        gens.into_iter()
            .map(|[w, x, y, z]| Rotation::new_unchecked(Quaternion::new(w, x, y, z)))
            .collect()
    }
}

impl FiniteGroup<Rotation> for CrystalSystem {
    type Elements = Vec<Rotation>;

    fn elements(&self) -> Self::Elements {
        self.operations()
    }
}
