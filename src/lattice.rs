//! Bravais lattices and the orientation relationships between them. A [`BravaisLattice`] fixes the
//! crystal system, and so the symmetry, of an orientation. The relationships describe which planes
//! and directions of a parent phase stay parallel to which of a product phase during a
//! transformation, e.g., austenite (fcc) to martensite (bcc) in steels.

use std::{fmt::Display, str::FromStr};

use nalgebra::{Matrix3, Vector3};
use phf::phf_map;
use thiserror::Error;

use crate::{
    rotation::{Rotation, RotationError},
    symmetry::CrystalSystem,
};

#[derive(Debug, Error, Clone, PartialEq)]
pub enum LatticeError {
    #[error("Unknown Bravais lattice: {0}")]
    UnknownLattice(String),
    #[error("Orientation relationship \"{0}\" is unknown")]
    UnknownOrientationRelationship(String),
    #[error("Relationship \"{relationship}\" not supported for lattice \"{lattice}\"")]
    UnsupportedLatticeForRelationship {
        relationship: Relationship,
        lattice: BravaisLattice,
    },
    #[error("Invalid relationship rotation: {0}")]
    Rotation(#[from] RotationError),
}

/// The Bravais lattices orientations can live on.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(test, derive(proptest_derive::Arbitrary))]
pub enum BravaisLattice {
    Triclinic,
    /// Body-centered tetragonal.
    Bct,
    /// Hexagonal.
    Hex,
    /// Face-centered cubic.
    Fcc,
    /// Body-centered cubic.
    Bcc,
}

static LATTICE_NAMES: phf::Map<&'static str, BravaisLattice> = phf_map! {
    "triclinic" => BravaisLattice::Triclinic,
    "bct" => BravaisLattice::Bct,
    "hex" => BravaisLattice::Hex,
    "fcc" => BravaisLattice::Fcc,
    "bcc" => BravaisLattice::Bcc,
};

impl FromStr for BravaisLattice {
    type Err = LatticeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LATTICE_NAMES
            .get(s.trim().to_lowercase().as_str())
            .copied()
            .ok_or_else(|| LatticeError::UnknownLattice(s.to_owned()))
    }
}

impl Display for BravaisLattice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Triclinic => "triclinic",
            Self::Bct => "bct",
            Self::Hex => "hex",
            Self::Fcc => "fcc",
            Self::Bcc => "bcc",
        };
        write!(f, "{}", name)
    }
}

/// A named orientation relationship between fcc and bcc.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(test, derive(proptest_derive::Arbitrary))]
pub enum Relationship {
    /// Kurdjumov-Sachs, from S. Morito et al., J. Alloys Compd. 577 (2013) s587. Also see
    /// K. Kitahara et al., Acta Mater. 54 (2006) 1279.
    KurdjumovSachs,
    /// Greninger-Troiano, from Y. He et al., J. Appl. Cryst. 39 (2006) 72.
    GreningerTroiano,
    /// Greninger-Troiano', from Y. He et al., J. Appl. Cryst. 39 (2006) 72.
    GreningerTroianoPrime,
    /// Nishiyama-Wassermann, from H. Kitahara et al., Mater. Charact. 54 (2005) 378.
    NishiyamaWassermann,
    /// Pitsch, from Y. He et al., Acta Mater. 53 (2005) 1179.
    Pitsch,
    /// Bain, from Y. He et al., J. Appl. Cryst. 39 (2006) 72.
    Bain,
}

static RELATIONSHIP_NAMES: phf::Map<&'static str, Relationship> = phf_map! {
    "KS" => Relationship::KurdjumovSachs,
    "GT" => Relationship::GreningerTroiano,
    "GT_prime" => Relationship::GreningerTroianoPrime,
    "NW" => Relationship::NishiyamaWassermann,
    "Pitsch" => Relationship::Pitsch,
    "Bain" => Relationship::Bain,
};

impl FromStr for Relationship {
    type Err = LatticeError;

    /// Parses the short name of a relationship. Names are case sensitive.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RELATIONSHIP_NAMES
            .get(s)
            .copied()
            .ok_or_else(|| LatticeError::UnknownOrientationRelationship(s.to_owned()))
    }
}

impl Display for Relationship {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::KurdjumovSachs => "KS",
            Self::GreningerTroiano => "GT",
            Self::GreningerTroianoPrime => "GT_prime",
            Self::NishiyamaWassermann => "NW",
            Self::Pitsch => "Pitsch",
            Self::Bain => "Bain",
        };
        write!(f, "{}", name)
    }
}

/// Integer indices of a plane normal or a direction.
type Miller = [i32; 3];

// Each row is [fcc plane, bcc plane, fcc direction, bcc direction]. Each plane contains its
// direction.

const KURDJUMOV_SACHS: [[Miller; 4]; 24] = [
    [[1, 1, 1], [0, 1, 1], [-1, 0, 1], [-1, -1, 1]],
    [[1, 1, 1], [0, 1, 1], [-1, 0, 1], [-1, 1, -1]],
    [[1, 1, 1], [0, 1, 1], [0, 1, -1], [-1, -1, 1]],
    [[1, 1, 1], [0, 1, 1], [0, 1, -1], [-1, 1, -1]],
    [[1, 1, 1], [0, 1, 1], [1, -1, 0], [-1, -1, 1]],
    [[1, 1, 1], [0, 1, 1], [1, -1, 0], [-1, 1, -1]],
    [[1, -1, 1], [0, 1, 1], [1, 0, -1], [-1, -1, 1]],
    [[1, -1, 1], [0, 1, 1], [1, 0, -1], [-1, 1, -1]],
    [[1, -1, 1], [0, 1, 1], [-1, -1, 0], [-1, -1, 1]],
    [[1, -1, 1], [0, 1, 1], [-1, -1, 0], [-1, 1, -1]],
    [[1, -1, 1], [0, 1, 1], [0, 1, 1], [-1, -1, 1]],
    [[1, -1, 1], [0, 1, 1], [0, 1, 1], [-1, 1, -1]],
    [[-1, 1, 1], [0, 1, 1], [0, -1, 1], [-1, -1, 1]],
    [[-1, 1, 1], [0, 1, 1], [0, -1, 1], [-1, 1, -1]],
    [[-1, 1, 1], [0, 1, 1], [-1, 0, -1], [-1, -1, 1]],
    [[-1, 1, 1], [0, 1, 1], [-1, 0, -1], [-1, 1, -1]],
    [[-1, 1, 1], [0, 1, 1], [1, 1, 0], [-1, -1, 1]],
    [[-1, 1, 1], [0, 1, 1], [1, 1, 0], [-1, 1, -1]],
    [[1, 1, -1], [0, 1, 1], [-1, 1, 0], [-1, -1, 1]],
    [[1, 1, -1], [0, 1, 1], [-1, 1, 0], [-1, 1, -1]],
    [[1, 1, -1], [0, 1, 1], [0, -1, -1], [-1, -1, 1]],
    [[1, 1, -1], [0, 1, 1], [0, -1, -1], [-1, 1, -1]],
    [[1, 1, -1], [0, 1, 1], [1, 0, 1], [-1, -1, 1]],
    [[1, 1, -1], [0, 1, 1], [1, 0, 1], [-1, 1, -1]],
];

const GRENINGER_TROIANO: [[Miller; 4]; 24] = [
    [[1, 1, 1], [1, 0, 1], [-5, -12, 17], [-17, -7, 17]],
    [[1, 1, 1], [1, 1, 0], [17, -5, -12], [17, -17, -7]],
    [[1, 1, 1], [0, 1, 1], [-12, 17, -5], [-7, 17, -17]],
    [[-1, -1, 1], [-1, 0, 1], [5, 12, 17], [17, 7, 17]],
    [[-1, -1, 1], [-1, -1, 0], [-17, 5, -12], [-17, 17, -7]],
    [[-1, -1, 1], [0, -1, 1], [12, -17, -5], [7, -17, -17]],
    [[-1, 1, 1], [-1, 0, 1], [-5, 12, -17], [-17, 7, -17]],
    [[-1, 1, 1], [-1, 1, 0], [17, 5, 12], [17, 17, 7]],
    [[-1, 1, 1], [0, 1, 1], [-12, -17, 5], [-7, -17, 17]],
    [[1, -1, 1], [1, 0, 1], [5, -12, -17], [17, -7, -17]],
    [[1, -1, 1], [1, -1, 0], [-17, -5, 12], [-17, -17, 7]],
    [[1, -1, 1], [0, -1, 1], [12, 17, 5], [7, 17, 17]],
    [[1, 1, 1], [1, 1, 0], [-5, 17, -12], [-17, 17, -7]],
    [[1, 1, 1], [0, 1, 1], [-12, -5, 17], [-7, -17, 17]],
    [[1, 1, 1], [1, 0, 1], [17, -12, -5], [17, -7, -17]],
    [[-1, -1, 1], [-1, -1, 0], [5, -17, -12], [17, -17, -7]],
    [[-1, -1, 1], [0, -1, 1], [12, 5, 17], [7, 17, 17]],
    [[-1, -1, 1], [-1, 0, 1], [-17, 12, -5], [-17, 7, -17]],
    [[-1, 1, 1], [-1, 1, 0], [-5, -17, 12], [-17, -17, 7]],
    [[-1, 1, 1], [0, 1, 1], [-12, 5, -17], [-7, 17, -17]],
    [[-1, 1, 1], [-1, 0, 1], [17, 12, 5], [17, 7, 17]],
    [[1, -1, 1], [1, -1, 0], [5, 17, 12], [17, 17, 7]],
    [[1, -1, 1], [0, -1, 1], [12, -5, -17], [7, -17, -17]],
    [[1, -1, 1], [1, 0, 1], [-17, -12, 5], [-17, -7, 17]],
];

const GRENINGER_TROIANO_PRIME: [[Miller; 4]; 24] = [
    [[7, 17, 17], [12, 5, 17], [0, 1, -1], [1, 1, -1]],
    [[17, 7, 17], [17, 12, 5], [-1, 0, 1], [-1, 1, 1]],
    [[17, 17, 7], [5, 17, 12], [1, -1, 0], [1, -1, 1]],
    [[-7, -17, 17], [-12, -5, 17], [0, -1, -1], [-1, -1, -1]],
    [[-17, -7, 17], [-17, -12, 5], [1, 0, 1], [1, -1, 1]],
    [[-17, -17, 7], [-5, -17, 12], [1, -1, 0], [1, -1, -1]],
    [[7, -17, -17], [12, -5, -17], [0, 1, -1], [-1, 1, -1]],
    [[17, -7, -17], [17, -12, -5], [1, 0, 1], [1, 1, 1]],
    [[17, -17, -7], [5, -17, -12], [-1, -1, 0], [-1, -1, 1]],
    [[-7, 17, -17], [-12, 5, -17], [0, -1, -1], [1, -1, -1]],
    [[-17, 7, -17], [-17, 12, -5], [-1, 0, 1], [-1, -1, 1]],
    [[-17, 17, -7], [-5, 17, -12], [-1, -1, 0], [-1, -1, -1]],
    [[7, 17, 17], [12, 17, 5], [0, -1, 1], [1, -1, 1]],
    [[17, 7, 17], [5, 12, 17], [1, 0, -1], [1, 1, -1]],
    [[17, 17, 7], [17, 5, 12], [-1, 1, 0], [-1, 1, 1]],
    [[-7, -17, 17], [-12, -17, 5], [0, 1, 1], [-1, 1, 1]],
    [[-17, -7, 17], [-5, -12, 17], [-1, 0, -1], [-1, -1, -1]],
    [[-17, -17, 7], [-17, -5, 12], [-1, 1, 0], [-1, 1, -1]],
    [[7, -17, -17], [12, -17, -5], [0, -1, 1], [-1, -1, 1]],
    [[17, -7, -17], [5, -12, -17], [-1, 0, -1], [-1, 1, -1]],
    [[17, -17, -7], [17, -5, -12], [1, 1, 0], [1, 1, 1]],
    [[-7, 17, -17], [-12, 17, -5], [0, 1, 1], [1, 1, 1]],
    [[-17, 7, -17], [-5, 12, -17], [1, 0, -1], [1, -1, -1]],
    [[-17, 17, -7], [-17, 5, -12], [1, 1, 0], [1, 1, -1]],
];

const NISHIYAMA_WASSERMANN: [[Miller; 4]; 12] = [
    [[1, 1, 1], [0, 1, 1], [2, -1, -1], [0, -1, 1]],
    [[1, 1, 1], [0, 1, 1], [-1, 2, -1], [0, -1, 1]],
    [[1, 1, 1], [0, 1, 1], [-1, -1, 2], [0, -1, 1]],
    [[-1, 1, 1], [0, 1, 1], [-2, -1, -1], [0, -1, 1]],
    [[-1, 1, 1], [0, 1, 1], [1, 2, -1], [0, -1, 1]],
    [[-1, 1, 1], [0, 1, 1], [1, -1, 2], [0, -1, 1]],
    [[1, -1, 1], [0, 1, 1], [2, 1, -1], [0, -1, 1]],
    [[1, -1, 1], [0, 1, 1], [-1, -2, -1], [0, -1, 1]],
    [[1, -1, 1], [0, 1, 1], [-1, 1, 2], [0, -1, 1]],
    [[-1, -1, 1], [0, 1, 1], [2, -1, 1], [0, -1, 1]],
    [[-1, -1, 1], [0, 1, 1], [-1, 2, 1], [0, -1, 1]],
    [[-1, -1, 1], [0, 1, 1], [-1, -1, -2], [0, -1, 1]],
];

const PITSCH: [[Miller; 4]; 12] = [
    [[0, 1, 0], [-1, 0, 1], [1, 0, 1], [1, -1, 1]],
    [[0, 0, 1], [1, -1, 0], [1, 1, 0], [1, 1, -1]],
    [[1, 0, 0], [0, 1, -1], [0, 1, 1], [-1, 1, 1]],
    [[1, 0, 0], [0, -1, -1], [0, 1, -1], [-1, 1, -1]],
    [[0, 1, 0], [-1, 0, -1], [-1, 0, 1], [-1, -1, 1]],
    [[0, 0, 1], [-1, -1, 0], [1, -1, 0], [1, -1, -1]],
    [[0, 1, 0], [-1, 0, -1], [1, 0, -1], [1, -1, -1]],
    [[0, 0, 1], [-1, -1, 0], [-1, 1, 0], [-1, 1, -1]],
    [[1, 0, 0], [0, -1, -1], [0, -1, 1], [-1, -1, 1]],
    [[1, 0, 0], [0, -1, 1], [0, 1, 1], [-1, 1, 1]],
    [[0, 1, 0], [1, 0, -1], [1, 0, 1], [1, -1, 1]],
    [[0, 0, 1], [-1, 1, 0], [1, 1, 0], [1, 1, -1]],
];

const BAIN: [[Miller; 4]; 3] = [
    [[1, 0, 0], [1, 0, 0], [0, 1, 0], [0, 1, 1]],
    [[0, 1, 0], [0, 1, 0], [0, 0, 1], [1, 0, 1]],
    [[0, 0, 1], [0, 0, 1], [1, 0, 0], [1, 1, 0]],
];

/// The rotations relating a lattice to the target lattice of a relationship, one per variant.
#[derive(Debug, Clone, PartialEq)]
pub struct RelationOperations {
    pub target: BravaisLattice,
    pub rotations: Vec<Rotation>,
}

fn miller_to_unit(m: &Miller) -> Vector3<f64> {
    Vector3::new(m[0] as f64, m[1] as f64, m[2] as f64).normalize()
}

/// The orthonormal frame with rows (direction, plane × direction, plane).
fn frame(plane: &Miller, direction: &Miller) -> Matrix3<f64> {
    let n = miller_to_unit(plane);
    let d = miller_to_unit(direction);
    Matrix3::from_rows(&[d.transpose(), n.cross(&d).transpose(), n.transpose()])
}

impl Relationship {
    /// The parallel planes and directions of each variant.
    fn correspondences(&self) -> &'static [[Miller; 4]] {
        match self {
            Self::KurdjumovSachs => &KURDJUMOV_SACHS,
            Self::GreningerTroiano => &GRENINGER_TROIANO,
            Self::GreningerTroianoPrime => &GRENINGER_TROIANO_PRIME,
            Self::NishiyamaWassermann => &NISHIYAMA_WASSERMANN,
            Self::Pitsch => &PITSCH,
            Self::Bain => &BAIN,
        }
    }

    /// The number of variants.
    pub fn num_variants(&self) -> usize {
        self.correspondences().len()
    }

    /// The two lattices the relationship connects. Every relationship here is between fcc and
    /// bcc.
    pub fn lattices(&self) -> [BravaisLattice; 2] {
        [BravaisLattice::Fcc, BravaisLattice::Bcc]
    }
}

impl BravaisLattice {
    /// The crystal system, which determines the symmetry operations.
    pub fn symmetry(&self) -> CrystalSystem {
        match self {
            Self::Triclinic => CrystalSystem::Triclinic,
            Self::Bct => CrystalSystem::Tetragonal,
            Self::Hex => CrystalSystem::Hexagonal,
            Self::Fcc | Self::Bcc => CrystalSystem::Cubic,
        }
    }

    /// The c/a ratio, where it is fixed by the lattice.
    pub fn c_over_a(&self) -> Option<f64> {
        match self {
            Self::Fcc | Self::Bcc => Some(1.0),
            _ => None,
        }
    }

    /// The rotations that take an orientation on this lattice to the orientations of each variant
    /// of a relationship on the target lattice.
    pub fn relation_operations(
        &self,
        relationship: Relationship,
    ) -> Result<RelationOperations, LatticeError> {
        let lattices = relationship.lattices();
        let mine = lattices.iter().position(|l| l == self).ok_or(
            LatticeError::UnsupportedLatticeForRelationship {
                relationship,
                lattice: *self,
            },
        )?;
        let other = (mine + 1) % 2;

        let rotations = relationship
            .correspondences()
            .iter()
            .map(|row| {
                let my_frame = frame(&row[mine], &row[mine + 2]);
                let other_frame = frame(&row[other], &row[other + 2]);
                Rotation::from_matrix(&(other_frame.transpose() * my_frame))
            })
            .collect::<Result<Vec<Rotation>, RotationError>>()?;

        Ok(RelationOperations {
            target: lattices[other],
            rotations,
        })
    }
}
