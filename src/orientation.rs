//! Crystallographic orientations: a rotation together with the lattice it describes. The lattice
//! symmetry makes many rotations describe the same orientation, so most operations here search
//! over the symmetrically equivalent rotations.

use std::fmt::Display;

use nalgebra::Vector3;
use thiserror::Error;
use tracing::{debug, warn};

use crate::{
    lattice::{BravaisLattice, LatticeError, Relationship},
    rotation::{Rotation, RotationError},
    symmetry::CrystalSystem,
};

#[derive(Debug, Error, Clone, PartialEq)]
pub enum OrientationError {
    #[error("Disorientation between {0} and {1} symmetry is not supported")]
    UnsupportedCrossSymmetryDisorientation(CrystalSystem, CrystalSystem),
    #[error("No symmetrically equivalent misorientation lies in the fundamental zone")]
    DisorientationNotFound,
    #[error("Cannot average an empty list of orientations")]
    EmptyAverage,
    #[error(transparent)]
    Lattice(#[from] LatticeError),
    #[error(transparent)]
    Rotation(#[from] RotationError),
}

/// A crystal orientation: the rotation from the sample frame into the crystal frame of a lattice.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Orientation {
    rotation: Rotation,
    lattice: BravaisLattice,
}

/// The result of a disorientation search, along with where it was found.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Disorientation {
    /// The disorientation, on the lattice of the orientation it was measured from.
    pub orientation: Orientation,
    /// Index of the symmetry operation applied to the first orientation.
    pub own_index: usize,
    /// Index of the symmetry operation applied to the second orientation.
    pub other_index: usize,
    /// Whether the disorientation goes from the first orientation to the second. If false, it is
    /// the inverse, going from the second to the first.
    pub forward: bool,
}

impl Disorientation {
    /// The disorientation angle, in radians.
    pub fn angle(&self) -> f64 {
        self.orientation.rotation.angle()
    }
}

impl Orientation {
    pub fn new(rotation: Rotation, lattice: BravaisLattice) -> Self {
        Self { rotation, lattice }
    }

    pub fn rotation(&self) -> Rotation {
        self.rotation
    }

    pub fn lattice(&self) -> BravaisLattice {
        self.lattice
    }

    pub fn symmetry(&self) -> CrystalSystem {
        self.lattice.symmetry()
    }

    /// The symmetrically equivalent orientations, one per symmetry operation in table order. The
    /// first is this orientation.
    pub fn equivalent(&self) -> Vec<Orientation> {
        self.symmetry()
            .operations()
            .into_iter()
            .map(|op| Self::new(op * self.rotation, self.lattice))
            .collect()
    }

    /// Whether the rotation lies in the fundamental zone of the lattice symmetry.
    pub fn in_fundamental_zone(&self) -> bool {
        self.symmetry()
            .in_fundamental_zone(&self.rotation.as_rodrigues_vector())
    }

    /// The disorientation between this orientation and `other`: the misorientation with the
    /// smallest angle among all symmetrically equivalent pairs. With `use_sst`, the rotation axis
    /// is further restricted to the standard stereographic triangle, which requires trying every
    /// equivalent of this orientation too.
    ///
    /// Both orientations must have the same symmetry. See A. Heinz and P. Neumann, Acta Cryst. A
    /// 47 (1991) 780 for the general case.
    pub fn disorientation(
        &self,
        other: &Orientation,
        use_sst: bool,
    ) -> Result<Disorientation, OrientationError> {
        let symmetry = self.symmetry();
        if symmetry != other.symmetry() {
            return Err(OrientationError::UnsupportedCrossSymmetryDisorientation(
                symmetry,
                other.symmetry(),
            ));
        }

        let mine = self.equivalent();
        let others = other.equivalent();
        let num_own = if use_sst { mine.len() } else { 1 };

        for (i, a) in mine.iter().take(num_own).enumerate() {
            let a_inv = a.rotation.inverse();
            for (j, b) in others.iter().enumerate() {
                let forward_rotation = b.rotation * a_inv;
                for forward in [false, true] {
                    let r = if forward {
                        forward_rotation
                    } else {
                        forward_rotation.inverse()
                    };
                    let ro = r.as_rodrigues_vector();
                    if symmetry.in_fundamental_zone(&ro)
                        && (!use_sst || symmetry.in_disorientation_sst(&ro))
                    {
                        debug!(
                            own_index = i,
                            other_index = j,
                            forward,
                            angle = r.angle(),
                            "found disorientation"
                        );
                        return Ok(Disorientation {
                            orientation: Self::new(r, self.lattice),
                            own_index: i,
                            other_index: j,
                            forward,
                        });
                    }
                }
            }
        }

        Err(OrientationError::DisorientationNotFound)
    }

    /// The symmetrically equivalent orientation in the fundamental zone.
    pub fn reduce(&self) -> Orientation {
        let equivalent = self.equivalent();
        if let Some(o) = equivalent.iter().find(|o| o.in_fundamental_zone()) {
            return *o;
        }

        // only reachable through round-off on the zone boundary
        warn!(
            rotation = ?self.rotation.as_array(),
            lattice = %self.lattice,
            "no equivalent orientation in the fundamental zone, using the last one"
        );
        equivalent.last().copied().unwrap_or(*self)
    }

    /// Reduces a batch of orientations into the fundamental zone. Each orientation should have
    /// exactly one equivalent in the zone; if some have more, the first is taken.
    pub fn reduce_all(orientations: &[Orientation]) -> Vec<Orientation> {
        let candidates: Vec<Vec<Orientation>> = orientations
            .iter()
            .map(|o| {
                o.equivalent()
                    .into_iter()
                    .filter(|e| e.in_fundamental_zone())
                    .collect()
            })
            .collect();

        let ambiguous = candidates.iter().filter(|c| c.len() != 1).count();
        if ambiguous > 0 {
            warn!(
                ambiguous,
                total = orientations.len(),
                "orientations without exactly one equivalent in the fundamental zone"
            );
        }

        candidates
            .iter()
            .zip(orientations)
            .map(|(c, o)| c.first().copied().unwrap_or_else(|| o.reduce()))
            .collect()
    }

    /// The sample axis expressed in the crystal frame. With `use_sst`, the first equivalent
    /// orientation that brings the pole into the standard stereographic triangle is used, and its
    /// index is returned alongside. If none does, the last equivalent is used.
    pub fn inverse_pole(
        &self,
        axis: &Vector3<f64>,
        proper: bool,
        use_sst: bool,
    ) -> (Vector3<f64>, usize) {
        if !use_sst {
            return (self.rotation * *axis, 0);
        }

        let symmetry = self.symmetry();
        let equivalent = self.equivalent();
        let mut last = (self.rotation * *axis, 0);
        for (i, o) in equivalent.iter().enumerate() {
            let pole = o.rotation * *axis;
            if symmetry.in_sst(&pole, proper) {
                return (pole, i);
            }
            last = (pole, i);
        }

        last
    }

    /// The inverse pole figure color of a sample axis, as RGB in [0, 1]. Black if no equivalent
    /// pole falls into the standard stereographic triangle.
    pub fn ipf_color(&self, axis: &Vector3<f64>) -> Vector3<f64> {
        let symmetry = self.symmetry();
        let axis = axis.normalize();
        // highly symmetric orientations put several poles in the triangle; the last one wins
        self.equivalent()
            .iter()
            .filter_map(|o| {
                let (in_sst, color) = symmetry.sst_color(&(o.rotation * axis), false);
                in_sst.then_some(color)
            })
            .last()
            .unwrap_or_else(Vector3::zeros)
    }

    /// The (weighted) average orientation. Every orientation is first replaced by its equivalent
    /// closest to the first one, which also fixes the lattice of the result.
    pub fn average(
        orientations: &[Orientation],
        weights: Option<&[f64]>,
    ) -> Result<Orientation, OrientationError> {
        let reference = orientations.first().ok_or(OrientationError::EmptyAverage)?;

        let closest = orientations
            .iter()
            .map(|o| -> Result<Rotation, OrientationError> {
                let d = reference.disorientation(o, false)?;
                Ok(o.equivalent()[d.other_index].rotation)
            })
            .collect::<Result<Vec<Rotation>, OrientationError>>()?;

        let rotation = Rotation::from_average(&closest, weights)?;
        Ok(Self::new(rotation, reference.lattice))
    }

    /// The average of this orientation and `other`.
    pub fn average_with(&self, other: &Orientation) -> Result<Orientation, OrientationError> {
        Self::average(&[*self, *other], None)
    }

    /// The orientations of every variant of a phase transformation, on the target lattice of the
    /// relationship.
    pub fn related_orientations(
        &self,
        relationship: Relationship,
    ) -> Result<Vec<Orientation>, OrientationError> {
        let ops = self.lattice.relation_operations(relationship)?;
        Ok(ops
            .rotations
            .into_iter()
            .map(|op| Self::new(op * self.rotation, ops.target))
            .collect())
    }
}

impl Display for Orientation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "Bravais lattice {} ({} symmetry)",
            self.lattice,
            self.symmetry()
        )?;
        write!(f, "{}", self.rotation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rotation::tests::arb_rotation;
    use approx::assert_abs_diff_eq;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use std::f64::consts::{FRAC_PI_4, FRAC_PI_6};

    fn cubic(rotation: Rotation) -> Orientation {
        Orientation::new(rotation, BravaisLattice::Fcc)
    }

    #[test]
    fn test_reduce_all_on_zone_boundary() {
        // a 45° turn about [100] sits on a face of the cubic zone, as does its mirror at -45°
        let boundary = cubic(Rotation::from_axis_angle(&Vector3::x(), FRAC_PI_4).unwrap());
        let in_zone: Vec<Orientation> = boundary
            .equivalent()
            .into_iter()
            .filter(|e| e.in_fundamental_zone())
            .collect();
        assert_eq!(in_zone.len(), 2);

        let interior =
            cubic(Rotation::from_euler_angles(&Vector3::new(0.1, 0.2, 0.3)).unwrap());
        let reduced = Orientation::reduce_all(&[boundary, interior]);
        assert_eq!(reduced.len(), 2);
        assert_eq!(reduced[0], boundary.equivalent()[0]);
        assert_eq!(reduced[1], interior.reduce());
        assert!(reduced.iter().all(|o| o.in_fundamental_zone()));
    }

    #[test]
    fn test_equivalent() {
        let r = Rotation::from_euler_angles(&Vector3::new(0.1, 0.2, 0.3)).unwrap();
        let o = cubic(r);
        let eq = o.equivalent();
        assert_eq!(eq.len(), 24);
        assert_eq!(eq[0], o);
        assert!(eq.iter().all(|e| e.lattice() == BravaisLattice::Fcc));

        let hex = Orientation::new(r, BravaisLattice::Hex);
        assert_eq!(hex.equivalent().len(), 12);
        assert_eq!(Orientation::new(r, BravaisLattice::Triclinic).equivalent(), vec![
            Orientation::new(r, BravaisLattice::Triclinic)
        ]);
    }

    #[test]
    fn test_disorientation_of_equivalents_is_identity() {
        let quarter = Rotation::from_axis_angle(&Vector3::z(), std::f64::consts::FRAC_PI_2).unwrap();
        let d = cubic(Rotation::identity())
            .disorientation(&cubic(quarter), true)
            .unwrap();
        assert!(d.angle() < 1e-7, "{}", d.angle());
    }

    #[test]
    fn test_disorientation_literal() {
        let r = Rotation::from_axis_angle(&Vector3::x(), FRAC_PI_6).unwrap();
        let d = cubic(Rotation::identity())
            .disorientation(&cubic(r), true)
            .unwrap();
        assert_eq!((d.own_index, d.other_index, d.forward), (0, 0, true));
        assert_abs_diff_eq!(d.angle(), FRAC_PI_6, epsilon = 1e-12);
        assert_abs_diff_eq!(d.orientation.rotation(), r, epsilon = 1e-12);
        assert_eq!(d.orientation.lattice(), BravaisLattice::Fcc);
    }

    #[test]
    fn test_cross_symmetry_disorientation() {
        let o = cubic(Rotation::identity());
        let h = Orientation::new(Rotation::identity(), BravaisLattice::Hex);
        assert_eq!(
            o.disorientation(&h, true),
            Err(OrientationError::UnsupportedCrossSymmetryDisorientation(
                CrystalSystem::Cubic,
                CrystalSystem::Hexagonal
            ))
        );
        // fcc and bcc share their symmetry
        let b = Orientation::new(Rotation::identity(), BravaisLattice::Bcc);
        assert!(o.disorientation(&b, true).is_ok());
    }

    #[test]
    fn test_inverse_pole() {
        let o = cubic(Rotation::identity());
        assert_eq!(o.inverse_pole(&Vector3::z(), false, true), (Vector3::z(), 0));
        assert_eq!(o.inverse_pole(&Vector3::x(), false, false), (Vector3::x(), 0));

        let (pole, i) = o.inverse_pole(&Vector3::x(), false, true);
        assert!(i > 0);
        assert!(o.symmetry().in_sst(&pole, false));
        assert_abs_diff_eq!(pole.norm(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_ipf_color() {
        let o = cubic(Rotation::identity());
        assert_abs_diff_eq!(
            o.ipf_color(&Vector3::new(0.0, 0.0, 2.0)),
            Vector3::new(1.0, 0.0, 0.0),
            epsilon = 1e-9
        );
        assert_abs_diff_eq!(
            o.ipf_color(&Vector3::new(1.0, 1.0, 1.0)),
            Vector3::new(0.0, 0.0, 1.0),
            epsilon = 1e-9
        );
        let t = Orientation::new(Rotation::identity(), BravaisLattice::Triclinic);
        assert_eq!(t.ipf_color(&Vector3::z()), Vector3::zeros());
    }

    #[test]
    fn test_average_uses_closest_equivalent() {
        let r = Rotation::from_euler_angles(&Vector3::new(0.4, 0.3, 0.2)).unwrap();
        let o = cubic(r);
        let op = o.symmetry().operation(7).unwrap();
        let same = cubic(op * r);
        let avg = Orientation::average(&[o, same], None).unwrap();
        assert_abs_diff_eq!(avg.rotation(), r, epsilon = 1e-9);
        assert_abs_diff_eq!(o.average_with(&same).unwrap().rotation(), r, epsilon = 1e-9);
    }

    #[test]
    fn test_average_errors() {
        assert_eq!(
            Orientation::average(&[], None),
            Err(OrientationError::EmptyAverage)
        );
        let o = cubic(Rotation::identity());
        assert_eq!(
            Orientation::average(&[o], Some(&[1.0, 1.0])),
            Err(OrientationError::Rotation(RotationError::WeightCountMismatch {
                expected: 1,
                found: 2
            }))
        );
    }

    #[test]
    fn test_related_orientations() {
        let r = Rotation::from_euler_angles(&Vector3::new(0.4, 0.3, 0.2)).unwrap();
        let related = cubic(r)
            .related_orientations(Relationship::KurdjumovSachs)
            .unwrap();
        assert_eq!(related.len(), 24);
        assert!(related.iter().all(|o| o.lattice() == BravaisLattice::Bcc));

        let ops = BravaisLattice::Fcc
            .relation_operations(Relationship::KurdjumovSachs)
            .unwrap();
        assert_abs_diff_eq!(related[5].rotation(), ops.rotations[5] * r);

        assert!(matches!(
            Orientation::new(r, BravaisLattice::Hex).related_orientations(Relationship::Bain),
            Err(OrientationError::Lattice(
                LatticeError::UnsupportedLatticeForRelationship { .. }
            ))
        ));
    }

    #[test]
    fn test_display() {
        let s = cubic(Rotation::identity()).to_string();
        assert!(s.starts_with("Bravais lattice fcc (cubic symmetry)\nQuaternion"));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(50))]
        #[test]
        fn test_self_disorientation(
            lattice in any::<BravaisLattice>(),
            r in arb_rotation(),
            use_sst in any::<bool>()
        ) {
            let o = Orientation::new(r, lattice);
            let d = o.disorientation(&o, use_sst).unwrap();
            prop_assert!(d.angle() < 1e-7);
            prop_assert_eq!((d.own_index, d.other_index, d.forward), (0, 0, false));
        }

        #[test]
        fn test_cubic_disorientation_bounds(a in arb_rotation(), b in arb_rotation()) {
            let (oa, ob) = (cubic(a), cubic(b));
            let d = oa.disorientation(&ob, true).unwrap();
            // the largest possible cubic disorientation is 62.8°
            prop_assert!(d.angle() <= 62.81_f64.to_radians());
            prop_assert!(d.angle() <= a.misorientation(&b).angle() + 1e-9);
            prop_assert!(d.orientation.in_fundamental_zone());

            let back = ob.disorientation(&oa, true).unwrap();
            prop_assert!((back.angle() - d.angle()).abs() < 1e-6);
        }

        #[test]
        fn test_reduce(lattice in any::<BravaisLattice>(), r in arb_rotation()) {
            let o = Orientation::new(r, lattice);
            let reduced = o.reduce();
            prop_assert!(reduced.in_fundamental_zone());
            prop_assert!(o.disorientation(&reduced, false).unwrap().angle() < 1e-7);
            prop_assert_eq!(Orientation::reduce_all(&[o]), vec![reduced]);
        }

        #[test]
        fn test_single_average(lattice in any::<BravaisLattice>(), r in arb_rotation()) {
            let o = Orientation::new(r, lattice);
            let avg = Orientation::average(&[o], None).unwrap();
            prop_assert!((avg.rotation() * r.inverse()).angle() < 1e-7);
            prop_assert_eq!(avg.lattice(), lattice);
        }
    }
}
