//! Crystallographic orientation algebra: rotations in six interchangeable parameterizations, the
//! rotational symmetry of the crystal systems, orientation relationships between Bravais lattices,
//! and orientations built from all three (disorientation, fundamental zone reduction, inverse pole
//! figure coloring, averaging).
//!
//! Conventions follow D. Rowenhorst et al., Modelling Simul. Mater. Sci. Eng. 23 (2015) 083501;
//! see [`rotation`] for the details.

pub mod algebra;
pub mod constants;
pub mod conversions;
pub mod lambert;
pub mod lattice;
pub mod orientation;
pub mod rotation;
pub mod symmetry;
pub mod units;

pub use lattice::{BravaisLattice, Relationship};
pub use orientation::{Disorientation, Orientation};
pub use rotation::{Convention, Rotation};
pub use symmetry::CrystalSystem;
