//! Base traits for the group theory behind crystal symmetry. The point groups that act on
//! orientations are finite groups of rotations; describing them through these traits lets the
//! tabulated operations be checked against the groups their generators produce.

use std::fmt::Debug;

/// Group element requirements.
pub trait GroupElement: Debug + Clone {}

impl<T: Debug + Clone> GroupElement for T {}

/// A mathematical group: a set and operation that satisfies closure, the existence of an identity,
/// the existence of an inverse, and associativity. The group decides what equality means for its
/// elements: two quaternions of opposite sign are the same rotation, for example.
pub trait Group<E: GroupElement> {
    /// The identity e, with ae = ea = a for all a in the group.
    fn identity(&self) -> E;

    /// The inverse: b is a's inverse if ab = ba = e.
    fn inv(&self, element: &E) -> E;

    /// The group operation. Must be associative. `g.compose(a, b)` returns `ab`, which is the
    /// operation "do b, then do a".
    fn compose(&self, a: &E, b: &E) -> E;

    /// Equivalence relation on group elements.
    fn equiv(&self, a: &E, b: &E) -> bool;

    /// Canonical representation of an element: if `g.residue(a) == g.residue(b)` then
    /// `g.equiv(a, b)`. The default clone is never wrong.
    fn residue(&self, el: &E) -> E {
        el.clone()
    }

    /// Combines the elements using the composition operation, computing `abc` when given `[a, b,
    /// c]`. Returns the identity when given an empty list.
    fn reduce<'a, T: IntoIterator<Item = &'a E>>(&self, elems: T) -> E
    where
        E: 'a,
    {
        elems
            .into_iter()
            .fold(self.identity(), |acc, el| self.compose(&acc, el))
    }

    /// Conjugation of `b` by `a`, `aba⁻¹`.
    fn conjugate(&self, a: &E, b: &E) -> E {
        self.reduce([a, b, &self.inv(a)])
    }

    /// Containment using the group's notion of equality.
    fn contains_equiv<'a, T: IntoIterator<Item = &'a E>>(
        &self,
        elements: T,
        test_element: &'a E,
    ) -> bool {
        elements.into_iter().any(|el| self.equiv(el, test_element))
    }

    /// Whether an element is the identity.
    fn is_identity(&self, a: &E) -> bool {
        self.equiv(a, &self.identity())
    }
}

/// A group that is finitely generated.
pub trait FinitelyGeneratedGroup<E: GroupElement>: Group<E> {
    type Generators: IntoIterator<Item = E>;
    /// The generators of the group. Every element can be produced from these through
    /// composition.
    fn generators(&self) -> Self::Generators;
}

/// A finite group.
pub trait FiniteGroup<E: GroupElement>: FinitelyGeneratedGroup<E> {
    type Elements: IntoIterator<Item = E>;
    /// Every element of the group. [`generate_elements`] computes these from the generators;
    /// implementers with a fixed, conventional ordering of their elements should return that
    /// instead.
    fn elements(&self) -> Self::Elements;

    /// The order of an element, the smallest k > 0 with gᵏ = e. Returns 1 for the identity.
    fn order(&self, g: &E) -> usize {
        let mut k = 1;
        let mut el = g.clone();
        while !self.is_identity(&el) {
            k += 1;
            el = self.compose(&el, g);
        }

        k
    }
}

/// Generates every element of a finite group from its generators with Dimino's algorithm.
pub fn generate_elements<E: GroupElement, G: FinitelyGeneratedGroup<E>>(group: &G) -> Vec<E> {
    let gens: Vec<E> = group
        .generators()
        .into_iter()
        .map(|e| group.residue(&e))
        .collect();
    let mut elements = vec![group.identity()];

    for i in 0..gens.len() {
        // the subgroup generated by gens[0..i]
        let d = elements.clone();
        let mut n = vec![group.identity()];

        while !n.is_empty() {
            let mut new_n = vec![];
            for a in n {
                for g in gens.iter().skip(i) {
                    let ag = group.compose(&a, g);
                    if !group.contains_equiv(&elements, &ag) {
                        // new coset of the previous subgroup
                        for el in &d {
                            let ap = group.residue(&group.compose(el, &ag));
                            elements.push(ap.clone());
                            new_n.push(ap);
                        }
                    }
                }
            }
            n = new_n;
        }
    }

    elements
}
