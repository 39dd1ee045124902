//! Words over {H, T, T†} carried together with the SO(3) rotation they
//! implement.
//!
//! A [`GateSequence`] is a value: every operation returns a new sequence and
//! leaves its inputs alone, so sub-results can be shared freely between
//! branches of the recursion.

use std::fmt;
use itertools::Itertools;
use nalgebra as na;
use num_complex::Complex64 as C64;
use crate::{
    gate::BasisGate,
    so3,
};

/// A gate word, its SO(3) product, and its accumulated SU(2) phase.
///
/// Gates are stored in application order: the first gate acts first, so the
/// product is `R(gₙ) ⋯ R(g₂) R(g₁)`.
#[derive(Clone, Debug, PartialEq)]
pub struct GateSequence {
    gates: Vec<BasisGate>,
    product: na::Matrix3<f64>,
    global_phase: f64,
}

/// Creates the empty word.
impl Default for GateSequence {
    fn default() -> Self { Self::identity() }
}

impl fmt::Display for GateSequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.gates.is_empty() {
            write!(f, "I")
        } else {
            write!(f, "{}", self.gates.iter().join(" "))
        }
    }
}

impl<'a> IntoIterator for &'a GateSequence {
    type Item = &'a BasisGate;
    type IntoIter = std::slice::Iter<'a, BasisGate>;

    fn into_iter(self) -> Self::IntoIter { self.gates.iter() }
}

impl GateSequence {
    /// The empty word.
    pub fn identity() -> Self { Self::from_so3(na::Matrix3::identity()) }

    /// A target with no gate word yet: only the rotation is known.
    pub fn from_so3(product: na::Matrix3<f64>) -> Self {
        Self { gates: Vec::new(), product, global_phase: 0.0 }
    }

    /// Like [`Self::from_so3`], from an SU(2) matrix.
    pub fn from_su2(matrix: &na::Matrix2<C64>) -> Self {
        Self::from_so3(so3::su2_to_so3(matrix))
    }

    /// Build a sequence from a gate word, computing its product and phase.
    pub fn from_gates<I>(gates: I) -> Self
    where I: IntoIterator<Item = BasisGate>
    {
        let gates: Vec<BasisGate> = gates.into_iter().collect();
        let global_phase: f64 = gates.iter().map(|g| g.phase()).sum();
        let product = word_product(&gates);
        Self { gates, product, global_phase }
    }

    /// Assemble a sequence from parts that are already known to agree.
    pub(crate) fn from_parts(
        gates: Vec<BasisGate>,
        product: na::Matrix3<f64>,
        global_phase: f64,
    ) -> Self
    {
        Self { gates, product, global_phase }
    }

    pub fn gates(&self) -> &[BasisGate] { &self.gates }

    pub fn product(&self) -> &na::Matrix3<f64> { &self.product }

    pub fn global_phase(&self) -> f64 { self.global_phase }

    pub fn len(&self) -> usize { self.gates.len() }

    pub fn is_empty(&self) -> bool { self.gates.is_empty() }

    /// The inverse sequence: reversed word with each gate inverted, transposed
    /// product, negated phase.
    pub fn adjoint(&self) -> Self {
        Self {
            gates: self.gates.iter().rev().map(|g| g.inverse()).collect(),
            product: self.product.transpose(),
            global_phase: -self.global_phase,
        }
    }

    /// Compose two sequences: `other` is applied first, then `self`.
    ///
    /// The word is `other` followed by `self`, and the product is
    /// `self.product × other.product`.
    pub fn dot(&self, other: &Self) -> Self {
        let mut gates = Vec::with_capacity(self.gates.len() + other.gates.len());
        gates.extend_from_slice(&other.gates);
        gates.extend_from_slice(&self.gates);
        Self {
            gates,
            product: self.product * other.product,
            global_phase: self.global_phase + other.global_phase,
        }
    }

    /// Remove adjacent mutually inverse gates until none remain.
    ///
    /// Cancelling a pair can bring two new gates together, so this is
    /// repeated at the join. The product and phase are carried over as-is.
    /// Every cancelled pair is the identity in SO(3), so the product still
    /// describes the shorter word up to rounding; use
    /// [`Self::word_product`] when the rounding matters.
    pub fn clean(&self) -> Self {
        let mut gates: Vec<BasisGate> = Vec::with_capacity(self.gates.len());
        for &g in self.gates.iter() {
            if matches!(gates.last(), Some(prev) if prev.is_inverse_of(g)) {
                gates.pop();
            } else {
                gates.push(g);
            }
        }
        Self { gates, product: self.product, global_phase: self.global_phase }
    }

    /// Product of the SO(3) images of the current word, recomputed gate by
    /// gate.
    pub fn word_product(&self) -> na::Matrix3<f64> { word_product(&self.gates) }

    /// Exact U(2) matrix of the word, including global phase.
    pub fn to_u2(&self) -> na::Matrix2<C64> {
        self.gates.iter()
            .fold(na::Matrix2::identity(), |acc, g| g.matrix() * acc)
    }

    /// Action of the word on the Bloch sphere.
    pub fn bloch_rotation(&self) -> na::Matrix3<f64> {
        so3::bloch_conjugate(&self.product)
    }

    /// Frobenius distance between the product and `target`.
    pub fn distance(&self, target: &na::Matrix3<f64>) -> f64 {
        so3::frobenius_distance(&self.product, target)
    }
}

fn word_product(gates: &[BasisGate]) -> na::Matrix3<f64> {
    gates.iter()
        .fold(na::Matrix3::identity(), |acc, g| g.so3() * acc)
}
