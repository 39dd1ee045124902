//! Single-qubit state math: conversions between statevectors, measurement
//! probabilities, and Bloch-sphere coordinates, plus gate application.
//!
//! Statevectors are always kept in canonical form: the ∣0⟩ amplitude is real
//! and non-negative, so that all phase information lives in the ∣1⟩
//! amplitude.

use std::{
    f64::consts::{ FRAC_PI_2, PI, TAU },
    fmt,
};
use nalgebra as na;
use num_complex::Complex64 as C64;
use serde::{ Deserialize, Serialize };
use crate::{
    gate::Gate,
    sequence::GateSequence,
};

/// Below this, an imaginary part is treated as zero during canonicalization.
const REAL_EPSILON: f64 = 1e-15;

/// A pure single-qubit state in canonical form.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Statevector {
    zero: f64,
    one: C64,
}

impl Default for Statevector {
    fn default() -> Self { Self { zero: 1.0, one: C64::new(0.0, 0.0) } }
}

impl fmt::Display for Statevector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}∣0⟩ + ({})∣1⟩", self.zero, self.one)
    }
}

impl Statevector {
    /// Canonicalize an arbitrary pair of amplitudes. See
    /// [`normalize_statevector`].
    pub fn new(zero: C64, one: C64) -> Self { normalize_statevector(zero, one) }

    /// ∣0⟩.
    pub fn zero_state() -> Self { Self::default() }

    /// ∣1⟩.
    pub fn one_state() -> Self { Self { zero: 0.0, one: C64::new(1.0, 0.0) } }

    /// Amplitude of ∣0⟩ (real and non-negative).
    pub fn zero(&self) -> f64 { self.zero }

    /// Amplitude of ∣1⟩.
    pub fn one(&self) -> C64 { self.one }

    /// Amplitudes as a column vector.
    pub fn as_vector(&self) -> na::Vector2<C64> {
        na::Vector2::new(C64::from(self.zero), self.one)
    }

    /// `|⟨0|ψ⟩|² + |⟨1|ψ⟩|²`.
    pub fn norm_sqr(&self) -> f64 { self.zero * self.zero + self.one.norm_sqr() }

    pub fn probabilities(&self) -> Probabilities {
        statevector_to_probabilities(self)
    }

    pub fn bloch(&self) -> BlochPoint { calculate_coordinates(self) }
}

/// Measurement probabilities plus the relative phase; a derived view of a
/// [`Statevector`].
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Probabilities {
    pub zero: f64,
    pub one: f64,
    /// Relative phase in `[0, 2π)`.
    pub phase: f64,
}

/// A point on the Bloch sphere.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BlochPoint {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl fmt::Display for BlochPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

impl From<na::Vector3<f64>> for BlochPoint {
    fn from(v: na::Vector3<f64>) -> Self { Self { x: v.x, y: v.y, z: v.z } }
}

impl From<[f64; 3]> for BlochPoint {
    fn from(v: [f64; 3]) -> Self { Self { x: v[0], y: v[1], z: v[2] } }
}

impl BlochPoint {
    pub fn new(x: f64, y: f64, z: f64) -> Self { Self { x, y, z } }

    pub fn as_vector(&self) -> na::Vector3<f64> {
        na::Vector3::new(self.x, self.y, self.z)
    }

    /// Euclidean distance to another point.
    pub fn distance(&self, other: &Self) -> f64 {
        (self.as_vector() - other.as_vector()).norm()
    }
}

/// Azimuthal angle of `(x, y)` in `[0, 2π)`.
///
/// Every point on the *x* axis (`y == 0`) maps to 0, including those with
/// negative *x*.
pub fn calculate_azimuth(x: f64, y: f64) -> f64 {
    if y > 0.0 {
        FRAC_PI_2 - (x / y).atan()
    } else if y < 0.0 {
        FRAC_PI_2 - (x / y).atan() + PI
    } else {
        0.0
    }
}

/// Statevector for a point on the Bloch sphere.
pub fn calculate_statevector(point: &BlochPoint) -> Statevector {
    let phase = calculate_azimuth(point.x, point.y);
    let zero_prob = (point.z + 1.0) / 2.0;
    probabilities_to_statevector(zero_prob, phase)
}

/// Bloch coordinates of a statevector.
pub fn calculate_coordinates(state: &Statevector) -> BlochPoint {
    let z = state.zero * state.zero * 2.0 - 1.0;
    let radius = (1.0 - z * z).max(0.0).sqrt();
    let phase = state.one.arg();
    BlochPoint { x: radius * phase.cos(), y: radius * phase.sin(), z }
}

/// Build a canonical statevector from the probability of ∣0⟩ and the relative
/// phase.
pub fn probabilities_to_statevector(zero_prob: f64, phase: f64) -> Statevector {
    let p = zero_prob.clamp(0.0, 1.0);
    Statevector {
        zero: p.sqrt(),
        one: C64::from_polar((1.0 - p).sqrt(), phase),
    }
}

pub fn statevector_to_probabilities(state: &Statevector) -> Probabilities {
    let mut phase = state.one.arg().rem_euclid(TAU);
    // rem_euclid can round up to exactly 2π for tiny negative inputs
    if phase >= TAU { phase = 0.0; }
    Probabilities {
        zero: state.zero * state.zero,
        one: state.one.norm_sqr(),
        phase,
    }
}

/// Remove the global phase from a pair of amplitudes so that the ∣0⟩
/// amplitude is real and non-negative.
///
/// Pairs already in that form are returned as-is. When the ∣0⟩ amplitude
/// vanishes, the ∣1⟩ amplitude is left untouched.
pub fn normalize_statevector(zero: C64, one: C64) -> Statevector {
    if zero.im.abs() < REAL_EPSILON && zero.re >= 0.0 {
        return Statevector { zero: zero.re, one };
    }
    let zero_angle = zero.arg();
    Statevector {
        zero: zero.norm(),
        one: C64::from_polar(one.norm(), one.arg() - zero_angle),
    }
}

/// Apply a 2×2 matrix to a state and canonicalize the result.
pub fn apply_matrix(state: &Statevector, matrix: &na::Matrix2<C64>)
    -> Statevector
{
    let out = matrix * state.as_vector();
    normalize_statevector(out[0], out[1])
}

pub fn apply_gate(state: &Statevector, gate: Gate) -> Statevector {
    apply_matrix(state, &gate.matrix())
}

/// Apply every gate of a word in order.
pub fn apply_sequence(state: &Statevector, seq: &GateSequence) -> Statevector {
    seq.into_iter()
        .fold(*state, |acc, g| apply_gate(&acc, Gate::from(*g)))
}

/// `|⟨a|b⟩|²`.
pub fn fidelity(a: &Statevector, b: &Statevector) -> f64 {
    a.as_vector().dotc(&b.as_vector()).norm_sqr()
}
