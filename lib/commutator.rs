//! Balanced group-commutator decomposition of a rotation.
//!
//! Any rotation *R* by angle θ can be written exactly as `V W V⁻¹ W⁻¹`, where
//! *V* and *W* are rotations by the same, much smaller, angle φ. If *V* and *W*
//! are approximated to within ε, the commutator of the approximations is
//! within O(ε^{3/2}) of *R*, which is where the recursion gets its
//! convergence. See Dawson & Nielsen, [arXiv:quant-ph/0505030][dn], §4.1.
//!
//! [dn]: https://arxiv.org/abs/quant-ph/0505030

use nalgebra as na;
use crate::{
    sequence::GateSequence,
    so3::{ self, Axis },
};

/// Rotation angle φ of the two commutator factors for a target rotated by θ:
///
/// φ = 2 arcsin( ((1 − cos(θ/2)) / 2)^{1/4} )
pub fn decomposition_angle(r: &na::Matrix3<f64>) -> f64 {
    let theta = so3::rotation_angle(r);
    2.0 * ((1.0 - (theta / 2.0).cos()) / 2.0).powf(0.25).asin()
}

/// Group commutator `V W Vᵀ Wᵀ` of two rotations.
pub fn group_commutator(v: &na::Matrix3<f64>, w: &na::Matrix3<f64>)
    -> na::Matrix3<f64>
{
    v * w * v.transpose() * w.transpose()
}

/// Split `r` into two rotations *V*, *W* with `V W V⁻¹ W⁻¹ ≈ r`.
///
/// Rotations by φ about *x* and *y* have a commutator with the same angle as
/// `r`. Conjugating both by the rotation *S* that takes that commutator's axis
/// onto `r`'s axis gives the result. Near the identity the axes fall back to
/// +*x* (see [`so3::rotation_axis`]). There both factors are themselves near
/// the identity, so the result degrades gracefully.
///
/// The returned sequences carry only their rotation; their gate words are left
/// empty to be filled in by the caller.
pub fn balanced_commutator_decomposition(r: &na::Matrix3<f64>)
    -> (GateSequence, GateSequence)
{
    let phi = decomposition_angle(r);
    let v_tilde = Axis::X.rotation(phi);
    let w_tilde = Axis::Y.rotation(phi);
    let commutator = group_commutator(&v_tilde, &w_tilde);

    let target_axis = so3::rotation_axis_checked(r)
        .unwrap_or_else(|| {
            tracing::trace!("target rotation axis undetermined; using +x");
            na::Vector3::x()
        });
    let commutator_axis = so3::rotation_axis(&commutator);

    let sim = so3::rotation_between(&commutator_axis, &target_axis);
    let sim_t = sim.transpose();
    let v = sim * v_tilde * sim_t;
    let w = sim * w_tilde * sim_t;
    (GateSequence::from_so3(v), GateSequence::from_so3(w))
}
