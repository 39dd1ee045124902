//! Rotation geometry: the SU(2) → SO(3) double cover, axis/angle
//! constructions, and the rotation carrying one Bloch point onto another.
//!
//! Two frames appear in this crate. Bloch points (and therefore
//! [`so3_from_points`]) live in the usual Bloch-sphere frame, where ∣0⟩ sits at
//! +*z* and the ∣1⟩ phase is the azimuth. The SU(2) → SO(3) map [`su2_to_so3`]
//! and everything built on it (gate words, the basic approximation table)
//! live in a frame that differs from it by a reflection of the *z* axis.
//! [`bloch_conjugate`] converts between the two.

use std::f64::consts::{ PI, TAU };
use nalgebra as na;
use num_complex::Complex64 as C64;
use rand::Rng;
use crate::error::{ SkError, SkResult };

/// Below this, `sin θ` is treated as zero when extracting a rotation axis.
pub const AXIS_EPSILON: f64 = 1e-9;

/// Below this, `|det U|` is treated as zero.
pub const SINGULAR_EPSILON: f64 = 1e-12;

/// Two unit vectors whose dot product is within this of ±1 are considered
/// parallel.
pub const PARALLEL_EPSILON: f64 = 1e-12;

/// A coordinate axis.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    /// Unit vector along the axis.
    pub fn unit(self) -> na::Vector3<f64> {
        match self {
            Self::X => na::Vector3::x(),
            Self::Y => na::Vector3::y(),
            Self::Z => na::Vector3::z(),
        }
    }

    /// Rotation by `angle` about the axis.
    pub fn rotation(self, angle: f64) -> na::Matrix3<f64> {
        axis_angle(&self.unit(), angle)
    }
}

/// Map an SU(2) matrix to its SO(3) image.
///
/// With the top-left entry written as *a* + *bi* and the top-right entry as
/// −(*c* + *di*), every entry of the result is a quadratic form in *a*, *b*,
/// *c*, *d*. Only the first row of the input is read.
pub fn su2_to_so3(m: &na::Matrix2<C64>) -> na::Matrix3<f64> {
    let a = m[(0, 0)].re;
    let b = m[(0, 0)].im;
    let c = -m[(0, 1)].re;
    let d = -m[(0, 1)].im;
    na::Matrix3::new(
        a * a - b * b - c * c + d * d,
        2.0 * (a * b + c * d),
        2.0 * (b * d - a * c),
        2.0 * (c * d - a * b),
        a * a - b * b + c * c - d * d,
        2.0 * (a * d + b * c),
        2.0 * (a * c + b * d),
        2.0 * (b * c - a * d),
        a * a + b * b - c * c - d * d,
    )
}

/// Strip the global phase from a U(2) matrix by dividing by the square root of
/// its determinant.
///
/// Returns the SU(2) matrix along with the argument of the removed factor
/// `1 / sqrt(det U)`. Fails if the matrix is singular.
pub fn u2_to_su2(m: &na::Matrix2<C64>) -> SkResult<(na::Matrix2<C64>, f64)> {
    let det = m.determinant();
    if !det.is_finite() || det.norm() < SINGULAR_EPSILON {
        return Err(SkError::SingularTarget(det.norm()));
    }
    let z = det.sqrt().inv();
    Ok((m * z, z.arg()))
}

/// Convert a U(2) matrix to its SO(3) image plus the phase removed on the way.
pub fn u2_to_so3(m: &na::Matrix2<C64>) -> SkResult<(na::Matrix3<f64>, f64)> {
    let (su2, phase) = u2_to_su2(m)?;
    Ok((su2_to_so3(&su2), phase))
}

/// Largest entry of `U†U − I`.
pub fn unitary_deviation(m: &na::Matrix2<C64>) -> f64 {
    (m.adjoint() * m - na::Matrix2::identity()).iter()
        .map(|z| z.norm())
        .fold(0.0, f64::max)
}

/// Largest violation of `RᵀR = I` and `det R = 1`. NaN entries count as
/// infinite.
pub fn so3_deviation(r: &na::Matrix3<f64>) -> f64 {
    if r.iter().any(|x| !x.is_finite()) { return f64::INFINITY; }
    let orth
        = (r.transpose() * r - na::Matrix3::identity()).iter()
        .map(|x| x.abs())
        .fold(0.0, f64::max);
    orth.max((r.determinant() - 1.0).abs())
}

/// Frobenius norm of `a − b`.
pub fn frobenius_distance(a: &na::Matrix3<f64>, b: &na::Matrix3<f64>) -> f64 {
    (a - b).norm()
}

/// Skew-symmetric matrix `[v]×` with `[v]× u = v × u`.
pub fn cross_product_matrix(v: &na::Vector3<f64>) -> na::Matrix3<f64> {
    na::Matrix3::new(
         0.0, -v[2],  v[1],
         v[2],  0.0, -v[0],
        -v[1],  v[0],  0.0,
    )
}

/// Rotation by `angle` about the unit vector `axis` (Rodrigues).
pub fn axis_angle(axis: &na::Vector3<f64>, angle: f64) -> na::Matrix3<f64> {
    let (sin, cos) = angle.sin_cos();
    na::Matrix3::identity() * cos
        + cross_product_matrix(axis) * sin
        + (axis * axis.transpose()) * (1.0 - cos)
}

/// Rotation angle θ ∈ [0, π] of an SO(3) matrix, from its trace.
pub fn rotation_angle(r: &na::Matrix3<f64>) -> f64 {
    ((r.trace() - 1.0) / 2.0).clamp(-1.0, 1.0).acos()
}

/// Rotation axis of an SO(3) matrix, or `None` when `sin θ` is too small for
/// the skew-symmetric part to determine it (θ near 0 or π).
pub fn rotation_axis_checked(r: &na::Matrix3<f64>)
    -> Option<na::Vector3<f64>>
{
    let sin = rotation_angle(r).sin();
    (sin > AXIS_EPSILON).then(|| {
        na::Vector3::new(
            r[(2, 1)] - r[(1, 2)],
            r[(0, 2)] - r[(2, 0)],
            r[(1, 0)] - r[(0, 1)],
        ) / (2.0 * sin)
    })
}

/// Rotation axis of an SO(3) matrix.
///
/// Near θ = 0 and θ = π the axis cannot be read off the skew-symmetric part;
/// the +*x* axis is returned instead. This is exact for the identity (any
/// axis will do) but only approximate for half-turns.
pub fn rotation_axis(r: &na::Matrix3<f64>) -> na::Vector3<f64> {
    rotation_axis_checked(r).unwrap_or_else(na::Vector3::x)
}

/// Return `true` if `from` and `to` are parallel or antiparallel, in which case
/// the rotation between them is not unique.
///
/// Zero-length vectors count as degenerate.
pub fn check_points(from: &na::Vector3<f64>, to: &na::Vector3<f64>) -> bool {
    match (from.try_normalize(0.0), to.try_normalize(0.0)) {
        (Some(f), Some(t)) => 1.0 - f.dot(&t).abs() <= PARALLEL_EPSILON,
        _ => true,
    }
}

/// Rotation taking the direction of `from` onto the direction of `to`, about
/// their common normal:
///
/// `I + [v]× + [v]×² / (1 + cos α)`, with `v = from × to`.
///
/// Parallel inputs give the identity. Antiparallel inputs, where the formula
/// divides by zero, give a half-turn about an axis perpendicular to `from`.
pub fn rotation_between(from: &na::Vector3<f64>, to: &na::Vector3<f64>)
    -> na::Matrix3<f64>
{
    let f = from.normalize();
    let t = to.normalize();
    let dot = f.dot(&t);
    if 1.0 + dot <= PARALLEL_EPSILON {
        return axis_angle(&perpendicular(&f), PI);
    }
    let cross = cross_product_matrix(&f.cross(&t));
    na::Matrix3::identity() + cross + (cross * cross) / (1.0 + dot)
}

// some unit vector perpendicular to the unit vector `v`
fn perpendicular(v: &na::Vector3<f64>) -> na::Vector3<f64> {
    let helper
        = if v.x.abs() < 0.9 { na::Vector3::x() } else { na::Vector3::y() };
    v.cross(&helper).normalize()
}

/// Rotation carrying the Bloch point `from` onto `to`, in the Bloch-sphere
/// frame.
///
/// Fails if either point cannot be normalized or if the points are parallel
/// or antiparallel.
pub fn so3_from_points(from: &na::Vector3<f64>, to: &na::Vector3<f64>)
    -> SkResult<na::Matrix3<f64>>
{
    let f = normalized(from)?;
    let t = normalized(to)?;
    if check_points(&f, &t) {
        return Err(SkError::DegeneratePoints(f.dot(&t)));
    }
    Ok(rotation_between(&f, &t))
}

fn normalized(v: &na::Vector3<f64>) -> SkResult<na::Vector3<f64>> {
    v.iter().all(|x| x.is_finite())
        .then(|| v.try_normalize(0.0))
        .flatten()
        .ok_or(SkError::InvalidPoint(v.x, v.y, v.z))
}

/// Convert a rotation between the Bloch-sphere frame and the frame of
/// [`su2_to_so3`].
///
/// The frames differ by the reflection `z → −z`, so this is `P R P` with
/// `P = diag(1, 1, −1)`; applying it twice gives back `R`.
pub fn bloch_conjugate(r: &na::Matrix3<f64>) -> na::Matrix3<f64> {
    let p = na::Matrix3::from_diagonal(&na::Vector3::new(1.0, 1.0, -1.0));
    p * r * p
}

/// Sample a rotation with a uniformly random axis and a uniformly random angle
/// in [0, π).
pub fn sample_rotation<R>(rng: &mut R) -> na::Matrix3<f64>
where R: Rng + ?Sized
{
    let z: f64 = rng.gen_range(-1.0..=1.0);
    let phi: f64 = rng.gen_range(0.0..TAU);
    let rho = (1.0 - z * z).max(0.0).sqrt();
    let axis = na::Vector3::new(rho * phi.cos(), rho * phi.sin(), z);
    axis_angle(&axis, rng.gen_range(0.0..PI))
}
