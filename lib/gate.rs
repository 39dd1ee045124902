//! Single-qubit gates: the discrete synthesis alphabet and the wider set of
//! gates the state math can apply.

use std::{
    f64::consts::{ FRAC_1_SQRT_2, FRAC_PI_2, FRAC_PI_4, FRAC_PI_8, PI },
    fmt,
    str::FromStr,
};
use nalgebra as na;
use num_complex::Complex64 as C64;
use once_cell::sync::Lazy;
use serde::{ Deserialize, Serialize };
use crate::error::SkError;

const ZERO: C64 = C64 { re: 0.0, im: 0.0 };
const ONE: C64 = C64 { re: 1.0, im: 0.0 };
const I: C64 = C64 { re: 0.0, im: 1.0 };
const ORT2: C64 = C64 { re: FRAC_1_SQRT_2, im: 0.0 };

/// Pauli *X*.
pub static MAT_X: Lazy<na::Matrix2<C64>> =
    Lazy::new(|| na::Matrix2::new(ZERO, ONE, ONE, ZERO));

/// Pauli *Y*.
pub static MAT_Y: Lazy<na::Matrix2<C64>> =
    Lazy::new(|| na::Matrix2::new(ZERO, -I, I, ZERO));

/// Pauli *Z*.
pub static MAT_Z: Lazy<na::Matrix2<C64>> =
    Lazy::new(|| na::Matrix2::new(ONE, ZERO, ZERO, -ONE));

/// Hadamard.
pub static MAT_H: Lazy<na::Matrix2<C64>> =
    Lazy::new(|| na::Matrix2::new(ORT2, ORT2, ORT2, -ORT2));

/// π/2 phase.
pub static MAT_S: Lazy<na::Matrix2<C64>> =
    Lazy::new(|| na::Matrix2::new(ONE, ZERO, ZERO, I));

/// −π/2 phase.
pub static MAT_SDG: Lazy<na::Matrix2<C64>> =
    Lazy::new(|| na::Matrix2::new(ONE, ZERO, ZERO, -I));

/// π/4 phase.
pub static MAT_T: Lazy<na::Matrix2<C64>> =
    Lazy::new(|| na::Matrix2::new(ONE, ZERO, ZERO, C64::cis(FRAC_PI_4)));

/// −π/4 phase.
pub static MAT_TDG: Lazy<na::Matrix2<C64>> =
    Lazy::new(|| na::Matrix2::new(ONE, ZERO, ZERO, C64::cis(-FRAC_PI_4)));

/* BasisGate ******************************************************************/

/// An element of the discrete gate alphabet {H, T, T†} that synthesized words
/// are spelled in.
///
/// Serialized as `"h"`, `"t"`, and `"tdg"`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BasisGate {
    /// Hadamard
    H,
    /// π/4 rotation about Z
    T,
    /// −π/4 rotation about Z
    Tdg,
}

impl fmt::Display for BasisGate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for BasisGate {
    type Err = SkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "h" => Ok(Self::H),
            "t" => Ok(Self::T),
            "tdg" => Ok(Self::Tdg),
            _ => Err(SkError::UnknownGate(s.to_string())),
        }
    }
}

impl BasisGate {
    /// All members of the alphabet, in table-generation order.
    pub const ALL: [Self; 3] = [Self::H, Self::T, Self::Tdg];

    /// Lowercase symbol used in serialized gate words.
    pub fn name(self) -> &'static str {
        match self {
            Self::H => "h",
            Self::T => "t",
            Self::Tdg => "tdg",
        }
    }

    /// Return the gate that undoes `self`.
    pub fn inverse(self) -> Self {
        match self {
            Self::H => Self::H,
            Self::T => Self::Tdg,
            Self::Tdg => Self::T,
        }
    }

    /// Return `true` if `self` followed by `other` is the identity.
    pub fn is_inverse_of(self, other: Self) -> bool { self.inverse() == other }

    /// U(2) matrix of the gate.
    pub fn matrix(self) -> na::Matrix2<C64> { Gate::from(self).matrix() }

    /// Phase of the SU(2) representative, i.e. the argument of
    /// `1 / sqrt(det U)`.
    pub fn phase(self) -> f64 {
        match self {
            Self::H => FRAC_PI_2,
            Self::T => -FRAC_PI_8,
            Self::Tdg => FRAC_PI_8,
        }
    }

    /// Image of the gate under the SU(2) → SO(3) map, written out exactly.
    pub fn so3(self) -> na::Matrix3<f64> {
        const R: f64 = FRAC_1_SQRT_2;
        match self {
            Self::H => na::Matrix3::new(
                 0.0,  0.0, -1.0,
                 0.0, -1.0,  0.0,
                -1.0,  0.0,  0.0,
            ),
            Self::T => na::Matrix3::new(
                  R,  -R, 0.0,
                  R,   R, 0.0,
                0.0, 0.0, 1.0,
            ),
            Self::Tdg => na::Matrix3::new(
                  R,   R, 0.0,
                 -R,   R, 0.0,
                0.0, 0.0, 1.0,
            ),
        }
    }
}

/* Gate ***********************************************************************/

/// A fixed single-qubit gate acting on a statevector.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gate {
    /// π rotation about X
    X,
    /// π rotation about Y
    Y,
    /// π rotation about Z
    Z,
    /// Hadamard
    H,
    /// π/2 rotation about Z
    S,
    /// −π/2 rotation about Z
    Sdg,
    /// π/4 rotation about Z
    T,
    /// −π/4 rotation about Z
    Tdg,
}

impl From<BasisGate> for Gate {
    fn from(gate: BasisGate) -> Self {
        match gate {
            BasisGate::H => Self::H,
            BasisGate::T => Self::T,
            BasisGate::Tdg => Self::Tdg,
        }
    }
}

impl fmt::Display for Gate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Gate {
    type Err = SkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "x" => Ok(Self::X),
            "y" => Ok(Self::Y),
            "z" => Ok(Self::Z),
            "h" => Ok(Self::H),
            "s" => Ok(Self::S),
            "sdg" => Ok(Self::Sdg),
            "t" => Ok(Self::T),
            "tdg" => Ok(Self::Tdg),
            _ => Err(SkError::UnknownGate(s.to_string())),
        }
    }
}

impl Gate {
    pub fn name(self) -> &'static str {
        match self {
            Self::X => "x",
            Self::Y => "y",
            Self::Z => "z",
            Self::H => "h",
            Self::S => "s",
            Self::Sdg => "sdg",
            Self::T => "t",
            Self::Tdg => "tdg",
        }
    }

    /// Return `true` if `self` is in the synthesis alphabet.
    pub fn is_basis(self) -> bool { self.as_basis().is_some() }

    /// Narrow to the synthesis alphabet, if possible.
    pub fn as_basis(self) -> Option<BasisGate> {
        match self {
            Self::H => Some(BasisGate::H),
            Self::T => Some(BasisGate::T),
            Self::Tdg => Some(BasisGate::Tdg),
            _ => None,
        }
    }

    /// Return the gate that undoes `self`.
    pub fn inverse(self) -> Self {
        match self {
            Self::S => Self::Sdg,
            Self::Sdg => Self::S,
            Self::T => Self::Tdg,
            Self::Tdg => Self::T,
            g => g,
        }
    }

    /// U(2) matrix of the gate.
    pub fn matrix(self) -> na::Matrix2<C64> {
        match self {
            Self::X => *MAT_X,
            Self::Y => *MAT_Y,
            Self::Z => *MAT_Z,
            Self::H => *MAT_H,
            Self::S => *MAT_S,
            Self::Sdg => *MAT_SDG,
            Self::T => *MAT_T,
            Self::Tdg => *MAT_TDG,
        }
    }

    /// Unit rotation axis of the gate on the Bloch sphere.
    pub fn axis(self) -> na::Vector3<f64> {
        match self {
            Self::X => na::Vector3::x(),
            Self::Y => na::Vector3::y(),
            Self::H => na::Vector3::new(FRAC_1_SQRT_2, 0.0, FRAC_1_SQRT_2),
            Self::Z | Self::S | Self::Sdg | Self::T | Self::Tdg
                => na::Vector3::z(),
        }
    }

    /// Signed rotation angle about [`Self::axis`], in radians.
    pub fn rotation(self) -> f64 {
        match self {
            Self::X | Self::Y | Self::Z | Self::H => PI,
            Self::S => FRAC_PI_2,
            Self::Sdg => -FRAC_PI_2,
            Self::T => FRAC_PI_4,
            Self::Tdg => -FRAC_PI_4,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::so3::{ self, su2_to_so3 };

    fn max_dev2(a: &na::Matrix2<C64>, b: &na::Matrix2<C64>) -> f64 {
        a.iter().zip(b.iter())
            .map(|(x, y)| (x - y).norm())
            .fold(0.0, f64::max)
    }

    #[test]
    fn basis_inverse_is_involution() {
        for g in BasisGate::ALL {
            assert_eq!(g.inverse().inverse(), g);
            assert!(g.is_inverse_of(g.inverse()));
        }
        assert!(BasisGate::H.is_inverse_of(BasisGate::H));
        assert!(!BasisGate::T.is_inverse_of(BasisGate::T));
    }

    #[test]
    fn gate_times_inverse_is_identity() {
        let all = [
            Gate::X, Gate::Y, Gate::Z, Gate::H,
            Gate::S, Gate::Sdg, Gate::T, Gate::Tdg,
        ];
        for g in all {
            let prod = g.inverse().matrix() * g.matrix();
            assert!(max_dev2(&prod, &na::Matrix2::identity()) < 1e-12, "{g}");
        }
    }

    #[test]
    fn exact_so3_matches_conversion() {
        for g in BasisGate::ALL {
            let su2 = g.matrix() * C64::cis(g.phase());
            assert!((su2.determinant() - ONE).norm() < 1e-12, "{g}");
            let so3 = su2_to_so3(&su2);
            assert!((so3 - g.so3()).norm() < 1e-12, "{g}");
        }
    }

    #[test]
    fn bloch_rotation_matches_matrix() {
        let all = [
            Gate::X, Gate::Y, Gate::Z, Gate::H,
            Gate::S, Gate::Sdg, Gate::T, Gate::Tdg,
        ];
        for g in all {
            let (rot, _) = so3::u2_to_so3(&g.matrix()).unwrap();
            let expected = so3::axis_angle(&g.axis(), g.rotation());
            assert!((so3::bloch_conjugate(&rot) - expected).norm() < 1e-12, "{g}");
        }
    }

    #[test]
    fn names_round_trip() {
        for g in BasisGate::ALL {
            assert_eq!(g.name().parse::<BasisGate>().unwrap(), g);
            assert_eq!(g.to_string(), g.name());
        }
        assert!(matches!(
            "cx".parse::<BasisGate>(),
            Err(SkError::UnknownGate(s)) if s == "cx"
        ));
        assert!("sdg".parse::<BasisGate>().is_err());
        assert_eq!("sdg".parse::<Gate>().unwrap(), Gate::Sdg);
    }

    #[test]
    fn serde_uses_lowercase_symbols() {
        let word = vec![BasisGate::H, BasisGate::T, BasisGate::Tdg];
        let json = serde_json::to_string(&word).unwrap();
        assert_eq!(json, r#"["h","t","tdg"]"#);
        let back: Vec<BasisGate> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, word);
        assert!(serde_json::from_str::<BasisGate>(r#""s""#).is_err());
    }

    #[test]
    fn narrowing_to_basis() {
        assert_eq!(Gate::Tdg.as_basis(), Some(BasisGate::Tdg));
        assert!(!Gate::S.is_basis());
        for g in BasisGate::ALL {
            assert_eq!(Gate::from(g).as_basis(), Some(g));
        }
    }
}
