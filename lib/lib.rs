//! Single-qubit gate synthesis over the discrete {H, T, T†} basis.
//!
//! Given a target rotation, either as a pair of points on the Bloch sphere,
//! an SO(3) matrix, or a U(2) matrix, the Solovay–Kitaev algorithm produces a
//! word over {H, T, T†} whose action approximates it, with error shrinking
//! super-exponentially in the recursion depth.
//!
//! ```no_run
//! use sk_synth::{ BlochPoint, Depth, solovay_kitaev_from_points };
//!
//! let from = BlochPoint::new(0.0, 0.0, 1.0);
//! let to = BlochPoint::new(0.0, 0.6, 0.8);
//! let word = solovay_kitaev_from_points(&from, &to, Depth::new(3)).unwrap();
//! println!("{} ({} gates)", word, word.len());
//! ```
//!
//! Supporting qubit-state math (statevectors, probabilities, Bloch
//! coordinates) lives in [`qubit`].

pub mod error;
pub mod config;
pub mod gate;
pub mod so3;
pub mod qubit;
pub mod sequence;
pub mod table;
pub mod commutator;
pub mod synth;

pub use error::{ SkError, SkResult };
pub use config::SynthConfig;
pub use gate::{ BasisGate, Gate };
pub use qubit::{ BlochPoint, Probabilities, Statevector };
pub use sequence::GateSequence;
pub use table::BasicApproximations;
pub use synth::{
    Depth,
    SolovayKitaev,
    solovay_kitaev_from_points,
    solovay_kitaev_from_so3,
    solovay_kitaev_from_u2,
};
