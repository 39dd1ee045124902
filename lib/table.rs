//! The precomputed table of short gate words used at the bottom of the
//! recursion.
//!
//! The table is an external asset: an ordered JSON array of records
//!
//! ```text
//! { "matrix": [[f64; 3]; 3], "names": ["h" | "t" | "tdg", ...], "phase": f64 }
//! ```
//!
//! produced offline by enumerating every word over {H, T, T†} up to length 10
//! in breadth-first order. Words whose SO(3) image repeats an earlier record
//! are dropped, so the first record is the empty word. The format is frozen.
//! Records are consumed verbatim and never recomputed at runtime.

use std::{
    path::Path,
    sync::Arc,
};
use nalgebra as na;
use once_cell::sync::OnceCell;
use serde::{ Deserialize, Serialize };
use crate::{
    error::{ SkError, SkResult },
    gate::BasisGate,
    sequence::GateSequence,
    so3,
};

static EMBEDDED_TABLE: &str = include_str!("../data/basic_approximations.json");

static EMBEDDED: OnceCell<Arc<BasicApproximations>> = OnceCell::new();

/// A single precomputed word.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ApproximationRecord {
    /// SO(3) product of the word, row-major.
    pub matrix: [[f64; 3]; 3],
    /// The word, in application order.
    pub names: Vec<BasisGate>,
    /// Accumulated SU(2) phase of the word.
    pub phase: f64,
}

impl ApproximationRecord {
    pub fn so3(&self) -> na::Matrix3<f64> {
        na::Matrix3::from_fn(|i, j| self.matrix[i][j])
    }

    pub fn to_sequence(&self) -> GateSequence {
        GateSequence::from_parts(self.names.clone(), self.so3(), self.phase)
    }
}

/// Read-only, non-empty collection of [`ApproximationRecord`]s searched by
/// Frobenius distance.
#[derive(Clone, Debug)]
pub struct BasicApproximations {
    records: Vec<ApproximationRecord>,
    // cached `record.so3()`s, same order
    matrices: Vec<na::Matrix3<f64>>,
}

impl BasicApproximations {
    /// The table shipped with the crate, parsed on first use and shared for
    /// the lifetime of the process.
    pub fn embedded() -> SkResult<Arc<Self>> {
        EMBEDDED
            .get_or_try_init(|| {
                let table = Self::from_json_str(EMBEDDED_TABLE)?;
                tracing::debug!(records = table.len(), "loaded embedded basic approximations");
                Ok::<_, SkError>(Arc::new(table))
            })
            .cloned()
    }

    /// Load a table in the frozen JSON format from a file.
    pub fn load<P>(path: P) -> SkResult<Self>
    where P: AsRef<Path>
    {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let table = Self::from_json_str(&text)?;
        tracing::debug!(
            path = %path.display(),
            records = table.len(),
            "loaded basic approximations"
        );
        Ok(table)
    }

    /// Parse a table in the frozen JSON format.
    pub fn from_json_str(text: &str) -> SkResult<Self> {
        let records: Vec<ApproximationRecord> = serde_json::from_str(text)?;
        Self::from_records(records)
    }

    /// Wrap a list of records, rejecting an empty list and any non-finite
    /// matrix entry or phase.
    pub fn from_records(records: Vec<ApproximationRecord>) -> SkResult<Self> {
        if records.is_empty() { return Err(SkError::EmptyTable); }
        let bad
            = records.iter().enumerate()
            .find(|(_, rec)| {
                !rec.phase.is_finite()
                    || rec.matrix.iter().flatten().any(|x| !x.is_finite())
            });
        if let Some((index, _)) = bad {
            return Err(SkError::BadRecord {
                index,
                reason: "non-finite matrix entry or phase".to_string(),
            });
        }
        let matrices: Vec<na::Matrix3<f64>> = records.iter().map(|rec| rec.so3()).collect();
        Ok(Self { records, matrices })
    }

    pub fn len(&self) -> usize { self.records.len() }

    /// Always `false`; kept for symmetry with [`Self::len`].
    pub fn is_empty(&self) -> bool { self.records.is_empty() }

    pub fn records(&self) -> &[ApproximationRecord] { &self.records }

    pub fn get(&self, index: usize) -> Option<&ApproximationRecord> {
        self.records.get(index)
    }

    /// Index of the record nearest to `target` in Frobenius distance, and
    /// that distance.
    ///
    /// Ties go to the record that comes first in the table.
    pub fn closest_index(&self, target: &na::Matrix3<f64>) -> (usize, f64) {
        let first = so3::frobenius_distance(&self.matrices[0], target);
        self.matrices.iter().enumerate().skip(1)
            .fold((0, first), |(best, best_loss), (k, m)| {
                let loss = so3::frobenius_distance(m, target);
                if loss < best_loss { (k, loss) } else { (best, best_loss) }
            })
    }

    /// Nearest precomputed word to `target`, as a fresh sequence.
    pub fn find_closest(&self, target: &na::Matrix3<f64>) -> GateSequence {
        let (index, _) = self.closest_index(target);
        self.records[index].to_sequence()
    }

    /// Check every record's matrix against the product of its own word.
    pub fn check_consistency(&self, tol: f64) -> SkResult<()> {
        let bad
            = self.records.iter().zip(&self.matrices).enumerate()
            .map(|(k, (rec, m))| {
                let word = GateSequence::from_gates(rec.names.iter().copied());
                (k, word.distance(m))
            })
            .find(|(_, err)| !(*err <= tol));
        match bad {
            Some((index, err)) => Err(SkError::BadRecord {
                index,
                reason: format!("matrix is {err:e} away from its word's product"),
            }),
            None => Ok(()),
        }
    }
}
