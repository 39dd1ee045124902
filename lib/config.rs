//! Synthesis settings.
//!
//! Settings come from the following sources, later ones overriding earlier
//! ones:
//!
//! 1. Built-in defaults
//! 2. A JSON file ([`SynthConfig::load`])
//! 3. Environment variables (`SK_*`)

use std::{
    env,
    path::{ Path, PathBuf },
};
use serde::{ Deserialize, Serialize };
use crate::error::{ SkError, SkResult };

/// No configuration may raise the recursion cap above this; word length grows
/// like 5ⁿ.
pub const HARD_MAX_DEPTH: usize = 12;

/// Tunables for [`SolovayKitaev`][crate::synth::SolovayKitaev].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SynthConfig {
    /// Largest recursion depth accepted by the entry points.
    pub max_depth: usize,
    /// Run the two independent sub-approximations of each level on the rayon
    /// thread pool.
    pub parallel: bool,
    /// Only fork at recursion levels at least this deep; shallower levels are
    /// too cheap to be worth it.
    pub parallel_min_depth: usize,
    /// Validate targets (and externally loaded tables) before synthesis.
    pub check_inputs: bool,
    /// Tolerance for the checks enabled by `check_inputs`.
    pub tolerance: f64,
    /// Load the basic approximation table from this file instead of using the
    /// embedded one.
    pub table_path: Option<PathBuf>,
}

impl Default for SynthConfig {
    fn default() -> Self {
        Self {
            max_depth: 8,
            parallel: false,
            parallel_min_depth: 2,
            check_inputs: true,
            tolerance: 1e-6,
            table_path: None,
        }
    }
}

impl SynthConfig {
    /// Defaults with environment overrides applied.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env_overrides();
        config
    }

    /// Read a JSON file, then apply environment overrides. Missing fields take
    /// their defaults.
    pub fn load<P>(path: P) -> SkResult<Self>
    where P: AsRef<Path>
    {
        let text = std::fs::read_to_string(path)?;
        let mut config = Self::from_json_str(&text)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Parse from JSON without looking at the environment.
    pub fn from_json_str(text: &str) -> SkResult<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Override fields from `SK_MAX_DEPTH`, `SK_PARALLEL`,
    /// `SK_PARALLEL_MIN_DEPTH`, `SK_CHECK_INPUTS`, `SK_TOLERANCE`, and
    /// `SK_TABLE_PATH`.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| env::var(key).ok());
    }

    /// Like [`Self::apply_env_overrides`], but reading variables through
    /// `lookup`. Values that fail to parse are ignored.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where F: Fn(&str) -> Option<String>
    {
        fn parsed<T: std::str::FromStr>(key: &str, val: String) -> Option<T> {
            let res = val.trim().parse().ok();
            if res.is_none() {
                tracing::warn!(key, value = %val, "ignoring unparseable override");
            }
            res
        }

        if let Some(v) = lookup("SK_MAX_DEPTH").and_then(|v| parsed("SK_MAX_DEPTH", v)) {
            self.max_depth = v;
        }
        if let Some(v) = lookup("SK_PARALLEL").and_then(|v| parsed("SK_PARALLEL", v)) {
            self.parallel = v;
        }
        if let Some(v)
            = lookup("SK_PARALLEL_MIN_DEPTH")
            .and_then(|v| parsed("SK_PARALLEL_MIN_DEPTH", v))
        {
            self.parallel_min_depth = v;
        }
        if let Some(v) = lookup("SK_CHECK_INPUTS").and_then(|v| parsed("SK_CHECK_INPUTS", v)) {
            self.check_inputs = v;
        }
        if let Some(v) = lookup("SK_TOLERANCE").and_then(|v| parsed("SK_TOLERANCE", v)) {
            self.tolerance = v;
        }
        if let Some(v) = lookup("SK_TABLE_PATH") {
            self.table_path = (!v.is_empty()).then(|| PathBuf::from(v));
        }
    }

    /// Reject settings no synthesizer can run with.
    pub fn validate(&self) -> SkResult<()> {
        if self.max_depth > HARD_MAX_DEPTH {
            return Err(SkError::Config(format!(
                "max_depth {} is above the hard limit of {}",
                self.max_depth, HARD_MAX_DEPTH,
            )));
        }
        if !(self.tolerance.is_finite() && self.tolerance > 0.0) {
            return Err(SkError::Config(format!(
                "tolerance must be finite and positive; got {}",
                self.tolerance,
            )));
        }
        Ok(())
    }
}
