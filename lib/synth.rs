//! The Solovay–Kitaev recursion and its entry points.
//!
//! At depth 0 a target is approximated by its nearest neighbor in the basic
//! approximation table. At depth *n* the depth-(*n* − 1) approximation *U* is
//! corrected by a group commutator `V W V⁻¹ W⁻¹` of depth-(*n* − 1)
//! approximations of the balanced factors of the residual rotation. The
//! result is a word over {H, T, T†} of length roughly 5ⁿ.

use std::{
    fmt,
    str::FromStr,
    sync::Arc,
};
use nalgebra as na;
use num_complex::Complex64 as C64;
use crate::{
    commutator::balanced_commutator_decomposition,
    config::SynthConfig,
    error::{ SkError, SkResult },
    qubit::BlochPoint,
    sequence::GateSequence,
    so3,
    table::BasicApproximations,
};

/// A validated recursion depth.
///
/// Depths arriving from loosely typed sources (integers, floats, strings) are
/// checked here, before any recursion starts; the upper bound is enforced
/// separately by [`SynthConfig::max_depth`].
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Depth(usize);

impl Depth {
    pub fn new(n: usize) -> Self { Self(n) }

    pub fn get(self) -> usize { self.0 }
}

impl fmt::Display for Depth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<usize> for Depth {
    fn from(n: usize) -> Self { Self(n) }
}

impl TryFrom<i64> for Depth {
    type Error = SkError;

    fn try_from(n: i64) -> SkResult<Self> {
        usize::try_from(n)
            .map(Self)
            .map_err(|_| SkError::InvalidDepth(n.to_string()))
    }
}

impl TryFrom<f64> for Depth {
    type Error = SkError;

    fn try_from(x: f64) -> SkResult<Self> {
        if x.is_finite() && x >= 0.0 && x.fract() == 0.0 && x <= u32::MAX as f64 {
            Ok(Self(x as usize))
        } else {
            Err(SkError::InvalidDepth(x.to_string()))
        }
    }
}

impl FromStr for Depth {
    type Err = SkError;

    fn from_str(s: &str) -> SkResult<Self> {
        let s = s.trim();
        if let Ok(n) = s.parse::<i64>() {
            Self::try_from(n)
        } else if let Ok(x) = s.parse::<f64>() {
            Self::try_from(x)
        } else {
            Err(SkError::InvalidDepth(format!("{s:?}")))
        }
    }
}

/// Gate-word synthesizer holding a shared approximation table and settings.
#[derive(Clone, Debug)]
pub struct SolovayKitaev {
    table: Arc<BasicApproximations>,
    config: SynthConfig,
}

impl SolovayKitaev {
    /// Validate `config` and load the table it names, or share the embedded
    /// one.
    pub fn new(config: SynthConfig) -> SkResult<Self> {
        config.validate()?;
        let table
            = match &config.table_path {
                Some(path) => {
                    let table = BasicApproximations::load(path)?;
                    if config.check_inputs {
                        table.check_consistency(config.tolerance)?;
                    }
                    Arc::new(table)
                },
                None => BasicApproximations::embedded()?,
            };
        Ok(Self { table, config })
    }

    /// Use an already loaded table; `config.table_path` is ignored.
    pub fn with_table(table: Arc<BasicApproximations>, config: SynthConfig)
        -> SkResult<Self>
    {
        config.validate()?;
        Ok(Self { table, config })
    }

    pub fn config(&self) -> &SynthConfig { &self.config }

    pub fn table(&self) -> &Arc<BasicApproximations> { &self.table }

    /// Find a word taking the Bloch point `from` to `to`.
    ///
    /// The target is the minimal rotation carrying one point onto the other,
    /// so parallel and antiparallel pairs are rejected.
    pub fn synthesize_points(&self, from: &BlochPoint, to: &BlochPoint, depth: Depth)
        -> SkResult<GateSequence>
    {
        let n = self.check_depth(depth)?;
        let bloch = so3::so3_from_points(&from.as_vector(), &to.as_vector())?;
        let target = so3::bloch_conjugate(&bloch);
        tracing::debug!(%from, %to, depth = n, "synthesizing from points");
        Ok(self.run(&target, n))
    }

    /// Find a word approximating a rotation matrix.
    pub fn synthesize_so3(&self, target: &na::Matrix3<f64>, depth: Depth)
        -> SkResult<GateSequence>
    {
        let n = self.check_depth(depth)?;
        if self.config.check_inputs {
            let dev = so3::so3_deviation(target);
            if !(dev <= self.config.tolerance) { return Err(SkError::NotSo3(dev)); }
        }
        tracing::debug!(depth = n, "synthesizing from SO(3)");
        Ok(self.run(target, n))
    }

    /// Find a word approximating a unitary up to global phase.
    ///
    /// The global phase of the result is that of the word, not of `target`.
    /// With `check_inputs` on, `U†U` must match the identity to within
    /// `tolerance` (default 1e-6). Matrices typed with few digits (e.g.
    /// 0.7071 for 1/√2, off by about 2e-5) are rejected with `NotUnitary`
    /// unless the tolerance is loosened or the check is disabled.
    pub fn synthesize_u2(&self, target: &na::Matrix2<C64>, depth: Depth)
        -> SkResult<GateSequence>
    {
        let n = self.check_depth(depth)?;
        let (rotation, phase) = so3::u2_to_so3(target)?;
        if self.config.check_inputs {
            let dev = so3::unitary_deviation(target);
            if !(dev <= self.config.tolerance) {
                return Err(SkError::NotUnitary(dev));
            }
        }
        tracing::debug!(depth = n, removed_phase = phase, "synthesizing from U(2)");
        Ok(self.run(&rotation, n))
    }

    /// Run the bare recursion on a sequence's product, without input checks or
    /// final cancellation. The depth cap still applies.
    pub fn approximate(&self, target: &GateSequence, depth: Depth)
        -> SkResult<GateSequence>
    {
        let n = self.check_depth(depth)?;
        Ok(self.recurse(target.product(), n))
    }

    fn check_depth(&self, depth: Depth) -> SkResult<usize> {
        let n = depth.get();
        if n > self.config.max_depth {
            return Err(SkError::DepthTooLarge { depth: n, max: self.config.max_depth });
        }
        Ok(n)
    }

    fn run(&self, target: &na::Matrix3<f64>, depth: usize) -> GateSequence {
        let seq = self.recurse(target, depth).clean();
        tracing::debug!(
            depth,
            gates = seq.len(),
            error = seq.distance(target),
            "synthesis finished"
        );
        seq
    }

    fn recurse(&self, target: &na::Matrix3<f64>, depth: usize) -> GateSequence {
        if depth == 0 { return self.table.find_closest(target); }

        let u_approx = self.recurse(target, depth - 1);
        let residual = target * u_approx.product().transpose();
        let (v, w) = balanced_commutator_decomposition(&residual);
        let (v_approx, w_approx)
            = if self.config.parallel && depth >= self.config.parallel_min_depth {
                rayon::join(
                    || self.recurse(v.product(), depth - 1),
                    || self.recurse(w.product(), depth - 1),
                )
            } else {
                (
                    self.recurse(v.product(), depth - 1),
                    self.recurse(w.product(), depth - 1),
                )
            };
        let seq
            = v_approx.dot(&w_approx)
            .dot(&v_approx.adjoint())
            .dot(&w_approx.adjoint())
            .dot(&u_approx);
        tracing::trace!(
            depth,
            gates = seq.len(),
            error = seq.distance(target),
            "recursion level done"
        );
        seq
    }
}

/// [`SolovayKitaev::synthesize_points`] with default settings and the
/// embedded table.
pub fn solovay_kitaev_from_points(from: &BlochPoint, to: &BlochPoint, depth: Depth)
    -> SkResult<GateSequence>
{
    SolovayKitaev::new(SynthConfig::default())?.synthesize_points(from, to, depth)
}

/// [`SolovayKitaev::synthesize_so3`] with default settings and the embedded
/// table.
pub fn solovay_kitaev_from_so3(target: &na::Matrix3<f64>, depth: Depth)
    -> SkResult<GateSequence>
{
    SolovayKitaev::new(SynthConfig::default())?.synthesize_so3(target, depth)
}

/// [`SolovayKitaev::synthesize_u2`] with default settings and the embedded
/// table.
pub fn solovay_kitaev_from_u2(target: &na::Matrix2<C64>, depth: Depth)
    -> SkResult<GateSequence>
{
    SolovayKitaev::new(SynthConfig::default())?.synthesize_u2(target, depth)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        gate::{ BasisGate, Gate },
        qubit::{ apply_sequence, calculate_statevector },
    };
    use rand::{ SeedableRng, rngs::StdRng };
    use BasisGate::*;

    fn synth() -> SolovayKitaev {
        SolovayKitaev::new(SynthConfig::default()).unwrap()
    }

    fn target(axis: [f64; 3], angle: f64) -> na::Matrix3<f64> {
        so3::axis_angle(&na::Vector3::from(axis).normalize(), angle)
    }

    fn moved_distance(seq: &GateSequence, from: &BlochPoint, to: &BlochPoint) -> f64 {
        apply_sequence(&calculate_statevector(from), seq).bloch().distance(to)
    }

    #[test]
    fn identity_at_depth_zero() {
        let seq = solovay_kitaev_from_so3(&na::Matrix3::identity(), Depth::new(0)).unwrap();
        assert!(seq.is_empty());
        assert!(seq.distance(&na::Matrix3::identity()) < 1e-12);
    }

    // Per-target monotonicity in depth is empirical: a few targets get worse
    // at some step (the table is finite), so this one uses targets checked to
    // improve at every step. `mean_convergence_random_targets` covers random
    // targets through the batch mean.
    #[test]
    fn convergence() {
        let targets = [
            ([1.0, 2.0, 3.0], 2.0),
            ([3.0, -1.0, 2.0], 2.5),
            ([1.0, 1.0, 1.0], 0.4),
            ([1.0, 0.0, 0.0], 1.3),
        ];
        let sk = synth();
        for (axis, angle) in targets {
            let r = target(axis, angle);
            let errors: Vec<f64>
                = (0..=3)
                .map(|n| sk.synthesize_so3(&r, Depth::new(n)).unwrap().distance(&r))
                .collect();
            for pair in errors.windows(2) {
                assert!(pair[1] <= pair[0] + 1e-6, "{:?}: {:?}", axis, errors);
            }
            assert!(errors[3] < 0.05, "{:?}: {:?}", axis, errors);
        }
    }

    #[test]
    fn mean_convergence_random_targets() {
        let sk = synth();
        let mut rng = StdRng::seed_from_u64(10546);
        let targets: Vec<na::Matrix3<f64>>
            = (0..20).map(|_| so3::sample_rotation(&mut rng)).collect();
        let means: Vec<f64>
            = (0..=3)
            .map(|n| {
                targets.iter()
                    .map(|r| sk.synthesize_so3(r, Depth::new(n)).unwrap().distance(r))
                    .sum::<f64>() / targets.len() as f64
            })
            .collect();
        for pair in means.windows(2) {
            assert!(pair[1] < pair[0], "{:?}", means);
        }
        assert!(means[3] < 0.05, "{:?}", means);
    }

    #[test]
    fn product_matches_word() {
        let sk = synth();
        let r = target([3.0, -1.0, 2.0], 2.5);
        for n in 0..=3 {
            let seq = sk.synthesize_so3(&r, Depth::new(n)).unwrap();
            assert!(
                so3::frobenius_distance(&seq.word_product(), seq.product()) < 1e-8);
        }
    }

    #[test]
    fn word_length_grows() {
        let sk = synth();
        let r = target([1.0, 2.0, 3.0], 2.0);
        let lens: Vec<usize>
            = (0..=3)
            .map(|n| sk.synthesize_so3(&r, Depth::new(n)).unwrap().len())
            .collect();
        assert!(lens.windows(2).all(|w| w[0] < w[1]), "{:?}", lens);
    }

    #[test]
    fn points_exact_at_depth_zero() {
        let z = BlochPoint::new(0.0, 0.0, 1.0);
        for to in [BlochPoint::new(1.0, 0.0, 0.0), BlochPoint::new(0.0, 1.0, 0.0)] {
            let seq = solovay_kitaev_from_points(&z, &to, Depth::new(0)).unwrap();
            assert!(moved_distance(&seq, &z, &to) < 1e-9, "{} -> {}: {}", z, to, seq);
        }
    }

    #[test]
    fn points_converge() {
        let sk = synth();
        let from = BlochPoint::new(1.0, 0.0, 0.0);
        let to = BlochPoint::new(0.0, 0.6, 0.8);
        let d0 = moved_distance(&sk.synthesize_points(&from, &to, Depth::new(0)).unwrap(), &from, &to);
        let d3 = moved_distance(&sk.synthesize_points(&from, &to, Depth::new(3)).unwrap(), &from, &to);
        assert!(d3 < 0.01);
        assert!(d3 < d0);

        let from = BlochPoint::new(0.6, 0.0, 0.8);
        let to = BlochPoint::new(0.0, -1.0, 0.0);
        let seq = sk.synthesize_points(&from, &to, Depth::new(3)).unwrap();
        assert!(moved_distance(&seq, &from, &to) < 0.01);
    }

    #[test]
    fn points_rejected() {
        let z = BlochPoint::new(0.0, 0.0, 1.0);
        let sk = synth();
        assert!(matches!(
            sk.synthesize_points(&z, &BlochPoint::new(0.0, 0.0, -1.0), Depth::new(1)),
            Err(SkError::DegeneratePoints(_))
        ));
        assert!(matches!(
            sk.synthesize_points(&z, &BlochPoint::new(0.0, 0.0, 2.0), Depth::new(1)),
            Err(SkError::DegeneratePoints(_))
        ));
        assert!(matches!(
            sk.synthesize_points(&z, &BlochPoint::new(0.0, 0.0, 0.0), Depth::new(1)),
            Err(SkError::InvalidPoint(..))
        ));
    }

    #[test]
    fn u2_exact_gates() {
        let sk = synth();
        let cases = [
            (Gate::T, vec![T]),
            (Gate::Tdg, vec![Tdg]),
            (Gate::H, vec![H]),
            (Gate::S, vec![T, T]),
        ];
        for (gate, word) in cases {
            let seq = sk.synthesize_u2(&gate.matrix(), Depth::new(0)).unwrap();
            assert_eq!(seq.gates(), word.as_slice());
            let shifted = gate.matrix() * C64::from_polar(1.0, 0.3);
            let seq = sk.synthesize_u2(&shifted, Depth::new(0)).unwrap();
            assert_eq!(seq.gates(), word.as_slice());
        }
    }

    #[test]
    fn u2_rejected() {
        let sk = synth();
        let zero = na::Matrix2::<C64>::zeros();
        assert!(matches!(
            sk.synthesize_u2(&zero, Depth::new(1)),
            Err(SkError::SingularTarget(_))
        ));
        let squeeze = na::Matrix2::new(
            C64::from(2.0), C64::from(0.0),
            C64::from(0.0), C64::from(0.5),
        );
        assert!(matches!(
            sk.synthesize_u2(&squeeze, Depth::new(1)),
            Err(SkError::NotUnitary(_))
        ));
    }

    #[test]
    fn so3_rejected_unless_unchecked() {
        let scaled = na::Matrix3::identity() * 2.0;
        assert!(matches!(
            synth().synthesize_so3(&scaled, Depth::new(0)),
            Err(SkError::NotSo3(_))
        ));
        let config = SynthConfig { check_inputs: false, ..Default::default() };
        let sk = SolovayKitaev::new(config).unwrap();
        assert!(sk.synthesize_so3(&scaled, Depth::new(0)).is_ok());
    }

    #[test]
    fn depth_parsing() {
        assert_eq!(Depth::try_from(3_i64).unwrap(), Depth::new(3));
        assert_eq!(Depth::try_from(2.0_f64).unwrap().get(), 2);
        assert_eq!("0".parse::<Depth>().unwrap(), Depth::new(0));
        assert_eq!(" 4 ".parse::<Depth>().unwrap(), Depth::new(4));
        assert_eq!("1.0".parse::<Depth>().unwrap(), Depth::new(1));
        assert!(matches!(Depth::try_from(-1_i64), Err(SkError::InvalidDepth(_))));
        assert!(Depth::try_from(1.5_f64).is_err());
        assert!(Depth::try_from(f64::NAN).is_err());
        assert!(Depth::try_from(f64::INFINITY).is_err());
        assert!("-2".parse::<Depth>().is_err());
        assert!("deep".parse::<Depth>().is_err());
    }

    #[test]
    fn depth_capped() {
        let config = SynthConfig { max_depth: 2, ..Default::default() };
        let sk = SolovayKitaev::new(config).unwrap();
        let r = target([1.0, 1.0, 1.0], 0.4);
        assert!(matches!(
            sk.synthesize_so3(&r, Depth::new(3)),
            Err(SkError::DepthTooLarge { depth: 3, max: 2 })
        ));
        assert!(sk.synthesize_so3(&r, Depth::new(2)).is_ok());
    }

    #[test]
    fn approximate_capped() {
        let config = SynthConfig { max_depth: 2, ..Default::default() };
        let sk = SolovayKitaev::new(config).unwrap();
        let seq = GateSequence::from_so3(target([1.0, 2.0, 3.0], 2.0));
        assert!(matches!(
            sk.approximate(&seq, Depth::new(3)),
            Err(SkError::DepthTooLarge { depth: 3, max: 2 })
        ));
        assert!(matches!(
            synth().approximate(&seq, Depth::new(20)),
            Err(SkError::DepthTooLarge { depth: 20, max: 8 })
        ));
        assert!(sk.approximate(&seq, Depth::new(2)).is_ok());
    }

    #[test]
    fn u2_tolerance_for_rounded_entries() {
        let r = C64::from(0.7071);
        let rounded_h = na::Matrix2::new(r, r, r, -r);
        assert!(matches!(
            synth().synthesize_u2(&rounded_h, Depth::new(0)),
            Err(SkError::NotUnitary(dev)) if dev > 1e-6 && dev < 1e-4
        ));
        let config = SynthConfig { tolerance: 1e-4, ..Default::default() };
        let sk = SolovayKitaev::new(config).unwrap();
        let seq = sk.synthesize_u2(&rounded_h, Depth::new(0)).unwrap();
        assert_eq!(seq.gates(), &[H]);
    }

    #[test]
    fn parallel_matches_sequential() {
        let sequential = synth();
        let config
            = SynthConfig { parallel: true, parallel_min_depth: 1, ..Default::default() };
        let parallel = SolovayKitaev::with_table(sequential.table().clone(), config).unwrap();
        let r = target([3.0, -1.0, 2.0], 2.5);
        let a = sequential.synthesize_so3(&r, Depth::new(3)).unwrap();
        let b = parallel.synthesize_so3(&r, Depth::new(3)).unwrap();
        assert_eq!(a.gates(), b.gates());
        assert_eq!(a.product(), b.product());
    }

    #[test]
    fn approximate_keeps_cancellations() {
        let sk = synth();
        let r = target([1.0, 2.0, 3.0], 2.0);
        let raw = sk.approximate(&GateSequence::from_so3(r), Depth::new(2)).unwrap();
        let cleaned = sk.synthesize_so3(&r, Depth::new(2)).unwrap();
        assert!(raw.len() >= cleaned.len());
        assert_eq!(raw.clean().gates(), cleaned.gates());
    }

    #[test]
    fn missing_table_file() {
        let config = SynthConfig {
            table_path: Some("/nonexistent/table.json".into()),
            ..Default::default()
        };
        assert!(matches!(SolovayKitaev::new(config), Err(SkError::Io(_))));
    }
}
