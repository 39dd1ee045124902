use std::path::PathBuf;
use rand::{ SeedableRng, rngs::StdRng };
use rayon::prelude::*;
use serde::Serialize;
use sk_synth::{ so3, Depth, SkResult, SolovayKitaev, SynthConfig };
use tracing_subscriber::EnvFilter;

const SEED: u64 = 10546;
const MC: usize = 100; // number of sampled targets
const MAX_DEPTH: usize = 4;

#[derive(Serialize)]
struct DepthStats {
    depth: usize,
    error_mean: f64,
    error_std: f64,
    length_mean: f64,
}

fn mean_std(vals: &[f64]) -> (f64, f64) {
    let n = vals.len() as f64;
    let mean: f64 = vals.iter().sum::<f64>() / n;
    let std: f64
        = vals.iter()
        .map(|v| (v - mean).powi(2))
        .sum::<f64>()
        .sqrt() / n.sqrt();
    (mean, std)
}

fn main() -> SkResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let sk = SolovayKitaev::new(SynthConfig::from_env())?;
    let mut rng = StdRng::seed_from_u64(SEED);
    let targets: Vec<_>
        = (0..MC).map(|_| so3::sample_rotation(&mut rng)).collect();

    let mut stats: Vec<DepthStats> = Vec::with_capacity(MAX_DEPTH + 1);
    for depth in 0..=MAX_DEPTH {
        let results: Vec<(f64, f64)>
            = targets.par_iter()
            .map(|r| {
                sk.synthesize_so3(r, Depth::new(depth))
                    .map(|seq| (seq.distance(r), seq.len() as f64))
            })
            .collect::<SkResult<_>>()?;
        let (errors, lengths): (Vec<f64>, Vec<f64>) = results.into_iter().unzip();
        let (error_mean, error_std) = mean_std(&errors);
        let (length_mean, _) = mean_std(&lengths);
        println!(
            "n = {}: error = {:.3e} ± {:.3e}; length = {:.1}",
            depth, error_mean, error_std, length_mean,
        );
        stats.push(DepthStats { depth, error_mean, error_std, length_mean });
    }

    let outdir = PathBuf::from("output");
    std::fs::create_dir_all(&outdir)?;
    let out = serde_json::to_string_pretty(&stats)?;
    std::fs::write(outdir.join("convergence.json"), out)?;
    Ok(())
}
