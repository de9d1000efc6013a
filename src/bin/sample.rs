//! Draw the evaluation sample of every configured seed and write it to the
//! sample directory, one snippet path per line.

use clap::Parser;
use cloneeval::{Config, EvalSession};
use std::path::PathBuf;

/// Draw and persist evaluation samples.
#[derive(Parser, Debug)]
#[command(name = "sample")]
struct Args {
    /// Config file (default: $CLONEEVAL_CONFIG or ./config.toml).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Only this seed instead of every configured one.
    #[arg(long)]
    seed: Option<u64>,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let config = match &args.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    let seeds = match args.seed {
        Some(seed) => vec![seed],
        None => config.sampling.seeds.clone(),
    };

    let session = EvalSession::open(config);
    let degraded = session.inputs_degraded();
    if degraded {
        log::warn!("Sampling with unavailable inputs; samples will not be written");
    }

    for seed in seeds {
        let sample = session.draw_and_persist(seed)?;
        if degraded {
            println!("seed {:>8}: {:>5} files (not written)", seed, sample.len());
        } else {
            println!(
                "seed {:>8}: {:>5} files -> {}",
                seed,
                sample.len(),
                session.config.sample_path(seed).display()
            );
        }
    }

    Ok(())
}
