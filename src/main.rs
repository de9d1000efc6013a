use anyhow::Result;
use cloneeval::{Config, EvalSession};

fn main() -> Result<()> {
    env_logger::Builder::from_env(
        env_logger::Env::default()
            .filter_or("RUST_LOG", "info")
    ).init();

    let args: Vec<String> = std::env::args().collect();
    let command = args.get(1).map(|s| s.as_str()).unwrap_or("verify");

    match command {
        "verify" => run_verification()?,
        other => {
            anyhow::bail!(
                "Unknown command: {}\nUsage: cloneeval [verify]\nUse the `sample` and `eval` binaries to draw samples and compute metrics.",
                other
            );
        }
    }

    Ok(())
}

/// Load the configuration and check that every input of the run can be read
fn run_verification() -> Result<()> {
    log::info!("Starting cloneeval v{}", env!("CARGO_PKG_VERSION"));

    let config = Config::load()?;
    log::info!("Configuration loaded successfully");
    log::info!("Corpus: {}", config.corpus_dir().display());
    log::info!("Ground truth: {}", config.ground_truth.path.display());
    log::info!("Technique: {} ({})", config.evaluation.technique, config.evaluation.filter.label());

    let session = EvalSession::open(config);

    let mut degraded = 0;
    for (name, status) in session.input_statuses() {
        match status.to_error() {
            Some(e) => {
                log::error!("✗ {}: {}", name, e);
                degraded += 1;
            }
            None => log::info!("✓ {} available", name),
        }
    }

    log::info!("✓ {} files in corpus", session.corpus.len());
    log::info!("✓ {} files with known clones", session.ground_truth.len());
    log::info!("Stratum: {}", session.stratum().describe());

    for &seed in &session.config.sampling.seeds {
        let scores = session.config.scores_path(seed);
        if scores.is_file() {
            log::debug!("✓ Score matrix for seed {}: {}", seed, scores.display());
        } else {
            log::warn!("Score matrix for seed {} not found: {}", seed, scores.display());
        }
        let sample = session.config.sample_path(seed);
        if sample.is_file() {
            log::debug!("✓ Persisted sample for seed {}: {}", seed, sample.display());
        }
    }

    if degraded > 0 {
        anyhow::bail!("{} input(s) unavailable; metrics would be degenerate", degraded);
    }

    log::info!("✓ Verification complete");
    Ok(())
}
