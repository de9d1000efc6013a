//! Evaluation CLI: score every configured seed and report P@5, P@10, MRR, MAP.

use clap::Parser;
use cloneeval::{eval::MetricsRow, Config, EvalSession};
use std::path::PathBuf;

/// Evaluate a technique's score matrices against the ground truth.
#[derive(Parser, Debug)]
#[command(name = "eval")]
struct Args {
    /// Config file (default: $CLONEEVAL_CONFIG or ./config.toml).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Only this seed instead of every configured one.
    #[arg(long)]
    seed: Option<u64>,

    /// Print per-query scores.
    #[arg(long)]
    verbose: bool,
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
    for (name, status) in session.input_statuses() {
        if let Some(e) = status.to_error() {
            println!("warning: {} unavailable: {}", name, e);
        }
    }

    println!(
        "Evaluating {} on functionality {} ({} seeds, {})\n",
        session.config.evaluation.technique,
        session.config.corpus.functionality,
        seeds.len(),
        session.config.evaluation.filter.label()
    );

    let mut rows = Vec::with_capacity(seeds.len());
    for seed in seeds {
        let (report, row) = session.run_seed(seed)?;

        if args.verbose {
            for q in &report.queries {
                println!(
                    "  {} (gt: {}, ranked: {}, P@5: {:.2}, RR: {:.2}, AP: {:.2}){}",
                    q.query,
                    q.relevant,
                    q.retrieved,
                    q.precision_at_5,
                    q.reciprocal_rank,
                    q.average_precision,
                    if q.missing_row { " [no scores]" } else { "" }
                );
            }
        }

        let s = &report.summary;
        println!(
            "seed {:>8}: P@5 {:.4}  P@10 {:.4}  MRR {:.4} ({}/{})  MAP {:.4} ({}/{})  {:.2}s{}",
            seed,
            s.precision_at_5,
            s.precision_at_10,
            s.mrr,
            s.mrr_queries,
            s.queries,
            s.map,
            s.map_queries,
            s.queries,
            row.elapsed_secs,
            if report.inputs_degraded { "  [inputs unavailable]" } else { "" }
        );
        rows.push(row);
    }

    if rows.len() > 1 {
        println!("\n=== Mean over {} seeds ===", rows.len());
        let across = |f: fn(&MetricsRow) -> f64| rows.iter().map(f).sum::<f64>() / rows.len() as f64;
        println!("Precision@5:  {:.4}", across(|r| r.precision_at_5));
        println!("Precision@10: {:.4}", across(|r| r.precision_at_10));
        println!("MRR:          {:.4}", across(|r| r.mrr));
        println!("MAP:          {:.4}", across(|r| r.map));
    }
    println!("\nMetrics appended to {}", session.metrics_path().display());

    Ok(())
}
