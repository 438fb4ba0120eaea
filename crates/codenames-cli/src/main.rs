//! Command-line reward scoring for judged codenames clues.
//!
//! Provides subcommands:
//! - score: Score a JSONL batch of judged clues
//! - table: Print accept/reject rewards for one parameter set
//! - init-config: Write the default configuration

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use codenames_core::{AppConfig, JudgedClue};
use codenames_rl::logging::{init_console_logging, log_batch_rewards};
use codenames_rl::{base_probability, log_odds, RewardEngine, RewardParams, RewardScorer};
use colored::Colorize;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

#[derive(Parser)]
#[command(name = "codenames")]
#[command(about = "Calibrated rewards for debate-supervised clue giving", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to TOML config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Score a batch of judged clues (one JSON object per line)
    Score {
        /// Input JSONL file
        #[arg(short, long)]
        input: PathBuf,

        /// Output JSONL file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Override the configured KL coefficient
        #[arg(long)]
        kl_coeff: Option<f64>,
    },

    /// Print rewards for n = 0..=max_targets
    Table {
        /// Bad words on the board
        #[arg(short, long)]
        bad_words: usize,

        /// Largest claimed target count
        #[arg(short = 'n', long, default_value = "4")]
        max_targets: usize,

        /// Calibrated acceptance probability
        #[arg(short = 'p', long)]
        calibrated_p: f64,

        /// Override the configured KL coefficient
        #[arg(long)]
        kl_coeff: Option<f64>,
    },

    /// Write the default configuration to a TOML file
    InitConfig {
        /// Destination path
        #[arg(short, long, default_value = "codenames.toml")]
        path: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => AppConfig::from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => AppConfig::default(),
    };
    init_console_logging(&config.log_level);

    match cli.command {
        Commands::Score {
            input,
            output,
            kl_coeff,
        } => {
            if let Some(kl) = kl_coeff {
                config.reward.kl_coeff = kl;
            }
            score_batch(&config, &input, output.as_deref())?
        }

        Commands::Table {
            bad_words,
            max_targets,
            calibrated_p,
            kl_coeff,
        } => {
            let kl = kl_coeff.unwrap_or(config.reward.kl_coeff);
            print_table(bad_words, max_targets, kl, calibrated_p)?
        }

        Commands::InitConfig { path } => {
            AppConfig::default()
                .save(&path)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!("{} Wrote default config to {}", "✓".green(), path.display());
        }
    }

    Ok(())
}

fn load_batch(path: &Path) -> anyhow::Result<Vec<JudgedClue>> {
    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    let mut samples = Vec::new();
    for (line_no, line) in BufReader::new(file).lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let sample: JudgedClue = serde_json::from_str(&line)
            .with_context(|| format!("{}:{}: invalid judged clue", path.display(), line_no + 1))?;
        samples.push(sample);
    }
    Ok(samples)
}

fn score_batch(config: &AppConfig, input: &Path, output: Option<&Path>) -> anyhow::Result<()> {
    let scorer = RewardScorer::new(config.reward.clone()).context("Invalid reward config")?;

    eprintln!("{}", "Loading batch...".yellow());
    let samples = load_batch(input)?;
    if samples.is_empty() {
        bail!("{} contains no samples", input.display());
    }

    let start = Instant::now();
    let batch = scorer.score_batch(&samples)?;
    let elapsed = start.elapsed();
    log_batch_rewards(0, &batch);

    let mut writer: Box<dyn Write> = match output {
        Some(path) => Box::new(BufWriter::new(
            File::create(path).with_context(|| format!("Failed to create {}", path.display()))?,
        )),
        None => Box::new(BufWriter::new(std::io::stdout().lock())),
    };
    for sample in &batch.samples {
        serde_json::to_writer(&mut writer, sample)?;
        writeln!(writer)?;
    }
    writer.flush()?;

    let stats = &batch.stats;
    eprintln!(
        "{} Scored {} samples in {:.2}ms",
        "✓".green(),
        stats.n_samples,
        elapsed.as_secs_f64() * 1e3
    );
    eprintln!(
        "  {} p={:.4} (raw {:.4}){}{}",
        "Calibration:".cyan(),
        batch.calibrated_p,
        batch.raw_calibrated_p,
        if batch.used_fallback { " [fallback]".yellow().to_string() } else { String::new() },
        if batch.clamped { " [clamped]".yellow().to_string() } else { String::new() },
    );
    eprintln!(
        "  {} judged={}, failed={}, accepted={} ({:.1}%)",
        "Samples:".cyan(),
        stats.n_judged,
        stats.n_failed,
        stats.n_accepted,
        stats.acceptance_rate * 100.0
    );
    eprintln!(
        "  {} mean={:.4}, std={:.4}",
        "Reward:".cyan(),
        stats.mean_reward,
        stats.reward_std
    );

    Ok(())
}

fn print_table(bad_words: usize, max_targets: usize, kl: f64, p: f64) -> anyhow::Result<()> {
    RewardParams {
        bad_words_in_game: bad_words,
        n_targets: max_targets,
        kl_coeff: kl,
        calibrated_p: p,
    }
    .validate()?;

    let engine = RewardEngine::global();
    let step = kl * (log_odds(p) - log_odds(base_probability(bad_words)));

    println!("{}", "Reward table".bold().cyan());
    println!(
        "  bad_words={}, base_p={:.4}, calibrated_p={:.4}, kl_coeff={}, kl_step={:.6}",
        bad_words,
        base_probability(bad_words),
        p,
        kl,
        step
    );
    println!();
    println!(
        "{:>4}  {:>16}  {:>16}  {:>12}",
        "n".bold(),
        "accept".bold(),
        "reject".bold(),
        "residual".bold()
    );

    for n in 0..=max_targets {
        let accept = engine.reward_accept(bad_words, n, kl, p);
        let reject = engine.reward_reject(bad_words, n, kl, p);
        let residual = if n == 0 {
            "-".dimmed().to_string()
        } else {
            let previous = engine.reward_accept(bad_words, n - 1, kl, p);
            let r = p * accept + (1.0 - p) * reject - (step + previous);
            format!("{:.3e}", r)
        };
        println!("{:>4}  {:>16.6}  {:>16.6}  {:>12}", n, accept, reject, residual);
    }

    Ok(())
}
