//! Example: score a small synthetic batch of judged clues
//!
//! Builds a handful of games, judges some clues, calibrates the batch and
//! prints the per-sample rewards.
//!
//! Usage:
//!   cargo run -p codenames-rl --example score_demo

use codenames_core::{Clue, Game, JudgedClue, Oversight, RewardConfig, Result};
use codenames_rl::logging::{init_console_logging, log_batch_rewards};
use codenames_rl::RewardScorer;

fn game(good: &[&str], bad: &[&str]) -> Result<Game> {
    Game::new(
        good.iter().map(|w| w.to_string()).collect(),
        bad.iter().map(|w| w.to_string()).collect(),
    )
}

fn main() -> Result<()> {
    init_console_logging("info");

    let batch = vec![
        JudgedClue::new(
            game(&["ocean", "wave", "sand"], &["desert", "snow"])?,
            "Beach, 2".parse()?,
            Some(Oversight::new(vec!["wave".into(), "sand".into()])),
        )?,
        JudgedClue::new(
            game(&["paris", "rome", "berlin", "tokyo"], &["london", "ice", "moon"])?,
            Clue::new("capital", 3),
            Some(Oversight::new(vec!["paris".into()])),
        )?,
        JudgedClue::new(
            game(&["apple", "pear"], &["stone"])?,
            Clue::new("fruit", 2),
            None,
        )?,
    ];

    let scorer = RewardScorer::new(RewardConfig::default())?;
    let rewards = scorer.score_batch(&batch)?;
    log_batch_rewards(0, &rewards);

    println!("calibrated_p = {:.4}", rewards.calibrated_p);
    for (sample, judged) in rewards.samples.iter().zip(&batch) {
        let clue = judged.clue().to_string();
        match (sample.reward, &sample.error) {
            (Some(r), _) => println!(
                "  {:<12} accepted={:<5} reward={:+.4}",
                clue,
                sample.accepted.unwrap_or(false),
                r
            ),
            (None, Some(e)) => println!("  {:<12} failed: {}", clue, e),
            (None, None) => println!("  {:<12} (not judged)", clue),
        }
    }
    println!(
        "mean = {:+.4}, std = {:.4}",
        rewards.stats.mean_reward, rewards.stats.reward_std
    );

    Ok(())
}
