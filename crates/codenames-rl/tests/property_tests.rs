//! Property-based tests for the reward engine using proptest.
//!
//! Validates invariants that must hold for ALL valid arguments:
//! - Expected reward of a guess reproduces its KL contribution
//! - Accept recursion bottoms out at zero
//! - Memoized and uncached rewards are bit-identical
//! - Calibration stays inside [0, 1]

use codenames_core::{Game, Oversight};
use codenames_rl::{
    approximate_calibrate_p, base_probability, initial_reward_reject, log_odds, reward_accept,
    reward_reject, RewardEngine,
};
use proptest::prelude::*;

/// Relative closeness, scaled by the largest magnitude involved.
fn close(a: f64, b: f64, scale: f64, tol: f64) -> bool {
    (a - b).abs() <= tol * scale.max(1.0)
}

proptest! {
    /// Property: p * accept(n) + (1 - p) * reject(n) = kl * delta + accept(n - 1).
    #[test]
    fn expected_reward_matches_kl_step(
        bad in 1usize..20,
        n in 1usize..8,
        kl in 0.001f64..2.0,
        p in 0.05f64..0.95,
    ) {
        let accept = reward_accept(bad, n, kl, p);
        let reject = reward_reject(bad, n, kl, p);
        let previous = reward_accept(bad, n - 1, kl, p);
        let step = kl * (log_odds(p) - log_odds(base_probability(bad)));

        let lhs = p * accept + (1.0 - p) * reject;
        let rhs = step + previous;
        let scale = (p * accept).abs().max(reject.abs()).max(previous.abs());
        prop_assert!(
            close(lhs, rhs, scale, 1e-9),
            "bad={} n={} kl={} p={}: lhs={} rhs={}",
            bad, n, kl, p, lhs, rhs
        );
    }

    /// Property: accept(0) is exactly zero and reject(1) is the initial reward.
    #[test]
    fn recursion_base_cases(bad in 1usize..50, kl in 0.001f64..5.0, p in 0.001f64..0.999) {
        prop_assert_eq!(reward_accept(bad, 0, kl, p), 0.0);
        prop_assert_eq!(reward_reject(bad, 1, kl, p), initial_reward_reject(bad, kl, p));
    }

    /// Property: each extra claimed target adds exactly one KL step to reject.
    #[test]
    fn reject_is_linear_in_targets(
        bad in 1usize..20,
        n in 1usize..10,
        kl in 0.001f64..2.0,
        p in 0.01f64..0.99,
    ) {
        let step = kl * (log_odds(p) - log_odds(base_probability(bad)));
        let diff = reward_reject(bad, n + 1, kl, p) - reward_reject(bad, n, kl, p);
        prop_assert!(close(diff, step, step.abs(), 1e-9), "diff={} step={}", diff, step);
    }

    /// Property: memoization never changes a result.
    #[test]
    fn memoization_is_transparent(
        bad in 1usize..20,
        n in 0usize..8,
        kl in 0.001f64..2.0,
        p in 0.01f64..0.99,
    ) {
        let engine = RewardEngine::new();
        let cold = engine.reward_accept(bad, n, kl, p);
        let warm = engine.reward_accept(bad, n, kl, p);
        engine.clear_cache();
        let cleared = engine.reward_reject(bad, n, kl, p);

        prop_assert_eq!(cold.to_bits(), warm.to_bits());
        prop_assert_eq!(cold.to_bits(), reward_accept(bad, n, kl, p).to_bits());
        prop_assert_eq!(cleared.to_bits(), reward_reject(bad, n, kl, p).to_bits());
    }

    /// Property: log-odds is antisymmetric about 0.5 and increasing.
    #[test]
    fn log_odds_shape(p in 0.001f64..0.999, q in 0.001f64..0.999) {
        prop_assert!((log_odds(p) + log_odds(1.0 - p)).abs() < 1e-9);
        if p < q {
            prop_assert!(log_odds(p) < log_odds(q));
        }
    }

    /// Property: base probability is in (0, 1] and strictly decreasing.
    #[test]
    fn base_probability_decreasing(bad in 0usize..10_000) {
        let b = base_probability(bad);
        prop_assert!(b > 0.0 && b <= 1.0);
        prop_assert!(base_probability(bad + 1) < b);
    }

    /// Property: calibration is inside [0, 1] when no verdict reports more
    /// survivors than its game has good words.
    #[test]
    fn calibration_in_unit_interval(
        outcomes in prop::collection::vec((1usize..6, prop::option::of(0usize..6)), 0..20)
    ) {
        let games: Vec<Game> = outcomes
            .iter()
            .map(|&(n_good, _)| {
                Game::new((0..n_good).map(|i| format!("w{}", i)).collect(), vec!["x".into()])
                    .unwrap()
            })
            .collect();
        let oversights: Vec<Option<Oversight>> = outcomes
            .iter()
            .map(|&(n_good, surviving)| {
                surviving.map(|k| {
                    Oversight::new((0..k.min(n_good)).map(|i| format!("w{}", i)).collect())
                })
            })
            .collect();

        let p = approximate_calibrate_p(&oversights, &games);
        prop_assert!((0.0..=1.0).contains(&p), "p={}", p);
        if oversights.iter().all(Option::is_none) {
            prop_assert_eq!(p, 0.5);
        }
    }
}
