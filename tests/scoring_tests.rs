//! End-of-session grading
//!
//! Covers:
//! - count-based tiers for the matching games
//! - time-and-attempts accuracy for the sequencing game
//! - unlock on the maximum tier

use playmatch::config::EngineConfig;
use playmatch::game::score::{Grading, ScoreEngine, attempts_score, time_score, timed_accuracy};
use playmatch::game::{Emphasis, GameKind, GameSession, RoundGenerator};

#[test]
fn fast_first_try_sequence_is_three_stars() {
    assert_eq!(attempts_score(1), 50.0);
    assert_eq!(time_score(8_000), 50.0);
    assert_eq!(timed_accuracy(1, 8_000), 100.0);

    let mut engine = ScoreEngine::new(Grading::TimeAndAttempts);
    engine.set_attempts(1);
    engine.set_elapsed_ms(8_000);
    let tier = engine.finalize();
    assert_eq!(tier.stars, 3);
    assert_eq!(tier.emphasis, Emphasis::Gold);
    assert!(engine.unlock_earned());
}

#[test]
fn slow_fifth_try_sequence_is_zero_stars() {
    assert_eq!(timed_accuracy(5, 60_000), 0.0);

    let mut engine = ScoreEngine::new(Grading::TimeAndAttempts);
    for _ in 0..5 {
        engine.record_attempt();
    }
    engine.set_elapsed_ms(60_000);
    assert_eq!(engine.finalize().stars, 0);
    assert!(!engine.unlock_earned());
}

#[test]
fn timed_middle_ground() {
    // 2 attempts → 37.5, 20 s → 40.0
    let accuracy = timed_accuracy(2, 20_000);
    assert!((accuracy - 77.5).abs() < 1e-9);

    let mut engine = ScoreEngine::new(Grading::TimeAndAttempts);
    engine.set_attempts(4);
    engine.set_elapsed_ms(40_000);
    // 12.5 + 20.0
    assert_eq!(engine.score(), 33);
    assert_eq!(engine.finalize().stars, 1);
}

#[test]
fn three_of_five_matching_rounds() {
    let mut engine = ScoreEngine::new(GameKind::MoodMatch.default_grading());
    for correct in [true, false, true, true, false] {
        engine.record_outcome(correct);
    }
    assert_eq!(engine.score(), 60);
    let tier = engine.finalize();
    assert_eq!(tier.stars, 2);
    assert_eq!(tier.label, "Great Job");
}

#[test]
fn configured_points_flow_into_session_score() {
    let config = EngineConfig::from_toml_str("[scoring]\npoints_per_round = 10\n").unwrap();
    let catalog = GameKind::RhythmKeyword.catalog(Some("row-your-boat")).unwrap();
    let mut session = GameSession::new(
        config.session_setup(GameKind::RhythmKeyword),
        catalog,
        config.asset_validator().unwrap(),
        RoundGenerator::seeded(21),
    );
    let mut last_score = 0;
    for number in 1..=5 {
        let correct_index = session.next_round().unwrap().correct_index;
        let outcome = session.select(number, correct_index).unwrap();
        assert!(outcome.correct);
        last_score = outcome.score;
    }
    assert_eq!(last_score, 50);
    let summary = session.summary();
    assert_eq!(summary.tier.stars, 3);
    assert!(summary.unlock_earned);

    let json = serde_json::to_value(&summary).unwrap();
    assert_eq!(json["tier"]["label"], "Victory");
    assert_eq!(json["tier"]["emphasis"], "gold");
}
