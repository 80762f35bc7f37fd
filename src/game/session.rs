use rand::Rng;
use rand::rngs::StdRng;
use serde::Serialize;
use tracing::{debug, info};

use super::assets::AssetValidator;
use super::catalog::ConceptCatalog;
use super::presets::GameKind;
use super::round::{DEFAULT_RETRY_BUDGET, Round, RoundGenerator};
use super::score::{DEFAULT_POINTS_PER_ROUND, ScoreEngine, ScoreState, Tier};
use super::tracker::{DEFAULT_REUSE_FRACTION, SessionTracker};
use crate::{Error, Result};

/// Per-session knobs. Usually built from `EngineConfig::session_setup`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SessionSetup {
    pub kind: GameKind,
    pub option_count: usize,
    pub rounds: u32,
    pub points_per_round: u32,
    pub reuse_fraction: f64,
    pub retry_budget: u32,
}

impl SessionSetup {
    pub fn for_kind(kind: GameKind) -> Self {
        let (option_count, rounds) = kind.config();
        SessionSetup {
            kind,
            option_count,
            rounds,
            points_per_round: DEFAULT_POINTS_PER_ROUND,
            reuse_fraction: DEFAULT_REUSE_FRACTION,
            retry_budget: DEFAULT_RETRY_BUDGET,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct AnswerOutcome {
    pub round: u32,
    pub selected: usize,
    pub correct_index: usize,
    pub correct: bool,
    pub score: u32,
    pub finished: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SessionSummary {
    pub kind: GameKind,
    pub catalog: String,
    pub rounds_played: u32,
    pub state: ScoreState,
    pub score: u32,
    pub tier: Tier,
    pub unlock_earned: bool,
}

/// One matching-game screen: catalog, usage tracking, scoring and the
/// answer-selected input lock.
pub struct GameSession<R = StdRng> {
    setup: SessionSetup,
    catalog: ConceptCatalog,
    assets: AssetValidator,
    tracker: SessionTracker,
    generator: RoundGenerator<R>,
    score: ScoreEngine,
    rounds_started: u32,
    current: Option<Round>,
    answer_selected: bool,
}

impl<R: Rng> GameSession<R> {
    pub fn new(
        setup: SessionSetup,
        catalog: ConceptCatalog,
        assets: AssetValidator,
        generator: RoundGenerator<R>,
    ) -> Self {
        info!(
            "{} session on '{}': {} rounds, {} options",
            setup.kind.name(),
            catalog.name(),
            setup.rounds,
            setup.option_count
        );
        GameSession {
            tracker: SessionTracker::with_reuse_fraction(setup.reuse_fraction),
            generator: generator.with_retry_budget(setup.retry_budget),
            score: ScoreEngine::new(setup.kind.grading(setup.rounds, setup.points_per_round)),
            setup,
            catalog,
            assets,
            rounds_started: 0,
            current: None,
            answer_selected: false,
        }
    }

    pub fn setup(&self) -> &SessionSetup {
        &self.setup
    }

    pub fn catalog(&self) -> &ConceptCatalog {
        &self.catalog
    }

    pub fn tracker(&self) -> &SessionTracker {
        &self.tracker
    }

    pub fn score(&self) -> &ScoreEngine {
        &self.score
    }

    pub fn current_round(&self) -> Option<&Round> {
        self.current.as_ref()
    }

    /// 1-based number of the round on screen, 0 before the first round.
    pub fn round_number(&self) -> u32 {
        self.rounds_started
    }

    pub fn rounds_played(&self) -> u32 {
        self.score.state().total_rounds
    }

    pub fn is_input_locked(&self) -> bool {
        self.current.is_none() || self.answer_selected
    }

    pub fn is_finished(&self) -> bool {
        self.rounds_played() >= self.setup.rounds
    }

    pub fn next_round(&mut self) -> Result<&Round> {
        if self.current.is_some() && !self.answer_selected {
            return Err(Error::RoundPending(self.rounds_started));
        }
        if self.is_finished() {
            return Err(Error::SessionFinished(self.rounds_played()));
        }

        let round = self.generator.next_round(
            &self.catalog,
            &mut self.tracker,
            &self.assets,
            self.setup.option_count,
        )?;
        self.rounds_started += 1;
        self.answer_selected = false;
        debug!("Round {} of {} ready", self.rounds_started, self.setup.rounds);
        Ok(self.current.insert(round))
    }

    /// Records the first selection for `round`. Repeat taps, taps for a stale round
    /// and taps with no round on screen are ignored.
    pub fn select(&mut self, round: u32, index: usize) -> Option<AnswerOutcome> {
        if round != self.rounds_started || self.is_input_locked() {
            debug!("Ignoring selection {} for round {}", index, round);
            return None;
        }
        let current = self.current.as_ref()?;
        if index >= current.options.len() {
            return None;
        }

        self.answer_selected = true;
        let correct = current.is_correct(index);
        let correct_index = current.correct_index;
        self.score.record_outcome(correct);

        Some(AnswerOutcome {
            round,
            selected: index,
            correct_index,
            correct,
            score: self.score.score(),
            finished: self.is_finished(),
        })
    }

    pub fn tier(&self) -> Tier {
        self.score.tier()
    }

    pub fn summary(&self) -> SessionSummary {
        let tier = self.score.finalize();
        if self.is_finished() {
            info!(
                "{} finished: {} / {} correct, {} stars",
                self.setup.kind.name(),
                self.score.state().correct_count,
                self.rounds_played(),
                tier.stars
            );
        }
        SessionSummary {
            kind: self.setup.kind,
            catalog: self.catalog.name().to_string(),
            rounds_played: self.rounds_played(),
            state: self.score.state(),
            score: self.score.score(),
            tier,
            unlock_earned: tier.is_max(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::assets::DEFAULT_FALLBACK_ASSET;
    use crate::game::presets::{bundled_assets, emotions};

    fn mood_session(seed: u64) -> GameSession {
        GameSession::new(
            SessionSetup::for_kind(GameKind::MoodMatch),
            emotions().unwrap(),
            AssetValidator::new(bundled_assets().unwrap(), DEFAULT_FALLBACK_ASSET),
            RoundGenerator::seeded(seed),
        )
    }

    #[test]
    fn double_tap_counts_once() {
        let mut session = mood_session(1);
        let correct = session.next_round().unwrap().correct_index;
        let first = session.select(1, correct).unwrap();
        assert!(first.correct);
        assert_eq!(first.score, 20);
        assert!(session.select(1, correct).is_none());
        assert_eq!(session.rounds_played(), 1);
        assert_eq!(session.score().state().correct_count, 1);
    }

    #[test]
    fn selection_before_round_or_for_stale_round_is_ignored() {
        let mut session = mood_session(2);
        assert!(session.select(0, 0).is_none());
        assert!(session.is_input_locked());

        session.next_round().unwrap();
        assert!(session.select(0, 0).is_none());
        assert!(session.select(1, 9).is_none());
        assert!(!session.is_input_locked());
        assert!(session.select(1, 0).is_some());
    }

    #[test]
    fn unanswered_round_blocks_next() {
        let mut session = mood_session(3);
        session.next_round().unwrap();
        assert!(matches!(session.next_round(), Err(Error::RoundPending(1))));
    }

    #[test]
    fn full_session_reaches_summary() {
        let mut session = mood_session(4);
        for round in 1..=5 {
            let correct = session.next_round().unwrap().correct_index;
            let outcome = session.select(round, correct).unwrap();
            assert_eq!(outcome.finished, round == 5);
        }
        assert!(session.is_finished());
        assert!(matches!(session.next_round(), Err(Error::SessionFinished(5))));

        let summary = session.summary();
        assert_eq!(summary.score, 100);
        assert_eq!(summary.tier.stars, 3);
        assert!(summary.unlock_earned);
        assert_eq!(summary.catalog, "emotions");
    }
}
