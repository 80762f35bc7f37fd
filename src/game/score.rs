use serde::{Deserialize, Serialize};

pub const DEFAULT_POINTS_PER_ROUND: u32 = 20;
pub const MAX_STARS: u8 = 3;

const ATTEMPTS_FULL_MARKS: u32 = 1;
const ATTEMPTS_ZERO_MARKS: u32 = 5;
const TIME_FULL_MARKS_MS: u64 = 10_000;
const TIME_ZERO_MARKS_MS: u64 = 60_000;
const COMPONENT_MAX: f64 = 50.0;

/// How strongly the result screen should celebrate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Emphasis {
    #[default]
    Muted,
    Warm,
    Bright,
    Gold,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct Tier {
    pub stars: u8,
    pub label: &'static str,
    pub emphasis: Emphasis,
}

impl Tier {
    pub fn from_stars(stars: u8) -> Self {
        let (label, emphasis) = match stars.min(MAX_STARS) {
            0 => ("Tried", Emphasis::Muted),
            1 => ("Good Effort", Emphasis::Warm),
            2 => ("Great Job", Emphasis::Bright),
            _ => ("Victory", Emphasis::Gold),
        };
        Tier {
            stars: stars.min(MAX_STARS),
            label,
            emphasis,
        }
    }

    pub fn is_max(&self) -> bool {
        self.stars >= MAX_STARS
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum Grading {
    /// Matching games: correct answers against a planned number of rounds.
    CountBased { planned_rounds: u32, points_per_round: u32 },
    /// Sequencing game: fewer attempts and faster completion score higher.
    TimeAndAttempts,
}

impl Grading {
    pub fn count_based(planned_rounds: u32) -> Self {
        Grading::CountBased {
            planned_rounds,
            points_per_round: DEFAULT_POINTS_PER_ROUND,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ScoreState {
    pub correct_count: u32,
    pub total_rounds: u32,
    pub attempts: u32,
    pub elapsed_ms: u64,
}

/// 0 correct earns nothing, a clean sweep earns everything, 60% or better is two
/// stars. Five rounds: 0 → 0, 1-2 → 1, 3-4 → 2, 5 → 3.
pub fn stars_for_count(correct: u32, planned_rounds: u32) -> u8 {
    if correct == 0 || planned_rounds == 0 {
        return 0;
    }
    if correct >= planned_rounds {
        return 3;
    }
    if u64::from(correct) * 5 >= u64::from(planned_rounds) * 3 {
        2
    } else {
        1
    }
}

pub fn attempts_score(attempts: u32) -> f64 {
    if attempts <= ATTEMPTS_FULL_MARKS {
        return COMPONENT_MAX;
    }
    if attempts >= ATTEMPTS_ZERO_MARKS {
        return 0.0;
    }
    let span = f64::from(ATTEMPTS_ZERO_MARKS - ATTEMPTS_FULL_MARKS);
    COMPONENT_MAX * f64::from(ATTEMPTS_ZERO_MARKS - attempts) / span
}

pub fn time_score(elapsed_ms: u64) -> f64 {
    if elapsed_ms <= TIME_FULL_MARKS_MS {
        return COMPONENT_MAX;
    }
    if elapsed_ms >= TIME_ZERO_MARKS_MS {
        return 0.0;
    }
    let span = (TIME_ZERO_MARKS_MS - TIME_FULL_MARKS_MS) as f64;
    COMPONENT_MAX * (TIME_ZERO_MARKS_MS - elapsed_ms) as f64 / span
}

pub fn timed_accuracy(attempts: u32, elapsed_ms: u64) -> f64 {
    (attempts_score(attempts) + time_score(elapsed_ms)).clamp(0.0, 100.0)
}

pub fn stars_for_accuracy(accuracy: f64) -> u8 {
    if accuracy >= 70.0 {
        3
    } else if accuracy >= 50.0 {
        2
    } else if accuracy >= 30.0 {
        1
    } else {
        0
    }
}

/// Running score for one session.
#[derive(Clone, Debug)]
pub struct ScoreEngine {
    grading: Grading,
    state: ScoreState,
}

impl ScoreEngine {
    pub fn new(grading: Grading) -> Self {
        ScoreEngine {
            grading,
            state: ScoreState::default(),
        }
    }

    pub fn grading(&self) -> Grading {
        self.grading
    }

    pub fn state(&self) -> ScoreState {
        self.state
    }

    pub fn record_outcome(&mut self, correct: bool) {
        self.state.total_rounds = self.state.total_rounds.saturating_add(1);
        if correct {
            self.state.correct_count = self.state.correct_count.saturating_add(1);
        }
    }

    pub fn record_attempt(&mut self) {
        self.state.attempts = self.state.attempts.saturating_add(1);
    }

    pub fn set_attempts(&mut self, attempts: u32) {
        self.state.attempts = attempts;
    }

    pub fn set_elapsed_ms(&mut self, elapsed_ms: u64) {
        self.state.elapsed_ms = elapsed_ms;
    }

    fn planned_rounds(&self, planned: u32) -> u32 {
        if planned > 0 { planned } else { self.state.total_rounds }
    }

    /// Display score: points per correct answer, or accuracy percent when timed.
    pub fn score(&self) -> u32 {
        match self.grading {
            Grading::CountBased {
                points_per_round, ..
            } => self.state.correct_count.saturating_mul(points_per_round),
            Grading::TimeAndAttempts => self.accuracy().round() as u32,
        }
    }

    pub fn accuracy(&self) -> f64 {
        match self.grading {
            Grading::CountBased { planned_rounds, .. } => {
                let planned = self.planned_rounds(planned_rounds);
                if planned == 0 {
                    0.0
                } else {
                    (100.0 * f64::from(self.state.correct_count) / f64::from(planned)).min(100.0)
                }
            }
            Grading::TimeAndAttempts => timed_accuracy(self.state.attempts, self.state.elapsed_ms),
        }
    }

    pub fn tier(&self) -> Tier {
        let stars = match self.grading {
            Grading::CountBased { planned_rounds, .. } => {
                stars_for_count(self.state.correct_count, self.planned_rounds(planned_rounds))
            }
            Grading::TimeAndAttempts => stars_for_accuracy(self.accuracy()),
        };
        Tier::from_stars(stars)
    }

    pub fn finalize(&self) -> Tier {
        self.tier()
    }

    pub fn unlock_earned(&self) -> bool {
        self.tier().is_max()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine_with(correct: u32, total: u32) -> ScoreEngine {
        let mut engine = ScoreEngine::new(Grading::count_based(total));
        for i in 0..total {
            engine.record_outcome(i < correct);
        }
        engine
    }

    #[test]
    fn five_round_breakpoints() {
        let stars: Vec<u8> = (0..=5).map(|c| engine_with(c, 5).finalize().stars).collect();
        assert_eq!(stars, vec![0, 1, 1, 2, 2, 3]);
        assert_eq!(engine_with(0, 5).tier().label, "Tried");
        assert_eq!(engine_with(5, 5).tier().label, "Victory");
    }

    #[test]
    fn three_of_five_is_great_job_sixty_points() {
        let engine = engine_with(3, 5);
        assert_eq!(engine.score(), 60);
        let tier = engine.finalize();
        assert_eq!(tier.stars, 2);
        assert_eq!(tier.label, "Great Job");
        assert_eq!(tier.emphasis, Emphasis::Bright);
        assert!(!engine.unlock_earned());
        assert!(engine_with(5, 5).unlock_earned());
    }

    #[test]
    fn tier_is_monotonic_in_correct_count() {
        for total in 1..=12 {
            let mut previous = 0;
            for correct in 0..=total {
                let stars = engine_with(correct, total).finalize().stars;
                assert!(stars >= previous, "{}/{} dropped to {}", correct, total, stars);
                previous = stars;
            }
        }
    }

    #[test]
    fn attempts_and_time_interpolate_linearly() {
        assert_eq!(attempts_score(0), 50.0);
        assert_eq!(attempts_score(1), 50.0);
        assert_eq!(attempts_score(3), 25.0);
        assert_eq!(attempts_score(5), 0.0);
        assert_eq!(attempts_score(9), 0.0);

        assert_eq!(time_score(8_000), 50.0);
        assert_eq!(time_score(35_000), 25.0);
        assert_eq!(time_score(60_000), 0.0);
        assert_eq!(time_score(90_000), 0.0);
    }

    #[test]
    fn timed_star_thresholds() {
        assert_eq!(stars_for_accuracy(100.0), 3);
        assert_eq!(stars_for_accuracy(70.0), 3);
        assert_eq!(stars_for_accuracy(69.9), 2);
        assert_eq!(stars_for_accuracy(50.0), 2);
        assert_eq!(stars_for_accuracy(30.0), 1);
        assert_eq!(stars_for_accuracy(29.9), 0);
    }

    #[test]
    fn timed_engine_uses_recorded_attempts_and_elapsed() {
        let mut engine = ScoreEngine::new(Grading::TimeAndAttempts);
        engine.record_attempt();
        engine.set_elapsed_ms(8_000);
        assert_eq!(engine.score(), 100);
        assert_eq!(engine.finalize().stars, 3);

        engine.set_attempts(5);
        engine.set_elapsed_ms(60_000);
        assert_eq!(engine.score(), 0);
        assert_eq!(engine.finalize().stars, 0);
    }

    #[test]
    fn correct_never_exceeds_total() {
        let mut engine = ScoreEngine::new(Grading::count_based(3));
        engine.record_outcome(true);
        engine.record_outcome(false);
        let state = engine.state();
        assert!(state.correct_count <= state.total_rounds);
        assert_eq!(state.total_rounds, 2);
    }
}
