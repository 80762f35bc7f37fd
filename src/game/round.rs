use std::collections::HashSet;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Serialize, Serializer};
use tracing::{debug, warn};

use super::assets::{AssetRef, AssetValidator};
use super::catalog::{Concept, ConceptCatalog};
use super::tracker::SessionTracker;
use crate::{Error, Result};

pub const DEFAULT_RETRY_BUDGET: u32 = 100;
pub const MIN_OPTION_COUNT: usize = 2;

/// One slot on screen, with the asset already validated.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RoundOption {
    pub key: String,
    pub label: String,
    pub asset: AssetRef,
}

#[derive(Clone, Debug, Serialize)]
pub struct Round {
    /// Serialized as the key only; the on-screen asset lives in `options`.
    #[serde(serialize_with = "serialize_target_key")]
    pub target: Concept,
    pub options: Vec<RoundOption>,
    pub correct_index: usize,
    /// Draws consumed from the retry budget.
    pub attempts_used: u32,
    /// Set when at least one distractor came from the fallback ladder.
    pub used_fallback: bool,
}

impl Round {
    pub fn is_correct(&self, index: usize) -> bool {
        index == self.correct_index
    }

    pub fn option_keys(&self) -> Vec<&str> {
        self.options.iter().map(|o| o.key.as_str()).collect()
    }
}

fn serialize_target_key<S: Serializer>(
    target: &Concept,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_str(&target.key)
}

/// Builds rounds for any catalog. One generator per session; it owns the RNG so a
/// seed reproduces the whole session.
pub struct RoundGenerator<R = StdRng> {
    rng: R,
    retry_budget: u32,
}

impl RoundGenerator<StdRng> {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_os_rng())
    }

    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }
}

impl Default for RoundGenerator<StdRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Rng> RoundGenerator<R> {
    pub fn with_rng(rng: R) -> Self {
        RoundGenerator {
            rng,
            retry_budget: DEFAULT_RETRY_BUDGET,
        }
    }

    pub fn with_retry_budget(mut self, retry_budget: u32) -> Self {
        self.retry_budget = retry_budget.max(1);
        self
    }

    pub fn retry_budget(&self) -> u32 {
        self.retry_budget
    }

    /// Starts a round on `tracker` and generates it. Only precondition violations
    /// are errors; everything else degrades to fallbacks.
    pub fn next_round(
        &mut self,
        catalog: &ConceptCatalog,
        tracker: &mut SessionTracker,
        assets: &AssetValidator,
        option_count: usize,
    ) -> Result<Round> {
        check_preconditions(catalog, option_count)?;

        tracker.start_round();
        let target = tracker.pick_target(catalog, &mut self.rng)?;
        let correct_index = self.rng.random_range(0..option_count);
        let needed = option_count - 1;

        let (mut distractors, attempts_used) =
            self.draw_distractors(catalog, tracker, target, needed);

        let mut used_fallback = false;
        if distractors.len() < needed {
            warn!(
                "Catalog '{}': {} of {} distractors for '{}' after {} draws, using fallback ladder",
                catalog.name(),
                distractors.len(),
                needed,
                target.key,
                attempts_used
            );
            fill_from_ladder(catalog, tracker, target, &mut distractors, needed);
            used_fallback = true;
        }

        let mut seen: HashSet<&str> = HashSet::from([target.key.as_str()]);
        let before = distractors.len();
        distractors.retain(|c| seen.insert(c.key.as_str()));
        if distractors.len() < before {
            warn!("Dropped {} duplicate options, backfilling", before - distractors.len());
        }
        if distractors.len() < needed {
            fill_from_ladder(catalog, tracker, target, &mut distractors, needed);
            used_fallback = true;
        }

        let mut remaining = distractors.into_iter();
        let options = (0..option_count)
            .filter_map(|slot| {
                if slot == correct_index {
                    Some(target)
                } else {
                    remaining.next()
                }
            })
            .map(|concept| RoundOption {
                key: concept.key.clone(),
                label: concept.label.clone(),
                asset: assets.resolve(&concept.asset),
            })
            .collect::<Vec<_>>();

        let round = Round {
            target: target.clone(),
            options,
            correct_index,
            attempts_used,
            used_fallback,
        };
        debug!(
            "Round for '{}': {:?} (correct slot {})",
            round.target.key,
            round.option_keys(),
            round.correct_index
        );
        Ok(round)
    }

    fn draw_distractors<'c>(
        &mut self,
        catalog: &'c ConceptCatalog,
        tracker: &mut SessionTracker,
        target: &Concept,
        needed: usize,
    ) -> (Vec<&'c Concept>, u32) {
        let eligible = |concept: &&'c Concept| {
            concept.key != target.key
                && !tracker.is_used_in_round(&concept.key)
                && !catalog.are_similar(&target.key, &concept.key)
        };
        let mut primary: Vec<&Concept> = catalog.all_concepts().iter().filter(eligible).collect();
        let mut secondary: Vec<&Concept> = catalog.unrelated().iter().filter(eligible).collect();
        primary.shuffle(&mut self.rng);
        secondary.shuffle(&mut self.rng);

        let mut pool = primary.into_iter().chain(secondary);
        let mut chosen: Vec<&Concept> = Vec::with_capacity(needed);
        let mut attempts = 0;
        while chosen.len() < needed && attempts < self.retry_budget {
            attempts += 1;
            let Some(candidate) = pool.next() else {
                break;
            };
            if tracker.is_used_in_round(&candidate.key)
                || chosen.iter().any(|c| catalog.are_similar(&c.key, &candidate.key))
            {
                continue;
            }
            tracker.mark_used_in_round(&candidate.key);
            chosen.push(candidate);
        }
        (chosen, attempts)
    }
}

fn check_preconditions(catalog: &ConceptCatalog, option_count: usize) -> Result<()> {
    if catalog.is_empty() {
        return Err(Error::EmptyCatalog);
    }
    if option_count < MIN_OPTION_COUNT {
        return Err(Error::TooFewOptions(option_count));
    }
    if catalog.distinct_count() < option_count {
        return Err(Error::CatalogTooSmall {
            available: catalog.distinct_count(),
            needed: option_count,
        });
    }
    Ok(())
}

/// Safe defaults first, then any unused concept regardless of similarity. Skips the
/// target and anything already chosen.
fn fill_from_ladder<'c>(
    catalog: &'c ConceptCatalog,
    tracker: &mut SessionTracker,
    target: &Concept,
    chosen: &mut Vec<&'c Concept>,
    needed: usize,
) {
    let defaults = catalog.defaults().iter().filter_map(|key| catalog.by_key(key).ok());
    let any_left = catalog.all_concepts().iter().chain(catalog.unrelated());

    for concept in defaults.chain(any_left) {
        if chosen.len() >= needed {
            break;
        }
        if concept.key == target.key || chosen.iter().any(|c| c.key == concept.key) {
            continue;
        }
        tracker.mark_used_in_round(&concept.key);
        chosen.push(concept);
    }
}
