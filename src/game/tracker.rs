use std::collections::HashSet;

use rand::Rng;
use rand::seq::IndexedRandom;
use tracing::debug;

use super::catalog::{Concept, ConceptCatalog};
use crate::{Error, Result};

/// Share of the catalog that must have been shown as targets before a target may
/// repeat without a full reset.
pub const DEFAULT_REUSE_FRACTION: f64 = 0.75;

/// Which rule produced a target.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TargetSource {
    Fresh,
    Reused,
    AfterReset,
}

/// Global (whole session) and local (current round) concept usage.
#[derive(Clone, Debug)]
pub struct SessionTracker {
    used_as_target: HashSet<String>,
    used_in_round: HashSet<String>,
    last_target: Option<String>,
    last_source: Option<TargetSource>,
    reuse_fraction: f64,
    resets: u32,
}

impl Default for SessionTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionTracker {
    pub fn new() -> Self {
        Self::with_reuse_fraction(DEFAULT_REUSE_FRACTION)
    }

    pub fn with_reuse_fraction(reuse_fraction: f64) -> Self {
        SessionTracker {
            used_as_target: HashSet::new(),
            used_in_round: HashSet::new(),
            last_target: None,
            last_source: None,
            reuse_fraction: reuse_fraction.clamp(0.0, 1.0),
            resets: 0,
        }
    }

    pub fn start_round(&mut self) {
        self.used_in_round.clear();
    }

    pub fn mark_used_in_round(&mut self, key: &str) {
        self.used_in_round.insert(key.to_string());
    }

    pub fn is_used_in_round(&self, key: &str) -> bool {
        self.used_in_round.contains(key)
    }

    pub fn was_target(&self, key: &str) -> bool {
        self.used_as_target.contains(key)
    }

    pub fn used_as_target_count(&self) -> usize {
        self.used_as_target.len()
    }

    pub fn last_target(&self) -> Option<&str> {
        self.last_target.as_deref()
    }

    pub fn last_source(&self) -> Option<TargetSource> {
        self.last_source
    }

    /// How many times the global target history has been cleared.
    pub fn resets(&self) -> u32 {
        self.resets
    }

    fn reuse_allowed(&self, catalog: &ConceptCatalog) -> bool {
        let shown = catalog
            .all_concepts()
            .iter()
            .filter(|c| self.used_as_target.contains(&c.key))
            .count();
        shown as f64 >= self.reuse_fraction * catalog.len() as f64
    }

    fn is_last_target(&self, key: &str) -> bool {
        self.last_target.as_deref() == Some(key)
    }

    /// Picks the round's target: unseen concepts first, then (past the reuse threshold)
    /// anything not on screen this round, then a fresh cycle over the whole catalog.
    /// Once a full cycle has been shown the reuse tier stays open, so later targets
    /// only avoid the previous one and the reset is reached only when the threshold
    /// was never met.
    pub fn pick_target<'c, R: Rng + ?Sized>(
        &mut self,
        catalog: &'c ConceptCatalog,
        rng: &mut R,
    ) -> Result<&'c Concept> {
        if catalog.is_empty() {
            return Err(Error::EmptyCatalog);
        }
        let concepts = catalog.all_concepts();

        let fresh: Vec<&Concept> = concepts
            .iter()
            .filter(|c| !self.used_as_target.contains(&c.key) && !self.used_in_round.contains(&c.key))
            .collect();
        if let Some(pick) = fresh.choose(rng).copied() {
            return Ok(self.commit(pick, TargetSource::Fresh));
        }

        if self.reuse_allowed(catalog) {
            let reusable = self.not_in_round_avoiding_last(concepts);
            if let Some(pick) = reusable.choose(rng).copied() {
                return Ok(self.commit(pick, TargetSource::Reused));
            }
        }

        debug!(
            "Catalog '{}' exhausted after {} targets, starting a new cycle",
            catalog.name(),
            self.used_as_target.len()
        );
        self.used_as_target.clear();
        self.resets = self.resets.saturating_add(1);

        let mut candidates = self.not_in_round_avoiding_last(concepts);
        if candidates.is_empty() {
            candidates = concepts.iter().collect();
        }
        match candidates.choose(rng).copied() {
            Some(pick) => Ok(self.commit(pick, TargetSource::AfterReset)),
            None => Err(Error::EmptyCatalog),
        }
    }

    fn not_in_round_avoiding_last<'c>(&self, concepts: &'c [Concept]) -> Vec<&'c Concept> {
        let open: Vec<&Concept> = concepts
            .iter()
            .filter(|c| !self.used_in_round.contains(&c.key))
            .collect();
        let without_last: Vec<&Concept> = open
            .iter()
            .copied()
            .filter(|c| !self.is_last_target(&c.key))
            .collect();
        if without_last.is_empty() { open } else { without_last }
    }

    fn commit<'c>(&mut self, pick: &'c Concept, source: TargetSource) -> &'c Concept {
        self.used_as_target.insert(pick.key.clone());
        self.used_in_round.insert(pick.key.clone());
        self.last_target = Some(pick.key.clone());
        self.last_source = Some(source);
        debug!("Target '{}' ({:?})", pick.key, source);
        pick
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::catalog::CatalogSpec;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn numbered(count: usize) -> ConceptCatalog {
        let mut spec = CatalogSpec::new("numbers");
        for i in 0..count {
            let key = format!("n{}", i);
            spec = spec.concept(Concept::new(&key, &key, &key));
        }
        spec.build().unwrap()
    }

    #[test]
    fn targets_do_not_repeat_until_catalog_is_exhausted() {
        let catalog = numbered(7);
        let mut tracker = SessionTracker::new();
        let mut rng = StdRng::seed_from_u64(7);
        let mut seen = HashSet::new();
        for _ in 0..7 {
            tracker.start_round();
            let target = tracker.pick_target(&catalog, &mut rng).unwrap();
            assert!(seen.insert(target.key.clone()), "repeated {}", target.key);
        }
        assert_eq!(tracker.resets(), 0);
        assert_eq!(tracker.used_as_target_count(), 7);

        tracker.start_round();
        tracker.pick_target(&catalog, &mut rng).unwrap();
        assert_eq!(tracker.last_source(), Some(TargetSource::Reused));
    }

    #[test]
    fn consecutive_targets_differ_across_many_rounds() {
        let catalog = numbered(3);
        let mut tracker = SessionTracker::new();
        let mut rng = StdRng::seed_from_u64(99);
        let mut previous: Option<String> = None;
        for _ in 0..60 {
            tracker.start_round();
            let key = tracker.pick_target(&catalog, &mut rng).unwrap().key.clone();
            assert_ne!(previous.as_deref(), Some(key.as_str()));
            previous = Some(key);
        }
    }

    #[test]
    fn below_reuse_threshold_forces_reset() {
        let catalog = numbered(4);
        // 3 of 4 shown, the last unseen concept is already on screen this round.
        let mut tracker = SessionTracker::with_reuse_fraction(1.0);
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..3 {
            tracker.start_round();
            tracker.pick_target(&catalog, &mut rng).unwrap();
        }
        let remaining = catalog
            .all_concepts()
            .iter()
            .find(|c| !tracker.was_target(&c.key))
            .unwrap()
            .key
            .clone();
        tracker.start_round();
        tracker.mark_used_in_round(&remaining);
        let pick = tracker.pick_target(&catalog, &mut rng).unwrap().key.clone();
        assert_ne!(pick, remaining);
        assert_eq!(tracker.last_source(), Some(TargetSource::AfterReset));
        assert_eq!(tracker.resets(), 1);
        assert_eq!(tracker.used_as_target_count(), 1);
    }

    #[test]
    fn after_a_full_cycle_targets_come_from_the_reuse_tier() {
        let catalog = numbered(4);
        let mut tracker = SessionTracker::new();
        let mut rng = StdRng::seed_from_u64(5);
        for _ in 0..4 {
            tracker.start_round();
            tracker.pick_target(&catalog, &mut rng).unwrap();
            assert_eq!(tracker.last_source(), Some(TargetSource::Fresh));
        }
        for _ in 0..16 {
            tracker.start_round();
            tracker.pick_target(&catalog, &mut rng).unwrap();
            assert_eq!(tracker.last_source(), Some(TargetSource::Reused));
        }
        assert_eq!(tracker.resets(), 0);
        assert_eq!(tracker.used_as_target_count(), 4);
    }

    #[test]
    fn pick_marks_both_sets() {
        let catalog = numbered(2);
        let mut tracker = SessionTracker::new();
        let mut rng = StdRng::seed_from_u64(1);
        tracker.start_round();
        let key = tracker.pick_target(&catalog, &mut rng).unwrap().key.clone();
        assert!(tracker.was_target(&key));
        assert!(tracker.is_used_in_round(&key));
        tracker.start_round();
        assert!(!tracker.is_used_in_round(&key));
        assert!(tracker.was_target(&key));
    }

    #[test]
    fn empty_catalog_is_an_error() {
        let catalog = CatalogSpec::new("empty").build().unwrap();
        let mut tracker = SessionTracker::new();
        let mut rng = StdRng::seed_from_u64(0);
        assert!(matches!(
            tracker.pick_target(&catalog, &mut rng),
            Err(Error::EmptyCatalog)
        ));
    }
}
