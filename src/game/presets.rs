use serde::{Deserialize, Serialize};

use super::assets::{AssetTable, DEFAULT_FALLBACK_ASSET};
use super::catalog::{CatalogSpec, Concept, ConceptCatalog};
use super::score::{DEFAULT_POINTS_PER_ROUND, Grading};
use crate::{Error, Result};

pub const SONGS: [(&str, &str); 2] = [
    ("row-your-boat", "Row, Row, Row Your Boat"),
    ("twinkle-star", "Twinkle, Twinkle, Little Star"),
];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameKind {
    #[default]
    MoodMatch,
    RhythmKeyword,
    Sequencing,
}

impl GameKind {
    /// (option count, rounds) for the matching games.
    pub fn config(self) -> (usize, u32) {
        match self {
            GameKind::MoodMatch => (2, 5),
            GameKind::RhythmKeyword => (3, 5),
            GameKind::Sequencing => (0, 1),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            GameKind::MoodMatch => "Mood Match",
            GameKind::RhythmKeyword => "Rhythm Keywords",
            GameKind::Sequencing => "Sequencing",
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            GameKind::MoodMatch => "mood",
            GameKind::RhythmKeyword => "rhythm",
            GameKind::Sequencing => "sequence",
        }
    }

    pub fn from_code(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "mood" | "mood_match" => Some(GameKind::MoodMatch),
            "rhythm" | "rhythm_keyword" => Some(GameKind::RhythmKeyword),
            "sequence" | "sequencing" => Some(GameKind::Sequencing),
            _ => None,
        }
    }

    pub fn is_matching(self) -> bool {
        !matches!(self, GameKind::Sequencing)
    }

    pub fn grading(self, rounds: u32, points_per_round: u32) -> Grading {
        match self {
            GameKind::Sequencing => Grading::TimeAndAttempts,
            _ => Grading::CountBased {
                planned_rounds: rounds,
                points_per_round,
            },
        }
    }

    pub fn default_grading(self) -> Grading {
        let (_, rounds) = self.config();
        self.grading(rounds, DEFAULT_POINTS_PER_ROUND)
    }

    /// Built-in catalog. `song` picks the keyword list for the rhythm game and is
    /// ignored elsewhere.
    pub fn catalog(self, song: Option<&str>) -> Result<ConceptCatalog> {
        match self {
            GameKind::MoodMatch => emotions(),
            GameKind::RhythmKeyword => song_keywords(song.unwrap_or(SONGS[0].0)),
            GameKind::Sequencing => Err(Error::Config(
                "the sequencing game has no concept catalog".to_string(),
            )),
        }
    }
}

fn emotion(key: &str, label: &str) -> Concept {
    Concept::new(key, label, &format!("emotion_{}", key))
}

pub fn emotions() -> Result<ConceptCatalog> {
    CatalogSpec::new("emotions")
        .concept(emotion("happy", "Happy").similar_to(&["excited"]))
        .concept(emotion("sad", "Sad").similar_to(&["tired"]))
        .concept(emotion("angry", "Angry").similar_to(&["disgusted", "frustrated"]))
        .concept(emotion("scared", "Scared").similar_to(&["surprised", "worried"]))
        .concept(emotion("surprised", "Surprised"))
        .concept(emotion("disgusted", "Disgusted"))
        .concept(emotion("calm", "Calm").similar_to(&["tired"]))
        .unrelated(emotion("silly", "Silly"))
        .unrelated(emotion("proud", "Proud"))
        .unrelated(emotion("shy", "Shy"))
        .unrelated(emotion("excited", "Excited"))
        .unrelated(emotion("tired", "Tired"))
        .unrelated(emotion("worried", "Worried"))
        .unrelated(emotion("frustrated", "Frustrated"))
        .defaults(&["happy", "sad"])
        .build()
}

fn keyword(key: &str, label: &str) -> Concept {
    Concept::new(key, label, &format!("kw_{}", key))
}

fn everyday_objects(spec: CatalogSpec) -> CatalogSpec {
    spec.unrelated(keyword("apple", "Apple"))
        .unrelated(keyword("ball", "Ball"))
        .unrelated(keyword("shoe", "Shoe"))
        .unrelated(keyword("spoon", "Spoon"))
        .unrelated(keyword("car", "Car"))
}

pub fn song_keywords(song: &str) -> Result<ConceptCatalog> {
    let spec = match song {
        "row-your-boat" => CatalogSpec::new("row-your-boat")
            .concept(keyword("boat", "Boat").similar_to(&["ship"]))
            .concept(keyword("row", "Row").similar_to(&["paddle"]))
            .concept(keyword("stream", "Stream").similar_to(&["river"]))
            .concept(keyword("dream", "Dream").similar_to(&["sleep"]))
            .concept(keyword("merrily", "Merrily"))
            .concept(keyword("river", "River"))
            .concept(keyword("crocodile", "Crocodile"))
            .unrelated(keyword("ship", "Ship"))
            .unrelated(keyword("paddle", "Paddle"))
            .unrelated(keyword("sleep", "Sleep"))
            .defaults(&["boat", "merrily"]),
        "twinkle-star" => CatalogSpec::new("twinkle-star")
            .concept(keyword("star", "Star").similar_to(&["sun", "diamond"]))
            .concept(keyword("sky", "Sky").similar_to(&["cloud"]))
            .concept(keyword("diamond", "Diamond"))
            .concept(keyword("world", "World"))
            .concept(keyword("night", "Night").similar_to(&["moon"]))
            .concept(keyword("wonder", "Wonder"))
            .unrelated(keyword("sun", "Sun"))
            .unrelated(keyword("moon", "Moon"))
            .unrelated(keyword("cloud", "Cloud"))
            .defaults(&["star", "world"]),
        other => return Err(Error::NotFound(format!("song '{}'", other))),
    };
    everyday_objects(spec).build()
}

/// The drawables shipped with the built-in catalogs.
pub fn bundled_assets() -> Result<AssetTable> {
    let mut table = AssetTable::new();
    table.insert(DEFAULT_FALLBACK_ASSET);
    let mut catalogs = vec![emotions()?];
    for (song, _) in SONGS {
        catalogs.push(song_keywords(song)?);
    }
    for catalog in &catalogs {
        for concept in catalog.all_concepts().iter().chain(catalog.unrelated()) {
            table.insert(concept.asset.clone());
        }
    }
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::assets::{AssetRef, AssetSource};

    #[test]
    fn builtin_catalogs_build() {
        assert_eq!(emotions().unwrap().len(), 7);
        for (song, _) in SONGS {
            let catalog = song_keywords(song).unwrap();
            assert!(catalog.len() >= GameKind::RhythmKeyword.config().0);
            assert!(catalog.defaults().iter().all(|key| catalog.contains(key)));
        }
        assert!(matches!(song_keywords("baby-shark"), Err(Error::NotFound(_))));
    }

    #[test]
    fn codes_round_trip() {
        for kind in [GameKind::MoodMatch, GameKind::RhythmKeyword, GameKind::Sequencing] {
            assert_eq!(GameKind::from_code(kind.code()), Some(kind));
        }
        assert_eq!(GameKind::from_code(" MOOD "), Some(GameKind::MoodMatch));
        assert_eq!(GameKind::from_code("maze"), None);
    }

    #[test]
    fn bundled_assets_cover_builtin_concepts() {
        let table = bundled_assets().unwrap();
        assert!(table.is_renderable(&AssetRef::from("emotion_happy")));
        assert!(table.is_renderable(&AssetRef::from("kw_crocodile")));
        assert!(table.is_renderable(&AssetRef::from(DEFAULT_FALLBACK_ASSET)));
    }

    #[test]
    fn sequencing_has_timed_grading_and_no_catalog() {
        assert_eq!(GameKind::Sequencing.default_grading(), Grading::TimeAndAttempts);
        assert!(GameKind::Sequencing.catalog(None).is_err());
        assert!(!GameKind::Sequencing.is_matching());
    }
}
