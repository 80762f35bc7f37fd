//! Round generation and scoring for the matching mini-games.

pub mod assets;
pub mod catalog;
pub mod presets;
pub mod round;
pub mod score;
pub mod session;
pub mod tracker;

pub use assets::{AssetDir, AssetRef, AssetSource, AssetTable, AssetValidator};
pub use catalog::{CatalogSpec, Concept, ConceptCatalog};
pub use presets::GameKind;
pub use round::{Round, RoundGenerator, RoundOption};
pub use score::{Emphasis, Grading, ScoreEngine, ScoreState, Tier};
pub use session::{AnswerOutcome, GameSession, SessionSetup, SessionSummary};
pub use tracker::SessionTracker;
