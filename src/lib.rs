//! # playmatch
//!
//! Round engine for the speech-therapy matching games:
//! - concept catalogs with a symmetric similarity relation
//! - target selection that avoids repeats until the catalog is exhausted
//! - distractor selection with bounded retries and a fallback ladder
//! - asset validation with a fallback icon
//! - count-based and time-and-attempts star ratings

pub mod config;
pub mod error;
pub mod game;

pub use error::{Error, Result};
