//! Configuration loading and config file resolution

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::game::assets::{AssetDir, AssetValidator, DEFAULT_FALLBACK_ASSET};
use crate::game::presets::{GameKind, bundled_assets};
use crate::game::round::{DEFAULT_RETRY_BUDGET, MIN_OPTION_COUNT};
use crate::game::score::DEFAULT_POINTS_PER_ROUND;
use crate::game::session::SessionSetup;
use crate::game::tracker::DEFAULT_REUSE_FRACTION;
use crate::{Error, Result};

pub const CONFIG_ENV_VAR: &str = "PLAYMATCH_CONFIG";
const CONFIG_DIR_NAME: &str = "playmatch";
const CONFIG_FILE_NAME: &str = "config.toml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSection {
    pub reuse_fraction: f64,
    pub retry_budget: u32,
}

impl Default for EngineSection {
    fn default() -> Self {
        EngineSection {
            reuse_fraction: DEFAULT_REUSE_FRACTION,
            retry_budget: DEFAULT_RETRY_BUDGET,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringSection {
    pub points_per_round: u32,
}

impl Default for ScoringSection {
    fn default() -> Self {
        ScoringSection {
            points_per_round: DEFAULT_POINTS_PER_ROUND,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetsSection {
    /// Reference shown when a concept's own asset cannot be rendered
    pub fallback: String,
    /// Directory of image files; the bundled asset table is used when unset
    pub root: Option<PathBuf>,
}

impl Default for AssetsSection {
    fn default() -> Self {
        AssetsSection {
            fallback: DEFAULT_FALLBACK_ASSET.to_string(),
            root: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            level: "info".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameOverrides {
    pub option_count: Option<usize>,
    pub rounds: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GamesSection {
    pub mood: GameOverrides,
    pub rhythm: GameOverrides,
}

/// Contents of `config.toml`. Every key is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub engine: EngineSection,
    pub scoring: ScoringSection,
    pub assets: AssetsSection,
    pub logging: LoggingConfig,
    pub games: GamesSection,
}

impl EngineConfig {
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let config: EngineConfig = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_toml_str(&raw)
    }

    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.engine.reuse_fraction) {
            return Err(Error::Config(format!(
                "engine.reuse_fraction must be within 0..=1, got {}",
                self.engine.reuse_fraction
            )));
        }
        if self.engine.retry_budget == 0 {
            return Err(Error::Config("engine.retry_budget must be positive".to_string()));
        }
        if self.assets.fallback.trim().is_empty() {
            return Err(Error::Config("assets.fallback must not be empty".to_string()));
        }
        for (name, game) in [("mood", &self.games.mood), ("rhythm", &self.games.rhythm)] {
            if let Some(count) = game.option_count
                && count < MIN_OPTION_COUNT
            {
                return Err(Error::Config(format!(
                    "games.{}.option_count must be at least {}, got {}",
                    name, MIN_OPTION_COUNT, count
                )));
            }
            if game.rounds == Some(0) {
                return Err(Error::Config(format!("games.{}.rounds must be positive", name)));
            }
        }
        Ok(())
    }

    fn overrides(&self, kind: GameKind) -> GameOverrides {
        match kind {
            GameKind::MoodMatch => self.games.mood.clone(),
            GameKind::RhythmKeyword => self.games.rhythm.clone(),
            GameKind::Sequencing => GameOverrides::default(),
        }
    }

    pub fn session_setup(&self, kind: GameKind) -> SessionSetup {
        let defaults = SessionSetup::for_kind(kind);
        let overrides = self.overrides(kind);
        SessionSetup {
            kind,
            option_count: overrides.option_count.unwrap_or(defaults.option_count),
            rounds: overrides.rounds.unwrap_or(defaults.rounds),
            points_per_round: self.scoring.points_per_round,
            reuse_fraction: self.engine.reuse_fraction,
            retry_budget: self.engine.retry_budget,
        }
    }

    /// Asset directory when configured, bundled table otherwise.
    pub fn asset_validator(&self) -> Result<AssetValidator> {
        let fallback = self.assets.fallback.as_str();
        match &self.assets.root {
            Some(root) => Ok(AssetValidator::new(AssetDir::new(root.clone()), fallback)),
            None => Ok(AssetValidator::new(bundled_assets()?, fallback)),
        }
    }
}

/// `<config dir>/playmatch/config.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
}

/// Config file resolution priority:
/// 1. Command-line argument (highest priority)
/// 2. Environment variable
/// 3. Per-user config directory
pub fn resolve_config_path(
    cli_arg: Option<&Path>,
    env_value: Option<&str>,
    default_path: Option<PathBuf>,
) -> Option<PathBuf> {
    if let Some(path) = cli_arg {
        return Some(path.to_path_buf());
    }
    if let Some(value) = env_value
        && !value.trim().is_empty()
    {
        return Some(PathBuf::from(value));
    }
    default_path.filter(|path| path.exists())
}

/// Loads the configuration. An explicitly named file must exist and parse; a
/// missing file found through the environment or default path only warns, and
/// compiled defaults apply.
pub fn load_config(cli_arg: Option<&Path>) -> Result<EngineConfig> {
    let env_value = std::env::var(CONFIG_ENV_VAR).ok();
    let path = resolve_config_path(cli_arg, env_value.as_deref(), default_config_path());

    match path {
        Some(path) if path.exists() => {
            info!("Loading configuration from {}", path.display());
            EngineConfig::load(&path)
        }
        Some(path) if cli_arg.is_some() => Err(Error::Config(format!(
            "config file not found: {}",
            path.display()
        ))),
        Some(path) => {
            warn!("Config file {} not found, using defaults", path.display());
            Ok(EngineConfig::default())
        }
        None => Ok(EngineConfig::default()),
    }
}
