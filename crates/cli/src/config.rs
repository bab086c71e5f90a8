//! Client configuration: TOML file plus command-line overrides.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use chess_core::DEFAULT_MINUTES;
use serde::{Deserialize, Serialize};
use uci_client::EngineConfig;

/// Who sits on the other side of the board.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Two humans at one terminal
    #[default]
    Pvp,
    /// Human plays white against the engine
    Ai,
    /// One seat of a room in a shared store directory
    Online,
}

impl FromStr for Mode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "pvp" => Ok(Mode::Pvp),
            "ai" => Ok(Mode::Ai),
            "online" => Ok(Mode::Online),
            other => bail!("unknown mode `{other}` (expected pvp, ai or online)"),
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Pvp => write!(f, "pvp"),
            Mode::Ai => write!(f, "ai"),
            Mode::Online => write!(f, "online"),
        }
    }
}

/// Settings for `online` mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OnlineConfig {
    /// Directory both players' clients share
    pub store_dir: PathBuf,
    /// Stable identity used to reclaim a seat; random when unset
    pub player: Option<String>,
    /// Room to join; a new one is created when unset
    pub room: Option<String>,
    pub poll_ms: u64,
}

impl Default for OnlineConfig {
    fn default() -> Self {
        Self {
            store_dir: PathBuf::from("chess-rooms"),
            player: None,
            room: None,
            poll_ms: 250,
        }
    }
}

impl OnlineConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_ms.max(10))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub mode: Mode,
    pub engine: EngineConfig,
    pub online: OnlineConfig,
    /// Minutes per side; 0 plays without a clock
    pub clock_minutes: u32,
    /// Tracing filter used when `RUST_LOG` is not set
    pub log_filter: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            mode: Mode::default(),
            engine: EngineConfig::default(),
            online: OnlineConfig::default(),
            clock_minutes: DEFAULT_MINUTES,
            log_filter: "warn".to_string(),
        }
    }
}

impl ClientConfig {
    pub fn from_toml_str(s: &str) -> Result<Self> {
        Ok(toml::from_str(s)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::from_toml_str(&text).with_context(|| format!("parsing config {}", path.display()))
    }
}

/// Parsed command line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Args {
    pub config: Option<PathBuf>,
    pub mode: Option<Mode>,
    pub level: Option<u8>,
    pub engine: Option<PathBuf>,
    pub room: Option<String>,
    pub store: Option<PathBuf>,
    pub player: Option<String>,
    pub help: bool,
}

impl Args {
    pub fn parse<I: IntoIterator<Item = String>>(args: I) -> Result<Self> {
        let mut parsed = Args::default();
        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            let mut value = |flag: &str| {
                args.next()
                    .with_context(|| format!("{flag} needs a value"))
            };
            match arg.as_str() {
                "--config" | "-c" => parsed.config = Some(PathBuf::from(value("--config")?)),
                "--mode" | "-m" => parsed.mode = Some(value("--mode")?.parse()?),
                "--level" | "-l" => {
                    let level = value("--level")?;
                    parsed.level = Some(
                        level
                            .parse()
                            .with_context(|| format!("invalid level `{level}`"))?,
                    );
                }
                "--engine" | "-e" => parsed.engine = Some(PathBuf::from(value("--engine")?)),
                "--room" | "-r" => parsed.room = Some(value("--room")?),
                "--store" | "-s" => parsed.store = Some(PathBuf::from(value("--store")?)),
                "--player" | "-p" => parsed.player = Some(value("--player")?),
                "--help" | "-h" => parsed.help = true,
                other => bail!("unknown argument `{other}`"),
            }
        }
        Ok(parsed)
    }

    /// Load the config file (if any) and apply the flags on top.
    pub fn resolve(&self) -> Result<ClientConfig> {
        let mut config = match &self.config {
            Some(path) => ClientConfig::load(path)?,
            None => ClientConfig::default(),
        };
        if let Some(mode) = self.mode {
            config.mode = mode;
        }
        if let Some(level) = self.level {
            config.engine.skill_level = level.min(uci_client::config::MAX_SKILL_LEVEL);
        }
        if let Some(engine) = &self.engine {
            config.engine.path = engine.clone();
        }
        if let Some(room) = &self.room {
            config.online.room = Some(room.clone());
        }
        if let Some(store) = &self.store {
            config.online.store_dir = store.clone();
        }
        if let Some(player) = &self.player {
            config.online.player = Some(player.clone());
        }
        Ok(config)
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod config_tests;
