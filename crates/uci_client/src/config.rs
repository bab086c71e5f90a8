//! Engine settings, loadable from TOML.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Deepest search ever requested.
pub const MAX_DEPTH: u8 = 20;

/// Stockfish's `Skill Level` range is 0..=20.
pub const MAX_SKILL_LEVEL: u8 = 20;

/// Depth added on top of the skill level when no explicit depth is given.
const LEVEL_DEPTH_OFFSET: u8 = 4;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Engine executable
    pub path: PathBuf,
    /// Extra command-line arguments for the engine
    pub args: Vec<String>,
    /// Skill level used when a request does not name one
    pub skill_level: u8,
    /// Lower bound for the requested search depth
    pub min_depth: u8,
    /// Give up on a search after this long. `None` waits forever.
    pub search_timeout_ms: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("stockfish"),
            args: Vec::new(),
            skill_level: 5,
            min_depth: 1,
            search_timeout_ms: None,
        }
    }
}

impl EngineConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(s)
    }

    pub fn search_timeout(&self) -> Option<Duration> {
        self.search_timeout_ms.map(Duration::from_millis)
    }

    /// `level + 4`, kept within `[min_depth, 20]`.
    pub fn depth_for(&self, level: u8) -> u8 {
        let min = self.min_depth.clamp(1, MAX_DEPTH);
        level
            .saturating_add(LEVEL_DEPTH_OFFSET)
            .clamp(min, MAX_DEPTH)
    }
}
