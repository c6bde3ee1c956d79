use std::{
    collections::HashMap,
    env, fmt, fs, io,
    path::{Path, PathBuf},
    str::FromStr,
    sync::Arc,
};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::grid::BattlefieldDimensions;

pub const BUILTIN_BATTLEFIELD_PRESETS: &str = include_str!("data/battlefield_presets.json");

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BattlefieldSize {
    Small,
    Medium,
    Large,
    Huge,
}

impl BattlefieldSize {
    pub const ALL: [BattlefieldSize; 4] = [
        BattlefieldSize::Small,
        BattlefieldSize::Medium,
        BattlefieldSize::Large,
        BattlefieldSize::Huge,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            BattlefieldSize::Small => "small",
            BattlefieldSize::Medium => "medium",
            BattlefieldSize::Large => "large",
            BattlefieldSize::Huge => "huge",
        }
    }
}

impl fmt::Display for BattlefieldSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BattlefieldSize {
    type Err = BattlefieldPresetsError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        BattlefieldSize::ALL
            .into_iter()
            .find(|size| size.as_str().eq_ignore_ascii_case(value.trim()))
            .ok_or_else(|| BattlefieldPresetsError::UnknownSize(value.to_string()))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct BattlefieldPreset {
    pub size: BattlefieldSize,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub dimensions: BattlefieldDimensions,
}

/// Tunables for the terrain and homeland pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Border width the volcano keeps clear of.
    pub volcano_margin: u32,
    pub lava_min: usize,
    pub lava_max: usize,
    pub lava_cap: usize,
    /// Mountains raised around the volcano before switching to forest.
    pub mountain_cap: usize,
    /// Random-walk steps taken from each region seed.
    pub walk_steps: u32,
    pub homeland_min_distance: u32,
    pub homeland_relaxed_distance: u32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            volcano_margin: 2,
            lava_min: 2,
            lava_max: 5,
            lava_cap: 6,
            mountain_cap: 6,
            walk_steps: 5,
            homeland_min_distance: 4,
            homeland_relaxed_distance: 3,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
struct BattlefieldPresetsFile {
    presets: Vec<BattlefieldPreset>,
    #[serde(default)]
    generation: GenerationConfig,
}

#[derive(Debug, Clone)]
pub struct BattlefieldPresets {
    by_size: HashMap<BattlefieldSize, BattlefieldPreset>,
    generation: GenerationConfig,
}

impl BattlefieldPresets {
    pub fn builtin() -> Arc<Self> {
        Self::from_json_str(BUILTIN_BATTLEFIELD_PRESETS)
            .map(Arc::new)
            .expect("builtin battlefield presets should parse")
    }

    pub fn from_json_str(json: &str) -> Result<Self, BattlefieldPresetsError> {
        let parsed: BattlefieldPresetsFile = serde_json::from_str(json)?;
        let mut by_size = HashMap::new();
        for preset in parsed.presets {
            let BattlefieldDimensions { rows, cols } = preset.dimensions;
            if rows == 0 || cols < 2 {
                return Err(BattlefieldPresetsError::Degenerate {
                    size: preset.size,
                    rows,
                    cols,
                });
            }
            let size = preset.size;
            if by_size.insert(size, preset).is_some() {
                return Err(BattlefieldPresetsError::DuplicateSize(size));
            }
        }
        Ok(Self {
            by_size,
            generation: parsed.generation,
        })
    }

    pub fn from_file(path: &Path) -> Result<Self, BattlefieldPresetsError> {
        let contents =
            fs::read_to_string(path).map_err(|source| BattlefieldPresetsError::ReadFailed {
                path: path.to_path_buf(),
                source,
            })?;
        Self::from_json_str(&contents)
    }

    pub fn get(&self, size: BattlefieldSize) -> Option<&BattlefieldPreset> {
        self.by_size.get(&size)
    }

    pub fn dimensions(&self, size: BattlefieldSize) -> Option<BattlefieldDimensions> {
        self.get(size).map(|preset| preset.dimensions)
    }

    pub fn generation(&self) -> &GenerationConfig {
        &self.generation
    }

    pub fn len(&self) -> usize {
        self.by_size.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_size.is_empty()
    }
}

#[derive(Debug, Error)]
pub enum BattlefieldPresetsError {
    #[error("failed to parse battlefield presets: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("failed to read battlefield presets from {path:?}: {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("duplicate battlefield preset for size `{0}`")]
    DuplicateSize(BattlefieldSize),
    #[error("battlefield preset `{size}` is degenerate ({rows}x{cols})")]
    Degenerate {
        size: BattlefieldSize,
        rows: u32,
        cols: u32,
    },
    #[error("unknown battlefield size `{0}`")]
    UnknownSize(String),
}

pub fn load_battlefield_presets_from_env() -> Arc<BattlefieldPresets> {
    let Some(path) = env::var("BATTLEFIELD_PRESETS_PATH").ok().map(PathBuf::from) else {
        tracing::info!(target: "battlefield::config", "battlefield_presets.loaded=builtin");
        return BattlefieldPresets::builtin();
    };

    match BattlefieldPresets::from_file(&path) {
        Ok(presets) => {
            tracing::info!(
                target: "battlefield::config",
                path = %path.display(),
                presets = presets.len(),
                "battlefield_presets.loaded=file"
            );
            Arc::new(presets)
        }
        Err(err) => {
            tracing::warn!(
                target: "battlefield::config",
                path = %path.display(),
                error = %err,
                "battlefield_presets.load_failed"
            );
            BattlefieldPresets::builtin()
        }
    }
}
