use std::{
    collections::HashSet,
    env, fs, io,
    path::{Path, PathBuf},
    sync::Arc,
};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::land::Alignment;

pub const BUILTIN_TERRAIN_CATALOG: &str = include_str!("data/terrain_catalog.json");

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerrainKind {
    /// Placeholder for land the generator has not shaped yet.
    None,
    Plains,
    Hills,
    Mountains,
    GreenForest,
    DarkForest,
    Swamp,
    Desert,
    Lava,
    Volcano,
}

impl TerrainKind {
    pub fn as_str(self) -> &'static str {
        match self {
            TerrainKind::None => "none",
            TerrainKind::Plains => "plains",
            TerrainKind::Hills => "hills",
            TerrainKind::Mountains => "mountains",
            TerrainKind::GreenForest => "green_forest",
            TerrainKind::DarkForest => "dark_forest",
            TerrainKind::Swamp => "swamp",
            TerrainKind::Desert => "desert",
            TerrainKind::Lava => "lava",
            TerrainKind::Volcano => "volcano",
        }
    }

    /// Single-character glyph used by the text overview.
    pub fn glyph(self) -> char {
        match self {
            TerrainKind::None => '?',
            TerrainKind::Plains => '.',
            TerrainKind::Hills => 'n',
            TerrainKind::Mountains => '^',
            TerrainKind::GreenForest => 'f',
            TerrainKind::DarkForest => 'F',
            TerrainKind::Swamp => '~',
            TerrainKind::Desert => ':',
            TerrainKind::Lava => '*',
            TerrainKind::Volcano => 'V',
        }
    }
}

/// How the generator treats a terrain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerrainRole {
    Volcano,
    Lava,
    /// Seeded as clustered regions.
    Region,
    /// Fills whatever is left once every region is seeded.
    Fill,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TerrainDefinition {
    pub kind: TerrainKind,
    pub alignment: Alignment,
    pub gold_min: u32,
    pub gold_max: u32,
    pub role: TerrainRole,
}

#[derive(Debug, Clone, Deserialize)]
struct TerrainCatalogFile {
    terrains: Vec<TerrainDefinition>,
}

/// Terrain definitions with the special roles resolved up front.
#[derive(Debug, Clone)]
pub struct TerrainCatalog {
    definitions: Vec<TerrainDefinition>,
    volcano: usize,
    lava: usize,
    fill: usize,
    mountains: usize,
    dark_forest: usize,
}

impl TerrainCatalog {
    pub fn builtin() -> Arc<Self> {
        Self::from_json_str(BUILTIN_TERRAIN_CATALOG)
            .map(Arc::new)
            .expect("builtin terrain catalog should parse")
    }

    pub fn from_json_str(json: &str) -> Result<Self, TerrainCatalogError> {
        let parsed: TerrainCatalogFile = serde_json::from_str(json)?;
        Self::from_definitions(parsed.terrains)
    }

    pub fn from_file(path: &Path) -> Result<Self, TerrainCatalogError> {
        let contents =
            fs::read_to_string(path).map_err(|source| TerrainCatalogError::ReadFailed {
                path: path.to_path_buf(),
                source,
            })?;
        Self::from_json_str(&contents)
    }

    fn from_definitions(definitions: Vec<TerrainDefinition>) -> Result<Self, TerrainCatalogError> {
        let mut seen = HashSet::new();
        for definition in &definitions {
            if definition.kind == TerrainKind::None {
                return Err(TerrainCatalogError::PlaceholderDefined);
            }
            if !seen.insert(definition.kind) {
                return Err(TerrainCatalogError::DuplicateKind(definition.kind));
            }
            if definition.gold_min > definition.gold_max {
                return Err(TerrainCatalogError::InvertedGoldRange {
                    kind: definition.kind,
                    min: definition.gold_min,
                    max: definition.gold_max,
                });
            }
        }

        let single_role = |role: TerrainRole| -> Result<usize, TerrainCatalogError> {
            let mut matches = definitions
                .iter()
                .enumerate()
                .filter(|(_, definition)| definition.role == role)
                .map(|(idx, _)| idx);
            match (matches.next(), matches.next()) {
                (Some(idx), None) => Ok(idx),
                (None, _) => Err(TerrainCatalogError::MissingRole(role)),
                (Some(_), Some(_)) => Err(TerrainCatalogError::AmbiguousRole(role)),
            }
        };
        let volcano = single_role(TerrainRole::Volcano)?;
        let lava = single_role(TerrainRole::Lava)?;
        let fill = single_role(TerrainRole::Fill)?;

        let region_kind = |kind: TerrainKind| -> Result<usize, TerrainCatalogError> {
            definitions
                .iter()
                .position(|definition| {
                    definition.kind == kind && definition.role == TerrainRole::Region
                })
                .ok_or(TerrainCatalogError::MissingRegion(kind))
        };
        let mountains = region_kind(TerrainKind::Mountains)?;
        let dark_forest = region_kind(TerrainKind::DarkForest)?;

        Ok(Self {
            definitions,
            volcano,
            lava,
            fill,
            mountains,
            dark_forest,
        })
    }

    pub fn get(&self, kind: TerrainKind) -> Option<&TerrainDefinition> {
        self.definitions
            .iter()
            .find(|definition| definition.kind == kind)
    }

    pub fn iter(&self) -> impl Iterator<Item = &TerrainDefinition> {
        self.definitions.iter()
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    pub fn volcano(&self) -> &TerrainDefinition {
        &self.definitions[self.volcano]
    }

    pub fn lava(&self) -> &TerrainDefinition {
        &self.definitions[self.lava]
    }

    pub fn fill(&self) -> &TerrainDefinition {
        &self.definitions[self.fill]
    }

    /// Terrain raised around the volcano and its lava.
    pub fn mountains(&self) -> &TerrainDefinition {
        &self.definitions[self.mountains]
    }

    /// Terrain used around the volcano once the mountain cap is reached.
    pub fn dark_forest(&self) -> &TerrainDefinition {
        &self.definitions[self.dark_forest]
    }

    /// Region terrains in catalog order.
    pub fn regions(&self) -> impl Iterator<Item = &TerrainDefinition> {
        self.definitions
            .iter()
            .filter(|definition| definition.role == TerrainRole::Region)
    }
}

#[derive(Debug, Error)]
pub enum TerrainCatalogError {
    #[error("failed to parse terrain catalog: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("failed to read terrain catalog from {path:?}: {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("terrain catalog must not define the `none` placeholder")]
    PlaceholderDefined,
    #[error("terrain `{}` is defined more than once", .0.as_str())]
    DuplicateKind(TerrainKind),
    #[error("terrain `{}` has gold range {min}..={max}", .kind.as_str())]
    InvertedGoldRange {
        kind: TerrainKind,
        min: u32,
        max: u32,
    },
    #[error("terrain catalog has no terrain with role {0:?}")]
    MissingRole(TerrainRole),
    #[error("terrain catalog has several terrains with role {0:?}")]
    AmbiguousRole(TerrainRole),
    #[error("terrain catalog needs `{}` as a region terrain", .0.as_str())]
    MissingRegion(TerrainKind),
}

pub fn load_terrain_catalog_from_env() -> Arc<TerrainCatalog> {
    let Some(path) = env::var("TERRAIN_CATALOG_PATH").ok().map(PathBuf::from) else {
        tracing::info!(target: "battlefield::config", "terrain_catalog.loaded=builtin");
        return TerrainCatalog::builtin();
    };

    match TerrainCatalog::from_file(&path) {
        Ok(catalog) => {
            tracing::info!(
                target: "battlefield::config",
                path = %path.display(),
                terrains = catalog.len(),
                "terrain_catalog.loaded=file"
            );
            Arc::new(catalog)
        }
        Err(err) => {
            tracing::warn!(
                target: "battlefield::config",
                path = %path.display(),
                error = %err,
                "terrain_catalog.load_failed"
            );
            TerrainCatalog::builtin()
        }
    }
}
