use std::{
    collections::{BTreeMap, HashMap, HashSet},
    sync::Arc,
};

use rand::{seq::SliceRandom, Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use thiserror::Error;

use crate::{
    grid::{neighbors, tiles_in_radius, BattlefieldDimensions, TilePosition},
    homeland::{place_players, Homeland},
    land::{BattlefieldMap, PlayerId, PlayerProfile},
    map_preset::{BattlefieldPresets, BattlefieldSize, GenerationConfig},
    territory::TerritoryError,
    terrain::{TerrainCatalog, TerrainDefinition, TerrainKind},
};

#[derive(Debug, Error)]
pub enum MapGenError {
    #[error("battlefield {0} cannot hold a connected grid")]
    DegenerateDimensions(BattlefieldDimensions),
    #[error("no battlefield preset for size `{0}`")]
    UnknownSize(BattlefieldSize),
    #[error("player {0} appears more than once in the roster")]
    DuplicatePlayer(PlayerId),
    #[error("no homeland candidate left for player {player}")]
    NoHomelandCandidates { player: PlayerId },
    #[error("no barracks site for player {player} around {homeland}")]
    NoBarracksCandidates {
        player: PlayerId,
        homeland: TilePosition,
    },
    #[error(transparent)]
    Territory(#[from] TerritoryError),
}

/// A generated battlefield together with where each player started.
#[derive(Debug, Clone)]
pub struct GeneratedBattlefield {
    pub map: BattlefieldMap,
    pub volcano: TilePosition,
    pub homelands: Vec<Homeland>,
}

/// Builds the starting battlefield: terrain first, then player homelands.
///
/// Randomness is always supplied by the caller, either as an RNG passed to
/// [`BattlefieldGenerator::generate`] or as a seed, so a layout can be
/// replayed exactly.
#[derive(Debug, Clone)]
pub struct BattlefieldGenerator {
    dimensions: BattlefieldDimensions,
    catalog: Arc<TerrainCatalog>,
    config: GenerationConfig,
    players: Vec<PlayerProfile>,
}

impl BattlefieldGenerator {
    pub fn new(dimensions: BattlefieldDimensions) -> Self {
        Self {
            dimensions,
            catalog: TerrainCatalog::builtin(),
            config: GenerationConfig::default(),
            players: Vec::new(),
        }
    }

    /// Generator for a size class, using the presets' generation settings.
    pub fn from_preset(
        presets: &BattlefieldPresets,
        size: BattlefieldSize,
    ) -> Result<Self, MapGenError> {
        let dimensions = presets
            .dimensions(size)
            .ok_or(MapGenError::UnknownSize(size))?;
        Ok(Self::new(dimensions).with_config(presets.generation().clone()))
    }

    pub fn with_catalog(mut self, catalog: Arc<TerrainCatalog>) -> Self {
        self.catalog = catalog;
        self
    }

    pub fn with_config(mut self, config: GenerationConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_players(mut self, players: Vec<PlayerProfile>) -> Self {
        self.players = players;
        self
    }

    pub fn dimensions(&self) -> BattlefieldDimensions {
        self.dimensions
    }

    pub fn generate_seeded(&self, seed: u64) -> Result<GeneratedBattlefield, MapGenError> {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        self.generate(&mut rng)
    }

    pub fn generate<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
    ) -> Result<GeneratedBattlefield, MapGenError> {
        if self.dimensions.rows == 0 || self.dimensions.cols < 2 {
            return Err(MapGenError::DegenerateDimensions(self.dimensions));
        }
        let mut roster_ids = HashSet::new();
        for player in &self.players {
            if !roster_ids.insert(player.id) {
                return Err(MapGenError::DuplicatePlayer(player.id));
            }
        }

        let mut map = BattlefieldMap::new(self.dimensions);
        let volcano = {
            let mut canvas = TerrainCanvas::new(&mut map);
            let volcano = self.place_volcano(&mut canvas, rng);
            let lava = self.grow_lava(&mut canvas, volcano, rng);
            self.raise_mountains(&mut canvas, volcano, &lava);
            self.seed_regions(&mut canvas, rng);
            canvas.fill_remaining(self.catalog.fill());
            volcano
        };
        self.assign_gold(&mut map, rng);

        let homelands = if self.players.is_empty() {
            Vec::new()
        } else {
            place_players(&mut map, &self.players, volcano, &self.config, rng)?
        };

        validate_battlefield(&map);
        Ok(GeneratedBattlefield {
            map,
            volcano,
            homelands,
        })
    }

    fn place_volcano<R: Rng + ?Sized>(
        &self,
        canvas: &mut TerrainCanvas<'_>,
        rng: &mut R,
    ) -> TilePosition {
        let dimensions = canvas.map.dimensions();
        // no tile is interior beyond half the shorter side
        let mut margin = self
            .config
            .volcano_margin
            .min(dimensions.rows.min(dimensions.cols) / 2);
        let candidates = loop {
            let interior: Vec<TilePosition> = dimensions
                .positions()
                .filter(|pos| dimensions.is_interior(*pos, margin))
                .collect();
            if !interior.is_empty() || margin == 0 {
                break interior;
            }
            margin -= 1;
        };
        // a valid grid always has at least one tile at margin zero
        let volcano = candidates
            .choose(rng)
            .copied()
            .unwrap_or(TilePosition::new(0, 0));
        canvas.paint(volcano, self.catalog.volcano());
        tracing::debug!(
            target: "battlefield::mapgen",
            tile = %volcano,
            margin,
            "mapgen.volcano.placed"
        );
        volcano
    }

    fn grow_lava<R: Rng + ?Sized>(
        &self,
        canvas: &mut TerrainCanvas<'_>,
        volcano: TilePosition,
        rng: &mut R,
    ) -> Vec<TilePosition> {
        let mut candidates = tiles_in_radius(canvas.map.dimensions(), volcano, 1, true);
        candidates.shuffle(rng);
        let low = self.config.lava_min.min(self.config.lava_max);
        let wanted = rng.gen_range(low..=self.config.lava_max);
        let take = wanted.min(self.config.lava_cap).min(candidates.len());
        candidates.truncate(take);
        for pos in &candidates {
            canvas.paint(*pos, self.catalog.lava());
        }
        tracing::debug!(
            target: "battlefield::mapgen",
            lava = candidates.len(),
            "mapgen.lava.grown"
        );
        candidates
    }

    fn raise_mountains(
        &self,
        canvas: &mut TerrainCanvas<'_>,
        volcano: TilePosition,
        lava: &[TilePosition],
    ) {
        let dimensions = canvas.map.dimensions();
        let mountains = self.catalog.mountains();
        let forest = self.catalog.dark_forest();
        for source in std::iter::once(volcano).chain(lava.iter().copied()) {
            for pos in tiles_in_radius(dimensions, source, 1, true) {
                if !canvas.is_unpainted(pos) {
                    continue;
                }
                if canvas.count(mountains.kind) < self.config.mountain_cap {
                    canvas.paint(pos, mountains);
                } else {
                    canvas.paint(pos, forest);
                }
            }
        }
    }

    fn seed_regions<R: Rng + ?Sized>(&self, canvas: &mut TerrainCanvas<'_>, rng: &mut R) {
        let total = canvas.map.len();
        let regions: Vec<&TerrainDefinition> = self.catalog.regions().collect();
        // the fill terrain takes one share of the board as well
        let share = total / (regions.len() + 1);

        for region in regions {
            while canvas.count(region.kind) < share {
                let open = canvas.unpainted();
                let Some(&seed) = open.choose(rng) else {
                    return;
                };
                canvas.paint(seed, region);
                let mut cursor = seed;
                for _ in 0..self.config.walk_steps {
                    if canvas.count(region.kind) >= share {
                        break;
                    }
                    let options = canvas.unpainted_neighbors(cursor);
                    let Some(&next) = options.choose(rng) else {
                        break;
                    };
                    canvas.paint(next, region);
                    cursor = next;
                }
            }
            tracing::trace!(
                target: "battlefield::mapgen",
                terrain = region.kind.as_str(),
                tiles = canvas.count(region.kind),
                share,
                "mapgen.region.seeded"
            );
        }
    }

    fn assign_gold<R: Rng + ?Sized>(&self, map: &mut BattlefieldMap, rng: &mut R) {
        for land in map.lands_mut() {
            let gold = self
                .catalog
                .get(land.terrain())
                .map(|definition| rng.gen_range(definition.gold_min..=definition.gold_max))
                .unwrap_or(0);
            land.set_gold_per_turn(gold);
        }
    }
}

/// Map wrapper that keeps per-terrain tile counts while painting.
struct TerrainCanvas<'m> {
    map: &'m mut BattlefieldMap,
    counts: HashMap<TerrainKind, usize>,
}

impl<'m> TerrainCanvas<'m> {
    fn new(map: &'m mut BattlefieldMap) -> Self {
        let mut counts = HashMap::new();
        for land in map.lands() {
            *counts.entry(land.terrain()).or_insert(0) += 1;
        }
        Self { map, counts }
    }

    fn count(&self, kind: TerrainKind) -> usize {
        self.counts.get(&kind).copied().unwrap_or(0)
    }

    fn is_unpainted(&self, pos: TilePosition) -> bool {
        self.map
            .land(pos)
            .is_some_and(|land| land.terrain() == TerrainKind::None)
    }

    fn paint(&mut self, pos: TilePosition, definition: &TerrainDefinition) {
        let Some(land) = self.map.land_mut(pos) else {
            return;
        };
        let previous = land.terrain();
        land.set_terrain(definition);
        if let Some(count) = self.counts.get_mut(&previous) {
            *count = count.saturating_sub(1);
        }
        *self.counts.entry(definition.kind).or_insert(0) += 1;
    }

    fn unpainted(&self) -> Vec<TilePosition> {
        self.map
            .lands()
            .filter(|land| land.terrain() == TerrainKind::None)
            .map(|land| land.position())
            .collect()
    }

    fn unpainted_neighbors(&self, pos: TilePosition) -> Vec<TilePosition> {
        neighbors(self.map.dimensions(), pos)
            .into_iter()
            .filter(|next| self.is_unpainted(*next))
            .collect()
    }

    fn fill_remaining(&mut self, fill: &TerrainDefinition) {
        for pos in self.unpainted() {
            self.paint(pos, fill);
        }
    }
}

/// Log summary counts for a freshly generated battlefield.
pub fn validate_battlefield(map: &BattlefieldMap) {
    let mut histogram: HashMap<TerrainKind, usize> = HashMap::new();
    for land in map.lands() {
        *histogram.entry(land.terrain()).or_insert(0) += 1;
    }
    let volcanoes = histogram.get(&TerrainKind::Volcano).copied().unwrap_or(0);
    let unshaped = histogram.get(&TerrainKind::None).copied().unwrap_or(0);
    let mut strongholds_by_player: BTreeMap<Option<PlayerId>, usize> = BTreeMap::new();
    for land in map.lands().filter(|land| land.has_stronghold()) {
        *strongholds_by_player.entry(land.controller()).or_insert(0) += 1;
    }
    let strongholds: usize = strongholds_by_player.values().sum();
    let gold_total: u64 = map.lands().map(|land| u64::from(land.gold_per_turn())).sum();

    tracing::info!(
        target: "battlefield::mapgen",
        dimensions = %map.dimensions(),
        tiles = map.len(),
        volcanoes,
        unshaped,
        strongholds,
        gold_total,
        "mapgen.validate.summary"
    );
    if volcanoes != 1 || unshaped != 0 {
        tracing::warn!(
            target: "battlefield::mapgen",
            volcanoes,
            unshaped,
            "mapgen.validate.terrain_invariant_broken"
        );
    }
    for (player, count) in &strongholds_by_player {
        tracing::debug!(
            target: "battlefield::mapgen",
            player = ?player,
            strongholds = count,
            "mapgen.validate.strongholds"
        );
    }
    for (kind, tiles) in &histogram {
        tracing::trace!(
            target: "battlefield::mapgen",
            terrain = kind.as_str(),
            tiles,
            "mapgen.validate.terrain"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terrain::TerrainRole;

    fn count(map: &BattlefieldMap, kind: TerrainKind) -> usize {
        map.lands().filter(|land| land.terrain() == kind).count()
    }

    #[test]
    fn every_tile_is_shaped_around_one_volcano() {
        for seed in 0..20 {
            let generated = BattlefieldGenerator::new(BattlefieldDimensions::new(9, 18))
                .generate_seeded(seed)
                .expect("terrain-only generation succeeds");
            let map = &generated.map;
            assert_eq!(count(map, TerrainKind::Volcano), 1);
            assert_eq!(count(map, TerrainKind::None), 0);
            assert!(map.dimensions().is_interior(generated.volcano, 2));
            assert_eq!(
                map.land(generated.volcano).map(|land| land.terrain()),
                Some(TerrainKind::Volcano)
            );
            assert!(generated.homelands.is_empty());
        }
    }

    #[test]
    fn lava_hugs_the_volcano() {
        for seed in 0..20 {
            let generated = BattlefieldGenerator::new(BattlefieldDimensions::new(11, 23))
                .generate_seeded(seed)
                .unwrap();
            let ring = tiles_in_radius(generated.map.dimensions(), generated.volcano, 1, true);
            let lava: Vec<_> = generated
                .map
                .lands()
                .filter(|land| land.terrain() == TerrainKind::Lava)
                .map(|land| land.position())
                .collect();
            assert!((2..=5).contains(&lava.len()), "seed {seed}: {} lava", lava.len());
            assert!(lava.iter().all(|pos| ring.contains(pos)));
        }
    }

    #[test]
    fn volcano_ring_caps_mountains() {
        let catalog = TerrainCatalog::builtin();
        let mut map = BattlefieldMap::new(BattlefieldDimensions::new(9, 18));
        let generator = BattlefieldGenerator::new(map.dimensions());
        let volcano = TilePosition::new(4, 8);
        let mut canvas = TerrainCanvas::new(&mut map);
        canvas.paint(volcano, catalog.volcano());
        let lava: Vec<TilePosition> = tiles_in_radius(canvas.map.dimensions(), volcano, 1, true)
            .into_iter()
            .take(5)
            .collect();
        for pos in &lava {
            canvas.paint(*pos, catalog.lava());
        }
        generator.raise_mountains(&mut canvas, volcano, &lava);
        let mountains = canvas.count(TerrainKind::Mountains);
        let forest = canvas.count(TerrainKind::DarkForest);

        assert_eq!(mountains, 6);
        assert!(forest > 0);
        assert_eq!(count(&map, TerrainKind::Mountains), mountains);
        assert_eq!(count(&map, TerrainKind::DarkForest), forest);
    }

    #[test]
    fn gold_stays_within_terrain_range() {
        let catalog = TerrainCatalog::builtin();
        let generated = BattlefieldGenerator::new(BattlefieldDimensions::new(9, 18))
            .generate_seeded(11)
            .unwrap();
        for land in generated.map.lands() {
            let definition = catalog.get(land.terrain()).expect("catalog terrain");
            assert!((definition.gold_min..=definition.gold_max).contains(&land.gold_per_turn()));
        }
    }

    #[test]
    fn regions_are_roughly_balanced() {
        let catalog = TerrainCatalog::builtin();
        let generated = BattlefieldGenerator::new(BattlefieldDimensions::new(15, 31))
            .generate_seeded(3)
            .unwrap();
        let share = generated.map.len() / (catalog.regions().count() + 1);
        for region in catalog.iter().filter(|def| def.role == TerrainRole::Region) {
            let tiles = count(&generated.map, region.kind);
            assert!(tiles >= share, "{} has {tiles} of {share}", region.kind.as_str());
        }
    }

    #[test]
    fn tiny_boards_shrink_the_volcano_margin() {
        let generated = BattlefieldGenerator::new(BattlefieldDimensions::new(2, 3))
            .generate_seeded(5)
            .unwrap();
        assert_eq!(count(&generated.map, TerrainKind::Volcano), 1);
        assert_eq!(count(&generated.map, TerrainKind::None), 0);
    }

    #[test]
    fn oversized_volcano_margin_still_places_one_volcano() {
        let config = GenerationConfig {
            volcano_margin: u32::MAX,
            ..GenerationConfig::default()
        };
        let generated = BattlefieldGenerator::new(BattlefieldDimensions::new(9, 18))
            .with_config(config)
            .generate_seeded(3)
            .unwrap();
        assert_eq!(count(&generated.map, TerrainKind::Volcano), 1);
        assert_eq!(count(&generated.map, TerrainKind::None), 0);
        assert!(generated.map.dimensions().is_interior(generated.volcano, 4));
    }

    #[test]
    fn degenerate_dimensions_are_rejected() {
        let result = BattlefieldGenerator::new(BattlefieldDimensions::new(4, 1)).generate_seeded(1);
        assert!(matches!(result, Err(MapGenError::DegenerateDimensions(_))));
    }
}
