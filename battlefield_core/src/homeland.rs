//! Starting positions for the players on a freshly shaped battlefield.

use rand::{seq::SliceRandom, Rng};
use serde::Serialize;

use crate::{
    grid::{distance, tiles_in_radius, TilePosition},
    land::{Alignment, Army, BattlefieldMap, BuildingKind, PlayerId, PlayerProfile, Race, Unit},
    land_registry::{query_positions, BuildingFilter, LandFilter},
    map_preset::GenerationConfig,
    mapgen::MapGenError,
    terrain::TerrainKind,
    territory::{construct_building, REALM_RADIUS},
};

/// Where a player starts: stronghold, barracks and hero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Homeland {
    pub player: PlayerId,
    pub stronghold: TilePosition,
    pub barracks: TilePosition,
}

/// Give every player a homeland, a barracks and their hero.
///
/// Undead players are placed first and take the volcano while it is free.
pub(crate) fn place_players<R: Rng + ?Sized>(
    map: &mut BattlefieldMap,
    players: &[PlayerProfile],
    volcano: TilePosition,
    config: &GenerationConfig,
    rng: &mut R,
) -> Result<Vec<Homeland>, MapGenError> {
    let mut ordered: Vec<&PlayerProfile> = players.iter().collect();
    ordered.sort_by_key(|player| player.race != Race::Undead);

    let mut placed: Vec<Homeland> = Vec::with_capacity(ordered.len());
    for player in ordered {
        let volcano_free = map
            .land(volcano)
            .is_some_and(|land| land.is_neutral() && land.buildings().is_empty());
        let stronghold = if player.race == Race::Undead && volcano_free {
            volcano
        } else {
            let taken: Vec<TilePosition> = placed.iter().map(|home| home.stronghold).collect();
            choose_homeland(map, player, &taken, config, rng)?
        };

        construct_building(map, stronghold, BuildingKind::Stronghold, player.id)?;
        let barracks = choose_barracks(map, player, stronghold, rng).ok_or(
            MapGenError::NoBarracksCandidates {
                player: player.id,
                homeland: stronghold,
            },
        )?;
        construct_building(map, barracks, BuildingKind::Barracks, player.id)?;

        let hero = Unit::hero(
            format!("{} the {}", player.name, player.race.hero_title()),
            player.race,
        );
        if let Some(land) = map.land_mut(stronghold) {
            land.station_army(Army::new(player.id, vec![hero]));
        }

        tracing::info!(
            target: "battlefield::mapgen",
            player = %player.id,
            name = %player.name,
            race = ?player.race,
            stronghold = %stronghold,
            barracks = %barracks,
            "mapgen.homeland.placed"
        );
        placed.push(Homeland {
            player: player.id,
            stronghold,
            barracks,
        });
    }
    Ok(placed)
}

fn choose_homeland<R: Rng + ?Sized>(
    map: &BattlefieldMap,
    player: &PlayerProfile,
    taken: &[TilePosition],
    config: &GenerationConfig,
    rng: &mut R,
) -> Result<TilePosition, MapGenError> {
    let open = |alignment: Option<Alignment>| -> Vec<TilePosition> {
        let mut filter = LandFilter::default()
            .neutral()
            .buildings(BuildingFilter::None);
        filter.alignment = alignment;
        query_positions(map, &filter)
            .into_iter()
            .filter(|pos| {
                map.land(*pos)
                    .is_some_and(|land| land.terrain() != TerrainKind::Volcano)
            })
            .collect()
    };
    let pools = [
        open(Some(player.alignment)),
        open(Some(Alignment::Neutral)),
        open(None),
    ];

    let dimensions = map.dimensions();
    let spaced = |pos: TilePosition, min_distance: u32| {
        taken.iter().all(|other| {
            distance(dimensions, pos, *other).map_or(true, |hexes| hexes >= min_distance)
        })
    };

    // alignment outranks spacing: the aligned pool is tried at every distance
    // before falling back to neutral-aligned land
    for pool in &pools[..2] {
        for min_distance in [config.homeland_min_distance, config.homeland_relaxed_distance] {
            let spread: Vec<TilePosition> = pool
                .iter()
                .copied()
                .filter(|pos| spaced(*pos, min_distance))
                .collect();
            if let Some(&pos) = spread.choose(rng) {
                return Ok(pos);
            }
            tracing::debug!(
                target: "battlefield::mapgen",
                player = %player.id,
                min_distance,
                candidates = pool.len(),
                "mapgen.homeland.distance_relaxed"
            );
        }
    }

    pools
        .iter()
        .find_map(|pool| pool.choose(rng).copied())
        .ok_or(MapGenError::NoHomelandCandidates { player: player.id })
}

/// Barracks site for a freshly placed stronghold.
///
/// Owned land is preferred (aligned, neutral-aligned, any). Failing that, any
/// unbuilt tile of the realm, and finally any unbuilt tile on the board; the
/// chosen tile is claimed when the barracks goes up.
fn choose_barracks<R: Rng + ?Sized>(
    map: &BattlefieldMap,
    player: &PlayerProfile,
    stronghold: TilePosition,
    rng: &mut R,
) -> Option<TilePosition> {
    let owned = LandFilter::default()
        .controlled_by([player.id])
        .buildings(BuildingFilter::None);
    let preferred = [
        owned.clone().aligned(player.alignment),
        owned.clone().aligned(Alignment::Neutral),
        owned,
    ]
    .iter()
    .find_map(|filter| query_positions(map, filter).choose(rng).copied());
    if preferred.is_some() {
        return preferred;
    }

    tracing::debug!(
        target: "battlefield::mapgen",
        player = %player.id,
        stronghold = %stronghold,
        "mapgen.barracks.no_owned_land"
    );
    let realm: Vec<TilePosition> =
        tiles_in_radius(map.dimensions(), stronghold, REALM_RADIUS, true)
            .into_iter()
            .filter(|pos| map.land(*pos).is_some_and(|land| land.buildings().is_empty()))
            .collect();
    if let Some(&pos) = realm.choose(rng) {
        return Some(pos);
    }
    query_positions(map, &LandFilter::default().buildings(BuildingFilter::None))
        .choose(rng)
        .copied()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use crate::{grid::BattlefieldDimensions, mapgen::BattlefieldGenerator, terrain::TerrainCatalog};

    fn roster() -> Vec<PlayerProfile> {
        vec![
            PlayerProfile {
                id: PlayerId(1),
                name: "Aldric".into(),
                race: Race::Human,
                alignment: Alignment::Lawful,
                color: "blue".into(),
            },
            PlayerProfile {
                id: PlayerId(2),
                name: "Morwen".into(),
                race: Race::Undead,
                alignment: Alignment::Chaotic,
                color: "purple".into(),
            },
            PlayerProfile {
                id: PlayerId(3),
                name: "Thrain".into(),
                race: Race::Dwarf,
                alignment: Alignment::Neutral,
                color: "orange".into(),
            },
        ]
    }

    #[test]
    fn undead_player_takes_the_volcano() {
        let generated = BattlefieldGenerator::new(BattlefieldDimensions::new(9, 18))
            .with_players(roster())
            .generate_seeded(42)
            .expect("generation succeeds");
        assert_eq!(generated.homelands[0].player, PlayerId(2));
        assert_eq!(generated.homelands[0].stronghold, generated.volcano);
        let volcano = generated.map.land(generated.volcano).unwrap();
        assert_eq!(volcano.controller(), Some(PlayerId(2)));
        assert!(volcano.has_stronghold());
    }

    #[test]
    fn every_player_gets_a_stronghold_barracks_and_hero() {
        for seed in 0..10 {
            let generated = BattlefieldGenerator::new(BattlefieldDimensions::new(9, 18))
                .with_players(roster())
                .generate_seeded(seed)
                .unwrap();
            let map = &generated.map;
            for home in &generated.homelands {
                assert_eq!(map.stronghold_positions(home.player), vec![home.stronghold]);
                let barracks = map.land(home.barracks).unwrap();
                assert!(barracks.has_building(BuildingKind::Barracks));
                assert_eq!(barracks.controller(), Some(home.player));
                assert!(tiles_in_radius(map.dimensions(), home.stronghold, 1, true)
                    .contains(&home.barracks));

                let keep = map.land(home.stronghold).unwrap();
                let army = &keep.armies()[0];
                assert_eq!(army.controlled_by, home.player);
                assert!(army.units[0].hero);
            }
        }
    }

    #[test]
    fn homelands_keep_their_distance() {
        for seed in 0..10 {
            let generated = BattlefieldGenerator::new(BattlefieldDimensions::new(11, 23))
                .with_players(roster())
                .generate_seeded(seed)
                .unwrap();
            let dims = generated.map.dimensions();
            for (idx, a) in generated.homelands.iter().enumerate() {
                for b in &generated.homelands[idx + 1..] {
                    let hexes = distance(dims, a.stronghold, b.stronghold).unwrap();
                    assert!(
                        hexes >= 3,
                        "seed {seed}: {} and {} are {hexes} apart",
                        a.stronghold,
                        b.stronghold
                    );
                }
            }
        }
    }

    #[test]
    fn hero_is_named_after_the_race_title() {
        let generated = BattlefieldGenerator::new(BattlefieldDimensions::new(6, 13))
            .with_players(roster()[..1].to_vec())
            .generate_seeded(7)
            .unwrap();
        let home = generated.homelands[0];
        let hero = &generated.map.land(home.stronghold).unwrap().armies()[0].units[0];
        assert_eq!(hero.name, "Aldric the Warlord");
        assert_eq!(hero.race, Race::Human);
    }

    fn shaped_map(rows: u32, cols: u32, lawful: &[TilePosition]) -> BattlefieldMap {
        let catalog = TerrainCatalog::builtin();
        let mut map = BattlefieldMap::new(BattlefieldDimensions::new(rows, cols));
        for land in map.lands_mut() {
            let kind = if lawful.contains(&land.position()) {
                TerrainKind::Plains
            } else {
                TerrainKind::Desert
            };
            land.set_terrain(catalog.get(kind).unwrap());
        }
        map
    }

    #[test]
    fn aligned_land_wins_over_wider_spacing() {
        // plains sit 3 hexes from the first homeland, desert reaches 4 and more
        let aligned = TilePosition::new(0, 3);
        let map = shaped_map(1, 8, &[aligned]);
        let taken = [TilePosition::new(0, 0)];
        for seed in 0..10 {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let config = GenerationConfig::default();
            let pos = choose_homeland(&map, &roster()[0], &taken, &config, &mut rng).unwrap();
            assert_eq!(pos, aligned);
        }
    }

    #[test]
    fn barracks_falls_back_to_claimed_realm_land() {
        let mut map = shaped_map(1, 3, &[]);
        let neighbour = TilePosition::new(0, 1);
        let first = TilePosition::new(0, 0);
        construct_building(&mut map, first, BuildingKind::Stronghold, PlayerId(1)).unwrap();
        let keep = TilePosition::new(0, 2);
        construct_building(&mut map, keep, BuildingKind::Stronghold, PlayerId(3)).unwrap();
        assert_eq!(map.land(neighbour).unwrap().controller(), Some(PlayerId(1)));

        let mut rng = ChaCha8Rng::seed_from_u64(5);
        assert_eq!(choose_barracks(&map, &roster()[2], keep, &mut rng), Some(neighbour));

        construct_building(&mut map, neighbour, BuildingKind::Barracks, PlayerId(1)).unwrap();
        assert_eq!(choose_barracks(&map, &roster()[2], keep, &mut rng), None);
    }

    #[test]
    fn crowded_boards_never_run_out_of_barracks_sites() {
        let players: Vec<PlayerProfile> = [
            (1, Race::Human, Alignment::Lawful),
            (2, Race::Elf, Alignment::Lawful),
            (3, Race::Orc, Alignment::Chaotic),
        ]
        .into_iter()
        .map(|(id, race, alignment)| PlayerProfile {
            id: PlayerId(id),
            name: format!("player-{id}"),
            race,
            alignment,
            color: String::new(),
        })
        .collect();
        for seed in 0..20 {
            let result = BattlefieldGenerator::new(BattlefieldDimensions::new(3, 3))
                .with_players(players.clone())
                .generate_seeded(seed);
            match result {
                Ok(generated) => {
                    for home in &generated.homelands {
                        let barracks = generated.map.land(home.barracks).unwrap();
                        assert!(barracks.has_building(BuildingKind::Barracks));
                        assert_eq!(barracks.controller(), Some(home.player));
                    }
                }
                Err(MapGenError::NoHomelandCandidates { .. }) => {}
                Err(other) => panic!("seed {seed}: {other}"),
            }
        }
    }

    #[test]
    fn barracks_error_needs_a_fully_built_board() {
        let mut map = shaped_map(1, 1, &[]);
        let lone = TilePosition::new(0, 0);
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let result = place_players(
            &mut map,
            &roster()[..1],
            lone,
            &GenerationConfig::default(),
            &mut rng,
        );
        assert!(matches!(
            result,
            Err(MapGenError::NoBarracksCandidates {
                player: PlayerId(1),
                homeland,
            }) if homeland == lone
        ));
    }

    #[test]
    fn board_without_room_for_a_second_homeland_is_fatal() {
        let mut players: Vec<PlayerProfile> = roster()
            .into_iter()
            .filter(|player| player.race != Race::Undead)
            .collect();
        players[1].id = PlayerId(2);
        for seed in 0..10 {
            let result = BattlefieldGenerator::new(BattlefieldDimensions::new(1, 2))
                .with_players(players.clone())
                .generate_seeded(seed);
            assert!(
                matches!(
                    result,
                    Err(MapGenError::NoHomelandCandidates { player: PlayerId(2) })
                ),
                "seed {seed}: {result:?}"
            );
        }
    }

    #[test]
    fn duplicate_roster_entries_are_rejected() {
        let mut players = roster();
        players.push(players[0].clone());
        let result = BattlefieldGenerator::new(BattlefieldDimensions::new(9, 18))
            .with_players(players)
            .generate_seeded(1);
        assert!(matches!(result, Err(MapGenError::DuplicatePlayer(PlayerId(1)))));
    }
}
