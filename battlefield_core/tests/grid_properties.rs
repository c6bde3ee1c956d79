//! Geometry properties checked over arbitrary small battlefields.

use battlefield_core::{
    distance, is_valid_position, neighbors, shortest_path, tiles_in_radius,
    BattlefieldDimensions, TilePosition,
};
use proptest::prelude::*;

/// A battlefield plus three tiles on it.
fn board_with_tiles(
) -> impl Strategy<Value = (BattlefieldDimensions, TilePosition, TilePosition, TilePosition)> {
    (1u32..=8, 2u32..=10).prop_flat_map(|(rows, cols)| {
        let dims = BattlefieldDimensions::new(rows, cols);
        let tiles: Vec<TilePosition> = dims.positions().collect();
        let pick = proptest::sample::select(tiles);
        (Just(dims), pick.clone(), pick.clone(), pick)
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn adjacency_is_symmetric((dims, a, _, _) in board_with_tiles()) {
        let around = neighbors(dims, a);
        prop_assert!(around.len() <= 6);
        for next in around {
            prop_assert!(is_valid_position(dims, next));
            prop_assert!(neighbors(dims, next).contains(&a), "{} -> {} is one way", a, next);
        }
    }

    #[test]
    fn distance_is_a_metric((dims, a, b, c) in board_with_tiles()) {
        let ab = distance(dims, a, b).unwrap();
        let bc = distance(dims, b, c).unwrap();
        let ac = distance(dims, a, c).unwrap();
        prop_assert_eq!(ab, distance(dims, b, a).unwrap());
        prop_assert_eq!(ab == 0, a == b);
        prop_assert!(ac <= ab + bc);
    }

    #[test]
    fn radius_matches_distance((dims, a, _, _) in board_with_tiles(), radius in 0u32..5) {
        let inside = tiles_in_radius(dims, a, radius, false);
        let expected: Vec<TilePosition> = dims
            .positions()
            .filter(|pos| distance(dims, a, *pos).is_some_and(|hexes| hexes <= radius))
            .collect();
        prop_assert_eq!(inside.len(), expected.len());
        prop_assert!(expected.iter().all(|pos| inside.contains(pos)));
        prop_assert_eq!(inside.first().copied(), Some(a));

        let excluded = tiles_in_radius(dims, a, radius, true);
        prop_assert_eq!(excluded.len() + 1, inside.len());
        prop_assert!(!excluded.contains(&a));
    }

    #[test]
    fn paths_are_shortest_walks((dims, a, b, _) in board_with_tiles()) {
        let path = shortest_path(dims, a, b);
        let hexes = distance(dims, a, b).unwrap();
        prop_assert_eq!(path.len() as u32, hexes + 1);
        prop_assert_eq!(path.first().copied(), Some(a));
        prop_assert_eq!(path.last().copied(), Some(b));
        for step in path.windows(2) {
            prop_assert!(neighbors(dims, step[0]).contains(&step[1]));
        }
    }
}

#[test]
fn off_board_queries_return_sentinels() {
    let dims = BattlefieldDimensions::new(6, 13);
    let outside = TilePosition::new(1, 12);
    assert!(neighbors(dims, outside).is_empty());
    assert_eq!(distance(dims, TilePosition::new(0, 0), outside), None);
    assert!(tiles_in_radius(dims, outside, 2, false).is_empty());
    assert!(shortest_path(dims, outside, TilePosition::new(0, 0)).is_empty());
}
