//! Hex offset grid geometry for the clipped battlefield layout.
//!
//! Even rows hold `cols` tiles while odd rows hold `cols - 1` and sit half a
//! tile to the right, so adjacency depends on row parity. Distances, radius
//! queries and paths are all breadth-first searches over [`neighbors`]; the
//! clipped odd rows break the uniform axial distance formula along the right
//! edge.

use std::{
    collections::{HashMap, HashSet, VecDeque},
    fmt,
    num::ParseIntError,
    str::FromStr,
};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::land::{BattlefieldMap, LandState};

/// Radius used when looking for a fallback stronghold around a tile.
pub const DEFAULT_STRONGHOLD_SEARCH_RADIUS: u32 = 1;

const EVEN_ROW_OFFSETS: [(i32, i32); 6] = [(0, -1), (0, 1), (-1, -1), (-1, 0), (1, -1), (1, 0)];
const ODD_ROW_OFFSETS: [(i32, i32); 6] = [(0, -1), (0, 1), (-1, 0), (-1, 1), (1, 0), (1, 1)];

/// Size of a battlefield in rows and (even-row) columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BattlefieldDimensions {
    pub rows: u32,
    pub cols: u32,
}

impl BattlefieldDimensions {
    pub const fn new(rows: u32, cols: u32) -> Self {
        Self { rows, cols }
    }

    /// Number of tiles in `row`; odd rows are one tile short.
    pub fn cols_in_row(&self, row: i32) -> u32 {
        if row.rem_euclid(2) == 0 {
            self.cols
        } else {
            self.cols.saturating_sub(1)
        }
    }

    pub fn tile_count(&self) -> usize {
        (0..self.rows as i32)
            .map(|row| self.cols_in_row(row) as usize)
            .sum()
    }

    /// Every valid position in row-major order.
    pub fn positions(&self) -> impl Iterator<Item = TilePosition> + '_ {
        (0..self.rows as i32).flat_map(move |row| {
            (0..self.cols_in_row(row) as i32).map(move |col| TilePosition::new(row, col))
        })
    }

    /// True when `pos` is at least `margin` tiles away from every border.
    pub fn is_interior(&self, pos: TilePosition, margin: u32) -> bool {
        if !is_valid_position(*self, pos) {
            return false;
        }
        let margin = margin as i64;
        let row = pos.row as i64;
        let col = pos.col as i64;
        row >= margin
            && row < self.rows as i64 - margin
            && col >= margin
            && col < self.cols_in_row(pos.row) as i64 - margin
    }
}

impl fmt::Display for BattlefieldDimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.rows, self.cols)
    }
}

/// Row/column address of a tile. Signed so off-board candidates can be
/// represented while enumerating neighbors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TilePosition {
    pub row: i32,
    pub col: i32,
}

impl TilePosition {
    pub const fn new(row: i32, col: i32) -> Self {
        Self { row, col }
    }

    /// Canonical registry key, `"{row}-{col}"`.
    pub fn key(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for TilePosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.row, self.col)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TilePositionParseError {
    #[error("tile key `{0}` is not in row-col form")]
    MissingSeparator(String),
    #[error("tile key `{key}` has a non-numeric component: {source}")]
    InvalidComponent {
        key: String,
        #[source]
        source: ParseIntError,
    },
}

impl FromStr for TilePosition {
    type Err = TilePositionParseError;

    fn from_str(key: &str) -> Result<Self, Self::Err> {
        let (row, col) = key
            .split_once('-')
            .ok_or_else(|| TilePositionParseError::MissingSeparator(key.to_string()))?;
        let parse = |part: &str| {
            part.parse::<i32>()
                .map_err(|source| TilePositionParseError::InvalidComponent {
                    key: key.to_string(),
                    source,
                })
        };
        Ok(TilePosition::new(parse(row)?, parse(col)?))
    }
}

pub fn is_valid_position(dimensions: BattlefieldDimensions, pos: TilePosition) -> bool {
    pos.row >= 0
        && (pos.row as u32) < dimensions.rows
        && pos.col >= 0
        && (pos.col as u32) < dimensions.cols_in_row(pos.row)
}

/// Adjacent on-board positions of `pos`, at most six.
pub fn neighbors(dimensions: BattlefieldDimensions, pos: TilePosition) -> Vec<TilePosition> {
    let offsets = if pos.row.rem_euclid(2) == 0 {
        &EVEN_ROW_OFFSETS
    } else {
        &ODD_ROW_OFFSETS
    };
    offsets
        .iter()
        .map(|(dr, dc)| TilePosition::new(pos.row + dr, pos.col + dc))
        .filter(|candidate| is_valid_position(dimensions, *candidate))
        .collect()
}

/// Hop count between two tiles, `None` when either endpoint is off the board
/// or the target cannot be reached.
pub fn distance(
    dimensions: BattlefieldDimensions,
    from: TilePosition,
    to: TilePosition,
) -> Option<u32> {
    if !is_valid_position(dimensions, from) || !is_valid_position(dimensions, to) {
        return None;
    }

    let mut visited = HashSet::from([from]);
    let mut queue = VecDeque::from([(from, 0u32)]);
    while let Some((current, hops)) = queue.pop_front() {
        if current == to {
            return Some(hops);
        }
        for next in neighbors(dimensions, current) {
            if visited.insert(next) {
                queue.push_back((next, hops + 1));
            }
        }
    }
    None
}

/// Tiles within `radius` hops of `center` in breadth-first discovery order:
/// the center, then ring 1, then ring 2 and so on. Map generation consumes
/// this order positionally.
pub fn tiles_in_radius(
    dimensions: BattlefieldDimensions,
    center: TilePosition,
    radius: u32,
    exclude_center: bool,
) -> Vec<TilePosition> {
    if !is_valid_position(dimensions, center) {
        return Vec::new();
    }

    let mut visited = HashSet::from([center]);
    let mut found = vec![center];
    let mut frontier = vec![center];
    for _ in 0..radius {
        let mut next_frontier = Vec::new();
        for pos in &frontier {
            for next in neighbors(dimensions, *pos) {
                if visited.insert(next) {
                    found.push(next);
                    next_frontier.push(next);
                }
            }
        }
        if next_frontier.is_empty() {
            break;
        }
        frontier = next_frontier;
    }

    if exclude_center {
        found.remove(0);
    }
    found
}

/// One shortest route from `start` to `end`, both inclusive.
pub fn shortest_path(
    dimensions: BattlefieldDimensions,
    start: TilePosition,
    end: TilePosition,
) -> Vec<TilePosition> {
    if !is_valid_position(dimensions, start) || !is_valid_position(dimensions, end) {
        return Vec::new();
    }
    if start == end {
        return vec![start];
    }

    let mut came_from: HashMap<TilePosition, TilePosition> = HashMap::new();
    let mut queue = VecDeque::from([start]);
    let mut reached = false;
    'search: while let Some(current) = queue.pop_front() {
        for next in neighbors(dimensions, current) {
            if next == start || came_from.contains_key(&next) {
                continue;
            }
            came_from.insert(next, current);
            if next == end {
                reached = true;
                break 'search;
            }
            queue.push_back(next);
        }
    }
    if !reached {
        return Vec::new();
    }

    let mut path = vec![end];
    let mut cursor = end;
    while let Some(previous) = came_from.get(&cursor) {
        path.push(*previous);
        cursor = *previous;
    }
    path.reverse();
    path
}

/// Closest stronghold-bearing land within `radius` of `pos`, excluding `pos`
/// itself. A stronghold held by the controller of `pos` wins over any other;
/// otherwise the first one in breadth-first order is returned.
pub fn nearest_stronghold_land(
    pos: TilePosition,
    battlefield: &BattlefieldMap,
    radius: u32,
) -> Option<&LandState> {
    let origin_controller = battlefield.land(pos).and_then(LandState::controller);
    let mut first_found = None;
    for candidate in tiles_in_radius(battlefield.dimensions(), pos, radius, true) {
        let Some(land) = battlefield.land(candidate) else {
            continue;
        };
        if !land.has_stronghold() {
            continue;
        }
        if land.controller() == origin_controller {
            return Some(land);
        }
        first_found.get_or_insert(land);
    }
    first_found
}
