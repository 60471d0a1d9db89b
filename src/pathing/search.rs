//! Incremental A* search
//!
//! A `PathSearch` owns its whole frontier, so it can be stepped one expansion
//! at a time and put away between ticks. The caller decides how many steps a
//! search gets per tick.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use ahash::{AHashMap, AHashSet};
use ordered_float::OrderedFloat;

use crate::grid::{GridIndex, Tile, TileCoord};
use crate::pathing::path::Path;

/// Where a search stands after a step
#[derive(Debug, Clone, PartialEq)]
pub enum SearchState {
    Searching,
    Found(Path),
    Failed,
}

impl SearchState {
    pub fn is_finished(&self) -> bool {
        !matches!(self, SearchState::Searching)
    }
}

/// Partial path waiting in the frontier
#[derive(Debug, Clone)]
struct FrontierEntry {
    key: OrderedFloat<f32>,
    seq: u64,
    path: Path,
}

impl PartialEq for FrontierEntry {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key && self.seq == other.seq
    }
}

impl Eq for FrontierEntry {}

impl Ord for FrontierEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse order for min-heap; earlier pushes win ties
        other
            .key
            .cmp(&self.key)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for FrontierEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Resumable A* from one tile to another
#[derive(Debug, Clone)]
pub struct PathSearch {
    start: TileCoord,
    goal: TileCoord,
    frontier: BinaryHeap<FrontierEntry>,
    closed: AHashSet<TileCoord>,
    best_cost: AHashMap<TileCoord, f32>,
    next_seq: u64,
    expansions: u32,
    state: SearchState,
}

impl PathSearch {
    /// Seed a search with the single-tile path at `start`.
    ///
    /// If either endpoint is not on the map the search is born failed.
    pub fn new(grid: &GridIndex, start: TileCoord, goal: TileCoord) -> Self {
        let mut search = Self {
            start,
            goal,
            frontier: BinaryHeap::new(),
            closed: AHashSet::new(),
            best_cost: AHashMap::new(),
            next_seq: 0,
            expansions: 0,
            state: SearchState::Searching,
        };

        match (grid.tile(start), grid.contains(goal)) {
            (Some(tile), true) => {
                let path = Path::starting_at(tile, grid.heuristic(start, goal));
                search.best_cost.insert(start, 0.0);
                search.push(path);
            }
            _ => search.state = SearchState::Failed,
        }

        search
    }

    pub fn start(&self) -> TileCoord {
        self.start
    }

    pub fn goal(&self) -> TileCoord {
        self.goal
    }

    pub fn state(&self) -> &SearchState {
        &self.state
    }

    /// Number of frontier pops so far
    pub fn expansions(&self) -> u32 {
        self.expansions
    }

    fn push(&mut self, path: Path) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.frontier.push(FrontierEntry {
            key: OrderedFloat(path.total()),
            seq,
            path,
        });
    }

    /// Perform one expansion.
    ///
    /// `walkable` decides whether the searching unit may enter a tile. It is
    /// never asked about the start tile.
    pub fn step<F>(&mut self, grid: &GridIndex, walkable: F) -> SearchState
    where
        F: Fn(&Tile) -> bool,
    {
        if self.state.is_finished() {
            return self.state.clone();
        }

        // Skip entries whose tile was expanded through a cheaper path
        let entry = loop {
            match self.frontier.pop() {
                Some(entry) => {
                    let stale = entry
                        .path
                        .last_tile()
                        .map_or(true, |last| self.closed.contains(&last));
                    if !stale {
                        break entry;
                    }
                }
                None => {
                    self.state = SearchState::Failed;
                    return self.state.clone();
                }
            }
        };

        self.expansions += 1;
        let path = entry.path;
        let Some(last) = path.last_tile() else {
            return self.state.clone();
        };

        if last == self.goal {
            self.frontier.clear();
            self.state = SearchState::Found(path);
            return self.state.clone();
        }

        self.closed.insert(last);

        for tile in grid.adjacent_tiles(last) {
            if self.closed.contains(&tile.coord) || !walkable(tile) {
                continue;
            }

            let edge_cost = tile.terrain_cost().max(0.0);
            let cost = path.cost() + edge_cost;
            let known = self
                .best_cost
                .get(&tile.coord)
                .copied()
                .unwrap_or(f32::INFINITY);
            if cost >= known {
                continue;
            }
            self.best_cost.insert(tile.coord, cost);

            let mut branch = path.clone();
            branch.append(Some(tile), grid.heuristic(tile.coord, self.goal), edge_cost);
            self.push(branch);
        }

        self.state.clone()
    }

    /// Step until the search finishes. Returns the path if one exists.
    pub fn run_to_completion<F>(&mut self, grid: &GridIndex, walkable: F) -> Option<Path>
    where
        F: Fn(&Tile) -> bool,
    {
        loop {
            match self.step(grid, &walkable) {
                SearchState::Searching => continue,
                SearchState::Found(path) => return Some(path),
                SearchState::Failed => return None,
            }
        }
    }
}

/// Find a path synchronously
pub fn find_path<F>(grid: &GridIndex, start: TileCoord, goal: TileCoord, walkable: F) -> Option<Path>
where
    F: Fn(&Tile) -> bool,
{
    PathSearch::new(grid, start, goal).run_to_completion(grid, walkable)
}
