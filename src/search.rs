use crate::index::PuzzleIndex;
use crate::piece::PieceKey;
use crate::progress::Progress;
use crate::validate::Validation;
use crate::{CancelToken, CellSet, Direction, Puzzle, PuzzleError, Snapshot, Symmetry};
use bevy_math::IVec2;
use fxhash::{FxHashMap, FxHashSet};
use log::debug;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::time::Duration;

/// Attempt to solve the puzzle. If `randomize` is true, start nodes and
/// extension directions are shuffled, which can help when the default order
/// visibly explores poor paths first.
///
/// # Errors
///
/// Returns a [PuzzleError] for a structurally invalid puzzle. An unsolvable
/// or degenerate puzzle is not an error: the returned [Solution] carries
/// `solved: false` and an explanatory message.
pub fn solve(puzzle: &Puzzle, randomize: bool) -> Result<Solution, PuzzleError> {
    Solver::new(puzzle).randomize(randomize).solve()
}

/// The outcome of a solve: the path and region partition when solved, and
/// diagnostics either way.
#[derive(Debug, Clone)]
pub struct Solution {
    pub solved: bool,
    /// The solving path, ordered from start node to end node. Empty when
    /// `solved` is false.
    pub path: Vec<IVec2>,
    /// The region partition left by the final validated path.
    pub areas: Vec<CellSet>,
    /// Cells judged eliminated: the elimination marks themselves plus every
    /// symbol they consumed.
    pub removed_pieces: CellSet,
    /// Hexagon nodes consumed by elimination marks.
    pub removed_nodes: CellSet,
    pub removed_v_edges: CellSet,
    pub removed_h_edges: CellSet,
    /// How many paths were taken off the search stack.
    pub path_attempts: u64,
    pub time_taken: Duration,
    pub message: String,
}

/// A single-threaded cooperative path searcher over one puzzle.
///
/// The puzzle is read-only for the lifetime of the solver; all per-solve
/// scratch state lives here. Progress observers are invoked synchronously at
/// yield points and must not block.
pub struct Solver<'p> {
    pub(crate) puzzle: &'p Puzzle,
    pub(crate) index: PuzzleIndex,
    pub(crate) progress: Progress,
    pub(crate) randomize: bool,
    pub(crate) rng: StdRng,
    pub(crate) solution_found: bool,
    pub(crate) path: Vec<IVec2>,
    pub(crate) areas: Vec<CellSet>,
    pub(crate) removed_pieces: CellSet,
    pub(crate) removed_nodes: CellSet,
    pub(crate) removed_v_edges: CellSet,
    pub(crate) removed_h_edges: CellSet,
    /// Realizable region shapes per mixed piece multiset; lives for one
    /// solve.
    pub(crate) memo: FxHashMap<Vec<PieceKey>, FxHashSet<Vec<IVec2>>>,
}

impl<'p> Solver<'p> {
    #[must_use]
    pub fn new(puzzle: &'p Puzzle) -> Self {
        Self {
            puzzle,
            index: PuzzleIndex::default(),
            progress: Progress::new(),
            randomize: false,
            rng: StdRng::from_entropy(),
            solution_found: false,
            path: Vec::new(),
            areas: Vec::new(),
            removed_pieces: CellSet::default(),
            removed_nodes: CellSet::default(),
            removed_v_edges: CellSet::default(),
            removed_h_edges: CellSet::default(),
            memo: FxHashMap::default(),
        }
    }

    /// Shuffle start nodes and extension directions.
    #[must_use]
    pub fn randomize(mut self, randomize: bool) -> Self {
        self.randomize = randomize;
        self
    }

    /// Seed the shuffle RNG, making a randomized solve deterministic.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    /// Change how often observers are notified (default 100ms).
    #[must_use]
    pub fn with_yield_interval(mut self, interval: Duration) -> Self {
        self.progress.set_interval(interval);
        self
    }

    /// Register a callback invoked at every yield point with the solve's
    /// current snapshot.
    pub fn register_observer<F>(&mut self, observer: F)
    where
        F: FnMut(&Snapshot<'_>) + 'static,
    {
        self.progress.register_observer(Box::new(observer));
    }

    /// A handle that cancels this solve from an observer or another thread.
    #[must_use]
    pub fn cancel_token(&self) -> CancelToken {
        self.progress.cancel_token()
    }

    /// Run the search. Consumes the solver; per-solve scratch state is
    /// discarded with it.
    pub fn solve(mut self) -> Result<Solution, PuzzleError> {
        debug!(
            "solving a {}x{} puzzle (symmetry {:?})",
            self.puzzle.width(),
            self.puzzle.height(),
            self.puzzle.symmetry()
        );
        self.progress.begin("Solving...");
        self.solution_found = false;
        self.index = PuzzleIndex::build(self.puzzle)?;

        if self.index.start_nodes.is_empty() {
            debug!("degenerate puzzle: no start nodes");
            self.progress.message = "Cannot solve: no start nodes".into();
            return Ok(self.into_solution());
        }
        if self.index.end_nodes.is_empty() {
            debug!("degenerate puzzle: no end nodes");
            self.progress.message = "Cannot solve: no end nodes".into();
            return Ok(self.into_solution());
        }

        let mut start_nodes = self.index.start_nodes.clone();
        if self.randomize {
            start_nodes.shuffle(&mut self.rng);
        }

        for start in start_nodes {
            self.check_all_paths(start);
            if self.solution_found || self.progress.is_cancelled() {
                break;
            }
        }

        if self.progress.is_cancelled() {
            debug!(
                "solve cancelled after {} path attempts",
                self.progress.path_attempts
            );
            return Ok(self.into_solution());
        }

        if self.solution_found {
            debug!("solved in {} path attempts", self.progress.path_attempts);
            self.progress.message = "Solved!".into();
        } else {
            debug!(
                "exhausted all paths after {} attempts",
                self.progress.path_attempts
            );
            self.path.clear();
            self.progress.message = "Cannot solve: tried all possibilities".into();
        }
        Ok(self.into_solution())
    }

    fn into_solution(mut self) -> Solution {
        Solution {
            solved: self.solution_found,
            path: self.path,
            areas: self.areas,
            removed_pieces: self.removed_pieces,
            removed_nodes: self.removed_nodes,
            removed_v_edges: self.removed_v_edges,
            removed_h_edges: self.removed_h_edges,
            path_attempts: self.progress.path_attempts,
            time_taken: self.progress.elapsed(),
            message: std::mem::take(&mut self.progress.message),
        }
    }

    /// Depth-first search over every path from the given start node.
    fn check_all_paths(&mut self, start: IVec2) {
        let mut queue: Vec<Vec<IVec2>> = vec![vec![start]];

        while let Some(path) = queue.pop() {
            self.progress.path_attempts += 1;
            if !self.progress.tick() {
                return;
            }

            let twin = self.puzzle.mirror_path(&path);

            let invalid_areas = match self.validate_path(&path, &twin) {
                Validation::Solved => {
                    self.solution_found = true;
                    self.path = path;
                    return;
                }
                Validation::NotAtEnd => Vec::new(),
                Validation::Invalid(areas) => areas,
            };

            let mut genuine_invalid = false;
            for area in &invalid_areas {
                // With multiple end nodes on the board, a region holding an
                // end node used by neither path is an artifact of this path
                // simply not going there; it neither prunes nor blocks.
                if self.touches_foreign_end(area, &path, &twin) {
                    continue;
                }
                genuine_invalid = true;

                // The path nodes that fence in the invalid region: any
                // queued path still containing all of them can never fix it.
                let mut invalid_path_nodes = FxHashSet::default();
                for &node in path.iter().chain(twin.iter()) {
                    let corners = [
                        node,
                        node - IVec2::X,
                        node - IVec2::Y,
                        node - IVec2::ONE,
                    ];
                    if corners.iter().any(|c| area.contains(c)) {
                        invalid_path_nodes.insert(node);
                    }
                }
                queue.retain(|queued| {
                    !invalid_path_nodes.iter().all(|n| queued.contains(n))
                });
            }

            // A genuinely unsatisfiable region means extending this path is
            // pointless.
            if genuine_invalid {
                continue;
            }

            let last = path[path.len() - 1];

            let mut directions = Direction::SEARCH_ORDER;
            if self.randomize {
                directions.shuffle(&mut self.rng);
            }

            for direction in directions {
                let next = direction.step(last);
                if !self.puzzle.contains_node(next) {
                    continue;
                }
                if path.contains(&next) {
                    continue;
                }
                if self.edge_missing(last, next) {
                    continue;
                }

                if self.puzzle.symmetry() != Symmetry::None {
                    let next_twin = match self.puzzle.mirror_node(next) {
                        Some(node) => node,
                        None => continue,
                    };
                    // The twin advances in lock step; the two lines may
                    // never meet or cross a missing edge.
                    if next == next_twin || twin.contains(&next) {
                        continue;
                    }
                    let twin_last = twin[twin.len() - 1];
                    if self.edge_missing(twin_last, next_twin) {
                        continue;
                    }
                }

                let mut extended = Vec::with_capacity(path.len() + 1);
                extended.extend_from_slice(&path);
                extended.push(next);
                queue.push(extended);
            }
        }
    }

    /// Is the edge between two adjacent nodes missing?
    fn edge_missing(&self, a: IVec2, b: IVec2) -> bool {
        if a.x == b.x {
            self.puzzle
                .h_edge(IVec2::new(a.x, a.y.min(b.y)))
                .is_missing()
        } else {
            self.puzzle
                .v_edge(IVec2::new(a.x.min(b.x), a.y))
                .is_missing()
        }
    }

    /// Does this region touch an end node used by neither path?
    fn touches_foreign_end(&self, area: &CellSet, path: &[IVec2], twin: &[IVec2]) -> bool {
        if self.index.end_nodes.len() <= 1 {
            return false;
        }
        let path_end = path.last().copied();
        let twin_end = twin.last().copied();
        for &cell in area {
            for node in [cell, cell + IVec2::X, cell + IVec2::Y, cell + IVec2::ONE] {
                if self.index.end_nodes.contains(&node)
                    && Some(node) != path_end
                    && (twin.is_empty() || Some(node) != twin_end)
                {
                    return true;
                }
            }
        }
        false
    }
}
