use crate::{CellSet, Puzzle};
use bevy_math::{ivec2, IVec2};
use std::collections::VecDeque;

/// The edges occupied by a traced path (and its mirrored twin).
///
/// Keyed by the edge grids of [Puzzle]: a path step between `(x, y)` and
/// `(x, y + 1)` occupies the h edge `(x, min)`; a step between `(x, y)` and
/// `(x + 1, y)` occupies the v edge `(min, y)`. Note the inversion this
/// implies for cell adjacency: h edges run *between* stacked nodes and so
/// block horizontal movement between cells, while v edges block vertical
/// movement.
#[derive(Debug, Clone, Default)]
pub struct PathEdges {
    pub v_edges: CellSet,
    pub h_edges: CellSet,
}

impl PathEdges {
    /// Collect the edges of a path and its twin into one set.
    #[must_use]
    pub fn from_paths(path: &[IVec2], twin: &[IVec2]) -> Self {
        let mut edges = Self::default();
        edges.add_path(path);
        edges.add_path(twin);
        edges
    }

    fn add_path(&mut self, path: &[IVec2]) {
        for pair in path.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            if a.x == b.x {
                self.h_edges.insert(ivec2(a.x, a.y.min(b.y)));
            } else if a.y == b.y {
                self.v_edges.insert(ivec2(a.x.min(b.x), a.y));
            }
        }
    }
}

/// Split the cell grid into the maximal connected regions left by the path.
///
/// Cells are scanned in row-major order; each unvisited cell seeds a BFS
/// flood fill that stops at path edges and board borders. The returned
/// regions partition the cell grid exactly; with no path edges the single
/// region is the whole grid.
#[must_use]
pub fn partition(puzzle: &Puzzle, edges: &PathEdges) -> Vec<CellSet> {
    let mut areas = Vec::new();
    let mut visited = CellSet::default();

    for y in 0..puzzle.height() {
        for x in 0..puzzle.width() {
            let seed = ivec2(x, y);
            if visited.contains(&seed) {
                continue;
            }

            let mut area = CellSet::default();
            let mut queue = VecDeque::new();
            queue.push_back(seed);
            area.insert(seed);
            visited.insert(seed);

            while let Some(cell) = queue.pop_front() {
                let mut extend = |next: IVec2, blocked: bool, area: &mut CellSet| {
                    if !blocked && !visited.contains(&next) {
                        visited.insert(next);
                        area.insert(next);
                        queue.push_back(next);
                    }
                };

                if cell.x > 0 {
                    extend(cell - IVec2::X, edges.h_edges.contains(&cell), &mut area);
                }
                if cell.x < puzzle.width() - 1 {
                    let next = cell + IVec2::X;
                    extend(next, edges.h_edges.contains(&next), &mut area);
                }
                if cell.y > 0 {
                    extend(cell - IVec2::Y, edges.v_edges.contains(&cell), &mut area);
                }
                if cell.y < puzzle.height() - 1 {
                    let next = cell + IVec2::Y;
                    extend(next, edges.v_edges.contains(&next), &mut area);
                }
            }

            areas.push(area);
        }
    }

    areas
}
