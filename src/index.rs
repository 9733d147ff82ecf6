use crate::{Cell, Puzzle, PuzzleError, Symmetry};
use bevy_math::{ivec2, IVec2};

/// Positional lists extracted from a [Puzzle] in one scan, so the solver can
/// iterate over items of interest without re-walking the grids.
#[derive(Debug, Clone, Default)]
pub(crate) struct PuzzleIndex {
    pub start_nodes: Vec<IVec2>,
    pub end_nodes: Vec<IVec2>,
    pub hexagon_nodes: Vec<IVec2>,
    pub hexagon_v_edges: Vec<IVec2>,
    pub hexagon_h_edges: Vec<IVec2>,
    pub triangles: Vec<IVec2>,
    pub squares: Vec<IVec2>,
    pub stars: Vec<IVec2>,
    pub tetris: Vec<IVec2>,
    pub eliminations: Vec<IVec2>,
}

impl PuzzleIndex {
    /// Scan the puzzle once, validating symbol attributes as they stream by.
    ///
    /// Start nodes are deduplicated under symmetry so the searcher never
    /// tries a mirror-equivalent start: HORIZONTAL keeps `2x <= w`, VERTICAL
    /// keeps `2y <= h`, ROTATIONAL keeps a node only if its point mirror was
    /// not already admitted.
    pub fn build(puzzle: &Puzzle) -> Result<Self, PuzzleError> {
        let mut index = Self::default();
        let (w, h) = (puzzle.width(), puzzle.height());
        let board = (w * h) as usize;

        for x in 0..=w {
            for y in 0..=h {
                let p = ivec2(x, y);
                let node = puzzle.node(p);

                if node.is_start() {
                    let keep = match puzzle.symmetry() {
                        Symmetry::None => true,
                        Symmetry::Horizontal => 2 * x <= w,
                        Symmetry::Vertical => 2 * y <= h,
                        Symmetry::Rotational => {
                            !index.start_nodes.contains(&ivec2(w - x, h - y))
                        }
                    };
                    if keep {
                        index.start_nodes.push(p);
                    }
                }
                if node.is_end() {
                    index.end_nodes.push(p);
                }
                if node.is_hexagon() {
                    index.hexagon_nodes.push(p);
                }

                if x < w && puzzle.v_edge(p).is_hexagon() {
                    index.hexagon_v_edges.push(p);
                }
                if y < h && puzzle.h_edge(p).is_hexagon() {
                    index.hexagon_h_edges.push(p);
                }

                if x < w && y < h {
                    match puzzle.cell(p) {
                        Cell::Empty => {}
                        Cell::Triangle { count } => {
                            if !(1..=3).contains(count) {
                                return Err(PuzzleError::BadTriangleCount {
                                    x,
                                    y,
                                    count: *count,
                                });
                            }
                            index.triangles.push(p);
                        }
                        Cell::Square { .. } => index.squares.push(p),
                        Cell::Star { .. } => index.stars.push(p),
                        Cell::Tetris(piece) => {
                            if piece.count() > board {
                                return Err(PuzzleError::PieceTooLarge {
                                    x,
                                    y,
                                    cells: piece.count(),
                                    board,
                                });
                            }
                            index.tetris.push(p);
                        }
                        Cell::Elimination => index.eliminations.push(p),
                    }
                }
            }
        }

        Ok(index)
    }
}
