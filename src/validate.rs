use crate::{partition, Cell, CellSet, Color, PathEdges, Solver, TetrisPiece};
use bevy_math::IVec2;
use fxhash::{FxHashMap, FxHashSet};
use itertools::Itertools;

/// The outcome of checking one candidate path.
#[derive(Debug)]
pub(crate) enum Validation {
    /// Every region satisfies its rules: the path is a solution.
    Solved,
    /// The path does not yet finish on an end node; nothing was checked.
    NotAtEnd,
    /// One or more regions cannot be satisfied.
    Invalid(Vec<CellSet>),
}

impl<'p> Solver<'p> {
    /// See if the given path (and its twin) is a valid solution, and if not,
    /// which regions caused the problem.
    pub(crate) fn validate_path(&mut self, path: &[IVec2], twin: &[IVec2]) -> Validation {
        let last = match path.last() {
            Some(&last) => last,
            None => return Validation::NotAtEnd,
        };
        if !self.index.end_nodes.contains(&last) {
            return Validation::NotAtEnd;
        }

        // Publish this path for observers to pick up.
        self.progress.path.clear();
        self.progress.path.extend_from_slice(path);

        let edges = PathEdges::from_paths(path, twin);
        let areas = partition(self.puzzle, &edges);

        self.removed_pieces.clear();
        self.removed_nodes.clear();
        self.removed_v_edges.clear();
        self.removed_h_edges.clear();

        let mut invalid_areas = Vec::new();
        for area in &areas {
            if !self.validate_area(area, &edges, path, twin) {
                invalid_areas.push(area.clone());
            }
        }
        self.areas = areas;

        if invalid_areas.is_empty() {
            Validation::Solved
        } else {
            Validation::Invalid(invalid_areas)
        }
    }

    /// Decide satisfiability for one region, recording everything judged
    /// eliminated along the way.
    ///
    /// Triangles and hexagons are settled first since their failures consume
    /// the region's elimination budget; tetris must be settled before stars
    /// and squares because the kept pieces feed the fixed colour counts, and
    /// stars and squares must then use up the budget exactly.
    fn validate_area(
        &mut self,
        area: &CellSet,
        edges: &PathEdges,
        path: &[IVec2],
        twin: &[IVec2],
    ) -> bool {
        let puzzle = self.puzzle;

        // The elimination marks in this region set the error budget.
        let marks: Vec<IVec2> = in_area(&self.index.eliminations, area);
        let allowed_errors = marks.len() as u32;
        self.removed_pieces.extend(marks);

        let mut total_errors = 0u32;
        let mut fixed: FxHashMap<Color, u32> = FxHashMap::default();

        // Triangles: the bordering path edges must match the count.
        for cell in in_area(&self.index.triangles, area) {
            let mut border = 0u8;
            if edges.h_edges.contains(&cell) {
                border += 1;
            }
            if edges.h_edges.contains(&(cell + IVec2::X)) {
                border += 1;
            }
            if edges.v_edges.contains(&cell) {
                border += 1;
            }
            if edges.v_edges.contains(&(cell + IVec2::Y)) {
                border += 1;
            }
            match puzzle.cell(cell) {
                Cell::Triangle { count } if *count == border => {
                    *fixed.entry(Color::Orange).or_insert(0) += 1;
                }
                _ => {
                    total_errors += 1;
                    self.removed_pieces.insert(cell);
                }
            }
            if total_errors > allowed_errors {
                return false;
            }
        }

        // The nodes and edges interior to the region, i.e. not on a path.
        let path_nodes: FxHashSet<IVec2> = path.iter().chain(twin).copied().collect();
        let mut area_nodes = CellSet::default();
        let mut area_v_edges = CellSet::default();
        let mut area_h_edges = CellSet::default();
        for &cell in area {
            for node in [cell, cell + IVec2::X, cell + IVec2::Y, cell + IVec2::ONE] {
                if !path_nodes.contains(&node) {
                    area_nodes.insert(node);
                }
            }
            for v_edge in [cell, cell + IVec2::Y] {
                if !edges.v_edges.contains(&v_edge) {
                    area_v_edges.insert(v_edge);
                }
            }
            for h_edge in [cell, cell + IVec2::X] {
                if !edges.h_edges.contains(&h_edge) {
                    area_h_edges.insert(h_edge);
                }
            }
        }

        // Hexagons the path missed are errors.
        for node in in_area(&self.index.hexagon_nodes, &area_nodes) {
            total_errors += 1;
            self.removed_nodes.insert(node);
        }
        for v_edge in in_area(&self.index.hexagon_v_edges, &area_v_edges) {
            total_errors += 1;
            self.removed_v_edges.insert(v_edge);
        }
        for h_edge in in_area(&self.index.hexagon_h_edges, &area_h_edges) {
            total_errors += 1;
            self.removed_h_edges.insert(h_edge);
        }
        if total_errors > allowed_errors {
            return false;
        }

        // A third or further star of one colour can never pair up.
        let mut star_counts: FxHashMap<Color, u32> = FxHashMap::default();
        for cell in in_area(&self.index.stars, area) {
            if let Cell::Star { color } = puzzle.cell(cell) {
                let seen = star_counts.entry(*color).or_insert(0);
                if *seen > 1 {
                    total_errors += 1;
                    self.removed_pieces.insert(cell);
                }
                *seen += 1;
            }
        }
        if total_errors > allowed_errors {
            return false;
        }

        // Tetris: try keeping every subset of the region's pieces, spending
        // 0..=budget eliminations, before stars and squares are settled —
        // the kept pieces fix the yellow and blue counts the stars see.
        let tetris_cells: Vec<IVec2> = in_area(&self.index.tetris, area);
        let budget = (allowed_errors - total_errors) as usize;

        for tetris_errors in 0..=tetris_cells.len().min(budget) {
            let keep = tetris_cells.len() - tetris_errors;
            for kept in tetris_cells.iter().copied().combinations(keep) {
                // Reset only the tetris layer of prior attempts; triangle,
                // hexagon and star-overflow removals stay.
                for cell in &tetris_cells {
                    self.removed_pieces.remove(cell);
                }

                let mut pieces: Vec<&'p TetrisPiece> = Vec::with_capacity(kept.len());
                let mut yellow_cells = 0usize;
                let mut blue_cells = 0usize;
                for &cell in &kept {
                    if let Cell::Tetris(piece) = puzzle.cell(cell) {
                        if piece.negative() {
                            blue_cells += piece.count();
                        } else {
                            yellow_cells += piece.count();
                        }
                        pieces.push(piece);
                    }
                }

                let pieces_fit = if blue_cells == 0 {
                    if yellow_cells == 0 {
                        // No pieces kept (or none present) in this region.
                        true
                    } else if yellow_cells != area.len() {
                        false
                    } else {
                        self.solve_yellow_tetris(area, &pieces)
                    }
                } else if yellow_cells == 0 {
                    // Blue pieces alone cannot form a region.
                    false
                } else if blue_cells > yellow_cells {
                    false
                } else {
                    self.solve_blue_tetris(area, &pieces)
                };

                if !pieces_fit {
                    continue;
                }

                let blue_kept = pieces.iter().filter(|p| p.negative()).count() as u32;
                let yellow_kept = pieces.len() as u32 - blue_kept;
                fixed.insert(Color::Yellow, yellow_kept);
                fixed.insert(Color::Blue, blue_kept);

                // Stars and squares must use up the rest of the budget
                // exactly; otherwise keep searching subsets.
                let remaining = allowed_errors - total_errors - tetris_errors as u32;
                if let Some(removed) = self.solve_squares_and_stars(area, &fixed, remaining)
                {
                    if removed.len() as u32 == remaining {
                        self.removed_pieces.extend(
                            tetris_cells.iter().filter(|&&c| !kept.contains(&c)).copied(),
                        );

                        self.removed_pieces.extend(removed);
                        return true;
                    }
                }
            }
        }

        false
    }
}

/// The members of `positions` that fall inside `area`, in index order.
fn in_area(positions: &[IVec2], area: &CellSet) -> Vec<IVec2> {
    positions
        .iter()
        .filter(|p| area.contains(p))
        .copied()
        .collect()
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{Edge, Hexagon, Node, Puzzle};
    use bevy_math::ivec2;

    fn path(points: &[(i32, i32)]) -> Vec<IVec2> {
        points.iter().map(|&(x, y)| ivec2(x, y)).collect()
    }

    fn validate(puzzle: &Puzzle, points: &[(i32, i32)]) -> Validation {
        let mut solver = Solver::new(puzzle);
        solver.index = crate::index::PuzzleIndex::build(puzzle).unwrap();
        let p = path(points);
        let twin = puzzle.mirror_path(&p);
        solver.validate_path(&p, &twin)
    }

    #[test]
    fn test_path_off_end_node_is_not_validated() {
        let mut puzzle = Puzzle::new(1, 1);
        puzzle.set_node((0, 0), Node::start());
        puzzle.set_node((1, 1), Node::end());
        assert!(matches!(
            validate(&puzzle, &[(0, 0), (1, 0)]),
            Validation::NotAtEnd
        ));
    }

    #[test]
    fn test_empty_board_solves() {
        let mut puzzle = Puzzle::new(1, 1);
        puzzle.set_node((0, 0), Node::start());
        puzzle.set_node((1, 1), Node::end());
        assert!(matches!(
            validate(&puzzle, &[(0, 0), (1, 0), (1, 1)]),
            Validation::Solved
        ));
    }

    #[test]
    fn test_triangle_counts_bordering_edges() {
        let mut puzzle = Puzzle::new(1, 1);
        puzzle.set_node((0, 0), Node::start());
        puzzle.set_node((1, 1), Node::end());
        puzzle.set_cell((0, 0), Cell::Triangle { count: 2 });

        // Two of the cell's borders are on the path.
        assert!(matches!(
            validate(&puzzle, &[(0, 0), (1, 0), (1, 1)]),
            Validation::Solved
        ));

        // The same path over-counts a one-triangle.
        puzzle.set_cell((0, 0), Cell::Triangle { count: 1 });
        assert!(matches!(
            validate(&puzzle, &[(0, 0), (1, 0), (1, 1)]),
            Validation::Invalid(_)
        ));
    }

    #[test]
    fn test_missed_hexagon_node_invalidates() {
        let mut puzzle = Puzzle::new(2, 1);
        puzzle.set_node((0, 0), Node::start());
        puzzle.set_node((2, 1), Node::end());
        puzzle.set_node((1, 1), Node::hexagon(crate::Color::Black));

        // Straight along the top: the hexagon node at (1, 1) is interior.
        assert!(matches!(
            validate(&puzzle, &[(0, 0), (1, 0), (2, 0), (2, 1)]),
            Validation::Invalid(_)
        ));

        // Dipping through (1, 1) picks it up.
        assert!(matches!(
            validate(&puzzle, &[(0, 0), (0, 1), (1, 1), (1, 0), (2, 0), (2, 1)]),
            Validation::Solved
        ));
    }

    #[test]
    fn test_missed_hexagon_edge_consumes_budget() {
        let mut puzzle = Puzzle::new(1, 1);
        puzzle.set_node((0, 0), Node::start());
        puzzle.set_node((1, 1), Node::end());
        puzzle.set_v_edge((0, 1), Edge::Hexagon(Hexagon::default()));

        // The path misses the bottom edge hexagon and there is no budget.
        assert!(matches!(
            validate(&puzzle, &[(0, 0), (1, 0), (1, 1)]),
            Validation::Invalid(_)
        ));

        // An elimination mark absorbs the miss.
        puzzle.set_cell((0, 0), Cell::Elimination);
        let mut solver = Solver::new(&puzzle);
        solver.index = crate::index::PuzzleIndex::build(&puzzle).unwrap();
        let p = path(&[(0, 0), (1, 0), (1, 1)]);
        assert!(matches!(solver.validate_path(&p, &[]), Validation::Solved));
        assert!(solver.removed_v_edges.contains(&ivec2(0, 1)));
        assert!(solver.removed_pieces.contains(&ivec2(0, 0)));
    }

    #[test]
    fn test_star_overflow_is_an_error() {
        let mut puzzle = Puzzle::new(3, 1);
        puzzle.set_node((0, 0), Node::start());
        puzzle.set_node((3, 1), Node::end());
        for x in 0..3 {
            puzzle.set_cell((x, 0), Cell::Star { color: crate::Color::Red });
        }

        // Three red stars in one region: the third can never pair.
        assert!(matches!(
            validate(&puzzle, &[(0, 0), (1, 0), (2, 0), (3, 0), (3, 1)]),
            Validation::Invalid(_)
        ));
    }

    #[test]
    fn test_kept_tetris_feeds_star_pairing() {
        // A yellow star pairs with the single kept yellow piece.
        let mut puzzle = Puzzle::new(2, 1);
        puzzle.set_node((0, 0), Node::start());
        puzzle.set_node((2, 1), Node::end());
        let bar = TetrisPiece::new([(0, 0), (1, 0)], false, false);
        puzzle.set_cell((0, 0), Cell::Tetris(bar));
        puzzle.set_cell((1, 0), Cell::Star { color: Color::Yellow });

        assert!(matches!(
            validate(&puzzle, &[(0, 0), (1, 0), (2, 0), (2, 1)]),
            Validation::Solved
        ));
    }

    #[test]
    fn test_eliminated_tetris_piece() {
        // A piece that cannot fit is absorbed by an elimination mark.
        let mut puzzle = Puzzle::new(2, 1);
        puzzle.set_node((0, 0), Node::start());
        puzzle.set_node((2, 1), Node::end());
        let bar = TetrisPiece::new([(0, 0), (0, 1)], false, false);
        puzzle.set_cell((0, 0), Cell::Tetris(bar));
        puzzle.set_cell((1, 0), Cell::Elimination);

        let mut solver = Solver::new(&puzzle);
        solver.index = crate::index::PuzzleIndex::build(&puzzle).unwrap();
        let p = path(&[(0, 0), (1, 0), (2, 0), (2, 1)]);
        assert!(matches!(solver.validate_path(&p, &[]), Validation::Solved));
        // The piece cell and the mark are both recorded as removed.
        assert!(solver.removed_pieces.contains(&ivec2(0, 0)));
        assert!(solver.removed_pieces.contains(&ivec2(1, 0)));
    }

    #[test]
    fn test_undersized_tetris_rejected_without_budget() {
        let mut puzzle = Puzzle::new(2, 1);
        puzzle.set_node((0, 0), Node::start());
        puzzle.set_node((2, 1), Node::end());
        let mono = TetrisPiece::new([(0, 0)], false, false);
        puzzle.set_cell((0, 0), Cell::Tetris(mono));

        // One yellow cell in a two-cell region, no elimination budget.
        assert!(matches!(
            validate(&puzzle, &[(0, 0), (1, 0), (2, 0), (2, 1)]),
            Validation::Invalid(_)
        ));
    }
}
