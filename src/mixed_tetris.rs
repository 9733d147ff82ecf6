use crate::piece::{canonical_cells, PieceKey};
use crate::progress::Progress;
use crate::{CellSet, Puzzle, Solver, TetrisPiece};
use bevy_math::{ivec2, IVec2};
use fxhash::FxHashSet;
use log::trace;

impl Solver<'_> {
    /// Decide whether a region shape is achievable by a piece multiset that
    /// contains at least one negative (blue) piece.
    ///
    /// A blue piece may sit in a valid position *outside* the region, and
    /// positive pieces may overlap where a blue piece cancels them, so no
    /// local packing of the region suffices. Instead every placement
    /// combination over the whole board is enumerated once per multiset and
    /// the realizable region shapes are memoized: cells where the signed
    /// cover count ends at one form a shape; an all-zero board means the
    /// pieces cancel completely and any region is valid for this multiset.
    pub(crate) fn solve_blue_tetris(
        &mut self,
        area: &CellSet,
        pieces: &[&TetrisPiece],
    ) -> bool {
        let mut key: Vec<PieceKey> = pieces.iter().map(|p| p.sort_key()).collect();
        key.sort_unstable();

        if !self.memo.contains_key(&key) {
            // Positive pieces are placed before negative ones (each group in
            // key order). Cover counts then stay non-negative until only
            // blues remain, where the prune bound below is exact.
            let mut ordered: Vec<&TetrisPiece> = pieces.to_vec();
            ordered.sort_by_cached_key(|p| (p.negative(), p.sort_key()));

            let cells = (self.puzzle.width() * self.puzzle.height()) as usize;
            let mut counts = vec![0i32; cells];
            let mut shapes = FxHashSet::default();
            place(self.puzzle, &ordered, 0, &mut counts, &mut shapes, &mut self.progress);
            trace!(
                "mixed tetris: {} pieces realize {} region shapes",
                ordered.len(),
                shapes.len()
            );
            self.memo.insert(key.clone(), shapes);
        }

        match self.memo.get(&key) {
            Some(shapes) => {
                let region = canonical_cells(area.iter().copied().collect());
                shapes.contains(&region) || shapes.contains(&Vec::new())
            }
            None => false,
        }
    }
}

/// Layer placements of `pieces[n..]` over the board in every combination,
/// recording the realizable shapes at the leaves. Returns `false` when the
/// solve has been cancelled.
fn place(
    puzzle: &Puzzle,
    pieces: &[&TetrisPiece],
    n: usize,
    counts: &mut [i32],
    shapes: &mut FxHashSet<Vec<IVec2>>,
    progress: &mut Progress,
) -> bool {
    let (w, h) = (puzzle.width(), puzzle.height());

    // Pieces left to place after this one.
    let mut remaining_yellows = 0;
    let mut remaining_blues = 0;
    for p in &pieces[n + 1..] {
        if p.negative() {
            remaining_blues += 1;
        } else {
            remaining_yellows += 1;
        }
    }

    let delta: i32 = if pieces[n].negative() { -1 } else { 1 };
    let last = n == pieces.len() - 1;

    for rotation in pieces[n].shapes() {
        for x in 0..w {
            for y in 0..h {
                if !progress.tick() {
                    return false;
                }
                let anchor = ivec2(x, y);
                if !rotation.iter().all(|&c| {
                    let p = anchor + c;
                    p.x >= 0 && p.x < w && p.y >= 0 && p.y < h
                }) {
                    continue;
                }

                // Apply the placement cell by cell, abandoning as soon as a
                // cell can no longer be brought back into the 0..=1 range by
                // the pieces that remain.
                let mut applied = 0;
                let mut valid = true;
                for &c in rotation.iter() {
                    let p = anchor + c;
                    let i = (p.y * w + p.x) as usize;
                    counts[i] += delta;
                    applied += 1;
                    let v = counts[i];
                    if v != 0
                        && (remaining_yellows < -(v - 1) || remaining_blues < v - 1)
                    {
                        valid = false;
                        break;
                    }
                }

                if valid {
                    if last {
                        if counts.iter().all(|&v| v == 0 || v == 1) {
                            let mut shape = Vec::new();
                            for yy in 0..h {
                                for xx in 0..w {
                                    if counts[(yy * w + xx) as usize] == 1 {
                                        shape.push(ivec2(xx, yy));
                                    }
                                }
                            }
                            shapes.insert(canonical_cells(shape));
                        }
                    } else if !place(puzzle, pieces, n + 1, counts, shapes, progress) {
                        undo(counts, rotation, anchor, applied, delta, w);
                        return false;
                    }
                }

                undo(counts, rotation, anchor, applied, delta, w);
            }
        }
    }
    true
}

#[inline]
fn undo(counts: &mut [i32], rotation: &[IVec2], anchor: IVec2, applied: usize, delta: i32, w: i32) {
    for &c in rotation.iter().take(applied) {
        let p = anchor + c;
        counts[(p.y * w + p.x) as usize] -= delta;
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn area(points: &[(i32, i32)]) -> CellSet {
        points.iter().map(|&(x, y)| ivec2(x, y)).collect()
    }

    #[test]
    fn test_blue_cancels_one_end_of_a_bar() {
        let puzzle = Puzzle::new(2, 1);
        let mut solver = Solver::new(&puzzle);
        let bar = TetrisPiece::new([(0, 0), (1, 0)], false, false);
        let blue = TetrisPiece::new([(0, 0)], false, true);

        // The bar covers the whole board; the blue piece hollows out either
        // end, leaving a single-cell region.
        assert!(solver.solve_blue_tetris(&area(&[(0, 0)]), &[&bar, &blue]));
        assert!(solver.solve_blue_tetris(&area(&[(1, 0)]), &[&bar, &blue]));
        assert!(!solver.solve_blue_tetris(&area(&[(0, 0), (1, 0)]), &[&bar, &blue]));
    }

    #[test]
    fn test_full_cancellation_validates_any_region() {
        let puzzle = Puzzle::new(2, 2);
        let mut solver = Solver::new(&puzzle);
        let yellow = TetrisPiece::new([(0, 0)], false, false);
        let blue = TetrisPiece::new([(0, 0)], false, true);

        // A lone blue over a lone yellow cancels completely: the empty shape
        // is recorded and every region passes.
        assert!(solver.solve_blue_tetris(&area(&[(0, 0)]), &[&yellow, &blue]));
        assert!(solver.solve_blue_tetris(
            &area(&[(0, 0), (1, 0), (0, 1), (1, 1)]),
            &[&yellow, &blue],
        ));
    }

    #[test]
    fn test_overlapping_yellows_cancelled_by_blue() {
        let puzzle = Puzzle::new(2, 1);
        let mut solver = Solver::new(&puzzle);
        let bar_a = TetrisPiece::new([(0, 0), (1, 0)], false, false);
        let bar_b = TetrisPiece::new([(0, 0), (1, 0)], false, false);
        let blue_bar = TetrisPiece::new([(0, 0), (1, 0)], false, true);

        // Both bars stack on the board; the blue bar cancels one layer.
        assert!(solver.solve_blue_tetris(
            &area(&[(0, 0), (1, 0)]),
            &[&bar_a, &bar_b, &blue_bar],
        ));
    }

    #[test]
    fn test_memo_is_deterministic() {
        let puzzle = Puzzle::new(2, 1);
        let mut solver = Solver::new(&puzzle);
        let bar = TetrisPiece::new([(0, 0), (1, 0)], false, false);
        let blue = TetrisPiece::new([(0, 0)], false, true);
        let region = area(&[(0, 0)]);

        let first = solver.solve_blue_tetris(&region, &[&bar, &blue]);
        assert_eq!(solver.memo.len(), 1);

        // Same multiset in a different argument order: same verdict, no new
        // memo entry.
        let second = solver.solve_blue_tetris(&region, &[&blue, &bar]);
        assert_eq!(first, second);
        assert_eq!(solver.memo.len(), 1);
    }

    #[test]
    fn test_cancellation_unwinds() {
        let puzzle = Puzzle::new(2, 1);
        let mut solver = Solver::new(&puzzle);
        solver.cancel_token().cancel();
        let bar = TetrisPiece::new([(0, 0), (1, 0)], false, false);
        let blue = TetrisPiece::new([(0, 0)], false, true);
        assert!(!solver.solve_blue_tetris(&area(&[(0, 0)]), &[&bar, &blue]));
    }
}
