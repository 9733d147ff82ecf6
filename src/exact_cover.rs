use crate::progress::Progress;
use crate::{CellSet, Solver, TetrisPiece};
use bevy_math::IVec2;
use fxhash::FxHashSet;
use indexmap::IndexMap;

/// A column of the exact-cover matrix: one per region cell, one per piece
/// instance. Covering every column exactly once is a packing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Col {
    Cell(IVec2),
    Piece(usize),
}

impl Solver<'_> {
    /// Attempt to exactly fit all given positive pieces into the region
    /// using Knuth's Algorithm X.
    ///
    /// The caller has already checked that the pieces' total cell count
    /// equals the region size; a mismatch leaves uncoverable columns and
    /// simply exhausts to `false`. Returns `true` on the first cover found,
    /// `false` on exhaustion or cancellation.
    pub(crate) fn solve_yellow_tetris(
        &mut self,
        area: &CellSet,
        pieces: &[&TetrisPiece],
    ) -> bool {
        let mut anchors: Vec<IVec2> = area.iter().copied().collect();
        anchors.sort_unstable_by_key(|c| (c.x, c.y));

        // A row for every (piece, rotation, anchor) placement that lies
        // entirely within the region. The row covers the placed cells plus
        // the piece's own column.
        let mut rows: Vec<Vec<Col>> = Vec::new();
        for (pi, piece) in pieces.iter().enumerate() {
            for rotation in piece.shapes() {
                for &anchor in &anchors {
                    let cells: Vec<IVec2> =
                        rotation.iter().map(|&c| anchor + c).collect();
                    if cells.iter().all(|c| area.contains(c)) {
                        let mut row = Vec::with_capacity(cells.len() + 1);
                        row.push(Col::Piece(pi));
                        row.extend(cells.into_iter().map(Col::Cell));
                        rows.push(row);
                    }
                }
            }
        }

        let mut cols: IndexMap<Col, FxHashSet<usize>> = IndexMap::new();
        for &cell in &anchors {
            cols.insert(Col::Cell(cell), FxHashSet::default());
        }
        for pi in 0..pieces.len() {
            cols.insert(Col::Piece(pi), FxHashSet::default());
        }
        for (ri, row) in rows.iter().enumerate() {
            for col in row {
                if let Some(set) = cols.get_mut(col) {
                    set.insert(ri);
                }
            }
        }

        exact_cover(&mut cols, &rows, &mut self.progress)
    }
}

/// Algorithm X over the dict-of-sets representation, returning the first
/// cover only.
fn exact_cover(
    cols: &mut IndexMap<Col, FxHashSet<usize>>,
    rows: &[Vec<Col>],
    progress: &mut Progress,
) -> bool {
    if cols.is_empty() {
        return true;
    }

    // Minimum-column heuristic: the first column with the fewest candidates.
    let mut target = Col::Piece(0);
    let mut fewest = usize::MAX;
    for (&col, set) in cols.iter() {
        if set.len() < fewest {
            fewest = set.len();
            target = col;
        }
    }

    let mut candidates: Vec<usize> = cols[&target].iter().copied().collect();
    candidates.sort_unstable();

    for row in candidates {
        if !progress.tick() {
            return false;
        }
        let removed = select(cols, rows, row);
        let found = exact_cover(cols, rows, progress);
        deselect(cols, rows, removed);
        if found {
            return true;
        }
    }
    false
}

/// Cover every column of `row`: remove the columns, and strip their
/// candidate rows from all remaining columns.
fn select(
    cols: &mut IndexMap<Col, FxHashSet<usize>>,
    rows: &[Vec<Col>],
    row: usize,
) -> Vec<(Col, FxHashSet<usize>)> {
    let mut removed = Vec::new();
    for j in &rows[row] {
        if let Some(set) = cols.shift_remove(j) {
            for &i in &set {
                for k in &rows[i] {
                    if k != j {
                        if let Some(other) = cols.get_mut(k) {
                            other.remove(&i);
                        }
                    }
                }
            }
            removed.push((*j, set));
        }
    }
    removed
}

/// Undo a [select], restoring columns in reverse order.
fn deselect(
    cols: &mut IndexMap<Col, FxHashSet<usize>>,
    rows: &[Vec<Col>],
    removed: Vec<(Col, FxHashSet<usize>)>,
) {
    for (j, set) in removed.into_iter().rev() {
        for &i in &set {
            for k in &rows[i] {
                if *k != j {
                    if let Some(other) = cols.get_mut(k) {
                        other.insert(i);
                    }
                }
            }
        }
        cols.insert(j, set);
    }
}
