#[cfg(feature = "serialize")]
use serde::{Deserialize, Serialize};

use bevy_math::IVec2;

/// Sort cells into the canonical `(x, y)` order used for shape comparison.
#[inline]
pub(crate) fn canonical_cells(mut cells: Vec<IVec2>) -> Vec<IVec2> {
    cells.sort_unstable_by_key(|c| (c.x, c.y));
    cells
}

/// A polyomino ("tetris") piece.
///
/// The piece is given as an arbitrarily-placed set of cells, e.g.
/// `[(14, 17), (14, 18), (14, 19), (13, 18)]`. On construction every
/// orientation (the original only, or all four quarter-turns when
/// `rotatable`) is translated so that its lexicographically-smallest cell
/// sits at `(0, 0)`, and duplicate orientations are collapsed. Anchoring at
/// the smallest cell means `(0, 0)` is always a member of a stored shape, so
/// translating a shape onto every candidate anchor cell enumerates every
/// placement of the piece.
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TetrisPiece {
    shapes: Vec<Vec<IVec2>>,
    count: usize,
    rotatable: bool,
    negative: bool,
}

impl TetrisPiece {
    /// Create a new piece from its cell set.
    ///
    /// # Parameters
    ///
    /// - `cells`: The occupied cells, anywhere in the plane. Must be non-empty.
    /// - `rotatable`: The piece may be placed in any of the four orientations.
    /// - `negative`: A blue piece, which cancels a positive cell instead of
    ///   occupying one.
    ///
    /// # Panics
    ///
    /// If `cells` is empty.
    #[must_use]
    pub fn new<I, P>(cells: I, rotatable: bool, negative: bool) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<IVec2>,
    {
        let mut cells: Vec<IVec2> = cells.into_iter().map(Into::into).collect();
        cells.sort_unstable_by_key(|c| (c.x, c.y));
        cells.dedup();
        assert!(!cells.is_empty(), "a tetris piece must have at least one cell");

        let count = cells.len();
        let mut rotations = vec![cells.clone()];
        if rotatable {
            rotations.push(cells.iter().map(|c| IVec2::new(-c.y, c.x)).collect());
            rotations.push(cells.iter().map(|c| IVec2::new(-c.x, -c.y)).collect());
            rotations.push(cells.iter().map(|c| IVec2::new(c.y, -c.x)).collect());
        }

        let mut shapes: Vec<Vec<IVec2>> = Vec::with_capacity(rotations.len());
        for rotation in rotations {
            let shape = normalize(rotation);
            if !shapes.contains(&shape) {
                shapes.push(shape);
            }
        }

        Self { shapes, count, rotatable, negative }
    }

    /// The distinct normalized orientations of this piece.
    #[inline]
    #[must_use]
    pub fn shapes(&self) -> &[Vec<IVec2>] {
        &self.shapes
    }

    /// The number of cells in this piece.
    #[inline]
    #[must_use]
    pub fn count(&self) -> usize {
        self.count
    }

    #[inline]
    #[must_use]
    pub fn rotatable(&self) -> bool {
        self.rotatable
    }

    #[inline]
    #[must_use]
    pub fn negative(&self) -> bool {
        self.negative
    }

    /// The key that orders pieces into the canonical multiset used by the
    /// mixed-tetris memo.
    #[inline]
    #[must_use]
    pub(crate) fn sort_key(&self) -> PieceKey {
        PieceKey {
            count: self.count,
            cells: self.shapes[0].iter().map(|c| (c.x, c.y)).collect(),
            negative: self.negative,
            rotatable: self.rotatable,
        }
    }
}

/// Translate so the lexicographically-smallest cell is at the origin, then
/// sort into canonical order.
fn normalize(cells: Vec<IVec2>) -> Vec<IVec2> {
    let min = cells
        .iter()
        .copied()
        .min_by_key(|c| (c.x, c.y))
        .unwrap_or(IVec2::ZERO);
    canonical_cells(cells.into_iter().map(|c| c - min).collect())
}

/// A total order over pieces: `(count, cells, negative, rotatable)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub(crate) struct PieceKey {
    count: usize,
    cells: Vec<(i32, i32)>,
    negative: bool,
    rotatable: bool,
}

#[cfg(test)]
mod test {
    use super::*;
    use bevy_math::ivec2;

    #[test]
    fn test_single_cell() {
        let piece = TetrisPiece::new([(0, 0)], true, false);
        assert_eq!(piece.count(), 1);
        assert_eq!(piece.shapes(), &[vec![ivec2(0, 0)]]);
    }

    #[test]
    fn test_bar_rotations_dedup() {
        // A vertical bar far from the origin: two distinct orientations.
        let piece = TetrisPiece::new([(4, 5), (4, 6)], true, false);
        assert_eq!(piece.count(), 2);
        assert_eq!(piece.shapes().len(), 2);
        assert!(piece.shapes().contains(&vec![ivec2(0, 0), ivec2(0, 1)]));
        assert!(piece.shapes().contains(&vec![ivec2(0, 0), ivec2(1, 0)]));
    }

    #[test]
    fn test_bar_without_rotation() {
        let piece = TetrisPiece::new([(4, 5), (4, 6)], false, false);
        assert_eq!(piece.shapes(), &[vec![ivec2(0, 0), ivec2(0, 1)]]);
    }

    #[test]
    fn test_square_collapses_to_one_shape() {
        let piece = TetrisPiece::new([(0, 0), (0, 1), (1, 0), (1, 1)], true, false);
        assert_eq!(piece.shapes().len(), 1);
    }

    #[test]
    fn test_l_piece_has_four_shapes() {
        let piece = TetrisPiece::new([(0, 0), (0, 1), (0, 2), (1, 2)], true, false);
        assert_eq!(piece.shapes().len(), 4);
    }

    #[test]
    fn test_shape_cardinality_bounds() {
        for cells in [
            vec![(0, 0)],
            vec![(0, 0), (1, 0)],
            vec![(0, 0), (1, 0), (1, 1)],
            vec![(0, 0), (1, 0), (2, 0), (1, 1)],
        ] {
            for rotatable in [false, true] {
                let piece = TetrisPiece::new(cells.clone(), rotatable, false);
                let n = piece.shapes().len();
                assert!(n == 1 || n == 2 || n == 4, "unexpected shape count {n}");
                for shape in piece.shapes() {
                    // Anchored: the lexicographic minimum is the origin.
                    let min = shape.iter().map(|c| (c.x, c.y)).min().unwrap();
                    assert_eq!(min, (0, 0));
                    assert_eq!(shape.len(), piece.count());
                }
            }
        }
    }

    #[test]
    fn test_anchor_keeps_origin_member() {
        // An S-shaped piece has no cell at the bounding-box corner, but the
        // lexicographic anchor is always a member cell.
        let piece = TetrisPiece::new([(1, 0), (2, 0), (0, 1), (1, 1)], true, false);
        for shape in piece.shapes() {
            assert!(shape.contains(&IVec2::ZERO));
        }
    }

    #[test]
    fn test_sort_key_total_order() {
        let mono = TetrisPiece::new([(0, 0)], false, false);
        let bar = TetrisPiece::new([(0, 0), (1, 0)], false, false);
        let blue_bar = TetrisPiece::new([(0, 0), (1, 0)], false, true);
        assert!(mono.sort_key() < bar.sort_key());
        assert!(bar.sort_key() < blue_bar.sort_key());
        assert_eq!(bar.sort_key(), TetrisPiece::new([(5, 3), (6, 3)], false, false).sort_key());
    }
}
