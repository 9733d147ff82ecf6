#[cfg(feature = "serialize")]
use serde::{Deserialize, Serialize};

use crate::{Cell, Edge, Node};
use bevy_math::IVec2;
use fxhash::FxHashSet;

/// A set of cell (or node, or edge) coordinates.
pub type CellSet = FxHashSet<IVec2>;

/// The symmetry of a puzzle. When not [Symmetry::None], every traced path is
/// accompanied by its mirrored twin, and both paths cut the board jointly.
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Symmetry {
    #[default]
    None,
    Horizontal,
    Vertical,
    Rotational,
}

/// A puzzle board of `width x height` cells.
///
/// For `width = 3, height = 2`:
///
/// ```text
/// Cells            Nodes              V Edges          H Edges
/// +---+---+---+    N---N---N---N      +-V-+-V-+-V-+    +---+---+---+
/// | C | C | C |    |   |   |   |      |   |   |   |    H   H   H   H
/// +---+---+---+    N---N---N---N      +-V-+-V-+-V-+    +---+---+---+
/// | C | C | C |    |   |   |   |      |   |   |   |    H   H   H   H
/// +---+---+---+    N---N---N---N      +-V-+-V-+-V-+    +---+---+---+
/// 3 x 2 - w x h    4 x 3 - w+1 x h+1  3 x 3 - w x h+1  4 x 2 - w+1 x h
/// ```
///
/// V edges run along a row of nodes; h edges run between stacked nodes.
/// The coordinate origin is the top-left, `y` growing downward.
///
/// The board is populated once through the setters and is read-only while a
/// [crate::Solver] runs against it.
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Puzzle {
    width: u32,
    height: u32,
    symmetry: Symmetry,
    cells: Vec<Cell>,
    nodes: Vec<Node>,
    v_edges: Vec<Edge>,
    h_edges: Vec<Edge>,
}

impl Puzzle {
    /// Create an empty puzzle of the given dimensions.
    ///
    /// # Panics
    ///
    /// If either dimension is zero.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        assert!(width > 0 && height > 0, "puzzle dimensions must be non-zero");
        let (w, h) = (width as usize, height as usize);
        Self {
            width,
            height,
            symmetry: Symmetry::None,
            cells: vec![Cell::default(); w * h],
            nodes: vec![Node::default(); (w + 1) * (h + 1)],
            v_edges: vec![Edge::default(); w * (h + 1)],
            h_edges: vec![Edge::default(); (w + 1) * h],
        }
    }

    #[inline]
    #[must_use]
    pub fn width(&self) -> i32 {
        self.width as i32
    }

    #[inline]
    #[must_use]
    pub fn height(&self) -> i32 {
        self.height as i32
    }

    #[inline]
    #[must_use]
    pub fn symmetry(&self) -> Symmetry {
        self.symmetry
    }

    #[inline]
    pub fn set_symmetry(&mut self, symmetry: Symmetry) {
        self.symmetry = symmetry;
    }

    /// Determine if the given cell coordinates are on the board.
    #[inline]
    #[must_use]
    pub fn contains_cell<P>(&self, point: P) -> bool
    where
        P: Into<IVec2>,
    {
        let p = point.into();
        p.x >= 0 && p.x < self.width() && p.y >= 0 && p.y < self.height()
    }

    /// Determine if the given node coordinates are on the board.
    #[inline]
    #[must_use]
    pub fn contains_node<P>(&self, point: P) -> bool
    where
        P: Into<IVec2>,
    {
        let p = point.into();
        p.x >= 0 && p.x <= self.width() && p.y >= 0 && p.y <= self.height()
    }

    /// Get the cell at the given coordinates.
    ///
    /// # Panics
    ///
    /// If the coordinates are off the board.
    #[inline]
    #[must_use]
    pub fn cell<P>(&self, point: P) -> &Cell
    where
        P: Into<IVec2>,
    {
        let p = point.into();
        assert!(self.contains_cell(p), "cell {p} out of bounds");
        &self.cells[(p.y * self.width() + p.x) as usize]
    }

    /// Set the cell at the given coordinates. Returns `false` if the
    /// coordinates are off the board.
    #[inline]
    pub fn set_cell<P>(&mut self, point: P, cell: Cell) -> bool
    where
        P: Into<IVec2>,
    {
        let p = point.into();
        if !self.contains_cell(p) {
            return false;
        }
        let i = (p.y * self.width() + p.x) as usize;
        self.cells[i] = cell;
        true
    }

    /// Get the node at the given coordinates.
    ///
    /// # Panics
    ///
    /// If the coordinates are off the board.
    #[inline]
    #[must_use]
    pub fn node<P>(&self, point: P) -> &Node
    where
        P: Into<IVec2>,
    {
        let p = point.into();
        assert!(self.contains_node(p), "node {p} out of bounds");
        &self.nodes[(p.y * (self.width() + 1) + p.x) as usize]
    }

    /// Set the node at the given coordinates. Returns `false` if the
    /// coordinates are off the board.
    #[inline]
    pub fn set_node<P>(&mut self, point: P, node: Node) -> bool
    where
        P: Into<IVec2>,
    {
        let p = point.into();
        if !self.contains_node(p) {
            return false;
        }
        let i = (p.y * (self.width() + 1) + p.x) as usize;
        self.nodes[i] = node;
        true
    }

    /// Get the v edge at the given coordinates: the segment between nodes
    /// `(x, y)` and `(x + 1, y)`.
    ///
    /// # Panics
    ///
    /// If the coordinates are off the board.
    #[inline]
    #[must_use]
    pub fn v_edge<P>(&self, point: P) -> &Edge
    where
        P: Into<IVec2>,
    {
        let p = point.into();
        assert!(
            p.x >= 0 && p.x < self.width() && p.y >= 0 && p.y <= self.height(),
            "v edge {p} out of bounds"
        );
        &self.v_edges[(p.y * self.width() + p.x) as usize]
    }

    /// Set the v edge at the given coordinates. Returns `false` if the
    /// coordinates are off the board.
    #[inline]
    pub fn set_v_edge<P>(&mut self, point: P, edge: Edge) -> bool
    where
        P: Into<IVec2>,
    {
        let p = point.into();
        if !(p.x >= 0 && p.x < self.width() && p.y >= 0 && p.y <= self.height()) {
            return false;
        }
        let i = (p.y * self.width() + p.x) as usize;
        self.v_edges[i] = edge;
        true
    }

    /// Get the h edge at the given coordinates: the segment between nodes
    /// `(x, y)` and `(x, y + 1)`.
    ///
    /// # Panics
    ///
    /// If the coordinates are off the board.
    #[inline]
    #[must_use]
    pub fn h_edge<P>(&self, point: P) -> &Edge
    where
        P: Into<IVec2>,
    {
        let p = point.into();
        assert!(
            p.x >= 0 && p.x <= self.width() && p.y >= 0 && p.y < self.height(),
            "h edge {p} out of bounds"
        );
        &self.h_edges[(p.y * (self.width() + 1) + p.x) as usize]
    }

    /// Set the h edge at the given coordinates. Returns `false` if the
    /// coordinates are off the board.
    #[inline]
    pub fn set_h_edge<P>(&mut self, point: P, edge: Edge) -> bool
    where
        P: Into<IVec2>,
    {
        let p = point.into();
        if !(p.x >= 0 && p.x <= self.width() && p.y >= 0 && p.y < self.height()) {
            return false;
        }
        let i = (p.y * (self.width() + 1) + p.x) as usize;
        self.h_edges[i] = edge;
        true
    }

    /// The mirror image of a node under this puzzle's symmetry, or `None`
    /// when the puzzle is not symmetric.
    #[inline]
    #[must_use]
    pub fn mirror_node(&self, node: IVec2) -> Option<IVec2> {
        match self.symmetry {
            Symmetry::None => None,
            Symmetry::Horizontal => Some(IVec2::new(self.width() - node.x, node.y)),
            Symmetry::Vertical => Some(IVec2::new(node.x, self.height() - node.y)),
            Symmetry::Rotational => {
                Some(IVec2::new(self.width() - node.x, self.height() - node.y))
            }
        }
    }

    /// The mirrored twin of a path, empty when the puzzle is not symmetric.
    #[must_use]
    pub fn mirror_path(&self, path: &[IVec2]) -> Vec<IVec2> {
        match self.symmetry {
            Symmetry::None => Vec::new(),
            _ => path
                .iter()
                .filter_map(|&node| self.mirror_node(node))
                .collect(),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use bevy_math::ivec2;

    #[test]
    fn test_grid_dimensions() {
        let puzzle = Puzzle::new(3, 2);
        assert_eq!(puzzle.width(), 3);
        assert_eq!(puzzle.height(), 2);
        assert!(puzzle.contains_cell((2, 1)));
        assert!(!puzzle.contains_cell((3, 1)));
        assert!(puzzle.contains_node((3, 2)));
        assert!(!puzzle.contains_node((4, 2)));
    }

    #[test]
    fn test_edge_ranges() {
        let mut puzzle = Puzzle::new(3, 2);
        // V edges span w x (h + 1).
        assert!(puzzle.set_v_edge((2, 2), Edge::Missing));
        assert!(!puzzle.set_v_edge((3, 2), Edge::Missing));
        assert!(puzzle.v_edge((2, 2)).is_missing());
        // H edges span (w + 1) x h.
        assert!(puzzle.set_h_edge((3, 1), Edge::Missing));
        assert!(!puzzle.set_h_edge((3, 2), Edge::Missing));
        assert!(puzzle.h_edge((3, 1)).is_missing());
    }

    #[test]
    fn test_set_cell_out_of_bounds() {
        let mut puzzle = Puzzle::new(2, 2);
        assert!(!puzzle.set_cell((2, 0), Cell::Elimination));
        assert!(puzzle.set_cell((1, 1), Cell::Elimination));
        assert_eq!(puzzle.cell((1, 1)), &Cell::Elimination);
    }

    #[test]
    fn test_mirror_node() {
        let mut puzzle = Puzzle::new(4, 3);
        assert_eq!(puzzle.mirror_node(ivec2(1, 1)), None);

        puzzle.set_symmetry(Symmetry::Horizontal);
        assert_eq!(puzzle.mirror_node(ivec2(1, 1)), Some(ivec2(3, 1)));

        puzzle.set_symmetry(Symmetry::Vertical);
        assert_eq!(puzzle.mirror_node(ivec2(1, 1)), Some(ivec2(1, 2)));

        puzzle.set_symmetry(Symmetry::Rotational);
        assert_eq!(puzzle.mirror_node(ivec2(1, 1)), Some(ivec2(3, 2)));
    }

    #[test]
    fn test_mirror_path() {
        let mut puzzle = Puzzle::new(2, 2);
        puzzle.set_symmetry(Symmetry::Rotational);
        let path = vec![ivec2(0, 0), ivec2(1, 0)];
        assert_eq!(puzzle.mirror_path(&path), vec![ivec2(2, 2), ivec2(1, 2)]);

        puzzle.set_symmetry(Symmetry::None);
        assert!(puzzle.mirror_path(&path).is_empty());
    }
}
