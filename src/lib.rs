//! PanelSolver
//! ===========
//!
//! A solver for grid panel puzzles in the style of *The Witness*: a single
//! continuous line is traced from a start node to an end node, cutting the
//! board into regions that must each satisfy the symbols they contain
//! (colored squares, stars, triangles, hexagons, polyomino pieces and
//! elimination marks).
//!
//! The solver is a depth-first path search with early pruning driven by
//! invalid-region feedback. Region satisfaction is decided per region:
//! polyomino packing by exact cover (Algorithm X), mixed positive/negative
//! polyomino multisets by a memoized whole-board enumeration, and
//! stars/squares by colour-class combinatorics against the elimination-mark
//! budget.

mod cell;
mod color;
mod direction;
mod error;
mod exact_cover;
mod index;
mod mixed_tetris;
mod piece;
mod progress;
mod puzzle;
mod region;
mod search;
mod stars;
mod validate;

pub use self::{
    cell::*,
    color::*,
    direction::*,
    error::*,
    piece::*,
    progress::{CancelToken, Snapshot},
    puzzle::*,
    region::*,
    search::*,
};
