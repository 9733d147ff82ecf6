#[cfg(feature = "serialize")]
use serde::{Deserialize, Serialize};

/// A symbol colour.
///
/// The set is closed: these are the colours the puzzle wire format can carry.
/// The derived ordering follows declaration order and gives the solver a
/// stable iteration order over colour classes.
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Color {
    Black,
    White,
    Cyan,
    Magenta,
    Yellow,
    Red,
    Green,
    Blue,
    Orange,
}
