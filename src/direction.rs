#[cfg(feature = "serialize")]
use serde::{Deserialize, Serialize};

use bevy_math::IVec2;

pub const LEFT: IVec2 = IVec2 { x: -1, y: 0 };
pub const UP: IVec2 = IVec2 { x: 0, y: -1 };
pub const RIGHT: IVec2 = IVec2 { x: 1, y: 0 };
pub const DOWN: IVec2 = IVec2 { x: 0, y: 1 };

/// A cardinal direction on the node grid. The origin is the top-left node,
/// so `Up` decreases `y`.
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Left,
    Up,
    Right,
    Down,
}

impl Direction {
    /// The order in which the path searcher tries to extend a path.
    pub const SEARCH_ORDER: [Direction; 4] =
        [Direction::Left, Direction::Up, Direction::Right, Direction::Down];

    /// Returns the unit vector for this direction.
    #[inline]
    #[must_use]
    pub fn unit(&self) -> IVec2 {
        match self {
            Direction::Left => LEFT,
            Direction::Up => UP,
            Direction::Right => RIGHT,
            Direction::Down => DOWN,
        }
    }

    /// Move a point one step in this direction.
    #[inline]
    #[must_use]
    pub fn step(&self, point: IVec2) -> IVec2 {
        point + self.unit()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use bevy_math::ivec2;

    #[test]
    fn test_step() {
        let p = ivec2(2, 2);
        assert_eq!(Direction::Left.step(p), ivec2(1, 2));
        assert_eq!(Direction::Up.step(p), ivec2(2, 1));
        assert_eq!(Direction::Right.step(p), ivec2(3, 2));
        assert_eq!(Direction::Down.step(p), ivec2(2, 3));
    }
}
