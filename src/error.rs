use thiserror::Error;

/// A structurally invalid puzzle, detected while indexing before any search
/// is attempted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PuzzleError {
    #[error("triangle at ({x}, {y}) must have a count of 1 to 3, got {count}")]
    BadTriangleCount { x: i32, y: i32, count: u8 },

    #[error(
        "tetris piece at ({x}, {y}) has {cells} cells but the board only has {board}"
    )]
    PieceTooLarge { x: i32, y: i32, cells: usize, board: usize },
}
