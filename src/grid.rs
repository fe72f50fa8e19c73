//! The immutable codel grid a program executes on.
//!
//! The grid is built once from externally decoded pixel data and never
//! changes afterwards; the interpreter only moves a pointer across it.

use thiserror::Error;

use crate::color::Color;

/// An error raised while constructing a [`Grid`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GridError {
    #[error("A program grid must contain at least one codel.")]
    Empty,
    #[error("Grid data has {len} codels, expected {width}x{height}.")]
    SizeMismatch { len: usize, width: u32, height: u32 },
}

/// A codel coordinate. Navigation probes may step outside the grid; bounds
/// are checked by [`Grid::get`].
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub fn new(x: i32, y: i32) -> Position {
        Position { x, y }
    }
}

/// A rectangular grid of classified codels, row-major from the top-left.
#[derive(Debug, Clone)]
pub struct Grid {
    width: u32,
    height: u32,
    cells: Vec<Color>,
}

impl Grid {
    /// Build a grid from already classified colors. Fails loudly on an
    /// empty grid or a size mismatch; those are caller bugs, not program
    /// conditions.
    pub fn new(width: u32, height: u32, cells: Vec<Color>) -> Result<Grid, GridError> {
        if width == 0 || height == 0 {
            return Err(GridError::Empty);
        }
        let expected = width as usize * height as usize;
        if cells.len() != expected {
            return Err(GridError::SizeMismatch { len: cells.len(), width, height });
        }
        Ok(Grid { width, height, cells })
    }

    /// Build a grid from raw RGB pixels, classifying each through
    /// [`Color::from_rgb`].
    pub fn from_rgb(width: u32, height: u32, pixels: &[[u8; 3]]) -> Result<Grid, GridError> {
        Grid::new(width, height, pixels.iter().map(|&rgb| Color::from_rgb(rgb)).collect())
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Total number of codels.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Always false; an empty grid cannot be constructed.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// The color at `pos`, or `None` outside the grid bounds.
    pub fn get(&self, pos: Position) -> Option<Color> {
        if pos.x < 0 || pos.y < 0 || pos.x >= self.width as i32 || pos.y >= self.height as i32 {
            return None;
        }
        Some(self.cells[pos.y as usize * self.width as usize + pos.x as usize])
    }

    pub(crate) fn cells(&self) -> &[Color] {
        &self.cells
    }
}
