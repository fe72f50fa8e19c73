//! Movement between blocks: the direction pointer, the codel chooser, the
//! blocked-move retry cycle, and the navigation probe itself.

use crate::blocks::{BlockId, BlockMap};
use crate::color::Color;
use crate::grid::{Grid, Position};

/// The direction pointer, the direction the program is currently moving in.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Dp {
    Right,
    Down,
    Left,
    Up,
}

impl Dp {
    pub const ALL: [Dp; 4] = [Dp::Right, Dp::Down, Dp::Left, Dp::Up];

    pub fn index(self) -> usize {
        match self {
            Dp::Right => 0,
            Dp::Down => 1,
            Dp::Left => 2,
            Dp::Up => 3,
        }
    }

    pub fn clockwise(self) -> Dp {
        match self {
            Dp::Right => Dp::Down,
            Dp::Down => Dp::Left,
            Dp::Left => Dp::Up,
            Dp::Up => Dp::Right,
        }
    }

    /// Rotate clockwise by `steps` quarter turns; negative values rotate
    /// counter-clockwise. The step count is reduced first, so extreme
    /// values straight off the stack cannot overflow.
    pub fn rotated(self, steps: i64) -> Dp {
        Dp::ALL[(self.index() + steps.rem_euclid(4) as usize) % 4]
    }

    /// The unit offset of one codel step in this direction, in screen
    /// coordinates (y grows downwards).
    pub fn offset(self) -> (i32, i32) {
        match self {
            Dp::Right => (1, 0),
            Dp::Down => (0, 1),
            Dp::Left => (-1, 0),
            Dp::Up => (0, -1),
        }
    }
}

/// The codel chooser, breaking ties between extremal codels to the left or
/// right of the direction of travel.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Cc {
    Left,
    Right,
}

impl Cc {
    pub const ALL: [Cc; 2] = [Cc::Left, Cc::Right];

    pub fn index(self) -> usize {
        match self {
            Cc::Left => 0,
            Cc::Right => 1,
        }
    }

    pub fn toggled(self) -> Cc {
        match self {
            Cc::Left => Cc::Right,
            Cc::Right => Cc::Left,
        }
    }

    /// Toggle `times` times: odd counts flip, even counts do nothing.
    pub fn switched(self, times: i64) -> Cc {
        if times % 2 == 0 {
            self
        } else {
            self.toggled()
        }
    }
}

impl Position {
    /// The neighbouring position one codel along `dp`.
    pub fn step(self, dp: Dp) -> Position {
        let (dx, dy) = dp.offset();
        Position::new(self.x + dx, self.y + dy)
    }
}

/// One entry of the blocked-move cycle.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Retry {
    ToggleChooser,
    RotatePointer,
}

/// The fixed cycle applied after each failed move, indexed by attempt
/// number 1..=8. Odd attempts toggle the codel chooser, even attempts
/// rotate the direction pointer, so all eight (DP, CC) combinations are
/// probed before the program halts. Applying the whole cycle restores the
/// original pointer state.
pub const RETRY_CYCLE: [Retry; 8] = [
    Retry::ToggleChooser,
    Retry::RotatePointer,
    Retry::ToggleChooser,
    Retry::RotatePointer,
    Retry::ToggleChooser,
    Retry::RotatePointer,
    Retry::ToggleChooser,
    Retry::RotatePointer,
];

/// The result of probing for the next block.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Probe {
    /// A colored-to-colored transition; the move dispatches an instruction.
    Enter { block: BlockId, pos: Position },
    /// The move slid across white codels; the pointer advances but no
    /// instruction is dispatched.
    Slide { block: BlockId, pos: Position },
    /// The way is blocked by a black codel or the grid edge.
    Blocked,
}

/// Probe one move from `current` at `pos` along `dp`/`cc`.
///
/// A chromatic block probes from its (DP, CC) exit codel. A white current
/// block (possible only at program start) slides from the pointer position
/// instead, and a black start can never move.
pub fn probe(
    grid: &Grid,
    blocks: &BlockMap,
    current: BlockId,
    pos: Position,
    dp: Dp,
    cc: Cc,
) -> Probe {
    let block = blocks.block(current);
    let exit = match block.color() {
        Color::Chromatic(_) => block.exit(dp, cc),
        Color::White => return slide(grid, blocks, pos, dp),
        Color::Black => return Probe::Blocked,
    };
    let next = exit.step(dp);
    match grid.get(next) {
        None | Some(Color::Black) => Probe::Blocked,
        Some(Color::White) => slide(grid, blocks, next, dp),
        Some(Color::Chromatic(_)) => Probe::Enter { block: blocks.block_id_at(next), pos: next },
    }
}

/// Walk across consecutive white codels starting at `pos` until a colored
/// codel, a black codel, or the grid edge is reached.
fn slide(grid: &Grid, blocks: &BlockMap, mut pos: Position, dp: Dp) -> Probe {
    loop {
        match grid.get(pos) {
            None | Some(Color::Black) => return Probe::Blocked,
            Some(Color::White) => pos = pos.step(dp),
            Some(Color::Chromatic(_)) => {
                return Probe::Slide { block: blocks.block_id_at(pos), pos }
            }
        }
    }
}
