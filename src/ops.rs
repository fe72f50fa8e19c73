//! The Piet instruction set and the hue/lightness dispatch table.

use crate::color::ColorDelta;

/// The 18 Piet instructions plus the no-op at delta (0, 0).
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Op {
    Nop,
    Push,
    Pop,
    Add,
    Subtract,
    Multiply,
    Divide,
    Mod,
    Not,
    Greater,
    Pointer,
    Switch,
    Duplicate,
    Roll,
    InNumber,
    InChar,
    OutNumber,
    OutChar,
}

impl Op {
    /// The instruction for a colored-to-colored block transition, indexed
    /// by hue steps (rows) and lightness steps (columns). Total over the
    /// whole 6x3 delta space.
    pub fn from_delta(delta: ColorDelta) -> Op {
        const TABLE: [[Op; 3]; 6] = [
            [Op::Nop, Op::Push, Op::Pop],
            [Op::Add, Op::Subtract, Op::Multiply],
            [Op::Divide, Op::Mod, Op::Not],
            [Op::Greater, Op::Pointer, Op::Switch],
            [Op::Duplicate, Op::Roll, Op::InNumber],
            [Op::InChar, Op::OutNumber, Op::OutChar],
        ];
        TABLE[delta.hue_steps as usize][delta.lightness_steps as usize]
    }
}
