//! Executing Piet programs: the stack machine and the step/run drivers.
//!
//! One step navigates from the current block to the next one, derives an
//! instruction from the color delta of the transition, and mutates the
//! stack, the I/O port, or the pointer state accordingly. Malformed
//! operations (empty-stack arithmetic, division by zero, invalid roll
//! parameters, overflow) are defined no-ops that leave the stack exactly
//! as it was; the only way a program ends is navigation exhaustion, eight
//! consecutive failed moves.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use num_integer::Integer;
use thiserror::Error;

use crate::blocks::{BlockId, BlockMap};
use crate::flow::{probe, Cc, Dp, Probe, Retry, RETRY_CYCLE};
use crate::grid::{Grid, Position};
use crate::io::Io;
use crate::ops::Op;


/// Options for the Piet virtual machine.
#[derive(Debug, Clone)]
pub struct VmOptions {
    /// The maximum number of steps to run; if this is reached, the program
    /// stops with an error.
    ///
    /// Set to [`u64::MAX`] to disable this limit.
    max_steps: u64,
}

impl VmOptions {
    pub fn new(max_steps: u64) -> Self {
        Self { max_steps }
    }
}

impl Default for VmOptions {
    fn default() -> Self {
        Self { max_steps: u64::MAX }
    }
}

/// A cooperative stop signal shared between a running interpreter and
/// whoever owns the run (a worker thread's controller, a signal handler).
///
/// The interpreter samples the token once per completed step and stops
/// cleanly between instructions, never mid-instruction.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> CancelToken {
        CancelToken::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// The interpreter life cycle.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Status {
    /// Initialized, no step taken yet.
    Ready,
    Running,
    /// Terminal; further `step_once` calls are an error.
    Halted,
}

/// What a single step left behind.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum StepResult {
    /// The program can take another step.
    Running,
    /// The program exhausted its navigation attempts and halted.
    Halted,
}

/// How a run ended.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum RunOutcome {
    /// The program halted on its own.
    Completed,
    /// The cancellation token was observed between two steps.
    Cancelled,
}

/// An error that happened while driving a Piet program.
#[derive(Debug, Error)]
pub enum RunError {
    /// `step_once` was called on a halted interpreter. Halting is the
    /// normal end of a program; stepping past it is a caller bug.
    #[error("The program has already halted.")]
    AlreadyHalted,
    /// The program executed more steps than the limit in [`VmOptions`].
    #[error("The program ran for too long ({steps} steps had been run).")]
    RanTooLong { steps: u64 },
    /// An input or output instruction failed at the I/O port.
    #[error("I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

/// A Piet interpreter over a fixed grid and an I/O port.
///
/// # Example
/// ```
/// use pietvm::color::{Chroma, Color, Hue, Lightness};
/// use pietvm::grid::Grid;
/// use pietvm::io::VecIo;
/// use pietvm::vm::{Interpreter, VmOptions};
///
/// // Two blocks one lightness step apart: the transition pushes the
/// // departed block's size.
/// let light_red = Color::Chromatic(Chroma::new(Hue::Red, Lightness::Light));
/// let red = Color::Chromatic(Chroma::new(Hue::Red, Lightness::Normal));
/// let grid = Grid::new(2, 1, vec![light_red, red]).unwrap();
///
/// let mut vm = Interpreter::new(grid, VecIo::default(), VmOptions::default());
/// vm.step_once().unwrap();
/// assert_eq!(vm.stack(), &[1]);
/// ```
#[derive(Debug)]
pub struct Interpreter<I> {
    grid: Grid,
    blocks: BlockMap,
    pos: Position,
    dp: Dp,
    cc: Cc,
    stack: Vec<i64>,
    attempts: u8,
    steps: u64,
    status: Status,
    options: VmOptions,
    io: I,
}

impl<I: Io> Interpreter<I> {
    /// Initialize an interpreter: partition the grid, point the DP right
    /// and the CC left, and place the pointer on the codel at (0, 0).
    pub fn new(grid: Grid, io: I, options: VmOptions) -> Interpreter<I> {
        let blocks = BlockMap::build(&grid);
        Interpreter {
            grid,
            blocks,
            pos: Position::new(0, 0),
            dp: Dp::Right,
            cc: Cc::Left,
            stack: Vec::new(),
            attempts: 0,
            steps: 0,
            status: Status::Ready,
            options,
            io,
        }
    }

    /// Perform exactly one step: navigate to the next block and execute
    /// the instruction of the transition, if any.
    ///
    /// A blocked probe runs the retry cycle within the same step, toggling
    /// the CC on odd attempts and rotating the DP on even ones; if all
    /// eight pointer states fail, the interpreter halts and the step
    /// returns [`StepResult::Halted`].
    pub fn step_once(&mut self) -> Result<StepResult, RunError> {
        if self.status == Status::Halted {
            return Err(RunError::AlreadyHalted);
        }
        if self.steps >= self.options.max_steps {
            return Err(RunError::RanTooLong { steps: self.steps });
        }
        self.status = Status::Running;
        self.steps += 1;

        let current = self.blocks.block_id_at(self.pos);
        loop {
            match probe(&self.grid, &self.blocks, current, self.pos, self.dp, self.cc) {
                Probe::Enter { block, pos } => {
                    let departed = self.blocks.block(current);
                    let op = match (
                        departed.color().as_chroma(),
                        self.blocks.block(block).color().as_chroma(),
                    ) {
                        (Some(from), Some(to)) => Op::from_delta(from.delta(to)),
                        // The probe never enters white or black codels.
                        _ => Op::Nop,
                    };
                    let departed_size = departed.size();
                    self.attempts = 0;
                    self.pos = pos;
                    self.execute(op, departed_size)?;
                    return Ok(StepResult::Running);
                }
                Probe::Slide { block: _, pos } => {
                    // Crossing white advances the pointer without
                    // dispatching an instruction.
                    self.attempts = 0;
                    self.pos = pos;
                    return Ok(StepResult::Running);
                }
                Probe::Blocked => {
                    match RETRY_CYCLE[self.attempts as usize] {
                        Retry::ToggleChooser => self.cc = self.cc.toggled(),
                        Retry::RotatePointer => self.dp = self.dp.clockwise(),
                    }
                    self.attempts += 1;
                    if self.attempts as usize == RETRY_CYCLE.len() {
                        self.status = Status::Halted;
                        return Ok(StepResult::Halted);
                    }
                }
            }
        }
    }

    /// Step until the program halts.
    pub fn run_to_completion(&mut self) -> Result<RunOutcome, RunError> {
        self.run_with_cancellation(&CancelToken::new())
    }

    /// Step until the program halts or `cancel` is observed. The token is
    /// checked once per step boundary, so cancellation never interrupts an
    /// instruction.
    pub fn run_with_cancellation(&mut self, cancel: &CancelToken) -> Result<RunOutcome, RunError> {
        while self.status != Status::Halted {
            if cancel.is_cancelled() {
                return Ok(RunOutcome::Cancelled);
            }
            if self.step_once()? == StepResult::Halted {
                break;
            }
        }
        Ok(RunOutcome::Completed)
    }

    fn execute(&mut self, op: Op, departed_size: u32) -> Result<(), RunError> {
        match op {
            Op::Nop => {}
            Op::Push => self.stack.push(departed_size as i64),
            Op::Pop => {
                self.stack.pop();
            }
            Op::Add => self.binary(i64::checked_add),
            Op::Subtract => self.binary(i64::checked_sub),
            Op::Multiply => self.binary(i64::checked_mul),
            // Quotients round toward negative infinity; remainders take
            // the sign of the divisor. A zero divisor (and the one
            // overflowing pair, i64::MIN with -1) leaves both operands on
            // the stack.
            Op::Divide => self.binary(|a, b| {
                if b == 0 || (a == i64::MIN && b == -1) {
                    None
                } else {
                    Some(Integer::div_floor(&a, &b))
                }
            }),
            Op::Mod => self.binary(|a, b| {
                if b == 0 || (a == i64::MIN && b == -1) {
                    None
                } else {
                    Some(Integer::mod_floor(&a, &b))
                }
            }),
            Op::Not => {
                if let Some(a) = self.stack.pop() {
                    self.stack.push((a == 0) as i64);
                }
            }
            Op::Greater => self.binary(|a, b| Some((a > b) as i64)),
            Op::Pointer => {
                if let Some(a) = self.stack.pop() {
                    self.dp = self.dp.rotated(a);
                }
            }
            Op::Switch => {
                if let Some(a) = self.stack.pop() {
                    self.cc = self.cc.switched(a);
                }
            }
            Op::Duplicate => {
                if let Some(&top) = self.stack.last() {
                    self.stack.push(top);
                }
            }
            Op::Roll => self.roll(),
            Op::InNumber => self.read_number()?,
            Op::InChar => {
                if let Some(c) = self.io.read_char()? {
                    self.stack.push(c as i64);
                }
            }
            Op::OutNumber => {
                if let Some(a) = self.stack.pop() {
                    self.io.write_number(a)?;
                }
            }
            Op::OutChar => {
                if let Some(a) = self.stack.pop() {
                    // Values outside the Unicode scalar range are consumed
                    // without producing output.
                    if let Some(c) = u32::try_from(a).ok().and_then(char::from_u32) {
                        self.io.write_char(c)?;
                    }
                }
            }
        }
        Ok(())
    }

    /// Apply a two-operand instruction. If fewer than two values are on
    /// the stack, or the operation yields no result (zero divisor,
    /// overflow), the stack is left untouched.
    fn binary(&mut self, f: impl FnOnce(i64, i64) -> Option<i64>) {
        let len = self.stack.len();
        if len < 2 {
            return;
        }
        let b = self.stack[len - 1];
        let a = self.stack[len - 2];
        if let Some(result) = f(a, b) {
            self.stack.truncate(len - 2);
            self.stack.push(result);
        }
    }

    /// Pop a roll count and a depth, then cyclically rotate the top
    /// `depth` values by `rolls` positions, positive counts moving values
    /// toward the top. A negative depth or a depth deeper than the
    /// remaining stack makes the whole instruction a no-op, parameters
    /// included.
    fn roll(&mut self) {
        let len = self.stack.len();
        if len < 2 {
            return;
        }
        let rolls = self.stack[len - 1];
        let depth = self.stack[len - 2];
        let remaining = len - 2;
        if depth < 0 || depth as u64 > remaining as u64 {
            return;
        }
        self.stack.truncate(remaining);
        let depth = depth as usize;
        if depth > 0 {
            let rotate_by = rolls.rem_euclid(depth as i64) as usize;
            self.stack[remaining - depth..].rotate_right(rotate_by);
        }
    }

    /// Read one line of input and parse it as an integer. Non-numeric
    /// lines are discarded and the read retried; once the input source is
    /// exhausted the instruction gives up without pushing anything.
    fn read_number(&mut self) -> Result<(), RunError> {
        loop {
            let mut line = String::new();
            let mut exhausted = false;
            loop {
                match self.io.read_char()? {
                    None => {
                        exhausted = true;
                        break;
                    }
                    Some('\n') => break,
                    Some(c) => line.push(c),
                }
            }
            if let Ok(value) = line.trim().parse::<i64>() {
                self.stack.push(value);
                return Ok(());
            }
            if exhausted {
                return Ok(());
            }
        }
    }

    pub fn status(&self) -> Status {
        self.status
    }

    /// The codel the pointer currently sits on; a debugger can highlight
    /// it between steps.
    pub fn position(&self) -> Position {
        self.pos
    }

    pub fn current_block(&self) -> BlockId {
        self.blocks.block_id_at(self.pos)
    }

    pub fn dp(&self) -> Dp {
        self.dp
    }

    pub fn cc(&self) -> Cc {
        self.cc
    }

    pub fn stack(&self) -> &[i64] {
        &self.stack
    }

    /// Number of steps taken so far.
    pub fn steps(&self) -> u64 {
        self.steps
    }

    /// Consecutive failed move attempts: 8 after a navigation-exhaustion
    /// halt, 0 after any successful step.
    pub fn failed_attempts(&self) -> u8 {
        self.attempts
    }

    pub fn block_map(&self) -> &BlockMap {
        &self.blocks
    }

    pub fn io(&self) -> &I {
        &self.io
    }

    pub fn into_io(self) -> I {
        self.io
    }
}
