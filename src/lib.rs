//! # pietvm
//! An interpreter for [Piet](https://www.dangermouse.net/esoteric/piet.html),
//! the esoteric language whose programs are abstract paintings.
//!
//! A Piet program is a grid of colored cells ("codels"). Contiguous
//! same-colored regions form blocks, and execution walks from block to
//! block under a direction pointer (DP) and a codel chooser (CC). The
//! instruction executed on each transition is not written anywhere in the
//! program; it is derived from how far the hue and lightness of the paint
//! change across the move. Eighteen hue/lightness deltas map onto a small
//! stack machine with arithmetic, pointer manipulation, and character and
//! number I/O. A program has no explicit halt instruction either: it ends
//! when the pointer gets stuck, after all eight DP/CC combinations fail to
//! find a way out of the current block.
//!
//! This crate is the interpreter core only: it takes an already decoded
//! grid of classified colors, partitions it into blocks with union-find,
//! and executes it one step at a time, either to completion or under
//! single-step control of a debugger. Decoding image files and talking to
//! a terminal live in the `pietvm-cli` companion crate.
pub mod blocks;
pub mod color;
pub mod flow;
pub mod grid;
pub mod io;
pub mod ops;
pub mod vm;
