//! Input and output collaborators for the `in` and `out` instructions.
//!
//! The interpreter only needs a blocking read of one character and an
//! ordered sink for characters and decimal numbers. [`StreamIo`] adapts any
//! reader/writer pair; [`VecIo`] is the in-memory implementation used by
//! tests and embedders that capture output.

use std::collections::VecDeque;
use std::io::{self, Read, Write};

/// The environment the `in`/`out` instructions talk to.
pub trait Io {
    /// Blocking read of a single character. Returns `None` once the input
    /// source is exhausted.
    fn read_char(&mut self) -> io::Result<Option<char>>;

    fn write_char(&mut self, c: char) -> io::Result<()>;

    fn write_number(&mut self, value: i64) -> io::Result<()>;
}

/// An [`Io`] over any reader/writer pair. Characters are decoded from the
/// reader as UTF-8, one scalar value per call; writes are flushed
/// immediately so output stays ordered with interactive input.
#[derive(Debug)]
pub struct StreamIo<R, W> {
    input: R,
    output: W,
}

impl<R: Read, W: Write> StreamIo<R, W> {
    pub fn new(input: R, output: W) -> StreamIo<R, W> {
        StreamIo { input, output }
    }
}

impl<R: Read, W: Write> Io for StreamIo<R, W> {
    fn read_char(&mut self) -> io::Result<Option<char>> {
        let mut buf = [0u8; 4];
        if self.input.read(&mut buf[..1])? == 0 {
            return Ok(None);
        }
        let len = match buf[0] {
            0x00..=0x7F => 1,
            0xC0..=0xDF => 2,
            0xE0..=0xEF => 3,
            0xF0..=0xF7 => 4,
            _ => {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidData,
                    "input is not valid UTF-8",
                ))
            }
        };
        if len > 1 {
            self.input.read_exact(&mut buf[1..len])?;
        }
        let c = std::str::from_utf8(&buf[..len])
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?
            .chars()
            .next();
        Ok(c)
    }

    fn write_char(&mut self, c: char) -> io::Result<()> {
        write!(self.output, "{}", c)?;
        self.output.flush()
    }

    fn write_number(&mut self, value: i64) -> io::Result<()> {
        write!(self.output, "{}", value)?;
        self.output.flush()
    }
}

/// In-memory [`Io`]: input is a queue of characters, output accumulates
/// into a string.
#[derive(Debug, Default)]
pub struct VecIo {
    input: VecDeque<char>,
    output: String,
}

impl VecIo {
    pub fn with_input(input: &str) -> VecIo {
        VecIo { input: input.chars().collect(), output: String::new() }
    }

    /// Everything the program has written so far.
    pub fn output(&self) -> &str {
        &self.output
    }
}

impl Io for VecIo {
    fn read_char(&mut self) -> io::Result<Option<char>> {
        Ok(self.input.pop_front())
    }

    fn write_char(&mut self, c: char) -> io::Result<()> {
        self.output.push(c);
        Ok(())
    }

    fn write_number(&mut self, value: i64) -> io::Result<()> {
        self.output.push_str(&value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stream_io_decodes_utf8() {
        let input: &[u8] = "aé✓\n".as_bytes();
        let mut io = StreamIo::new(input, Vec::new());
        assert_eq!(io.read_char().unwrap(), Some('a'));
        assert_eq!(io.read_char().unwrap(), Some('é'));
        assert_eq!(io.read_char().unwrap(), Some('✓'));
        assert_eq!(io.read_char().unwrap(), Some('\n'));
        assert_eq!(io.read_char().unwrap(), None);
    }

    #[test]
    fn test_stream_io_writes() {
        let mut out = Vec::new();
        {
            let mut io = StreamIo::new(&b""[..], &mut out);
            io.write_number(-42).unwrap();
            io.write_char('!').unwrap();
        }
        assert_eq!(out, b"-42!");
    }

    #[test]
    fn test_vec_io_round_trip() {
        let mut io = VecIo::with_input("hi");
        assert_eq!(io.read_char().unwrap(), Some('h'));
        assert_eq!(io.read_char().unwrap(), Some('i'));
        assert_eq!(io.read_char().unwrap(), None);
        io.write_number(7).unwrap();
        io.write_char('x').unwrap();
        assert_eq!(io.output(), "7x");
    }
}
