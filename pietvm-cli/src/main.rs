use std::io::{self, IsTerminal, Write};
use std::time::Duration;

use clap::Parser;
use crossterm::event::{read, Event, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::terminal;
use pietvm::color::Color;
use pietvm::grid::Grid;
use pietvm::io::{Io, StreamIo};
use pietvm::vm::{Interpreter, VmOptions};

/// Run a Piet program.
#[derive(Parser, Debug)]
#[command()]
struct Args {
    /// Image file containing a Piet program.
    #[arg()]
    file: String,
    /// Edge length of one codel in image pixels.
    #[arg(long, short = 'c', default_value_t = 1)]
    codel_size: u32,
    /// A limit for the number of executed steps.
    /// If the limit is reached, the program will be stopped with an error.
    #[arg(long, short = 'l')]
    step_limit: Option<u64>,
    /// Print statistics after running the program.
    #[arg(long, short = 's')]
    stats: bool,
}

fn read_grid_from_image(file: &str, codel_size: u32) -> Result<Grid, anyhow::Error> {
    anyhow::ensure!(codel_size > 0, "codel size must be at least 1");
    let image = image::open(file)?.to_rgb8();
    let width = image.width() / codel_size;
    let height = image.height() / codel_size;
    anyhow::ensure!(
        width > 0 && height > 0,
        "image is smaller than a single {codel_size}x{codel_size} codel"
    );
    let mut cells = Vec::with_capacity(width as usize * height as usize);
    for y in 0..height {
        for x in 0..width {
            // One sample per codel; the top-left pixel represents it.
            let pixel = image.get_pixel(x * codel_size, y * codel_size);
            cells.push(Color::from_rgb(pixel.0));
        }
    }
    Ok(Grid::new(width, height, cells)?)
}

/// Console I/O for the `in`/`out` instructions: raw single-key reads when
/// stdin is a terminal, plain buffered reads when input is piped in.
enum ConsoleIo {
    Interactive(TerminalIo),
    Piped(StreamIo<io::Stdin, io::Stdout>),
}

impl ConsoleIo {
    fn from_env() -> ConsoleIo {
        if io::stdin().is_terminal() {
            ConsoleIo::Interactive(TerminalIo { output: io::stdout() })
        } else {
            ConsoleIo::Piped(StreamIo::new(io::stdin(), io::stdout()))
        }
    }
}

impl Io for ConsoleIo {
    fn read_char(&mut self) -> io::Result<Option<char>> {
        match self {
            ConsoleIo::Interactive(terminal) => terminal.read_char(),
            ConsoleIo::Piped(stream) => stream.read_char(),
        }
    }

    fn write_char(&mut self, c: char) -> io::Result<()> {
        match self {
            ConsoleIo::Interactive(terminal) => terminal.write_char(c),
            ConsoleIo::Piped(stream) => stream.write_char(c),
        }
    }

    fn write_number(&mut self, value: i64) -> io::Result<()> {
        match self {
            ConsoleIo::Interactive(terminal) => terminal.write_number(value),
            ConsoleIo::Piped(stream) => stream.write_number(value),
        }
    }
}

struct TerminalIo {
    output: io::Stdout,
}

impl TerminalIo {
    fn read_key() -> io::Result<Option<char>> {
        loop {
            match read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => match key.code {
                    KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                        return Err(io::Error::new(io::ErrorKind::Interrupted, "interrupted"));
                    }
                    KeyCode::Char(c) => return Ok(Some(c)),
                    KeyCode::Enter => return Ok(Some('\n')),
                    _ => {}
                },
                _ => {}
            }
        }
    }
}

impl Io for TerminalIo {
    fn read_char(&mut self) -> io::Result<Option<char>> {
        // Raw mode only for the duration of the read, so program output
        // keeps normal line handling. Read errors are captured, not
        // propagated, so the terminal is restored on every path.
        terminal::enable_raw_mode()?;
        let result = Self::read_key();
        terminal::disable_raw_mode()?;
        result
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

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let grid = read_grid_from_image(&args.file, args.codel_size)?;
    let options = VmOptions::new(args.step_limit.unwrap_or(u64::MAX));
    let mut interpreter = Interpreter::new(grid, ConsoleIo::from_env(), options);

    let start_time = std::time::Instant::now();
    interpreter.run_to_completion()?;
    let elapsed = start_time.elapsed();

    if args.stats {
        print_stats(interpreter.steps(), elapsed);
    }

    Ok(())
}

fn print_stats(steps: u64, elapsed: Duration) {
    let steps_per_second = steps as f64 / elapsed.as_secs_f64();
    eprintln!("Execution time: {:?}", elapsed);
    eprintln!(
        "Steps executed: {} ({}/s)",
        steps,
        match steps_per_second {
            n if n >= 1_000_000.0 => format!("{:.1}M", n / 1_000_000.0),
            n if n >= 1_000.0 => format!("{:.1}k", n / 1_000.0),
            n => format!("{:.1}", n),
        }
    );
}
