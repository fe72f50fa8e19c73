//! The Piet color palette and hue/lightness arithmetic.
//!
//! Piet programs use a fixed palette of 18 chromatic colors (6 hues × 3
//! lightness levels) plus white and black. Instructions are not attached to
//! colors directly; they are derived from the hue and lightness *change*
//! between two blocks, so the only arithmetic this module needs is a
//! wrapping delta along each axis.

/// Number of hues in the palette.
pub const HUES: u8 = 6;
/// Number of lightness levels per hue.
pub const LIGHTNESS_LEVELS: u8 = 3;

/// The 18 chromatic palette colors as RGB, hue-major, light to dark within
/// each hue.
pub const PALETTE: [[u8; 3]; 18] = [
    [0xFF, 0xC0, 0xC0],
    [0xFF, 0x00, 0x00],
    [0xC0, 0x00, 0x00],
    [0xFF, 0xFF, 0xC0],
    [0xFF, 0xFF, 0x00],
    [0xC0, 0xC0, 0x00],
    [0xC0, 0xFF, 0xC0],
    [0x00, 0xFF, 0x00],
    [0x00, 0xC0, 0x00],
    [0xC0, 0xFF, 0xFF],
    [0x00, 0xFF, 0xFF],
    [0x00, 0xC0, 0xC0],
    [0xC0, 0xC0, 0xFF],
    [0x00, 0x00, 0xFF],
    [0x00, 0x00, 0xC0],
    [0xFF, 0xC0, 0xFF],
    [0xFF, 0x00, 0xFF],
    [0xC0, 0x00, 0xC0],
];

/// One of the six hues, ordered around the color wheel. Hue steps between
/// instructions wrap at [`HUES`].
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Hue {
    Red,
    Yellow,
    Green,
    Cyan,
    Blue,
    Magenta,
}

impl Hue {
    pub fn index(self) -> u8 {
        match self {
            Hue::Red => 0,
            Hue::Yellow => 1,
            Hue::Green => 2,
            Hue::Cyan => 3,
            Hue::Blue => 4,
            Hue::Magenta => 5,
        }
    }

    pub fn from_index(index: u8) -> Hue {
        match index % HUES {
            0 => Hue::Red,
            1 => Hue::Yellow,
            2 => Hue::Green,
            3 => Hue::Cyan,
            4 => Hue::Blue,
            _ => Hue::Magenta,
        }
    }
}

/// One of the three lightness levels. Lightness steps wrap at
/// [`LIGHTNESS_LEVELS`].
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Lightness {
    Light,
    Normal,
    Dark,
}

impl Lightness {
    pub fn index(self) -> u8 {
        match self {
            Lightness::Light => 0,
            Lightness::Normal => 1,
            Lightness::Dark => 2,
        }
    }

    pub fn from_index(index: u8) -> Lightness {
        match index % LIGHTNESS_LEVELS {
            0 => Lightness::Light,
            1 => Lightness::Normal,
            _ => Lightness::Dark,
        }
    }
}

/// A chromatic palette color, the only kind of color an instruction can be
/// derived from.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct Chroma {
    pub hue: Hue,
    pub lightness: Lightness,
}

impl Chroma {
    pub fn new(hue: Hue, lightness: Lightness) -> Chroma {
        Chroma { hue, lightness }
    }

    /// The hue/lightness change from `self` to `to`, reduced into
    /// `0..HUES` and `0..LIGHTNESS_LEVELS`.
    pub fn delta(self, to: Chroma) -> ColorDelta {
        ColorDelta {
            hue_steps: (to.hue.index() + HUES - self.hue.index()) % HUES,
            lightness_steps: (to.lightness.index() + LIGHTNESS_LEVELS
                - self.lightness.index())
                % LIGHTNESS_LEVELS,
        }
    }
}

/// The non-negative hue/lightness change between two chromatic colors,
/// the index into the instruction table ([`crate::ops::Op::from_delta`]).
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct ColorDelta {
    /// Hue steps, `0..6`.
    pub hue_steps: u8,
    /// Lightness steps, `0..3`.
    pub lightness_steps: u8,
}

/// Classification of a single codel.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Color {
    Chromatic(Chroma),
    White,
    Black,
}

impl Color {
    /// Classify a raw RGB value. Any value outside the 20-color palette
    /// counts as white.
    pub fn from_rgb(rgb: [u8; 3]) -> Color {
        if rgb == [0x00, 0x00, 0x00] {
            return Color::Black;
        }
        match PALETTE.iter().position(|&c| c == rgb) {
            Some(index) => Color::Chromatic(Chroma {
                hue: Hue::from_index((index / LIGHTNESS_LEVELS as usize) as u8),
                lightness: Lightness::from_index((index % LIGHTNESS_LEVELS as usize) as u8),
            }),
            None => Color::White,
        }
    }

    pub fn as_chroma(self) -> Option<Chroma> {
        match self {
            Color::Chromatic(chroma) => Some(chroma),
            Color::White | Color::Black => None,
        }
    }
}
