//! Structural stream items: manipulators and formatting directives.
//!
//! These are the non-content half of the insertion API. They are routed to
//! the same destination as content writes (so they keep the caller's
//! per-thread ordering) but are never colorized.
//!
//! # Categories
//!
//! ## Manipulators
//! - [`Manip::Endl`] - end of line (and sink flush in direct mode)
//! - [`Manip::Flush`] - sink flush in direct mode
//!
//! ## Directives
//! - [`Directive::Width`] - minimum width of the next content write only,
//!   capped at [`MAX_WIDTH`]
//! - [`Directive::Fill`] - padding character
//! - [`Directive::SetFlags`] / [`Directive::UnsetFlags`] - numeric flags
//! - [`Directive::Precision`] - digits after the decimal point for floats

use std::borrow::Cow;
use std::fmt;
use std::ops::{BitOr, BitOrAssign};

// ============================================================================
// Manipulators and directives
// ============================================================================

/// Stream manipulators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Manip {
    /// Append a newline, then flush the sink in direct mode.
    Endl,
    /// Flush the sink in direct mode. Buffered text waits for
    /// [`Channel::flush`](crate::Channel::flush).
    Flush,
}

/// Formatting directives. They change the destination's [`FormatState`]
/// and produce no text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Directive {
    Width(usize),
    Fill(char),
    SetFlags(FormatFlags),
    UnsetFlags(FormatFlags),
    Precision(usize),
}

/// Anything accepted by [`Channel::write_raw`](crate::Channel::write_raw).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Raw {
    Manip(Manip),
    Directive(Directive),
}

impl From<Manip> for Raw {
    fn from(manip: Manip) -> Self {
        Raw::Manip(manip)
    }
}

impl From<Directive> for Raw {
    fn from(directive: Directive) -> Self {
        Raw::Directive(directive)
    }
}

// ============================================================================
// Flags
// ============================================================================

/// Numeric and alignment flags, combined with `|`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct FormatFlags(u16);

impl FormatFlags {
    pub const NONE: Self = Self(0);
    /// Pad on the right instead of the left.
    pub const LEFT: Self = Self(1 << 0);
    /// Prefix non-negative decimal numbers with `+`.
    pub const SHOW_POS: Self = Self(1 << 1);
    pub const HEX: Self = Self(1 << 2);
    pub const OCT: Self = Self(1 << 3);
    /// Prefix hex with `0x` and octal with `0`.
    pub const SHOW_BASE: Self = Self(1 << 4);
    /// Uppercase hex digits, `0X` prefix and exponent `E`.
    pub const UPPERCASE: Self = Self(1 << 5);
    pub const FIXED: Self = Self(1 << 6);
    pub const SCIENTIFIC: Self = Self(1 << 7);

    pub fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn insert(&mut self, other: Self) {
        self.0 |= other.0;
    }

    pub fn remove(&mut self, other: Self) {
        self.0 &= !other.0;
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl BitOr for FormatFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for FormatFlags {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

// ============================================================================
// Format state
// ============================================================================

/// Default float precision once `FIXED` or `SCIENTIFIC` is set without an
/// explicit [`Directive::Precision`].
const DEFAULT_PRECISION: usize = 6;

/// Largest width a [`Directive::Width`] can request. Larger values are
/// clamped.
pub const MAX_WIDTH: usize = u16::MAX as usize;

/// Formatting state attached to a destination.
///
/// Width is one-shot: it is consumed by the next content write. Fill,
/// flags and precision persist until changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatState {
    width: usize,
    fill: char,
    flags: FormatFlags,
    precision: Option<usize>,
}

impl Default for FormatState {
    fn default() -> Self {
        Self {
            width: 0,
            fill: ' ',
            flags: FormatFlags::NONE,
            precision: None,
        }
    }
}

impl FormatState {
    pub fn apply(&mut self, directive: Directive) {
        match directive {
            Directive::Width(width) => self.width = width.min(MAX_WIDTH),
            Directive::Fill(fill) => self.fill = fill,
            Directive::SetFlags(flags) => self.flags.insert(flags),
            Directive::UnsetFlags(flags) => self.flags.remove(flags),
            Directive::Precision(precision) => self.precision = Some(precision),
        }
    }

    pub fn flags(&self) -> FormatFlags {
        self.flags
    }

    pub fn precision(&self) -> Option<usize> {
        self.precision
    }

    /// Pending width for the next content write (0 means none).
    pub fn width(&self) -> usize {
        self.width
    }

    /// Render any displayable value, consuming the pending width.
    pub fn render_display<T: fmt::Display + ?Sized>(&mut self, value: &T) -> String {
        let text = value.to_string();
        self.pad(&text).into_owned()
    }

    /// Render a number with the current flags, consuming the pending width.
    pub fn render_numeric<N: Numeric + ?Sized>(&mut self, value: &N) -> String {
        let text = value.render(self.flags, self.precision);
        self.pad(&text).into_owned()
    }

    /// Pad already-rendered text to the pending width, consuming it.
    pub fn pad<'a>(&mut self, text: &'a str) -> Cow<'a, str> {
        let width = std::mem::take(&mut self.width);
        let len = text.chars().count();
        if len >= width {
            return Cow::Borrowed(text);
        }
        let padding: String = std::iter::repeat_n(self.fill, width - len).collect();
        if self.flags.contains(FormatFlags::LEFT) {
            Cow::Owned(format!("{text}{padding}"))
        } else {
            Cow::Owned(padding + text)
        }
    }
}

// ============================================================================
// Numeric rendering
// ============================================================================

/// Numbers that honor base, sign and precision flags.
pub trait Numeric {
    fn render(&self, flags: FormatFlags, precision: Option<usize>) -> String;
}

fn with_base_prefix(digits: String, prefix: &str, flags: FormatFlags) -> String {
    if flags.contains(FormatFlags::SHOW_BASE) {
        format!("{prefix}{digits}")
    } else {
        digits
    }
}

macro_rules! impl_numeric_int {
    ($($ty:ty),* $(,)?) => {$(
        impl Numeric for $ty {
            fn render(&self, flags: FormatFlags, _precision: Option<usize>) -> String {
                let upper = flags.contains(FormatFlags::UPPERCASE);
                if flags.contains(FormatFlags::HEX) {
                    if upper {
                        with_base_prefix(format!("{:X}", self), "0X", flags)
                    } else {
                        with_base_prefix(format!("{:x}", self), "0x", flags)
                    }
                } else if flags.contains(FormatFlags::OCT) {
                    with_base_prefix(format!("{:o}", self), "0", flags)
                } else if flags.contains(FormatFlags::SHOW_POS) {
                    format!("{:+}", self)
                } else {
                    self.to_string()
                }
            }
        }
    )*};
}

impl_numeric_int!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);

macro_rules! impl_numeric_float {
    ($($ty:ty),* $(,)?) => {$(
        impl Numeric for $ty {
            fn render(&self, flags: FormatFlags, precision: Option<usize>) -> String {
                let sign = flags.contains(FormatFlags::SHOW_POS);
                if flags.contains(FormatFlags::SCIENTIFIC) {
                    let p = precision.unwrap_or(DEFAULT_PRECISION);
                    match (sign, flags.contains(FormatFlags::UPPERCASE)) {
                        (true, true) => format!("{:+.*E}", p, self),
                        (true, false) => format!("{:+.*e}", p, self),
                        (false, true) => format!("{:.*E}", p, self),
                        (false, false) => format!("{:.*e}", p, self),
                    }
                } else if flags.contains(FormatFlags::FIXED) || precision.is_some() {
                    let p = precision.unwrap_or(DEFAULT_PRECISION);
                    if sign {
                        format!("{:+.*}", p, self)
                    } else {
                        format!("{:.*}", p, self)
                    }
                } else if sign {
                    format!("{:+}", self)
                } else {
                    self.to_string()
                }
            }
        }
    )*};
}

impl_numeric_float!(f32, f64);

// ============================================================================
// Tests
// ============================================================================
