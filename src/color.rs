//! Color markers for channel output.
//!
//! [`colorize`] and [`paint_into`] are the only places where escape
//! sequences are produced. Both are pure: the channel decides the color and
//! whether coloring is enabled, these functions only wrap text.
//!
//! Foreground and background codes come from [`colored::Color`], so any
//! color the `colored` crate knows (including true colors) can be used.

use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use colored::Color;
use serde::Deserialize;

use crate::error::Error;

/// Marker that resets every attribute and color.
pub const RESET: &str = "\x1b[0m";

// ============================================================================
// Attributes
// ============================================================================

/// Text attribute emitted ahead of the color codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Attribute {
    Bold,
    Dim,
    Underline,
    Blink,
    Reverse,
    Hidden,
}

impl Attribute {
    /// SGR parameter for this attribute.
    pub fn code(self) -> u8 {
        match self {
            Attribute::Bold => 1,
            Attribute::Dim => 2,
            Attribute::Underline => 4,
            Attribute::Blink => 5,
            Attribute::Reverse => 7,
            Attribute::Hidden => 8,
        }
    }

    fn from_name(name: &str) -> Option<Self> {
        match name {
            "bold" => Some(Attribute::Bold),
            "dim" | "dimmed" => Some(Attribute::Dim),
            "underline" | "underscore" => Some(Attribute::Underline),
            "blink" => Some(Attribute::Blink),
            "reverse" | "reversed" => Some(Attribute::Reverse),
            "hidden" => Some(Attribute::Hidden),
            _ => None,
        }
    }
}

// ============================================================================
// LogColor
// ============================================================================

/// The color a channel applies to its content writes.
///
/// The start marker is computed once at construction, so painting a value
/// costs two string pushes.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub struct LogColor {
    attribute: Option<Attribute>,
    foreground: Color,
    background: Option<Color>,
    marker: String,
}

impl LogColor {
    /// A plain foreground color with no attribute or background.
    pub fn new(foreground: Color) -> Self {
        Self::build(None, foreground, None)
    }

    /// Add a text attribute.
    #[must_use]
    pub fn with_attribute(self, attribute: Attribute) -> Self {
        Self::build(Some(attribute), self.foreground, self.background)
    }

    /// Add a background color.
    #[must_use]
    pub fn on(self, background: Color) -> Self {
        Self::build(self.attribute, self.foreground, Some(background))
    }

    /// Default color of the normal-output channel: bold green.
    pub fn info() -> Self {
        Self::new(Color::Green).with_attribute(Attribute::Bold)
    }

    /// Default color of the error channel: bold red.
    pub fn error() -> Self {
        Self::new(Color::Red).with_attribute(Attribute::Bold)
    }

    pub fn attribute(&self) -> Option<Attribute> {
        self.attribute
    }

    pub fn foreground(&self) -> Color {
        self.foreground
    }

    pub fn background(&self) -> Option<Color> {
        self.background
    }

    /// The escape sequence that starts this color.
    pub fn start_marker(&self) -> &str {
        &self.marker
    }

    fn build(attribute: Option<Attribute>, foreground: Color, background: Option<Color>) -> Self {
        let mut marker = String::from("\x1b[");
        if let Some(attribute) = attribute {
            marker.push_str(&attribute.code().to_string());
            marker.push(';');
        }
        marker.push_str(&foreground.to_fg_str());
        if let Some(background) = background {
            marker.push(';');
            marker.push_str(&background.to_bg_str());
        }
        marker.push('m');
        Self {
            attribute,
            foreground,
            background,
            marker,
        }
    }
}

fn color_from_name(name: &str) -> Option<Color> {
    let color = match name {
        "black" => Color::Black,
        "red" => Color::Red,
        "green" => Color::Green,
        "yellow" => Color::Yellow,
        "blue" => Color::Blue,
        "magenta" | "purple" => Color::Magenta,
        "cyan" => Color::Cyan,
        "white" => Color::White,
        "bright black" | "gray" | "grey" => Color::BrightBlack,
        "bright red" => Color::BrightRed,
        "bright green" => Color::BrightGreen,
        "bright yellow" => Color::BrightYellow,
        "bright blue" => Color::BrightBlue,
        "bright magenta" | "bright purple" => Color::BrightMagenta,
        "bright cyan" => Color::BrightCyan,
        "bright white" => Color::BrightWhite,
        _ => return None,
    };
    Some(color)
}

/// Parses `"[attribute ]<color>[ on <color>]"`, e.g. `"bold green"` or
/// `"bright red on black"`. Underscores count as spaces.
impl FromStr for LogColor {
    type Err = Error;

    fn from_str(src: &str) -> Result<Self, Self::Err> {
        let normalized = src.trim().to_lowercase().replace('_', " ");
        let (front, back) = match normalized.split_once(" on ") {
            Some((front, back)) => (front.trim(), Some(back.trim())),
            None => (normalized.as_str(), None),
        };

        let (attribute, fg_name) = match front.split_once(' ') {
            Some((first, rest)) => match Attribute::from_name(first) {
                Some(attribute) => (Some(attribute), rest.trim()),
                None => (None, front),
            },
            None => (None, front),
        };

        let foreground =
            color_from_name(fg_name).ok_or_else(|| Error::UnknownColor(src.to_string()))?;
        let background = match back {
            Some(name) => {
                Some(color_from_name(name).ok_or_else(|| Error::UnknownColor(src.to_string()))?)
            }
            None => None,
        };
        Ok(Self::build(attribute, foreground, background))
    }
}

impl TryFrom<String> for LogColor {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for LogColor {
    /// Writes the start marker, so a color can be written like any value.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.marker)
    }
}

// ============================================================================
// ColorFormatter
// ============================================================================

/// Wrap `text` in the start/reset markers of `color` when `enabled`.
///
/// Returns the text untouched (borrowed) when coloring is disabled.
///
/// # Example
///
/// ```
/// use steplog::color::{colorize, LogColor};
/// use colored::Color;
///
/// let red = LogColor::new(Color::Red);
/// assert_eq!(colorize("42", &red, false), "42");
/// assert_eq!(colorize("42", &red, true), "\x1b[31m42\x1b[0m");
/// ```
pub fn colorize<'a>(text: &'a str, color: &LogColor, enabled: bool) -> Cow<'a, str> {
    if !enabled {
        return Cow::Borrowed(text);
    }
    let mut out = String::with_capacity(color.marker.len() + text.len() + RESET.len());
    paint_into(&mut out, text, color, true);
    Cow::Owned(out)
}

/// Append `text` to `out`, wrapped in markers when `enabled`.
pub fn paint_into(out: &mut String, text: &str, color: &LogColor, enabled: bool) {
    if enabled {
        out.push_str(&color.marker);
        out.push_str(text);
        out.push_str(RESET);
    } else {
        out.push_str(text);
    }
}

// ============================================================================
// Tests
// ============================================================================
