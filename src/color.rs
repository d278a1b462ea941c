//! Display colors for cards and categories and their storage encoding.
//!
//! Colors are stored as an opaque blob: a small JSON document holding the four
//! 8-bit RGBA channels. Decoding rejects anything else, including documents
//! written by some other program, so callers can fall back to a default color.

use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::Error;

/// An RGBA color with 8 bits per channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Color {
    /// The red channel.
    pub red: u8,
    /// The green channel.
    pub green: u8,
    /// The blue channel.
    pub blue: u8,
    /// The alpha channel, 255 is fully opaque.
    pub alpha: u8,
}

impl Color {
    /// The default color for new cards.
    pub const BLUE: Color = Color::rgb(0, 122, 255);
    /// The default color for new categories.
    pub const RED: Color = Color::rgb(255, 59, 48);
    /// The color used for cards whose stored color cannot be read.
    pub const PURPLE: Color = Color::rgb(175, 82, 222);

    /// Create a fully opaque color.
    pub const fn rgb(red: u8, green: u8, blue: u8) -> Self {
        Self {
            red,
            green,
            blue,
            alpha: u8::MAX,
        }
    }

    /// Encode the color for storage.
    pub fn encode(&self) -> Vec<u8> {
        // Serializing four integers into a `Vec` cannot fail.
        serde_json::to_vec(self).unwrap_or_default()
    }

    /// Decode a color previously created with [Color::encode].
    ///
    /// Returns `None` if `blob` is not an encoded color.
    pub fn decode(blob: &[u8]) -> Option<Self> {
        serde_json::from_slice(blob).ok()
    }

    /// Decode a color, using `fallback` if `blob` is not an encoded color.
    pub fn decode_or(blob: &[u8], fallback: Color) -> Self {
        Self::decode(blob).unwrap_or_else(|| {
            tracing::warn!(
                "Could not decode a stored color ({} bytes), using {fallback} instead",
                blob.len()
            );
            fallback
        })
    }

    /// Parse a hex color in the form `#rrggbb` or `#rrggbbaa`.
    ///
    /// # Errors
    ///
    /// Returns an [Error::InvalidColor] if `text` is not a hex color.
    pub fn from_hex(text: &str) -> Result<Self, Error> {
        let invalid = || Error::InvalidColor(text.to_owned());
        let digits = text.trim().strip_prefix('#').ok_or_else(invalid)?;

        if !digits.bytes().all(|byte| byte.is_ascii_hexdigit())
            || (digits.len() != 6 && digits.len() != 8)
        {
            return Err(invalid());
        }

        let channel = |start: usize| {
            u8::from_str_radix(&digits[start..start + 2], 16).map_err(|_| invalid())
        };

        Ok(Self {
            red: channel(0)?,
            green: channel(2)?,
            blue: channel(4)?,
            alpha: if digits.len() == 8 {
                channel(6)?
            } else {
                u8::MAX
            },
        })
    }

    /// The same color with its alpha channel replaced by `alpha`.
    pub fn with_alpha(self, alpha: u8) -> Self {
        Self { alpha, ..self }
    }

    /// Format the color as `#rrggbb`, the format used by HTML color inputs.
    ///
    /// The alpha channel is dropped.
    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.red, self.green, self.blue)
    }

    /// Format the color as a CSS `rgba()` value.
    pub fn to_css(&self) -> String {
        format!(
            "rgba({}, {}, {}, {:.3})",
            self.red,
            self.green,
            self.blue,
            f64::from(self.alpha) / 255.0
        )
    }
}

impl FromStr for Color {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Color::from_hex(s)
    }
}

impl Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{:02x}", self.to_hex(), self.alpha)
    }
}


#[cfg(test)]
mod hex_tests {
    use crate::Error;

    use super::Color;

    #[test]
    fn parses_six_digit_hex() {
        assert_eq!(Color::from_hex("#ff3b30"), Ok(Color::RED));
    }

    #[test]
    fn parses_eight_digit_hex() {
        let want = Color {
            red: 0x12,
            green: 0x34,
            blue: 0x56,
            alpha: 0x78,
        };

        assert_eq!(Color::from_hex("#12345678"), Ok(want));
    }

    #[test]
    fn rejects_invalid_hex() {
        for text in ["", "ff3b30", "#ff3b3", "#gg0000", "#ff3b30ff00", "#ffé000"] {
            assert_eq!(
                Color::from_hex(text),
                Err(Error::InvalidColor(text.to_owned())),
                "want error for {text:?}"
            );
        }
    }

    #[test]
    fn rejects_signed_channels() {
        for text in ["#+f+f+f", "#-1ff00", "#ff+f00+f"] {
            assert_eq!(
                Color::from_hex(text),
                Err(Error::InvalidColor(text.to_owned())),
                "want error for {text:?}"
            );
        }
    }

    #[test]
    fn to_hex_round_trips_opaque_colors() {
        assert_eq!(Color::BLUE.to_hex(), "#007aff");
        assert_eq!(Color::from_hex(&Color::BLUE.to_hex()), Ok(Color::BLUE));
    }

    #[test]
    fn to_css_includes_alpha() {
        assert_eq!(Color::rgb(1, 2, 3).to_css(), "rgba(1, 2, 3, 1.000)");
    }
}
