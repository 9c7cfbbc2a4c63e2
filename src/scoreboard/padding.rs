//! Padding around the scoreboard panel, parsed from the `padding` query
//! parameter.

use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use tracing::warn;

use crate::constants::layout::{DEFAULT_PADDING, MAX_PADDING};

/// Margin between the canvas edge and the panel, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Padding {
    pub top: u32,
    pub right: u32,
    pub bottom: u32,
    pub left: u32,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PaddingParseError {
    #[error("padding value '{0}' is not a non-negative integer")]
    InvalidValue(String),

    /// Three values leave it unclear which side was omitted.
    #[error("padding takes 1, 2 or 4 values, got {0}")]
    UnsupportedCount(usize),

    #[error("padding value {0} exceeds the maximum of {MAX_PADDING}")]
    TooLarge(u32),
}

impl Padding {
    pub const fn new(top: u32, right: u32, bottom: u32, left: u32) -> Self {
        Self {
            top,
            right,
            bottom,
            left,
        }
    }

    pub const fn uniform(value: u32) -> Self {
        Self::new(value, value, value, value)
    }

    pub fn horizontal(&self) -> u32 {
        self.left.saturating_add(self.right)
    }

    pub fn vertical(&self) -> u32 {
        self.top.saturating_add(self.bottom)
    }

    /// Parses an optional padding spec, falling back to the default for a
    /// missing, empty or invalid one.
    pub fn parse_or_default(spec: Option<&str>) -> Self {
        match spec.map(str::trim) {
            None | Some("") => Self::default(),
            Some(spec) => spec.parse().unwrap_or_else(|e| {
                warn!("Ignoring padding '{spec}': {e}");
                Self::default()
            }),
        }
    }
}

impl Default for Padding {
    fn default() -> Self {
        let [top, right, bottom, left] = DEFAULT_PADDING;
        Self::new(top, right, bottom, left)
    }
}

impl FromStr for Padding {
    type Err = PaddingParseError;

    /// Accepts CSS-style shorthand: `all`, `vertical,horizontal` or
    /// `top,right,bottom,left`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let values = s
            .split(',')
            .map(|part| {
                let part = part.trim();
                let value = part
                    .parse::<u32>()
                    .map_err(|_| PaddingParseError::InvalidValue(part.to_string()))?;
                if value > MAX_PADDING {
                    return Err(PaddingParseError::TooLarge(value));
                }
                Ok(value)
            })
            .collect::<Result<Vec<_>, _>>()?;

        match values.as_slice() {
            [all] => Ok(Self::uniform(*all)),
            [vertical, horizontal] => Ok(Self::new(*vertical, *horizontal, *vertical, *horizontal)),
            [top, right, bottom, left] => Ok(Self::new(*top, *right, *bottom, *left)),
            other => Err(PaddingParseError::UnsupportedCount(other.len())),
        }
    }
}

impl fmt::Display for Padding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{},{}", self.top, self.right, self.bottom, self.left)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_value_applies_to_all_sides() {
        assert_eq!("8".parse::<Padding>().unwrap(), Padding::uniform(8));
    }

    #[test]
    fn test_two_values_are_vertical_then_horizontal() {
        assert_eq!(
            "4, 10".parse::<Padding>().unwrap(),
            Padding::new(4, 10, 4, 10)
        );
    }

    #[test]
    fn test_four_values_are_top_right_bottom_left() {
        assert_eq!(
            "1,2,3,4".parse::<Padding>().unwrap(),
            Padding::new(1, 2, 3, 4)
        );
    }

    #[test]
    fn test_three_values_are_rejected() {
        assert_eq!(
            "1,2,3".parse::<Padding>(),
            Err(PaddingParseError::UnsupportedCount(3))
        );
        assert_eq!(Padding::parse_or_default(Some("1,2,3")), Padding::default());
    }

    #[test]
    fn test_invalid_input_falls_back_to_default() {
        for spec in ["abc", "-1", "1,,2", "1.5", "1,2,3,4,5"] {
            assert_eq!(Padding::parse_or_default(Some(spec)), Padding::default(), "{spec}");
        }
        assert_eq!(Padding::parse_or_default(None), Padding::default());
        assert_eq!(Padding::parse_or_default(Some("  ")), Padding::default());
    }

    #[test]
    fn test_oversized_values_fall_back_to_default() {
        assert_eq!(
            "4294967295".parse::<Padding>(),
            Err(PaddingParseError::TooLarge(u32::MAX))
        );
        for spec in ["4294967295", "100000", "0,1001", "1,2,3,100000"] {
            assert_eq!(Padding::parse_or_default(Some(spec)), Padding::default(), "{spec}");
        }
        assert_eq!(
            Padding::parse_or_default(Some("1000")),
            Padding::uniform(MAX_PADDING)
        );
    }

    #[test]
    fn test_side_sums_saturate() {
        let padding = Padding::uniform(u32::MAX);
        assert_eq!(padding.horizontal(), u32::MAX);
        assert_eq!(padding.vertical(), u32::MAX);
    }

    #[test]
    fn test_display_round_trips() {
        let padding = Padding::new(5, 6, 7, 8);
        assert_eq!(padding.to_string().parse::<Padding>().unwrap(), padding);
    }
}
