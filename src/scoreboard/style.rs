//! Fixed visual language of the scoreboard: colors, and a font/color/
//! alignment triple per text role.

use super::fonts::{FontFace, FontSpec};

pub const PANEL_FILL: &str = "#0c3b3a";
pub const PANEL_STROKE: &str = "#2ae8bf";
pub const HEADER_FILL: &str = "#02312b";
pub const DIVIDER_STROKE: &str = "#2e6b66";

/// Horizontal anchoring of a text run relative to its x coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Center,
    Right,
}

impl Align {
    /// SVG `text-anchor` value
    pub fn text_anchor(self) -> &'static str {
        match self {
            Align::Left => "start",
            Align::Center => "middle",
            Align::Right => "end",
        }
    }
}

/// Semantic role of a piece of text on the scoreboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextRole {
    /// Map name
    Title,
    /// Game type
    Subtitle,
    /// Team names and the observers label
    TeamName,
    TeamScore,
    PlayerName,
    PlayerScore,
    /// "No players online."
    EmptyState,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    pub font: FontSpec,
    pub color: &'static str,
    pub align: Align,
}

impl TextRole {
    pub fn style(self) -> TextStyle {
        let (face, size, color, align) = match self {
            TextRole::Title => (FontFace::Text, 26.0, "#81fff3", Align::Center),
            TextRole::Subtitle => (FontFace::Text, 20.0, "#6ec6a8", Align::Center),
            TextRole::TeamName => (FontFace::Text, 24.0, "#24ff8a", Align::Left),
            TextRole::TeamScore => (FontFace::Display, 22.0, "#fffa17", Align::Right),
            TextRole::PlayerName => (FontFace::Text, 22.0, "#d6fff5", Align::Left),
            TextRole::PlayerScore => (FontFace::Display, 20.0, "#79d5b6", Align::Right),
            TextRole::EmptyState => (FontFace::Text, 24.0, "#76b8a7", Align::Center),
        };
        TextStyle {
            font: FontSpec::new(face, size),
            color,
            align,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_left_scores_right_titles_centered() {
        assert_eq!(TextRole::PlayerName.style().align, Align::Left);
        assert_eq!(TextRole::TeamName.style().align, Align::Left);
        assert_eq!(TextRole::PlayerScore.style().align, Align::Right);
        assert_eq!(TextRole::TeamScore.style().align, Align::Right);
        assert_eq!(TextRole::Title.style().align, Align::Center);
        assert_eq!(TextRole::EmptyState.style().align, Align::Center);
    }

    #[test]
    fn test_scores_use_display_face() {
        assert_eq!(TextRole::PlayerScore.style().font.face, FontFace::Display);
        assert_eq!(TextRole::PlayerName.style().font.face, FontFace::Text);
        assert_eq!(TextRole::PlayerName.style().font.size, 22.0);
    }
}
