//! Font registration and text measurement.
//!
//! Fonts are loaded once at startup into a [`FontRegistry`] which both the
//! layout engine (through [`TextMeasure`]) and the rasterizer share.

use resvg::usvg::fontdb::{self, Database, Family, Query, Weight};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::config::FontConfig;

/// Which of the two registered families a text run uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FontFace {
    /// Body family used for names and titles
    Text,
    /// Display family used for scores
    Display,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FontSpec {
    pub face: FontFace,
    pub size: f32,
    /// CSS weight, 100 to 900
    pub weight: u16,
}

impl FontSpec {
    pub const fn new(face: FontFace, size: f32) -> Self {
        Self {
            face,
            size,
            weight: 400,
        }
    }

    pub const fn with_weight(mut self, weight: u16) -> Self {
        self.weight = weight;
        self
    }
}

/// Measures the advance width of a text run. The layout engine only sees
/// this trait, so it can be exercised without any real fonts.
pub trait TextMeasure {
    fn measure_text_width(&self, text: &str, font: &FontSpec) -> f32;
}

/// Average advance, in ems, assumed when no face resolves
const FALLBACK_ADVANCE_EM: f32 = 0.55;

/// Loaded font faces plus the family names the scoreboard asks for.
#[derive(Clone)]
pub struct FontRegistry {
    db: Arc<Database>,
    text_family: String,
    display_family: String,
}

impl FontRegistry {
    /// Loads fonts from the configured directory and, if enabled, the
    /// system. Call once at startup before anything is rendered.
    pub fn load(config: &FontConfig) -> Self {
        let mut db = Database::new();
        if config.load_system_fonts {
            db.load_system_fonts();
        }
        if let Some(dir) = &config.font_dir {
            if Path::new(dir).is_dir() {
                db.load_fonts_dir(dir);
            } else {
                warn!("Font directory {dir} does not exist, skipping");
            }
        }
        info!("Loaded {} font faces", db.len());

        let registry = Self::from_database(db, &config.family, &config.display_family);
        for family in [&registry.text_family, &registry.display_family] {
            if !registry.has_family(family) {
                warn!("Font family '{family}' not found, falling back to sans-serif");
            }
        }
        registry
    }

    /// Registry with no faces. Text measures with the fallback estimate and
    /// is skipped when rasterized.
    pub fn empty() -> Self {
        Self::from_database(Database::new(), "sans-serif", "sans-serif")
    }

    pub fn from_database(mut db: Database, text_family: &str, display_family: &str) -> Self {
        // Point the generic family at something real so unmatched names
        // still render.
        let first_family = db
            .faces()
            .next()
            .and_then(|face| face.families.first().map(|(name, _)| name.clone()));
        if let Some(name) = first_family {
            db.set_sans_serif_family(name);
        }
        Self {
            db: Arc::new(db),
            text_family: text_family.to_string(),
            display_family: display_family.to_string(),
        }
    }

    pub fn database(&self) -> Arc<Database> {
        Arc::clone(&self.db)
    }

    pub fn face_count(&self) -> usize {
        self.db.len()
    }

    pub fn family_name(&self, face: FontFace) -> &str {
        match face {
            FontFace::Text => &self.text_family,
            FontFace::Display => &self.display_family,
        }
    }

    fn has_family(&self, family: &str) -> bool {
        self.db
            .faces()
            .any(|face| face.families.iter().any(|(name, _)| name == family))
    }

    fn resolve(&self, font: &FontSpec) -> Option<fontdb::ID> {
        self.db.query(&Query {
            families: &[Family::Name(self.family_name(font.face)), Family::SansSerif],
            weight: Weight(font.weight),
            stretch: fontdb::Stretch::Normal,
            style: fontdb::Style::Normal,
        })
    }
}

impl TextMeasure for FontRegistry {
    fn measure_text_width(&self, text: &str, font: &FontSpec) -> f32 {
        let measured = self.resolve(font).and_then(|id| {
            self.db
                .with_face_data(id, |data, index| advance_width(data, index, text, font.size))
                .flatten()
        });
        measured.unwrap_or_else(|| {
            debug!("No face for {:?}, estimating width of '{text}'", font.face);
            text.chars().count() as f32 * font.size * FALLBACK_ADVANCE_EM
        })
    }
}

/// Sums horizontal advances of `text` in the face at `data`/`index`,
/// scaled to `size` pixels per em. Kerning is not applied.
fn advance_width(data: &[u8], index: u32, text: &str, size: f32) -> Option<f32> {
    let face = ttf_parser::Face::parse(data, index).ok()?;
    let units_per_em = f32::from(face.units_per_em());
    let fallback = face
        .glyph_index('?')
        .and_then(|glyph| face.glyph_hor_advance(glyph))
        .unwrap_or(0);
    let units: u32 = text
        .chars()
        .map(|c| {
            face.glyph_index(c)
                .and_then(|glyph| face.glyph_hor_advance(glyph))
                .unwrap_or(fallback) as u32
        })
        .sum();
    Some(units as f32 * size / units_per_em)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_registry_estimates_width() {
        let registry = FontRegistry::empty();
        let font = FontSpec::new(FontFace::Text, 20.0);
        let width = registry.measure_text_width("abcd", &font);
        assert!((width - 4.0 * 20.0 * FALLBACK_ADVANCE_EM).abs() < f32::EPSILON);
        assert_eq!(registry.measure_text_width("", &font), 0.0);
    }

    #[test]
    fn test_family_names_by_face() {
        let registry = FontRegistry::from_database(Database::new(), "xbar SF", "xbar SF Display");
        assert_eq!(registry.family_name(FontFace::Text), "xbar SF");
        assert_eq!(registry.family_name(FontFace::Display), "xbar SF Display");
        assert_eq!(registry.face_count(), 0);
    }

    #[test]
    fn test_missing_font_dir_is_skipped() {
        let config = FontConfig {
            font_dir: Some("/definitely/not/a/font/dir".to_string()),
            load_system_fonts: false,
            ..FontConfig::default()
        };
        let registry = FontRegistry::load(&config);
        assert_eq!(registry.face_count(), 0);
    }
}
