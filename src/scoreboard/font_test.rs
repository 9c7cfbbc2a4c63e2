//! Diagnostic image showing both families at every weight.

use crate::constants::image::{FONT_TEST_SAMPLE, FONT_TEST_SIZE};
use crate::constants::layout::{BORDER_WIDTH, PANEL_RADIUS};
use crate::error::AppError;

use super::fonts::{FontFace, FontRegistry, FontSpec};
use super::layout::Rect;
use super::render::{CornerRadii, SvgScene};
use super::style::{Align, PANEL_FILL, PANEL_STROKE, TextStyle};

const WEIGHTS: [u16; 9] = [100, 200, 300, 400, 500, 600, 700, 800, 900];
const SAMPLE_COLOR: &str = "#d6fff5";
const SAMPLE_SIZE: f32 = 22.0;
const FIRST_BASELINE: f32 = 36.0;
const LINE_PITCH: f32 = 32.0;

/// Builds the font test scene: per weight, one sample line in the text
/// family and one in the display family.
pub fn build_font_test_scene(fonts: &FontRegistry) -> SvgScene<'_> {
    let (width, height) = FONT_TEST_SIZE;
    let mut scene = SvgScene::new(width, height, fonts);
    let canvas = Rect {
        x: 0.0,
        y: 0.0,
        width: width as f32,
        height: height as f32,
    };
    scene.rounded_rect(
        &canvas,
        CornerRadii::uniform(PANEL_RADIUS),
        Some(PANEL_FILL),
        Some((PANEL_STROKE, BORDER_WIDTH)),
    );

    let center_x = canvas.center_x();
    for (i, weight) in WEIGHTS.iter().enumerate() {
        let baseline = FIRST_BASELINE + 2.0 * LINE_PITCH * i as f32;
        for (line, face) in [FontFace::Text, FontFace::Display].into_iter().enumerate() {
            let style = TextStyle {
                font: FontSpec::new(face, SAMPLE_SIZE).with_weight(*weight),
                color: SAMPLE_COLOR,
                align: Align::Center,
            };
            scene.text(center_x, baseline + LINE_PITCH * line as f32, FONT_TEST_SAMPLE, &style);
        }
    }
    scene
}

/// Renders the font test image to PNG bytes.
pub fn render_font_test(fonts: &FontRegistry) -> Result<Vec<u8>, AppError> {
    build_font_test_scene(fonts).render_png()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_eighteen_sample_lines() {
        let fonts = FontRegistry::empty();
        let svg = build_font_test_scene(&fonts).into_svg();
        assert_eq!(svg.matches(FONT_TEST_SAMPLE).count(), 18);
        assert!(svg.contains(r#"font-weight="100""#));
        assert!(svg.contains(r#"font-weight="900""#));
        // Last display line sits at 36 + 32 + 64 * 8
        assert!(svg.contains(r#"y="580""#));
    }

    #[test]
    fn test_font_test_png_is_fixed_size() {
        let png = render_font_test(&FontRegistry::empty()).unwrap();
        let width = u32::from_be_bytes([png[16], png[17], png[18], png[19]]);
        let height = u32::from_be_bytes([png[20], png[21], png[22], png[23]]);
        assert_eq!((width, height), FONT_TEST_SIZE);
    }
}
