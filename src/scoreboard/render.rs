//! Rendering Pipeline: draws a [`LayoutPlan`] and its roster.
//!
//! Drawing is expressed as an SVG scene, where document order is paint
//! order, and rasterized with resvg. Layering, back to front:
//! panel fill, header sub-panel, divider, panel border, title and
//! subtitle, team labels, grid players, observers.

use resvg::tiny_skia::{Pixmap, Transform};
use resvg::usvg;
use std::fmt::Write as _;
use tracing::{debug, error};

use crate::constants::layout::{BORDER_WIDTH, HEADER_RADIUS, PANEL_RADIUS};
use crate::constants::{EMPTY_STATE_MESSAGE, OBSERVERS_LABEL, image::DPI};
use crate::data_fetcher::models::{Player, Roster};
use crate::data_fetcher::roster::player_grid;
use crate::error::AppError;

use super::fonts::FontRegistry;
use super::layout::{BodyLayout, ColumnAnchor, LayoutPlan, Rect};
use super::style::{DIVIDER_STROKE, HEADER_FILL, PANEL_FILL, PANEL_STROKE, TextRole, TextStyle};

/// Per-corner radii, clockwise from the top left.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CornerRadii {
    pub nw: f32,
    pub ne: f32,
    pub se: f32,
    pub sw: f32,
}

impl CornerRadii {
    pub const fn uniform(radius: f32) -> Self {
        Self {
            nw: radius,
            ne: radius,
            se: radius,
            sw: radius,
        }
    }

    pub const fn top(radius: f32) -> Self {
        Self {
            nw: radius,
            ne: radius,
            se: 0.0,
            sw: 0.0,
        }
    }
}

/// An SVG document under construction. Shapes are appended in paint order.
pub struct SvgScene<'a> {
    width: u32,
    height: u32,
    fonts: &'a FontRegistry,
    body: String,
}

impl<'a> SvgScene<'a> {
    pub fn new(width: u32, height: u32, fonts: &'a FontRegistry) -> Self {
        Self {
            width,
            height,
            fonts,
            body: String::new(),
        }
    }

    /// Rounded rectangle with quadratic corners, filled and/or stroked.
    pub fn rounded_rect(
        &mut self,
        rect: &Rect,
        radii: CornerRadii,
        fill: Option<&str>,
        stroke: Option<(&str, f32)>,
    ) {
        let (x, y) = (rect.x, rect.y);
        let (x_end, y_end) = (rect.right(), rect.bottom());
        let path = format!(
            "M{} {} L{} {} Q{x_end} {y} {x_end} {} L{x_end} {} Q{x_end} {y_end} {} {y_end} \
             L{} {y_end} Q{x} {y_end} {x} {} L{x} {} Q{x} {y} {} {y} Z",
            x + radii.nw,
            y,
            x_end - radii.ne,
            y,
            y + radii.ne,
            y_end - radii.se,
            x_end - radii.se,
            x + radii.sw,
            y_end - radii.sw,
            y + radii.nw,
            x + radii.nw,
        );
        write!(self.body, r#"<path d="{path}" {}/>"#, paint_attributes(fill, stroke)).ok();
    }

    pub fn line(&mut self, from: (f32, f32), to: (f32, f32), stroke: &str, width: f32) {
        write!(
            self.body,
            r#"<line x1="{}" y1="{}" x2="{}" y2="{}" stroke="{stroke}" stroke-width="{width}"/>"#,
            from.0, from.1, to.0, to.1
        )
        .ok();
    }

    /// Text whose baseline sits at `y`, anchored at `x` per the style.
    /// Text that is empty after sanitizing is skipped.
    pub fn text(&mut self, x: f32, y: f32, content: &str, style: &TextStyle) {
        let content = sanitize_text(content);
        if content.trim().is_empty() {
            return;
        }
        let family = escape_xml(self.fonts.family_name(style.font.face));
        write!(
            self.body,
            r#"<text x="{x}" y="{y}" font-family="'{family}', sans-serif" font-size="{}" font-weight="{}" fill="{}" text-anchor="{}" xml:space="preserve">{}</text>"#,
            style.font.size,
            style.font.weight,
            style.color,
            style.align.text_anchor(),
            escape_xml(&content),
        )
        .ok();
    }

    pub fn into_svg(self) -> String {
        format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">{}</svg>"#,
            self.body,
            w = self.width,
            h = self.height,
        )
    }

    /// Rasterizes the scene and encodes it as PNG.
    pub fn render_png(self) -> Result<Vec<u8>, AppError> {
        let fonts = self.fonts;
        let (width, height) = (self.width, self.height);
        let svg = self.into_svg();
        rasterize(&svg, width, height, fonts)
    }
}

fn paint_attributes(fill: Option<&str>, stroke: Option<(&str, f32)>) -> String {
    let fill = format!(r#"fill="{}""#, fill.unwrap_or("none"));
    match stroke {
        Some((color, width)) => format!(r#"{fill} stroke="{color}" stroke-width="{width}""#),
        None => fill,
    }
}

/// Builds the scoreboard scene for `roster` laid out by `plan`.
pub fn build_scene<'a>(roster: &Roster, plan: &LayoutPlan, fonts: &'a FontRegistry) -> SvgScene<'a> {
    let mut scene = SvgScene::new(plan.canvas_width, plan.canvas_height, fonts);
    let panel = &plan.panel;

    scene.rounded_rect(panel, CornerRadii::uniform(PANEL_RADIUS), Some(PANEL_FILL), None);
    scene.rounded_rect(&plan.header, CornerRadii::top(HEADER_RADIUS), Some(HEADER_FILL), None);
    scene.line(
        (plan.header.x, plan.divider_y),
        (plan.header.right(), plan.divider_y),
        DIVIDER_STROKE,
        BORDER_WIDTH,
    );
    scene.rounded_rect(
        panel,
        CornerRadii::uniform(PANEL_RADIUS),
        None,
        Some((PANEL_STROKE, BORDER_WIDTH)),
    );

    scene.text(panel.center_x(), plan.title_y, &roster.map, &TextRole::Title.style());
    scene.text(
        panel.center_x(),
        plan.subtitle_y,
        &roster.game_type,
        &TextRole::Subtitle.style(),
    );

    match &plan.body {
        BodyLayout::Empty { message_x, message_y } => {
            scene.text(
                *message_x,
                *message_y,
                EMPTY_STATE_MESSAGE,
                &TextRole::EmptyState.style(),
            );
        }
        BodyLayout::Roster { teams, observers } => {
            let grid = player_grid(roster);

            if let Some(teams) = teams {
                if let Some(label_y) = teams.label_y {
                    for (team, column) in roster.game_teams.iter().zip(&plan.columns) {
                        if team.name.is_empty() {
                            continue;
                        }
                        scene.text(column.name_x, label_y, &team.name, &TextRole::TeamName.style());
                        scene.text(
                            column.score_x,
                            label_y,
                            &team.score.to_string(),
                            &TextRole::TeamScore.style(),
                        );
                    }
                }
                for (row, y) in grid.rows.iter().zip(&teams.row_ys) {
                    for (cell, column) in row.iter().zip(&plan.columns) {
                        if let Some(player) = cell {
                            draw_player(&mut scene, player, column, *y);
                        }
                    }
                }
            }

            if let (Some(observers), Some(first_column)) = (observers, plan.columns.first()) {
                scene.text(
                    first_column.name_x,
                    observers.label_y,
                    OBSERVERS_LABEL,
                    &TextRole::TeamName.style(),
                );
                for (row, y) in grid.observer_rows.iter().zip(&observers.row_ys) {
                    for (player, column) in row.iter().zip(&plan.columns) {
                        draw_player(&mut scene, player, column, *y);
                    }
                }
            }
        }
    }

    scene
}

fn draw_player(scene: &mut SvgScene<'_>, player: &Player, column: &ColumnAnchor, y: f32) {
    scene.text(column.name_x, y, &player.name, &TextRole::PlayerName.style());
    scene.text(
        column.score_x,
        y,
        &player.score.to_string(),
        &TextRole::PlayerScore.style(),
    );
}

/// Renders `roster` laid out by `plan` to PNG bytes.
pub fn render_scoreboard(
    roster: &Roster,
    plan: &LayoutPlan,
    fonts: &FontRegistry,
) -> Result<Vec<u8>, AppError> {
    let png = build_scene(roster, plan, fonts).render_png()?;
    debug!(
        "Rendered {}x{} scoreboard, {} bytes",
        plan.canvas_width,
        plan.canvas_height,
        png.len()
    );
    Ok(png)
}

/// Rasterizes an SVG document of `width`x`height` pixels to PNG.
pub fn rasterize(svg: &str, width: u32, height: u32, fonts: &FontRegistry) -> Result<Vec<u8>, AppError> {
    let options = usvg::Options {
        fontdb: fonts.database(),
        ..usvg::Options::default()
    };
    let tree = usvg::Tree::from_str(svg, &options).map_err(|e| {
        error!("Generated SVG failed to parse: {e}");
        AppError::render_error(format!("SVG parse error: {e}"))
    })?;
    let mut pixmap = Pixmap::new(width, height)
        .ok_or_else(|| AppError::render_error(format!("Cannot allocate {width}x{height} pixmap")))?;
    resvg::render(&tree, Transform::identity(), &mut pixmap.as_mut());
    encode_png(&pixmap)
}

/// Encodes `pixmap` as 8-bit RGBA PNG tagged with [`DPI`].
pub fn encode_png(pixmap: &Pixmap) -> Result<Vec<u8>, AppError> {
    let data: Vec<u8> = pixmap
        .pixels()
        .iter()
        .flat_map(|pixel| {
            let color = pixel.demultiply();
            [color.red(), color.green(), color.blue(), color.alpha()]
        })
        .collect();

    let pixels_per_meter = (f64::from(DPI) / 0.0254).round() as u32;
    let mut buffer = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut buffer, pixmap.width(), pixmap.height());
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);
        encoder.set_pixel_dims(Some(png::PixelDimensions {
            xppu: pixels_per_meter,
            yppu: pixels_per_meter,
            unit: png::Unit::Meter,
        }));
        let mut writer = encoder
            .write_header()
            .map_err(|e| AppError::render_error(format!("PNG header: {e}")))?;
        writer
            .write_image_data(&data)
            .map_err(|e| AppError::render_error(format!("PNG data: {e}")))?;
        writer
            .finish()
            .map_err(|e| AppError::render_error(format!("PNG finish: {e}")))?;
    }
    Ok(buffer)
}

/// Drops control characters, which XML cannot carry and which the game
/// uses for in-name color codes.
fn sanitize_text(input: &str) -> String {
    input.chars().filter(|c| !c.is_control()).collect()
}

fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
