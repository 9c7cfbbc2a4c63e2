//! Scoreboard image: layout engine, styling and the rendering pipeline.

pub mod font_test;
pub mod fonts;
pub mod layout;
pub mod padding;
pub mod render;
pub mod style;

pub use font_test::render_font_test;
pub use fonts::{FontFace, FontRegistry, FontSpec, TextMeasure};
pub use layout::{LayoutPlan, compute_layout};
pub use padding::Padding;
pub use render::render_scoreboard;
