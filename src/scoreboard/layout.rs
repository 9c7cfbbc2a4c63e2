//! Layout Engine: derives every coordinate the renderer needs from the
//! roster, the padding and measured text widths, without drawing anything.
//!
//! Vertical structure of the panel, top to bottom:
//!
//! ```text
//! header block   HEADER_HEIGHT, title + subtitle, divider at its bottom
//! body margin    BODY_TOP_MARGIN + BLOCK_BASELINE_OFFSET to the first baseline
//! teams block    [LABEL_HEIGHT if a team is named] + ROW_HEIGHT * rows
//! block gap      BLOCK_GAP, only between two present blocks
//! observers      LABEL_HEIGHT + ROW_HEIGHT * observer rows
//! ```
//!
//! With nobody online the body is replaced by a fixed-height empty state.

use crate::constants::layout::*;
use crate::data_fetcher::models::Roster;
use crate::data_fetcher::roster::player_grid;

use super::fonts::TextMeasure;
use super::padding::Padding;
use super::style::TextRole;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn center_x(&self) -> f32 {
        self.x + self.width / 2.0
    }
}

/// Text anchors of one grid column: names are left-aligned at `name_x`,
/// scores right-aligned at `score_x`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColumnAnchor {
    pub name_x: f32,
    pub score_x: f32,
}

/// Geometry of the game teams block.
#[derive(Debug, Clone, PartialEq)]
pub struct TeamsBlock {
    pub top: f32,
    pub height: f32,
    /// Baseline of team names and scores, when any team is named
    pub label_y: Option<f32>,
    /// Baseline of each grid row
    pub row_ys: Vec<f32>,
}

/// Geometry of the observers block.
#[derive(Debug, Clone, PartialEq)]
pub struct ObserversBlock {
    pub top: f32,
    pub height: f32,
    /// Baseline of the "Observers" label
    pub label_y: f32,
    /// Baseline of each observer row
    pub row_ys: Vec<f32>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum BodyLayout {
    /// Nobody is connected: a single centered message.
    Empty { message_x: f32, message_y: f32 },
    /// At least one block is present.
    Roster {
        teams: Option<TeamsBlock>,
        observers: Option<ObserversBlock>,
    },
}

/// Every geometric quantity needed to draw one scoreboard. Recomputed per
/// render; a pure function of roster, padding and text measurement.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutPlan {
    pub canvas_width: u32,
    pub canvas_height: u32,
    /// Outer rounded panel
    pub panel: Rect,
    /// Darker header sub-panel
    pub header: Rect,
    pub divider_y: f32,
    pub title_y: f32,
    pub subtitle_y: f32,
    pub max_player_name_width: f32,
    pub gutter: f32,
    pub center_gutter: f32,
    /// One anchor per grid column, `max(1, game team count)` of them
    pub columns: Vec<ColumnAnchor>,
    pub body: BodyLayout,
}

impl LayoutPlan {
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty_state(&self) -> bool {
        matches!(self.body, BodyLayout::Empty { .. })
    }

    pub fn teams(&self) -> Option<&TeamsBlock> {
        match &self.body {
            BodyLayout::Roster { teams, .. } => teams.as_ref(),
            BodyLayout::Empty { .. } => None,
        }
    }

    pub fn observers(&self) -> Option<&ObserversBlock> {
        match &self.body {
            BodyLayout::Roster { observers, .. } => observers.as_ref(),
            BodyLayout::Empty { .. } => None,
        }
    }
}

/// Outer and inter-column gutters for a roster.
///
/// A single column is centered with a wide gutter. Otherwise a player name
/// wider than [`PLAYER_NAME_WIDTH_LIMIT`] tightens both gutters.
pub fn choose_gutters(column_count: usize, max_player_name_width: f32) -> (f32, f32) {
    let long_names = max_player_name_width > PLAYER_NAME_WIDTH_LIMIT;
    let gutter = if column_count == 1 {
        SINGLE_COLUMN_GUTTER
    } else if long_names {
        NARROW_GUTTER
    } else {
        GUTTER
    };
    let center_gutter = if long_names {
        NARROW_CENTER_GUTTER
    } else {
        CENTER_GUTTER
    };
    (gutter, center_gutter)
}

/// Splits the panel into `column_count` equal columns. The outermost
/// edges are inset by `gutter`, inner column boundaries by `center_gutter`.
pub fn column_anchors(panel: &Rect, column_count: usize, gutter: f32, center_gutter: f32) -> Vec<ColumnAnchor> {
    let column_width = panel.width / column_count as f32;
    (0..column_count)
        .map(|j| {
            let column_left = panel.x + column_width * j as f32;
            let column_right = column_left + column_width;
            let name_inset = if j == 0 { gutter } else { center_gutter };
            let score_inset = if j + 1 == column_count {
                gutter
            } else {
                center_gutter
            };
            ColumnAnchor {
                name_x: column_left + name_inset,
                score_x: column_right - score_inset,
            }
        })
        .collect()
}

/// Computes the layout plan for `roster` drawn with `padding`.
pub fn compute_layout<M: TextMeasure + ?Sized>(
    roster: &Roster,
    padding: &Padding,
    measure: &M,
) -> LayoutPlan {
    let grid = player_grid(roster);

    let body_font = TextRole::PlayerName.style().font;
    let max_player_name_width = roster
        .all_player_names()
        .map(|name| measure.measure_text_width(name, &body_font))
        .fold(0.0_f32, f32::max);

    let (gutter, center_gutter) = choose_gutters(grid.column_count, max_player_name_width);

    let panel_x = padding.left as f32;
    let panel_y = padding.top as f32;
    let body_top = panel_y + HEADER_HEIGHT + BODY_TOP_MARGIN;

    // Empty state is keyed on the total count, not on the row count: a
    // roster with only observers still gets the normal body.
    let (body, body_height) = if roster.has_players() {
        let teams = (grid.row_count() > 0).then(|| {
            let has_label = roster.game_teams.iter().any(|team| !team.name.is_empty());
            let label_height = if has_label { LABEL_HEIGHT } else { 0.0 };
            let first_row = body_top + BLOCK_BASELINE_OFFSET + label_height;
            TeamsBlock {
                top: body_top,
                height: label_height + ROW_HEIGHT * grid.row_count() as f32,
                label_y: has_label.then_some(body_top + BLOCK_BASELINE_OFFSET),
                row_ys: (0..grid.row_count())
                    .map(|i| first_row + ROW_HEIGHT * i as f32)
                    .collect(),
            }
        });

        let observers = (roster.observer_count > 0).then(|| {
            let top = match &teams {
                Some(teams) => teams.top + teams.height + BLOCK_GAP,
                None => body_top,
            };
            let label_y = top + BLOCK_BASELINE_OFFSET;
            ObserversBlock {
                top,
                height: LABEL_HEIGHT + ROW_HEIGHT * grid.observer_row_count() as f32,
                label_y,
                row_ys: (0..grid.observer_row_count())
                    .map(|i| label_y + LABEL_HEIGHT + ROW_HEIGHT * i as f32)
                    .collect(),
            }
        });

        let mut height = BODY_TOP_MARGIN + BLOCK_BASELINE_OFFSET;
        if let Some(teams) = &teams {
            height += teams.height + BLOCK_TRAILING_GAP;
        }
        if let Some(observers) = &observers {
            if teams.is_some() {
                height += STACKED_BLOCKS_EXTRA;
            }
            height += observers.height + BLOCK_TRAILING_GAP;
        }
        (BodyLayout::Roster { teams, observers }, height)
    } else {
        let message_x = panel_x + PANEL_WIDTH / 2.0;
        let message_y = panel_y + EMPTY_MESSAGE_BASELINE;
        (BodyLayout::Empty { message_x, message_y }, EMPTY_BODY_HEIGHT)
    };

    let canvas_width = padding.horizontal() as f32 + PANEL_WIDTH;
    let canvas_height = padding.vertical() as f32 + HEADER_HEIGHT + body_height;

    let panel = Rect {
        x: panel_x,
        y: panel_y,
        width: PANEL_WIDTH,
        height: HEADER_HEIGHT + body_height,
    };
    let header = Rect {
        x: panel.x + HEADER_INSET,
        y: panel.y + HEADER_INSET,
        width: panel.width - 2.0 * HEADER_INSET,
        height: HEADER_HEIGHT - 2.0 * HEADER_INSET,
    };

    LayoutPlan {
        canvas_width: canvas_width.ceil() as u32,
        canvas_height: canvas_height.ceil() as u32,
        panel,
        header,
        divider_y: panel.y + HEADER_HEIGHT,
        title_y: panel.y + TITLE_BASELINE,
        subtitle_y: panel.y + SUBTITLE_BASELINE,
        max_player_name_width,
        gutter,
        center_gutter,
        columns: column_anchors(&panel, grid.column_count, gutter, center_gutter),
        body,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing_utils::{FixedAdvance, TestDataBuilder};

    #[test]
    fn test_two_columns_use_standard_gutters() {
        let (gutter, center) = choose_gutters(2, 100.0);
        assert_eq!((gutter, center), (GUTTER, CENTER_GUTTER));
    }

    #[test]
    fn test_long_names_tighten_gutters() {
        assert_eq!(choose_gutters(2, 234.5), (30.0, 16.0));
        // Exactly at the limit is not "exceeding" it.
        assert_eq!(choose_gutters(2, 234.0), (40.0, 30.0));
    }

    #[test]
    fn test_single_column_gutter_ignores_name_length() {
        assert_eq!(choose_gutters(1, 10.0).0, 220.0);
        assert_eq!(choose_gutters(1, 500.0).0, 220.0);
    }

    #[test]
    fn test_two_column_anchors() {
        let panel = Rect {
            x: 72.0,
            y: 2.0,
            width: 726.0,
            height: 300.0,
        };
        let columns = column_anchors(&panel, 2, 40.0, 30.0);
        assert_eq!(columns[0].name_x, 72.0 + 40.0);
        assert_eq!(columns[0].score_x, 798.0 - 363.0 - 30.0);
        assert_eq!(columns[1].name_x, 72.0 + 363.0 + 30.0);
        assert_eq!(columns[1].score_x, 798.0 - 40.0);
    }

    #[test]
    fn test_single_column_anchor_spans_panel() {
        let panel = Rect {
            x: 0.0,
            y: 0.0,
            width: 726.0,
            height: 300.0,
        };
        let columns = column_anchors(&panel, 1, 220.0, 30.0);
        assert_eq!(columns.len(), 1);
        assert_eq!(columns[0].name_x, 220.0);
        assert_eq!(columns[0].score_x, 726.0 - 220.0);
    }

    #[test]
    fn test_empty_roster_uses_empty_state() {
        let roster = TestDataBuilder::roster(vec![], vec![]);
        let plan = compute_layout(&roster, &Padding::default(), &FixedAdvance(10.0));
        assert!(plan.is_empty_state());
        assert_eq!(plan.canvas_height, 300);
        assert_eq!(plan.canvas_width, 800);
        assert_eq!(plan.max_player_name_width, 0.0);
    }

    #[test]
    fn test_observers_only_roster_is_not_empty_state() {
        let roster = TestDataBuilder::roster(vec![], vec![("watcher", 0)]);
        let plan = compute_layout(&roster, &Padding::default(), &FixedAdvance(10.0));
        assert!(!plan.is_empty_state());
        assert!(plan.teams().is_none());
        let observers = plan.observers().unwrap();
        assert_eq!(observers.top, 2.0 + HEADER_HEIGHT + BODY_TOP_MARGIN);
        assert_eq!(observers.row_ys.len(), 1);
    }

    #[test]
    fn test_blocks_stack_with_gap() {
        let roster = TestDataBuilder::roster(
            vec![TestDataBuilder::team("Storm", &[("a", 1), ("b", 0)])],
            vec![("o1", 0), ("o2", 0)],
        );
        let plan = compute_layout(&roster, &Padding::uniform(0), &FixedAdvance(10.0));
        let teams = plan.teams().unwrap();
        let observers = plan.observers().unwrap();
        assert_eq!(observers.top, teams.top + teams.height + BLOCK_GAP);
        assert_eq!(observers.label_y, observers.top + BLOCK_BASELINE_OFFSET);
        assert_eq!(observers.row_ys[0], observers.label_y + LABEL_HEIGHT);
        // Single column: two observers wrap into two rows.
        assert_eq!(observers.row_ys.len(), 2);
    }

    #[test]
    fn test_unnamed_team_has_no_label_row() {
        let roster = TestDataBuilder::roster(
            vec![TestDataBuilder::team("", &[("a", 1), ("b", 0)])],
            vec![],
        );
        let plan = compute_layout(&roster, &Padding::uniform(0), &FixedAdvance(10.0));
        let teams = plan.teams().unwrap();
        assert_eq!(teams.label_y, None);
        assert_eq!(teams.height, 2.0 * ROW_HEIGHT);
        assert_eq!(teams.row_ys[0], teams.top + BLOCK_BASELINE_OFFSET);
    }

    #[test]
    fn test_padding_shifts_panel_and_grows_canvas() {
        let roster = TestDataBuilder::roster(
            vec![TestDataBuilder::team("Storm", &[("a", 1)])],
            vec![],
        );
        let tight = compute_layout(&roster, &Padding::uniform(0), &FixedAdvance(10.0));
        let padded = compute_layout(&roster, &Padding::new(10, 20, 30, 40), &FixedAdvance(10.0));
        assert_eq!(padded.canvas_width, tight.canvas_width + 60);
        assert_eq!(padded.canvas_height, tight.canvas_height + 40);
        assert_eq!(padded.panel.x, 40.0);
        assert_eq!(padded.panel.y, 10.0);
        assert_eq!(padded.divider_y, 10.0 + HEADER_HEIGHT);
        assert_eq!(padded.panel.bottom(), padded.canvas_height as f32 - 30.0);
    }
}
