//! Application-wide constants and configuration values
//!
//! The pixel values in [`layout`] and [`style`] are visual tuning values for
//! the one scoreboard template; they are kept as named constants instead of
//! being derived from anything.

/// Default upstream endpoint listing every known game server
pub const DEFAULT_STATUS_URL: &str = "https://www.tribesnext.com/json";

/// Default port for the HTTP server
pub const DEFAULT_PORT: u16 = 3000;

/// Default image service queried by the xbar plugin in image mode
pub const DEFAULT_IMAGE_SERVICE_URL: &str = "http://localhost:3000/";

/// Maximum number of connections per host in the HTTP client pool
pub const HTTP_POOL_MAX_IDLE_PER_HOST: usize = 16;

/// Team name the upstream uses for connected players who have not joined a team
pub const OBSERVER_TEAM_NAME: &str = "Unassigned";

/// Label drawn above the observer pool
pub const OBSERVERS_LABEL: &str = "Observers";

/// Message drawn when nobody is connected
pub const EMPTY_STATE_MESSAGE: &str = "No players online.";

/// Cache TTL and capacity defaults
pub mod cache {
    /// Freshness window for the status cache
    pub const STATUS_TTL_SECONDS: u64 = 30;

    /// Maximum number of distinct server filters kept in the status cache
    pub const STATUS_CAPACITY: usize = 100;

    /// Lifetime of a rendered snapshot addressed by a timestamp token
    pub const SNAPSHOT_TTL_SECONDS: u64 = 3600;

    /// Maximum number of rendered snapshots kept
    pub const SNAPSHOT_CAPACITY: usize = 500;

    /// `Cache-Control` for responses addressed by a timestamp token
    pub const IMMUTABLE_CACHE_CONTROL: &str = "public, max-age=31536000, immutable";

    /// `Cache-Control` for responses that always reflect the latest status
    pub const FRESH_CACHE_CONTROL: &str = "no-cache";
}

/// Scoreboard geometry
pub mod layout {
    /// Width of the rounded panel
    pub const PANEL_WIDTH: f32 = 726.0;

    /// Corner radius of the panel border
    pub const PANEL_RADIUS: f32 = 10.0;

    /// Corner radius of the header sub-panel's top corners
    pub const HEADER_RADIUS: f32 = 6.0;

    /// Inset of the header sub-panel from the panel border
    pub const HEADER_INSET: f32 = 2.0;

    /// Stroke width of the panel border and divider
    pub const BORDER_WIDTH: f32 = 2.0;

    /// Height of the header block holding map name and game type
    pub const HEADER_HEIGHT: f32 = 120.0;

    /// Space between the header divider and the top of the body blocks
    pub const BODY_TOP_MARGIN: f32 = 30.0;

    /// Distance from the top of a body block to the baseline of its label
    pub const BLOCK_BASELINE_OFFSET: f32 = 24.0;

    /// Height of the body shown when nobody is online
    pub const EMPTY_BODY_HEIGHT: f32 = 174.0;

    /// Baseline of the empty-state message, relative to the panel top
    pub const EMPTY_MESSAGE_BASELINE: f32 = 210.0;

    /// Baseline of the map name, relative to the panel top
    pub const TITLE_BASELINE: f32 = 54.0;

    /// Baseline of the game type, relative to the panel top
    pub const SUBTITLE_BASELINE: f32 = 84.0;

    /// Height reserved for a team-name or observers label line
    pub const LABEL_HEIGHT: f32 = 40.0;

    /// Height of one player row
    pub const ROW_HEIGHT: f32 = 36.0;

    /// Gap between the teams block and the observers block
    pub const BLOCK_GAP: f32 = 30.0;

    /// Space added to the canvas below each body block
    pub const BLOCK_TRAILING_GAP: f32 = 10.0;

    /// Extra canvas height added when both body blocks are present
    pub const STACKED_BLOCKS_EXTRA: f32 = 20.0;

    /// Outer gutter with two or more columns
    pub const GUTTER: f32 = 40.0;

    /// Outer gutter when a long player name needs the room
    pub const NARROW_GUTTER: f32 = 30.0;

    /// Outer gutter with a single column, which centers the roster
    pub const SINGLE_COLUMN_GUTTER: f32 = 220.0;

    /// Gap on each side of a column boundary
    pub const CENTER_GUTTER: f32 = 30.0;

    /// Column boundary gap when a long player name needs the room
    pub const NARROW_CENTER_GUTTER: f32 = 16.0;

    /// Player names measuring wider than this switch to the narrow gutters
    pub const PLAYER_NAME_WIDTH_LIMIT: f32 = 234.0;

    /// Default margin around the panel, top/right/bottom/left
    pub const DEFAULT_PADDING: [u32; 4] = [2, 2, 4, 72];

    /// Largest accepted padding on any side; bounds the canvas allocation
    pub const MAX_PADDING: u32 = 1000;
}

/// Raster output
pub mod image {
    /// Resolution written into the PNG, 2x a 72 DPI point grid
    pub const DPI: u32 = 144;

    /// Width and height of the font-test diagnostic image
    pub const FONT_TEST_SIZE: (u32, u32) = (800, 600);

    /// Sample line drawn by the font-test diagnostic
    pub const FONT_TEST_SAMPLE: &str = "Team combat at an epic scale!";

    /// Content type of every rendered image response
    pub const CONTENT_TYPE: &str = "image/png";
}
