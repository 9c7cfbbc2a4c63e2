//! Tribes 2 server scoreboard library
//!
//! Fetches a game server's status, lays the roster out as a scoreboard
//! panel and renders it to PNG. The HTTP server caches upstream fetches and
//! rendered snapshots; the xbar module formats the same data as a
//! status-bar menu.
//!
//! # Examples
//!
//! ```rust,no_run
//! use t2_scoreboard::data_fetcher::api::create_http_client;
//! use t2_scoreboard::data_fetcher::{HttpStatusSource, fetch_roster};
//! use t2_scoreboard::scoreboard::{FontRegistry, Padding, compute_layout, render_scoreboard};
//! use t2_scoreboard::{AppError, Config};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), AppError> {
//!     let config = Config::default();
//!     let client = create_http_client(None)?;
//!     let source = HttpStatusSource::new(client, &config.status_url);
//!
//!     let roster = fetch_roster(&source, Some("Discord PUB")).await?;
//!     let fonts = FontRegistry::load(&config.fonts);
//!     let plan = compute_layout(&roster, &Padding::default(), &fonts);
//!     let png = render_scoreboard(&roster, &plan, &fonts)?;
//!
//!     std::fs::write("scoreboard.png", png)?;
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod commands;
pub mod config;
pub mod constants;
pub mod data_fetcher;
pub mod error;
pub mod logging;
pub mod scoreboard;
pub mod server;
pub mod service;
pub mod testing_utils;
pub mod xbar;

// Re-export commonly used types for convenience
pub use config::Config;
pub use data_fetcher::cache::{CacheStats, CoalescingCache};
pub use data_fetcher::{Player, Roster, Team, build_roster, fetch_roster};
pub use error::AppError;
pub use scoreboard::{FontRegistry, LayoutPlan, Padding, compute_layout, render_scoreboard};
pub use service::ScoreboardService;

/// Current version of the library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
