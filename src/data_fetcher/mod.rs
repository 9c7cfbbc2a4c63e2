pub mod api;
pub mod cache;
pub mod models;
pub mod roster;

pub use api::{HttpStatusSource, StatusSource, fetch_roster};
pub use models::{Player, Roster, ServerRecord, Team};
pub use roster::{PlayerGrid, build_roster, player_grid, select_server};
