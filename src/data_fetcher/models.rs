//! Roster data structures shared by the layout engine, the renderer and the
//! xbar formatter.

use serde::{Deserialize, Serialize};

/// A connected player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub name: String,
    pub score: i64,
}

impl Player {
    pub fn new(name: impl Into<String>, score: i64) -> Self {
        Self {
            name: name.into(),
            score,
        }
    }
}

/// A team as reported by the server, with players sorted by score.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    /// Team name. May be empty on free-for-all game types.
    pub name: String,
    pub score: i64,
    /// Players ordered by score descending, ties in server-reported order.
    pub players: Vec<Player>,
}

impl Team {
    /// Team name for menus, where an unnamed team still needs a heading.
    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            "Players"
        } else {
            &self.name
        }
    }
}

/// Normalized snapshot of one game server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Roster {
    /// Map name, already entity-decoded.
    pub map: String,
    /// Game type label such as "CTF" or "LakRabbit".
    pub game_type: String,
    /// Scoring teams in server order. Never contains the observer pool.
    pub game_teams: Vec<Team>,
    /// Connected players who have not joined a team.
    pub observer_team: Option<Team>,
    pub player_count: usize,
    pub observer_count: usize,
    /// Largest player count across game teams.
    pub row_count: usize,
}

impl Roster {
    /// Whether anybody, player or observer, is connected.
    pub fn has_players(&self) -> bool {
        self.player_count > 0
    }

    /// Whether any game team has at least one player.
    pub fn has_team_players(&self) -> bool {
        self.row_count > 0
    }

    /// Observer players, empty when there is no observer pool.
    pub fn observers(&self) -> &[Player] {
        self.observer_team
            .as_ref()
            .map(|team| team.players.as_slice())
            .unwrap_or_default()
    }

    /// Per-team player counts in game team order.
    pub fn team_player_counts(&self) -> Vec<usize> {
        self.game_teams.iter().map(|team| team.players.len()).collect()
    }

    /// Every player name, game teams first, then observers.
    pub fn all_player_names(&self) -> impl Iterator<Item = &str> {
        self.game_teams
            .iter()
            .flat_map(|team| team.players.iter())
            .chain(self.observers().iter())
            .map(|player| player.name.as_str())
    }
}

/// One server record from the upstream status list. Only the fields the
/// scoreboard reads are modelled; the player table is kept as raw JSON
/// because its player entries live under numeric-string keys.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerRecord {
    pub info_hostname: String,
    #[serde(default)]
    pub info_map: String,
    #[serde(default)]
    pub info_maptype: String,
    pub info_players: Vec<serde_json::Map<String, serde_json::Value>>,
}
