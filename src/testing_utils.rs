use serde_json::{Value, json};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::constants::OBSERVER_TEAM_NAME;
use crate::data_fetcher::StatusSource;
use crate::data_fetcher::models::{Player, Roster, Team};
use crate::error::AppError;
use crate::scoreboard::fonts::{FontSpec, TextMeasure};

/// Test utilities for creating rosters and upstream records
pub struct TestDataBuilder;

impl TestDataBuilder {
    /// Creates a team with players given as `(name, score)`, sorted the way
    /// the roster builder sorts them
    pub fn team(name: &str, players: &[(&str, i64)]) -> Team {
        let mut players: Vec<Player> = players
            .iter()
            .map(|(name, score)| Player::new(*name, *score))
            .collect();
        players.sort_by(|a, b| b.score.cmp(&a.score));
        Team {
            name: name.to_string(),
            score: players.iter().map(|p| p.score).sum(),
            players,
        }
    }

    /// Creates a roster from game teams and observer `(name, score)` pairs
    pub fn roster(game_teams: Vec<Team>, observers: Vec<(&str, i64)>) -> Roster {
        let observer_team = (!observers.is_empty())
            .then(|| Self::team(OBSERVER_TEAM_NAME, &observers));
        let observer_count = observers.len();
        let team_players: usize = game_teams.iter().map(|t| t.players.len()).sum();
        let row_count = game_teams.iter().map(|t| t.players.len()).max().unwrap_or(0);
        Roster {
            map: "Broadside".to_string(),
            game_type: "Capture the Flag".to_string(),
            game_teams,
            observer_team,
            player_count: team_players + observer_count,
            observer_count,
            row_count,
        }
    }

    /// Creates the usual two-team CTF roster with three and two players
    pub fn two_team_roster() -> Roster {
        Self::roster(
            vec![
                Self::team("Storm", &[("Blaze", 30), ("Pyro", 12), ("Ash", 4)]),
                Self::team("Inferno", &[("Frost", 25), ("Chill", 9)]),
            ],
            vec![],
        )
    }

    /// Creates one upstream server record in the status list format
    pub fn server_record(hostname: &str, map: &str, teams: &[(&str, i64, &[(&str, i64)])]) -> Value {
        let info_players: Vec<Value> = teams
            .iter()
            .map(|(name, score, players)| {
                let mut team = json!({ "name": name, "score": score });
                for (slot, (player, player_score)) in players.iter().enumerate() {
                    team[slot.to_string()] = json!({ "name": player, "score": player_score });
                }
                team
            })
            .collect();
        json!({
            "info_hostname": hostname,
            "info_map": map,
            "info_maptype": "CTF",
            "info_players": info_players,
        })
    }
}

/// Text measurement where every character advances by a fixed amount,
/// regardless of font.
#[derive(Debug, Clone, Copy)]
pub struct FixedAdvance(pub f32);

impl TextMeasure for FixedAdvance {
    fn measure_text_width(&self, text: &str, _font: &FontSpec) -> f32 {
        text.chars().count() as f32 * self.0
    }
}

/// In-memory status source that counts fetches. Clones share state, so a
/// test can swap the records after handing the source to a service.
#[derive(Clone, Default)]
pub struct MockStatusSource {
    records: Arc<Mutex<Vec<Value>>>,
    failing: Arc<Mutex<bool>>,
    fetches: Arc<AtomicUsize>,
    delay: Option<Duration>,
}

impl MockStatusSource {
    pub fn new(records: Vec<Value>) -> Self {
        Self {
            records: Arc::new(Mutex::new(records)),
            ..Self::default()
        }
    }

    /// Makes every fetch take `delay`, so concurrent callers overlap
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn set_records(&self, records: Vec<Value>) {
        *self.records.lock().unwrap_or_else(|e| e.into_inner()) = records;
    }

    /// Makes subsequent fetches fail until turned off again
    pub fn set_failing(&self, failing: bool) {
        *self.failing.lock().unwrap_or_else(|e| e.into_inner()) = failing;
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

impl StatusSource for MockStatusSource {
    async fn fetch_servers(&self) -> Result<Vec<Value>, AppError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if *self.failing.lock().unwrap_or_else(|e| e.into_inner()) {
            return Err(AppError::upstream_status(503, "Service Unavailable", "mock://status"));
        }
        Ok(self.records.lock().unwrap_or_else(|e| e.into_inner()).clone())
    }
}
