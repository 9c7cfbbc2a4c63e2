//! Roster Model Builder: turns one raw upstream server record into a
//! [`Roster`] and derives the two-column player grid from it.

use regex::Regex;
use serde_json::{Map, Value};
use tracing::{debug, instrument, warn};

use crate::constants::OBSERVER_TEAM_NAME;
use crate::data_fetcher::models::{Player, Roster, ServerRecord, Team};
use crate::error::AppError;

/// Builds a [`Roster`] from one upstream server record.
///
/// The team literally named [`OBSERVER_TEAM_NAME`] becomes the observer
/// pool and never a game team. Players are sorted by score descending with
/// ties kept in server order, and the map name is HTML-entity decoded.
///
/// # Errors
/// `AppError::MalformedServerData` if the record lacks the expected
/// hostname/player-table shape.
pub fn build_roster(raw: &Value) -> Result<Roster, AppError> {
    let record: ServerRecord = serde_json::from_value(raw.clone())
        .map_err(|e| AppError::malformed(format!("Unexpected server record shape: {e}")))?;

    let mut game_teams = Vec::new();
    let mut observer_team = None;
    for (index, raw_team) in record.info_players.iter().enumerate() {
        let team = parse_team(raw_team, index)?;
        if team.name == OBSERVER_TEAM_NAME {
            if observer_team.is_some() {
                warn!("Server reported more than one observer team, keeping the first");
                continue;
            }
            observer_team = Some(team);
        } else {
            game_teams.push(team);
        }
    }

    let observer_count = observer_team.as_ref().map_or(0, |team| team.players.len());
    let team_players: usize = game_teams.iter().map(|team| team.players.len()).sum();
    let row_count = game_teams
        .iter()
        .map(|team| team.players.len())
        .max()
        .unwrap_or(0);

    let roster = Roster {
        map: html_escape::decode_html_entities(&record.info_map).into_owned(),
        game_type: record.info_maptype,
        game_teams,
        observer_team,
        player_count: team_players + observer_count,
        observer_count,
        row_count,
    };

    debug!(
        "Built roster for {}: map={}, teams={}, players={}, observers={}",
        record.info_hostname,
        roster.map,
        roster.game_teams.len(),
        roster.player_count,
        roster.observer_count
    );

    Ok(roster)
}

/// Picks the first record whose `info_hostname` matches `filter`.
///
/// A `None` filter matches any server, so the first record wins.
#[instrument(skip(records), fields(record_count = records.len()))]
pub fn select_server<'a>(records: &'a [Value], filter: Option<&str>) -> Result<&'a Value, AppError> {
    let regex = match filter {
        Some(pattern) => {
            Some(Regex::new(pattern).map_err(|e| AppError::invalid_filter(pattern, e))?)
        }
        None => None,
    };

    records
        .iter()
        .find(|record| {
            let Some(hostname) = record.get("info_hostname").and_then(Value::as_str) else {
                return false;
            };
            regex.as_ref().is_none_or(|regex| regex.is_match(hostname))
        })
        .ok_or_else(|| match filter {
            Some(pattern) => AppError::malformed(format!("No server matches '{pattern}'")),
            None => AppError::malformed("Server list is empty"),
        })
}

fn parse_team(raw: &Map<String, Value>, index: usize) -> Result<Team, AppError> {
    let name = match raw.get("name") {
        Some(Value::String(name)) => name.clone(),
        None | Some(Value::Null) => String::new(),
        Some(other) => {
            return Err(AppError::malformed(format!(
                "Team {index} has a non-string name: {other}"
            )));
        }
    };
    let score = parse_score(raw.get("score"))
        .ok_or_else(|| AppError::malformed(format!("Team '{name}' has a non-numeric score")))?;

    // Players live under numeric-string keys; the JSON map orders those
    // lexically, so "10" would sort before "2" without the numeric sort.
    let mut keyed: Vec<(u32, &Value)> = raw
        .iter()
        .filter_map(|(key, value)| key.parse::<u32>().ok().map(|slot| (slot, value)))
        .collect();
    keyed.sort_by_key(|(slot, _)| *slot);

    let mut players = keyed
        .into_iter()
        .map(|(slot, value)| parse_player(value, &name, slot))
        .collect::<Result<Vec<_>, _>>()?;
    players.sort_by(|a, b| b.score.cmp(&a.score));

    Ok(Team {
        name,
        score,
        players,
    })
}

fn parse_player(raw: &Value, team: &str, slot: u32) -> Result<Player, AppError> {
    let name = raw
        .get("name")
        .and_then(Value::as_str)
        .ok_or_else(|| AppError::malformed(format!("Player {slot} on team '{team}' has no name")))?;
    let score = parse_score(raw.get("score")).ok_or_else(|| {
        AppError::malformed(format!("Player '{name}' on team '{team}' has a non-numeric score"))
    })?;
    Ok(Player::new(name, score))
}

/// Scores arrive as numbers or numeric strings. A missing score counts as 0.
fn parse_score(raw: Option<&Value>) -> Option<i64> {
    match raw {
        None | Some(Value::Null) => Some(0),
        Some(Value::Number(number)) => number
            .as_i64()
            .or_else(|| number.as_f64().map(|f| f.round() as i64)),
        Some(Value::String(text)) if text.trim().is_empty() => Some(0),
        Some(Value::String(text)) => text.trim().parse().ok(),
        Some(_) => None,
    }
}

/// Rectangular view of a roster: one column per game team, plus observers
/// wrapped into rows of the same width.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerGrid<'a> {
    pub column_count: usize,
    /// `rows[i][j]` is the `i`th player of game team `j`, if it has one.
    pub rows: Vec<Vec<Option<&'a Player>>>,
    /// Observers chunked into groups of `column_count`, order preserved.
    pub observer_rows: Vec<Vec<&'a Player>>,
}

impl PlayerGrid<'_> {
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn observer_row_count(&self) -> usize {
        self.observer_rows.len()
    }
}

/// Derives the player grid for `roster`.
pub fn player_grid(roster: &Roster) -> PlayerGrid<'_> {
    let column_count = roster.game_teams.len().max(1);

    let rows = (0..roster.row_count)
        .map(|i| {
            roster
                .game_teams
                .iter()
                .map(|team| team.players.get(i))
                .collect()
        })
        .collect();

    let observer_rows = roster
        .observers()
        .chunks(column_count)
        .map(|chunk| chunk.iter().collect())
        .collect();

    PlayerGrid {
        column_count,
        rows,
        observer_rows,
    }
}
