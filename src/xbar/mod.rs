//! xbar (formerly BitBar) menu output for the macOS status bar.
//!
//! Each refresh prints a menu description: the first line is the tray
//! title, `---` separates sections, and `--` prefixes submenu items.

pub mod plugin;

use reqwest::Client;
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;
use tracing::{error, info, instrument};

use crate::config::Config;
use crate::constants::OBSERVERS_LABEL;
use crate::data_fetcher::{HttpStatusSource, Player, Roster, fetch_roster, player_grid};
use crate::error::AppError;

/// Tray icon, a template image so macOS tints it for light and dark bars.
pub const TRAY_ICON: &str = "iVBORw0KGgoAAAANSUhEUgAAABsAAAAgCAQAAABJYMuwAAAACXBIWXMAABYlAAAWJQFJUiTwAAAA20lEQVQ4y+2TsQ2CUBRFT1zABdSEEWgojaFjAYagZRQ6doAZaB3BgsbQwQKEkGfBQwh+QOw0Xhruve+E8D5Arx0RBQ5mORRE7F6LGEGoCQxQQI0gxNMiRJ7Xq4YuHMc2jcYlvgHzKbVvsIf4qmHOYebdjuQ6c+2jswZ3TszrxF3nzl2QqvVYlqdzKYBFiyAkrKt7QIs17NB9A3OHfSZ6u38D2+tsArfRqZjOztTeoPoAq9CFbMNac7yGCZPBeWziPsTM3/pSsvCL/DJ2UX/ZhmXqs22YzPg/9tXYAxsnW9qVI5jgAAAAAElFTkSuQmCC";

pub const ERROR_MESSAGE: &str = "Error refreshing server info.";

const TABLE_FONT: &str = "Menlo";
const TABLE_FONT_SIZE: u32 = 11;
const COLUMN_SEPARATOR: &str = "    ";
const PLAYER_COLOR: &str = "#888888";

/// How the teams are presented in the dropdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum DisplayMode {
    /// The rendered scoreboard image from the image service
    #[default]
    Image,
    /// Monospace table with one column per team
    Table,
    /// One submenu per team
    Submenu,
}

impl FromStr for DisplayMode {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "image" => Ok(DisplayMode::Image),
            "table" => Ok(DisplayMode::Table),
            "submenu" => Ok(DisplayMode::Submenu),
            other => Err(AppError::config_error(format!(
                "Unknown display mode '{other}', expected image, table or submenu"
            ))),
        }
    }
}

/// Options for one menu refresh.
#[derive(Debug, Clone, Default)]
pub struct XbarOptions {
    pub dark_mode: bool,
    pub server_name: Option<String>,
    pub display_mode: DisplayMode,
}

impl XbarOptions {
    /// Reads the variables xbar passes to plugins: `XBARDarkMode`,
    /// `VAR_SERVER_NAME` and `VAR_DISPLAY_MODE`.
    pub fn from_env() -> Self {
        let display_mode = std::env::var("VAR_DISPLAY_MODE")
            .ok()
            .filter(|mode| !mode.is_empty())
            .and_then(|mode| mode.parse().ok())
            .unwrap_or_default();
        XbarOptions {
            dark_mode: std::env::var("XBARDarkMode").is_ok_and(|v| v == "true"),
            server_name: std::env::var("VAR_SERVER_NAME").ok().filter(|s| !s.is_empty()),
            display_mode,
        }
    }

    fn normal_color(&self) -> &'static str {
        if self.dark_mode { "#aaaaaa" } else { "#666666" }
    }
}

/// One menu line and its nested submenu.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MenuItem {
    pub text: String,
    pub color: Option<&'static str>,
    pub font: Option<&'static str>,
    pub size: Option<u32>,
    pub image: Option<String>,
    pub template_image: Option<&'static str>,
    pub trim: Option<bool>,
    pub refresh: bool,
    pub submenu: Vec<MenuItem>,
}

impl MenuItem {
    pub fn new(text: impl Into<String>) -> Self {
        MenuItem {
            text: text.into(),
            ..MenuItem::default()
        }
    }

    pub fn color(mut self, color: &'static str) -> Self {
        self.color = Some(color);
        self
    }

    fn monospace(mut self) -> Self {
        self.font = Some(TABLE_FONT);
        self.size = Some(TABLE_FONT_SIZE);
        self
    }

    fn write(&self, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
        let mut params = Vec::new();
        if let Some(color) = self.color {
            params.push(format!("color={color}"));
        }
        if let Some(font) = self.font {
            params.push(format!("font={font}"));
        }
        if let Some(size) = self.size {
            params.push(format!("size={size}"));
        }
        if let Some(image) = &self.image {
            params.push(format!("image={image}"));
        }
        if let Some(template_image) = self.template_image {
            params.push(format!("templateImage={template_image}"));
        }
        if let Some(trim) = self.trim {
            params.push(format!("trim={trim}"));
        }
        if self.refresh {
            params.push("refresh=true".to_string());
        }

        write!(f, "{}{}", "--".repeat(depth), self.text)?;
        if !params.is_empty() {
            write!(f, " | {}", params.join(" "))?;
        }
        writeln!(f)?;
        for item in &self.submenu {
            item.write(f, depth + 1)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum MenuLine {
    Item(MenuItem),
    Separator,
}

impl From<MenuItem> for MenuLine {
    fn from(item: MenuItem) -> Self {
        MenuLine::Item(item)
    }
}

/// A complete plugin output.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Menu(pub Vec<MenuLine>);

impl fmt::Display for Menu {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in &self.0 {
            match line {
                MenuLine::Item(item) => item.write(f, 0)?,
                MenuLine::Separator => writeln!(f, "---")?,
            }
        }
        Ok(())
    }
}

/// xbar has no escaping mechanism, so the parameter delimiter is replaced.
pub fn sanitize_name(name: &str) -> String {
    name.replace('|', "│")
}

fn tray_item(player_count: usize) -> MenuItem {
    MenuItem {
        text: if player_count > 0 {
            format!(" {player_count}")
        } else {
            String::new()
        },
        template_image: Some(TRAY_ICON),
        trim: Some(false),
        ..MenuItem::default()
    }
}

/// Menu shown when the server info could not be fetched.
pub fn error_menu() -> Menu {
    Menu(vec![
        tray_item(0).into(),
        MenuLine::Separator,
        MenuItem::new(ERROR_MESSAGE).into(),
    ])
}

/// Menu showing a pre-rendered scoreboard image.
pub fn image_menu(player_count: usize, image_base64: String) -> Menu {
    Menu(vec![
        tray_item(player_count).into(),
        MenuLine::Separator,
        MenuItem {
            image: Some(image_base64),
            refresh: true,
            ..MenuItem::default()
        }
        .into(),
    ])
}

/// Text menu for `roster` in table or submenu form.
pub fn roster_menu(roster: &Roster, options: &XbarOptions) -> Menu {
    let normal_color = options.normal_color();
    let player_count = roster.player_count;

    let mut lines: Vec<MenuLine> = vec![
        tray_item(player_count).into(),
        MenuLine::Separator,
        MenuItem::new(sanitize_name(&format!("{} ({})", roster.map, roster.game_type)))
            .color(normal_color)
            .into(),
    ];

    let count_text = match player_count {
        0 => "No players online".to_string(),
        1 => "1 player online".to_string(),
        n => format!("{n} players online"),
    };
    let mut count_line = MenuItem::new(count_text);
    if player_count > 0 {
        count_line = count_line.color(normal_color);
    }
    lines.push(count_line.into());

    match options.display_mode {
        DisplayMode::Submenu => lines.extend(submenu_lines(roster)),
        DisplayMode::Table | DisplayMode::Image => lines.extend(table_lines(roster, normal_color)),
    }

    Menu(lines)
}

fn player_submenu(team_name: &str, players: &[Player]) -> MenuLine {
    MenuItem {
        submenu: players
            .iter()
            .map(|player| MenuItem::new(sanitize_name(&player.name)).color(PLAYER_COLOR))
            .collect(),
        ..MenuItem::new(sanitize_name(team_name))
    }
    .into()
}

fn submenu_lines(roster: &Roster) -> Vec<MenuLine> {
    let mut lines: Vec<MenuLine> = roster
        .game_teams
        .iter()
        .map(|team| player_submenu(team.display_name(), &team.players))
        .collect();
    if roster.observer_count > 0 {
        lines.push(player_submenu(OBSERVERS_LABEL, roster.observers()));
    }
    lines
}

fn pad_end(text: &str, width: usize) -> String {
    let len = text.chars().count();
    format!("{text}{}", " ".repeat(width.saturating_sub(len)))
}

fn table_lines(roster: &Roster, normal_color: &'static str) -> Vec<MenuLine> {
    let mut lines = Vec::new();
    let grid = player_grid(roster);

    if grid.row_count() > 0 {
        let column_widths: Vec<usize> = roster
            .game_teams
            .iter()
            .map(|team| {
                team.players
                    .iter()
                    .map(|player| player.name.chars().count())
                    .chain([team.display_name().chars().count()])
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        let header = roster
            .game_teams
            .iter()
            .zip(&column_widths)
            .map(|(team, width)| pad_end(&sanitize_name(team.display_name()), *width))
            .collect::<Vec<_>>()
            .join(COLUMN_SEPARATOR);
        lines.push(MenuLine::Separator);
        lines.push(MenuItem::new(header).monospace().color(normal_color).into());
        lines.push(MenuLine::Separator);

        for row in &grid.rows {
            let text = row
                .iter()
                .zip(&column_widths)
                .map(|(cell, width)| {
                    let name = cell.map(|player| sanitize_name(&player.name)).unwrap_or_default();
                    pad_end(&name, *width)
                })
                .collect::<Vec<_>>()
                .join(COLUMN_SEPARATOR);
            let mut item = MenuItem::new(text).monospace().color(PLAYER_COLOR);
            item.trim = Some(false);
            lines.push(item.into());
        }
    }

    if roster.observer_count > 0 {
        lines.push(MenuLine::Separator);
        lines.push(
            MenuItem::new(OBSERVERS_LABEL)
                .monospace()
                .color(normal_color)
                .into(),
        );
        lines.push(MenuLine::Separator);
        lines.extend(roster.observers().iter().map(|player| {
            MenuItem::new(sanitize_name(&player.name))
                .monospace()
                .color(PLAYER_COLOR)
                .into()
        }));
    }

    lines
}

/// The part of the image service's JSON response the menu needs.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageServiceResponse {
    pub player_count: usize,
    pub image: String,
}

/// Asks the image service for the rendered scoreboard as JSON.
#[instrument(skip(client))]
pub async fn fetch_server_image(
    client: &Client,
    service_url: &str,
    server_name: Option<&str>,
) -> Result<ImageServiceResponse, AppError> {
    let mut request = client
        .get(service_url)
        .header(reqwest::header::ACCEPT, "application/json");
    if let Some(server_name) = server_name {
        request = request.query(&[("serverName", server_name)]);
    }
    let response = request.send().await?;
    let status = response.status();
    if !status.is_success() {
        let reason = status.canonical_reason().unwrap_or("Unknown error");
        return Err(AppError::upstream_status(status.as_u16(), reason, service_url));
    }
    let body = response.text().await?;
    Ok(serde_json::from_str(&body)?)
}

/// Produces one menu refresh. Failures are logged and rendered as the
/// error menu, never returned.
pub async fn build_menu(client: &Client, config: &Config, options: &XbarOptions) -> Menu {
    let server_name = options
        .server_name
        .as_deref()
        .or(config.default_server_name.as_deref());

    let result = match options.display_mode {
        DisplayMode::Image => {
            fetch_server_image(client, &config.image_service_url, server_name)
                .await
                .map(|response| image_menu(response.player_count, response.image))
        }
        DisplayMode::Table | DisplayMode::Submenu => {
            let source = HttpStatusSource::new(client.clone(), &config.status_url);
            fetch_roster(&source, server_name)
                .await
                .map(|roster| roster_menu(&roster, options))
        }
    };

    match result {
        Ok(menu) => {
            info!("Built {:?} menu", options.display_mode);
            menu
        }
        Err(e) => {
            error!("Failed to refresh server info: {e}");
            error_menu()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing_utils::TestDataBuilder;

    fn options(display_mode: DisplayMode) -> XbarOptions {
        XbarOptions {
            dark_mode: true,
            server_name: None,
            display_mode,
        }
    }

    #[test]
    fn test_error_menu() {
        let text = error_menu().to_string();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with(" | templateImage="));
        assert!(lines[0].ends_with("trim=false"));
        assert_eq!(lines[1], "---");
        assert_eq!(lines[2], ERROR_MESSAGE);
    }

    #[test]
    fn test_image_menu_shows_count_and_image() {
        let text = image_menu(5, "QUJD".to_string()).to_string();
        let lines: Vec<&str> = text.lines().collect();
        assert!(lines[0].starts_with(" 5 | templateImage="));
        assert_eq!(lines[2], " | image=QUJD refresh=true");
    }

    #[test]
    fn test_table_menu() {
        let roster = TestDataBuilder::roster(
            vec![
                TestDataBuilder::team("Storm", &[("Blaze", 30), ("Pyro|X", 12)]),
                TestDataBuilder::team("Inferno", &[("Frost", 25)]),
            ],
            vec![("watcher", 0)],
        );
        let text = roster_menu(&roster, &options(DisplayMode::Table)).to_string();
        let lines: Vec<&str> = text.lines().collect();

        assert!(lines[0].starts_with(" 4 | "));
        assert_eq!(lines[2], "Broadside (Capture the Flag) | color=#aaaaaa");
        assert_eq!(lines[3], "4 players online | color=#aaaaaa");
        assert_eq!(lines[5], "Storm     Inferno | color=#aaaaaa font=Menlo size=11");
        assert_eq!(
            lines[7],
            "Blaze     Frost   | color=#888888 font=Menlo size=11 trim=false"
        );
        assert_eq!(
            lines[8],
            "Pyro│X            | color=#888888 font=Menlo size=11 trim=false"
        );
        assert_eq!(lines[10], "Observers | color=#aaaaaa font=Menlo size=11");
        assert_eq!(lines[12], "watcher | color=#888888 font=Menlo size=11");
    }

    #[test]
    fn test_submenu_menu() {
        let roster = TestDataBuilder::roster(
            vec![TestDataBuilder::team("", &[("solo", 3)])],
            vec![("watcher", 0)],
        );
        let mut opts = options(DisplayMode::Submenu);
        opts.dark_mode = false;
        let text = roster_menu(&roster, &opts).to_string();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[3], "2 players online | color=#666666");
        assert_eq!(lines[4], "Players");
        assert_eq!(lines[5], "--solo | color=#888888");
        assert_eq!(lines[6], "Observers");
        assert_eq!(lines[7], "--watcher | color=#888888");
    }

    #[test]
    fn test_empty_server_menu() {
        let roster = TestDataBuilder::roster(vec![], vec![]);
        let text = roster_menu(&roster, &options(DisplayMode::Table)).to_string();
        let lines: Vec<&str> = text.lines().collect();
        assert!(lines[0].starts_with(" | templateImage="));
        assert_eq!(lines[3], "No players online");
        assert_eq!(lines.len(), 4);
    }

    #[test]
    fn test_display_mode_parse() {
        assert_eq!("Table".parse::<DisplayMode>().unwrap(), DisplayMode::Table);
        assert!("grid".parse::<DisplayMode>().is_err());
    }
}
