//! Backend data shapes

use chrono::{DateTime, Datelike};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cover {
    pub id: i64,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Platform {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Game {
    pub id: i64,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover: Option<Cover>,
    /// Unix timestamp, seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_release_date: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platforms: Option<Vec<Platform>>,
}

impl Game {
    pub fn release_year(&self) -> Option<i32> {
        self.first_release_date
            .and_then(|ts| DateTime::from_timestamp(ts, 0))
            .map(|dt| dt.year())
    }

    pub fn cover_url(&self) -> Option<&str> {
        self.cover.as_ref().map(|c| c.url.as_str())
    }
}

/// One of the five per-user backlog categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BacklogList {
    #[serde(rename = "wantToPlay")]
    WantToPlay,
    #[serde(rename = "playing")]
    Playing,
    #[serde(rename = "played")]
    Played,
    #[serde(rename = "completed")]
    Completed,
    #[serde(rename = "completed100")]
    Completed100,
}

impl BacklogList {
    pub const ALL: [BacklogList; 5] = [
        BacklogList::WantToPlay,
        BacklogList::Playing,
        BacklogList::Played,
        BacklogList::Completed,
        BacklogList::Completed100,
    ];

    /// Name the backend expects in `listName`.
    pub fn as_str(&self) -> &'static str {
        match self {
            BacklogList::WantToPlay => "wantToPlay",
            BacklogList::Playing => "playing",
            BacklogList::Played => "played",
            BacklogList::Completed => "completed",
            BacklogList::Completed100 => "completed100",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            BacklogList::WantToPlay => "Want to play",
            BacklogList::Playing => "Playing",
            BacklogList::Played => "Played",
            BacklogList::Completed => "Completed",
            BacklogList::Completed100 => "Completed 100%",
        }
    }
}

impl std::fmt::Display for BacklogList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for BacklogList {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace(['-', '_', '%'], "").as_str() {
            "wanttoplay" => Ok(BacklogList::WantToPlay),
            "playing" => Ok(BacklogList::Playing),
            "played" => Ok(BacklogList::Played),
            "completed" => Ok(BacklogList::Completed),
            "completed100" => Ok(BacklogList::Completed100),
            _ => Err(format!("Unknown backlog list: {}", s)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    pub username: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub age: u32,
    #[serde(default)]
    pub is_admin: bool,
    #[serde(default)]
    pub backlog_want_to_play: Vec<Game>,
    #[serde(default)]
    pub backlog_playing: Vec<Game>,
    #[serde(default)]
    pub backlog_played: Vec<Game>,
    #[serde(default)]
    pub backlog_completed: Vec<Game>,
    #[serde(default)]
    pub backlog_completed100: Vec<Game>,
}

impl User {
    pub fn backlog(&self, list: BacklogList) -> &[Game] {
        match list {
            BacklogList::WantToPlay => &self.backlog_want_to_play,
            BacklogList::Playing => &self.backlog_playing,
            BacklogList::Played => &self.backlog_played,
            BacklogList::Completed => &self.backlog_completed,
            BacklogList::Completed100 => &self.backlog_completed100,
        }
    }

    /// Which list holds `game_id`, if any.
    pub fn list_containing(&self, game_id: i64) -> Option<BacklogList> {
        BacklogList::ALL
            .into_iter()
            .find(|list| self.backlog(*list).iter().any(|g| g.id == game_id))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserWithGames {
    pub user: User,
    #[serde(default)]
    pub games: Vec<Game>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewRequest {
    pub user_id: i64,
    pub game_id: i64,
    pub rating: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewResponse {
    pub rating: u8,
    #[serde(default)]
    pub comment: Option<String>,
}
