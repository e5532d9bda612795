//! Domain models exchanged with the song API and passed throughout the TUI.
//! These stay plain data holders; the API layer owns the wire details and the
//! UI layer owns presentation.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
/// A song record as served by the API.
pub struct Song {
    /// Identifier assigned by the API. Absent until the song is first
    /// persisted; the server names the field `_id`.
    #[serde(
        rename = "_id",
        alias = "id",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<String>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub artist: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub album: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub genre: Option<String>,
}

impl Song {
    /// Build an unsaved song. Blank optional fields collapse to `None`.
    pub fn new(
        title: impl Into<String>,
        artist: impl Into<String>,
        album: Option<&str>,
        genre: Option<&str>,
    ) -> Self {
        Self {
            id: None,
            title: title.into(),
            artist: artist.into(),
            album: non_blank(album),
            genre: non_blank(genre),
        }
    }

    pub fn album(&self) -> &str {
        self.album.as_deref().unwrap_or("")
    }

    pub fn genre(&self) -> &str {
        self.genre.as_deref().unwrap_or("")
    }

    /// Body sent on create and update. All four fields are always present so an
    /// update replaces cleared optional fields instead of leaving them behind.
    pub fn payload(&self) -> SongPayload<'_> {
        SongPayload {
            title: &self.title,
            artist: &self.artist,
            album: self.album(),
            genre: self.genre(),
        }
    }
}

impl fmt::Display for Song {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.title, self.artist)
    }
}

/// Request body for create and update calls. Never carries the id.
#[derive(Debug, Serialize)]
pub struct SongPayload<'a> {
    pub title: &'a str,
    pub artist: &'a str,
    pub album: &'a str,
    pub genre: &'a str,
}

/// Server-computed aggregate over every song. The client only renders it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatisticsSnapshot {
    pub total_songs: u64,
    pub total_artists: u64,
    pub total_albums: u64,
    pub total_genres: u64,
    #[serde(default)]
    pub songs_by_genre: Vec<GroupCount>,
    #[serde(default)]
    pub songs_by_album: Vec<GroupCount>,
    #[serde(default)]
    pub songs_and_albums_by_artist: Vec<ArtistBreakdown>,
}

/// One bucket of a grouped count. The key is `null` when the server grouped
/// songs that lack the field.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GroupCount {
    #[serde(rename = "_id", default)]
    pub key: Option<String>,
    pub count: u64,
}

impl GroupCount {
    pub fn label(&self) -> &str {
        match self.key.as_deref() {
            Some(key) if !key.trim().is_empty() => key,
            _ => "Unknown",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ArtistBreakdown {
    pub artist: String,
    pub songs: u64,
    pub albums: u64,
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .filter(|v| !v.trim().is_empty())
        .map(str::to_string)
}
