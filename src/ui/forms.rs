use anyhow::{anyhow, Result};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};

use crate::models::Song;

/// Form state shared by the full-screen editor and the inline add panel.
#[derive(Default, Clone, Debug)]
pub(crate) struct SongForm {
    pub(crate) title: String,
    pub(crate) artist: String,
    pub(crate) album: String,
    pub(crate) genre: String,
    pub(crate) active: SongField,
    pub(crate) error: Option<String>,
}

/// Enumerates the fields within the song form to drive focus management.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub(crate) enum SongField {
    #[default]
    Title,
    Artist,
    Album,
    Genre,
}

impl SongField {
    pub(crate) const ALL: [SongField; 4] = [
        SongField::Title,
        SongField::Artist,
        SongField::Album,
        SongField::Genre,
    ];

    pub(crate) fn label(self) -> &'static str {
        match self {
            SongField::Title => "Title",
            SongField::Artist => "Artist",
            SongField::Album => "Album",
            SongField::Genre => "Genre",
        }
    }

    pub(crate) fn required(self) -> bool {
        matches!(self, SongField::Title | SongField::Artist)
    }

    fn index(self) -> usize {
        match self {
            SongField::Title => 0,
            SongField::Artist => 1,
            SongField::Album => 2,
            SongField::Genre => 3,
        }
    }
}

impl SongForm {
    /// Populate the form from an existing song when entering edit mode.
    pub(crate) fn from_song(song: &Song) -> Self {
        Self {
            title: song.title.clone(),
            artist: song.artist.clone(),
            album: song.album().to_string(),
            genre: song.genre().to_string(),
            active: SongField::Title,
            error: None,
        }
    }

    /// Cycle focus forward across the four fields.
    pub(crate) fn next_field(&mut self) {
        self.active = SongField::ALL[(self.active.index() + 1) % SongField::ALL.len()];
    }

    pub(crate) fn previous_field(&mut self) {
        let len = SongField::ALL.len();
        self.active = SongField::ALL[(self.active.index() + len - 1) % len];
    }

    /// Insert a character into the active field.
    pub(crate) fn push_char(&mut self, ch: char) -> bool {
        if ch.is_control() {
            return false;
        }
        self.value_mut(self.active).push(ch);
        self.error = None;
        true
    }

    /// Remove a character from the active field.
    pub(crate) fn backspace(&mut self) {
        self.value_mut(self.active).pop();
    }

    /// Required-field check. Produces the song to send, with the text exactly
    /// as typed; nothing is sent when this fails.
    pub(crate) fn to_song(&self) -> Result<Song> {
        if self.title.trim().is_empty() {
            return Err(anyhow!("Title is required."));
        }
        if self.artist.trim().is_empty() {
            return Err(anyhow!("Artist is required."));
        }
        Ok(Song::new(
            self.title.as_str(),
            self.artist.as_str(),
            Some(self.album.as_str()),
            Some(self.genre.as_str()),
        ))
    }

    /// Move focus to the first required field that is still blank.
    pub(crate) fn focus_first_missing(&mut self) {
        if let Some(field) = SongField::ALL
            .into_iter()
            .find(|field| field.required() && self.value(*field).trim().is_empty())
        {
            self.active = field;
        }
    }

    pub(crate) fn value(&self, field: SongField) -> &str {
        match field {
            SongField::Title => &self.title,
            SongField::Artist => &self.artist,
            SongField::Album => &self.album,
            SongField::Genre => &self.genre,
        }
    }

    fn value_mut(&mut self, field: SongField) -> &mut String {
        match field {
            SongField::Title => &mut self.title,
            SongField::Artist => &mut self.artist,
            SongField::Album => &mut self.album,
            SongField::Genre => &mut self.genre,
        }
    }

    /// Render one field as `Label: value`, greying out empty placeholders.
    pub(crate) fn build_line(&self, field: SongField) -> Line<'static> {
        let value = self.value(field);
        let is_active = self.active == field;

        let display = if value.is_empty() {
            if field.required() {
                "<required>".to_string()
            } else {
                "<optional>".to_string()
            }
        } else {
            value.to_string()
        };

        let style = if is_active {
            Style::default().fg(Color::Yellow)
        } else if value.is_empty() {
            Style::default().fg(Color::DarkGray)
        } else {
            Style::default()
        };

        Line::from(vec![
            Span::raw(format!("{}: ", field.label())),
            Span::styled(display, style),
        ])
    }

    /// Cursor column offset for the active field, relative to the line start.
    pub(crate) fn cursor_offset(&self) -> u16 {
        let prefix = self.active.label().len() + 2;
        (prefix + self.value(self.active).chars().count()) as u16
    }

    pub(crate) fn active_row(&self) -> u16 {
        self.active.index() as u16
    }
}

/// State for confirming permanent song deletion.
pub(crate) struct ConfirmSongDelete {
    pub(crate) id: String,
    pub(crate) song: Song,
}

/// Path typed into the `:` prompt.
#[derive(Default)]
pub(crate) struct PathPrompt {
    pub(crate) path: String,
}
