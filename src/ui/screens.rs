use crate::models::{Song, StatisticsSnapshot};

use super::forms::SongForm;

/// State behind the song table at `/`.
pub(crate) struct SongListScreen {
    pub(crate) songs: Vec<Song>,
    pub(crate) selected: usize,
    pub(crate) loading: bool,
}

impl SongListScreen {
    /// Empty screen waiting for its first fetch.
    pub(crate) fn loading() -> Self {
        Self {
            songs: Vec::new(),
            selected: 0,
            loading: true,
        }
    }

    /// Replace the collection, keeping server order. Rows without an id cannot
    /// be edited or deleted, so they are dropped here.
    pub(crate) fn set_songs(&mut self, songs: Vec<Song>) {
        let total = songs.len();
        self.songs = songs.into_iter().filter(|s| s.id.is_some()).collect();
        if self.songs.len() != total {
            tracing::warn!(
                dropped = total - self.songs.len(),
                "ignoring songs returned without an id"
            );
        }
        self.loading = false;
        self.ensure_in_bounds();
    }

    pub(crate) fn current_song(&self) -> Option<&Song> {
        self.songs.get(self.selected)
    }

    pub(crate) fn move_selection(&mut self, offset: isize) {
        if self.songs.is_empty() {
            return;
        }
        let len = self.songs.len() as isize;
        let new = (self.selected as isize + offset).clamp(0, len - 1);
        self.selected = new as usize;
    }

    pub(crate) fn select_first(&mut self) {
        self.selected = 0;
    }

    pub(crate) fn select_last(&mut self) {
        self.selected = self.songs.len().saturating_sub(1);
    }

    pub(crate) fn ensure_in_bounds(&mut self) {
        if self.songs.is_empty() {
            self.selected = 0;
        } else if self.selected >= self.songs.len() {
            self.selected = self.songs.len() - 1;
        }
    }
}

/// State behind `/create` and `/edit/:id`.
pub(crate) struct SongEditorScreen {
    pub(crate) form: SongForm,
    /// Id taken from the route, if any.
    pub(crate) route_id: Option<String>,
    /// Set once the song behind `route_id` has been fetched. Submitting then
    /// updates instead of creating.
    pub(crate) edit_mode: bool,
    pub(crate) loading: bool,
    /// A create or update is waiting on the server.
    pub(crate) saving: bool,
}

impl SongEditorScreen {
    pub(crate) fn create() -> Self {
        Self {
            form: SongForm::default(),
            route_id: None,
            edit_mode: false,
            loading: false,
            saving: false,
        }
    }

    pub(crate) fn edit(id: String) -> Self {
        Self {
            form: SongForm::default(),
            route_id: Some(id),
            edit_mode: false,
            loading: true,
            saving: false,
        }
    }

    pub(crate) fn load_song(&mut self, song: &Song) {
        self.form = SongForm::from_song(song);
        self.edit_mode = true;
        self.loading = false;
    }

    /// The fetch failed: stay blank and in create mode.
    pub(crate) fn load_failed(&mut self) {
        self.loading = false;
        self.edit_mode = false;
    }

    /// Clear everything after a successful save.
    pub(crate) fn reset(&mut self) {
        self.form = SongForm::default();
        self.edit_mode = false;
        self.saving = false;
    }

    pub(crate) fn heading(&self) -> &'static str {
        if self.edit_mode {
            "Edit Song"
        } else {
            "Add Song"
        }
    }

    pub(crate) fn submit_label(&self) -> &'static str {
        if self.edit_mode {
            "Update Song"
        } else {
            "Add Song"
        }
    }
}

/// The three mutually exclusive states of the statistics view.
pub(crate) enum StatisticsState {
    Loading,
    Failed(String),
    Loaded(StatisticsSnapshot),
}

pub(crate) struct StatisticsScreen {
    pub(crate) state: StatisticsState,
    pub(crate) scroll: u16,
}

impl StatisticsScreen {
    pub(crate) fn loading() -> Self {
        Self {
            state: StatisticsState::Loading,
            scroll: 0,
        }
    }

    pub(crate) fn scroll_by(&mut self, delta: i32) {
        let max = self.max_scroll() as i32;
        self.scroll = (self.scroll as i32 + delta).clamp(0, max) as u16;
    }

    /// Longest breakdown list; scrolling past it would show only blank rows.
    fn max_scroll(&self) -> u16 {
        match &self.state {
            StatisticsState::Loaded(snapshot) => snapshot
                .songs_by_genre
                .len()
                .max(snapshot.songs_by_album.len())
                .max(snapshot.songs_and_albums_by_artist.len())
                .saturating_sub(1) as u16,
            _ => 0,
        }
    }
}
