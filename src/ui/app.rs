use std::mem;
use std::time::{Duration, Instant};

use crossterm::event::KeyCode;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::prelude::*;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Row, Table, TableState, Wrap};
use ratatui::Frame;

use crate::api::{ApiRequest, ApiResponse, ApiWorker, Completion, SongApi, Ticket};
use crate::models::StatisticsSnapshot;

use super::forms::{ConfirmSongDelete, PathPrompt, SongField, SongForm};
use super::helpers::{centered_rect, surface_error};
use super::router::Route;
use super::screens::{
    SongEditorScreen, SongListScreen, StatisticsScreen, StatisticsState,
};
use super::shell;

/// How long a notice stays in the footer.
const NOTICE_TTL: Duration = Duration::from_secs(4);
/// Rows taken by the inline add panel above the song table.
const INLINE_FORM_HEIGHT: u16 = 8;
/// Height of each total card on the statistics screen.
const STAT_CARD_HEIGHT: u16 = 3;

/// The view selected by the current route. `Unmatched` renders nothing.
enum Screen {
    SongList(SongListScreen),
    SongEditor(SongEditorScreen),
    Statistics(StatisticsScreen),
    Unmatched,
}

/// Overlays and inline panels scoped to the current screen.
enum Mode {
    Normal,
    InlineAdd(SongForm),
    ConfirmDelete(ConfirmSongDelete),
    PathPrompt(PathPrompt),
}

/// Fetch that fills the current screen. Its completion is applied only while
/// its ticket is still the one recorded on the app.
#[derive(Debug, PartialEq, Eq)]
enum PendingLoad {
    Songs,
    Song(String),
    Statistics,
}

impl PendingLoad {
    fn request(&self) -> ApiRequest {
        match self {
            PendingLoad::Songs => ApiRequest::ListSongs,
            PendingLoad::Song(id) => ApiRequest::GetSong(id.clone()),
            PendingLoad::Statistics => ApiRequest::Statistics,
        }
    }
}

/// A save or delete waiting on the server.
#[derive(Debug, PartialEq, Eq)]
enum PendingWrite {
    EditorSave { updating: bool },
    InlineAdd,
    Delete { id: String },
}

/// Holds the footer message text plus its severity.
struct StatusMessage {
    text: String,
    kind: StatusKind,
    shown_at: Instant,
}

/// Severity levels shown in the footer.
enum StatusKind {
    Info,
    Error,
}

impl StatusKind {
    fn style(&self) -> Style {
        match self {
            StatusKind::Info => Style::default().fg(Color::Green),
            StatusKind::Error => Style::default().fg(Color::Red),
        }
    }
}

/// Central application state: the routed screen, any overlay, and the worker
/// the screens fetch through.
pub struct App {
    worker: ApiWorker,
    api_label: String,
    path: String,
    route: Option<Route>,
    screen: Screen,
    mode: Mode,
    status: Option<StatusMessage>,
    load: Option<(Ticket, PendingLoad)>,
    write: Option<(Ticket, PendingWrite)>,
}

impl App {
    /// Build the app and route to `initial_path`. API calls run on a worker
    /// thread; their results are applied by [`App::poll_responses`].
    pub fn new(
        api: Box<dyn SongApi + Send>,
        api_label: impl Into<String>,
        initial_path: &str,
    ) -> Self {
        let mut app = Self {
            worker: ApiWorker::spawn(api),
            api_label: api_label.into(),
            path: String::new(),
            route: None,
            screen: Screen::Unmatched,
            mode: Mode::Normal,
            status: None,
            load: None,
            write: None,
        };
        app.navigate_to_path(initial_path);
        app
    }

    /// Route to an arbitrary path. Unmatched paths leave the content empty.
    pub fn navigate_to_path(&mut self, path: &str) {
        match Route::parse(path) {
            Some(route) => self.navigate(route),
            None => {
                tracing::debug!(path, "no route matches path");
                self.path = path.trim().to_string();
                self.route = None;
                self.screen = Screen::Unmatched;
                self.mode = Mode::Normal;
                self.load = None;
                self.write = None;
            }
        }
    }

    /// Show `route` and start its fetch. Requests still in flight for the
    /// previous screen are forgotten; their responses are dropped on arrival.
    pub fn navigate(&mut self, route: Route) {
        tracing::info!(path = %route, "navigating");
        self.mode = Mode::Normal;
        let (screen, load) = match &route {
            Route::SongList => (
                Screen::SongList(SongListScreen::loading()),
                Some(PendingLoad::Songs),
            ),
            Route::CreateSong => (Screen::SongEditor(SongEditorScreen::create()), None),
            Route::EditSong(id) => (
                Screen::SongEditor(SongEditorScreen::edit(id.clone())),
                Some(PendingLoad::Song(id.clone())),
            ),
            Route::Statistics => (
                Screen::Statistics(StatisticsScreen::loading()),
                Some(PendingLoad::Statistics),
            ),
        };
        self.screen = screen;
        self.write = None;
        self.load = load.map(|load| (self.worker.submit(load.request()), load));
        self.path = route.path();
        self.route = Some(route);
    }

    /// Whether a fetch or a save is still waiting on the server.
    pub fn is_busy(&self) -> bool {
        self.load.is_some() || self.write.is_some()
    }

    /// Apply every response that has arrived so far. Returns `true` if any
    /// arrived.
    pub fn poll_responses(&mut self) -> bool {
        let mut applied = false;
        while let Some(completion) = self.worker.try_recv() {
            self.apply(completion);
            applied = true;
        }
        applied
    }

    fn apply(&mut self, completion: Completion) {
        let Completion { ticket, response } = completion;
        if let Some(load) = take_matching(&mut self.load, ticket) {
            self.apply_load(load, response);
        } else if let Some(write) = take_matching(&mut self.write, ticket) {
            self.apply_write(write, response);
        } else {
            tracing::debug!(?ticket, "dropping response for a screen that is gone");
        }
    }

    fn apply_load(&mut self, load: PendingLoad, response: ApiResponse) {
        match (load, response) {
            (PendingLoad::Songs, ApiResponse::Songs(result)) => {
                if let Screen::SongList(list) = &mut self.screen {
                    match result {
                        Ok(songs) => list.set_songs(songs),
                        Err(err) => {
                            tracing::error!(error = %err, "Error fetching songs");
                            list.loading = false;
                        }
                    }
                }
            }
            (PendingLoad::Song(id), ApiResponse::Song(result)) => {
                let failed = result.is_err();
                if let Screen::SongEditor(editor) = &mut self.screen {
                    match result {
                        Ok(song) => editor.load_song(&song),
                        Err(err) => {
                            tracing::error!(%id, error = %err, "Error fetching song");
                            editor.load_failed();
                        }
                    }
                }
                if failed {
                    self.set_status("Error loading song.", StatusKind::Error);
                }
            }
            (PendingLoad::Statistics, ApiResponse::Statistics(result)) => {
                if let Screen::Statistics(stats) = &mut self.screen {
                    stats.state = match result {
                        Ok(snapshot) => StatisticsState::Loaded(snapshot),
                        Err(err) => {
                            tracing::error!(error = %err, "Error fetching statistics");
                            StatisticsState::Failed("Failed to fetch statistics.".to_string())
                        }
                    };
                }
            }
            (load, response) => {
                tracing::warn!(?load, ?response, "response does not match the pending fetch");
            }
        }
    }

    fn apply_write(&mut self, write: PendingWrite, response: ApiResponse) {
        match (write, response) {
            (PendingWrite::EditorSave { updating }, ApiResponse::Saved(result)) => match result {
                Ok(_) => {
                    if let Screen::SongEditor(editor) = &mut self.screen {
                        editor.reset();
                    }
                    let message = if updating {
                        "Song updated successfully!"
                    } else {
                        "Song added successfully!"
                    };
                    self.set_status(message, StatusKind::Info);
                    self.navigate(Route::SongList);
                }
                Err(err) => {
                    tracing::error!(error = %err, "Error saving song");
                    if let Screen::SongEditor(editor) = &mut self.screen {
                        editor.saving = false;
                    }
                    self.set_status("Error saving song.", StatusKind::Error);
                }
            },
            (PendingWrite::InlineAdd, ApiResponse::Saved(result)) => {
                self.refresh_song_list();
                match result {
                    Ok(_) => {
                        self.set_status("Song added successfully!", StatusKind::Info);
                        if matches!(self.mode, Mode::InlineAdd(_)) {
                            self.mode = Mode::Normal;
                        }
                    }
                    Err(err) => {
                        tracing::error!(error = %err, "Error adding song");
                        self.set_status("Error saving song.", StatusKind::Error);
                    }
                }
            }
            (PendingWrite::Delete { id }, ApiResponse::Deleted(result)) => match result {
                Ok(()) => {
                    self.set_status("Song deleted successfully!", StatusKind::Info);
                    self.refresh_song_list();
                }
                Err(err) => {
                    tracing::error!(%id, error = %err, "Error deleting song");
                    self.set_status("Error deleting song.", StatusKind::Error);
                }
            },
            (write, response) => {
                tracing::warn!(?write, ?response, "response does not match the pending write");
            }
        }
    }

    /// Drop the footer notice once it has been visible for long enough.
    pub fn expire_status(&mut self, now: Instant) {
        if let Some(status) = &self.status {
            if now.duration_since(status.shown_at) >= NOTICE_TTL {
                self.status = None;
            }
        }
    }

    /// Handle one key press. Returns `true` when the user asked to quit.
    pub fn handle_key(&mut self, code: KeyCode) -> bool {
        let mut exit = false;
        let mode = mem::replace(&mut self.mode, Mode::Normal);

        let next = match mode {
            Mode::Normal => self.handle_normal_key(code, &mut exit),
            Mode::InlineAdd(form) => self.handle_inline_add(code, form),
            Mode::ConfirmDelete(confirm) => self.handle_confirm_delete(code, confirm),
            Mode::PathPrompt(prompt) => self.handle_path_prompt(code, prompt),
        };

        self.mode = next;
        exit
    }

    /// Control-key shortcuts that work on every screen, including forms where
    /// plain letters and digits are typed into fields. Returns `true` on quit.
    pub fn handle_ctrl(&mut self, ch: char) -> bool {
        let route = match ch {
            'c' => return true,
            'l' => Route::SongList,
            'n' => Route::CreateSong,
            't' => Route::Statistics,
            _ => return false,
        };
        self.clear_status();
        self.navigate(route);
        false
    }

    fn handle_normal_key(&mut self, code: KeyCode, exit: &mut bool) -> Mode {
        if matches!(self.screen, Screen::SongEditor(_)) {
            return self.handle_editor_key(code);
        }

        match code {
            KeyCode::Char('q') => {
                *exit = true;
                return Mode::Normal;
            }
            KeyCode::Char(':') => {
                return Mode::PathPrompt(PathPrompt {
                    path: "/".to_string(),
                });
            }
            KeyCode::Char(ch) => {
                if let Some(route) = shell::link_target(ch) {
                    self.clear_status();
                    self.navigate(route);
                    return Mode::Normal;
                }
            }
            _ => {}
        }

        match self.screen {
            Screen::SongList(_) => self.handle_list_key(code),
            Screen::Statistics(_) => self.handle_statistics_key(code),
            Screen::SongEditor(_) | Screen::Unmatched => Mode::Normal,
        }
    }

    fn handle_list_key(&mut self, code: KeyCode) -> Mode {
        let Screen::SongList(list) = &mut self.screen else {
            return Mode::Normal;
        };

        match code {
            KeyCode::Up => list.move_selection(-1),
            KeyCode::Down => list.move_selection(1),
            KeyCode::PageUp => list.move_selection(-5),
            KeyCode::PageDown => list.move_selection(5),
            KeyCode::Home => list.select_first(),
            KeyCode::End => list.select_last(),
            KeyCode::Enter | KeyCode::Char('e') | KeyCode::Char('E') => {
                match list.current_song().and_then(|song| song.id.clone()) {
                    Some(id) => {
                        self.clear_status();
                        self.navigate(Route::EditSong(id));
                    }
                    None => self.set_status("No song selected to edit.", StatusKind::Error),
                }
            }
            KeyCode::Char('+') | KeyCode::Char('n') => {
                self.clear_status();
                self.navigate(Route::CreateSong);
            }
            KeyCode::Char('a') | KeyCode::Char('A') => {
                self.clear_status();
                return Mode::InlineAdd(SongForm::default());
            }
            KeyCode::Char('d') | KeyCode::Char('-') | KeyCode::Delete => {
                let selected = list.current_song().cloned();
                match selected {
                    Some(song) => {
                        if let Some(id) = song.id.clone() {
                            self.clear_status();
                            return Mode::ConfirmDelete(ConfirmSongDelete { id, song });
                        }
                        self.set_status("No song selected to delete.", StatusKind::Error);
                    }
                    None => self.set_status("No song selected to delete.", StatusKind::Error),
                }
            }
            _ => {}
        }
        Mode::Normal
    }

    fn handle_statistics_key(&mut self, code: KeyCode) -> Mode {
        let delta = match code {
            KeyCode::Up => -1,
            KeyCode::Down => 1,
            KeyCode::PageUp => -5,
            KeyCode::PageDown => 5,
            KeyCode::Esc => {
                self.navigate(Route::SongList);
                return Mode::Normal;
            }
            _ => 0,
        };
        if let Screen::Statistics(stats) = &mut self.screen {
            stats.scroll_by(delta);
        }
        Mode::Normal
    }

    fn handle_editor_key(&mut self, code: KeyCode) -> Mode {
        if code == KeyCode::Esc {
            self.navigate(Route::SongList);
            return Mode::Normal;
        }
        if code == KeyCode::Enter {
            self.submit_editor();
            return Mode::Normal;
        }

        if let Screen::SongEditor(editor) = &mut self.screen {
            edit_form(&mut editor.form, code);
        }
        Mode::Normal
    }

    /// Send the editor form: update in edit mode, create otherwise. The
    /// outcome is applied when the response arrives.
    fn submit_editor(&mut self) {
        if self.write.is_some() {
            return;
        }
        let Screen::SongEditor(editor) = &mut self.screen else {
            return;
        };

        let song = match editor.form.to_song() {
            Ok(song) => song,
            Err(err) => {
                editor.form.error = Some(surface_error(&err));
                editor.form.focus_first_missing();
                return;
            }
        };

        let (request, updating) = match &editor.route_id {
            Some(id) if editor.edit_mode => (
                ApiRequest::UpdateSong {
                    id: id.clone(),
                    song,
                },
                true,
            ),
            _ => (ApiRequest::CreateSong(song), false),
        };
        editor.saving = true;
        let ticket = self.worker.submit(request);
        self.write = Some((ticket, PendingWrite::EditorSave { updating }));
    }

    fn handle_inline_add(&mut self, code: KeyCode, mut form: SongForm) -> Mode {
        match code {
            KeyCode::Esc => return Mode::Normal,
            KeyCode::Enter if self.write.is_none() => match form.to_song() {
                Ok(song) => {
                    let ticket = self.worker.submit(ApiRequest::CreateSong(song));
                    self.write = Some((ticket, PendingWrite::InlineAdd));
                }
                Err(err) => {
                    form.error = Some(surface_error(&err));
                    form.focus_first_missing();
                }
            },
            KeyCode::Enter => {}
            _ => edit_form(&mut form, code),
        }
        Mode::InlineAdd(form)
    }

    fn handle_confirm_delete(&mut self, code: KeyCode, confirm: ConfirmSongDelete) -> Mode {
        match code {
            KeyCode::Esc | KeyCode::Char('n') | KeyCode::Char('N') => {
                self.set_status("Deletion cancelled.", StatusKind::Info);
                Mode::Normal
            }
            KeyCode::Enter | KeyCode::Char('y') | KeyCode::Char('Y') if self.write.is_none() => {
                let ticket = self
                    .worker
                    .submit(ApiRequest::DeleteSong(confirm.id.clone()));
                self.write = Some((ticket, PendingWrite::Delete { id: confirm.id }));
                Mode::Normal
            }
            _ => Mode::ConfirmDelete(confirm),
        }
    }

    fn handle_path_prompt(&mut self, code: KeyCode, mut prompt: PathPrompt) -> Mode {
        match code {
            KeyCode::Esc => Mode::Normal,
            KeyCode::Enter => {
                let path = prompt.path.trim().to_string();
                if !path.is_empty() {
                    self.clear_status();
                    self.navigate_to_path(&path);
                }
                Mode::Normal
            }
            KeyCode::Backspace => {
                prompt.path.pop();
                Mode::PathPrompt(prompt)
            }
            KeyCode::Char(ch) if !ch.is_control() => {
                prompt.path.push(ch);
                Mode::PathPrompt(prompt)
            }
            _ => Mode::PathPrompt(prompt),
        }
    }

    /// Queue a re-fetch of the collection while keeping the rows on screen.
    fn refresh_song_list(&mut self) {
        if let Screen::SongList(list) = &mut self.screen {
            list.loading = true;
            let ticket = self.worker.submit(ApiRequest::ListSongs);
            self.load = Some((ticket, PendingLoad::Songs));
        }
    }

    fn set_status<S: Into<String>>(&mut self, text: S, kind: StatusKind) {
        self.status = Some(StatusMessage {
            text: text.into(),
            kind,
            shown_at: Instant::now(),
        });
    }

    fn clear_status(&mut self) {
        self.status = None;
    }

    pub(crate) fn draw(&self, frame: &mut Frame) {
        let area = frame.area();
        let (header_area, content_area, footer_area) = shell::split(area);

        shell::draw_header(frame, header_area, &self.path, self.route.as_ref());

        match &self.screen {
            Screen::SongList(list) => self.draw_song_list(frame, content_area, list),
            Screen::SongEditor(editor) => self.draw_editor(frame, content_area, editor),
            Screen::Statistics(stats) => self.draw_statistics(frame, content_area, stats),
            Screen::Unmatched => {}
        }

        let notice = match &self.status {
            Some(status) => Line::from(Span::styled(status.text.clone(), status.kind.style())),
            None => Line::from(""),
        };
        shell::draw_footer(
            frame,
            footer_area,
            notice,
            self.footer_instructions(),
            &self.api_label,
        );

        match &self.mode {
            Mode::ConfirmDelete(confirm) => self.draw_confirm_delete(frame, area, confirm),
            Mode::PathPrompt(prompt) => self.draw_path_prompt(frame, content_area, prompt),
            Mode::InlineAdd(_) | Mode::Normal => {}
        }
    }

    fn draw_song_list(&self, frame: &mut Frame, area: Rect, list: &SongListScreen) {
        let mut table_area = area;

        if let Mode::InlineAdd(form) = &self.mode {
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Length(INLINE_FORM_HEIGHT), Constraint::Min(0)])
                .split(area);
            let hint = if matches!(self.write, Some((_, PendingWrite::InlineAdd))) {
                "Saving..."
            } else {
                "Enter to save • Tab to switch • Esc to close"
            };
            self.draw_form(frame, chunks[0], "New Song", form, hint);
            table_area = chunks[1];
        }

        if table_area.height == 0 {
            return;
        }

        let title = if list.loading {
            "Song List (loading...)"
        } else {
            "Song List"
        };
        let block = Block::default().title(title).borders(Borders::ALL);

        if list.songs.is_empty() {
            let text = if list.loading {
                "Loading..."
            } else {
                "No songs yet. Press '+' to add one."
            };
            let message = Paragraph::new(text)
                .alignment(Alignment::Center)
                .block(block);
            frame.render_widget(message, table_area);
            return;
        }

        let header = Row::new(["Title", "Artist", "Album", "Genre"]).style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        );
        let rows = list.songs.iter().map(|song| {
            Row::new([
                song.title.clone(),
                song.artist.clone(),
                song.album().to_string(),
                song.genre().to_string(),
            ])
        });
        let widths = [
            Constraint::Percentage(30),
            Constraint::Percentage(25),
            Constraint::Percentage(25),
            Constraint::Percentage(20),
        ];

        let table = Table::new(rows, widths)
            .header(header)
            .block(block)
            .row_highlight_style(
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            )
            .highlight_symbol("▶ ");

        let mut state = TableState::default().with_selected(Some(list.selected));
        frame.render_stateful_widget(table, table_area, &mut state);
    }

    fn draw_editor(&self, frame: &mut Frame, area: Rect, editor: &SongEditorScreen) {
        let form_area = centered_rect(70, 60, area);

        if editor.loading {
            let paragraph = Paragraph::new("Loading song...")
                .alignment(Alignment::Center)
                .block(Block::default().title("Edit Song").borders(Borders::ALL));
            frame.render_widget(paragraph, form_area);
            return;
        }

        let hint = if editor.saving {
            "Saving...".to_string()
        } else {
            format!(
                "Enter to {} • Tab to switch • Esc back to songs",
                editor.submit_label().to_lowercase()
            )
        };
        self.draw_form(frame, form_area, editor.heading(), &editor.form, &hint);
    }

    fn draw_form(&self, frame: &mut Frame, area: Rect, title: &str, form: &SongForm, hint: &str) {
        frame.render_widget(Clear, area);
        let block = Block::default().title(title.to_string()).borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let mut lines: Vec<Line> = SongField::ALL
            .iter()
            .map(|field| form.build_line(*field))
            .collect();
        lines.push(Line::from(""));

        if let Some(error) = &form.error {
            lines.push(Line::from(Span::styled(
                error.clone(),
                Style::default().fg(Color::Red),
            )));
        } else {
            lines.push(Line::from(Span::styled(
                hint.to_string(),
                Style::default().fg(Color::Gray),
            )));
        }

        frame.render_widget(Paragraph::new(lines), inner);

        if inner.width > 0 && inner.height > form.active_row() {
            let cursor_x = inner.x + form.cursor_offset().min(inner.width - 1);
            frame.set_cursor_position((cursor_x, inner.y + form.active_row()));
        }
    }

    fn draw_statistics(&self, frame: &mut Frame, area: Rect, stats: &StatisticsScreen) {
        let block = Block::default()
            .title("Song Statistics")
            .borders(Borders::ALL);

        match &stats.state {
            StatisticsState::Loading => {
                let paragraph = Paragraph::new("Loading...")
                    .alignment(Alignment::Center)
                    .block(block);
                frame.render_widget(paragraph, area);
            }
            StatisticsState::Failed(message) => {
                let paragraph = Paragraph::new(Span::styled(
                    message.clone(),
                    Style::default().fg(Color::Red),
                ))
                .alignment(Alignment::Center)
                .block(block);
                frame.render_widget(paragraph, area);
            }
            StatisticsState::Loaded(snapshot) => {
                let inner = block.inner(area);
                frame.render_widget(block, area);
                self.draw_snapshot(frame, inner, snapshot, stats.scroll);
            }
        }
    }

    fn draw_snapshot(
        &self,
        frame: &mut Frame,
        area: Rect,
        snapshot: &StatisticsSnapshot,
        scroll: u16,
    ) {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(STAT_CARD_HEIGHT), Constraint::Min(0)])
            .split(area);

        let cards = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(25); 4])
            .split(rows[0]);
        let totals = [
            ("Total Songs", snapshot.total_songs),
            ("Total Artists", snapshot.total_artists),
            ("Total Albums", snapshot.total_albums),
            ("Total Genres", snapshot.total_genres),
        ];
        for (card, (label, value)) in cards.iter().zip(totals) {
            let paragraph = Paragraph::new(Span::styled(
                value.to_string(),
                Style::default().add_modifier(Modifier::BOLD),
            ))
            .block(Block::default().title(label).borders(Borders::ALL));
            frame.render_widget(paragraph, *card);
        }

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Ratio(1, 3),
                Constraint::Ratio(1, 3),
                Constraint::Ratio(1, 3),
            ])
            .split(rows[1]);

        let by_genre: Vec<String> = snapshot
            .songs_by_genre
            .iter()
            .map(|group| format!("• {}: {}", group.label(), group.count))
            .collect();
        let by_artist: Vec<String> = snapshot
            .songs_and_albums_by_artist
            .iter()
            .map(|row| format!("• {}: {} songs, {} albums", row.artist, row.songs, row.albums))
            .collect();
        let by_album: Vec<String> = snapshot
            .songs_by_album
            .iter()
            .map(|group| format!("• {}: {}", group.label(), group.count))
            .collect();

        for (column, (title, items)) in columns.iter().zip([
            ("Songs by Genre", by_genre),
            ("Songs & Albums by Artist", by_artist),
            ("Songs by Album", by_album),
        ]) {
            let lines: Vec<Line> = if items.is_empty() {
                vec![Line::from(Span::styled(
                    "Nothing yet.",
                    Style::default().fg(Color::DarkGray),
                ))]
            } else {
                items.into_iter().map(Line::from).collect()
            };
            let paragraph = Paragraph::new(lines)
                .block(Block::default().title(title).borders(Borders::ALL))
                .wrap(Wrap { trim: true })
                .scroll((scroll, 0));
            frame.render_widget(paragraph, *column);
        }
    }

    fn draw_confirm_delete(&self, frame: &mut Frame, area: Rect, confirm: &ConfirmSongDelete) {
        let popup_area = centered_rect(60, 30, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default().title("Delete Song").borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let lines = vec![
            Line::from(format!("Delete '{}' permanently?", confirm.song)),
            Line::from(""),
            Line::from(Span::styled(
                "Press Y to confirm or N / Esc to cancel.",
                Style::default().fg(Color::Gray),
            )),
        ];

        let paragraph = Paragraph::new(lines)
            .alignment(Alignment::Left)
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }

    fn draw_path_prompt(&self, frame: &mut Frame, area: Rect, prompt: &PathPrompt) {
        let height = 3u16.min(area.height);
        let popup_area = Rect {
            x: area.x,
            y: area.y,
            width: area.width,
            height,
        };
        frame.render_widget(Clear, popup_area);

        let block = Block::default().borders(Borders::ALL).title("Go to");
        let paragraph = Paragraph::new(Span::raw(format!("Path: {}", prompt.path)))
            .block(block.clone());
        frame.render_widget(paragraph, popup_area);

        let inner = block.inner(popup_area);
        let cursor_x = inner.x + "Path: ".len() as u16 + prompt.path.chars().count() as u16;
        frame.set_cursor_position((cursor_x.min(inner.right().saturating_sub(1)), inner.y));
    }

    fn footer_instructions(&self) -> Line<'static> {
        let key_style = Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD);
        let keys: &[(&str, &str)] = match (&self.screen, &self.mode) {
            (_, Mode::PathPrompt(_)) => &[("[Enter]", " Go   "), ("[Esc]", " Cancel")],
            (_, Mode::ConfirmDelete(_)) => &[("[y]", " Delete   "), ("[n/Esc]", " Cancel")],
            (_, Mode::InlineAdd(_)) => &[
                ("[Enter]", " Save   "),
                ("[Tab]", " Next Field   "),
                ("[Esc]", " Close"),
            ],
            (Screen::SongList(_), _) => &[
                ("[↑↓]", " Select   "),
                ("[e]", " Edit   "),
                ("[d]", " Delete   "),
                ("[a]", " Quick Add   "),
                ("[+]", " Add Page   "),
                ("[:]", " Go to   "),
                ("[q]", " Quit"),
            ],
            (Screen::SongEditor(_), _) => &[
                ("[Enter]", " Save   "),
                ("[Tab]", " Next Field   "),
                ("[Esc]", " Back to Songs   "),
                ("[^L/^N/^T]", " Links   "),
                ("[^C]", " Quit"),
            ],
            (Screen::Statistics(_), _) => &[
                ("[↑↓]", " Scroll   "),
                ("[Esc]", " Back   "),
                ("[:]", " Go to   "),
                ("[q]", " Quit"),
            ],
            (Screen::Unmatched, _) => &[
                ("[1-3]", " Links   "),
                ("[:]", " Go to   "),
                ("[q]", " Quit"),
            ],
        };

        let spans: Vec<Span<'static>> = keys
            .iter()
            .flat_map(|(key, action)| {
                [
                    Span::styled(key.to_string(), key_style),
                    Span::raw(action.to_string()),
                ]
            })
            .collect();
        Line::from(spans)
    }
}

/// Take the value out of `slot` if it was recorded under `ticket`.
fn take_matching<T>(slot: &mut Option<(Ticket, T)>, ticket: Ticket) -> Option<T> {
    if slot.as_ref().is_some_and(|(pending, _)| *pending == ticket) {
        slot.take().map(|(_, value)| value)
    } else {
        None
    }
}

/// Apply a field-editing key to a song form.
fn edit_form(form: &mut SongForm, code: KeyCode) {
    match code {
        KeyCode::Tab | KeyCode::Down => form.next_field(),
        KeyCode::BackTab | KeyCode::Up => form.previous_field(),
        KeyCode::Backspace => form.backspace(),
        KeyCode::Char(ch) => {
            form.push_char(ch);
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use std::net::TcpListener;
    use std::sync::{Arc, Condvar, Mutex};

    use ratatui::backend::TestBackend;
    use ratatui::Terminal;
    use reqwest::blocking::Client;
    use reqwest::StatusCode;

    use super::*;
    use crate::api::{ApiError, HttpSongApi};
    use crate::models::{ArtistBreakdown, GroupCount, Song};

    #[derive(Default)]
    struct FakeServer {
        songs: Vec<Song>,
        statistics: Option<StatisticsSnapshot>,
        fail_reads: bool,
        fail_writes: bool,
        calls: Vec<String>,
        next_id: u32,
    }

    /// Holds every fake call until opened.
    #[derive(Default)]
    struct Gate {
        closed: Mutex<bool>,
        opened: Condvar,
    }

    impl Gate {
        fn close(&self) {
            *self.closed.lock().unwrap() = true;
        }

        fn open(&self) {
            *self.closed.lock().unwrap() = false;
            self.opened.notify_all();
        }

        fn wait(&self) {
            let mut closed = self.closed.lock().unwrap();
            while *closed {
                closed = self.opened.wait(closed).unwrap();
            }
        }
    }

    #[derive(Clone, Default)]
    struct FakeApi {
        server: Arc<Mutex<FakeServer>>,
        gate: Arc<Gate>,
    }

    impl FakeApi {
        fn new(server: FakeServer) -> Self {
            Self {
                server: Arc::new(Mutex::new(server)),
                gate: Arc::default(),
            }
        }

        /// Wait for the gate, then record the call.
        fn enter(&self, call: String) -> std::sync::MutexGuard<'_, FakeServer> {
            self.gate.wait();
            let mut server = self.server.lock().unwrap();
            server.calls.push(call);
            server
        }

        fn calls(&self) -> Vec<String> {
            self.server.lock().unwrap().calls.clone()
        }

        fn count(&self, call: &str) -> usize {
            self.calls().iter().filter(|c| *c == call).count()
        }

        fn songs(&self) -> Vec<Song> {
            self.server.lock().unwrap().songs.clone()
        }

        fn fail_reads(&self) {
            self.server.lock().unwrap().fail_reads = true;
        }
    }

    fn failure(status: StatusCode) -> ApiError {
        ApiError::Status {
            url: "http://fake/api/songs".into(),
            status,
        }
    }

    impl SongApi for FakeApi {
        fn list_songs(&self) -> Result<Vec<Song>, ApiError> {
            let server = self.enter("GET /api/songs".into());
            if server.fail_reads {
                return Err(failure(StatusCode::INTERNAL_SERVER_ERROR));
            }
            Ok(server.songs.clone())
        }

        fn get_song(&self, id: &str) -> Result<Song, ApiError> {
            let server = self.enter(format!("GET /api/songs/{id}"));
            if server.fail_reads {
                return Err(failure(StatusCode::INTERNAL_SERVER_ERROR));
            }
            server
                .songs
                .iter()
                .find(|s| s.id.as_deref() == Some(id))
                .cloned()
                .ok_or_else(|| failure(StatusCode::NOT_FOUND))
        }

        fn create_song(&self, song: &Song) -> Result<Song, ApiError> {
            let mut server = self.enter("POST /api/songs".into());
            if server.fail_writes {
                return Err(failure(StatusCode::INTERNAL_SERVER_ERROR));
            }
            server.next_id += 1;
            let mut created = song.clone();
            created.id = Some(format!("new-{}", server.next_id));
            server.songs.push(created.clone());
            Ok(created)
        }

        fn update_song(&self, id: &str, song: &Song) -> Result<Song, ApiError> {
            let mut server = self.enter(format!("PUT /api/songs/{id}"));
            if server.fail_writes {
                return Err(failure(StatusCode::INTERNAL_SERVER_ERROR));
            }
            let stored = server
                .songs
                .iter_mut()
                .find(|s| s.id.as_deref() == Some(id))
                .ok_or_else(|| failure(StatusCode::NOT_FOUND))?;
            *stored = Song {
                id: Some(id.to_string()),
                ..song.clone()
            };
            Ok(stored.clone())
        }

        fn delete_song(&self, id: &str) -> Result<(), ApiError> {
            let mut server = self.enter(format!("DELETE /api/songs/{id}"));
            if server.fail_writes {
                return Err(failure(StatusCode::INTERNAL_SERVER_ERROR));
            }
            server.songs.retain(|s| s.id.as_deref() != Some(id));
            Ok(())
        }

        fn statistics(&self) -> Result<StatisticsSnapshot, ApiError> {
            let server = self.enter("GET /api/songs/statistics".into());
            if server.fail_reads {
                return Err(failure(StatusCode::INTERNAL_SERVER_ERROR));
            }
            server
                .statistics
                .clone()
                .ok_or_else(|| failure(StatusCode::NOT_FOUND))
        }
    }

    fn song(id: &str, title: &str, artist: &str) -> Song {
        Song {
            id: Some(id.into()),
            title: title.into(),
            artist: artist.into(),
            album: None,
            genre: None,
        }
    }

    /// Apply worker responses until nothing is in flight.
    fn settle(app: &mut App) {
        while app.is_busy() {
            let completion = app
                .worker
                .recv_timeout(Duration::from_secs(5))
                .expect("API worker did not answer");
            app.apply(completion);
        }
    }

    fn start(server: FakeServer, path: &str) -> (App, FakeApi) {
        let api = FakeApi::new(server);
        let mut app = App::new(Box::new(api.clone()), "http://fake", path);
        settle(&mut app);
        (app, api)
    }

    fn type_text(app: &mut App, text: &str) {
        for ch in text.chars() {
            app.handle_key(KeyCode::Char(ch));
        }
    }

    fn render(app: &App) -> Vec<String> {
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        terminal.draw(|frame| app.draw(frame)).unwrap();
        let buffer = terminal.backend().buffer();
        let width = buffer.area.width as usize;
        buffer
            .content()
            .chunks(width)
            .map(|row| row.iter().map(|cell| cell.symbol()).collect::<String>())
            .collect()
    }

    fn list(app: &App) -> &SongListScreen {
        match &app.screen {
            Screen::SongList(list) => list,
            _ => panic!("not on the song list"),
        }
    }

    fn editor(app: &App) -> &SongEditorScreen {
        match &app.screen {
            Screen::SongEditor(editor) => editor,
            _ => panic!("not on the song editor"),
        }
    }

    fn status_text(app: &App) -> Option<&str> {
        app.status.as_ref().map(|s| s.text.as_str())
    }

    fn pending_load(app: &App) -> Option<&PendingLoad> {
        app.load.as_ref().map(|(_, load)| load)
    }

    #[test]
    fn list_renders_one_row_per_song_in_server_order() {
        let mut first = song("1", "So What", "Miles Davis");
        first.album = Some("Kind of Blue".into());
        first.genre = Some("Jazz".into());
        let (app, api) = start(
            FakeServer {
                songs: vec![first, song("2", "Blue in Green", "Bill Evans")],
                ..FakeServer::default()
            },
            "/",
        );

        assert_eq!(api.calls(), ["GET /api/songs"]);
        assert_eq!(list(&app).songs.len(), 2);

        let lines = render(&app);
        let rows: Vec<&String> = lines
            .iter()
            .filter(|l| l.contains("So What") || l.contains("Blue in Green"))
            .collect();
        assert_eq!(rows.len(), 2);
        assert!(rows[0].contains("So What"));
        assert!(rows[0].contains("Miles Davis"));
        assert!(rows[0].contains("Kind of Blue"));
        assert!(rows[0].contains("Jazz"));
        assert!(rows[1].contains("Bill Evans"));
    }

    #[test]
    fn list_fetch_failure_shows_empty_state() {
        let (app, _) = start(
            FakeServer {
                fail_reads: true,
                ..FakeServer::default()
            },
            "/",
        );

        assert!(list(&app).songs.is_empty());
        assert!(!list(&app).loading);
        assert!(render(&app).iter().any(|l| l.contains("No songs yet")));
    }

    #[test]
    fn input_is_handled_while_a_request_is_blocked() {
        let api = FakeApi::new(FakeServer {
            statistics: Some(snapshot()),
            ..FakeServer::default()
        });
        api.gate.close();
        let mut app = App::new(Box::new(api.clone()), "http://fake", "/");

        assert!(list(&app).loading);
        app.handle_key(KeyCode::Char('3'));
        assert_eq!(app.route, Some(Route::Statistics));
        assert!(!app.poll_responses());
        assert!(app.handle_key(KeyCode::Char('q')));

        api.gate.open();
        settle(&mut app);

        assert_eq!(api.calls(), ["GET /api/songs", "GET /api/songs/statistics"]);
        match &app.screen {
            Screen::Statistics(stats) => {
                assert!(matches!(stats.state, StatisticsState::Loaded(_)))
            }
            _ => panic!("the late song list must not replace the statistics view"),
        }
    }

    #[test]
    fn unanswered_http_request_leaves_the_shell_responsive() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());
        let client = Client::builder().no_proxy().build().unwrap();
        let api = HttpSongApi::with_client(&url, client).unwrap();
        let mut app = App::new(Box::new(api), url, "/");

        assert!(app.is_busy());
        assert!(!app.poll_responses());
        assert!(render(&app).iter().any(|l| l.contains("Loading...")));

        app.handle_key(KeyCode::Char('2'));
        assert_eq!(app.route, Some(Route::CreateSong));
        assert!(app.handle_ctrl('c'));
        drop(listener);
    }

    #[test]
    fn deleting_the_only_song_refetches_an_empty_table() {
        let (mut app, api) = start(
            FakeServer {
                songs: vec![song("1", "A", "X")],
                ..FakeServer::default()
            },
            "/",
        );

        app.handle_key(KeyCode::Char('d'));
        assert!(matches!(app.mode, Mode::ConfirmDelete(_)));
        app.handle_key(KeyCode::Char('y'));
        assert!(app.is_busy());
        settle(&mut app);

        assert_eq!(
            api.calls(),
            ["GET /api/songs", "DELETE /api/songs/1", "GET /api/songs"]
        );
        assert!(list(&app).songs.is_empty());
        assert_eq!(status_text(&app), Some("Song deleted successfully!"));
        assert!(render(&app).iter().any(|l| l.contains("No songs yet")));
    }

    #[test]
    fn failed_delete_keeps_the_collection() {
        let (mut app, api) = start(
            FakeServer {
                songs: vec![song("1", "A", "X"), song("2", "B", "Y")],
                fail_writes: true,
                ..FakeServer::default()
            },
            "/",
        );

        app.handle_key(KeyCode::Down);
        app.handle_key(KeyCode::Char('d'));
        app.handle_key(KeyCode::Enter);
        settle(&mut app);

        assert_eq!(api.calls(), ["GET /api/songs", "DELETE /api/songs/2"]);
        assert_eq!(list(&app).songs.len(), 2);
        assert_eq!(status_text(&app), Some("Error deleting song."));
        assert!(matches!(app.mode, Mode::Normal));
    }

    #[test]
    fn failed_refetch_keeps_the_rows_already_shown() {
        let (mut app, api) = start(
            FakeServer {
                songs: vec![song("1", "A", "X"), song("2", "B", "Y")],
                ..FakeServer::default()
            },
            "/",
        );

        app.handle_key(KeyCode::Char('d'));
        app.handle_key(KeyCode::Char('y'));
        api.fail_reads();
        settle(&mut app);

        assert_eq!(api.count("GET /api/songs"), 2);
        assert_eq!(status_text(&app), Some("Song deleted successfully!"));
        let titles: Vec<_> = list(&app).songs.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, ["A", "B"]);
        assert!(!list(&app).loading);
    }

    #[test]
    fn cancelling_delete_issues_no_request() {
        let (mut app, api) = start(
            FakeServer {
                songs: vec![song("1", "A", "X")],
                ..FakeServer::default()
            },
            "/",
        );

        app.handle_key(KeyCode::Char('d'));
        app.handle_key(KeyCode::Esc);

        assert!(!app.is_busy());
        assert_eq!(api.count("DELETE /api/songs/1"), 0);
        assert_eq!(list(&app).songs.len(), 1);
        assert_eq!(status_text(&app), Some("Deletion cancelled."));
    }

    #[test]
    fn create_form_posts_once_and_returns_to_list() {
        let (mut app, api) = start(FakeServer::default(), "/create");
        assert!(!editor(&app).edit_mode);

        type_text(&mut app, "B");
        app.handle_key(KeyCode::Tab);
        type_text(&mut app, "Y");
        app.handle_key(KeyCode::Enter);
        assert!(editor(&app).saving);
        assert!(render(&app).iter().any(|l| l.contains("Saving...")));

        app.handle_key(KeyCode::Enter);
        settle(&mut app);

        assert_eq!(api.count("POST /api/songs"), 1);
        assert_eq!(app.route, Some(Route::SongList));
        assert_eq!(app.path, "/");
        assert_eq!(status_text(&app), Some("Song added successfully!"));

        let stored = api.songs();
        assert_eq!(stored.len(), 1);
        assert_eq!(
            (stored[0].title.as_str(), stored[0].artist.as_str()),
            ("B", "Y")
        );
        assert_eq!((stored[0].album.as_deref(), stored[0].genre.as_deref()), (None, None));
        assert_eq!(list(&app).songs.len(), 1);
    }

    #[test]
    fn blank_required_fields_block_submission() {
        let (mut app, api) = start(FakeServer::default(), "/create");

        app.handle_key(KeyCode::Enter);
        assert_eq!(editor(&app).form.error.as_deref(), Some("Title is required."));

        type_text(&mut app, "Only a title");
        app.handle_key(KeyCode::Enter);
        assert_eq!(editor(&app).form.error.as_deref(), Some("Artist is required."));
        assert_eq!(editor(&app).form.active, SongField::Artist);

        assert!(!app.is_busy());
        assert_eq!(api.count("POST /api/songs"), 0);
        assert_eq!(app.route, Some(Route::CreateSong));
    }

    #[test]
    fn failed_save_keeps_user_input() {
        let (mut app, api) = start(
            FakeServer {
                fail_writes: true,
                ..FakeServer::default()
            },
            "/create",
        );

        type_text(&mut app, "B");
        app.handle_key(KeyCode::Tab);
        type_text(&mut app, "Y");
        app.handle_key(KeyCode::Enter);
        settle(&mut app);

        assert_eq!(api.count("POST /api/songs"), 1);
        assert_eq!(app.route, Some(Route::CreateSong));
        assert_eq!(editor(&app).form.title, "B");
        assert_eq!(editor(&app).form.artist, "Y");
        assert!(!editor(&app).saving);
        assert_eq!(status_text(&app), Some("Error saving song."));
    }

    #[test]
    fn escape_leaves_the_editor_without_saving() {
        let (mut app, api) = start(FakeServer::default(), "/create");

        type_text(&mut app, "Draft");
        app.handle_key(KeyCode::Esc);
        settle(&mut app);

        assert_eq!(app.route, Some(Route::SongList));
        assert_eq!(api.calls(), ["GET /api/songs"]);
        assert!(api.songs().is_empty());
    }

    #[test]
    fn q_quits_from_the_list_but_is_typed_into_forms() {
        let (mut app, _) = start(FakeServer::default(), "/");
        assert!(app.handle_key(KeyCode::Char('q')));

        let (mut app, _) = start(FakeServer::default(), "/create");
        assert!(!app.handle_key(KeyCode::Char('q')));
        assert_eq!(editor(&app).form.title, "q");
    }

    #[test]
    fn edit_route_prefills_form_and_updates() {
        let mut existing = song("1", "A", "X");
        existing.album = Some("Alb".into());
        existing.genre = Some("Rock".into());
        let (mut app, api) = start(
            FakeServer {
                songs: vec![existing],
                ..FakeServer::default()
            },
            "/edit/1",
        );

        let form = &editor(&app).form;
        assert!(editor(&app).edit_mode);
        assert_eq!(
            [form.title.as_str(), form.artist.as_str(), form.album.as_str(), form.genre.as_str()],
            ["A", "X", "Alb", "Rock"]
        );
        assert!(render(&app).iter().any(|l| l.contains("Edit Song")));

        app.handle_key(KeyCode::Backspace);
        type_text(&mut app, "Z");
        app.handle_key(KeyCode::Enter);
        settle(&mut app);

        assert_eq!(api.count("PUT /api/songs/1"), 1);
        assert_eq!(api.count("POST /api/songs"), 0);
        assert_eq!(api.songs()[0].title, "Z");
        assert_eq!(api.songs()[0].album.as_deref(), Some("Alb"));
        assert_eq!(status_text(&app), Some("Song updated successfully!"));
        assert_eq!(app.route, Some(Route::SongList));
    }

    #[test]
    fn edit_route_with_unknown_id_falls_back_to_create_mode() {
        let (mut app, api) = start(FakeServer::default(), "/edit/missing");

        assert!(!editor(&app).edit_mode);
        assert!(!editor(&app).loading);
        assert_eq!(status_text(&app), Some("Error loading song."));

        type_text(&mut app, "B");
        app.handle_key(KeyCode::Tab);
        type_text(&mut app, "Y");
        app.handle_key(KeyCode::Enter);
        settle(&mut app);
        assert_eq!(api.count("POST /api/songs"), 1);
    }

    #[test]
    fn list_edit_key_navigates_to_edit_route() {
        let (mut app, api) = start(
            FakeServer {
                songs: vec![song("1", "A", "X"), song("2", "B", "Y")],
                ..FakeServer::default()
            },
            "/",
        );

        app.handle_key(KeyCode::End);
        app.handle_key(KeyCode::Char('e'));
        assert_eq!(app.path, "/edit/2");
        settle(&mut app);

        assert_eq!(api.count("GET /api/songs/2"), 1);
        assert_eq!(editor(&app).form.title, "B");
    }

    #[test]
    fn inline_add_posts_draft_and_refetches() {
        let (mut app, api) = start(FakeServer::default(), "/");

        app.handle_key(KeyCode::Char('a'));
        type_text(&mut app, "C");
        app.handle_key(KeyCode::Tab);
        type_text(&mut app, "Z");
        app.handle_key(KeyCode::Enter);
        settle(&mut app);

        assert!(matches!(app.mode, Mode::Normal));
        assert_eq!(
            api.calls(),
            ["GET /api/songs", "POST /api/songs", "GET /api/songs"]
        );
        assert_eq!(list(&app).songs[0].title, "C");
        assert_eq!(status_text(&app), Some("Song added successfully!"));
    }

    #[test]
    fn failed_inline_add_still_refetches_and_keeps_draft() {
        let (mut app, api) = start(
            FakeServer {
                fail_writes: true,
                ..FakeServer::default()
            },
            "/",
        );

        app.handle_key(KeyCode::Char('a'));
        type_text(&mut app, "C");
        app.handle_key(KeyCode::Tab);
        type_text(&mut app, "Z");
        app.handle_key(KeyCode::Enter);
        settle(&mut app);

        assert_eq!(api.count("GET /api/songs"), 2);
        assert_eq!(status_text(&app), Some("Error saving song."));
        match &app.mode {
            Mode::InlineAdd(form) => assert_eq!(form.title, "C"),
            _ => panic!("inline form should stay open"),
        }
    }

    fn snapshot() -> StatisticsSnapshot {
        StatisticsSnapshot {
            total_songs: 5,
            total_artists: 2,
            total_albums: 3,
            total_genres: 1,
            songs_by_genre: vec![GroupCount {
                key: Some("Jazz".into()),
                count: 5,
            }],
            songs_by_album: vec![GroupCount {
                key: Some("Kind of Blue".into()),
                count: 4,
            }],
            songs_and_albums_by_artist: vec![ArtistBreakdown {
                artist: "Miles".into(),
                songs: 5,
                albums: 3,
            }],
        }
    }

    #[test]
    fn statistics_shows_only_loading_before_the_response() {
        let api = FakeApi::default();
        api.gate.close();
        let app = App::new(Box::new(api.clone()), "http://fake", "/songs/statistics");

        let screen = render(&app).join("\n");
        assert!(screen.contains("Loading..."));
        assert!(!screen.contains("Total Songs"));
        assert!(!screen.contains("Failed to fetch statistics."));
        api.gate.open();
    }

    #[test]
    fn statistics_shows_only_error_text_on_failure() {
        let (app, _) = start(
            FakeServer {
                fail_reads: true,
                ..FakeServer::default()
            },
            "/songs/statistics",
        );

        let screen = render(&app).join("\n");
        assert!(screen.contains("Failed to fetch statistics."));
        assert!(!screen.contains("Loading..."));
        assert!(!screen.contains("Total Songs"));
    }

    #[test]
    fn statistics_shows_total_under_its_label() {
        let (app, api) = start(
            FakeServer {
                statistics: Some(snapshot()),
                ..FakeServer::default()
            },
            "/songs/statistics",
        );
        assert_eq!(api.calls(), ["GET /api/songs/statistics"]);

        let lines = render(&app);
        let screen = lines.join("\n");
        assert!(!screen.contains("Loading..."));
        assert!(screen.contains("Jazz: 5"));
        assert!(screen.contains("Miles: 5 songs, 3 albums"));
        assert!(screen.contains("Kind of Blue: 4"));

        let (row, line) = lines
            .iter()
            .enumerate()
            .find(|(_, l)| l.contains("Total Songs"))
            .unwrap();
        let byte = line.find("Total Songs").unwrap();
        let column = line[..byte].chars().count();
        assert_eq!(lines[row + 1].chars().nth(column), Some('5'));
    }

    #[test]
    fn header_digits_and_path_prompt_route_between_views() {
        let (mut app, _) = start(FakeServer::default(), "/");

        app.handle_key(KeyCode::Char('3'));
        assert_eq!(app.route, Some(Route::Statistics));
        assert_eq!(pending_load(&app), Some(&PendingLoad::Statistics));

        app.handle_key(KeyCode::Char(':'));
        type_text(&mut app, "edit/42");
        app.handle_key(KeyCode::Enter);
        assert_eq!(app.route, Some(Route::EditSong("42".into())));
        assert_eq!(pending_load(&app), Some(&PendingLoad::Song("42".into())));
    }

    #[test]
    fn form_screens_take_digits_as_text_and_ctrl_for_links() {
        let (mut app, _) = start(FakeServer::default(), "/create");

        type_text(&mut app, "1999");
        assert_eq!(editor(&app).form.title, "1999");
        assert_eq!(app.route, Some(Route::CreateSong));

        assert!(!app.handle_ctrl('t'));
        assert_eq!(app.route, Some(Route::Statistics));
        assert!(!app.handle_ctrl('l'));
        assert_eq!(app.route, Some(Route::SongList));
        assert!(!app.handle_ctrl('n'));
        assert_eq!(app.route, Some(Route::CreateSong));
        assert!(!app.handle_ctrl('x'));
        assert_eq!(app.route, Some(Route::CreateSong));
        assert!(app.handle_ctrl('c'));
    }

    #[test]
    fn link_shortcuts_clear_the_notice() {
        let (mut app, _) = start(FakeServer::default(), "/");

        app.set_status("Song deleted successfully!", StatusKind::Info);
        app.handle_ctrl('n');
        assert!(app.status.is_none());

        app.set_status("Error loading song.", StatusKind::Error);
        app.handle_ctrl('l');
        assert!(app.status.is_none());
    }

    #[test]
    fn unmatched_path_renders_only_the_shell() {
        let (app, api) = start(FakeServer::default(), "/nowhere");

        assert!(api.calls().is_empty());
        assert!(app.route.is_none());
        let lines = render(&app);
        assert!(lines[1].contains("Song Manager"));
        assert!(lines[1].contains("/nowhere"));
        let (_, content, _) = shell::split(Rect::new(0, 0, 100, 30));
        for line in &lines[content.y as usize..(content.y + content.height) as usize] {
            assert!(line.trim().is_empty(), "unexpected content: {line:?}");
        }
    }

    #[test]
    fn navigating_away_drops_the_late_response() {
        let api = FakeApi::new(FakeServer {
            songs: vec![song("1", "A", "X")],
            statistics: Some(snapshot()),
            ..FakeServer::default()
        });
        api.gate.close();
        let mut app = App::new(Box::new(api.clone()), "http://fake", "/songs/statistics");

        app.navigate(Route::SongList);
        assert_eq!(pending_load(&app), Some(&PendingLoad::Songs));
        api.gate.open();
        settle(&mut app);

        assert_eq!(list(&app).songs.len(), 1);
        assert!(!app.is_busy());
    }

    #[test]
    fn notices_expire() {
        let (mut app, _) = start(FakeServer::default(), "/");
        app.set_status("Song deleted successfully!", StatusKind::Info);
        let shown_at = app.status.as_ref().unwrap().shown_at;

        app.expire_status(shown_at + Duration::from_secs(1));
        assert!(app.status.is_some());

        app.expire_status(shown_at + NOTICE_TTL);
        assert!(app.status.is_none());
    }
}
