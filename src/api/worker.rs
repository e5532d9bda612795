//! Runs [`SongApi`] calls on a dedicated thread so the event loop never waits
//! on the network. Requests go in over one channel and completions come back
//! over another, each tagged with the [`Ticket`] handed out on submit.

use std::collections::VecDeque;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::thread;
use std::time::Duration;

use super::{ApiError, SongApi};
use crate::models::{Song, StatisticsSnapshot};

/// Identifies one submitted request. Tickets increase monotonically.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket(u64);

#[derive(Debug, Clone)]
pub enum ApiRequest {
    ListSongs,
    GetSong(String),
    CreateSong(Song),
    UpdateSong { id: String, song: Song },
    DeleteSong(String),
    Statistics,
}

#[derive(Debug)]
pub enum ApiResponse {
    Songs(Result<Vec<Song>, ApiError>),
    Song(Result<Song, ApiError>),
    /// Outcome of a create or an update.
    Saved(Result<Song, ApiError>),
    Deleted(Result<(), ApiError>),
    Statistics(Result<StatisticsSnapshot, ApiError>),
}

impl ApiRequest {
    fn run(self, api: &dyn SongApi) -> ApiResponse {
        match self {
            ApiRequest::ListSongs => ApiResponse::Songs(api.list_songs()),
            ApiRequest::GetSong(id) => ApiResponse::Song(api.get_song(&id)),
            ApiRequest::CreateSong(song) => ApiResponse::Saved(api.create_song(&song)),
            ApiRequest::UpdateSong { id, song } => ApiResponse::Saved(api.update_song(&id, &song)),
            ApiRequest::DeleteSong(id) => ApiResponse::Deleted(api.delete_song(&id)),
            ApiRequest::Statistics => ApiResponse::Statistics(api.statistics()),
        }
    }

    /// The response this request produces when it never reaches the server.
    fn fail(self, err: ApiError) -> ApiResponse {
        match self {
            ApiRequest::ListSongs => ApiResponse::Songs(Err(err)),
            ApiRequest::GetSong(_) => ApiResponse::Song(Err(err)),
            ApiRequest::CreateSong(_) | ApiRequest::UpdateSong { .. } => {
                ApiResponse::Saved(Err(err))
            }
            ApiRequest::DeleteSong(_) => ApiResponse::Deleted(Err(err)),
            ApiRequest::Statistics => ApiResponse::Statistics(Err(err)),
        }
    }
}

#[derive(Debug)]
pub struct Completion {
    pub ticket: Ticket,
    pub response: ApiResponse,
}

/// Handle to the background thread that owns the API client.
///
/// Dropping the handle closes the request channel; the thread exits once any
/// call it is still blocked on returns.
pub struct ApiWorker {
    requests: Sender<(Ticket, ApiRequest)>,
    completions: Receiver<Completion>,
    next_ticket: u64,
    /// Failures for requests the thread could not accept.
    undelivered: VecDeque<Completion>,
}

impl ApiWorker {
    pub fn spawn(api: Box<dyn SongApi + Send>) -> Self {
        let (requests, request_r) = mpsc::channel();
        let (completion_s, completions) = mpsc::channel();

        thread::spawn(move || serve(api, request_r, completion_s));

        Self {
            requests,
            completions,
            next_ticket: 0,
            undelivered: VecDeque::new(),
        }
    }

    /// Queue `request` and return the ticket its completion will carry.
    pub fn submit(&mut self, request: ApiRequest) -> Ticket {
        self.next_ticket += 1;
        let ticket = Ticket(self.next_ticket);
        tracing::debug!(?ticket, ?request, "submitting API request");

        if let Err(mpsc::SendError((_, request))) = self.requests.send((ticket, request)) {
            tracing::error!(?ticket, "API worker is gone; failing request");
            self.undelivered.push_back(Completion {
                ticket,
                response: request.fail(ApiError::WorkerStopped),
            });
        }
        ticket
    }

    /// Next finished request, if one is ready.
    pub fn try_recv(&mut self) -> Option<Completion> {
        if let Some(completion) = self.undelivered.pop_front() {
            return Some(completion);
        }
        match self.completions.try_recv() {
            Ok(completion) => Some(completion),
            Err(TryRecvError::Empty | TryRecvError::Disconnected) => None,
        }
    }

    /// Wait up to `timeout` for the next finished request.
    pub fn recv_timeout(&mut self, timeout: Duration) -> Option<Completion> {
        if let Some(completion) = self.undelivered.pop_front() {
            return Some(completion);
        }
        match self.completions.recv_timeout(timeout) {
            Ok(completion) => Some(completion),
            Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => None,
        }
    }
}

fn serve(
    api: Box<dyn SongApi + Send>,
    requests: Receiver<(Ticket, ApiRequest)>,
    completions: Sender<Completion>,
) {
    for (ticket, request) in requests {
        let response = request.run(api.as_ref());
        if completions.send(Completion { ticket, response }).is_err() {
            break;
        }
    }
    tracing::debug!("API worker stopped");
}
