use std::fmt;

/// Views reachable by path. Anything else is unmatched and renders no view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    SongList,
    CreateSong,
    EditSong(String),
    Statistics,
}

impl Route {
    /// Map a path onto a route. One trailing slash is tolerated.
    pub fn parse(path: &str) -> Option<Self> {
        let path = path.trim();
        let path = if path.len() > 1 {
            path.strip_suffix('/').unwrap_or(path)
        } else {
            path
        };

        match path {
            "/" => Some(Route::SongList),
            "/create" => Some(Route::CreateSong),
            "/songs/statistics" => Some(Route::Statistics),
            _ => {
                let id = path.strip_prefix("/edit/")?;
                if id.is_empty() || id.contains('/') {
                    None
                } else {
                    Some(Route::EditSong(id.to_string()))
                }
            }
        }
    }

    pub fn path(&self) -> String {
        match self {
            Route::SongList => "/".to_string(),
            Route::CreateSong => "/create".to_string(),
            Route::EditSong(id) => format!("/edit/{id}"),
            Route::Statistics => "/songs/statistics".to_string(),
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}
