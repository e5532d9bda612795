use reqwest::Method;

use super::{ApiError, HttpSongApi, SongApi};
use crate::models::{Song, StatisticsSnapshot};

impl SongApi for HttpSongApi {
    fn list_songs(&self) -> Result<Vec<Song>, ApiError> {
        let result = self.endpoint(&[]).and_then(|url| self.get_json(url));
        log_api_result!("list_songs", result);
        result
    }

    fn get_song(&self, id: &str) -> Result<Song, ApiError> {
        let result = self.endpoint(&[id]).and_then(|url| self.get_json(url));
        log_api_result!("get_song", result);
        result
    }

    fn create_song(&self, song: &Song) -> Result<Song, ApiError> {
        let result = self
            .endpoint(&[])
            .and_then(|url| self.send_json(Method::POST, url, &song.payload()));
        log_api_result!("create_song", result);
        result
    }

    fn update_song(&self, id: &str, song: &Song) -> Result<Song, ApiError> {
        let result = self
            .endpoint(&[id])
            .and_then(|url| self.send_json(Method::PUT, url, &song.payload()));
        log_api_result!("update_song", result);
        result
    }

    fn delete_song(&self, id: &str) -> Result<(), ApiError> {
        let result = self
            .endpoint(&[id])
            .and_then(|url| self.send_empty(Method::DELETE, url));
        log_api_result!("delete_song", result);
        result
    }

    fn statistics(&self) -> Result<StatisticsSnapshot, ApiError> {
        let result = self
            .endpoint(&["statistics"])
            .and_then(|url| self.get_json(url));
        log_api_result!("statistics", result);
        result
    }
}
