use std::time::Duration;

use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::{Method, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::ApiError;

/// Path prefix every song endpoint lives under.
const SONGS_PATH: [&str; 2] = ["api", "songs"];

/// Blocking HTTP implementation of [`super::SongApi`].
pub struct HttpSongApi {
    client: Client,
    base: Url,
}

impl HttpSongApi {
    /// Build a client for `base_url`. `None` disables the request timeout
    /// entirely, so a hung request keeps the view loading.
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|source| ApiError::Transport {
                url: base_url.to_string(),
                source,
            })?;
        Self::with_client(base_url, client)
    }

    pub fn with_client(base_url: &str, client: Client) -> Result<Self, ApiError> {
        let base =
            Url::parse(base_url).map_err(|_| ApiError::InvalidBaseUrl(base_url.to_string()))?;
        if base.cannot_be_a_base() {
            return Err(ApiError::InvalidBaseUrl(base_url.to_string()));
        }
        Ok(Self { client, base })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// Resolve `/api/songs/<segments..>` against the base url, keeping any path
    /// prefix the base carries. Each segment is percent-encoded on its own.
    pub(crate) fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.base.clone();
        url.set_query(None);
        url.set_fragment(None);
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|_| ApiError::InvalidBaseUrl(self.base.to_string()))?;
            path.pop_if_empty().extend(SONGS_PATH).extend(segments);
        }
        Ok(url)
    }

    pub(crate) fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, ApiError> {
        tracing::debug!(method = "GET", %url, "API request started");
        let response = self.execute(self.client.get(url.clone()), &url)?;
        decode(response, &url)
    }

    pub(crate) fn send_json<T, B>(&self, method: Method, url: Url, body: &B) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        tracing::debug!(%method, %url, "API request started");
        let request = self.client.request(method, url.clone()).json(body);
        let response = self.execute(request, &url)?;
        decode(response, &url)
    }

    /// Issue a request whose response body is ignored.
    pub(crate) fn send_empty(&self, method: Method, url: Url) -> Result<(), ApiError> {
        tracing::debug!(%method, %url, "API request started");
        self.execute(self.client.request(method, url.clone()), &url)?;
        Ok(())
    }

    fn execute(&self, request: RequestBuilder, url: &Url) -> Result<Response, ApiError> {
        let response = request.send().map_err(|source| ApiError::Transport {
            url: url.to_string(),
            source,
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status {
                url: url.to_string(),
                status,
            });
        }
        Ok(response)
    }
}

fn decode<T: DeserializeOwned>(response: Response, url: &Url) -> Result<T, ApiError> {
    response.json::<T>().map_err(|source| ApiError::Decode {
        url: url.to_string(),
        source,
    })
}
