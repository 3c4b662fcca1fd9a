use std::{fmt, num::NonZeroUsize, result, sync::Arc, time::Duration};

use futures::future::try_join_all;
use log::{error, info, trace};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use tokio::sync::{watch, Semaphore};

use crate::episode::{ApiEpisode, Character, Episode, EpisodePage};

#[derive(Debug)]
pub enum LoadError {
    Http(reqwest::Error),
    Status(StatusCode, String),
    Parse(serde_json::Error),
    Cancelled,
}

pub type Result<T> = result::Result<T, LoadError>;

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Http(e) => write!(f, "request failed: {e}"),
            Self::Status(status, url) => write!(f, "{url} answered {status}"),
            Self::Parse(e) => write!(f, "unexpected payload: {e}"),
            Self::Cancelled => f.write_str("cancelled"),
        }
    }
}

impl std::error::Error for LoadError {}

/// Cancellation handle shared between a load and whoever may abort it.
#[derive(Debug, Clone)]
pub struct Cancel(Arc<watch::Sender<bool>>);

impl Cancel {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(false);
        Self(Arc::new(tx))
    }

    pub fn cancel(&self) {
        self.0.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.0.borrow()
    }

    pub async fn cancelled(&self) {
        let mut rx = self.0.subscribe();
        // the sender lives in `self`, so this only returns once cancelled
        let _ = rx.wait_for(|cancelled| *cancelled).await;
    }
}

impl Default for Cancel {
    fn default() -> Self {
        Self::new()
    }
}

/// Fetches the first page of episodes and up to
/// [`MAX_CHARACTERS`](crate::episode::MAX_CHARACTERS) characters for each.
///
/// Every request takes a permit from one semaphore, so no more than
/// `max_requests` are in flight across the whole load.
pub struct Loader {
    client: Client,
    api_url: String,
    permits: Arc<Semaphore>,
}

impl Loader {
    pub fn new(api_url: &str, max_requests: NonZeroUsize, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build().map_err(|e| {
            error!("couldn't build http client: {e}");
            LoadError::Http(e)
        })?;

        Ok(Self {
            client,
            api_url: api_url.trim_end_matches('/').to_owned(),
            permits: Arc::new(Semaphore::new(max_requests.get())),
        })
    }

    /// All or nothing: any failed request fails the whole load.
    pub async fn load(&self, cancel: &Cancel) -> Result<Vec<Episode>> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                info!("catalog load cancelled");
                Err(LoadError::Cancelled)
            }
            episodes = self.fetch_all() => episodes,
        }
    }

    async fn fetch_all(&self) -> Result<Vec<Episode>> {
        let url = format!("{}/episode", self.api_url);
        let page: EpisodePage = self.get_json(&url).await?;

        info!("{} episodes listed, fetching characters", page.results.len());

        // try_join_all yields in input order, whatever order responses land in
        try_join_all(page.results.into_iter().map(|ep| self.enrich(ep))).await
    }

    async fn enrich(&self, episode: ApiEpisode) -> Result<Episode> {
        let characters: Vec<Character> = try_join_all(
            episode
                .character_refs()
                .iter()
                .map(|url| self.get_json::<Character>(url)),
        )
        .await?;

        trace!("episode {}: {} characters", episode.id, characters.len());
        Ok((episode, characters).into())
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        let _permit = self.permits.acquire().await.map_err(|_| LoadError::Cancelled)?;

        trace!("GET {url}");
        let response = self.client.get(url).send().await.map_err(|e| {
            error!("GET {url}: {e}");
            LoadError::Http(e)
        })?;

        let status = response.status();
        if !status.is_success() {
            error!("GET {url}: status {status}");
            return Err(LoadError::Status(status, url.to_owned()));
        }

        let body = response.bytes().await.map_err(|e| {
            error!("GET {url}: reading body: {e}");
            LoadError::Http(e)
        })?;

        serde_json::from_slice(&body).map_err(|e| {
            error!("GET {url}: couldn't parse body: {e}");
            LoadError::Parse(e)
        })
    }
}
