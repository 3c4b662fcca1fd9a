use std::{mem, result, sync::Arc};

use log::{error, info, trace};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use warp::http;

use crate::catalog::{Cancel, Loader};
use crate::episode::Episode;
use crate::favorites::{Change, FavoritesStore, Toggle};
use crate::form::{EpisodeForm, FormErrors};
use crate::notification::Notification;

/// Everything the page shows, owned here and handed to the routes.
pub struct Board {
    catalog: Vec<Episode>,
    loading: bool,
    favorites: FavoritesStore,
    form: EpisodeForm,
    // form output, deliberately kept apart from the catalog
    created: Vec<Episode>,
    notifications: Vec<Notification>,
}

pub type SharedBoard = Arc<Mutex<Board>>;

#[derive(Copy, Clone, Debug)]
pub enum Error {
    NotFound,
    BadRequest,
}

pub type Result<T> = result::Result<T, Error>;

impl From<Error> for http::StatusCode {
    fn from(e: Error) -> http::StatusCode {
        match e {
            Error::NotFound => http::StatusCode::NOT_FOUND,
            Error::BadRequest => http::StatusCode::BAD_REQUEST,
        }
    }
}

impl warp::reject::Reject for Error {}

/// Field edits from the page. Absent fields are left alone.
#[derive(Debug, Default, Deserialize)]
pub struct FormInput {
    pub title: Option<String>,
    pub characters: Option<String>,
}

#[serde_with::skip_serializing_none]
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct FormState {
    pub title_error: Option<&'static str>,
    pub characters_error: Option<&'static str>,
    pub valid: bool,
}

impl Board {
    pub fn new(favorites: FavoritesStore) -> Self {
        Self {
            catalog: vec![],
            loading: true,
            favorites,
            form: EpisodeForm::new(),
            created: vec![],
            notifications: vec![],
        }
    }

    pub fn shared(self) -> SharedBoard {
        Arc::new(Mutex::new(self))
    }

    pub fn catalog(&self) -> &[Episode] {
        &self.catalog
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn favorites(&self) -> &FavoritesStore {
        &self.favorites
    }

    pub fn form(&self) -> &EpisodeForm {
        &self.form
    }

    pub fn created(&self) -> &[Episode] {
        &self.created
    }

    pub fn notify(&mut self, notification: Notification) {
        trace!("notify {:?}: {}", notification.level, notification.message);
        self.notifications.push(notification);
    }

    pub fn take_notifications(&mut self) -> Vec<Notification> {
        mem::take(&mut self.notifications)
    }

    fn publish_catalog(&mut self, catalog: Vec<Episode>) {
        self.catalog = catalog;
        self.loading = false;
    }

    pub fn toggle_favorite(&mut self, id: i64) -> Result<Change> {
        let episode = self
            .catalog
            .iter()
            .chain(self.favorites.favorites())
            .chain(&self.created)
            .find(|ep| ep.id == id)
            .cloned()
            .ok_or_else(|| {
                error!("no episode {id} to toggle");
                Error::NotFound
            })?;

        let Toggle {
            change,
            notification,
            persisted,
        } = self.favorites.toggle(episode);

        self.notify(notification);
        if persisted.is_err() {
            self.notify(Notification::error(
                "Favorites couldn't be saved, they're kept for this session only.",
            ));
        }

        Ok(change)
    }

    fn apply(&mut self, input: FormInput) {
        if let Some(title) = input.title {
            self.form.set_title(title);
        }
        if let Some(characters) = input.characters {
            self.form.set_characters(characters);
        }
    }

    pub fn form_state(&self) -> FormState {
        let FormErrors { title, characters } = self.form.errors();

        FormState {
            title_error: title,
            characters_error: characters,
            valid: self.form.is_valid(),
        }
    }

    /// An edit has to name at least one field.
    pub fn update_form(&mut self, input: FormInput) -> Result<FormState> {
        if input.title.is_none() && input.characters.is_none() {
            error!("form update without any field");
            return Err(Error::BadRequest);
        }

        self.apply(input);
        Ok(self.form_state())
    }

    pub fn submit_form(&mut self, input: FormInput) -> result::Result<(), FormErrors> {
        self.apply(input);

        let created = &mut self.created;
        let notification = self.form.submit(|ep| created.push(ep))?;
        self.notify(notification);

        Ok(())
    }
}

/// Runs one catalog load and publishes the outcome. A cancelled load
/// leaves the board untouched.
pub async fn load_catalog(board: &SharedBoard, loader: &Loader, cancel: &Cancel) {
    board.lock().await.loading = true;

    let result = loader.load(cancel).await;
    if cancel.is_cancelled() {
        return;
    }

    let mut board = board.lock().await;
    match result {
        Ok(episodes) => {
            info!("catalog loaded, {} episodes", episodes.len());
            board.publish_catalog(episodes);
        }
        Err(e) => {
            error!("couldn't load the episodes: {e}");
            board.publish_catalog(vec![]);
            board.notify(Notification::error("Couldn't load the episodes."));
        }
    }
}
