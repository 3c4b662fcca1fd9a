use std::collections::HashSet;

use log::{error, info, warn};

use crate::backend::{Backend, StorageError};
use crate::episode::Episode;
use crate::notification::Notification;

pub const FAVORITES_KEY: &str = "favorites";

/// Favorited episodes in the order they were added, persisted wholesale
/// under [`FAVORITES_KEY`] after every toggle.
pub struct FavoritesStore {
    backend: Backend,
    favorites: Vec<Episode>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Change {
    Added,
    Removed,
}

#[derive(Debug)]
#[must_use]
pub struct Toggle {
    pub change: Change,
    pub notification: Notification,
    /// The in-memory change stands even when this is an error.
    pub persisted: Result<(), StorageError>,
}

impl FavoritesStore {
    /// Reads the stored favorites once. Nothing stored, or anything
    /// unreadable, gives an empty store.
    pub fn hydrate(backend: Backend) -> Self {
        let stored = match backend.read_json::<Vec<Episode>>(FAVORITES_KEY) {
            Ok(Some(favorites)) => favorites,
            Ok(None) => vec![],
            Err(e) => {
                error!("couldn't read stored favorites, starting empty: {e}");
                vec![]
            }
        };

        let mut seen = HashSet::new();
        let count = stored.len();
        let favorites: Vec<_> = stored
            .into_iter()
            .filter(|ep| seen.insert(ep.id))
            .collect();

        if favorites.len() != count {
            warn!(
                "dropped {} duplicate stored favorites",
                count - favorites.len()
            );
        }
        info!("hydrated {} favorites", favorites.len());

        Self { backend, favorites }
    }

    pub fn favorites(&self) -> &[Episode] {
        &self.favorites
    }

    pub fn is_favorite(&self, id: i64) -> bool {
        self.favorites.iter().any(|fav| fav.id == id)
    }

    pub fn toggle(&mut self, episode: Episode) -> Toggle {
        let existing = self.favorites.iter().position(|fav| fav.id == episode.id);

        let (change, notification) = match existing {
            Some(i) => {
                self.favorites.remove(i);
                (
                    Change::Removed,
                    Notification::error(format!("\"{}\" removed from favorites.", episode.name)),
                )
            }
            None => {
                let notification =
                    Notification::success(format!("\"{}\" added to favorites.", episode.name));
                self.favorites.push(episode);
                (Change::Added, notification)
            }
        };

        info!("favorites: {change:?}, now {}", self.favorites.len());

        let persisted = self.backend.write_json(FAVORITES_KEY, &self.favorites);
        if let Err(ref e) = persisted {
            warn!("favorites only held in memory, couldn't persist: {e}");
        }

        Toggle {
            change,
            notification,
            persisted,
        }
    }
}
