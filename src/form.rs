use lazy_static::lazy_static;
use log::info;
use regex::Regex;
use serde::Serialize;

use crate::episode::{Character, Episode};
use crate::notification::Notification;
use crate::time::{today, Timestamp};

pub const MIN_TITLE_LEN: usize = 6;
pub const PLACEHOLDER_CODE: &str = "S00E00";
pub const PLACEHOLDER_IMAGE: &str = "https://rickandmortyapi.com/api/character/avatar/19.jpeg";

pub const TITLE_REQUIRED: &str = "title is required";
pub const TITLE_TOO_SHORT: &str = "title must be at least 6 characters";
pub const IDS_REQUIRED: &str = "ids are required";
pub const IDS_FORMAT: &str = "invalid format — use a pattern like 10-2-35-12-15";

lazy_static! {
    static ref CHARACTER_IDS: Regex =
        Regex::new(r"^[0-9]+-[0-9]+-[0-9]+-[0-9]+-[0-9]+$").unwrap();
}

#[derive(Debug, Default, Clone)]
struct Field {
    value: String,
    touched: bool,
}

impl Field {
    fn edited(value: String) -> Self {
        Self {
            value,
            touched: true,
        }
    }
}

/// Per-field messages. `None` means the field is fine (or untouched).
#[serde_with::skip_serializing_none]
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct FormErrors {
    pub title: Option<&'static str>,
    pub characters: Option<&'static str>,
}

impl FormErrors {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.characters.is_none()
    }
}

/// Draft of a locally made episode. Fields re-validate on every edit.
#[derive(Debug, Default)]
pub struct EpisodeForm {
    title: Field,
    characters: Field,
}

fn validate_title(title: &str) -> Result<(), &'static str> {
    if title.is_empty() {
        Err(TITLE_REQUIRED)
    } else if title.chars().count() < MIN_TITLE_LEN {
        Err(TITLE_TOO_SHORT)
    } else {
        Ok(())
    }
}

fn parse_character_ids(ids: &str) -> Result<Vec<i64>, &'static str> {
    if ids.is_empty() {
        return Err(IDS_REQUIRED);
    }
    if !CHARACTER_IDS.is_match(ids) {
        return Err(IDS_FORMAT);
    }

    // digits only by now, but may still overflow
    ids.split('-')
        .map(|id| id.parse().map_err(|_| IDS_FORMAT))
        .collect()
}

fn synthesize_character(id: i64) -> Character {
    Character {
        id,
        name: format!("Character {id}"),
        image: PLACEHOLDER_IMAGE.into(),
    }
}

impl EpisodeForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(&self) -> &str {
        &self.title.value
    }

    pub fn characters(&self) -> &str {
        &self.characters.value
    }

    pub fn set_title(&mut self, value: impl Into<String>) {
        self.title = Field::edited(value.into());
    }

    pub fn set_characters(&mut self, value: impl Into<String>) {
        self.characters = Field::edited(value.into());
    }

    fn all_errors(&self) -> FormErrors {
        FormErrors {
            title: validate_title(&self.title.value).err(),
            characters: parse_character_ids(&self.characters.value).err(),
        }
    }

    /// Messages to show: only fields the user has touched report.
    pub fn errors(&self) -> FormErrors {
        let all = self.all_errors();

        FormErrors {
            title: all.title.filter(|_| self.title.touched),
            characters: all.characters.filter(|_| self.characters.touched),
        }
    }

    /// Whether submitting is allowed, touched or not.
    pub fn is_valid(&self) -> bool {
        self.all_errors().is_empty()
    }

    /// Builds the episode and hands it to `on_add`, then clears the form.
    /// An invalid form only marks every field touched.
    pub fn submit(&mut self, on_add: impl FnOnce(Episode)) -> Result<Notification, FormErrors> {
        let ids = match (
            validate_title(&self.title.value),
            parse_character_ids(&self.characters.value),
        ) {
            (Ok(()), Ok(ids)) => ids,
            (title, characters) => {
                self.title.touched = true;
                self.characters.touched = true;
                return Err(FormErrors {
                    title: title.err(),
                    characters: characters.err(),
                });
            }
        };

        let title = std::mem::take(&mut self.title.value);
        let episode = Episode {
            id: Timestamp::now().as_millis(),
            name: title.clone(),
            // today() has already logged a failure
            air_date: today().unwrap_or_default(),
            episode: PLACEHOLDER_CODE.into(),
            character: ids.into_iter().map(synthesize_character).collect(),
        };

        info!("created episode {} \"{title}\"", episode.id);
        on_add(episode);
        *self = Self::default();

        Ok(Notification::success(format!(
            "Episode \"{title}\" created."
        )))
    }
}
