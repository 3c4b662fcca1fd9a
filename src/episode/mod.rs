mod api;
pub use api::{ApiEpisode, EpisodePage, MAX_CHARACTERS};

mod episode;
pub use episode::{Character, Episode};
