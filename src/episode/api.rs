use serde::Deserialize;

use super::{Character, Episode};

/// Only this many of an episode's character references are fetched.
pub const MAX_CHARACTERS: usize = 5;

/// One page of `GET /episode`. The `info` block is ignored.
#[derive(Debug, Deserialize)]
pub struct EpisodePage {
    pub results: Vec<ApiEpisode>,
}

/// An episode as the remote API sends it: characters are URLs.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiEpisode {
    pub id: i64,
    pub name: String,
    pub air_date: String,
    pub episode: String,
    #[serde(default)]
    pub characters: Vec<String>,
}

impl ApiEpisode {
    pub fn character_refs(&self) -> &[String] {
        let n = self.characters.len().min(MAX_CHARACTERS);
        &self.characters[..n]
    }
}

impl From<(ApiEpisode, Vec<Character>)> for Episode {
    fn from((raw, character): (ApiEpisode, Vec<Character>)) -> Episode {
        let ApiEpisode {
            id,
            name,
            air_date,
            episode,
            characters: _,
        } = raw;

        Self {
            id,
            name,
            air_date,
            episode,
            character,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    const PAGE: &str = r#"{
        "info": { "count": 51, "pages": 3, "next": "https://rickandmortyapi.com/api/episode?page=2", "prev": null },
        "results": [
            {
                "id": 1,
                "name": "Pilot",
                "air_date": "December 2, 2013",
                "episode": "S01E01",
                "characters": [
                    "https://rickandmortyapi.com/api/character/1",
                    "https://rickandmortyapi.com/api/character/2",
                    "https://rickandmortyapi.com/api/character/35",
                    "https://rickandmortyapi.com/api/character/38",
                    "https://rickandmortyapi.com/api/character/62",
                    "https://rickandmortyapi.com/api/character/92"
                ],
                "url": "https://rickandmortyapi.com/api/episode/1",
                "created": "2017-11-10T12:56:33.798Z"
            },
            {
                "id": 2,
                "name": "Lawnmower Dog",
                "air_date": "December 9, 2013",
                "episode": "S01E02",
                "characters": ["https://rickandmortyapi.com/api/character/1"]
            }
        ]
    }"#;

    #[test]
    fn page_parses_and_ignores_extra_fields() {
        let page: EpisodePage = serde_json::from_str(PAGE).unwrap();

        assert_eq!(page.results.len(), 2);
        assert_eq!(page.results[0].name, "Pilot");
        assert_eq!(page.results[0].characters.len(), 6);
        assert_eq!(page.results[1].episode, "S01E02");
    }

    #[test]
    fn character_refs_are_truncated() {
        let page: EpisodePage = serde_json::from_str(PAGE).unwrap();

        let refs = page.results[0].character_refs();
        assert_eq!(refs.len(), MAX_CHARACTERS);
        assert_eq!(refs[4], "https://rickandmortyapi.com/api/character/62");

        assert_eq!(page.results[1].character_refs().len(), 1);
    }

    #[test]
    fn episode_from_raw() {
        let page: EpisodePage = serde_json::from_str(PAGE).unwrap();
        let raw = page.results.into_iter().nth(1).unwrap();
        let rick = Character {
            id: 1,
            name: "Rick Sanchez".into(),
            image: "https://rickandmortyapi.com/api/character/avatar/1.jpeg".into(),
        };

        let ep: Episode = (raw, vec![rick.clone()]).into();

        assert_eq!(
            ep,
            Episode {
                id: 2,
                name: "Lawnmower Dog".into(),
                air_date: "December 9, 2013".into(),
                episode: "S01E02".into(),
                character: vec![rick],
            }
        );
    }
}
