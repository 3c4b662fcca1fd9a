use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Episode {
    pub id: i64,
    pub name: String,
    pub air_date: String, // free-form, shown as given
    pub episode: String,  // e.g. "S01E01"
    #[serde(default)]
    pub character: Vec<Character>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Character {
    pub id: i64,
    pub name: String,
    pub image: String,
}
