use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artist {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    pub id: u64,
    pub title: String,
    pub artist: Artist,
    /// URL of the 30-second preview clip.
    pub preview: String,
}

/// Body of the catalog's `search` endpoint. A body without `data` reads as no results.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub data: Vec<Track>,
}

impl Track {
    /// Row label shown in track lists.
    pub fn display_label(&self) -> String {
        format!("{} — {}", self.title, self.artist.name)
    }
}

#[cfg(test)]
impl Track {
    pub fn mock(id: u64, title: &str, artist: &str) -> Self {
        Self {
            id,
            title: title.to_string(),
            artist: Artist {
                name: artist.to_string(),
            },
            preview: format!("http://cdn.example.com/preview/{}.mp3", id),
        }
    }
}
