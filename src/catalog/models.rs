use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// One playable song as served by `/getMusicList`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    pub id: String,
    #[serde(rename = "name")]
    pub title: String,
    #[serde(rename = "singer")]
    pub artist: String,
    #[serde(rename = "posterUrl", default)]
    pub poster_url: String,
    #[serde(rename = "songUrl", default)]
    pub audio_url: String,
    /// Raw LRC text, possibly empty.
    #[serde(rename = "lyric", default)]
    pub lyric_text: String,
}

/// Ordered collection of tracks for a session. Ids are unique.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
    tracks: Vec<Track>,
}

impl Catalog {
    /// Build a catalog, keeping the first track for any repeated id.
    pub fn new(tracks: Vec<Track>) -> Self {
        let mut seen = HashSet::with_capacity(tracks.len());
        let mut kept = Vec::with_capacity(tracks.len());
        for t in tracks {
            if seen.insert(t.id.clone()) {
                kept.push(t);
            } else {
                tracing::warn!(id = %t.id, title = %t.title, "dropping duplicate catalog id");
            }
        }
        Self { tracks: kept }
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn get(&self, id: &str) -> Option<&Track> {
        self.tracks.iter().find(|t| t.id == id)
    }

    pub fn position(&self, id: &str) -> Option<usize> {
        self.tracks.iter().position(|t| t.id == id)
    }

    pub fn first(&self) -> Option<&Track> {
        self.tracks.first()
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn into_tracks(self) -> Vec<Track> {
        self.tracks
    }
}

#[cfg(test)]
pub(crate) fn make_track(id: &str) -> Track {
    Track {
        id: id.to_string(),
        title: format!("Track {id}"),
        artist: "Artist".to_string(),
        poster_url: String::new(),
        audio_url: format!("http://localhost:3000/assets/songs/{id}.mp3"),
        lyric_text: String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_names() {
        let raw = r#"[{"id":"a","name":"Song","singer":"Singer","posterUrl":"p","songUrl":"s","lyric":"[00:01.00]hi"}]"#;
        let tracks: Vec<Track> = serde_json::from_str(raw).unwrap();
        assert_eq!(tracks[0].title, "Song");
        assert_eq!(tracks[0].artist, "Singer");
        assert_eq!(tracks[0].audio_url, "s");
        assert_eq!(tracks[0].lyric_text, "[00:01.00]hi");

        let back = serde_json::to_value(&tracks[0]).unwrap();
        assert_eq!(back["songUrl"], "s");
        assert_eq!(back["name"], "Song");
    }

    #[test]
    fn test_duplicate_ids_keep_first() {
        let mut dup = make_track("a");
        dup.title = "Other".into();
        let catalog = Catalog::new(vec![make_track("a"), make_track("b"), dup]);
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.get("a").unwrap().title, "Track a");
        assert_eq!(catalog.position("b"), Some(1));
    }
}
