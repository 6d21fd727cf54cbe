use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// The fixed label set produced by the 4-stem backends.
pub const STEM_NAMES: [&str; 4] = ["vocals", "drums", "bass", "other"];

/// Mapping from stem label ("vocals", "drums", ...) to the file holding that
/// stem. Serializes to a single JSON object.
#[derive(Clone, Debug, Default, Serialize)]
pub struct StemSet(BTreeMap<String, PathBuf>);

impl StemSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, label: impl Into<String>, path: impl Into<PathBuf>) {
        self.0.insert(label.into(), path.into());
    }

    pub fn get(&self, label: &str) -> Option<&Path> {
        self.0.get(label).map(PathBuf::as_path)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Path)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_path()))
    }
}

/// Randomly generated identifier namespacing one upload's files.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Token(String);

impl Token {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stem_set_serializes_to_one_json_object() {
        let mut stems = StemSet::new();
        stems.insert("vocals", "/out/vocals.mp3");
        stems.insert("drums", "/out/drums.mp3");

        let json = serde_json::to_value(&stems).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "drums": "/out/drums.mp3",
                "vocals": "/out/vocals.mp3",
            })
        );
    }

    #[test]
    fn tokens_are_unique() {
        let a = Token::generate();
        let b = Token::generate();
        assert_ne!(a, b);
        assert_eq!(a.as_str().len(), 36);
    }
}
