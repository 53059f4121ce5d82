//! Substitution map loading
//!
//! The map file is a JSON object keyed by hexadecimal code points:
//!
//! ```json
//! {
//!     "00A0": { "value": " ", "xmlencoded": false },
//!     "2014": { "value": "&mdash;&mdash;", "xmlencoded": true }
//! }
//! ```
//!
//! Values flagged `xmlencoded` are HTML-entity decoded once, at load time.
//! Lookups use the uppercase, zero-padded (at least 4 digits) rendering of a
//! code point, so only keys in that form can ever match. Other keys are
//! dropped while loading.

use crate::error::{CharMapError, ReflowError, ReflowResult};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

static CANONICAL_KEY: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9A-F]{4,}$").unwrap());

/// One entry of the map file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct MapEntry {
    value: String,
    xmlencoded: bool,
}

impl MapEntry {
    fn into_replacement(self) -> String {
        if self.xmlencoded {
            html_escape::decode_html_entities(&self.value).into_owned()
        } else {
            self.value
        }
    }
}

/// Immutable code point → replacement string table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubstitutionMap {
    entries: HashMap<char, String>,
}

impl SubstitutionMap {
    /// Load a map file from disk.
    pub fn load(path: impl AsRef<Path>) -> ReflowResult<Self> {
        let path = path.as_ref();
        let wrap = |source: CharMapError| ReflowError::CharMap {
            path: path.to_path_buf(),
            source,
        };

        let file = File::open(path).map_err(|e| wrap(e.into()))?;
        let raw: HashMap<String, MapEntry> =
            serde_json::from_reader(BufReader::new(file)).map_err(|e| wrap(e.into()))?;

        let map = Self::from_entries(raw);
        tracing::info!(path = %path.display(), entries = map.len(), "loaded character map");
        Ok(map)
    }

    /// Parse a map from JSON text.
    pub fn from_json_str(json: &str) -> Result<Self, CharMapError> {
        let raw: HashMap<String, MapEntry> = serde_json::from_str(json)?;
        Ok(Self::from_entries(raw))
    }

    fn from_entries(raw: HashMap<String, MapEntry>) -> Self {
        let mut entries = HashMap::with_capacity(raw.len());
        for (key, entry) in raw {
            match canonical_char(&key) {
                Some(c) => {
                    entries.insert(c, entry.into_replacement());
                }
                None => tracing::warn!(key = %key, "character map key can never match, ignored"),
            }
        }
        Self { entries }
    }

    /// Replacement for `c`, if the map has one.
    pub fn get(&self, c: char) -> Option<&str> {
        self.entries.get(&c).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(char, String)> for SubstitutionMap {
    fn from_iter<T: IntoIterator<Item = (char, String)>>(iter: T) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

/// Lookup key for a code point: uppercase hex, at least 4 digits.
pub fn key_for(c: char) -> String {
    format!("{:04X}", u32::from(c))
}

/// The code point a key stands for, if the key is its exact lookup form.
fn canonical_char(key: &str) -> Option<char> {
    if !CANONICAL_KEY.is_match(key) {
        return None;
    }
    let c = u32::from_str_radix(key, 16).ok().and_then(char::from_u32)?;
    // "00041" parses fine but is not what `key_for` produces.
    (key_for(c) == key).then_some(c)
}
