//! Character substitution filter
//!
//! Every code point with an entry in the [`SubstitutionMap`] is replaced by
//! the code points of its replacement string (possibly none); every other
//! code point passes through unchanged.

use crate::charmap::SubstitutionMap;
use crate::pipeline::filter::CodePointFilter;
use std::sync::Arc;

/// A filter that rewrites individual code points through a substitution map.
pub struct CharMapFilter {
    map: Arc<SubstitutionMap>,
}

impl CharMapFilter {
    /// Create a new CharMapFilter over a shared map.
    pub fn new(map: Arc<SubstitutionMap>) -> Self {
        CharMapFilter { map }
    }
}

impl CodePointFilter for CharMapFilter {
    fn name(&self) -> &'static str {
        "charmap"
    }

    fn on_char(&mut self, c: char, out: &mut Vec<char>) {
        match self.map.get(c) {
            Some(replacement) => out.extend(replacement.chars()),
            None => out.push(c),
        }
    }
}
