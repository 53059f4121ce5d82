//! Word-wrap filter
//!
//! Reflows text into lines of at most `line_len_max` code points, breaking at
//! the last whitespace of a full line when there is one and hard-breaking
//! overlong tokens otherwise.
//!
//! Explicit line breaks in the input (CR, LF, CRLF as one event) either end
//! the current output line (`keep_nl`) or are folded into the reflow like any
//! other whitespace. Whitespace is stored as a single blank; a blank is never
//! stored at the start of a line, and whitespace arriving at a full line
//! becomes the line break itself.
//!
//! Every emitted line is stripped of trailing blanks, whichever way it ends:
//! word carry, hard break, explicit break or end of input. Whatever is still
//! buffered when the input ends is flushed.

use crate::pipeline::filter::{CodePointFilter, BLANK, CR, NL};
use std::num::NonZeroUsize;

/// A filter that word-wraps text to a fixed width.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordWrapFilter {
    line_len_max: usize,
    keep_nl: bool,
    last_char_cr: bool,
    /// Current output line, never longer than `line_len_max`
    line: Vec<char>,
}

impl WordWrapFilter {
    /// Create a new WordWrapFilter.
    pub fn new(line_len_max: NonZeroUsize, keep_nl: bool) -> Self {
        WordWrapFilter {
            line_len_max: line_len_max.get(),
            keep_nl,
            last_char_cr: false,
            line: Vec::new(),
        }
    }

    fn flush(&mut self, out: &mut Vec<char>) {
        emit_line(&self.line, out);
        self.line.clear();
    }
}

fn emit_line(line: &[char], out: &mut Vec<char>) {
    let end = line.iter().rposition(|&c| c != BLANK).map_or(0, |i| i + 1);
    out.extend_from_slice(&line[..end]);
    out.push(NL);
}

impl CodePointFilter for WordWrapFilter {
    fn name(&self) -> &'static str {
        "wordwrap"
    }

    fn on_char(&mut self, c: char, out: &mut Vec<char>) {
        let after_cr = std::mem::replace(&mut self.last_char_cr, c == CR);

        match c {
            NL if after_cr => {}
            CR | NL if self.keep_nl => self.flush(out),
            c if c.is_whitespace() => {
                let n = self.line.len();
                if n >= self.line_len_max {
                    self.flush(out);
                } else if n > 0 {
                    self.line.push(BLANK);
                }
            }
            c if self.line.len() < self.line_len_max => self.line.push(c),
            c => match self.line.iter().rposition(|ch| ch.is_whitespace()) {
                Some(k) => {
                    // Carry the unfinished word over to the next line
                    emit_line(&self.line[..k], out);
                    self.line.drain(..=k);
                    self.line.push(c);
                }
                None => {
                    self.flush(out);
                    self.line.push(c);
                }
            },
        }
    }

    fn finish(&mut self, out: &mut Vec<char>) {
        if !self.line.is_empty() {
            self.flush(out);
        }
    }
}
