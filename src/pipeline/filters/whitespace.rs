//! Whitespace collapsing filter
//!
//! Collapses interior whitespace runs to a single blank, strips leading
//! whitespace from every line, reduces any run of blank lines to at most one
//! and normalizes CR, LF and CRLF to LF.
//!
//! # Logic
//!
//! For each code point:
//! - CR: end of line, then remember it so that an LF right after it is swallowed
//! - LF: swallowed right after a CR, otherwise end of line
//! - End of line: a line with content is terminated at once. An empty line is
//!   held back as a pending LF if the previous line had content, and dropped
//!   otherwise
//! - Other whitespace: becomes a pending blank, unless the last emitted code
//!   point already was a blank (start of line counts as one)
//! - Anything else: flush the pending LF, then the pending blank, then emit it
//!
//! Pending emissions only materialize once more content arrives, so trailing
//! whitespace and trailing blank lines vanish.

use crate::pipeline::filter::{CodePointFilter, BLANK, CR, NL};

/// A filter that collapses whitespace and blank-line runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WhitespaceFilter {
    /// Code points emitted on the current output line
    line_len: usize,
    last_char_blank: bool,
    last_char_cr: bool,
    last_line_empty: bool,
    pending_blank: bool,
    pending_nl: bool,
}

impl WhitespaceFilter {
    /// Create a new WhitespaceFilter positioned at the start of a line.
    pub fn new() -> Self {
        WhitespaceFilter {
            line_len: 0,
            last_char_blank: true,
            last_char_cr: false,
            last_line_empty: true,
            pending_blank: false,
            pending_nl: false,
        }
    }

    fn newline(&mut self, out: &mut Vec<char>) {
        out.push(NL);
        self.last_line_empty = self.line_len == 0;
        self.line_len = 0;
        self.last_char_blank = true;
        self.pending_blank = false;
        self.pending_nl = false;
    }
}

impl Default for WhitespaceFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl CodePointFilter for WhitespaceFilter {
    fn name(&self) -> &'static str {
        "whitespace"
    }

    fn on_char(&mut self, c: char, out: &mut Vec<char>) {
        let after_cr = std::mem::replace(&mut self.last_char_cr, c == CR);

        match c {
            NL if after_cr => {}
            CR | NL => {
                if self.line_len > 0 {
                    self.newline(out);
                } else if !self.last_line_empty {
                    self.pending_nl = true;
                }
            }
            c if c.is_whitespace() => {
                if !self.last_char_blank {
                    self.pending_blank = true;
                }
            }
            c => {
                if self.pending_nl {
                    self.newline(out);
                }
                if self.pending_blank {
                    out.push(BLANK);
                    self.line_len += 1;
                    self.last_char_blank = true;
                    self.pending_blank = false;
                }
                out.push(c);
                self.line_len += 1;
                self.last_char_blank = false;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::filter::apply_str;
    use rstest::rstest;

    fn collapse(input: &str) -> String {
        apply_str(&mut WhitespaceFilter::new(), input)
    }

    #[rstest]
    #[case::interior_run("a   b", "a b")]
    #[case::leading_blanks("  a", "a")]
    #[case::blank_line_run("a\n\n\n\nb", "a\n\nb")]
    #[case::single_blank_line_kept("a\n\nb", "a\n\nb")]
    #[case::single_newline("a\nb", "a\nb")]
    #[case::tabs_and_mixed("a\t \u{A0}b", "a b")]
    #[case::leading_whitespace_each_line("  a\n\t b", "a\nb")]
    #[case::trailing_blanks_dropped("a   \nb", "a\nb")]
    #[case::trailing_newline_kept("a\n", "a\n")]
    #[case::trailing_blank_lines_dropped("a\n\n\n", "a\n")]
    #[case::leading_blank_lines_dropped("\n\n  \na", "a")]
    #[case::whitespace_only("  \n \t\n", "")]
    #[case::empty("", "")]
    fn test_collapse(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(collapse(input), expected);
    }

    #[rstest]
    #[case::crlf("a\r\nb", "a\nb")]
    #[case::lone_cr("a\rb", "a\nb")]
    #[case::crlf_blank_line("a\r\n\r\nb", "a\n\nb")]
    #[case::crlf_blank_line_run("a\r\n\r\n\r\n\r\nb", "a\n\nb")]
    #[case::lfcr("a\n\rb", "a\n\nb")]
    #[case::cr_cr_lf("a\r\r\nb", "a\n\nb")]
    fn test_line_break_normalization(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(collapse(input), expected);
    }

    #[test]
    fn test_lf_swallowed_only_directly_after_cr() {
        // The blank between CR and LF breaks the CRLF pair
        assert_eq!(collapse("a\r \nb"), "a\n\nb");
    }

    #[test]
    fn test_pending_blank_discarded_by_pending_newline() {
        assert_eq!(collapse("a\n\n   b c"), "a\n\nb c");
    }

    #[test]
    fn test_state_after_content() {
        let mut filter = WhitespaceFilter::new();
        let mut out = Vec::new();
        for c in "ab ".chars() {
            filter.on_char(c, &mut out);
        }
        assert_eq!(out, vec!['a', 'b']);
        assert_eq!(filter.line_len, 2);
        assert!(filter.pending_blank);
        assert!(!filter.last_char_blank);
    }

    #[test]
    fn test_idempotent_on_sample() {
        let once = collapse("  Hello,   world!\r\n\r\n\r\n\tSecond   paragraph \n  ");
        assert_eq!(once, "Hello, world!\n\nSecond paragraph\n");
        assert_eq!(collapse(&once), once);
    }
}
