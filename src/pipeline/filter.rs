//! Code point filter trait
//!
//! A filter is a Mealy machine over a code point stream: for every incoming
//! code point it updates private state and emits zero or more code points.
//! When the input ends it gets one last chance to emit whatever it still
//! holds.
//!
//! Filters are plain synchronous state machines. Running them concurrently
//! is the job of [`stage`](crate::pipeline::stage); running them in-line over
//! a string is what [`apply_str`] does.
//!
//! # Examples
//!
//! ```ignore
//! struct Upper;
//!
//! impl CodePointFilter for Upper {
//!     fn name(&self) -> &'static str {
//!         "upper"
//!     }
//!
//!     fn on_char(&mut self, c: char, out: &mut Vec<char>) {
//!         out.extend(c.to_uppercase());
//!     }
//! }
//!
//! assert_eq!(apply_str(&mut Upper, "abc"), "ABC");
//! ```

pub const CR: char = '\r';
pub const NL: char = '\n';
pub const BLANK: char = ' ';

/// A stateful transformation of a code point stream.
///
/// Implementations append their output to `out`; they never remove what is
/// already there. Input order must be preserved in the output.
pub trait CodePointFilter: Send {
    /// Short name used in logs and stage reports.
    fn name(&self) -> &'static str;

    /// Consume one code point.
    fn on_char(&mut self, c: char, out: &mut Vec<char>);

    /// Called once after the last code point.
    ///
    /// Default implementation emits nothing.
    fn finish(&mut self, _out: &mut Vec<char>) {}
}

impl<F: CodePointFilter + ?Sized> CodePointFilter for Box<F> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn on_char(&mut self, c: char, out: &mut Vec<char>) {
        (**self).on_char(c, out)
    }

    fn finish(&mut self, out: &mut Vec<char>) {
        (**self).finish(out)
    }
}

/// Run a filter over a whole string, including the end-of-stream call.
pub fn apply_str<F: CodePointFilter + ?Sized>(filter: &mut F, text: &str) -> String {
    let mut out = Vec::with_capacity(text.len());
    for c in text.chars() {
        filter.on_char(c, &mut out);
    }
    filter.finish(&mut out);
    out.into_iter().collect()
}
