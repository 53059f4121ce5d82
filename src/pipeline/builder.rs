//! Pipeline builder
//!
//! This module provides the `Pipeline` that chains code point filters
//! between a byte source and a byte sink.
//!
//! # Design
//!
//! Every stage runs as its own tokio task:
//! 1. The source decodes input bytes into code points
//! 2. Each filter transforms the stream of the stage before it
//! 3. The sink encodes the final stream into the writer
//!
//! Stages are connected by bounded channels (see [`stage`](crate::pipeline::stage)),
//! so a slow sink throttles everything upstream of it. Filters are applied in
//! the order they were added; [`Pipeline::from_config`] always uses
//! CharMap → Whitespace → WordWrap.
//!
//! # Examples
//!
//! ```ignore
//! let pipeline = Pipeline::new()
//!     .add_filter(WhitespaceFilter::new())
//!     .add_filter(WordWrapFilter::new(NonZeroUsize::new(72).unwrap(), false));
//!
//! let writer = pipeline.run(reader, writer).await?;
//! ```

use crate::charmap::SubstitutionMap;
use crate::codec;
use crate::config::ReflowConfig;
use crate::error::{ReflowError, ReflowResult};
use crate::pipeline::filter::CodePointFilter;
use crate::pipeline::filters::{CharMapFilter, WhitespaceFilter, WordWrapFilter};
use crate::pipeline::stage::{self, FILTER_CHANNEL_CAPACITY, SOURCE_CHANNEL_CAPACITY};
use std::io::Cursor;
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::task::JoinHandle;

/// A chain of filters between a source and a sink.
pub struct Pipeline {
    filters: Vec<Box<dyn CodePointFilter>>,
}

impl Pipeline {
    /// Create a new pipeline without filters.
    ///
    /// Running it copies input to output, decoding and re-encoding on the way.
    pub fn new() -> Self {
        Pipeline {
            filters: Vec::new(),
        }
    }

    /// Add a filter after the ones already present.
    pub fn add_filter<F: CodePointFilter + 'static>(mut self, filter: F) -> Self {
        self.filters.push(Box::new(filter));
        self
    }

    /// Build the pipeline a configuration asks for, loading the character
    /// map if one is configured.
    pub fn from_config(config: &ReflowConfig) -> ReflowResult<Self> {
        let char_map = config
            .char_map()
            .map(SubstitutionMap::load)
            .transpose()?
            .map(Arc::new);
        Ok(Self::with_char_map(config, char_map))
    }

    /// Build the pipeline a configuration asks for, with an already loaded
    /// character map.
    ///
    /// The map enables the CharMap stage regardless of `config.char_map()`.
    pub fn with_char_map(config: &ReflowConfig, char_map: Option<Arc<SubstitutionMap>>) -> Self {
        let mut pipeline = Pipeline::new();
        if let Some(map) = char_map {
            pipeline = pipeline.add_filter(CharMapFilter::new(map));
        }
        if config.collapse_space() {
            pipeline = pipeline.add_filter(WhitespaceFilter::new());
        }
        if let Some(wrap) = config.word_wrap() {
            pipeline = pipeline.add_filter(WordWrapFilter::new(wrap.line_len_max, wrap.keep_newline));
        }
        pipeline
    }

    /// Names of the filter stages, in order.
    pub fn stage_names(&self) -> Vec<&'static str> {
        self.filters.iter().map(|f| f.name()).collect()
    }

    /// Run every stage concurrently until the input is exhausted.
    ///
    /// Returns the writer after everything was flushed into it. On failure,
    /// the first error in pipeline order (source, filters, sink) is returned;
    /// output written before the failure stays where it is.
    pub async fn run<R, W>(self, reader: R, writer: W) -> ReflowResult<W>
    where
        R: AsyncRead + Unpin + Send + 'static,
        W: AsyncWrite + Unpin + Send + 'static,
    {
        tracing::debug!(filters = ?self.stage_names(), "starting pipeline");

        let (source_tx, mut rx) = stage::channel(SOURCE_CHANNEL_CAPACITY);
        let source = tokio::spawn(codec::read_source(reader, source_tx));

        let mut filters = Vec::with_capacity(self.filters.len());
        for filter in self.filters {
            let name = filter.name();
            let (tx, next_rx) = stage::channel(FILTER_CHANNEL_CAPACITY);
            filters.push((name, tokio::spawn(stage::run_filter(filter, rx, tx))));
            rx = next_rx;
        }

        let sink = tokio::spawn(codec::write_sink(rx, writer));

        let mut failure = None;
        match join("source", source).await.and_then(|result| result) {
            Ok(report) => report.log(),
            Err(err) => {
                failure.get_or_insert(err);
            }
        }
        for (name, handle) in filters {
            match join(name, handle).await {
                Ok(report) => report.log(),
                Err(err) => {
                    failure.get_or_insert(err);
                }
            }
        }
        let sink_result = join("sink", sink).await.and_then(|result| result);

        if let Some(err) = failure {
            return Err(err);
        }
        let (writer, report) = sink_result?;
        report.log();
        Ok(writer)
    }

    /// Run the staged pipeline over an in-memory string.
    pub async fn transform_str(self, text: &str) -> ReflowResult<String> {
        let reader = Cursor::new(text.as_bytes().to_vec());
        let bytes = self.run(reader, Vec::new()).await?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    /// Apply the filters synchronously, one after the other, without tasks.
    ///
    /// Produces the same text as [`Pipeline::transform_str`].
    pub fn apply_str(self, text: &str) -> String {
        let mut current: Vec<char> = text.chars().collect();
        for mut filter in self.filters {
            let mut next = Vec::with_capacity(current.len());
            for c in current.drain(..) {
                filter.on_char(c, &mut next);
            }
            filter.finish(&mut next);
            current = next;
        }
        current.into_iter().collect()
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new()
    }
}

async fn join<T>(stage: &str, handle: JoinHandle<T>) -> ReflowResult<T> {
    handle
        .await
        .map_err(|e| ReflowError::stage(stage, e.to_string()))
}
