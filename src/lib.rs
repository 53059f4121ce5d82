//! # reflow
//!
//! A streaming text reflow tool. Input code points flow through an optional
//! chain of filters, always in this order:
//!
//! 1. [`CharMapFilter`](pipeline::CharMapFilter): per code point substitution
//! 2. [`WhitespaceFilter`](pipeline::WhitespaceFilter): whitespace and blank-line collapsing
//! 3. [`WordWrapFilter`](pipeline::WordWrapFilter): reflow to a fixed width
//!
//! Each stage runs as its own task, connected to its neighbours by bounded
//! channels. See [`pipeline`] for the stage model and [`config`] for how a run
//! is configured.

pub mod charmap;
pub mod codec;
pub mod config;
pub mod error;
pub mod pipeline;

pub use config::{Loader, ReflowConfig, Settings};
pub use error::{ConfigError, ReflowError, ReflowResult};
pub use pipeline::Pipeline;

/// Execute one run: load the character map, open input and output, and pump
/// the whole input through the configured pipeline.
pub async fn run(config: &ReflowConfig) -> ReflowResult<()> {
    let pipeline = Pipeline::from_config(config)?;
    let input = codec::open_input(config.input()).await?;
    let output = codec::open_output(config.output(), config.overwrite()).await?;
    pipeline.run(input, output).await?;
    Ok(())
}
