//! Streaming filter pipeline
//!
//! This module provides:
//! - The per-code-point filter interface (`CodePointFilter`)
//! - The three concrete filters (`CharMapFilter`, `WhitespaceFilter`, `WordWrapFilter`)
//! - Stage plumbing: bounded channels, task bodies, per-stage reports
//! - The `Pipeline` builder that wires source, filters and sink together

pub mod builder;
pub mod filter;
pub mod filters;
pub mod stage;

pub use builder::Pipeline;
pub use filter::{apply_str, CodePointFilter, BLANK, CR, NL};
pub use filters::{CharMapFilter, WhitespaceFilter, WordWrapFilter};
pub use stage::StageReport;
