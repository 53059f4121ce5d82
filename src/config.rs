//! Settings loading and the validated run configuration.
//!
//! `defaults/reflow.default.toml` is embedded into the binary so that the
//! documented defaults and runtime behavior stay in sync. Callers layer a
//! settings file and command-line overrides on top via [`Loader`], then turn
//! the raw [`Settings`] into an immutable [`ReflowConfig`] with
//! [`Settings::validate`].

use crate::error::{ConfigError, ReflowResult};
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, File, FileFormat, ValueKind};
use serde::Deserialize;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

const DEFAULT_TOML: &str = include_str!("../defaults/reflow.default.toml");

/// Raw settings as read from the layered sources.
///
/// Nothing here has been cross-checked yet; see [`Settings::validate`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub input: Option<PathBuf>,
    #[serde(default)]
    pub output: Option<PathBuf>,
    pub overwrite: bool,
    pub collapse_space: bool,
    /// Word-wrap column. Zero or negative disables word-wrapping.
    pub word_wrap: i64,
    pub keep_newline: bool,
    #[serde(default)]
    pub char_map: Option<PathBuf>,
}

impl Settings {
    /// Check flag combinations and freeze the result.
    pub fn validate(self) -> Result<ReflowConfig, ConfigError> {
        let input = non_empty(self.input);
        let output = non_empty(self.output);
        let char_map = non_empty(self.char_map);

        if self.overwrite && output.is_none() {
            return Err(ConfigError::OverwriteWithoutOutput);
        }

        let line_len_max = usize::try_from(self.word_wrap)
            .ok()
            .and_then(NonZeroUsize::new);
        if self.keep_newline && line_len_max.is_none() {
            return Err(ConfigError::KeepNewlineWithoutWordWrap);
        }

        Ok(ReflowConfig {
            input,
            output,
            overwrite: self.overwrite,
            collapse_space: self.collapse_space,
            word_wrap: line_len_max.map(|line_len_max| WordWrapConfig {
                line_len_max,
                keep_newline: self.keep_newline,
            }),
            char_map,
        })
    }
}

fn non_empty(path: Option<PathBuf>) -> Option<PathBuf> {
    path.filter(|p| !p.as_os_str().is_empty())
}

/// Word-wrap parameters; present only when word-wrapping is enabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WordWrapConfig {
    pub line_len_max: NonZeroUsize,
    pub keep_newline: bool,
}

/// Validated, immutable configuration for one run.
///
/// Only [`Settings::validate`] builds a non-default value, so every
/// instance satisfies the flag-combination rules.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReflowConfig {
    input: Option<PathBuf>,
    output: Option<PathBuf>,
    overwrite: bool,
    collapse_space: bool,
    word_wrap: Option<WordWrapConfig>,
    char_map: Option<PathBuf>,
}

impl ReflowConfig {
    /// Source file, `None` for standard input.
    pub fn input(&self) -> Option<&Path> {
        self.input.as_deref()
    }

    /// Sink file, `None` for standard output.
    pub fn output(&self) -> Option<&Path> {
        self.output.as_deref()
    }

    pub fn overwrite(&self) -> bool {
        self.overwrite
    }

    pub fn collapse_space(&self) -> bool {
        self.collapse_space
    }

    pub fn word_wrap(&self) -> Option<WordWrapConfig> {
        self.word_wrap
    }

    /// Substitution map file, `None` when no substitution is requested.
    pub fn char_map(&self) -> Option<&Path> {
        self.char_map.as_deref()
    }
}

/// Helper for layering user overrides over the built-in defaults.
#[derive(Debug, Clone)]
pub struct Loader {
    builder: ConfigBuilder<DefaultState>,
}

impl Loader {
    /// Start a loader seeded with the embedded defaults.
    pub fn new() -> Self {
        let builder = Config::builder().add_source(File::from_str(DEFAULT_TOML, FileFormat::Toml));
        Self { builder }
    }

    /// Layer a settings file. Missing files trigger an error.
    pub fn with_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(true);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Apply a single key/value override (used for command-line flags).
    pub fn set_override<I>(mut self, key: &str, value: I) -> Result<Self, config::ConfigError>
    where
        I: Into<ValueKind>,
    {
        self.builder = self.builder.set_override(key, value)?;
        Ok(self)
    }

    /// Finalize the builder and deserialize the raw settings.
    pub fn build(self) -> Result<Settings, config::ConfigError> {
        self.builder.build()?.try_deserialize()
    }

    /// Build and validate in one step.
    pub fn load(self) -> ReflowResult<ReflowConfig> {
        Ok(self.build()?.validate()?)
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience helper for callers that only need the defaults.
pub fn load_defaults() -> Result<Settings, config::ConfigError> {
    Loader::new().build()
}
