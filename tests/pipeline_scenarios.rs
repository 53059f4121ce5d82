//! Integration tests for the staged pipeline
//!
//! These tests run complete pipelines (source task, filter tasks, sink task)
//! over in-memory text and over the sample fixture.

use reflow::charmap::SubstitutionMap;
use reflow::pipeline::{CharMapFilter, WhitespaceFilter, WordWrapFilter};
use reflow::{Loader, Pipeline, ReflowConfig};
use rstest::rstest;
use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::sync::Arc;

fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn config(overrides: &[(&str, &str)]) -> ReflowConfig {
    overrides
        .iter()
        .fold(Loader::new(), |loader, (key, value)| {
            loader.set_override(key, *value).expect("override to apply")
        })
        .load()
        .expect("config to validate")
}

fn width(n: usize) -> NonZeroUsize {
    NonZeroUsize::new(n).unwrap()
}

#[rstest]
#[case::interior_run("a   b", "a b")]
#[case::leading_blanks("  a", "a")]
#[case::blank_line_run("a\n\n\n\nb", "a\n\nb")]
#[tokio::test]
async fn test_whitespace_scenarios(#[case] input: &str, #[case] expected: &str) {
    let output = Pipeline::new()
        .add_filter(WhitespaceFilter::new())
        .transform_str(input)
        .await
        .unwrap();
    assert_eq!(output, expected);
}

#[tokio::test]
async fn test_word_wrap_scenario_flushes_last_line() {
    let output = Pipeline::new()
        .add_filter(WordWrapFilter::new(width(5), false))
        .transform_str("hello world")
        .await
        .unwrap();
    assert_eq!(output, "hello\nworld\n");
}

#[rstest]
#[case::mapped("A", "Z")]
#[case::unmapped("B", "B")]
#[tokio::test]
async fn test_char_map_scenarios(#[case] input: &str, #[case] expected: &str) {
    let map = SubstitutionMap::from_json_str(r#"{"0041": {"value":"Z","xmlencoded":false}}"#)
        .unwrap();
    let output = Pipeline::new()
        .add_filter(CharMapFilter::new(Arc::new(map)))
        .transform_str(input)
        .await
        .unwrap();
    assert_eq!(output, expected);
}

#[tokio::test]
async fn test_configured_pipeline_on_sample() {
    let map = fixture_path("typography.json");
    let config = config(&[
        ("char_map", map.to_str().unwrap()),
        ("collapse_space", "true"),
        ("word_wrap", "20"),
        ("keep_newline", "true"),
    ]);
    let source = std::fs::read_to_string(fixture_path("sample.txt")).unwrap();

    let output = Pipeline::from_config(&config)
        .unwrap()
        .transform_str(&source)
        .await
        .unwrap();

    insta::assert_snapshot!("sample_keep_newline", output);
}

#[tokio::test]
async fn test_configured_pipeline_folds_newlines() {
    let map = fixture_path("typography.json");
    let config = config(&[
        ("char_map", map.to_str().unwrap()),
        ("collapse_space", "true"),
        ("word_wrap", "20"),
    ]);
    let source = std::fs::read_to_string(fixture_path("sample.txt")).unwrap();

    let output = Pipeline::from_config(&config)
        .unwrap()
        .transform_str(&source)
        .await
        .unwrap();

    assert_eq!(
        output,
        "The \"quick\" brown\nfox--jumps over the\nlazy dog.  Pack my\nbox with five dozen\n\
         liquor jugs... How\nvexingly quick daft\nzebras jump!\n"
    );
}

#[tokio::test]
async fn test_large_input_through_all_stages() {
    // Far more code points than the channels can buffer
    let paragraph = "word ".repeat(2_000);
    let input = format!("{}\n\n\n{}", paragraph, paragraph);

    let pipeline = Pipeline::new()
        .add_filter(WhitespaceFilter::new())
        .add_filter(WordWrapFilter::new(width(24), true));
    let output = pipeline.transform_str(&input).await.unwrap();

    assert!(output.lines().all(|line| line.chars().count() <= 24));
    assert_eq!(output.matches("word").count(), 4_000);
    assert_eq!(output.matches("\n\n").count(), 1);
}

#[tokio::test]
async fn test_staged_run_matches_inline_run() {
    let source = std::fs::read_to_string(fixture_path("sample.txt")).unwrap();
    let build = || {
        Pipeline::new()
            .add_filter(WhitespaceFilter::new())
            .add_filter(WordWrapFilter::new(width(13), false))
    };

    let staged = build().transform_str(&source).await.unwrap();
    assert_eq!(staged, build().apply_str(&source));
}
