//! Stage plumbing
//!
//! Adjacent stages talk through single-producer single-consumer bounded
//! channels of code points. A full channel suspends the producer, an empty one
//! suspends the consumer, which gives backpressure across the whole chain.
//!
//! A stage closes its output by dropping its sender, which happens exactly
//! once: when the task body returns. That includes empty input and the case
//! where the downstream stage went away early.

use crate::pipeline::filter::CodePointFilter;
use tokio::sync::mpsc;

/// Buffering between the source and the first consumer.
pub const SOURCE_CHANNEL_CAPACITY: usize = 10;

/// Buffering between a filter and the next stage.
///
/// One slot is the smallest bound tokio allows; it behaves as a rendezvous
/// with a single code point of slack.
pub const FILTER_CHANNEL_CAPACITY: usize = 1;

pub type CodePointSender = mpsc::Sender<char>;
pub type CodePointReceiver = mpsc::Receiver<char>;

/// Create the channel connecting two adjacent stages.
pub fn channel(capacity: usize) -> (CodePointSender, CodePointReceiver) {
    mpsc::channel(capacity)
}

/// What a stage consumed and produced.
///
/// Units depend on the stage: the source receives bytes and emits code
/// points, filters count code points on both sides, the sink receives code
/// points and emits bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageReport {
    pub stage: &'static str,
    pub received: u64,
    pub emitted: u64,
}

impl StageReport {
    pub fn new(stage: &'static str) -> Self {
        StageReport {
            stage,
            received: 0,
            emitted: 0,
        }
    }

    pub(crate) fn log(&self) {
        tracing::debug!(
            stage = self.stage,
            received = self.received,
            emitted = self.emitted,
            "stage finished"
        );
    }
}

/// Task body of a filter stage.
///
/// Pulls code points until the input closes, pushes whatever the filter emits
/// and finally gives the filter its end-of-stream call. Stops early, without
/// error, when the output has no receiver anymore.
pub async fn run_filter(
    mut filter: Box<dyn CodePointFilter>,
    mut input: CodePointReceiver,
    output: CodePointSender,
) -> StageReport {
    let mut report = StageReport::new(filter.name());
    let mut emitted = Vec::new();

    while let Some(c) = input.recv().await {
        report.received += 1;
        filter.on_char(c, &mut emitted);
        if !forward(&output, &mut emitted, &mut report).await {
            tracing::debug!(stage = report.stage, "downstream closed, stopping");
            return report;
        }
    }

    filter.finish(&mut emitted);
    forward(&output, &mut emitted, &mut report).await;
    report
}

async fn forward(
    output: &CodePointSender,
    emitted: &mut Vec<char>,
    report: &mut StageReport,
) -> bool {
    for c in emitted.drain(..) {
        if output.send(c).await.is_err() {
            return false;
        }
        report.emitted += 1;
    }
    true
}
