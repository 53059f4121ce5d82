//! Byte streams in and out of the pipeline
//!
//! The source decodes UTF-8 line by line (malformed sequences become
//! U+FFFD) and the sink encodes code points back to UTF-8. Both run as
//! pipeline stages; see [`Pipeline::run`](crate::pipeline::Pipeline::run).

use crate::error::{ReflowError, ReflowResult};
use crate::pipeline::stage::{CodePointReceiver, CodePointSender, StageReport};
use std::path::Path;
use tokio::fs::OpenOptions;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader, BufWriter};

pub type InputStream = Box<dyn AsyncRead + Unpin + Send>;
pub type OutputStream = Box<dyn AsyncWrite + Unpin + Send>;

/// Open the input file, or standard input when no path is given.
pub async fn open_input(path: Option<&Path>) -> ReflowResult<InputStream> {
    match path {
        None => Ok(Box::new(tokio::io::stdin())),
        Some(path) => {
            let file = tokio::fs::File::open(path).await.map_err(|e| {
                ReflowError::io(format!("cannot open input {}", path.display()), e)
            })?;
            tracing::info!(path = %path.display(), "reading input");
            Ok(Box::new(file))
        }
    }
}

/// Open the output file, or standard output when no path is given.
///
/// An existing file is only truncated when `overwrite` is set; otherwise
/// opening it fails.
pub async fn open_output(path: Option<&Path>, overwrite: bool) -> ReflowResult<OutputStream> {
    let Some(path) = path else {
        return Ok(Box::new(tokio::io::stdout()));
    };

    let mut options = OpenOptions::new();
    options.write(true);
    if overwrite {
        options.create(true).truncate(true);
    } else {
        options.create_new(true);
    }
    #[cfg(unix)]
    options.mode(0o644);

    let file = options
        .open(path)
        .await
        .map_err(|e| ReflowError::io(format!("cannot create output {}", path.display()), e))?;
    tracing::info!(path = %path.display(), overwrite, "writing output");
    Ok(Box::new(file))
}

/// Task body of the source stage.
///
/// A final line without a line feed is still delivered. Stops early, without
/// error, when the first consumer went away.
pub async fn read_source<R>(reader: R, output: CodePointSender) -> ReflowResult<StageReport>
where
    R: AsyncRead + Unpin,
{
    let mut reader = BufReader::new(reader);
    let mut report = StageReport::new("source");
    let mut line = Vec::new();

    loop {
        line.clear();
        let read = reader
            .read_until(b'\n', &mut line)
            .await
            .map_err(|e| ReflowError::io("cannot read input", e))?;
        if read == 0 {
            return Ok(report);
        }
        report.received += read as u64;

        for c in String::from_utf8_lossy(&line).chars() {
            if output.send(c).await.is_err() {
                tracing::debug!("pipeline closed before end of input");
                return Ok(report);
            }
            report.emitted += 1;
        }
    }
}

/// Task body of the sink stage.
///
/// Returns the writer once everything has been flushed.
pub async fn write_sink<W>(mut input: CodePointReceiver, writer: W) -> ReflowResult<(W, StageReport)>
where
    W: AsyncWrite + Unpin,
{
    let mut writer = BufWriter::new(writer);
    let mut report = StageReport::new("sink");
    let mut buf = [0u8; 4];

    while let Some(c) = input.recv().await {
        report.received += 1;
        let encoded = c.encode_utf8(&mut buf).as_bytes();
        writer
            .write_all(encoded)
            .await
            .map_err(|e| ReflowError::io("cannot write output", e))?;
        report.emitted += encoded.len() as u64;
    }

    writer
        .flush()
        .await
        .map_err(|e| ReflowError::io("cannot write output", e))?;
    Ok((writer.into_inner(), report))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::stage::{channel, SOURCE_CHANNEL_CAPACITY};
    use std::io::Cursor;

    async fn drain(mut rx: CodePointReceiver) -> String {
        let mut out = String::new();
        while let Some(c) = rx.recv().await {
            out.push(c);
        }
        out
    }

    #[tokio::test]
    async fn test_source_delivers_unterminated_last_line() {
        let (tx, rx) = channel(SOURCE_CHANNEL_CAPACITY);
        let reader = Cursor::new(b"one\ntwo".to_vec());

        let source = tokio::spawn(read_source(reader, tx));
        assert_eq!(drain(rx).await, "one\ntwo");

        let report = source.await.unwrap().unwrap();
        assert_eq!(report.received, 7);
        assert_eq!(report.emitted, 7);
    }

    #[tokio::test]
    async fn test_source_decodes_utf8_lossily() {
        let (tx, rx) = channel(SOURCE_CHANNEL_CAPACITY);
        let reader = Cursor::new(vec![b'a', 0xC3, 0xA9, 0xFF, b'\n']);

        let source = tokio::spawn(read_source(reader, tx));
        assert_eq!(drain(rx).await, "a\u{E9}\u{FFFD}\n");
        assert_eq!(source.await.unwrap().unwrap().received, 5);
    }

    #[tokio::test]
    async fn test_source_stops_when_consumer_gone() {
        let (tx, rx) = channel(SOURCE_CHANNEL_CAPACITY);
        drop(rx);

        let report = read_source(Cursor::new(b"abc".to_vec()), tx).await.unwrap();
        assert_eq!(report.emitted, 0);
    }

    #[tokio::test]
    async fn test_sink_encodes_utf8() {
        let (tx, rx) = channel(SOURCE_CHANNEL_CAPACITY);
        let sink = tokio::spawn(write_sink(rx, Vec::new()));

        for c in "x\u{E9}\u{1F600}".chars() {
            tx.send(c).await.unwrap();
        }
        drop(tx);

        let (bytes, report) = sink.await.unwrap().unwrap();
        assert_eq!(bytes, "x\u{E9}\u{1F600}".as_bytes());
        assert_eq!(report.received, 3);
        assert_eq!(report.emitted, 7);
    }

    #[tokio::test]
    async fn test_open_output_is_exclusive_by_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.txt");
        std::fs::write(&path, "existing").unwrap();

        let err = open_output(Some(path.as_path()), false).await.err().unwrap();
        assert!(matches!(err, ReflowError::Io { .. }));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "existing");
    }

    #[tokio::test]
    async fn test_open_output_overwrite_truncates() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.txt");
        std::fs::write(&path, "existing content").unwrap();

        let mut out = open_output(Some(path.as_path()), true).await.unwrap();
        out.write_all(b"new").await.unwrap();
        out.flush().await.unwrap();
        drop(out);

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "new");
    }

    #[tokio::test]
    async fn test_open_input_missing_file() {
        let err = open_input(Some(Path::new("/nonexistent/input.txt")))
            .await
            .err()
            .unwrap();
        assert!(err.to_string().starts_with("cannot open input"));
    }
}
