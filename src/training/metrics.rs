//! Scalar metric emission.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::error::Result;

/// Sink for the per-epoch loss series.
///
/// The training loop's only obligation is to emit `(epoch, loss)` pairs in
/// epoch order; what consumes them (a visualization backend, a file, a test)
/// is the sink's business.
pub trait MetricSink {
    /// Record one epoch's scalar loss.
    fn record(&mut self, epoch: usize, loss: f32) -> Result<()>;

    /// Flush and close the sink. Called once after the final epoch.
    fn close(&mut self) -> Result<()>;
}

/// Metric sink appending one JSON object per epoch to a file.
#[derive(Debug)]
pub struct JsonlMetricWriter {
    writer: BufWriter<File>,
    path: PathBuf,
}

impl JsonlMetricWriter {
    /// Create the metric file, truncating any previous content.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let writer = BufWriter::new(File::create(&path)?);
        Ok(Self { writer, path })
    }

    /// Path of the underlying file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl MetricSink for JsonlMetricWriter {
    fn record(&mut self, epoch: usize, loss: f32) -> Result<()> {
        let line = serde_json::json!({ "epoch": epoch, "loss": loss });
        writeln!(self.writer, "{line}")?;
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

/// In-memory sink collecting the series, for tests.
#[derive(Debug, Default)]
pub struct MemoryMetricSink {
    /// Recorded `(epoch, loss)` pairs in emission order.
    pub scalars: Vec<(usize, f32)>,
    /// Whether `close` has been called.
    pub closed: bool,
}

impl MemoryMetricSink {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }
}

impl MetricSink for MemoryMetricSink {
    fn record(&mut self, epoch: usize, loss: f32) -> Result<()> {
        self.scalars.push((epoch, loss));
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        self.closed = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_jsonl_writer_emits_one_line_per_epoch() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("scalars.jsonl");

        let mut writer = JsonlMetricWriter::create(&path).unwrap();
        writer.record(0, 0.5).unwrap();
        writer.record(1, 0.25).unwrap();
        writer.close().unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = contents.lines().collect();
        assert_eq!(lines.len(), 2);

        let first: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first["epoch"], 0);
        assert!((first["loss"].as_f64().unwrap() - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_memory_sink_keeps_order() {
        let mut sink = MemoryMetricSink::new();
        for epoch in 0..4 {
            sink.record(epoch, epoch as f32).unwrap();
        }
        sink.close().unwrap();

        assert_eq!(sink.scalars.len(), 4);
        assert!(sink.closed);
        assert_eq!(sink.scalars[2], (2, 2.0));
    }
}
