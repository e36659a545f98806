//! Recorder writing per-episode metrics to TFRecord.
use anyhow::Result;
use orion_core::{
    error::OrionError,
    record::{Record, RecordValue, Recorder},
};
use std::path::Path;
use tensorboard_rs::summary_writer::SummaryWriter;

/// Write records to TFRecord.
///
/// Every scalar of a record is written at the step given by the `"episode"`
/// scalar of the same record.
pub struct TensorboardRecorder {
    writer: SummaryWriter,
    step_key: String,
    ignore_unsupported_value: bool,
}

impl TensorboardRecorder {
    /// Construct a [`TensorboardRecorder`].
    ///
    /// TFRecord will be stored in `logdir`.
    pub fn new<P: AsRef<Path>>(logdir: P) -> Self {
        Self {
            writer: SummaryWriter::new(logdir),
            step_key: "episode".to_string(),
            ignore_unsupported_value: true,
        }
    }

    /// Construct a [`TensorboardRecorder`] failing on values other than scalars.
    ///
    /// TFRecord will be stored in `logdir`.
    pub fn new_with_check_unsupported_value<P: AsRef<Path>>(logdir: P) -> Self {
        Self {
            ignore_unsupported_value: false,
            ..Self::new(logdir)
        }
    }
}

impl Recorder for TensorboardRecorder {
    /// Write a given [`Record`] into a TFRecord.
    ///
    /// Only [`RecordValue::Scalar`] values are written. Other values are
    /// ignored, or rejected when constructed with
    /// [`TensorboardRecorder::new_with_check_unsupported_value`].
    fn write(&mut self, record: Record) -> Result<()> {
        let step = record.get_scalar(&self.step_key)? as usize;

        for (k, v) in record.iter() {
            if *k != self.step_key {
                match v {
                    RecordValue::Scalar(v) => self.writer.add_scalar(k, *v, step),
                    _ => {
                        if !self.ignore_unsupported_value {
                            return Err(OrionError::RecordValueTypeError(format!(
                                "{} cannot be written to tensorboard",
                                k
                            ))
                            .into());
                        }
                    }
                };
            }
        }

        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.writer.flush();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempdir::TempDir;

    fn record(episode: f32) -> Record {
        Record::from_slice(&[
            ("episode", RecordValue::Scalar(episode)),
            ("reward", RecordValue::Scalar(1.0)),
        ])
    }

    #[test]
    fn test_write() -> Result<()> {
        let dir = TempDir::new("tensorboard")?;
        let mut recorder = TensorboardRecorder::new(dir.path());
        recorder.write(record(1.0))?;
        recorder.write(record(2.0))?;
        recorder.flush()?;

        // The event file is written by a background thread, joined on drop.
        drop(recorder);
        assert!(std::fs::read_dir(dir.path())?.next().is_some());
        Ok(())
    }

    #[test]
    fn test_missing_step_key() -> Result<()> {
        let dir = TempDir::new("tensorboard")?;
        let mut recorder = TensorboardRecorder::new(dir.path());
        assert!(recorder.write(Record::from_scalar("reward", 1.0)).is_err());
        Ok(())
    }

    #[test]
    fn test_unsupported_value() -> Result<()> {
        let dir = TempDir::new("tensorboard")?;
        let mut record = record(1.0);
        record.insert("name", RecordValue::String("catch".to_string()));

        let mut recorder = TensorboardRecorder::new(dir.path());
        assert!(recorder.write(record.clone()).is_ok());

        let mut recorder = TensorboardRecorder::new_with_check_unsupported_value(dir.path());
        assert!(recorder.write(record).is_err());
        Ok(())
    }
}
