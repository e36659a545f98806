use super::{Record, Recorder};
use anyhow::Result;
use csv::Writer;
use std::{fs::File, path::Path};

const COLUMNS: [&str; 5] = ["game", "steps", "loss", "exploration", "reward"];

/// Appends per-episode metrics to a CSV file.
///
/// The columns are `game,steps,loss,exploration,reward`. The loss cell is
/// left empty for episodes without a learning update.
pub struct CsvRecorder {
    writer: Writer<File>,
}

impl CsvRecorder {
    /// Creates the file, truncating an existing one, and writes the header.
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        let mut writer = Writer::from_path(path)?;
        writer.write_record(COLUMNS)?;
        writer.flush()?;
        Ok(Self { writer })
    }
}

impl Recorder for CsvRecorder {
    fn write(&mut self, record: Record) -> Result<()> {
        let game = record.get_scalar("episode")? as usize;
        let steps = record.get_scalar("steps")? as usize;
        let loss = record
            .get_scalar_opt("loss")?
            .map(|v| v.to_string())
            .unwrap_or_default();
        let exploration = record.get_scalar("exploration")?;
        let reward = record.get_scalar("reward")?;
        self.writer.write_record(&[
            game.to_string(),
            steps.to_string(),
            loss,
            exploration.to_string(),
            reward.to_string(),
        ])?;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::RecordValue;
    use tempdir::TempDir;

    fn episode(game: f32, loss: Option<f32>) -> Record {
        let mut record = Record::from_slice(&[
            ("episode", RecordValue::Scalar(game)),
            ("steps", RecordValue::Scalar(12.0)),
            ("exploration", RecordValue::Scalar(0.5)),
            ("reward", RecordValue::Scalar(1.0)),
        ]);
        if let Some(loss) = loss {
            record.insert("loss", RecordValue::Scalar(loss));
        }
        record
    }

    #[test]
    fn test_write_rows() -> Result<()> {
        let dir = TempDir::new("csv_recorder")?;
        let path = dir.path().join("metrics.csv");
        let mut recorder = CsvRecorder::new(&path)?;
        recorder.write(episode(1.0, None))?;
        recorder.write(episode(2.0, Some(0.25)))?;
        recorder.flush()?;

        let content = std::fs::read_to_string(&path)?;
        let lines = content.lines().collect::<Vec<_>>();
        assert_eq!(lines[0], "game,steps,loss,exploration,reward");
        assert_eq!(lines[1], "1,12,,0.5,1");
        assert_eq!(lines[2], "2,12,0.25,0.5,1");
        Ok(())
    }
}
