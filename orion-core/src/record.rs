//! Types and traits for recording metrics.
//!
//! A [`Record`] is a set of key-value pairs. The [`Trainer`](crate::Trainer)
//! writes one record per episode with the keys `"episode"`, `"steps"`,
//! `"exploration"`, `"reward"` and, when a learning update ran in the
//! episode, `"loss"`.
//!
//! ```rust
//! use orion_core::record::{Record, RecordValue};
//!
//! let mut record = Record::from_scalar("episode", 1.0);
//! record.insert("reward", RecordValue::Scalar(-1.0));
//! assert_eq!(record.get_scalar("reward").unwrap(), -1.0);
//! ```
mod base;
mod buffered_recorder;
mod csv_recorder;
mod null_recorder;
mod recorder;

pub use base::{Record, RecordValue};
pub use buffered_recorder::BufferedRecorder;
pub use csv_recorder::CsvRecorder;
pub use null_recorder::NullRecorder;
pub use recorder::Recorder;
