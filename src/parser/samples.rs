//! Recorded sample files (JSON Lines).
//!
//! Each non-empty line holds one sample:
//!
//! ```text
//! {"thread_id": 1, "thread_name": "main", "frames": ["main", "work", null]}
//! ```
//!
//! Frames are listed outermost first; `null` marks a frame whose function
//! could not be resolved. Lines starting with `#` are comments.

use crate::aggregator::{frame_name, ChainOrder, ProfileSession};
use crate::utils::error::SampleFileError;
use log::debug;
use serde::Deserialize;
use std::path::Path;

/// One observation of one thread's call chain
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SampleRecord {
    /// Debugger thread number
    pub thread_id: u64,

    /// Thread name, if known
    #[serde(default, alias = "name")]
    pub thread_name: Option<String>,

    /// Frame names, outermost first
    pub frames: Vec<Option<String>>,
}

impl SampleRecord {
    /// Frame names with unresolved frames replaced by the placeholder
    pub fn frame_names(&self) -> Vec<&str> {
        self.frames
            .iter()
            .map(|frame| frame_name(frame.as_deref()))
            .collect()
    }
}

/// Parse sample records from JSON Lines text
///
/// **Public** - main entry point for replay input
///
/// # Errors
/// * `SampleFileError::InvalidSample` - a line is not a valid sample; the
///   1-based line number is reported
pub fn parse_samples(input: &str) -> Result<Vec<SampleRecord>, SampleFileError> {
    let mut records = Vec::new();

    for (index, line) in input.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let record = serde_json::from_str(line).map_err(|source| {
            SampleFileError::InvalidSample {
                line: index + 1,
                source,
            }
        })?;
        records.push(record);
    }

    debug!("Parsed {} samples", records.len());

    Ok(records)
}

/// Read and parse a sample file
pub fn read_samples(path: impl AsRef<Path>) -> Result<Vec<SampleRecord>, SampleFileError> {
    let path = path.as_ref();
    debug!("Reading samples from: {}", path.display());

    let input = std::fs::read_to_string(path)?;
    parse_samples(&input)
}

/// Aggregate records into a fresh session
pub fn build_session(records: &[SampleRecord], order: ChainOrder) -> ProfileSession {
    let mut session = ProfileSession::with_order(order);

    for record in records {
        session.record_sample(
            record.thread_id,
            record.thread_name.as_deref(),
            &record.frame_names(),
        );
    }

    session
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::config::UNKNOWN_FRAME;

    #[test]
    fn test_parse_samples() {
        let input = r#"
# recorded with gdbprof
{"thread_id": 1, "thread_name": "main", "frames": ["main", "work"]}

{"thread_id": 2, "frames": []}
"#;

        let records = parse_samples(input).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].thread_name.as_deref(), Some("main"));
        assert_eq!(records[0].frame_names(), vec!["main", "work"]);
        assert!(records[1].thread_name.is_none());
        assert!(records[1].frames.is_empty());
    }

    #[test]
    fn test_null_frames_use_placeholder() {
        let records =
            parse_samples(r#"{"thread_id": 1, "frames": ["main", null, ""]}"#).unwrap();
        assert_eq!(
            records[0].frame_names(),
            vec!["main", UNKNOWN_FRAME, UNKNOWN_FRAME]
        );
    }

    #[test]
    fn test_invalid_line_reports_line_number() {
        let input = "{\"thread_id\": 1, \"frames\": []}\n{\"thread_id\": \"x\"}\n";
        match parse_samples(input) {
            Err(SampleFileError::InvalidSample { line, .. }) => assert_eq!(line, 2),
            other => panic!("expected invalid sample error, got {:?}", other),
        }
    }

    #[test]
    fn test_build_session() {
        let records = parse_samples(concat!(
            "{\"thread_id\": 4, \"frames\": [\"a\", \"b\"]}\n",
            "{\"thread_id\": 4, \"frames\": [\"a\"]}\n",
        ))
        .unwrap();

        let session = build_session(&records, ChainOrder::CallerFirst);
        let profile = session.thread(4).unwrap();
        assert_eq!(profile.total_samples(), 2);
        assert_eq!(profile.root().child("a").unwrap().self_count(), 1);
    }
}
