//! Capture replay
//!
//! A capture is JSON Lines, one observed message per line:
//!
//! ```text
//! {"direction": "OUT", "message": "SIP/2.0 100 Trying\r\nCall-ID: c1\r\n..."}
//! ```
//!
//! `direction` may be omitted or null, in which case the counter's default
//! direction applies. Blank lines are skipped.

use std::io::BufRead;

use rvoip_session_counter::{Direction, FieldExtractor, SessionCounter};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureRecord {
    pub message: String,
    #[serde(default)]
    pub direction: Option<Direction>,
}

#[derive(Error, Debug)]
pub enum ReplayError {
    #[error("Failed to read capture line {line}: {source}")]
    Io {
        line: usize,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid capture record on line {line}: {source}")]
    Decode {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
}

/// Totals for one replay run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReplayStats {
    pub records: usize,
    pub changes: usize,
}

/// Feed every record of `reader` to `counter`.
pub fn replay<R, E>(reader: R, counter: &mut SessionCounter<E>) -> Result<ReplayStats, ReplayError>
where
    R: BufRead,
    E: FieldExtractor,
{
    let mut stats = ReplayStats::default();

    for (index, line) in reader.lines().enumerate() {
        let line_no = index + 1;
        let line = line.map_err(|source| ReplayError::Io { line: line_no, source })?;
        if line.trim().is_empty() {
            continue;
        }

        let record: CaptureRecord = serde_json::from_str(&line)
            .map_err(|source| ReplayError::Decode { line: line_no, source })?;
        stats.records += 1;

        if counter.update(&record.message, record.direction) {
            stats.changes += 1;
            info!("line {}: {}", line_no, counter);
        } else {
            debug!("line {}: no change", line_no);
        }
    }

    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn record(message: &str, direction: Option<Direction>) -> String {
        serde_json::to_string(&CaptureRecord { message: message.to_string(), direction }).unwrap()
    }

    #[test]
    fn test_replay_call_flow() {
        let capture = [
            record("SIP/2.0 100 Trying\r\nCall-ID: c1\r\nCSeq: 1 INVITE\r\nTo: <sip:b@b>\r\n\r\n", Some(Direction::Out)),
            String::new(),
            record("SIP/2.0 200 OK\r\nCall-ID: c1\r\nCSeq: 1 INVITE\r\nTo: <sip:b@b>;tag=1\r\n\r\n", None),
            record("SIP/2.0 200 OK\r\nCall-ID: c1\r\nCSeq: 2 BYE\r\nTo: <sip:b@b>;tag=1\r\n\r\n", None),
        ]
        .join("\n");

        let mut counter = SessionCounter::new("replay");
        let stats = replay(Cursor::new(capture), &mut counter).unwrap();

        assert_eq!(stats, ReplayStats { records: 3, changes: 2 });
        assert_eq!(counter.sessions_sum(), 0);
        assert_eq!(counter.peak_sessions_for(Direction::In), 1);
    }

    #[test]
    fn test_direction_is_optional() {
        let line = r#"{"message": "SIP/2.0 100 Trying\r\nCall-ID: c1\r\nCSeq: 1 INVITE\r\n\r\n"}"#;
        let mut counter = SessionCounter::new("replay");
        replay(Cursor::new(line), &mut counter).unwrap();
        assert_eq!(counter.sessions_for(Direction::Both), 1);
    }

    #[test]
    fn test_bad_line_reports_line_number() {
        let capture = format!("{}\nnot json\n", record("SIP/2.0 100 Trying\r\n\r\n", None));
        let mut counter = SessionCounter::new("replay");
        let err = replay(Cursor::new(capture), &mut counter).unwrap_err();
        assert!(matches!(err, ReplayError::Decode { line: 2, .. }));
        assert!(err.to_string().contains("line 2"));
    }

    #[test]
    fn test_unknown_direction_is_a_decode_error() {
        let line = r#"{"message": "SIP/2.0 100 Trying", "direction": "UP"}"#;
        let mut counter = SessionCounter::new("replay");
        assert!(matches!(
            replay(Cursor::new(line), &mut counter),
            Err(ReplayError::Decode { line: 1, .. })
        ));
    }
}
