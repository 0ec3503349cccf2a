//! # rvoip-session-counter
//!
//! Passive tracking of concurrently active SIP dialogs and their historical
//! peak, fed one message at a time. The counter never sends anything and
//! keeps no transaction timers; it only watches responses:
//!
//! - `100 Trying` to an initial INVITE opens a dialog and counts it
//! - `200 OK` to the INVITE marks it established
//! - a 3xx-6xx to every outstanding INVITE attempt uncounts it
//! - any response to a BYE uncounts an established dialog
//!
//! Counts are kept per [`Direction`]. A dialog is stored under the reverse of
//! the label the opening response arrived with, i.e. the leg the call is
//! heading toward.
//!
//! ## Example
//!
//! ```rust
//! use rvoip_session_counter::{Direction, SessionCounter};
//!
//! let trying = "SIP/2.0 100 Trying\r\nCall-ID: c1\r\nCSeq: 1 INVITE\r\nTo: <sip:b@example.com>\r\n\r\n";
//! let ok = "SIP/2.0 200 OK\r\nCall-ID: c1\r\nCSeq: 1 INVITE\r\nTo: <sip:b@example.com>;tag=9\r\n\r\n";
//! let bye_ok = "SIP/2.0 200 OK\r\nCall-ID: c1\r\nCSeq: 2 BYE\r\nTo: <sip:b@example.com>;tag=9\r\n\r\n";
//!
//! let mut counter = SessionCounter::new("A");
//! assert!(counter.update(trying, Some(Direction::Out)));
//! assert_eq!(counter.sessions_for(Direction::In), 1);
//!
//! assert!(!counter.update(ok, Some(Direction::Out)));
//! assert!(counter.update(bye_ok, Some(Direction::Out)));
//!
//! assert_eq!(counter.sessions_sum(), 0);
//! assert_eq!(counter.peak_sessions_sum(), 1);
//! ```
//!
//! A counter is single-writer state. Share it between tasks behind a mutex,
//! or keep one counter per observed link and [`merge`](SessionCounter::merge)
//! them for reporting.

pub mod config;
pub mod counter;
pub mod direction;
pub mod errors;
pub mod tracker;

pub use config::SessionCounterConfig;
pub use counter::{SessionCounter, SessionSnapshot};
pub use direction::Direction;
pub use errors::{CounterError, Result};
pub use tracker::{DialogPhase, DialogTracker, TrackedDialog, TrackerOutcome};

pub use rvoip_sip_fields::{FieldExtractor, TextFieldExtractor};
