//! Per-dialog bookkeeping
//!
//! The tracker decides, for each observed response, whether a dialog has
//! just come into existence, has just gone away, or neither. It owns no
//! counters; [`SessionCounter`](crate::SessionCounter) applies the outcome.
//!
//! ## Lifecycle
//!
//! ```text
//!   100 Trying (INVITE, no To tag)       200 OK (INVITE)
//!  ───────────────────────────────► Pending ───────────────► Established
//!                                      │                         │
//!        3xx-6xx empties pending CSeqs │                         │ any BYE response
//!                                      ▼                         ▼
//!                                   removed                   removed
//! ```
//!
//! A dialog produces exactly one [`TrackerOutcome::Opened`] and at most one
//! [`TrackerOutcome::Closed`], always with the same direction.

use std::collections::{HashMap, HashSet};

use rvoip_sip_fields::codes::{self, methods, StatusClass};
use rvoip_sip_fields::MessageFields;
use tracing::debug;

use crate::direction::Direction;

/// Where a tracked dialog is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogPhase {
    /// Counted; waiting for a final response to the INVITE.
    Pending,
    /// A 2xx has been seen; only a BYE ends it now.
    Established,
}

/// State kept for one Call-ID.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackedDialog {
    direction: Direction,
    pending: HashSet<i64>,
    phase: DialogPhase,
}

impl TrackedDialog {
    fn new(direction: Direction, cseq: i64) -> Self {
        Self {
            direction,
            pending: HashSet::from([cseq]),
            phase: DialogPhase::Pending,
        }
    }

    /// Direction the dialog is counted under.
    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn phase(&self) -> DialogPhase {
        self.phase
    }

    /// CSeq numbers that have seen a `100 Trying` but no failure yet.
    pub fn pending_sequences(&self) -> &HashSet<i64> {
        &self.pending
    }
}

/// Effect of one message on the set of counted dialogs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackerOutcome {
    /// A new dialog is counted under this direction.
    Opened(Direction),
    /// A counted dialog ended; uncount it from this direction.
    Closed(Direction),
    Unchanged,
}

impl TrackerOutcome {
    pub fn is_change(&self) -> bool {
        !matches!(self, TrackerOutcome::Unchanged)
    }
}

/// Dialogs indexed by Call-ID.
///
/// Messages without a Call-ID all share the empty-string key. That is
/// wrong for any real traffic but keeps malformed input from aborting
/// the caller.
#[derive(Debug, Clone, Default)]
pub struct DialogTracker {
    dialogs: HashMap<String, TrackedDialog>,
}

impl DialogTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one message's fields.
    ///
    /// `direction` is the label the message arrived with. Requests and
    /// responses to methods other than INVITE and BYE never change state.
    pub fn observe(&mut self, fields: &MessageFields<'_>, direction: Direction) -> TrackerOutcome {
        if !fields.is_response {
            return TrackerOutcome::Unchanged;
        }

        match fields.sequence.method {
            methods::INVITE => self.on_invite_response(fields, direction),
            methods::BYE => self.on_bye_response(fields.call_id),
            _ => TrackerOutcome::Unchanged,
        }
    }

    fn on_invite_response(&mut self, fields: &MessageFields<'_>, direction: Direction) -> TrackerOutcome {
        let call_id = fields.call_id;
        let cseq = fields.sequence.number;
        let status = fields.status_code;

        if status == codes::TRYING && !fields.in_dialog() {
            return self.on_trying(call_id, cseq, direction);
        }

        if status == codes::OK {
            if let Some(dialog) = self.dialogs.get_mut(call_id) {
                if dialog.phase == DialogPhase::Pending {
                    dialog.phase = DialogPhase::Established;
                    debug!("Dialog {:?} established", call_id);
                }
            }
            return TrackerOutcome::Unchanged;
        }

        if StatusClass::of(status).is_failure() {
            return self.on_failure(call_id, cseq, status);
        }

        TrackerOutcome::Unchanged
    }

    fn on_trying(&mut self, call_id: &str, cseq: i64, direction: Direction) -> TrackerOutcome {
        if let Some(dialog) = self.dialogs.get_mut(call_id) {
            dialog.pending.insert(cseq);
            return TrackerOutcome::Unchanged;
        }

        let direction = direction.reverse();
        self.dialogs
            .insert(call_id.to_string(), TrackedDialog::new(direction, cseq));
        debug!("Dialog {:?} opened (cseq {}) counted {}", call_id, cseq, direction);
        TrackerOutcome::Opened(direction)
    }

    fn on_failure(&mut self, call_id: &str, cseq: i64, status: &str) -> TrackerOutcome {
        let Some(dialog) = self.dialogs.get_mut(call_id) else {
            return TrackerOutcome::Unchanged;
        };
        if dialog.phase != DialogPhase::Pending {
            return TrackerOutcome::Unchanged;
        }

        dialog.pending.remove(&cseq);
        if !dialog.pending.is_empty() {
            return TrackerOutcome::Unchanged;
        }

        let direction = dialog.direction;
        self.dialogs.remove(call_id);
        debug!("Dialog {:?} failed with {} counted {}", call_id, status, direction);
        TrackerOutcome::Closed(direction)
    }

    fn on_bye_response(&mut self, call_id: &str) -> TrackerOutcome {
        match self.dialogs.get(call_id) {
            Some(dialog) if dialog.phase == DialogPhase::Established => {
                let direction = dialog.direction;
                self.dialogs.remove(call_id);
                debug!("Dialog {:?} terminated counted {}", call_id, direction);
                TrackerOutcome::Closed(direction)
            }
            _ => TrackerOutcome::Unchanged,
        }
    }

    pub fn get(&self, call_id: &str) -> Option<&TrackedDialog> {
        self.dialogs.get(call_id)
    }

    pub fn is_tracked(&self, call_id: &str) -> bool {
        self.dialogs.contains_key(call_id)
    }

    pub fn is_established(&self, call_id: &str) -> bool {
        self.dialogs
            .get(call_id)
            .map_or(false, |d| d.phase == DialogPhase::Established)
    }

    /// Number of tracked dialogs, pending or established.
    pub fn len(&self) -> usize {
        self.dialogs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dialogs.is_empty()
    }

    pub fn established_count(&self) -> usize {
        self.dialogs
            .values()
            .filter(|d| d.phase == DialogPhase::Established)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rvoip_sip_fields::Sequence;

    fn response<'a>(call_id: &'a str, cseq: i64, method: &'a str, status: &'a str, tag: bool) -> MessageFields<'a> {
        MessageFields {
            is_response: true,
            call_id,
            sequence: Sequence::new(cseq, method),
            method: "",
            status_code: status,
            dialog_tag: Some(tag),
        }
    }

    #[test]
    fn test_trying_opens_with_reversed_direction() {
        let mut tracker = DialogTracker::new();
        let outcome = tracker.observe(&response("c1", 1, "INVITE", "100", false), Direction::Out);

        assert_eq!(outcome, TrackerOutcome::Opened(Direction::In));
        let dialog = tracker.get("c1").unwrap();
        assert_eq!(dialog.direction(), Direction::In);
        assert_eq!(dialog.phase(), DialogPhase::Pending);
        assert!(dialog.pending_sequences().contains(&1));
    }

    #[test]
    fn test_reinvite_trying_is_ignored() {
        let mut tracker = DialogTracker::new();
        let outcome = tracker.observe(&response("c1", 2, "INVITE", "100", true), Direction::In);
        assert_eq!(outcome, TrackerOutcome::Unchanged);
        assert!(tracker.is_empty());
    }

    #[test]
    fn test_second_trying_adds_pending_sequence() {
        let mut tracker = DialogTracker::new();
        tracker.observe(&response("c1", 1, "INVITE", "100", false), Direction::In);
        let outcome = tracker.observe(&response("c1", 2, "INVITE", "100", false), Direction::Out);

        assert_eq!(outcome, TrackerOutcome::Unchanged);
        let dialog = tracker.get("c1").unwrap();
        assert_eq!(dialog.direction(), Direction::Out);
        assert_eq!(dialog.pending_sequences().len(), 2);
    }

    #[test]
    fn test_failure_closes_only_when_all_attempts_fail() {
        let mut tracker = DialogTracker::new();
        tracker.observe(&response("c1", 1, "INVITE", "100", false), Direction::In);
        tracker.observe(&response("c1", 2, "INVITE", "100", false), Direction::In);

        let first = tracker.observe(&response("c1", 1, "INVITE", "407", true), Direction::In);
        assert_eq!(first, TrackerOutcome::Unchanged);
        assert!(tracker.is_tracked("c1"));

        let second = tracker.observe(&response("c1", 2, "INVITE", "486", true), Direction::In);
        assert_eq!(second, TrackerOutcome::Closed(Direction::Out));
        assert!(!tracker.is_tracked("c1"));
    }

    #[test]
    fn test_failure_after_establishment_is_ignored() {
        let mut tracker = DialogTracker::new();
        tracker.observe(&response("c1", 1, "INVITE", "100", false), Direction::In);
        tracker.observe(&response("c1", 1, "INVITE", "200", true), Direction::In);
        assert!(tracker.is_established("c1"));
        assert_eq!(tracker.established_count(), 1);

        let outcome = tracker.observe(&response("c1", 1, "INVITE", "500", true), Direction::In);
        assert_eq!(outcome, TrackerOutcome::Unchanged);
        assert!(tracker.is_established("c1"));
    }

    #[test]
    fn test_bye_closes_established_only() {
        let mut tracker = DialogTracker::new();
        tracker.observe(&response("c1", 1, "INVITE", "100", false), Direction::Both);

        let early = tracker.observe(&response("c1", 2, "BYE", "200", true), Direction::Both);
        assert_eq!(early, TrackerOutcome::Unchanged);
        assert!(tracker.is_tracked("c1"));

        tracker.observe(&response("c1", 1, "INVITE", "200", true), Direction::Both);
        let bye = tracker.observe(&response("c1", 2, "BYE", "481", true), Direction::Both);
        assert_eq!(bye, TrackerOutcome::Closed(Direction::Both));
        assert!(tracker.is_empty());

        let again = tracker.observe(&response("c1", 2, "BYE", "200", true), Direction::Both);
        assert_eq!(again, TrackerOutcome::Unchanged);
    }

    #[test]
    fn test_requests_never_change_state() {
        let mut tracker = DialogTracker::new();
        let mut request = response("c1", 1, "INVITE", "", false);
        request.is_response = false;
        request.method = "INVITE";
        assert_eq!(tracker.observe(&request, Direction::In), TrackerOutcome::Unchanged);
        assert!(tracker.is_empty());
    }

    #[test]
    fn test_other_methods_are_ignored() {
        let mut tracker = DialogTracker::new();
        for method in ["OPTIONS", "REGISTER", "SUBSCRIBE", ""] {
            let outcome = tracker.observe(&response("c1", 1, method, "100", false), Direction::In);
            assert_eq!(outcome, TrackerOutcome::Unchanged);
        }
        assert!(tracker.is_empty());
    }

    #[test]
    fn test_empty_call_id_is_a_valid_key() {
        let mut tracker = DialogTracker::new();
        let outcome = tracker.observe(&response("", -1, "INVITE", "100", false), Direction::In);
        assert_eq!(outcome, TrackerOutcome::Opened(Direction::Out));
        assert!(tracker.is_tracked(""));
    }
}
