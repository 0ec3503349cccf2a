//! Live and peak session counts

use std::collections::BTreeMap;
use std::fmt;
use std::ops::Add;

use rvoip_sip_fields::{FieldExtractor, MessageFields, TextFieldExtractor};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::{SessionCounterConfig, DEFAULT_COUNTER_NAME};
use crate::direction::Direction;
use crate::errors::{CounterError, Result};
use crate::tracker::{DialogTracker, TrackerOutcome};

/// Counts of concurrently active dialogs per direction, plus the per-direction
/// snapshot taken when the total last reached a new high.
///
/// Missing directions read as zero. The peak snapshot is always replaced
/// wholesale, so its entries are mutually consistent: they are the live
/// counts of one moment in time.
#[derive(Debug, Clone)]
pub struct SessionCounter<E = TextFieldExtractor> {
    name: String,
    default_direction: Direction,
    extractor: E,
    counters: BTreeMap<Direction, u64>,
    peak_counters: BTreeMap<Direction, u64>,
    tracker: DialogTracker,
}

impl SessionCounter<TextFieldExtractor> {
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_extractor(name, TextFieldExtractor::new())
    }

    pub fn with_config(config: SessionCounterConfig) -> Result<Self> {
        Self::with_config_and_extractor(config, TextFieldExtractor::new())
    }
}

impl Default for SessionCounter<TextFieldExtractor> {
    fn default() -> Self {
        Self::new(DEFAULT_COUNTER_NAME)
    }
}

impl<E: FieldExtractor> SessionCounter<E> {
    pub fn with_extractor(name: impl Into<String>, extractor: E) -> Self {
        Self {
            name: name.into(),
            default_direction: Direction::default(),
            extractor,
            counters: BTreeMap::new(),
            peak_counters: BTreeMap::new(),
            tracker: DialogTracker::new(),
        }
    }

    pub fn with_config_and_extractor(config: SessionCounterConfig, extractor: E) -> Result<Self> {
        config.validate()?;
        let mut counter = Self::with_extractor(config.name, extractor);
        counter.default_direction = config.default_direction;
        Ok(counter)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn default_direction(&self) -> Direction {
        self.default_direction
    }

    /// Feed one message observed on `direction` (or the configured default).
    ///
    /// Returns `true` if a count changed. Never fails: anything the counter
    /// does not understand is a no-op.
    pub fn update(&mut self, message: &str, direction: Option<Direction>) -> bool {
        if !self.extractor.is_response(message) {
            return false;
        }

        let direction = direction.unwrap_or(self.default_direction);
        let fields = MessageFields::extract(&self.extractor, message);

        let changed = match self.tracker.observe(&fields, direction) {
            TrackerOutcome::Opened(direction) => {
                *self.counters.entry(direction).or_insert(0) += 1;
                true
            }
            TrackerOutcome::Closed(direction) => self.decrement(direction),
            TrackerOutcome::Unchanged => false,
        };

        self.refresh_peak();
        changed
    }

    /// Returns false when there was nothing to take away.
    fn decrement(&mut self, direction: Direction) -> bool {
        match self.counters.get_mut(&direction) {
            Some(count) if *count > 0 => {
                *count -= 1;
                true
            }
            _ => {
                // Only reachable when a dialog opened before clear() ends after it.
                warn!("{}: dialog closed on {} with no counted sessions", self.name, direction);
                false
            }
        }
    }

    fn refresh_peak(&mut self) {
        let total = self.sessions_sum();
        if total > self.peak_sessions_sum() {
            self.peak_counters = self.counters.clone();
            debug!("{}: new peak of {} sessions", self.name, total);
        }
    }

    /// Copy of the live counts.
    pub fn sessions(&self) -> BTreeMap<Direction, u64> {
        self.counters.clone()
    }

    /// Copy of the counts at the last peak.
    pub fn peak_sessions(&self) -> BTreeMap<Direction, u64> {
        self.peak_counters.clone()
    }

    pub fn sessions_for(&self, direction: Direction) -> u64 {
        self.counters.get(&direction).copied().unwrap_or(0)
    }

    pub fn peak_sessions_for(&self, direction: Direction) -> u64 {
        self.peak_counters.get(&direction).copied().unwrap_or(0)
    }

    pub fn sessions_sum(&self) -> u64 {
        self.counters.values().sum()
    }

    pub fn peak_sessions_sum(&self) -> u64 {
        self.peak_counters.values().sum()
    }

    /// Make the current counts the peak.
    pub fn reset_peak(&mut self) {
        self.peak_counters = self.counters.clone();
        debug!("{}: peak reset to {}", self.name, self.peak_sessions_sum());
    }

    /// Zero every count and the peak.
    ///
    /// Dialog tracking is kept, so a dialog opened before the clear still
    /// closes normally; its decrement is absorbed at zero.
    pub fn clear(&mut self) {
        self.counters.clear();
        debug!("{}: cleared ({} dialogs still tracked)", self.name, self.tracker.len());
        self.reset_peak();
    }

    pub fn tracker(&self) -> &DialogTracker {
        &self.tracker
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            name: self.name.clone(),
            sessions: self.sessions(),
            peak_sessions: self.peak_sessions(),
            sessions_sum: self.sessions_sum(),
            peak_sessions_sum: self.peak_sessions_sum(),
            tracked_dialogs: self.tracker.len(),
            established_dialogs: self.tracker.established_count(),
        }
    }
}

impl<E: FieldExtractor + Clone> SessionCounter<E> {
    /// Reporting aggregate of two counters.
    ///
    /// Names are joined with `&`; live and peak counts are summed per
    /// direction. Dialog tracking is not carried over, so the result starts
    /// with nothing tracked. Neither operand is modified.
    pub fn merge(&self, other: &Self) -> Self {
        let mut merged = Self::with_extractor(
            format!("{}&{}", self.name, other.name),
            self.extractor.clone(),
        );
        merged.default_direction = self.default_direction;
        merged.counters = sum_by_direction(&self.counters, &other.counters);
        merged.peak_counters = sum_by_direction(&self.peak_counters, &other.peak_counters);

        debug!(
            "Merged {} and {}: current {} peak {}",
            self.name,
            other.name,
            merged.sessions_sum(),
            merged.peak_sessions_sum()
        );
        merged
    }

    /// Fold any number of counters into one aggregate.
    pub fn try_merge_all<'a, I>(counters: I) -> Result<Self>
    where
        I: IntoIterator<Item = &'a Self>,
        E: 'a,
    {
        let mut iter = counters.into_iter();
        let first = iter.next().ok_or(CounterError::EmptyMerge)?;
        Ok(iter.fold(first.clone_aggregate(), |acc, next| acc.merge(next)))
    }

    fn clone_aggregate(&self) -> Self {
        let mut copy = Self::with_extractor(self.name.clone(), self.extractor.clone());
        copy.default_direction = self.default_direction;
        copy.counters = self.counters.clone();
        copy.peak_counters = self.peak_counters.clone();
        copy
    }
}

fn sum_by_direction(
    a: &BTreeMap<Direction, u64>,
    b: &BTreeMap<Direction, u64>,
) -> BTreeMap<Direction, u64> {
    let mut sum = a.clone();
    for (direction, count) in b {
        *sum.entry(*direction).or_insert(0) += count;
    }
    sum
}

impl<E: FieldExtractor + Clone> Add for SessionCounter<E> {
    type Output = SessionCounter<E>;

    fn add(self, other: Self) -> Self::Output {
        self.merge(&other)
    }
}

impl<'a, E: FieldExtractor + Clone> Add<&'a SessionCounter<E>> for &'a SessionCounter<E> {
    type Output = SessionCounter<E>;

    fn add(self, other: &'a SessionCounter<E>) -> Self::Output {
        self.merge(other)
    }
}

impl<E> fmt::Display for SessionCounter<E>
where
    E: FieldExtractor,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "SessionCounter {}  Current: {}  Peak: {}",
            self.name,
            self.sessions_sum(),
            self.peak_sessions_sum()
        )
    }
}

/// Point-in-time copy of a counter's figures, for reporting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub name: String,
    pub sessions: BTreeMap<Direction, u64>,
    pub peak_sessions: BTreeMap<Direction, u64>,
    pub sessions_sum: u64,
    pub peak_sessions_sum: u64,
    /// Dialogs still pending or established at snapshot time.
    pub tracked_dialogs: usize,
    /// Subset of `tracked_dialogs` that has seen a 2xx.
    pub established_dialogs: usize,
}
