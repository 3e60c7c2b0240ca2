//! Date extractors: find the anchor a reminder's trigger time is computed from.
//!
//! An absent anchor means "not yet schedulable"; it is never an error.

use chrono::{DateTime, TimeZone, Utc};
use chrono_tz::Tz;
use notify_types::{CaseSnapshot, EventType};

/// Resolves an anchor date from a case snapshot.
pub trait DateExtractor: Send + Sync {
    /// The anchor date, if the snapshot has one.
    fn extract(&self, snapshot: &CaseSnapshot) -> Option<DateTime<Utc>>;
}

/// Anchors on the most recent occurrence of a reference event.
///
/// History is not assumed sorted. Timestamp ties go to the event appended
/// last.
#[derive(Debug, Clone, Copy)]
pub struct EventDateExtractor {
    reference: EventType,
}

impl EventDateExtractor {
    pub fn new(reference: EventType) -> Self {
        Self { reference }
    }

    /// The reference event this extractor anchors on.
    pub fn reference(&self) -> EventType {
        self.reference
    }

    /// Most recent date of `event_type` in the snapshot's history.
    pub fn extract_for_reference_event(
        snapshot: &CaseSnapshot,
        event_type: EventType,
    ) -> Option<DateTime<Utc>> {
        snapshot.latest_event_date(event_type)
    }
}

impl DateExtractor for EventDateExtractor {
    fn extract(&self, snapshot: &CaseSnapshot) -> Option<DateTime<Utc>> {
        Self::extract_for_reference_event(snapshot, self.reference)
    }
}

/// Anchors on the first scheduled hearing.
///
/// Hearing dates and times are local to `timezone`. A local time skipped
/// by a daylight-saving change does not resolve; an ambiguous one resolves
/// to its earlier instant.
#[derive(Debug, Clone, Copy)]
pub struct HearingDateExtractor {
    timezone: Tz,
}

impl HearingDateExtractor {
    pub fn new(timezone: Tz) -> Self {
        Self { timezone }
    }
}

impl DateExtractor for HearingDateExtractor {
    fn extract(&self, snapshot: &CaseSnapshot) -> Option<DateTime<Utc>> {
        let hearing = snapshot.first_hearing()?;
        let local = hearing.date.and_time(hearing.time);
        self.timezone
            .from_local_datetime(&local)
            .earliest()
            .map(|at| at.with_timezone(&Utc))
    }
}
