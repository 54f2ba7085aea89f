use crate::config::SlotCriteria;
use crate::types::SlotRecord;

/// Whether a slot satisfies the configured preferences. Pure predicate.
///
/// With neither a desired date nor a desired time configured, every slot
/// matches, even when a location is configured. Startup logs a warning
/// when that combination is active.
///
/// Date and time match on a case-sensitive substring of the rendered
/// text; location matches case-insensitively. All configured checks must
/// pass.
pub fn matches_criteria(slot: &SlotRecord, criteria: &SlotCriteria) -> bool {
    if criteria.date.is_none() && criteria.time.is_none() {
        return true;
    }

    if let Some(date) = &criteria.date {
        if !slot.date.contains(date.as_str()) {
            return false;
        }
    }

    if let Some(time) = &criteria.time {
        if !slot.time.contains(time.as_str()) {
            return false;
        }
    }

    if let Some(location) = &criteria.location {
        if !slot.location.to_lowercase().contains(&location.to_lowercase()) {
            return false;
        }
    }

    true
}
