use serde::{Deserialize, Serialize};

/// Location text used when a slot element carries no location field.
pub const UNKNOWN_LOCATION: &str = "Unknown";

/// One bookable exam slot, exactly as rendered by the site.
///
/// All fields are free text. The site's date and time formats are not
/// known in advance, so nothing here is normalized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotRecord {
    pub date: String,
    pub time: String,
    pub location: String,
}
