//! Pulls slot records out of the rendered scheduling page.
//!
//! The page structure is not contractually known, so extraction runs
//! every container selector and keeps whatever parses. Overlapping
//! selectors can yield the same slot twice; that is accepted, matching
//! happens downstream on each record independently.

use std::time::Duration;

use scraper::{ElementRef, Html, Selector};
use thirtyfour::prelude::*;
use tracing::debug;

use crate::config::Config;
use crate::error::MonitorError;
use crate::types::{SlotRecord, UNKNOWN_LOCATION};

/// Wait for client-side rendering after navigation.
const RENDER_WAIT: Duration = Duration::from_secs(3);

/// Container candidates. All of them are tried and results accumulate,
/// unlike the login selectors where the first hit wins.
const CONTAINER_SELECTORS: &[&str] = &[
    ".slot",
    ".time-slot",
    ".available-slot",
    "[data-slot]",
    ".calendar-slot",
];

/// Field candidates within a container, tried in order; first hit wins.
const DATE_SELECTORS: &[&str] = &[".date", ".slot-date", "[data-date]"];
const TIME_SELECTORS: &[&str] = &[".time", ".slot-time", "[data-time]"];
const LOCATION_SELECTORS: &[&str] = &[".location", ".slot-location", "[data-location]"];

/// Navigates to the scheduling page and returns its rendered source.
/// Callers must hold an authenticated session.
pub async fn fetch_schedule_page(driver: &WebDriver, config: &Config) -> Result<String, MonitorError> {
    driver.goto(config.schedule_url()).await?;
    tokio::time::sleep(RENDER_WAIT).await;
    let html = driver.source().await?;
    Ok(html)
}

/// Parses every recognizable slot out of a page snapshot, in DOM order
/// per container selector. Containers that lack a date or a time are
/// skipped; nothing here fails the cycle.
pub fn parse_slots(html: &str) -> Vec<SlotRecord> {
    let document = Html::parse_document(html);
    let mut slots = Vec::new();

    for container in CONTAINER_SELECTORS {
        let Ok(selector) = Selector::parse(container) else {
            continue;
        };
        for element in document.select(&selector) {
            if let Some(slot) = slot_from_element(&element) {
                slots.push(slot);
            }
        }
    }

    debug!("extracted {} slot record(s)", slots.len());
    slots
}

/// A record needs both a date and a time element; location falls back to
/// a fixed placeholder.
fn slot_from_element(element: &ElementRef<'_>) -> Option<SlotRecord> {
    let date = field_text(element, DATE_SELECTORS)?;
    let time = field_text(element, TIME_SELECTORS)?;
    let location =
        field_text(element, LOCATION_SELECTORS).unwrap_or_else(|| UNKNOWN_LOCATION.to_string());
    Some(SlotRecord { date, time, location })
}

fn field_text(element: &ElementRef<'_>, selectors: &[&str]) -> Option<String> {
    for candidate in selectors {
        let Ok(selector) = Selector::parse(candidate) else {
            continue;
        };
        if let Some(found) = element.select(&selector).next() {
            return Some(found.text().collect::<String>().trim().to_string());
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_date_time_and_location() {
        let html = r#"
            <div class="slot">
                <span class="date"> March 15, 2024 </span>
                <span class="time">10:00 AM</span>
                <span class="location">Building A</span>
            </div>
        "#;
        let slots = parse_slots(html);
        assert_eq!(
            slots,
            vec![SlotRecord {
                date: "March 15, 2024".to_string(),
                time: "10:00 AM".to_string(),
                location: "Building A".to_string(),
            }]
        );
    }

    #[test]
    fn location_defaults_to_unknown() {
        let html = r#"
            <div class="time-slot">
                <span class="date">March 16, 2024</span>
                <span class="time">2:00 PM</span>
            </div>
        "#;
        let slots = parse_slots(html);
        assert_eq!(slots.len(), 1);
        assert_eq!(slots[0].location, UNKNOWN_LOCATION);
    }

    #[test]
    fn container_without_time_is_dropped() {
        let html = r#"
            <div class="slot">
                <span class="date">March 15, 2024</span>
            </div>
            <div class="slot">
                <span class="time">10:00 AM</span>
            </div>
        "#;
        assert!(parse_slots(html).is_empty());
    }

    #[test]
    fn overlapping_container_selectors_accumulate() {
        // One element matching two container selectors is emitted twice.
        let html = r#"
            <div class="slot available-slot">
                <span class="date">March 15, 2024</span>
                <span class="time">10:00 AM</span>
            </div>
        "#;
        let slots = parse_slots(html);
        assert_eq!(slots.len(), 2);
        assert_eq!(slots[0], slots[1]);
    }

    #[test]
    fn data_attribute_fields_are_recognized() {
        let html = r#"
            <li data-slot>
                <span data-date>2024-03-15</span>
                <span data-time>14:00</span>
                <span data-location>CBTF East</span>
            </li>
        "#;
        let slots = parse_slots(html);
        assert_eq!(slots.len(), 1);
        assert_eq!(slots[0].location, "CBTF East");
    }

    #[test]
    fn first_matching_field_selector_wins() {
        let html = r#"
            <div class="calendar-slot">
                <span class="slot-date">fallback date</span>
                <span class="date">primary date</span>
                <span class="time">9:00 AM</span>
            </div>
        "#;
        let slots = parse_slots(html);
        assert_eq!(slots[0].date, "primary date");
    }

    #[test]
    fn empty_page_yields_no_slots() {
        assert!(parse_slots("<html><body><p>nothing here</p></body></html>").is_empty());
    }
}
