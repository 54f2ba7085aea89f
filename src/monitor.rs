//! The polling loop: ensure a session, extract slots, filter them,
//! notify on matches, sleep until the next tick. One cycle is ever in
//! flight; all monitor state lives on this struct rather than in
//! globals.

use std::time::Duration;

use chrono::{DateTime, Local};
use tokio::time::Instant;
use tracing::{debug, error, info};

use crate::config::{Config, SlotCriteria};
use crate::error::MonitorError;
use crate::extract;
use crate::filter;
use crate::notify;
use crate::session::SessionManager;
use crate::types::SlotRecord;

/// How often the loop wakes to check whether the next poll is due. The
/// interval itself is measured against a monotonic clock, so tick drift
/// does not accumulate.
const TICK: Duration = Duration::from_secs(60);

pub struct Monitor {
    config: Config,
    session: SessionManager,
    last_check: Option<DateTime<Local>>,
}

impl Monitor {
    pub fn new(config: Config) -> Self {
        let session = SessionManager::new(config.clone());
        Self {
            config,
            session,
            last_check: None,
        }
    }

    pub fn last_check(&self) -> Option<DateTime<Local>> {
        self.last_check
    }

    /// Runs forever. The first cycle starts immediately; later cycles
    /// are spaced by the configured interval. Stops only when the caller
    /// drops this future (interrupt handling lives in main).
    pub async fn run(&mut self) {
        info!(
            "starting slot monitor, checking every {} minute(s)",
            self.config.check_interval.as_secs() / 60
        );

        let mut next_due = Instant::now();
        loop {
            if Instant::now() >= next_due {
                self.run_cycle().await;
                next_due = Instant::now() + self.config.check_interval;
            }
            tokio::time::sleep(TICK).await;
        }
    }

    /// One full cycle. Never propagates an error: any fault is logged at
    /// this boundary and treated as "no slots found this cycle".
    async fn run_cycle(&mut self) {
        info!("checking for available slots");

        let matches = match self.collect_matches().await {
            Ok(matches) => matches,
            Err(e) => {
                if matches!(e, MonitorError::WebDriver(_)) {
                    // A dead driver also means the login state is gone.
                    self.session.invalidate();
                }
                error!("error checking slots: {e}");
                Vec::new()
            }
        };

        if matches.is_empty() {
            info!("no matching slots this cycle");
        } else {
            info!("found {} matching slot(s), sending notification", matches.len());
            self.send_notification(matches).await;
        }

        self.last_check = Some(Local::now());
        debug!("cycle finished");
    }

    /// Session, extraction and matching for one cycle. A failed login is
    /// not an error here: it has already been logged and the cycle just
    /// has nothing to report.
    async fn collect_matches(&mut self) -> Result<Vec<SlotRecord>, MonitorError> {
        if !self.session.ensure_session().await {
            return Ok(Vec::new());
        }
        let driver = self.session.driver().ok_or(MonitorError::NoSession)?;

        let html = extract::fetch_schedule_page(driver, &self.config).await?;
        let slots = extract::parse_slots(&html);
        info!("found {} slot(s) on the scheduling page", slots.len());

        Ok(select_matches(slots, &self.config.criteria))
    }

    /// Dispatches the notification off the async thread; delivery
    /// failures are logged and swallowed.
    async fn send_notification(&self, matches: Vec<SlotRecord>) {
        let config = self.config.clone();
        let count = matches.len();
        let result =
            tokio::task::spawn_blocking(move || notify::send_slot_notification(&config, &matches))
                .await;
        match result {
            Ok(Ok(())) => debug!("notification dispatched for {count} slot(s)"),
            Ok(Err(e)) => error!("failed to send notification: {e}"),
            Err(e) => error!("notification task failed: {e}"),
        }
    }

    /// Releases the browser. Safe to call regardless of how the loop
    /// ended.
    pub async fn shutdown(&mut self) {
        self.session.close().await;
        info!("monitor stopped");
    }
}

/// Applies the configured criteria to one cycle's extracted records.
/// The result is the whole batch handed to the notifier; matches are
/// never split across sends.
fn select_matches(slots: Vec<SlotRecord>, criteria: &SlotCriteria) -> Vec<SlotRecord> {
    slots
        .into_iter()
        .filter(|slot| filter::matches_criteria(slot, criteria))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> Config {
        Config {
            base_url: "https://exam.test/".to_string(),
            school_email: "student@school.edu".to_string(),
            school_password: "hunter2".to_string(),
            smtp_host: "smtp.test".to_string(),
            smtp_port: 587,
            notification_email: "me@test".to_string(),
            email_password: "pw".to_string(),
            check_interval: Duration::from_secs(300),
            criteria: SlotCriteria::default(),
            headless: true,
            timeout: Duration::from_secs(1),
            // nothing listens here, so driver startup fails immediately
            webdriver_url: "http://127.0.0.1:1".to_string(),
        }
    }

    fn slot(date: &str, time: &str, location: &str) -> SlotRecord {
        SlotRecord {
            date: date.to_string(),
            time: time.to_string(),
            location: location.to_string(),
        }
    }

    #[tokio::test]
    async fn failed_login_yields_an_empty_match_set() {
        let mut monitor = Monitor::new(test_config());
        let matches = monitor.collect_matches().await.unwrap();
        assert!(matches.is_empty());
        assert!(!monitor.session.is_authenticated());
    }

    #[tokio::test]
    async fn cycle_survives_a_failed_login_and_stamps_last_check() {
        // An unreachable driver endpoint exhausts the login attempt; the
        // cycle must finish without panicking, skip the notifier (empty
        // match set) and still record the check time.
        let mut monitor = Monitor::new(test_config());
        assert!(monitor.last_check().is_none());
        monitor.run_cycle().await;
        assert!(monitor.last_check().is_some());
        assert!(!monitor.session.is_authenticated());
    }

    #[test]
    fn select_matches_keeps_every_matching_record_in_one_batch() {
        let criteria = SlotCriteria {
            date: Some("March".to_string()),
            time: None,
            location: None,
        };
        let slots = vec![
            slot("March 15, 2024", "10:00 AM", "Building A"),
            slot("April 2, 2024", "9:00 AM", "Building C"),
            slot("March 16, 2024", "2:00 PM", "Building B"),
        ];
        let matches = select_matches(slots, &criteria);
        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].date, "March 15, 2024");
        assert_eq!(matches[1].date, "March 16, 2024");
    }

    #[test]
    fn select_matches_is_empty_when_nothing_qualifies() {
        let criteria = SlotCriteria {
            date: Some("2024-03-15".to_string()),
            time: None,
            location: None,
        };
        let slots = vec![slot("March 15, 2024", "10:00 AM", "Building A")];
        assert!(select_matches(slots, &criteria).is_empty());
    }
}
