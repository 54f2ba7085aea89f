//! Email notification for matching slots: one message per triggering
//! cycle, sent to the notification address from itself over STARTTLS.

use chrono::Local;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use tracing::info;

use crate::config::Config;
use crate::error::MonitorError;
use crate::types::SlotRecord;

/// Sends a single email listing every matching slot. Best-effort: the
/// caller logs a failure and moves on, nothing is retried.
pub fn send_slot_notification(config: &Config, slots: &[SlotRecord]) -> Result<(), MonitorError> {
    let now = Local::now();
    let mailbox: Mailbox = config.notification_email.parse()?;

    let message = Message::builder()
        .from(mailbox.clone())
        .to(mailbox)
        .subject(format!(
            "🎉 PrairieTest Slot Available! - {}",
            now.format("%Y-%m-%d %H:%M")
        ))
        .header(ContentType::TEXT_HTML)
        .body(render_body(
            &config.base_url,
            slots,
            &now.format("%Y-%m-%d %H:%M:%S").to_string(),
        ))?;

    let mailer = SmtpTransport::starttls_relay(&config.smtp_host)?
        .port(config.smtp_port)
        .credentials(Credentials::new(
            config.notification_email.clone(),
            config.email_password.clone(),
        ))
        .build();

    mailer.send(&message)?;
    info!("notification sent for {} available slot(s)", slots.len());
    Ok(())
}

fn render_body(base_url: &str, slots: &[SlotRecord], sent_at: &str) -> String {
    let mut body = String::from(
        "<html>\n<body>\n\
         <h2>🎉 PrairieTest Exam Slot Available!</h2>\n\
         <p>Good news! The following exam slots are now available:</p>\n\
         <ul>\n",
    );

    for slot in slots {
        body.push_str(&format!(
            "<li><strong>Date:</strong> {}<br>\
             <strong>Time:</strong> {}<br>\
             <strong>Location:</strong> {}</li>\n",
            slot.date, slot.time, slot.location
        ));
    }

    body.push_str(&format!(
        "</ul>\n\
         <p><a href=\"{base_url}\">Click here to book your slot now!</a></p>\n\
         <p><small>Sent by the PrairieTest slot monitor at {sent_at}</small></p>\n\
         </body>\n</html>\n"
    ));

    body
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_slots() -> Vec<SlotRecord> {
        vec![
            SlotRecord {
                date: "March 15, 2024".to_string(),
                time: "10:00 AM".to_string(),
                location: "Building A".to_string(),
            },
            SlotRecord {
                date: "March 16, 2024".to_string(),
                time: "2:00 PM".to_string(),
                location: "Building B".to_string(),
            },
        ]
    }

    #[test]
    fn body_lists_every_slot_exactly_once() {
        let body = render_body("https://us.prairietest.com/", &sample_slots(), "2024-03-01 09:00:00");
        assert_eq!(body.matches("March 15, 2024").count(), 1);
        assert_eq!(body.matches("March 16, 2024").count(), 1);
        assert_eq!(body.matches("<li>").count(), 2);
    }

    #[test]
    fn body_links_back_to_the_site() {
        let body = render_body("https://us.prairietest.com/", &sample_slots(), "2024-03-01 09:00:00");
        assert!(body.contains("href=\"https://us.prairietest.com/\""));
        assert!(body.contains("2024-03-01 09:00:00"));
    }
}
