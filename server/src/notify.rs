use reqwest::Client;
use serde_json::json;
use tracing::warn;

use crate::models::Reservation;

/// Posts reservation events to a Discord webhook when one is
/// configured. Delivery is fire-and-forget; a failed post is logged
/// and never surfaces to the API caller.
#[derive(Clone)]
pub struct Notifier {
    client: Client,
    webhook_url: String,
}

impl Notifier {
    pub fn new(webhook_url: String) -> Self {
        Self {
            client: Client::new(),
            webhook_url,
        }
    }

    pub fn reservation_created(&self, reservation: &Reservation) {
        self.post(created_message(reservation));
    }

    pub fn reservation_status_changed(&self, reservation: &Reservation) {
        self.post(status_message(reservation));
    }

    fn post(&self, message: String) {
        let client = self.client.clone();
        let url = self.webhook_url.clone();
        tokio::spawn(async move {
            let result = client
                .post(&url)
                .json(&json!({ "content": message }))
                .send()
                .await;
            match result {
                Ok(res) if !res.status().is_success() => {
                    warn!("discord webhook returned {}", res.status());
                }
                Err(e) => warn!("discord webhook delivery failed: {}", e),
                _ => {}
            }
        });
    }
}

fn created_message(r: &Reservation) -> String {
    format!(
        "New reservation #{} for {} on {} {}-{}",
        r.id, r.reserved_by_name, r.date, r.time_start, r.time_end
    )
}

fn status_message(r: &Reservation) -> String {
    format!("Reservation #{} is now {}", r.id, r.status)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};

    fn reservation() -> Reservation {
        Reservation {
            id: 42,
            customer_id: 1,
            reserved_by_name: "Nok".to_string(),
            date: NaiveDate::from_ymd_opt(2025, 7, 4).unwrap(),
            time_start: "09:00".to_string(),
            time_end: "12:00".to_string(),
            purpose: None,
            pickup_location: None,
            dropoff_location: None,
            vehicle_id: None,
            driver_id: None,
            passenger_count: None,
            passenger_info: None,
            status: "confirmed".to_string(),
            active: Some(true),
            image_url: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn messages_carry_id_and_window() {
        let r = reservation();
        assert_eq!(
            created_message(&r),
            "New reservation #42 for Nok on 2025-07-04 09:00-12:00"
        );
        assert_eq!(status_message(&r), "Reservation #42 is now confirmed");
    }
}
