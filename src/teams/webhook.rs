use crate::error::{HeraldError, Result};
use crate::log_debug;
use crate::teams::card::MessageCard;

use url::Url;

/// Post the card to the webhook, once
pub async fn send(http: &reqwest::Client, card: &MessageCard, webhook_url: &Url) -> Result<()> {
    log_debug!("Posting message card to {}", webhook_url.host_str().unwrap_or("webhook"));

    let response = http
        .post(webhook_url.clone())
        .json(card)
        .send()
        .await
        .map_err(|e| HeraldError::Delivery {
            status: e.status().map(|s| s.as_u16()),
            // The webhook URL carries its credential, so the error is stripped of it
            status_text: if e.is_timeout() {
                "request timed out".to_string()
            } else {
                e.without_url().to_string()
            },
        })?;

    let status = response.status();
    if !status.is_success() {
        return Err(HeraldError::Delivery {
            status: Some(status.as_u16()),
            status_text: status.canonical_reason().unwrap_or_default().to_string(),
        });
    }

    log_debug!("Webhook accepted the card with status {}", status.as_u16());
    Ok(())
}
