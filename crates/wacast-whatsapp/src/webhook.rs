// SPDX-FileCopyrightText: 2026 Wacast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Meta webhook envelopes: parsing, subscription handshake, signature check.
//!
//! Parsing is lenient: anything the pipeline does not act on is skipped so
//! the endpoint can always acknowledge with 200.

use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;
use tracing::debug;
use wacast_core::types::{InboundReply, MessageStatus, StatusEvent};

const BUSINESS_ACCOUNT_OBJECT: &str = "whatsapp_business_account";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WebhookPayload {
    #[serde(default)]
    pub object: Option<String>,
    #[serde(default)]
    pub entry: Vec<Entry>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Entry {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub changes: Vec<Change>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Change {
    #[serde(default)]
    pub field: Option<String>,
    #[serde(default)]
    pub value: ChangeValue,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChangeValue {
    #[serde(default)]
    pub metadata: Option<Metadata>,
    #[serde(default)]
    pub statuses: Vec<StatusPayload>,
    #[serde(default)]
    pub messages: Vec<InboundMessage>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Metadata {
    #[serde(default)]
    pub display_phone_number: Option<String>,
    pub phone_number_id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StatusPayload {
    pub id: String,
    pub status: String,
    #[serde(default)]
    pub recipient_id: Option<String>,
    #[serde(default)]
    pub errors: Vec<StatusError>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StatusError {
    #[serde(default)]
    pub code: Option<i64>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InboundMessage {
    pub from: String,
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub text: Option<TextBody>,
    #[serde(default)]
    pub button: Option<ButtonBody>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TextBody {
    pub body: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ButtonBody {
    pub text: String,
}

/// Events extracted from one webhook delivery.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WebhookEvents {
    pub statuses: Vec<StatusEvent>,
    pub replies: Vec<InboundReply>,
}

impl WebhookEvents {
    pub fn is_empty(&self) -> bool {
        self.statuses.is_empty() && self.replies.is_empty()
    }
}

/// Flatten every entry and change of a payload into pipeline events.
///
/// Payloads for other objects, statuses outside `sent|delivered|read|failed`,
/// and inbound messages without readable text are skipped.
pub fn parse_events(payload: &WebhookPayload) -> WebhookEvents {
    let mut events = WebhookEvents::default();

    if payload.object.as_deref() != Some(BUSINESS_ACCOUNT_OBJECT) {
        debug!(object = ?payload.object, "ignoring webhook for other object");
        return events;
    }

    for change in payload.entry.iter().flat_map(|e| e.changes.iter()) {
        let value = &change.value;

        for status in &value.statuses {
            let Ok(parsed) = status.status.parse::<MessageStatus>() else {
                debug!(status = %status.status, wa_message_id = %status.id, "ignoring unknown status");
                continue;
            };
            let error = status
                .errors
                .first()
                .and_then(|e| e.message.clone().or_else(|| e.title.clone()));
            events.statuses.push(StatusEvent {
                wa_message_id: status.id.clone(),
                status: parsed,
                error,
            });
        }

        let Some(metadata) = &value.metadata else {
            if !value.messages.is_empty() {
                debug!("inbound messages without metadata, skipping");
            }
            continue;
        };
        for message in &value.messages {
            let text = match (message.kind.as_str(), &message.text, &message.button) {
                ("text", Some(text), _) => text.body.clone(),
                ("button", _, Some(button)) => button.text.clone(),
                _ => {
                    debug!(kind = %message.kind, wa_message_id = %message.id, "ignoring non-text message");
                    continue;
                }
            };
            events.replies.push(InboundReply {
                from_phone: message.from.clone(),
                company_number_id: metadata.phone_number_id.clone(),
                wa_message_id: message.id.clone(),
                text,
            });
        }
    }

    events
}

/// Answer Meta's subscription handshake.
///
/// Returns the challenge to echo iff the mode is `subscribe` and the token
/// matches the configured one. An unset expected token never matches.
pub fn verify_subscription<'a>(
    mode: Option<&str>,
    token: Option<&str>,
    challenge: Option<&'a str>,
    expected_token: Option<&str>,
) -> Option<&'a str> {
    let expected = expected_token.filter(|t| !t.is_empty())?;
    if mode == Some("subscribe") && token == Some(expected) {
        challenge
    } else {
        None
    }
}

/// Verify an `X-Hub-Signature-256: sha256=<hex>` header over the raw body.
pub fn verify_signature(app_secret: &str, body: &[u8], signature_header: &str) -> bool {
    let Some(hex_sig) = signature_header.strip_prefix("sha256=") else {
        return false;
    };
    let Ok(expected) = hex::decode(hex_sig) else {
        return false;
    };
    let Ok(mut mac) = Hmac::<Sha256>::new_from_slice(app_secret.as_bytes()) else {
        return false;
    };
    mac.update(body);
    mac.verify_slice(&expected).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(value: serde_json::Value) -> WebhookPayload {
        serde_json::from_value(serde_json::json!({
            "object": "whatsapp_business_account",
            "entry": [{"id": "WABA-1", "changes": [{"field": "messages", "value": value}]}]
        }))
        .unwrap()
    }

    #[test]
    fn parses_status_updates() {
        let events = parse_events(&payload(serde_json::json!({
            "messaging_product": "whatsapp",
            "metadata": {"display_phone_number": "15550001111", "phone_number_id": "1098765"},
            "statuses": [
                {"id": "wamid.1", "status": "delivered", "timestamp": "1700000000", "recipient_id": "919876543210"},
                {"id": "wamid.2", "status": "read", "timestamp": "1700000001", "recipient_id": "919876543211"},
                {"id": "wamid.3", "status": "failed", "errors": [{"code": 131026, "title": "Message undeliverable"}]},
                {"id": "wamid.4", "status": "deleted"}
            ]
        })));

        assert_eq!(events.statuses.len(), 3);
        assert_eq!(events.statuses[0].status, MessageStatus::Delivered);
        assert_eq!(events.statuses[1].status, MessageStatus::Read);
        assert_eq!(events.statuses[2].status, MessageStatus::Failed);
        assert_eq!(
            events.statuses[2].error.as_deref(),
            Some("Message undeliverable")
        );
        assert!(events.replies.is_empty());
    }

    #[test]
    fn parses_text_and_button_replies() {
        let events = parse_events(&payload(serde_json::json!({
            "metadata": {"phone_number_id": "1098765"},
            "contacts": [{"profile": {"name": "Asha"}, "wa_id": "919876543210"}],
            "messages": [
                {"from": "919876543210", "id": "wamid.in.1", "timestamp": "1", "type": "text", "text": {"body": "Interested!"}},
                {"from": "919876543210", "id": "wamid.in.2", "timestamp": "2", "type": "button", "button": {"text": "Stop promotions", "payload": "STOP"}},
                {"from": "919876543210", "id": "wamid.in.3", "timestamp": "3", "type": "image", "image": {"id": "media-1"}}
            ]
        })));

        assert_eq!(events.replies.len(), 2);
        assert_eq!(events.replies[0].text, "Interested!");
        assert_eq!(events.replies[0].company_number_id, "1098765");
        assert_eq!(events.replies[1].text, "Stop promotions");
    }

    #[test]
    fn other_objects_are_ignored() {
        let payload: WebhookPayload = serde_json::from_value(serde_json::json!({
            "object": "page",
            "entry": [{"changes": [{"value": {"statuses": [{"id": "x", "status": "read"}]}}]}]
        }))
        .unwrap();
        assert!(parse_events(&payload).is_empty());
    }

    #[test]
    fn subscription_handshake() {
        assert_eq!(
            verify_subscription(Some("subscribe"), Some("tok"), Some("1158201444"), Some("tok")),
            Some("1158201444")
        );
        assert_eq!(
            verify_subscription(Some("subscribe"), Some("bad"), Some("1"), Some("tok")),
            None
        );
        assert_eq!(
            verify_subscription(Some("unsubscribe"), Some("tok"), Some("1"), Some("tok")),
            None
        );
        assert_eq!(
            verify_subscription(Some("subscribe"), Some(""), Some("1"), None),
            None
        );
    }

    #[test]
    fn signature_round_trip() {
        let body = br#"{"object":"whatsapp_business_account"}"#;
        let mut mac = Hmac::<Sha256>::new_from_slice(b"app-secret").unwrap();
        mac.update(body);
        let header = format!("sha256={}", hex::encode(mac.finalize().into_bytes()));

        assert!(verify_signature("app-secret", body, &header));
        assert!(!verify_signature("other-secret", body, &header));
        assert!(!verify_signature("app-secret", body, "sha1=abc"));
        assert!(!verify_signature("app-secret", b"tampered", &header));
    }
}
