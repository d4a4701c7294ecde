// SPDX-FileCopyrightText: 2026 Wacast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Wire types for the Cloud API `/{number_id}/messages` endpoint.

use serde::{Deserialize, Serialize};
use wacast_core::types::TemplateSend;

/// Body of a template send request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SendTemplateRequest {
    pub messaging_product: &'static str,
    pub to: String,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub template: TemplatePayload,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TemplatePayload {
    pub name: String,
    pub language: Language,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub components: Vec<Component>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Language {
    pub code: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Component {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub parameters: Vec<Parameter>,
}

/// A named text parameter, matching a `{{name}}` placeholder in the template body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Parameter {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub text: String,
    pub parameter_name: String,
}

impl From<&TemplateSend> for SendTemplateRequest {
    /// One request shape: a single body parameter when the template declares
    /// a variable, no components otherwise.
    fn from(send: &TemplateSend) -> Self {
        let components = send
            .parameter
            .iter()
            .map(|p| Component {
                kind: "body",
                parameters: vec![Parameter {
                    kind: "text",
                    text: p.value.clone(),
                    parameter_name: p.name.clone(),
                }],
            })
            .collect();
        Self {
            messaging_product: "whatsapp",
            to: send.to.clone(),
            kind: "template",
            template: TemplatePayload {
                name: send.template_name.clone(),
                language: Language {
                    code: send.language_code.clone(),
                },
                components,
            },
        }
    }
}

/// Successful send response.
#[derive(Debug, Clone, Deserialize)]
pub struct SendResponse {
    #[serde(default)]
    pub messages: Vec<SentMessage>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SentMessage {
    pub id: String,
}

/// Graph API error envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorResponse {
    pub error: ApiError,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiError {
    pub message: String,
    #[serde(default)]
    pub code: Option<i64>,
    #[serde(default, rename = "type")]
    pub type_: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use wacast_core::types::TemplateParameter;

    fn send(parameter: Option<TemplateParameter>) -> TemplateSend {
        TemplateSend {
            api_version: "v17.0".into(),
            number_id: "1098765".into(),
            token: "EAAG".into(),
            to: "919876543210".into(),
            template_name: "diwali_offer".into(),
            language_code: "en_US".into(),
            parameter,
        }
    }

    #[test]
    fn declared_variable_becomes_single_named_body_parameter() {
        let request = SendTemplateRequest::from(&send(Some(TemplateParameter {
            name: "name".into(),
            value: "Asha".into(),
        })));
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "messaging_product": "whatsapp",
                "to": "919876543210",
                "type": "template",
                "template": {
                    "name": "diwali_offer",
                    "language": {"code": "en_US"},
                    "components": [{
                        "type": "body",
                        "parameters": [{"type": "text", "text": "Asha", "parameter_name": "name"}]
                    }]
                }
            })
        );
    }

    #[test]
    fn no_variable_means_no_components() {
        let json = serde_json::to_value(SendTemplateRequest::from(&send(None))).unwrap();
        assert!(json["template"].get("components").is_none());
    }

    #[test]
    fn error_envelope_parses_code() {
        let body = r#"{"error":{"message":"(#132001) Template name does not exist in the translation","type":"OAuthException","code":132001,"fbtrace_id":"A1"}}"#;
        let parsed: ApiErrorResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.error.code, Some(132001));
        assert_eq!(parsed.error.type_.as_deref(), Some("OAuthException"));
    }
}
