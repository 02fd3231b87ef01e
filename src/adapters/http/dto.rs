//! Wire DTOs for the chat-skill channel.
//!
//! Inbound requests and outbound reply envelopes follow the messenger
//! skill format: `{version, template: {outputs, quickReplies}}` for
//! immediate replies and `{version, useCallback, data}` for interim
//! acknowledgements.

use serde::{Deserialize, Serialize};

use crate::domain::screening::report::{RiskImage, BOOKING_INTENT, BOOKING_LINK_URL};
use crate::domain::screening::Reply;

pub const WIRE_VERSION: &str = "2.0";

/// Inbound skill request.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillRequest {
    pub user_id: Option<String>,
    pub utterance: Option<String>,
    #[serde(default)]
    pub media: Option<MediaRef>,
    pub callback_url: Option<String>,
}

/// Attached media (report images).
#[derive(Debug, Clone, Deserialize)]
pub struct MediaRef {
    pub url: String,
    #[serde(rename = "type")]
    pub media_type: String,
}

/// Outbound reply envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplyEnvelope {
    pub version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template: Option<Template>,
    #[serde(rename = "useCallback", skip_serializing_if = "Option::is_none")]
    pub use_callback: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<CallbackData>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Template {
    pub outputs: Vec<Output>,
    #[serde(rename = "quickReplies", skip_serializing_if = "Option::is_none")]
    pub quick_replies: Option<Vec<QuickReply>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Output {
    #[serde(rename = "simpleText")]
    SimpleText { text: String },
    #[serde(rename = "basicCard")]
    BasicCard {
        title: String,
        description: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        thumbnail: Option<Thumbnail>,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Thumbnail {
    #[serde(rename = "imageUrl")]
    pub image_url: String,
}

/// Quick reply button; the booking intent opens a web link instead of
/// echoing a message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuickReply {
    pub label: String,
    pub action: String,
    #[serde(rename = "messageText", skip_serializing_if = "Option::is_none")]
    pub message_text: Option<String>,
    #[serde(rename = "webLinkUrl", skip_serializing_if = "Option::is_none")]
    pub web_link_url: Option<String>,
}

impl QuickReply {
    fn for_label(label: &str) -> Self {
        if label == BOOKING_INTENT {
            QuickReply {
                label: label.to_string(),
                action: "webLink".to_string(),
                message_text: None,
                web_link_url: Some(BOOKING_LINK_URL.to_string()),
            }
        } else {
            QuickReply {
                label: label.to_string(),
                action: "message".to_string(),
                message_text: Some(label.to_string()),
                web_link_url: None,
            }
        }
    }
}

impl ReplyEnvelope {
    /// Plain text envelope, used for synchronous error replies too.
    pub fn simple_text(text: impl Into<String>) -> Self {
        ReplyEnvelope {
            version: WIRE_VERSION.to_string(),
            template: Some(Template {
                outputs: vec![Output::SimpleText { text: text.into() }],
                quick_replies: None,
            }),
            use_callback: None,
            data: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallbackData {
    pub text: String,
}

impl From<&Reply> for ReplyEnvelope {
    fn from(reply: &Reply) -> Self {
        match reply {
            Reply::Text {
                text,
                quick_replies,
            } => ReplyEnvelope {
                version: WIRE_VERSION.to_string(),
                template: Some(Template {
                    outputs: vec![Output::SimpleText { text: text.clone() }],
                    quick_replies: to_quick_replies(quick_replies),
                }),
                use_callback: None,
                data: None,
            },
            Reply::Card {
                title,
                description,
                quick_replies,
                image,
            } => ReplyEnvelope {
                version: WIRE_VERSION.to_string(),
                template: Some(Template {
                    outputs: vec![Output::BasicCard {
                        title: title.clone(),
                        description: description.clone(),
                        thumbnail: image.map(|i: RiskImage| Thumbnail {
                            image_url: i.url().to_string(),
                        }),
                    }],
                    quick_replies: to_quick_replies(quick_replies),
                }),
                use_callback: None,
                data: None,
            },
            Reply::CallbackWait { text } => ReplyEnvelope {
                version: WIRE_VERSION.to_string(),
                template: None,
                use_callback: Some(true),
                data: Some(CallbackData { text: text.clone() }),
            },
        }
    }
}

fn to_quick_replies(labels: &[String]) -> Option<Vec<QuickReply>> {
    if labels.is_empty() {
        None
    } else {
        Some(labels.iter().map(|l| QuickReply::for_label(l)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_reply_becomes_simple_text() {
        let reply = Reply::text_with("안녕하세요", vec!["다시 검사하기".to_string()]);
        let envelope = ReplyEnvelope::from(&reply);
        let json = serde_json::to_value(&envelope).unwrap();
        assert_eq!(json["version"], "2.0");
        assert_eq!(json["template"]["outputs"][0]["simpleText"]["text"], "안녕하세요");
        assert_eq!(
            json["template"]["quickReplies"][0]["messageText"],
            "다시 검사하기"
        );
        assert!(json.get("useCallback").is_none());
    }

    #[test]
    fn wait_reply_uses_the_callback_shape() {
        let envelope = ReplyEnvelope::from(&Reply::wait("잠시만요"));
        let json = serde_json::to_value(&envelope).unwrap();
        assert_eq!(json["useCallback"], true);
        assert_eq!(json["data"]["text"], "잠시만요");
        assert!(json.get("template").is_none());
    }

    #[test]
    fn card_reply_carries_thumbnail_and_buttons() {
        let reply = Reply::Card {
            title: "결과".to_string(),
            description: "설명".to_string(),
            quick_replies: vec![BOOKING_INTENT.to_string()],
            image: Some(RiskImage::HighRisk),
        };
        let json = serde_json::to_value(ReplyEnvelope::from(&reply)).unwrap();
        let card = &json["template"]["outputs"][0]["basicCard"];
        assert_eq!(card["title"], "결과");
        assert!(card["thumbnail"]["imageUrl"]
            .as_str()
            .unwrap()
            .contains("high_risk"));
        let button = &json["template"]["quickReplies"][0];
        assert_eq!(button["action"], "webLink");
        assert!(button.get("messageText").is_none());
    }

    #[test]
    fn skill_request_parses_camel_case_fields() {
        let json = r#"{
            "userId": "u-1",
            "utterance": "아이가 기침해요",
            "callbackUrl": "http://cb.example/r",
            "media": {"url": "http://img.example/a.png", "type": "image"}
        }"#;
        let request: SkillRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.user_id.as_deref(), Some("u-1"));
        assert_eq!(request.media.as_ref().unwrap().media_type, "image");
        assert_eq!(request.callback_url.as_deref(), Some("http://cb.example/r"));
    }
}
