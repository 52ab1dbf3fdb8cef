//! JSON bodies of the HTTP API.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct HealthRes {
    pub status: String,
    pub message: String,
}

/// A chat message. `user_id` defaults to `anonymous`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ChatReq {
    pub message: String,
    #[serde(default)]
    pub user_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ChatRes {
    pub response: String,
    pub disclaimer: String,
}

/// Free-text feedback. `user_id` defaults to `feedback`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct FeedbackReq {
    pub message: String,
    #[serde(default)]
    pub user_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct FeedbackRes {
    pub status: String,
}

impl FeedbackRes {
    pub fn success() -> Self {
        Self {
            status: "success".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ConditionRes {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    /// One of `mild`, `moderate` or `severe`.
    pub severity_level: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct RemedyRes {
    pub id: i64,
    pub remedy_text: String,
    pub safety_notes: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_req_user_id_is_optional() {
        let req: ChatReq = serde_json::from_str(r#"{"message":"I have a cough"}"#).unwrap();
        assert_eq!(req.message, "I have a cough");
        assert_eq!(req.user_id, None);
    }

    #[test]
    fn test_feedback_res_shape() {
        let json = serde_json::to_value(FeedbackRes::success()).unwrap();
        assert_eq!(json, serde_json::json!({ "status": "success" }));
    }

    #[test]
    fn test_condition_res_keeps_null_description() {
        let res = ConditionRes {
            id: 3,
            name: "Vertigo".into(),
            description: None,
            severity_level: "mild".into(),
        };
        let json = serde_json::to_value(res).unwrap();
        assert_eq!(json["description"], serde_json::Value::Null);
        assert_eq!(json["severity_level"], "mild");
    }
}
