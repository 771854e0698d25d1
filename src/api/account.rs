//! Account and Model Metadata
//!
//! Payloads returned by `api-key`, `models` and `language-models`.

use serde::{Deserialize, Serialize};

/// Metadata for the API key used to authenticate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiKeyInfo {
    pub redacted_api_key: String,
    pub user_id: String,
    pub name: String,
    pub create_time: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modify_time: Option<String>,
    pub modified_by: String,
    pub team_id: String,
    pub acls: Vec<String>,
    pub api_key_id: String,
    pub team_blocked: bool,
    pub api_key_blocked: bool,
    pub api_key_disabled: bool,
}

impl ApiKeyInfo {
    /// Whether the key can currently be used
    pub fn is_usable(&self) -> bool {
        !(self.team_blocked || self.api_key_blocked || self.api_key_disabled)
    }
}

/// A model available to the key
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Model {
    pub id: String,
    pub created: u64,
    pub object: String,
    pub owned_by: String,
}

/// Response of `models`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelList {
    pub data: Vec<Model>,
    pub object: String,
}

impl ModelList {
    /// Model ids in server order
    pub fn ids(&self) -> Vec<&str> {
        self.data.iter().map(|m| m.id.as_str()).collect()
    }
}

/// A language model with its pricing and modalities
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LanguageModel {
    pub id: String,
    pub created: u64,
    pub object: String,
    pub owned_by: String,
    pub input_modalities: Vec<String>,
    pub output_modalities: Vec<String>,
    pub prompt_text_token_price: u64,
    pub prompt_image_token_price: u64,
    pub completion_text_token_price: u64,
}

/// Response of `language-models`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LanguageModelList {
    pub models: Vec<LanguageModel>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_key_info_deserialization() {
        let json = r#"{
            "redacted_api_key": "xai-...Ju6M",
            "user_id": "u-1",
            "name": "dev key",
            "create_time": "2024-12-15T10:00:00Z",
            "modified_by": "u-1",
            "team_id": "t-1",
            "acls": ["api-key:model:*", "api-key:endpoint:*"],
            "api_key_id": "k-1",
            "team_blocked": false,
            "api_key_blocked": false,
            "api_key_disabled": false
        }"#;

        let info: ApiKeyInfo = serde_json::from_str(json).unwrap();
        assert_eq!(info.modify_time, None);
        assert_eq!(info.acls.len(), 2);
        assert!(info.is_usable());

        let back: ApiKeyInfo = serde_json::from_value(serde_json::to_value(&info).unwrap()).unwrap();
        assert_eq!(back, info);
    }

    #[test]
    fn test_blocked_key_is_not_usable() {
        let json = r#"{
            "redacted_api_key": "xai-...",
            "user_id": "u-1",
            "name": "old",
            "create_time": "2024-01-01T00:00:00Z",
            "modify_time": "2024-06-01T00:00:00Z",
            "modified_by": "admin",
            "team_id": "t-1",
            "acls": [],
            "api_key_id": "k-2",
            "team_blocked": false,
            "api_key_blocked": true,
            "api_key_disabled": false
        }"#;

        let info: ApiKeyInfo = serde_json::from_str(json).unwrap();
        assert_eq!(info.modify_time.as_deref(), Some("2024-06-01T00:00:00Z"));
        assert!(!info.is_usable());
    }

    #[test]
    fn test_model_list_deserialization() {
        let json = r#"{
            "data": [
                {"id": "grok-beta", "created": 1727136000, "object": "model", "owned_by": "xai"},
                {"id": "grok-2-1212", "created": 1733961600, "object": "model", "owned_by": "xai"}
            ],
            "object": "list"
        }"#;

        let list: ModelList = serde_json::from_str(json).unwrap();
        assert_eq!(list.ids(), vec!["grok-beta", "grok-2-1212"]);
        assert_eq!(list.data[0].owned_by, "xai");
    }

    #[test]
    fn test_language_model_list_deserialization() {
        let json = r#"{"models": [{
            "id": "grok-2-1212",
            "created": 1733961600,
            "object": "model",
            "owned_by": "xai",
            "input_modalities": ["text"],
            "output_modalities": ["text"],
            "prompt_text_token_price": 20000,
            "prompt_image_token_price": 0,
            "completion_text_token_price": 100000
        }]}"#;

        let list: LanguageModelList = serde_json::from_str(json).unwrap();
        assert_eq!(list.models[0].prompt_text_token_price, 20000);
        assert_eq!(list.models[0].input_modalities, vec!["text"]);
    }
}
