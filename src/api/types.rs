use crate::store::{Message, Settings};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct WireMessage {
    pub role: String,
    pub content: String,
}

/// Body of `POST /chat`.
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct ChatRequest {
    pub messages: Vec<WireMessage>,
    pub model: String,
    pub temperature: f64,
    pub max_tokens: u32,
    pub stream: bool,
}

impl ChatRequest {
    /// Only role and content travel; timestamps stay local.
    pub fn new(messages: &[Message], settings: &Settings) -> Self {
        Self {
            messages: messages
                .iter()
                .map(|m| WireMessage {
                    role: m.role.as_str().to_string(),
                    content: m.content.clone(),
                })
                .collect(),
            model: settings.model.clone(),
            temperature: settings.temperature,
            max_tokens: settings.max_tokens,
            stream: settings.stream,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ChatResponse {
    pub response: String,
    #[serde(default)]
    pub model: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ModelList {
    pub models: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct HealthStatus {
    pub status: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::ChatStore;
    use crate::store::Role;
    use serde_json::json;

    #[test]
    fn request_strips_local_fields_and_uses_wire_names() {
        let store = ChatStore::default();
        store.add_message(Role::User, "Hello");
        store.add_message(Role::Assistant, "Hi there");

        let body = serde_json::to_value(ChatRequest::new(&store.messages(), &store.settings()))
            .unwrap();

        assert_eq!(
            body,
            json!({
                "messages": [
                    {"role": "user", "content": "Hello"},
                    {"role": "assistant", "content": "Hi there"}
                ],
                "model": "deepseek-r1-distill-llama-70b",
                "temperature": 0.7,
                "max_tokens": 800,
                "stream": false
            })
        );
    }

    #[test]
    fn response_model_field_is_optional() {
        let parsed: ChatResponse = serde_json::from_str(r#"{"response":"ok"}"#).unwrap();
        assert_eq!(parsed.response, "ok");
        assert!(parsed.model.is_none());
    }
}
