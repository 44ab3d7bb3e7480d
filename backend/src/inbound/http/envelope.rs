//! Success envelopes shared by every endpoint.
//!
//! All responses carry a top-level `ok` flag; payload-bearing endpoints nest
//! their payload under `data`, acknowledgment endpoints carry a `message`.

use serde::Serialize;

/// `{ok: true, data: …}` success envelope.
#[derive(Debug, Clone, Serialize)]
pub struct DataEnvelope<T> {
    pub ok: bool,
    pub data: T,
}

impl<T> DataEnvelope<T> {
    pub fn new(data: T) -> Self {
        Self { ok: true, data }
    }
}

/// `{ok: true, message: …}` acknowledgment envelope.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct MessageEnvelope {
    pub ok: bool,
    #[schema(example = "Game added")]
    pub message: &'static str,
}

impl MessageEnvelope {
    pub const fn new(message: &'static str) -> Self {
        Self { ok: true, message }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn data_envelope_serializes_with_ok_flag() {
        let body = serde_json::to_value(DataEnvelope::new(json!({"games": []})))
            .expect("serializes");
        assert_eq!(body, json!({"ok": true, "data": {"games": []}}));
    }

    #[test]
    fn message_envelope_serializes_with_ok_flag() {
        let body =
            serde_json::to_value(MessageEnvelope::new("Game updated")).expect("serializes");
        assert_eq!(body, json!({"ok": true, "message": "Game updated"}));
    }
}
