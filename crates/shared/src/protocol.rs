//! Wire types for the key-value store HTTP API and the value shapes stored
//! under the DemoBoard key namespace.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::ReactionKind;

/// One stored record as returned by a prefix scan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KvRecord {
    pub key: String,
    pub value: Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetResponse {
    pub value: Option<Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetRequest {
    pub key: String,
    pub value: Value,
}

/// Value stored under a demo record key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DemoRecord {
    pub headline: String,
}

/// Value stored under a reaction event key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReactionRecord {
    #[serde(rename = "type")]
    pub kind: ReactionKind,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reaction_record_uses_type_field_on_the_wire() {
        let encoded = serde_json::to_string(&ReactionRecord {
            kind: ReactionKind::Meh,
        })
        .expect("encode");
        assert_eq!(encoded, r#"{"type":"meh"}"#);

        let decoded: ReactionRecord =
            serde_json::from_str(r#"{"type":"frown"}"#).expect("decode");
        assert_eq!(decoded.kind, ReactionKind::Frown);
    }
}
