//! Player data models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Player ID type
pub type PlayerId = i64;

/// Player model.
///
/// The secret is a server-generated token the player presents during the
/// connection handshake. It deters accidental impersonation; it is not a
/// security control.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub secret: String,
    pub notes: String,
    pub hidden_notes: String,
    pub stats: Vec<PlayerStat>,
    pub created_at: DateTime<Utc>,
}

/// One named stat attached to a player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerStat {
    pub id: i64,
    pub name: String,
    pub value: StatValue,
}

/// A stat value with an explicit type tag.
///
/// The tag is persisted alongside the value, so a stat round-trips through
/// storage without guessing at the shape of its text representation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum StatValue {
    Text(String),
    Number(f64),
    Flag(bool),
    List(Vec<String>),
}

impl StatValue {
    /// The persisted type tag for this value.
    pub fn type_tag(&self) -> &'static str {
        match self {
            StatValue::Text(_) => "text",
            StatValue::Number(_) => "number",
            StatValue::Flag(_) => "flag",
            StatValue::List(_) => "list",
        }
    }

    /// Encode the value for storage next to its type tag.
    pub fn encode(&self) -> String {
        match self {
            StatValue::Text(s) => s.clone(),
            StatValue::Number(n) => n.to_string(),
            StatValue::Flag(b) => b.to_string(),
            // Lists are stored as JSON arrays; the other shapes stay plain.
            StatValue::List(items) => serde_json::to_string(items).unwrap_or_default(),
        }
    }

    /// Decode a stored value from its type tag and text representation.
    ///
    /// Unknown tags and unparseable payloads fall back to `Text` so a
    /// directory read never fails on a single malformed stat row.
    pub fn decode(type_tag: &str, raw: &str) -> Self {
        match type_tag {
            "number" => raw
                .parse()
                .map(StatValue::Number)
                .unwrap_or_else(|_| StatValue::Text(raw.to_string())),
            "flag" => StatValue::Flag(raw == "true"),
            "list" => serde_json::from_str(raw)
                .map(StatValue::List)
                .unwrap_or_else(|_| StatValue::Text(raw.to_string())),
            _ => StatValue::Text(raw.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stat_value_round_trips_through_tag_and_text() {
        let values = [
            StatValue::Text("elven".to_string()),
            StatValue::Number(17.5),
            StatValue::Flag(true),
            StatValue::List(vec!["sword".to_string(), "rope".to_string()]),
        ];

        for value in values {
            let decoded = StatValue::decode(value.type_tag(), &value.encode());
            assert_eq!(decoded, value);
        }
    }

    #[test]
    fn test_stat_value_unknown_tag_falls_back_to_text() {
        let decoded = StatValue::decode("mystery", "whatever");
        assert_eq!(decoded, StatValue::Text("whatever".to_string()));
    }

    #[test]
    fn test_stat_value_malformed_number_falls_back_to_text() {
        let decoded = StatValue::decode("number", "not-a-number");
        assert_eq!(decoded, StatValue::Text("not-a-number".to_string()));
    }

    #[test]
    fn test_stat_value_serializes_with_type_tag() {
        let value = serde_json::to_value(StatValue::Number(3.0)).expect("serializes");
        assert_eq!(value["type"], "number");
        assert_eq!(value["value"], 3.0);
    }
}
