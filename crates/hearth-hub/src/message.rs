// SPDX-FileCopyrightText: 2026 Hearth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Change messages pushed to realtime subscribers.
//!
//! Wire format (UTF-8 JSON):
//! ```json
//! {"type":"grocery_created","entity":"grocery","action":"created","id":42,"extra":{"name":"milk"}}
//! ```
//! `id` is omitted when zero and `extra` when empty.

use serde::Serialize;
use serde_json::{Map, Value};

/// A hint that `entity` changed; clients re-fetch authoritative state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChangeMessage {
    #[serde(rename = "type")]
    message_type: String,
    entity: String,
    action: String,
    #[serde(skip_serializing_if = "is_zero")]
    id: i64,
    #[serde(skip_serializing_if = "Map::is_empty")]
    extra: Map<String, Value>,
}

fn is_zero(id: &i64) -> bool {
    *id == 0
}

impl ChangeMessage {
    pub fn new(entity: impl Into<String>, action: impl Into<String>, id: i64) -> Self {
        let entity = entity.into();
        let action = action.into();
        Self {
            message_type: format!("{entity}_{action}"),
            entity,
            action,
            id,
            extra: Map::new(),
        }
    }

    /// Attaches an extra field, replacing any previous value for `key`.
    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    /// `"{entity}_{action}"`.
    pub fn message_type(&self) -> &str {
        &self.message_type
    }

    pub fn entity(&self) -> &str {
        &self.entity
    }

    pub fn action(&self) -> &str {
        &self.action
    }

    pub fn id(&self) -> i64 {
        self.id
    }

    pub fn extra(&self) -> &Map<String, Value> {
        &self.extra
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_is_derived_from_entity_and_action() {
        let msg = ChangeMessage::new("chore", "completed", 7);
        assert_eq!(msg.message_type(), "chore_completed");
        assert_eq!(msg.entity(), "chore");
        assert_eq!(msg.action(), "completed");
    }

    #[test]
    fn full_wire_format() {
        let msg = ChangeMessage::new("grocery", "created", 42).with_extra("name", "milk");
        insta::assert_snapshot!(
            msg.to_json().unwrap(),
            @r#"{"type":"grocery_created","entity":"grocery","action":"created","id":42,"extra":{"name":"milk"}}"#
        );
    }

    #[test]
    fn zero_id_and_empty_extra_are_omitted() {
        let msg = ChangeMessage::new("calendar", "refreshed", 0);
        insta::assert_snapshot!(
            msg.to_json().unwrap(),
            @r#"{"type":"calendar_refreshed","entity":"calendar","action":"refreshed"}"#
        );
    }
}
