//! Typed projection of a raw hub listing record.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use super::tags::UpstreamTag;

/// A hub listing record as returned by the hub, before any interpretation.
pub(crate) type RawHubContent = Map<String, Value>;

/// A version of any other JSON type is unusable, which is not the same as
/// an unreadable record.
fn string_or_none<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(Some(s)),
        _ => Ok(None),
    }
}

/// One entry of a hub listing. Only `name`, `version` and `keywords` take part
/// in reconciliation, the rest is carried along for display as the hub sent it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct HubContent {
    #[serde(rename = "HubContentName")]
    pub name: String,
    #[serde(rename = "HubContentVersion", default, deserialize_with = "string_or_none")]
    pub version: Option<String>,
    #[serde(rename = "HubContentSearchKeywords", default)]
    pub keywords: Vec<String>,
    #[serde(rename = "HubContentArn", default)]
    pub arn: Option<Value>,
    #[serde(rename = "HubContentType", default)]
    pub content_type: Option<Value>,
    #[serde(rename = "CreationTime", default)]
    pub creation_time: Option<Value>,
    #[serde(rename = "HubContentStatus", default)]
    pub status: Option<Value>,
    #[serde(rename = "DocumentSchemaVersion", default)]
    pub schema_version: Option<Value>,
}

/// Renders a pass-through field; strings are shown without quotes.
pub(crate) fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

impl HubContent {
    /// Returns `None` for records that are missing a name or whose fields
    /// have the wrong shape.
    pub(crate) fn parse(raw: &RawHubContent) -> Option<HubContent> {
        match serde_json::from_value::<HubContent>(Value::Object(raw.clone())) {
            Ok(content) => Some(content),
            Err(err) => {
                tracing::debug!(error = %err, "skipping unreadable hub content record");
                None
            }
        }
    }

    pub(crate) fn upstream_tag(&self) -> Option<UpstreamTag> {
        UpstreamTag::parse(&self.keywords)
    }

    /// The version the hub itself records for this entry, if it has a usable one.
    pub(crate) fn native_version(&self) -> Option<&str> {
        self.version
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty())
    }
}
