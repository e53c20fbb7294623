//! Recovers the upstream identity of a hub entry from its search keywords.

use serde::Serialize;

pub(crate) const MODEL_ID_TAG_PREFIX: &str = "@jumpstart-model-id";
pub(crate) const MODEL_VERSION_TAG_PREFIX: &str = "@jumpstart-model-version";
const TAG_SEPARATOR: char = ':';

/// The upstream model an entry was copied from, at the version recorded when
/// it was uploaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub(crate) struct UpstreamTag {
    pub model_id: String,
    pub version: String,
}

enum Found<'k> {
    Nothing,
    One(&'k str),
    Conflicting,
}

impl<'k> Found<'k> {
    fn push(&mut self, value: &'k str) {
        *self = match self {
            Found::Nothing => Found::One(value),
            _ => Found::Conflicting,
        }
    }

    fn single(&self) -> Option<&'k str> {
        match self {
            Found::One(value) if !value.is_empty() => Some(value),
            _ => None,
        }
    }
}

fn tag_value<'k>(keyword: &'k str, prefix: &str) -> Option<&'k str> {
    keyword
        .strip_prefix(prefix)?
        .strip_prefix(TAG_SEPARATOR)
        .map(str::trim)
}

impl UpstreamTag {
    /// Scans `keywords` for exactly one model id tag and exactly one model
    /// version tag, in any order. Anything else, including a lone id tag,
    /// a repeated tag or an empty value, yields `None`.
    pub(crate) fn parse<S: AsRef<str>>(keywords: &[S]) -> Option<UpstreamTag> {
        let mut model_id = Found::Nothing;
        let mut version = Found::Nothing;

        for keyword in keywords {
            let keyword = keyword.as_ref();

            if let Some(value) = tag_value(keyword, MODEL_ID_TAG_PREFIX) {
                model_id.push(value);
            } else if let Some(value) = tag_value(keyword, MODEL_VERSION_TAG_PREFIX) {
                version.push(value);
            }
        }

        Some(UpstreamTag {
            model_id: model_id.single()?.to_string(),
            version: version.single()?.to_string(),
        })
    }

    /// The keywords to attach to an entry copied from `model_id` at `version`.
    pub(crate) fn keywords(&self) -> [String; 2] {
        [
            format!("{}{}{}", MODEL_ID_TAG_PREFIX, TAG_SEPARATOR, self.model_id),
            format!("{}{}{}", MODEL_VERSION_TAG_PREFIX, TAG_SEPARATOR, self.version),
        ]
    }
}
