//! Index of the upstream-sourced entries of a hub, keyed by upstream model id.
//!
//! A hub may hold several versions of the same upstream model. The index keeps
//! one entry per id: the one with the highest native (hub-recorded) version.
//! A parseable version beats a missing or unparseable one, and exact ties keep
//! whichever entry was listed first, so building twice from the same listing
//! always yields the same index.

use std::cmp::Ordering;
use std::collections::HashMap;

use super::content::{HubContent, RawHubContent};
use crate::version::Version;

struct IndexedContent {
    content: HubContent,
    native_version: Option<Version>,
}

impl IndexedContent {
    fn new(content: HubContent) -> IndexedContent {
        let native_version = content.native_version().and_then(|v| v.parse().ok());

        IndexedContent {
            content,
            native_version,
        }
    }

    fn supersedes(&self, other: &IndexedContent) -> bool {
        match (&self.native_version, &other.native_version) {
            (Some(ours), Some(theirs)) => ours.cmp(theirs) == Ordering::Greater,
            (Some(_), None) => true,
            (None, _) => false,
        }
    }
}

#[derive(Default)]
pub(crate) struct RegistryIndex {
    entries: HashMap<String, IndexedContent>,
}

impl RegistryIndex {
    pub(crate) fn new() -> RegistryIndex {
        RegistryIndex {
            entries: HashMap::new(),
        }
    }

    /// Builds the index from a raw hub listing. Records that cannot be read
    /// or that carry no complete upstream tag are left out.
    pub(crate) fn build(raw_listing: &[RawHubContent]) -> RegistryIndex {
        let contents = raw_listing.iter().filter_map(HubContent::parse);

        Self::from_contents(contents)
    }

    pub(crate) fn from_contents<I: IntoIterator<Item = HubContent>>(contents: I) -> RegistryIndex {
        let mut index = RegistryIndex::new();

        for content in contents {
            index.insert(content);
        }

        index
    }

    fn insert(&mut self, content: HubContent) {
        let tag = match content.upstream_tag() {
            Some(tag) => tag,
            None => {
                tracing::debug!(name = %content.name, "hub entry has no upstream tag, not indexed");
                return;
            }
        };

        let candidate = IndexedContent::new(content);

        if let Some(current) = self.entries.get_mut(&tag.model_id) {
            if !candidate.supersedes(current) {
                tracing::debug!(
                    model_id = %tag.model_id,
                    kept = %current.content.name,
                    dropped = %candidate.content.name,
                    "duplicate hub entry for upstream model"
                );
                return;
            }

            *current = candidate;
        } else {
            self.entries.insert(tag.model_id, candidate);
        }
    }

    pub(crate) fn get(&self, model_id: &str) -> Option<&HubContent> {
        self.entries.get(model_id).map(|e| &e.content)
    }

    /// The parsed native version of the entry indexed under `model_id`.
    /// `None` if the id is absent or its entry has no usable version.
    pub(crate) fn version_of(&self, model_id: &str) -> Option<&Version> {
        self.entries
            .get(model_id)
            .and_then(|e| e.native_version.as_ref())
    }

    pub(crate) fn contains(&self, model_id: &str) -> bool {
        self.entries.contains_key(model_id)
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Indexed entries sorted by upstream model id.
    pub(crate) fn iter(&self) -> impl Iterator<Item = (&str, &HubContent)> {
        let mut entries: Vec<(&str, &HubContent)> = self
            .entries
            .iter()
            .map(|(id, e)| (id.as_str(), &e.content))
            .collect();

        entries.sort_by(|a, b| a.0.cmp(b.0));

        entries.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn content(name: &str, version: Option<&str>, keywords: &[&str]) -> HubContent {
        HubContent {
            name: name.to_string(),
            version: version.map(str::to_string),
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
            arn: None,
            content_type: Some(serde_json::json!("Model")),
            creation_time: None,
            status: None,
            schema_version: None,
        }
    }

    fn tagged(name: &str, native: Option<&str>, model_id: &str, tag_version: &str) -> HubContent {
        let id_tag = format!("@jumpstart-model-id:{}", model_id);
        let version_tag = format!("@jumpstart-model-version:{}", tag_version);

        content(name, native, &[id_tag.as_str(), version_tag.as_str()])
    }

    #[test]
    fn test_untagged_entries_are_not_indexed() {
        let index = RegistryIndex::from_contents([
            tagged("mock-model-two-pytorch", Some("1.0.3"), "model-two-pytorch", "1.0.3"),
            content("mock-model-three-nonsense", Some("1.0.2"), &["tag-one", "tag-two"]),
            content("partial", Some("1.0.0"), &["@jumpstart-model-id:partial"]),
            tagged("mock-model-four-huggingface", Some("2.0.2"), "model-four-huggingface", "2.0.2"),
        ]);

        assert_eq!(index.len(), 2);
        assert!(index.contains("model-two-pytorch"));
        assert!(index.contains("model-four-huggingface"));
        assert!(!index.contains("mock-model-three-nonsense"));
        assert!(!index.contains("partial"));
    }

    #[test]
    fn test_keyed_by_upstream_id_not_hub_name() {
        let index = RegistryIndex::from_contents([tagged(
            "my-renamed-copy",
            Some("1.0.0"),
            "upstream-id",
            "1.0.0",
        )]);

        assert_eq!(index.get("upstream-id").unwrap().name, "my-renamed-copy");
        assert!(index.get("my-renamed-copy").is_none());
    }

    #[test]
    fn test_native_version_is_authoritative() {
        let index =
            RegistryIndex::from_contents([tagged("m", Some("1.0.1"), "model-two", "1.0.2")]);

        assert_eq!(index.version_of("model-two").unwrap().to_string(), "1.0.1");
    }

    #[test]
    fn test_duplicates_keep_highest_native_version() {
        let index = RegistryIndex::from_contents([
            tagged("a-v1", Some("1.0.0"), "a", "1.0.0"),
            tagged("a-v3", Some("1.10.0"), "a", "1.10.0"),
            tagged("a-v2", Some("1.9.0"), "a", "1.9.0"),
        ]);

        assert_eq!(index.len(), 1);
        assert_eq!(index.get("a").unwrap().name, "a-v3");
    }

    #[test]
    fn test_duplicates_prefer_usable_versions_then_first_listed() {
        let index = RegistryIndex::from_contents([
            tagged("no-version", None, "a", "1.0.0"),
            tagged("garbage", Some("latest"), "a", "1.0.0"),
            tagged("first", Some("1.0"), "a", "1.0.0"),
            tagged("second", Some("1.0.0"), "a", "1.0.0"),
        ]);

        assert_eq!(index.get("a").unwrap().name, "first");

        let index = RegistryIndex::from_contents([
            tagged("no-version", None, "b", "1.0.0"),
            tagged("garbage", Some("latest"), "b", "1.0.0"),
        ]);

        assert_eq!(index.get("b").unwrap().name, "no-version");
        assert!(index.version_of("b").is_none());
    }

    #[test]
    fn test_build_from_raw_listing() {
        let listing: Vec<RawHubContent> = serde_json::from_str(
            r#"[
                {"HubContentName": "x", "HubContentVersion": "2.0.2",
                 "HubContentSearchKeywords": ["@jumpstart-model-id:x", "@jumpstart-model-version:2.0.2"]},
                {"HubContentVersion": "1.0.0"},
                {"HubContentName": "y", "HubContentSearchKeywords": []}
            ]"#,
        )
        .unwrap();

        let index = RegistryIndex::build(&listing);

        assert_eq!(index.len(), 1);
        assert_eq!(index.iter().map(|(id, _)| id).collect::<Vec<_>>(), vec!["x"]);
        assert!(RegistryIndex::build(&[]).is_empty());
    }

    #[test]
    fn test_unexpected_metadata_types_still_index() {
        let listing: Vec<RawHubContent> = serde_json::from_str(
            r#"[
                {"HubContentName": "x", "HubContentVersion": "2.0.2", "HubContentStatus": 3,
                 "HubContentSearchKeywords": ["@jumpstart-model-id:x", "@jumpstart-model-version:2.0.2"]}
            ]"#,
        )
        .unwrap();

        let index = RegistryIndex::build(&listing);

        assert!(index.contains("x"));
        assert_eq!(index.version_of("x").unwrap().to_string(), "2.0.2");
    }
}
