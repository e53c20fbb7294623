//! Turns "latest" requests into concrete versions.
//!
//! A request that already names a version is returned as is. A request for
//! the latest version (no version, or `*`) is looked up in the upstream
//! catalog. Nothing is cached: resolving the same model twice asks the catalog
//! twice, so a pass always sees what the catalog publishes right now.

use futures_util::future::join_all;
use thiserror::Error;
use tracing::debug;

use crate::backends::{self, ErrorKind, SpecSource};
use crate::request::ModelRequest;

#[derive(Error, Debug)]
pub(crate) enum Error {
    /// The catalog has no record of the model
    #[error("model \"{0}\" was not found in the upstream catalog")]
    SpecNotFound(String),
    /// The catalog could not be queried
    #[error("failed to look up the latest version of \"{0}\": {1}")]
    SpecSource(String, #[source] backends::Error),
}

pub(crate) struct VersionResolver<'s> {
    specs: &'s dyn SpecSource,
}

impl<'s> VersionResolver<'s> {
    pub(crate) fn new(specs: &'s dyn SpecSource) -> VersionResolver<'s> {
        VersionResolver { specs }
    }

    pub(crate) async fn resolve(&self, request: &ModelRequest) -> Result<ModelRequest, Error> {
        if !request.is_latest() {
            return Ok(request.clone());
        }

        let model_id = &request.model_id;

        match self.specs.get_latest_version(model_id).await {
            Ok(version) => {
                debug!(model_id = %model_id, %version, "resolved latest version");

                Ok(request.with_version(version))
            }
            Err(err) if err.kind() == ErrorKind::NotFound => {
                Err(Error::SpecNotFound(model_id.clone()))
            }
            Err(err) => Err(Error::SpecSource(model_id.clone(), err)),
        }
    }

    /// Resolves every request concurrently. The result has one entry per
    /// request, in the same order; a failed lookup only affects its own entry.
    pub(crate) async fn resolve_all(
        &self,
        requests: &[ModelRequest],
    ) -> Vec<Result<ModelRequest, Error>> {
        join_all(requests.iter().map(|request| self.resolve(request))).await
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// An in-memory catalog that counts lookups per model id.
    pub(crate) struct FakeCatalog {
        latest: HashMap<String, String>,
        unreachable: Vec<String>,
        pub lookups: Mutex<HashMap<String, usize>>,
    }

    impl FakeCatalog {
        pub(crate) fn new(latest: &[(&str, &str)]) -> FakeCatalog {
            FakeCatalog {
                latest: latest
                    .iter()
                    .map(|(id, v)| (id.to_string(), v.to_string()))
                    .collect(),
                unreachable: Vec::new(),
                lookups: Mutex::new(HashMap::new()),
            }
        }

        pub(crate) fn unreachable_for(mut self, model_id: &str) -> FakeCatalog {
            self.unreachable.push(model_id.to_string());
            self
        }

        pub(crate) fn lookups_of(&self, model_id: &str) -> usize {
            self.lookups
                .lock()
                .unwrap()
                .get(model_id)
                .copied()
                .unwrap_or(0)
        }
    }

    #[async_trait]
    impl SpecSource for FakeCatalog {
        async fn get_latest_version(&self, model_id: &str) -> Result<String, backends::Error> {
            *self
                .lookups
                .lock()
                .unwrap()
                .entry(model_id.to_string())
                .or_insert(0) += 1;

            if self.unreachable.iter().any(|id| id == model_id) {
                return Err(backends::Error::from_kind(ErrorKind::Connection));
            }

            self.latest
                .get(model_id)
                .cloned()
                .ok_or_else(|| backends::Error::from_kind(ErrorKind::NotFound))
        }
    }

    #[tokio::test]
    async fn test_wildcard_and_absent_versions_resolve_to_latest() {
        let catalog = FakeCatalog::new(&[("mock-pytorch-model-one", "1.0.0")]);
        let resolver = VersionResolver::new(&catalog);

        let wildcard = ModelRequest::new("mock-pytorch-model-one", "*");
        let absent = ModelRequest::new("mock-pytorch-model-one", "");

        for request in [wildcard, absent] {
            let resolved = resolver.resolve(&request).await.unwrap();
            assert_eq!(resolved, ModelRequest::new("mock-pytorch-model-one", "1.0.0"));
        }
    }

    #[tokio::test]
    async fn test_concrete_version_is_not_looked_up() {
        let catalog = FakeCatalog::new(&[("mock-pytorch-model-one", "1.0.0")]);
        let resolver = VersionResolver::new(&catalog);

        let request = ModelRequest::new("mock-pytorch-model-one", "2.0.0");
        let resolved = resolver.resolve(&request).await.unwrap();

        assert_eq!(resolved, request);
        assert_eq!(catalog.lookups_of("mock-pytorch-model-one"), 0);
    }

    #[tokio::test]
    async fn test_unknown_model_is_spec_not_found() {
        let catalog = FakeCatalog::new(&[]);
        let resolver = VersionResolver::new(&catalog);

        let res = resolver.resolve(&ModelRequest::latest("ghost")).await;

        assert!(matches!(res, Err(Error::SpecNotFound(id)) if id == "ghost"));
    }

    #[tokio::test]
    async fn test_failures_are_scoped_to_their_request() {
        let catalog = FakeCatalog::new(&[("a", "1.1.0"), ("c", "3.0.0")]).unreachable_for("d");
        let resolver = VersionResolver::new(&catalog);

        let results = resolver
            .resolve_all(&[
                ModelRequest::latest("a"),
                ModelRequest::latest("b"),
                ModelRequest::latest("c"),
                ModelRequest::latest("d"),
                ModelRequest::new("e", "0.0.1"),
            ])
            .await;

        assert_eq!(results.len(), 5);
        assert_eq!(results[0].as_ref().unwrap(), &ModelRequest::new("a", "1.1.0"));
        assert!(matches!(results[1], Err(Error::SpecNotFound(_))));
        assert_eq!(results[2].as_ref().unwrap(), &ModelRequest::new("c", "3.0.0"));
        assert!(matches!(results[3], Err(Error::SpecSource(_, _))));
        assert_eq!(results[4].as_ref().unwrap(), &ModelRequest::new("e", "0.0.1"));
    }

    #[tokio::test]
    async fn test_no_caching_between_calls() {
        let catalog = FakeCatalog::new(&[("a", "1.0.0")]);
        let resolver = VersionResolver::new(&catalog);

        resolver
            .resolve_all(&[ModelRequest::latest("a"), ModelRequest::latest("a")])
            .await;
        resolver.resolve(&ModelRequest::latest("a")).await.unwrap();

        assert_eq!(catalog.lookups_of("a"), 3);
    }
}
