use std::future::Future;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::apireq::{self, Url};
use super::{
    Error, ErrorKind, HubClient, HubContentDescription, HubLister, HubSettings, SyncExecutor,
};
use crate::hub::{RawHubContent, SyncDecision, UpstreamTag};

const MODEL_CONTENT_TYPE: &str = "Model";

// Structures to deseralize GET /hubs/{hub}/contents

#[derive(Deserialize, Debug)]
struct ListHubContentsResponse {
    #[serde(rename = "HubContentSummaries", default)]
    summaries: Vec<RawHubContent>,
    #[serde(rename = "NextToken", default)]
    next_token: Option<String>,
}

// Structures to serialize POST /hubs/{hub}/imports

#[derive(Serialize, Debug)]
struct ImportRequest<'r> {
    #[serde(rename = "ModelId")]
    model_id: &'r str,
    #[serde(rename = "ModelVersion")]
    model_version: &'r str,
    #[serde(rename = "HubContentSearchKeywords")]
    keywords: [String; 2],
}

// Structures to serialize POST /hubs

#[derive(Serialize, Debug)]
struct S3StorageConfig {
    #[serde(rename = "S3OutputPath")]
    output_path: String,
}

#[derive(Serialize, Debug)]
struct Tag<'r> {
    #[serde(rename = "Key")]
    key: &'r str,
    #[serde(rename = "Value")]
    value: &'r str,
}

#[derive(Serialize, Debug)]
struct CreateHubRequest<'r> {
    #[serde(rename = "HubName")]
    hub_name: &'r str,
    #[serde(rename = "HubDescription")]
    description: &'r str,
    #[serde(rename = "HubDisplayName", skip_serializing_if = "Option::is_none")]
    display_name: Option<&'r str>,
    #[serde(rename = "HubSearchKeywords", skip_serializing_if = "<[_]>::is_empty")]
    search_keywords: &'r [String],
    #[serde(rename = "S3StorageConfig", skip_serializing_if = "Option::is_none")]
    storage: Option<S3StorageConfig>,
    #[serde(rename = "Tags", skip_serializing_if = "Vec::is_empty")]
    tags: Vec<Tag<'r>>,
}

impl<'r> CreateHubRequest<'r> {
    fn new(hub_name: &'r str, settings: &'r HubSettings) -> CreateHubRequest<'r> {
        CreateHubRequest {
            hub_name,
            description: &settings.description,
            display_name: settings.display_name.as_deref(),
            search_keywords: &settings.search_keywords,
            storage: settings.bucket_name.as_ref().map(|bucket| S3StorageConfig {
                output_path: format!("s3://{}", bucket),
            }),
            tags: settings
                .tags
                .iter()
                .map(|(key, value)| Tag { key, value })
                .collect(),
        }
    }
}

/// Follows `NextToken` until the hub stops returning one. A token that
/// repeats the previous one ends the listing with an error, since the
/// listing could otherwise never finish.
async fn collect_pages<F, Fut>(mut fetch_page: F) -> Result<Vec<RawHubContent>, Error>
where
    F: FnMut(Option<String>) -> Fut,
    Fut: Future<Output = Result<ListHubContentsResponse, Error>>,
{
    let mut contents = Vec::new();
    let mut next_token: Option<String> = None;

    loop {
        let page = fetch_page(next_token.clone()).await?;

        tracing::debug!(page_size = page.summaries.len(), "listed hub contents page");

        contents.extend(page.summaries);

        match page.next_token {
            Some(token) if token.is_empty() => break,
            Some(token) if next_token.as_deref() == Some(token.as_str()) => {
                return Err(Error::from_source(
                    ErrorKind::UnexpectedResponse,
                    format!("hub returned the page token \"{}\" twice in a row", token).into(),
                ));
            }
            Some(token) => next_token = Some(token),
            None => break,
        }
    }

    Ok(contents)
}

/// Client for the private hub's REST API.
pub(crate) struct HttpHub {
    api_base: Url,
    hub_name: String,
    client: Client,
}

impl HttpHub {
    pub(crate) fn with_api_base(api_base: &str, hub_name: &str) -> Result<HttpHub, Error> {
        Ok(HttpHub {
            api_base: Url::parse(api_base)?,
            hub_name: hub_name.to_string(),
            client: Client::new(),
        })
    }

    pub(crate) fn hub_name(&self) -> &str {
        &self.hub_name
    }

    fn url(&self, segments: &[&str]) -> Result<Url, Error> {
        let mut path = vec!["hubs", self.hub_name.as_str()];
        path.extend_from_slice(segments);

        apireq::endpoint(&self.api_base, &path)
    }

    fn model_url(&self, name: &str, version: &str) -> Result<Url, Error> {
        self.url(&["contents", MODEL_CONTENT_TYPE, name, version])
    }

    async fn list_page(&self, next_token: Option<String>) -> Result<ListHubContentsResponse, Error> {
        let mut url = self.url(&["contents"])?;

        {
            let mut query = url.query_pairs_mut();
            query.append_pair("HubContentType", MODEL_CONTENT_TYPE);

            if let Some(token) = &next_token {
                query.append_pair("NextToken", token);
            }
        }

        let res = self.client.get(url).send().await?;

        let res = apireq::check_status(res).await?;

        Ok(res.json().await?)
    }

    /// GETs `url` and expects a JSON object back.
    async fn get_document(&self, url: Url) -> Result<Value, Error> {
        let res = self.client.get(url).send().await?;

        let res = apireq::check_status(res).await?;

        match res.json::<Value>().await? {
            document @ Value::Object(_) => Ok(document),
            _ => Err(Error::from_kind(ErrorKind::UnexpectedResponse)),
        }
    }
}

#[async_trait]
impl HubLister for HttpHub {
    async fn list_models(&self) -> Result<Vec<RawHubContent>, Error> {
        tracing::debug!(hub = %self.hub_name, "listing hub contents");

        collect_pages(|token| self.list_page(token)).await
    }
}

#[async_trait]
impl HubClient for HttpHub {
    async fn create_hub(&self, settings: &HubSettings) -> Result<Value, Error> {
        let url = apireq::endpoint(&self.api_base, &["hubs"])?;

        let body = CreateHubRequest::new(&self.hub_name, settings);

        let res = self.client.post(url).json(&body).send().await?;

        let res = apireq::check_status(res).await?;

        Ok(res.json().await?)
    }

    async fn describe_hub(&self) -> Result<Value, Error> {
        self.get_document(self.url(&[])?).await
    }

    async fn delete_hub(&self) -> Result<(), Error> {
        let res = self.client.delete(self.url(&[])?).send().await?;

        apireq::check_status(res).await?;

        Ok(())
    }

    async fn describe_model(
        &self,
        name: &str,
        version: &str,
    ) -> Result<HubContentDescription, Error> {
        let document = self.get_document(self.model_url(name, version)?).await?;

        let field = |key: &str, fallback: &str| {
            document
                .get(key)
                .and_then(Value::as_str)
                .unwrap_or(fallback)
                .to_string()
        };

        Ok(HubContentDescription {
            name: field("HubContentName", name),
            version: field("HubContentVersion", version),
            document,
        })
    }

    async fn delete_model(&self, name: &str, version: &str) -> Result<(), Error> {
        let url = self.model_url(name, version)?;

        let res = self.client.delete(url).send().await?;

        apireq::check_status(res).await?;

        Ok(())
    }
}

#[async_trait]
impl SyncExecutor for HttpHub {
    async fn sync_model(&self, decision: &SyncDecision) -> Result<(), Error> {
        let url = self.url(&["imports"])?;

        let request = &decision.request;
        let tag = UpstreamTag {
            model_id: request.model_id.clone(),
            version: request.version.clone(),
        };

        let body = ImportRequest {
            model_id: &request.model_id,
            model_version: &request.version,
            keywords: tag.keywords(),
        };

        let res = self.client.post(url).json(&body).send().await?;

        apireq::check_status(res).await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_urls() {
        let hub = HttpHub::with_api_base("http://localhost:8080/v1", "my-hub").unwrap();

        assert_eq!(hub.hub_name(), "my-hub");
        assert_eq!(
            hub.model_url("model-two", "1.0.2").unwrap().as_str(),
            "http://localhost:8080/v1/hubs/my-hub/contents/Model/model-two/1.0.2"
        );
        assert_eq!(
            hub.url(&["imports"]).unwrap().as_str(),
            "http://localhost:8080/v1/hubs/my-hub/imports"
        );
        assert_eq!(
            hub.url(&[]).unwrap().as_str(),
            "http://localhost:8080/v1/hubs/my-hub"
        );
    }

    #[test]
    fn test_invalid_api_base() {
        let res = HttpHub::with_api_base("not a url", "my-hub");

        assert_eq!(res.err().map(|e| e.kind()), Some(ErrorKind::BadRequest));
    }

    #[test]
    fn test_list_response_deserialization() {
        let page: ListHubContentsResponse = serde_json::from_str(
            r#"{"HubContentSummaries": [{"HubContentName": "a"}], "NextToken": "abc"}"#,
        )
        .unwrap();

        assert_eq!(page.summaries.len(), 1);
        assert_eq!(page.next_token.as_deref(), Some("abc"));

        let page: ListHubContentsResponse = serde_json::from_str("{}").unwrap();
        assert!(page.summaries.is_empty());
        assert!(page.next_token.is_none());
    }

    fn page(names: &[&str], next_token: Option<&str>) -> ListHubContentsResponse {
        serde_json::from_value(json!({
            "HubContentSummaries": names
                .iter()
                .map(|name| json!({"HubContentName": name}))
                .collect::<Vec<_>>(),
            "NextToken": next_token,
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn test_pages_are_followed_until_the_last() {
        let mut requested = Vec::new();

        let contents = collect_pages(|token| {
            requested.push(token.clone());

            let res = match token.as_deref() {
                None => page(&["a", "b"], Some("t1")),
                Some("t1") => page(&["c"], Some("")),
                Some(other) => panic!("unexpected token {}", other),
            };

            async move { Ok(res) }
        })
        .await
        .unwrap();

        assert_eq!(contents.len(), 3);
        assert_eq!(requested, vec![None, Some("t1".to_string())]);
    }

    #[tokio::test]
    async fn test_repeated_page_token_stops_the_listing() {
        let mut calls = 0;

        let res = collect_pages(|_| {
            calls += 1;
            assert!(calls <= 2, "listing did not stop on a repeated token");

            async { Ok(page(&["a"], Some("same"))) }
        })
        .await;

        assert_eq!(res.err().map(|e| e.kind()), Some(ErrorKind::UnexpectedResponse));
        assert_eq!(calls, 2);
    }

    #[test]
    fn test_import_request_serialization() {
        let tag = UpstreamTag {
            model_id: "m1".to_string(),
            version: "1.2.3".to_string(),
        };

        let body = serde_json::to_value(ImportRequest {
            model_id: "m1",
            model_version: "1.2.3",
            keywords: tag.keywords(),
        })
        .unwrap();

        assert_eq!(
            body,
            json!({
                "ModelId": "m1",
                "ModelVersion": "1.2.3",
                "HubContentSearchKeywords": [
                    "@jumpstart-model-id:m1",
                    "@jumpstart-model-version:1.2.3"
                ]
            })
        );
    }

    #[test]
    fn test_create_hub_request_serialization() {
        let settings = HubSettings {
            description: "models approved for production".to_string(),
            display_name: Some("Production".to_string()),
            search_keywords: vec!["prod".to_string()],
            bucket_name: Some("my-hub-bucket".to_string()),
            tags: vec![("team".to_string(), "ml".to_string())],
        };

        let body = serde_json::to_value(CreateHubRequest::new("my-hub", &settings)).unwrap();

        assert_eq!(
            body,
            json!({
                "HubName": "my-hub",
                "HubDescription": "models approved for production",
                "HubDisplayName": "Production",
                "HubSearchKeywords": ["prod"],
                "S3StorageConfig": {"S3OutputPath": "s3://my-hub-bucket"},
                "Tags": [{"Key": "team", "Value": "ml"}]
            })
        );
    }

    #[test]
    fn test_create_hub_request_leaves_out_unset_settings() {
        let settings = HubSettings {
            description: "d".to_string(),
            ..HubSettings::default()
        };

        let body = serde_json::to_value(CreateHubRequest::new("my-hub", &settings)).unwrap();

        assert_eq!(body, json!({"HubName": "my-hub", "HubDescription": "d"}));
    }
}
