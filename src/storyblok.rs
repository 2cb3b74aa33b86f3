use crate::schema::ComponentSchema;
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

/// Page size used for paginated list endpoints
const PER_PAGE: usize = 100;

/// Story entry from the story list endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct StorySummary {
    pub id: u64,
    #[serde(default)]
    pub name: String,
    pub full_slug: String,
    #[serde(default)]
    pub is_folder: bool,
    #[serde(default)]
    pub content_type: Option<String>,
}

/// A full story.
///
/// Attributes other than the ones named here are carried through untouched
/// so the story can be written back as it was fetched.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Story {
    pub id: u64,
    #[serde(default)]
    pub name: String,
    pub full_slug: String,
    #[serde(default)]
    pub content: Value,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Storage for stories and component schemas.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Language codes configured for the space (excluding the default language).
    async fn space_languages(&self, space_id: &str) -> Result<Vec<String>>;

    async fn list_stories(&self, space_id: &str) -> Result<Vec<StorySummary>>;

    async fn fetch_story(&self, space_id: &str, story_id: u64) -> Result<Story>;

    async fn fetch_components(&self, space_id: &str) -> Result<Vec<ComponentSchema>>;

    async fn update_story(&self, space_id: &str, story: &Story, publish: bool) -> Result<()>;
}

#[derive(Debug, Deserialize)]
struct SpaceResponse {
    space: Space,
}

#[derive(Debug, Deserialize)]
struct Space {
    #[serde(default)]
    languages: Vec<SpaceLanguage>,
}

#[derive(Debug, Deserialize)]
struct SpaceLanguage {
    code: String,
}

#[derive(Debug, Deserialize)]
struct StoryResponse {
    story: Story,
}

#[derive(Debug, Serialize)]
struct UpdateStoryRequest<'a> {
    story: &'a Story,
    #[serde(skip_serializing_if = "Option::is_none")]
    publish: Option<u8>,
}

/// Storyblok Management API client
pub struct StoryblokClient {
    client: reqwest::Client,
    base_url: String,
    oauth_token: String,
}

impl StoryblokClient {
    pub fn new(client: reqwest::Client, base_url: &str, oauth_token: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            oauth_token: oauth_token.to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    /// GET a path, returning the decoded body and the `total` header if present.
    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<(T, Option<usize>)> {
        let response = self
            .client
            .get(self.url(path))
            .header("Authorization", &self.oauth_token)
            .query(query)
            .send()
            .await
            .with_context(|| format!("Failed to send request to Storyblok API ({})", path))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Storyblok API error ({}): {}", status, body);
        }

        let total = response
            .headers()
            .get("total")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse().ok());

        let body = response
            .json()
            .await
            .with_context(|| format!("Failed to parse Storyblok response ({})", path))?;

        Ok((body, total))
    }

    /// Fetch every page of a list endpoint and collect the items under `key`.
    async fn get_all<T: DeserializeOwned>(&self, path: &str, key: &str) -> Result<Vec<T>> {
        let mut items: Vec<T> = Vec::new();
        let mut page = 1;

        loop {
            let query = [("page", page.to_string()), ("per_page", PER_PAGE.to_string())];
            let (mut body, total): (Value, Option<usize>) = self.get(path, &query).await?;

            let raw_items = body.get_mut(key).map(Value::take).unwrap_or_default();
            let page_items: Vec<T> = serde_json::from_value(raw_items)
                .with_context(|| format!("Failed to parse \"{}\" from Storyblok response", key))?;
            let page_len = page_items.len();
            items.extend(page_items);

            debug!("Fetched page {} of {} ({} items so far)", page, path, items.len());

            // Unpaginated endpoints send no `total` header and ignore `page`
            let Some(total) = total else {
                break;
            };
            if page_len < PER_PAGE || items.len() >= total {
                break;
            }
            page += 1;
        }

        Ok(items)
    }
}

#[async_trait]
impl ContentStore for StoryblokClient {
    async fn space_languages(&self, space_id: &str) -> Result<Vec<String>> {
        let (response, _): (SpaceResponse, _) =
            self.get(&format!("spaces/{}/", space_id), &[]).await?;
        Ok(response
            .space
            .languages
            .into_iter()
            .map(|language| language.code)
            .collect())
    }

    async fn list_stories(&self, space_id: &str) -> Result<Vec<StorySummary>> {
        self.get_all(&format!("spaces/{}/stories", space_id), "stories")
            .await
    }

    async fn fetch_story(&self, space_id: &str, story_id: u64) -> Result<Story> {
        let (response, _): (StoryResponse, _) = self
            .get(&format!("spaces/{}/stories/{}", space_id, story_id), &[])
            .await?;
        Ok(response.story)
    }

    async fn fetch_components(&self, space_id: &str) -> Result<Vec<ComponentSchema>> {
        self.get_all(&format!("spaces/{}/components", space_id), "components")
            .await
    }

    async fn update_story(&self, space_id: &str, story: &Story, publish: bool) -> Result<()> {
        let path = format!("spaces/{}/stories/{}", space_id, story.id);
        let request = UpdateStoryRequest {
            story,
            publish: publish.then_some(1),
        };

        let response = self
            .client
            .put(self.url(&path))
            .header("Authorization", &self.oauth_token)
            .json(&request)
            .send()
            .await
            .context("Failed to send story update to Storyblok API")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!(
                "Storyblok API error updating story {} ({}): {}",
                story.full_slug,
                status,
                body
            );
        }

        Ok(())
    }
}
