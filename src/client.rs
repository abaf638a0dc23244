use anyhow::{Context as _, anyhow};
use reqwest::Method;
use serde::de::DeserializeOwned;
use url::Url;

use crate::error::FeedError;
use crate::post::{LikeResponse, NewPost, Post, PostId};

/// HTTP access to the feed service. Cheap to clone.
#[derive(Clone)]
pub struct FeedClient {
    client: reqwest::Client,
    base_url: Url,
}

impl FeedClient {
    pub fn new(base_url: Url, user_agent: &str) -> anyhow::Result<Self> {
        if base_url.cannot_be_a_base() {
            return Err(anyhow!("base url {} cannot carry a path", base_url));
        }
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()
            .context("build reqwest client")?;
        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub async fn list_posts(&self) -> Result<Vec<Post>, FeedError> {
        let url = self.endpoint(&["posts"]);
        let posts: Vec<Post> = self.send(self.client.get(url.clone()), Method::GET, &url).await?;
        tracing::debug!(count = posts.len(), "listed posts");
        Ok(posts)
    }

    /// Fails with [`FeedError::Validation`] without touching the network if any
    /// field of `draft` is blank.
    pub async fn create_post(&self, draft: &NewPost) -> Result<Post, FeedError> {
        draft.validate()?;
        let url = self.endpoint(&["posts"]);
        let body = draft.trimmed();
        let post: Post = self
            .send(self.client.post(url.clone()).json(&body), Method::POST, &url)
            .await?;
        tracing::debug!(post_id = post.id, "created post");
        Ok(post)
    }

    /// Adds a like when `desired` is true, removes it otherwise. Returns the
    /// count the server reports afterwards.
    pub async fn set_like(&self, post_id: PostId, desired: bool) -> Result<u64, FeedError> {
        let id = post_id.to_string();
        let url = self.endpoint(&["posts", &id, "like"]);
        let method = if desired { Method::POST } else { Method::DELETE };
        let resp: LikeResponse = self
            .send(self.client.request(method.clone(), url.clone()), method, &url)
            .await?;
        tracing::debug!(post_id, desired, likes = resp.likes, "like updated");
        Ok(resp.likes)
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        // Checked in `new`.
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn send<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
        method: Method,
        url: &Url,
    ) -> Result<T, FeedError> {
        let label = format!("{} {}", method, url);
        tracing::debug!(request = %label, "sending");

        let resp = request.send().await.map_err(|source| FeedError::Transport {
            request: label.clone(),
            source,
        })?;

        let status = resp.status();
        if !status.is_success() {
            return Err(FeedError::Status {
                request: label,
                status,
            });
        }

        resp.json::<T>()
            .await
            .map_err(|source| FeedError::Transport {
                request: label,
                source,
            })
    }
}
