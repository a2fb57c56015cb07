use crate::error::ResolveError;
use crate::types::SearchResult;
use log::{debug, info};
use reqwest::StatusCode;
use url::Url;

const MAX_REDIRECTS: usize = 10;

/// The client shared by the resolver and every download task.
///
/// Redirects stop after `MAX_REDIRECTS` hops and hand back the last 3xx
/// response, so an endless redirect surfaces as a status rather than a
/// transport error.
pub fn build_client() -> reqwest::Result<reqwest::Client> {
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::custom(|attempt| {
            if attempt.previous().len() >= MAX_REDIRECTS {
                attempt.stop()
            } else {
                attempt.follow()
            }
        }))
        .build()
}

/// The query to send, if any. An empty query is the same as none.
pub fn effective_query(query: Option<&str>) -> Option<&str> {
    query.filter(|q| !q.is_empty())
}

/// Turns a search query into the ordered list of wallpaper URLs.
pub struct Resolver {
    client: reqwest::Client,
    endpoint: Url,
}

impl Resolver {
    pub fn new(client: reqwest::Client, endpoint: &str) -> Result<Self, ResolveError> {
        let endpoint = Url::parse(endpoint).map_err(|source| ResolveError::Endpoint {
            endpoint: endpoint.to_string(),
            source,
        })?;
        Ok(Self { client, endpoint })
    }

    /// Fetches the first page of results.
    pub async fn resolve(&self, query: Option<&str>) -> Result<Vec<String>, ResolveError> {
        let url = self.search_url(query);
        info!("Fetching first page of urls {}", url);

        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(ResolveError::Transport)?;

        if resp.status() != StatusCode::OK {
            return Err(ResolveError::Status(resp.status().as_u16()));
        }

        let body = resp.bytes().await.map_err(ResolveError::Body)?;
        let result: SearchResult = serde_json::from_slice(&body)?;

        let links: Vec<String> = result.data.into_iter().map(|entry| entry.path).collect();
        info!("Resolved {} wallpaper links", links.len());
        for link in &links {
            debug!("Link: {}", link);
        }
        Ok(links)
    }

    fn search_url(&self, query: Option<&str>) -> Url {
        let mut url = self.endpoint.clone();
        if let Some(q) = effective_query(query) {
            url.query_pairs_mut().append_pair("q", q);
        }
        url
    }
}
