use reqwest::Client;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::query::StudyQuery;

/// One response of the studies endpoint.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudiesPage {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub studies: Vec<Value>,
    #[serde(default)]
    pub next_page_token: Option<String>,
}

impl StudiesPage {
    /// Token for the following request. An empty token ends the walk like a missing one.
    pub fn continuation(&self) -> Option<&str> {
        self.next_page_token.as_deref().filter(|t| !t.is_empty())
    }
}

fn null_as_empty<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<Vec<Value>, D::Error> {
    Ok(Option::<Vec<Value>>::deserialize(d)?.unwrap_or_default())
}

/// Plain GET client for the registry's studies endpoint. No retries, default timeouts.
pub struct StudiesClient {
    http: Client,
    base_url: String,
}

impl StudiesClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.into(),
        }
    }

    pub async fn fetch_page(&self, query: &StudyQuery, page_token: Option<&str>) -> Result<StudiesPage> {
        let url = query.url(&self.base_url, page_token);
        debug!("GET {}", url);

        let http_err = |source| Error::Http {
            url: url.clone(),
            source,
        };
        let body = self
            .http
            .get(&url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(http_err)?
            .text()
            .await
            .map_err(http_err)?;

        serde_json::from_str(&body).map_err(|source| Error::Decode {
            url: url.clone(),
            source,
        })
    }

    pub fn paginate<'a>(&'a self, query: &'a StudyQuery) -> Paginator<'a> {
        Paginator {
            client: self,
            query,
            next_token: None,
            pages: 0,
            max_pages: None,
            finished: false,
        }
    }

    /// Every study of every page, in server order.
    #[cfg(test)]
    pub async fn fetch_all(&self, query: &StudyQuery) -> Result<Vec<Value>> {
        let mut pages = self.paginate(query);
        let mut studies = Vec::new();
        while let Some(page) = pages.next_page().await? {
            studies.extend(page.studies);
        }
        tracing::info!("Fetched {} studies in {} pages", studies.len(), pages.pages_fetched());
        Ok(studies)
    }
}

/// Sequential walk over the continuation-token chain.
pub struct Paginator<'a> {
    client: &'a StudiesClient,
    query: &'a StudyQuery,
    next_token: Option<String>,
    pages: usize,
    max_pages: Option<usize>,
    finished: bool,
}

impl Paginator<'_> {
    /// Stop after `max` pages even if the server keeps handing out tokens.
    pub fn with_max_pages(mut self, max: Option<usize>) -> Self {
        self.max_pages = max;
        self
    }

    pub fn pages_fetched(&self) -> usize {
        self.pages
    }

    /// Token the next request will send, if any.
    pub fn pending_token(&self) -> Option<&str> {
        self.next_token.as_deref()
    }

    pub async fn next_page(&mut self) -> Result<Option<StudiesPage>> {
        if self.finished {
            return Ok(None);
        }
        if self.max_pages.is_some_and(|max| self.pages >= max) {
            warn!(
                "Stopping after {} pages with continuation token {:?} still pending",
                self.pages, self.next_token
            );
            self.finished = true;
            return Ok(None);
        }

        let page = self
            .client
            .fetch_page(self.query, self.next_token.as_deref())
            .await?;
        self.pages += 1;
        self.next_token = page.continuation().map(str::to_string);
        self.finished = self.next_token.is_none();
        debug!(
            "Page {}: {} studies, next token {:?}",
            self.pages,
            page.studies.len(),
            self.next_token
        );
        Ok(Some(page))
    }
}
