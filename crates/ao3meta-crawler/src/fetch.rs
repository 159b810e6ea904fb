use futures::future::BoxFuture;
use reqwest::header::USER_AGENT;

use crate::config::CrawlerConfig;
use crate::error::RetrievalError;

/// Retrieves the body of a page, failing when there is nothing to scrap.
pub trait Fetcher {
    fn fetch<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<String, RetrievalError>>;
}

#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
    user_agent: String,
}

impl HttpFetcher {
    pub fn new(config: &CrawlerConfig) -> anyhow::Result<Self> {
        let client = reqwest::ClientBuilder::new()
            .gzip(true)
            .deflate(true)
            .build()?;
        Ok(Self {
            client,
            user_agent: config.user_agent.clone(),
        })
    }

    async fn download(&self, url: &str) -> Result<String, RetrievalError> {
        let transport = |source| RetrievalError::Transport {
            url: url.to_string(),
            source,
        };

        let resp = self
            .client
            .get(url)
            .header(USER_AGENT, &self.user_agent)
            .send()
            .await
            .map_err(transport)?;

        let status = resp.status();
        if !status.is_success() {
            return Err(RetrievalError::Status {
                url: url.to_string(),
                status,
            });
        }

        let page = resp.text().await.map_err(transport)?;
        check_not_empty(url, page)
    }
}

impl Fetcher for HttpFetcher {
    fn fetch<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<String, RetrievalError>> {
        Box::pin(self.download(url))
    }
}

/// A blank body means the site served nothing usable for this page.
pub fn check_not_empty(url: &str, page: String) -> Result<String, RetrievalError> {
    if page.trim().is_empty() {
        Err(RetrievalError::Empty {
            url: url.to_string(),
        })
    } else {
        Ok(page)
    }
}
