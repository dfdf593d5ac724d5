use crate::config::BasicConfig;
use crate::error::DigestError;
use std::time::Duration;

fn base_builder(cfg: &BasicConfig) -> Result<reqwest::ClientBuilder, DigestError> {
    let mut builder = reqwest::Client::builder()
        .user_agent(cfg.user_agent.clone())
        .connect_timeout(Duration::from_secs(cfg.connect_timeout_secs))
        .timeout(Duration::from_secs(cfg.timeout_secs));
    if let Some(proxy_url) = cfg.proxy.as_ref() {
        builder = builder.proxy(reqwest::Proxy::all(proxy_url.as_str())?);
    }
    Ok(builder)
}

/// Shared client for the page fetch, inference and Gmail calls.
pub fn build_http_client(cfg: &BasicConfig) -> Result<reqwest::Client, DigestError> {
    Ok(base_builder(cfg)?.build()?)
}

/// Client for the OAuth token endpoint. Redirects are never followed there.
pub fn build_oauth_http_client(cfg: &BasicConfig) -> Result<reqwest::Client, DigestError> {
    Ok(base_builder(cfg)?
        .redirect(reqwest::redirect::Policy::none())
        .build()?)
}
