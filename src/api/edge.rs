use crate::db::AppSettings;
use crate::error::ResolveError;
use once_cell::sync::Lazy;
use std::time::Duration;
use tracing::debug;

use super::models::{EdgeImageRequest, EdgeImageResponse};

static HTTP_CLIENT: Lazy<reqwest::Client> = Lazy::new(reqwest::Client::new);

/// Where the edge functions live and how to authenticate against them.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EdgeConfig {
    pub functions_url: String,
    pub anon_key: String,
    pub timeout: Option<Duration>,
}

impl EdgeConfig {
    pub fn from_settings(settings: &AppSettings) -> Self {
        let timeout = match settings.request_timeout_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs.clamp(1, 30) as u64)),
        };
        Self {
            functions_url: settings.functions_url.trim().trim_end_matches('/').to_string(),
            anon_key: settings.functions_anon_key.trim().to_string(),
            timeout,
        }
    }

    pub fn is_configured(&self) -> bool {
        !self.functions_url.trim().is_empty()
    }

    pub fn function_url(&self, function: &str) -> Option<String> {
        let base = self.functions_url.trim().trim_end_matches('/');
        if base.is_empty() {
            None
        } else {
            Some(format!("{base}/{function}"))
        }
    }
}

pub struct EdgeFunctionClient {
    pub config: EdgeConfig,
}

impl EdgeFunctionClient {
    pub fn new(config: EdgeConfig) -> Self {
        Self { config }
    }

    pub async fn invoke(
        &self,
        function: &str,
        body: &EdgeImageRequest,
    ) -> Result<EdgeImageResponse, ResolveError> {
        let url = self
            .config
            .function_url(function)
            .ok_or(ResolveError::Misconfigured)?;

        let mut request = HTTP_CLIENT.post(&url).json(body);
        if !self.config.anon_key.is_empty() {
            request = request
                .bearer_auth(&self.config.anon_key)
                .header("apikey", &self.config.anon_key);
        }

        debug!(function, query = %body.query, "invoking image edge function");
        let response = send(request, self.config.timeout).await?;
        let status = response.status();

        if !status.is_success() {
            let detail = response
                .json::<EdgeImageResponse>()
                .await
                .ok()
                .and_then(|payload| payload.error)
                .unwrap_or_default();
            return Err(ResolveError::network(format!(
                "{function} status {} {detail}",
                status.as_u16()
            )));
        }

        let payload = response
            .json::<EdgeImageResponse>()
            .await
            .map_err(ResolveError::network)?;

        match payload.error.as_deref() {
            Some(error) if !payload.has_candidates() => Err(ResolveError::network(error)),
            _ => Ok(payload),
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
async fn send(
    request: reqwest::RequestBuilder,
    timeout: Option<Duration>,
) -> Result<reqwest::Response, ResolveError> {
    let request = match timeout {
        Some(timeout) => request.timeout(timeout),
        None => request,
    };
    request.send().await.map_err(ResolveError::network)
}

#[cfg(target_arch = "wasm32")]
async fn send(
    request: reqwest::RequestBuilder,
    timeout: Option<Duration>,
) -> Result<reqwest::Response, ResolveError> {
    use futures_util::future::{select, Either};
    use gloo_timers::future::TimeoutFuture;

    let pending = Box::pin(request.send());
    let Some(timeout) = timeout else {
        return pending.await.map_err(ResolveError::network);
    };

    let millis = timeout.as_millis().min(u32::MAX as u128) as u32;
    match select(pending, Box::pin(TimeoutFuture::new(millis))).await {
        Either::Left((result, _)) => result.map_err(ResolveError::network),
        Either::Right(_) => Err(ResolveError::network(format!(
            "timed out after {}s",
            timeout.as_secs()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settings_map_to_config() {
        let settings = AppSettings {
            functions_url: " https://demo.supabase.co/functions/v1/ ".to_string(),
            functions_anon_key: "anon".to_string(),
            request_timeout_secs: 90,
            ..AppSettings::default()
        };
        let config = EdgeConfig::from_settings(&settings);

        assert_eq!(config.functions_url, "https://demo.supabase.co/functions/v1");
        assert_eq!(config.timeout, Some(Duration::from_secs(30)));
        assert_eq!(
            config.function_url("vecteezy-images").as_deref(),
            Some("https://demo.supabase.co/functions/v1/vecteezy-images")
        );
    }

    #[test]
    fn zero_timeout_means_platform_default() {
        let settings = AppSettings {
            request_timeout_secs: 0,
            ..AppSettings::default()
        };
        assert_eq!(EdgeConfig::from_settings(&settings).timeout, None);
    }

    #[tokio::test]
    async fn unconfigured_client_fails_without_network() {
        let client = EdgeFunctionClient::new(EdgeConfig::default());
        let body = EdgeImageRequest::for_provider(
            super::super::ProviderKind::Unified,
            &crate::query::ImageQuery::new("Oslo"),
        );
        assert_eq!(
            client.invoke("unified-image-search", &body).await,
            Err(ResolveError::Misconfigured)
        );
    }
}
