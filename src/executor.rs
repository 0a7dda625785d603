//! Request executor: one NTLM-authenticated SOAP POST per call.

use crate::config::NtlmClientConfig;
use crate::error::{NtlmError, Result};
use crate::request::{NtlmCredentials, SoapRequest, SOAP_ACTION_HEADER, SOAP_CONTENT_TYPE};
use crate::transport::NtlmTransport;
use reqwest::header::CONTENT_TYPE;
use reqwest::redirect::Policy;
use reqwest::{Client, Url};
use std::time::Instant;
use tracing::{debug, info, warn};

/// Executes NTLM-authenticated SOAP requests.
///
/// Every call builds its own client and connection, so concurrent calls with
/// different credentials never share authenticated state.
#[derive(Debug, Clone)]
pub struct NtlmRequestExecutor {
    config: NtlmClientConfig,
}

impl NtlmRequestExecutor {
    /// Create an executor, rejecting configurations the HTTP stack cannot honor.
    pub fn new(config: NtlmClientConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &NtlmClientConfig {
        &self.config
    }

    /// Perform one authenticated POST and return the response body as text.
    ///
    /// The body is returned whatever the status code, except for a 401 after
    /// the authenticate message, which is reported as an authentication error.
    pub async fn ntlm_request(
        &self,
        credentials: &NtlmCredentials,
        request: &SoapRequest,
    ) -> Result<String> {
        let url = parse_url(&request.url)?;
        let client = self.build_client()?;

        let http_request = client
            .post(url.clone())
            .header(CONTENT_TYPE, SOAP_CONTENT_TYPE)
            .header(SOAP_ACTION_HEADER, request.soap_action.as_str())
            .body(request.xml_payload.clone())
            .build()
            .map_err(|e| NtlmError::InvalidRequest(e.to_string()))?;

        debug!(
            url = %url,
            soap_action = %request.soap_action,
            username = %credentials.username,
            domain = %credentials.domain,
            payload_len = request.xml_payload.len(),
            "Sending NTLM request"
        );

        let started = Instant::now();
        let transport = NtlmTransport::new(client, credentials, &self.config.workstation);
        let response = transport.execute(http_request).await?;

        let status = response.status();
        if !status.is_success() {
            warn!(url = %url, status = %status, "Non-success status, returning body unchanged");
        }

        let body = response.text().await.map_err(NtlmError::ResponseRead)?;

        info!(
            url = %url,
            status = status.as_u16(),
            body_len = body.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "NTLM request completed"
        );

        Ok(body)
    }

    fn build_client(&self) -> Result<Client> {
        // Redirects are not followed: each hop would need its own handshake, and
        // a 3xx body is returned like any other status.
        let mut builder = Client::builder().http1_only().redirect(Policy::none());

        if self.config.tls.accept_invalid_certs {
            warn!("TLS certificate verification is disabled for this client");
            builder = builder.danger_accept_invalid_certs(true);
        }
        if let Some(timeout) = self.config.timeouts.request() {
            builder = builder.timeout(timeout);
        }
        if let Some(timeout) = self.config.timeouts.connect() {
            builder = builder.connect_timeout(timeout);
        }
        if let Some(user_agent) = &self.config.user_agent {
            builder = builder.user_agent(user_agent.as_str());
        }

        builder.build().map_err(NtlmError::ClientBuild)
    }
}

/// Parse and check a destination URL before any network I/O happens.
pub fn parse_url(raw: &str) -> Result<Url> {
    if raw.trim().is_empty() {
        return Err(NtlmError::InvalidRequest("URL is empty".to_string()));
    }
    let url = Url::parse(raw)
        .map_err(|e| NtlmError::InvalidRequest(format!("malformed URL '{raw}': {e}")))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(NtlmError::InvalidRequest(format!(
            "unsupported URL scheme '{other}', expected http or https"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_parse_url_accepts_http_and_https() {
        assert!(parse_url("http://localhost:8080/Service.svc").is_ok());
        assert!(parse_url("https://soap.example.org/ws").is_ok());
    }

    #[test]
    fn test_parse_url_rejects_empty() {
        let err = parse_url("").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Construction);
    }

    #[test]
    fn test_parse_url_rejects_missing_scheme() {
        let err = parse_url("soap.example.org/ws").unwrap_err();
        assert!(matches!(err, NtlmError::InvalidRequest(_)));
    }

    #[test]
    fn test_parse_url_rejects_other_schemes() {
        let err = parse_url("ftp://files.example.org/").unwrap_err();
        assert!(err.to_string().contains("unsupported URL scheme 'ftp'"));
    }

    #[test]
    fn test_new_rejects_zero_timeout() {
        let mut config = NtlmClientConfig::default();
        config.timeouts.request_secs = Some(0);
        assert!(NtlmRequestExecutor::new(config).is_err());
    }

    #[tokio::test]
    async fn test_malformed_url_fails_before_network() {
        let executor = NtlmRequestExecutor::new(NtlmClientConfig::default()).unwrap();
        let creds = NtlmCredentials::new("alice", "pw", "");
        let request = SoapRequest::new("not a url", "urn:Ping", "<Ping/>");

        let err = executor.ntlm_request(&creds, &request).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Construction);
    }

    #[tokio::test]
    async fn test_connection_refused_is_transport_error() {
        let executor = NtlmRequestExecutor::new(NtlmClientConfig::default()).unwrap();
        let creds = NtlmCredentials::new("alice", "pw", "");
        // Port 1 on loopback is never listening in test environments.
        let request = SoapRequest::new("http://127.0.0.1:1/ws", "urn:Ping", "<Ping/>");

        let err = executor.ntlm_request(&creds, &request).await.unwrap_err();
        assert!(matches!(err, NtlmError::Transport(_)));
        assert_eq!(err.kind(), ErrorKind::Transport);
    }
}
