//! NTLM challenge-response handshake on top of a reqwest client.
//!
//! NTLM authenticates a connection rather than a request, so the handshake
//! runs over a dedicated HTTP/1.1 client whose pool keeps the connection
//! alive between the probe and the authenticated request. Message encoding
//! and NTLMv2 hashing are delegated to `ntlmclient`.

use crate::error::{NtlmError, Result};
use crate::request::NtlmCredentials;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, WWW_AUTHENTICATE};
use reqwest::{Client, Request, Response, StatusCode};
use tracing::{debug, warn};

const NTLM_SCHEME: &str = "NTLM";

/// Transport that authenticates each request with NTLM before handing it to
/// the underlying client.
pub struct NtlmTransport<'a> {
    client: Client,
    credentials: &'a NtlmCredentials,
    workstation: &'a str,
}

impl<'a> NtlmTransport<'a> {
    pub fn new(client: Client, credentials: &'a NtlmCredentials, workstation: &'a str) -> Self {
        Self {
            client,
            credentials,
            workstation,
        }
    }

    /// Run the handshake and send `request`.
    ///
    /// A probe GET carrying the negotiate message is sent first. When the
    /// server answers 401 with an NTLM challenge, the request goes out with
    /// the authenticate message; any other probe status means the server does
    /// not require NTLM and the request is sent unauthenticated.
    pub async fn execute(&self, mut request: Request) -> Result<Response> {
        let negotiate = negotiate_message(self.workstation)?;
        let probe = self
            .client
            .get(request.url().clone())
            .header(AUTHORIZATION, authorization_value(&negotiate)?)
            .send()
            .await
            .map_err(NtlmError::Transport)?;

        if probe.status() != StatusCode::UNAUTHORIZED {
            debug!(status = %probe.status(), "Server did not request NTLM authentication");
            drop(probe);
            return self.client.execute(request).await.map_err(NtlmError::Transport);
        }

        let challenge = ntlm_challenge(probe.headers());
        drain(probe).await;
        let challenge = challenge?;
        debug!(challenge_len = challenge.len(), "Received NTLM challenge");

        let authenticate = authenticate_message(&challenge, self.credentials, self.workstation)?;
        request
            .headers_mut()
            .insert(AUTHORIZATION, authorization_value(&authenticate)?);

        let response = self
            .client
            .execute(request)
            .await
            .map_err(NtlmError::Transport)?;

        if response.status() == StatusCode::UNAUTHORIZED {
            warn!(
                username = %self.credentials.username,
                domain = %self.credentials.domain,
                "Server rejected NTLM credentials"
            );
            drain(response).await;
            return Err(NtlmError::Authentication(
                "server rejected the supplied credentials (401 after authenticate message)"
                    .to_string(),
            ));
        }

        debug!(status = %response.status(), "NTLM handshake completed");
        Ok(response)
    }
}

/// Read and discard a response body so its connection can be reused.
async fn drain(response: Response) {
    if let Err(e) = response.bytes().await {
        debug!(error = %e, "Failed to drain intermediate response body");
    }
}

fn authorization_value(message: &[u8]) -> Result<HeaderValue> {
    HeaderValue::from_str(&format!("{NTLM_SCHEME} {}", STANDARD.encode(message)))
        .map_err(|e| NtlmError::Authentication(format!("invalid Authorization header: {e}")))
}

/// Encode the NTLM negotiate (type 1) message.
pub fn negotiate_message(workstation: &str) -> Result<Vec<u8>> {
    let flags = ntlmclient::Flags::NEGOTIATE_UNICODE
        | ntlmclient::Flags::REQUEST_TARGET
        | ntlmclient::Flags::NEGOTIATE_NTLM
        | ntlmclient::Flags::NEGOTIATE_WORKSTATION_SUPPLIED;
    let message = ntlmclient::Message::Negotiate(ntlmclient::NegotiateMessage {
        flags,
        supplied_domain: String::new(),
        supplied_workstation: workstation.to_owned(),
        os_version: Default::default(),
    });
    message
        .to_bytes()
        .map_err(|e| NtlmError::Authentication(format!("failed to encode negotiate message: {e:?}")))
}

/// Extract and decode the NTLM challenge from `WWW-Authenticate` headers.
pub fn ntlm_challenge(headers: &HeaderMap) -> Result<Vec<u8>> {
    let token = headers
        .get_all(WWW_AUTHENTICATE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .find_map(|value| {
            let (scheme, token) = value.trim().split_once(' ')?;
            scheme.eq_ignore_ascii_case(NTLM_SCHEME).then(|| token.trim())
        })
        .filter(|token| !token.is_empty())
        .ok_or_else(|| {
            NtlmError::Authentication(
                "401 response did not carry an NTLM challenge in WWW-Authenticate".to_string(),
            )
        })?;

    STANDARD
        .decode(token)
        .map_err(|e| NtlmError::Authentication(format!("challenge is not valid base64: {e}")))
}

/// Answer a challenge (type 2) message with an NTLMv2 authenticate (type 3)
/// message.
pub fn authenticate_message(
    challenge: &[u8],
    credentials: &NtlmCredentials,
    workstation: &str,
) -> Result<Vec<u8>> {
    let challenge = match ntlmclient::Message::try_from(challenge) {
        Ok(ntlmclient::Message::Challenge(c)) => c,
        Ok(other) => {
            return Err(NtlmError::Authentication(format!(
                "expected a challenge message, got {other:?}"
            )))
        }
        Err(e) => {
            return Err(NtlmError::Authentication(format!(
                "failed to decode challenge message: {e:?}"
            )))
        }
    };

    let target_info: Vec<u8> = challenge
        .target_information
        .iter()
        .flat_map(|entry| entry.to_bytes())
        .collect();

    let creds = ntlmclient::Credentials {
        username: credentials.username.clone(),
        password: credentials.password().to_owned(),
        domain: credentials.domain.clone(),
    };
    let response = ntlmclient::respond_challenge_ntlm_v2(
        challenge.challenge,
        &target_info,
        ntlmclient::get_ntlm_time(),
        &creds,
    );

    let flags = ntlmclient::Flags::NEGOTIATE_UNICODE | ntlmclient::Flags::NEGOTIATE_NTLM;
    response
        .to_message(&creds, workstation, flags)
        .to_bytes()
        .map_err(|e| NtlmError::Authentication(format!("failed to encode authenticate message: {e:?}")))
}
