//! Typed inputs for an NTLM request and their mapping from host values.

use crate::error::{NtlmError, Result};
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use std::fmt;

/// Content-Type sent with every SOAP request.
pub const SOAP_CONTENT_TYPE: &str = "text/xml;charset=UTF-8";

/// Header carrying the caller-supplied SOAP action.
pub const SOAP_ACTION_HEADER: &str = "SOAPAction";

/// NTLM credentials. No format validation is applied.
pub struct NtlmCredentials {
    pub username: String,
    password: SecretString,
    pub domain: String,
}

impl NtlmCredentials {
    pub fn new(
        username: impl Into<String>,
        password: impl Into<String>,
        domain: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            password: SecretString::from(password.into()),
            domain: domain.into(),
        }
    }

    pub fn password(&self) -> &str {
        self.password.expose_secret()
    }
}

impl fmt::Debug for NtlmCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NtlmCredentials")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .field("domain", &self.domain)
            .finish()
    }
}

/// Destination, SOAP action and payload of a single request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SoapRequest {
    pub url: String,
    /// Sent verbatim, including the empty string
    pub soap_action: String,
    /// Sent verbatim as the request body
    pub xml_payload: String,
}

impl SoapRequest {
    pub fn new(
        url: impl Into<String>,
        soap_action: impl Into<String>,
        xml_payload: impl Into<String>,
    ) -> Self {
        Self {
            url: url.into(),
            soap_action: soap_action.into(),
            xml_payload: xml_payload.into(),
        }
    }
}

/// Arguments of an `ntlmRequest` call coming from a scripting host.
#[derive(Debug)]
pub struct NtlmRequestArgs {
    pub credentials: NtlmCredentials,
    pub request: SoapRequest,
}

impl NtlmRequestArgs {
    /// Map the four dynamic host arguments
    /// `(credentials, url, soapAction, xmlPayload)` into typed inputs.
    ///
    /// The credentials object must carry string `Username` and `Password`
    /// fields; `Domain` may be omitted or null, which yields an empty domain.
    pub fn from_values(args: &[Value]) -> Result<Self> {
        if args.len() != 4 {
            return Err(NtlmError::InvalidArgument(format!(
                "ntlmRequest expects 4 arguments: credentials, url, soapAction, xmlPayload (got {})",
                args.len()
            )));
        }

        let creds = args[0].as_object().ok_or_else(|| {
            NtlmError::InvalidArgument("credentials must be an object".to_string())
        })?;

        let required = |field: &str| -> Result<String> {
            match creds.get(field) {
                Some(Value::String(s)) => Ok(s.clone()),
                Some(_) => Err(NtlmError::InvalidArgument(format!(
                    "credentials.{field} must be a string"
                ))),
                None => Err(NtlmError::InvalidArgument(format!(
                    "credentials.{field} is missing"
                ))),
            }
        };

        let username = required("Username")?;
        let password = required("Password")?;
        let domain = match creds.get("Domain") {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(s)) => s.clone(),
            Some(_) => {
                return Err(NtlmError::InvalidArgument(
                    "credentials.Domain must be a string".to_string(),
                ))
            }
        };

        let url = string_arg(&args[1], "url")?;
        let soap_action = string_arg(&args[2], "soapAction")?;
        let xml_payload = string_arg(&args[3], "xmlPayload")?;

        Ok(Self {
            credentials: NtlmCredentials::new(username, password, domain),
            request: SoapRequest {
                url,
                soap_action,
                xml_payload,
            },
        })
    }
}

fn string_arg(value: &Value, name: &str) -> Result<String> {
    value
        .as_str()
        .map(str::to_owned)
        .ok_or_else(|| NtlmError::InvalidArgument(format!("{name} must be a string")))
}
