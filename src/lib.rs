//! NTLM-authenticated SOAP requests for load-testing hosts
//!
//! Sends a single HTTP POST carrying an XML payload to an endpoint protected
//! by NTLM authentication and returns the response body as text.
//!
//! # Features
//!
//! - NTLMv2 challenge-response handshake over a dedicated HTTP/1.1 connection
//! - `Content-Type: text/xml;charset=UTF-8` and `SOAPAction` headers
//! - Opt-in TLS certificate verification bypass for test environments
//! - Explicit request and connect timeouts
//! - Host module (`k6/x/ntlm`) with typed mapping of script arguments
//!
//! # Example
//!
//! ```ignore
//! use ntlm_soap::{NtlmClientConfig, NtlmCredentials, NtlmRequestExecutor, SoapRequest};
//!
//! let executor = NtlmRequestExecutor::new(NtlmClientConfig::default())?;
//! let credentials = NtlmCredentials::new("alice", "s3cret", "CORP");
//! let request = SoapRequest::new(
//!     "https://soap.example.org/Service.svc",
//!     "http://tempuri.org/IService/GetUser",
//!     "<soap:Envelope>...</soap:Envelope>",
//! );
//! let body = executor.ntlm_request(&credentials, &request).await?;
//! ```

pub mod config;
pub mod error;
pub mod executor;
pub mod module;
pub mod request;
pub mod transport;

pub use config::NtlmClientConfig;
pub use error::{ErrorKind, NtlmError};
pub use executor::NtlmRequestExecutor;
pub use module::{HostModule, ModuleRegistry, NtlmModule, MODULE_NAME};
pub use request::{NtlmCredentials, NtlmRequestArgs, SoapRequest};
