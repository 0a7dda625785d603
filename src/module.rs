//! Host extension module and the registry an embedding application owns.
//!
//! Nothing registers itself at load time: the embedding application builds
//! an [`NtlmModule`] and adds it to its own [`ModuleRegistry`].

use crate::config::NtlmClientConfig;
use crate::error::{NtlmError, Result};
use crate::executor::NtlmRequestExecutor;
use crate::request::NtlmRequestArgs;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

/// Import name under which scripts find this module.
pub const MODULE_NAME: &str = "k6/x/ntlm";

/// The single exported operation.
pub const NTLM_REQUEST_EXPORT: &str = "ntlmRequest";

/// A module callable from a scripting host with dynamically typed arguments.
#[async_trait]
pub trait HostModule: Send + Sync {
    /// Import name of the module.
    fn name(&self) -> &'static str;

    /// Names of the exported functions.
    fn exports(&self) -> &'static [&'static str];

    /// Invoke an exported function.
    async fn call(&self, export: &str, args: &[Value]) -> Result<Value>;
}

/// Host module exposing `ntlmRequest`.
pub struct NtlmModule {
    executor: NtlmRequestExecutor,
}

impl NtlmModule {
    pub fn new(config: NtlmClientConfig) -> Result<Self> {
        Ok(Self {
            executor: NtlmRequestExecutor::new(config)?,
        })
    }

    pub fn executor(&self) -> &NtlmRequestExecutor {
        &self.executor
    }
}

#[async_trait]
impl HostModule for NtlmModule {
    fn name(&self) -> &'static str {
        MODULE_NAME
    }

    fn exports(&self) -> &'static [&'static str] {
        &[NTLM_REQUEST_EXPORT]
    }

    async fn call(&self, export: &str, args: &[Value]) -> Result<Value> {
        if export != NTLM_REQUEST_EXPORT {
            return Err(NtlmError::InvalidArgument(format!(
                "module {MODULE_NAME} has no export named '{export}'"
            )));
        }

        let args = NtlmRequestArgs::from_values(args)?;
        let body = self
            .executor
            .ntlm_request(&args.credentials, &args.request)
            .await?;
        Ok(Value::String(body))
    }
}

/// Registry of host modules, keyed by import name.
#[derive(Default)]
pub struct ModuleRegistry {
    modules: HashMap<&'static str, Arc<dyn HostModule>>,
}

impl ModuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a module. A second module under the same name is rejected.
    pub fn register<M: HostModule + 'static>(&mut self, module: M) -> Result<()> {
        let name = module.name();
        if self.modules.contains_key(name) {
            return Err(NtlmError::Config(format!("module '{name}' is already registered")));
        }
        info!(module = name, exports = ?module.exports(), "Registered host module");
        self.modules.insert(name, Arc::new(module));
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn HostModule>> {
        let module = self.modules.get(name).cloned();
        if module.is_none() {
            debug!(module = name, "Host module not found");
        }
        module
    }

    /// Registered module names, sorted.
    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.modules.keys().copied().collect();
        names.sort_unstable();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use serde_json::json;

    fn module() -> NtlmModule {
        NtlmModule::new(NtlmClientConfig::default()).unwrap()
    }

    #[test]
    fn test_module_name_and_exports() {
        let module = module();
        assert_eq!(module.name(), "k6/x/ntlm");
        assert_eq!(module.exports(), &["ntlmRequest"]);
    }

    #[test]
    fn test_register_and_lookup() {
        let mut registry = ModuleRegistry::new();
        registry.register(module()).unwrap();
        assert_eq!(registry.names(), vec![MODULE_NAME]);
        assert!(registry.get(MODULE_NAME).is_some());
        assert!(registry.get("k6/x/other").is_none());
    }

    #[test]
    fn test_duplicate_registration_rejected() {
        let mut registry = ModuleRegistry::new();
        registry.register(module()).unwrap();
        let err = registry.register(module()).unwrap_err();
        assert!(matches!(err, NtlmError::Config(_)));
    }

    #[tokio::test]
    async fn test_unknown_export_rejected() {
        let err = module().call("ntlmGet", &[]).await.unwrap_err();
        assert!(err.to_string().contains("no export named 'ntlmGet'"));
    }

    #[tokio::test]
    async fn test_bad_arguments_rejected_before_request() {
        let args = vec![json!("alice"), json!("http://localhost/"), json!(""), json!("")];
        let err = module().call(NTLM_REQUEST_EXPORT, &args).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Construction);
        assert!(err.to_string().contains("credentials must be an object"));
    }
}
