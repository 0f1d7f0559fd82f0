use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::Result;

/// An externally provided module object: a narrow JSON-valued call surface
/// plus an asynchronous release operation.
#[async_trait]
pub trait Module: Send + Sync {
    async fn invoke(&self, method: &str, args: Value) -> Result<Value>;

    /// Releases the module. Called at most once per handle, during teardown.
    async fn dispose(&self) -> Result<()>;
}

/// The host's module-import facility. Injected rather than ambient so handle
/// behavior stays deterministic under test.
#[async_trait]
pub trait ModuleImporter: Send + Sync {
    async fn import(&self, specifier: &str) -> Result<Arc<dyn Module>>;
}
