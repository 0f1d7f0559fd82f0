use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};

use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::lazy::AsyncLazy;
use crate::module::{Module, ModuleImporter};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
enum HandleState {
    Idle = 1,
    Started = 2,
    Disposed = 3,
}

impl HandleState {
    fn from_u8(v: u8) -> Self {
        match v {
            1 => Self::Idle,
            2 => Self::Started,
            _ => Self::Disposed,
        }
    }
}

/// A disposable handle that imports its module on first use.
///
/// The module is initialized at most once per handle, shared by all
/// concurrent callers, and released at most once during [`dispose`] — and
/// only if it was ever requested. A handle whose initialization failed stays
/// failed; hosts construct a new handle to retry.
///
/// [`dispose`]: ModuleHandle::dispose
pub struct ModuleHandle {
    lazy: AsyncLazy<Arc<dyn Module>>,
    cancel: CancellationToken,
    state: AtomicU8,
}

impl ModuleHandle {
    /// No eager work: the import runs when the module is first requested.
    pub fn new(
        importer: Arc<dyn ModuleImporter>,
        specifier: impl Into<String>,
        cancel: CancellationToken,
    ) -> Self {
        let specifier = specifier.into();
        debug!(%specifier, "module handle created");
        Self::with_factory(
            move || async move { importer.import(&specifier).await },
            cancel,
        )
    }

    /// Lower-level constructor for hosts that produce the module themselves.
    pub fn with_factory<F, Fut>(factory: F, cancel: CancellationToken) -> Self
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<Arc<dyn Module>>> + Send + 'static,
    {
        Self {
            lazy: AsyncLazy::new(factory, cancel.clone()),
            cancel,
            state: AtomicU8::new(HandleState::Idle as u8),
        }
    }

    /// The token that aborts an in-flight import when fired. Owned by the
    /// handle for its full lifetime and never reset.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn is_disposed(&self) -> bool {
        self.state() == HandleState::Disposed
    }

    fn state(&self) -> HandleState {
        HandleState::from_u8(self.state.load(Ordering::Acquire))
    }

    /// Returns the module, importing it on first call. All concurrent first
    /// callers share one import attempt and observe its memoized outcome,
    /// success or failure. Rejects with [`Error::Disposed`] once teardown
    /// has begun.
    pub async fn get_or_create(&self) -> Result<Arc<dyn Module>> {
        if let Err(current) = self.state.compare_exchange(
            HandleState::Idle as u8,
            HandleState::Started as u8,
            Ordering::AcqRel,
            Ordering::Acquire,
        ) {
            if current != HandleState::Started as u8 {
                return Err(Error::Disposed);
            }
        }
        self.lazy.get().await
    }

    /// Forwards a call to the module, importing it first if needed. Fails
    /// with whatever the underlying invocation fails with.
    pub async fn invoke(&self, method: &str, args: Value) -> Result<Value> {
        let module = self.get_or_create().await?;
        module.invoke(method, args).await
    }

    /// Prompt-style forwarding call: invokes the module's `showPrompt`
    /// method with the message and decodes the string it returns.
    pub async fn prompt(&self, message: &str) -> Result<String> {
        let result = self
            .invoke("showPrompt", Value::String(message.to_string()))
            .await?;
        match result {
            Value::String(reply) => Ok(reply),
            other => Err(Error::invocation(
                "showPrompt",
                format!("expected string result, got {other}"),
            )),
        }
    }

    /// Tears the handle down. If the module was never requested this is a
    /// no-op; otherwise the memoized import outcome is awaited and, on
    /// success, the module is released exactly once. Release errors
    /// propagate to the caller unsuppressed.
    pub async fn dispose(&self) -> Result<()> {
        let previous = HandleState::from_u8(
            self.state
                .swap(HandleState::Disposed as u8, Ordering::AcqRel),
        );
        match previous {
            HandleState::Idle | HandleState::Disposed => Ok(()),
            HandleState::Started => {
                let module = self.lazy.get().await?;
                info!("releasing module");
                match module.dispose().await {
                    Ok(()) => Ok(()),
                    Err(error) => {
                        warn!(%error, "module release failed");
                        Err(error)
                    }
                }
            }
        }
    }
}
