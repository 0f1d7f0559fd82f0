use std::future::Future;
use std::sync::Mutex;

use futures_util::FutureExt;
use futures_util::future::{BoxFuture, Shared};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::error::{Error, Result};

type Factory<T> = Box<dyn FnOnce() -> BoxFuture<'static, Result<T>> + Send>;
type InitFuture<T> = Shared<BoxFuture<'static, Result<T>>>;

/// Single-flight, memoized asynchronous initialization.
///
/// The factory is consumed on first demand and runs on a spawned task raced
/// against the cancellation token, so neither construction nor the first
/// `get` executes it inline. Every caller awaits a clone of one shared
/// future; success and failure alike are memoized and replayed, and a fired
/// token resolves all current and future waiters to [`Error::Cancelled`].
pub struct AsyncLazy<T>
where
    T: Clone + Send + Sync + 'static,
{
    factory: Mutex<Option<Factory<T>>>,
    slot: Mutex<Option<InitFuture<T>>>,
    cancel: CancellationToken,
}

impl<T> AsyncLazy<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub fn new<F, Fut>(factory: F, cancel: CancellationToken) -> Self
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<T>> + Send + 'static,
    {
        Self {
            factory: Mutex::new(Some(Box::new(move || factory().boxed()))),
            slot: Mutex::new(None),
            cancel,
        }
    }

    /// True iff initialization was ever triggered, without forcing it.
    pub fn initialized(&self) -> bool {
        self.slot.lock().expect("lazy slot mutex poisoned").is_some()
    }

    pub async fn get(&self) -> Result<T> {
        self.ensure_started().await
    }

    fn ensure_started(&self) -> InitFuture<T> {
        let mut slot = self.slot.lock().expect("lazy slot mutex poisoned");
        if let Some(shared) = slot.as_ref() {
            return shared.clone();
        }
        let factory = self
            .factory
            .lock()
            .expect("lazy factory mutex poisoned")
            .take()
            .expect("factory is present until first initialization");
        debug!("starting lazy initialization");
        let cancel = self.cancel.clone();
        let task = tokio::spawn(async move {
            if cancel.is_cancelled() {
                return Err(Error::Cancelled);
            }
            tokio::select! {
                _ = cancel.cancelled() => {
                    warn!("lazy initialization cancelled");
                    Err(Error::Cancelled)
                }
                outcome = factory() => outcome,
            }
        });
        let shared: InitFuture<T> = async move {
            match task.await {
                Ok(outcome) => outcome,
                Err(join) => Err(Error::initialization(join.to_string())),
            }
        }
        .boxed()
        .shared();
        *slot = Some(shared.clone());
        shared
    }
}
