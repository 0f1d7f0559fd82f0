//! Lazily leased handles over external asynchronous modules.
//!
//! A [`ModuleHandle`] defers importing its module until first use, shares
//! that single import across all concurrent callers (single-flight, outcome
//! memoized), forwards JSON-valued calls into the module once it is ready,
//! and releases it exactly once on [`ModuleHandle::dispose`] — only if it
//! was ever created. An in-flight import can be aborted through the
//! handle's cancellation token.
//!
//! The host supplies the two collaborators: a [`ModuleImporter`] that
//! resolves a specifier to a loaded [`Module`], and the point in its own
//! lifecycle at which the handle is disposed.

mod error;
mod handle;
mod lazy;
mod module;

pub use error::{Error, Result};
pub use handle::ModuleHandle;
pub use lazy::AsyncLazy;
pub use module::{Module, ModuleImporter};
