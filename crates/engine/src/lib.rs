//! # Provar Engine
//!
//! The engine resolves named configuration parameters from a remote
//! hierarchical store, front-ending the generic "get a single parameter"
//! request with a bulk-loading cache and an interactive creation path.
//!
//! ## Key pieces
//!
//! - **Cache** (`cache`): one keyed map from parameter names and path
//!   prefixes to resolved entries, remembered failures, or loaded markers.
//!   Monotonic: a key, once written, is never overwritten or evicted.
//! - **Loader** (`loader`): paginates the bulk list operation for a path
//!   prefix and fills the cache, marking the prefix loaded last.
//! - **Creator** (`create`): solicits a value from the operator for a
//!   parameter the store does not have, persists it, and caches it.
//! - **Queue** (`queue`): the single worker task that owns the cache and
//!   executes resolutions strictly one at a time, in enqueue order.
//! - **Interceptor** (`intercept`): a `ProviderDispatch` decorator that
//!   answers single-parameter reads from the resolution queue and forwards
//!   everything else untouched.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use provar_engine::{InterceptingDispatch, NonInteractivePrompt, spawn_resolver};
//!
//! let store = Arc::new(provar_api::HttpProviderDispatch::new_from_env()?);
//! let resolver = spawn_resolver(store.clone(), Arc::new(NonInteractivePrompt), None);
//! let dispatch = InterceptingDispatch::new(store, resolver.clone());
//! let entry = resolver.resolve("/app/stage/db_url").await?;
//! ```

pub mod cache;
pub mod create;
pub mod intercept;
pub mod loader;
pub mod prompt;
pub mod queue;
mod resolver;

#[cfg(test)]
pub(crate) mod test_support;

pub use cache::{CacheSlot, ParameterCache};
pub use intercept::InterceptingDispatch;
pub use prompt::{InteractivePrompt, NonInteractivePrompt, OperatorPrompt, PromptQuiet};
pub use provar_types::ResolveError;
pub use queue::{ResolverHandle, spawn_resolver};
