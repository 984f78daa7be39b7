//! Composition of one resolution: load the path, consult the cache, create.

use provar_api::ProviderDispatch;
use provar_types::{ParameterEntry, ParameterName, ResolveError};

use crate::cache::{CacheSlot, ParameterCache};
use crate::create::create_parameter;
use crate::loader::load_path;
use crate::prompt::{OperatorPrompt, PromptQuiet};

/// Resolve one parameter name against the cache, loading its parent path
/// first and falling back to interactive creation when the store has no
/// entry for it. Runs inside the worker task; the cache is ours alone here.
pub(crate) async fn resolve_one(
    dispatch: &dyn ProviderDispatch,
    prompt: &dyn OperatorPrompt,
    quiet: Option<&dyn PromptQuiet>,
    cache: &mut ParameterCache,
    raw_name: &str,
) -> Result<ParameterEntry, ResolveError> {
    let name = ParameterName::new(raw_name);
    let prefix = name.parent_prefix();
    load_path(dispatch, cache, &prefix).await?;

    match cache.slot(name.as_str()) {
        Some(CacheSlot::Failed(error)) => Err(error.clone()),
        Some(CacheSlot::Entry(entry)) => Ok(entry.clone()),
        // The requested name is itself a loaded path prefix. No parameter
        // can live under that exact key.
        Some(CacheSlot::Loaded) => Err(ResolveError::InvalidRequest {
            reason: format!("{} names a loaded path, not a parameter", name),
        }),
        None => create_parameter(dispatch, prompt, quiet, cache, &name).await,
    }
}
