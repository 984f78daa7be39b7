//! Bulk path loading: paginate everything under a prefix into the cache.

use provar_api::ProviderDispatch;
use provar_types::{ListByPrefixRequest, ParameterKind, PathPrefix, ResolveError};
use tracing::debug;

use crate::cache::ParameterCache;

/// Load every parameter under `prefix` into the cache.
///
/// No-op when the prefix is already a cache key. Otherwise the bulk list
/// operation is called repeatedly, carrying the continuation token across
/// pages, until the store reports no further token. Each returned entry has
/// its kind normalized (secrets ingest as plain) and its name coerced to a
/// `/`-qualified form on decode. The prefix key is written only after the
/// last page, so a partially loaded prefix is indistinguishable from an
/// unloaded one.
///
/// Transport failures propagate unrecovered; the prefix stays absent from
/// the cache and a later resolution starts the load over.
pub async fn load_path(dispatch: &dyn ProviderDispatch, cache: &mut ParameterCache, prefix: &PathPrefix) -> Result<(), ResolveError> {
    if cache.contains(prefix.as_str()) {
        return Ok(());
    }

    let mut next_token: Option<String> = None;
    let mut loaded = 0usize;
    loop {
        let request = ListByPrefixRequest::page(prefix, next_token.take());
        let page = provar_api::list_by_prefix(dispatch, &request)
            .await
            .map_err(ResolveError::transport)?;

        for mut entry in page.parameters {
            // Suppress the legacy secure-string deprecation signal downstream.
            if entry.kind == ParameterKind::Secret {
                entry.kind = ParameterKind::Plain;
            }
            loaded += 1;
            cache.insert_entry(entry);
        }

        match page.next_token {
            Some(token) => next_token = Some(token),
            None => break,
        }
    }

    debug!(prefix = %prefix, parameter_count = loaded, "path loaded");
    cache.mark_loaded(prefix);
    Ok(())
}
