//! Interactive creation of parameters the store does not have yet.

use provar_api::ProviderDispatch;
use provar_types::{ParameterEntry, ParameterName, PutParameterRequest, ResolveError};
use tracing::info;

use crate::cache::ParameterCache;
use crate::prompt::{OperatorPrompt, PromptQuiet};

/// Solicit a value for `name`, persist it, and cache the result.
///
/// Invoked only after the name's prefix has been fully loaded and the name
/// is still absent. An empty or absent answer is remembered as a failure so
/// the operator is never prompted twice for the same name. An obtained value
/// is written to the store as a secret (overwrite allowed), then cached and
/// returned as plain.
pub async fn create_parameter(
    dispatch: &dyn ProviderDispatch,
    prompt: &dyn OperatorPrompt,
    quiet: Option<&dyn PromptQuiet>,
    cache: &mut ParameterCache,
    name: &ParameterName,
) -> Result<ParameterEntry, ResolveError> {
    if let Some(quiet) = quiet {
        quiet.pause();
    }
    let answer = prompt.ask(&format!("Enter value for {}", name)).await;
    if let Some(quiet) = quiet {
        quiet.resume();
    }

    let value = match answer.filter(|value| !value.is_empty()) {
        Some(value) => value,
        None => {
            let error = ResolveError::MissingValue { name: name.clone() };
            cache.record_failure(name, error.clone());
            return Err(error);
        }
    };

    provar_api::put_parameter(dispatch, &PutParameterRequest::secret(name.clone(), value.clone()))
        .await
        .map_err(ResolveError::transport)?;

    // Stored as a secret, reported as plain: downstream consumers must not
    // trip the legacy secure-string deprecation warning.
    let entry = ParameterEntry::plain(name.clone(), value);
    cache.insert_entry(entry.clone());
    info!(name = %name, "created parameter");
    Ok(entry)
}
