//! Request interception: answer single-parameter reads from the resolver.

use std::sync::Arc;

use async_trait::async_trait;
use provar_api::{DispatchError, GET_PARAMETER_METHOD, ProviderDispatch, STORE_SERVICE};
use provar_types::ResolveError;
use serde_json::{Value, json};
use tracing::debug;

use crate::queue::ResolverHandle;

/// Decorator around a host's dispatch capability.
///
/// Requests for a single parameter are routed through the resolution queue
/// and answered as `{"Parameter": <entry>}`; every other request is
/// forwarded to the wrapped dispatcher unmodified. The host composes this
/// explicitly, so callers keep issuing `(service, method, params)` requests
/// exactly as before.
pub struct InterceptingDispatch {
    inner: Arc<dyn ProviderDispatch>,
    resolver: ResolverHandle,
}

impl InterceptingDispatch {
    pub fn new(inner: Arc<dyn ProviderDispatch>, resolver: ResolverHandle) -> Self {
        Self { inner, resolver }
    }
}

#[async_trait]
impl ProviderDispatch for InterceptingDispatch {
    async fn dispatch(&self, service: &str, method: &str, params: Value) -> Result<Value, DispatchError> {
        if service == STORE_SERVICE && method == GET_PARAMETER_METHOD {
            let name = params
                .get("Name")
                .and_then(Value::as_str)
                .ok_or_else(|| ResolveError::InvalidRequest {
                    reason: format!("{} request is missing a string Name", GET_PARAMETER_METHOD),
                })?;
            debug!(name, "intercepted single-parameter read");
            let entry = self.resolver.resolve(name).await?;
            return Ok(json!({ "Parameter": entry }));
        }

        self.inner.dispatch(service, method, params).await
    }
}
