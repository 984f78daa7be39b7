//! The resolution queue: a single worker task that owns the cache and
//! executes resolutions strictly one at a time.
//!
//! Any number of callers may hold a [`ResolverHandle`]; their requests are
//! processed in enqueue order and never overlap in wall-clock time, so two
//! resolutions can never interleave their prompts or observe each other's
//! partially loaded state. One scheduling yield separates consecutive jobs,
//! letting error or prompt output from one resolution flush before the next
//! begins.

use std::sync::Arc;

use provar_api::ProviderDispatch;
use provar_types::{ParameterEntry, ResolveError};
use tokio::sync::{mpsc, oneshot};
use tracing::debug;

use crate::cache::ParameterCache;
use crate::prompt::{OperatorPrompt, PromptQuiet};
use crate::resolver::resolve_one;

struct ResolveJob {
    raw_name: String,
    reply: oneshot::Sender<Result<ParameterEntry, ResolveError>>,
}

/// Cloneable handle submitting resolutions to the worker.
#[derive(Clone)]
pub struct ResolverHandle {
    jobs: mpsc::UnboundedSender<ResolveJob>,
}

impl ResolverHandle {
    /// Resolve `name`, waiting for the worker to reach this request.
    ///
    /// Requests execute in FIFO enqueue order. A prior request's failure is
    /// returned to its own requester only and never aborts this one. There
    /// is no cancellation: once started, a resolution runs to completion or
    /// failure, including any wait on operator input.
    pub async fn resolve(&self, name: &str) -> Result<ParameterEntry, ResolveError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.jobs
            .send(ResolveJob {
                raw_name: name.to_string(),
                reply: reply_tx,
            })
            .map_err(|_| ResolveError::transport("resolver worker has shut down"))?;
        reply_rx
            .await
            .map_err(|_| ResolveError::transport("resolver worker dropped the request"))?
    }
}

/// Spawn the resolution worker and return a handle to it.
///
/// The worker owns the parameter cache for the process lifetime and exits
/// once every handle has been dropped.
pub fn spawn_resolver(
    dispatch: Arc<dyn ProviderDispatch>,
    prompt: Arc<dyn OperatorPrompt>,
    quiet: Option<Arc<dyn PromptQuiet>>,
) -> ResolverHandle {
    let (jobs_tx, jobs_rx) = mpsc::unbounded_channel();
    tokio::spawn(run_worker(dispatch, prompt, quiet, jobs_rx));
    ResolverHandle { jobs: jobs_tx }
}

async fn run_worker(
    dispatch: Arc<dyn ProviderDispatch>,
    prompt: Arc<dyn OperatorPrompt>,
    quiet: Option<Arc<dyn PromptQuiet>>,
    mut jobs: mpsc::UnboundedReceiver<ResolveJob>,
) {
    let mut cache = ParameterCache::new();
    while let Some(job) = jobs.recv().await {
        debug!(name = %job.raw_name, "resolution started");
        let result = resolve_one(
            dispatch.as_ref(),
            prompt.as_ref(),
            quiet.as_deref(),
            &mut cache,
            &job.raw_name,
        )
        .await;
        // The requester may have gone away; its outcome concerns nobody else.
        let _ = job.reply.send(result);
        // Scheduling gap between consecutive resolutions.
        tokio::task::yield_now().await;
    }
}
