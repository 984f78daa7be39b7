//! Parameter store client utilities.
//!
//! This module provides a lightweight client for the remote parameter store.
//! It focuses on:
//!
//! - The [`ProviderDispatch`] contract: every store interaction is a generic
//!   `(service, method, params)` request, which is what lets the engine wrap
//!   a dispatcher and intercept single-parameter reads
//! - Typed helpers ([`list_by_prefix`], [`put_parameter`]) layered over any
//!   dispatcher
//! - Constructing an HTTP dispatcher with sensible defaults
//! - Discovering credentials from `PROVAR_API_KEY` or `~/.netrc`
//! - Validating `PROVAR_API_BASE` for safety
//!
//! The primary entry point is [`HttpProviderDispatch`]. Create an instance
//! via [`HttpProviderDispatch::new_from_env`] and hand it to the engine as
//! an `Arc<dyn ProviderDispatch>`.

use std::time::Duration;
use std::{env, fs};

use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use reqwest::{Client, Url, header};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use provar_types::{ListByPrefixRequest, ParameterPage, PutParameterRequest};

/// Service identifier of the parameter store in dispatched requests.
pub const STORE_SERVICE: &str = "SSM";
/// Method name of the paginated bulk list operation.
pub const LIST_BY_PREFIX_METHOD: &str = "getParametersByPath";
/// Method name of the single-parameter upsert operation.
pub const PUT_PARAMETER_METHOD: &str = "putParameter";
/// Method name of the single-parameter read the engine intercepts.
pub const GET_PARAMETER_METHOD: &str = "getParameter";

/// Environment variable holding the store endpoint base URL.
pub const API_BASE_ENV_VAR: &str = "PROVAR_API_BASE";
/// Environment variable holding the bearer token.
pub const API_KEY_ENV_VAR: &str = "PROVAR_API_KEY";

/// Default public endpoint used when `PROVAR_API_BASE` is unset.
const DEFAULT_BASE_URL: &str = "https://params.provar.dev";
/// Netrc machine name checked for a stored token.
const NETRC_MACHINE: &str = "params.provar.dev";

/// Allowed hostnames or base domains for non-local configurations of
/// `PROVAR_API_BASE`. Subdomains of these domains are also allowed.
const ALLOWED_STORE_DOMAINS: &[&str] = &["provar.dev", "provar.io"];
/// Hostnames allowed for local development regardless of scheme.
const LOCALHOST_DOMAINS: &[&str] = &["localhost", "127.0.0.1"];

/// Errors surfaced by a dispatched store request. Requests are not retried;
/// failures propagate to whoever asked for the resolution.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// Connection, timeout, or protocol failure below the HTTP status line.
    #[error("store transport error: {0}")]
    Http(#[from] reqwest::Error),

    /// The store answered with a non-success status.
    #[error("store returned {status} for {service}.{method}: {body}")]
    Status {
        service: String,
        method: String,
        status: u16,
        body: String,
    },

    /// The store's reply did not match the expected shape.
    #[error("could not decode store response: {0}")]
    Decode(#[from] serde_json::Error),

    /// A resolution performed on behalf of an intercepted request failed.
    #[error(transparent)]
    Resolution(#[from] provar_types::ResolveError),
}

/// Generic passthrough request execution against the parameter store host.
///
/// The engine consumes this contract for its own list/put traffic and also
/// implements it, decorator-style, to intercept single-parameter reads while
/// forwarding everything else to the wrapped dispatcher.
#[async_trait]
pub trait ProviderDispatch: Send + Sync {
    async fn dispatch(&self, service: &str, method: &str, params: Value) -> Result<Value, DispatchError>;
}

/// Fetch one page of parameters under a path prefix via a dispatcher.
pub async fn list_by_prefix(dispatch: &dyn ProviderDispatch, request: &ListByPrefixRequest) -> Result<ParameterPage, DispatchError> {
    let params = serde_json::to_value(request)?;
    let reply = dispatch.dispatch(STORE_SERVICE, LIST_BY_PREFIX_METHOD, params).await?;
    Ok(serde_json::from_value(reply)?)
}

/// Upsert a single parameter via a dispatcher.
pub async fn put_parameter(dispatch: &dyn ProviderDispatch, request: &PutParameterRequest) -> Result<(), DispatchError> {
    let params = serde_json::to_value(request)?;
    dispatch.dispatch(STORE_SERVICE, PUT_PARAMETER_METHOD, params).await?;
    Ok(())
}

#[derive(Debug, Clone)]
/// Thin wrapper around a configured `reqwest::Client` for store access.
///
/// Requests are POSTed to the validated base URL with the target operation
/// named in the `X-Provar-Target` header and the parameter bag as the JSON
/// body. Authentication is read from the environment or the user's
/// `~/.netrc` file.
pub struct HttpProviderDispatch {
    pub base_url: String,
    pub http: Client,
    pub user_agent: String,
}

impl HttpProviderDispatch {
    /// Construct a dispatcher from environment variables and `~/.netrc`.
    ///
    /// Resolution order for authentication:
    /// - `PROVAR_API_KEY` environment variable
    /// - `~/.netrc` entry for `params.provar.dev` (login `api`, password = token)
    ///
    /// The base URL is taken from `PROVAR_API_BASE` (if set) or falls back to
    /// the default public endpoint. Non-localhost hosts must use HTTPS and be
    /// within an allowed domain.
    pub fn new_from_env() -> Result<Self> {
        let api_token = env::var(API_KEY_ENV_VAR).ok().or_else(get_netrc_token);

        let mut default_headers = header::HeaderMap::new();
        if let Some(api_token) = api_token {
            let authorization_header_value = format!("Bearer {}", api_token);
            default_headers.insert(
                header::AUTHORIZATION,
                header::HeaderValue::from_str(&authorization_header_value).context("authorization header value")?,
            );
        }
        default_headers.insert(header::CONTENT_TYPE, header::HeaderValue::from_static("application/json"));

        let http = Client::builder()
            .default_headers(default_headers)
            .timeout(Duration::from_secs(30))
            .build()
            .context("build http client")?;

        let base_url = env::var(API_BASE_ENV_VAR).unwrap_or_else(|_| DEFAULT_BASE_URL.into());

        validate_base_url(&base_url)?;
        Ok(Self {
            base_url,
            http,
            user_agent: format!("provar/0.1; {}", env::consts::OS),
        })
    }
}

#[async_trait]
impl ProviderDispatch for HttpProviderDispatch {
    async fn dispatch(&self, service: &str, method: &str, params: Value) -> Result<Value, DispatchError> {
        let target = format!("{}.{}", service, method);
        debug!(%target, base_url = %self.base_url, "dispatching store request");

        let response = self
            .http
            .post(&self.base_url)
            .header(header::USER_AGENT, &self.user_agent)
            .header("X-Provar-Target", &target)
            .json(&params)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DispatchError::Status {
                service: service.to_string(),
                method: method.to_string(),
                status: status.as_u16(),
                body,
            });
        }

        // Mutating operations may answer with an empty body.
        let body = response.text().await?;
        if body.trim().is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_str(&body)?)
    }
}

/// Validate that a base URL is acceptable for use by the dispatcher.
///
/// Rules:
/// - `localhost` or `127.0.0.1`: any scheme is allowed
/// - otherwise: scheme must be HTTPS, and host must be one of the allowed
///   store domains or a subdomain thereof
fn validate_base_url(base: &str) -> Result<()> {
    let parsed_base_url = Url::parse(base).map_err(|e| anyhow!("Invalid {} URL '{}': {}", API_BASE_ENV_VAR, base, e))?;

    let host_name = parsed_base_url
        .host_str()
        .ok_or_else(|| anyhow!("{} must include a host", API_BASE_ENV_VAR))?;

    // Local development allowances: localhost/127.0.0.1 with any scheme.
    if LOCALHOST_DOMAINS
        .iter()
        .any(|&allowed| host_name.eq_ignore_ascii_case(allowed))
    {
        return Ok(());
    }

    // Production: must be HTTPS and end with one of the allowed domains.
    if parsed_base_url.scheme() != "https" {
        return Err(anyhow!(
            "{} must use https for non-localhost hosts; got '{}://'",
            API_BASE_ENV_VAR,
            parsed_base_url.scheme()
        ));
    }

    let is_allowed_domain = ALLOWED_STORE_DOMAINS.iter().any(|&allowed_domain| {
        host_name.eq_ignore_ascii_case(allowed_domain) || host_name.ends_with(&format!(".{}", allowed_domain))
    });
    if !is_allowed_domain {
        return Err(anyhow!(
            "{} host '{}' is not allowed; must be one of {:?} or a subdomain, or localhost",
            API_BASE_ENV_VAR,
            host_name,
            ALLOWED_STORE_DOMAINS
        ));
    }

    Ok(())
}

/// Attempt to read an API token from the user's `~/.netrc` file.
///
/// This is a minimal parser adequate for bootstrapping and local usage. It
/// looks for an entry with `machine params.provar.dev`, `login api`, and then
/// treats the next long token after `password` as the API token.
fn get_netrc_token() -> Option<String> {
    let home = dirs_next::home_dir()?;
    let netrc_path = home.join(".netrc");
    let content = fs::read_to_string(netrc_path).ok()?;
    parse_netrc_for_store(&content)
}

/// Very small/naive `.netrc` parser that attempts to extract a store token.
///
/// The expected form is roughly:
///
/// ```text
/// machine params.provar.dev
///   login api
///   password <TOKEN>
/// ```
///
/// This function is intentionally minimal and forgiving to support common
/// developer setups without introducing a full parser dependency.
fn parse_netrc_for_store(content: &str) -> Option<String> {
    let mut is_store_machine = false;
    let mut saw_login_api = false;
    let mut saw_password_keyword = false;

    for token in content.split_whitespace() {
        match token {
            // Reset state at a new machine stanza
            "machine" => {
                is_store_machine = false;
                saw_login_api = false;
                saw_password_keyword = false;
            }
            // Identify the store machine stanza we care about
            NETRC_MACHINE => is_store_machine = true,
            // Track `login api`
            "login" if is_store_machine => {
                saw_login_api = true;
                saw_password_keyword = false;
            }
            // The literal `api` after login – nothing to store, just confirm
            "api" if saw_login_api && is_store_machine => {
                // no-op: confirms the intended login value
            }
            // See a `password` keyword inside the store machine stanza
            "password" if is_store_machine => {
                saw_password_keyword = true;
            }
            // Heuristically accept the next long token as the password/token
            other if is_store_machine && saw_password_keyword => {
                if other.len() > 20 {
                    return Some(other.to_string());
                }
                // reset if the value does not look like a token
                saw_password_keyword = false;
            }
            _ => {}
        }
    }
    None
}
