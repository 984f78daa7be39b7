use std::io::IsTerminal;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::Level;

use provar_api::{GET_PARAMETER_METHOD, HttpProviderDispatch, ProviderDispatch, STORE_SERVICE};
use provar_engine::{InteractivePrompt, InterceptingDispatch, NonInteractivePrompt, OperatorPrompt, spawn_resolver};

#[derive(Parser)]
#[command(name = "provar", version, about = "Resolve deploy-time parameters from the remote store")]
struct Cli {
    /// Never prompt, even on a terminal; missing parameters fail instead
    #[arg(long, global = true)]
    non_interactive: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Resolve parameter names, creating missing ones interactively
    Get {
        /// Parameter names; unqualified names are coerced to `/name`
        #[arg(required = true)]
        names: Vec<String>,
    },
    /// Issue a raw store request and print the JSON reply
    Request {
        service: String,
        method: String,
        /// Parameter bag as a JSON object
        params: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let store: Arc<dyn ProviderDispatch> =
        Arc::new(HttpProviderDispatch::new_from_env().context("configure store client")?);
    let prompt = select_prompt(cli.non_interactive);
    let resolver = spawn_resolver(Arc::clone(&store), prompt, None);
    let dispatch = InterceptingDispatch::new(store, resolver);

    match cli.command {
        Command::Get { names } => run_get(&dispatch, &names).await,
        Command::Request { service, method, params } => run_request(&dispatch, &service, &method, params.as_deref()).await,
    }
}

fn init_tracing() {
    let filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into());
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_max_level(Level::INFO)
        .try_init();
}

// Prompt selection happens once at startup; the engine never probes the
// terminal itself.
fn select_prompt(non_interactive: bool) -> Arc<dyn OperatorPrompt> {
    if non_interactive || !std::io::stdin().is_terminal() {
        Arc::new(NonInteractivePrompt)
    } else {
        Arc::new(InteractivePrompt)
    }
}

async fn run_get(dispatch: &InterceptingDispatch, names: &[String]) -> Result<()> {
    for name in names {
        let reply = dispatch
            .dispatch(STORE_SERVICE, GET_PARAMETER_METHOD, serde_json::json!({ "Name": name }))
            .await
            .with_context(|| format!("resolve {}", name))?;
        let parameter = &reply["Parameter"];
        println!(
            "{}={}",
            parameter["Name"].as_str().unwrap_or(name),
            parameter["Value"].as_str().unwrap_or_default()
        );
    }
    Ok(())
}

async fn run_request(dispatch: &InterceptingDispatch, service: &str, method: &str, params: Option<&str>) -> Result<()> {
    let params = match params {
        Some(raw) => serde_json::from_str(raw).context("parse request params as JSON")?,
        None => serde_json::Value::Object(serde_json::Map::new()),
    };
    let reply = dispatch.dispatch(service, method, params).await?;
    println!("{}", serde_json::to_string_pretty(&reply)?);
    Ok(())
}
