//! CLI for managing Heimdall access tokens.
//!
//! Each command runs one dispatcher action against the API, streams the
//! emitted signals to an optional NDJSON sink, and prints a report.

use clap::{Parser, Subcommand};
use heimdall_core::{AccessToken, AppRef, Query, Signal};
use heimdall_dispatcher::reporter::Report;
use heimdall_dispatcher::{
    AccessTokenDispatcher, ChannelStore, JsonStreamStore, RecordingNavigator,
};
use heimdall_provider::{HttpTokenService, TokenService};
use std::io::Write;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc::UnboundedReceiver;

#[derive(Parser, Debug)]
#[command(name = "heimdall-tokens", version, about = "Manage Heimdall access tokens")]
struct Cli {
    /// Base URL of the Heimdall API, e.g. http://localhost:9090
    #[arg(short, long, env = "HEIMDALL_API_URL")]
    api_url: String,

    #[arg(short, long, env = "HEIMDALL_USERNAME")]
    username: Option<String>,

    #[arg(short, long, env = "HEIMDALL_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    /// Sink output: "ndjson" writes signals as NDJSON to stdout,
    /// "ndjson:/path/to/file" writes to file.
    #[arg(long, global = true)]
    sink: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List one page of access tokens.
    List {
        #[arg(long, default_value_t = 0)]
        offset: u64,

        #[arg(long, default_value_t = 10)]
        limit: u64,
    },

    /// Show one access token.
    Get { id: u64 },

    /// Create an access token.
    Create {
        #[arg(long)]
        code: String,

        #[arg(long)]
        app_id: u64,

        #[arg(long)]
        expired_date: Option<String>,

        #[arg(long, default_value = "ACTIVE")]
        status: String,
    },

    /// Change fields of an existing access token.
    Update {
        id: u64,

        #[arg(long)]
        code: Option<String>,

        #[arg(long)]
        app_id: Option<u64>,

        #[arg(long)]
        expired_date: Option<String>,

        #[arg(long)]
        status: Option<String>,
    },

    /// Delete an access token and reload the page at `offset`.
    Remove {
        id: u64,

        #[arg(long, default_value_t = 0)]
        offset: u64,
    },
}

impl Commands {
    fn label(&self) -> String {
        match self {
            Commands::List { offset, limit } => format!("list {offset}+{limit}"),
            Commands::Get { id } => format!("get {id}"),
            Commands::Create { code, .. } => format!("create {code}"),
            Commands::Update { id, .. } => format!("update {id}"),
            Commands::Remove { id, .. } => format!("remove {id}"),
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let t0 = Instant::now();
    let label = cli.command.label();

    let sink = match cli.sink.as_deref() {
        None => None,
        Some(spec) => Some(open_sink(spec)?),
    };

    let mut service = HttpTokenService::connect(&cli.api_url)?;
    if let Some(username) = cli.username {
        service = service.with_credentials(username, cli.password.unwrap_or_default());
    }
    let service = Arc::new(service);

    let (store, rx) = ChannelStore::new();
    let collector = tokio::spawn(collect(rx, sink));
    let navigator = Arc::new(RecordingNavigator::new());
    let dispatcher =
        AccessTokenDispatcher::new(service.clone(), Arc::new(store), navigator.clone());

    tracing::info!(api_url = %cli.api_url, command = %label, "starting");

    let outcome = run(&dispatcher, service.as_ref(), cli.command).await;

    // Closing the last sender ends the collector.
    drop(dispatcher);
    let (signals, rows) = collector.await??;
    if let Some(rows) = rows {
        tracing::info!(rows, "ndjson sink: wrote signals");
    }

    let report = Report::build(label, &signals, navigator.paths(), t0.elapsed());
    if cli.sink.is_some() {
        // Keep stdout clean for NDJSON.
        eprint!("{}", report.render());
    } else {
        print!("{}", report.render());
    }

    outcome?;
    if report.has_errors() {
        return Err("request rejected by the API".into());
    }
    Ok(())
}

async fn run(
    dispatcher: &AccessTokenDispatcher,
    service: &dyn TokenService,
    command: Commands,
) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Commands::List { offset, limit } => {
            let query = Query::new(offset, limit)?;
            dispatcher.start_loading();
            dispatcher.list_tokens(query).await?;
        }
        Commands::Get { id } => {
            dispatcher.get_token(id).await;
        }
        Commands::Create {
            code,
            app_id,
            expired_date,
            status,
        } => {
            let token = AccessToken {
                code: Some(code),
                app: Some(AppRef::new(app_id)),
                expired_date,
                status: Some(status),
                ..AccessToken::default()
            };
            dispatcher.start_loading();
            dispatcher.save_token(&token).await;
        }
        Commands::Update {
            id,
            code,
            app_id,
            expired_date,
            status,
        } => {
            let mut token = service.get(id).await?;
            if let Some(code) = code {
                token.code = Some(code);
            }
            if let Some(app_id) = app_id {
                token.app = Some(AppRef::new(app_id));
            }
            if let Some(expired_date) = expired_date {
                token.expired_date = Some(expired_date);
            }
            if let Some(status) = status {
                token.status = Some(status);
            }
            dispatcher.start_loading();
            dispatcher.update_token(&token).await;
        }
        Commands::Remove { id, offset } => {
            dispatcher.start_loading();
            dispatcher.remove_token(id, offset).await?;
        }
    }
    Ok(())
}

type SinkStore = JsonStreamStore<Box<dyn Write + Send>>;

fn open_sink(spec: &str) -> Result<SinkStore, Box<dyn std::error::Error>> {
    let writer: Box<dyn Write + Send> = if spec == "ndjson" {
        Box::new(std::io::stdout())
    } else if let Some(path) = spec.strip_prefix("ndjson:") {
        tracing::info!(path, "ndjson sink: writing to file");
        Box::new(std::fs::File::create(path)?)
    } else {
        return Err(format!("Unknown sink: {spec}. Use 'ndjson' or 'ndjson:/path'").into());
    };
    Ok(JsonStreamStore::new(writer))
}

/// Drain the store channel, streaming each signal to the sink as it arrives.
async fn collect(
    mut rx: UnboundedReceiver<Signal>,
    sink: Option<SinkStore>,
) -> std::io::Result<(Vec<Signal>, Option<usize>)> {
    let mut signals = Vec::new();
    while let Some(signal) = rx.recv().await {
        if let Some(sink) = &sink {
            sink.write_signal(&signal)?;
            sink.flush()?;
        }
        signals.push(signal);
    }

    let rows = sink.map(JsonStreamStore::finish).transpose()?;
    Ok((signals, rows))
}
