use anyhow::Result;
use clap::{Parser, Subcommand};
use scholar_digest::config::{find_config_file, load_config, Config};
use scholar_digest::service::PublicationService;
use scholar_digest::ui::{refresh_summary, RefreshProgress};
use scholar_digest::utils::{CacheStore, ProgressReporter};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Scholar Digest - aggregate and serve a Google Scholar author's publications
#[derive(Parser, Debug)]
#[command(name = "scholar-digest")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(author = "hongkongkiwi")]
#[command(about = "Aggregate an author's publications with abstracts and serve them over HTTP", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose logging (can be used multiple times: -v, -vv)
    #[arg(long, short, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(long, short, global = true)]
    quiet: bool,

    /// Configuration file path
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP API (default)
    Serve {
        /// Address to bind
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on
        #[arg(long, short)]
        port: Option<u16>,
    },

    /// Aggregate now and write the cache
    Refresh,

    /// Print the cache status as JSON
    Status,
}

fn init_tracing(cli: &Cli, config: &Config) {
    let level = if cli.quiet {
        "error".to_string()
    } else {
        match cli.verbose {
            0 => config.logging.level.clone(),
            1 => "debug".to_string(),
            _ => "trace".to_string(),
        }
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("scholar_digest={0},tower_http={0}", level)));

    let registry = tracing_subscriber::registry().with(filter);
    if config.logging.is_json() {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

async fn refresh(config: &Config, quiet: bool) -> Result<()> {
    let service = PublicationService::from_config(config)?;
    let (mut reporter, mut events) = ProgressReporter::channel(64);

    let display = tokio::spawn(async move {
        let progress = RefreshProgress::new(quiet);
        while let Some(event) = events.recv().await {
            progress.handle(&event);
        }
    });

    let result = service.refresh(&mut reporter).await;
    drop(reporter);
    if let Err(e) = display.await {
        tracing::warn!("Progress display stopped: {}", e);
    }

    let entry = result?;
    let written = service.cache().contains(&entry);
    if !written {
        eprintln!("Cache could not be written to {}", service.cache().path().display());
    }
    if !quiet {
        println!("{}", refresh_summary(&entry));
        if written {
            println!("Cache written to {}", service.cache().path().display());
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = cli.config.clone().or_else(find_config_file);
    let mut config = load_config(config_path.as_deref())?;

    init_tracing(&cli, &config);
    if let Some(path) = &config_path {
        tracing::info!("Using config file: {}", path.display());
    }

    match cli.command {
        None => scholar_digest::api::serve(&config).await,
        Some(Commands::Serve { host, port }) => {
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            scholar_digest::api::serve(&config).await
        }
        Some(Commands::Refresh) => refresh(&config, cli.quiet).await,
        Some(Commands::Status) => {
            let status = CacheStore::from_config(&config.cache).status();
            println!("{}", serde_json::to_string_pretty(&status)?);
            Ok(())
        }
    }
}
