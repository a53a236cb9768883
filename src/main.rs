//! flowlink — node graph query service
//!
//! Usage:
//!   flowlink                                → serve using flowlink.toml / env / defaults
//!   flowlink serve --port 4000 --no-auth    → serve with overrides
//!   flowlink token -u alice -p admin        → issue a bearer token
//!   flowlink config > flowlink.toml         → write a default config file
//!   flowlink version                        → show version

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use flowlink_core::{expand_tilde, AuthMode, FlowlinkConfig};
use flowlink_gateway::{start_gateway, ResolvedAuth};
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(
    name = "flowlink",
    about = "Serve a node graph snapshot with on-demand reference resolution",
    version = env!("CARGO_PKG_VERSION"),
    long_about = "flowlink loads the node, trigger, action, response and resource\n\
                  template collections once at startup and answers `node(id)`\n\
                  queries, resolving references up to the requested selection.\n\
                  Default: serve on port 3000 with bearer-token auth."
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Path to the config file (TOML)
    #[arg(short, long, global = true, env = "FLOWLINK_CONFIG", default_value = "flowlink.toml")]
    config: String,

    /// Write logs to a file (in addition to stderr)
    #[arg(long, global = true)]
    log_file: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP query service
    Serve(ServeArgs),
    /// Issue a bearer token for the configured credentials
    Token {
        #[arg(short, long)]
        username: String,
        #[arg(short, long, env = "FLOWLINK_PASSWORD")]
        password: String,
    },
    /// Print a config file as TOML (defaults unless --resolved)
    Config {
        /// Print the config after applying the file and environment
        #[arg(long, default_value_t = false)]
        resolved: bool,
    },
    /// Show version
    Version,
}

#[derive(Args, Default)]
struct ServeArgs {
    /// Port for the gateway server
    #[arg(short, long)]
    port: Option<u16>,

    /// Bind mode: lan or loopback
    #[arg(short, long)]
    bind: Option<String>,

    /// Directory containing the collection files
    #[arg(short, long)]
    data_dir: Option<PathBuf>,

    /// Disable authentication
    #[arg(long, default_value_t = false)]
    no_auth: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Version) => {
            println!("flowlink v{}", env!("CARGO_PKG_VERSION"));
        }

        Some(Commands::Config { resolved }) => {
            let config = if resolved {
                load_config(&cli.config)?
            } else {
                FlowlinkConfig::default()
            };
            print!("{}", config.to_toml()?);
        }

        Some(Commands::Token { ref username, ref password }) => {
            let _guard = init_tracing(cli.log_file.as_deref())?;
            let config = load_config(&cli.config)?;
            let token = ResolvedAuth::from_config(&config.auth).login(username, password)?;
            println!("{}", token);
        }

        Some(Commands::Serve(ref args)) => {
            let _guard = init_tracing(cli.log_file.as_deref())?;
            serve(&cli.config, args).await?;
        }

        // No subcommand = serve with defaults
        None => {
            let _guard = init_tracing(cli.log_file.as_deref())?;
            serve(&cli.config, &ServeArgs::default()).await?;
        }
    }

    Ok(())
}

fn init_tracing(log_file: Option<&str>) -> anyhow::Result<Option<WorkerGuard>> {
    let (file_layer, guard) = match log_file {
        Some(path) => {
            let path = expand_tilde(path);
            let dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or(Path::new("."));
            let name = path
                .file_name()
                .with_context(|| format!("log file path has no file name: {}", path.display()))?;
            let appender = tracing_appender::rolling::never(dir, name);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "flowlink=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .with(file_layer)
        .init();
    Ok(guard)
}

/// File, then environment.
fn load_config(path: &str) -> anyhow::Result<FlowlinkConfig> {
    let mut config = FlowlinkConfig::load(&expand_tilde(path))?;
    config.apply_env()?;
    Ok(config)
}

async fn serve(config_path: &str, args: &ServeArgs) -> anyhow::Result<()> {
    let mut config = load_config(config_path)?;
    if let Some(port) = args.port {
        config.gateway.port = port;
    }
    if let Some(bind) = &args.bind {
        config.gateway.bind = bind.parse().map_err(anyhow::Error::msg)?;
    }
    if let Some(dir) = &args.data_dir {
        config.data.dir = dir.clone();
    }
    if args.no_auth {
        config.auth.mode = AuthMode::None;
    }
    start_gateway(config).await
}
