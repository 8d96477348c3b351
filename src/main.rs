use std::env;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use cairn::animation::Clock;
use cairn::backend::{Headless, LoggingProtocol};
use cairn::cli::{Cli, Sub};
use cairn::ipc::client::handle_msg;
use cairn::ipc::server::IpcServer;
use cairn::state::State;
use cairn::utils::default_config_path;
use cairn_config::Config;
use calloop::EventLoop;
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "cairn=debug,info";

fn main() -> anyhow::Result<()> {
    let directives = env::var("RUST_LOG").unwrap_or_else(|_| DEFAULT_LOG_FILTER.to_owned());
    let env_filter = EnvFilter::builder().parse_lossy(directives);
    tracing_subscriber::fmt()
        .compact()
        .with_env_filter(env_filter)
        .init();

    let cli = Cli::parse();

    if let Some(subcommand) = cli.subcommand {
        match subcommand {
            Sub::Validate { config } => {
                let Some(path) = config_path(config) else {
                    bail!("no config path, pass --config or set $CAIRN_CONFIG");
                };
                if let Err(err) = Config::load(&path) {
                    warn!("{err:?}");
                    bail!("{} is not a valid config", path.display());
                }

                info!("config is valid");
                return Ok(());
            }
            Sub::Msg { msg, json } => {
                handle_msg(msg, json)?;
                return Ok(());
            }
        }
    }

    let _client = tracy_client::Client::start();
    info!("starting version {}", env!("CARGO_PKG_VERSION"));

    let path = config_path(cli.config);
    let config = load_config(path.as_deref());

    let mut event_loop = EventLoop::<State>::try_new().context("error creating event loop")?;
    let handle = event_loop.handle();

    let mut state = State::new(config, path, Box::new(LoggingProtocol), Clock::new());
    state.attach(handle.clone(), event_loop.get_signal());

    Headless::new().init(&mut state, &handle)?;
    state.start_config_watcher();

    match IpcServer::start(&handle, cli.socket) {
        Ok(server) => state.ipc_server = Some(server),
        Err(err) => warn!("error starting IPC server: {err:?}"),
    }

    event_loop
        .run(None, &mut state, |state| state.refresh_and_flush())
        .context("error running event loop")?;

    info!("exiting");
    Ok(())
}

/// Config path from the command line, then `$CAIRN_CONFIG`, then the default location.
fn config_path(cli_path: Option<PathBuf>) -> Option<PathBuf> {
    cli_path
        .or_else(|| env::var_os("CAIRN_CONFIG").map(PathBuf::from))
        .or_else(default_config_path)
}

fn load_config(path: Option<&Path>) -> Config {
    let Some(path) = path else {
        info!("no config path, using the default config");
        return Config::default();
    };
    if !path.exists() {
        info!("{} does not exist, using the default config", path.display());
        return Config::default();
    }

    match Config::load(path) {
        Ok(config) => {
            info!("loaded config from {}", path.display());
            config
        }
        Err(err) => {
            warn!("{err:?}");
            warn!("error loading config, using the default config");
            Config::default()
        }
    }
}
