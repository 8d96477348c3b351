use std::path::PathBuf;

use cairn_ipc::Action;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(args_conflicts_with_subcommands = true)]
#[command(subcommand_value_name = "SUBCOMMAND")]
#[command(subcommand_help_heading = "Subcommands")]
pub struct Cli {
    /// Path to config file (default: `$XDG_CONFIG_HOME/cairn/config.kdl`).
    ///
    /// This can also be set with the `CAIRN_CONFIG` environment variable. If both are set, the
    /// command line argument takes precedence.
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    /// Path of the control socket to create.
    #[arg(long)]
    pub socket: Option<PathBuf>,

    #[command(subcommand)]
    pub subcommand: Option<Sub>,
}

#[derive(Subcommand)]
pub enum Sub {
    /// Communicate with the running cairn instance.
    Msg {
        #[command(subcommand)]
        msg: Msg,
        /// Format output as JSON.
        #[arg(short, long)]
        json: bool,
    },
    /// Validate the config file.
    Validate {
        /// Path to config file (default: `$XDG_CONFIG_HOME/cairn/config.kdl`).
        ///
        /// This can also be set with the `CAIRN_CONFIG` environment variable. If both are set,
        /// the command line argument takes precedence.
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

#[derive(Clone, Debug, Subcommand)]
pub enum Msg {
    /// Print the version of the running cairn instance.
    Version,
    /// List windows.
    Windows,
    /// List workspaces.
    Workspaces,
    /// Print information about the focused window.
    FocusedWindow,
    /// Perform an action.
    Action {
        #[command(subcommand)]
        action: Action,
    },
    /// Start continuously receiving events from the compositor.
    EventStream,
}
