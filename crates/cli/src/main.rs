//! `fleet`: command-line entry point for fleet-monitor.
//!
//! Without a subcommand the interactive UI starts. Subcommands run one
//! supervisor action (or one store edit) and exit.

mod commands;
mod output;

use clap::Parser;
use clap::Subcommand;
use color_eyre::eyre::eyre;
use fm_protocol::ipc::Op;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(name = "fleet", version, about = "Manage and monitor supervised processes")]
struct Cli {
    /// Settings file (defaults to $FLEET_CONFIG, then the per-user config dir)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Log at the configured level instead of warnings only
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Open the interactive UI (the default)
    Ui,
    /// Show daemon state and fleet totals
    Status,
    /// List declared processes with their live state
    List {
        /// Print the merged view as JSON
        #[arg(long)]
        json: bool,
    },
    /// Edit the declared process store
    #[command(subcommand)]
    Projects(ProjectsCommand),
    /// Start a declared process
    Start { name: String },
    /// Stop a process by name or id
    Stop { target: String },
    /// Restart a process by name or id
    Restart { target: String },
    /// Reload a process by name or id
    Reload { target: String },
    /// Remove a process from the supervisor, keeping its declaration
    Delete { target: String },
    /// Stop every supervised process
    StopAll,
    /// Restart every supervised process
    RestartAll,
    /// Control the supervisor daemon
    #[command(subcommand)]
    Daemon(DaemonCommand),
    /// Print recent log lines for a process
    Logs { target: String },
}

#[derive(Subcommand, Debug)]
enum ProjectsCommand {
    /// List declarations
    List,
    /// Declare a new process
    Add {
        name: String,
        /// Working directory
        path: String,
        /// Entry point, relative to the working directory or absolute
        script: String,
    },
    /// Forget a declaration, deleting the process from the supervisor if deployed
    Remove { name: String },
}

#[derive(Subcommand, Debug)]
enum DaemonCommand {
    /// Resurrect the daemon and its saved process list
    Start,
    /// Kill the daemon and every process it supervises
    Kill,
}

#[tokio::main]
async fn main() -> color_eyre::Result<ExitCode> {
    color_eyre::install()?;
    let cli = Cli::parse();

    let Some(command) = cli.command.filter(|c| !matches!(c, Commands::Ui)) else {
        fm_tui::run_app(cli.config)
            .await
            .map_err(|e| eyre!("{e:#}"))?;
        return Ok(ExitCode::SUCCESS);
    };

    let ctx = commands::Context::load(cli.config, cli.verbose)?;
    let ok = dispatch(&ctx, command).await?;
    Ok(if ok {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

/// Run a one-shot command. Returns `false` when it reported an error.
async fn dispatch(ctx: &commands::Context, command: Commands) -> color_eyre::Result<bool> {
    let ok = match command {
        Commands::Ui | Commands::Status => commands::status(ctx).await,
        Commands::List { json } => commands::list(ctx, json).await?,
        Commands::Projects(ProjectsCommand::List) => commands::projects_list(ctx),
        Commands::Projects(ProjectsCommand::Add { name, path, script }) => {
            commands::projects_add(ctx, &name, &path, &script)
        }
        Commands::Projects(ProjectsCommand::Remove { name }) => {
            commands::projects_remove(ctx, &name).await
        }
        Commands::Start { name } => commands::start(ctx, &name).await,
        Commands::Stop { target } => commands::control(ctx, Op::StopProcess { target }).await,
        Commands::Restart { target } => {
            commands::control(ctx, Op::RestartProcess { target }).await
        }
        Commands::Reload { target } => commands::control(ctx, Op::ReloadProcess { target }).await,
        Commands::Delete { target } => commands::control(ctx, Op::DeleteProcess { target }).await,
        Commands::StopAll => commands::control(ctx, Op::StopAll).await,
        Commands::RestartAll => commands::control(ctx, Op::RestartAll).await,
        Commands::Daemon(DaemonCommand::Start) => commands::control(ctx, Op::StartDaemon).await,
        Commands::Daemon(DaemonCommand::Kill) => commands::control(ctx, Op::KillDaemon).await,
        Commands::Logs { target } => commands::logs(ctx, &target).await,
    };
    Ok(ok)
}
