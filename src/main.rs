/// Version injected at compile time via AZBP_VERSION env var (set by CI/CD),
/// or "dev" for local builds.
pub const VERSION: &str = match option_env!("AZBP_VERSION") {
    Some(v) => v,
    None => "dev",
};

use anyhow::Result;
use azbp::arm::auth::AzureCredentials;
use azbp::arm::catalog::ArmCatalog;
use azbp::blueprint::BlueprintClient;
use azbp::commands::{assignment, blueprint};
use azbp::config::Config;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::fmt::writer::MakeWriterExt;

/// CLI for Azure Blueprints
#[derive(Parser, Debug)]
#[command(name = "azbp", version = VERSION, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// ARM endpoint override (sovereign clouds, local mocks)
    #[arg(long, global = true)]
    endpoint: Option<String>,

    /// Log level for debugging
    #[arg(long, value_enum, default_value = "off", global = true)]
    log_level: LogLevel,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Blueprint definitions and published versions
    Blueprint {
        #[command(subcommand)]
        command: BlueprintCommand,
    },
    /// Blueprint assignments in a subscription
    Assignment {
        #[command(subcommand)]
        command: AssignmentCommand,
    },
}

#[derive(Subcommand, Debug)]
enum BlueprintCommand {
    /// Fetch definitions, one published version, or the latest published version
    Get {
        /// Blueprint name(s); all definitions when omitted
        name: Vec<String>,

        /// Management group(s) to search; all visible groups when omitted
        #[arg(long = "management-group", short = 'g')]
        management_group: Vec<String>,

        /// Fetch this published version (requires name and a single group)
        #[arg(long, conflicts_with = "latest_published")]
        version: Option<String>,

        /// Fetch the most recently published version (requires name and a single group)
        #[arg(long)]
        latest_published: bool,
    },
}

#[derive(Subcommand, Debug)]
enum AssignmentCommand {
    /// Fetch assignments, all or by name
    Get {
        /// Assignment name(s); all assignments when omitted
        name: Vec<String>,

        /// Subscription id (defaults to config, then AZURE_SUBSCRIPTION_ID)
        #[arg(long, short = 's')]
        subscription: Option<String>,
    },
    /// Create or update an assignment
    Create {
        /// Assignment name
        name: String,

        /// Fully qualified id of the published blueprint to assign
        #[arg(long)]
        blueprint_id: String,

        #[arg(long, short = 's')]
        subscription: Option<String>,

        /// Region the assignment object lives in
        #[arg(long)]
        location: String,

        /// Parameter values as a JSON object, or @path to a JSON file
        #[arg(long)]
        parameters: Option<String>,

        /// Lock deployed resources against modification
        #[arg(long)]
        lock: bool,

        #[arg(long)]
        display_name: Option<String>,

        #[arg(long)]
        description: Option<String>,
    },
    /// Delete assignments by name
    Delete {
        /// Assignment name(s)
        name: Vec<String>,

        #[arg(long, short = 's')]
        subscription: Option<String>,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn to_tracing_level(self) -> Option<Level> {
        match self {
            LogLevel::Off => None,
            LogLevel::Error => Some(Level::ERROR),
            LogLevel::Warn => Some(Level::WARN),
            LogLevel::Info => Some(Level::INFO),
            LogLevel::Debug => Some(Level::DEBUG),
            LogLevel::Trace => Some(Level::TRACE),
        }
    }
}

fn setup_logging(level: LogLevel) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let tracing_level = level.to_tracing_level()?;

    let log_path = get_log_path();

    if let Some(parent) = log_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .expect("Failed to open log file");

    let (non_blocking, guard) = tracing_appender::non_blocking(file);

    tracing_subscriber::fmt()
        .with_max_level(tracing_level)
        .with_writer(non_blocking.with_max_level(tracing_level))
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true)
        .init();

    tracing::info!("azbp started with log level: {:?}", level);
    tracing::info!("Log file: {:?}", log_path);

    Some(guard)
}

fn get_log_path() -> PathBuf {
    if let Some(config_dir) = dirs::config_dir() {
        return config_dir.join("azbp").join("azbp.log");
    }
    if let Some(home) = dirs::home_dir() {
        return home.join(".azbp").join("azbp.log");
    }
    PathBuf::from("azbp.log")
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let _log_guard = setup_logging(args.log_level);

    let config = Config::load();
    let endpoint = config.effective_endpoint(args.endpoint.as_deref());
    let credentials = AzureCredentials::az_cli(&endpoint);
    let catalog = ArmCatalog::new(credentials, &endpoint)?;
    let client = BlueprintClient::new(catalog);

    match args.command {
        Command::Blueprint { command } => match command {
            BlueprintCommand::Get {
                name,
                management_group,
                version,
                latest_published,
            } => {
                blueprint::get(
                    &client,
                    blueprint::GetBlueprintArgs {
                        names: name,
                        management_groups: management_group,
                        version,
                        latest_published,
                    },
                    &config,
                )
                .await
            }
        },
        Command::Assignment { command } => match command {
            AssignmentCommand::Get { name, subscription } => {
                assignment::get(&client, name, subscription, &config).await
            }
            AssignmentCommand::Create {
                name,
                blueprint_id,
                subscription,
                location,
                parameters,
                lock,
                display_name,
                description,
            } => {
                assignment::create(
                    &client,
                    assignment::CreateAssignmentArgs {
                        name,
                        blueprint_id,
                        subscription,
                        location,
                        parameters,
                        lock,
                        display_name,
                        description,
                    },
                    &config,
                )
                .await
            }
            AssignmentCommand::Delete { name, subscription } => {
                assignment::delete(&client, name, subscription, &config).await
            }
        },
    }
}
