use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use heycycle_api::models::PortStates;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

use heycycle_server::app::AppContext;
use heycycle_server::configs::{Logger, SchemaManager, Settings, Storage};
use heycycle_server::run;
use heycycle_server::services::{StopSignal, default_steps, load_steps, save_steps};

/// Timed fog/plasma cycles on a cloud-connected power strip
#[derive(Parser, Debug)]
#[command(name = "heycycle", version, about)]
struct Cli {
    /// Directory holding default.toml and the RUN_MODE overlay
    #[arg(long, env = "HEYCYCLE_CONFIG_DIR", default_value = "configs")]
    config_dir: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the cycle loop in the foreground until the runtime is spent or Ctrl-C
    Run,
    /// Serve the start/stop control surface
    Serve,
    /// Make sure a valid token is cached, refreshing it if needed
    Token,
    /// List devices registered to the account
    Devices,
    /// Show the status document of a device
    Device {
        /// Defaults to cloud.device_id
        id: Option<String>,
    },
    /// Set the three ports once and record the change
    Apply {
        #[arg(long, action = clap::ArgAction::Set)]
        power1: bool,
        #[arg(long, action = clap::ArgAction::Set)]
        power2: bool,
        #[arg(long, action = clap::ArgAction::Set)]
        power3: bool,
    },
    /// Create the power_status table
    InitDb,
    /// Write the default step file
    InitSteps {
        /// Defaults to cycle.steps_path
        path: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let settings = Arc::new(
        Settings::from_dir(&cli.config_dir).context("Failed to load settings.")?,
    );

    let _guard = init_tracing(&settings.logger)?;

    match cli.command {
        Command::InitDb => init_db(&settings).await,
        Command::InitSteps { path } => {
            let path = path.unwrap_or_else(|| settings.cycle.steps_path.clone());
            save_steps(&path, &default_steps())?;
            Ok(())
        }
        command => {
            settings.validate()?;
            execute(command, &settings).await
        }
    }
}

async fn execute(command: Command, settings: &Arc<Settings>) -> anyhow::Result<()> {
    if let Command::Serve = command {
        return run(settings).await;
    }

    let context = AppContext::new(settings).await?;

    match command {
        Command::Run => {
            let steps = load_steps(&settings.cycle.steps_path)?;
            if steps.is_empty() {
                bail!("no steps in {}", settings.cycle.steps_path.display());
            }

            let stop = StopSignal::new();
            let signal = stop.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    tracing::info!("stop requested, finishing the current step");
                    signal.stop();
                }
            });

            let report = context
                .sequencer(settings)
                .run(&steps, settings.cycle.total_runtime(), &stop)
                .await?;

            tracing::info!(
                "cycle control ended: {:?}, {} steps executed over {} cycles",
                report.outcome,
                report.steps_executed,
                report.last_cycle_id
            );
        }
        Command::Token => {
            let token = context.token_service.get_valid_token().await?;

            match token.expires_at() {
                Some(expires_at) => println!("token valid until {expires_at}"),
                None => println!("token issued without expiry"),
            }
        }
        Command::Devices => {
            let token = context.token_service.get_valid_token().await?;
            let devices = context.client.devices(&token).await?;

            println!("{}", serde_json::to_string_pretty(&devices)?);
        }
        Command::Device { id } => {
            let token = context.token_service.get_valid_token().await?;
            let id = id.unwrap_or_else(|| settings.cloud.device_id.clone());
            let status = context.client.device(&token, &id).await?;

            println!("{}", serde_json::to_string_pretty(&status)?);
        }
        Command::Apply {
            power1,
            power2,
            power3,
        } => {
            let token = context.token_service.get_valid_token().await?;
            let states = PortStates::new(power1, power2, power3);
            let device_id = &settings.cloud.device_id;

            if !context.device_service.apply(&token, device_id, states).await {
                bail!("device {device_id} did not accept {states}");
            }

            context
                .status_service
                .record(device_id, states, &format!("Manual {states}"), None)
                .await;
        }
        Command::Serve | Command::InitDb | Command::InitSteps { .. } => {}
    }

    Ok(())
}

async fn init_db(settings: &Settings) -> anyhow::Result<()> {
    let storage = Storage::new(&settings.database)?;
    let schema = SchemaManager::default();

    storage.create_schema(&schema).await?;

    tracing::info!("tables ready: {}", schema.table_names().join(", "));

    Ok(())
}

fn init_tracing(logger: &Logger) -> anyhow::Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let app_name = env!("CARGO_PKG_NAME").replace('-', "_");
        let level = logger.level.as_str();

        format!("{app_name}={level},tower_http={level}").into()
    });

    let (file_layer, guard) = match &logger.file {
        Some(path) => {
            let directory = path
                .parent()
                .filter(|dir| !dir.as_os_str().is_empty())
                .unwrap_or_else(|| std::path::Path::new("."));
            let file_name = path
                .file_name()
                .with_context(|| format!("invalid log file {}", path.display()))?;

            std::fs::create_dir_all(directory)?;

            let appender = tracing_appender::rolling::never(directory, file_name);
            let (writer, guard) = tracing_appender::non_blocking(appender);

            (
                Some(fmt::layer().with_ansi(false).with_writer(writer)),
                Some(guard),
            )
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .with(file_layer)
        .init();

    Ok(guard)
}
