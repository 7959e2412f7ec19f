use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;

use intake_core::document::IntakeDocumentFetcher;
use intake_core::session::SessionId;
use intake_infrastructure::{ConfigService, IntakePaths};

mod app;
mod logging;
mod presenter;
mod render;
mod repl;

use app::App;
use repl::{LineReader, Outcome};

#[derive(Parser)]
#[command(name = "intake")]
#[command(about = "Clinic intake - conversational patient interviews", long_about = None)]
struct Cli {
    /// Path to config.toml (defaults to the platform config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Clinic backend base URL, overriding config and environment
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Mirror logs to stderr at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List appointments, newest first
    Appointments,
    /// Start an interview for an appointment from the initial complaint
    Interview {
        #[arg(long)]
        appointment: i64,
        /// Initial complaint; prompted for when omitted
        #[arg(long)]
        complaint: Option<String>,
    },
    /// Reopen the latest interview of an appointment
    Resume {
        #[arg(long)]
        appointment: i64,
    },
    /// Print the current intake document of an interview
    Show {
        #[arg(long)]
        interview: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let base = cli
        .config
        .as_deref()
        .and_then(Path::parent)
        .filter(|dir| !dir.as_os_str().is_empty());
    let paths = IntakePaths::new(base);
    let _log_guard = logging::init(&paths, cli.verbose)?;

    let mut config_service = ConfigService::new();
    if let Some(file) = &cli.config {
        config_service = config_service.with_config_file(file);
    }
    let mut config = config_service.get_config()?;
    if let Some(url) = cli.api_url {
        config.api_base_url = url;
    }
    tracing::debug!("[Main] Using backend {}", config.api_base_url);

    let app = App::new(config);

    match cli.command {
        Commands::Appointments => print_appointments(&app).await?,
        Commands::Interview {
            appointment,
            complaint,
        } => start_interview(&app, appointment, complaint).await?,
        Commands::Resume { appointment } => {
            let session = app.usecase().resume_interview(appointment).await?;
            let mut reader = LineReader::spawn(repl::new_prompt).await?;
            finish(&app, repl::run_interview(&app, &mut reader, session).await?).await?;
        }
        Commands::Show { interview } => {
            let document = app.fetcher().fetch(&SessionId::new(interview)).await?;
            for line in render::document_lines(&document) {
                println!("{line}");
            }
        }
    }

    Ok(())
}

async fn start_interview(app: &App, appointment: i64, complaint: Option<String>) -> Result<()> {
    let mut reader = LineReader::spawn(repl::new_prompt).await?;
    let complaint = match complaint {
        Some(text) => text,
        None => {
            println!("{}", "Describe what brings you in today.".bright_black());
            reader.read_line("Initial complaint >> ").await??
        }
    };

    let session = app.usecase().start_interview(appointment, &complaint).await?;
    println!("{}", format!("> {}", complaint.trim()).green());

    let outcome = repl::run_interview(app, &mut reader, session).await?;
    finish(app, outcome).await
}

async fn finish(app: &App, outcome: Outcome) -> Result<()> {
    if outcome == Outcome::Completed {
        println!("{}", "Interview completed. Back to appointments.".bright_green());
        println!();
        print_appointments(app).await?;
    }
    Ok(())
}

async fn print_appointments(app: &App) -> Result<()> {
    let appointments = app.usecase().list_appointments().await?;
    if appointments.is_empty() {
        println!("{}", "No appointments.".bright_black());
        return Ok(());
    }

    println!("{}", "=== Appointments ===".bright_magenta().bold());
    for appointment in &appointments {
        println!("{}", render::appointment_line(appointment));
    }
    Ok(())
}
