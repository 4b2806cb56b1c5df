mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use commands::leads::{parse_date, parse_stage, FilterArgs, LeadFields};
use fv_core::attendance::AttendanceAction;
use fv_core::config::Config;
use fv_core::types::Stage;
use tracing::Instrument;

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

/// finvision CLI -- work the admissions pipeline from a terminal.
#[derive(Parser)]
#[command(name = "finvision", version, about)]
struct Cli {
    /// API base URL, e.g. http://localhost:5000/api (overrides config and FINVISION_API_URL).
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Config file (default: ~/.finvision/config.toml).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// More logging (-v debug, -vv trace).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Log as JSON lines on stderr.
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in and remember the session.
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "FINVISION_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Forget the stored session.
    Logout,
    /// Show the signed-in user.
    Whoami,
    /// Work with leads.
    #[command(subcommand)]
    Leads(LeadsCommand),
    /// Pipeline counts and conversion rate.
    Stats {
        #[command(flatten)]
        filter: FilterArgs,
        /// Day to count follow-ups for (default: today).
        #[arg(long, value_parser = parse_date)]
        date: Option<chrono::NaiveDate>,
    },
    /// Export CSV files.
    #[command(subcommand)]
    Export(ExportCommand),
    /// Download a full backup (admin).
    Backup {
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Restore a backup file (admin). Replaces all data.
    Restore {
        file: PathBuf,
        /// Skip both confirmation prompts.
        #[arg(long)]
        yes: bool,
    },
    /// Staff attendance.
    #[command(subcommand)]
    Attendance(AttendanceCommand),
}

#[derive(Subcommand)]
enum LeadsCommand {
    /// List leads as a table.
    List {
        #[command(flatten)]
        filter: FilterArgs,
    },
    /// Show leads grouped into pipeline lanes.
    Board {
        #[command(flatten)]
        filter: FilterArgs,
    },
    /// Show one lead with its remarks.
    Show { id: String },
    /// Add a new lead (stage defaults to Enquiry).
    Add {
        #[command(flatten)]
        fields: LeadFields,
        #[arg(long, value_parser = parse_stage)]
        stage: Option<Stage>,
    },
    /// Change a lead's fields.
    Edit {
        id: String,
        #[command(flatten)]
        fields: LeadFields,
    },
    /// Move a lead to another stage.
    Move {
        id: String,
        #[arg(value_parser = parse_stage)]
        stage: Stage,
        /// Skip the confirmation prompt.
        #[arg(long)]
        yes: bool,
    },
    /// Append a remark.
    Remark { id: String, text: String },
}

#[derive(Subcommand)]
enum ExportCommand {
    /// Filtered lead list as leads_<date>.csv.
    Leads {
        #[command(flatten)]
        filter: FilterArgs,
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// MIS summary as mis_<date>.csv.
    Mis {
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
enum AttendanceCommand {
    /// Today's check-in/check-out status.
    Status,
    /// Check in at the given position.
    CheckIn {
        #[arg(long, allow_negative_numbers = true)]
        lat: f64,
        #[arg(long, allow_negative_numbers = true)]
        lon: f64,
    },
    /// Check out at the given position.
    CheckOut {
        #[arg(long, allow_negative_numbers = true)]
        lat: f64,
        #[arg(long, allow_negative_numbers = true)]
        lon: f64,
    },
}

impl Commands {
    fn operation(&self) -> &'static str {
        match self {
            Commands::Login { .. } => "login",
            Commands::Logout => "logout",
            Commands::Whoami => "whoami",
            Commands::Leads(LeadsCommand::List { .. }) => "leads.list",
            Commands::Leads(LeadsCommand::Board { .. }) => "leads.board",
            Commands::Leads(LeadsCommand::Show { .. }) => "leads.show",
            Commands::Leads(LeadsCommand::Add { .. }) => "leads.add",
            Commands::Leads(LeadsCommand::Edit { .. }) => "leads.edit",
            Commands::Leads(LeadsCommand::Move { .. }) => "leads.move",
            Commands::Leads(LeadsCommand::Remark { .. }) => "leads.remark",
            Commands::Stats { .. } => "stats",
            Commands::Export(ExportCommand::Leads { .. }) => "export.leads",
            Commands::Export(ExportCommand::Mis { .. }) => "export.mis",
            Commands::Backup { .. } => "backup",
            Commands::Restore { .. } => "restore",
            Commands::Attendance(AttendanceCommand::Status) => "attendance.status",
            Commands::Attendance(AttendanceCommand::CheckIn { .. }) => "attendance.check_in",
            Commands::Attendance(AttendanceCommand::CheckOut { .. }) => "attendance.check_out",
        }
    }
}

async fn dispatch(ctx: &commands::Context, command: Commands) -> anyhow::Result<()> {
    let today = chrono::Local::now().date_naive();
    match command {
        Commands::Login { email, password } => commands::auth::login(ctx, &email, &password).await?,
        Commands::Logout => commands::auth::logout(ctx)?,
        Commands::Whoami => commands::auth::whoami(ctx)?,
        Commands::Leads(cmd) => match cmd {
            LeadsCommand::List { filter } => commands::leads::list(ctx, &filter).await?,
            LeadsCommand::Board { filter } => commands::leads::board(ctx, &filter).await?,
            LeadsCommand::Show { id } => commands::leads::show(ctx, &id).await?,
            LeadsCommand::Add { fields, stage } => {
                commands::leads::add(ctx, fields, stage).await?;
            }
            LeadsCommand::Edit { id, fields } => commands::leads::edit(ctx, &id, fields).await?,
            LeadsCommand::Move { id, stage, yes } => {
                commands::leads::move_stage(ctx, &id, stage, yes).await?
            }
            LeadsCommand::Remark { id, text } => commands::leads::remark(ctx, &id, &text).await?,
        },
        Commands::Stats { filter, date } => {
            commands::stats::run(ctx, &filter, date.unwrap_or(today)).await?;
        }
        Commands::Export(ExportCommand::Leads { filter, out }) => {
            commands::export::leads(ctx, &filter, out.as_deref(), today).await?;
        }
        Commands::Export(ExportCommand::Mis { out }) => {
            commands::export::mis(ctx, out.as_deref(), today).await?;
        }
        Commands::Backup { out } => {
            commands::backup::download(ctx, out.as_deref()).await?;
        }
        Commands::Restore { file, yes } => {
            commands::backup::upload(ctx, &file, yes).await?;
        }
        Commands::Attendance(AttendanceCommand::Status) => {
            commands::attendance::status(ctx).await?;
        }
        Commands::Attendance(AttendanceCommand::CheckIn { lat, lon }) => {
            commands::attendance::mark(ctx, AttendanceAction::CheckIn, lat, lon).await?
        }
        Commands::Attendance(AttendanceCommand::CheckOut { lat, lon }) => {
            commands::attendance::mark(ctx, AttendanceAction::CheckOut, lat, lon).await?
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    let level = fv_telemetry::logging::level_for_verbosity(cli.verbose, &config.general.log_level);
    if cli.json_logs {
        fv_telemetry::logging::init_logging_json(&config.general.app_name, &level);
    } else {
        fv_telemetry::logging::init_logging(&config.general.app_name, &level);
    }

    let ctx = commands::Context::new(config, cli.api_url.as_deref());
    let (span, trace_id) =
        fv_telemetry::tracing_setup::command_span(cli.command.operation(), &ctx.api_url);
    tracing::debug!(parent: &span, %trace_id, "dispatching command");

    let result = dispatch(&ctx, cli.command).instrument(span.clone()).await;
    fv_telemetry::tracing_setup::record_outcome(&span, result.is_ok());
    result
}
