// src/main.rs
use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use shiftaudit_core::{
    config::{AppConfig, PolicyOverrides},
    report::{self, daily_output_paths, mtd_output_path},
    server,
    timestamps::parse_date,
    AuditInputs, ScheduleSource, ShiftAudit,
};

#[derive(Parser)]
#[command(name = "shiftaudit")]
#[command(about = "Classify drivers as On Time, Late, Early End or Not On Job from vehicle and activity logs")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify every driver for a single date
    Daily {
        /// Target date (YYYY-MM-DD or MM/DD/YYYY)
        #[arg(long)]
        date: String,

        #[command(flatten)]
        inputs: InputArgs,

        #[command(flatten)]
        policy: PolicyArgs,

        /// Directory for summary_<date>.json and drivers_<date>.csv (default from config)
        #[arg(long)]
        out_dir: Option<PathBuf>,
    },

    /// Month-to-date roll-up from the 1st of the month through --through
    Mtd {
        /// Last date included (YYYY-MM-DD or MM/DD/YYYY)
        #[arg(long)]
        through: String,

        #[command(flatten)]
        inputs: InputArgs,

        #[command(flatten)]
        policy: PolicyArgs,

        /// Directory for mtd_<date>.json (default from config)
        #[arg(long)]
        out_dir: Option<PathBuf>,
    },

    /// Serve the audit over HTTP
    Serve {
        /// Override SHIFTAUDIT_SERVER_HOST
        #[arg(long)]
        host: Option<String>,

        /// Override SHIFTAUDIT_SERVER_PORT
        #[arg(long)]
        port: Option<u16>,
    },
}

#[derive(Args)]
struct InputArgs {
    /// Vehicle event log CSV (driver, asset, timestamp, event type)
    #[arg(long)]
    events: PathBuf,

    /// Activity log CSV (driver, asset, location, start, end)
    #[arg(long)]
    activity: PathBuf,

    /// Optional roster CSV listing drivers expected on the job
    #[arg(long)]
    roster: Option<PathBuf>,
}

#[derive(Args)]
struct PolicyArgs {
    /// Scheduled shift start, e.g. 07:00
    #[arg(long)]
    shift_start: Option<String>,

    /// Scheduled shift end, e.g. 17:00
    #[arg(long)]
    shift_end: Option<String>,

    /// Minutes after shift start still counted on time
    #[arg(long)]
    late_tolerance: Option<u32>,

    /// Minutes before shift end still counted on time
    #[arg(long)]
    early_tolerance: Option<u32>,

    /// Where shift bounds come from: fixed or activity_log
    #[arg(long)]
    schedule_source: Option<String>,
}

impl PolicyArgs {
    fn overrides(&self) -> Result<PolicyOverrides> {
        let schedule_source = self
            .schedule_source
            .as_deref()
            .map(str::parse::<ScheduleSource>)
            .transpose()?;
        Ok(PolicyOverrides {
            shift_start: self.shift_start.clone(),
            shift_end: self.shift_end.clone(),
            late_tolerance_minutes: self.late_tolerance,
            early_tolerance_minutes: self.early_tolerance,
            schedule_source,
        })
    }
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn target_date(raw: &str) -> Result<NaiveDate> {
    parse_date(raw).with_context(|| format!("Invalid date '{}'", raw))
}

fn build_audit(config: &AppConfig, inputs: &InputArgs, policy: &PolicyArgs) -> Result<ShiftAudit> {
    let base = config.policy().context("Invalid shift policy in configuration")?;
    let policy = policy.overrides()?.apply(&base)?;
    info!(
        "Shift {}-{} (late tolerance {}m, early tolerance {}m, {:?} schedule)",
        policy.start.format("%H:%M"),
        policy.end.format("%H:%M"),
        policy.late_tolerance_minutes,
        policy.early_tolerance_minutes,
        policy.schedule_source
    );

    let loaded = AuditInputs::load(&inputs.events, &inputs.activity, inputs.roster.as_deref())
        .context("Loading input logs failed")?;
    Ok(ShiftAudit::new(loaded, policy)?)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let mut config = AppConfig::from_env().context("Loading configuration failed")?;
    info!("App configuration loaded.");

    match cli.command {
        Commands::Daily {
            date,
            inputs,
            policy,
            out_dir,
        } => {
            let date = target_date(&date)?;
            let audit = build_audit(&config, &inputs, &policy)?;
            let daily = audit.daily(date);

            let out_dir = out_dir.unwrap_or_else(|| config.output_dir.clone());
            let (json_path, csv_path) = daily_output_paths(&out_dir, date);
            report::write_json(&json_path, &daily)?;
            report::write_detail_csv(&csv_path, &daily)?;

            if !daily.issues.is_empty() {
                warn!("{} input rows skipped; see 'issues' in {}", daily.issues.len(), json_path.display());
            }
            print!("{}", report::render_summary(&daily.summary));
        }
        Commands::Mtd {
            through,
            inputs,
            policy,
            out_dir,
        } => {
            let through = target_date(&through)?;
            let audit = build_audit(&config, &inputs, &policy)?;
            let mtd = audit.month_to_date(through)?;

            let out_dir = out_dir.unwrap_or_else(|| config.output_dir.clone());
            report::write_json(&mtd_output_path(&out_dir, through), &mtd)?;
            print!("{}", report::render_mtd(&mtd.summary));
        }
        Commands::Serve { host, port } => {
            if let Some(host) = host {
                config.server_host = host;
            }
            if let Some(port) = port {
                config.server_port = port;
            }
            server::serve(&config).await.context("HTTP server failed")?;
        }
    }

    Ok(())
}
