use std::num::NonZeroUsize;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use comfy_table::{presets::UTF8_FULL, Table};
use sipgen_core::config::CONFIG_FILE_NAME;
use sipgen_core::redirect::RedirectMappingService;
use sipgen_core::report::MigrationReportService;
use sipgen_core::run::{partition_by_destination, RunSummary};
use sipgen_core::{generate_sips, GenerationContext, ProjectConfig, RunOptions, RunSinks};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Generate deposit packages from a legacy collection export", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate SIPs for every indexed object in the project
    Generate(GenerateArgs),
    /// Load the project and report how records route to destinations
    Check(ProjectArgs),
}

#[derive(Args, Debug)]
struct ProjectArgs {
    /// Project directory containing sipgen.toml, or the config file itself
    #[arg(long, default_value = ".")]
    project: PathBuf,
    /// User authorizing the migration
    #[arg(long, env = "SIPGEN_USERNAME")]
    username: Option<String>,
}

#[derive(Args, Debug)]
struct GenerateArgs {
    #[command(flatten)]
    project: ProjectArgs,
    /// Skip objects with missing source files or descriptions instead of aborting
    #[arg(long)]
    force: bool,
    /// Maximum number of destinations generated at once
    #[arg(long, env = "SIPGEN_JOBS")]
    jobs: Option<NonZeroUsize>,
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Generate(args) => handle_generate(args),
        Command::Check(args) => handle_check(args),
    }
}

fn load_context(
    args: &ProjectArgs,
    force: bool,
    jobs: Option<NonZeroUsize>,
) -> Result<(ProjectConfig, GenerationContext)> {
    let config_path = if args.project.is_dir() {
        args.project.join(CONFIG_FILE_NAME)
    } else {
        args.project.clone()
    };
    let config = ProjectConfig::load(&config_path)
        .with_context(|| format!("failed to load {}", config_path.display()))?;

    let username = args
        .username
        .clone()
        .or_else(|| std::env::var("USER").ok())
        .context("--username (or SIPGEN_USERNAME) must be set")?;
    let options = RunOptions::new(username, force).with_max_parallel(jobs);

    let ctx = GenerationContext::load(&config, options)
        .context("failed to load generation context")?;
    Ok((config, ctx))
}

fn handle_generate(args: GenerateArgs) -> Result<()> {
    let (config, ctx) = load_context(&args.project, args.force, args.jobs)?;

    let redirects = RedirectMappingService::open(&config.redirect_mapping)
        .context("failed to open redirect mapping")?;
    let report = MigrationReportService::open(&config.report_dir)
        .context("failed to open migration report")?;

    let summary = generate_sips(
        &ctx,
        &config.sips_dir,
        RunSinks {
            redirects: &redirects,
            report: &report,
        },
    )
    .context("SIP generation failed")?;

    print_summary(&summary);
    info!(
        generated = summary.generated_count(),
        skipped = summary.skipped_count(),
        failed_destinations = summary.failures.len(),
        "SIP generation finished"
    );

    if !summary.is_success() {
        bail!(
            "{} destination(s) failed; see errors above",
            summary.failures.len()
        );
    }
    Ok(())
}

fn handle_check(args: ProjectArgs) -> Result<()> {
    let (config, ctx) = load_context(&args, false, None)?;

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["Destination", "Objects"]);
    for (dest_id, records) in partition_by_destination(&ctx) {
        table.add_row(vec![dest_id, records.len().to_string()]);
    }
    println!("Project {}: {} indexed records", config.project_name, ctx.index.len());
    println!("{table}");
    Ok(())
}

fn print_summary(summary: &RunSummary) {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["Destination", "Deposit", "Works", "Files", "Skipped"]);
    for sip in &summary.sips {
        table.add_row(vec![
            sip.dest_id.clone(),
            sip.deposit_id
                .map(|id| id.to_string())
                .unwrap_or_else(|| "-".to_string()),
            sip.generated.len().to_string(),
            sip.file_count.to_string(),
            sip.skipped.len().to_string(),
        ]);
    }
    println!("{table}");

    for sip in &summary.sips {
        for skipped in &sip.skipped {
            println!("Skipped {}: {}", skipped.legacy_id, skipped.reason);
        }
    }
    for failure in &summary.failures {
        eprintln!("Destination {} failed: {}", failure.dest_id, failure.error);
    }
}
