use anyhow::Context;
use clap::{Parser, Subcommand, Args, ValueEnum};
use doctor_finder::prelude::*;
use doctor_finder::config::{self, FinderConfig};
use doctor_finder::constants::DEFAULT_PANEL_FILE;
use doctor_finder::dataset;
use doctor_finder::export::{self, NO_MATCH_MESSAGE};
use std::io::{self, Write};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "docfinder")]
#[command(about = "Doctor Finder - look up doctors by specialty and region in a panel spreadsheet", long_about = None)]
struct Cli {
    /// Path to the panel file (.xlsx, .xls, .ods or .csv)
    #[arg(short, long, global = true, env = "DOCFINDER_DATA_PATH")]
    data: Option<PathBuf>,
    /// Path to a TOML config file (defaults to the user config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Skip rows that cannot be parsed instead of failing
    #[arg(long, global = true)]
    skip_invalid: bool,
    /// Hide the loading spinner
    #[arg(long, global = true)]
    no_progress: bool,
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Find doctors by specialty, optionally in one region
    Search(SearchArgs),
    /// Repeatedly prompt for a specialty and region
    Interactive,
    /// List the specialties in the panel
    Specialties,
    /// List the region selector values
    Regions,
    /// Show summary statistics for the panel
    Stats(StatsArgs),
    /// Write matching doctors to a JSON or CSV file
    Export(ExportArgs),
}

#[derive(Args)]
struct SearchArgs {
    /// Specialty, exact match (e.g. Cardiology)
    #[arg(short, long)]
    specialty: String,
    /// Region, exact match; omit or pass "All Regions" for every region
    #[arg(short, long)]
    region: Option<String>,
    /// Output format (defaults to the configured format)
    #[arg(long, value_enum)]
    format: Option<FormatOpt>,
}

#[derive(Args)]
struct StatsArgs {
    /// Also rank regions for this specialty
    #[arg(long)]
    specialty: Option<String>,
    /// Number of regions to rank
    #[arg(long, default_value_t = 5)]
    top: usize,
}

#[derive(Args)]
struct ExportArgs {
    /// Specialty, exact match
    #[arg(short, long)]
    specialty: String,
    /// Region, exact match
    #[arg(short, long)]
    region: Option<String>,
    /// Output file path
    #[arg(short, long)]
    output: PathBuf,
    /// Export format
    #[arg(long, value_enum, default_value_t = FormatOpt::Json)]
    format: FormatOpt,
}

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
enum FormatOpt {
    Table,
    Json,
    Csv,
}

impl From<FormatOpt> for OutputFormat {
    fn from(opt: FormatOpt) -> Self {
        match opt {
            FormatOpt::Table => OutputFormat::Table,
            FormatOpt::Json => OutputFormat::Json,
            FormatOpt::Csv => OutputFormat::Csv,
        }
    }
}

fn main() {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter)).init();

    if let Err(err) = run(cli) {
        let (message, code) = match err.downcast_ref::<FinderError>() {
            Some(finder_error) => (finder_error.user_message(), finder_error.exit_code()),
            None => (format!("{:#}", err), 1),
        };
        eprintln!("Error: {}", message);
        std::process::exit(code);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = load_config(&cli)?;
    let max_rows = config.max_rows_per_group;
    let default_format = config.default_output_format;
    let data_path = cli.data.clone()
        .or_else(|| config.data_path.clone())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_PANEL_FILE));
    config::set_global_config(config);

    let panel = dataset::load_cached(&data_path)?;

    match cli.command {
        Commands::Search(args) => cmd_search(panel, args, default_format, max_rows),
        Commands::Interactive => cmd_interactive(panel, max_rows),
        Commands::Specialties => print_lines(&panel.specialties()),
        Commands::Regions => print_lines(&panel.region_options()),
        Commands::Stats(args) => cmd_stats(panel, args),
        Commands::Export(args) => cmd_export(panel, args),
    }
}

fn load_config(cli: &Cli) -> anyhow::Result<FinderConfig> {
    let mut config = match &cli.config {
        Some(path) => FinderConfig::from_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?
            .with_env_overrides(),
        None => FinderConfig::load()?,
    };
    if cli.skip_invalid {
        config.skip_invalid_records = true;
    }
    if cli.no_progress {
        config.enable_progress_bar = false;
    }
    Ok(config)
}

fn cmd_search(
    panel: &PanelDataset,
    args: SearchArgs,
    default_format: OutputFormat,
    max_rows: Option<usize>,
) -> anyhow::Result<()> {
    let results = panel.search(&args.specialty, args.region.as_deref())?;
    if results.is_no_match() {
        eprintln!("Warning: {}", NO_MATCH_MESSAGE);
        return Ok(());
    }

    let format = args.format.map(OutputFormat::from).unwrap_or(default_format);
    let stdout = io::stdout();
    let mut out = stdout.lock();
    export::exporter_for(format, max_rows).write_results(&results, &mut out)?;
    out.flush()?;
    Ok(())
}

fn cmd_interactive(panel: &PanelDataset, max_rows: Option<usize>) -> anyhow::Result<()> {
    let stdin = io::stdin();
    let summary = Session::new(panel)
        .with_max_rows(max_rows)
        .run(stdin.lock(), io::stdout())?;
    log::info!("{} searches, {} without matches", summary.searches, summary.no_match);
    Ok(())
}

fn cmd_stats(panel: &PanelDataset, args: StatsArgs) -> anyhow::Result<()> {
    let analytics = panel.analytics();
    analytics.panel_stats().print_summary();

    if let Some(specialty) = args.specialty.as_deref() {
        println!("\nTop regions for {}:", specialty);
        for (region, count) in analytics.top_regions_for_specialty(specialty, args.top) {
            println!("  {}: {}", region, count);
        }
    }

    let duplicates = analytics.duplicate_npis();
    if !duplicates.is_empty() {
        println!("\nNPIs on more than one row: {}", duplicates.len());
    }
    if panel.skipped_rows > 0 {
        println!("Rows skipped while loading: {}", panel.skipped_rows);
    }
    Ok(())
}

fn cmd_export(panel: &PanelDataset, args: ExportArgs) -> anyhow::Result<()> {
    let results = panel.search(&args.specialty, args.region.as_deref())?;
    if results.is_no_match() {
        eprintln!("Warning: {}", NO_MATCH_MESSAGE);
        return Ok(());
    }

    export::export_to_file(&results, &args.output, args.format.into())?;
    println!("Exported {} doctors to {}", results.total_rows(), args.output.display());
    Ok(())
}

fn print_lines(values: &[&str]) -> anyhow::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    for value in values {
        writeln!(out, "{}", value)?;
    }
    Ok(())
}
