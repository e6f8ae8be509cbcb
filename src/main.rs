use clap::Parser;
use lmul_report::config::ReportConfig;
use lmul_report::{datasets, plot, report, summarize};
use std::io::{self, Write};
use std::path::PathBuf;
use tracing::info;

/// Generate RISC-V Vector LMUL performance analysis
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// CSV (or .json) file with benchmark results
    #[arg(long, default_value = datasets::DEFAULT_CSV)]
    csv: PathBuf,

    /// Output image file
    #[arg(long, default_value = "lmul_performance_dashboard.png")]
    output: PathBuf,

    /// Do not display the plot
    #[arg(long)]
    no_display: bool,

    /// Also write the computed summary as JSON
    #[arg(long)]
    json: Option<PathBuf>,

    /// JSON file overriding report thresholds and figure size
    #[arg(long)]
    config: Option<PathBuf>,

    /// Set the log level
    #[arg(short, long, default_value = "info")]
    log_level: String,
}

fn run(args: &Args) -> lmul_report::Result<()> {
    let config = ReportConfig::load_or_default(args.config.as_deref())?;
    let observations = datasets::load(&args.csv)?;
    let summary = summarize(&observations)?;
    info!(operations = summary.records.len(), "summarized");

    plot::render(&summary, &config, &args.output)?;
    println!("Performance dashboard saved as: {}", args.output.display());

    let stdout = io::stdout();
    let mut out = stdout.lock();
    report::write_detailed_analysis(&mut out, &summary, &config)?;
    writeln!(out)?;
    report::write_summary_table(&mut out, &summary)?;

    if let Some(path) = &args.json {
        std::fs::write(path, report::to_json(&summary).map_err(io::Error::from)?)?;
        info!(path = %path.display(), "summary written");
    }
    if !args.no_display {
        lmul_report::display(&args.output);
    }
    Ok(())
}

fn main() {
    let args = Args::parse();
    lmul_report::init_logging(&args.log_level);
    if let Err(e) = run(&args) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
