use clap::Parser;
use lmul_report::config::ReportConfig;
use lmul_report::plot::{self, Figure};
use lmul_report::{datasets, report, summarize};
use std::io::{self, Write};
use std::path::PathBuf;
use tracing::info;

const TITLE: &str =
    "RISC-V Vector LMUL Performance Analysis - Complete Results, All Image Processing Operations";

/// Complete RISC-V Vector LMUL analysis of the five reference image processing kernels
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Output image file
    #[arg(long, default_value = "complete_lmul_analysis.png")]
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
    let config = ReportConfig::load_or_default(args.config.as_deref())?
        .with_default_title(TITLE);
    let summary = summarize(&datasets::sample())?;

    plot::render_figure(Figure::CompleteAnalysis, &summary, &config, &args.output)?;
    println!(
        "Complete LMUL analysis saved as '{}'",
        args.output.display()
    );

    let stdout = io::stdout();
    let mut out = stdout.lock();
    writeln!(out, "\n{}", "=".repeat(80))?;
    writeln!(out, "COMPREHENSIVE RISC-V VECTOR LMUL ANALYSIS RESULTS")?;
    writeln!(out, "{}", "=".repeat(80))?;
    report::write_best_configurations(&mut out, &summary)?;
    report::write_overall_analysis(&mut out, &summary, &config)?;

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
