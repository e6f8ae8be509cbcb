use crate::config::ReportConfig;
use crate::lmul::Lmul;
use crate::summary::Summary;
use std::io::{self, Write};

const RULE_WIDTH: usize = 70;

pub const TABLE_HEADER: [&str; 4] = ["Operation", "Best LMUL", "Worst LMUL", "Range"];

fn rule<W: Write>(w: &mut W, c: char) -> io::Result<()> {
    writeln!(w, "{}", c.to_string().repeat(RULE_WIDTH))
}

fn heading<W: Write>(w: &mut W, title: &str) -> io::Result<()> {
    writeln!(w)?;
    rule(w, '=')?;
    writeln!(w, "{}", title)?;
    rule(w, '=')
}

/// Cells of the Operation / Best / Worst / Range table, one row per operation.
pub fn summary_table_rows(summary: &Summary) -> Vec<[String; 4]> {
    summary
        .records
        .iter()
        .map(|r| {
            [
                r.operation.clone(),
                format!("{} ({:.2}x)", r.best_lmul, r.best_speedup),
                format!("{} ({:.2}x)", r.worst_lmul, r.worst_speedup),
                format!("{:.2}x", r.range_ratio),
            ]
        })
        .collect()
}

pub fn write_summary_table<W: Write>(w: &mut W, summary: &Summary) -> io::Result<()> {
    let rows = summary_table_rows(summary);
    let op_width = rows
        .iter()
        .map(|row| row[0].len())
        .chain(std::iter::once(TABLE_HEADER[0].len()))
        .max()
        .unwrap_or(0);
    writeln!(
        w,
        "{:<op$}  {:<14}  {:<14}  {}",
        TABLE_HEADER[0],
        TABLE_HEADER[1],
        TABLE_HEADER[2],
        TABLE_HEADER[3],
        op = op_width
    )?;
    for row in &rows {
        writeln!(
            w,
            "{:<op$}  {:<14}  {:<14}  {}",
            row[0],
            row[1],
            row[2],
            row[3],
            op = op_width
        )?;
    }
    Ok(())
}

/// Best/worst LMUL, range and per-LMUL efficiency for every operation.
pub fn write_operation_details<W: Write>(w: &mut W, summary: &Summary) -> io::Result<()> {
    for (series, record) in summary.series.iter().zip(summary.records.iter()) {
        writeln!(w)?;
        writeln!(w, "{}:", series.operation.to_uppercase())?;
        writeln!(w, "{}", "-".repeat(series.operation.len() + 2))?;
        writeln!(
            w,
            "  Best Performance: {} ({:.2}x speedup, {:.2}ms)",
            record.best_lmul, record.best_speedup, record.best_time_ms
        )?;
        writeln!(
            w,
            "  Worst Performance: {} ({:.2}x speedup, {:.2}ms)",
            record.worst_lmul, record.worst_speedup, record.worst_time_ms
        )?;
        writeln!(
            w,
            "  Performance Range: {:.2}x difference",
            record.range_ratio
        )?;
        writeln!(w, "  LMUL Efficiencies:")?;
        for row in &series.rows {
            writeln!(
                w,
                "    {}: {:.1}% (actual: {:.2}x, theoretical: {:.1}x)",
                row.lmul,
                row.efficiency,
                row.speedup,
                row.lmul.theoretical_scaling()
            )?;
        }
    }
    Ok(())
}

/// Best LMUL for each operation with the time and throughput it reaches there.
pub fn write_best_configurations<W: Write>(w: &mut W, summary: &Summary) -> io::Result<()> {
    writeln!(w, "\nPERFORMANCE SUMMARY BY OPERATION:")?;
    writeln!(w, "{}", "-".repeat(50))?;
    for record in &summary.records {
        writeln!(w, "\n{}:", record.operation)?;
        writeln!(
            w,
            "  * Best LMUL: {} ({:.2}x speedup)",
            record.best_lmul, record.best_speedup
        )?;
        writeln!(w, "  * Execution time: {:.3} ms", record.best_time_ms)?;
        writeln!(w, "  * Throughput: {:.1} MPix/sec", record.best_throughput)?;
    }
    Ok(())
}

fn write_recommendation<W: Write>(
    w: &mut W,
    label: &str,
    lmul: Option<Lmul>,
    threshold: f64,
) -> io::Result<()> {
    match lmul {
        Some(lmul) => writeln!(
            w,
            "  For {}: Use LMUL={} (maintains >{:.0}% efficiency)",
            label, lmul, threshold
        ),
        None => writeln!(
            w,
            "  For {}: no LMUL maintains >{:.0}% efficiency",
            label, threshold
        ),
    }
}

pub fn write_overall_analysis<W: Write>(
    w: &mut W,
    summary: &Summary,
    config: &ReportConfig,
) -> io::Result<()> {
    heading(w, "OVERALL ANALYSIS")?;
    if summary.records.is_empty() {
        return writeln!(w, "No benchmark results.");
    }
    let largest = Lmul::LARGEST;
    if let Some((op, speedup)) = summary.most_scalable() {
        writeln!(
            w,
            "Most LMUL-scalable operation: {} ({:.2}x with {})",
            op, speedup, largest
        )?;
    }
    if let Some((op, speedup)) = summary.least_scalable() {
        writeln!(
            w,
            "Least LMUL-scalable operation: {} ({:.2}x with {})",
            op, speedup, largest
        )?;
    }

    writeln!(w, "\nLMUL RECOMMENDATIONS:")?;
    for record in &summary.records {
        writeln!(
            w,
            "  {}: Use {} for optimal performance",
            record.operation, record.best_lmul
        )?;
    }

    writeln!(w, "\nAVERAGE EFFICIENCY BY LMUL:")?;
    for (lmul, eff) in &summary.mean_efficiency {
        writeln!(w, "  {}: {:.1}% average efficiency", lmul, eff)?;
    }

    writeln!(w, "\nOPTIMAL LMUL RECOMMENDATIONS:")?;
    match (summary.unanimous_best(), summary.max_performance_lmul()) {
        (Some(lmul), _) => writeln!(
            w,
            "  For MAXIMUM PERFORMANCE: Use LMUL={} for all operations",
            lmul
        )?,
        (None, Some(lmul)) => {
            let n = summary
                .records
                .iter()
                .filter(|r| r.best_lmul == lmul)
                .count();
            writeln!(
                w,
                "  For MAXIMUM PERFORMANCE: Use LMUL={} (best for {} of {} operations)",
                lmul,
                n,
                summary.records.len()
            )?
        }
        (None, None) => {}
    }
    write_recommendation(
        w,
        "BALANCED EFFICIENCY",
        summary.balanced_lmul(config.balanced_threshold),
        config.balanced_threshold,
    )?;
    write_recommendation(
        w,
        "CONSERVATIVE SCALING",
        summary.balanced_lmul(config.conservative_threshold),
        config.conservative_threshold,
    )?;

    writeln!(w, "\nPERFORMANCE RANGES:")?;
    if let Some(spread) = summary.speedup_spread(largest) {
        writeln!(
            w,
            "  LMUL={} speedup range: {:.2}x - {:.2}x",
            largest, spread.min, spread.max
        )?;
        writeln!(w, "  Average LMUL={} speedup: {:.2}x", largest, spread.mean)?;
    }
    if let Some(spread) = summary.throughput_spread(largest) {
        writeln!(
            w,
            "  Throughput range: {:.1} - {:.1} MPix/sec",
            spread.min, spread.max
        )?;
    }
    Ok(())
}

/// Per-operation details followed by the overall analysis.
pub fn write_detailed_analysis<W: Write>(
    w: &mut W,
    summary: &Summary,
    config: &ReportConfig,
) -> io::Result<()> {
    heading(w, "RISC-V VECTOR LMUL PERFORMANCE ANALYSIS")?;
    write_operation_details(w, summary)?;
    write_overall_analysis(w, summary, config)
}

pub fn to_json(summary: &Summary) -> serde_json::Result<String> {
    serde_json::to_string_pretty(summary)
}
