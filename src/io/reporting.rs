// src/io/reporting.rs

use crate::error::RestockError;
use crate::simulation::engine::{DayRecord, ItemSummary};
use serde::Serialize;
use std::fmt::Write as _;
use std::io::Write;
use std::path::Path;
use tracing::info;

/// Serializes records as CSV into any writer.
pub fn write_records<W: Write, T: Serialize>(writer: W, records: &[T]) -> Result<(), RestockError> {
    let mut wtr = csv::Writer::from_writer(writer);
    for record in records {
        wtr.serialize(record)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Renders records as CSV in memory.
pub fn to_csv_bytes<T: Serialize>(records: &[T]) -> Result<Vec<u8>, RestockError> {
    let mut buffer = Vec::new();
    write_records(&mut buffer, records)?;
    Ok(buffer)
}

/// Writes the simulation history to a CSV file.
///
/// # Arguments
/// * `file_path` - The path to save the file (e.g., "results/eoq_daily.csv").
/// * `data` - The day records produced by the warehouse.
pub fn write_simulation_log(file_path: impl AsRef<Path>, data: &[DayRecord]) -> Result<(), RestockError> {
    let path = file_path.as_ref();
    write_records(std::fs::File::create(path)?, data)?;
    info!(rows = data.len(), path = %path.display(), "exported daily log");
    Ok(())
}

/// Writes the per-item end-of-run summary to a CSV file.
pub fn write_summary(file_path: impl AsRef<Path>, data: &[ItemSummary]) -> Result<(), RestockError> {
    let path = file_path.as_ref();
    write_records(std::fs::File::create(path)?, data)?;
    info!(rows = data.len(), path = %path.display(), "exported summary");
    Ok(())
}

/// Formats a fixed-width comparison table of item summaries.
pub fn format_summary_table(strategy: &str, rows: &[ItemSummary], service_level: f64) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "===== {} =====", strategy);
    let _ = writeln!(
        out,
        "{:<12} {:>8} {:>8} {:>12} {:>8} {:>10} {:>9}",
        "item", "stock", "orders", "cost", "lost", "avg_stock", "stockout"
    );
    for row in rows {
        let _ = writeln!(
            out,
            "{:<12} {:>8.0} {:>8} {:>12.2} {:>8.0} {:>10.1} {:>9}",
            row.name,
            row.final_stock,
            row.total_orders,
            row.total_cost,
            row.lost_sales,
            row.average_stock,
            row.stockout_days
        );
    }
    let total: f64 = rows.iter().map(|r| r.total_cost).sum();
    let _ = writeln!(out, "total cost: {:.2}", total);
    let _ = writeln!(out, "service level: {:.2}%", service_level * 100.0);
    out
}
