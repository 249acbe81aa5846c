use crate::error::CliError;
use engine_runtime::report::{summary::LoadReport, text};
use model::transform::infer::InferredColumn;
use std::path::Path;

fn generate_report_json(report: &LoadReport) -> Result<String, CliError> {
    let json = serde_json::to_string_pretty(report)?;
    Ok(json)
}

pub async fn write_report(report: &LoadReport, path: &Path) -> Result<(), CliError> {
    let report_json = generate_report_json(report)?;
    tokio::fs::write(path, report_json)
        .await
        .map_err(|source| CliError::FileWrite {
            path: path.display().to_string(),
            source,
        })
}

pub fn print_report(report: &LoadReport) {
    print!("{}", text::render(report));
}

/// Prints the report, and writes its JSON form when a path was given.
pub async fn emit_report(report: &LoadReport, path: Option<&Path>) -> Result<(), CliError> {
    print_report(report);
    if let Some(path) = path {
        write_report(report, path).await?;
        println!("Report written to {}", path.display());
    }
    Ok(())
}

pub fn print_inspection(file: &Path, table: &str, rows: usize, columns: &[InferredColumn]) {
    println!("{} -> {} table", file.display(), table);
    println!("   {rows} rows");
    let width = columns.iter().map(|c| c.name.len()).max().unwrap_or(0);
    for column in columns {
        println!("   {:<width$}  {}", column.name, column.data_type);
    }
}
