use crate::report::summary::{LoadReport, TableSummary};
use std::fmt::Write;

/// Human-readable form of a load report, as printed after a run.
pub fn render(report: &LoadReport) -> String {
    let mut out = String::new();
    for table in &report.tables {
        render_table(&mut out, table);
    }

    let _ = writeln!(out, "=== Database Summary ===");
    let _ = writeln!(out, "Database: {}", report.database);
    let _ = writeln!(out, "Total tables loaded: {}", report.tables.len());
    let _ = writeln!(out, "Total records loaded: {}", report.total_rows());
    out
}

fn render_table(out: &mut String, t: &TableSummary) {
    let _ = writeln!(out, "{} -> {} table", t.file, t.table);
    let _ = writeln!(out, "   {} rows read", t.rows_read);
    if let Some(count) = t.rows_in_database {
        let _ = writeln!(out, "   {count} rows in {}", t.table);
    }

    let columns = t
        .columns
        .iter()
        .map(|c| format!("{} {}", c.name, c.data_type))
        .collect::<Vec<_>>();
    let _ = writeln!(out, "   Columns: {}", columns.join(", "));

    for d in &t.distinct {
        let _ = writeln!(out, "   Distinct {}: {}", d.column, d.values.join(", "));
    }
    for s in &t.sums {
        let _ = writeln!(out, "   Total {}: {:.2}", s.column, s.value);
    }
    for vc in &t.value_counts {
        let _ = writeln!(out, "   Rows where {} = {}: {}", vc.column, vc.value, vc.count);
    }
    for n in &t.null_counts {
        let _ = writeln!(out, "   Rows with NULL {}: {}", n.column, n.count);
    }

    if !t.sample_rows.is_empty() {
        let _ = writeln!(out, "   Sample rows:");
        for row in &t.sample_rows {
            let _ = writeln!(out, "     {row}");
        }
    }
    out.push('\n');
}
