use std::path::Path;

/// Normalizes a column label: trim, lowercase, spaces to underscores.
pub fn normalize_label(label: &str) -> String {
    label.trim().to_lowercase().replace(' ', "_")
}

/// Table name derived from a CSV path: the normalized file stem.
pub fn table_name_from_path(path: &Path) -> Option<String> {
    let stem = path.file_stem()?.to_str()?;
    let name = normalize_label(stem);
    if name.is_empty() { None } else { Some(name) }
}
