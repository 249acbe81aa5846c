use model::core::value::Value;

/// Provides database-specific CSV encoding for COPY style ingestion.
pub trait CopyValueEncoder {
    /// Encodes a concrete value into the backend's CSV representation.
    fn encode_value(&self, value: &Value) -> String;

    /// Encodes a SQL NULL into its CSV literal form (e.g. `\N`).
    fn encode_null(&self) -> String;

    /// Encodes a full row as one newline-terminated CSV line.
    fn encode_row(&self, row: &[Value]) -> String {
        let mut line = String::new();
        for (i, value) in row.iter().enumerate() {
            if i > 0 {
                line.push(',');
            }
            line.push_str(&self.encode_value(value));
        }
        line.push('\n');
        line
    }
}
