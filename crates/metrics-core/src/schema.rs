use std::collections::HashMap;

// ── Column types ──────────────────────────────────────────────────────────────

/// Semantic type of a dump column, declared up front instead of being
/// inferred per cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    /// Plain text, stored as-is after whitespace trimming.
    Text,
    /// ISO-like datetime; the literal `"None"` is a missing value.
    Date,
    /// JSON-encoded array of strings; an empty cell is an empty list.
    List,
}

// ── Schema ────────────────────────────────────────────────────────────────────

/// Mapping from column name to declared semantic type, supplied to the dump
/// parser. Columns without an entry parse as [`ColumnType::Text`].
#[derive(Debug, Clone, Default)]
pub struct Schema {
    columns: HashMap<String, ColumnType>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare `name` to have the given type, replacing any earlier entry.
    pub fn with_column(mut self, name: &str, ty: ColumnType) -> Self {
        self.columns.insert(name.to_string(), ty);
        self
    }

    /// Look up the declared type for `name`, defaulting to text.
    pub fn column_type(&self, name: &str) -> ColumnType {
        self.columns
            .get(name)
            .copied()
            .unwrap_or(ColumnType::Text)
    }
}

/// The schema of the image-build dump: `created_at` is a date and the three
/// list-valued columns hold JSON arrays.
pub fn build_schema() -> Schema {
    Schema::new()
        .with_column("created_at", ColumnType::Date)
        .with_column("packages", ColumnType::List)
        .with_column("filesystem", ColumnType::List)
        .with_column("payload_repositories", ColumnType::List)
}
