use crate::config::TableConfig;
use crate::error::{Error, Result};

/// A row of the authoritative record store.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "postgres", derive(diesel::QueryableByName))]
pub struct RecordStoreRow {
    #[cfg_attr(feature = "postgres", diesel(sql_type = diesel::sql_types::Text))]
    pub filename: String,
    #[cfg_attr(feature = "postgres", diesel(sql_type = diesel::sql_types::Text))]
    pub stored_path: String,
    #[cfg_attr(feature = "postgres", diesel(sql_type = diesel::sql_types::Text))]
    pub key: String,
}

/// Validated table and column identifiers for the lookup query.
///
/// Identifiers cannot be bound as query parameters, so each one is checked to
/// be a plain (optionally schema-qualified) SQL name before it is spliced in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSpec {
    table: String,
    filename_column: String,
    path_column: String,
    key_column: String,
}

impl TableSpec {
    pub fn new(table: &str, filename_column: &str, path_column: &str, key_column: &str) -> Result<Self> {
        validate_qualified(table)?;
        for column in [filename_column, path_column, key_column] {
            validate_identifier(column)?;
        }
        Ok(Self {
            table: table.to_string(),
            filename_column: filename_column.to_string(),
            path_column: path_column.to_string(),
            key_column: key_column.to_string(),
        })
    }

    pub fn from_config(config: &TableConfig) -> Result<Self> {
        Self::new(
            &config.name,
            &config.filename_column,
            &config.path_column,
            &config.key_column,
        )
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    /// `SELECT` list aliasing the configured columns to the row field names.
    pub fn select_list(&self) -> String {
        format!(
            "{} AS \"filename\", {} AS \"stored_path\", {} AS \"key\"",
            self.filename_column, self.path_column, self.key_column
        )
    }

    pub fn filename_column(&self) -> &str {
        &self.filename_column
    }
}

fn validate_qualified(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(Error::InvalidIdentifier(name.to_string()));
    }
    for segment in name.split('.') {
        validate_identifier(segment).map_err(|_| Error::InvalidIdentifier(name.to_string()))?;
    }
    Ok(())
}

fn validate_identifier(name: &str) -> Result<()> {
    let mut chars = name.chars();
    let valid = match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    };
    if valid {
        Ok(())
    } else {
        Err(Error::InvalidIdentifier(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_spec_accepts_plain_and_qualified_names() {
        let spec = TableSpec::new("dbo.el_desh", "file_name", "file_path", "serial_nbr").unwrap();
        assert_eq!(spec.table(), "dbo.el_desh");
        assert_eq!(
            spec.select_list(),
            r#"file_name AS "filename", file_path AS "stored_path", serial_nbr AS "key""#
        );
    }

    #[test]
    fn test_table_spec_rejects_injection() {
        assert!(matches!(
            TableSpec::new("el_desh; DROP TABLE x", "file_name", "file_path", "serial_nbr"),
            Err(Error::InvalidIdentifier(_))
        ));
        assert!(TableSpec::new("el_desh", "file_name--", "file_path", "serial_nbr").is_err());
        assert!(TableSpec::new("dbo..el_desh", "file_name", "file_path", "serial_nbr").is_err());
        assert!(TableSpec::new("", "file_name", "file_path", "serial_nbr").is_err());
        assert!(TableSpec::new("el_desh", "1col", "file_path", "serial_nbr").is_err());
    }
}
