use std::collections::HashSet;

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::libs::error::{Error, Result};

/// One row of seed data, keyed by column name in document order.
pub type Row = Map<String, Value>;

/// Points a column at a column of another table.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForeignKey {
    pub table_name: String,
    pub column_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnSchema {
    pub column_name: String,
    /// Declared type, passed to `CREATE TABLE` as written.
    #[serde(rename = "type")]
    pub column_type: String,
    #[serde(default)]
    pub key: bool,
    #[serde(default)]
    pub nullable: Option<bool>,
    #[serde(default)]
    pub foreign_key: Option<ForeignKey>,
}

impl ColumnSchema {
    pub fn new(name: &str, column_type: &str) -> Self {
        Self {
            column_name: name.to_string(),
            column_type: column_type.to_string(),
            key: false,
            nullable: None,
            foreign_key: None,
        }
    }

    pub fn primary(mut self) -> Self {
        self.key = true;
        self
    }

    pub fn nullable(mut self, nullable: bool) -> Self {
        self.nullable = Some(nullable);
        self
    }

    pub fn references(mut self, table: &str, column: &str) -> Self {
        self.foreign_key = Some(ForeignKey {
            table_name: table.to_string(),
            column_name: column.to_string(),
        });
        self
    }

    pub fn sql_type(&self) -> Option<SqlType> {
        SqlType::parse(&self.column_type)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct IndexSchema {
    pub name: String,
    #[serde(default)]
    pub unique: bool,
    pub fields: Vec<String>,
}

/// A table, its constraints and its seed rows, as read from one schema document.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableSchema {
    pub table_name: String,
    #[serde(alias = "schema")]
    pub columns: Vec<ColumnSchema>,
    #[serde(default)]
    pub indexes: Vec<IndexSchema>,
    pub rows: Vec<Row>,
    /// Any non-null value asks for a `<table>_sequence`.
    #[serde(default)]
    pub options: Option<Value>,
}

impl TableSchema {
    /// Builds a schema from a parsed document and checks it references only
    /// declared columns. `origin` names the document in errors.
    pub fn from_document(origin: &str, document: Value) -> Result<Self> {
        let schema: TableSchema =
            serde_json::from_value(document).map_err(|e| Error::malformed(origin, e.to_string()))?;
        schema.validate(origin)?;
        Ok(schema)
    }

    pub fn from_json(origin: &str, json: &str) -> Result<Self> {
        let document: Value =
            serde_json::from_str(json).map_err(|e| Error::malformed(origin, e.to_string()))?;
        Self::from_document(origin, document)
    }

    fn validate(&self, origin: &str) -> Result<()> {
        if self.table_name.trim().is_empty() {
            return Err(Error::malformed(origin, "tableName is empty"));
        }
        if self.columns.is_empty() {
            return Err(Error::malformed(origin, "table declares no columns"));
        }

        let mut seen = HashSet::new();
        for column in &self.columns {
            if !seen.insert(column.column_name.as_str()) {
                return Err(Error::malformed(
                    origin,
                    format!("column '{}' is declared twice", column.column_name),
                ));
            }
        }

        for (position, row) in self.rows.iter().enumerate() {
            if row.is_empty() {
                return Err(Error::malformed(origin, format!("row {position} has no values")));
            }
            if let Some(name) = row.keys().find(|name| self.column(name).is_none()) {
                return Err(Error::malformed(
                    origin,
                    format!("row {position} references undeclared column '{name}'"),
                ));
            }
        }

        for index in &self.indexes {
            if index.fields.is_empty() {
                return Err(Error::malformed(
                    origin,
                    format!("index '{}' has no fields", index.name),
                ));
            }
            if let Some(field) = index.fields.iter().find(|f| self.column(f).is_none()) {
                return Err(Error::malformed(
                    origin,
                    format!("index '{}' references undeclared column '{field}'", index.name),
                ));
            }
        }
        Ok(())
    }

    pub fn column(&self, name: &str) -> Option<&ColumnSchema> {
        find_column(&self.columns, name)
    }

    pub fn has_sequence(&self) -> bool {
        self.options.is_some()
    }
}

pub(crate) fn find_column<'a>(columns: &'a [ColumnSchema], name: &str) -> Option<&'a ColumnSchema> {
    columns.iter().find(|c| c.column_name == name)
}

/// Storage types with a known literal rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SqlType {
    Varchar,
    Text,
    Integer,
    Boolean,
    Float,
    Decimal,
    Date,
    Time,
    Timestamp,
    Interval,
    Uuid,
    Blob,
    Json,
}

impl SqlType {
    /// Classifies a declared type by its base name, so `decimal(10,2)` is a
    /// `Decimal` and `VARCHAR(20)` a `Varchar`.
    pub fn parse(declared: &str) -> Option<Self> {
        let base = declared
            .split('(')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();
        let sql_type = match base.as_str() {
            "varchar" => SqlType::Varchar,
            "char" | "bpchar" | "text" | "string" => SqlType::Text,
            "tinyint" | "smallint" | "integer" | "int" | "bigint" | "hugeint" | "utinyint"
            | "usmallint" | "uinteger" | "ubigint" | "uhugeint" | "int1" | "int2" | "int4"
            | "int8" => SqlType::Integer,
            "boolean" | "bool" => SqlType::Boolean,
            "float" | "real" | "double" | "float4" | "float8" => SqlType::Float,
            "decimal" | "numeric" => SqlType::Decimal,
            "date" => SqlType::Date,
            "time" => SqlType::Time,
            "timestamp" | "datetime" | "timestamptz" | "timestamp with time zone" => {
                SqlType::Timestamp
            }
            "interval" => SqlType::Interval,
            "uuid" => SqlType::Uuid,
            "blob" | "bytea" => SqlType::Blob,
            "json" => SqlType::Json,
            _ => return None,
        };
        Some(sql_type)
    }

    /// Only `varchar` values are quoted; everything else goes in verbatim.
    pub fn is_quoted(self) -> bool {
        matches!(self, SqlType::Varchar)
    }
}
