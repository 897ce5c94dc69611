//! Turns a [`TableSchema`] into the statements that create, fill, index and
//! export its table. Nothing here touches a database.

use std::path::{Path, PathBuf};

use log::debug;
use serde_json::Value;

use crate::libs::config::NotNullBinding;
use crate::libs::error::{Error, Result};
use crate::libs::schema::{ColumnSchema, IndexSchema, Row, TableSchema, find_column};
use crate::libs::statement::{
    ColumnDef, CreateIndex, CreateSequence, CreateTable, Export, Insert, Literal, Statement,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileOptions {
    /// Directory the Parquet exports are written to.
    pub output_dir: PathBuf,
    pub not_null: NotNullBinding,
}

impl CompileOptions {
    pub fn new(output_dir: impl AsRef<Path>) -> Self {
        Self {
            output_dir: output_dir.as_ref().to_path_buf(),
            not_null: NotNullBinding::default(),
        }
    }
}

/// Statements for one table, split by execution phase.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableStatements {
    /// `CREATE TABLE`, its export and the optional sequence.
    pub ddl: Vec<Statement>,
    /// Index creation followed by the inserts, in row order.
    pub dml: Vec<Statement>,
}

pub fn column_defs(columns: &[ColumnSchema], not_null: NotNullBinding) -> Vec<ColumnDef> {
    columns
        .iter()
        .map(|c| ColumnDef {
            name: c.column_name.clone(),
            column_type: c.column_type.clone(),
            primary_key: c.key,
            not_null: not_null.not_null(c),
            references: c.foreign_key.clone(),
        })
        .collect()
}

/// The column list of `CREATE TABLE`, e.g. `id integer PRIMARY KEY, name varchar`.
pub fn column_clause(columns: &[ColumnSchema], not_null: NotNullBinding) -> String {
    CreateTable {
        table: String::new(),
        columns: column_defs(columns, not_null),
    }
    .column_clause()
}

/// Renders one row. Columns and values follow the row's own key order, not
/// the declaration order of `columns`.
pub fn row_to_insert(table: &str, columns: &[ColumnSchema], row: &Row) -> Result<Insert> {
    let mut names = Vec::with_capacity(row.len());
    let mut values = Vec::with_capacity(row.len());

    for (name, value) in row {
        let column = find_column(columns, name).ok_or_else(|| Error::unknown_column(table, name))?;
        names.push(name.clone());
        values.push(render_literal(table, column, value)?);
    }

    Ok(Insert {
        table: table.to_string(),
        columns: names,
        values,
    })
}

fn render_literal(table: &str, column: &ColumnSchema, value: &Value) -> Result<Literal> {
    let sql_type = column.sql_type().ok_or_else(|| Error::UnsupportedType {
        table: table.to_string(),
        column: column.column_name.clone(),
        type_name: column.column_type.clone(),
    })?;

    let text = match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        Value::Array(_) | Value::Object(_) => {
            return Err(Error::UnsupportedValue {
                table: table.to_string(),
                column: column.column_name.clone(),
            });
        }
    };

    if sql_type.is_quoted() {
        Ok(Literal::Quoted(text))
    } else {
        Ok(Literal::Bare(text))
    }
}

pub fn index_statements(
    table: &str,
    columns: &[ColumnSchema],
    indexes: &[IndexSchema],
) -> Result<Vec<CreateIndex>> {
    indexes
        .iter()
        .map(|index| {
            if let Some(field) = index.fields.iter().find(|f| find_column(columns, f).is_none()) {
                return Err(Error::unknown_column(table, field));
            }
            Ok(CreateIndex {
                name: index.name.clone(),
                unique: index.unique,
                table: table.to_string(),
                fields: index.fields.clone(),
            })
        })
        .collect()
}

/// Compiles one table. On error nothing is returned for the table.
pub fn compile_table(schema: &TableSchema, options: &CompileOptions) -> Result<TableStatements> {
    let table = schema.table_name.as_str();

    let mut ddl = vec![
        Statement::CreateTable(CreateTable {
            table: table.to_string(),
            columns: column_defs(&schema.columns, options.not_null),
        }),
        Statement::Export(Export {
            table: table.to_string(),
            path: options.output_dir.join(format!("{table}.parquet")),
        }),
    ];
    if schema.has_sequence() {
        ddl.push(Statement::CreateSequence(CreateSequence {
            table: table.to_string(),
        }));
    }

    let mut dml: Vec<Statement> = index_statements(table, &schema.columns, &schema.indexes)?
        .into_iter()
        .map(Statement::CreateIndex)
        .collect();
    for row in &schema.rows {
        dml.push(Statement::Insert(row_to_insert(table, &schema.columns, row)?));
    }

    debug!(
        "compiled table {table}: {} definitions, {} data statements",
        ddl.len(),
        dml.len()
    );
    Ok(TableStatements { ddl, dml })
}
