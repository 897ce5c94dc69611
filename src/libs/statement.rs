//! Structured statements. They stay structured through compilation and are
//! rendered to DuckDB SQL text only through [`std::fmt::Display`], when an
//! executor needs the text.

use std::fmt;
use std::path::PathBuf;

use crate::libs::schema::ForeignKey;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Statement {
    CreateTable(CreateTable),
    Export(Export),
    CreateSequence(CreateSequence),
    CreateIndex(CreateIndex),
    Insert(Insert),
}

impl Statement {
    /// The table the statement creates, fills or reads.
    pub fn table(&self) -> &str {
        match self {
            Statement::CreateTable(s) => &s.table,
            Statement::Export(s) => &s.table,
            Statement::CreateSequence(s) => &s.table,
            Statement::CreateIndex(s) => &s.table,
            Statement::Insert(s) => &s.table,
        }
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Statement::CreateTable(s) => fmt::Display::fmt(s, f),
            Statement::Export(s) => fmt::Display::fmt(s, f),
            Statement::CreateSequence(s) => fmt::Display::fmt(s, f),
            Statement::CreateIndex(s) => fmt::Display::fmt(s, f),
            Statement::Insert(s) => fmt::Display::fmt(s, f),
        }
    }
}

/// One entry of a `CREATE TABLE` column list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDef {
    pub name: String,
    pub column_type: String,
    pub primary_key: bool,
    pub not_null: bool,
    pub references: Option<ForeignKey>,
}

impl fmt::Display for ColumnDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.name, self.column_type)?;
        if self.primary_key {
            f.write_str(" PRIMARY KEY")?;
        }
        if self.not_null {
            f.write_str(" NOT NULL")?;
        }
        if let Some(fk) = &self.references {
            write!(f, " REFERENCES {}({})", fk.table_name, fk.column_name)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateTable {
    pub table: String,
    pub columns: Vec<ColumnDef>,
}

impl CreateTable {
    /// The comma separated column list between the parentheses.
    pub fn column_clause(&self) -> String {
        self.columns
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for CreateTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CREATE TABLE {} ({});", self.table, self.column_clause())
    }
}

/// Copies the whole table into a Parquet file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Export {
    pub table: String,
    pub path: PathBuf,
}

impl fmt::Display for Export {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "copy (select * from {}) to '{}' (format 'parquet');",
            self.table,
            self.path.display()
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateSequence {
    pub table: String,
}

impl CreateSequence {
    pub fn name(&self) -> String {
        format!("{}_sequence", self.table)
    }
}

impl fmt::Display for CreateSequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CREATE SEQUENCE {} START 1;", self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateIndex {
    pub name: String,
    pub unique: bool,
    pub table: String,
    pub fields: Vec<String>,
}

impl fmt::Display for CreateIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let unique = if self.unique { " UNIQUE" } else { "" };
        write!(
            f,
            "CREATE INDEX {}{} ON {} ({});",
            self.name,
            unique,
            self.table,
            self.fields.join(", ")
        )
    }
}

/// A rendered value in a `VALUES` list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Literal {
    /// Wrapped in single quotes. Embedded quotes are not escaped.
    Quoted(String),
    Bare(String),
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Quoted(text) => write!(f, "'{text}'"),
            Literal::Bare(text) => f.write_str(text),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Insert {
    pub table: String,
    pub columns: Vec<String>,
    pub values: Vec<Literal>,
}

impl fmt::Display for Insert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let values: Vec<String> = self.values.iter().map(ToString::to_string).collect();
        write!(
            f,
            "INSERT INTO {} ({}) values ({});",
            self.table,
            self.columns.join(","),
            values.join(",")
        )
    }
}

#[cfg(test)]
mod tests {
    use insta::assert_snapshot;

    use super::*;

    fn column(name: &str, column_type: &str) -> ColumnDef {
        ColumnDef {
            name: name.into(),
            column_type: column_type.into(),
            primary_key: false,
            not_null: false,
            references: None,
        }
    }

    #[test]
    fn column_modifiers_keep_their_order() {
        let def = ColumnDef {
            primary_key: true,
            not_null: true,
            references: Some(ForeignKey {
                table_name: "teams".into(),
                column_name: "id".into(),
            }),
            ..column("team", "integer")
        };
        assert_snapshot!(def, @"team integer PRIMARY KEY NOT NULL REFERENCES teams(id)");
    }

    #[test]
    fn create_table_joins_columns() {
        let create = CreateTable {
            table: "users".into(),
            columns: vec![
                ColumnDef {
                    primary_key: true,
                    ..column("id", "integer")
                },
                column("name", "varchar"),
            ],
        };
        assert_snapshot!(create, @"CREATE TABLE users (id integer PRIMARY KEY, name varchar);");
    }

    #[test]
    fn export_and_sequence() {
        let export = Statement::Export(Export {
            table: "users".into(),
            path: PathBuf::from("out").join("users.parquet"),
        });
        assert_snapshot!(export, @"copy (select * from users) to 'out/users.parquet' (format 'parquet');");

        let sequence = Statement::CreateSequence(CreateSequence {
            table: "users".into(),
        });
        assert_eq!(sequence.table(), "users");
        assert_snapshot!(sequence, @"CREATE SEQUENCE users_sequence START 1;");
    }

    #[test]
    fn index_uniqueness_follows_name() {
        let mut index = CreateIndex {
            name: "idx_team_name".into(),
            unique: false,
            table: "users".into(),
            fields: vec!["team".into(), "name".into()],
        };
        assert_snapshot!(index, @"CREATE INDEX idx_team_name ON users (team, name);");

        index.unique = true;
        assert_snapshot!(index, @"CREATE INDEX idx_team_name UNIQUE ON users (team, name);");
    }

    #[test]
    fn insert_quotes_only_quoted_literals() {
        let insert = Insert {
            table: "users".into(),
            columns: vec!["id".into(), "name".into(), "note".into()],
            values: vec![
                Literal::Bare("1".into()),
                Literal::Quoted("Ann".into()),
                Literal::Quoted("it's".into()),
            ],
        };
        assert_snapshot!(insert, @"INSERT INTO users (id,name,note) values (1,'Ann','it's');");
    }
}
