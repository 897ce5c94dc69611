use std::path::{Path, PathBuf};

use crate::libs::schema::ColumnSchema;

/// What a run does with a table whose schema fails to load or compile.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CompilePolicy {
    /// Abort the run before any statement executes.
    #[default]
    FailFast,
    /// Log the error, leave the table out and report the run as failed.
    SkipInvalid,
}

/// Which schema field drives the `NOT NULL` modifier.
///
/// Existing schema documents set `nullable: true` on columns that must not
/// hold nulls, so `NullableField` is the default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum NotNullBinding {
    /// `nullable: true` emits `NOT NULL`.
    #[default]
    NullableField,
    /// `nullable: false` emits `NOT NULL`; an absent flag emits nothing.
    NonNullable,
}

impl NotNullBinding {
    pub fn not_null(self, column: &ColumnSchema) -> bool {
        match self {
            NotNullBinding::NullableField => column.nullable == Some(true),
            NotNullBinding::NonNullable => column.nullable == Some(false),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorConfig {
    pub schema_dir: PathBuf,
    pub output_dir: PathBuf,
    /// DuckDB database file; `None` keeps everything in memory.
    pub database: Option<PathBuf>,
    pub compile_policy: CompilePolicy,
    pub not_null: NotNullBinding,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            schema_dir: PathBuf::from("schema"),
            output_dir: PathBuf::from("parquet"),
            database: None,
            compile_policy: CompilePolicy::default(),
            not_null: NotNullBinding::default(),
        }
    }
}

impl GeneratorConfig {
    pub fn new(schema_dir: impl AsRef<Path>, output_dir: impl AsRef<Path>) -> Self {
        Self {
            schema_dir: schema_dir.as_ref().to_path_buf(),
            output_dir: output_dir.as_ref().to_path_buf(),
            ..Self::default()
        }
    }

    pub fn database(mut self, path: impl AsRef<Path>) -> Self {
        self.database = Some(path.as_ref().to_path_buf());
        self
    }

    pub fn compile_policy(mut self, policy: CompilePolicy) -> Self {
        self.compile_policy = policy;
        self
    }

    pub fn not_null(mut self, binding: NotNullBinding) -> Self {
        self.not_null = binding;
        self
    }
}
