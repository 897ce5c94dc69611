use std::path::PathBuf;
use std::process::exit;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, ValueEnum};
use log::LevelFilter;

use parquetgen::{
    CompilePolicy, DirectorySource, DuckDbExecutor, Generator, GeneratorConfig, NotNullBinding,
};

/// Compile JSON table schemas into DuckDB statements and export every table
/// as a Parquet file.
#[derive(Parser, Debug)]
#[command(name = env!("CARGO_PKG_NAME"), about, version)]
struct Cli {
    /// Directory with one JSON schema document per table
    #[arg(long, default_value = "schema", env = "PARQUETGEN_SCHEMA_DIR")]
    schema_dir: PathBuf,

    /// Directory the Parquet files are written to
    #[arg(long, default_value = "parquet", env = "PARQUETGEN_OUTPUT_DIR")]
    output_dir: PathBuf,

    /// DuckDB database file (in memory when omitted)
    #[arg(long)]
    database: Option<PathBuf>,

    /// Print the planned statements without executing them
    #[arg(long)]
    dry_run: bool,

    /// Leave out tables whose schema is invalid instead of aborting
    #[arg(long)]
    skip_invalid: bool,

    /// Schema value that emits NOT NULL
    #[arg(long, value_enum, default_value_t = NotNullFrom::Nullable)]
    not_null_from: NotNullFrom,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
enum NotNullFrom {
    /// `nullable: true`
    Nullable,
    /// `nullable: false`
    NonNullable,
}

impl Cli {
    fn config(&self) -> GeneratorConfig {
        let mut config = GeneratorConfig::new(&self.schema_dir, &self.output_dir)
            .compile_policy(if self.skip_invalid {
                CompilePolicy::SkipInvalid
            } else {
                CompilePolicy::FailFast
            })
            .not_null(match self.not_null_from {
                NotNullFrom::Nullable => NotNullBinding::NullableField,
                NotNullFrom::NonNullable => NotNullBinding::NonNullable,
            });
        if let Some(database) = &self.database {
            config = config.database(database);
        }
        config
    }

    fn log_level(&self) -> LevelFilter {
        match self.verbose {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            2 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    env_logger::Builder::new()
        .filter_level(cli.log_level())
        .parse_default_env()
        .init();

    let config = cli.config();
    let source = DirectorySource::new(&config.schema_dir);
    let executor = match &config.database {
        Some(path) => DuckDbExecutor::open(path),
        None => DuckDbExecutor::in_memory(),
    };
    let mut generator = Generator::new(config.clone(), source, executor);

    if cli.dry_run {
        let plan = generator
            .plan()
            .with_context(|| format!("planning {}", config.schema_dir.display()))?;
        for statement in plan.statements() {
            println!("{statement}");
        }
        return Ok(());
    }

    let report = generator
        .run()
        .await
        .with_context(|| format!("generating from {}", config.schema_dir.display()))?;
    if !report.is_success() {
        for failure in report.failures() {
            eprintln!("{failure}");
        }
        exit(1);
    }
    Ok(())
}
