use std::fmt;

use log::{debug, error, info, warn};

use crate::libs::compiler::{CompileOptions, TableStatements, compile_table};
use crate::libs::config::{CompilePolicy, GeneratorConfig};
use crate::libs::error::{Error, Result};
use crate::libs::executor::SqlExecutor;
use crate::libs::schema::TableSchema;
use crate::libs::source::{SchemaDocument, SchemaSource};
use crate::libs::statement::Statement;

/// Every statement of a run, in execution order per phase.
#[derive(Debug, Default)]
pub struct RunPlan {
    pub ddl: Vec<Statement>,
    pub dml: Vec<Statement>,
    /// Tables compiled into the plan, in source order.
    pub tables: Vec<String>,
    /// Schemas left out under [`CompilePolicy::SkipInvalid`].
    pub rejected: Vec<Error>,
}

impl RunPlan {
    fn with_table(self, table: String, statements: TableStatements) -> Self {
        let RunPlan {
            ddl,
            dml,
            mut tables,
            rejected,
        } = self;
        tables.push(table);
        RunPlan {
            ddl: ddl.into_iter().chain(statements.ddl).collect(),
            dml: dml.into_iter().chain(statements.dml).collect(),
            tables,
            rejected,
        }
    }

    fn with_rejected(mut self, error: Error) -> Self {
        self.rejected.push(error);
        self
    }

    pub fn statements(&self) -> impl Iterator<Item = &Statement> {
        self.ddl.iter().chain(&self.dml)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Definitions,
    Data,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Definitions => f.write_str("definitions"),
            Phase::Data => f.write_str("data"),
        }
    }
}

#[derive(Debug)]
pub struct PassReport {
    pub phase: Phase,
    pub attempted: usize,
    pub failures: Vec<Error>,
}

impl PassReport {
    pub fn succeeded(&self) -> usize {
        self.attempted - self.failures.len()
    }
}

#[derive(Debug)]
pub struct RunReport {
    pub tables: Vec<String>,
    pub rejected: Vec<Error>,
    pub definitions: PassReport,
    pub data: PassReport,
}

impl RunReport {
    /// True only when no schema was rejected and every statement ran.
    pub fn is_success(&self) -> bool {
        self.rejected.is_empty()
            && self.definitions.failures.is_empty()
            && self.data.failures.is_empty()
    }

    pub fn failures(&self) -> impl Iterator<Item = &Error> {
        self.rejected
            .iter()
            .chain(&self.definitions.failures)
            .chain(&self.data.failures)
    }
}

/// Drives a run: load schemas, compile them, then execute every definition
/// before any data statement.
pub struct Generator<S, E> {
    config: GeneratorConfig,
    source: S,
    executor: E,
}

impl<S, E> Generator<S, E>
where
    S: SchemaSource,
    E: SqlExecutor,
{
    pub fn new(config: GeneratorConfig, source: S, executor: E) -> Self {
        info!(
            "generating parquet files from {} into {}",
            config.schema_dir.display(),
            config.output_dir.display()
        );
        Self {
            config,
            source,
            executor,
        }
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }

    pub fn executor_mut(&mut self) -> &mut E {
        &mut self.executor
    }

    /// Loads and compiles every schema without executing anything.
    pub fn plan(&self) -> Result<RunPlan> {
        let options = CompileOptions {
            output_dir: self.config.output_dir.clone(),
            not_null: self.config.not_null,
        };

        self.source
            .documents()?
            .into_iter()
            .try_fold(RunPlan::default(), |plan, document| {
                match self.compile_document(&plan, document, &options) {
                    Ok((table, statements)) => Ok(plan.with_table(table, statements)),
                    Err(err)
                        if err.is_table_local()
                            && self.config.compile_policy == CompilePolicy::SkipInvalid =>
                    {
                        warn!("skipping table: {err}");
                        Ok(plan.with_rejected(err))
                    }
                    Err(err) => Err(err),
                }
            })
    }

    fn compile_document(
        &self,
        plan: &RunPlan,
        document: SchemaDocument,
        options: &CompileOptions,
    ) -> Result<(String, TableStatements)> {
        let schema = TableSchema::from_document(&document.origin, document.value)?;
        if plan.tables.contains(&schema.table_name) {
            return Err(Error::malformed(
                document.origin,
                format!("table '{}' is defined more than once", schema.table_name),
            ));
        }
        let statements = compile_table(&schema, options)?;
        Ok((schema.table_name, statements))
    }

    /// Plans the run, then executes the definitions pass followed by the data
    /// pass. Failing statements are reported, not fatal.
    pub async fn run(&mut self) -> Result<RunReport> {
        let plan = self.plan()?;
        info!(
            "planned {} tables: {} definitions, {} data statements",
            plan.tables.len(),
            plan.ddl.len(),
            plan.dml.len()
        );

        tokio::fs::create_dir_all(&self.config.output_dir).await?;

        let definitions = self.run_pass(Phase::Definitions, &plan.ddl).await;
        let data = self.run_pass(Phase::Data, &plan.dml).await;

        for pass in [&definitions, &data] {
            info!(
                "{} pass: {} of {} statements succeeded",
                pass.phase,
                pass.succeeded(),
                pass.attempted
            );
        }

        let report = RunReport {
            tables: plan.tables,
            rejected: plan.rejected,
            definitions,
            data,
        };
        if report.is_success() {
            info!("run finished: {} tables exported", report.tables.len());
        } else {
            error!("run failed with {} errors", report.failures().count());
        }
        Ok(report)
    }

    async fn run_pass(&mut self, phase: Phase, statements: &[Statement]) -> PassReport {
        info!("running {} statements of the {phase} pass", statements.len());
        let mut failures = Vec::new();

        for statement in statements {
            debug!("{statement}");
            if let Err(err) = self.executor.execute(statement).await {
                error!("{phase} statement for table {} failed: {err}", statement.table());
                failures.push(err);
            }
        }

        PassReport {
            phase,
            attempted: statements.len(),
            failures,
        }
    }
}
