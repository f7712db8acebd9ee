use std::time::Instant;

use async_trait::async_trait;
use tracing::{debug, error, info, warn};

use crate::database::{DatabaseError, SchemaCatalog};
use crate::health::report::{HealthIndicator, HealthReport};
use crate::health::requirements::HealthRequirements;

/// Checks that a bounded context's tables exist, have row level security
/// enabled, and that the tenant isolation function answers with its
/// sentinel when no tenant is bound.
///
/// Stages run in order and stop at the first failure. Any catalog error is
/// turned into a DOWN report; `validate` never fails.
pub struct SchemaHealthValidator<C> {
    catalog: C,
    requirements: HealthRequirements,
}

impl<C: SchemaCatalog> SchemaHealthValidator<C> {
    pub fn new(catalog: C, requirements: HealthRequirements) -> Self {
        Self {
            catalog,
            requirements,
        }
    }

    pub async fn validate(&self) -> HealthReport {
        let started = Instant::now();

        match self.run_checks(started).await {
            Ok(report) => report,
            Err(e) => self.failure_report(&e, started),
        }
    }

    async fn run_checks(&self, started: Instant) -> Result<HealthReport, DatabaseError> {
        let req = &self.requirements;

        let missing_tables = self.missing_tables().await?;
        if !missing_tables.is_empty() {
            warn!(context = %req.context, ?missing_tables, "Required tables missing");
            return Ok(HealthReport::down()
                .with_detail("error", format!("{} schema validation failed", req.context))
                .with_detail("missing_tables", missing_tables)
                .with_detail("validation_time", elapsed_ms(started)));
        }

        let rls_failures = self.rls_failures().await?;
        if !rls_failures.is_empty() {
            warn!(context = %req.context, ?rls_failures, "Row level security not enabled");
            return Ok(HealthReport::down()
                .with_detail("error", "Row Level Security validation failed")
                .with_detail("rls_validation_failed", rls_failures)
                .with_detail("validation_time", elapsed_ms(started)));
        }

        if !self.tenant_function_valid().await? {
            warn!(
                context = %req.context,
                routine = %req.tenant_function.routine,
                "Tenant isolation function check failed"
            );
            return Ok(HealthReport::down()
                .with_detail("error", "Tenant isolation function validation failed")
                .with_detail("tenant_function_validated", false)
                .with_detail("validation_time", elapsed_ms(started)));
        }

        let elapsed = elapsed_ms(started);
        info!(context = %req.context, elapsed_ms = elapsed, "Schema health validated");

        Ok(HealthReport::up()
            .with_detail("tables_validated", req.required_tables.len())
            .with_detail("rls_validated", req.rls_required_tables.len())
            .with_detail("tenant_function_validated", true)
            .with_detail("validation_time", elapsed))
    }

    async fn missing_tables(&self) -> Result<Vec<String>, DatabaseError> {
        let schema = &self.requirements.schema;
        let mut missing = Vec::new();

        for table in &self.requirements.required_tables {
            let count = self.catalog.table_count(schema, table).await?;
            debug!(schema = %schema, table = %table, count, "Table existence checked");
            if count == 0 {
                missing.push(table.clone());
            }
        }

        Ok(missing)
    }

    async fn rls_failures(&self) -> Result<Vec<String>, DatabaseError> {
        let schema = &self.requirements.schema;
        let mut failures = Vec::new();

        for table in &self.requirements.rls_required_tables {
            let enabled = self.catalog.row_security(schema, table).await?;
            debug!(schema = %schema, table = %table, ?enabled, "Row security checked");
            if enabled != Some(true) {
                failures.push(table.clone());
            }
        }

        Ok(failures)
    }

    async fn tenant_function_valid(&self) -> Result<bool, DatabaseError> {
        let probe = &self.requirements.tenant_function;

        if self.catalog.routine_count(&probe.routine).await? == 0 {
            return Ok(false);
        }

        let value = self
            .catalog
            .probe_tenant_function(&probe.routine, probe.setting.as_deref())
            .await?;

        Ok(value.as_deref() == Some(probe.sentinel.as_str()))
    }

    fn failure_report(&self, err: &DatabaseError, started: Instant) -> HealthReport {
        let context = self.requirements.context_lowercase();
        let message = if err.is_data_access() {
            format!("Database access failed during {} schema validation", context)
        } else {
            format!("Unexpected error during {} schema validation", context)
        };

        error!(error = %err, "{}", message);

        HealthReport::down()
            .with_detail("error", message)
            .with_detail("exception", err.to_string())
            .with_detail("validation_time", elapsed_ms(started))
    }
}

#[async_trait]
impl<C: SchemaCatalog> HealthIndicator for SchemaHealthValidator<C> {
    async fn health(&self) -> HealthReport {
        self.validate().await
    }
}

fn elapsed_ms(started: Instant) -> u64 {
    started.elapsed().as_millis() as u64
}
