use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::database::{DatabaseError, SchemaCatalog};
use crate::health::{HealthIndicator, HealthReport, HealthRequirements};

/// Catalog query kinds, used to inject failures and count calls
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CatalogQuery {
    TableCount,
    RowSecurity,
    RoutineCount,
    TenantProbe,
}

#[derive(Debug, Clone)]
enum Failure {
    DataAccess(String),
    InvalidIdentifier(String),
}

/// Driver-level error carrying `message`, as a failing query would raise it
pub fn data_access_error(message: &str) -> DatabaseError {
    DatabaseError::Sqlx(sqlx::Error::Protocol(message.to_string()))
}

/// In-memory `SchemaCatalog` describing a database's catalogs
pub struct StaticCatalog {
    tables: HashSet<String>,
    row_security: HashMap<String, Option<bool>>,
    routine_present: bool,
    tenant_value: Option<String>,
    failures: HashMap<CatalogQuery, Failure>,
    calls: Mutex<Vec<CatalogQuery>>,
    probe_settings: Mutex<Vec<Option<String>>>,
}

impl StaticCatalog {
    /// Catalog that satisfies every requirement
    pub fn healthy(requirements: &HealthRequirements) -> Self {
        let tables = requirements
            .required_tables
            .iter()
            .chain(&requirements.rls_required_tables)
            .cloned()
            .collect::<HashSet<_>>();
        let row_security = tables.iter().map(|t| (t.clone(), Some(true))).collect();

        Self {
            tables,
            row_security,
            routine_present: true,
            tenant_value: Some(requirements.tenant_function.sentinel.clone()),
            failures: HashMap::new(),
            calls: Mutex::new(Vec::new()),
            probe_settings: Mutex::new(Vec::new()),
        }
    }

    pub fn without_table(mut self, table: &str) -> Self {
        self.tables.remove(table);
        self
    }

    pub fn with_row_security(mut self, table: &str, enabled: Option<bool>) -> Self {
        self.row_security.insert(table.to_string(), enabled);
        self
    }

    pub fn without_routine(mut self) -> Self {
        self.routine_present = false;
        self
    }

    pub fn with_tenant_value(mut self, value: Option<&str>) -> Self {
        self.tenant_value = value.map(str::to_string);
        self
    }

    pub fn fail_on(mut self, query: CatalogQuery, message: &str) -> Self {
        self.failures
            .insert(query, Failure::DataAccess(message.to_string()));
        self
    }

    pub fn reject_identifier_on(mut self, query: CatalogQuery, name: &str) -> Self {
        self.failures
            .insert(query, Failure::InvalidIdentifier(name.to_string()));
        self
    }

    pub fn calls(&self, query: CatalogQuery) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|q| **q == query)
            .count()
    }

    pub fn probe_settings(&self) -> Vec<Option<String>> {
        self.probe_settings.lock().unwrap().clone()
    }

    fn record(&self, query: CatalogQuery) -> Result<(), DatabaseError> {
        self.calls.lock().unwrap().push(query);
        match self.failures.get(&query) {
            Some(Failure::DataAccess(message)) => Err(data_access_error(message)),
            Some(Failure::InvalidIdentifier(name)) => {
                Err(DatabaseError::InvalidIdentifier(name.clone()))
            }
            None => Ok(()),
        }
    }
}

#[async_trait]
impl SchemaCatalog for StaticCatalog {
    async fn table_count(&self, _schema: &str, table: &str) -> Result<i64, DatabaseError> {
        self.record(CatalogQuery::TableCount)?;
        Ok(i64::from(self.tables.contains(table)))
    }

    async fn row_security(&self, _schema: &str, table: &str) -> Result<Option<bool>, DatabaseError> {
        self.record(CatalogQuery::RowSecurity)?;
        Ok(self.row_security.get(table).copied().flatten())
    }

    async fn routine_count(&self, _routine: &str) -> Result<i64, DatabaseError> {
        self.record(CatalogQuery::RoutineCount)?;
        Ok(i64::from(self.routine_present))
    }

    async fn probe_tenant_function(
        &self,
        _routine: &str,
        setting: Option<&str>,
    ) -> Result<Option<String>, DatabaseError> {
        self.record(CatalogQuery::TenantProbe)?;
        self.probe_settings
            .lock()
            .unwrap()
            .push(setting.map(str::to_string));
        Ok(self.tenant_value.clone())
    }
}

/// Indicator returning a canned report, counting how often it was asked
pub struct FixedIndicator {
    report: HealthReport,
    calls: AtomicUsize,
}

impl FixedIndicator {
    pub fn new(report: HealthReport) -> Self {
        Self {
            report,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl HealthIndicator for FixedIndicator {
    async fn health(&self) -> HealthReport {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.report.clone()
    }
}

/// Indicator whose check panics, standing in for a crashing service
pub struct PanickingIndicator;

#[async_trait]
impl HealthIndicator for PanickingIndicator {
    async fn health(&self) -> HealthReport {
        panic!("Service temporarily unavailable");
    }
}
