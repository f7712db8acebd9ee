use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::database::DatabaseManager;

#[derive(Debug, Error)]
pub enum RequirementsError {
    #[error("Failed to read requirements file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse requirements file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Invalid {field}: {value}")]
    Invalid { field: &'static str, value: String },
}

/// Stored routine that returns the tenant bound to the session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenantFunctionProbe {
    pub routine: String,
    /// Value the routine must return when no tenant is bound
    pub sentinel: String,
    /// Session variable cleared before the probe; `None` skips the reset
    #[serde(default)]
    pub setting: Option<String>,
}

impl Default for TenantFunctionProbe {
    fn default() -> Self {
        Self {
            routine: "get_current_tenant_id".to_string(),
            sentinel: "invalid_tenant".to_string(),
            setting: Some("app.current_tenant_id".to_string()),
        }
    }
}

/// What one bounded context expects of the database
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthRequirements {
    /// Label used in report messages, e.g. "Contract management"
    pub context: String,
    pub schema: String,
    pub required_tables: Vec<String>,
    pub rls_required_tables: Vec<String>,
    #[serde(default)]
    pub tenant_function: TenantFunctionProbe,
}

const CONTRACT_MANAGEMENT_TABLES: &[&str] = &[
    "tenants",
    "licensors",
    "licensees",
    "brands",
    "business_contracts",
    "contract_files",
    "contract_versions",
    "contract_access_log",
    "upload_sessions",
    "security_audit_log",
];

impl HealthRequirements {
    /// Contract management bounded context; every table is tenant scoped so
    /// both lists are the same.
    pub fn contract_management() -> Self {
        let tables: Vec<String> = CONTRACT_MANAGEMENT_TABLES
            .iter()
            .map(|t| t.to_string())
            .collect();

        Self {
            context: "Contract management".to_string(),
            schema: "public".to_string(),
            required_tables: tables.clone(),
            rls_required_tables: tables,
            tenant_function: TenantFunctionProbe::default(),
        }
    }

    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, RequirementsError> {
        let path = path.as_ref();
        let display = path.display().to_string();

        let raw = std::fs::read_to_string(path).map_err(|source| RequirementsError::Io {
            path: display.clone(),
            source,
        })?;
        let requirements: Self = serde_yaml::from_str(&raw).map_err(|source| {
            RequirementsError::Parse {
                path: display,
                source,
            }
        })?;

        requirements.validate()?;
        Ok(requirements)
    }

    /// Reject values that cannot name a PostgreSQL object
    pub fn validate(&self) -> Result<(), RequirementsError> {
        let invalid = |field, value: &str| RequirementsError::Invalid {
            field,
            value: value.to_string(),
        };

        if !DatabaseManager::is_valid_identifier(&self.schema) {
            return Err(invalid("schema", self.schema.as_str()));
        }
        if let Some(table) = self
            .required_tables
            .iter()
            .find(|t| !DatabaseManager::is_valid_identifier(t))
        {
            return Err(invalid("required table", table.as_str()));
        }
        if let Some(table) = self
            .rls_required_tables
            .iter()
            .find(|t| !DatabaseManager::is_valid_identifier(t))
        {
            return Err(invalid("RLS table", table.as_str()));
        }
        if !DatabaseManager::is_valid_identifier(&self.tenant_function.routine) {
            return Err(invalid("tenant function", self.tenant_function.routine.as_str()));
        }
        if matches!(&self.tenant_function.setting, Some(s) if s.trim().is_empty()) {
            return Err(invalid("tenant setting", ""));
        }
        Ok(())
    }

    /// Lower-cased context label for mid-sentence use
    pub fn context_lowercase(&self) -> String {
        self.context.to_lowercase()
    }
}

impl Default for HealthRequirements {
    fn default() -> Self {
        Self::contract_management()
    }
}

/// Split a comma separated env value into trimmed, non-empty names
pub fn parse_table_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
