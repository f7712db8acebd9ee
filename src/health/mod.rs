//! Tenant isolation schema health checks.
//!
//! A [`SchemaHealthValidator`] runs three catalog checks against the
//! requirements of one bounded context and produces a [`HealthReport`].

pub mod report;
pub mod requirements;
pub mod validator;

pub use report::{HealthIndicator, HealthReport, HealthStatus};
pub use requirements::{HealthRequirements, RequirementsError, TenantFunctionProbe};
pub use validator::SchemaHealthValidator;
