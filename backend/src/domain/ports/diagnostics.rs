//! Port abstraction for storage connectivity diagnostics.
use async_trait::async_trait;

use super::define_port_error;

define_port_error! {
    /// Errors raised while probing the storage layer.
    pub enum DiagnosticsError {
        /// Connection could not be established or checked out.
        Connection { message: String } => "diagnostics connection failed: {message}",
        /// Probe query failed during execution.
        Query { message: String } => "diagnostics query failed: {message}",
    }
}

impl From<DiagnosticsError> for crate::domain::Error {
    fn from(value: DiagnosticsError) -> Self {
        match value {
            DiagnosticsError::Connection { message } => Self::service_unavailable(message),
            DiagnosticsError::Query { message } => Self::internal(message),
        }
    }
}

/// What the deep health probe reports back to operators.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageReport {
    /// Name of the connected database.
    pub database: String,
    /// Tables visible in the connected schema.
    pub tables: Vec<String>,
}

#[async_trait]
pub trait Diagnostics: Send + Sync {
    /// Check connectivity and report the selected database plus table list.
    async fn storage_report(&self) -> Result<StorageReport, DiagnosticsError>;
}
