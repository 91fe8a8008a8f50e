//! Conversions from external infrastructure errors into domain errors.

use featuregate_domain::FeatureGateError;
use rusqlite::Error as SqlError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub FeatureGateError);

impl From<InfraError> for FeatureGateError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<FeatureGateError> for InfraError {
    fn from(value: FeatureGateError) -> Self {
        InfraError(value)
    }
}

trait IntoFeatureGateError {
    fn into_featuregate(self) -> FeatureGateError;
}

/* -------------------------------------------------------------------------- */
/* rusqlite::Error → FeatureGateError */
/* -------------------------------------------------------------------------- */

impl IntoFeatureGateError for SqlError {
    fn into_featuregate(self) -> FeatureGateError {
        use rusqlite::ffi::ErrorCode;
        use rusqlite::Error as RE;

        match self {
            RE::SqliteFailure(err, maybe_message) => {
                let message = maybe_message.unwrap_or_default();
                match err.code {
                    ErrorCode::DatabaseBusy => FeatureGateError::Store("database is busy".into()),
                    ErrorCode::DatabaseLocked => {
                        FeatureGateError::Store("database is locked".into())
                    }
                    ErrorCode::ReadOnly => FeatureGateError::Store("database is read-only".into()),
                    ErrorCode::DiskFull => FeatureGateError::Store("disk is full".into()),
                    ErrorCode::CannotOpen => {
                        FeatureGateError::Store(format!("unable to open database: {message}"))
                    }
                    _ => FeatureGateError::Store(format!(
                        "sqlite failure {:?} (code {}): {}",
                        err.code, err.extended_code, message
                    )),
                }
            }
            RE::FromSqlConversionFailure(_, _, cause) => {
                FeatureGateError::Store(format!("failed to convert sqlite value: {cause}"))
            }
            RE::InvalidColumnType(_, name, ty) => {
                FeatureGateError::Store(format!("invalid column type for {name}: {ty}"))
            }
            RE::Utf8Error(..) => FeatureGateError::Store("invalid UTF-8 returned from sqlite".into()),
            RE::InvalidPath(path) => FeatureGateError::Store(format!(
                "invalid database path: {}",
                path.to_string_lossy()
            )),
            other => FeatureGateError::Store(other.to_string()),
        }
    }
}

impl From<SqlError> for InfraError {
    fn from(value: SqlError) -> Self {
        InfraError(value.into_featuregate())
    }
}

/* -------------------------------------------------------------------------- */
/* r2d2::Error → FeatureGateError */
/* -------------------------------------------------------------------------- */

impl From<r2d2::Error> for InfraError {
    fn from(value: r2d2::Error) -> Self {
        InfraError(FeatureGateError::Store(format!("connection pool error: {value}")))
    }
}

/* -------------------------------------------------------------------------- */
/* serde_json::Error → FeatureGateError */
/* -------------------------------------------------------------------------- */

impl IntoFeatureGateError for serde_json::Error {
    fn into_featuregate(self) -> FeatureGateError {
        use serde_json::error::Category;

        match self.classify() {
            Category::Io => FeatureGateError::Internal(format!("JSON I/O error: {self}")),
            Category::Syntax | Category::Data | Category::Eof => {
                FeatureGateError::Serialization(self.to_string())
            }
        }
    }
}

impl From<serde_json::Error> for InfraError {
    fn from(value: serde_json::Error) -> Self {
        InfraError(value.into_featuregate())
    }
}

/* -------------------------------------------------------------------------- */
/* toml::de::Error → FeatureGateError */
/* -------------------------------------------------------------------------- */

impl From<toml::de::Error> for InfraError {
    fn from(value: toml::de::Error) -> Self {
        InfraError(FeatureGateError::Config(format!("Invalid TOML format: {}", value.message())))
    }
}
