use std::fmt;
use std::path::PathBuf;

use k8_config::ConfigError as K8ConfigError;

/// Errors raised while resolving the connection to the control plane
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("unknown connection mode '{0}', expected 'cluster' or 'kubeconfig'")]
    InvalidMode(String),
    #[error("invalid provider config")]
    Parse(#[source] serde_yaml::Error),
    #[error("kubeconfig mode requires a kubeconfig path")]
    MissingKubeConfigPath,
    #[error("unable to load kubeconfig {path}")]
    KubeConfig {
        path: PathBuf,
        #[source]
        source: K8ConfigError,
    },
    #[error("kubeconfig has no current context")]
    NoCurrentContext,
    #[error("kubeconfig context refers to unknown cluster '{0}'")]
    UnknownCluster(String),
    #[error("in-cluster credentials not found")]
    NoPodConfig,
    #[error("unable to create kubernetes client")]
    Client(#[source] anyhow::Error),
}

/// Local errors detected before any remote call
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("required field '{0}' is missing")]
    MissingField(&'static str),
    #[error("{field} '{value}' must not contain '{delimiter}'")]
    Delimiter {
        field: &'static str,
        value: String,
        delimiter: char,
    },
    #[error("malformed identifier '{id}': {reason}")]
    MalformedIdentifier { id: String, reason: &'static str },
    #[error("resource has no identifier")]
    MissingIdentifier,
    #[error("field '{0}' cannot be changed in place, the resource must be recreated")]
    ImmutableField(&'static str),
    #[error("invalid value for '{field}': {reason}")]
    InvalidField {
        field: &'static str,
        reason: &'static str,
    },
    #[error("unable to encode resource fields: {0}")]
    Encoding(String),
}

/// Classification of a failed remote call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteErrorKind {
    NotFound,
    Conflict,
    Forbidden,
    Unauthorized,
    Invalid,
    Transient,
    Other,
}

impl RemoteErrorKind {
    /// map http status returned by the api server
    pub fn from_status(code: u16) -> Self {
        match code {
            401 => Self::Unauthorized,
            403 => Self::Forbidden,
            404 => Self::NotFound,
            409 => Self::Conflict,
            400 | 422 => Self::Invalid,
            408 | 429 | 500..=599 => Self::Transient,
            _ => Self::Other,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotFound => "not found",
            Self::Conflict => "conflict",
            Self::Forbidden => "forbidden",
            Self::Unauthorized => "unauthorized",
            Self::Invalid => "invalid",
            Self::Transient => "transient",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for RemoteErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Failure reported by a remote client, carrying its classification
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("{kind}: {message}")]
pub struct RemoteError {
    kind: RemoteErrorKind,
    message: String,
}

impl RemoteError {
    pub fn new(kind: RemoteErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(RemoteErrorKind::NotFound, message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(RemoteErrorKind::Conflict, message)
    }

    pub fn kind(&self) -> RemoteErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn is_not_found(&self) -> bool {
        self.kind == RemoteErrorKind::NotFound
    }
}

/// lifecycle operation, used as error context
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Create,
    Read,
    Update,
    Delete,
    Import,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let verb = match self {
            Self::Create => "creating",
            Self::Read => "reading",
            Self::Update => "updating",
            Self::Delete => "deleting",
            Self::Import => "importing",
        };
        write!(f, "{verb}")
    }
}

/// Errors returned by lifecycle operations
#[derive(thiserror::Error, Debug)]
pub enum ResourceError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("error {operation} {kind} {id}")]
    Remote {
        operation: Operation,
        kind: &'static str,
        id: String,
        #[source]
        source: RemoteError,
    },
}

impl ResourceError {
    pub fn remote(
        operation: Operation,
        kind: &'static str,
        id: impl Into<String>,
        source: RemoteError,
    ) -> Self {
        Self::Remote {
            operation,
            kind,
            id: id.into(),
            source,
        }
    }

    /// classification of the underlying remote failure, if any
    pub fn remote_kind(&self) -> Option<RemoteErrorKind> {
        match self {
            Self::Remote { source, .. } => Some(source.kind()),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.remote_kind() == Some(RemoteErrorKind::NotFound)
    }
}

#[cfg(test)]
mod test {

    use super::*;

    #[test]
    fn test_status_classification() {
        assert_eq!(RemoteErrorKind::from_status(404), RemoteErrorKind::NotFound);
        assert_eq!(RemoteErrorKind::from_status(409), RemoteErrorKind::Conflict);
        assert_eq!(RemoteErrorKind::from_status(403), RemoteErrorKind::Forbidden);
        assert_eq!(RemoteErrorKind::from_status(422), RemoteErrorKind::Invalid);
        assert_eq!(RemoteErrorKind::from_status(503), RemoteErrorKind::Transient);
        assert_eq!(RemoteErrorKind::from_status(302), RemoteErrorKind::Other);
    }

    #[test]
    fn test_wrapping_keeps_classification() {
        let err = ResourceError::remote(
            Operation::Delete,
            "route",
            "default/api",
            RemoteError::new(RemoteErrorKind::Forbidden, "routes is forbidden"),
        );

        assert_eq!(err.remote_kind(), Some(RemoteErrorKind::Forbidden));
        assert!(!err.is_not_found());
        assert_eq!(err.to_string(), "error deleting route default/api");
        let source = std::error::Error::source(&err).expect("source");
        assert_eq!(source.to_string(), "forbidden: routes is forbidden");
    }

    #[test]
    fn test_local_errors_have_no_remote_kind() {
        let err: ResourceError = ValidationError::MissingIdentifier.into();
        assert_eq!(err.remote_kind(), None);
        assert!(!err.is_not_found());
    }
}
