//!
//! # Resource identifiers
//!
//! Cluster scoped objects are identified by their name, namespaced objects by
//! `<namespace>/<name>`.
//!
use std::fmt;

use k8_types::{InputObjectMeta, ObjectMeta};

use crate::error::ValidationError;

pub const DELIMITER: char = '/';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    Cluster,
    Namespaced,
}

/// Address of one remote object
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjectKey {
    namespace: Option<String>,
    name: String,
}

impl ObjectKey {
    pub fn cluster(name: impl Into<String>) -> Result<Self, ValidationError> {
        let name = segment("name", name.into())?;
        Ok(Self {
            namespace: None,
            name,
        })
    }

    pub fn namespaced(
        namespace: impl Into<String>,
        name: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let namespace = segment("namespace", namespace.into())?;
        let name = segment("name", name.into())?;
        Ok(Self {
            namespace: Some(namespace),
            name,
        })
    }

    /// key of an object as reported by the server
    pub fn from_meta(scope: Scope, meta: &ObjectMeta) -> Result<Self, ValidationError> {
        match scope {
            Scope::Cluster => Self::cluster(meta.name.clone()),
            Scope::Namespaced => Self::namespaced(meta.namespace.clone(), meta.name.clone()),
        }
    }

    /// parse an identifier, it must contain exactly as many delimiters as the scope requires
    pub fn decode(scope: Scope, id: &str) -> Result<Self, ValidationError> {
        let malformed = |reason| ValidationError::MalformedIdentifier {
            id: id.to_owned(),
            reason,
        };

        match scope {
            Scope::Cluster => {
                if id.contains(DELIMITER) {
                    return Err(malformed("cluster scoped identifier must be a bare name"));
                }
                if id.is_empty() {
                    return Err(malformed("name is empty"));
                }
                Ok(Self {
                    namespace: None,
                    name: id.to_owned(),
                })
            }
            Scope::Namespaced => {
                let Some((namespace, name)) = id.split_once(DELIMITER) else {
                    return Err(malformed("expected <namespace>/<name>"));
                };
                if name.contains(DELIMITER) {
                    return Err(malformed("expected exactly one delimiter"));
                }
                if namespace.is_empty() || name.is_empty() {
                    return Err(malformed("namespace and name must not be empty"));
                }
                Ok(Self {
                    namespace: Some(namespace.to_owned()),
                    name: name.to_owned(),
                })
            }
        }
    }

    pub fn encode(&self) -> String {
        self.to_string()
    }

    pub fn scope(&self) -> Scope {
        if self.namespace.is_some() {
            Scope::Namespaced
        } else {
            Scope::Cluster
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    /// metadata used to address the object in get and delete calls
    pub fn as_input_meta(&self) -> InputObjectMeta {
        InputObjectMeta::named(self.name.clone(), self.namespace.clone().unwrap_or_default())
    }

    /// empty metadata for a new object under this key
    pub fn object_meta(&self) -> ObjectMeta {
        ObjectMeta {
            name: self.name.clone(),
            namespace: self.namespace.clone().unwrap_or_default(),
            ..Default::default()
        }
    }
}

impl fmt::Display for ObjectKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.namespace {
            Some(namespace) => write!(f, "{}{}{}", namespace, DELIMITER, self.name),
            None => write!(f, "{}", self.name),
        }
    }
}

fn segment(field: &'static str, value: String) -> Result<String, ValidationError> {
    if value.is_empty() {
        return Err(ValidationError::MissingField(field));
    }
    if value.contains(DELIMITER) {
        return Err(ValidationError::Delimiter {
            field,
            value,
            delimiter: DELIMITER,
        });
    }
    Ok(value)
}
