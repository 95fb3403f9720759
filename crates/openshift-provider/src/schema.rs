//!
//! # Declared fields
//!
//! Each resource kind declares its fields with their type and flags. Paths are
//! dotted and follow the nesting of the resource data (`spec.lookup_policy.local`).
//!
use serde::Serialize;
use serde_json::Value;

use crate::error::ValidationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    String,
    Bool,
    Int,
    List,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldDefault {
    Bool(bool),
    Str(&'static str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSchema {
    pub path: &'static str,
    pub ty: FieldType,
    pub required: bool,
    /// a change requires the object to be recreated
    pub immutable: bool,
    /// value may be filled in by the server
    pub computed: bool,
    pub default: Option<FieldDefault>,
    pub description: &'static str,
}

impl FieldSchema {
    pub const fn new(path: &'static str, ty: FieldType) -> Self {
        Self {
            path,
            ty,
            required: false,
            immutable: false,
            computed: false,
            default: None,
            description: "",
        }
    }

    pub const fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub const fn immutable(mut self) -> Self {
        self.immutable = true;
        self
    }

    pub const fn computed(mut self) -> Self {
        self.computed = true;
        self
    }

    pub const fn default_value(mut self, default: FieldDefault) -> Self {
        self.default = Some(default);
        self
    }

    pub const fn describe(mut self, description: &'static str) -> Self {
        self.description = description;
        self
    }

    fn lookup<'a>(&self, value: &'a Value) -> Option<&'a Value> {
        self.path
            .split('.')
            .try_fold(value, |current, segment| current.get(segment))
            .filter(|found| !is_unset(found))
    }
}

fn is_unset(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

fn encode<D: Serialize>(data: &D) -> Result<Value, ValidationError> {
    serde_json::to_value(data).map_err(|err| ValidationError::Encoding(err.to_string()))
}

/// every required field is present and not empty
pub fn check_required<D: Serialize>(
    fields: &'static [FieldSchema],
    data: &D,
) -> Result<(), ValidationError> {
    let value = encode(data)?;
    match fields
        .iter()
        .find(|field| field.required && field.lookup(&value).is_none())
    {
        Some(field) => Err(ValidationError::MissingField(field.path)),
        None => Ok(()),
    }
}

/// first immutable field whose value differs between prior and desired state.
/// Computed fields left unset in the desired state keep the server's value.
pub fn changed_immutable<D: Serialize>(
    fields: &'static [FieldSchema],
    prior: &D,
    desired: &D,
) -> Result<Option<&'static str>, ValidationError> {
    let prior = encode(prior)?;
    let desired = encode(desired)?;

    Ok(fields
        .iter()
        .filter(|field| field.immutable)
        .find(|field| {
            let wanted = field.lookup(&desired);
            if wanted.is_none() && field.computed {
                return false;
            }
            field.lookup(&prior) != wanted
        })
        .map(|field| field.path))
}

#[cfg(test)]
mod test {

    use serde::Serialize;

    use super::*;

    #[derive(Serialize, Default, Clone)]
    struct Sample {
        name: String,
        spec: SampleSpec,
    }

    #[derive(Serialize, Default, Clone)]
    struct SampleSpec {
        host: Option<String>,
        local: bool,
    }

    const FIELDS: &[FieldSchema] = &[
        FieldSchema::new("name", FieldType::String).required().immutable(),
        FieldSchema::new("spec.host", FieldType::String)
            .immutable()
            .computed(),
        FieldSchema::new("spec.local", FieldType::Bool).default_value(FieldDefault::Bool(false)),
    ];

    fn sample(name: &str, host: Option<&str>) -> Sample {
        Sample {
            name: name.to_owned(),
            spec: SampleSpec {
                host: host.map(str::to_owned),
                local: false,
            },
        }
    }

    #[test]
    fn test_required_field() {
        assert_eq!(
            check_required(FIELDS, &sample("", None)),
            Err(ValidationError::MissingField("name"))
        );
        assert!(check_required(FIELDS, &sample("api", None)).is_ok());
    }

    #[test]
    fn test_changed_immutable() {
        let prior = sample("api", Some("api.example.com"));

        let renamed = sample("web", Some("api.example.com"));
        assert_eq!(
            changed_immutable(FIELDS, &prior, &renamed).expect("encode"),
            Some("name")
        );

        let rehosted = sample("api", Some("web.example.com"));
        assert_eq!(
            changed_immutable(FIELDS, &prior, &rehosted).expect("encode"),
            Some("spec.host")
        );

        // server generated host is kept when left unset
        let unset_host = sample("api", None);
        assert_eq!(
            changed_immutable(FIELDS, &prior, &unset_host).expect("encode"),
            None
        );

        let mut flipped = prior.clone();
        flipped.spec.local = true;
        assert_eq!(
            changed_immutable(FIELDS, &prior, &flipped).expect("encode"),
            None
        );
    }
}
