use serde::{Deserialize, Serialize};

use k8_types::{K8Obj, ObjectMeta};
use openshift_types::project::{DESCRIPTION_ANNOTATION, DISPLAY_NAME_ANNOTATION, ProjectSpec};

use crate::error::ValidationError;
use crate::key::ObjectKey;
use crate::lifecycle::{ResourceAdapter, ResourceData};
use crate::schema::{FieldSchema, FieldType};

const PROJECT_FIELDS: &[FieldSchema] = &[
    FieldSchema::new("name", FieldType::String)
        .required()
        .immutable()
        .describe("Name of the project."),
    FieldSchema::new("display_name", FieldType::String)
        .describe("Human readable name, stored in the openshift.io/display-name annotation."),
    FieldSchema::new("description", FieldType::String)
        .describe("Description, stored in the openshift.io/description annotation."),
];

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl ProjectData {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = Some(display_name.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

impl ResourceData for ProjectData {
    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn set_id(&mut self, id: Option<String>) {
        self.id = id;
    }
}

/// Cluster scoped projects. Display name and description have no field in the
/// project api and are kept as annotations.
pub struct ProjectAdapter;

impl ResourceAdapter for ProjectAdapter {
    type K8Spec = ProjectSpec;
    type Data = ProjectData;

    const LABEL: &'static str = "project";

    fn schema() -> &'static [FieldSchema] {
        PROJECT_FIELDS
    }

    fn object_key(data: &ProjectData) -> Result<ObjectKey, ValidationError> {
        ObjectKey::cluster(data.name.clone())
    }

    fn build(
        data: &ProjectData,
        mut base: ObjectMeta,
        current: Option<&ProjectSpec>,
    ) -> (ObjectMeta, ProjectSpec) {
        set_annotation(&mut base, DISPLAY_NAME_ANNOTATION, data.display_name.as_ref());
        set_annotation(&mut base, DESCRIPTION_ANNOTATION, data.description.as_ref());

        // finalizers belong to the server
        let spec = current.cloned().unwrap_or_default();
        (base, spec)
    }

    fn observe(object: K8Obj<ProjectSpec>, data: &mut ProjectData) {
        let annotation = |key: &str| {
            object
                .metadata
                .annotations
                .get(key)
                .filter(|value| !value.is_empty())
                .cloned()
        };

        data.display_name = annotation(DISPLAY_NAME_ANNOTATION);
        data.description = annotation(DESCRIPTION_ANNOTATION);
        data.name = object.metadata.name;
    }
}

/// write the managed annotation, or drop it when the field is unset
fn set_annotation(meta: &mut ObjectMeta, key: &str, value: Option<&String>) {
    match value {
        Some(value) => {
            meta.annotations.insert(key.to_owned(), value.clone());
        }
        None => {
            meta.annotations.remove(key);
        }
    }
}
