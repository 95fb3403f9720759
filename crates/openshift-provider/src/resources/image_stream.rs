use serde::{Deserialize, Serialize};

use k8_types::{K8Obj, ObjectMeta};
use openshift_types::image::{ImageLookupPolicy, ImageStreamSpec};

use crate::error::ValidationError;
use crate::key::ObjectKey;
use crate::lifecycle::{ResourceAdapter, ResourceData};
use crate::schema::{FieldDefault, FieldSchema, FieldType};

const IMAGE_STREAM_FIELDS: &[FieldSchema] = &[
    FieldSchema::new("project", FieldType::String)
        .required()
        .immutable()
        .describe("Project the image stream belongs to."),
    FieldSchema::new("name", FieldType::String)
        .required()
        .immutable()
        .describe("Name of the image stream."),
    FieldSchema::new("spec.docker_image_repository", FieldType::String)
        .required()
        .immutable()
        .describe("Upstream repository the stream tracks."),
    FieldSchema::new("spec.lookup_policy.local", FieldType::Bool)
        .default_value(FieldDefault::Bool(false))
        .describe("Resolve the stream by short name within the project."),
    FieldSchema::new("status.docker_image_repository", FieldType::String)
        .computed()
        .describe("Internal registry location of the stream."),
    FieldSchema::new("status.public_docker_image_repository", FieldType::String)
        .computed()
        .describe("Externally reachable registry location of the stream."),
];

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageStreamData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub project: String,
    pub name: String,
    pub spec: ImageStreamSpecData,
    pub status: ImageStreamStatusData,
}

impl ImageStreamData {
    pub fn new(
        project: impl Into<String>,
        name: impl Into<String>,
        docker_image_repository: impl Into<String>,
    ) -> Self {
        Self {
            project: project.into(),
            name: name.into(),
            spec: ImageStreamSpecData {
                docker_image_repository: docker_image_repository.into(),
                ..Default::default()
            },
            ..Default::default()
        }
    }
}

impl ResourceData for ImageStreamData {
    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn set_id(&mut self, id: Option<String>) {
        self.id = id;
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageStreamSpecData {
    pub docker_image_repository: String,
    pub lookup_policy: LookupPolicyData,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LookupPolicyData {
    pub local: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageStreamStatusData {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub docker_image_repository: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_docker_image_repository: Option<String>,
}

pub struct ImageStreamAdapter;

impl ResourceAdapter for ImageStreamAdapter {
    type K8Spec = ImageStreamSpec;
    type Data = ImageStreamData;

    const LABEL: &'static str = "image_stream";

    fn schema() -> &'static [FieldSchema] {
        IMAGE_STREAM_FIELDS
    }

    fn object_key(data: &ImageStreamData) -> Result<ObjectKey, ValidationError> {
        ObjectKey::namespaced(data.project.clone(), data.name.clone())
    }

    fn build(
        data: &ImageStreamData,
        base: ObjectMeta,
        current: Option<&ImageStreamSpec>,
    ) -> (ObjectMeta, ImageStreamSpec) {
        let spec = ImageStreamSpec {
            docker_image_repository: data.spec.docker_image_repository.clone(),
            lookup_policy: ImageLookupPolicy {
                local: data.spec.lookup_policy.local,
            },
            // tags are managed outside the provider
            extra: current
                .map(|current| current.extra.clone())
                .unwrap_or_default(),
        };
        (base, spec)
    }

    fn observe(object: K8Obj<ImageStreamSpec>, data: &mut ImageStreamData) {
        data.project = object.metadata.namespace;
        data.name = object.metadata.name;
        data.spec.docker_image_repository = object.spec.docker_image_repository;
        data.spec.lookup_policy.local = object.spec.lookup_policy.local;
        data.status.docker_image_repository = object.status.docker_image_repository;
        data.status.public_docker_image_repository = object.status.public_docker_image_repository;
    }
}

#[cfg(test)]
mod test {

    use k8_types::K8Obj;
    use openshift_types::image::ImageStreamSpec;

    use crate::error::ValidationError;
    use crate::lifecycle::ResourceAdapter;
    use crate::schema::{changed_immutable, check_required};

    use super::{ImageStreamAdapter, ImageStreamData};

    #[test]
    fn test_lookup_policy_defaults_to_false() {
        let data: ImageStreamData = serde_yaml::from_str(
            "project: shop\nname: api\nspec:\n  docker_image_repository: quay.io/acme/api\n",
        )
        .expect("decode");
        assert!(!data.spec.lookup_policy.local);
        assert!(check_required(ImageStreamAdapter::schema(), &data).is_ok());
    }

    #[test]
    fn test_repository_is_required() {
        let data = ImageStreamData::new("shop", "api", "");
        assert_eq!(
            check_required(ImageStreamAdapter::schema(), &data),
            Err(ValidationError::MissingField("spec.docker_image_repository"))
        );
    }

    #[test]
    fn test_repository_is_immutable() {
        let prior = ImageStreamData::new("shop", "api", "quay.io/acme/api");
        let mut desired = prior.clone();
        desired.spec.lookup_policy.local = true;
        assert_eq!(
            changed_immutable(ImageStreamAdapter::schema(), &prior, &desired).expect("encode"),
            None
        );

        desired.spec.docker_image_repository = "quay.io/acme/web".to_owned();
        assert_eq!(
            changed_immutable(ImageStreamAdapter::schema(), &prior, &desired).expect("encode"),
            Some("spec.docker_image_repository")
        );
    }

    #[test]
    fn test_update_keeps_tags() {
        let current: ImageStreamSpec = serde_json::from_value(serde_json::json!({
            "dockerImageRepository": "quay.io/acme/api",
            "lookupPolicy": { "local": false },
            "tags": [{ "name": "latest" }]
        }))
        .expect("decode");

        let mut data = ImageStreamData::new("shop", "api", "quay.io/acme/api");
        data.spec.lookup_policy.local = true;
        let key = ImageStreamAdapter::object_key(&data).expect("key");
        let (_, spec) = ImageStreamAdapter::build(&data, key.object_meta(), Some(&current));

        assert!(spec.lookup_policy.local);
        assert_eq!(spec.extra, current.extra);
        let encoded = serde_json::to_value(&spec).expect("encode");
        assert_eq!(encoded["tags"][0]["name"], "latest");
    }

    #[test]
    fn test_status_is_observed() {
        let data = ImageStreamData::new("shop", "api", "quay.io/acme/api");
        let key = ImageStreamAdapter::object_key(&data).expect("key");
        let (meta, spec) = ImageStreamAdapter::build(&data, key.object_meta(), None);

        let mut object = K8Obj::new("api".to_owned(), spec);
        object.metadata = meta;
        object.status.docker_image_repository =
            "image-registry.openshift-image-registry.svc:5000/shop/api".to_owned();

        let mut observed = ImageStreamData::default();
        ImageStreamAdapter::observe(object, &mut observed);
        assert_eq!(observed.project, "shop");
        assert_eq!(observed.spec, data.spec);
        assert_eq!(
            observed.status.docker_image_repository,
            "image-registry.openshift-image-registry.svc:5000/shop/api"
        );
    }
}
