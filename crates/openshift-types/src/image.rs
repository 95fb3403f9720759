use serde::Deserialize;
use serde::Serialize;
use serde_json::{Map, Value};

use k8_types::{Crd, CrdNames, DefaultHeader, Spec, Status};

use crate::{IMAGE_GROUP, V1};

const IMAGE_STREAM_API: Crd = Crd {
    group: IMAGE_GROUP,
    version: V1,
    names: CrdNames {
        kind: "ImageStream",
        plural: "imagestreams",
        singular: "imagestream",
    },
};

#[derive(Deserialize, Serialize, Debug, Default, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ImageStreamSpec {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub docker_image_repository: String,
    #[serde(default)]
    pub lookup_policy: ImageLookupPolicy,
    /// fields not managed by the provider, such as `tags`
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Spec for ImageStreamSpec {
    type Status = ImageStreamStatus;
    type Header = DefaultHeader;

    fn metadata() -> &'static Crd {
        &IMAGE_STREAM_API
    }
}

/// controls whether pods in the namespace resolve the stream by its short name
#[derive(Deserialize, Serialize, Debug, Default, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ImageLookupPolicy {
    #[serde(default)]
    pub local: bool,
}

#[derive(Deserialize, Serialize, Debug, Default, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ImageStreamStatus {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub docker_image_repository: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_docker_image_repository: Option<String>,
}

impl Status for ImageStreamStatus {}

#[cfg(test)]
mod test {

    use super::*;

    #[test]
    fn test_image_stream_decode() {
        let spec: ImageStreamSpec = serde_json::from_str(
            r#"{"dockerImageRepository":"quay.io/acme/api","lookupPolicy":{"local":true}}"#,
        )
        .expect("decode");
        assert_eq!(spec.docker_image_repository, "quay.io/acme/api");
        assert!(spec.lookup_policy.local);

        let spec: ImageStreamSpec = serde_json::from_str("{}").expect("decode");
        assert!(!spec.lookup_policy.local);
        assert!(spec.extra.is_empty());
    }

    #[test]
    fn test_tags_survive_round_trip() {
        let source = serde_json::json!({
            "dockerImageRepository": "quay.io/acme/api",
            "lookupPolicy": { "local": false },
            "tags": [{ "name": "latest", "from": { "kind": "DockerImage", "name": "quay.io/acme/api:latest" } }]
        });
        let spec: ImageStreamSpec = serde_json::from_value(source.clone()).expect("decode");
        assert!(spec.extra.contains_key("tags"));

        let encoded = serde_json::to_value(&spec).expect("encode");
        assert_eq!(encoded, source);
    }
}
