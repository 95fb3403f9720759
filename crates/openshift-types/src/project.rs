use serde::Deserialize;
use serde::Serialize;

use k8_types::{Crd, CrdNames, DefaultHeader, Spec, Status};

use crate::{PROJECT_GROUP, V1};

/// annotation holding the human readable project name
pub const DISPLAY_NAME_ANNOTATION: &str = "openshift.io/display-name";

/// annotation holding the project description
pub const DESCRIPTION_ANNOTATION: &str = "openshift.io/description";

const PROJECT_API: Crd = Crd {
    group: PROJECT_GROUP,
    version: V1,
    names: CrdNames {
        kind: "Project",
        plural: "projects",
        singular: "project",
    },
};

#[derive(Deserialize, Serialize, Debug, Default, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ProjectSpec {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub finalizers: Vec<String>,
}

impl Spec for ProjectSpec {
    type Status = ProjectStatus;
    type Header = DefaultHeader;

    // projects live at cluster scope
    const NAME_SPACED: bool = false;

    fn metadata() -> &'static Crd {
        &PROJECT_API
    }
}

#[derive(Deserialize, Serialize, Debug, Default, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ProjectStatus {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phase: Option<String>,
}

impl Status for ProjectStatus {}

#[cfg(test)]
mod test {

    use k8_types::Spec;

    use super::ProjectSpec;

    #[test]
    fn test_project_api() {
        assert_eq!(ProjectSpec::api_version(), "project.openshift.io/v1");
        assert_eq!(ProjectSpec::kind(), "Project");
        assert!(!ProjectSpec::NAME_SPACED);
    }

    #[test]
    fn test_project_spec_decode() {
        let spec: ProjectSpec =
            serde_json::from_str(r#"{"finalizers":["kubernetes"]}"#).expect("decode");
        assert_eq!(spec.finalizers, vec!["kubernetes".to_owned()]);

        let empty: ProjectSpec = serde_json::from_str("{}").expect("decode");
        assert!(empty.finalizers.is_empty());
    }
}
