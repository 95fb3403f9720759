use serde::Deserialize;
use serde::Serialize;
use serde_json::{Map, Value};

use k8_types::{Crd, CrdNames, DefaultHeader, Int32OrString, Spec, Status};

use crate::{ROUTE_GROUP, V1};

/// TLS termination where the router passes encrypted traffic to the service
pub const TERMINATION_PASSTHROUGH: &str = "passthrough";

/// insecure edge policy that sends plain http clients to https
pub const INSECURE_POLICY_REDIRECT: &str = "Redirect";

const ROUTE_API: Crd = Crd {
    group: ROUTE_GROUP,
    version: V1,
    names: CrdNames {
        kind: "Route",
        plural: "routes",
        singular: "route",
    },
};

#[derive(Deserialize, Serialize, Debug, Default, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RouteSpec {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub host: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    pub to: RouteTargetReference,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<RoutePort>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tls: Option<TlsConfig>,
    /// fields not managed by the provider, such as `alternateBackends` or `wildcardPolicy`
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Spec for RouteSpec {
    type Status = RouteStatus;
    type Header = DefaultHeader;

    fn metadata() -> &'static Crd {
        &ROUTE_API
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RouteTargetReference {
    pub kind: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<i32>,
}

impl Default for RouteTargetReference {
    fn default() -> Self {
        Self::service("")
    }
}

impl RouteTargetReference {
    pub fn service(name: impl Into<String>) -> Self {
        Self {
            kind: "Service".to_owned(),
            name: name.into(),
            weight: None,
        }
    }
}

/// target port, either a number or the name of a service port
#[derive(Deserialize, Serialize, Debug, Default, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RoutePort {
    pub target_port: Int32OrString,
}

impl RoutePort {
    pub fn number(&self) -> Option<i32> {
        match self.target_port {
            Int32OrString::Int(port) => Some(port),
            Int32OrString::String(_) => None,
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Default, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TlsConfig {
    pub termination: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub insecure_edge_termination_policy: Option<String>,
    /// certificates and keys
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TlsConfig {
    pub fn is_passthrough(&self) -> bool {
        self.termination == TERMINATION_PASSTHROUGH
    }
}

#[derive(Deserialize, Serialize, Debug, Default, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RouteStatus {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ingress: Vec<RouteIngress>,
}

impl Status for RouteStatus {}

#[derive(Deserialize, Serialize, Debug, Default, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RouteIngress {
    #[serde(default)]
    pub host: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub router_name: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<RouteIngressCondition>,
}

impl RouteIngress {
    /// router has accepted the route
    pub fn is_admitted(&self) -> bool {
        self.conditions
            .iter()
            .any(|condition| condition.r#type == "Admitted" && condition.status == "True")
    }
}

#[derive(Deserialize, Serialize, Debug, Default, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RouteIngressCondition {
    pub r#type: String,
    pub status: String,
}
