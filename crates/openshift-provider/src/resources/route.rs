use serde::{Deserialize, Serialize};

use k8_types::{K8Obj, ObjectMeta};
use k8_types::Int32OrString;
use openshift_types::route::{
    INSECURE_POLICY_REDIRECT, RoutePort, RouteSpec, RouteTargetReference,
    TERMINATION_PASSTHROUGH, TlsConfig,
};

use crate::error::ValidationError;
use crate::key::ObjectKey;
use crate::lifecycle::{ResourceAdapter, ResourceData};
use crate::schema::{FieldDefault, FieldSchema, FieldType};

pub const DEFAULT_NAMESPACE: &str = "default";

const ROUTE_FIELDS: &[FieldSchema] = &[
    FieldSchema::new("name", FieldType::String)
        .required()
        .immutable()
        .describe("A unique name for the route within the project."),
    FieldSchema::new("namespace", FieldType::String)
        .immutable()
        .default_value(FieldDefault::Str(DEFAULT_NAMESPACE))
        .describe("Project the route belongs to."),
    FieldSchema::new("spec.host", FieldType::String)
        .immutable()
        .computed()
        .describe("Public hostname for the route. If not specified, a hostname is generated."),
    FieldSchema::new("spec.path", FieldType::String)
        .describe("Path that the router watches to route traffic to the service."),
    FieldSchema::new("spec.target.service_name", FieldType::String)
        .required()
        .describe("Service to route to."),
    FieldSchema::new("spec.port.port", FieldType::Int).describe("Target port for traffic."),
    FieldSchema::new("spec.tls.tls", FieldType::Bool)
        .default_value(FieldDefault::Bool(false))
        .describe("Pass TLS traffic through to the service."),
    FieldSchema::new("spec.tls.insecure_redirect", FieldType::Bool)
        .default_value(FieldDefault::Bool(false))
        .describe("Redirect unsecured traffic to TLS."),
    FieldSchema::new("status.admitted_hosts", FieldType::List)
        .computed()
        .describe("Hosts under which routers have admitted the route."),
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouteData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    pub namespace: String,
    pub spec: RouteSpecData,
    pub status: RouteStatusData,
}

impl Default for RouteData {
    fn default() -> Self {
        Self {
            id: None,
            name: String::new(),
            namespace: DEFAULT_NAMESPACE.to_owned(),
            spec: RouteSpecData::default(),
            status: RouteStatusData::default(),
        }
    }
}

impl RouteData {
    pub fn new(name: impl Into<String>, service_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            spec: RouteSpecData {
                target: RouteTargetData {
                    service_name: service_name.into(),
                },
                ..Default::default()
            },
            ..Default::default()
        }
    }
}

impl ResourceData for RouteData {
    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn set_id(&mut self, id: Option<String>) {
        self.id = id;
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouteSpecData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    pub target: RouteTargetData,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<RoutePortData>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tls: Option<RouteTlsData>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouteTargetData {
    pub service_name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutePortData {
    pub port: i32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouteTlsData {
    pub tls: bool,
    pub insecure_redirect: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouteStatusData {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub admitted_hosts: Vec<String>,
}

/// Namespaced routes exposing a service
pub struct RouteAdapter;

impl ResourceAdapter for RouteAdapter {
    type K8Spec = RouteSpec;
    type Data = RouteData;

    const LABEL: &'static str = "route";

    fn schema() -> &'static [FieldSchema] {
        ROUTE_FIELDS
    }

    fn object_key(data: &RouteData) -> Result<ObjectKey, ValidationError> {
        ObjectKey::namespaced(data.namespace.clone(), data.name.clone())
    }

    fn validate(data: &RouteData) -> Result<(), ValidationError> {
        if let Some(tls) = &data.spec.tls {
            if tls.insecure_redirect && !tls.tls {
                return Err(ValidationError::InvalidField {
                    field: "spec.tls.insecure_redirect",
                    reason: "requires spec.tls.tls",
                });
            }
        }
        if let Some(port) = &data.spec.port {
            if !(1..=65535).contains(&port.port) {
                return Err(ValidationError::InvalidField {
                    field: "spec.port.port",
                    reason: "must be between 1 and 65535",
                });
            }
        }
        Ok(())
    }

    fn build(
        data: &RouteData,
        base: ObjectMeta,
        current: Option<&RouteSpec>,
    ) -> (ObjectMeta, RouteSpec) {
        let spec = &data.spec;

        // keep a generated host unless one is declared
        let host = spec
            .host
            .clone()
            .or_else(|| current.map(|current| current.host.clone()))
            .unwrap_or_default();

        let current_tls = current.and_then(|current| current.tls.as_ref());
        let tls = match spec.tls.as_ref().filter(|tls| tls.tls) {
            Some(tls) => Some(TlsConfig {
                termination: TERMINATION_PASSTHROUGH.to_owned(),
                insecure_edge_termination_policy: tls
                    .insecure_redirect
                    .then(|| INSECURE_POLICY_REDIRECT.to_owned()),
                extra: current_tls
                    .filter(|current| current.is_passthrough())
                    .map(|current| current.extra.clone())
                    .unwrap_or_default(),
            }),
            // edge and reencrypt termination are left as configured on the server
            None => current_tls.filter(|current| !current.is_passthrough()).cloned(),
        };

        // named target ports are not tracked and survive an unset port
        let port = match &spec.port {
            Some(port) => Some(RoutePort {
                target_port: Int32OrString::Int(port.port),
            }),
            None => current
                .and_then(|current| current.port.as_ref())
                .filter(|port| port.number().is_none())
                .cloned(),
        };

        let route = RouteSpec {
            host,
            path: spec.path.clone(),
            to: RouteTargetReference {
                weight: current.and_then(|current| current.to.weight),
                ..RouteTargetReference::service(spec.target.service_name.clone())
            },
            port,
            tls,
            extra: current
                .map(|current| current.extra.clone())
                .unwrap_or_default(),
        };

        (base, route)
    }

    fn observe(object: K8Obj<RouteSpec>, data: &mut RouteData) {
        let route = object.spec;

        data.name = object.metadata.name;
        data.namespace = object.metadata.namespace;
        data.spec.host = Some(route.host).filter(|host| !host.is_empty());
        data.spec.path = route.path.filter(|path| !path.is_empty());
        data.spec.target.service_name = route.to.name;
        data.spec.port = route
            .port
            .and_then(|port| port.number())
            .map(|port| RoutePortData { port });
        data.spec.tls = match route.tls {
            Some(tls) if tls.is_passthrough() => Some(RouteTlsData {
                tls: true,
                insecure_redirect: tls.insecure_edge_termination_policy.as_deref()
                    == Some(INSECURE_POLICY_REDIRECT),
            }),
            // termination managed outside the provider
            Some(_) => Some(RouteTlsData::default()),
            // tls block declared as disabled
            None => data.spec.tls.as_ref().map(|_| RouteTlsData::default()),
        };
        data.status.admitted_hosts = object
            .status
            .ingress
            .iter()
            .filter(|ingress| ingress.is_admitted())
            .map(|ingress| ingress.host.clone())
            .collect();
    }
}
