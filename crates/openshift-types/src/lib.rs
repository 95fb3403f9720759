//!
//! # OpenShift objects
//!
//! `k8_types::Spec` definitions for the OpenShift API groups managed by the provider.
//!
pub mod project;
pub mod route;
pub mod image;

pub use k8_types;

pub const V1: &str = "v1";

pub const PROJECT_GROUP: &str = "project.openshift.io";
pub const ROUTE_GROUP: &str = "route.openshift.io";
pub const IMAGE_GROUP: &str = "image.openshift.io";
