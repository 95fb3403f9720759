//!
//! # OpenShift provider
//!
//! Declarative lifecycle management for OpenShift projects, routes and image streams.
//!
mod error;
mod key;
mod lifecycle;
mod provider;
mod schema;

pub mod client;
pub mod config;
pub mod resources;

pub use error::{
    ConfigError, Operation, RemoteError, RemoteErrorKind, ResourceError, ValidationError,
};
pub use key::{DELIMITER, ObjectKey, Scope};
pub use lifecycle::{ResourceAdapter, ResourceData, ResourceManager};
pub use provider::{ImageStreamManager, ProjectManager, Provider, RouteManager};
pub use schema::{FieldDefault, FieldSchema, FieldType};

pub use client::{MemoryClient, RemoteClient, SharedClient};
pub use config::{Connection, ConnectionMode, ProviderConfig, resolve};
pub use resources::{
    ImageStreamAdapter, ImageStreamData, ProjectAdapter, ProjectData, ResourceKind, RouteAdapter,
    RouteData, UnknownKind,
};

pub use openshift_types;
