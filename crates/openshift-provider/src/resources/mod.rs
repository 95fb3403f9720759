pub mod image_stream;
pub mod project;
pub mod route;

use std::fmt;
use std::str::FromStr;

use crate::lifecycle::ResourceAdapter;
use crate::schema::FieldSchema;

pub use image_stream::{ImageStreamAdapter, ImageStreamData};
pub use project::{ProjectAdapter, ProjectData};
pub use route::{RouteAdapter, RouteData};

/// Kinds managed by the provider
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Project,
    Route,
    ImageStream,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 3] = [Self::Project, Self::Route, Self::ImageStream];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Project => ProjectAdapter::LABEL,
            Self::Route => RouteAdapter::LABEL,
            Self::ImageStream => ImageStreamAdapter::LABEL,
        }
    }

    pub fn schema(&self) -> &'static [FieldSchema] {
        match self {
            Self::Project => ProjectAdapter::schema(),
            Self::Route => RouteAdapter::schema(),
            Self::ImageStream => ImageStreamAdapter::schema(),
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
#[error("unknown resource kind '{0}'")]
pub struct UnknownKind(pub String);

impl FromStr for ResourceKind {
    type Err = UnknownKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.label() == s)
            .ok_or_else(|| UnknownKind(s.to_owned()))
    }
}
