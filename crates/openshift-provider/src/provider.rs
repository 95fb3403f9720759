use k8_client::{K8Client, SharedK8Client};

use crate::config::{Connection, ProviderConfig, resolve};
use crate::error::ConfigError;
use crate::lifecycle::ResourceManager;
use crate::resources::{ImageStreamAdapter, ProjectAdapter, RouteAdapter};

pub type ProjectManager = ResourceManager<ProjectAdapter, K8Client>;
pub type RouteManager = ResourceManager<RouteAdapter, K8Client>;
pub type ImageStreamManager = ResourceManager<ImageStreamAdapter, K8Client>;

/// Entry point: one resolved connection shared by the managers of every kind
#[derive(Debug, Clone)]
pub struct Provider {
    connection: Connection,
}

impl Provider {
    pub fn new(connection: Connection) -> Self {
        Self { connection }
    }

    /// resolve the connection and build the provider
    pub fn configure(config: &ProviderConfig) -> Result<Self, ConfigError> {
        Ok(Self::new(resolve(config)?))
    }

    pub fn connection(&self) -> &Connection {
        &self.connection
    }

    pub fn client(&self) -> SharedK8Client {
        self.connection.client().clone()
    }

    pub fn projects(&self) -> ProjectManager {
        ResourceManager::new(self.client())
    }

    pub fn routes(&self) -> RouteManager {
        ResourceManager::new(self.client())
    }

    pub fn image_streams(&self) -> ImageStreamManager {
        ResourceManager::new(self.client())
    }
}
