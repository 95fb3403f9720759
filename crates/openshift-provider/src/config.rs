use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use k8_client::{K8Client, SharedK8Client};
use k8_config::{K8Config, KubeConfig, KubeContext, PodConfig};

use crate::error::ConfigError;

/// How the provider authenticates against the control plane
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionMode {
    /// service account credentials mounted into the pod
    Cluster,
    #[default]
    KubeConfig,
}

impl ConnectionMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cluster => "cluster",
            Self::KubeConfig => "kubeconfig",
        }
    }
}

impl fmt::Display for ConnectionMode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ConnectionMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cluster" => Ok(Self::Cluster),
            "kubeconfig" => Ok(Self::KubeConfig),
            other => Err(ConfigError::InvalidMode(other.to_owned())),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    pub mode: ConnectionMode,
    /// credential file used in kubeconfig mode
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kubeconfig: Option<PathBuf>,
}

impl ProviderConfig {
    pub fn cluster() -> Self {
        Self {
            mode: ConnectionMode::Cluster,
            kubeconfig: None,
        }
    }

    pub fn kubeconfig(path: impl Into<PathBuf>) -> Self {
        Self {
            mode: ConnectionMode::KubeConfig,
            kubeconfig: Some(path.into()),
        }
    }

    /// parse provider settings, `mode` must name a known connection mode
    pub fn from_yaml(source: &str) -> Result<Self, ConfigError> {
        #[derive(Deserialize)]
        struct RawConfig {
            mode: Option<String>,
            kubeconfig: Option<PathBuf>,
        }

        let raw: RawConfig = serde_yaml::from_str(source).map_err(ConfigError::Parse)?;

        let mode = match raw.mode {
            Some(mode) => mode.parse()?,
            None => ConnectionMode::default(),
        };

        Ok(Self {
            mode,
            kubeconfig: raw.kubeconfig,
        })
    }
}

/// Resolved, authenticated handle to the control plane.
/// Cheap to clone; all clones share one client.
#[derive(Clone)]
pub struct Connection {
    mode: ConnectionMode,
    namespace: String,
    client: SharedK8Client,
}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Connection")
            .field("mode", &self.mode)
            .field("namespace", &self.namespace)
            .finish()
    }
}

impl Connection {
    pub fn mode(&self) -> ConnectionMode {
        self.mode
    }

    /// namespace selected by the credentials
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn client(&self) -> &SharedK8Client {
        &self.client
    }
}

/// build the kubernetes client for the configured mode
pub fn resolve(config: &ProviderConfig) -> Result<Connection, ConfigError> {
    let k8_config = load_k8_config(config)?;
    let namespace = match &k8_config {
        K8Config::Pod(pod) => pod.namespace.clone(),
        K8Config::KubeConfig(context) => context.namespace.clone(),
    };

    let client = K8Client::new(k8_config).map_err(ConfigError::Client)?;
    info!(mode = %config.mode, %namespace, "connection resolved");

    Ok(Connection {
        mode: config.mode,
        namespace,
        client: Arc::new(client),
    })
}

fn load_k8_config(config: &ProviderConfig) -> Result<K8Config, ConfigError> {
    match config.mode {
        ConnectionMode::Cluster => {
            let pod = PodConfig::load().ok_or(ConfigError::NoPodConfig)?;
            debug!("using in-cluster credentials");
            Ok(K8Config::Pod(pod))
        }
        ConnectionMode::KubeConfig => {
            let path = config
                .kubeconfig
                .as_deref()
                .ok_or(ConfigError::MissingKubeConfigPath)?;
            let kube_config = read_kubeconfig(path)?;
            Ok(K8Config::KubeConfig(current_context(kube_config)?))
        }
    }
}

pub(crate) fn read_kubeconfig(path: &Path) -> Result<KubeConfig, ConfigError> {
    debug!(path = %path.display(), "reading kubeconfig");
    KubeConfig::from_file(path).map_err(|source| ConfigError::KubeConfig {
        path: path.to_owned(),
        source,
    })
}

/// select the current context and the cluster it points at
pub(crate) fn current_context(config: KubeConfig) -> Result<KubeContext, ConfigError> {
    let context = config
        .current_context()
        .ok_or(ConfigError::NoCurrentContext)?;
    let cluster = config
        .current_cluster()
        .ok_or_else(|| ConfigError::UnknownCluster(context.context.cluster.clone()))?;

    let namespace = context.context.namespace().to_owned();
    let api_path = cluster.cluster.server.clone();

    Ok(KubeContext {
        namespace,
        api_path,
        config,
    })
}

#[cfg(test)]
mod test {

    use std::io::Write;

    use super::*;

    const KUBECONFIG: &str = r#"
apiVersion: v1
kind: Config
current-context: dev
clusters:
- name: openshift
  cluster:
    server: https://api.openshift.example.com:6443
contexts:
- name: dev
  context:
    cluster: openshift
    user: developer
    namespace: shop
users:
- name: developer
  user:
    token: secret
"#;

    #[test]
    fn test_invalid_mode() {
        let err = "invalid-mode".parse::<ConnectionMode>().expect_err("invalid");
        assert!(matches!(err, ConfigError::InvalidMode(mode) if mode == "invalid-mode"));

        let err = ProviderConfig::from_yaml("mode: invalid-mode\n").expect_err("invalid");
        assert!(matches!(err, ConfigError::InvalidMode(_)));
    }

    #[test]
    fn test_provider_config_defaults_to_kubeconfig() {
        let config = ProviderConfig::from_yaml("kubeconfig: /etc/kube/config\n").expect("parse");
        assert_eq!(config.mode, ConnectionMode::KubeConfig);
        assert_eq!(config.kubeconfig, Some(PathBuf::from("/etc/kube/config")));

        let config = ProviderConfig::from_yaml("mode: cluster\n").expect("parse");
        assert_eq!(config, ProviderConfig::cluster());
    }

    #[test]
    fn test_kubeconfig_mode_requires_path() {
        let config = ProviderConfig {
            mode: ConnectionMode::KubeConfig,
            kubeconfig: None,
        };
        assert!(matches!(
            resolve(&config),
            Err(ConfigError::MissingKubeConfigPath)
        ));
    }

    #[test]
    fn test_unreadable_kubeconfig() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = ProviderConfig::kubeconfig(dir.path().join("missing"));
        assert!(matches!(
            resolve(&config),
            Err(ConfigError::KubeConfig { .. })
        ));
    }

    #[test]
    fn test_unparseable_kubeconfig() {
        let mut file = tempfile::NamedTempFile::new().expect("tempfile");
        file.write_all(b"clusters: [").expect("write");

        let err = read_kubeconfig(file.path()).expect_err("invalid yaml");
        assert!(matches!(err, ConfigError::KubeConfig { path, .. } if path == file.path()));
    }

    #[test]
    fn test_no_current_context() {
        let mut file = tempfile::NamedTempFile::new().expect("tempfile");
        file.write_all(
            KUBECONFIG
                .replace("current-context: dev", "current-context: prod")
                .as_bytes(),
        )
        .expect("write");

        let config = read_kubeconfig(file.path()).expect("read");
        assert!(matches!(
            current_context(config),
            Err(ConfigError::NoCurrentContext)
        ));
    }

    #[test]
    fn test_current_context_selection() {
        let mut file = tempfile::NamedTempFile::new().expect("tempfile");
        file.write_all(KUBECONFIG.as_bytes()).expect("write");

        let config = read_kubeconfig(file.path()).expect("read");
        assert_eq!(config.path, file.path());
        let context = current_context(config).expect("context");
        assert_eq!(context.namespace, "shop");
        assert_eq!(context.api_path, "https://api.openshift.example.com:6443");
    }

    #[test]
    fn test_missing_cluster() {
        let mut file = tempfile::NamedTempFile::new().expect("tempfile");
        file.write_all(
            KUBECONFIG
                .replace("cluster: openshift", "cluster: other")
                .as_bytes(),
        )
        .expect("write");

        let config = read_kubeconfig(file.path()).expect("read");
        assert!(matches!(
            current_context(config),
            Err(ConfigError::UnknownCluster(name)) if name == "other"
        ));
    }
}
