use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use async_lock::{Mutex, RwLock};
use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use k8_types::{InputObjectMeta, K8Obj, ObjectMeta, Spec};

use crate::error::{RemoteError, RemoteErrorKind};
use crate::key::ObjectKey;

use super::RemoteClient;

/// In memory control plane.
///
/// Enforces name uniqueness and optimistic concurrency on `resourceVersion`
/// the way the api server does, without any server side defaulting.
#[derive(Debug, Default)]
pub struct MemoryClient {
    data: RwLock<HashMap<String, HashMap<String, Value>>>,
    failures: Mutex<HashMap<String, RemoteError>>,
    calls: AtomicUsize,
    uid: AtomicU64,
}

impl MemoryClient {
    pub fn new_shared() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// number of remote calls served so far
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// next call for kind `S` fails with `error`
    pub async fn fail_next<S: Spec>(&self, error: RemoteError) {
        self.failures.lock().await.insert(S::kind(), error);
    }

    async fn begin<S: Spec>(&self) -> Result<(), RemoteError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.failures.lock().await.remove(&S::kind()) {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    fn key_of<S: Spec>(name: &str, namespace: &str) -> Result<ObjectKey, RemoteError> {
        let key = if S::NAME_SPACED {
            ObjectKey::namespaced(namespace, name)
        } else {
            ObjectKey::cluster(name)
        };
        key.map_err(|err| RemoteError::new(RemoteErrorKind::Invalid, err.to_string()))
    }

    fn not_found<S: Spec>(key: &ObjectKey) -> RemoteError {
        RemoteError::not_found(format!(
            "{} \"{}\" not found",
            S::metadata().names.plural,
            key.name()
        ))
    }

    async fn store<S: Spec>(&self, key: &ObjectKey, object: &K8Obj<S>) -> Result<(), RemoteError> {
        let value = serde_json::to_value(object)
            .map_err(|err| RemoteError::new(RemoteErrorKind::Invalid, err.to_string()))?;
        self.data
            .write()
            .await
            .entry(S::kind())
            .or_default()
            .insert(key.encode(), value);
        Ok(())
    }

    async fn load<S: Spec>(&self, key: &ObjectKey) -> Result<Option<K8Obj<S>>, RemoteError> {
        let lock = self.data.read().await;
        let Some(value) = lock.get(&S::kind()).and_then(|objects| objects.get(&key.encode()))
        else {
            return Ok(None);
        };
        let value = value.clone();
        drop(lock);

        serde_json::from_value(value)
            .map(Some)
            .map_err(|err| RemoteError::new(RemoteErrorKind::Other, err.to_string()))
    }
}

#[async_trait]
impl<S> RemoteClient<S> for MemoryClient
where
    S: Spec + 'static,
{
    async fn get(&self, key: &ObjectKey) -> Result<K8Obj<S>, RemoteError> {
        self.begin::<S>().await?;
        self.load::<S>(key)
            .await?
            .ok_or_else(|| Self::not_found::<S>(key))
    }

    async fn create(&self, metadata: InputObjectMeta, spec: S) -> Result<K8Obj<S>, RemoteError> {
        self.begin::<S>().await?;
        let key = Self::key_of::<S>(&metadata.name, &metadata.namespace)?;

        if self.load::<S>(&key).await?.is_some() {
            return Err(RemoteError::conflict(format!(
                "{} \"{}\" already exists",
                S::metadata().names.plural,
                key.name()
            )));
        }

        let uid = self.uid.fetch_add(1, Ordering::SeqCst) + 1;
        let mut object: K8Obj<S> = K8Obj::new(metadata.name.clone(), spec);
        object.metadata = ObjectMeta {
            name: metadata.name,
            namespace: key.namespace().unwrap_or_default().to_owned(),
            uid: format!("{}-{uid}", S::kind().to_lowercase()),
            resource_version: "1".to_owned(),
            labels: metadata.labels,
            annotations: metadata.annotations,
            ..Default::default()
        };

        self.store(&key, &object).await?;
        debug!(kind = %S::kind(), %key, "created");
        Ok(object)
    }

    async fn replace(&self, metadata: ObjectMeta, spec: S) -> Result<(), RemoteError> {
        self.begin::<S>().await?;
        let key = Self::key_of::<S>(&metadata.name, &metadata.namespace)?;

        let Some(mut object) = self.load::<S>(&key).await? else {
            return Err(Self::not_found::<S>(&key));
        };

        let stored_version = object.metadata.resource_version.clone();
        if !metadata.resource_version.is_empty() && metadata.resource_version != stored_version {
            return Err(RemoteError::conflict(format!(
                "the object has been modified, expected version {} but found {}",
                metadata.resource_version, stored_version
            )));
        }

        let version = stored_version.parse::<u64>().unwrap_or_default() + 1;
        object.metadata.labels = metadata.labels;
        object.metadata.annotations = metadata.annotations;
        object.metadata.resource_version = version.to_string();
        object.spec = spec;

        self.store(&key, &object).await?;
        debug!(kind = %S::kind(), %key, version, "replaced");
        Ok(())
    }

    async fn delete(&self, key: &ObjectKey) -> Result<(), RemoteError> {
        self.begin::<S>().await?;
        let removed = self
            .data
            .write()
            .await
            .get_mut(&S::kind())
            .and_then(|objects| objects.remove(&key.encode()));

        match removed {
            Some(_) => {
                debug!(kind = %S::kind(), %key, "deleted");
                Ok(())
            }
            None => Err(Self::not_found::<S>(key)),
        }
    }
}

#[cfg(test)]
mod test {

    use k8_types::{InputObjectMeta, K8Obj};
    use openshift_types::image::{ImageLookupPolicy, ImageStreamSpec};
    use openshift_types::project::ProjectSpec;

    use crate::client::RemoteClient;
    use crate::error::{RemoteError, RemoteErrorKind};
    use crate::key::ObjectKey;

    use super::MemoryClient;

    fn stream_spec(local: bool) -> ImageStreamSpec {
        ImageStreamSpec {
            docker_image_repository: "quay.io/acme/api".to_owned(),
            lookup_policy: ImageLookupPolicy { local },
            ..Default::default()
        }
    }

    #[fluvio_future::test]
    async fn test_memory_client_lifecycle() {
        let client = MemoryClient::new_shared();
        let key = ObjectKey::namespaced("shop", "api").expect("key");

        let created: K8Obj<ImageStreamSpec> = client
            .create(
                InputObjectMeta::named("api".to_owned(), "shop".to_owned()),
                stream_spec(false),
            )
            .await
            .expect("create");
        assert_eq!(created.metadata.namespace, "shop");
        assert_eq!(created.metadata.resource_version, "1");
        assert!(!created.metadata.uid.is_empty());

        let fetched: K8Obj<ImageStreamSpec> = client.get(&key).await.expect("get");
        assert_eq!(fetched.spec, stream_spec(false));

        RemoteClient::<ImageStreamSpec>::replace(
            client.as_ref(),
            fetched.metadata.clone(),
            stream_spec(true),
        )
        .await
        .expect("replace");

        let fetched: K8Obj<ImageStreamSpec> = client.get(&key).await.expect("get");
        assert!(fetched.spec.lookup_policy.local);
        assert_eq!(fetched.metadata.resource_version, "2");

        RemoteClient::<ImageStreamSpec>::delete(client.as_ref(), &key)
            .await
            .expect("delete");
        let err = RemoteClient::<ImageStreamSpec>::get(client.as_ref(), &key)
            .await
            .expect_err("deleted");
        assert!(err.is_not_found());
        assert_eq!(client.calls(), 6);
    }

    #[fluvio_future::test]
    async fn test_memory_client_conflicts() {
        let client = MemoryClient::new_shared();
        let meta = InputObjectMeta::named("demo".to_owned(), String::new());

        let created: K8Obj<ProjectSpec> = client
            .create(meta.clone(), ProjectSpec::default())
            .await
            .expect("create");

        let err = RemoteClient::<ProjectSpec>::create(client.as_ref(), meta, ProjectSpec::default())
            .await
            .expect_err("duplicate");
        assert_eq!(err.kind(), RemoteErrorKind::Conflict);

        // stale resource version
        let mut stale = created.metadata.clone();
        stale.resource_version = "7".to_owned();
        let err = RemoteClient::<ProjectSpec>::replace(client.as_ref(), stale, ProjectSpec::default())
            .await
            .expect_err("stale");
        assert_eq!(err.kind(), RemoteErrorKind::Conflict);
    }

    #[fluvio_future::test]
    async fn test_injected_failure_applies_once() {
        let client = MemoryClient::new_shared();
        let key = ObjectKey::cluster("demo").expect("key");

        client
            .fail_next::<ProjectSpec>(RemoteError::new(RemoteErrorKind::Forbidden, "denied"))
            .await;

        let err = RemoteClient::<ProjectSpec>::get(client.as_ref(), &key)
            .await
            .expect_err("injected");
        assert_eq!(err.kind(), RemoteErrorKind::Forbidden);

        let err = RemoteClient::<ProjectSpec>::get(client.as_ref(), &key)
            .await
            .expect_err("absent");
        assert!(err.is_not_found());
    }
}
