mod k8;
mod memory;

pub use memory::MemoryClient;

use std::sync::Arc;

use async_trait::async_trait;
use k8_types::{InputObjectMeta, K8Obj, ObjectMeta, Spec};

use crate::error::RemoteError;
use crate::key::ObjectKey;

pub type SharedClient<C> = Arc<C>;

/// Remote operations on a single kind of object.
///
/// Every call is one round trip; implementations do not retry.
#[async_trait]
pub trait RemoteClient<S: Spec>: Send + Sync {
    /// retrieve an object by key
    async fn get(&self, key: &ObjectKey) -> Result<K8Obj<S>, RemoteError>;

    /// create new object, fails with conflict if the name is taken
    async fn create(&self, metadata: InputObjectMeta, spec: S) -> Result<K8Obj<S>, RemoteError>;

    /// overwrite an existing object
    async fn replace(&self, metadata: ObjectMeta, spec: S) -> Result<(), RemoteError>;

    async fn delete(&self, key: &ObjectKey) -> Result<(), RemoteError>;
}
