//!
//! # Resource lifecycle
//!
//! Create, read, update, delete and import are the same for every kind; the
//! kind specific mapping lives in a [`ResourceAdapter`].
//!
use std::fmt::Debug;
use std::marker::PhantomData;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info, trace};

use k8_types::{InputObjectMeta, K8Obj, ObjectMeta, Spec};

use crate::client::{RemoteClient, SharedClient};
use crate::error::{Operation, ResourceError, ValidationError};
use crate::key::{ObjectKey, Scope};
use crate::schema::{self, FieldSchema};

/// Typed field values of one resource, both desired input and observed output
pub trait ResourceData:
    Debug + Clone + Default + PartialEq + Serialize + DeserializeOwned + Send + Sync
{
    fn id(&self) -> Option<&str>;

    fn set_id(&mut self, id: Option<String>);
}

/// Maps the lifecycle onto one kind of remote object
pub trait ResourceAdapter: Send + Sync + 'static {
    type K8Spec: Spec + 'static;
    type Data: ResourceData;

    /// name of the kind as exposed to users
    const LABEL: &'static str;

    fn schema() -> &'static [FieldSchema];

    fn scope() -> Scope {
        if Self::K8Spec::NAME_SPACED {
            Scope::Namespaced
        } else {
            Scope::Cluster
        }
    }

    /// key the object is created under
    fn object_key(data: &Self::Data) -> Result<ObjectKey, ValidationError>;

    /// checks beyond required fields
    fn validate(_data: &Self::Data) -> Result<(), ValidationError> {
        Ok(())
    }

    /// project the data onto the remote object.
    /// `base` is empty metadata on create and the server's metadata on update,
    /// `current` is the server's spec on update.
    fn build(
        data: &Self::Data,
        base: ObjectMeta,
        current: Option<&Self::K8Spec>,
    ) -> (ObjectMeta, Self::K8Spec);

    /// overwrite tracked fields with the observed object
    fn observe(object: K8Obj<Self::K8Spec>, data: &mut Self::Data);
}

/// Runs lifecycle operations for adapter `A` against client `C`.
///
/// Holds no state besides the shared client.
pub struct ResourceManager<A, C> {
    client: SharedClient<C>,
    adapter: PhantomData<A>,
}

impl<A, C> Clone for ResourceManager<A, C> {
    fn clone(&self) -> Self {
        Self {
            client: self.client.clone(),
            adapter: PhantomData,
        }
    }
}

impl<A, C> ResourceManager<A, C>
where
    A: ResourceAdapter,
    C: RemoteClient<A::K8Spec>,
{
    pub fn new(client: SharedClient<C>) -> Self {
        Self {
            client,
            adapter: PhantomData,
        }
    }

    pub fn client(&self) -> &SharedClient<C> {
        &self.client
    }

    /// create the object, then read it back into `data`.
    /// There is no existence check; a taken name is reported by the server as a conflict.
    pub async fn create(&self, data: &mut A::Data) -> Result<(), ResourceError> {
        let key = Self::validate(data)?;
        debug!(kind = A::LABEL, %key, "create");

        let (meta, spec) = A::build(data, key.object_meta(), None);
        trace!(?meta, ?spec, "built object");

        let created = self
            .client
            .create(input_meta(meta), spec)
            .await
            .map_err(|err| ResourceError::remote(Operation::Create, A::LABEL, key.encode(), err))?;

        let key = ObjectKey::from_meta(A::scope(), &created.metadata)?;
        info!(kind = A::LABEL, id = %key, "created");
        data.set_id(Some(key.encode()));

        self.refresh(Operation::Create, key, data).await
    }

    /// refresh `data` from the server. An absent object clears the identifier.
    pub async fn read(&self, data: &mut A::Data) -> Result<(), ResourceError> {
        let key = Self::stored_key(data)?;
        debug!(kind = A::LABEL, %key, "read");
        self.refresh(Operation::Read, key, data).await
    }

    /// replace the object with `data`.
    /// Changes to immutable fields are rejected before any remote call.
    pub async fn update(&self, prior: &A::Data, data: &mut A::Data) -> Result<(), ResourceError> {
        if data.id().is_none() {
            data.set_id(prior.id().map(str::to_owned));
        }
        let key = Self::stored_key(data)?;
        debug!(kind = A::LABEL, %key, "update");

        if let Some(field) = schema::changed_immutable(A::schema(), prior, data)? {
            return Err(ValidationError::ImmutableField(field).into());
        }
        Self::validate(data)?;

        let remote_err = |err| ResourceError::remote(Operation::Update, A::LABEL, key.encode(), err);

        let current = self.client.get(&key).await.map_err(remote_err)?;
        let (meta, spec) = A::build(data, current.metadata, Some(&current.spec));
        trace!(?meta, ?spec, "built object");

        self.client.replace(meta, spec).await.map_err(remote_err)?;
        info!(kind = A::LABEL, id = %key, "replaced");

        self.refresh(Operation::Update, key, data).await
    }

    /// delete the object and clear the identifier
    pub async fn delete(&self, data: &mut A::Data) -> Result<(), ResourceError> {
        let key = Self::stored_key(data)?;
        debug!(kind = A::LABEL, %key, "delete");

        self.client
            .delete(&key)
            .await
            .map_err(|err| ResourceError::remote(Operation::Delete, A::LABEL, key.encode(), err))?;

        info!(kind = A::LABEL, id = %key, "deleted");
        data.set_id(None);
        Ok(())
    }

    /// adopt an existing object, `None` if nothing exists under `id`
    pub async fn import(&self, id: &str) -> Result<Option<A::Data>, ResourceError> {
        let key = ObjectKey::decode(A::scope(), id)?;
        debug!(kind = A::LABEL, %key, "import");

        let mut data = A::Data::default();
        data.set_id(Some(key.encode()));
        self.refresh(Operation::Import, key, &mut data).await?;

        Ok(data.id().is_some().then_some(data))
    }

    async fn refresh(
        &self,
        operation: Operation,
        key: ObjectKey,
        data: &mut A::Data,
    ) -> Result<(), ResourceError> {
        match self.client.get(&key).await {
            Ok(object) => {
                let observed = ObjectKey::from_meta(A::scope(), &object.metadata)?;
                trace!(?object, "observed");
                A::observe(object, data);
                data.set_id(Some(observed.encode()));
                Ok(())
            }
            Err(err) if err.is_not_found() => {
                debug!(kind = A::LABEL, %key, "object is gone, clearing identifier");
                data.set_id(None);
                Ok(())
            }
            Err(err) => Err(ResourceError::remote(
                operation,
                A::LABEL,
                key.encode(),
                err,
            )),
        }
    }

    fn stored_key(data: &A::Data) -> Result<ObjectKey, ValidationError> {
        let id = data.id().ok_or(ValidationError::MissingIdentifier)?;
        ObjectKey::decode(A::scope(), id)
    }

    fn validate(data: &A::Data) -> Result<ObjectKey, ValidationError> {
        schema::check_required(A::schema(), data)?;
        A::validate(data)?;
        A::object_key(data)
    }
}

fn input_meta(meta: ObjectMeta) -> InputObjectMeta {
    InputObjectMeta {
        name: meta.name,
        namespace: meta.namespace,
        labels: meta.labels,
        annotations: meta.annotations,
        ..Default::default()
    }
}
