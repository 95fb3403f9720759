use async_trait::async_trait;
use tracing::trace;

use k8_client::K8Client;
use k8_client::meta_client::MetadataClient;
use k8_types::{InputK8Obj, InputObjectMeta, K8Obj, MetaStatus, ObjectMeta, Spec, UpdatedK8Obj};

use crate::error::{RemoteError, RemoteErrorKind};
use crate::key::ObjectKey;

use super::RemoteClient;

/// classify by the api server status carried in the error, anything else is transport
impl From<anyhow::Error> for RemoteError {
    fn from(err: anyhow::Error) -> Self {
        let kind = match err.downcast_ref::<MetaStatus>() {
            Some(status) => status
                .code
                .map(RemoteErrorKind::from_status)
                .unwrap_or(RemoteErrorKind::Other),
            None => RemoteErrorKind::Transient,
        };
        RemoteError::new(kind, err.to_string())
    }
}

/// the client reports an absent object as `None` instead of an error
fn found<S: Spec>(key: &ObjectKey, object: Option<K8Obj<S>>) -> Result<K8Obj<S>, RemoteError> {
    object.ok_or_else(|| {
        RemoteError::not_found(format!(
            "{} \"{}\" not found",
            S::metadata().names.plural,
            key
        ))
    })
}

#[async_trait]
impl<S> RemoteClient<S> for K8Client
where
    S: Spec + 'static,
{
    async fn get(&self, key: &ObjectKey) -> Result<K8Obj<S>, RemoteError> {
        trace!(kind = %S::kind(), %key, "retrieving");
        let object = self
            .retrieve_item::<S, _>(&key.as_input_meta())
            .await?;
        found(key, object)
    }

    async fn create(&self, metadata: InputObjectMeta, spec: S) -> Result<K8Obj<S>, RemoteError> {
        trace!(kind = %S::kind(), name = %metadata.name, "creating");
        let object = self.create_item(InputK8Obj::new(spec, metadata)).await?;
        Ok(object)
    }

    async fn replace(&self, metadata: ObjectMeta, spec: S) -> Result<(), RemoteError> {
        trace!(kind = %S::kind(), name = %metadata.name, "replacing");
        let input: UpdatedK8Obj<S> = UpdatedK8Obj::new(spec, metadata.into());
        self.replace_item(input).await?;
        Ok(())
    }

    async fn delete(&self, key: &ObjectKey) -> Result<(), RemoteError> {
        trace!(kind = %S::kind(), %key, "deleting");
        self.delete_item_with_option::<S, _>(&key.as_input_meta(), None)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod test {

    use anyhow::anyhow;
    use k8_types::{K8Obj, MetaStatus};
    use openshift_types::route::RouteSpec;

    use crate::error::{RemoteError, RemoteErrorKind};
    use crate::key::ObjectKey;

    use super::found;

    fn api_status(code: u16) -> anyhow::Error {
        let status: MetaStatus = serde_json::from_value(serde_json::json!({
            "apiVersion": "v1",
            "kind": "Status",
            "code": code,
            "message": "rejected by the api server",
            "status": "Failure"
        }))
        .expect("status");
        anyhow::Error::new(status)
    }

    #[test]
    fn test_status_errors_are_classified() {
        let cases = [
            (404, RemoteErrorKind::NotFound),
            (409, RemoteErrorKind::Conflict),
            (403, RemoteErrorKind::Forbidden),
            (401, RemoteErrorKind::Unauthorized),
            (422, RemoteErrorKind::Invalid),
            (503, RemoteErrorKind::Transient),
        ];
        for (code, kind) in cases {
            let err = RemoteError::from(api_status(code));
            assert_eq!(err.kind(), kind, "status {code}");
        }
    }

    #[test]
    fn test_wrapped_status_is_classified() {
        let err = RemoteError::from(api_status(409).context("replacing route"));
        assert_eq!(err.kind(), RemoteErrorKind::Conflict);
    }

    #[test]
    fn test_transport_errors_are_transient() {
        let err = RemoteError::from(anyhow!("connection refused"));
        assert_eq!(err.kind(), RemoteErrorKind::Transient);
        assert!(err.message().contains("connection refused"));
    }

    #[test]
    fn test_absent_object_is_not_found() {
        let key = ObjectKey::namespaced("default", "api").expect("key");
        let err = found::<RouteSpec>(&key, None).expect_err("absent");
        assert!(err.is_not_found());
        assert_eq!(err.message(), "routes \"default/api\" not found");

        let object = K8Obj::new("api".to_owned(), RouteSpec::default());
        assert!(found(&key, Some(object)).is_ok());
    }
}
