use crate::error::{self, Result};
use capi_migration_model::constants::GS_NAMESPACE;
use http::StatusCode;
use k8s_openapi::api::core::v1::Secret;
use k8s_openapi::NamespaceResourceScope;
use kube::api::{DeleteParams, Patch, PatchParams, PostParams};
use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::{Api, Client, Config, Resource, ResourceExt};
use log::{debug, info, warn};
use serde::de::DeserializeOwned;
use serde::Serialize;
use snafu::{OptionExt, ResultExt};
use std::fmt::Debug;
use std::path::Path;
use std::time::Duration;

/// Objects that can be created in, read from and deleted from a namespace.
pub trait NamespacedObject:
    Resource<Scope = NamespaceResourceScope, DynamicType = ()>
    + Clone
    + Debug
    + DeserializeOwned
    + Serialize
{
}

impl<K> NamespacedObject for K where
    K: Resource<Scope = NamespaceResourceScope, DynamicType = ()>
        + Clone
        + Debug
        + DeserializeOwned
        + Serialize
{
}

pub trait HttpStatusCode {
    fn status_code(&self) -> Option<StatusCode>;

    fn is_status_code(&self, status_code: StatusCode) -> bool {
        self.status_code()
            .map(|some| some == status_code)
            .unwrap_or_default()
    }
}

impl HttpStatusCode for kube::Error {
    fn status_code(&self) -> Option<StatusCode> {
        if let kube::Error::Api(error_response) = self {
            StatusCode::from_u16(error_response.code).ok()
        } else {
            None
        }
    }
}

/// Create a client for `context` in the kubeconfig at `kubeconfig`. The standard kubeconfig
/// discovery (`KUBECONFIG`, then `~/.kube/config`) is used when no path is given, and the current
/// context is used when no context is given.
pub async fn client_for_context(kubeconfig: Option<&Path>, context: Option<&str>) -> Result<Client> {
    let kubeconfig = match kubeconfig {
        Some(path) => Kubeconfig::read_from(path).context(error::KubeconfigReadSnafu {
            path: path.display().to_string(),
        })?,
        None => Kubeconfig::read().context(error::KubeconfigReadSnafu {
            path: "default kubeconfig",
        })?,
    };
    let options = KubeConfigOptions {
        context: context.map(str::to_string),
        ..Default::default()
    };
    let config = Config::from_custom_kubeconfig(kubeconfig, &options)
        .await
        .context(error::KubeconfigContextSnafu {
            context: context.unwrap_or("current-context"),
        })?;
    Client::try_from(config).context(error::ClientCreateSnafu)
}

fn namespace_of<K: NamespacedObject>(obj: &K) -> String {
    obj.namespace().unwrap_or_else(|| GS_NAMESPACE.to_string())
}

fn kind<K: NamespacedObject>() -> String {
    K::kind(&()).to_string()
}

/// `obj` as JSON for the debug log, without the values of secrets.
fn redacted<K: Serialize>(obj: &K) -> serde_json::Value {
    let mut value = serde_json::to_value(obj).unwrap_or_default();
    if let Some(fields) = value.as_object_mut() {
        for key in ["data", "stringData"] {
            if let Some(data) = fields.get_mut(key).and_then(|data| data.as_object_mut()) {
                for entry in data.values_mut() {
                    *entry = serde_json::Value::from("<redacted>");
                }
            }
        }
    }
    value
}

/// Create `obj` in its namespace. If an object of the same name already exists it is returned
/// instead, so that an interrupted run can be repeated.
pub async fn create<K: NamespacedObject>(client: &Client, obj: &K) -> Result<K> {
    let name = obj.name_any();
    let api: Api<K> = Api::namespaced(client.clone(), &namespace_of(obj));
    info!("Creating {} '{}'", kind::<K>(), name);
    debug!("{}", redacted(obj));
    match api.create(&PostParams::default(), obj).await {
        Ok(created) => Ok(created),
        Err(e) if e.is_status_code(StatusCode::CONFLICT) => {
            warn!(
                "{} '{}' already exists, continuing with the existing object",
                kind::<K>(),
                name
            );
            api.get(&name).await.context(error::KubeApiCallSnafu {
                method: "get",
                what: kind::<K>(),
                name,
            })
        }
        Err(e) => Err(e).context(error::KubeApiCallSnafu {
            method: "create",
            what: kind::<K>(),
            name,
        }),
    }
}

/// Delete the object of type `K` named like `obj`. An object that does not exist is not an error.
pub async fn delete<K: NamespacedObject>(client: &Client, obj: &K) -> Result<()> {
    let name = obj.name_any();
    let api: Api<K> = Api::namespaced(client.clone(), &namespace_of(obj));
    info!("Deleting {} '{}'", kind::<K>(), name);
    match api.delete(&name, &DeleteParams::default()).await {
        Ok(_) => Ok(()),
        Err(e) if e.is_status_code(StatusCode::NOT_FOUND) => {
            warn!("{} '{}' does not exist, skipping", kind::<K>(), name);
            Ok(())
        }
        Err(e) => Err(e).context(error::KubeApiCallSnafu {
            method: "delete",
            what: kind::<K>(),
            name,
        }),
    }
}

/// Fetch `name` from `api`, retrying every `interval` while it is not found, at most `attempts`
/// times.
pub async fn wait_for_object<K: NamespacedObject>(
    api: &Api<K>,
    name: &str,
    attempts: u32,
    interval: Duration,
) -> Result<K> {
    for attempt in 1..=attempts {
        match api.get(name).await {
            Ok(obj) => return Ok(obj),
            Err(e) if e.is_status_code(StatusCode::NOT_FOUND) => {
                debug!(
                    "{} '{}' is not visible yet ({}/{})",
                    kind::<K>(),
                    name,
                    attempt,
                    attempts
                );
                tokio::time::sleep(interval).await;
            }
            Err(e) => {
                return Err(e).context(error::KubeApiCallSnafu {
                    method: "get",
                    what: kind::<K>(),
                    name,
                })
            }
        }
    }
    error::WaitForObjectSnafu {
        what: kind::<K>(),
        name,
        attempts,
    }
    .fail()
}

/// Merge `status` into the status subresource of `obj`.
pub async fn patch_status<K, S>(client: &Client, obj: &K, status: &S) -> Result<K>
where
    K: NamespacedObject,
    S: Serialize,
{
    let name = obj.name_any();
    let api: Api<K> = Api::namespaced(client.clone(), &namespace_of(obj));
    info!("Setting status of {} '{}'", kind::<K>(), name);
    api.patch_status(
        &name,
        &PatchParams::default(),
        &Patch::Merge(serde_json::json!({ "status": status })),
    )
    .await
    .context(error::KubeApiCallSnafu {
        method: "patch status of",
        what: kind::<K>(),
        name,
    })
}

/// The raw value of `key` in `secret`.
pub fn secret_data<'a>(secret: &'a Secret, key: &str) -> Result<&'a [u8]> {
    secret
        .data
        .as_ref()
        .and_then(|data| data.get(key))
        .map(|value| value.0.as_slice())
        .context(error::MissingSecretKeySnafu {
            secret: secret.name_any(),
            key,
        })
}

/// The value of `key` in `secret` as a string.
pub fn secret_string(secret: &Secret, key: &str) -> Result<String> {
    String::from_utf8(secret_data(secret, key)?.to_vec()).context(error::SecretNotUtf8Snafu {
        secret: secret.name_any(),
        key,
    })
}

#[cfg(test)]
mod test {
    use super::*;
    use k8s_openapi::ByteString;
    use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
    use maplit::btreemap;

    fn secret() -> Secret {
        Secret {
            metadata: ObjectMeta {
                name: Some("a1b2c-encryption".to_string()),
                ..Default::default()
            },
            data: Some(btreemap! {
                "encryption".to_string() => ByteString(b"c2VjcmV0".to_vec()),
                "binary".to_string() => ByteString(vec![0xff, 0xfe]),
            }),
            ..Default::default()
        }
    }

    #[test]
    fn secret_values() {
        let secret = secret();
        assert_eq!(secret_data(&secret, "encryption").unwrap(), b"c2VjcmV0");
        assert_eq!(secret_string(&secret, "encryption").unwrap(), "c2VjcmV0");
    }

    #[test]
    fn missing_secret_key() {
        let err = secret_data(&secret(), "ca").unwrap_err();
        assert_eq!(err.to_string(), "Secret 'a1b2c-encryption' has no 'ca' key");
    }

    #[test]
    fn secret_value_not_utf8() {
        assert!(secret_string(&secret(), "binary").is_err());
    }

    #[test]
    fn secret_values_are_not_logged() {
        let value = redacted(&secret());
        assert_eq!(value["kind"], "Secret");
        assert_eq!(value["metadata"]["name"], "a1b2c-encryption");
        assert_eq!(value["data"]["encryption"], "<redacted>");
        assert!(!value.to_string().contains("YzJWamNtVjA"));
        assert!(!value.to_string().contains("c2VjcmV0"));
    }

    #[test]
    fn status_codes() {
        let err = kube::Error::Api(kube::error::ErrorResponse {
            status: "Failure".to_string(),
            message: "already exists".to_string(),
            reason: "AlreadyExists".to_string(),
            code: 409,
        });
        assert!(err.is_status_code(StatusCode::CONFLICT));
        assert!(!err.is_status_code(StatusCode::NOT_FOUND));
    }
}
