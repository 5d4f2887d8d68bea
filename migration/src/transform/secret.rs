use super::{templates, Names};
use crate::error::Result;
use crate::giantswarm::GsClusterCrs;
use crate::k8s::{secret_data, secret_string};
use capi_migration_model::constants::{CAPI_SECRET_TYPE, LABEL_CLUSTER_NAME};
use k8s_openapi::api::core::v1::Secret;
use k8s_openapi::ByteString;
use maplit::btreemap;
use std::collections::BTreeMap;

pub(crate) const JOIN_SCRIPT_KEY: &str = "join-existing-cluster";
pub(crate) const ENCRYPTION_CONFIG_KEY: &str = "encryption-config";
pub(crate) const KUBE_PROXY_KUBECONFIG_KEY: &str = "kube-proxy-kubeconfig";
pub(crate) const KUBE_PROXY_CONFIG_KEY: &str = "kube-proxy-config";

/// Keys of the legacy etcd certificate secret, which are kept in the migrated copy.
pub(crate) const ETCD_CA_KEY: &str = "ca";
pub(crate) const ETCD_CERT_KEY: &str = "crt";
pub(crate) const ETCD_KEY_KEY: &str = "key";

fn bytes<S: Into<String>>(value: S) -> ByteString {
    ByteString(value.into().into_bytes())
}

/// The files that are rendered for this cluster and referenced by the bootstrap configurations.
pub(crate) fn custom_files_secret(names: &Names, gs: &GsClusterCrs) -> Result<Secret> {
    let encryption_key = secret_string(&gs.encryption_key, "encryption")?;
    let proxy = &gs.kube_proxy_certs;
    let kubeconfig = templates::kube_proxy_kubeconfig(
        &names.api_endpoint(),
        &base64::encode(secret_data(proxy, "ca")?),
        &base64::encode(secret_data(proxy, "crt")?),
        &base64::encode(secret_data(proxy, "key")?),
    );

    Ok(Secret {
        metadata: names.meta(names.custom_files_secret()),
        data: Some(btreemap! {
            JOIN_SCRIPT_KEY.to_string() =>
                bytes(templates::join_existing_cluster_script(&names.etcd_endpoint())),
            ENCRYPTION_CONFIG_KEY.to_string() => bytes(templates::encryption_config(&encryption_key)),
            KUBE_PROXY_KUBECONFIG_KEY.to_string() => bytes(kubeconfig),
            KUBE_PROXY_CONFIG_KEY.to_string() => bytes(templates::kube_proxy_config()),
        }),
        ..Default::default()
    })
}

/// A fresh copy of the legacy etcd certificates. Only the data is carried over, the server side
/// metadata of the source secret is dropped.
pub(crate) fn etcd_certs_secret(names: &Names, gs: &GsClusterCrs) -> Result<Secret> {
    let mut data = BTreeMap::new();
    for key in [ETCD_CA_KEY, ETCD_CERT_KEY, ETCD_KEY_KEY] {
        data.insert(
            key.to_string(),
            ByteString(secret_data(&gs.etcd_certs, key)?.to_vec()),
        );
    }
    Ok(Secret {
        metadata: names.meta(names.etcd_certs_secret()),
        data: Some(data),
        ..Default::default()
    })
}

/// The cluster CA in the form Cluster API expects, so the new control plane keeps signing with the
/// legacy CA.
pub(crate) fn ca_secret(names: &Names, gs: &GsClusterCrs, private_key: &str) -> Result<Secret> {
    let mut metadata = names.meta(names.ca_secret());
    metadata.labels = Some(btreemap! {
        LABEL_CLUSTER_NAME.to_string() => names.cluster(),
    });
    Ok(Secret {
        metadata,
        type_: Some(CAPI_SECRET_TYPE.to_string()),
        data: Some(btreemap! {
            "tls.crt".to_string() => ByteString(secret_data(&gs.kube_proxy_certs, "ca")?.to_vec()),
            "tls.key".to_string() => bytes(private_key),
        }),
        ..Default::default()
    })
}
