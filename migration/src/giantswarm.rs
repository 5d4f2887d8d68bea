use crate::error::{self, Result};
use crate::k8s::NamespacedObject;
use capi_migration_model::constants::{GS_LABEL_CLUSTER, GS_NAMESPACE};
use capi_migration_model::giantswarm::{
    AwsCluster, AwsControlPlane, AwsMachineDeployment, G8sControlPlane,
};
use k8s_openapi::api::core::v1::Secret;
use kube::api::ListParams;
use kube::{Api, Client, Resource, ResourceExt};
use log::info;
use snafu::ResultExt;

/// Everything that is read from the management cluster for one tenant cluster.
#[derive(Clone, Debug)]
pub struct GsClusterCrs {
    pub aws_cluster: AwsCluster,
    pub aws_control_plane: AwsControlPlane,
    pub g8s_control_plane: G8sControlPlane,
    pub aws_machine_deployments: Vec<AwsMachineDeployment>,
    /// `<id>-etcd1`, the etcd CA, certificate and key of the legacy masters.
    pub etcd_certs: Secret,
    /// `<id>-encryption`, the key used to encrypt secrets at rest.
    pub encryption_key: Secret,
    /// `<id>-worker`, the worker CA, certificate and key that kube-proxy authenticates with.
    pub kube_proxy_certs: Secret,
}

impl GsClusterCrs {
    pub fn cluster_id(&self) -> String {
        self.aws_cluster.name_any()
    }

    pub fn namespace(&self) -> String {
        self.aws_cluster
            .namespace()
            .unwrap_or_else(|| GS_NAMESPACE.to_string())
    }

    /// The installation base domain, e.g. `gauss.eu-west-1.aws.gigantic.io`.
    pub fn base_domain(&self) -> &str {
        &self.aws_cluster.spec.cluster.dns.domain
    }

    pub fn region(&self) -> &str {
        &self.aws_cluster.spec.provider.region
    }
}

/// Read the legacy custom resources and secrets of `cluster_id`.
pub async fn fetch_crs(client: &Client, cluster_id: &str) -> Result<GsClusterCrs> {
    info!("Fetching legacy resources of cluster '{}'", cluster_id);
    let aws_cluster: AwsCluster = get(client, cluster_id).await?;
    let aws_control_plane = single(list::<AwsControlPlane>(client, cluster_id).await?, cluster_id)?;
    let g8s_control_plane = single(list::<G8sControlPlane>(client, cluster_id).await?, cluster_id)?;
    let aws_machine_deployments = list::<AwsMachineDeployment>(client, cluster_id).await?;
    info!(
        "Found {} node pools for cluster '{}'",
        aws_machine_deployments.len(),
        cluster_id
    );

    Ok(GsClusterCrs {
        aws_cluster,
        aws_control_plane,
        g8s_control_plane,
        aws_machine_deployments,
        etcd_certs: get(client, &format!("{}-etcd1", cluster_id)).await?,
        encryption_key: get(client, &format!("{}-encryption", cluster_id)).await?,
        kube_proxy_certs: get(client, &format!("{}-worker", cluster_id)).await?,
    })
}

async fn get<K: NamespacedObject>(client: &Client, name: &str) -> Result<K> {
    Api::<K>::namespaced(client.clone(), GS_NAMESPACE)
        .get(name)
        .await
        .context(error::KubeApiCallSnafu {
            method: "get",
            what: K::kind(&()).to_string(),
            name,
        })
}

async fn list<K: NamespacedObject>(client: &Client, cluster_id: &str) -> Result<Vec<K>> {
    let params = ListParams::default().labels(&format!("{}={}", GS_LABEL_CLUSTER, cluster_id));
    Ok(Api::<K>::namespaced(client.clone(), GS_NAMESPACE)
        .list(&params)
        .await
        .context(error::KubeListSnafu {
            what: K::kind(&()).to_string(),
            cluster_id,
        })?
        .items)
}

/// The only item of `items`, or an error naming how many were found.
fn single<K>(items: Vec<K>, cluster_id: &str) -> Result<K>
where
    K: Resource<DynamicType = ()>,
{
    let found = items.len();
    let mut items = items.into_iter();
    match (items.next(), items.next()) {
        (Some(item), None) => Ok(item),
        _ => error::CountMismatchSnafu {
            what: K::kind(&()).to_string(),
            found,
            cluster_id,
        }
        .fail(),
    }
}
