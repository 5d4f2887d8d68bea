//! The legacy Giant Swarm `infrastructure.giantswarm.io/v1alpha2` objects. Only the fields that take
//! part in the migration are modelled; everything else in the source objects is ignored.

use kube::CustomResource;
use serde::{Deserialize, Serialize};

/// The provider-specific description of a tenant cluster.
#[derive(Clone, CustomResource, Debug, Default, Deserialize, PartialEq, Serialize)]
#[kube(
    group = "infrastructure.giantswarm.io",
    version = "v1alpha2",
    kind = "AWSCluster",
    struct = "AwsCluster",
    plural = "awsclusters",
    namespaced,
    status = "AwsClusterStatus",
    schema = "disabled"
)]
#[serde(rename_all = "camelCase")]
pub struct AwsClusterSpec {
    #[serde(default)]
    pub cluster: AwsClusterSpecCluster,
    #[serde(default)]
    pub provider: AwsClusterSpecProvider,
}

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AwsClusterSpecCluster {
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub dns: AwsClusterSpecClusterDns,
}

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AwsClusterSpecClusterDns {
    /// The base domain, e.g. `gauss.eu-west-1.aws.gigantic.io`.
    #[serde(default)]
    pub domain: String,
}

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AwsClusterSpecProvider {
    #[serde(default)]
    pub region: String,
    #[serde(default)]
    pub pods: AwsClusterSpecProviderPods,
}

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AwsClusterSpecProviderPods {
    #[serde(default)]
    pub cidr_block: String,
}

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AwsClusterStatus {
    #[serde(default)]
    pub provider: AwsClusterStatusProvider,
}

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AwsClusterStatusProvider {
    #[serde(default)]
    pub network: AwsClusterStatusProviderNetwork,
}

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct AwsClusterStatusProviderNetwork {
    #[serde(default)]
    pub cidr: String,
    #[serde(default, rename = "vpcID")]
    pub vpc_id: String,
}

impl AwsCluster {
    /// The network status reported by the legacy operator, defaulted if no status exists yet.
    pub fn network(&self) -> AwsClusterStatusProviderNetwork {
        self.status
            .as_ref()
            .map(|status| status.provider.network.clone())
            .unwrap_or_default()
    }
}

/// The AWS-specific part of the legacy control plane.
#[derive(Clone, CustomResource, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[kube(
    group = "infrastructure.giantswarm.io",
    version = "v1alpha2",
    kind = "AWSControlPlane",
    struct = "AwsControlPlane",
    plural = "awscontrolplanes",
    namespaced,
    schema = "disabled"
)]
#[serde(rename_all = "camelCase")]
pub struct AwsControlPlaneSpec {
    #[serde(default)]
    pub availability_zones: Vec<String>,
    #[serde(default)]
    pub instance_type: String,
}

/// The provider-independent part of the legacy control plane.
#[derive(Clone, CustomResource, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[kube(
    group = "infrastructure.giantswarm.io",
    version = "v1alpha2",
    kind = "G8sControlPlane",
    plural = "g8scontrolplanes",
    namespaced,
    schema = "disabled"
)]
#[serde(rename_all = "camelCase")]
pub struct G8sControlPlaneSpec {
    /// The number of master nodes, either 1 or 3.
    #[serde(default)]
    pub replicas: i32,
}

/// A legacy node pool.
#[derive(Clone, CustomResource, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[kube(
    group = "infrastructure.giantswarm.io",
    version = "v1alpha2",
    kind = "AWSMachineDeployment",
    struct = "AwsMachineDeployment",
    plural = "awsmachinedeployments",
    namespaced,
    schema = "disabled"
)]
#[serde(rename_all = "camelCase")]
pub struct AwsMachineDeploymentSpec {
    #[serde(default)]
    pub node_pool: AwsMachineDeploymentSpecNodePool,
    #[serde(default)]
    pub provider: AwsMachineDeploymentSpecProvider,
}

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AwsMachineDeploymentSpecNodePool {
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub scaling: AwsMachineDeploymentSpecNodePoolScaling,
}

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct AwsMachineDeploymentSpecNodePoolScaling {
    #[serde(default)]
    pub max: i32,
    #[serde(default)]
    pub min: i32,
}

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AwsMachineDeploymentSpecProvider {
    #[serde(default)]
    pub availability_zones: Vec<String>,
    #[serde(default)]
    pub worker: AwsMachineDeploymentSpecInstanceType,
}

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AwsMachineDeploymentSpecInstanceType {
    #[serde(default)]
    pub instance_type: String,
}
