/*!

Builds the Cluster API objects for a legacy cluster. Nothing in here talks to Kubernetes or AWS;
all of the inputs are fetched beforehand.

!*/

mod aws_cluster;
mod cluster;
mod control_plane;
mod machine;
mod machine_pool;
mod secret;
mod templates;

pub use machine::fill_machine_status;

use crate::aws::NetworkFacts;
use crate::error::Result;
use crate::giantswarm::GsClusterCrs;
use capi_migration_model::capi::{
    AwsCluster, AwsMachine, AwsMachinePool, AwsMachineTemplate, Cluster, KubeadmConfig,
    KubeadmControlPlane, Machine, MachinePool,
};
use k8s_openapi::api::core::v1::Secret;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use log::info;

/// Settings that do not come from the legacy cluster.
#[derive(Clone, Debug, Default)]
pub struct TransformOptions {
    /// The Kubernetes version of the new control plane and node pools, e.g. `v1.19.4`.
    pub k8s_version: String,
    pub ssh_key_name: Option<String>,
    /// The cluster CA private key. The CA secret is only produced when this is set.
    pub ca_private_key: Option<String>,
}

/// One migrated node pool.
#[derive(Clone, Debug)]
pub struct NodePool {
    pub aws_machine_pool: AwsMachinePool,
    pub kubeadm_config: KubeadmConfig,
    pub machine_pool: MachinePool,
}

/// A legacy master, represented as an existing member of the new control plane.
#[derive(Clone, Debug)]
pub struct OldControlPlaneMachine {
    pub machine: Machine,
    pub aws_machine: AwsMachine,
    pub kubeadm_config: KubeadmConfig,
}

/// The complete set of Cluster API objects for one cluster.
#[derive(Clone, Debug)]
pub struct CapiCrs {
    pub ca_secret: Option<Secret>,
    pub custom_files_secret: Secret,
    pub etcd_certs_secret: Secret,
    pub cluster: Cluster,
    pub aws_cluster: AwsCluster,
    pub control_plane: KubeadmControlPlane,
    pub control_plane_machine_template: AwsMachineTemplate,
    pub old_control_plane_machines: Vec<OldControlPlaneMachine>,
    pub node_pools: Vec<NodePool>,
}

/// Map the legacy objects of a cluster and its AWS network onto Cluster API objects.
pub fn transform_gs_to_capi_crs(
    gs: &GsClusterCrs,
    facts: &NetworkFacts,
    options: &TransformOptions,
) -> Result<CapiCrs> {
    let names = Names::new(gs.cluster_id(), gs.namespace(), gs.base_domain());
    info!("Transforming cluster '{}'", names.cluster_id);

    let node_pools = gs
        .aws_machine_deployments
        .iter()
        .map(|md| machine_pool::node_pool(&names, md, facts, options))
        .collect::<Result<Vec<_>>>()?;

    Ok(CapiCrs {
        ca_secret: options
            .ca_private_key
            .as_deref()
            .map(|key| secret::ca_secret(&names, gs, key))
            .transpose()?,
        custom_files_secret: secret::custom_files_secret(&names, gs)?,
        etcd_certs_secret: secret::etcd_certs_secret(&names, gs)?,
        cluster: cluster::cluster(&names, gs),
        aws_cluster: aws_cluster::aws_cluster(&names, gs, facts, options),
        control_plane: control_plane::kubeadm_control_plane(&names, gs, options),
        control_plane_machine_template: control_plane::machine_template(
            &names, gs, facts, options,
        ),
        old_control_plane_machines: machine::old_control_plane_machines(
            &names, gs, facts, options,
        ),
        node_pools,
    })
}

/// Names and addresses derived from the cluster ID.
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct Names {
    pub(crate) cluster_id: String,
    pub(crate) namespace: String,
    base_domain: String,
}

impl Names {
    pub(crate) fn new<S1, S2, S3>(cluster_id: S1, namespace: S2, base_domain: S3) -> Self
    where
        S1: Into<String>,
        S2: Into<String>,
        S3: Into<String>,
    {
        Self {
            cluster_id: cluster_id.into(),
            namespace: namespace.into(),
            base_domain: base_domain.into(),
        }
    }

    /// Metadata for an object named `name` in the cluster namespace.
    pub(crate) fn meta<S: Into<String>>(&self, name: S) -> ObjectMeta {
        ObjectMeta {
            name: Some(name.into()),
            namespace: Some(self.namespace.clone()),
            ..Default::default()
        }
    }

    pub(crate) fn cluster(&self) -> String {
        self.cluster_id.clone()
    }

    pub(crate) fn control_plane(&self) -> String {
        format!("{}-control-plane", self.cluster_id)
    }

    pub(crate) fn old_control_plane_machine(&self, n: usize) -> String {
        format!("{}-control-plane-old-{}", self.cluster_id, n)
    }

    pub(crate) fn machine_pool(&self, machine_deployment: &str) -> String {
        format!("{}-worker-{}", self.cluster_id, machine_deployment)
    }

    pub(crate) fn custom_files_secret(&self) -> String {
        format!("{}-migration-custom-files", self.cluster_id)
    }

    pub(crate) fn etcd_certs_secret(&self) -> String {
        format!("{}-old-etcd-certs", self.cluster_id)
    }

    pub(crate) fn ca_secret(&self) -> String {
        format!("{}-ca", self.cluster_id)
    }

    /// The DNS zone of the cluster, `<id>.k8s.<base domain>`.
    pub(crate) fn dns_domain(&self) -> String {
        cluster_dns_domain(&self.cluster_id, &self.base_domain)
    }

    pub(crate) fn etcd_endpoint(&self) -> String {
        format!("etcd.{}", self.dns_domain())
    }

    pub(crate) fn api_endpoint(&self) -> String {
        format!("api.{}", self.dns_domain())
    }
}

/// The DNS zone of a legacy cluster, `<id>.k8s.<base domain>`.
pub fn cluster_dns_domain(cluster_id: &str, base_domain: &str) -> String {
    format!("{}.k8s.{}", cluster_id, base_domain)
}

#[cfg(test)]
pub(crate) mod test_fixtures {
    use crate::aws::{ClusterSubnet, NetworkFacts, NodePoolNetwork, NodePoolSubnet};
    use crate::giantswarm::GsClusterCrs;
    use capi_migration_model::giantswarm::{
        AwsCluster, AwsClusterSpec, AwsClusterSpecCluster, AwsClusterSpecClusterDns,
        AwsClusterSpecProvider, AwsClusterSpecProviderPods, AwsClusterStatus,
        AwsClusterStatusProvider, AwsClusterStatusProviderNetwork, AwsControlPlane,
        AwsControlPlaneSpec, AwsMachineDeployment, AwsMachineDeploymentSpec,
        AwsMachineDeploymentSpecInstanceType, AwsMachineDeploymentSpecNodePool,
        AwsMachineDeploymentSpecNodePoolScaling, AwsMachineDeploymentSpecProvider,
        G8sControlPlane, G8sControlPlaneSpec,
    };
    use k8s_openapi::api::core::v1::Secret;
    use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
    use k8s_openapi::ByteString;
    use maplit::btreemap;
    use std::collections::BTreeMap;

    fn secret(name: &str, data: BTreeMap<String, ByteString>) -> Secret {
        Secret {
            metadata: ObjectMeta {
                name: Some(name.to_string()),
                namespace: Some("default".to_string()),
                resource_version: Some("1234".to_string()),
                uid: Some("0b2f6a4e".to_string()),
                ..Default::default()
            },
            data: Some(data),
            ..Default::default()
        }
    }

    fn bytes(value: &str) -> ByteString {
        ByteString(value.as_bytes().to_vec())
    }

    pub(crate) fn gs_crs() -> GsClusterCrs {
        let mut aws_cluster = AwsCluster::new(
            "a1b2c",
            AwsClusterSpec {
                cluster: AwsClusterSpecCluster {
                    description: "production".to_string(),
                    dns: AwsClusterSpecClusterDns {
                        domain: "gauss.eu-west-1.aws.gigantic.io".to_string(),
                    },
                },
                provider: AwsClusterSpecProvider {
                    region: "eu-west-1".to_string(),
                    pods: AwsClusterSpecProviderPods {
                        cidr_block: "10.2.0.0/16".to_string(),
                    },
                },
            },
        );
        aws_cluster.metadata.namespace = Some("default".to_string());
        aws_cluster.status = Some(AwsClusterStatus {
            provider: AwsClusterStatusProvider {
                network: AwsClusterStatusProviderNetwork {
                    cidr: "10.1.0.0/24".to_string(),
                    vpc_id: "vpc-0123".to_string(),
                },
            },
        });

        GsClusterCrs {
            aws_cluster,
            aws_control_plane: AwsControlPlane::new(
                "m9x3q",
                AwsControlPlaneSpec {
                    availability_zones: vec!["eu-west-1a".to_string()],
                    instance_type: "m5.xlarge".to_string(),
                },
            ),
            g8s_control_plane: G8sControlPlane::new("m9x3q", G8sControlPlaneSpec { replicas: 3 }),
            aws_machine_deployments: vec![AwsMachineDeployment::new(
                "x7k2p",
                AwsMachineDeploymentSpec {
                    node_pool: AwsMachineDeploymentSpecNodePool {
                        description: "general".to_string(),
                        scaling: AwsMachineDeploymentSpecNodePoolScaling { max: 10, min: 3 },
                    },
                    provider: AwsMachineDeploymentSpecProvider {
                        availability_zones: vec!["eu-west-1a".to_string()],
                        worker: AwsMachineDeploymentSpecInstanceType {
                            instance_type: "r5.2xlarge".to_string(),
                        },
                    },
                },
            )],
            etcd_certs: secret(
                "a1b2c-etcd1",
                btreemap! {
                    "ca".to_string() => bytes("etcd-ca"),
                    "crt".to_string() => bytes("etcd-crt"),
                    "key".to_string() => bytes("etcd-key"),
                },
            ),
            encryption_key: secret(
                "a1b2c-encryption",
                btreemap! { "encryption".to_string() => bytes("c2VjcmV0a2V5") },
            ),
            kube_proxy_certs: secret(
                "a1b2c-worker",
                btreemap! {
                    "ca".to_string() => bytes("worker-ca"),
                    "crt".to_string() => bytes("worker-crt"),
                    "key".to_string() => bytes("worker-key"),
                },
            ),
        }
    }

    pub(crate) fn facts() -> NetworkFacts {
        NetworkFacts {
            internet_gateway_id: "igw-0123".to_string(),
            subnets: vec![
                ClusterSubnet {
                    id: "subnet-private".to_string(),
                    cidr_block: "10.1.0.0/25".to_string(),
                    availability_zone: "eu-west-1a".to_string(),
                    is_public: false,
                },
                ClusterSubnet {
                    id: "subnet-public".to_string(),
                    cidr_block: "10.1.0.128/25".to_string(),
                    availability_zone: "eu-west-1a".to_string(),
                    is_public: true,
                },
            ],
            master_security_group_id: "sg-master".to_string(),
            node_pools: btreemap! {
                "x7k2p".to_string() => NodePoolNetwork {
                    security_group_id: "sg-worker".to_string(),
                    subnets: vec![
                        NodePoolSubnet {
                            id: "subnet-np-a".to_string(),
                            availability_zone: "eu-west-1a".to_string(),
                        },
                        NodePoolSubnet {
                            id: "subnet-np-b".to_string(),
                            availability_zone: "eu-west-1b".to_string(),
                        },
                    ],
                },
            },
        }
    }

    pub(crate) fn options() -> super::TransformOptions {
        super::TransformOptions {
            k8s_version: "v1.19.4".to_string(),
            ssh_key_name: Some("ops".to_string()),
            ca_private_key: None,
        }
    }
}
