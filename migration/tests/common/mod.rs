#![allow(dead_code)]

use capi_migration::aws::{ClusterSubnet, NetworkFacts, NodePoolNetwork, NodePoolSubnet};
use capi_migration::giantswarm::GsClusterCrs;
use capi_migration::transform::{transform_gs_to_capi_crs, CapiCrs, TransformOptions};
use capi_migration_model::giantswarm::{
    AwsCluster, AwsClusterSpec, AwsClusterSpecCluster, AwsClusterSpecClusterDns,
    AwsClusterSpecProvider, AwsClusterSpecProviderPods, AwsClusterStatus,
    AwsClusterStatusProvider, AwsClusterStatusProviderNetwork, AwsControlPlane,
    AwsControlPlaneSpec, AwsMachineDeployment, AwsMachineDeploymentSpec,
    AwsMachineDeploymentSpecInstanceType, AwsMachineDeploymentSpecNodePool,
    AwsMachineDeploymentSpecNodePoolScaling, AwsMachineDeploymentSpecProvider, G8sControlPlane,
    G8sControlPlaneSpec,
};
use k8s_openapi::api::core::v1::Secret;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use k8s_openapi::ByteString;
use kube::{Client, Config};
use maplit::btreemap;
use serde_json::{json, Value};
use std::collections::BTreeMap;
use wiremock::{MockServer, Request, Respond, ResponseTemplate};

pub const CAPI: &str = "/apis/cluster.x-k8s.io/v1alpha3/namespaces/default";
pub const EXP: &str = "/apis/exp.cluster.x-k8s.io/v1alpha3/namespaces/default";
pub const INFRA: &str = "/apis/infrastructure.cluster.x-k8s.io/v1alpha3/namespaces/default";
pub const BOOTSTRAP: &str = "/apis/bootstrap.cluster.x-k8s.io/v1alpha3/namespaces/default";
pub const CONTROL_PLANE: &str = "/apis/controlplane.cluster.x-k8s.io/v1alpha3/namespaces/default";
pub const CORE: &str = "/api/v1/namespaces/default";

/// A client that talks to `server` instead of a real API server.
pub fn client(server: &MockServer) -> Client {
    let config = Config::new(server.uri().parse().unwrap());
    Client::try_from(config).unwrap()
}

/// `METHOD path` of every request `server` received, in order.
pub async fn requests(server: &MockServer) -> Vec<String> {
    server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .map(|request| format!("{} {}", request.method, request.url.path()))
        .collect()
}

/// The JSON body of the first request `server` received for `method` and `path`.
pub async fn body_of(server: &MockServer, method: &str, path: &str) -> Value {
    server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .find(|request| request.method.to_string() == method && request.url.path() == path)
        .map(|request| serde_json::from_slice(&request.body).unwrap())
        .unwrap()
}

/// Answers a create with the posted object, as the API server would, plus a UID derived from its
/// name.
pub struct Created;

impl Respond for Created {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let mut obj: Value = serde_json::from_slice(&request.body).unwrap();
        let uid = format!("uid-{}", obj["metadata"]["name"].as_str().unwrap());
        obj["metadata"]["uid"] = Value::from(uid);
        ResponseTemplate::new(201).set_body_json(obj)
    }
}

/// An API error as the API server reports it.
pub fn status_error(code: u16, reason: &str) -> ResponseTemplate {
    ResponseTemplate::new(code).set_body_json(json!({
        "kind": "Status",
        "apiVersion": "v1",
        "metadata": {},
        "status": "Failure",
        "message": format!("the server responded with {}", reason),
        "reason": reason,
        "code": code,
    }))
}

pub fn deleted() -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "kind": "Status",
        "apiVersion": "v1",
        "metadata": {},
        "status": "Success",
        "code": 200,
    }))
}

fn secret(name: &str, data: BTreeMap<String, ByteString>) -> Secret {
    Secret {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            namespace: Some("default".to_string()),
            ..Default::default()
        },
        data: Some(data),
        ..Default::default()
    }
}

fn bytes(value: &str) -> ByteString {
    ByteString(value.as_bytes().to_vec())
}

/// A legacy cluster `a1b2c` with one master and one node pool `x7k2p`.
pub fn gs_crs() -> GsClusterCrs {
    let mut aws_cluster = AwsCluster::new(
        "a1b2c",
        AwsClusterSpec {
            cluster: AwsClusterSpecCluster {
                description: "staging".to_string(),
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
        g8s_control_plane: G8sControlPlane::new("m9x3q", G8sControlPlaneSpec { replicas: 1 }),
        aws_machine_deployments: vec![AwsMachineDeployment::new(
            "x7k2p",
            AwsMachineDeploymentSpec {
                node_pool: AwsMachineDeploymentSpecNodePool {
                    description: "general".to_string(),
                    scaling: AwsMachineDeploymentSpecNodePoolScaling { max: 5, min: 2 },
                },
                provider: AwsMachineDeploymentSpecProvider {
                    availability_zones: vec!["eu-west-1a".to_string()],
                    worker: AwsMachineDeploymentSpecInstanceType {
                        instance_type: "m5.2xlarge".to_string(),
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

pub fn facts() -> NetworkFacts {
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
                subnets: vec![NodePoolSubnet {
                    id: "subnet-np-a".to_string(),
                    availability_zone: "eu-west-1a".to_string(),
                }],
            },
        },
    }
}

pub fn crs() -> CapiCrs {
    transform_gs_to_capi_crs(
        &gs_crs(),
        &facts(),
        &TransformOptions {
            k8s_version: "v1.19.4".to_string(),
            ssh_key_name: None,
            ca_private_key: None,
        },
    )
    .unwrap()
}
