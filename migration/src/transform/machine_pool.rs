use super::control_plane::NODE_NAME_FROM_METADATA;
use super::secret::{KUBE_PROXY_CONFIG_KEY, KUBE_PROXY_KUBECONFIG_KEY};
use super::templates::KUBE_PROXY_KUBECONFIG_PATH;
use super::{Names, NodePool, TransformOptions};
use crate::aws::NetworkFacts;
use crate::error::{self, Result};
use capi_migration_model::capi::{
    AwsLaunchTemplate, AwsMachinePool, AwsMachinePoolSpec, AwsResourceReference, Bootstrap, File,
    InitConfiguration, JoinConfiguration, KubeadmConfig, KubeadmConfigSpec, MachinePool,
    MachinePoolSpec, MachineSpec, MachineTemplateSpec, NodeRegistration,
};
use capi_migration_model::constants::{
    CAPI_BOOTSTRAP_API_VERSION, CAPI_INFRASTRUCTURE_API_VERSION, KIND_AWS_MACHINE_POOL,
    KIND_KUBEADM_CONFIG,
};
use capi_migration_model::giantswarm::AwsMachineDeployment;
use capi_migration_model::object_ref;
use kube::ResourceExt;
use maplit::btreemap;
use snafu::OptionExt;

pub(crate) const NODES_IAM_INSTANCE_PROFILE: &str = "nodes.cluster-api-provider-aws.sigs.k8s.io";

const KUBE_PROXY_CONFIG_PATH: &str = "/etc/kubernetes/config/proxy-config.yml";
const SET_HOSTNAME: &str =
    "hostnamectl set-hostname $(curl http://169.254.169.254/latest/meta-data/local-hostname)";

/// The `AWSMachinePool`, `KubeadmConfig` and `MachinePool` of a legacy machine deployment.
pub(crate) fn node_pool(
    names: &Names,
    md: &AwsMachineDeployment,
    facts: &NetworkFacts,
    options: &TransformOptions,
) -> Result<NodePool> {
    let md_name = md.name_any();
    let network = facts
        .node_pools
        .get(&md_name)
        .context(error::MissingAwsFieldSnafu {
            what: format!("network of machine deployment '{}'", md_name),
            field: "security group",
        })?;
    let name = names.machine_pool(&md_name);
    let scaling = &md.spec.node_pool.scaling;

    let aws_machine_pool = AwsMachinePool {
        metadata: names.meta(&name),
        ..AwsMachinePool::new(
            &name,
            AwsMachinePoolSpec {
                min_size: scaling.min,
                max_size: scaling.max,
                availability_zones: network
                    .subnets
                    .iter()
                    .map(|subnet| subnet.availability_zone.clone())
                    .collect(),
                subnets: network
                    .subnets
                    .iter()
                    .map(|subnet| AwsResourceReference::with_id(&subnet.id))
                    .collect(),
                aws_launch_template: AwsLaunchTemplate {
                    name: md_name.clone(),
                    iam_instance_profile: Some(NODES_IAM_INSTANCE_PROFILE.to_string()),
                    instance_type: md.spec.provider.worker.instance_type.clone(),
                    ssh_key_name: options.ssh_key_name.clone(),
                    additional_security_groups: vec![AwsResourceReference::with_id(
                        &network.security_group_id,
                    )],
                },
            },
        )
    };

    let custom_files = names.custom_files_secret();
    let kubeadm_config = KubeadmConfig {
        metadata: names.meta(&name),
        ..KubeadmConfig::new(
            &name,
            KubeadmConfigSpec {
                pre_kubeadm_commands: vec![SET_HOSTNAME.to_string()],
                init_configuration: Some(InitConfiguration {
                    node_registration: NodeRegistration {
                        name: Some(NODE_NAME_FROM_METADATA.to_string()),
                        kubelet_extra_args: btreemap! {
                            "cloud-provider".to_string() => "aws".to_string(),
                        },
                    },
                }),
                join_configuration: Some(JoinConfiguration {
                    node_registration: NodeRegistration {
                        name: Some(NODE_NAME_FROM_METADATA.to_string()),
                        kubelet_extra_args: btreemap! {
                            "cloud-provider".to_string() => "aws".to_string(),
                            "node-labels".to_string() =>
                                "node.kubernetes.io/worker,role=worker".to_string(),
                        },
                    },
                    control_plane: None,
                }),
                files: vec![
                    File::from_secret(
                        KUBE_PROXY_KUBECONFIG_PATH,
                        &custom_files,
                        KUBE_PROXY_KUBECONFIG_KEY,
                    ),
                    File::from_secret(KUBE_PROXY_CONFIG_PATH, &custom_files, KUBE_PROXY_CONFIG_KEY),
                ],
                ..Default::default()
            },
        )
    };

    let machine_pool = MachinePool {
        metadata: names.meta(&name),
        ..MachinePool::new(
            &name,
            MachinePoolSpec {
                cluster_name: names.cluster(),
                replicas: Some(scaling.min),
                template: MachineTemplateSpec {
                    metadata: None,
                    spec: MachineSpec {
                        cluster_name: names.cluster(),
                        bootstrap: Bootstrap {
                            config_ref: Some(object_ref(
                                CAPI_BOOTSTRAP_API_VERSION,
                                KIND_KUBEADM_CONFIG,
                                &name,
                            )),
                            data_secret_name: None,
                        },
                        infrastructure_ref: object_ref(
                            CAPI_INFRASTRUCTURE_API_VERSION,
                            KIND_AWS_MACHINE_POOL,
                            &name,
                        ),
                        version: Some(options.k8s_version.clone()),
                        ..Default::default()
                    },
                },
                ..Default::default()
            },
        )
    };

    Ok(NodePool {
        aws_machine_pool,
        kubeadm_config,
        machine_pool,
    })
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::transform::test_fixtures::{facts, gs_crs, options};

    fn pool() -> NodePool {
        let gs = gs_crs();
        node_pool(
            &Names::new("a1b2c", "default", "example.com"),
            &gs.aws_machine_deployments[0],
            &facts(),
            &options(),
        )
        .unwrap()
    }

    #[test]
    fn aws_machine_pool() {
        let value = serde_json::to_value(&pool().aws_machine_pool).unwrap();
        assert_eq!(value["apiVersion"], "infrastructure.cluster.x-k8s.io/v1alpha3");
        assert_eq!(value["kind"], "AWSMachinePool");
        assert_eq!(value["metadata"]["name"], "a1b2c-worker-x7k2p");
        let spec = &value["spec"];
        assert_eq!(spec["minSize"], 3);
        assert_eq!(spec["maxSize"], 10);
        assert_eq!(
            spec["availabilityZones"],
            serde_json::json!(["eu-west-1a", "eu-west-1b"])
        );
        assert_eq!(spec["subnets"][0]["id"], "subnet-np-a");
        assert_eq!(spec["subnets"][1]["id"], "subnet-np-b");
        let template = &spec["awsLaunchTemplate"];
        assert_eq!(template["name"], "x7k2p");
        assert_eq!(template["instanceType"], "r5.2xlarge");
        assert_eq!(
            template["iamInstanceProfile"],
            "nodes.cluster-api-provider-aws.sigs.k8s.io"
        );
        assert_eq!(template["sshKeyName"], "ops");
        assert_eq!(template["additionalSecurityGroups"][0]["id"], "sg-worker");
    }

    #[test]
    fn machine_pool_refs() {
        let value = serde_json::to_value(&pool().machine_pool).unwrap();
        assert_eq!(value["apiVersion"], "exp.cluster.x-k8s.io/v1alpha3");
        assert_eq!(value["kind"], "MachinePool");
        assert_eq!(value["spec"]["clusterName"], "a1b2c");
        assert_eq!(value["spec"]["replicas"], 3);
        let spec = &value["spec"]["template"]["spec"];
        assert_eq!(spec["version"], "v1.19.4");
        assert_eq!(spec["infrastructureRef"]["kind"], "AWSMachinePool");
        assert_eq!(spec["infrastructureRef"]["name"], "a1b2c-worker-x7k2p");
        assert_eq!(spec["bootstrap"]["configRef"]["kind"], "KubeadmConfig");
        assert_eq!(
            spec["bootstrap"]["configRef"]["apiVersion"],
            "bootstrap.cluster.x-k8s.io/v1alpha3"
        );
    }

    #[test]
    fn worker_bootstrap() {
        let config = pool().kubeadm_config;
        assert_eq!(config.metadata.name.as_deref(), Some("a1b2c-worker-x7k2p"));
        assert_eq!(config.spec.pre_kubeadm_commands, vec![SET_HOSTNAME]);
        let join = config.spec.join_configuration.unwrap().node_registration;
        assert_eq!(join.kubelet_extra_args["cloud-provider"], "aws");
        assert_eq!(
            join.kubelet_extra_args["node-labels"],
            "node.kubernetes.io/worker,role=worker"
        );
        let paths: Vec<_> = config.spec.files.iter().map(|file| file.path.as_str()).collect();
        assert_eq!(
            paths,
            vec![
                "/etc/kubernetes/kubeconfig/kube-proxy.yaml",
                "/etc/kubernetes/config/proxy-config.yml"
            ]
        );
    }

    #[test]
    fn missing_network_fails() {
        let gs = gs_crs();
        let err = node_pool(
            &Names::new("a1b2c", "default", "example.com"),
            &gs.aws_machine_deployments[0],
            &Default::default(),
            &options(),
        );
        assert!(err.is_err());
    }
}
