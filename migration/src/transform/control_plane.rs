use super::secret::{ENCRYPTION_CONFIG_KEY, ETCD_CA_KEY, ETCD_CERT_KEY, ETCD_KEY_KEY, JOIN_SCRIPT_KEY};
use super::templates::ETCD_VERSION;
use super::{Names, TransformOptions};
use crate::aws::NetworkFacts;
use crate::giantswarm::GsClusterCrs;
use capi_migration_model::capi::{
    ApiServer, AwsMachineSpec, AwsMachineTemplate, AwsMachineTemplateResource,
    AwsMachineTemplateSpec, AwsResourceReference, ClusterConfiguration, ControlPlaneComponent,
    Etcd, File, HostPathMount, InitConfiguration, JoinConfiguration, KubeadmConfigSpec,
    KubeadmControlPlane, KubeadmControlPlaneSpec, LocalEtcd, NodeRegistration,
};
use capi_migration_model::constants::{
    CAPI_INFRASTRUCTURE_API_VERSION, KIND_AWS_MACHINE_TEMPLATE,
};
use capi_migration_model::object_ref;
use maplit::btreemap;
use std::collections::BTreeMap;

pub(crate) const CONTROL_PLANE_IAM_INSTANCE_PROFILE: &str =
    "control-plane.cluster-api-provider-aws.sigs.k8s.io";

const JOIN_SCRIPT_PATH: &str = "/migration/join-existing-cluster.sh";
const ENCRYPTION_DIR: &str = "/etc/kubernetes/encryption";
const ETCD_PKI_DIR: &str = "/etc/kubernetes/pki/etcd";

/// The node name that cloud-init renders from the instance metadata.
pub(crate) const NODE_NAME_FROM_METADATA: &str = "{{ ds.meta_data.local_hostname }}";

fn cloud_provider_aws() -> BTreeMap<String, String> {
    btreemap! { "cloud-provider".to_string() => "aws".to_string() }
}

fn encryption_config_path() -> String {
    format!("{}/k8s-encryption-config.yaml", ENCRYPTION_DIR)
}

/// Local etcd that joins the legacy etcd cluster as an additional member, using the legacy peer
/// certificates.
fn joining_etcd() -> LocalEtcd {
    let ca_bundle = format!("{}/ca-bundle.pem", ETCD_PKI_DIR);
    LocalEtcd {
        image_repository: Some("quay.io/giantswarm".to_string()),
        image_tag: Some(ETCD_VERSION.to_string()),
        data_dir: Some("/var/lib/etcd/data".to_string()),
        extra_args: btreemap! {
            "peer-cert-file".to_string() => format!("{}/old-etcd-cert.pem", ETCD_PKI_DIR),
            "peer-key-file".to_string() => format!("{}/old-etcd-key.pem", ETCD_PKI_DIR),
            "peer-trusted-ca-file".to_string() => ca_bundle.clone(),
            "trusted-ca-file".to_string() => ca_bundle,
            "initial-cluster-state".to_string() => "existing".to_string(),
            "initial-cluster".to_string() => "$ETCD_INITIAL_CLUSTER".to_string(),
        },
        ..Default::default()
    }
}

fn control_plane_files(names: &Names) -> Vec<File> {
    let custom_files = names.custom_files_secret();
    let etcd_certs = names.etcd_certs_secret();
    vec![
        File::from_secret(JOIN_SCRIPT_PATH, &custom_files, JOIN_SCRIPT_KEY),
        File::from_secret(encryption_config_path(), &custom_files, ENCRYPTION_CONFIG_KEY),
        File::from_secret(
            format!("{}/old-etcd-ca.pem", ETCD_PKI_DIR),
            &etcd_certs,
            ETCD_CA_KEY,
        ),
        File::from_secret(
            format!("{}/old-etcd-key.pem", ETCD_PKI_DIR),
            &etcd_certs,
            ETCD_KEY_KEY,
        ),
        File::from_secret(
            format!("{}/old-etcd-cert.pem", ETCD_PKI_DIR),
            &etcd_certs,
            ETCD_CERT_KEY,
        ),
    ]
}

pub(crate) fn kubeadm_control_plane(
    names: &Names,
    gs: &GsClusterCrs,
    options: &TransformOptions,
) -> KubeadmControlPlane {
    let mut api_server_args = cloud_provider_aws();
    api_server_args.insert(
        "encryption-provider-config".to_string(),
        encryption_config_path(),
    );
    let node_registration = NodeRegistration {
        name: Some(NODE_NAME_FROM_METADATA.to_string()),
        kubelet_extra_args: cloud_provider_aws(),
    };

    KubeadmControlPlane {
        metadata: names.meta(names.control_plane()),
        ..KubeadmControlPlane::new(
            &names.control_plane(),
            KubeadmControlPlaneSpec {
                replicas: Some(gs.g8s_control_plane.spec.replicas),
                version: options.k8s_version.clone(),
                infrastructure_template: object_ref(
                    CAPI_INFRASTRUCTURE_API_VERSION,
                    KIND_AWS_MACHINE_TEMPLATE,
                    names.control_plane(),
                ),
                kubeadm_config_spec: KubeadmConfigSpec {
                    cluster_configuration: Some(ClusterConfiguration {
                        etcd: Etcd {
                            local: Some(joining_etcd()),
                        },
                        api_server: ApiServer {
                            extra_args: api_server_args,
                            extra_volumes: vec![HostPathMount {
                                name: "encryption".to_string(),
                                host_path: ENCRYPTION_DIR.to_string(),
                                mount_path: ENCRYPTION_DIR.to_string(),
                                read_only: true,
                                path_type: Some("DirectoryOrCreate".to_string()),
                            }],
                            ..Default::default()
                        },
                        controller_manager: ControlPlaneComponent {
                            extra_args: cloud_provider_aws(),
                            ..Default::default()
                        },
                        ..Default::default()
                    }),
                    init_configuration: Some(InitConfiguration {
                        node_registration: node_registration.clone(),
                    }),
                    join_configuration: Some(JoinConfiguration {
                        node_registration,
                        control_plane: None,
                    }),
                    files: control_plane_files(names),
                    pre_kubeadm_commands: vec![format!("/bin/sh {}", JOIN_SCRIPT_PATH)],
                    ..Default::default()
                },
            },
        )
    }
}

/// The machine shape of the new masters, shared with the placeholders of the legacy masters.
pub(crate) fn control_plane_machine_spec(
    gs: &GsClusterCrs,
    facts: &NetworkFacts,
    options: &TransformOptions,
) -> AwsMachineSpec {
    AwsMachineSpec {
        instance_type: gs.aws_control_plane.spec.instance_type.clone(),
        iam_instance_profile: Some(CONTROL_PLANE_IAM_INSTANCE_PROFILE.to_string()),
        additional_security_groups: vec![AwsResourceReference::with_id(
            &facts.master_security_group_id,
        )],
        ssh_key_name: options.ssh_key_name.clone(),
        ..Default::default()
    }
}

pub(crate) fn machine_template(
    names: &Names,
    gs: &GsClusterCrs,
    facts: &NetworkFacts,
    options: &TransformOptions,
) -> AwsMachineTemplate {
    AwsMachineTemplate {
        metadata: names.meta(names.control_plane()),
        ..AwsMachineTemplate::new(
            &names.control_plane(),
            AwsMachineTemplateSpec {
                template: AwsMachineTemplateResource {
                    spec: control_plane_machine_spec(gs, facts, options),
                },
            },
        )
    }
}
