/// Helper macro to build Cluster API group names. With no parameters this returns the core group,
/// with a literal prefix it returns `prefix.cluster.x-k8s.io`.
macro_rules! capi_group {
    () => {
        "cluster.x-k8s.io"
    };
    ($s:literal) => {
        concat!($s, ".", capi_group!())
    };
}

// Legacy Giant Swarm identifiers
pub const GS_INFRASTRUCTURE_GROUP: &str = "infrastructure.giantswarm.io";
pub const GS_VERSION: &str = "v1alpha2";
pub const GS_LABEL_CLUSTER: &str = "giantswarm.io/cluster";
pub const GS_NAMESPACE: &str = "default";

// Cluster API groups
pub const CAPI_VERSION: &str = "v1alpha3";
pub const CAPI_GROUP: &str = capi_group!();
pub const CAPI_EXP_GROUP: &str = capi_group!("exp");
pub const CAPI_INFRASTRUCTURE_GROUP: &str = capi_group!("infrastructure");
pub const CAPI_BOOTSTRAP_GROUP: &str = capi_group!("bootstrap");
pub const CAPI_CONTROL_PLANE_GROUP: &str = capi_group!("controlplane");

// Cluster API group versions, as used in `apiVersion` fields and object references
pub const CAPI_API_VERSION: &str = "cluster.x-k8s.io/v1alpha3";
pub const CAPI_EXP_API_VERSION: &str = "exp.cluster.x-k8s.io/v1alpha3";
pub const CAPI_INFRASTRUCTURE_API_VERSION: &str = "infrastructure.cluster.x-k8s.io/v1alpha3";
pub const CAPI_BOOTSTRAP_API_VERSION: &str = "bootstrap.cluster.x-k8s.io/v1alpha3";
pub const CAPI_CONTROL_PLANE_API_VERSION: &str = "controlplane.cluster.x-k8s.io/v1alpha3";

// Cluster API label keys
pub const LABEL_CLUSTER_NAME: &str = concat!(capi_group!(), "/cluster-name");
pub const LABEL_CONTROL_PLANE: &str = concat!(capi_group!(), "/control-plane");

// Kinds referenced across objects
pub const KIND_AWS_CLUSTER: &str = "AWSCluster";
pub const KIND_AWS_MACHINE: &str = "AWSMachine";
pub const KIND_AWS_MACHINE_POOL: &str = "AWSMachinePool";
pub const KIND_AWS_MACHINE_TEMPLATE: &str = "AWSMachineTemplate";
pub const KIND_KUBEADM_CONFIG: &str = "KubeadmConfig";
pub const KIND_KUBEADM_CONTROL_PLANE: &str = "KubeadmControlPlane";

// Secret type used by Cluster API for cluster certificates
pub const CAPI_SECRET_TYPE: &str = concat!(capi_group!(), "/secret");

#[test]
fn capi_constants_macro_test() {
    assert_eq!("cluster.x-k8s.io", capi_group!());
    assert_eq!("exp.cluster.x-k8s.io", CAPI_EXP_GROUP);
    assert_eq!(
        CAPI_INFRASTRUCTURE_API_VERSION,
        format!("{}/{}", CAPI_INFRASTRUCTURE_GROUP, CAPI_VERSION)
    );
    assert_eq!(
        CAPI_CONTROL_PLANE_API_VERSION,
        format!("{}/{}", CAPI_CONTROL_PLANE_GROUP, CAPI_VERSION)
    );
    assert_eq!(
        CAPI_BOOTSTRAP_API_VERSION,
        format!("{}/{}", CAPI_BOOTSTRAP_GROUP, CAPI_VERSION)
    );
    assert_eq!(
        CAPI_EXP_API_VERSION,
        format!("{}/{}", CAPI_EXP_GROUP, CAPI_VERSION)
    );
    assert_eq!(CAPI_API_VERSION, format!("{}/{}", CAPI_GROUP, CAPI_VERSION));
    assert_eq!("cluster.x-k8s.io/control-plane", LABEL_CONTROL_PLANE);
}
