use super::Names;
use crate::giantswarm::GsClusterCrs;
use capi_migration_model::capi::{Cluster, ClusterNetwork, ClusterSpec, NetworkRanges};
use capi_migration_model::constants::{
    CAPI_CONTROL_PLANE_API_VERSION, CAPI_INFRASTRUCTURE_API_VERSION, KIND_AWS_CLUSTER,
    KIND_KUBEADM_CONTROL_PLANE,
};
use capi_migration_model::object_ref;

pub(crate) fn cluster(names: &Names, gs: &GsClusterCrs) -> Cluster {
    Cluster {
        metadata: names.meta(names.cluster()),
        ..Cluster::new(
            &names.cluster(),
            ClusterSpec {
                cluster_network: Some(ClusterNetwork {
                    pods: Some(NetworkRanges {
                        cidr_blocks: vec![gs.aws_cluster.spec.provider.pods.cidr_block.clone()],
                    }),
                    ..Default::default()
                }),
                control_plane_ref: Some(object_ref(
                    CAPI_CONTROL_PLANE_API_VERSION,
                    KIND_KUBEADM_CONTROL_PLANE,
                    names.control_plane(),
                )),
                infrastructure_ref: Some(object_ref(
                    CAPI_INFRASTRUCTURE_API_VERSION,
                    KIND_AWS_CLUSTER,
                    names.cluster(),
                )),
                ..Default::default()
            },
        )
    }
}
