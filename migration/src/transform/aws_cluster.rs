use super::{Names, TransformOptions};
use crate::aws::NetworkFacts;
use crate::giantswarm::GsClusterCrs;
use capi_migration_model::capi::{
    ApiEndpoint, AwsCluster, AwsClusterSpec, AwsLoadBalancerSpec, Bastion, NetworkSpec,
    SubnetSpec, VpcSpec,
};

pub(crate) fn aws_cluster(
    names: &Names,
    gs: &GsClusterCrs,
    facts: &NetworkFacts,
    options: &TransformOptions,
) -> AwsCluster {
    let network = gs.aws_cluster.network();
    AwsCluster {
        metadata: names.meta(names.cluster()),
        ..AwsCluster::new(
            &names.cluster(),
            AwsClusterSpec {
                network_spec: NetworkSpec {
                    vpc: VpcSpec {
                        id: network.vpc_id,
                        cidr_block: network.cidr,
                        internet_gateway_id: Some(facts.internet_gateway_id.clone()),
                    },
                    subnets: facts
                        .subnets
                        .iter()
                        .map(|subnet| SubnetSpec {
                            id: subnet.id.clone(),
                            cidr_block: subnet.cidr_block.clone(),
                            availability_zone: subnet.availability_zone.clone(),
                            is_public: subnet.is_public,
                        })
                        .collect(),
                },
                region: gs.region().to_string(),
                ssh_key_name: options.ssh_key_name.clone(),
                control_plane_endpoint: ApiEndpoint {
                    host: String::new(),
                    port: 443,
                },
                control_plane_load_balancer: Some(AwsLoadBalancerSpec::default()),
                bastion: Bastion { enabled: false },
            },
        )
    }
}
