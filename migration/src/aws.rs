use crate::error::{self, Result};
use crate::giantswarm::GsClusterCrs;
use aws_config::retry::RetryConfig;
use aws_sdk_ec2::model::{Filter, Tag};
use aws_smithy_types::retry::RetryMode;
use aws_types::region::Region;
use aws_types::SdkConfig;
use log::{debug, info};
use snafu::{ensure, OptionExt, ResultExt};
use std::collections::BTreeMap;

const TAG_SUBNET_TYPE: &str = "giantswarm.io/subnet-type";
const TAG_STACK: &str = "giantswarm.io/stack";
const TAG_MACHINE_DEPLOYMENT: &str = "giantswarm.io/machine-deployment";
const SUBNET_TYPE_PUBLIC: &str = "public";
const SUBNET_TYPE_CNI: &str = "aws-cni";
const STACK_TCCP: &str = "tccp";

/// The AWS config for `region`, using the default credential chain.
pub async fn sdk_config(region: &str) -> SdkConfig {
    info!("Creating AWS config for region '{}'", region);
    aws_config::from_env()
        .retry_config(
            RetryConfig::standard()
                .with_retry_mode(RetryMode::Adaptive)
                .with_max_attempts(15),
        )
        .region(Region::new(region.to_string()))
        .load()
        .await
}

/// The AWS resources of the legacy cluster that the new CAPI objects point at.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct NetworkFacts {
    pub internet_gateway_id: String,
    pub subnets: Vec<ClusterSubnet>,
    pub master_security_group_id: String,
    /// Keyed by machine deployment name.
    pub node_pools: BTreeMap<String, NodePoolNetwork>,
}

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ClusterSubnet {
    pub id: String,
    pub cidr_block: String,
    pub availability_zone: String,
    pub is_public: bool,
}

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct NodePoolNetwork {
    pub security_group_id: String,
    pub subnets: Vec<NodePoolSubnet>,
}

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct NodePoolSubnet {
    pub id: String,
    pub availability_zone: String,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum SubnetKind {
    Cni,
    Public,
    Private,
}

pub(crate) fn subnet_kind(tags: &[Tag]) -> SubnetKind {
    let subnet_type = tags
        .iter()
        .find(|tag| tag.key() == Some(TAG_SUBNET_TYPE))
        .and_then(|tag| tag.value());
    match subnet_type {
        Some(SUBNET_TYPE_CNI) => SubnetKind::Cni,
        Some(SUBNET_TYPE_PUBLIC) => SubnetKind::Public,
        _ => SubnetKind::Private,
    }
}

fn filter<S1, S2>(name: S1, value: S2) -> Filter
where
    S1: Into<String>,
    S2: Into<String>,
{
    Filter::builder().name(name).values(value).build()
}

/// Look up everything the transformation needs from EC2.
pub async fn fetch_network_facts(
    ec2: &aws_sdk_ec2::Client,
    gs: &GsClusterCrs,
) -> Result<NetworkFacts> {
    let cluster_id = gs.cluster_id();
    let vpc_id = gs.aws_cluster.network().vpc_id;
    ensure!(
        !vpc_id.is_empty(),
        error::MissingVpcIdSnafu {
            cluster_id: &cluster_id
        }
    );

    let internet_gateway_id = internet_gateway(ec2, &vpc_id).await?;
    let subnets = cluster_subnets(ec2, &vpc_id).await?;
    let master_security_group_id = security_group(
        ec2,
        &format!("{}-master", cluster_id),
        vec![filter("tag:Name", format!("{}-master", cluster_id))],
    )
    .await?;

    let mut node_pools = BTreeMap::new();
    for md in &gs.aws_machine_deployments {
        let md_name = md.metadata.name.clone().unwrap_or_default();
        let security_group_id = security_group(
            ec2,
            &format!("{}-worker ({})", cluster_id, md_name),
            vec![
                filter("tag:Name", format!("{}-worker", cluster_id)),
                filter(format!("tag:{}", TAG_MACHINE_DEPLOYMENT), &md_name),
            ],
        )
        .await?;
        let subnets = node_pool_subnets(ec2, &md_name).await?;
        node_pools.insert(
            md_name,
            NodePoolNetwork {
                security_group_id,
                subnets,
            },
        );
    }

    Ok(NetworkFacts {
        internet_gateway_id,
        subnets,
        master_security_group_id,
        node_pools,
    })
}

async fn internet_gateway(ec2: &aws_sdk_ec2::Client, vpc_id: &str) -> Result<String> {
    let output = ec2
        .describe_internet_gateways()
        .filters(filter("attachment.vpc-id", vpc_id))
        .send()
        .await
        .context(error::DescribeInternetGatewaysSnafu { vpc_id })?;
    let gateways = output.internet_gateways().unwrap_or_default();
    ensure!(
        gateways.len() == 1,
        error::AwsCountMismatchSnafu {
            what: format!("internet gateway for '{}'", vpc_id),
            found: gateways.len(),
        }
    );
    let id = gateways
        .first()
        .and_then(|gateway| gateway.internet_gateway_id())
        .context(error::MissingAwsFieldSnafu {
            what: "internet gateway",
            field: "InternetGatewayId",
        })?;
    debug!("Found internet gateway '{}' for '{}'", id, vpc_id);
    Ok(id.to_string())
}

async fn cluster_subnets(ec2: &aws_sdk_ec2::Client, vpc_id: &str) -> Result<Vec<ClusterSubnet>> {
    let output = ec2
        .describe_subnets()
        .filters(filter("vpc-id", vpc_id))
        .filters(filter(format!("tag:{}", TAG_STACK), STACK_TCCP))
        .send()
        .await
        .context(error::DescribeSubnetsSnafu {
            what: format!("VPC '{}'", vpc_id),
        })?;

    let mut cluster_subnets = Vec::new();
    for subnet in output.subnets().unwrap_or_default() {
        let kind = subnet_kind(subnet.tags().unwrap_or_default());
        if kind == SubnetKind::Cni {
            debug!("Skipping CNI subnet {:?}", subnet.subnet_id());
            continue;
        }
        cluster_subnets.push(ClusterSubnet {
            id: required(subnet.subnet_id(), "subnet", "SubnetId")?,
            cidr_block: required(subnet.cidr_block(), "subnet", "CidrBlock")?,
            availability_zone: required(subnet.availability_zone(), "subnet", "AvailabilityZone")?,
            is_public: kind == SubnetKind::Public,
        });
    }
    info!(
        "Found {} cluster subnets in '{}'",
        cluster_subnets.len(),
        vpc_id
    );
    Ok(cluster_subnets)
}

async fn security_group(
    ec2: &aws_sdk_ec2::Client,
    what: &str,
    filters: Vec<Filter>,
) -> Result<String> {
    let output = ec2
        .describe_security_groups()
        .set_filters(Some(filters))
        .send()
        .await
        .context(error::DescribeSecurityGroupsSnafu { what })?;
    let groups = output.security_groups().unwrap_or_default();
    ensure!(
        groups.len() == 1,
        error::AwsCountMismatchSnafu {
            what: format!("security group '{}'", what),
            found: groups.len(),
        }
    );
    let id = required(
        groups.first().and_then(|group| group.group_id()),
        "security group",
        "GroupId",
    )?;
    debug!("Found security group '{}' for '{}'", id, what);
    Ok(id)
}

async fn node_pool_subnets(
    ec2: &aws_sdk_ec2::Client,
    machine_deployment: &str,
) -> Result<Vec<NodePoolSubnet>> {
    let output = ec2
        .describe_subnets()
        .filters(filter(
            format!("tag:{}", TAG_MACHINE_DEPLOYMENT),
            machine_deployment,
        ))
        .send()
        .await
        .context(error::DescribeSubnetsSnafu {
            what: format!("machine deployment '{}'", machine_deployment),
        })?;
    output
        .subnets()
        .unwrap_or_default()
        .iter()
        .map(|subnet| {
            Ok(NodePoolSubnet {
                id: required(subnet.subnet_id(), "subnet", "SubnetId")?,
                availability_zone: required(
                    subnet.availability_zone(),
                    "subnet",
                    "AvailabilityZone",
                )?,
            })
        })
        .collect()
}

fn required(value: Option<&str>, what: &str, field: &str) -> Result<String> {
    value
        .map(str::to_string)
        .context(error::MissingAwsFieldSnafu { what, field })
}

#[cfg(test)]
mod test {
    use super::*;

    fn tag(key: &str, value: &str) -> Tag {
        Tag::builder().key(key).value(value).build()
    }

    #[test]
    fn subnet_classification() {
        assert_eq!(
            subnet_kind(&[tag("Name", "a1b2c"), tag(TAG_SUBNET_TYPE, "aws-cni")]),
            SubnetKind::Cni
        );
        assert_eq!(
            subnet_kind(&[tag(TAG_SUBNET_TYPE, "public")]),
            SubnetKind::Public
        );
        assert_eq!(
            subnet_kind(&[tag(TAG_SUBNET_TYPE, "private")]),
            SubnetKind::Private
        );
        assert_eq!(subnet_kind(&[]), SubnetKind::Private);
        // The type must come from the subnet type tag, not any tag with a matching value.
        assert_eq!(
            subnet_kind(&[tag("giantswarm.io/role", "public")]),
            SubnetKind::Private
        );
    }

    #[test]
    fn missing_field() {
        let err = required(None, "subnet", "SubnetId").unwrap_err();
        assert_eq!(
            err.to_string(),
            "The subnet returned by AWS has no 'SubnetId'"
        );
        assert_eq!(required(Some("subnet-1"), "subnet", "SubnetId").unwrap(), "subnet-1");
    }
}
