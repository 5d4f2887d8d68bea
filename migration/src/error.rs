use aws_sdk_ec2::error::{
    DescribeInternetGatewaysError, DescribeSecurityGroupsError, DescribeSubnetsError,
};
use aws_sdk_ec2::types::SdkError;
use aws_sdk_elasticloadbalancing::error::{DescribeInstanceHealthError, DescribeLoadBalancersError};
use aws_sdk_route53::error::{ChangeResourceRecordSetsError, ListHostedZonesByNameError};
use kube::config::KubeconfigError;
use snafu::Snafu;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    #[snafu(display("Unable to read kubeconfig '{}': {}", path, source))]
    KubeconfigRead {
        path: String,
        source: KubeconfigError,
    },

    #[snafu(display("Unable to load kube context '{}': {}", context, source))]
    KubeconfigContext {
        context: String,
        source: KubeconfigError,
    },

    #[snafu(display("Unable to create kube client: {}", source))]
    ClientCreate { source: kube::Error },

    #[snafu(display("Unable to {} {} '{}': {}", method, what, name, source))]
    KubeApiCall {
        method: String,
        what: String,
        name: String,
        source: kube::Error,
    },

    #[snafu(display("Unable to list {} for cluster '{}': {}", what, cluster_id, source))]
    KubeList {
        what: String,
        cluster_id: String,
        source: kube::Error,
    },

    #[snafu(display(
        "Expected 1 {} but found {} for cluster id '{}'",
        what,
        found,
        cluster_id
    ))]
    CountMismatch {
        what: String,
        found: usize,
        cluster_id: String,
    },

    #[snafu(display("{} '{}' did not appear after {} attempts", what, name, attempts))]
    WaitForObject {
        what: String,
        name: String,
        attempts: u32,
    },

    #[snafu(display("Secret '{}' has no '{}' key", secret, key))]
    MissingSecretKey { secret: String, key: String },

    #[snafu(display("Secret '{}' key '{}' is not valid UTF-8: {}", secret, key, source))]
    SecretNotUtf8 {
        secret: String,
        key: String,
        source: std::string::FromUtf8Error,
    },

    #[snafu(display("AWSCluster '{}' does not report a VPC ID", cluster_id))]
    MissingVpcId { cluster_id: String },

    #[snafu(display("Unable to describe internet gateways of '{}': {}", vpc_id, source))]
    DescribeInternetGateways {
        vpc_id: String,
        source: SdkError<DescribeInternetGatewaysError>,
    },

    #[snafu(display("Unable to describe subnets for {}: {}", what, source))]
    DescribeSubnets {
        what: String,
        source: SdkError<DescribeSubnetsError>,
    },

    #[snafu(display("Unable to describe security group '{}': {}", what, source))]
    DescribeSecurityGroups {
        what: String,
        source: SdkError<DescribeSecurityGroupsError>,
    },

    #[snafu(display("Expected 1 {} but found {}", what, found))]
    AwsCountMismatch { what: String, found: usize },

    #[snafu(display("The {} returned by AWS has no '{}'", what, field))]
    MissingAwsField { what: String, field: String },

    #[snafu(display("API ELB of cluster '{}' is not ready after {} attempts", cluster_id, attempts))]
    ElbNotReady { cluster_id: String, attempts: u32 },

    #[snafu(display("ELB '{}' has no healthy instances after {} attempts", name, attempts))]
    ElbNotHealthy { name: String, attempts: u32 },

    #[snafu(display("Unable to describe load balancer '{}': {}", name, source))]
    DescribeLoadBalancers {
        name: String,
        source: SdkError<DescribeLoadBalancersError>,
    },

    #[snafu(display("Unable to describe instance health of '{}': {}", name, source))]
    DescribeInstanceHealth {
        name: String,
        source: SdkError<DescribeInstanceHealthError>,
    },

    #[snafu(display("Unable to list hosted zones for '{}': {}", domain, source))]
    ListHostedZones {
        domain: String,
        source: SdkError<ListHostedZonesByNameError>,
    },

    #[snafu(display("Unable to change record '{}' in zone '{}': {}", record, zone_id, source))]
    ChangeRecordSets {
        record: String,
        zone_id: String,
        source: SdkError<ChangeResourceRecordSetsError>,
    },

    #[snafu(display("Environment variable '{}' is required for vault: {}", var, source))]
    VaultEnv {
        var: String,
        source: std::env::VarError,
    },

    #[snafu(display("Vault request to '{}' failed: {}", path, source))]
    VaultRequest {
        path: String,
        source: reqwest::Error,
    },

    #[snafu(display("Vault secret '{}' has no private key", path))]
    VaultMissingKey { path: String },

    #[snafu(display("Unable to serialize {} '{}': {}", what, name, source))]
    YamlSerialize {
        what: String,
        name: String,
        source: serde_yaml::Error,
    },

    #[snafu(display("Unable to write output: {}", source))]
    WriteOutput { source: std::io::Error },

    #[snafu(display("KubeadmControlPlane '{}' was created without a UID", name))]
    MissingUid { name: String },
}
