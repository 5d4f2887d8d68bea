/*!

Points the API record of a cluster at the load balancer that Cluster API creates for the new
control plane, and removes that record again.

!*/

use crate::error::{self, Result};
use crate::k8s::HttpStatusCode;
use aws_sdk_route53::model::{
    AliasTarget, Change, ChangeAction, ChangeBatch, HostedZone, ResourceRecordSet, RrType,
};
use aws_types::SdkConfig;
use capi_migration_model::capi::AwsCluster;
use http::StatusCode;
use kube::{Api, Client};
use log::{debug, info, warn};
use snafu::{OptionExt, ResultExt};
use std::time::Duration;

/// How often the `AWSCluster` status is checked for the API load balancer during an update.
pub const API_ELB_ATTEMPTS: u32 = 60;
const API_ELB_INTERVAL: Duration = Duration::from_secs(10);
const ELB_HEALTH_ATTEMPTS: u32 = 60;
const ELB_HEALTH_INTERVAL: Duration = Duration::from_secs(10);
const IN_SERVICE: &str = "InService";

/// The classic load balancer in front of the new API servers.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ApiElb {
    pub dns_name: String,
    pub name: String,
}

/// Poll the `AWSCluster` named `cluster_name` until its status reports the API load balancer.
pub async fn wait_for_api_elb(
    client: &Client,
    cluster_name: &str,
    namespace: &str,
    attempts: u32,
) -> Result<ApiElb> {
    let api: Api<AwsCluster> = Api::namespaced(client.clone(), namespace);
    for attempt in 1..=attempts {
        let aws_cluster = api.get(cluster_name).await.context(error::KubeApiCallSnafu {
            method: "get",
            what: "AWSCluster",
            name: cluster_name,
        })?;
        if let Some((dns_name, name)) = aws_cluster.api_server_elb() {
            info!("Fetched new API ELB DNS name '{}'", dns_name);
            return Ok(ApiElb {
                dns_name: dns_name.to_string(),
                name: name.to_string(),
            });
        }
        info!(
            "API ELB DNS name is not ready yet ({}/{}), sleeping for {}s",
            attempt,
            attempts,
            API_ELB_INTERVAL.as_secs()
        );
        if attempt < attempts {
            tokio::time::sleep(API_ELB_INTERVAL).await;
        }
    }
    error::ElbNotReadySnafu {
        cluster_id: cluster_name,
        attempts,
    }
    .fail()
}

/// Wait for the new API load balancer to serve traffic, then alias `api.<dns_domain>` to it.
pub async fn update_api_dns_to_new_elb(
    client: &Client,
    config: &SdkConfig,
    cluster_name: &str,
    namespace: &str,
    dns_domain: &str,
) -> Result<()> {
    let elb = wait_for_api_elb(client, cluster_name, namespace, API_ELB_ATTEMPTS).await?;
    let elb_client = aws_sdk_elasticloadbalancing::Client::new(config);
    wait_for_healthy_instance(&elb_client, &elb.name).await?;
    let elb_zone_id = canonical_hosted_zone_id(&elb_client, &elb.name).await?;
    change_api_record(
        config,
        ChangeAction::Upsert,
        dns_domain,
        &elb.dns_name,
        &elb_zone_id,
    )
    .await
}

/// Remove the `api.<dns_domain>` alias that points at the new API load balancer. Without an
/// `AWSCluster` or a load balancer in its status there is no record to remove.
pub async fn delete_dns_records(
    client: &Client,
    config: &SdkConfig,
    cluster_name: &str,
    namespace: &str,
    dns_domain: &str,
) -> Result<()> {
    let api: Api<AwsCluster> = Api::namespaced(client.clone(), namespace);
    let aws_cluster = match api.get(cluster_name).await {
        Ok(aws_cluster) => aws_cluster,
        Err(e) if e.is_status_code(StatusCode::NOT_FOUND) => {
            warn!(
                "AWSCluster '{}' does not exist, no API record to delete",
                cluster_name
            );
            return Ok(());
        }
        Err(e) => {
            return Err(e).context(error::KubeApiCallSnafu {
                method: "get",
                what: "AWSCluster",
                name: cluster_name,
            })
        }
    };
    let (elb_dns_name, elb_name) = match aws_cluster.api_server_elb() {
        Some(elb) => elb,
        None => {
            warn!(
                "AWSCluster '{}' has no API ELB, no API record to delete",
                cluster_name
            );
            return Ok(());
        }
    };

    let elb_client = aws_sdk_elasticloadbalancing::Client::new(config);
    let elb_zone_id = canonical_hosted_zone_id(&elb_client, elb_name).await?;
    change_api_record(
        config,
        ChangeAction::Delete,
        dns_domain,
        elb_dns_name,
        &elb_zone_id,
    )
    .await
}

async fn wait_for_healthy_instance(
    elb_client: &aws_sdk_elasticloadbalancing::Client,
    name: &str,
) -> Result<()> {
    for attempt in 1..=ELB_HEALTH_ATTEMPTS {
        let output = elb_client
            .describe_instance_health()
            .load_balancer_name(name)
            .send()
            .await
            .context(error::DescribeInstanceHealthSnafu { name })?;
        let state = output
            .instance_states()
            .unwrap_or_default()
            .first()
            .and_then(|instance| instance.state());
        if state == Some(IN_SERVICE) {
            info!("ELB '{}' has healthy instances", name);
            return Ok(());
        }
        info!(
            "Waiting for healthy instances behind ELB '{}' ({}/{})",
            name, attempt, ELB_HEALTH_ATTEMPTS
        );
        if attempt < ELB_HEALTH_ATTEMPTS {
            tokio::time::sleep(ELB_HEALTH_INTERVAL).await;
        }
    }
    error::ElbNotHealthySnafu {
        name,
        attempts: ELB_HEALTH_ATTEMPTS,
    }
    .fail()
}

async fn canonical_hosted_zone_id(
    elb_client: &aws_sdk_elasticloadbalancing::Client,
    name: &str,
) -> Result<String> {
    let output = elb_client
        .describe_load_balancers()
        .load_balancer_names(name)
        .send()
        .await
        .context(error::DescribeLoadBalancersSnafu { name })?;
    output
        .load_balancer_descriptions()
        .unwrap_or_default()
        .first()
        .and_then(|description| description.canonical_hosted_zone_name_id())
        .map(str::to_string)
        .context(error::MissingAwsFieldSnafu {
            what: format!("load balancer '{}'", name),
            field: "CanonicalHostedZoneNameID",
        })
}

async fn change_api_record(
    config: &SdkConfig,
    action: ChangeAction,
    dns_domain: &str,
    elb_dns_name: &str,
    elb_zone_id: &str,
) -> Result<()> {
    let route53 = aws_sdk_route53::Client::new(config);
    let zone_name = format!("{}.", dns_domain);
    let output = route53
        .list_hosted_zones_by_name()
        .dns_name(&zone_name)
        .send()
        .await
        .context(error::ListHostedZonesSnafu { domain: &zone_name })?;

    let record = format!("api.{}", dns_domain);
    let zone_ids = matching_zone_ids(output.hosted_zones().unwrap_or_default(), &zone_name);
    if zone_ids.is_empty() {
        info!("No hosted zone named '{}', nothing to change", zone_name);
    }
    for zone_id in zone_ids {
        info!(
            "{} record '{}' -> '{}' in zone '{}'",
            action.as_str(),
            record,
            elb_dns_name,
            zone_id
        );
        let change = Change::builder()
            .action(action.clone())
            .resource_record_set(
                ResourceRecordSet::builder()
                    .name(&record)
                    .r#type(RrType::A)
                    .alias_target(
                        AliasTarget::builder()
                            .dns_name(elb_dns_name)
                            .hosted_zone_id(elb_zone_id)
                            .evaluate_target_health(true)
                            .build(),
                    )
                    .build(),
            )
            .build();
        let output = route53
            .change_resource_record_sets()
            .hosted_zone_id(zone_id)
            .change_batch(ChangeBatch::builder().changes(change).build())
            .send()
            .await
            .context(error::ChangeRecordSetsSnafu {
                record: &record,
                zone_id,
            })?;
        debug!("{:?}", output.change_info());
    }
    Ok(())
}

/// IDs of the zones named exactly `zone_name`. Listing by name also returns the zones that sort
/// after it.
pub(crate) fn matching_zone_ids<'a>(zones: &'a [HostedZone], zone_name: &str) -> Vec<&'a str> {
    zones
        .iter()
        .filter(|zone| zone.name() == Some(zone_name))
        .filter_map(|zone| zone.id())
        .collect()
}
