use crate::Args;
use anyhow::{Context, Result};
use aws_types::SdkConfig;
use capi_migration::giantswarm::{fetch_crs, GsClusterCrs};
use capi_migration::transform::{cluster_dns_domain, transform_gs_to_capi_crs, CapiCrs};
use capi_migration::transform::TransformOptions;
use capi_migration::{aws, k8s, vault};
use kube::Client;
use log::info;
use std::path::PathBuf;

/// The legacy cluster, its Cluster API counterpart and what is needed to reach the target cluster.
pub(crate) struct Migration {
    pub(crate) gs: GsClusterCrs,
    pub(crate) crs: CapiCrs,
    pub(crate) aws_config: SdkConfig,
    kubeconfig: Option<PathBuf>,
    context: String,
}

impl Migration {
    /// Fetch the legacy objects and AWS network facts of the cluster and transform them.
    pub(crate) async fn load(args: &Args) -> Result<Self> {
        let source = k8s::client_for_context(
            args.kubeconfig.as_deref(),
            args.source_context.as_deref(),
        )
        .await
        .context("Unable to create a client for the source cluster")?;
        let gs = fetch_crs(&source, &args.cluster_id)
            .await
            .context(format!(
                "Unable to fetch the legacy objects of cluster '{}'",
                args.cluster_id
            ))?;

        let aws_config = aws::sdk_config(&args.aws_region).await;
        let facts = aws::fetch_network_facts(&aws_sdk_ec2::Client::new(&aws_config), &gs)
            .await
            .context("Unable to look up the cluster network in EC2")?;

        let ca_private_key = if args.vault_ca {
            Some(
                vault::ca_private_key(&args.cluster_id)
                    .await
                    .context("Unable to read the CA private key from vault")?,
            )
        } else {
            None
        };

        let crs = transform_gs_to_capi_crs(
            &gs,
            &facts,
            &TransformOptions {
                k8s_version: args.k8s_version.clone(),
                ssh_key_name: args.ssh_key_name.clone(),
                ca_private_key,
            },
        )
        .context("Unable to transform the legacy objects")?;
        info!("Prepared Cluster API objects for cluster '{}'", args.cluster_id);

        Ok(Self {
            gs,
            crs,
            aws_config,
            kubeconfig: args.kubeconfig.clone(),
            context: args.context.clone(),
        })
    }

    /// A client for the cluster that receives the Cluster API objects.
    pub(crate) async fn target_client(&self) -> Result<Client> {
        k8s::client_for_context(self.kubeconfig.as_deref(), Some(&self.context))
            .await
            .context(format!(
                "Unable to create a client for target context '{}'",
                self.context
            ))
    }

    pub(crate) fn dns_domain(&self) -> String {
        cluster_dns_domain(&self.gs.cluster_id(), self.gs.base_domain())
    }

    pub(crate) async fn update_dns(&self, client: &Client) -> Result<()> {
        capi_migration::dns::update_api_dns_to_new_elb(
            client,
            &self.aws_config,
            &self.gs.cluster_id(),
            &self.gs.namespace(),
            &self.dns_domain(),
        )
        .await
        .context("Unable to point the API DNS record at the new load balancer")
    }

    pub(crate) async fn delete_dns(&self, client: &Client) -> Result<()> {
        capi_migration::dns::delete_dns_records(
            client,
            &self.aws_config,
            &self.gs.cluster_id(),
            &self.gs.namespace(),
            &self.dns_domain(),
        )
        .await
        .context("Unable to delete the API DNS record")
    }
}
