use crate::migration::Migration;
use anyhow::{Context, Result};
use capi_migration::apply;
use clap::Parser;
use serde::Deserialize;
use serde_plain::derive_fromstr_from_deserialize;

/// Create Cluster API objects in the target cluster.
#[derive(Debug, Parser)]
pub(crate) struct Create {
    /// What to create [all|cp|np]. `all` creates the control plane, points the API DNS record at
    /// the new load balancer, then creates the node pools.
    target: CreateTarget,
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "lowercase")]
pub(crate) enum CreateTarget {
    All,
    Cp,
    Np,
}

derive_fromstr_from_deserialize!(CreateTarget);

impl Create {
    pub(crate) async fn run(self, migration: Migration) -> Result<()> {
        let client = migration.target_client().await?;
        if matches!(self.target, CreateTarget::All | CreateTarget::Cp) {
            apply::create_control_plane_resources(&client, &migration.crs)
                .await
                .context("Unable to create the control plane resources")?;
        }
        if self.target == CreateTarget::All {
            migration.update_dns(&client).await?;
        }
        if matches!(self.target, CreateTarget::All | CreateTarget::Np) {
            apply::create_node_pool_resources(&client, &migration.crs)
                .await
                .context("Unable to create the node pool resources")?;
        }
        Ok(())
    }
}
