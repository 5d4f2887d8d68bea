use crate::migration::Migration;
use anyhow::{Context, Result};
use capi_migration::apply;
use clap::Parser;
use serde::Deserialize;
use serde_plain::derive_fromstr_from_deserialize;

/// Delete what an earlier `create` made.
#[derive(Debug, Parser)]
pub(crate) struct Delete {
    /// What to delete [all|cp|np|dns]. `all` deletes the node pools, the API DNS record, then the
    /// control plane.
    target: DeleteTarget,
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "lowercase")]
pub(crate) enum DeleteTarget {
    All,
    Cp,
    Np,
    Dns,
}

derive_fromstr_from_deserialize!(DeleteTarget);

impl Delete {
    pub(crate) async fn run(self, migration: Migration) -> Result<()> {
        let client = migration.target_client().await?;
        if matches!(self.target, DeleteTarget::All | DeleteTarget::Np) {
            apply::delete_node_pool_resources(&client, &migration.crs)
                .await
                .context("Unable to delete the node pool resources")?;
        }
        // The record is found through the load balancer in the AWSCluster status, so it goes
        // before the control plane.
        if matches!(self.target, DeleteTarget::All | DeleteTarget::Dns) {
            migration.delete_dns(&client).await?;
        }
        if matches!(self.target, DeleteTarget::All | DeleteTarget::Cp) {
            apply::delete_control_plane_resources(&client, &migration.crs)
                .await
                .context("Unable to delete the control plane resources")?;
        }
        Ok(())
    }
}
