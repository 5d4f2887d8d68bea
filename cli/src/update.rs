use crate::migration::Migration;
use anyhow::Result;
use clap::Parser;
use serde::Deserialize;
use serde_plain::derive_fromstr_from_deserialize;

/// Update migrated infrastructure.
#[derive(Debug, Parser)]
pub(crate) struct Update {
    /// What to update [dns]. `dns` waits for the new API load balancer to become healthy and
    /// points `api.<cluster domain>` at it.
    target: UpdateTarget,
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "lowercase")]
pub(crate) enum UpdateTarget {
    Dns,
}

derive_fromstr_from_deserialize!(UpdateTarget);

impl Update {
    pub(crate) async fn run(self, migration: Migration) -> Result<()> {
        match self.target {
            UpdateTarget::Dns => {
                let client = migration.target_client().await?;
                migration.update_dns(&client).await
            }
        }
    }
}
