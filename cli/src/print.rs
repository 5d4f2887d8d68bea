use crate::migration::Migration;
use anyhow::{Context, Result};
use clap::Parser;

/// Print every Cluster API object of the cluster as a multi-document YAML stream.
#[derive(Debug, Parser)]
pub(crate) struct Print {}

impl Print {
    pub(crate) fn run(self, migration: Migration) -> Result<()> {
        capi_migration::print::print_crs(&migration.crs).context("Unable to print the objects")
    }
}
