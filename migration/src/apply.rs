use crate::error::{self, Result};
use crate::k8s;
use crate::transform::{fill_machine_status, CapiCrs};
use capi_migration_model::capi::Machine;
use kube::{Api, Client, ResourceExt};
use log::info;
use snafu::OptionExt;
use std::time::Duration;

const MACHINE_WAIT_ATTEMPTS: u32 = 10;
const MACHINE_WAIT_INTERVAL: Duration = Duration::from_secs(2);

/// Create the secrets, the cluster and its control plane. The legacy masters are registered as
/// running machines of the new control plane.
pub async fn create_control_plane_resources(client: &Client, crs: &CapiCrs) -> Result<()> {
    info!("Creating control plane resources of cluster '{}'", crs.cluster.name_any());
    if let Some(ca_secret) = &crs.ca_secret {
        k8s::create(client, ca_secret).await?;
    }
    k8s::create(client, &crs.custom_files_secret).await?;
    k8s::create(client, &crs.etcd_certs_secret).await?;
    k8s::create(client, &crs.cluster).await?;
    k8s::create(client, &crs.aws_cluster).await?;
    let control_plane = k8s::create(client, &crs.control_plane).await?;
    let control_plane_uid = control_plane.uid().context(error::MissingUidSnafu {
        name: control_plane.name_any(),
    })?;
    k8s::create(client, &crs.control_plane_machine_template).await?;

    for (i, old) in crs.old_control_plane_machines.iter().enumerate() {
        let mut machine = old.machine.clone();
        for owner in machine.metadata.owner_references.iter_mut().flatten() {
            owner.uid = control_plane_uid.clone();
        }
        k8s::create(client, &machine).await?;

        let api: Api<Machine> = Api::namespaced(
            client.clone(),
            &machine.namespace().unwrap_or_default(),
        );
        let mut machine = k8s::wait_for_object(
            &api,
            &machine.name_any(),
            MACHINE_WAIT_ATTEMPTS,
            MACHINE_WAIT_INTERVAL,
        )
        .await?;
        fill_machine_status(&mut machine, i + 1);
        if let Some(status) = &machine.status {
            k8s::patch_status(client, &machine, status).await?;
        }

        k8s::create(client, &old.aws_machine).await?;
        k8s::create(client, &old.kubeadm_config).await?;
    }
    info!("Control plane resources created");
    Ok(())
}

pub async fn create_node_pool_resources(client: &Client, crs: &CapiCrs) -> Result<()> {
    for node_pool in &crs.node_pools {
        k8s::create(client, &node_pool.aws_machine_pool).await?;
        k8s::create(client, &node_pool.kubeadm_config).await?;
        k8s::create(client, &node_pool.machine_pool).await?;
    }
    info!("Created {} node pools", crs.node_pools.len());
    Ok(())
}

pub async fn delete_node_pool_resources(client: &Client, crs: &CapiCrs) -> Result<()> {
    for node_pool in crs.node_pools.iter().rev() {
        k8s::delete(client, &node_pool.machine_pool).await?;
        k8s::delete(client, &node_pool.kubeadm_config).await?;
        k8s::delete(client, &node_pool.aws_machine_pool).await?;
    }
    info!("Deleted {} node pools", crs.node_pools.len());
    Ok(())
}

pub async fn delete_control_plane_resources(client: &Client, crs: &CapiCrs) -> Result<()> {
    info!("Deleting control plane resources of cluster '{}'", crs.cluster.name_any());
    for old in crs.old_control_plane_machines.iter().rev() {
        k8s::delete(client, &old.kubeadm_config).await?;
        k8s::delete(client, &old.aws_machine).await?;
        k8s::delete(client, &old.machine).await?;
    }
    k8s::delete(client, &crs.control_plane_machine_template).await?;
    k8s::delete(client, &crs.control_plane).await?;
    k8s::delete(client, &crs.aws_cluster).await?;
    k8s::delete(client, &crs.cluster).await?;
    k8s::delete(client, &crs.etcd_certs_secret).await?;
    k8s::delete(client, &crs.custom_files_secret).await?;
    if let Some(ca_secret) = &crs.ca_secret {
        k8s::delete(client, ca_secret).await?;
    }
    info!("Control plane resources deleted");
    Ok(())
}
