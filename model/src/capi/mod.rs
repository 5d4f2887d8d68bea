//! Cluster API `v1alpha3` objects, including the AWS provider (CAPA) and the kubeadm bootstrap and
//! control plane providers.

mod aws;
mod cluster;
mod kubeadm;

pub use aws::*;
pub use cluster::*;
pub use kubeadm::*;
