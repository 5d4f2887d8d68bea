/*!

Moves a Giant Swarm AWS tenant cluster onto Cluster API. The legacy custom resources and secrets are
read from the management cluster, the network facts the CAPI objects need are looked up in EC2, and
the resulting `v1alpha3` objects are printed or applied to a target cluster. The API DNS record can
then be pointed at the load balancer that the AWS provider creates.

!*/

#![deny(
    clippy::expect_used,
    clippy::get_unwrap,
    clippy::panic,
    clippy::panic_in_result_fn,
    clippy::panicking_unwrap,
    clippy::unwrap_in_result,
    clippy::unwrap_used
)]

pub mod apply;
pub mod aws;
pub mod dns;
mod error;
pub mod giantswarm;
pub mod k8s;
pub mod print;
pub mod transform;
pub mod vault;

pub use error::{Error, Result};
