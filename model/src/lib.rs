/*!

This library provides the Kubernetes custom resource definitions that take part in a migration:
the legacy Giant Swarm `v1alpha2` objects that are read from the source cluster and the Cluster API
`v1alpha3` objects that are written to the target cluster.

None of these CRDs are owned by this project, so no schemas are generated for them.

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

pub mod capi;
pub mod constants;
pub mod giantswarm;

use k8s_openapi::api::core::v1::ObjectReference;

/// Create an `ObjectReference` that only carries the type and name of the referenced object, which
/// is what Cluster API expects for same-namespace references.
pub fn object_ref<S1, S2, S3>(api_version: S1, kind: S2, name: S3) -> ObjectReference
where
    S1: Into<String>,
    S2: Into<String>,
    S3: Into<String>,
{
    ObjectReference {
        api_version: Some(api_version.into()),
        kind: Some(kind.into()),
        name: Some(name.into()),
        ..Default::default()
    }
}
