use super::control_plane::control_plane_machine_spec;
use super::{Names, OldControlPlaneMachine, TransformOptions};
use crate::aws::NetworkFacts;
use crate::giantswarm::GsClusterCrs;
use capi_migration_model::capi::{
    AwsMachine, Bootstrap, KubeadmConfig, KubeadmConfigSpec, Machine, MachineSpec, MachineStatus,
};
use capi_migration_model::constants::{
    CAPI_BOOTSTRAP_API_VERSION, CAPI_CONTROL_PLANE_API_VERSION, CAPI_INFRASTRUCTURE_API_VERSION,
    KIND_AWS_MACHINE, KIND_KUBEADM_CONFIG, KIND_KUBEADM_CONTROL_PLANE, LABEL_CLUSTER_NAME,
    LABEL_CONTROL_PLANE,
};
use capi_migration_model::object_ref;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::OwnerReference;
use maplit::btreemap;

/// One `Machine` per legacy master, so that the new control plane counts the legacy masters as its
/// own and replaces them one by one. Each comes with the `AWSMachine` and `KubeadmConfig` it
/// references.
pub(crate) fn old_control_plane_machines(
    names: &Names,
    gs: &GsClusterCrs,
    facts: &NetworkFacts,
    options: &TransformOptions,
) -> Vec<OldControlPlaneMachine> {
    let replicas = usize::try_from(gs.g8s_control_plane.spec.replicas).unwrap_or_default();
    (1..=replicas)
        .map(|n| {
            let name = names.old_control_plane_machine(n);
            OldControlPlaneMachine {
                machine: machine(names, &name, options),
                aws_machine: AwsMachine {
                    metadata: names.meta(&name),
                    ..AwsMachine::new(&name, control_plane_machine_spec(gs, facts, options))
                },
                kubeadm_config: KubeadmConfig {
                    metadata: names.meta(&name),
                    ..KubeadmConfig::new(&name, KubeadmConfigSpec::default())
                },
            }
        })
        .collect()
}

fn machine(names: &Names, name: &str, options: &TransformOptions) -> Machine {
    let mut metadata = names.meta(name);
    metadata.labels = Some(btreemap! {
        LABEL_CLUSTER_NAME.to_string() => names.cluster(),
        LABEL_CONTROL_PLANE.to_string() => String::new(),
    });
    // The UID is only known once the control plane exists.
    metadata.owner_references = Some(vec![OwnerReference {
        api_version: CAPI_CONTROL_PLANE_API_VERSION.to_string(),
        kind: KIND_KUBEADM_CONTROL_PLANE.to_string(),
        name: names.control_plane(),
        uid: String::new(),
        controller: Some(true),
        block_owner_deletion: Some(true),
    }]);

    Machine {
        metadata,
        ..Machine::new(
            name,
            MachineSpec {
                cluster_name: names.cluster(),
                bootstrap: Bootstrap {
                    config_ref: Some(object_ref(
                        CAPI_BOOTSTRAP_API_VERSION,
                        KIND_KUBEADM_CONFIG,
                        name,
                    )),
                    data_secret_name: Some(name.to_string()),
                },
                infrastructure_ref: object_ref(
                    CAPI_INFRASTRUCTURE_API_VERSION,
                    KIND_AWS_MACHINE,
                    name,
                ),
                version: Some(options.k8s_version.clone()),
                ..Default::default()
            },
        )
    }
}

/// Mark the `n`th legacy master as a running, ready machine backed by the node `etcd<n>`.
pub fn fill_machine_status(machine: &mut Machine, n: usize) {
    machine.status = Some(MachineStatus {
        node_ref: Some(object_ref("v1", "Node", format!("etcd{}", n))),
        phase: Some("Running".to_string()),
        bootstrap_ready: true,
        infrastructure_ready: true,
    });
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::transform::test_fixtures::{facts, gs_crs, options};

    fn old_machines() -> Vec<OldControlPlaneMachine> {
        old_control_plane_machines(
            &Names::new("a1b2c", "default", "example.com"),
            &gs_crs(),
            &facts(),
            &options(),
        )
    }

    #[test]
    fn one_machine_per_master() {
        let machines = old_machines();
        let names: Vec<_> = machines
            .iter()
            .map(|old| old.machine.metadata.name.clone().unwrap())
            .collect();
        assert_eq!(
            names,
            vec![
                "a1b2c-control-plane-old-1",
                "a1b2c-control-plane-old-2",
                "a1b2c-control-plane-old-3"
            ]
        );
        for old in &machines {
            assert_eq!(old.aws_machine.metadata.name, old.machine.metadata.name);
            assert_eq!(old.kubeadm_config.metadata.name, old.machine.metadata.name);
            assert_eq!(old.aws_machine.spec.instance_type, "m5.xlarge");
        }
    }

    #[test]
    fn machine_references() {
        let machine = old_machines().remove(0).machine;
        let labels = machine.metadata.labels.as_ref().unwrap();
        assert_eq!(labels["cluster.x-k8s.io/cluster-name"], "a1b2c");
        assert_eq!(labels["cluster.x-k8s.io/control-plane"], "");

        let owner = &machine.metadata.owner_references.as_ref().unwrap()[0];
        assert_eq!(owner.kind, "KubeadmControlPlane");
        assert_eq!(owner.name, "a1b2c-control-plane");
        assert_eq!(owner.controller, Some(true));

        assert_eq!(machine.spec.cluster_name, "a1b2c");
        assert_eq!(machine.spec.version.as_deref(), Some("v1.19.4"));
        assert_eq!(machine.spec.infrastructure_ref.kind.as_deref(), Some("AWSMachine"));
        let config_ref = machine.spec.bootstrap.config_ref.as_ref().unwrap();
        assert_eq!(config_ref.kind.as_deref(), Some("KubeadmConfig"));
        assert_eq!(config_ref.name.as_deref(), Some("a1b2c-control-plane-old-1"));
        assert!(machine.status.is_none());
    }

    #[test]
    fn machine_status() {
        let mut machine = old_machines().remove(1).machine;
        fill_machine_status(&mut machine, 2);
        let status = machine.status.unwrap();
        assert_eq!(status.phase.as_deref(), Some("Running"));
        assert!(status.bootstrap_ready);
        assert!(status.infrastructure_ready);
        let node_ref = status.node_ref.unwrap();
        assert_eq!(node_ref.kind.as_deref(), Some("Node"));
        assert_eq!(node_ref.name.as_deref(), Some("etcd2"));
    }

    #[test]
    fn legacy_masters_are_not_adopted() {
        for old in old_machines() {
            let name = old.machine.metadata.name.clone();
            assert!(old.aws_machine.spec.provider_id.is_none());
            assert!(old.aws_machine.spec.instance_id.is_none());
            assert!(old.machine.spec.provider_id.is_none());
            assert_eq!(old.machine.spec.bootstrap.data_secret_name, name);
        }
    }
}
