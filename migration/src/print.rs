use crate::error::{self, Result};
use crate::transform::CapiCrs;
use kube::{Resource, ResourceExt};
use serde::Serialize;
use snafu::ResultExt;
use std::io::{ErrorKind, Write};

/// Render every object in `crs` as one multi-document YAML stream, in the order they would be
/// created.
pub fn render_crs(crs: &CapiCrs) -> Result<String> {
    let mut out = String::new();
    if let Some(ca_secret) = &crs.ca_secret {
        push(&mut out, ca_secret)?;
    }
    push(&mut out, &crs.custom_files_secret)?;
    push(&mut out, &crs.etcd_certs_secret)?;
    push(&mut out, &crs.cluster)?;
    push(&mut out, &crs.aws_cluster)?;
    push(&mut out, &crs.control_plane)?;
    push(&mut out, &crs.control_plane_machine_template)?;
    for old in &crs.old_control_plane_machines {
        push(&mut out, &old.machine)?;
        push(&mut out, &old.aws_machine)?;
        push(&mut out, &old.kubeadm_config)?;
    }
    for node_pool in &crs.node_pools {
        push(&mut out, &node_pool.aws_machine_pool)?;
        push(&mut out, &node_pool.kubeadm_config)?;
        push(&mut out, &node_pool.machine_pool)?;
    }
    Ok(out)
}

/// Write the rendered objects to stdout.
pub fn print_crs(crs: &CapiCrs) -> Result<()> {
    let rendered = render_crs(crs)?;
    write_output(&mut std::io::stdout().lock(), &rendered)
}

/// Write `rendered` to `out`. A reader that went away, e.g. `head`, is not an error.
fn write_output<W: Write>(out: &mut W, rendered: &str) -> Result<()> {
    match out.write_all(rendered.as_bytes()).and_then(|_| out.flush()) {
        Err(e) if e.kind() == ErrorKind::BrokenPipe => Ok(()),
        result => result.context(error::WriteOutputSnafu),
    }
}

fn push<K>(out: &mut String, obj: &K) -> Result<()>
where
    K: Resource<DynamicType = ()> + Serialize,
{
    let yaml = serde_yaml::to_string(obj).context(error::YamlSerializeSnafu {
        what: K::kind(&()).to_string(),
        name: obj.name_any(),
    })?;
    if !yaml.starts_with("---") {
        out.push_str("---\n");
    }
    out.push_str(&yaml);
    if !yaml.ends_with('\n') {
        out.push('\n');
    }
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::transform::test_fixtures::{facts, gs_crs, options};
    use crate::transform::transform_gs_to_capi_crs;

    fn documents(rendered: &str) -> Vec<serde_yaml::Value> {
        rendered
            .split("---\n")
            .filter(|doc| !doc.trim().is_empty())
            .map(|doc| serde_yaml::from_str(doc).unwrap())
            .collect()
    }

    #[test]
    fn renders_every_object_in_order() {
        let crs = transform_gs_to_capi_crs(&gs_crs(), &facts(), &options()).unwrap();
        let rendered = render_crs(&crs).unwrap();
        let kinds: Vec<String> = documents(&rendered)
            .iter()
            .map(|doc| doc["kind"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(
            kinds,
            vec![
                "Secret",
                "Secret",
                "Cluster",
                "AWSCluster",
                "KubeadmControlPlane",
                "AWSMachineTemplate",
                "Machine",
                "AWSMachine",
                "KubeadmConfig",
                "Machine",
                "AWSMachine",
                "KubeadmConfig",
                "Machine",
                "AWSMachine",
                "KubeadmConfig",
                "AWSMachinePool",
                "KubeadmConfig",
                "MachinePool",
            ]
        );
    }

    struct FailingWriter(ErrorKind);

    impl Write for FailingWriter {
        fn write(&mut self, _: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::new(self.0, "write failed"))
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn write_errors_surface() {
        let err = write_output(&mut FailingWriter(ErrorKind::Other), "---\n").unwrap_err();
        assert!(matches!(err, crate::Error::WriteOutput { .. }));
        assert!(write_output(&mut FailingWriter(ErrorKind::BrokenPipe), "---\n").is_ok());

        let mut out = Vec::new();
        write_output(&mut out, "---\nkind: Cluster\n").unwrap();
        assert_eq!(out, b"---\nkind: Cluster\n");
    }

    #[test]
    fn ca_secret_comes_first() {
        let mut options = options();
        options.ca_private_key = Some("key".to_string());
        let crs = transform_gs_to_capi_crs(&gs_crs(), &facts(), &options).unwrap();
        let docs = documents(&render_crs(&crs).unwrap());
        assert_eq!(docs.len(), 19);
        assert_eq!(
            docs[0]["metadata"]["name"],
            serde_yaml::Value::from("a1b2c-ca")
        );
    }
}
