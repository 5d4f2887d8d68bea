/*!

This is the command line interface for migrating a Giant Swarm AWS cluster to Cluster API.

!*/

mod create;
mod delete;
mod migration;
mod print;
mod update;

use anyhow::Result;
use clap::Parser;
use env_logger::Builder;
use log::LevelFilter;
use std::path::PathBuf;

/// Migrate a Giant Swarm AWS tenant cluster to Cluster API v1alpha3.
#[derive(Debug, Parser)]
#[clap(author, version, about)]
struct Args {
    /// Set logging verbosity [trace|debug|info|warn|error]. If the environment variable `RUST_LOG`
    /// is present, it overrides the default logging behavior. See https://docs.rs/env_logger/latest
    #[clap(long = "log-level", default_value = "info")]
    log_level: LevelFilter,
    /// The ID of the cluster to migrate.
    #[clap(long = "cluster-id", forbid_empty_values = true)]
    cluster_id: String,
    /// The AWS region the cluster runs in.
    #[clap(long = "aws-region", default_value = "eu-west-1")]
    aws_region: String,
    /// The Kubernetes version of the new control plane and node pools.
    #[clap(long = "k8s-version", default_value = "v1.19.4")]
    k8s_version: String,
    /// The kube context in which the Cluster API objects are created or deleted.
    #[clap(long = "context", forbid_empty_values = true)]
    context: String,
    /// The kube context to read the legacy objects from. Defaults to the current context.
    #[clap(long = "source-context")]
    source_context: Option<String>,
    /// Path to the kubeconfig file. Also can be passed with the KUBECONFIG environment variable.
    #[clap(long = "kubeconfig")]
    kubeconfig: Option<PathBuf>,
    /// The EC2 key pair that is installed on the new machines.
    #[clap(long = "ssh-key-name")]
    ssh_key_name: Option<String>,
    /// Read the cluster CA key from vault (`VAULT_ADDR`, `VAULT_TOKEN`) and create the CA secret.
    #[clap(long = "vault-ca")]
    vault_ca: bool,
    #[clap(subcommand)]
    command: Command,
}

#[derive(Debug, Parser)]
enum Command {
    /// Print the Cluster API objects as YAML.
    Print(print::Print),
    /// Create Cluster API objects in the target cluster.
    Create(create::Create),
    /// Delete the Cluster API objects or the API DNS record.
    Delete(delete::Delete),
    /// Point the API DNS record at the new load balancer.
    Update(update::Update),
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    init_logger(args.log_level);
    if let Err(e) = run(args).await {
        eprintln!("{:?}", e);
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<()> {
    let migration = migration::Migration::load(&args).await?;
    match args.command {
        Command::Print(print) => print.run(migration),
        Command::Create(create) => create.run(migration).await,
        Command::Delete(delete) => delete.run(migration).await,
        Command::Update(update) => update.run(migration).await,
    }
}

/// Initialize the logger with the value passed by `--log-level` (or its default) when the
/// `RUST_LOG` environment variable is not present. If present, the `RUST_LOG` environment variable
/// overrides `--log-level`/`level`.
fn init_logger(level: LevelFilter) {
    match std::env::var(env_logger::DEFAULT_FILTER_ENV).ok() {
        Some(_) => {
            // RUST_LOG exists; env_logger will use it.
            Builder::from_default_env().init();
        }
        None => {
            // RUST_LOG does not exist; use `level` for this crate and the library, `error` otherwise.
            Builder::new()
                .filter_level(LevelFilter::Error)
                .filter(Some(env!("CARGO_CRATE_NAME")), level)
                .filter(Some("capi_migration"), level)
                .init();
        }
    }
}
