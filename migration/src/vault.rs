use crate::error::{self, Result};
use log::info;
use serde::Deserialize;
use snafu::{OptionExt, ResultExt};

const VAULT_ADDR: &str = "VAULT_ADDR";
const VAULT_TOKEN: &str = "VAULT_TOKEN";

#[derive(Debug, Deserialize)]
struct SecretResponse {
    #[serde(default)]
    data: SecretData,
}

#[derive(Debug, Default, Deserialize)]
struct SecretData {
    private_key: Option<String>,
}

/// The logical path of the cluster PKI backend that hands out the CA.
pub(crate) fn ca_path(cluster_id: &str) -> String {
    format!("pki-{}/gimmeallyourlovin", cluster_id)
}

/// Read the private key of the cluster CA from the Vault at `VAULT_ADDR`, authenticating with
/// `VAULT_TOKEN`.
pub async fn ca_private_key(cluster_id: &str) -> Result<String> {
    let addr = std::env::var(VAULT_ADDR).context(error::VaultEnvSnafu { var: VAULT_ADDR })?;
    let token = std::env::var(VAULT_TOKEN).context(error::VaultEnvSnafu { var: VAULT_TOKEN })?;
    let path = ca_path(cluster_id);
    let url = format!("{}/v1/{}", addr.trim_end_matches('/'), path);
    info!("Reading CA private key of cluster '{}' from vault", cluster_id);

    let response: SecretResponse = reqwest::Client::new()
        .get(&url)
        .header("X-Vault-Token", token)
        .send()
        .await
        .and_then(|response| response.error_for_status())
        .context(error::VaultRequestSnafu { path: &path })?
        .json()
        .await
        .context(error::VaultRequestSnafu { path: &path })?;

    response
        .data
        .private_key
        .context(error::VaultMissingKeySnafu { path })
}
