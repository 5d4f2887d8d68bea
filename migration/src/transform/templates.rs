//! Files that are placed on the new machines.

/// Where the kube-proxy kubeconfig is written on workers, and where the kube-proxy configuration
/// expects it.
pub(crate) const KUBE_PROXY_KUBECONFIG_PATH: &str = "/etc/kubernetes/kubeconfig/kube-proxy.yaml";

/// The etcd release that joins the legacy etcd cluster.
pub(crate) const ETCD_VERSION: &str = "v3.4.13";

/// Joins the new master to the legacy etcd cluster and renders the resulting initial cluster into
/// the kubeadm configuration.
pub(crate) fn join_existing_cluster_script(etcd_endpoint: &str) -> String {
    format!(
        r#"#!/bin/sh
# set proper hostname
hostnamectl set-hostname $(curl http://169.254.169.254/latest/meta-data/local-hostname)

# create etcd ca bundle
cat /etc/kubernetes/pki/etcd/ca.crt /etc/kubernetes/pki/etcd/old-etcd-ca.pem > /etc/kubernetes/pki/etcd/ca-bundle.pem

# get etcdctl
DOWNLOAD_URL=https://github.com/etcd-io/etcd/releases/download
ETCD_VER={etcd_version}
rm -f /tmp/etcd-${{ETCD_VER}}-linux-amd64.tar.gz
rm -rf /tmp/etcd && mkdir -p /tmp/etcd
curl -L ${{DOWNLOAD_URL}}/${{ETCD_VER}}/etcd-${{ETCD_VER}}-linux-amd64.tar.gz -o /tmp/etcd-${{ETCD_VER}}-linux-amd64.tar.gz
tar xzvf /tmp/etcd-${{ETCD_VER}}-linux-amd64.tar.gz -C /tmp/etcd --strip-components=1
rm -f /tmp/etcd-${{ETCD_VER}}-linux-amd64.tar.gz
/tmp/etcd/etcdctl version

# get machine IP
IP=$(ip route | grep default | awk '{{print $9}}')

# add this machine as a new member of the old etcd cluster
while ! new_cluster=$(/tmp/etcd/etcdctl \
	--cacert=/etc/kubernetes/pki/etcd/old-etcd-ca.pem \
	--key=/etc/kubernetes/pki/etcd/old-etcd-key.pem \
	--cert=/etc/kubernetes/pki/etcd/old-etcd-cert.pem \
	--endpoints=https://{etcd_endpoint}:2379 \
	--peer-urls="https://${{IP}}:2380" \
	member \
	add \
	$(hostname -A) | grep 'ETCD_INITIAL_CLUSTER=')
do
	echo "retrying in 2s"
	sleep 2s
done

echo "successfully added a new member to the old etcd cluster"

# export ETCD_INITIAL_CLUSTER for envsubst
export ${{new_cluster}}

cp /tmp/kubeadm.yaml /tmp/kubeadm.yaml.tmpl

sed -e '/external/,+4d' /tmp/kubeadm.yaml.tmpl

# fill the initial cluster into the kubeadm config
envsubst < /tmp/kubeadm.yaml.tmpl > /tmp/kubeadm.yaml
"#,
        etcd_version = ETCD_VERSION,
        etcd_endpoint = etcd_endpoint,
    )
}

/// The API server encryption configuration that keeps using the legacy key, so that existing
/// secrets stay readable.
pub(crate) fn encryption_config(encryption_key: &str) -> String {
    format!(
        r#"kind: EncryptionConfig
apiVersion: v1
resources:
  - resources:
    - secrets
    providers:
    - aescbc:
        keys:
        - name: key1
          secret: {}
    - identity: {{}}"#,
        encryption_key
    )
}

/// A kubeconfig for kube-proxy. The certificate arguments are already base64 encoded.
pub(crate) fn kube_proxy_kubeconfig(api_endpoint: &str, ca: &str, crt: &str, key: &str) -> String {
    format!(
        r#"apiVersion: v1
kind: Config
users:
- name: proxy
  user:
    client-certificate-data: {crt}
    client-key-data: {key}
clusters:
- name: local
  cluster:
    certificate-authority-data: {ca}
    server: https://{api_endpoint}
contexts:
- context:
    cluster: local
    user: proxy
  name: service-account-context
current-context: service-account-context"#,
        crt = crt,
        key = key,
        ca = ca,
        api_endpoint = api_endpoint,
    )
}

pub(crate) fn kube_proxy_config() -> String {
    format!(
        r#"apiVersion: kubeproxy.config.k8s.io/v1alpha1
clientConnection:
  kubeconfig: {}
kind: KubeProxyConfiguration
mode: iptables
metricsBindAddress: 0.0.0.0:10249"#,
        KUBE_PROXY_KUBECONFIG_PATH
    )
}
