// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Custom Resource Definition for AWS cluster infrastructure.
//!
//! This module defines the `AWSCluster` resource whose create and update requests are
//! defaulted and validated by the [`webhook`](crate::webhook) module.
//!
//! # Resource Types
//!
//! - [`AWSCluster`] - Cluster-wide AWS infrastructure (region, control plane endpoint,
//!   load balancer, network and bastion settings)
//!
//! # Example: Creating a cluster spec
//!
//! ```rust,no_run
//! use capa_admission::crd::{AWSClusterSpec, Bastion};
//!
//! let spec = AWSClusterSpec {
//!     region: "us-east-1".to_string(),
//!     bastion: Bastion {
//!         enabled: true,
//!         allowed_cidr_blocks: vec!["10.0.0.0/8".to_string()],
//!         ..Default::default()
//!     },
//!     ..Default::default()
//! };
//! ```

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// `AWSCluster` describes the AWS infrastructure backing a workload cluster.
///
/// Fields split into three groups with respect to admission:
///
/// - **Immutable**: `region` and `controlPlaneLoadBalancer` can never change after creation.
/// - **Write-once**: `controlPlaneEndpoint` may be assigned once while empty, then freezes.
/// - **Defaulted**: `networkSpec.cni.cniIngressRules` and `bastion.allowedCIDRBlocks` are
///   filled in when omitted.
///
/// # Example
///
/// ```yaml
/// apiVersion: infrastructure.cluster.x-k8s.io/v1alpha3
/// kind: AWSCluster
/// metadata:
///   name: workload
///   namespace: default
/// spec:
///   region: us-east-1
///   sshKeyName: default
///   networkSpec:
///     cni: {}
///   bastion:
///     enabled: true
/// ```
#[derive(CustomResource, Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[kube(
    group = "infrastructure.cluster.x-k8s.io",
    version = "v1alpha3",
    kind = "AWSCluster",
    plural = "awsclusters",
    namespaced,
    derive = "PartialEq",
    derive = "Default",
    doc = "AWSCluster is the infrastructure resource for clusters running on AWS. It carries the region, control plane endpoint and load balancer, network settings and bastion host configuration."
)]
#[kube(status = "AWSClusterStatus")]
#[serde(rename_all = "camelCase")]
pub struct AWSClusterSpec {
    /// Network configuration for the cluster.
    #[serde(default)]
    pub network_spec: NetworkSpec,

    /// AWS region the cluster lives in. Immutable once set.
    ///
    /// Example: `us-east-1`
    #[serde(default)]
    pub region: String,

    /// Name of the SSH key pair installed on instances.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ssh_key_name: Option<String>,

    /// Endpoint used to reach the control plane.
    ///
    /// Write-once: empty until the control plane load balancer exists, then frozen.
    #[serde(default)]
    pub control_plane_endpoint: APIEndpoint,

    /// Tags applied to every AWS resource created for the cluster, in addition to the
    /// ones the provider adds itself.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub additional_tags: BTreeMap<String, String>,

    /// Control plane load balancer settings. Immutable once created.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub control_plane_load_balancer: Option<AWSLoadBalancerSpec>,

    /// Go template used to build the AMI lookup name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_lookup_format: Option<String>,

    /// AWS organization ID searched when looking up machine AMIs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_lookup_org: Option<String>,

    /// Base operating system name used when looking up machine AMIs.
    #[serde(default, rename = "imageLookupBaseOS", skip_serializing_if = "Option::is_none")]
    pub image_lookup_base_os: Option<String>,

    /// Bastion host configuration.
    #[serde(default)]
    pub bastion: Bastion,
}

/// `AWSCluster` status
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AWSClusterStatus {
    /// Whether the cluster infrastructure is ready.
    #[serde(default)]
    pub ready: bool,
}

/// Host and port of an API server endpoint.
///
/// The zero value (empty host, port 0) means the endpoint has not been assigned yet.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct APIEndpoint {
    /// Hostname on which the API server is serving.
    #[serde(default)]
    pub host: String,

    /// Port on which the API server is serving.
    #[serde(default)]
    pub port: i32,
}

impl APIEndpoint {
    /// Returns `true` once a host has been assigned.
    ///
    /// A port without a host does not count as an assigned endpoint.
    #[must_use]
    pub fn is_set(&self) -> bool {
        !self.host.is_empty()
    }
}

impl fmt::Display for APIEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

/// Scheme of a classic ELB.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum ClassicELBScheme {
    /// Load balancer reachable from the internet.
    #[serde(rename = "internet-facing")]
    InternetFacing,

    /// Load balancer reachable only from inside the VPC.
    #[serde(rename = "internal")]
    Internal,
}

impl ClassicELBScheme {
    /// Wire representation of the scheme.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InternetFacing => "internet-facing",
            Self::Internal => "internal",
        }
    }
}

impl fmt::Display for ClassicELBScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Control plane load balancer settings.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AWSLoadBalancerSpec {
    /// Load balancer scheme. Unset means the provider default (internet-facing).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheme: Option<ClassicELBScheme>,

    /// Distribute traffic evenly across all enabled availability zones.
    #[serde(default)]
    pub cross_zone_load_balancing: bool,
}

/// Network configuration of the cluster.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct NetworkSpec {
    /// CNI configuration. `None` means no CNI ingress rules are managed at all.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cni: Option<CNISpec>,
}

/// CNI configuration of the cluster.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CNISpec {
    /// Security group rules the CNI needs between control plane and nodes.
    ///
    /// Order is preserved; rules supplied here are never merged with defaults.
    #[serde(default, rename = "cniIngressRules", skip_serializing_if = "Vec::is_empty")]
    pub cni_ingress_rules: Vec<CNIIngressRule>,
}

/// A single security group ingress rule required by the CNI.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CNIIngressRule {
    /// Human-readable description.
    pub description: String,

    /// IP protocol of the rule.
    pub protocol: SecurityGroupProtocol,

    /// First port of the range. `-1` means all ports.
    pub from_port: i64,

    /// Last port of the range.
    pub to_port: i64,
}

/// IP protocol of a security group rule.
///
/// Serialized with the identifiers the EC2 API expects (`tcp`, `udp`, `icmp`) or
/// protocol numbers for protocols without a name (`4` for IP-in-IP, `58` for ICMPv6).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub enum SecurityGroupProtocol {
    /// Every protocol.
    #[serde(rename = "-1")]
    All,

    /// IP-in-IP encapsulation (protocol number 4).
    #[serde(rename = "4")]
    IPinIP,

    /// TCP
    #[serde(rename = "tcp")]
    TCP,

    /// UDP
    #[serde(rename = "udp")]
    UDP,

    /// ICMP
    #[serde(rename = "icmp")]
    ICMP,

    /// ICMPv6 (protocol number 58).
    #[serde(rename = "58")]
    ICMPv6,
}

impl SecurityGroupProtocol {
    /// Wire representation of the protocol.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::All => "-1",
            Self::IPinIP => "4",
            Self::TCP => "tcp",
            Self::UDP => "udp",
            Self::ICMP => "icmp",
            Self::ICMPv6 => "58",
        }
    }
}

impl fmt::Display for SecurityGroupProtocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Bastion host configuration.
///
/// `disable_ingress_rules` and a non-empty `allowed_cidr_blocks` are mutually exclusive.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Bastion {
    /// Whether a bastion host is created.
    #[serde(default)]
    pub enabled: bool,

    /// Skip creating ingress rules on the bastion security group.
    #[serde(default)]
    pub disable_ingress_rules: bool,

    /// CIDR blocks allowed to reach the bastion host.
    ///
    /// Defaults to `["0.0.0.0/0"]` unless ingress rules are disabled.
    #[serde(default, rename = "allowedCIDRBlocks")]
    pub allowed_cidr_blocks: Vec<String>,

    /// EC2 instance type of the bastion host.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance_type: Option<String>,

    /// AMI of the bastion host.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ami: Option<String>,
}

#[cfg(test)]
#[path = "crd_tests.rs"]
mod crd_tests;
