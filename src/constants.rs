// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Global constants for the AWSCluster admission engine.
//!
//! This module contains all numeric and string constants used throughout the codebase.
//! Constants are organized by category for easy maintenance.

// ============================================================================
// API Constants
// ============================================================================

/// API group of the `AWSCluster` resource
pub const API_GROUP: &str = "infrastructure.cluster.x-k8s.io";

/// API version of the `AWSCluster` resource
pub const API_VERSION: &str = "v1alpha3";

/// Fully qualified API version (group/version)
pub const API_GROUP_VERSION: &str = "infrastructure.cluster.x-k8s.io/v1alpha3";

/// Kind name for the `AWSCluster` resource
pub const KIND_AWS_CLUSTER: &str = "AWSCluster";

/// Group-qualified kind used when reporting invalid objects
pub const GROUP_KIND_AWS_CLUSTER: &str = "AWSCluster.infrastructure.cluster.x-k8s.io";

// ============================================================================
// Field Paths
// ============================================================================

/// Path of the region field
pub const FIELD_REGION: &str = "spec.region";

/// Path of the control plane load balancer field
pub const FIELD_CONTROL_PLANE_LOAD_BALANCER: &str = "spec.controlPlaneLoadBalancer";

/// Path of the control plane endpoint field
pub const FIELD_CONTROL_PLANE_ENDPOINT: &str = "spec.controlPlaneEndpoint";

/// Path of the bastion allow-list
pub const FIELD_BASTION_ALLOWED_CIDR_BLOCKS: &str = "spec.bastion.allowedCIDRBlocks";

/// Path of the CNI ingress rules
pub const FIELD_CNI_INGRESS_RULES: &str = "spec.networkSpec.cni.cniIngressRules";

/// Message attached to every immutable-field violation
pub const MESSAGE_FIELD_IMMUTABLE: &str = "field is immutable";

// ============================================================================
// Bastion Defaults
// ============================================================================

/// CIDR block that opens bastion ingress to any IPv4 source
pub const DEFAULT_BASTION_ALLOWED_CIDR_BLOCK: &str = "0.0.0.0/0";

// ============================================================================
// CNI Ingress Rule Constants
// ============================================================================

/// BGP port used by Calico for route distribution between nodes
pub const CALICO_BGP_PORT: i64 = 179;

/// Sentinel port meaning "all ports" for protocols without ports
pub const ALL_PORTS: i64 = -1;

/// Highest TCP/UDP port number
pub const MAX_PORT: i64 = 65535;

// ============================================================================
// Admission Constants
// ============================================================================

/// Reason used when an admission request is denied by validation
pub const REASON_VALIDATION_FAILED: &str = "ValidationFailed";

/// Reason used when the admission request itself is malformed
pub const REASON_INVALID_REQUEST: &str = "InvalidRequest";

// ============================================================================
// Metrics Constants
// ============================================================================

/// Namespace prefix for all metrics (prometheus-safe)
pub const METRICS_NAMESPACE: &str = "capa_admission";

// ============================================================================
// Logging Constants
// ============================================================================

/// Environment variable selecting the log output format (`text` or `json`)
pub const LOG_FORMAT_ENV: &str = "RUST_LOG_FORMAT";

/// Log filter used when `RUST_LOG` is not set
pub const DEFAULT_LOG_FILTER: &str = "info";
