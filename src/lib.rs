// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! # capa-admission - Admission defaulting and validation for `AWSCluster`
//!
//! This library implements the admission-time rules of the Cluster API AWS infrastructure
//! resource `AWSCluster`: which fields are filled in when omitted and which changes an
//! update may not make.
//!
//! ## Overview
//!
//! - Immutability of `region` and `controlPlaneLoadBalancer`, and write-once semantics for
//!   `controlPlaneEndpoint`
//! - Fail-fast validation of the bastion `allowedCIDRBlocks` allow-list
//! - Defaulting of the bastion allow-list and of CNI ingress rules (Calico)
//! - Conversion of Kubernetes `AdmissionReview`s into allow, deny or patch responses
//!
//! ## Modules
//!
//! - [`crd`] - `AWSCluster` resource types
//! - [`webhook`] - Defaulting and validation rules
//! - [`admission`] - `AdmissionReview` handling
//! - [`errors`] - Field errors and aggregated validation errors
//! - [`metrics`] - Prometheus metrics
//! - [`cli`] - Offline command-line driver
//!
//! ## Example
//!
//! ```rust,no_run
//! use capa_admission::crd::{AWSCluster, AWSClusterSpec};
//! use capa_admission::webhook::{Defaulter, Validator};
//!
//! let mut cluster = AWSCluster::new("workload", AWSClusterSpec::default());
//! cluster.default_resource();
//! assert_eq!(cluster.spec.bastion.allowed_cidr_blocks, vec!["0.0.0.0/0"]);
//! assert!(cluster.validate_create().is_ok());
//! ```

pub mod admission;
pub mod cli;
pub mod constants;
pub mod crd;
pub mod errors;
pub mod metrics;
pub mod webhook;
