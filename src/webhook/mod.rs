// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Defaulting and validation of `AWSCluster` resources.
//!
//! # Write paths
//!
//! - **Create**: CNI defaults -> bastion defaults -> bastion allow-list validation
//! - **Update**: CNI defaults -> bastion defaults -> bastion allow-list validation ->
//!   immutability checks against the persisted object
//!
//! Defaulting never fails. Allow-list validation stops at the first problem, while the
//! immutability checks report every changed field. Whatever is found ends up in one
//! [`ValidationError`] so the request is rejected as a whole.
//!
//! # Modules
//!
//! - [`bastion`] - Bastion allow-list defaulting
//! - [`cidr`] - Bastion allow-list validation
//! - [`cni`] - CNI ingress rule defaulting
//! - [`immutability`] - Update-time immutability checks

pub mod bastion;
pub mod cidr;
pub mod cni;
pub mod immutability;

use kube::ResourceExt;
use tracing::debug;

use crate::constants::{FIELD_BASTION_ALLOWED_CIDR_BLOCKS, FIELD_CNI_INGRESS_RULES};
use crate::crd::{AWSCluster, AWSClusterSpec};
use crate::errors::{FieldErrorList, ValidationError};
use crate::metrics::record_default_applied;

/// Fills in unset computed fields in place.
pub trait Defaulter {
    /// Applies defaults. Running it twice has the same effect as running it once.
    fn default_resource(&mut self);
}

/// Admission-time validation of a resource.
pub trait Validator {
    /// Validates a newly created resource.
    ///
    /// # Errors
    ///
    /// Returns every violation found, aggregated into one error.
    fn validate_create(&self) -> Result<(), ValidationError>;

    /// Validates an update of `old` into `self`.
    ///
    /// # Errors
    ///
    /// Returns every violation found, aggregated into one error.
    fn validate_update(&self, old: &Self) -> Result<(), ValidationError>;

    /// Validates the deletion of the resource.
    ///
    /// # Errors
    ///
    /// Returns every violation found, aggregated into one error.
    fn validate_delete(&self) -> Result<(), ValidationError>;
}

/// A field that defaulting may fill in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DefaultedField {
    /// `spec.networkSpec.cni.cniIngressRules`
    CniIngressRules,
    /// `spec.bastion.allowedCIDRBlocks`
    BastionAllowedCidrBlocks,
}

impl DefaultedField {
    /// Dot path of the field.
    #[must_use]
    pub fn path(&self) -> &'static str {
        match self {
            Self::CniIngressRules => FIELD_CNI_INGRESS_RULES,
            Self::BastionAllowedCidrBlocks => FIELD_BASTION_ALLOWED_CIDR_BLOCKS,
        }
    }

    /// JSON keys leading from the object root to the field.
    #[must_use]
    pub fn json_keys(&self) -> &'static [&'static str] {
        match self {
            Self::CniIngressRules => &["spec", "networkSpec", "cni", "cniIngressRules"],
            Self::BastionAllowedCidrBlocks => &["spec", "bastion", "allowedCIDRBlocks"],
        }
    }

    /// Current value of the field in `spec`, as JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the value cannot be serialized.
    pub fn value(&self, spec: &AWSClusterSpec) -> Result<serde_json::Value, serde_json::Error> {
        match self {
            Self::CniIngressRules => {
                let rules = spec
                    .network_spec
                    .cni
                    .as_ref()
                    .map(|cni| cni.cni_ingress_rules.as_slice())
                    .unwrap_or_default();
                serde_json::to_value(rules)
            }
            Self::BastionAllowedCidrBlocks => {
                serde_json::to_value(&spec.bastion.allowed_cidr_blocks)
            }
        }
    }
}

/// Applies every default to a cluster spec.
///
/// # Returns
///
/// The fields that were defaulted, empty when the spec was already complete.
pub fn default_spec(spec: &mut AWSClusterSpec) -> Vec<DefaultedField> {
    let mut defaulted = Vec::new();

    if cni::default_cni_ingress_rules(&mut spec.network_spec) {
        defaulted.push(DefaultedField::CniIngressRules);
    }
    if bastion::default_bastion(&mut spec.bastion) {
        defaulted.push(DefaultedField::BastionAllowedCidrBlocks);
    }

    for field in &defaulted {
        record_default_applied(field.path());
    }
    defaulted
}

/// Checks that apply to every write, independent of any previous version.
fn spec_field_errors(spec: &AWSClusterSpec) -> FieldErrorList {
    let mut errors = FieldErrorList::new();
    if let Err(e) = cidr::validate_allowed_cidr_blocks(&spec.bastion) {
        errors.push(e.into());
    }
    errors
}

impl Defaulter for AWSCluster {
    fn default_resource(&mut self) {
        let defaulted = default_spec(&mut self.spec);
        if !defaulted.is_empty() {
            debug!(
                name = %self.name_any(),
                fields = ?defaulted,
                "Applied AWSCluster defaults"
            );
        }
    }
}

impl Validator for AWSCluster {
    fn validate_create(&self) -> Result<(), ValidationError> {
        spec_field_errors(&self.spec)
            .into_result()
            .map_err(|errors| ValidationError::aws_cluster(self.name_any(), errors))
    }

    fn validate_update(&self, old: &Self) -> Result<(), ValidationError> {
        let mut errors = spec_field_errors(&self.spec);
        if let Err(immutable) = immutability::validate_update(&old.spec, &self.spec) {
            errors.extend(immutable);
        }
        errors
            .into_result()
            .map_err(|errors| ValidationError::aws_cluster(self.name_any(), errors))
    }

    fn validate_delete(&self) -> Result<(), ValidationError> {
        Ok(())
    }
}
