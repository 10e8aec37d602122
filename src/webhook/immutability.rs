// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Immutability checks for `AWSCluster` updates.
//!
//! Every check runs on every update and all violations are reported together:
//!
//! - `spec.region` can never change.
//! - `spec.controlPlaneLoadBalancer` can never change, compared deeply including the
//!   optional scheme.
//! - `spec.controlPlaneEndpoint` may be assigned once; after that it can never change.

use tracing::{debug, warn};

use crate::constants::{
    FIELD_CONTROL_PLANE_ENDPOINT, FIELD_CONTROL_PLANE_LOAD_BALANCER, FIELD_REGION,
    MESSAGE_FIELD_IMMUTABLE,
};
use crate::crd::{APIEndpoint, AWSClusterSpec};
use crate::errors::{FieldError, FieldErrorList};

/// How the control plane endpoint moved between two snapshots.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EndpointChange {
    /// The old endpoint was never assigned; any new value is accepted.
    Unset,
    /// The old endpoint was assigned and the new one matches it.
    Unchanged,
    /// The old endpoint was assigned and the new one differs.
    Changed,
}

impl EndpointChange {
    /// Classifies the transition from `old` to `new`.
    #[must_use]
    pub fn between(old: &APIEndpoint, new: &APIEndpoint) -> Self {
        if !old.is_set() {
            Self::Unset
        } else if old == new {
            Self::Unchanged
        } else {
            Self::Changed
        }
    }
}

/// Compares two cluster specs and reports every immutable field that changed.
///
/// # Arguments
///
/// * `old` - The persisted spec
/// * `new` - The spec submitted by the update
///
/// # Returns
///
/// All violations found, in field order. An empty list means the update is allowed.
#[must_use]
pub fn immutable_field_errors(old: &AWSClusterSpec, new: &AWSClusterSpec) -> FieldErrorList {
    let mut errors = FieldErrorList::new();

    if new.region != old.region {
        warn!(old = %old.region, new = %new.region, "Attempt to change immutable region");
        errors.push(FieldError::immutable(FIELD_REGION, MESSAGE_FIELD_IMMUTABLE));
    }

    if new.control_plane_load_balancer != old.control_plane_load_balancer {
        warn!(
            old = ?old.control_plane_load_balancer,
            new = ?new.control_plane_load_balancer,
            "Attempt to change immutable controlPlaneLoadBalancer"
        );
        errors.push(FieldError::immutable(
            FIELD_CONTROL_PLANE_LOAD_BALANCER,
            MESSAGE_FIELD_IMMUTABLE,
        ));
    }

    match EndpointChange::between(&old.control_plane_endpoint, &new.control_plane_endpoint) {
        EndpointChange::Unset => {
            if new.control_plane_endpoint.is_set() {
                debug!(
                    endpoint = %new.control_plane_endpoint,
                    "controlPlaneEndpoint assigned for the first time"
                );
            }
        }
        EndpointChange::Unchanged => {}
        EndpointChange::Changed => {
            warn!(
                old = %old.control_plane_endpoint,
                new = %new.control_plane_endpoint,
                "Attempt to change immutable controlPlaneEndpoint"
            );
            errors.push(FieldError::immutable(
                FIELD_CONTROL_PLANE_ENDPOINT,
                MESSAGE_FIELD_IMMUTABLE,
            ));
        }
    }

    errors
}

/// Validates an update, failing with every immutable field that changed.
///
/// # Errors
///
/// Returns the collected violations when at least one immutable field changed.
pub fn validate_update(old: &AWSClusterSpec, new: &AWSClusterSpec) -> Result<(), FieldErrorList> {
    immutable_field_errors(old, new).into_result()
}

#[cfg(test)]
#[path = "immutability_tests.rs"]
mod immutability_tests;
