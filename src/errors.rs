// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Admission error types.
//!
//! This module provides the error types surfaced by defaulting and validation:
//! - [`FieldError`] - A single violation scoped to a field path
//! - [`FieldErrorList`] - An ordered collection of violations
//! - [`BastionError`] - Fail-fast errors from bastion allow-list validation
//! - [`ValidationError`] - The aggregated rejection returned to the admission caller
//! - [`AdmissionError`] - Failures while turning a review into a response
//!
//! Immutability checks collect every violation before failing, while bastion checks stop
//! at the first one. Both end up as `FieldError`s inside a single `ValidationError`.

use std::fmt;
use thiserror::Error;

use crate::constants::{FIELD_BASTION_ALLOWED_CIDR_BLOCKS, GROUP_KIND_AWS_CLUSTER};

/// Machine-checkable category of a field violation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FieldErrorKind {
    /// The field was changed after it became immutable.
    Immutable,

    /// The field value is malformed.
    Invalid,

    /// The field value is well-formed but not allowed in combination with other fields.
    Forbidden,
}

impl FieldErrorKind {
    /// Stable lowercase identifier, suitable for metric labels.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Immutable => "immutable",
            Self::Invalid => "invalid",
            Self::Forbidden => "forbidden",
        }
    }
}

impl fmt::Display for FieldErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A violation scoped to a path inside the resource (e.g. `spec.region`).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{path}: {message}")]
pub struct FieldError {
    /// Dot/bracket path of the offending field
    pub path: String,
    /// Category of the violation
    pub kind: FieldErrorKind,
    /// Human-readable explanation
    pub message: String,
}

impl FieldError {
    /// A field changed after it was frozen.
    #[must_use]
    pub fn immutable(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            kind: FieldErrorKind::Immutable,
            message: message.into(),
        }
    }

    /// A field holds a malformed value.
    #[must_use]
    pub fn invalid(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            kind: FieldErrorKind::Invalid,
            message: message.into(),
        }
    }

    /// A field holds a value that conflicts with other settings.
    #[must_use]
    pub fn forbidden(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            kind: FieldErrorKind::Forbidden,
            message: message.into(),
        }
    }
}

/// Ordered list of field violations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrorList(Vec<FieldError>);

impl FieldErrorList {
    /// Creates an empty list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a violation.
    pub fn push(&mut self, error: FieldError) {
        self.0.push(error);
    }

    /// Appends every violation of `other`, keeping order.
    pub fn extend(&mut self, other: FieldErrorList) {
        self.0.extend(other.0);
    }

    /// Returns `true` if no violation was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of recorded violations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterates over the violations in the order they were recorded.
    pub fn iter(&self) -> std::slice::Iter<'_, FieldError> {
        self.0.iter()
    }

    /// Returns `Ok(())` when empty, the list itself otherwise.
    ///
    /// # Errors
    ///
    /// Returns the list when it holds at least one violation.
    pub fn into_result(self) -> Result<(), FieldErrorList> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl From<FieldError> for FieldErrorList {
    fn from(error: FieldError) -> Self {
        Self(vec![error])
    }
}

impl FromIterator<FieldError> for FieldErrorList {
    fn from_iter<I: IntoIterator<Item = FieldError>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for FieldErrorList {
    type Item = FieldError;
    type IntoIter = std::vec::IntoIter<FieldError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a FieldErrorList {
    type Item = &'a FieldError;
    type IntoIter = std::slice::Iter<'a, FieldError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl fmt::Display for FieldErrorList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.as_slice() {
            [] => Ok(()),
            [single] => write!(f, "{single}"),
            many => {
                f.write_str("[")?;
                for (i, error) in many.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{error}")?;
                }
                f.write_str("]")
            }
        }
    }
}

/// Errors from validating the bastion allow-list.
///
/// Validation stops at the first error, so at most one of these is ever reported.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BastionError {
    /// Ingress rules are disabled but an allow-list was still supplied.
    #[error("disableIngressRules cannot be set when allowedCIDRBlocks is non-empty")]
    IngressRulesConflict,

    /// An allow-list entry is not a valid CIDR block.
    #[error("invalid CIDR block '{cidr}': {reason}")]
    InvalidCidrBlock {
        /// Position of the entry in `allowedCIDRBlocks`
        index: usize,
        /// The offending string
        cidr: String,
        /// Parser explanation
        reason: String,
    },
}

impl BastionError {
    /// Converts the error into a field violation on the allow-list.
    #[must_use]
    pub fn to_field_error(&self) -> FieldError {
        match self {
            Self::IngressRulesConflict => {
                FieldError::forbidden(FIELD_BASTION_ALLOWED_CIDR_BLOCKS, self.to_string())
            }
            Self::InvalidCidrBlock { index, .. } => FieldError::invalid(
                format!("{FIELD_BASTION_ALLOWED_CIDR_BLOCKS}[{index}]"),
                self.to_string(),
            ),
        }
    }
}

impl From<BastionError> for FieldError {
    fn from(error: BastionError) -> Self {
        error.to_field_error()
    }
}

/// Aggregated rejection of an admission request.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The object failed one or more field checks.
    #[error("{kind} \"{name}\" is invalid: {errors}")]
    Invalid {
        /// Group-qualified kind (e.g. `AWSCluster.infrastructure.cluster.x-k8s.io`)
        kind: String,
        /// Object name
        name: String,
        /// Every violation found
        errors: FieldErrorList,
    },
}

impl ValidationError {
    /// Wraps violations found on an `AWSCluster` named `name`.
    #[must_use]
    pub fn aws_cluster(name: impl Into<String>, errors: FieldErrorList) -> Self {
        Self::Invalid {
            kind: GROUP_KIND_AWS_CLUSTER.to_string(),
            name: name.into(),
            errors,
        }
    }

    /// The violations carried by this error.
    #[must_use]
    pub fn field_errors(&self) -> &FieldErrorList {
        match self {
            Self::Invalid { errors, .. } => errors,
        }
    }
}

/// Errors raised while converting admission reviews.
#[derive(Error, Debug)]
pub enum AdmissionError {
    /// The review has no request, or a request is missing a required object.
    #[error("invalid admission review: {0}")]
    InvalidReview(String),

    /// The object could not be converted to or from JSON.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The JSON patch could not be attached to the response.
    #[error("failed to attach patch: {0}")]
    Patch(String),
}

#[cfg(test)]
#[path = "errors_tests.rs"]
mod errors_tests;
