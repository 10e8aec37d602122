// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Admission review handling for `AWSCluster`.
//!
//! This module converts Kubernetes `AdmissionRequest`s into `AdmissionResponse`s:
//!
//! - [`mutate`] applies defaults and answers with a JSON patch against the object exactly
//!   as it was submitted, so fields this crate does not model are never touched.
//! - [`validate`] dispatches on the operation to the [`Validator`] methods.
//!
//! Receiving the review (HTTP, TLS) is left to the hosting server.
//!
//! # Example
//!
//! ```rust,no_run
//! use capa_admission::admission::review_validating;
//! use capa_admission::crd::AWSCluster;
//! use kube::core::admission::AdmissionReview;
//!
//! let body = std::fs::read_to_string("review.json").unwrap();
//! let review: AdmissionReview<AWSCluster> = serde_json::from_str(&body).unwrap();
//! let response = review_validating(review);
//! println!("{}", serde_json::to_string_pretty(&response).unwrap());
//! ```

use std::time::Instant;

use json_patch::Patch;
use kube::core::admission::{AdmissionRequest, AdmissionResponse, AdmissionReview, Operation};
use kube::core::DynamicObject;
use serde_json::{Map, Value};
use tracing::{debug, error, info, warn};

use crate::constants::{REASON_INVALID_REQUEST, REASON_VALIDATION_FAILED};
use crate::crd::{AWSCluster, AWSClusterSpec};
use crate::errors::AdmissionError;
use crate::metrics::{
    record_admission_allowed, record_admission_denied, record_admission_invalid,
    record_admission_mutated, record_field_errors,
};
use crate::webhook::{default_spec, Validator};

/// Admission webhook flavour.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AdmissionMode {
    /// Apply defaults and return a patch.
    Mutating,
    /// Accept or reject without modifying the object.
    Validating,
}

/// Uppercase operation name used for logs and metric labels.
fn operation_label(operation: &Operation) -> String {
    format!("{operation:?}").to_uppercase()
}

/// Create a denial response with reason embedded in message.
/// kube-rs deny() only sets status.message, so we format as "[reason] message"
fn deny_with_reason<T: kube::Resource>(
    request: &AdmissionRequest<T>,
    message: &str,
    reason: &str,
) -> AdmissionResponse {
    AdmissionResponse::from(request).deny(format!("[{reason}] {message}"))
}

/// Returns `doc` with `value` stored at `keys`, creating intermediate objects as needed.
fn with_json_field(doc: Value, keys: &[&str], value: Value) -> Value {
    let Some((first, rest)) = keys.split_first() else {
        return value;
    };

    let mut map = match doc {
        Value::Object(map) => map,
        _ => Map::new(),
    };
    let child = map.remove(*first).unwrap_or(Value::Null);
    map.insert((*first).to_string(), with_json_field(child, rest, value));
    Value::Object(map)
}

/// Computes the JSON patch that applies all defaults to a raw object.
///
/// Only defaulted fields appear in the patch; an object that is already complete yields
/// an empty patch.
///
/// # Errors
///
/// Returns [`AdmissionError::Serialization`] if `spec` does not deserialize into an
/// `AWSClusterSpec`.
pub fn defaulting_patch(object: &Value) -> Result<Patch, AdmissionError> {
    let spec_value = object
        .get("spec")
        .cloned()
        .unwrap_or_else(|| Value::Object(Map::new()));
    let mut spec: AWSClusterSpec = serde_json::from_value(spec_value)?;

    let mut defaulted = object.clone();
    for field in default_spec(&mut spec) {
        defaulted = with_json_field(defaulted, field.json_keys(), field.value(&spec)?);
    }

    Ok(json_patch::diff(object, &defaulted))
}

/// Handles a mutating admission request.
///
/// CREATE and UPDATE objects are defaulted; everything else passes through unchanged.
#[must_use]
pub fn mutate(request: &AdmissionRequest<DynamicObject>) -> AdmissionResponse {
    let started = Instant::now();
    let operation = operation_label(&request.operation);

    if !matches!(request.operation, Operation::Create | Operation::Update) {
        debug!(uid = %request.uid, operation = %operation, "Nothing to default");
        record_admission_allowed(&operation, started.elapsed());
        return AdmissionResponse::from(request);
    }

    let Some(object) = request.object.as_ref() else {
        error!(uid = %request.uid, "Missing object in request");
        record_admission_invalid(&operation);
        return deny_with_reason(request, "Missing object in request", REASON_INVALID_REQUEST);
    };

    let patch = match serde_json::to_value(object)
        .map_err(AdmissionError::from)
        .and_then(|raw| defaulting_patch(&raw))
    {
        Ok(patch) => patch,
        Err(e) => {
            error!(uid = %request.uid, error = %e, "Failed to default object");
            record_admission_invalid(&operation);
            return deny_with_reason(request, &e.to_string(), REASON_INVALID_REQUEST);
        }
    };

    if patch.0.is_empty() {
        debug!(uid = %request.uid, name = %request.name, "Object already defaulted");
        record_admission_allowed(&operation, started.elapsed());
        return AdmissionResponse::from(request);
    }

    let count = patch.0.len();
    match AdmissionResponse::from(request).with_patch(patch) {
        Ok(response) => {
            info!(
                uid = %request.uid,
                name = %request.name,
                operations = count,
                "Admission request defaulted"
            );
            record_admission_mutated(&operation, started.elapsed());
            response
        }
        Err(e) => {
            let e = AdmissionError::Patch(e.to_string());
            error!(uid = %request.uid, error = %e, "Failed to attach patch");
            record_admission_invalid(&operation);
            deny_with_reason(request, &e.to_string(), REASON_INVALID_REQUEST)
        }
    }
}

/// Handles a validating admission request.
#[must_use]
pub fn validate(request: &AdmissionRequest<AWSCluster>) -> AdmissionResponse {
    let started = Instant::now();
    let operation = operation_label(&request.operation);

    debug!(
        uid = %request.uid,
        operation = %operation,
        namespace = ?request.namespace,
        name = %request.name,
        dry_run = request.dry_run,
        "Processing admission request"
    );

    let result = match request.operation {
        Operation::Create => match request.object.as_ref() {
            Some(new) => new.validate_create(),
            None => return missing_object(request, &operation, "object"),
        },
        Operation::Update => match (request.object.as_ref(), request.old_object.as_ref()) {
            (Some(new), Some(old)) => new.validate_update(old),
            (None, _) => return missing_object(request, &operation, "object"),
            (_, None) => return missing_object(request, &operation, "oldObject"),
        },
        Operation::Delete => match request.old_object.as_ref().or(request.object.as_ref()) {
            Some(old) => old.validate_delete(),
            None => Ok(()),
        },
        _ => Ok(()),
    };

    match result {
        Ok(()) => {
            info!(uid = %request.uid, operation = %operation, "Admission request allowed");
            record_admission_allowed(&operation, started.elapsed());
            AdmissionResponse::from(request)
        }
        Err(e) => {
            warn!(
                uid = %request.uid,
                operation = %operation,
                reason = REASON_VALIDATION_FAILED,
                message = %e,
                "Admission request denied"
            );
            record_field_errors(e.field_errors());
            record_admission_denied(&operation, started.elapsed());
            deny_with_reason(request, &e.to_string(), REASON_VALIDATION_FAILED)
        }
    }
}

fn missing_object(
    request: &AdmissionRequest<AWSCluster>,
    operation: &str,
    field: &str,
) -> AdmissionResponse {
    let e = AdmissionError::InvalidReview(format!("{operation} request without {field}"));
    error!(uid = %request.uid, error = %e, "Malformed admission request");
    record_admission_invalid(operation);
    deny_with_reason(request, &e.to_string(), REASON_INVALID_REQUEST)
}

/// Answers a whole mutating admission review.
#[must_use]
pub fn review_mutating(review: AdmissionReview<DynamicObject>) -> AdmissionReview<DynamicObject> {
    let request: AdmissionRequest<DynamicObject> = match review.try_into() {
        Ok(request) => request,
        Err(e) => {
            error!(error = %e, "Failed to extract admission request");
            return AdmissionResponse::invalid(format!("Invalid AdmissionReview: {e}"))
                .into_review();
        }
    };
    mutate(&request).into_review()
}

/// Answers a whole validating admission review.
#[must_use]
pub fn review_validating(review: AdmissionReview<AWSCluster>) -> AdmissionReview<DynamicObject> {
    let request: AdmissionRequest<AWSCluster> = match review.try_into() {
        Ok(request) => request,
        Err(e) => {
            error!(error = %e, "Failed to extract admission request");
            return AdmissionResponse::invalid(format!("Invalid AdmissionReview: {e}"))
                .into_review();
        }
    };
    validate(&request).into_review()
}

/// Parses a review document and answers it in the requested mode.
///
/// # Errors
///
/// Returns [`AdmissionError::Serialization`] if `body` is not an AdmissionReview.
pub fn review_json(body: &str, mode: AdmissionMode) -> Result<Value, AdmissionError> {
    let response = match mode {
        AdmissionMode::Mutating => review_mutating(serde_json::from_str(body)?),
        AdmissionMode::Validating => review_validating(serde_json::from_str(body)?),
    };
    Ok(serde_json::to_value(response)?)
}

#[cfg(test)]
#[path = "admission_tests.rs"]
mod admission_tests;
