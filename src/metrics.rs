// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Prometheus metrics for the AWSCluster admission engine.
//!
//! This module provides metrics collection with the namespace prefix `capa_admission_`.
//!
//! # Metrics Categories
//!
//! - **Admission Metrics** - Track admission decisions and their duration
//! - **Validation Metrics** - Track field violations by kind
//! - **Defaulting Metrics** - Track which fields were defaulted
//!
//! # Example
//!
//! ```rust,no_run
//! use capa_admission::metrics::{gather_metrics, record_admission_allowed};
//!
//! record_admission_allowed("CREATE", std::time::Duration::from_millis(1));
//! println!("{}", gather_metrics().unwrap());
//! ```

use prometheus::{CounterVec, Encoder, HistogramOpts, HistogramVec, Opts, Registry, TextEncoder};
use std::sync::LazyLock;
use std::time::Duration;

use crate::constants::METRICS_NAMESPACE;
use crate::errors::FieldErrorList;

// ============================================================================
// Global Metrics Registry
// ============================================================================

/// Global Prometheus metrics registry
pub static METRICS_REGISTRY: LazyLock<Registry> = LazyLock::new(Registry::new);

// ============================================================================
// Admission Metrics
// ============================================================================

/// Total number of admission decisions by operation and outcome
///
/// Labels:
/// - `operation`: Admission operation (`CREATE`, `UPDATE`, `DELETE`, `CONNECT`)
/// - `outcome`: Decision (`allowed`, `denied`, `mutated`, `invalid`)
pub static ADMISSION_REQUESTS_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    let opts = Opts::new(
        format!("{METRICS_NAMESPACE}_admission_requests_total"),
        "Total number of admission decisions by operation and outcome",
    );
    let counter = CounterVec::new(opts, &["operation", "outcome"]).unwrap();
    METRICS_REGISTRY
        .register(Box::new(counter.clone()))
        .unwrap();
    counter
});

/// Duration of admission handling in seconds
///
/// Labels:
/// - `operation`: Admission operation
pub static ADMISSION_DURATION_SECONDS: LazyLock<HistogramVec> = LazyLock::new(|| {
    let opts = HistogramOpts::new(
        format!("{METRICS_NAMESPACE}_admission_duration_seconds"),
        "Duration of admission handling in seconds by operation",
    )
    .buckets(vec![0.000_01, 0.000_1, 0.001, 0.01, 0.1, 1.0]);
    let histogram = HistogramVec::new(opts, &["operation"]).unwrap();
    METRICS_REGISTRY
        .register(Box::new(histogram.clone()))
        .unwrap();
    histogram
});

// ============================================================================
// Validation Metrics
// ============================================================================

/// Total number of field violations by kind
///
/// Labels:
/// - `kind`: Violation kind (`immutable`, `invalid`, `forbidden`)
pub static FIELD_ERRORS_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    let opts = Opts::new(
        format!("{METRICS_NAMESPACE}_field_errors_total"),
        "Total number of field violations by kind",
    );
    let counter = CounterVec::new(opts, &["kind"]).unwrap();
    METRICS_REGISTRY
        .register(Box::new(counter.clone()))
        .unwrap();
    counter
});

// ============================================================================
// Defaulting Metrics
// ============================================================================

/// Total number of defaults applied by field
///
/// Labels:
/// - `field`: Path of the defaulted field
pub static DEFAULTS_APPLIED_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    let opts = Opts::new(
        format!("{METRICS_NAMESPACE}_defaults_applied_total"),
        "Total number of defaults applied by field",
    );
    let counter = CounterVec::new(opts, &["field"]).unwrap();
    METRICS_REGISTRY
        .register(Box::new(counter.clone()))
        .unwrap();
    counter
});

// ============================================================================
// Helper Functions
// ============================================================================

fn record_admission(operation: &str, outcome: &str, duration: Duration) {
    ADMISSION_REQUESTS_TOTAL
        .with_label_values(&[operation, outcome])
        .inc();
    ADMISSION_DURATION_SECONDS
        .with_label_values(&[operation])
        .observe(duration.as_secs_f64());
}

/// Record an allowed admission request
pub fn record_admission_allowed(operation: &str, duration: Duration) {
    record_admission(operation, "allowed", duration);
}

/// Record an admission request that was allowed with a patch
pub fn record_admission_mutated(operation: &str, duration: Duration) {
    record_admission(operation, "mutated", duration);
}

/// Record a denied admission request
pub fn record_admission_denied(operation: &str, duration: Duration) {
    record_admission(operation, "denied", duration);
}

/// Record a malformed admission request
pub fn record_admission_invalid(operation: &str) {
    ADMISSION_REQUESTS_TOTAL
        .with_label_values(&[operation, "invalid"])
        .inc();
}

/// Record every violation of a rejected object
pub fn record_field_errors(errors: &FieldErrorList) {
    for error in errors {
        FIELD_ERRORS_TOTAL
            .with_label_values(&[error.kind.as_str()])
            .inc();
    }
}

/// Record that `field` was defaulted
pub fn record_default_applied(field: &str) {
    DEFAULTS_APPLIED_TOTAL.with_label_values(&[field]).inc();
}

/// Gather and encode all metrics in Prometheus text format
///
/// # Errors
/// Returns error if encoding fails
pub fn gather_metrics() -> Result<String, prometheus::Error> {
    let encoder = TextEncoder::new();
    let metric_families = METRICS_REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(format!("UTF-8 error: {e}")))
}
