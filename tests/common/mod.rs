// Common test utilities for integration tests

#![allow(dead_code)]

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use serde_json::{json, Value};

/// UID used by every fixture review
pub const REVIEW_UID: &str = "705ab4f5-6393-11e8-b7cc-42010a800002";

/// Build an `AWSCluster` object with the given spec
pub fn aws_cluster(name: &str, spec: Value) -> Value {
    json!({
        "apiVersion": "infrastructure.cluster.x-k8s.io/v1alpha3",
        "kind": "AWSCluster",
        "metadata": {
            "name": name,
            "namespace": "default",
            "labels": {
                "cluster.x-k8s.io/cluster-name": name
            }
        },
        "spec": spec
    })
}

/// Build an `AdmissionReview` request for an `AWSCluster`
pub fn admission_review(operation: &str, object: Option<Value>, old_object: Option<Value>) -> Value {
    let name = object
        .as_ref()
        .or(old_object.as_ref())
        .and_then(|o| o["metadata"]["name"].as_str())
        .unwrap_or_default()
        .to_string();

    json!({
        "apiVersion": "admission.k8s.io/v1",
        "kind": "AdmissionReview",
        "request": {
            "uid": REVIEW_UID,
            "kind": {
                "group": "infrastructure.cluster.x-k8s.io",
                "version": "v1alpha3",
                "kind": "AWSCluster"
            },
            "resource": {
                "group": "infrastructure.cluster.x-k8s.io",
                "version": "v1alpha3",
                "resource": "awsclusters"
            },
            "name": name,
            "namespace": "default",
            "operation": operation,
            "userInfo": {
                "username": "system:serviceaccount:capi-system:capi-controller-manager",
                "groups": ["system:serviceaccounts"]
            },
            "object": object,
            "oldObject": old_object,
            "dryRun": false
        }
    })
}

/// Decode the base64 JSON patch carried by a response review
pub fn decode_patch(review: &Value) -> Option<json_patch::Patch> {
    let encoded = review["response"]["patch"].as_str()?;
    let bytes = BASE64.decode(encoded).ok()?;
    serde_json::from_slice(&bytes).ok()
}

/// Extract `response.status.message` from a response review
pub fn status_message(review: &Value) -> String {
    review["response"]["status"]["message"]
        .as_str()
        .unwrap_or_default()
        .to_string()
}
