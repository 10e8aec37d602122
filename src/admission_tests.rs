// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `admission.rs`

#[cfg(test)]
mod tests {
    use kube::core::admission::{AdmissionRequest, AdmissionReview};
    use kube::core::DynamicObject;
    use serde_json::{json, Value};

    use crate::admission::{
        defaulting_patch, mutate, review_json, validate, with_json_field, AdmissionMode,
    };
    use crate::crd::AWSCluster;

    fn aws_cluster(name: &str, spec: Value) -> Value {
        json!({
            "apiVersion": "infrastructure.cluster.x-k8s.io/v1alpha3",
            "kind": "AWSCluster",
            "metadata": {
                "name": name,
                "namespace": "default"
            },
            "spec": spec
        })
    }

    fn review(operation: &str, object: Option<Value>, old_object: Option<Value>) -> Value {
        json!({
            "apiVersion": "admission.k8s.io/v1",
            "kind": "AdmissionReview",
            "request": {
                "uid": "705ab4f5-6393-11e8-b7cc-42010a800002",
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
                "name": "test-cluster",
                "namespace": "default",
                "operation": operation,
                "userInfo": {
                    "username": "admin"
                },
                "object": object,
                "oldObject": old_object,
                "dryRun": false
            }
        })
    }

    fn validating_request(review: Value) -> AdmissionRequest<AWSCluster> {
        let review: AdmissionReview<AWSCluster> = serde_json::from_value(review).unwrap();
        review.try_into().unwrap()
    }

    fn mutating_request(review: Value) -> AdmissionRequest<DynamicObject> {
        let review: AdmissionReview<DynamicObject> = serde_json::from_value(review).unwrap();
        review.try_into().unwrap()
    }

    fn apply(object: &Value) -> Value {
        let patch = defaulting_patch(object).unwrap();
        let mut patched = object.clone();
        json_patch::patch(&mut patched, &patch.0).unwrap();
        patched
    }

    #[test]
    fn test_with_json_field_creates_missing_parents() {
        let doc = json!({"spec": {"region": "us-east-1"}});
        let updated = with_json_field(doc, &["spec", "bastion", "allowedCIDRBlocks"], json!([]));

        assert_eq!(
            updated,
            json!({"spec": {"region": "us-east-1", "bastion": {"allowedCIDRBlocks": []}}})
        );
    }

    #[test]
    fn test_with_json_field_replaces_null_parent() {
        let doc = json!({"spec": {"bastion": null}});
        let updated = with_json_field(doc, &["spec", "bastion", "allowedCIDRBlocks"], json!(["a"]));

        assert_eq!(updated["spec"]["bastion"]["allowedCIDRBlocks"], json!(["a"]));
    }

    #[test]
    fn test_defaulting_patch_adds_bastion_allow_list() {
        let object = aws_cluster("patch", json!({}));
        let patched = apply(&object);

        assert_eq!(
            patched["spec"]["bastion"]["allowedCIDRBlocks"],
            json!(["0.0.0.0/0"])
        );
        assert!(patched["spec"].get("networkSpec").is_none());
    }

    #[test]
    fn test_defaulting_patch_adds_calico_rules() {
        let object = aws_cluster("calico", json!({"networkSpec": {"cni": {}}}));
        let patched = apply(&object);

        assert_eq!(
            patched["spec"]["networkSpec"]["cni"]["cniIngressRules"],
            json!([
                {"description": "bgp (calico)", "protocol": "tcp", "fromPort": 179, "toPort": 179},
                {"description": "IP-in-IP (calico)", "protocol": "4", "fromPort": -1, "toPort": 65535}
            ])
        );
    }

    #[test]
    fn test_defaulting_patch_is_empty_for_complete_object() {
        let object = aws_cluster(
            "complete",
            json!({
                "bastion": {"allowedCIDRBlocks": ["10.0.0.0/8"]}
            }),
        );

        assert!(defaulting_patch(&object).unwrap().0.is_empty());
    }

    #[test]
    fn test_defaulting_patch_respects_disabled_ingress() {
        let object = aws_cluster(
            "disabled",
            json!({
                "bastion": {"enabled": true, "disableIngressRules": true}
            }),
        );

        assert!(defaulting_patch(&object).unwrap().0.is_empty());
    }

    #[test]
    fn test_defaulting_patch_preserves_unknown_fields() {
        let object = aws_cluster(
            "unknown",
            json!({
                "region": "us-east-1",
                "futureField": {"nested": true},
                "bastion": {"instanceType": "t3.micro", "somethingNew": 7}
            }),
        );
        let patched = apply(&object);

        assert_eq!(patched["spec"]["futureField"], json!({"nested": true}));
        assert_eq!(patched["spec"]["bastion"]["somethingNew"], json!(7));
        assert_eq!(patched["spec"]["bastion"]["instanceType"], json!("t3.micro"));
        assert_eq!(
            patched["spec"]["bastion"]["allowedCIDRBlocks"],
            json!(["0.0.0.0/0"])
        );
    }

    #[test]
    fn test_defaulting_patch_rejects_malformed_spec() {
        let object = aws_cluster("malformed", json!({"region": 42}));
        assert!(defaulting_patch(&object).is_err());
    }

    #[test]
    fn test_mutate_create_returns_patch() {
        let request = mutating_request(review(
            "CREATE",
            Some(aws_cluster("test-cluster", json!({}))),
            None,
        ));
        let response = mutate(&request);
        assert!(response.allowed);

        let review = serde_json::to_value(response.into_review()).unwrap();
        assert_eq!(review["response"]["patchType"], json!("JSONPatch"));
    }

    #[test]
    fn test_mutate_complete_object_has_no_patch() {
        let request = mutating_request(review(
            "UPDATE",
            Some(aws_cluster(
                "test-cluster",
                json!({"bastion": {"allowedCIDRBlocks": ["10.0.0.0/8"]}}),
            )),
            Some(aws_cluster("test-cluster", json!({}))),
        ));
        let response = mutate(&request);
        assert!(response.allowed);

        let review = serde_json::to_value(response.into_review()).unwrap();
        assert!(review["response"].get("patchType").is_none());
    }

    #[test]
    fn test_mutate_delete_passes_through() {
        let request = mutating_request(review(
            "DELETE",
            None,
            Some(aws_cluster("test-cluster", json!({}))),
        ));
        assert!(mutate(&request).allowed);
    }

    #[test]
    fn test_validate_create_allowed() {
        let request = validating_request(review(
            "CREATE",
            Some(aws_cluster(
                "test-cluster",
                json!({"bastion": {"allowedCIDRBlocks": ["0.0.0.0/0"]}}),
            )),
            None,
        ));
        assert!(validate(&request).allowed);
    }

    #[test]
    fn test_validate_create_denies_invalid_cidr() {
        let request = validating_request(review(
            "CREATE",
            Some(aws_cluster(
                "test-cluster",
                json!({"bastion": {"allowedCIDRBlocks": ["100.200.300.400/99"]}}),
            )),
            None,
        ));
        let response = validate(&request);
        assert!(!response.allowed);

        let review = serde_json::to_value(response.into_review()).unwrap();
        let message = review["response"]["status"]["message"]
            .as_str()
            .unwrap_or_default()
            .to_string();
        assert!(message.starts_with("[ValidationFailed]"), "{message}");
        assert!(message.contains("spec.bastion.allowedCIDRBlocks[0]"), "{message}");
    }

    #[test]
    fn test_validate_update_denies_region_change() {
        let request = validating_request(review(
            "UPDATE",
            Some(aws_cluster("test-cluster", json!({"region": "us-east-2"}))),
            Some(aws_cluster("test-cluster", json!({"region": "us-east-1"}))),
        ));
        assert!(!validate(&request).allowed);
    }

    #[test]
    fn test_validate_update_allows_endpoint_assignment() {
        let request = validating_request(review(
            "UPDATE",
            Some(aws_cluster(
                "test-cluster",
                json!({"controlPlaneEndpoint": {"host": "example.com", "port": 6443}}),
            )),
            Some(aws_cluster("test-cluster", json!({}))),
        ));
        assert!(validate(&request).allowed);
    }

    #[test]
    fn test_validate_update_without_old_object_denied() {
        let request = validating_request(review(
            "UPDATE",
            Some(aws_cluster("test-cluster", json!({}))),
            None,
        ));
        let response = validate(&request);
        assert!(!response.allowed);

        let review = serde_json::to_value(response.into_review()).unwrap();
        let message = review["response"]["status"]["message"]
            .as_str()
            .unwrap_or_default()
            .to_string();
        assert!(message.starts_with("[InvalidRequest]"), "{message}");
        assert!(message.contains("oldObject"), "{message}");
    }

    #[test]
    fn test_validate_delete_always_allowed() {
        let request = validating_request(review(
            "DELETE",
            None,
            Some(aws_cluster(
                "test-cluster",
                json!({"bastion": {"allowedCIDRBlocks": ["abcdefg"]}}),
            )),
        ));
        assert!(validate(&request).allowed);
    }

    #[test]
    fn test_review_json_validating_round_trip() {
        let body = review(
            "UPDATE",
            Some(aws_cluster("test-cluster", json!({"region": "eu-west-1"}))),
            Some(aws_cluster("test-cluster", json!({"region": "us-east-1"}))),
        )
        .to_string();

        let response = review_json(&body, AdmissionMode::Validating).unwrap();
        assert_eq!(response["kind"], json!("AdmissionReview"));
        assert_eq!(
            response["response"]["uid"],
            json!("705ab4f5-6393-11e8-b7cc-42010a800002")
        );
        assert_eq!(response["response"]["allowed"], json!(false));
    }

    #[test]
    fn test_review_json_mutating() {
        let body = review("CREATE", Some(aws_cluster("test-cluster", json!({}))), None).to_string();

        let response = review_json(&body, AdmissionMode::Mutating).unwrap();
        assert_eq!(response["response"]["allowed"], json!(true));
        assert_eq!(response["response"]["patchType"], json!("JSONPatch"));
    }

    #[test]
    fn test_review_json_rejects_garbage() {
        assert!(review_json("not json", AdmissionMode::Validating).is_err());
    }

    #[test]
    fn test_review_without_request_is_invalid() {
        let body = json!({
            "apiVersion": "admission.k8s.io/v1",
            "kind": "AdmissionReview"
        })
        .to_string();

        let response = review_json(&body, AdmissionMode::Validating).unwrap();
        assert_eq!(response["response"]["allowed"], json!(false));
    }
}
