// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `bastion.rs`

#[cfg(test)]
mod tests {
    use crate::crd::Bastion;
    use crate::webhook::bastion::default_bastion;

    #[test]
    fn test_empty_allow_list_opened_to_all() {
        let mut bastion = Bastion::default();

        assert!(default_bastion(&mut bastion));
        assert_eq!(bastion.allowed_cidr_blocks, vec!["0.0.0.0/0".to_string()]);
    }

    #[test]
    fn test_empty_allow_list_kept_when_ingress_rules_disabled() {
        let mut bastion = Bastion {
            allowed_cidr_blocks: vec![],
            disable_ingress_rules: true,
            enabled: true,
            ..Default::default()
        };
        let before = bastion.clone();

        assert!(!default_bastion(&mut bastion));
        assert_eq!(bastion, before);
    }

    #[test]
    fn test_supplied_allow_list_never_overwritten() {
        let mut bastion = Bastion {
            allowed_cidr_blocks: vec!["10.0.0.0/8".to_string()],
            ..Default::default()
        };

        assert!(!default_bastion(&mut bastion));
        assert_eq!(bastion.allowed_cidr_blocks, vec!["10.0.0.0/8".to_string()]);
    }

    #[test]
    fn test_defaulting_is_idempotent() {
        let mut bastion = Bastion::default();

        default_bastion(&mut bastion);
        let once = bastion.clone();
        assert!(!default_bastion(&mut bastion));
        assert_eq!(bastion, once);
    }
}
