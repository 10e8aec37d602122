// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! CNI ingress rule defaulting.
//!
//! Each supported CNI plugin has a canonical, ordered set of security group rules that the
//! control plane and nodes need between each other. The rule sets live in a table keyed by
//! plugin; supporting a new plugin means adding a table entry.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::LazyLock;

use tracing::debug;

use crate::constants::{ALL_PORTS, CALICO_BGP_PORT, MAX_PORT};
use crate::crd::{CNIIngressRule, NetworkSpec, SecurityGroupProtocol};

/// CNI plugin whose ingress rules are applied by default.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CniPlugin {
    /// Calico, the plugin assumed when no other selection was made.
    #[default]
    Calico,
}

impl CniPlugin {
    /// Lowercase plugin name used in rule descriptions.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Calico => "calico",
        }
    }
}

impl fmt::Display for CniPlugin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Canonical ingress rules per CNI plugin, in the order they must be applied.
static CNI_INGRESS_RULES: LazyLock<BTreeMap<CniPlugin, Vec<CNIIngressRule>>> =
    LazyLock::new(|| {
        let calico = CniPlugin::Calico;
        BTreeMap::from([(
            calico,
            vec![
                CNIIngressRule {
                    description: format!("bgp ({calico})"),
                    protocol: SecurityGroupProtocol::TCP,
                    from_port: CALICO_BGP_PORT,
                    to_port: CALICO_BGP_PORT,
                },
                CNIIngressRule {
                    description: format!("IP-in-IP ({calico})"),
                    protocol: SecurityGroupProtocol::IPinIP,
                    from_port: ALL_PORTS,
                    to_port: MAX_PORT,
                },
            ],
        )])
    });

/// Returns the canonical ingress rules of `plugin`.
///
/// An unknown plugin yields an empty list.
#[must_use]
pub fn canonical_ingress_rules(plugin: CniPlugin) -> Vec<CNIIngressRule> {
    CNI_INGRESS_RULES.get(&plugin).cloned().unwrap_or_default()
}

/// Fills in CNI ingress rules for the default plugin.
///
/// See [`default_cni_ingress_rules_for`].
pub fn default_cni_ingress_rules(network: &mut NetworkSpec) -> bool {
    default_cni_ingress_rules_for(network, CniPlugin::default())
}

/// Fills in the canonical ingress rules of `plugin` when the CNI section is present but
/// has no rules.
///
/// Nothing happens when `network.cni` is `None` or when rules were already supplied;
/// supplied rules are never merged with or replaced by the defaults.
///
/// # Returns
///
/// `true` if rules were added.
///
/// # Example
///
/// ```rust
/// use capa_admission::crd::{CNISpec, NetworkSpec};
/// use capa_admission::webhook::cni::{default_cni_ingress_rules_for, CniPlugin};
///
/// let mut network = NetworkSpec { cni: Some(CNISpec::default()) };
/// assert!(default_cni_ingress_rules_for(&mut network, CniPlugin::Calico));
/// assert_eq!(network.cni.unwrap().cni_ingress_rules[0].description, "bgp (calico)");
/// ```
pub fn default_cni_ingress_rules_for(network: &mut NetworkSpec, plugin: CniPlugin) -> bool {
    let Some(cni) = network.cni.as_mut() else {
        return false;
    };

    if !cni.cni_ingress_rules.is_empty() {
        debug!(
            count = cni.cni_ingress_rules.len(),
            "CNI ingress rules supplied, keeping them"
        );
        return false;
    }

    cni.cni_ingress_rules = canonical_ingress_rules(plugin);
    debug!(%plugin, count = cni.cni_ingress_rules.len(), "Defaulted CNI ingress rules");
    !cni.cni_ingress_rules.is_empty()
}

#[cfg(test)]
#[path = "cni_tests.rs"]
mod cni_tests;
