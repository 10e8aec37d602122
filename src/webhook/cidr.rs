// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Bastion allow-list validation.
//!
//! Checks run in order and the first failure wins:
//!
//! 1. `disableIngressRules` together with a non-empty `allowedCIDRBlocks` is rejected.
//! 2. Every entry must parse as an IPv4 or IPv6 CIDR block.

use std::net::IpAddr;
use std::str::FromStr;

use ipnet::IpNet;
use tracing::debug;

use crate::crd::Bastion;
use crate::errors::BastionError;

/// Validates the CIDR allow-list of a bastion host.
///
/// # Arguments
///
/// * `bastion` - The bastion configuration to check
///
/// # Returns
///
/// * `Ok(())` - The list is empty, or ingress rules are enabled and every entry parses
/// * `Err(BastionError)` - The first problem found
///
/// # Errors
///
/// Returns [`BastionError::IngressRulesConflict`] when ingress rules are disabled while
/// CIDR blocks are supplied, and [`BastionError::InvalidCidrBlock`] for the first entry
/// that does not parse.
///
/// # Example
///
/// ```rust
/// use capa_admission::crd::Bastion;
/// use capa_admission::webhook::cidr::validate_allowed_cidr_blocks;
///
/// let bastion = Bastion {
///     allowed_cidr_blocks: vec!["192.168.0.0/16".to_string(), "192.168.0.1/32".to_string()],
///     ..Default::default()
/// };
/// assert!(validate_allowed_cidr_blocks(&bastion).is_ok());
/// ```
pub fn validate_allowed_cidr_blocks(bastion: &Bastion) -> Result<(), BastionError> {
    if bastion.disable_ingress_rules && !bastion.allowed_cidr_blocks.is_empty() {
        return Err(BastionError::IngressRulesConflict);
    }

    for (index, cidr) in bastion.allowed_cidr_blocks.iter().enumerate() {
        parse_cidr_block(cidr).map_err(|reason| BastionError::InvalidCidrBlock {
            index,
            cidr: cidr.clone(),
            reason,
        })?;
    }

    debug!(
        count = bastion.allowed_cidr_blocks.len(),
        "Bastion allowedCIDRBlocks are valid"
    );
    Ok(())
}

/// Parses a single CIDR block (address + prefix length).
///
/// Host bits may be set (`192.168.0.1/32` and `10.1.2.3/8` are both accepted); only the
/// address syntax and the prefix length are checked. IPv4 octets with leading zeros
/// (`010.0.0.1`) are ambiguous and rejected.
///
/// # Errors
///
/// Returns a description of the problem when the string is not a CIDR block.
pub fn parse_cidr_block(cidr: &str) -> Result<IpNet, String> {
    let Some((address, prefix)) = cidr.split_once('/') else {
        return Err("missing prefix length".to_string());
    };

    let address = IpAddr::from_str(address).map_err(|e| format!("{e} '{address}'"))?;
    if prefix.is_empty() || !prefix.bytes().all(|b| b.is_ascii_digit()) {
        return Err(format!("invalid prefix length '{prefix}'"));
    }
    let prefix_len = prefix
        .parse::<u8>()
        .map_err(|_| format!("invalid prefix length '{prefix}'"))?;

    IpNet::new(address, prefix_len).map_err(|e| e.to_string())
}

#[cfg(test)]
#[path = "cidr_tests.rs"]
mod cidr_tests;
