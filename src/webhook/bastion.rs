// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Bastion allow-list defaulting.

use tracing::debug;

use crate::constants::DEFAULT_BASTION_ALLOWED_CIDR_BLOCK;
use crate::crd::Bastion;

/// Opens bastion ingress to any source when no allow-list was given.
///
/// When `disable_ingress_rules` is set an empty list is the intended state and is left
/// alone. A non-empty list supplied by the caller is never replaced.
///
/// # Returns
///
/// `true` if the allow-list was defaulted.
pub fn default_bastion(bastion: &mut Bastion) -> bool {
    if bastion.disable_ingress_rules || !bastion.allowed_cidr_blocks.is_empty() {
        return false;
    }

    bastion.allowed_cidr_blocks = vec![DEFAULT_BASTION_ALLOWED_CIDR_BLOCK.to_string()];
    debug!(
        cidr = DEFAULT_BASTION_ALLOWED_CIDR_BLOCK,
        "Defaulted bastion allowedCIDRBlocks"
    );
    true
}

#[cfg(test)]
#[path = "bastion_tests.rs"]
mod bastion_tests;
