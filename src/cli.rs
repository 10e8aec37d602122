// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Command-line driver for offline defaulting and validation.
//!
//! Manifests are read as YAML (JSON is accepted too) and every command returns the text
//! to print on stdout. Rejections are returned as errors so the binary exits non-zero.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use kube::ResourceExt;
use tracing::{debug, info};

use crate::admission::{review_json, AdmissionMode};
use crate::crd::AWSCluster;
use crate::metrics::gather_metrics;
use crate::webhook::{Defaulter, Validator};

/// Admission defaulting and validation for AWSCluster resources
#[derive(Parser, Debug)]
#[command(name = "capa-admission")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Print Prometheus metrics after the command
    #[arg(long, global = true)]
    pub metrics: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Apply defaults to a manifest and print the result as YAML
    Default(DefaultArgs),
    /// Validate a manifest, or an update when --old is given
    Validate(ValidateArgs),
    /// Answer an AdmissionReview document
    Review(ReviewArgs),
}

#[derive(Args, Debug)]
pub struct DefaultArgs {
    /// AWSCluster manifest
    #[arg(short, long)]
    pub file: PathBuf,
}

#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// AWSCluster manifest to validate
    #[arg(short, long)]
    pub file: PathBuf,

    /// Previously persisted manifest; validates an update instead of a create
    #[arg(long)]
    pub old: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct ReviewArgs {
    /// AdmissionReview JSON document
    #[arg(short, long)]
    pub file: PathBuf,

    /// Answer as the mutating webhook instead of the validating one
    #[arg(long)]
    pub mutating: bool,
}

impl Cli {
    /// Run the command and return its output.
    ///
    /// # Errors
    ///
    /// Returns an error if an input cannot be read or parsed, or if validation rejects
    /// the manifest.
    pub fn run(self) -> Result<String> {
        let mut output = match self.command {
            Commands::Default(args) => run_default(&args)?,
            Commands::Validate(args) => run_validate(&args)?,
            Commands::Review(args) => run_review(&args)?,
        };

        if self.metrics {
            output.push('\n');
            output.push_str(&gather_metrics().context("Failed to encode metrics")?);
        }
        Ok(output)
    }
}

/// Reads an `AWSCluster` manifest from disk.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not an `AWSCluster`.
pub fn read_cluster(path: &Path) -> Result<AWSCluster> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read manifest {}", path.display()))?;
    serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse AWSCluster from {}", path.display()))
}

fn run_default(args: &DefaultArgs) -> Result<String> {
    let mut cluster = read_cluster(&args.file)?;
    cluster.default_resource();
    debug!(name = %cluster.name_any(), "Defaulted manifest");
    serde_yaml::to_string(&cluster).context("Failed to serialize defaulted manifest")
}

fn run_validate(args: &ValidateArgs) -> Result<String> {
    let cluster = read_cluster(&args.file)?;

    match &args.old {
        Some(old) => {
            let old = read_cluster(old)?;
            cluster.validate_update(&old)?;
        }
        None => cluster.validate_create()?,
    }

    info!(name = %cluster.name_any(), "Manifest is valid");
    Ok(format!("AWSCluster \"{}\" is valid\n", cluster.name_any()))
}

fn run_review(args: &ReviewArgs) -> Result<String> {
    let body = fs::read_to_string(&args.file)
        .with_context(|| format!("Failed to read review {}", args.file.display()))?;
    let mode = if args.mutating {
        AdmissionMode::Mutating
    } else {
        AdmissionMode::Validating
    };

    let response = review_json(&body, mode)
        .with_context(|| format!("Failed to answer review {}", args.file.display()))?;
    let mut output =
        serde_json::to_string_pretty(&response).context("Failed to serialize response")?;
    output.push('\n');
    Ok(output)
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod cli_tests;
