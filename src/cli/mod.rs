// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod vin;

use anyhow::Result;
use clap::{Parser, Subcommand};

/// Fabstir VIN Node CLI
#[derive(Parser, Debug)]
#[command(name = "fabstir-vin-cli")]
#[command(version = crate::version::VERSION_NUMBER)]
#[command(about = "CLI tools for VIN validation and extraction", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Check VIN format (length and character set)
    Validate(vin::ValidateArgs),

    /// Locate the VIN region in an image
    Detect(vin::DetectArgs),

    /// Detect, read and validate a VIN from an image
    Extract(vin::ExtractArgs),
}

/// Execute CLI command
pub async fn execute(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Validate(args) => vin::validate(args).await,
        Commands::Detect(args) => vin::detect(args).await,
        Commands::Extract(args) => vin::extract(args).await,
    }
}
