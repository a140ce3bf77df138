//! CLI for RAG Arena
//!
//! Subcommands:
//! - `serve`: run the comparison API server
//! - `validate`: check the configuration and list the architectures

pub mod serve;
pub mod validate;

use clap::{Parser, Subcommand};

/// RAG Arena - compare LLM architectures over a shared document
#[derive(Parser)]
#[command(name = "rag-arena")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the comparison API server
    Serve,

    /// Validate the configuration and print the configured architectures
    Validate,
}
