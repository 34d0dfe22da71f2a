//! Command-line arguments.

use clap::{Parser, ValueEnum};

/// Log output format for the tracing subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TracingFormat {
    /// Human-readable, colorized output for local development.
    Pretty,
    /// Newline-delimited JSON for log aggregation.
    Json,
}

#[derive(Debug, Parser)]
#[command(name = "jewgo-gateway", version, about = "Caching gateway for the JewGo listings API")]
pub struct Args {
    /// Tracing output format.
    #[arg(long, value_enum, default_value = "pretty")]
    pub tracing: TracingFormat,
}
