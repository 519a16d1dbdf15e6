//! CLI argument parsing

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(name = "hdrkit")]
#[command(version, about = "Decode and encode Ethernet, ICMP and pflog headers", long_about = None)]
pub struct Cli {
    /// Verbose output (-v, -vv, -vvv for increasing verbosity)
    #[arg(short = 'v', long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

/// Where to read raw bytes from
#[derive(Args, Debug, Clone)]
#[group(required = true, multiple = false)]
pub struct Input {
    /// Bytes as a hex string (whitespace and ':' are ignored)
    #[arg(short = 'x', long, value_name = "HEX")]
    pub hex: Option<String>,

    /// File holding the raw bytes
    #[arg(short, long, value_name = "PATH")]
    pub file: Option<PathBuf>,
}

/// Header layouts the decoder can start from
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerKind {
    Ethernet,
    Icmp,
    Pflog,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Decode a buffer as the given header
    Decode {
        /// Outermost header in the buffer
        #[arg(value_enum)]
        layer: LayerKind,

        #[command(flatten)]
        input: Input,
    },

    /// Decode a buffer using a capture link-layer type (1 = Ethernet, 117 = pflog)
    Link {
        /// DLT value of the capture
        #[arg(short, long)]
        dlt: u32,

        #[command(flatten)]
        input: Input,
    },

    /// Print the Internet checksum of a buffer
    Checksum {
        #[command(flatten)]
        input: Input,
    },

    /// Encode an ICMP echo request and print it as hex
    Echo {
        /// Echo identifier
        #[arg(long, default_value = "0")]
        id: u16,

        /// Echo sequence number
        #[arg(long, default_value = "0")]
        seq: u16,

        /// Echo data as a hex string
        #[arg(long, value_name = "HEX")]
        data: Option<String>,
    },
}

impl Cli {
    /// Parse command-line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Log filter matching the requested verbosity
    pub fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}
