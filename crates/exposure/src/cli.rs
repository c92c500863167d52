//! Clap derive structures for the `exposure` CLI.
//!
//! Defines the command tree, global flags, and shared value enums.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// exposure -- command-line client for the exposure-notification backend
#[derive(Debug, Parser)]
#[command(
    name = "exposure",
    version,
    about = "Talk to the exposure-notification backend from the command line",
    long_about = "Fetch configuration, FAQs and key chunks, validate OTPs, upload\n\
        diagnosis data, and send real or dummy operational-info reports.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Config file to use instead of the platform default
    #[arg(long, env = "EXPOSURE_CONFIG_FILE", global = true)]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "EXPOSURE_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Request timeout in seconds (overrides config)
    #[arg(long, global = true)]
    pub timeout: Option<u64>,

    /// Settings service base URL (overrides config)
    #[arg(long, global = true)]
    pub settings_url: Option<String>,

    /// Key distribution base URL (overrides config)
    #[arg(long, global = true)]
    pub keys_url: Option<String>,

    /// Upload service base URL (overrides config)
    #[arg(long, global = true)]
    pub upload_url: Option<String>,

    /// Analytics service base URL (overrides config)
    #[arg(long, global = true)]
    pub analytics_url: Option<String>,
}

// ── Output Enum ──────────────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fetch the app configuration for a build
    Settings {
        /// Build number (defaults to the configured one)
        #[arg(long)]
        build: Option<u32>,
    },

    /// Fetch the FAQ list for a language
    Faq {
        /// Language code: en, it, de (defaults to the configured one)
        #[arg(long, short = 'l')]
        language: Option<String>,

        /// Fetch from this URL instead of the one in the remote configuration
        #[arg(long)]
        url: Option<String>,
    },

    /// Key index and chunk downloads
    Keys(KeysArgs),

    /// One-time code operations
    Otp(OtpArgs),

    /// Upload diagnosis data authorised by an OTP
    Upload {
        /// Previously validated OTP
        #[arg(long)]
        otp: String,

        /// JSON file with the upload body (teks, province, summaries)
        #[arg(long, short = 'f')]
        file: PathBuf,
    },

    /// Operational-info reports
    #[command(alias = "a")]
    Analytics(AnalyticsArgs),

    /// Manage CLI configuration
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Keys ─────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct KeysArgs {
    #[command(subcommand)]
    pub command: KeysCommand,
}

#[derive(Debug, Subcommand)]
pub enum KeysCommand {
    /// Show the published chunk range
    Index,

    /// Download specific chunks, in the order given
    Download {
        /// Chunk numbers
        #[arg(required = true)]
        chunks: Vec<u64>,

        /// Write each chunk to <DIR>/<n>.zip
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Download every chunk newer than --since
    Sync {
        /// Last chunk already downloaded
        #[arg(long)]
        since: Option<u64>,

        /// Write each chunk to <DIR>/<n>.zip
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

// ── OTP ──────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct OtpArgs {
    #[command(subcommand)]
    pub command: OtpCommand,
}

#[derive(Debug, Subcommand)]
pub enum OtpCommand {
    /// Ask the backend to authorise an OTP
    Validate {
        /// The code as shown to the user
        otp: String,
    },
}

// ── Analytics ────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct AnalyticsArgs {
    #[command(subcommand)]
    pub command: AnalyticsCommand,
}

#[derive(Debug, Subcommand)]
pub enum AnalyticsCommand {
    /// Send one report with explicit content
    Send {
        /// Two-letter province code
        #[arg(long)]
        province: String,

        /// Exposure notification authorisation status
        #[arg(long, value_enum, default_value = "authorized")]
        exposure_status: ExposureStatusArg,

        /// Push notification authorisation status
        #[arg(long, value_enum, default_value = "authorized")]
        push_status: PushStatusArg,

        /// A risky exposure was detected in this cycle
        #[arg(long)]
        risky: bool,

        /// Device token, base64
        #[arg(long)]
        token: String,

        /// Mark the report as dummy traffic
        #[arg(long)]
        dummy: bool,
    },

    /// Send randomised dummy reports
    Dummy {
        /// Device token, base64
        #[arg(long)]
        token: String,

        /// Number of reports
        #[arg(long, short = 'n', default_value = "1")]
        count: u32,

        /// Seed the generator for reproducible bodies
        #[arg(long)]
        seed: Option<u64>,

        /// Print the bodies instead of sending them
        #[arg(long)]
        dry_run: bool,
    },

    /// Draw the next dummy delay and sampling decisions from the remote configuration
    Schedule {
        /// Build number (defaults to the configured one)
        #[arg(long)]
        build: Option<u32>,

        /// Seed the draw
        #[arg(long)]
        seed: Option<u64>,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ExposureStatusArg {
    Unknown,
    Restricted,
    NotAuthorized,
    Authorized,
    AuthorizedBluetoothOff,
    AuthorizedInactive,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum PushStatusArg {
    NotDetermined,
    Denied,
    Authorized,
    Provisional,
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Write a default config file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Print the effective configuration
    Show,

    /// Print the config file location
    Path,
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
