//! Command-line arguments.

use std::path::PathBuf;

use clap::{ArgGroup, Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "contract-fill", version)]
#[command(about = "Collect and validate contract fields over several rounds, then fill the template")]
pub struct Cli {
    /// Path to the configuration file
    #[arg(long, env = "CONTRACT_FILL_CONFIG", default_value = "contract-fill.toml", global = true)]
    pub config: PathBuf,

    /// Log filter used when RUST_LOG is not set (error, warn, info, debug, trace)
    #[arg(long, env = "CONTRACT_FILL_LOG", default_value = "warn", global = true)]
    pub log_level: String,

    /// Directory holding the .docx templates (overrides the config file)
    #[arg(long, env = "CONTRACT_FILL_TEMPLATES", global = true)]
    pub templates_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List the supported contract types
    Types,

    /// Create a state file for a new contract
    Init(InitArgs),

    /// Set, skip or review field values
    Update(UpdateArgs),

    /// Fill the template once every field is resolved
    Generate(GenerateArgs),
}

#[derive(Debug, Args)]
#[command(group(ArgGroup::new("target").required(true).args(["contract_type", "intent"])))]
pub struct InitArgs {
    /// State file to create
    #[arg(long)]
    pub state: PathBuf,

    /// Contract type code, e.g. tigong
    #[arg(long = "type", value_name = "CODE")]
    pub contract_type: Option<String>,

    /// Free-text description of the wanted contract
    #[arg(long, value_name = "TEXT")]
    pub intent: Option<String>,

    /// Overwrite an existing state file
    #[arg(long)]
    pub force: bool,
}

#[derive(Debug, Args)]
pub struct UpdateArgs {
    /// State file to update
    #[arg(long)]
    pub state: PathBuf,

    /// Field to set
    #[arg(long, requires = "value", value_name = "NAME")]
    pub field: Option<String>,

    /// Value for --field
    #[arg(long, requires = "field", allow_hyphen_values = true)]
    pub value: Option<String>,

    /// JSON object of field -> value, applied in order
    #[arg(long, value_name = "OBJECT")]
    pub json: Option<String>,

    /// Mark a field as explicitly skipped (repeatable)
    #[arg(long, value_name = "NAME")]
    pub skip: Vec<String>,

    /// Print progress and the values collected so far
    #[arg(long)]
    pub show: bool,
}

#[derive(Debug, Args)]
#[command(group(ArgGroup::new("mode").required(true).args(["output", "check"])))]
pub struct GenerateArgs {
    /// State file to generate from
    #[arg(long)]
    pub state: PathBuf,

    /// Where to write the filled document
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Only run the completeness check
    #[arg(long)]
    pub check: bool,

    /// Template to use instead of the contract type's own
    #[arg(long)]
    pub template: Option<PathBuf>,
}
