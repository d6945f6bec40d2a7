use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[clap(author, version, about = "Requirement change-impact analysis and test-script validation")]
pub struct Cli {
    /// Project name to use from the central registry
    #[clap(long, short = 'p')]
    pub project: Option<String>,

    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Analyze a new requirement set against the stored baseline
    Analyze {
        /// Path to the raw URS text file
        #[clap(long)]
        urs: PathBuf,

        /// Path to the extracted test steps (JSON or YAML)
        #[clap(long)]
        steps: PathBuf,

        /// Print the full report as JSON instead of a summary
        #[clap(long)]
        json: bool,

        /// Directory to write markdown and JSON exports into
        #[clap(long)]
        out: Option<PathBuf>,
    },

    /// Extract test steps from a URS document using the AI service
    Extract {
        /// Path to the raw URS text file
        #[clap(long)]
        urs: PathBuf,

        /// Where to write the extracted steps JSON (stdout if omitted)
        #[clap(long)]
        out: Option<PathBuf>,
    },

    /// Run the AI quality analysis over a URS document
    Quality {
        /// Path to the raw URS text file
        #[clap(long)]
        urs: PathBuf,

        /// Print the full report as JSON instead of a summary
        #[clap(long)]
        json: bool,
    },

    /// Generate the requirements traceability matrix
    Rtm {
        /// Path to the extracted test steps (JSON or YAML)
        #[clap(long)]
        steps: PathBuf,

        /// Where to write the markdown matrix (stdout if omitted)
        #[clap(long)]
        out: Option<PathBuf>,
    },

    /// Inspect or clear stored baselines
    #[clap(subcommand)]
    Baseline(BaselineCommand),

    /// Manage the central project registry
    #[clap(subcommand)]
    Project(ProjectCommand),
}

#[derive(Subcommand, Debug)]
pub enum BaselineCommand {
    /// List project keys that have a stored baseline
    List,

    /// Show the stored baseline for the current project
    Show,

    /// Delete the stored baseline for the current project
    Clear {
        /// Skip the confirmation requirement
        #[clap(long)]
        yes: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum ProjectCommand {
    /// Register a project in the registry
    Register {
        /// Name of the project
        name: String,

        /// Baselines directory (yaml) or database file (sqlite)
        #[clap(long)]
        path: PathBuf,

        /// Description of the project
        #[clap(long, default_value = "")]
        description: String,

        /// Baseline backend to use
        #[clap(long, default_value = "yaml")]
        backend: String,

        /// Set this project as the default
        #[clap(long)]
        default: bool,
    },

    /// List registered projects
    List,

    /// Set the default project
    Default {
        /// The project to make default
        name: String,
    },
}
