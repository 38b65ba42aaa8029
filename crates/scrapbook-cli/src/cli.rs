use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use scrapbook_core::{SortKey, SortOrder};

#[derive(Parser)]
#[command(name = "scrapbook")]
#[command(about = "Photo memories with stories, from the terminal")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Backend API base URL (overrides SCRAPBOOK_API_URL and the profile)
    #[arg(long, global = true, value_name = "URL")]
    pub api_url: Option<String>,

    /// CLI profile name
    #[arg(long, global = true, value_name = "NAME")]
    pub profile: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List entries
    #[command(alias = "ls")]
    List {
        /// Search text matched against title and story
        #[arg(long)]
        search: Option<String>,
        /// Earliest date (YYYY-MM-DD)
        #[arg(long, value_name = "DATE")]
        from: Option<String>,
        /// Latest date (YYYY-MM-DD)
        #[arg(long, value_name = "DATE")]
        to: Option<String>,
        /// Sort field
        #[arg(long, value_enum)]
        sort: Option<SortField>,
        /// Sort direction
        #[arg(long, value_enum, requires = "sort")]
        order: Option<SortDirection>,
        /// Only favorite entries
        #[arg(long)]
        favorites: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show an entry's story page
    Show {
        id: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Create a new entry
    #[command(alias = "new")]
    Add {
        #[arg(long)]
        title: String,
        /// Entry date (YYYY-MM-DD)
        #[arg(long, value_name = "DATE")]
        date: String,
        /// Image file to attach
        #[arg(long, value_name = "PATH")]
        image: PathBuf,
        /// Story text (read from stdin or $EDITOR when omitted)
        #[arg(long)]
        story: Option<String>,
    },
    /// Edit an existing entry
    Edit {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long, value_name = "DATE")]
        date: Option<String>,
        #[arg(long)]
        story: Option<String>,
        /// Replace the image
        #[arg(long, value_name = "PATH")]
        image: Option<PathBuf>,
    },
    /// Move an entry to the trash
    Delete {
        id: String,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Toggle an entry's favorite flag
    #[command(alias = "fav")]
    Favorite { id: String },
    /// Manage deleted entries
    Trash {
        #[command(subcommand)]
        command: TrashCommands,
    },
    /// Upload an image without creating an entry
    Upload { path: PathBuf },
    /// Export entries
    Export {
        /// Export format
        #[arg(long, value_enum, default_value_t = ExportFormat::Json)]
        format: ExportFormat,
        /// Optional output path (stdout when omitted)
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
        /// Export the trash instead of the entries
        #[arg(long)]
        deleted: bool,
    },
    /// Generate shell completion scripts
    Completions {
        /// Target shell
        #[arg(value_enum)]
        shell: CompletionShell,
        /// Optional output path (stdout when omitted)
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
    },
    /// Configure CLI profiles
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
    /// Interactive session
    Browse,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum SortField {
    Date,
    Title,
}

impl From<SortField> for SortKey {
    fn from(value: SortField) -> Self {
        match value {
            SortField::Date => Self::Date,
            SortField::Title => Self::Title,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl From<SortDirection> for SortOrder {
    fn from(value: SortDirection) -> Self {
        match value {
            SortDirection::Asc => Self::Asc,
            SortDirection::Desc => Self::Desc,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum ExportFormat {
    Json,
    Markdown,
}

impl From<ExportFormat> for scrapbook_core::export::ExportFormat {
    fn from(value: ExportFormat) -> Self {
        match value {
            ExportFormat::Json => Self::Json,
            ExportFormat::Markdown => Self::Markdown,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum CompletionShell {
    Bash,
    Zsh,
    Fish,
}

#[derive(Subcommand)]
pub enum TrashCommands {
    /// List deleted entries
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Restore a deleted entry by its trash id
    Restore { id: String },
    /// Permanently delete a trash record
    Purge {
        id: String,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Initialize or update profile config
    Init {
        /// Profile name to initialize
        #[arg(long, value_name = "NAME")]
        profile: Option<String>,
        /// Backend API base URL for the profile
        #[arg(long, value_name = "URL")]
        api_url: Option<String>,
        /// Keep current active profile instead of activating this one
        #[arg(long)]
        no_activate: bool,
    },
    /// Show the resolved configuration
    Show,
}
