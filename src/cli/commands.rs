use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "postit")]
#[command(version, about = "Sticky notes on a local board")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Log debug output to stderr (RUST_LOG overrides)
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize a new board in the current directory
    Init,

    /// Add a new note
    Add {
        /// Note text (defaults to the configured placeholder)
        text: Option<String>,

        /// Read text from stdin
        #[arg(long, conflicts_with = "text")]
        stdin: bool,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List notes in board order
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show a single note
    Get {
        /// Note ID (full id or unique prefix)
        id: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Move a note to new coordinates
    Move {
        /// Note ID (full id or unique prefix)
        id: String,

        #[arg(allow_negative_numbers = true)]
        x: f32,

        #[arg(allow_negative_numbers = true)]
        y: f32,
    },

    /// Replace the text of a note
    Edit {
        /// Note ID (full id or unique prefix)
        id: String,

        /// New text
        #[arg(required_unless_present = "stdin")]
        text: Option<String>,

        /// Read text from stdin
        #[arg(long, conflicts_with = "text")]
        stdin: bool,
    },

    /// Change the color of a note (#AARRGGBB, #RRGGBB, 0x... or decimal)
    Color {
        /// Note ID (full id or unique prefix)
        id: String,

        color: String,
    },

    /// Delete a note
    Delete {
        /// Note ID (full id or unique prefix)
        id: String,

        /// Skip confirmation
        #[arg(long, short = 'f')]
        force: bool,
    },

    /// Show or change the board background
    Background(BackgroundCommand),

    /// Print the quick-access notice for this board
    Status,
}

#[derive(Args, Debug)]
pub struct BackgroundCommand {
    #[command(subcommand)]
    pub action: BackgroundAction,
}

#[derive(Subcommand, Debug)]
pub enum BackgroundAction {
    /// Use a solid color
    Color {
        /// Color value, or a preset name (white, gray, cornsilk, azure, beige,
        /// floral, honeydew, lavender)
        color: String,
    },

    /// Use an image
    Image {
        /// Image URI
        uri: String,
    },

    /// Print the current background
    Show {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}
