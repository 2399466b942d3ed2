use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};
use url::Url;

use crate::color::Color;
use crate::fetcher::{DEFAULT_CLIENT_ID, DEFAULT_ENDPOINT, DEFAULT_TOPIC};
use crate::post::DEFAULT_AUTHOR;
use crate::site::PostId;
use crate::theme::{SystemScheme, ThemeName};

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ProgressMode {
    /// Enable progress UI when stderr is a TTY.
    Auto,
    /// Always enable progress UI (even when piped).
    Always,
    /// Never show progress UI.
    Never,
}

#[derive(Debug, Parser)]
#[command(author, version, about)]
pub struct Args {
    /// JSON file holding the saved theme preference.
    #[arg(long, global = true, default_value = "pagekit-prefs.json")]
    pub store: PathBuf,

    /// System color scheme. Detected from `COLORFGBG` when omitted.
    #[arg(long, global = true, value_enum)]
    pub system_scheme: Option<SystemScheme>,

    /// Progress display: `auto`, `always`, or `never`.
    #[arg(long, global = true, value_enum, default_value = "auto")]
    pub progress: ProgressMode,

    /// HTTP User-Agent for remote requests.
    #[arg(long, global = true, default_value = "pagekit/0.1")]
    pub user_agent: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Write the builtin page with every widget.
    Init {
        #[arg(long, default_value = "index.html")]
        out: PathBuf,
    },

    /// Show or change the light/dark theme.
    Theme {
        #[command(subcommand)]
        action: ThemeAction,

        /// Page to apply the presented theme to.
        #[arg(long, global = true)]
        page: Option<PathBuf>,
    },

    /// Check text for disallowed phrases.
    Check(CheckArgs),

    /// Render a QR card and export it as `output.png`.
    Qr(QrArgs),

    /// Replace the page image with a random one from the image API.
    FetchImage(FetchArgs),

    /// Create, regenerate, or delete essay posts.
    Post {
        #[command(subcommand)]
        action: PostAction,

        /// Site root holding `essays/index.html` and `essays/posts/`.
        #[arg(long, global = true, default_value = ".")]
        site: PathBuf,

        /// Author named in post headers; their first name marks sign-offs.
        #[arg(long, global = true, default_value = DEFAULT_AUTHOR)]
        author: String,
    },
}

#[derive(Debug, Clone, Subcommand)]
pub enum PostAction {
    /// Add a post from a text file and list it in the essays index.
    New {
        /// Plain-text source; the file name gives the title.
        source: PathBuf,

        /// Publication date (`YYYY-MM-DD`). Defaults to today.
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Regenerate a post from its `source.txt` and `date.txt`.
    Update { post: PostId },
    /// Delete a post and its index entry.
    Delete {
        post: PostId,

        /// Skip the typed confirmation.
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Debug, Clone, Copy, Subcommand)]
pub enum ThemeAction {
    /// Print the presented theme.
    Show,
    /// Save and present the opposite theme.
    Toggle,
    /// Save and present a theme.
    Set { theme: ThemeName },
    /// Forget the saved theme and follow the system scheme again.
    Clear,
    /// Re-read the system scheme; ignored while a theme is saved.
    Sync,
}

#[derive(Debug, ClapArgs)]
pub struct CheckArgs {
    /// Text to check. Read from the page's input field when omitted.
    pub text: Option<String>,

    /// Page whose input field and status message are updated.
    #[arg(long)]
    pub page: Option<PathBuf>,

    /// Print the phrase patterns and which one matched.
    #[arg(long)]
    pub explain: bool,
}

#[derive(Debug, ClapArgs)]
pub struct QrArgs {
    /// Card title. Read from the page when omitted.
    #[arg(long)]
    pub title: Option<String>,

    /// Card description. Read from the page when omitted.
    #[arg(long)]
    pub description: Option<String>,

    /// Link encoded in the QR code. Read from the page when omitted.
    #[arg(long)]
    pub link: Option<String>,

    /// Background color (`#rrggbb`) of the page and the snapshot.
    #[arg(long)]
    pub background: Option<Color>,

    /// Directory receiving `output.png`.
    #[arg(long, default_value = ".")]
    pub out_dir: PathBuf,

    /// Page to render the card into.
    #[arg(long)]
    pub page: Option<PathBuf>,
}

#[derive(Debug, ClapArgs)]
pub struct FetchArgs {
    /// Search topic.
    #[arg(long, default_value = DEFAULT_TOPIC)]
    pub topic: String,

    /// Random photo endpoint.
    #[arg(long, default_value = DEFAULT_ENDPOINT)]
    pub endpoint: Url,

    /// API access key, sent as `client_id`.
    #[arg(long, default_value = DEFAULT_CLIENT_ID)]
    pub client_id: String,

    /// Page whose image is replaced.
    #[arg(long)]
    pub page: Option<PathBuf>,
}
