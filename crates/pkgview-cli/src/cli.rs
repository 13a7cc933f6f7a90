use clap::{ArgAction, Parser, Subcommand};
use pkgview_config::listing::SortKey;

#[derive(Parser)]
#[command(
    author,
    version,
    about,
    help_template = "{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}",
    arg_required_else_help = true
)]
pub struct Args {
    /// Set output verbosity
    #[arg(short = 'v', long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress outputs
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output as json
    #[arg(short, long, global = true)]
    pub json: bool,

    /// Disable colors in output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Disable progress bars
    #[arg(long, global = true)]
    pub no_progress: bool,

    /// Provide custom config file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List installed applications
    #[clap(name = "list", visible_alias = "ls")]
    List {
        /// Include system applications, overriding the config
        /// (`--system`, `--system=false`)
        #[arg(
            short,
            long,
            num_args = 0..=1,
            require_equals = true,
            default_missing_value = "true"
        )]
        system: Option<bool>,

        /// Ordering of the list: none, name or package
        #[arg(long)]
        sort: Option<SortKey>,

        /// Load on the current thread instead of in the background
        #[arg(long)]
        sync: bool,
    },

    /// Show the available orderings
    #[clap(name = "sort-options")]
    SortOptions,

    /// Print the configuration file to stdout
    Config,

    /// Generate a default config file
    #[clap(name = "defconfig")]
    DefConfig,

    /// View env
    Env,
}
