use clap::{ArgAction, Parser, Subcommand, ValueHint};

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

    /// Provide custom config file
    #[arg(short, long, global = true, value_hint = ValueHint::FilePath)]
    pub config: Option<String>,

    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate default config
    #[clap(name = "defconfig")]
    DefConfig,

    /// Print the effective configuration
    Config,

    /// List supported filter operators
    #[clap(name = "operators", visible_alias = "ops")]
    Operators,

    /// Apply filters to a table query and print the resulting SQL
    #[command(arg_required_else_help = true)]
    Query {
        /// Table to select from
        #[arg(required = true)]
        table: String,

        /// Request parameters as a URL query string, e.g. 'name=jo&age[]=18&age[]=30'
        #[arg(required = false)]
        request: Option<String>,

        /// Filter to declare, as KEY=OPERATOR (repeatable)
        #[arg(short, long = "filter", value_name = "KEY=OPERATOR")]
        filters: Vec<String>,

        /// Custom filter matching KEY against COLUMN, also used when ordering by KEY
        #[arg(long, value_name = "KEY=COLUMN")]
        custom_order: Vec<String>,

        /// SQLite database to count matching rows in
        #[arg(long, value_hint = ValueHint::FilePath)]
        db: Option<String>,

        /// Limit the number of rows
        #[arg(required = false, long)]
        limit: Option<u32>,

        /// Skip this many rows
        #[arg(required = false, long)]
        offset: Option<u32>,
    },
}
