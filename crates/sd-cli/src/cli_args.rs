use clap::{ArgGroup, Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "scriptdesc")]
#[command(about = "Describe item bonus scripts in plain text")]
pub(crate) struct Cli {
    #[command(subcommand)]
    pub(crate) command: Mode,
}

#[derive(Debug, Subcommand)]
pub(crate) enum Mode {
    /// Compile scripts into descriptions against a game database.
    Describe(DescribeArgs),
    /// Print the parsed syntax tree of a script as JSON.
    Ast(AstArgs),
}

#[derive(Debug, Args)]
#[command(group(
    ArgGroup::new("source")
        .required(true)
        .args(["script", "script_file", "items"])
))]
pub(crate) struct DescribeArgs {
    /// Database JSON file, or a directory of JSON files.
    #[arg(long = "db")]
    pub(crate) db: String,
    #[arg(long = "script")]
    pub(crate) script: Option<String>,
    #[arg(long = "script-file")]
    pub(crate) script_file: Option<String>,
    /// Compile the script of every item in the database.
    #[arg(long = "items")]
    pub(crate) items: bool,
    /// Print the branch condition after each line.
    #[arg(long = "conditions")]
    pub(crate) conditions: bool,
}

#[derive(Debug, Args)]
#[command(group(
    ArgGroup::new("source")
        .required(true)
        .args(["script", "script_file"])
))]
pub(crate) struct AstArgs {
    #[arg(long = "script")]
    pub(crate) script: Option<String>,
    #[arg(long = "script-file")]
    pub(crate) script_file: Option<String>,
}
