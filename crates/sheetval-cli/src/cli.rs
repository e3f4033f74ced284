//! Command line definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "sheetval",
    version,
    about = "Validate spreadsheets and CSV files against JSON rule files",
    long_about = "Validate the rows of a spreadsheet or CSV file against a JSON rules file.\n\n\
                  Rules cover single columns, groups of columns, conditions between\n\
                  columns and cross-column checks such as sums, dates and uniqueness."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format.
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Validate one sheet of a file against a rules file.
    Validate(ValidateArgs),

    /// List the sheets of a workbook.
    Sheets {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// Manage a rules file.
    Rules(RulesArgs),
}

#[derive(Args)]
pub struct ValidateArgs {
    /// Spreadsheet (xlsx, xlsm, xlsb, xls, ods) or delimited text file.
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Rules file.
    #[arg(long, short = 'r', value_name = "RULES", default_value = "rules.json")]
    pub rules: PathBuf,

    /// Sheet to validate (default: the first sheet).
    #[arg(long, value_name = "NAME")]
    pub sheet: Option<String>,

    /// Delimiter of a text input (default: sniffed from the first line).
    #[arg(long, value_name = "CHAR")]
    pub delimiter: Option<char>,

    /// Column whose value prefixes error labels (overrides the rules file).
    #[arg(long = "reference-column", value_name = "COLUMN")]
    pub reference_column: Option<String>,

    /// Write the error table as CSV.
    #[arg(long = "errors-csv", value_name = "PATH")]
    pub errors_csv: Option<PathBuf>,

    /// Field separator of the error table.
    #[arg(long, value_name = "CHAR", default_value_t = ';')]
    pub separator: char,

    /// Write a highlighted xlsx copy. Without a value, or with a directory,
    /// the file is named errors_<timestamp>_<name>.xlsx.
    #[arg(long, value_name = "PATH", num_args = 0..=1)]
    pub annotated: Option<Option<PathBuf>>,

    /// Write a JSON report with summary, errors and source fingerprint.
    #[arg(long = "report-json", value_name = "PATH")]
    pub report_json: Option<PathBuf>,

    /// Print at most this many errors (0 prints none).
    #[arg(long = "max-errors", value_name = "N", default_value_t = 50)]
    pub max_errors: usize,
}

#[derive(Args)]
pub struct RulesArgs {
    /// Rules file; created empty when missing.
    #[arg(long, short = 'r', value_name = "RULES", default_value = "rules.json", global = true)]
    pub file: PathBuf,

    #[command(subcommand)]
    pub command: RulesCommand,
}

#[derive(Subcommand)]
pub enum RulesCommand {
    /// Show every rule.
    List,

    /// Show rule counts and document metadata.
    Stats,

    /// Show the rule kinds with their parameters.
    Kinds,

    /// Add a rule on one column.
    AddSimple {
        #[arg(long, value_name = "COLUMN")]
        column: String,
        #[arg(long = "type", value_name = "KIND")]
        rule_type: String,
        /// Rule parameter as key=value (repeatable).
        #[arg(long = "param", value_name = "KEY=VALUE")]
        params: Vec<String>,
        #[arg(long, default_value = "")]
        message: String,
    },

    /// Add one rule applied to each of several columns.
    AddMultiSimple {
        /// Columns as A,B,C (repeatable).
        #[arg(long = "columns", value_name = "COLUMNS", required = true)]
        columns: Vec<String>,
        #[arg(long = "type", value_name = "KIND")]
        rule_type: String,
        #[arg(long = "param", value_name = "KEY=VALUE")]
        params: Vec<String>,
        #[arg(long, default_value = "")]
        message: String,
    },

    /// Add a rule whose actions apply when its conditions hold.
    AddConditional {
        /// COLUMN:OPERATOR[:VALUE] (repeatable).
        #[arg(long = "condition", value_name = "CONDITION", required = true)]
        conditions: Vec<String>,
        /// COLUMN:KIND[:{json params}] (repeatable).
        #[arg(long = "action", value_name = "ACTION", required = true)]
        actions: Vec<String>,
        #[arg(long, value_enum, default_value = "and")]
        logic: LogicArg,
        #[arg(long, default_value = "")]
        message: String,
    },

    /// Add a check across several columns of a row.
    AddMulticolumn {
        #[arg(long = "columns", value_name = "COLUMNS", required = true)]
        columns: Vec<String>,
        #[arg(long = "type", value_name = "KIND")]
        rule_type: String,
        #[arg(long = "param", value_name = "KEY=VALUE")]
        params: Vec<String>,
        #[arg(long, default_value = "")]
        message: String,
    },

    /// Switch a rule between active and inactive.
    Toggle {
        #[arg(value_name = "ID")]
        id: String,
    },

    /// Remove a rule.
    Delete {
        #[arg(value_name = "ID")]
        id: String,
    },

    /// Merge the rules of another file, keeping existing ids.
    Import {
        #[arg(value_name = "PATH")]
        source: PathBuf,
    },

    /// Copy the rules file to another path.
    Export {
        #[arg(value_name = "PATH")]
        target: PathBuf,
    },
}

#[derive(Clone, Copy, ValueEnum)]
pub enum LogicArg {
    And,
    Or,
}

impl LogicArg {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::And => "AND",
            Self::Or => "OR",
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
