use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "splitledger", version, about = "Shared trip expenses and settlements")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Start a new trip file with its creator as the first member
    New {
        file: PathBuf,
        name: String,
        creator: String,
    },
    /// Add a member to the trip
    AddMember { file: PathBuf, name: String },
    /// Record an expense
    AddExpense(AddExpenseArgs),
    /// Remove an expense by id
    DeleteExpense { file: PathBuf, expense_id: String },
    /// Recalculate and print member balances
    Balances { file: PathBuf },
    /// Print the transfers that settle the trip
    Plan { file: PathBuf },
    /// Record transfers from the plan as paid
    Settle {
        file: PathBuf,
        /// Settle only the transfer at this position of `plan` (1-based)
        #[arg(long, conflicts_with = "all")]
        index: Option<usize>,
        #[arg(long)]
        all: bool,
    },
    /// List expenses whose title or payer matches
    Search { file: PathBuf, query: String },
}

#[derive(Debug, Args)]
pub struct AddExpenseArgs {
    pub file: PathBuf,
    #[arg(long)]
    pub title: String,
    #[arg(long)]
    pub amount: f64,
    /// Member id or unique name
    #[arg(long)]
    pub paid_by: String,
    /// Members sharing equally (ids or unique names); everyone when omitted
    #[arg(long, value_delimiter = ',', conflicts_with_all = ["exact", "percent"])]
    pub split_among: Vec<String>,
    /// Exact amounts as MEMBER=AMOUNT
    #[arg(long, value_parser = parse_split_value, conflicts_with = "percent")]
    pub exact: Vec<(String, f64)>,
    /// Percentages as MEMBER=PERCENT
    #[arg(long, value_parser = parse_split_value)]
    pub percent: Vec<(String, f64)>,
}

pub fn parse_split_value(raw: &str) -> Result<(String, f64), String> {
    let (member, value) = raw
        .rsplit_once('=')
        .ok_or_else(|| format!("expected MEMBER=VALUE, got '{raw}'"))?;
    let member = member.trim();
    if member.is_empty() {
        return Err(format!("missing member in '{raw}'"));
    }
    let value: f64 = value
        .trim()
        .parse()
        .map_err(|err| format!("invalid value in '{raw}': {err}"))?;
    Ok((member.to_owned(), value))
}
