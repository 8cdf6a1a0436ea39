mod bootstrap;
mod cli;
mod output;

use std::{borrow::Cow, path::Path, process};

use clap::Parser;
use splitledger_application::{ExpenseDraft, LedgerService, NewMember};
use splitledger_domain::{MemberId, SplitType, SplitValues, Trip};
use splitledger_infrastructure::{JsonTripStore, SystemClock, UuidIdGenerator};

use crate::{
    bootstrap::{AppConfig, init_logging},
    cli::{AddExpenseArgs, Cli, Command},
};

type CliResult<T> = Result<T, Cow<'static, str>>;

static IDS: UuidIdGenerator = UuidIdGenerator;
static CLOCK: SystemClock = SystemClock;

fn main() {
    let cli = Cli::parse();
    let config = AppConfig::from_env();
    init_logging(&config);

    if let Err(err) = run(cli.command, &config) {
        eprintln!("Error: {err}");
        process::exit(1);
    }
}

fn run(command: Command, config: &AppConfig) -> CliResult<()> {
    tracing::debug!(?command, currency = %config.currency, "running command");
    let service = LedgerService::new(&IDS, &CLOCK, &config.currency);

    match command {
        Command::New {
            file,
            name,
            creator,
        } => {
            if file.exists() {
                return Err(format!("'{}' already exists", file.display()).into());
            }
            let trip = service
                .create_trip(&name, NewMember::named(creator))
                .map_err(to_message)?;
            save(&file, &trip)?;
            println!("Created trip '{}' ({})", trip.name, trip.id);
        }
        Command::AddMember { file, name } => {
            let trip = load(&file)?;
            let trip = service
                .add_member(&trip, NewMember::named(name))
                .map_err(to_message)?;
            save(&file, &trip)?;
            if let Some(member) = trip.members.last() {
                println!("Added {} ({})", member.name, member.id);
            }
        }
        Command::AddExpense(args) => {
            let trip = load(&args.file)?;
            let draft = expense_draft(&trip, &args)?;
            let trip = service.record_expense(&trip, draft).map_err(to_message)?;
            save(&args.file, &trip)?;
            println!("{}", output::format_plan(&service.settlement_plan(&trip), &trip.currency));
        }
        Command::DeleteExpense { file, expense_id } => {
            let trip = load(&file)?;
            let trip = service
                .delete_expense(&trip, &expense_id)
                .map_err(to_message)?;
            save(&file, &trip)?;
            println!("Deleted expense {expense_id}");
        }
        Command::Balances { file } => {
            let trip = load(&file)?;
            println!("{}", output::format_balances(&service.summary(&trip)));
        }
        Command::Plan { file } => {
            let trip = service.recalculate(&load(&file)?);
            println!("{}", output::format_plan(&service.settlement_plan(&trip), &trip.currency));
        }
        Command::Settle { file, index, all } => {
            let trip = service.recalculate(&load(&file)?);
            let trip = match (index, all) {
                (_, true) => service.settle_all(&trip),
                (Some(index), false) => {
                    let plan = service.settlement_plan(&trip);
                    let debt = index
                        .checked_sub(1)
                        .and_then(|idx| plan.get(idx))
                        .ok_or_else(|| {
                            format!("No transfer #{index}; the plan has {}", plan.len())
                        })?;
                    service.settle_debt(&trip, debt).map_err(to_message)?
                }
                (None, false) => return Err("Pass --index <N> or --all".into()),
            };
            save(&file, &trip)?;
            println!("{}", output::format_plan(&service.settlement_plan(&trip), &trip.currency));
        }
        Command::Search { file, query } => {
            let trip = load(&file)?;
            let matches = service.search_expenses(&trip, &query);
            println!("{}", output::format_expenses(&trip, &matches));
        }
    }

    Ok(())
}

fn load(path: &Path) -> CliResult<Trip> {
    JsonTripStore::new(path).load().map_err(to_message)
}

fn save(path: &Path, trip: &Trip) -> CliResult<()> {
    JsonTripStore::new(path).save(trip).map_err(to_message)
}

fn to_message(err: impl std::fmt::Display) -> Cow<'static, str> {
    err.to_string().into()
}

fn expense_draft(trip: &Trip, args: &AddExpenseArgs) -> CliResult<ExpenseDraft> {
    let paid_by = resolve_member(trip, &args.paid_by)?;

    let (split_type, values) = if !args.exact.is_empty() {
        (SplitType::Exact, &args.exact)
    } else if !args.percent.is_empty() {
        (SplitType::Percent, &args.percent)
    } else {
        let split_among = if args.split_among.is_empty() {
            trip.members.iter().map(|member| member.id.clone()).collect()
        } else {
            args.split_among
                .iter()
                .map(|member| resolve_member(trip, member))
                .collect::<CliResult<Vec<_>>>()?
        };
        return Ok(ExpenseDraft::equal(&args.title, args.amount, paid_by, split_among));
    };

    let mut split_values = SplitValues::default();
    for (member, value) in values {
        let id = resolve_member(trip, member)?;
        if split_values.insert(id.clone(), *value).is_some() {
            return Err(format!("Member {id} is listed more than once ('{member}')").into());
        }
    }
    let draft = ExpenseDraft::exact(&args.title, args.amount, paid_by, split_values);
    Ok(ExpenseDraft { split_type, ..draft })
}

/// Accepts a member id, or a name that matches exactly one member.
fn resolve_member(trip: &Trip, reference: &str) -> CliResult<MemberId> {
    let reference = reference.trim();
    if let Some(member) = trip.members.iter().find(|member| member.id.as_str() == reference) {
        return Ok(member.id.clone());
    }

    let mut by_name = trip
        .members
        .iter()
        .filter(|member| member.name.eq_ignore_ascii_case(reference));
    match (by_name.next(), by_name.next()) {
        (Some(member), None) => Ok(member.id.clone()),
        (Some(_), Some(_)) => {
            Err(format!("'{reference}' matches several members; use the member id").into())
        }
        (None, _) => Err(format!("No member '{reference}' in trip '{}'", trip.name).into()),
    }
}
