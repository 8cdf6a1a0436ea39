use std::fmt::Write;

use splitledger_application::TripSummary;
use splitledger_domain::{Debt, Expense, Trip};

pub fn format_balances(summary: &TripSummary) -> String {
    let width = summary
        .balances
        .iter()
        .map(|member| member.name.chars().count())
        .max()
        .unwrap_or(0)
        .max("Member".len());

    let mut out = String::new();
    let _ = writeln!(out, "{:<width$}  {:>12}  {:>12}", "Member", "Paid", "Balance");
    for member in &summary.balances {
        let _ = writeln!(
            out,
            "{:<width$}  {:>12.2}  {:>+12.2}",
            member.name,
            member.total_paid.amount(),
            member.balance.amount()
        );
    }
    let _ = write!(
        out,
        "Total expense: {:.2} {} ({} expenses, {} settlements)",
        summary.total_expense.amount(),
        summary.currency,
        summary.expense_count,
        summary.settlement_count
    );
    out
}

pub fn format_plan(plan: &[Debt], currency: &str) -> String {
    if plan.is_empty() {
        return "All settled up!".to_owned();
    }

    plan.iter()
        .enumerate()
        .map(|(idx, debt)| {
            format!(
                "{}. {} pays {} {} {currency}",
                idx + 1,
                debt.from,
                debt.to,
                debt.amount
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn format_expenses(trip: &Trip, expenses: &[&Expense]) -> String {
    if expenses.is_empty() {
        return "No matching expenses".to_owned();
    }

    expenses
        .iter()
        .map(|expense| {
            let payer = trip
                .member_name(&expense.paid_by_member_id)
                .unwrap_or("Unknown");
            format!(
                "{}  {}  {} paid {} {}  [{}]",
                expense.date.format("%Y-%m-%d"),
                expense.title,
                payer,
                expense.amount,
                trip.currency,
                expense.id
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use splitledger_application::MemberBalance;
    use splitledger_domain::{MemberId, Money};

    fn debt(from: &str, to: &str, amount: f64) -> Debt {
        Debt {
            from: from.to_owned(),
            to: to.to_owned(),
            from_id: MemberId::from(from),
            to_id: MemberId::from(to),
            amount: Money::new(amount),
        }
    }

    #[test]
    fn empty_plan_is_settled() {
        assert_eq!(format_plan(&[], "INR"), "All settled up!");
    }

    #[test]
    fn plan_lines_are_numbered() {
        let plan = [debt("Bilal", "Asha", 100.0), debt("Chen", "Asha", 33.5)];

        assert_eq!(
            format_plan(&plan, "INR"),
            "1. Bilal pays Asha 100.00 INR\n2. Chen pays Asha 33.50 INR"
        );
    }

    #[test]
    fn balances_table_aligns_names() {
        let summary = TripSummary {
            total_expense: Money::new(300.0),
            currency: "INR".to_owned(),
            expense_count: 1,
            settlement_count: 0,
            balances: vec![
                MemberBalance {
                    id: MemberId::from("a"),
                    name: "Asha".to_owned(),
                    total_paid: Money::new(300.0),
                    balance: Money::new(200.0),
                },
                MemberBalance {
                    id: MemberId::from("b"),
                    name: "Bilal".to_owned(),
                    total_paid: Money::ZERO,
                    balance: Money::new(-100.0),
                },
            ],
            plan: Vec::new(),
        };

        let lines: Vec<String> = format_balances(&summary).lines().map(str::to_owned).collect();

        assert_eq!(lines[0], "Member          Paid       Balance");
        assert_eq!(lines[1], "Asha          300.00       +200.00");
        assert_eq!(lines[2], "Bilal           0.00       -100.00");
        assert_eq!(lines[3], "Total expense: 300.00 INR (1 expenses, 0 settlements)");
    }
}
