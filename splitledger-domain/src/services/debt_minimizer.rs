use crate::model::{Debt, Member, MemberId, Money, SETTLED_EPSILON, Trip};

const UNKNOWN_MEMBER_NAME: &str = "Unknown";

struct Position<'a> {
    id: &'a MemberId,
    name: &'a str,
    balance: Money,
}

impl<'a> From<(&'a Member, Money)> for Position<'a> {
    fn from((member, balance): (&'a Member, Money)) -> Self {
        Self {
            id: &member.id,
            name: &member.name,
            balance,
        }
    }
}

/// Settlement plan service
///
/// Greedily pairs the largest debtor with the largest creditor until one side
/// runs out. Not guaranteed to produce the fewest transfers.
pub struct DebtMinimizer;

impl DebtMinimizer {
    /// Build the transfer list that brings every member's balance to zero
    ///
    /// Expects balances that were already recomputed. Members within
    /// [`SETTLED_EPSILON`] of zero never appear in the plan.
    pub fn minimize(&self, trip: &Trip) -> Vec<Debt> {
        let mut debtors: Vec<Position<'_>> = Vec::new();
        let mut creditors: Vec<Position<'_>> = Vec::new();

        for member in &trip.members {
            let rounded = member.balance.round_cents();
            if rounded.amount() < -SETTLED_EPSILON {
                debtors.push((member, rounded).into());
            } else if rounded.amount() > SETTLED_EPSILON {
                creditors.push((member, rounded).into());
            }
        }

        debtors.sort_by(|a, b| a.balance.total_cmp(&b.balance));
        creditors.sort_by(|a, b| b.balance.total_cmp(&a.balance));

        let mut debts = Vec::with_capacity(debtors.len().max(creditors.len()));
        let (mut i, mut j) = (0, 0);

        while i < debtors.len() && j < creditors.len() {
            let debtor = &mut debtors[i];
            let creditor = &mut creditors[j];

            let amount = debtor.balance.abs().min(creditor.balance);
            let rounded = amount.round_cents();
            if rounded.amount() > 0.0 {
                debts.push(Debt {
                    from: display_name(debtor),
                    to: display_name(creditor),
                    from_id: debtor.id.clone(),
                    to_id: creditor.id.clone(),
                    amount: rounded,
                });
            }

            debtor.balance += amount;
            creditor.balance -= amount;

            let debtor_done = debtor.balance.is_settled();
            let creditor_done = creditor.balance.amount() < SETTLED_EPSILON;
            // `amount` is the smaller side, so one of the two always reaches zero.
            debug_assert!(debtor_done || creditor_done);
            if debtor_done || !creditor_done {
                i += 1;
            }
            if creditor_done {
                j += 1;
            }
        }

        if i < debtors.len() || j < creditors.len() {
            tracing::debug!(
                trip_id = %trip.id,
                debtors_left = debtors.len() - i,
                creditors_left = creditors.len() - j,
                "settlement plan left unmatched residue"
            );
        }

        debts
    }
}

fn display_name(position: &Position<'_>) -> String {
    if position.name.is_empty() {
        UNKNOWN_MEMBER_NAME.to_owned()
    } else {
        position.name.to_owned()
    }
}

/// Shorthand for [`DebtMinimizer::minimize`].
pub fn minimize_debts(trip: &Trip) -> Vec<Debt> {
    DebtMinimizer.minimize(trip)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};
    use rstest::{fixture, rstest};

    fn trip_with_balances(balances: &[(&str, &str, f64)]) -> Trip {
        Trip {
            id: "trip".to_owned(),
            name: "Test".to_owned(),
            total_expense: Money::ZERO,
            members: balances
                .iter()
                .map(|(id, name, balance)| Member {
                    balance: Money::new(*balance),
                    ..Member::new(*id, *name)
                })
                .collect(),
            expenses: Vec::new(),
            currency: "INR".to_owned(),
            created_by: "a".to_owned(),
            created_at: DateTime::<Utc>::UNIX_EPOCH,
            invite_code: None,
            join_requests: Vec::new(),
        }
    }

    fn as_tuples(debts: &[Debt]) -> Vec<(&str, &str, f64)> {
        debts
            .iter()
            .map(|debt| (debt.from.as_str(), debt.to.as_str(), debt.amount.amount()))
            .collect()
    }

    #[fixture]
    fn minimizer() -> DebtMinimizer {
        DebtMinimizer
    }

    #[rstest]
    #[case::one_creditor_two_debtors(
        &[("a", "A", 200.0), ("b", "B", -100.0), ("c", "C", -100.0)],
        vec![("B", "A", 100.0), ("C", "A", 100.0)]
    )]
    #[case::largest_pairs_first(
        &[("a", "A", -10.0), ("b", "B", -70.0), ("c", "C", 30.0), ("d", "D", 50.0)],
        vec![("B", "D", 50.0), ("B", "C", 20.0), ("A", "C", 10.0)]
    )]
    #[case::exact_match_advances_both(
        &[("a", "A", 40.0), ("b", "B", -40.0), ("c", "C", 25.5), ("d", "D", -25.5)],
        vec![("B", "A", 40.0), ("D", "C", 25.5)]
    )]
    #[case::all_settled(
        &[("a", "A", 0.0), ("b", "B", 0.004), ("c", "C", -0.009)],
        vec![]
    )]
    #[case::threshold_members_excluded(
        &[("a", "A", 10.01), ("b", "B", -10.0), ("c", "C", -0.01)],
        vec![("B", "A", 10.0)]
    )]
    #[case::float_noise_rounded(
        &[("a", "A", 66.66666666666667), ("b", "B", -33.333333333333336), ("c", "C", -33.33333333333333)],
        vec![("B", "A", 33.33), ("C", "A", 33.33)]
    )]
    #[case::blank_name_shown_as_unknown(
        &[("a", "", 50.0), ("b", "B", -50.0)],
        vec![("B", "Unknown", 50.0)]
    )]
    #[case::empty(&[], vec![])]
    fn minimizes_debts(
        minimizer: DebtMinimizer,
        #[case] balances: &[(&str, &str, f64)],
        #[case] expected: Vec<(&str, &str, f64)>,
    ) {
        let debts = minimizer.minimize(&trip_with_balances(balances));

        assert_eq!(as_tuples(&debts), expected);
    }

    #[rstest]
    fn debts_carry_member_ids_when_names_collide(minimizer: DebtMinimizer) {
        let trip = trip_with_balances(&[("s1", "Sam", -20.0), ("s2", "Sam", 20.0)]);

        let debts = minimizer.minimize(&trip);

        assert_eq!(debts.len(), 1);
        assert_eq!(debts[0].from_id, MemberId::from("s1"));
        assert_eq!(debts[0].to_id, MemberId::from("s2"));
        assert_eq!(debts[0].from, "Sam");
    }

    #[rstest]
    fn unbalanced_input_stops_when_one_side_runs_out(minimizer: DebtMinimizer) {
        let trip = trip_with_balances(&[("a", "A", 100.0), ("b", "B", -30.0)]);

        let debts = minimizer.minimize(&trip);

        assert_eq!(as_tuples(&debts), vec![("B", "A", 30.0)]);
    }

    #[rstest]
    fn never_emits_transfers_at_or_below_threshold(minimizer: DebtMinimizer) {
        let trip = trip_with_balances(&[
            ("a", "A", 33.34),
            ("b", "B", 33.33),
            ("c", "C", -33.33),
            ("d", "D", -33.34),
            ("e", "E", 0.01),
        ]);

        let debts = minimizer.minimize(&trip);

        assert!(debts.iter().all(|debt| debt.amount.amount() > SETTLED_EPSILON));
        assert!(debts.iter().all(|debt| debt.from != "E" && debt.to != "E"));
    }
}
