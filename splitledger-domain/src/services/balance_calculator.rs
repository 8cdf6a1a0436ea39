use crate::model::{Member, MemberId, Money, Trip};
use fxhash::FxBuildHasher;
use indexmap::IndexMap;

type MemberLedger = IndexMap<MemberId, Member, FxBuildHasher>;

/// Balance recomputation service
pub struct BalanceCalculator;

impl BalanceCalculator {
    /// Recompute every member's totals from the full expense history
    ///
    /// Returns a new trip; the input is left untouched. Member order follows
    /// the input, and ids that reference no member are skipped.
    pub fn calculate(&self, trip: &Trip) -> Trip {
        let mut ledger: MemberLedger =
            IndexMap::with_capacity_and_hasher(trip.members.len(), FxBuildHasher::default());
        for member in trip.reset_members() {
            ledger.insert(member.id.clone(), member);
        }

        for expense in &trip.expenses {
            if let Some(payer) = ledger.get_mut(&expense.paid_by_member_id) {
                payer.total_paid += expense.amount;
                payer.balance += expense.amount;
            }

            for member_id in &expense.split_among_member_ids {
                if let Some(member) = ledger.get_mut(member_id) {
                    member.balance -= expense.share_of(member_id);
                }
            }
        }

        let total_expense: Money = trip.real_expenses().map(|expense| expense.amount).sum();

        tracing::debug!(
            trip_id = %trip.id,
            members = ledger.len(),
            expenses = trip.expenses.len(),
            total_expense = total_expense.amount(),
            "recalculated trip balances"
        );

        Trip {
            members: ledger.into_values().collect(),
            total_expense,
            ..trip.clone()
        }
    }
}

/// Shorthand for [`BalanceCalculator::calculate`].
pub fn calculate_balances(trip: &Trip) -> Trip {
    BalanceCalculator.calculate(trip)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Expense, SETTLEMENT_TITLE, SplitType, SplitValues};
    use chrono::{DateTime, Utc};
    use rstest::{fixture, rstest};

    fn member(id: &str) -> Member {
        Member::new(id, id.to_uppercase())
    }

    fn expense(
        title: &str,
        amount: f64,
        payer: &str,
        split_among: &[&str],
        split_type: SplitType,
        values: &[(&str, f64)],
    ) -> Expense {
        Expense {
            id: format!("{title}-{amount}"),
            trip_id: "trip".to_owned(),
            title: title.to_owned(),
            amount: Money::new(amount),
            paid_by_member_id: MemberId::from(payer),
            split_among_member_ids: split_among.iter().copied().map(MemberId::from).collect(),
            split_type,
            split_values: values
                .iter()
                .map(|(id, value)| (MemberId::from(*id), *value))
                .collect::<SplitValues>(),
            date: DateTime::<Utc>::UNIX_EPOCH,
        }
    }

    fn trip(members: &[&str], expenses: Vec<Expense>) -> Trip {
        Trip {
            id: "trip".to_owned(),
            name: "Test".to_owned(),
            total_expense: Money::ZERO,
            members: members.iter().copied().map(member).collect(),
            expenses,
            currency: "INR".to_owned(),
            created_by: "a".to_owned(),
            created_at: DateTime::<Utc>::UNIX_EPOCH,
            invite_code: None,
            join_requests: Vec::new(),
        }
    }

    fn balances(trip: &Trip) -> Vec<(&str, f64)> {
        trip.members
            .iter()
            .map(|member| (member.id.as_str(), member.balance.amount()))
            .collect()
    }

    #[fixture]
    fn calculator() -> BalanceCalculator {
        BalanceCalculator
    }

    #[rstest]
    #[case::equal_three_way(
        vec![expense("Hotel", 300.0, "a", &["a", "b", "c"], SplitType::Equal, &[])],
        vec![("a", 200.0), ("b", -100.0), ("c", -100.0)]
    )]
    #[case::exact(
        vec![expense("Taxi", 100.0, "a", &["a", "b"], SplitType::Exact, &[("a", 40.0), ("b", 60.0)])],
        vec![("a", 60.0), ("b", -60.0), ("c", 0.0)]
    )]
    #[case::percent(
        vec![expense("Food", 200.0, "b", &["a", "b"], SplitType::Percent, &[("a", 25.0), ("b", 75.0)])],
        vec![("a", -50.0), ("b", 50.0), ("c", 0.0)]
    )]
    #[case::exact_missing_value_owes_nothing(
        vec![expense("Taxi", 100.0, "a", &["a", "b"], SplitType::Exact, &[("b", 100.0)])],
        vec![("a", 100.0), ("b", -100.0), ("c", 0.0)]
    )]
    #[case::empty_split_group_credits_payer(
        vec![expense("Gift", 80.0, "c", &[], SplitType::Equal, &[])],
        vec![("a", 0.0), ("b", 0.0), ("c", 80.0)]
    )]
    #[case::unknown_split_member_still_counts_in_divisor(
        vec![expense("Bus", 90.0, "a", &["a", "b", "ghost"], SplitType::Equal, &[])],
        vec![("a", 60.0), ("b", -30.0), ("c", 0.0)]
    )]
    #[case::unknown_payer_is_skipped(
        vec![expense("Bus", 90.0, "ghost", &["a", "b", "c"], SplitType::Equal, &[])],
        vec![("a", -30.0), ("b", -30.0), ("c", -30.0)]
    )]
    #[case::settlement_moves_balance(
        vec![
            expense("Hotel", 300.0, "a", &["a", "b", "c"], SplitType::Equal, &[]),
            expense(SETTLEMENT_TITLE, 100.0, "b", &["a"], SplitType::Equal, &[]),
        ],
        vec![("a", 100.0), ("b", 0.0), ("c", -100.0)]
    )]
    fn calculates_balances(
        calculator: BalanceCalculator,
        #[case] expenses: Vec<Expense>,
        #[case] expected: Vec<(&str, f64)>,
    ) {
        let result = calculator.calculate(&trip(&["a", "b", "c"], expenses));

        assert_eq!(balances(&result), expected);
    }

    #[rstest]
    fn total_paid_tracks_payer_only(calculator: BalanceCalculator) {
        let input = trip(
            &["a", "b"],
            vec![
                expense("Hotel", 300.0, "a", &["a", "b"], SplitType::Equal, &[]),
                expense("Lunch", 50.0, "a", &["b"], SplitType::Equal, &[]),
                expense(SETTLEMENT_TITLE, 25.0, "b", &["a"], SplitType::Equal, &[]),
            ],
        );

        let result = calculator.calculate(&input);

        assert_eq!(result.members[0].total_paid, Money::new(350.0));
        assert_eq!(result.members[1].total_paid, Money::new(25.0));
    }

    #[rstest]
    fn total_expense_excludes_settlements(calculator: BalanceCalculator) {
        let input = trip(
            &["a", "b"],
            vec![
                expense("Hotel", 300.0, "a", &["a", "b"], SplitType::Equal, &[]),
                expense(SETTLEMENT_TITLE, 150.0, "b", &["a"], SplitType::Equal, &[]),
                expense("Fuel", 45.5, "b", &["a", "b"], SplitType::Equal, &[]),
                expense(SETTLEMENT_TITLE, 22.75, "a", &["b"], SplitType::Equal, &[]),
            ],
        );

        let result = calculator.calculate(&input);

        assert_eq!(result.total_expense, Money::new(345.5));
    }

    #[rstest]
    fn overwrites_stale_totals_and_keeps_other_fields(calculator: BalanceCalculator) {
        let mut input = trip(&["a", "b"], Vec::new());
        input.members[0].balance = Money::new(999.0);
        input.members[0].total_paid = Money::new(999.0);
        input.members[0].avatar_url = Some("avatar.png".to_owned());
        input.total_expense = Money::new(12.0);

        let result = calculator.calculate(&input);

        assert_eq!(result.members[0].balance, Money::ZERO);
        assert_eq!(result.members[0].total_paid, Money::ZERO);
        assert_eq!(result.members[0].avatar_url.as_deref(), Some("avatar.png"));
        assert_eq!(result.total_expense, Money::ZERO);
        assert_eq!(input.members[0].balance, Money::new(999.0));
    }

    #[rstest]
    fn duplicate_member_id_keeps_first_position(calculator: BalanceCalculator) {
        let mut input = trip(&["a", "b"], Vec::new());
        let mut renamed = member("a");
        renamed.name = "Renamed".to_owned();
        input.members.push(renamed);

        let result = calculator.calculate(&input);

        assert_eq!(result.members.len(), 2);
        assert_eq!(result.members[0].id, MemberId::from("a"));
        assert_eq!(result.members[0].name, "Renamed");
        assert_eq!(result.members[1].id, MemberId::from("b"));
    }
}
