use crate::{
    error::LedgerError,
    model::{ExpenseDraft, MemberBalance, NewMember, TripSummary},
    ports::{Clock, IdGenerator},
    validation::ExpenseValidator,
};
use splitledger_domain::{
    BalanceCalculator, Debt, DebtMinimizer, Expense, Member, MemberId, MemberRole, Money, Trip,
};

/// Trip mutations and queries on top of the balance engine.
///
/// Every mutation returns a freshly recalculated trip; callers persist it.
#[derive(Clone, Copy)]
pub struct LedgerService<'a> {
    ids: &'a dyn IdGenerator,
    clock: &'a dyn Clock,
    currency: &'a str,
}

impl<'a> LedgerService<'a> {
    pub fn new(ids: &'a dyn IdGenerator, clock: &'a dyn Clock, currency: &'a str) -> Self {
        Self {
            ids,
            clock,
            currency,
        }
    }

    pub fn create_trip(&self, name: &str, creator: NewMember) -> Result<Trip, LedgerError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(LedgerError::BlankTripName);
        }

        let mut member = self.new_member(creator)?;
        member.role = Some(MemberRole::Admin);
        let now = self.clock.now();

        let trip = Trip {
            id: self.ids.next_id(),
            name: name.to_owned(),
            total_expense: Money::ZERO,
            created_by: member.id.to_string(),
            members: vec![member],
            expenses: Vec::new(),
            currency: self.currency.to_owned(),
            created_at: now,
            invite_code: None,
            join_requests: Vec::new(),
        };
        tracing::info!(trip_id = %trip.id, name = %trip.name, "created trip");

        Ok(trip)
    }

    pub fn add_member(&self, trip: &Trip, member: NewMember) -> Result<Trip, LedgerError> {
        let member = self.new_member(member)?;
        if trip.has_member(&member.id) {
            return Err(LedgerError::DuplicateMember(member.id));
        }
        tracing::info!(trip_id = %trip.id, member_id = %member.id, "added member");

        let mut updated = trip.clone();
        updated.members.push(member);
        Ok(self.recalculate(&updated))
    }

    pub fn record_expense(&self, trip: &Trip, draft: ExpenseDraft) -> Result<Trip, LedgerError> {
        let expense = self.build_expense(trip, self.ids.next_id(), &draft)?;
        tracing::info!(
            trip_id = %trip.id,
            expense_id = %expense.id,
            amount = expense.amount.amount(),
            "recorded expense"
        );

        let mut updated = trip.clone();
        updated.expenses.push(expense);
        Ok(self.recalculate(&updated))
    }

    /// Replace an expense in place, keeping its id and position.
    pub fn edit_expense(
        &self,
        trip: &Trip,
        expense_id: &str,
        draft: ExpenseDraft,
    ) -> Result<Trip, LedgerError> {
        let position = Self::expense_position(trip, expense_id)?;
        let expense = self.build_expense(trip, expense_id.to_owned(), &draft)?;
        tracing::info!(trip_id = %trip.id, expense_id, "edited expense");

        let mut updated = trip.clone();
        updated.expenses[position] = expense;
        Ok(self.recalculate(&updated))
    }

    pub fn delete_expense(&self, trip: &Trip, expense_id: &str) -> Result<Trip, LedgerError> {
        let position = Self::expense_position(trip, expense_id)?;
        tracing::info!(trip_id = %trip.id, expense_id, "deleted expense");

        let mut updated = trip.clone();
        updated.expenses.remove(position);
        Ok(self.recalculate(&updated))
    }

    pub fn recalculate(&self, trip: &Trip) -> Trip {
        BalanceCalculator.calculate(trip)
    }

    pub fn settlement_plan(&self, trip: &Trip) -> Vec<Debt> {
        DebtMinimizer.minimize(trip)
    }

    /// Record `debt` as paid and recalculate.
    pub fn settle_debt(&self, trip: &Trip, debt: &Debt) -> Result<Trip, LedgerError> {
        for id in [&debt.from_id, &debt.to_id] {
            if !trip.has_member(id) {
                return Err(LedgerError::UnknownMember(id.clone()));
            }
        }

        let mut updated = trip.clone();
        updated.expenses.push(self.settlement_expense(trip, debt));
        tracing::info!(
            trip_id = %trip.id,
            from = %debt.from_id,
            to = %debt.to_id,
            amount = debt.amount.amount(),
            "settled debt"
        );

        Ok(self.recalculate(&updated))
    }

    /// Record every transfer of the current plan as paid.
    pub fn settle_all(&self, trip: &Trip) -> Trip {
        let balanced = self.recalculate(trip);
        let plan = self.settlement_plan(&balanced);
        if plan.is_empty() {
            return balanced;
        }

        let mut updated = balanced;
        for debt in &plan {
            let expense = self.settlement_expense(&updated, debt);
            updated.expenses.push(expense);
        }
        tracing::info!(trip_id = %trip.id, transfers = plan.len(), "settled all debts");

        self.recalculate(&updated)
    }

    /// Real expenses whose title or payer name contains `query`, most recently
    /// recorded first.
    pub fn search_expenses<'t>(&self, trip: &'t Trip, query: &str) -> Vec<&'t Expense> {
        let query = query.to_lowercase();
        trip.real_expenses()
            .filter(|expense| {
                let payer = trip
                    .member_name(&expense.paid_by_member_id)
                    .map(str::to_lowercase)
                    .unwrap_or_default();
                expense.title.to_lowercase().contains(&query) || payer.contains(&query)
            })
            .rev()
            .collect()
    }

    pub fn summary(&self, trip: &Trip) -> TripSummary {
        let balanced = self.recalculate(trip);
        let plan = self.settlement_plan(&balanced);
        let settlement_count = balanced
            .expenses
            .iter()
            .filter(|expense| expense.is_settlement())
            .count();

        TripSummary {
            total_expense: balanced.total_expense,
            currency: balanced.currency.clone(),
            expense_count: balanced.expenses.len() - settlement_count,
            settlement_count,
            balances: balanced
                .members
                .iter()
                .map(|member| MemberBalance {
                    id: member.id.clone(),
                    name: member.name.clone(),
                    total_paid: member.total_paid,
                    balance: member.balance,
                })
                .collect(),
            plan,
        }
    }

    fn new_member(&self, member: NewMember) -> Result<Member, LedgerError> {
        let name = member.name.trim();
        if name.is_empty() {
            return Err(LedgerError::BlankMemberName);
        }

        let id = member
            .id
            .unwrap_or_else(|| MemberId::new(self.ids.next_id()));
        Ok(Member {
            avatar_url: member.avatar_url,
            role: Some(MemberRole::Member),
            joined_at: Some(self.clock.now().timestamp_millis()),
            ..Member::new(id, name)
        })
    }

    fn build_expense(
        &self,
        trip: &Trip,
        id: String,
        draft: &ExpenseDraft,
    ) -> Result<Expense, LedgerError> {
        let split = ExpenseValidator.validate(trip, draft)?;
        Ok(Expense {
            id,
            trip_id: trip.id.clone(),
            title: split.title,
            amount: split.amount,
            paid_by_member_id: draft.paid_by.clone(),
            split_among_member_ids: split.split_among,
            split_type: draft.split_type,
            split_values: split.split_values,
            date: draft.date.unwrap_or_else(|| self.clock.now()),
        })
    }

    fn settlement_expense(&self, trip: &Trip, debt: &Debt) -> Expense {
        debt.to_settlement_expense(self.ids.next_id(), trip.id.clone(), self.clock.now())
    }

    fn expense_position(trip: &Trip, expense_id: &str) -> Result<usize, LedgerError> {
        trip.expenses
            .iter()
            .position(|expense| expense.id == expense_id)
            .ok_or_else(|| LedgerError::ExpenseNotFound(expense_id.to_owned()))
    }
}
