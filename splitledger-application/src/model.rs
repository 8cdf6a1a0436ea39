use chrono::{DateTime, Utc};
use splitledger_domain::{Debt, MemberId, Money, SplitType, SplitValues};

#[derive(Debug, Clone, PartialEq)]
pub struct NewMember {
    /// Reuse an existing identity (e.g. the trip creator); generated when absent.
    pub id: Option<MemberId>,
    pub name: String,
    pub avatar_url: Option<String>,
}

impl NewMember {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            avatar_url: None,
        }
    }

    pub fn with_id(mut self, id: impl Into<MemberId>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_avatar(mut self, avatar_url: impl Into<String>) -> Self {
        self.avatar_url = Some(avatar_url.into());
        self
    }
}

/// Unvalidated expense input.
///
/// For [`SplitType::Equal`] the split group is `split_among`; for the other
/// split types it is derived from the members with a positive `split_values`
/// entry.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpenseDraft {
    pub title: String,
    pub amount: f64,
    pub paid_by: MemberId,
    pub split_type: SplitType,
    pub split_among: Vec<MemberId>,
    pub split_values: SplitValues,
    pub date: Option<DateTime<Utc>>,
}

impl ExpenseDraft {
    pub fn equal<I, M>(
        title: impl Into<String>,
        amount: f64,
        paid_by: impl Into<MemberId>,
        split_among: I,
    ) -> Self
    where
        I: IntoIterator<Item = M>,
        M: Into<MemberId>,
    {
        Self {
            title: title.into(),
            amount,
            paid_by: paid_by.into(),
            split_type: SplitType::Equal,
            split_among: split_among.into_iter().map(Into::into).collect(),
            split_values: SplitValues::default(),
            date: None,
        }
    }

    pub fn exact<I, M>(
        title: impl Into<String>,
        amount: f64,
        paid_by: impl Into<MemberId>,
        amounts: I,
    ) -> Self
    where
        I: IntoIterator<Item = (M, f64)>,
        M: Into<MemberId>,
    {
        Self::with_values(title, amount, paid_by, SplitType::Exact, amounts)
    }

    pub fn percent<I, M>(
        title: impl Into<String>,
        amount: f64,
        paid_by: impl Into<MemberId>,
        percentages: I,
    ) -> Self
    where
        I: IntoIterator<Item = (M, f64)>,
        M: Into<MemberId>,
    {
        Self::with_values(title, amount, paid_by, SplitType::Percent, percentages)
    }

    pub fn on(mut self, date: DateTime<Utc>) -> Self {
        self.date = Some(date);
        self
    }

    fn with_values<I, M>(
        title: impl Into<String>,
        amount: f64,
        paid_by: impl Into<MemberId>,
        split_type: SplitType,
        values: I,
    ) -> Self
    where
        I: IntoIterator<Item = (M, f64)>,
        M: Into<MemberId>,
    {
        Self {
            title: title.into(),
            amount,
            paid_by: paid_by.into(),
            split_type,
            split_among: Vec::new(),
            split_values: values
                .into_iter()
                .map(|(member, value)| (member.into(), value))
                .collect(),
            date: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MemberBalance {
    pub id: MemberId,
    pub name: String,
    pub total_paid: Money,
    pub balance: Money,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TripSummary {
    pub total_expense: Money,
    pub currency: String,
    pub expense_count: usize,
    pub settlement_count: usize,
    pub balances: Vec<MemberBalance>,
    pub plan: Vec<Debt>,
}

impl TripSummary {
    pub fn is_settled(&self) -> bool {
        self.plan.is_empty()
    }
}
