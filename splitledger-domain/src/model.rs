use std::{
    collections::HashMap,
    fmt,
    iter::Sum,
    ops::{Add, AddAssign, Div, Mul, Neg, Sub, SubAssign},
};

use chrono::{DateTime, Utc};
use fxhash::FxHashMap;
use serde::{Deserialize, Serialize};

/// Title that marks an expense as a balance transfer rather than a trip cost.
pub const SETTLEMENT_TITLE: &str = "Settlement";

/// Balances within this distance of zero count as settled.
pub const SETTLED_EPSILON: f64 = 0.01;

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MemberId(pub String);

impl MemberId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MemberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for MemberId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl From<String> for MemberId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Currency amount in the trip's currency.
///
/// Plain double precision; rounding only happens through [`Money::round_cents`].
#[derive(Clone, Copy, Debug, Default, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(f64);

impl Money {
    pub const ZERO: Self = Self(0.0);

    pub const fn new(value: f64) -> Self {
        Self(value)
    }

    pub fn amount(self) -> f64 {
        self.0
    }

    pub fn abs(self) -> Self {
        Self(self.0.abs())
    }

    pub fn min(self, other: Self) -> Self {
        Self(self.0.min(other.0))
    }

    /// Rounds to two decimals, halves toward positive infinity.
    pub fn round_cents(self) -> Self {
        Self((self.0 * 100.0 + 0.5).floor() / 100.0)
    }

    pub fn is_settled(self) -> bool {
        self.0.abs() < SETTLED_EPSILON
    }

    pub fn total_cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

impl From<f64> for Money {
    fn from(value: f64) -> Self {
        Self(value)
    }
}

impl Add for Money {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl Sub for Money {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, rhs: Self) {
        self.0 -= rhs.0;
    }
}

impl Neg for Money {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Self(-self.0)
    }
}

impl Mul<f64> for Money {
    type Output = Self;

    fn mul(self, rhs: f64) -> Self::Output {
        Self(self.0 * rhs)
    }
}

impl Div<f64> for Money {
    type Output = Self;

    fn div(self, rhs: f64) -> Self::Output {
        Self(self.0 / rhs)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemberRole {
    Admin,
    Member,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    pub id: MemberId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub total_paid: Money,
    /// Positive when the member is owed money, negative when they owe.
    #[serde(default)]
    pub balance: Money,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<MemberRole>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub joined_at: Option<i64>,
}

impl Member {
    pub fn new(id: impl Into<MemberId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            avatar_url: None,
            total_paid: Money::ZERO,
            balance: Money::ZERO,
            role: None,
            joined_at: None,
        }
    }

    fn reset(&self) -> Self {
        Self {
            total_paid: Money::ZERO,
            balance: Money::ZERO,
            ..self.clone()
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SplitType {
    #[default]
    Equal,
    Exact,
    Percent,
}

/// Per-member exact amounts or percentages, depending on the split type.
pub type SplitValues = FxHashMap<MemberId, f64>;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    pub id: String,
    pub trip_id: String,
    pub title: String,
    pub amount: Money,
    pub paid_by_member_id: MemberId,
    #[serde(default)]
    pub split_among_member_ids: Vec<MemberId>,
    #[serde(default)]
    pub split_type: SplitType,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub split_values: SplitValues,
    pub date: DateTime<Utc>,
}

impl Expense {
    pub fn is_settlement(&self) -> bool {
        self.title == SETTLEMENT_TITLE
    }

    /// Amount `member` owes under this expense's split rule.
    ///
    /// Equal shares divide by the full split group, including ids that are
    /// not members of the trip.
    pub fn share_of(&self, member: &MemberId) -> Money {
        let value = || self.split_values.get(member).copied().unwrap_or(0.0);
        match self.split_type {
            SplitType::Equal => self.amount / self.split_among_member_ids.len() as f64,
            SplitType::Exact => Money::new(value()),
            SplitType::Percent => self.amount * value() / 100.0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JoinRequestStatus {
    Pending,
    Approved,
    Rejected,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinRequest {
    pub id: String,
    pub user_id: String,
    pub user_name: String,
    pub user_email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_avatar_url: Option<String>,
    pub requested_at: i64,
    pub status: JoinRequestStatus,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trip {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub total_expense: Money,
    pub members: Vec<Member>,
    #[serde(default)]
    pub expenses: Vec<Expense>,
    pub currency: String,
    pub created_by: String,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invite_code: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub join_requests: Vec<JoinRequest>,
}

impl Trip {
    pub fn member(&self, id: &MemberId) -> Option<&Member> {
        self.members.iter().find(|member| &member.id == id)
    }

    pub fn has_member(&self, id: &MemberId) -> bool {
        self.member(id).is_some()
    }

    pub fn member_name(&self, id: &MemberId) -> Option<&str> {
        self.member(id).map(|member| member.name.as_str())
    }

    pub fn expense(&self, id: &str) -> Option<&Expense> {
        self.expenses.iter().find(|expense| expense.id == id)
    }

    /// Expenses that represent real trip costs.
    pub fn real_expenses(&self) -> impl DoubleEndedIterator<Item = &Expense> + '_ {
        self.expenses.iter().filter(|expense| !expense.is_settlement())
    }

    pub(crate) fn reset_members(&self) -> impl Iterator<Item = Member> + '_ {
        self.members.iter().map(Member::reset)
    }
}

/// A recommended payment that is part of a settlement plan.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Debt {
    /// Display name of the paying member.
    pub from: String,
    /// Display name of the receiving member.
    pub to: String,
    pub from_id: MemberId,
    pub to_id: MemberId,
    pub amount: Money,
}

impl Debt {
    /// Builds the ledger entry that records this debt as paid.
    pub fn to_settlement_expense(
        &self,
        id: impl Into<String>,
        trip_id: impl Into<String>,
        date: DateTime<Utc>,
    ) -> Expense {
        Expense {
            id: id.into(),
            trip_id: trip_id.into(),
            title: SETTLEMENT_TITLE.to_owned(),
            amount: self.amount,
            paid_by_member_id: self.from_id.clone(),
            split_among_member_ids: vec![self.to_id.clone()],
            split_type: SplitType::Equal,
            split_values: SplitValues::default(),
            date,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::already_rounded(12.34, 12.34)]
    #[case::half_up(0.125, 0.13)]
    #[case::negative_half_toward_positive(-0.125, -0.12)]
    #[case::noise(99.99999999999, 100.0)]
    #[case::negative_noise(-33.333333333, -33.33)]
    fn round_cents_matches_reference_rounding(#[case] input: f64, #[case] expected: f64) {
        assert_eq!(Money::new(input).round_cents(), Money::new(expected));
    }

    #[test]
    fn deserializes_trip_snapshot_with_defaults() {
        let json = r#"{
            "id": "t1",
            "name": "Goa",
            "totalExpense": 0,
            "members": [
                {"id": "a", "name": "Asha", "avatarUrl": "x.png", "totalPaid": 0, "balance": 0},
                {"id": "b", "name": "Bilal", "totalPaid": 0, "balance": 0}
            ],
            "expenses": [{
                "id": "e1",
                "tripId": "t1",
                "title": "Dinner",
                "amount": 120.5,
                "paidByMemberId": "a",
                "splitAmongMemberIds": ["a", "b"],
                "date": "2024-03-01T18:30:00.000Z"
            }],
            "currency": "INR",
            "createdBy": "a",
            "createdAt": 1709312400000
        }"#;

        let trip: Trip = serde_json::from_str(json).expect("valid snapshot");

        assert_eq!(trip.members[0].avatar_url.as_deref(), Some("x.png"));
        let expense = &trip.expenses[0];
        assert_eq!(expense.split_type, SplitType::Equal);
        assert!(expense.split_values.is_empty());
        assert_eq!(expense.amount, Money::new(120.5));
        assert_eq!(trip.created_at.timestamp_millis(), 1_709_312_400_000);
    }

    #[test]
    fn settlement_expense_uses_member_ids() {
        let debt = Debt {
            from: "Sam".to_owned(),
            to: "Sam".to_owned(),
            from_id: MemberId::from("s1"),
            to_id: MemberId::from("s2"),
            amount: Money::new(42.5),
        };

        let expense = debt.to_settlement_expense("e9", "t1", DateTime::<Utc>::UNIX_EPOCH);

        assert!(expense.is_settlement());
        assert_eq!(expense.paid_by_member_id, MemberId::from("s1"));
        assert_eq!(expense.split_among_member_ids, vec![MemberId::from("s2")]);
        assert_eq!(expense.split_type, SplitType::Equal);
        assert_eq!(expense.amount, Money::new(42.5));
    }
}
