#![warn(clippy::uninlined_format_args)]

pub mod model;
pub mod services;

pub use model::{
    Debt, Expense, JoinRequest, JoinRequestStatus, Member, MemberId, MemberRole, Money,
    SETTLED_EPSILON, SETTLEMENT_TITLE, SplitType, SplitValues, Trip,
};
pub use services::{BalanceCalculator, DebtMinimizer, calculate_balances, minimize_debts};
