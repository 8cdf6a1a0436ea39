pub mod balance_calculator;
pub mod debt_minimizer;

pub use balance_calculator::{BalanceCalculator, calculate_balances};
pub use debt_minimizer::{DebtMinimizer, minimize_debts};
