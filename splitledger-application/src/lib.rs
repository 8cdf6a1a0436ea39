#![warn(clippy::uninlined_format_args)]

pub mod error;
pub mod ledger_service;
pub mod model;
pub mod ports;
pub mod validation;

pub use error::{ExpenseValidationError, LedgerError};
pub use ledger_service::LedgerService;
pub use model::{ExpenseDraft, MemberBalance, NewMember, TripSummary};
pub use ports::{Clock, IdGenerator};
pub use validation::{ExpenseValidator, ValidatedSplit};
