use splitledger_domain::MemberId;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExpenseValidationError {
    #[error("Expense title must not be blank")]
    BlankTitle,
    #[error("\"{0}\" is reserved for recorded payments")]
    ReservedTitle(String),
    #[error("Expense amount must be a positive number (got {0})")]
    InvalidAmount(f64),
    #[error("Payer {0} is not a member of this trip")]
    UnknownPayer(MemberId),
    #[error("{0} is not a member of this trip")]
    UnknownMember(MemberId),
    #[error("Split value for {member} must be a non-negative number (got {value})")]
    InvalidSplitValue { member: MemberId, value: f64 },
    #[error("Nobody to split the expense with")]
    EmptySplitGroup,
    #[error("Exact split allocates {allocated:.2} of {expected:.2}")]
    ExactSplitMismatch { expected: f64, allocated: f64 },
    #[error("Percent split allocates {allocated:.2}% instead of 100%")]
    PercentSplitMismatch { allocated: f64 },
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum LedgerError {
    #[error(transparent)]
    InvalidExpense(#[from] ExpenseValidationError),
    #[error("Trip name must not be blank")]
    BlankTripName,
    #[error("Member name must not be blank")]
    BlankMemberName,
    #[error("Member {0} already belongs to this trip")]
    DuplicateMember(MemberId),
    #[error("Member {0} not found")]
    UnknownMember(MemberId),
    #[error("Expense \"{0}\" not found")]
    ExpenseNotFound(String),
}
