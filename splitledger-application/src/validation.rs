use crate::{error::ExpenseValidationError, model::ExpenseDraft};
use fxhash::FxHashSet;
use splitledger_domain::{MemberId, Money, SETTLEMENT_TITLE, SplitType, SplitValues, Trip};

/// Allowed gap between the allocated total and the expected total.
const ALLOCATION_TOLERANCE: f64 = 0.1;

#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedSplit {
    pub title: String,
    pub amount: Money,
    pub split_among: Vec<MemberId>,
    pub split_values: SplitValues,
}

/// Checks an [`ExpenseDraft`] against the members of a trip
pub struct ExpenseValidator;

impl ExpenseValidator {
    pub fn validate(
        &self,
        trip: &Trip,
        draft: &ExpenseDraft,
    ) -> Result<ValidatedSplit, ExpenseValidationError> {
        let title = draft.title.trim();
        if title.is_empty() {
            return Err(ExpenseValidationError::BlankTitle);
        }
        if title == SETTLEMENT_TITLE {
            return Err(ExpenseValidationError::ReservedTitle(title.to_owned()));
        }
        if !draft.amount.is_finite() || draft.amount <= 0.0 {
            return Err(ExpenseValidationError::InvalidAmount(draft.amount));
        }
        if !trip.has_member(&draft.paid_by) {
            return Err(ExpenseValidationError::UnknownPayer(draft.paid_by.clone()));
        }

        let (split_among, split_values) = match draft.split_type {
            SplitType::Equal => (
                Self::equal_group(trip, &draft.split_among)?,
                SplitValues::default(),
            ),
            SplitType::Exact | SplitType::Percent => {
                Self::check_allocation(trip, draft)?;
                let group = Self::valued_group(trip, &draft.split_values);
                (group, draft.split_values.clone())
            }
        };

        if split_among.is_empty() {
            return Err(ExpenseValidationError::EmptySplitGroup);
        }

        Ok(ValidatedSplit {
            title: title.to_owned(),
            amount: Money::new(draft.amount),
            split_among,
            split_values,
        })
    }

    fn equal_group(
        trip: &Trip,
        split_among: &[MemberId],
    ) -> Result<Vec<MemberId>, ExpenseValidationError> {
        let mut seen = FxHashSet::default();
        let mut group = Vec::with_capacity(split_among.len());
        for member in split_among {
            if !trip.has_member(member) {
                return Err(ExpenseValidationError::UnknownMember(member.clone()));
            }
            if seen.insert(member) {
                group.push(member.clone());
            }
        }
        Ok(group)
    }

    fn check_allocation(trip: &Trip, draft: &ExpenseDraft) -> Result<(), ExpenseValidationError> {
        let mut allocated = 0.0;
        for (member, &value) in &draft.split_values {
            if !trip.has_member(member) {
                return Err(ExpenseValidationError::UnknownMember(member.clone()));
            }
            if !value.is_finite() || value < 0.0 {
                return Err(ExpenseValidationError::InvalidSplitValue {
                    member: member.clone(),
                    value,
                });
            }
            allocated += value;
        }

        match draft.split_type {
            SplitType::Exact if (draft.amount - allocated).abs() >= ALLOCATION_TOLERANCE => {
                Err(ExpenseValidationError::ExactSplitMismatch {
                    expected: draft.amount,
                    allocated,
                })
            }
            SplitType::Percent if (100.0 - allocated).abs() >= ALLOCATION_TOLERANCE => {
                Err(ExpenseValidationError::PercentSplitMismatch { allocated })
            }
            _ => Ok(()),
        }
    }

    /// Members with a positive value, in trip order.
    fn valued_group(trip: &Trip, values: &SplitValues) -> Vec<MemberId> {
        trip.members
            .iter()
            .filter(|member| values.get(&member.id).is_some_and(|value| *value > 0.0))
            .map(|member| member.id.clone())
            .collect()
    }
}
