//! Input checks applied before anything is persisted. The settlement
//! calculator trusts its input, so every expense and advance goes through here.

use thiserror::Error;

use crate::schemas::{MemberId, NewAdvance, NewExpense, NewMember, SplitMethod, Trip};

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ValidationError {
    #[error("amount must be a positive number, got {0}")]
    InvalidAmount(f64),
    #[error("unknown member: {0}")]
    UnknownMember(MemberId),
    #[error("member has left the trip: {0}")]
    MemberLeft(MemberId),
    #[error("member already exists: {0}")]
    DuplicateMember(MemberId),
    #[error("weight for {member} must be a non-negative number, got {weight}")]
    InvalidWeight { member: MemberId, weight: f64 },
}

fn check_amount(amount: f64) -> Result<(), ValidationError> {
    if amount.is_finite() && amount > 0.0 {
        Ok(())
    } else {
        Err(ValidationError::InvalidAmount(amount))
    }
}

fn check_weight(member: &str, weight: f64) -> Result<(), ValidationError> {
    if weight.is_finite() && weight >= 0.0 {
        Ok(())
    } else {
        Err(ValidationError::InvalidWeight {
            member: member.to_string(),
            weight,
        })
    }
}

// Members who left keep owing their past shares but take part in nothing new
fn check_member(trip: &Trip, id: &str) -> Result<(), ValidationError> {
    match trip.member(id) {
        Some(member) if member.left => Err(ValidationError::MemberLeft(id.to_string())),
        Some(_) => Ok(()),
        None => Err(ValidationError::UnknownMember(id.to_string())),
    }
}

pub fn check_new_member(trip: &Trip, new_member: &NewMember) -> Result<(), ValidationError> {
    if trip.member(&new_member.id).is_some() {
        return Err(ValidationError::DuplicateMember(new_member.id.clone()));
    }
    check_weight(&new_member.id, new_member.weight)
}

pub fn check_new_expense(trip: &Trip, new_expense: &NewExpense) -> Result<(), ValidationError> {
    check_amount(new_expense.amount)?;
    check_member(trip, &new_expense.paid_by)?;
    if let SplitMethod::Weight(weights) = &new_expense.split {
        for entry in weights {
            check_member(trip, &entry.member_id)?;
            check_weight(&entry.member_id, entry.weight)?;
        }
    }
    Ok(())
}

pub fn check_new_advance(trip: &Trip, new_advance: &NewAdvance) -> Result<(), ValidationError> {
    check_amount(new_advance.amount)?;
    check_member(trip, &new_advance.paid_by)?;
    check_member(trip, &new_advance.paid_to)
}
