use std::collections::BTreeMap;

use tracing::warn;

use crate::schemas::{Expense, Member, MemberId, MemberWeight, SplitMethod};

/// Share of one expense owed by each member. Members absent from the map owe nothing.
pub type Split = BTreeMap<MemberId, f64>;

/// Weight map entry first, then the member's own weight.
pub fn resolve_weight(member: &Member, weights: &[MemberWeight]) -> f64 {
    weights
        .iter()
        .find(|entry| entry.member_id == member.id)
        .map(|entry| entry.weight)
        .unwrap_or(member.weight)
}

fn is_eligible(expense: &Expense, member: &Member) -> bool {
    match &expense.member_ids_at_creation {
        Some(ids) => ids.contains(&member.id),
        None => true,
    }
}

pub fn split_expense(expense: &Expense, members: &[Member]) -> Split {
    let eligible = members.iter().filter(|member| is_eligible(expense, member));

    // Weights of the members who actually carry part of the cost
    let active: Vec<(&Member, f64)> = match &expense.split {
        SplitMethod::Equal => eligible.map(|member| (member, 1.0)).collect(),
        SplitMethod::Weight(weights) => eligible
            .map(|member| (member, resolve_weight(member, weights)))
            .filter(|(_, weight)| *weight > 0.0)
            .collect(),
    };
    if active.is_empty() {
        warn!(
            expense = %expense.id,
            payer = %expense.paid_by,
            "no member shares this expense, the payer absorbs it"
        );
        return Split::from([(expense.paid_by.clone(), expense.amount)]);
    }

    let total_weight: f64 = active.iter().map(|(_, weight)| weight).sum();
    let mut split = Split::new();
    for (member, weight) in active {
        *split.entry(member.id.clone()).or_insert(0.0) += expense.amount * weight / total_weight;
    }
    split
}
