use std::collections::BTreeMap;

use serde::Serialize;

use crate::schemas::{Advance, Expense, Member, MemberId};
use crate::split::split_expense;

/// Positive means the member is owed money, negative means they owe it.
pub type MemberBalances = BTreeMap<MemberId, f64>;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Balances {
    pub member_balances: MemberBalances,
    pub total_expense: f64,
    pub total_advance: f64,
}

pub fn compute_balances(expenses: &[Expense], advances: &[Advance], members: &[Member]) -> Balances {
    let mut balance: MemberBalances = members
        .iter()
        .map(|member| (member.id.clone(), 0.0))
        .collect();

    // References to ids outside the member list are stale and skipped
    for advance in advances {
        if let Some(v) = balance.get_mut(&advance.paid_by) {
            *v += advance.amount;
        }
    }

    for expense in expenses {
        if let Some(v) = balance.get_mut(&expense.paid_by) {
            *v += expense.amount;
        }
        for (member, share) in split_expense(expense, members) {
            if let Some(v) = balance.get_mut(&member) {
                *v -= share;
            }
        }
    }

    Balances {
        member_balances: balance,
        total_expense: expenses.iter().map(|expense| expense.amount).sum(),
        total_advance: advances.iter().map(|advance| advance.amount).sum(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schemas::{MemberWeight, SplitMethod};
    use chrono::Utc;

    fn expense(amount: f64, paid_by: &str, snapshot: &[&str]) -> Expense {
        Expense {
            id: format!("{paid_by}-{amount}"),
            name: "Taxi".to_string(),
            amount,
            paid_by: paid_by.to_string(),
            split: SplitMethod::Equal,
            member_ids_at_creation: Some(snapshot.iter().map(|id| id.to_string()).collect()),
            created_at: Utc::now(),
        }
    }

    fn advance(amount: f64, paid_by: &str) -> Advance {
        Advance {
            id: format!("adv-{paid_by}"),
            amount,
            paid_by: paid_by.to_string(),
            paid_to: "a".to_string(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn payer_is_credited_and_debited_independently() {
        let members = vec![Member::new("a", "A"), Member::new("b", "B"), Member::new("c", "C")];
        let balances = compute_balances(&[expense(300000.0, "a", &["a", "b", "c"])], &[], &members);
        assert_eq!(
            balances.member_balances,
            MemberBalances::from([
                ("a".to_string(), 200000.0),
                ("b".to_string(), -100000.0),
                ("c".to_string(), -100000.0),
            ])
        );
        assert_eq!(balances.total_expense, 300000.0);
        assert_eq!(balances.total_advance, 0.0);
    }

    #[test]
    fn payer_outside_snapshot_is_owed_everything() {
        let members = vec![Member::new("a", "A"), Member::new("b", "B"), Member::new("c", "C")];
        let balances = compute_balances(&[expense(90.0, "a", &["b", "c"])], &[], &members);
        assert_eq!(
            balances.member_balances,
            MemberBalances::from([
                ("a".to_string(), 90.0),
                ("b".to_string(), -45.0),
                ("c".to_string(), -45.0),
            ])
        );
    }

    #[test]
    fn payer_with_zero_weight_is_owed_everything() {
        let members = vec![Member::new("a", "A"), Member::new("b", "B"), Member::new("c", "C")];
        let mut weighted = expense(90.0, "a", &["a", "b", "c"]);
        weighted.split = SplitMethod::Weight(vec![MemberWeight {
            member_id: "a".to_string(),
            weight: 0.0,
        }]);
        let balances = compute_balances(&[weighted], &[], &members);
        assert_eq!(balances.member_balances["a"], 90.0);
        assert_eq!(balances.member_balances["b"], -45.0);
        assert_eq!(balances.member_balances["c"], -45.0);
    }

    #[test]
    fn advance_and_expense_net_out() {
        let members = vec![Member::new("a", "A"), Member::new("b", "B")];
        let balances = compute_balances(
            &[expense(100000.0, "b", &["a", "b"])],
            &[advance(200000.0, "a")],
            &members,
        );
        assert_eq!(balances.member_balances["a"], 150000.0);
        assert_eq!(balances.member_balances["b"], 50000.0);
        assert_eq!(balances.total_advance, 200000.0);
    }

    #[test]
    fn stale_references_are_ignored() {
        let members = vec![Member::new("a", "A")];
        let balances = compute_balances(
            &[expense(40.0, "ghost", &["a"])],
            &[advance(10.0, "ghost")],
            &members,
        );
        assert_eq!(balances.member_balances, MemberBalances::from([("a".to_string(), -40.0)]));
        // Totals are not filtered
        assert_eq!(balances.total_expense, 40.0);
        assert_eq!(balances.total_advance, 10.0);
    }

    #[test]
    fn member_who_left_still_owes_earlier_expenses() {
        let members = vec![
            Member::new("a", "A"),
            Member {
                left: true,
                ..Member::new("b", "B")
            },
        ];
        let balances = compute_balances(&[expense(60.0, "a", &["a", "b"])], &[], &members);
        assert_eq!(balances.member_balances["b"], -30.0);
    }
}
