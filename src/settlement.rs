use std::collections::HashMap;

use serde::Serialize;
use tracing::debug;

use crate::balance::{compute_balances, MemberBalances};
use crate::exchange::{generate_transactions, Exchange};
use crate::schemas::{Advance, Expense, Member, Trip};

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SettlementResult {
    pub total_expense: f64,
    pub total_advance: f64,
    pub net_balance: f64,
    pub member_balances: MemberBalances,
    pub transactions: Vec<Exchange>,
}

/// Balances and suggested transfers for one consistent snapshot of a trip.
///
/// When advances outweigh expenses every member can end up a creditor. The
/// plan then has no transfers and the surplus has to come back from whoever
/// holds the advances, which is outside the peer transfers modelled here.
pub fn settle(expenses: &[Expense], advances: &[Advance], members: &[Member]) -> SettlementResult {
    let balances = compute_balances(expenses, advances, members);
    let names: HashMap<_, _> = members
        .iter()
        .map(|member| (member.id.clone(), member.name.clone()))
        .collect();
    let transactions = generate_transactions(&balances.member_balances, &names);

    debug!(
        members = members.len(),
        expenses = expenses.len(),
        advances = advances.len(),
        transactions = transactions.len(),
        "computed settlement"
    );

    SettlementResult {
        net_balance: balances.total_advance - balances.total_expense,
        total_expense: balances.total_expense,
        total_advance: balances.total_advance,
        member_balances: balances.member_balances,
        transactions,
    }
}

pub fn settle_trip(trip: &Trip) -> SettlementResult {
    settle(&trip.expenses, &trip.advances, &trip.members)
}
