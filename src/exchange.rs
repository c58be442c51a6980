use std::cmp::Ordering;
use std::collections::HashMap;

use serde::Serialize;

use crate::balance::MemberBalances;
use crate::schemas::MemberId;

/// Amounts at or below this are floating point noise, not debt.
pub const SETTLEMENT_EPSILON: f64 = 0.01;

#[derive(Clone, Debug)]
struct PersonalBalance {
    id: MemberId,
    remaining: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Exchange {
    pub from: MemberId,
    pub to: MemberId,
    pub amount: f64,
    pub from_name: String,
    pub to_name: String,
}

pub fn round_to_2_decimals(n: f64) -> f64 {
    (n * 100.0).round() / 100.0
}

// Largest magnitude first, ties by id so the plan is reproducible
fn by_magnitude(a: &PersonalBalance, b: &PersonalBalance) -> Ordering {
    b.remaining
        .total_cmp(&a.remaining)
        .then_with(|| a.id.cmp(&b.id))
}

/// Greedy settlement: repeatedly match the largest creditor with the largest
/// debtor. Not minimal for every distribution, but close in practice.
pub fn generate_transactions(
    balances: &MemberBalances,
    names: &HashMap<MemberId, String>,
) -> Vec<Exchange> {
    let mut creditors = Vec::new();
    let mut debtors = Vec::new();

    for (id, &balance) in balances {
        let person = PersonalBalance {
            id: id.clone(),
            remaining: balance.abs(),
        };
        if balance > 0.0 {
            creditors.push(person);
        } else if balance < 0.0 {
            debtors.push(person);
        }
    }

    creditors.sort_by(by_magnitude);
    debtors.sort_by(by_magnitude);

    let name_of = |id: &MemberId| names.get(id).cloned().unwrap_or_else(|| id.clone());

    let mut exchanges = Vec::new();
    let (mut i, mut j) = (0, 0);

    while i < creditors.len() && j < debtors.len() {
        let creditor = &mut creditors[i];
        let debtor = &mut debtors[j];
        let amount = creditor.remaining.min(debtor.remaining);

        if amount > SETTLEMENT_EPSILON {
            exchanges.push(Exchange {
                from: debtor.id.clone(),
                to: creditor.id.clone(),
                amount: round_to_2_decimals(amount),
                from_name: name_of(&debtor.id),
                to_name: name_of(&creditor.id),
            });
        }

        creditor.remaining -= amount;
        debtor.remaining -= amount;

        if creditor.remaining <= SETTLEMENT_EPSILON {
            i += 1;
        }
        if debtor.remaining <= SETTLEMENT_EPSILON {
            j += 1;
        }
    }

    exchanges
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn balances(pairs: &[(&str, f64)]) -> MemberBalances {
        pairs.iter().map(|(id, v)| (id.to_string(), *v)).collect()
    }

    fn plan(pairs: &[(&str, f64)]) -> Vec<(String, String, f64)> {
        generate_transactions(&balances(pairs), &HashMap::new())
            .into_iter()
            .map(|e| (e.from, e.to, e.amount))
            .collect()
    }

    fn t(from: &str, to: &str, amount: f64) -> (String, String, f64) {
        (from.to_string(), to.to_string(), amount)
    }

    #[rstest]
    #[case::single_debt(&[("a", 50.0), ("b", -50.0)], vec![t("b", "a", 50.0)])]
    #[case::one_creditor_two_debtors(
        &[("a", 200000.0), ("b", -100000.0), ("c", -100000.0)],
        vec![t("b", "a", 100000.0), t("c", "a", 100000.0)]
    )]
    #[case::largest_matched_first(
        &[("a", 30.0), ("b", 70.0), ("c", -60.0), ("d", -40.0)],
        vec![t("c", "b", 60.0), t("d", "b", 10.0), t("d", "a", 30.0)]
    )]
    #[case::all_settled(&[("a", 0.0), ("b", 0.0)], vec![])]
    #[case::only_creditors(&[("a", 150000.0), ("b", 50000.0)], vec![])]
    #[case::sub_cent_noise(&[("a", 0.004), ("b", -0.004)], vec![])]
    fn greedy_plans(#[case] pairs: &[(&str, f64)], #[case] expected: Vec<(String, String, f64)>) {
        assert_eq!(plan(pairs), expected);
    }

    #[test]
    fn amounts_are_rounded_to_cents() {
        let exchanges = plan(&[("a", 100.0 / 3.0), ("b", -100.0 / 3.0)]);
        assert_eq!(exchanges, vec![t("b", "a", 33.33)]);
    }

    #[test]
    fn names_fall_back_to_id() {
        let names = HashMap::from([("a".to_string(), "Ana".to_string())]);
        let exchanges = generate_transactions(&balances(&[("a", 10.0), ("b", -10.0)]), &names);
        assert_eq!(exchanges[0].to_name, "Ana");
        assert_eq!(exchanges[0].from_name, "b");
    }

    #[test]
    fn rounding_slack_does_not_create_transfers() {
        // Thirds leave a residue far below a cent after the first two matches
        let third = 10.0 / 3.0;
        let exchanges = plan(&[("a", 10.0), ("b", -third), ("c", -third), ("d", -third)]);
        assert_eq!(exchanges.len(), 3);
        assert!(exchanges.iter().all(|(_, to, amount)| to == "a" && *amount == 3.33));
    }
}
