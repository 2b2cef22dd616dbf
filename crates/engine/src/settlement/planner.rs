//! Settlement planner: greedy netting of creditors against debtors.
//!
//! Creditors are matched from the largest credit down, debtors from the
//! largest debt down. Each step settles at least one side, so the plan has at
//! most `creditors + debtors - 1` transfers. The result is not guaranteed to
//! be the theoretical minimum number of transfers.

use crate::{EngineError, ResultEngine};

use super::{BALANCE_EPSILON, MemberBalance, Transfer};

struct Position<'a> {
    member_id: &'a str,
    amount: f64,
}

/// Builds the transfer plan settling `balances`.
///
/// Members within [`BALANCE_EPSILON`] of zero are already settled. Ties keep
/// the input order, so the same balances always produce the same plan.
///
/// Fails with [`EngineError::Consistency`] when the balances do not net to
/// zero or when some balance is left unmatched.
pub fn plan_transfers(event_id: &str, balances: &[MemberBalance]) -> ResultEngine<Vec<Transfer>> {
    let total: f64 = balances.iter().map(|entry| entry.balance).sum();
    if !total.is_finite() || total.abs() >= BALANCE_EPSILON {
        return Err(EngineError::Consistency(format!(
            "balances of event {event_id} sum to {total}"
        )));
    }

    let mut creditors: Vec<Position<'_>> = balances
        .iter()
        .filter(|entry| entry.balance >= BALANCE_EPSILON)
        .map(|entry| Position {
            member_id: entry.member_id.as_str(),
            amount: entry.balance,
        })
        .collect();
    let mut debtors: Vec<Position<'_>> = balances
        .iter()
        .filter(|entry| entry.balance <= -BALANCE_EPSILON)
        .map(|entry| Position {
            member_id: entry.member_id.as_str(),
            amount: entry.balance,
        })
        .collect();

    creditors.sort_by(|a, b| b.amount.total_cmp(&a.amount));
    debtors.sort_by(|a, b| a.amount.total_cmp(&b.amount));

    let mut transfers = Vec::with_capacity(creditors.len().max(debtors.len()));
    let (mut c, mut d) = (0, 0);
    while c < creditors.len() && d < debtors.len() {
        let creditor = &creditors[c];
        let debtor = &debtors[d];
        let amount = creditor.amount.min(-debtor.amount);

        if debtor.member_id != creditor.member_id {
            transfers.push(Transfer {
                event_id: event_id.to_string(),
                from: debtor.member_id.to_string(),
                to: creditor.member_id.to_string(),
                amount,
            });
        }

        creditors[c].amount -= amount;
        debtors[d].amount += amount;

        if creditors[c].amount.abs() < BALANCE_EPSILON {
            c += 1;
        }
        if debtors[d].amount.abs() < BALANCE_EPSILON {
            d += 1;
        }
    }

    let residual: f64 = creditors[c..]
        .iter()
        .chain(debtors[d..].iter())
        .map(|position| position.amount.abs())
        .sum();
    if residual >= BALANCE_EPSILON {
        return Err(EngineError::Consistency(format!(
            "event {event_id} left {residual} unmatched after planning"
        )));
    }

    Ok(transfers)
}
