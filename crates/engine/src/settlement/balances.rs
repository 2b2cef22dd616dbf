//! Balance calculator.
//!
//! Folds the payments of an event into one signed balance per member:
//! - positive = the member is owed money (creditor)
//! - negative = the member owes money (debtor)

use std::{collections::HashMap, fmt};

use serde::{Deserialize, Serialize};

use crate::{EngineError, ResultEngine};

use super::{BALANCE_EPSILON, Member, Payment};

/// Net position of a single member.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MemberBalance {
    pub member_id: String,
    pub balance: f64,
}

/// Payment data skipped while computing balances.
///
/// `payment` is the position of the offending payment in the input slice.
#[derive(Clone, Debug, PartialEq)]
pub enum BalanceDiagnostic {
    InvalidAmount { payment: usize, amount: f64 },
    UnknownPayer { payment: usize, payer: String },
    UnknownParticipant { payment: usize, member: String },
}

impl fmt::Display for BalanceDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidAmount { payment, amount } => {
                write!(f, "payment #{payment}: invalid amount {amount}")
            }
            Self::UnknownPayer { payment, payer } => {
                write!(f, "payment #{payment}: payer '{payer}' is not a member")
            }
            Self::UnknownParticipant { payment, member } => {
                write!(f, "payment #{payment}: participant '{member}' is not a member")
            }
        }
    }
}

/// Balances of every member, in member order, plus the diagnostics collected
/// along the way.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BalanceSheet {
    pub balances: Vec<MemberBalance>,
    pub diagnostics: Vec<BalanceDiagnostic>,
}

impl BalanceSheet {
    /// Returns the balance of a member, if present.
    pub fn balance(&self, member_id: &str) -> Option<f64> {
        self.balances
            .iter()
            .find(|entry| entry.member_id == member_id)
            .map(|entry| entry.balance)
    }

    /// Sum of every balance. Zero (up to float noise) for a sound sheet.
    pub fn total(&self) -> f64 {
        self.balances.iter().map(|entry| entry.balance).sum()
    }

    pub fn is_balanced(&self) -> bool {
        self.total().abs() < BALANCE_EPSILON
    }
}

/// Computes the balance of every member of an event.
///
/// `members` is the authoritative participant set: duplicated ids are
/// collapsed and an empty set fails with [`EngineError::NoParticipants`].
///
/// Every payment credits its payer with the full amount and debits each
/// participant with `amount / participants` (plain `f64` division, no
/// remainder distribution). An empty participant list means everybody.
/// Malformed data is reported in [`BalanceSheet::diagnostics`]:
///
/// - non-finite or negative amounts skip the payment
/// - an unknown payer is not credited, participants are still debited
/// - unknown participants still count in the share but are not debited
///
/// The last two leave the sheet unbalanced, which
/// [`plan_transfers`](super::plan_transfers) rejects.
pub fn compute_balances(members: &[Member], payments: &[Payment]) -> ResultEngine<BalanceSheet> {
    if members.is_empty() {
        return Err(EngineError::NoParticipants(
            "event has no members".to_string(),
        ));
    }

    let mut index: HashMap<&str, usize> = HashMap::with_capacity(members.len());
    let mut balances = Vec::with_capacity(members.len());
    for member in members {
        if index.contains_key(member.id.as_str()) {
            continue;
        }
        index.insert(member.id.as_str(), balances.len());
        balances.push(MemberBalance {
            member_id: member.id.clone(),
            balance: 0.0,
        });
    }

    let initial = BalanceSheet {
        balances,
        diagnostics: Vec::new(),
    };

    Ok(payments
        .iter()
        .enumerate()
        .fold(initial, |sheet, (position, payment)| {
            apply_payment(sheet, &index, position, payment)
        }))
}

fn apply_payment(
    mut sheet: BalanceSheet,
    index: &HashMap<&str, usize>,
    position: usize,
    payment: &Payment,
) -> BalanceSheet {
    if !payment.amount.is_finite() || payment.amount < 0.0 {
        sheet.diagnostics.push(BalanceDiagnostic::InvalidAmount {
            payment: position,
            amount: payment.amount,
        });
        return sheet;
    }

    match index.get(payment.payer.as_str()) {
        Some(&payer) => sheet.balances[payer].balance += payment.amount,
        None => sheet.diagnostics.push(BalanceDiagnostic::UnknownPayer {
            payment: position,
            payer: payment.payer.clone(),
        }),
    }

    if payment.participants.is_empty() {
        let share = payment.amount / sheet.balances.len() as f64;
        for entry in &mut sheet.balances {
            entry.balance -= share;
        }
        return sheet;
    }

    let share = payment.amount / payment.participants.len() as f64;
    for member in &payment.participants {
        match index.get(member.as_str()) {
            Some(&slot) => sheet.balances[slot].balance -= share,
            None => sheet
                .diagnostics
                .push(BalanceDiagnostic::UnknownParticipant {
                    payment: position,
                    member: member.clone(),
                }),
        }
    }
    sheet
}
