//! Waterfall funding, destination splits and posting pairing for one send

use crate::executor::pending::PendingBalances;
use crate::ledger::{Ledger, Posting};
use crate::semantic::{DestinationTarget, Portion, SendStatement, Source};
use crate::{NumscriptError, NumscriptResult};
use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::{Signed, Zero};
use std::cmp::min;

/// Amount drawn from one source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Withdrawal {
    pub account: String,
    pub amount: BigInt,
}

/// Where a share of the total goes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Recipient {
    Account(String),
    Kept,
}

/// Share of the total assigned to one destination entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Allocation {
    pub recipient: Recipient,
    pub amount: BigInt,
}

/// Drain the sources in order until `total` is covered
///
/// A source with overdraft, `@world` included, covers the whole remaining
/// need up to its `max` cap. Any other source gives at most its effective
/// balance. When need is left over the send fails, unless some source is
/// `@world` or unbounded; that source then covers the rest.
pub fn fund_sources(
    send: &SendStatement,
    total: &BigInt,
    ledger: &Ledger,
    pending: &PendingBalances,
) -> NumscriptResult<Vec<Withdrawal>> {
    if send.sources.is_empty() {
        return Err(NumscriptError::Execution(format!(
            "send {} has no source",
            send.monetary
        )));
    }
    let asset = &send.monetary.asset;
    let mut need = total.clone();
    let mut withdrawals: Vec<Withdrawal> = Vec::new();

    for source in &send.sources {
        if need.is_zero() {
            break;
        }
        let address = source.account.resolve()?;
        let cap = source_cap(source, asset)?;

        let take = if source.allows_overdraft() {
            cap.map_or_else(|| need.clone(), |cap| min(need.clone(), cap))
        } else {
            // An account listed twice only has what earlier entries left
            let available = (pending.effective_balance(ledger, address, asset)
                - drawn(&withdrawals, address))
            .max(BigInt::zero());
            let take = min(need.clone(), available);
            cap.map_or(take.clone(), |cap| min(take, cap))
        };

        if take.is_positive() {
            need -= &take;
            withdraw(&mut withdrawals, address, take);
        }
    }

    if need.is_positive() {
        let unbounded = send.sources.iter().find(|source| source.is_unbounded());
        match unbounded {
            Some(source) => withdraw(&mut withdrawals, source.account.resolve()?, need),
            None => {
                let account = send
                    .sources
                    .iter()
                    .map(|source| source.account.to_string())
                    .collect::<Vec<_>>()
                    .join(", ");
                return Err(NumscriptError::InsufficientFunds {
                    account,
                    asset: asset.clone(),
                    available: total - &need,
                    required: total.clone(),
                });
            }
        }
    }

    Ok(withdrawals)
}

fn source_cap(source: &Source, asset: &str) -> NumscriptResult<Option<BigInt>> {
    let Some(max) = &source.max else {
        return Ok(None);
    };
    if max.asset != asset {
        return Err(NumscriptError::Execution(format!(
            "max {} on {} does not match the sent asset {}",
            max, source.account, asset
        )));
    }
    Ok(Some(max.fixed_amount()?.clone()))
}

fn drawn(withdrawals: &[Withdrawal], account: &str) -> BigInt {
    withdrawals
        .iter()
        .find(|w| w.account == account)
        .map_or_else(BigInt::zero, |w| w.amount.clone())
}

fn withdraw(withdrawals: &mut Vec<Withdrawal>, account: &str, amount: BigInt) {
    match withdrawals.iter_mut().find(|w| w.account == account) {
        Some(existing) => existing.amount += amount,
        None => withdrawals.push(Withdrawal {
            account: account.to_string(),
            amount,
        }),
    }
}

/// Divide `total` among the destination entries
///
/// Percentages and fractions are floored against the total. The entry marked
/// `remaining`, or else the last entry, also receives whatever is left.
pub fn split_destinations(
    send: &SendStatement,
    total: &BigInt,
) -> NumscriptResult<Vec<Allocation>> {
    let destinations = &send.destinations;
    if destinations.is_empty() {
        return Err(NumscriptError::Execution(format!(
            "send {} has no destination",
            send.monetary
        )));
    }

    let remaining_count = destinations.iter().filter(|d| d.is_remaining()).count();
    if remaining_count > 1 {
        return Err(NumscriptError::Unsupported(format!(
            "send {} has {} `remaining` destinations; at most one is allowed",
            send.monetary, remaining_count
        )));
    }
    let absorber = destinations
        .iter()
        .position(|d| d.is_remaining())
        .unwrap_or(destinations.len() - 1);

    let mut allocations = Vec::with_capacity(destinations.len());
    let mut assigned = BigInt::zero();
    for destination in destinations {
        let amount = match &destination.portion {
            Some(portion) => portion_of(portion, total),
            None => BigInt::zero(),
        };
        assigned += &amount;
        let recipient = match &destination.target {
            DestinationTarget::Account(account) => {
                Recipient::Account(account.resolve()?.to_string())
            }
            DestinationTarget::Kept => Recipient::Kept,
        };
        allocations.push(Allocation { recipient, amount });
    }

    if &assigned > total {
        return Err(NumscriptError::Execution(format!(
            "portions of send {} add up to {}, more than the total {}",
            send.monetary, assigned, total
        )));
    }
    allocations[absorber].amount += total - &assigned;

    Ok(allocations)
}

fn portion_of(portion: &Portion, total: &BigInt) -> BigInt {
    match portion {
        Portion::Percentage { value } => {
            let numerator = BigInt::from(value.mantissa());
            let denominator = num_traits::pow(BigInt::from(10), value.scale() as usize) * 100;
            (total * numerator).div_floor(&denominator)
        }
        Portion::Fraction {
            numerator,
            denominator,
        } => (total * numerator).div_floor(denominator),
        Portion::Remaining => BigInt::zero(),
    }
}

/// Pair withdrawals with allocations in order, splitting either side as needed
///
/// Every posting is recorded in `pending` as soon as it is built. Shares
/// going to `kept` consume source funds without producing a posting.
pub fn pair_postings(
    asset: &str,
    withdrawals: &[Withdrawal],
    allocations: &[Allocation],
    pending: &mut PendingBalances,
) -> Vec<Posting> {
    let mut postings = Vec::new();
    let mut source_left: Vec<BigInt> = withdrawals.iter().map(|w| w.amount.clone()).collect();
    let mut dest_left: Vec<BigInt> = allocations.iter().map(|a| a.amount.clone()).collect();
    let (mut s, mut d) = (0, 0);

    while s < withdrawals.len() && d < allocations.len() {
        if !source_left[s].is_positive() {
            s += 1;
            continue;
        }
        if !dest_left[d].is_positive() {
            d += 1;
            continue;
        }

        let amount = min(source_left[s].clone(), dest_left[d].clone());
        source_left[s] -= &amount;
        dest_left[d] -= &amount;

        if let Recipient::Account(destination) = &allocations[d].recipient {
            let posting = Posting::new(&withdrawals[s].account, destination, asset, amount);
            pending.record(&posting);
            postings.push(posting);
        }
    }

    postings
}
