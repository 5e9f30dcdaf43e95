mod format;
mod model;
use log::debug;

use std::cmp::Ordering;
use std::collections::HashMap;

pub use crate::format::*;
pub use crate::model::*;

// Tolerance when checking that the percentages of a mapping sum to 1.
const PERCENT_SUM_TOLERANCE: f64 = 1e-6;

fn check_party_invariants(parties: &HashMap<PartyCode, PartySummary>) -> Result<(), SummaryError> {
    if parties.is_empty() {
        return Err(SummaryError::EmptyPartyMapping);
    }
    let mut percent_sum = 0.0;
    for (code, ps) in parties.iter() {
        if ps.total_cents < 0.0 {
            return Err(SummaryError::BrokenInvariant(format!(
                "negative amount {} for party {}",
                ps.total_cents,
                code.code()
            )));
        }
        percent_sum += ps.percent;
    }
    if (percent_sum - 1.0).abs() > PERCENT_SUM_TOLERANCE {
        return Err(SummaryError::BrokenInvariant(format!(
            "party percentages sum to {} instead of 1",
            percent_sum
        )));
    }
    Ok(())
}

/// Folds the unknown-party bucket of a mapping proportionally into the
/// known parties, so that the displayed breakdown reflects best-estimate
/// attribution.
///
/// Two passes: the provisional totals are computed with the *original*
/// percentages (the redistribution weight is the share of all funds, not
/// the share of known funds), then the percentages are recomputed over
/// the revised grand total so they sum to 1 over the known keys. The
/// `UNK` key is dropped from the output.
///
/// Two degenerate shapes are returned unchanged: a mapping with no `UNK`
/// key, and a mapping where `UNK` is the only key (there is no known
/// party to fold into).
pub fn revise_party_summary(
    parties: &HashMap<PartyCode, PartySummary>,
) -> Result<HashMap<PartyCode, PartySummary>, SummaryError> {
    check_party_invariants(parties)?;
    let unknown_cents = match parties.get(&PartyCode::Unk) {
        None => {
            return Ok(parties.clone());
        }
        Some(unknown) => unknown.total_cents,
    };
    if parties.len() == 1 {
        // Wholly unknown: nowhere to redistribute to.
        debug!("revise_party_summary: single UNK entry, keeping as is");
        return Ok(parties.clone());
    }

    // Pass 1: provisional totals for the known parties, in the fixed
    // priority order so that the floating-point sums do not depend on
    // map iteration order.
    let mut revised: Vec<(PartyCode, f64)> = parties
        .iter()
        .filter(|(code, _)| **code != PartyCode::Unk)
        .map(|(code, ps)| (code.clone(), ps.total_cents + unknown_cents * ps.percent))
        .collect();
    revised.sort_by(|(a, _), (b, _)| a.cmp(b));

    // The grand total is computed before any percent is assigned.
    let revised_total: f64 = revised.iter().map(|(_, cents)| cents).sum();
    debug!(
        "revise_party_summary: folded {} unknown cents, revised total {}",
        unknown_cents, revised_total
    );

    // Pass 2: renormalize.
    let res = revised
        .into_iter()
        .map(|(code, cents)| {
            (
                code,
                PartySummary {
                    total_cents: cents,
                    percent: cents / revised_total,
                },
            )
        })
        .collect();
    Ok(res)
}

/// Orders two results by the total amount contributed, ascending. No
/// secondary key: ties are left to the stability of the sort.
pub fn compare_search_results(a: &SearchResult, b: &SearchResult) -> Ordering {
    a.summary
        .total_cents
        .partial_cmp(&b.summary.total_cents)
        .unwrap_or(Ordering::Equal)
}

/// Reorders a response for display, largest total first.
///
/// This is a stable ascending sort followed by a full reverse, which is
/// not the same as a stable descending sort: contacts with equal totals
/// end up in the reverse of their original relative order. The reference
/// output depends on this exact behavior.
pub fn order_for_display(results: &mut [SearchResult]) {
    results.sort_by(compare_search_results);
    results.reverse();
}

/// The party with the largest share of a revised mapping, used to pick
/// the emphasis color of a rendered contact. Ties are broken by the
/// fixed priority order of `PartyCode`.
pub fn dominant_party(parties: &HashMap<PartyCode, PartySummary>) -> Option<PartyCode> {
    let mut codes: Vec<&PartyCode> = parties.keys().collect();
    codes.sort();
    let mut best: Option<(&PartyCode, f64)> = None;
    for code in codes {
        let percent = parties[code].percent;
        match best {
            Some((_, best_percent)) if percent <= best_percent => {}
            _ => {
                best = Some((code, percent));
            }
        }
    }
    best.map(|(code, _)| code.clone())
}
