// ********* Input data structures ***********

use std::error::Error;
use std::fmt::Display;

use crate::format::{format_percent, format_usd, party_name};

/// The political affiliation of a committee, as classified by the FEC
/// bulk data.
///
/// The set of codes in the wild is much larger than the handful we
/// special-case (see the FEC party code descriptions). Anything outside
/// the closed set is carried through unchanged in `Other`.
///
/// The declaration order of the variants is meaningful: it is the fixed
/// priority order used to break ties when selecting a dominant party and
/// to order party lines in rendered output. `Other` codes come last, in
/// lexicographic order.
#[derive(Eq, PartialEq, Debug, Clone, Hash, PartialOrd, Ord)]
pub enum PartyCode {
    Dem,
    Rep,
    Ind,
    Oth,
    /// The affiliation could not be determined upstream.
    Unk,
    /// Any code we do not special-case (LIB, GRE, ...).
    Other(String),
}

impl PartyCode {
    pub fn from_code(code: &str) -> PartyCode {
        match code {
            "DEM" => PartyCode::Dem,
            "REP" => PartyCode::Rep,
            "IND" => PartyCode::Ind,
            "OTH" => PartyCode::Oth,
            "UNK" => PartyCode::Unk,
            c => PartyCode::Other(c.to_string()),
        }
    }

    pub fn code(&self) -> &str {
        match self {
            PartyCode::Dem => "DEM",
            PartyCode::Rep => "REP",
            PartyCode::Ind => "IND",
            PartyCode::Oth => "OTH",
            PartyCode::Unk => "UNK",
            PartyCode::Other(c) => c.as_str(),
        }
    }
}

/// The slice of a contact's contributions that went to one party.
///
/// The backend sends exact integer cents. After redistribution the
/// amounts are generally not integral anymore, hence the real-valued
/// representation.
#[derive(PartialEq, Debug, Clone)]
pub struct PartySummary {
    pub total_cents: f64,
    /// Share of the contact's full total, in [0, 1].
    pub percent: f64,
}

/// The slice of a contact's contributions that went to one committee.
/// Display-only: the summary algorithms never transform it.
#[derive(PartialEq, Debug, Clone)]
pub struct CommitteeSummary {
    pub name: String,
    pub party: Option<PartyCode>,
    pub total_cents: f64,
    pub percent: f64,
}

/// Everything the backend matched for one contact, as one immutable
/// snapshot. The committee and party maps are keyed by committee id and
/// party code respectively.
#[derive(PartialEq, Debug, Clone)]
pub struct ContributionSummary {
    pub total_cents: f64,
    pub committees: std::collections::HashMap<String, CommitteeSummary>,
    pub parties: std::collections::HashMap<PartyCode, PartySummary>,
}

impl Display for ContributionSummary {
    /// Pretty prints a summary, one line per party in priority order.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Total: {}", format_usd(self.total_cents, 0))?;
        writeln!(f, "Parties:")?;
        let mut codes: Vec<&PartyCode> = self.parties.keys().collect();
        codes.sort();
        for code in codes {
            let ps = &self.parties[code];
            writeln!(
                f,
                "  {}: {} ({})",
                party_name(code),
                format_usd(ps.total_cents, 0),
                format_percent(ps.percent, 1)
            )?;
        }
        Ok(())
    }
}

/// A person from the uploaded contact list.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Contact {
    pub first_name: String,
    pub last_name: String,
    pub city: String,
    pub state: String,
    pub phone: Option<String>,
    /// Stable identity for this contact across a response. Used as the
    /// rendering key.
    pub npa_id: Option<String>,
}

/// One matched contact together with its contribution summary.
#[derive(PartialEq, Debug, Clone)]
pub struct SearchResult {
    pub contact: Contact,
    pub summary: ContributionSummary,
}

/// The outcome of one submitted search. There is no partial success:
/// either the backend matched the whole upload or it failed.
#[derive(PartialEq, Debug, Clone)]
pub enum SearchResponse {
    Results(Vec<SearchResult>),
    /// Surfaced verbatim to the caller. `code` is an opaque
    /// machine-readable identifier.
    Failed { message: String, code: String },
}

// ******** Errors *********

/// Precondition violations detected by the summary algorithms.
///
/// The policy here is to reject broken input rather than to produce a
/// silently wrong breakdown.
#[derive(PartialEq, Debug, Clone)]
pub enum SummaryError {
    EmptyPartyMapping,
    BrokenInvariant(String),
}

impl Error for SummaryError {}

impl Display for SummaryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SummaryError::EmptyPartyMapping => {
                write!(f, "the party mapping of a summary is empty")
            }
            SummaryError::BrokenInvariant(msg) => {
                write!(f, "broken summary invariant: {}", msg)
            }
        }
    }
}
