use log::{debug, warn};

use contrib_summary::*;
use snafu::{prelude::*, Snafu};

use std::fs;

use serde::{Deserialize, Serialize};
use serde_json::json;
use serde_json::Value as JSValue;
use text_diff::print_diff;

use crate::args::Args;

#[derive(Debug, Snafu)]
pub enum LookupError {
    #[snafu(display("Error opening file {path}"))]
    OpeningJson {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display(""))]
    ParsingJson { source: serde_json::Error },
    #[snafu(display("Error writing rendered output to {path}"))]
    WritingOutput {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("A summary in the response broke the engine invariants"))]
    Revise { source: SummaryError },

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

pub type LookupResult<T> = Result<T, LookupError>;

pub mod response_reader {
    use crate::lookup::*;
    use std::collections::HashMap;

    // The wire shapes of the backend contract. The backend answers one
    // multipart POST per uploaded contact list with this JSON document.
    // Only the `ok` discriminant is validated here; everything else is
    // trusted as-is.

    #[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
    pub struct RawContact {
        pub first_name: String,
        pub last_name: String,
        pub city: String,
        pub state: String,
        pub phone: Option<String>,
        pub npa_id: Option<String>,
    }

    #[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
    pub struct RawCommitteeSummary {
        pub name: String,
        pub party: Option<String>,
        pub total_cents: u64,
        pub percent: f64,
    }

    #[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
    pub struct RawPartySummary {
        pub total_cents: u64,
        pub percent: f64,
    }

    #[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
    pub struct RawSummary {
        pub total_cents: u64,
        #[serde(default)]
        pub committees: HashMap<String, RawCommitteeSummary>,
        pub parties: HashMap<String, RawPartySummary>,
    }

    #[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
    pub struct RawResult {
        pub contact: RawContact,
        pub summary: RawSummary,
    }

    #[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
    pub struct RawResponse {
        pub ok: bool,
        pub results: Option<Vec<RawResult>>,
        pub message: Option<String>,
        pub code: Option<String>,
    }

    fn to_summary(raw: &RawSummary) -> ContributionSummary {
        let committees: HashMap<String, CommitteeSummary> = raw
            .committees
            .iter()
            .map(|(id, c)| {
                (
                    id.clone(),
                    CommitteeSummary {
                        name: c.name.clone(),
                        party: c.party.as_deref().map(PartyCode::from_code),
                        total_cents: c.total_cents as f64,
                        percent: c.percent,
                    },
                )
            })
            .collect();
        let parties: HashMap<PartyCode, PartySummary> = raw
            .parties
            .iter()
            .map(|(code, ps)| {
                (
                    PartyCode::from_code(code),
                    PartySummary {
                        total_cents: ps.total_cents as f64,
                        percent: ps.percent,
                    },
                )
            })
            .collect();
        ContributionSummary {
            total_cents: raw.total_cents as f64,
            committees,
            parties,
        }
    }

    pub fn to_search_response(raw: &RawResponse) -> LookupResult<SearchResponse> {
        if !raw.ok {
            return Ok(SearchResponse::Failed {
                message: raw.message.clone().unwrap_or_default(),
                code: raw.code.clone().unwrap_or_default(),
            });
        }
        let raw_results = match &raw.results {
            Some(rs) => rs,
            None => {
                whatever!("Successful response is missing the results field")
            }
        };
        let results: Vec<SearchResult> = raw_results
            .iter()
            .map(|r| SearchResult {
                contact: Contact {
                    first_name: r.contact.first_name.clone(),
                    last_name: r.contact.last_name.clone(),
                    city: r.contact.city.clone(),
                    state: r.contact.state.clone(),
                    phone: r.contact.phone.clone(),
                    npa_id: r.contact.npa_id.clone(),
                },
                summary: to_summary(&r.summary),
            })
            .collect();
        Ok(SearchResponse::Results(results))
    }

    pub fn parse_response(contents: &str) -> LookupResult<SearchResponse> {
        let raw: RawResponse = serde_json::from_str(contents).context(ParsingJsonSnafu {})?;
        debug!("parse_response: raw response: {:?}", raw);
        to_search_response(&raw)
    }

    pub fn read_response(path: String) -> LookupResult<SearchResponse> {
        let contents = fs::read_to_string(path.clone()).context(OpeningJsonSnafu { path })?;
        parse_response(contents.as_str())
    }

    pub fn read_reference(path: String) -> LookupResult<JSValue> {
        let contents = fs::read_to_string(path.clone()).context(OpeningJsonSnafu { path })?;
        let js: JSValue = serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
        Ok(js)
    }
}

fn render_result(result: &SearchResult) -> LookupResult<JSValue> {
    let revised = revise_party_summary(&result.summary.parties).context(ReviseSnafu {})?;
    let emphasis = match dominant_party(&revised) {
        Some(code) => party_color_class(&code),
        None => party_color_class(&PartyCode::Unk),
    };

    // Party lines in the fixed priority order, so the rendering does not
    // depend on map iteration order.
    let mut codes: Vec<&PartyCode> = revised.keys().collect();
    codes.sort();
    let mut party_lines: Vec<JSValue> = Vec::new();
    for code in codes {
        let ps = &revised[code];
        party_lines.push(json!({
            "party": party_name(code),
            "total": format_usd(ps.total_cents, 0),
            "percent": format_percent(ps.percent, 1),
        }));
    }

    let contact = &result.contact;
    let name = to_title_case(format!("{} {}", contact.first_name, contact.last_name).as_str());
    Ok(json!({
        "npaId": contact.npa_id,
        "name": name,
        "nameClass": emphasis,
        "city": to_title_case(contact.city.as_str()),
        "state": contact.state,
        "total": format_usd(result.summary.total_cents, 0),
        "parties": party_lines,
    }))
}

/// Assembles the display document for a response: results reordered
/// largest total first, each summary revised and formatted. A failed
/// response is passed through verbatim (message and code untouched).
pub fn render_response(response: &SearchResponse) -> LookupResult<JSValue> {
    match response {
        SearchResponse::Failed { message, code } => Ok(json!({
            "ok": false,
            "message": message,
            "code": code,
        })),
        SearchResponse::Results(results) => {
            let mut ordered = results.to_vec();
            order_for_display(&mut ordered);
            let mut rendered: Vec<JSValue> = Vec::new();
            for r in ordered.iter() {
                debug!(
                    "render_response: contact {:?} summary:\n{}",
                    r.contact.npa_id, r.summary
                );
                rendered.push(render_result(r)?);
            }
            Ok(json!({
                "ok": true,
                "results": rendered,
            }))
        }
    }
}

pub fn run_lookup(args: &Args) -> LookupResult<()> {
    let response = response_reader::read_response(args.input.clone())?;
    if let SearchResponse::Failed { message, code } = &response {
        warn!("backend search failed: {} (code {})", message, code);
    }

    let rendered = render_response(&response)?;
    let pretty = serde_json::to_string_pretty(&rendered).context(ParsingJsonSnafu {})?;
    match args.out.clone() {
        Some(path) if path != "stdout" => {
            fs::write(path.clone(), &pretty).context(WritingOutputSnafu { path })?;
        }
        _ => println!("{}", pretty),
    }

    // The reference rendering, if provided for comparison
    if let Some(reference_path) = args.reference.clone() {
        let reference = response_reader::read_reference(reference_path)?;
        let pretty_ref = serde_json::to_string_pretty(&reference).context(ParsingJsonSnafu {})?;
        if pretty_ref != pretty {
            warn!("Found differences with the reference rendering");
            print_diff(pretty_ref.as_str(), pretty.as_str(), "\n");
            whatever!("Difference detected between rendered summary and reference rendering")
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::response_reader::parse_response;
    use super::*;

    const TWO_CONTACTS: &str = r#"{
        "ok": true,
        "results": [
            {
                "contact": {
                    "first_name": "MICHAEL",
                    "last_name": "MATHIEU",
                    "city": "SEATTLE",
                    "state": "WA",
                    "phone": "2065550100",
                    "npa_id": "206"
                },
                "summary": {
                    "total_cents": 100000,
                    "committees": {
                        "C00000001": {
                            "name": "EXAMPLE FOR AMERICA",
                            "party": "DEM",
                            "total_cents": 100000,
                            "percent": 1.0
                        }
                    },
                    "parties": {
                        "DEM": {"total_cents": 60000, "percent": 0.6},
                        "UNK": {"total_cents": 40000, "percent": 0.4}
                    }
                }
            },
            {
                "contact": {
                    "first_name": "JANE",
                    "last_name": "O'NEILL",
                    "city": "WALLA WALLA",
                    "state": "WA",
                    "phone": null,
                    "npa_id": "509"
                },
                "summary": {
                    "total_cents": 200000,
                    "committees": {},
                    "parties": {
                        "REP": {"total_cents": 200000, "percent": 1.0}
                    }
                }
            }
        ]
    }"#;

    #[test]
    fn renders_ordered_revised_response() {
        let response = parse_response(TWO_CONTACTS).unwrap();
        let rendered = render_response(&response).unwrap();
        assert_eq!(rendered["ok"], json!(true));
        let results = rendered["results"].as_array().unwrap();
        assert_eq!(results.len(), 2);

        // Largest total first.
        let first = &results[0];
        assert_eq!(first["name"], json!("Jane O'neill"));
        assert_eq!(first["nameClass"], json!("party-rep"));
        assert_eq!(first["city"], json!("Walla Walla"));
        assert_eq!(first["total"], json!("$2,000"));

        // The unknown bucket has been folded into the single known party.
        let second = &results[1];
        assert_eq!(second["name"], json!("Michael Mathieu"));
        assert_eq!(second["nameClass"], json!("party-dem"));
        assert_eq!(second["npaId"], json!("206"));
        // 60000 + 40000 * 0.6 cents, renormalized over the single known key.
        assert_eq!(
            second["parties"],
            json!([{"party": "Democrat", "total": "$840", "percent": "100.0%"}])
        );
    }

    #[test]
    fn committee_breakdown_is_preserved_by_parsing() {
        let response = parse_response(TWO_CONTACTS).unwrap();
        let results = match response {
            SearchResponse::Results(rs) => rs,
            _ => panic!("expected results"),
        };
        let committees = &results[0].summary.committees;
        assert_eq!(committees.len(), 1);
        let committee = &committees["C00000001"];
        assert_eq!(committee.name, "EXAMPLE FOR AMERICA");
        assert_eq!(committee.party, Some(PartyCode::Dem));
    }

    #[test]
    fn failed_response_is_surfaced_verbatim() {
        let contents = r#"{"ok": false, "message": "no file field", "code": "E_BAD_UPLOAD"}"#;
        let response = parse_response(contents).unwrap();
        assert_eq!(
            response,
            SearchResponse::Failed {
                message: "no file field".to_string(),
                code: "E_BAD_UPLOAD".to_string(),
            }
        );
        let rendered = render_response(&response).unwrap();
        assert_eq!(
            rendered,
            json!({"ok": false, "message": "no file field", "code": "E_BAD_UPLOAD"})
        );
    }

    #[test]
    fn success_without_results_is_rejected() {
        let contents = r#"{"ok": true}"#;
        assert!(parse_response(contents).is_err());
    }

    #[test]
    fn broken_percentages_are_rejected_at_render() {
        let contents = r#"{
            "ok": true,
            "results": [{
                "contact": {
                    "first_name": "A", "last_name": "B",
                    "city": "C", "state": "WA",
                    "phone": null, "npa_id": null
                },
                "summary": {
                    "total_cents": 100,
                    "committees": {},
                    "parties": {"DEM": {"total_cents": 100, "percent": 0.5}}
                }
            }]
        }"#;
        let response = parse_response(contents).unwrap();
        let res = render_response(&response);
        assert!(matches!(res, Err(LookupError::Revise { .. })));
    }
}
