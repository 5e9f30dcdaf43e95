// ********* Display formatting ***********
//
// Pure helpers turning raw values (cents, fractions, party codes) into
// the strings shown to the user. No locale is consulted: the formatting
// policy is fixed to the en-US conventions of the reference output.

use crate::model::PartyCode;

/// Lower-cases the input, then upper-cases the first word character of
/// each token. A token opens at the first alphanumeric or underscore
/// character and runs to the next whitespace, so leading punctuation is
/// skipped ("(foo)" -> "(Foo)") but embedded punctuation does not open a
/// new token ("o'neill" -> "O'neill").
pub fn to_title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut in_token = false;
    for c in s.chars().flat_map(|c| c.to_lowercase()) {
        if c.is_whitespace() {
            in_token = false;
            out.push(c);
        } else if !in_token && (c.is_alphanumeric() || c == '_') {
            in_token = true;
            out.extend(c.to_uppercase());
        } else {
            out.push(c);
        }
    }
    out
}

/// Formats a fraction in [0, 1] as a percentage with exactly `places`
/// decimal digits. Rounding is the standard float formatting of the
/// runtime (round half to even).
pub fn format_percent(fraction: f64, places: usize) -> String {
    format!("{:.*}%", places, fraction * 100.0)
}

/// Formats an amount of cents as US dollars with thousands separators
/// and exactly `fraction_digits` decimal digits. The amount is real
/// valued because redistributed totals are generally not integral.
/// Rounding is the standard float formatting of the runtime (round half
/// to even).
pub fn format_usd(cents: f64, fraction_digits: usize) -> String {
    let fixed = format!("{:.*}", fraction_digits, (cents / 100.0).abs());
    let (int_part, frac_part) = match fixed.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (fixed.as_str(), None),
    };
    let mut grouped = String::new();
    let num_digits = int_part.len();
    for (idx, c) in int_part.chars().enumerate() {
        if idx > 0 && (num_digits - idx) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    let sign = if cents < 0.0 { "-" } else { "" };
    match frac_part {
        Some(f) => format!("{}${}.{}", sign, grouped, f),
        None => format!("{}${}", sign, grouped),
    }
}

/// The display name for a party code. Codes outside the lookup table
/// are returned unchanged, never an error.
pub fn party_name(code: &PartyCode) -> &str {
    match code {
        PartyCode::Dem => "Democrat",
        PartyCode::Rep => "Republican",
        PartyCode::Ind => "Independent",
        PartyCode::Oth => "Other",
        PartyCode::Unk => "Unknown",
        PartyCode::Other(c) => c.as_str(),
    }
}

/// The visual-emphasis token for a party code. The major parties get a
/// distinct token, everything else (including UNK) shares the default.
pub fn party_color_class(code: &PartyCode) -> &'static str {
    match code {
        PartyCode::Dem => "party-dem",
        PartyCode::Rep => "party-rep",
        PartyCode::Ind => "party-ind",
        _ => "party-none",
    }
}
