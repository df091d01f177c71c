// Compiled patterns for PII detection

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    pub static ref EMAIL: Regex = Regex::new(
        r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b"
    ).expect("EMAIL regex is valid");

    pub static ref PHONE: Regex = Regex::new(
        r"(?:\+\d{1,3}[\s.-]?)?(?:\(\d{3}\)|\b\d{3})[\s.-]?\d{3}[\s.-]?\d{4}\b"
    ).expect("PHONE regex is valid");

    pub static ref US_SSN: Regex = Regex::new(
        r"\b\d{3}-\d{2}-\d{4}\b"
    ).expect("US_SSN regex is valid");

    pub static ref CREDIT_CARD: Regex = Regex::new(
        r"\b(?:\d[ -]?){12,18}\d\b"
    ).expect("CREDIT_CARD regex is valid");

    pub static ref IP_ADDRESS: Regex = Regex::new(
        r"\b(?:(?:25[0-5]|2[0-4][0-9]|[01]?[0-9][0-9]?)\.){3}(?:25[0-5]|2[0-4][0-9]|[01]?[0-9][0-9]?)\b"
    ).expect("IP_ADDRESS regex is valid");

    pub static ref URL: Regex = Regex::new(
        r#"\b(?:https?://|www\.)[^\s<>"']+[^\s<>"'.,;:!?)]"#
    ).expect("URL regex is valid");
}

/// Luhn checksum over the digits of a candidate card number
pub fn luhn_valid(candidate: &str) -> bool {
    let digits: Vec<u32> = candidate.chars().filter_map(|c| c.to_digit(10)).collect();
    if !(13..=19).contains(&digits.len()) {
        return false;
    }

    let sum: u32 = digits
        .iter()
        .rev()
        .enumerate()
        .map(|(i, &d)| {
            if i % 2 == 1 {
                let doubled = d * 2;
                if doubled > 9 { doubled - 9 } else { doubled }
            } else {
                d
            }
        })
        .sum();

    sum % 10 == 0
}

/// Area, group and serial of an SSN can't be all zeros; 666 and 9xx areas are never issued
pub fn ssn_valid(candidate: &str) -> bool {
    let parts: Vec<&str> = candidate.split('-').collect();
    let [area, group, serial] = parts.as_slice() else {
        return false;
    };
    *area != "000" && *area != "666" && !area.starts_with('9') && *group != "00" && *serial != "0000"
}
