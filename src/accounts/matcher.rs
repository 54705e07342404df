use thiserror::Error;

use crate::core::LedgerAccount;

use super::name::normalize;

/// Outcome of looking for the ledger account backing a source account.
#[derive(Debug, PartialEq, Eq)]
pub enum Match<'a> {
    Found(&'a LedgerAccount),
    NotFound,
    Ambiguous(Ambiguity),
}

/// The criterion which matched more than one ledger account.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Ambiguity {
    #[error("multiple ledger accounts match {0:?}")]
    DisplayName(String),
    #[error("multiple ledger accounts match {0:?}")]
    BaseName(String),
    #[error("multiple ledger accounts match {name:?} for institution {institution:?}")]
    InstitutionSuffix { name: String, institution: String },
    #[error("multiple ledger accounts match {0:?}; rename to disambiguate")]
    Suffix(String),
}

#[derive(Default)]
struct Buckets<'a> {
    display: Vec<&'a LedgerAccount>,
    base: Vec<&'a LedgerAccount>,
    suffix: Vec<&'a LedgerAccount>,
    institution: Vec<&'a LedgerAccount>,
}

/// Picks the ledger account corresponding to a source account.
///
/// Candidates are bucketed by how strongly their title matches: equal to the
/// display name, equal to the base name, ending in the base name at the same
/// institution, and ending in the base name anywhere. The first bucket with
/// exactly one account wins. A bucket with several accounts ends the search
/// as ambiguous instead of falling through to weaker criteria.
pub fn find_matching_account<'a>(
    candidates: &'a [LedgerAccount],
    institution: &str,
    base_name: &str,
    display_name: &str,
) -> Match<'a> {
    let base = normalize(base_name);
    let display = normalize(display_name);
    let ins = normalize(institution);

    let mut buckets = Buckets::default();
    for account in candidates {
        let title = normalize(&account.title);
        if title == display {
            buckets.display.push(account);
            continue;
        }
        if title == base {
            buckets.base.push(account);
            continue;
        }

        // Every title ends with the empty string.
        if !base.is_empty() && title.ends_with(&base) {
            buckets.suffix.push(account);

            if !ins.is_empty() && normalize(&account.institution.title) == ins {
                buckets.institution.push(account);
            }
        }
    }

    let ranked = [
        (buckets.display, Ambiguity::DisplayName(display_name.to_string())),
        (buckets.base, Ambiguity::BaseName(base_name.to_string())),
        (
            buckets.institution,
            Ambiguity::InstitutionSuffix {
                name: base_name.to_string(),
                institution: institution.to_string(),
            },
        ),
        (buckets.suffix, Ambiguity::Suffix(base_name.to_string())),
    ];

    for (bucket, ambiguity) in ranked {
        match bucket.as_slice() {
            [] => continue,
            [account] => return Match::Found(*account),
            _ => return Match::Ambiguous(ambiguity),
        }
    }

    Match::NotFound
}
