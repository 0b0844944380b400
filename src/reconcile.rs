//! Pure derivations over buffer state.
//!
//! Everything here is synchronous, side-effect free, and re-derivable at
//! any time; nothing mutates the buffer. Duplicates are surfaced as
//! warnings only: the entry workflow never rejects or silently drops a
//! repeated code, and the one deduplicated view lives in
//! [`container_summary`].

use std::collections::BTreeMap;

use crate::errors::{CountKind, EntryError};
use crate::models::{BatchHeader, CodeValue, Container};

/// Distinct code values in one container that occur more than once,
/// paired with their occurrence counts. Single occurrences are omitted.
pub fn container_duplicates(container: &Container) -> BTreeMap<CodeValue, usize> {
    duplicates(container.codes.iter().map(|c| &c.value))
}

/// Same grouping as [`container_duplicates`], across all containers.
pub fn global_duplicates(containers: &[Container]) -> BTreeMap<CodeValue, usize> {
    duplicates(containers.iter().flat_map(|b| b.codes.iter().map(|c| &c.value)))
}

/// Sum of code-list lengths across all containers.
pub fn total_accepted(containers: &[Container]) -> usize {
    containers.iter().map(Container::piece_count).sum()
}

/// Number of distinct code values across all containers.
pub fn distinct_codes(containers: &[Container]) -> usize {
    containers
        .iter()
        .flat_map(|b| b.codes.iter().map(|c| &c.value))
        .collect::<std::collections::BTreeSet<_>>()
        .len()
}

/// Read-only deduplicated summary of one container: every distinct value
/// with its occurrence count, in code order.
pub fn container_summary(container: &Container) -> Vec<(CodeValue, usize)> {
    let mut counts: BTreeMap<&CodeValue, usize> = BTreeMap::new();
    for code in &container.codes {
        *counts.entry(&code.value).or_insert(0) += 1;
    }
    counts.into_iter().map(|(v, n)| (v.clone(), n)).collect()
}

/// Submission-time count gate: the live container count and accepted-code
/// total must equal the operator-declared targets. Violations name both
/// the expected and actual numbers and block submission without blocking
/// further editing.
pub fn check_declared_totals(
    header: &BatchHeader,
    containers: &[Container],
) -> Result<(), EntryError> {
    let actual_containers = containers.len() as u32;
    if actual_containers != header.declared_container_count {
        return Err(EntryError::CountMismatch {
            kind: CountKind::Containers,
            expected: header.declared_container_count,
            actual: actual_containers,
        });
    }
    let actual_pieces = total_accepted(containers) as u32;
    if actual_pieces != header.declared_piece_count {
        return Err(EntryError::CountMismatch {
            kind: CountKind::Pieces,
            expected: header.declared_piece_count,
            actual: actual_pieces,
        });
    }
    Ok(())
}

fn duplicates<'a>(values: impl Iterator<Item = &'a CodeValue>) -> BTreeMap<CodeValue, usize> {
    let mut counts: BTreeMap<&CodeValue, usize> = BTreeMap::new();
    for value in values {
        *counts.entry(value).or_insert(0) += 1;
    }
    counts
        .into_iter()
        .filter(|(_, n)| *n > 1)
        .map(|(v, n)| (v.clone(), n))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::UnitCode;
    use assert_matches::assert_matches;
    use chrono::NaiveDate;
    use proptest::prelude::*;

    fn container(ordinal: u32, codes: &[&str]) -> Container {
        let mut c = Container::new(ordinal);
        c.codes = codes
            .iter()
            .map(|s| UnitCode::new(CodeValue::parse(s).unwrap()))
            .collect();
        c
    }

    fn header(containers: u32, pieces: u32) -> BatchHeader {
        BatchHeader {
            reference_no: "WR-1".into(),
            work_order_no: Some("WO-1".into()),
            document_date: NaiveDate::from_ymd_opt(2024, 1, 2),
            declared_container_count: containers,
            declared_piece_count: pieces,
            remarks: None,
        }
    }

    #[test]
    fn single_occurrences_are_not_flagged() {
        let c = container(1, &["ABC123", "XYZ789"]);
        assert!(container_duplicates(&c).is_empty());
    }

    #[test]
    fn duplicate_counts_per_container_and_global() {
        let c1 = container(1, &["ABC123", "ABC123"]);
        let c2 = container(2, &["ABC123", "XYZ789"]);

        let per = container_duplicates(&c1);
        assert_eq!(per[&CodeValue::parse("ABC123").unwrap()], 2);

        let global = global_duplicates(&[c1, c2]);
        assert_eq!(global[&CodeValue::parse("ABC123").unwrap()], 3);
        assert_eq!(global.len(), 1);
    }

    #[test]
    fn summary_deduplicates_with_counts() {
        let c = container(1, &["ABC123", "ABC123", "XYZ789"]);
        let summary = container_summary(&c);
        assert_eq!(
            summary,
            vec![
                (CodeValue::parse("ABC123").unwrap(), 2),
                (CodeValue::parse("XYZ789").unwrap(), 1),
            ]
        );
    }

    #[test]
    fn count_gate_reports_container_mismatch_first() {
        let containers = vec![container(1, &["ABC123"])];
        let err = check_declared_totals(&header(2, 1), &containers).unwrap_err();
        assert_matches!(
            err,
            EntryError::CountMismatch {
                kind: CountKind::Containers,
                expected: 2,
                actual: 1,
            }
        );
    }

    #[test]
    fn count_gate_reports_piece_mismatch() {
        let containers = vec![container(1, &["ABC123", "ABC123"])];
        let err = check_declared_totals(&header(1, 3), &containers).unwrap_err();
        assert_matches!(
            err,
            EntryError::CountMismatch {
                kind: CountKind::Pieces,
                expected: 3,
                actual: 2,
            }
        );
    }

    #[test]
    fn count_gate_passes_on_exact_match() {
        let containers = vec![
            container(1, &["ABC123", "ABC123"]),
            container(2, &["XYZ789"]),
        ];
        assert!(check_declared_totals(&header(2, 3), &containers).is_ok());
    }

    proptest! {
        /// Duplicate surplus identity: the sum of (count - 1) over flagged
        /// values equals total accepted minus distinct values.
        #[test]
        fn duplicate_surplus_identity(
            raw in prop::collection::vec(
                prop::collection::vec("[A-Z0-9]{6}", 0..12),
                1..5,
            )
        ) {
            let containers: Vec<Container> = raw
                .iter()
                .enumerate()
                .map(|(i, codes)| {
                    container(i as u32 + 1, &codes.iter().map(String::as_str).collect::<Vec<_>>())
                })
                .collect();

            let surplus: usize = global_duplicates(&containers)
                .values()
                .map(|n| n - 1)
                .sum();
            prop_assert_eq!(
                surplus,
                total_accepted(&containers) - distinct_codes(&containers)
            );
        }
    }
}
