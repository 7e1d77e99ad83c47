//! Free-text filtering of the record list.

use crate::Record;

/// Whether `record` matches an already-lowercased query.
///
/// A record matches when any of its hospital number, status, collector or
/// enrollment date contains the query. The empty query matches everything.
pub fn matches(record: &Record, query_lower: &str) -> bool {
    if query_lower.is_empty() {
        return true;
    }
    [
        &record.hospital_number,
        &record.status,
        &record.collected_by,
        &record.date_enrollment,
    ]
    .iter()
    .any(|field| field.to_lowercase().contains(query_lower))
}

/// Compute the filtered view: indices into `records` of every match, in the
/// original order.
pub fn filtered_indices(records: &[Record], query: &str) -> Vec<usize> {
    let query_lower = query.to_lowercase();
    records
        .iter()
        .enumerate()
        .filter(|(_, r)| matches(r, &query_lower))
        .map(|(i, _)| i)
        .collect()
}
