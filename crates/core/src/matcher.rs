use crate::record::QuoteRecord;

/// Key used for every name comparison: trimmed, lowercased.
pub fn normalize_key(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Every record whose origin and destination match the query. An empty result is
/// a normal outcome, not an error.
pub fn find_matches<'a>(
    records: &'a [QuoteRecord],
    origin: &str,
    destination: &str,
) -> Vec<&'a QuoteRecord> {
    let origin = normalize_key(origin);
    let destination = normalize_key(destination);
    records
        .iter()
        .filter(|record| {
            normalize_key(&record.origin_name) == origin
                && normalize_key(&record.destination_name) == destination
        })
        .collect()
}
