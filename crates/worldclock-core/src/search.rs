// crates/worldclock-core/src/search.rs
use crate::record::CityRecord;

/// Queries shorter than this (in characters, after normalization) match nothing.
pub const MIN_QUERY_CHARS: usize = 3;

/// How a city name relates to a normalized query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchKind {
    Exact,
    Prefix,
    Contains,
}

/// Trims and lowercases a raw query. `None` if it is too short to search.
pub fn normalize_query(query: &str) -> Option<String> {
    let q = query.trim().to_lowercase();
    if q.chars().count() < MIN_QUERY_CHARS {
        return None;
    }
    Some(q)
}

/// Classifies `name` against an already-normalized query.
pub fn classify(name: &str, query: &str) -> Option<MatchKind> {
    let name = name.to_lowercase();
    if name == query {
        Some(MatchKind::Exact)
    } else if name.starts_with(query) {
        Some(MatchKind::Prefix)
    } else if name.contains(query) {
        Some(MatchKind::Contains)
    } else {
        None
    }
}

/// Ranked substring search over `records`.
///
/// Exact matches come first, then prefix and contains matches together,
/// each group in record order. The scan stops as soon as `limit` matches of
/// any kind have been collected, so an exact match sitting after that point
/// is never seen. Callers get a good answer quickly, not the global best.
pub fn rank_matches(records: &[CityRecord], query: &str, limit: usize) -> Vec<CityRecord> {
    if limit == 0 {
        return Vec::new();
    }
    let Some(q) = normalize_query(query) else {
        return Vec::new();
    };

    let mut exact = Vec::new();
    let mut partial = Vec::new();

    for city in records {
        match classify(city.name(), &q) {
            Some(MatchKind::Exact) => exact.push(city.clone()),
            Some(MatchKind::Prefix | MatchKind::Contains) => partial.push(city.clone()),
            None => {}
        }
        if exact.len() + partial.len() >= limit {
            break;
        }
    }

    exact.extend(partial);
    exact.truncate(limit);
    exact
}

/// Highest-population record whose timezone equals `timezone` exactly.
/// Ties keep the earliest record.
pub fn best_for_timezone<'a>(records: &'a [CityRecord], timezone: &str) -> Option<&'a CityRecord> {
    records
        .iter()
        .filter(|c| c.timezone() == timezone)
        .fold(None, |best: Option<&CityRecord>, c| match best {
            Some(b) if b.population() >= c.population() => Some(b),
            _ => Some(c),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn city(name: &str, cc: &str, tz: &str) -> CityRecord {
        CityRecord::new(name, cc, tz, 0)
    }

    fn names(cities: &[CityRecord]) -> Vec<&str> {
        cities.iter().map(CityRecord::name).collect()
    }

    fn berlin_pair() -> Vec<CityRecord> {
        vec![
            city("Berlin", "DE", "Europe/Berlin"),
            city("Berlinetta", "US", "America/Denver"),
        ]
    }

    #[test]
    fn exact_before_prefix() {
        let found = rank_matches(&berlin_pair(), "berlin", 10);
        assert_eq!(names(&found), vec!["Berlin", "Berlinetta"]);
    }

    #[test]
    fn exact_wins_even_when_listed_later() {
        let mut records = berlin_pair();
        records.reverse();
        let found = rank_matches(&records, "BERLIN", 10);
        assert_eq!(names(&found), vec!["Berlin", "Berlinetta"]);
    }

    #[test]
    fn limit_one_keeps_exact_match() {
        let found = rank_matches(&berlin_pair(), "berlin", 1);
        assert_eq!(names(&found), vec!["Berlin"]);
    }

    #[test]
    fn prefix_and_contains_keep_record_order() {
        let records = vec![
            city("East Berlin", "DE", "Europe/Berlin"),
            city("Berlingen", "CH", "Europe/Zurich"),
            city("New Berlin", "US", "America/Chicago"),
        ];
        let found = rank_matches(&records, "berlin", 10);
        assert_eq!(names(&found), vec!["East Berlin", "Berlingen", "New Berlin"]);
    }

    #[test]
    fn short_queries_match_nothing() {
        let records = berlin_pair();
        for q in ["", "b", "be", "  be  ", "\tBE\n"] {
            assert!(rank_matches(&records, q, 10).is_empty(), "query {q:?}");
        }
    }

    #[test]
    fn query_is_trimmed_and_folded() {
        let found = rank_matches(&berlin_pair(), "  BeRlIn ", 10);
        assert_eq!(names(&found), vec!["Berlin", "Berlinetta"]);
    }

    #[test]
    fn minimum_length_counts_characters_not_bytes() {
        let records = vec![city("Łódź", "PL", "Europe/Warsaw")];
        assert!(normalize_query("łó").is_none());
        assert_eq!(names(&rank_matches(&records, "łód", 5)), vec!["Łódź"]);
    }

    #[test]
    fn scan_stops_at_limit() {
        let records = vec![
            city("Springfield", "US", "America/Chicago"),
            city("West Springfield", "US", "America/New_York"),
            city("Spring", "US", "America/Chicago"),
        ];
        // The exact "Spring" sits past the cutoff and is not seen.
        let found = rank_matches(&records, "spring", 2);
        assert_eq!(names(&found), vec!["Springfield", "West Springfield"]);
    }

    #[test]
    fn zero_limit_is_empty() {
        assert!(rank_matches(&berlin_pair(), "berlin", 0).is_empty());
    }

    #[test]
    fn classify_buckets() {
        assert_eq!(classify("Paris", "paris"), Some(MatchKind::Exact));
        assert_eq!(classify("Parisot", "paris"), Some(MatchKind::Prefix));
        assert_eq!(classify("Cormeilles-en-Parisis", "paris"), Some(MatchKind::Contains));
        assert_eq!(classify("Lyon", "paris"), None);
    }

    #[test]
    fn best_for_timezone_prefers_population() {
        let records = vec![
            CityRecord::new("Potsdam", "DE", "Europe/Berlin", 182_112),
            CityRecord::new("Berlin", "DE", "Europe/Berlin", 3_426_354),
            CityRecord::new("Hamburg", "DE", "Europe/Berlin", 1_739_117),
            CityRecord::new("Vienna", "AT", "Europe/Vienna", 1_691_468),
        ];
        let best = best_for_timezone(&records, "Europe/Berlin").unwrap();
        assert_eq!(best.name(), "Berlin");
        assert!(best_for_timezone(&records, "europe/berlin").is_none());
    }

    #[test]
    fn best_for_timezone_ties_keep_first() {
        let records = vec![
            CityRecord::new("A", "XX", "Etc/UTC", 5),
            CityRecord::new("B", "XX", "Etc/UTC", 5),
        ];
        assert_eq!(best_for_timezone(&records, "Etc/UTC").unwrap().name(), "A");
    }
}
