//! Query engine for roster.
//!
//! Filters a snapshot of people by exact age and fuzzy name. The engine never
//! touches the store or the disk, so it can run under a shared read lock.

pub mod fuzzy;

use std::collections::HashSet;

use serde::{Deserialize, Serialize, Serializer};
use tracing::{debug, trace};

use crate::person::Person;

/// How many top-scoring names a name filter keeps.
pub const NAME_MATCH_LIMIT: usize = 2;

/// Minimum fuzzy score for a name to count as a match.
pub const NAME_MATCH_THRESHOLD: u8 = 70;

/// Diagnostic returned when a search names no filter at all.
pub const NO_FILTERS_MESSAGE: &str = "No filters were provided. Please provide an age or a name.";

/// Diagnostic returned when filters were given but nothing matched.
pub const NO_MATCHES_MESSAGE: &str = "No matching person found.";

/// Search criteria. Every field is optional; set fields are combined.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchFilter {
    /// Keep people whose age equals this exactly. Signed, so a negative age
    /// is a valid filter that matches no one.
    pub age: Option<i64>,
    /// Keep people whose name fuzzily matches this.
    pub name: Option<String>,
}

impl SearchFilter {
    /// A filter on age only.
    #[must_use]
    pub fn by_age(age: i64) -> Self {
        Self {
            age: Some(age),
            name: None,
        }
    }

    /// A filter on name only.
    #[must_use]
    pub fn by_name(name: impl Into<String>) -> Self {
        Self {
            age: None,
            name: Some(name.into()),
        }
    }

    /// Add an age criterion.
    #[must_use]
    pub fn with_age(mut self, age: i64) -> Self {
        self.age = Some(age);
        self
    }

    /// Whether no criterion is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.age.is_none() && self.name.is_none()
    }
}

/// Result of a search.
///
/// The two diagnostics are ordinary values, not errors, and serialize as
/// JSON strings; matches serialize as an array of people.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    /// The filter had no criteria.
    NoFilters,
    /// Criteria were given but no one matched.
    NoMatches,
    /// Matching people, in store order.
    Matches(Vec<Person>),
}

impl SearchOutcome {
    /// The diagnostic message, if this outcome is not a match list.
    #[must_use]
    pub fn diagnostic(&self) -> Option<&'static str> {
        match self {
            Self::NoFilters => Some(NO_FILTERS_MESSAGE),
            Self::NoMatches => Some(NO_MATCHES_MESSAGE),
            Self::Matches(_) => None,
        }
    }

    /// Matching people; empty for diagnostics.
    #[must_use]
    pub fn matches(&self) -> &[Person] {
        match self {
            Self::Matches(people) => people,
            Self::NoFilters | Self::NoMatches => &[],
        }
    }
}

impl Serialize for SearchOutcome {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Matches(people) => people.serialize(serializer),
            Self::NoFilters => serializer.serialize_str(NO_FILTERS_MESSAGE),
            Self::NoMatches => serializer.serialize_str(NO_MATCHES_MESSAGE),
        }
    }
}

/// Search `people` with `filter`.
///
/// Age narrows first. The name is then matched only against the people left
/// after age filtering: the best [`NAME_MATCH_LIMIT`] names are taken, those
/// scoring under [`NAME_MATCH_THRESHOLD`] dropped, and everyone whose name is
/// among the survivors kept.
#[must_use]
pub fn search(people: &[Person], filter: &SearchFilter) -> SearchOutcome {
    if filter.is_empty() {
        debug!("Search without filters");
        return SearchOutcome::NoFilters;
    }

    let mut candidates: Vec<&Person> = people.iter().collect();

    if let Some(age) = filter.age {
        candidates.retain(|p| i64::from(p.age) == age);
        trace!(age, remaining = candidates.len(), "Applied age filter");
    }

    if let Some(name) = &filter.name {
        let matched = match_names(name, &candidates);
        candidates.retain(|p| matched.contains(p.name.as_str()));
        trace!(name = %name, remaining = candidates.len(), "Applied name filter");
    }

    debug!(?filter, found = candidates.len(), "Search finished");
    if candidates.is_empty() {
        SearchOutcome::NoMatches
    } else {
        SearchOutcome::Matches(candidates.into_iter().cloned().collect())
    }
}

fn match_names<'a>(query: &str, candidates: &[&'a Person]) -> HashSet<&'a str> {
    let top = fuzzy::extract(
        query,
        candidates.iter().map(|&p| p.name.as_str()),
        NAME_MATCH_LIMIT,
    );
    trace!(query, ?top, "Top name scores");

    top.into_iter()
        .filter(|&(_, score)| score >= NAME_MATCH_THRESHOLD)
        .map(|(name, _)| name)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::person::NewPerson;

    fn person(id: i64, name: &str, age: u32) -> Person {
        NewPerson::new(name, age, "X").with_id(id)
    }

    fn names(outcome: &SearchOutcome) -> Vec<&str> {
        outcome.matches().iter().map(|p| p.name.as_str()).collect()
    }

    #[test]
    fn test_no_filters() {
        let people = vec![person(1, "John", 30)];
        assert_eq!(
            search(&people, &SearchFilter::default()),
            SearchOutcome::NoFilters
        );
        assert_eq!(search(&[], &SearchFilter::default()), SearchOutcome::NoFilters);
    }

    #[test]
    fn test_age_only() {
        let people = vec![person(1, "John", 30), person(2, "Jane", 25), person(3, "Kim", 30)];
        let outcome = search(&people, &SearchFilter::by_age(30));
        assert_eq!(names(&outcome), vec!["John", "Kim"]);
    }

    #[test]
    fn test_negative_age_matches_no_one() {
        let people = vec![person(1, "John", 30)];
        assert_eq!(
            search(&people, &SearchFilter::by_age(-5)),
            SearchOutcome::NoMatches
        );
    }

    #[test]
    fn test_age_without_match() {
        let people = vec![person(1, "John", 30)];
        assert_eq!(
            search(&people, &SearchFilter::by_age(99)),
            SearchOutcome::NoMatches
        );
    }

    #[test]
    fn test_name_keeps_top_two_above_threshold() {
        let people = vec![
            person(1, "John", 30),
            person(2, "Jonathan", 40),
            person(3, "Zzz", 50),
        ];
        let outcome = search(&people, &SearchFilter::by_name("Jon"));
        assert_eq!(names(&outcome), vec!["John", "Jonathan"]);
    }

    #[test]
    fn test_name_excludes_third_near_match() {
        let people = vec![
            person(1, "John", 30),
            person(2, "Jonathan", 40),
            person(3, "Jhon", 50),
        ];
        let outcome = search(&people, &SearchFilter::by_name("Jon"));
        assert_eq!(names(&outcome), vec!["John", "Jonathan"]);
    }

    #[test]
    fn test_name_below_threshold() {
        let people = vec![person(1, "Jan", 30), person(2, "Zzz", 40)];
        assert_eq!(
            search(&people, &SearchFilter::by_name("Jon")),
            SearchOutcome::NoMatches
        );
    }

    #[test]
    fn test_name_keeps_every_record_with_matched_name() {
        let people = vec![
            person(1, "John", 30),
            person(2, "John", 31),
            person(3, "Jonathan", 40),
        ];
        let outcome = search(&people, &SearchFilter::by_name("Jon"));
        let ids: Vec<i64> = outcome.matches().iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn test_exact_duplicates_fill_both_slots() {
        let people = vec![
            person(1, "John", 30),
            person(2, "John", 31),
            person(3, "Johnny", 40),
        ];
        let outcome = search(&people, &SearchFilter::by_name("John"));
        let ids: Vec<i64> = outcome.matches().iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[test]
    fn test_age_narrows_before_name() {
        let people = vec![
            person(1, "Jon", 30),
            person(2, "Jonny", 5),
            person(3, "Zed", 5),
        ];
        let filter = SearchFilter::by_name("Jon").with_age(5);
        let outcome = search(&people, &filter);
        assert_eq!(names(&outcome), vec!["Jonny"]);
    }

    #[test]
    fn test_age_and_name_without_match() {
        let people = vec![person(1, "Jon", 30), person(2, "Zed", 5)];
        let filter = SearchFilter::by_name("Jon").with_age(5);
        assert_eq!(search(&people, &filter), SearchOutcome::NoMatches);
    }

    #[test]
    fn test_name_is_case_and_order_insensitive() {
        let people = vec![person(1, "Smith, John", 30), person(2, "Zzz", 40)];
        let outcome = search(&people, &SearchFilter::by_name("john SMITH"));
        assert_eq!(names(&outcome), vec!["Smith, John"]);
    }

    #[test]
    fn test_empty_name_matches_nothing() {
        let people = vec![person(1, "John", 30)];
        assert_eq!(
            search(&people, &SearchFilter::by_name("")),
            SearchOutcome::NoMatches
        );
    }

    #[test]
    fn test_diagnostics() {
        assert_eq!(SearchOutcome::NoFilters.diagnostic(), Some(NO_FILTERS_MESSAGE));
        assert_eq!(SearchOutcome::NoMatches.diagnostic(), Some(NO_MATCHES_MESSAGE));
        assert_eq!(SearchOutcome::Matches(Vec::new()).diagnostic(), None);
    }

    #[test]
    fn test_outcome_serialization() {
        let json = serde_json::to_value(SearchOutcome::NoFilters).unwrap();
        assert_eq!(json, serde_json::json!(NO_FILTERS_MESSAGE));

        let json = serde_json::to_value(SearchOutcome::NoMatches).unwrap();
        assert_eq!(json, serde_json::json!("No matching person found."));

        let json = serde_json::to_value(SearchOutcome::Matches(vec![person(1, "Ann", 9)])).unwrap();
        assert_eq!(
            json,
            serde_json::json!([{"id": 1, "name": "Ann", "age": 9, "gender": "X"}])
        );
    }

    #[test]
    fn test_filter_is_empty() {
        assert!(SearchFilter::default().is_empty());
        assert!(!SearchFilter::by_age(3).is_empty());
        assert!(!SearchFilter::by_name("x").is_empty());
    }
}
