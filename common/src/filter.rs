//! Listing filter
//!
//! Pure derivation of the visible subset from name/city/state criteria,
//! plus the per-option counts shown in the filter selectors.

use crate::types::Record;

/// Search and selector state of the listing view
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterCriteria {
    pub name_query: String,
    pub city: Option<String>,
    pub state: Option<String>,
}

impl FilterCriteria {
    pub fn with_name(mut self, query: impl Into<String>) -> Self {
        self.name_query = query.into();
        self
    }

    pub fn with_city(mut self, city: impl Into<String>) -> Self {
        self.city = Some(city.into());
        self
    }

    pub fn with_state(mut self, state: impl Into<String>) -> Self {
        self.state = Some(state.into());
        self
    }

    /// True when no predicate is active
    pub fn is_empty(&self) -> bool {
        self.name_needle().is_none() && self.city().is_none() && self.state().is_none()
    }

    /// Clear all three criteria at once
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Selected city, treating `""` as unset
    pub fn city(&self) -> Option<&str> {
        self.city.as_deref().filter(|c| !c.is_empty())
    }

    /// Selected state, treating `""` as unset
    pub fn state(&self) -> Option<&str> {
        self.state.as_deref().filter(|s| !s.is_empty())
    }

    fn name_needle(&self) -> Option<String> {
        let trimmed = self.name_query.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_lowercase())
        }
    }

    /// Intersection of the active predicates
    pub fn matches(&self, record: &Record) -> bool {
        if let Some(needle) = self.name_needle() {
            if !record.name.to_lowercase().contains(&needle) {
                return false;
            }
        }
        if let Some(city) = self.city() {
            if record.city != city {
                return false;
            }
        }
        if let Some(state) = self.state() {
            if record.state != state {
                return false;
            }
        }
        true
    }
}

/// Filter records, preserving input order.
pub fn filter_records<'a>(records: &'a [Record], criteria: &FilterCriteria) -> Vec<&'a Record> {
    if criteria.is_empty() {
        return records.iter().collect();
    }
    records.iter().filter(|r| criteria.matches(r)).collect()
}

/// One selector option with its record count
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionCount {
    pub value: String,
    pub count: usize,
}

/// Selector options in first-seen order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OptionCounts {
    pub cities: Vec<OptionCount>,
    pub states: Vec<OptionCount>,
}

impl OptionCounts {
    pub fn city_count(&self, city: &str) -> usize {
        lookup(&self.cities, city)
    }

    pub fn state_count(&self, state: &str) -> usize {
        lookup(&self.states, state)
    }
}

fn lookup(options: &[OptionCount], value: &str) -> usize {
    options
        .iter()
        .find(|o| o.value == value)
        .map(|o| o.count)
        .unwrap_or(0)
}

fn tally(options: &mut Vec<OptionCount>, value: &str) {
    match options.iter_mut().find(|o| o.value == value) {
        Some(option) => option.count += 1,
        None => options.push(OptionCount {
            value: value.to_string(),
            count: 1,
        }),
    }
}

/// Count records per distinct city and state.
///
/// Always computed over the unfiltered set so option labels do not move
/// while the user narrows the view.
pub fn option_counts(records: &[Record]) -> OptionCounts {
    let mut counts = OptionCounts::default();
    for record in records {
        tally(&mut counts.cities, &record.city);
        tally(&mut counts.states, &record.state);
    }
    counts
}

/// Badge numbers next to the selectors; `None` when the selector is unset
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BadgeCounts {
    pub city: Option<usize>,
    pub state: Option<usize>,
}

/// Matched counts of the filtered result, restricted per dimension.
pub fn badge_counts(filtered: &[&Record], criteria: &FilterCriteria) -> BadgeCounts {
    BadgeCounts {
        city: criteria
            .city()
            .map(|city| filtered.iter().filter(|r| r.city == city).count()),
        state: criteria
            .state()
            .map(|state| filtered.iter().filter(|r| r.state == state).count()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ImageReference;

    fn record(id: i64, name: &str, city: &str, state: &str) -> Record {
        Record {
            id,
            name: name.to_string(),
            address: format!("{} Road", id),
            city: city.to_string(),
            state: state.to_string(),
            contact_number: "9876543210".to_string(),
            email_id: "x@y.in".to_string(),
            images: vec![ImageReference::new(format!("{}.jpg", id))],
        }
    }

    fn sample() -> Vec<Record> {
        vec![
            record(5, "Sunrise Public School", "Mumbai", "Maharashtra"),
            record(4, "Green Valley", "Pune", "Maharashtra"),
            record(3, "Sunshine Academy", "Pune", "Maharashtra"),
            record(2, "Lake View", "Bengaluru", "Karnataka"),
            record(1, "Sun City High", "Mumbai", "Maharashtra"),
        ]
    }

    fn ids(records: &[&Record]) -> Vec<i64> {
        records.iter().map(|r| r.id).collect()
    }

    #[test]
    fn test_empty_criteria_is_identity() {
        let records = sample();
        let filtered = filter_records(&records, &FilterCriteria::default());
        assert_eq!(ids(&filtered), vec![5, 4, 3, 2, 1]);

        let blank = FilterCriteria::default()
            .with_name("   ")
            .with_city("")
            .with_state("");
        assert!(blank.is_empty());
        assert_eq!(ids(&filter_records(&records, &blank)), vec![5, 4, 3, 2, 1]);
    }

    #[test]
    fn test_name_match_is_case_insensitive_substring() {
        let records = sample();
        let criteria = FilterCriteria::default().with_name("SUN");
        assert_eq!(ids(&filter_records(&records, &criteria)), vec![5, 3, 1]);
    }

    #[test]
    fn test_city_and_state_are_exact() {
        let records = sample();
        let criteria = FilterCriteria::default().with_city("pune");
        assert!(filter_records(&records, &criteria).is_empty());

        let criteria = FilterCriteria::default().with_state("Karnataka");
        assert_eq!(ids(&filter_records(&records, &criteria)), vec![2]);
    }

    #[test]
    fn test_combined_equals_intersection() {
        let records = sample();
        let name = FilterCriteria::default().with_name("sun");
        let city = FilterCriteria::default().with_city("Mumbai");
        let state = FilterCriteria::default().with_state("Maharashtra");
        let all = FilterCriteria::default()
            .with_name("sun")
            .with_city("Mumbai")
            .with_state("Maharashtra");

        let by_name = ids(&filter_records(&records, &name));
        let by_city = ids(&filter_records(&records, &city));
        let by_state = ids(&filter_records(&records, &state));
        let expected: Vec<i64> = by_name
            .into_iter()
            .filter(|id| by_city.contains(id) && by_state.contains(id))
            .collect();

        assert_eq!(ids(&filter_records(&records, &all)), expected);
        assert_eq!(expected, vec![5, 1]);
    }

    #[test]
    fn test_reset_restores_everything() {
        let records = sample();
        let mut criteria = FilterCriteria::default()
            .with_name("lake")
            .with_city("Bengaluru")
            .with_state("Karnataka");
        assert_eq!(filter_records(&records, &criteria).len(), 1);

        criteria.reset();
        assert!(criteria.is_empty());
        assert_eq!(filter_records(&records, &criteria).len(), records.len());
    }

    #[test]
    fn test_option_counts_use_unfiltered_set() {
        let records = sample();
        let counts = option_counts(&records);
        assert_eq!(counts.cities[0].value, "Mumbai");
        assert_eq!(counts.city_count("Mumbai"), 2);
        assert_eq!(counts.city_count("Pune"), 2);
        assert_eq!(counts.city_count("Bengaluru"), 1);
        assert_eq!(counts.state_count("Maharashtra"), 4);
        assert_eq!(counts.state_count("Goa"), 0);
    }

    #[test]
    fn test_badge_counts() {
        let records = sample();
        let criteria = FilterCriteria::default().with_name("sun").with_city("Pune");
        let filtered = filter_records(&records, &criteria);
        let badges = badge_counts(&filtered, &criteria);
        assert_eq!(badges.city, Some(1));
        assert_eq!(badges.state, None);
    }
}
