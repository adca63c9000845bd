//! Read-side aggregation queries over report nodes.
//!
//! The Cypher text of each query is fixed; downstream charts depend on the
//! exact column names it returns.

use report_core::{FieldValue, ReportField};
use std::fmt;

/// Age buckets in chart order, with the inclusive upper bound of each.
pub const AGE_GROUPS: [(&str, Option<i64>); 6] = [
    ("Under 18", Some(18)),
    ("18-25", Some(25)),
    ("26-35", Some(35)),
    ("36-45", Some(45)),
    ("46-55", Some(55)),
    ("Over 55", None),
];

/// One of the fixed aggregations the report charts are drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Aggregation {
    /// Arrest count per `sex_code`
    ArrestsBySex,
    /// Report frequency per age bucket
    FrequencyByAge,
    /// Report count per `area_name`
    ReportsByArea,
}

impl Aggregation {
    pub const ALL: [Aggregation; 3] = [
        Aggregation::ArrestsBySex,
        Aggregation::FrequencyByAge,
        Aggregation::ReportsByArea,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Aggregation::ArrestsBySex => "arrests_by_sex",
            Aggregation::FrequencyByAge => "frequency_by_age",
            Aggregation::ReportsByArea => "reports_by_area",
        }
    }

    pub fn cypher(self) -> &'static str {
        match self {
            Aggregation::ArrestsBySex => {
                "MATCH (n) \
                 WHERE n.sex_code IS NOT NULL \
                 RETURN n.sex_code AS sex_code, count(*) AS arrest_count"
            }
            Aggregation::FrequencyByAge => {
                "MATCH (n) \
                 WHERE n.age IS NOT NULL \
                 WITH n, CASE \
                 WHEN n.age <= 18 THEN 'Under 18' \
                 WHEN n.age <= 25 THEN '18-25' \
                 WHEN n.age <= 35 THEN '26-35' \
                 WHEN n.age <= 45 THEN '36-45' \
                 WHEN n.age <= 55 THEN '46-55' \
                 ELSE 'Over 55' \
                 END AS age_group \
                 RETURN age_group, count(n) AS frequency"
            }
            Aggregation::ReportsByArea => {
                "MATCH (n) \
                 WHERE n.area_name IS NOT NULL \
                 WITH n.area_name AS area_name, count(n) AS report_count \
                 RETURN area_name, report_count"
            }
        }
    }

    /// Column holding the grouping key.
    pub fn key_column(self) -> &'static str {
        match self {
            Aggregation::ArrestsBySex => "sex_code",
            Aggregation::FrequencyByAge => "age_group",
            Aggregation::ReportsByArea => "area_name",
        }
    }

    /// Column holding the count.
    pub fn count_column(self) -> &'static str {
        match self {
            Aggregation::ArrestsBySex => "arrest_count",
            Aggregation::FrequencyByAge => "frequency",
            Aggregation::ReportsByArea => "report_count",
        }
    }

    /// Node property the query filters on.
    pub fn source_field(self) -> ReportField {
        match self {
            Aggregation::ArrestsBySex => ReportField::SexCode,
            Aggregation::FrequencyByAge => ReportField::Age,
            Aggregation::ReportsByArea => ReportField::AreaName,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Aggregation::ArrestsBySex => "Sex with the Most Arrests",
            Aggregation::FrequencyByAge => "Frequency of Crimes by Age Group",
            Aggregation::ReportsByArea => "Report Count by Area",
        }
    }

    /// Grouping key for one property value, or `None` if the node is
    /// filtered out by the query's `IS NOT NULL` clause.
    pub fn group_key(self, value: &FieldValue) -> Option<String> {
        if value.is_null() {
            return None;
        }
        match self {
            Aggregation::FrequencyByAge => Some(age_group(value).to_string()),
            _ => Some(value.to_string()),
        }
    }
}

impl fmt::Display for Aggregation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Age bucket the `CASE` expression assigns to a value.
///
/// Non-numeric ages make every comparison null in Cypher, so they fall
/// through to the `ELSE` branch.
pub fn age_group(age: &FieldValue) -> &'static str {
    let Some(age) = age.as_f64() else {
        return "Over 55";
    };
    AGE_GROUPS
        .iter()
        .find(|(_, upper)| upper.map_or(true, |u| age <= u as f64))
        .map(|(label, _)| *label)
        .unwrap_or("Over 55")
}

/// One row of an aggregation result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregateRow {
    pub key: String,
    pub count: i64,
}

impl AggregateRow {
    pub fn new(key: impl Into<String>, count: i64) -> Self {
        Self {
            key: key.into(),
            count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_age_group_boundaries() {
        let cases = [
            (17, "Under 18"),
            (18, "Under 18"),
            (19, "18-25"),
            (25, "18-25"),
            (26, "26-35"),
            (30, "26-35"),
            (45, "36-45"),
            (55, "46-55"),
            (56, "Over 55"),
            (60, "Over 55"),
        ];
        for (age, expected) in cases {
            assert_eq!(age_group(&FieldValue::Integer(age)), expected, "age {age}");
        }
    }

    #[test]
    fn test_age_group_non_numeric_falls_through() {
        assert_eq!(age_group(&FieldValue::from("thirty")), "Over 55");
        assert_eq!(age_group(&FieldValue::Float(18.5)), "18-25");
    }

    #[test]
    fn test_group_key_filters_nulls() {
        assert_eq!(Aggregation::ArrestsBySex.group_key(&FieldValue::Null), None);
        assert_eq!(
            Aggregation::ArrestsBySex.group_key(&FieldValue::from("F")),
            Some("F".to_string())
        );
        assert_eq!(
            Aggregation::FrequencyByAge.group_key(&FieldValue::Integer(40)),
            Some("36-45".to_string())
        );
    }

    #[test]
    fn test_cypher_returns_declared_columns() {
        for aggregation in Aggregation::ALL {
            let cypher = aggregation.cypher();
            assert!(cypher.contains(&format!("AS {}", aggregation.count_column())));
            assert!(cypher.contains(aggregation.key_column()));
            assert!(cypher.contains(&format!("n.{} IS NOT NULL", aggregation.source_field())));
        }
    }
}
