// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::record::Record;
use crate::schema::{FilterKind, RATIO_HIGH, RATIO_LOW, TableSchema};

/// Sentinel for a filter that admits every record.
pub const FILTER_ALL: &str = "all";

pub fn is_inactive(value: &str) -> bool {
    let value = value.trim();
    value.is_empty() || value == FILTER_ALL
}

/// Whether `value` narrows a filter of this kind. A threshold that does not
/// parse as a finite number is inactive, as is an unknown ratio bucket.
pub fn is_active_value(kind: FilterKind, value: &str) -> bool {
    compile_predicate(kind, value).is_some()
}

/// Cut-offs for the derived capacity ratio: "mostly free" is at or below
/// `low_max`, "nearly full" at or above `high_min`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CapacityPolicy {
    pub low_max: f64,
    pub high_min: f64,
}

impl Default for CapacityPolicy {
    fn default() -> Self {
        Self {
            low_max: 0.5,
            high_min: 0.9,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RatioBucket {
    Low,
    High,
}

#[derive(Debug, Clone, PartialEq)]
enum Predicate {
    Equals {
        field: &'static str,
        value: String,
    },
    Ratio {
        numerator: &'static str,
        denominator: &'static str,
        bucket: RatioBucket,
    },
    AtLeast {
        field: &'static str,
        threshold: f64,
    },
}

/// Search term and filter values compiled against one schema. Build once per
/// recomputation and apply to the whole row sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterPipeline {
    search: Option<Search>,
    predicates: Vec<Predicate>,
    policy: CapacityPolicy,
}

#[derive(Debug, Clone, PartialEq)]
struct Search {
    needle: String,
    fields: &'static [&'static str],
}

impl FilterPipeline {
    /// `values` lines up with `schema.filters`; missing trailing entries are
    /// inactive.
    pub fn compile(
        schema: &TableSchema,
        search: &str,
        values: &[String],
        policy: CapacityPolicy,
    ) -> Self {
        let search = (!search.is_empty()).then(|| Search {
            needle: search.to_lowercase(),
            fields: schema.search_fields,
        });
        let predicates = schema
            .filters
            .iter()
            .zip(values)
            .filter_map(|(spec, value)| compile_predicate(spec.kind, value))
            .collect();
        Self {
            search,
            predicates,
            policy,
        }
    }

    /// True when no search term or filter is active.
    pub fn is_identity(&self) -> bool {
        self.search.is_none() && self.predicates.is_empty()
    }

    pub fn active_count(&self) -> usize {
        self.predicates.len() + usize::from(self.search.is_some())
    }

    pub fn matches<R: Record>(&self, record: &R) -> bool {
        if self
            .search
            .as_ref()
            .is_some_and(|search| !search.matches(record))
        {
            return false;
        }
        self.predicates
            .iter()
            .all(|predicate| predicate.matches(record, self.policy))
    }

    /// Positions of the admitted records, in store order.
    pub fn apply<R: Record>(&self, rows: &[R]) -> Vec<usize> {
        if self.is_identity() {
            return (0..rows.len()).collect();
        }
        rows.iter()
            .enumerate()
            .filter(|(_, record)| self.matches(*record))
            .map(|(position, _)| position)
            .collect()
    }
}

fn compile_predicate(kind: FilterKind, value: &str) -> Option<Predicate> {
    if is_inactive(value) {
        return None;
    }
    match kind {
        FilterKind::Categorical { field, .. } => Some(Predicate::Equals {
            field,
            value: value.to_owned(),
        }),
        FilterKind::Ratio {
            numerator,
            denominator,
        } => {
            let bucket = match value {
                RATIO_LOW => RatioBucket::Low,
                RATIO_HIGH => RatioBucket::High,
                _ => return None,
            };
            Some(Predicate::Ratio {
                numerator,
                denominator,
                bucket,
            })
        }
        FilterKind::MinThreshold { field } => {
            let threshold = value.trim().parse::<f64>().ok()?;
            threshold.is_finite().then_some(Predicate::AtLeast { field, threshold })
        }
    }
}

impl Search {
    fn matches<R: Record>(&self, record: &R) -> bool {
        self.fields.iter().any(|field| {
            record
                .field(field)
                .is_some_and(|value| value.display().to_lowercase().contains(&self.needle))
        })
    }
}

impl Predicate {
    fn matches<R: Record>(&self, record: &R, policy: CapacityPolicy) -> bool {
        match self {
            Self::Equals { field, value } => record
                .field(field)
                .is_some_and(|current| current.matches_key(value)),
            Self::Ratio {
                numerator,
                denominator,
                bucket,
            } => {
                let Some(ratio) = ratio(record, numerator, denominator) else {
                    return false;
                };
                match bucket {
                    RatioBucket::Low => ratio <= policy.low_max,
                    RatioBucket::High => ratio >= policy.high_min,
                }
            }
            Self::AtLeast { field, threshold } => record
                .field(field)
                .and_then(|current| current.as_number())
                .is_some_and(|current| current >= *threshold),
        }
    }
}

/// `None` when either side is not numeric or the denominator is zero.
fn ratio<R: Record>(record: &R, numerator: &str, denominator: &str) -> Option<f64> {
    let top = record.field(numerator)?.as_number()?;
    let bottom = record.field(denominator)?.as_number()?;
    if bottom == 0.0 {
        return None;
    }
    let ratio = top / bottom;
    ratio.is_finite().then_some(ratio)
}

#[cfg(test)]
mod tests {
    use super::{CapacityPolicy, FilterPipeline, is_active_value, is_inactive};
    use crate::schema::FilterKind;
    use crate::model::{Coupon, CouponType, SharedAccount, SharedAccountStatus};
    use crate::record::Record;
    use crate::RowId;

    fn account(id: &str, service: &str, max: i64, used: i64) -> SharedAccount {
        SharedAccount {
            id: RowId::from(id),
            service: service.to_owned(),
            email: format!("{}@permia.ai", service.to_lowercase().replace(' ', "-")),
            password: "secret".to_owned(),
            max_slots: max,
            used_slots: used,
            status: SharedAccountStatus::Active,
        }
    }

    fn compile<R: Record>(search: &str, values: &[&str]) -> FilterPipeline {
        let values: Vec<String> = values.iter().map(|value| (*value).to_owned()).collect();
        FilterPipeline::compile(R::schema(), search, &values, CapacityPolicy::default())
    }

    fn services(rows: &[SharedAccount], pipeline: &FilterPipeline) -> Vec<String> {
        pipeline
            .apply(rows)
            .into_iter()
            .map(|position| rows[position].service.clone())
            .collect()
    }

    #[test]
    fn inactive_sentinels() {
        assert!(is_inactive(""));
        assert!(is_inactive("all"));
        assert!(is_inactive("  "));
        assert!(!is_inactive("Active"));
    }

    #[test]
    fn unparseable_threshold_is_not_active() {
        let threshold = FilterKind::MinThreshold { field: "balance" };
        assert!(is_active_value(threshold, "250"));
        assert!(!is_active_value(threshold, "abc"));
        assert!(!is_active_value(threshold, "inf"));
        assert!(!is_active_value(threshold, ""));

        let capacity = FilterKind::Ratio {
            numerator: "usedSlots",
            denominator: "maxSlots",
        };
        assert!(is_active_value(capacity, "high"));
        assert!(!is_active_value(capacity, "half"));
    }

    #[test]
    fn no_active_filters_is_identity() {
        let pipeline = compile::<SharedAccount>("", &["all", "all"]);
        assert!(pipeline.is_identity());
        assert_eq!(pipeline.apply::<SharedAccount>(&[]), Vec::<usize>::new());

        let rows = vec![account("1", "A", 1, 0), account("2", "B", 1, 1)];
        assert_eq!(pipeline.apply(&rows), vec![0, 1]);
    }

    #[test]
    fn search_is_case_insensitive_over_search_fields() {
        let rows = vec![
            account("1", "ChatGPT Plus", 10, 7),
            account("2", "Claude Pro", 8, 8),
            account("3", "Midjourney", 5, 2),
        ];
        let pipeline = compile::<SharedAccount>("claude", &[]);
        assert_eq!(services(&rows, &pipeline), ["Claude Pro"]);

        // password is not a search field
        let pipeline = compile::<SharedAccount>("secret", &[]);
        assert!(services(&rows, &pipeline).is_empty());
    }

    #[test]
    fn capacity_buckets_use_policy_and_skip_zero_capacity() {
        let rows = vec![
            account("1", "half", 10, 5),
            account("2", "full", 10, 9),
            account("3", "empty-pool", 0, 0),
            account("4", "middle", 10, 7),
        ];
        assert_eq!(
            services(&rows, &compile::<SharedAccount>("", &["all", "low"])),
            ["half"]
        );
        assert_eq!(
            services(&rows, &compile::<SharedAccount>("", &["all", "high"])),
            ["full"]
        );

        let strict = FilterPipeline::compile(
            SharedAccount::schema(),
            "",
            &["all".to_owned(), "low".to_owned()],
            CapacityPolicy {
                low_max: 0.4,
                high_min: 0.9,
            },
        );
        assert!(services(&rows, &strict).is_empty());
    }

    #[test]
    fn categorical_and_search_combine_with_and() {
        let mut limited = account("2", "Claude Pro", 8, 8);
        limited.status = SharedAccountStatus::Limited;
        let rows = vec![account("1", "Claude Team", 8, 1), limited];

        let pipeline = compile::<SharedAccount>("claude", &["Limited"]);
        assert_eq!(pipeline.active_count(), 2);
        assert_eq!(services(&rows, &pipeline), ["Claude Pro"]);
    }

    #[test]
    fn coupon_active_flag_filter() {
        let coupon = |id: &str, active: bool| Coupon {
            id: RowId::from(id),
            code: format!("CODE{id}"),
            coupon_type: CouponType::Fixed,
            value: 5.0,
            max_usage: 10,
            used: 0,
            expires_at: "1403/10/01".to_owned(),
            active,
        };
        let rows = vec![coupon("1", true), coupon("2", true), coupon("3", false)];
        let pipeline = compile::<Coupon>("", &["true"]);
        assert_eq!(pipeline.apply(&rows), vec![0, 1]);
    }

    #[test]
    fn unparseable_threshold_disables_the_filter() {
        let pipeline = compile::<crate::model::VirtualCard>("", &["all", "abc"]);
        assert!(pipeline.is_identity());
        let pipeline = compile::<crate::model::VirtualCard>("", &["all", " 500 "]);
        assert_eq!(pipeline.active_count(), 1);
    }
}
