//! Dashboard aggregation
//!
//! Pure functions that turn a record snapshot into chart datasets and summary
//! figures. Nothing is cached: every call recomputes from the snapshot it is
//! given, which keeps the results trivially consistent with the store at the
//! record volumes a person uploads by hand.

use std::collections::HashMap;
use std::ops::AddAssign;

use serde::{Deserialize, Serialize};

use crate::models::ReceiptRecord;

/// Number of merchants kept in the top-merchants dataset
pub const TOP_MERCHANTS: usize = 5;

/// Spend for one category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryTotal {
    pub name: String,
    pub value: f64,
}

/// Spend for one merchant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MerchantTotal {
    pub name: String,
    pub amount: f64,
}

/// Spend on one day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyTotal {
    pub date: String,
    pub amount: f64,
}

/// Number of receipts in one category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryCount {
    pub name: String,
    pub count: usize,
}

/// Headline figures shown above the charts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpendingSummary {
    pub total_spent: f64,
    /// Absent when there are no records
    pub top_category: Option<String>,
    pub record_count: usize,
}

/// Every dataset and summary derived from one snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Aggregation {
    pub summary: SpendingSummary,
    pub category_totals: Vec<CategoryTotal>,
    pub merchant_totals: Vec<MerchantTotal>,
    pub daily_totals: Vec<DailyTotal>,
    pub category_counts: Vec<CategoryCount>,
}

/// Group records by key, in first-seen key order.
///
/// Each key starts at `A::default()` and receives `contribution(record)` for
/// every record that maps to it.
fn accumulate<'a, A, K, C>(records: &'a [ReceiptRecord], key: K, contribution: C) -> Vec<(String, A)>
where
    A: AddAssign + Default,
    K: Fn(&'a ReceiptRecord) -> &'a str,
    C: Fn(&ReceiptRecord) -> A,
{
    let mut index: HashMap<&'a str, usize> = HashMap::new();
    let mut groups: Vec<(String, A)> = Vec::new();

    for record in records {
        let k = key(record);
        let slot = *index.entry(k).or_insert_with(|| {
            groups.push((k.to_string(), A::default()));
            groups.len() - 1
        });
        groups[slot].1 += contribution(record);
    }

    groups
}

/// Spend per category, in the order categories first appear
pub fn category_totals(records: &[ReceiptRecord]) -> Vec<CategoryTotal> {
    accumulate(records, |r| r.category.as_str(), |r| r.total)
        .into_iter()
        .map(|(name, value)| CategoryTotal { name, value })
        .collect()
}

/// The [`TOP_MERCHANTS`] merchants with the highest spend, descending.
///
/// Ties keep first-seen order.
pub fn merchant_totals(records: &[ReceiptRecord]) -> Vec<MerchantTotal> {
    let mut groups = accumulate(records, |r| r.merchant.as_str(), |r| r.total);
    groups.sort_by(|a, b| b.1.total_cmp(&a.1));
    groups.truncate(TOP_MERCHANTS);
    groups
        .into_iter()
        .map(|(name, amount)| MerchantTotal { name, amount })
        .collect()
}

/// Spend per day, oldest first
pub fn daily_totals(records: &[ReceiptRecord]) -> Vec<DailyTotal> {
    let mut groups = accumulate(records, |r| r.date.as_str(), |r| r.total);
    // Dates are fixed-width YYYY-MM-DD, so string order is chronological
    groups.sort_by(|a, b| a.0.cmp(&b.0));
    groups
        .into_iter()
        .map(|(date, amount)| DailyTotal { date, amount })
        .collect()
}

/// Receipts per category, most frequent first (ties keep first-seen order)
pub fn category_counts(records: &[ReceiptRecord]) -> Vec<CategoryCount> {
    let mut groups = accumulate(records, |r| r.category.as_str(), |_| 1usize);
    groups.sort_by(|a, b| b.1.cmp(&a.1));
    groups
        .into_iter()
        .map(|(name, count)| CategoryCount { name, count })
        .collect()
}

pub fn total_spent(records: &[ReceiptRecord]) -> f64 {
    records.iter().map(|r| r.total).sum()
}

/// Category with the highest spend; the first-seen one wins a tie
pub fn top_category(totals: &[CategoryTotal]) -> Option<String> {
    let mut best: Option<&CategoryTotal> = None;
    for total in totals {
        match best {
            Some(current) if total.value <= current.value => {}
            _ => best = Some(total),
        }
    }
    best.map(|t| t.name.clone())
}

/// Compute every dataset and the summary from one snapshot
pub fn aggregate(records: &[ReceiptRecord]) -> Aggregation {
    let category_totals = category_totals(records);
    let summary = SpendingSummary {
        total_spent: total_spent(records),
        top_category: top_category(&category_totals),
        record_count: records.len(),
    };

    Aggregation {
        summary,
        category_totals,
        merchant_totals: merchant_totals(records),
        daily_totals: daily_totals(records),
        category_counts: category_counts(records),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(merchant: &str, date: &str, total: f64, category: &str) -> ReceiptRecord {
        ReceiptRecord::new(merchant, date, total, category)
    }

    fn mixed_records() -> Vec<ReceiptRecord> {
        vec![
            record("Lider", "2024-03-05", 12.5, "Comida"),
            record("Copec", "2024-03-01", 40.0, "Transporte"),
            record("Lider", "2024-03-01", 7.5, "Comida"),
            record("Zara", "2024-02-28", 60.0, "Ropa"),
            record("Uber", "2024-03-05", 8.0, "Transporte"),
            record("Jumbo", "2024-03-02", 20.0, "Comida"),
            record("Cine", "2024-03-03", 9.0, "Varios"),
            record("Falabella", "2024-03-04", 15.0, "Ropa"),
        ]
    }

    #[test]
    fn test_scenario_two_food_receipts() {
        let records = vec![
            record("A", "2024-01-02", 10.0, "Food"),
            record("B", "2024-01-01", 5.0, "Food"),
        ];
        let agg = aggregate(&records);

        assert_eq!(
            agg.category_totals,
            vec![CategoryTotal {
                name: "Food".into(),
                value: 15.0
            }]
        );
        assert_eq!(
            agg.daily_totals,
            vec![
                DailyTotal {
                    date: "2024-01-01".into(),
                    amount: 5.0
                },
                DailyTotal {
                    date: "2024-01-02".into(),
                    amount: 10.0
                },
            ]
        );
        assert_eq!(agg.summary.total_spent, 15.0);
        assert_eq!(agg.summary.top_category.as_deref(), Some("Food"));
        assert_eq!(agg.summary.record_count, 2);
    }

    #[test]
    fn test_empty_store() {
        let agg = aggregate(&[]);
        assert_eq!(agg.summary.total_spent, 0.0);
        assert_eq!(agg.summary.top_category, None);
        assert_eq!(agg.summary.record_count, 0);
        assert!(agg.category_totals.is_empty());
        assert!(agg.merchant_totals.is_empty());
        assert!(agg.daily_totals.is_empty());
        assert!(agg.category_counts.is_empty());
    }

    #[test]
    fn test_category_totals_first_seen_order() {
        let totals = category_totals(&mixed_records());
        let names: Vec<_> = totals.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["Comida", "Transporte", "Ropa", "Varios"]);
        assert_eq!(totals[0].value, 40.0);
        assert_eq!(totals[1].value, 48.0);
        assert_eq!(totals[2].value, 75.0);
        assert_eq!(totals[3].value, 9.0);
    }

    #[test]
    fn test_category_totals_sum_to_total_spent() {
        let records = mixed_records();
        let sum: f64 = category_totals(&records).iter().map(|t| t.value).sum();
        assert!((sum - total_spent(&records)).abs() < 1e-9);
    }

    #[test]
    fn test_categories_are_case_sensitive() {
        let records = vec![
            record("A", "2024-01-01", 1.0, "Comida"),
            record("B", "2024-01-01", 1.0, "comida"),
        ];
        assert_eq!(category_totals(&records).len(), 2);
    }

    #[test]
    fn test_merchant_totals_top_five_descending() {
        let totals = merchant_totals(&mixed_records());
        assert_eq!(totals.len(), TOP_MERCHANTS);
        assert!(totals.windows(2).all(|w| w[0].amount >= w[1].amount));
        assert_eq!(totals[0].name, "Zara");
        assert_eq!(totals[1].name, "Copec");
        // Lider appears twice and is summed
        assert_eq!(totals[2].name, "Lider");
        assert_eq!(totals[2].amount, 20.0);
    }

    #[test]
    fn test_merchant_ties_keep_first_seen_order() {
        let records = vec![
            record("B", "2024-01-01", 10.0, "X"),
            record("A", "2024-01-01", 10.0, "X"),
            record("C", "2024-01-01", 10.0, "X"),
        ];
        let names: Vec<_> = merchant_totals(&records)
            .into_iter()
            .map(|m| m.name)
            .collect();
        assert_eq!(names, vec!["B", "A", "C"]);
    }

    #[test]
    fn test_merchant_totals_fewer_than_limit() {
        let records = vec![record("A", "2024-01-01", 1.0, "X")];
        assert_eq!(merchant_totals(&records).len(), 1);
    }

    #[test]
    fn test_daily_totals_ascending() {
        let totals = daily_totals(&mixed_records());
        assert!(totals.windows(2).all(|w| w[0].date <= w[1].date));
        assert_eq!(totals.first().unwrap().date, "2024-02-28");
        let march_first = totals.iter().find(|d| d.date == "2024-03-01").unwrap();
        assert_eq!(march_first.amount, 47.5);
    }

    #[test]
    fn test_category_counts_descending_with_stable_ties() {
        let counts = category_counts(&mixed_records());
        assert_eq!(
            counts,
            vec![
                CategoryCount {
                    name: "Comida".into(),
                    count: 3
                },
                CategoryCount {
                    name: "Transporte".into(),
                    count: 2
                },
                CategoryCount {
                    name: "Ropa".into(),
                    count: 2
                },
                CategoryCount {
                    name: "Varios".into(),
                    count: 1
                },
            ]
        );
    }

    #[test]
    fn test_top_category_is_highest_spend() {
        let agg = aggregate(&mixed_records());
        assert_eq!(agg.summary.top_category.as_deref(), Some("Ropa"));
    }

    #[test]
    fn test_top_category_tie_prefers_first_seen() {
        let records = vec![
            record("A", "2024-01-01", 5.0, "Ropa"),
            record("B", "2024-01-01", 5.0, "Comida"),
        ];
        assert_eq!(aggregate(&records).summary.top_category.as_deref(), Some("Ropa"));
    }

    #[test]
    fn test_zero_totals_still_produce_top_category() {
        let records = vec![record("A", "2024-01-01", 0.0, "Gratis")];
        assert_eq!(aggregate(&records).summary.top_category.as_deref(), Some("Gratis"));
    }

    #[test]
    fn test_aggregation_is_deterministic() {
        let records = mixed_records();
        assert_eq!(aggregate(&records), aggregate(&records));
    }
}
