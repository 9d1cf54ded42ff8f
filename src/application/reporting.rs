use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::domain::{Cents, checked_total};

use super::{ExpenseLedger, LedgerError};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryReport {
    pub categories: Vec<CategorySummary>,
    pub total: Cents,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategorySummary {
    pub category: String,
    pub total: Cents,
    pub count: usize,
    pub average: Cents,
    pub percentage: f64,
}

impl ExpenseLedger {
    /// Spending broken down by category, largest total first.
    /// Ties are ordered by category name. Fails if a total overflows.
    pub fn category_report(&self) -> Result<CategoryReport, LedgerError> {
        let mut aggregates: HashMap<&str, (Cents, usize)> = HashMap::new();
        let mut total: Cents = 0;
        for record in self.list_all() {
            let entry = aggregates.entry(record.category.as_str()).or_insert((0, 0));
            entry.0 = checked_total(entry.0, record.amount_cents)?;
            entry.1 += 1;
            total = checked_total(total, record.amount_cents)?;
        }

        let mut categories: Vec<CategorySummary> = aggregates
            .into_iter()
            .map(|(category, (sum, count))| CategorySummary {
                category: category.to_string(),
                total: sum,
                count,
                average: sum / count as Cents,
                percentage: if total > 0 {
                    (sum as f64 / total as f64) * 100.0
                } else {
                    0.0
                },
            })
            .collect();

        categories.sort_by(|a, b| {
            b.total
                .cmp(&a.total)
                .then_with(|| a.category.cmp(&b.category))
        });

        Ok(CategoryReport {
            categories,
            total,
            count: self.len(),
        })
    }
}
