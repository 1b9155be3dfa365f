use crate::domain::model::NormalizedTransaction;
use std::collections::HashSet;

#[derive(Debug, Clone, Default)]
pub struct Deduplicated {
    pub transactions: Vec<NormalizedTransaction>,
    pub removed: usize,
}

/// Drops repeated transaction ids. The first occurrence wins and input order is kept.
pub fn deduplicate(transactions: Vec<NormalizedTransaction>) -> Deduplicated {
    let before = transactions.len();
    let mut seen = HashSet::with_capacity(before);

    let transactions: Vec<_> = transactions
        .into_iter()
        .filter(|tx| seen.insert(tx.transaction_id.clone()))
        .collect();

    let removed = before - transactions.len();
    if removed > 0 {
        tracing::debug!("Removed {} duplicate transaction ids", removed);
    }

    Deduplicated {
        transactions,
        removed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn tx(id: &str, amount: Decimal) -> NormalizedTransaction {
        NormalizedTransaction {
            transaction_id: id.to_string(),
            donor_name: "Jane Doe".to_string(),
            donor_key: "doe jane".to_string(),
            donor_employer: String::new(),
            employer_key: String::new(),
            donor_info: String::new(),
            recipient_name: "Senator X".to_string(),
            recipient_id: None,
            recipient_key: "senator x".to_string(),
            recipient_party: String::new(),
            amount,
            date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            source_url: String::new(),
        }
    }

    #[test]
    fn test_first_occurrence_wins() {
        let result = deduplicate(vec![tx("A", dec!(1)), tx("B", dec!(2)), tx("A", dec!(3)), tx("C", dec!(4))]);
        assert_eq!(result.removed, 1);
        let ids: Vec<_> = result.transactions.iter().map(|t| t.transaction_id.as_str()).collect();
        assert_eq!(ids, vec!["A", "B", "C"]);
        assert_eq!(result.transactions[0].amount, dec!(1));
    }

    #[test]
    fn test_deduplicate_is_idempotent() {
        let first = deduplicate(vec![tx("A", dec!(1)), tx("A", dec!(1)), tx("B", dec!(2)), tx("B", dec!(5))]);
        assert_eq!(first.removed, 2);
        let second = deduplicate(first.transactions.clone());
        assert_eq!(second.removed, 0);
        assert_eq!(second.transactions, first.transactions);
    }

    #[test]
    fn test_empty_input() {
        let result = deduplicate(Vec::new());
        assert!(result.transactions.is_empty());
        assert_eq!(result.removed, 0);
    }
}
