use crate::domain::model::NormalizedTransaction;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// What to do with negative-amount transactions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum RefundMode {
    /// Keep refunds in place so summaries can report what was returned.
    #[default]
    Track,
    /// Drop refunds entirely.
    Exclude,
}

/// Contributions and refunds as two disjoint subsequences of the input.
#[derive(Debug, Clone, Default)]
pub struct RefundSplit {
    pub contributions: Vec<NormalizedTransaction>,
    pub refunds: Vec<NormalizedTransaction>,
    pub zero_amount: usize,
}

impl RefundSplit {
    pub fn contributed(&self) -> Decimal {
        self.contributions.iter().map(|tx| tx.amount).sum()
    }

    /// Magnitude of money returned.
    pub fn returned(&self) -> Decimal {
        self.refunds.iter().map(|tx| -tx.amount).sum()
    }
}

pub fn split_refunds<I>(transactions: I) -> RefundSplit
where
    I: IntoIterator<Item = NormalizedTransaction>,
{
    let mut split = RefundSplit::default();
    for tx in transactions {
        if tx.amount > Decimal::ZERO {
            split.contributions.push(tx);
        } else if tx.is_refund() {
            split.refunds.push(tx);
        } else {
            split.zero_amount += 1;
        }
    }
    split
}

#[derive(Debug, Clone, Default)]
pub struct RefundFiltered {
    pub transactions: Vec<NormalizedTransaction>,
    pub refunds: usize,
    pub zero_amount: usize,
}

/// Single-sequence view. Zero amounts carry no money in either direction and are dropped in both modes.
pub fn filter_refunds(transactions: Vec<NormalizedTransaction>, mode: RefundMode) -> RefundFiltered {
    let refunds = transactions.iter().filter(|tx| tx.is_refund()).count();
    let before = transactions.len();

    let transactions: Vec<_> = transactions
        .into_iter()
        .filter(|tx| match mode {
            RefundMode::Track => !tx.amount.is_zero(),
            RefundMode::Exclude => tx.amount > Decimal::ZERO,
        })
        .collect();

    let dropped = before - transactions.len();
    let zero_amount = match mode {
        RefundMode::Track => dropped,
        RefundMode::Exclude => dropped - refunds,
    };

    RefundFiltered {
        transactions,
        refunds,
        zero_amount,
    }
}
