//! Backtest output: per-step trace, run metadata and summary figures.

use crate::event::EventLog;
use range_scout_domain::metrics::annualize_return;
use range_scout_domain::value_objects::price_range::PositionRange;
use rust_decimal::Decimal;
use serde::Serialize;

/// One replayed sample. Values are in USD.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TraceStep {
    pub timestamp: u64,
    /// Relative price the step was evaluated at.
    pub price: Decimal,
    pub lower: Decimal,
    pub upper: Decimal,
    /// True when price was inside the range, or the range was recentered this step.
    pub in_range: bool,
    pub period_fee: Decimal,
    pub cumulative_fees: Decimal,
    pub principal_value: Decimal,
    /// Principal plus cumulative fees.
    pub total_value: Decimal,
    /// Opening token quantities valued at this step's prices.
    pub hold_value: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunMetadata {
    /// Volatility the initial range was sized from.
    pub initial_volatility: Decimal,
    /// Volatility realized over the simulated window.
    pub realized_volatility: Decimal,
    pub rebalance_count: u32,
    pub initial_half_width: Decimal,
    pub steps_per_year: Decimal,
    pub skipped_samples: usize,
    pub strategy: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct BacktestReport {
    pub capital_usd: Decimal,
    pub days: u32,
    pub trace: Vec<TraceStep>,
    pub final_range: PositionRange,
    pub metadata: RunMetadata,
    pub events: EventLog,
}

impl BacktestReport {
    pub fn final_value(&self) -> Decimal {
        self.trace.last().map_or(self.capital_usd, |s| s.total_value)
    }

    pub fn final_hold_value(&self) -> Decimal {
        self.trace.last().map_or(self.capital_usd, |s| s.hold_value)
    }

    pub fn total_fees(&self) -> Decimal {
        self.trace.last().map_or(Decimal::ZERO, |s| s.cumulative_fees)
    }

    /// Final value minus the hold benchmark; negative when holding did better.
    pub fn vs_hold(&self) -> Decimal {
        self.final_value() - self.final_hold_value()
    }

    pub fn net_pnl(&self) -> Decimal {
        self.final_value() - self.capital_usd
    }

    /// Fraction of replayed steps reported in range.
    pub fn time_in_range(&self) -> Decimal {
        if self.trace.is_empty() {
            return Decimal::ZERO;
        }
        let in_range = self.trace.iter().filter(|s| s.in_range).count();
        Decimal::from(in_range) / Decimal::from(self.trace.len())
    }

    pub fn annualized_return(&self) -> Decimal {
        annualize_return(self.net_pnl(), self.capital_usd, Decimal::from(self.days))
    }

    /// Largest peak-to-trough fall of the total value, as a non-positive fraction.
    pub fn max_drawdown(&self) -> Decimal {
        let mut peak = Decimal::ZERO;
        let mut worst = Decimal::ZERO;
        for step in &self.trace {
            peak = peak.max(step.total_value);
            if peak > Decimal::ZERO {
                worst = worst.min((step.total_value - peak) / peak);
            }
        }
        worst
    }
}
