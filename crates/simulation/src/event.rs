//! Events recorded while a backtest replays history.

use range_scout_domain::value_objects::price::Price;
use range_scout_domain::value_objects::price_range::PositionRange;
use rust_decimal::Decimal;
use serde::Serialize;

/// Types of events that can occur during a backtest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SimulationEventType {
    PositionOpened,
    PositionClosed,
    Rebalance,
    FeeCollection,
    OutOfRange,
    BackInRange,
    /// A sample without a usable price was skipped.
    SampleSkipped,
}

/// A backtest event with the step and sample it happened at.
#[derive(Debug, Clone, Serialize)]
pub struct SimulationEvent {
    pub step: u64,
    pub timestamp: u64,
    pub event_type: SimulationEventType,
    /// Relative price at the time of the event, absent for skipped samples.
    pub price: Option<Price>,
    pub data: EventData,
}

/// Event-specific payload.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum EventData {
    None,
    PositionOpened {
        capital_usd: Decimal,
        range: PositionRange,
    },
    PositionClosed {
        final_value_usd: Decimal,
        total_fees_usd: Decimal,
        /// Deviation of the last position from holding its opening tokens.
        final_il_pct: Decimal,
    },
    Rebalance {
        old_range: PositionRange,
        new_range: PositionRange,
        reason: String,
        cost_usd: Decimal,
    },
    FeeCollection {
        amount_usd: Decimal,
        cumulative_usd: Decimal,
    },
    RangeTransition {
        entering: bool,
        range: PositionRange,
    },
}

impl SimulationEvent {
    fn at(
        step: u64,
        timestamp: u64,
        event_type: SimulationEventType,
        price: Price,
        data: EventData,
    ) -> Self {
        Self {
            step,
            timestamp,
            event_type,
            price: Some(price),
            data,
        }
    }

    #[must_use]
    pub fn position_opened(
        step: u64,
        timestamp: u64,
        price: Price,
        capital_usd: Decimal,
        range: PositionRange,
    ) -> Self {
        Self::at(
            step,
            timestamp,
            SimulationEventType::PositionOpened,
            price,
            EventData::PositionOpened { capital_usd, range },
        )
    }

    #[must_use]
    pub fn position_closed(
        step: u64,
        timestamp: u64,
        price: Price,
        final_value_usd: Decimal,
        total_fees_usd: Decimal,
        final_il_pct: Decimal,
    ) -> Self {
        Self::at(
            step,
            timestamp,
            SimulationEventType::PositionClosed,
            price,
            EventData::PositionClosed {
                final_value_usd,
                total_fees_usd,
                final_il_pct,
            },
        )
    }

    #[must_use]
    pub fn rebalance(
        step: u64,
        timestamp: u64,
        price: Price,
        old_range: PositionRange,
        new_range: PositionRange,
        reason: String,
        cost_usd: Decimal,
    ) -> Self {
        Self::at(
            step,
            timestamp,
            SimulationEventType::Rebalance,
            price,
            EventData::Rebalance {
                old_range,
                new_range,
                reason,
                cost_usd,
            },
        )
    }

    #[must_use]
    pub fn fee_collection(
        step: u64,
        timestamp: u64,
        price: Price,
        amount_usd: Decimal,
        cumulative_usd: Decimal,
    ) -> Self {
        Self::at(
            step,
            timestamp,
            SimulationEventType::FeeCollection,
            price,
            EventData::FeeCollection {
                amount_usd,
                cumulative_usd,
            },
        )
    }

    #[must_use]
    pub fn out_of_range(step: u64, timestamp: u64, price: Price, range: PositionRange) -> Self {
        Self::at(
            step,
            timestamp,
            SimulationEventType::OutOfRange,
            price,
            EventData::RangeTransition {
                entering: false,
                range,
            },
        )
    }

    #[must_use]
    pub fn back_in_range(step: u64, timestamp: u64, price: Price, range: PositionRange) -> Self {
        Self::at(
            step,
            timestamp,
            SimulationEventType::BackInRange,
            price,
            EventData::RangeTransition {
                entering: true,
                range,
            },
        )
    }

    #[must_use]
    pub fn sample_skipped(step: u64, timestamp: u64) -> Self {
        Self {
            step,
            timestamp,
            event_type: SimulationEventType::SampleSkipped,
            price: None,
            data: EventData::None,
        }
    }
}

/// Event log for collecting all events during a run.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct EventLog {
    events: Vec<SimulationEvent>,
}

impl EventLog {
    #[must_use]
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn record(&mut self, event: SimulationEvent) {
        self.events.push(event);
    }

    #[must_use]
    pub fn events(&self) -> &[SimulationEvent] {
        &self.events
    }

    #[must_use]
    pub fn count_by_type(&self, event_type: SimulationEventType) -> usize {
        self.events
            .iter()
            .filter(|e| e.event_type == event_type)
            .count()
    }

    #[must_use]
    pub fn rebalance_count(&self) -> usize {
        self.count_by_type(SimulationEventType::Rebalance)
    }

    #[must_use]
    pub fn fee_collection_count(&self) -> usize {
        self.count_by_type(SimulationEventType::FeeCollection)
    }
}
