//! Cash register reconciliation.
//!
//! The cash counted at the latest reading is the baseline. Deposits and
//! withdrawals recorded after it move the expected balance; the next count
//! tells whether the register matches.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, MoneyCents, ResultEngine, sales::CounterReading};

/// Differences up to this amount (inclusive) are considered nominal.
pub const WARNING_THRESHOLD: MoneyCents = MoneyCents::new(500);
/// Differences above this amount are errors.
pub const ERROR_THRESHOLD: MoneyCents = MoneyCents::new(1000);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CashEventKind {
    Deposit,
    Withdrawal,
}

impl CashEventKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Deposit => "deposit",
            Self::Withdrawal => "withdrawal",
        }
    }
}

impl TryFrom<&str> for CashEventKind {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "deposit" => Ok(Self::Deposit),
            "withdrawal" => Ok(Self::Withdrawal),
            other => Err(EngineError::InvalidAmount(format!(
                "invalid cash event type: {other}"
            ))),
        }
    }
}

/// A manual movement of cash in or out of the register.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CashEvent {
    pub id: Uuid,
    pub config_id: Option<Uuid>,
    pub owner: String,
    pub kind: CashEventKind,
    /// Always strictly positive, the sign comes from `kind`.
    pub amount: MoneyCents,
    pub description: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

impl CashEvent {
    pub fn new(
        owner: impl Into<String>,
        kind: CashEventKind,
        amount: MoneyCents,
        description: Option<String>,
        occurred_at: DateTime<Utc>,
    ) -> ResultEngine<Self> {
        if !amount.is_positive() {
            return Err(EngineError::InvalidAmount(
                "amount must be > 0".to_string(),
            ));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            config_id: None,
            owner: owner.into(),
            kind,
            amount,
            description,
            occurred_at,
        })
    }

    #[must_use]
    pub fn signed_amount(&self) -> MoneyCents {
        match self.kind {
            CashEventKind::Deposit => self.amount,
            CashEventKind::Withdrawal => -self.amount,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BalanceStatus {
    Nominal,
    Warning,
    Error,
}

impl BalanceStatus {
    #[must_use]
    pub fn from_difference(difference: MoneyCents) -> Self {
        let abs = difference.abs();
        if abs <= WARNING_THRESHOLD {
            Self::Nominal
        } else if abs <= ERROR_THRESHOLD {
            Self::Warning
        } else {
            Self::Error
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CashBalance {
    pub expected: MoneyCents,
    pub actual: MoneyCents,
    /// `actual - expected`: positive when there is more cash than expected.
    pub difference: MoneyCents,
    pub status: BalanceStatus,
}

fn latest_reading(readings: &[CounterReading]) -> Option<&CounterReading> {
    readings.iter().max_by_key(|reading| reading.taken_at)
}

/// Cash that should be in the register now.
#[must_use]
pub fn expected_balance(readings: &[CounterReading], events: &[CashEvent]) -> MoneyCents {
    let baseline = latest_reading(readings);
    let start = baseline.map_or(MoneyCents::ZERO, |reading| reading.cash_in_register);
    let since = baseline.map(|reading| reading.taken_at);

    start
        + events
            .iter()
            .filter(|event| since.is_none_or(|since| event.occurred_at > since))
            .map(CashEvent::signed_amount)
            .sum::<MoneyCents>()
}

/// Cash counted at the most recent reading.
#[must_use]
pub fn actual_balance(readings: &[CounterReading]) -> MoneyCents {
    latest_reading(readings).map_or(MoneyCents::ZERO, |reading| reading.cash_in_register)
}

#[must_use]
pub fn balance(readings: &[CounterReading], events: &[CashEvent]) -> CashBalance {
    let expected = expected_balance(readings, events);
    let actual = actual_balance(readings);
    let difference = actual - expected;
    CashBalance {
        expected,
        actual,
        difference,
        status: BalanceStatus::from_difference(difference),
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, hour, 0, 0).unwrap()
    }

    fn event(kind: CashEventKind, cents: i64, hour: u32) -> CashEvent {
        CashEvent::new("alice", kind, MoneyCents::new(cents), None, at(hour)).unwrap()
    }

    #[test]
    fn events_after_baseline_move_expected() {
        let readings = vec![CounterReading::new("alice", at(1)).cash(MoneyCents::new(100_00))];
        let events = vec![
            event(CashEventKind::Deposit, 20_00, 2),
            event(CashEventKind::Withdrawal, 5_00, 3),
        ];
        assert_eq!(expected_balance(&readings, &events), MoneyCents::new(115_00));
        assert_eq!(actual_balance(&readings), MoneyCents::new(100_00));

        let balance = balance(&readings, &events);
        assert_eq!(balance.difference, MoneyCents::new(-15_00));
        assert_eq!(balance.status, BalanceStatus::Error);
    }

    #[test]
    fn events_before_or_at_baseline_are_ignored() {
        let readings = vec![
            CounterReading::new("alice", at(1)).cash(MoneyCents::new(10_00)),
            CounterReading::new("alice", at(5)).cash(MoneyCents::new(50_00)),
        ];
        let events = vec![
            event(CashEventKind::Deposit, 20_00, 2),
            event(CashEventKind::Deposit, 7_00, 5),
            event(CashEventKind::Withdrawal, 3_00, 6),
        ];
        assert_eq!(expected_balance(&readings, &events), MoneyCents::new(47_00));
        assert_eq!(balance(&readings, &events).status, BalanceStatus::Nominal);
    }

    #[test]
    fn without_readings_every_event_counts() {
        let events = vec![
            event(CashEventKind::Deposit, 30_00, 2),
            event(CashEventKind::Withdrawal, 12_50, 3),
        ];
        let balance = balance(&[], &events);
        assert_eq!(balance.expected, MoneyCents::new(17_50));
        assert_eq!(balance.actual, MoneyCents::ZERO);
        assert_eq!(balance.difference, MoneyCents::new(-17_50));
    }

    #[test]
    fn status_thresholds_are_inclusive() {
        let status = BalanceStatus::from_difference;
        assert_eq!(status(MoneyCents::ZERO), BalanceStatus::Nominal);
        assert_eq!(status(MoneyCents::new(-5_00)), BalanceStatus::Nominal);
        assert_eq!(status(MoneyCents::new(5_01)), BalanceStatus::Warning);
        assert_eq!(status(MoneyCents::new(-10_00)), BalanceStatus::Warning);
        assert_eq!(status(MoneyCents::new(10_01)), BalanceStatus::Error);
    }

    #[test]
    fn amount_must_be_positive() {
        for cents in [0, -100] {
            let err = CashEvent::new(
                "alice",
                CashEventKind::Deposit,
                MoneyCents::new(cents),
                None,
                at(1),
            )
            .unwrap_err();
            assert!(matches!(err, EngineError::InvalidAmount(_)));
        }
        assert_eq!(
            event(CashEventKind::Withdrawal, 250, 1).signed_amount(),
            MoneyCents::new(-250)
        );
    }

    #[test]
    fn huge_amounts_saturate() {
        let huge = MoneyCents::from_major(1e17);
        let events = vec![
            CashEvent::new("alice", CashEventKind::Deposit, huge, None, at(2)).unwrap(),
            CashEvent::new("alice", CashEventKind::Deposit, huge, None, at(3)).unwrap(),
        ];
        let balance = balance(&[], &events);
        assert_eq!(balance.expected, MoneyCents::new(i64::MAX));
        assert_eq!(balance.difference, MoneyCents::new(-i64::MAX));
        assert_eq!(balance.status, BalanceStatus::Error);
    }
}
