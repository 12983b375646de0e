//! Aging report over outstanding shipment balances.
//!
//! Pure read-side aggregator: given the set of unpaid shipments and
//! their total debits, buckets each shipment by age in days and sums its
//! debit into exactly one bucket.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::domain::{ShipmentId, UserId};

/// Day-range buckets for outstanding balances.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AgeBucket {
    /// 0–30 days outstanding.
    Days0To30,
    /// 31–60 days outstanding.
    Days31To60,
    /// 61–90 days outstanding.
    Days61To90,
    /// More than 90 days outstanding.
    Over90,
}

/// All buckets in report order.
pub const BUCKETS: [AgeBucket; 4] = [
    AgeBucket::Days0To30,
    AgeBucket::Days31To60,
    AgeBucket::Days61To90,
    AgeBucket::Over90,
];

impl AgeBucket {
    /// Classifies an age in whole days into its bucket.
    #[must_use]
    pub const fn for_age_days(age_days: i64) -> Self {
        if age_days <= 30 {
            Self::Days0To30
        } else if age_days <= 60 {
            Self::Days31To60
        } else if age_days <= 90 {
            Self::Days61To90
        } else {
            Self::Over90
        }
    }

    /// Human-readable label for report output.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Days0To30 => "0-30",
            Self::Days31To60 => "31-60",
            Self::Days61To90 => "61-90",
            Self::Over90 => "90+",
        }
    }
}

/// One outstanding shipment with its total debit, as fed into the
/// report.
#[derive(Debug, Clone, Serialize)]
pub struct OutstandingShipment {
    /// Shipment identifier.
    pub shipment_id: ShipmentId,
    /// Owning account.
    pub user_id: UserId,
    /// When the shipment was opened.
    pub created_at: DateTime<Utc>,
    /// Age in whole days at report time.
    pub age_days: i64,
    /// Sum of debit entries attributed to the shipment.
    pub total_debit: Decimal,
}

/// Per-bucket summary line.
#[derive(Debug, Clone, Serialize)]
pub struct BucketSummary {
    /// Bucket identifier.
    pub bucket: AgeBucket,
    /// Day-range label.
    pub label: &'static str,
    /// Number of shipments in the bucket.
    pub count: usize,
    /// Total outstanding debit in the bucket.
    pub total: Decimal,
    /// Percentage of the grand total (0 when the grand total is 0).
    pub percentage: Decimal,
    /// Shipments in the bucket.
    pub shipments: Vec<OutstandingShipment>,
}

/// Complete aging report.
#[derive(Debug, Clone, Serialize)]
pub struct AgingReport {
    /// One summary per bucket, in report order.
    pub buckets: Vec<BucketSummary>,
    /// Sum of all outstanding debits.
    pub grand_total: Decimal,
    /// When the report was computed.
    pub generated_at: DateTime<Utc>,
}

/// Builds the aging report from outstanding shipments.
///
/// Each shipment lands in exactly one bucket by
/// `floor((now - created_at) / 86 400 s)`. Percentages are of the grand
/// total, rounded to two decimal places; when the grand total is zero
/// every percentage is zero (never a division by zero).
#[must_use]
pub fn build_report(
    shipments: Vec<(ShipmentId, UserId, DateTime<Utc>, Decimal)>,
    now: DateTime<Utc>,
) -> AgingReport {
    let mut bucketed: [Vec<OutstandingShipment>; 4] = [vec![], vec![], vec![], vec![]];

    for (shipment_id, user_id, created_at, total_debit) in shipments {
        let age_days = (now - created_at).num_days();
        let row = OutstandingShipment {
            shipment_id,
            user_id,
            created_at,
            age_days,
            total_debit,
        };
        let slot = match AgeBucket::for_age_days(age_days) {
            AgeBucket::Days0To30 => 0,
            AgeBucket::Days31To60 => 1,
            AgeBucket::Days61To90 => 2,
            AgeBucket::Over90 => 3,
        };
        if let Some(bucket) = bucketed.get_mut(slot) {
            bucket.push(row);
        }
    }

    let grand_total: Decimal = bucketed
        .iter()
        .flat_map(|b| b.iter())
        .map(|s| s.total_debit)
        .sum();

    let buckets = BUCKETS
        .iter()
        .zip(bucketed)
        .map(|(bucket, shipments)| {
            let total: Decimal = shipments.iter().map(|s| s.total_debit).sum();
            let percentage = if grand_total.is_zero() {
                Decimal::ZERO
            } else {
                (total / grand_total * Decimal::ONE_HUNDRED).round_dp(2)
            };
            BucketSummary {
                bucket: *bucket,
                label: bucket.label(),
                count: shipments.len(),
                total,
                percentage,
                shipments,
            }
        })
        .collect();

    AgingReport {
        buckets,
        grand_total,
        generated_at: now,
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use chrono::Duration;
    use rust_decimal_macros::dec;

    fn shipment_aged(days: i64, debit: Decimal, now: DateTime<Utc>) -> (ShipmentId, UserId, DateTime<Utc>, Decimal) {
        (
            ShipmentId::new(),
            UserId::new(),
            now - Duration::days(days),
            debit,
        )
    }

    #[test]
    fn bucket_boundaries() {
        assert_eq!(AgeBucket::for_age_days(0), AgeBucket::Days0To30);
        assert_eq!(AgeBucket::for_age_days(30), AgeBucket::Days0To30);
        assert_eq!(AgeBucket::for_age_days(31), AgeBucket::Days31To60);
        assert_eq!(AgeBucket::for_age_days(60), AgeBucket::Days31To60);
        assert_eq!(AgeBucket::for_age_days(61), AgeBucket::Days61To90);
        assert_eq!(AgeBucket::for_age_days(90), AgeBucket::Days61To90);
        assert_eq!(AgeBucket::for_age_days(91), AgeBucket::Over90);
        assert_eq!(AgeBucket::for_age_days(400), AgeBucket::Over90);
    }

    #[test]
    fn each_shipment_lands_in_exactly_one_bucket() {
        let now = Utc::now();
        let report = build_report(
            vec![
                shipment_aged(5, dec!(100), now),
                shipment_aged(45, dec!(200), now),
                shipment_aged(75, dec!(300), now),
                shipment_aged(120, dec!(400), now),
            ],
            now,
        );

        let counts: Vec<usize> = report.buckets.iter().map(|b| b.count).collect();
        assert_eq!(counts, vec![1, 1, 1, 1]);
        assert_eq!(report.grand_total, dec!(1000));
    }

    #[test]
    fn percentages_sum_to_one_hundred() {
        let now = Utc::now();
        let report = build_report(
            vec![
                shipment_aged(10, dec!(250), now),
                shipment_aged(40, dec!(250), now),
                shipment_aged(70, dec!(250), now),
                shipment_aged(100, dec!(250), now),
            ],
            now,
        );

        let sum: Decimal = report.buckets.iter().map(|b| b.percentage).sum();
        // Exact here; allow rounding drift in general.
        assert!((sum - dec!(100)).abs() <= dec!(0.05), "sum was {sum}");
    }

    #[test]
    fn zero_grand_total_gives_zero_percentages() {
        let now = Utc::now();
        let report = build_report(vec![], now);
        assert_eq!(report.grand_total, Decimal::ZERO);
        for bucket in &report.buckets {
            assert_eq!(bucket.percentage, Decimal::ZERO);
        }
    }

    #[test]
    fn age_days_is_floor_of_elapsed() {
        let now = Utc::now();
        // 30 days and 23 hours old still floors to 30 days → first bucket.
        let created = now - Duration::days(30) - Duration::hours(23);
        let report = build_report(
            vec![(ShipmentId::new(), UserId::new(), created, dec!(50))],
            now,
        );
        let Some(first) = report.buckets.first() else {
            panic!("buckets expected");
        };
        assert_eq!(first.count, 1);
    }
}
