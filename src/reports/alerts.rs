//! Delivery alert evaluation.
//!
//! Read-side classifier comparing container ETAs to the current time.
//! Pure function of its inputs; safe to call concurrently.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::domain::{Container, ContainerId, ContainerStatus};

/// Alert severity for a container's ETA.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlertLevel {
    /// ETA is comfortably in the future.
    OnTime,
    /// ETA falls within the warning window.
    Warning,
    /// ETA has passed without an arrival.
    Overdue,
    /// Defined but dormant: containers that have completed arrival are
    /// filtered out before classification, so this level is currently
    /// unreachable. Kept pending clarification of the scheduler's
    /// intended behavior.
    Arrived,
}

/// One evaluated container.
#[derive(Debug, Clone, Serialize)]
pub struct DeliveryAlert {
    /// Container identifier.
    pub container_id: ContainerId,
    /// Business identifier.
    pub container_number: String,
    /// Current lifecycle status.
    pub status: ContainerStatus,
    /// Estimated arrival date.
    pub estimated_arrival: DateTime<Utc>,
    /// Classified severity.
    pub level: AlertLevel,
    /// Whole days until the ETA (negative when overdue).
    pub days_remaining: i64,
}

/// Classifies a single container, or `None` if it is not eligible
/// (only `Loaded` and `InTransit` containers with a known ETA are).
#[must_use]
pub fn classify(
    container: &Container,
    now: DateTime<Utc>,
    warning_window: Duration,
) -> Option<DeliveryAlert> {
    if !matches!(
        container.status,
        ContainerStatus::Loaded | ContainerStatus::InTransit
    ) {
        return None;
    }
    let eta = container.estimated_arrival?;

    let level = if now > eta {
        AlertLevel::Overdue
    } else if eta <= now + warning_window {
        AlertLevel::Warning
    } else {
        AlertLevel::OnTime
    };

    Some(DeliveryAlert {
        container_id: container.container_id,
        container_number: container.container_number.clone(),
        status: container.status,
        estimated_arrival: eta,
        level,
        days_remaining: (eta - now).num_days(),
    })
}

/// Evaluates every eligible container in the snapshot.
#[must_use]
pub fn evaluate(
    containers: &[Container],
    now: DateTime<Utc>,
    warning_window: Duration,
) -> Vec<DeliveryAlert> {
    containers
        .iter()
        .filter_map(|c| classify(c, now, warning_window))
        .collect()
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn make_container(status: ContainerStatus, eta: Option<DateTime<Utc>>) -> Container {
        let mut c = Container::new("MSKU1234567".to_string(), None);
        c.status = status;
        c.estimated_arrival = eta;
        c
    }

    #[test]
    fn overdue_when_eta_passed() {
        let now = Utc::now();
        let container = make_container(ContainerStatus::InTransit, Some(now - Duration::hours(1)));
        let alert = classify(&container, now, Duration::days(3));
        let Some(alert) = alert else {
            panic!("alert expected");
        };
        assert_eq!(alert.level, AlertLevel::Overdue);
    }

    #[test]
    fn warning_within_three_day_window() {
        // IN_TRANSIT with an ETA two days out lands in the window.
        let now = Utc::now();
        let container = make_container(ContainerStatus::InTransit, Some(now + Duration::days(2)));
        let alert = classify(&container, now, Duration::days(3));
        let Some(alert) = alert else {
            panic!("alert expected");
        };
        assert_eq!(alert.level, AlertLevel::Warning);
        assert_eq!(alert.days_remaining, 2);
    }

    #[test]
    fn on_time_outside_window() {
        let now = Utc::now();
        let container = make_container(ContainerStatus::Loaded, Some(now + Duration::days(10)));
        let alert = classify(&container, now, Duration::days(3));
        let Some(alert) = alert else {
            panic!("alert expected");
        };
        assert_eq!(alert.level, AlertLevel::OnTime);
    }

    #[test]
    fn ineligible_statuses_skipped() {
        let now = Utc::now();
        let eta = Some(now + Duration::days(1));
        for status in [
            ContainerStatus::Created,
            ContainerStatus::WaitingForLoading,
            ContainerStatus::ArrivedPort,
            ContainerStatus::CustomsClearance,
            ContainerStatus::Released,
            ContainerStatus::Closed,
        ] {
            assert!(classify(&make_container(status, eta), now, Duration::days(3)).is_none());
        }
    }

    #[test]
    fn missing_eta_skipped() {
        let now = Utc::now();
        let container = make_container(ContainerStatus::InTransit, None);
        assert!(classify(&container, now, Duration::days(3)).is_none());
    }

    #[test]
    fn evaluate_filters_snapshot() {
        let now = Utc::now();
        let containers = vec![
            make_container(ContainerStatus::InTransit, Some(now + Duration::days(1))),
            make_container(ContainerStatus::Loaded, Some(now + Duration::days(30))),
            make_container(ContainerStatus::Closed, Some(now + Duration::days(1))),
            make_container(ContainerStatus::InTransit, None),
        ];
        let alerts = evaluate(&containers, now, Duration::days(3));
        assert_eq!(alerts.len(), 2);
    }
}
