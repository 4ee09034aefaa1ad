//! Overtime derived from delivered trip distance.

use chrono::NaiveDate;

use crate::models::{Trip, TripStatus};

use super::money::round_currency;

/// Sum the distance of a driver's delivered trips inside the pay
/// period (inclusive bounds) and convert it to an overtime amount at
/// the given per-kilometer rate. No matching trips is a plain 0, not
/// an error.
pub fn overtime_for_driver(
    driver_id: &str,
    period_start: NaiveDate,
    period_end: NaiveDate,
    rate_per_km: f64,
    trips: &[Trip],
) -> f64 {
    let distance: f64 = trips
        .iter()
        .filter(|t| t.driver_id == driver_id)
        .filter(|t| t.status == TripStatus::Delivered)
        .filter(|t| {
            t.effective_date()
                .map(|d| d >= period_start && d <= period_end)
                .unwrap_or(false)
        })
        .map(|t| t.distance_km.max(0.0))
        .sum();

    round_currency(distance * rate_per_km)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Trip;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn trip(driver_id: &str, status: TripStatus, distance_km: f64, delivered: &str) -> Trip {
        let mut t = Trip::new(driver_id.to_string(), status, distance_km);
        t.delivery_date = Some(date(delivered));
        t
    }

    #[test]
    fn only_delivered_trips_for_the_driver_count() {
        let trips = vec![
            trip("DRV-002", TripStatus::Delivered, 100.0, "2026-03-10"),
            trip("DRV-002", TripStatus::Planned, 50.0, "2026-03-12"),
            trip("DRV-001", TripStatus::Delivered, 200.0, "2026-03-15"),
        ];
        let amount = overtime_for_driver(
            "DRV-002",
            date("2026-03-01"),
            date("2026-03-31"),
            0.45,
            &trips,
        );
        assert_eq!(amount, 45.0);
    }

    #[test]
    fn window_bounds_are_inclusive() {
        let trips = vec![
            trip("DRV-001", TripStatus::Delivered, 10.0, "2026-03-01"),
            trip("DRV-001", TripStatus::Delivered, 20.0, "2026-03-31"),
            trip("DRV-001", TripStatus::Delivered, 40.0, "2026-04-01"),
        ];
        let amount = overtime_for_driver(
            "DRV-001",
            date("2026-03-01"),
            date("2026-03-31"),
            1.0,
            &trips,
        );
        assert_eq!(amount, 30.0);
    }

    #[test]
    fn pickup_date_is_used_when_delivery_date_is_missing() {
        let mut t = Trip::new("DRV-001".to_string(), TripStatus::Delivered, 60.0);
        t.pickup_date = Some(date("2026-03-20"));
        let amount = overtime_for_driver(
            "DRV-001",
            date("2026-03-01"),
            date("2026-03-31"),
            0.5,
            &[t],
        );
        assert_eq!(amount, 30.0);
    }

    #[test]
    fn no_matching_trips_is_zero() {
        let amount = overtime_for_driver(
            "DRV-009",
            date("2026-03-01"),
            date("2026-03-31"),
            0.45,
            &[],
        );
        assert_eq!(amount, 0.0);
    }
}
