//! Compliance and maintenance scanner
//!
//! Pure functions over an [`Asset`] and a reference date. Nothing here
//! mutates state, so callers may evaluate from any thread at any time.

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::entities::asset::Asset;

/// A single compliance or maintenance warning
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Alert {
    MaintenanceDue,
    InsuranceExpired,
    TechnicalControlExpired,
}

impl Alert {
    pub fn label(&self) -> &'static str {
        match self {
            Alert::MaintenanceDue => "Maintenance due",
            Alert::InsuranceExpired => "Insurance expired",
            Alert::TechnicalControlExpired => "Technical control expired",
        }
    }
}

impl std::fmt::Display for Alert {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Alert::MaintenanceDue => write!(f, "maintenance_due"),
            Alert::InsuranceExpired => write!(f, "insurance_expired"),
            Alert::TechnicalControlExpired => write!(f, "technical_control_expired"),
        }
    }
}

/// Alerts raised for one asset at one instant
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AlertSet(BTreeSet<Alert>);

impl AlertSet {
    pub fn contains(&self, alert: Alert) -> bool {
        self.0.contains(&alert)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = Alert> + '_ {
        self.0.iter().copied()
    }

    fn raise_if(&mut self, cond: bool, alert: Alert) {
        if cond {
            self.0.insert(alert);
        }
    }
}

impl FromIterator<Alert> for AlertSet {
    fn from_iter<I: IntoIterator<Item = Alert>>(iter: I) -> Self {
        AlertSet(iter.into_iter().collect())
    }
}

impl std::fmt::Display for AlertSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<String> = self.iter().map(|a| a.to_string()).collect();
        f.write_str(&names.join(", "))
    }
}

/// Compute the alert set of `asset` as of `today`
pub fn evaluate(asset: &Asset, today: NaiveDate, lookahead_days: u32) -> AlertSet {
    let mut alerts = AlertSet::default();
    alerts.raise_if(
        maintenance_due(asset, today, lookahead_days),
        Alert::MaintenanceDue,
    );
    alerts.raise_if(
        asset.insurance_expiry.is_some_and(|d| d < today),
        Alert::InsuranceExpired,
    );
    alerts.raise_if(
        asset.technical_control_expiry.is_some_and(|d| d < today),
        Alert::TechnicalControlExpired,
    );
    alerts
}

/// Last day of a `days`-long window starting `today`
///
/// `None` when the window runs past the last representable date, in which
/// case every date counts as inside it.
fn horizon(today: NaiveDate, days: u32) -> Option<NaiveDate> {
    today.checked_add_days(Days::new(u64::from(days)))
}

/// Calendar or distance maintenance is due
///
/// The look-ahead window never exceeds the asset's own calendar interval,
/// otherwise a short-interval asset would be due again the day it was serviced.
pub fn maintenance_due(asset: &Asset, today: NaiveDate, lookahead_days: u32) -> bool {
    let by_date = asset.next_maintenance.is_some_and(|next| {
        let window = match asset.maintenance_interval.days {
            Some(interval) => lookahead_days.min(interval),
            None => lookahead_days,
        };
        next <= today || horizon(today, window).is_none_or(|end| next < end)
    });

    let by_distance = match (
        asset.maintenance_interval.distance_km,
        asset.distance_since_maintenance(),
    ) {
        (Some(interval), Some(driven)) => driven >= interval,
        _ => false,
    };

    by_date || by_distance
}

/// A tracked document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Document {
    Insurance,
    TechnicalControl,
    Warranty,
}

impl std::fmt::Display for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Document::Insurance => write!(f, "insurance"),
            Document::TechnicalControl => write!(f, "technical_control"),
            Document::Warranty => write!(f, "warranty"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expiry {
    pub document: Document,
    pub date: NaiveDate,
    pub days_left: i64,
}

/// Documents that are still valid but expire within `within_days`
pub fn upcoming_expiries(asset: &Asset, today: NaiveDate, within_days: u32) -> Vec<Expiry> {
    let end = horizon(today, within_days);
    let mut out: Vec<Expiry> = [
        (Document::Insurance, asset.insurance_expiry),
        (Document::TechnicalControl, asset.technical_control_expiry),
        (Document::Warranty, asset.warranty_expiry),
    ]
    .into_iter()
    .filter_map(|(document, date)| {
        let date = date?;
        (date >= today && end.is_none_or(|end| date <= end)).then(|| Expiry {
            document,
            date,
            days_left: (date - today).num_days(),
        })
    })
    .collect();
    out.sort_by_key(|e| e.date);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::asset::AssetKind;
    use chrono::{Duration, Utc};

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn van() -> Asset {
        Asset::new("Van", AssetKind::Vehicle, "test", Utc::now())
    }

    #[test]
    fn test_nothing_tracked_means_no_alerts() {
        assert!(evaluate(&van(), day(2026, 10, 18), 30).is_empty());
    }

    #[test]
    fn test_expiry_is_strict() {
        let mut v = van();
        let today = day(2026, 10, 18);
        v.insurance_expiry = Some(today);
        assert!(!evaluate(&v, today, 30).contains(Alert::InsuranceExpired));

        v.insurance_expiry = today.pred_opt();
        assert!(evaluate(&v, today, 30).contains(Alert::InsuranceExpired));
    }

    #[test]
    fn test_date_inside_lookahead() {
        let mut v = van();
        let today = day(2026, 10, 18);
        v.next_maintenance = Some(day(2026, 11, 10));
        assert!(maintenance_due(&v, today, 30));
        v.next_maintenance = Some(day(2026, 12, 31));
        assert!(!maintenance_due(&v, today, 30));
    }

    #[test]
    fn test_overdue_date() {
        let mut v = van();
        v.next_maintenance = Some(day(2026, 1, 1));
        assert!(maintenance_due(&v, day(2026, 10, 18), 0));
    }

    #[test]
    fn test_window_capped_by_interval() {
        let mut v = van();
        let today = day(2026, 10, 18);
        v.maintenance_interval.days = Some(7);
        v.next_maintenance = Some(today + Duration::days(7));
        assert!(!maintenance_due(&v, today, 30));
        v.next_maintenance = Some(today + Duration::days(6));
        assert!(maintenance_due(&v, today, 30));
    }

    #[test]
    fn test_distance_threshold() {
        let mut v = van();
        v.maintenance_interval.distance_km = Some(15_000);
        v.mileage_at_last_maintenance = Some(30_000);
        v.mileage = Some(44_999);
        assert!(!maintenance_due(&v, day(2026, 10, 18), 30));
        v.mileage = Some(45_000);
        assert!(maintenance_due(&v, day(2026, 10, 18), 30));
    }

    #[test]
    fn test_upcoming_expiries_sorted() {
        let mut v = van();
        let today = day(2026, 10, 18);
        v.insurance_expiry = Some(day(2026, 11, 30));
        v.technical_control_expiry = Some(day(2026, 10, 25));
        v.warranty_expiry = Some(day(2027, 6, 1));

        let soon = upcoming_expiries(&v, today, 60);
        assert_eq!(soon.len(), 2);
        assert_eq!(soon[0].document, Document::TechnicalControl);
        assert_eq!(soon[0].days_left, 7);
        assert_eq!(soon[1].document, Document::Insurance);
    }

    #[test]
    fn test_huge_windows_reach_every_date() {
        let mut v = van();
        let today = day(2026, 10, 18);
        v.next_maintenance = Some(day(2030, 1, 1));
        v.warranty_expiry = Some(day(2099, 12, 31));

        assert!(maintenance_due(&v, today, u32::MAX));
        let soon = upcoming_expiries(&v, today, u32::MAX);
        assert_eq!(soon.len(), 1);
        assert_eq!(soon[0].document, Document::Warranty);
    }

    #[test]
    fn test_alert_set_display() {
        let set: AlertSet = [Alert::TechnicalControlExpired, Alert::MaintenanceDue]
            .into_iter()
            .collect();
        insta::assert_snapshot!(set.to_string(), @"maintenance_due, technical_control_expired");
    }
}
