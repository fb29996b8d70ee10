//! Revenue Aggregator
//!
//! Turns a flat order list into range-filtered totals, a capped
//! recent-order list, and a dense zero-filled time series for the
//! dashboard chart. Pure and synchronous: `now` is injected, and one pass
//! never reads the clock, so a pass is deterministic and repeatable.
//!
//! The bucket skeleton for the selected range is generated in full before
//! any order is touched, so every chart label exists even with zero
//! orders. Orders are then filtered, totalled, and added into the bucket
//! whose label matches their own formatted key.

use chrono::{Datelike, Days, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::domain::order::OrderRecord;

/// Cap on the recent-order list returned alongside the series.
pub const RECENT_ORDERS_CAP: usize = 10;

/// Aggregation window, anchored to the injected `now`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeRange {
    Day,
    Week,
    Month,
    Year,
}

/// Display locale. Affects chart labels only, never numeric values.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    Vi,
    Ja,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct CurrencyTotals {
    pub vi: i64,
    pub ja: i64,
}

/// One labeled slot of the time series, carrying both currency sums.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Bucket {
    pub label: String,
    pub vi: i64,
    pub ja: i64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RevenueReport {
    pub totals: CurrencyTotals,
    pub recent_orders: Vec<OrderRecord>,
    pub series: Vec<Bucket>,
}

/// One full aggregation pass over an in-memory order snapshot.
///
/// Orders with no usable `created_at` are excluded. The input is not
/// mutated and its relative order is preserved in `recent_orders`.
pub fn aggregate(
    orders: &[OrderRecord],
    range: TimeRange,
    locale: Locale,
    now: NaiveDateTime,
) -> RevenueReport {
    let mut series: Vec<Bucket> = bucket_labels(range, locale, now)
        .into_iter()
        .map(|label| Bucket { label, vi: 0, ja: 0 })
        .collect();

    let mut totals = CurrencyTotals::default();
    let mut recent = Vec::new();

    for order in orders {
        let Some(created) = order.created_at else {
            continue;
        };
        if !in_range(created, range, now) {
            continue;
        }

        totals.vi += order.total_price.vi;
        totals.ja += order.total_price.ja;

        if recent.len() < RECENT_ORDERS_CAP {
            recent.push(order.clone());
        }

        let key = bucket_key(created, range, locale);
        if !add_to_bucket(&mut series, &key, order.total_price.vi, order.total_price.ja) {
            // Counted in totals, dropped from the series only.
            tracing::debug!(%key, code = %order.code, "Bucket key missing from skeleton");
        }
    }

    RevenueReport {
        totals,
        recent_orders: recent,
        series,
    }
}

fn add_to_bucket(series: &mut [Bucket], key: &str, vi: i64, ja: i64) -> bool {
    match series.iter_mut().find(|b| b.label == key) {
        Some(bucket) => {
            bucket.vi += vi;
            bucket.ja += ja;
            true
        }
        None => false,
    }
}

fn in_range(created: NaiveDateTime, range: TimeRange, now: NaiveDateTime) -> bool {
    match range {
        TimeRange::Day => created.date() == now.date(),
        TimeRange::Week => created >= week_start(now) && created <= now,
        TimeRange::Month => {
            created.year() == now.year() && created.month() == now.month()
        }
        TimeRange::Year => created.year() == now.year(),
    }
}

/// Monday 00:00:00 of the week containing `now`. Monday-start regardless
/// of locale.
fn week_start(now: NaiveDateTime) -> NaiveDateTime {
    let back = now.weekday().num_days_from_monday() as u64;
    now.date()
        .checked_sub_days(Days::new(back))
        .unwrap_or_else(|| now.date())
        .and_time(NaiveTime::MIN)
}

fn bucket_labels(range: TimeRange, locale: Locale, now: NaiveDateTime) -> Vec<String> {
    match range {
        TimeRange::Day => (0..24).map(|h| format!("{h:02}:00")).collect(),
        TimeRange::Week => {
            let monday = week_start(now).date();
            (0..7)
                .filter_map(|i| monday.checked_add_days(Days::new(i)))
                .map(|d| day_month_label(d, locale))
                .collect()
        }
        TimeRange::Month => (1..=days_in_month(now.year(), now.month()))
            .map(|d| d.to_string())
            .collect(),
        TimeRange::Year => (1..=12).map(|m| month_label(m, locale)).collect(),
    }
}

// Must agree exactly with the label rule in `bucket_labels`.
fn bucket_key(created: NaiveDateTime, range: TimeRange, locale: Locale) -> String {
    match range {
        TimeRange::Day => format!("{:02}:00", created.hour()),
        TimeRange::Week => day_month_label(created.date(), locale),
        TimeRange::Month => created.day().to_string(),
        TimeRange::Year => month_label(created.month(), locale),
    }
}

/// Short day/month label: `d/m` in Vietnamese, `m/d` in Japanese.
fn day_month_label(date: NaiveDate, locale: Locale) -> String {
    match locale {
        Locale::Vi => format!("{}/{}", date.day(), date.month()),
        Locale::Ja => format!("{}/{}", date.month(), date.day()),
    }
}

fn month_label(month: u32, locale: Locale) -> String {
    match locale {
        Locale::Vi => format!("T{month}"),
        Locale::Ja => format!("{month}月"),
    }
}

fn days_in_month(year: i32, month: u32) -> u32 {
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    };
    next.and_then(|d| d.pred_opt()).map(|d| d.day()).unwrap_or(30)
}
