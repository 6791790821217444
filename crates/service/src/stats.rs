//! Pure aggregation helpers behind dashboards, reports and the schedule.

use std::collections::HashMap;

use chrono::{Datelike, Duration, NaiveDate, NaiveTime, Timelike};
use models::appointment::overlaps;
use models::validate::round_money;
use serde::Serialize;

pub const SLOT_MINUTES: i64 = 30;
pub const DAY_OPENS: (u32, u32) = (9, 0);
pub const DAY_CLOSES: (u32, u32) = (20, 0);

/// Rows sharing one grouping key.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bucket {
    pub key: String,
    pub count: u64,
    pub total: f64,
}

/// Group rows by `key`, counting them and summing `amount`.
pub fn group<T>(rows: &[T], key: impl Fn(&T) -> String, amount: impl Fn(&T) -> f64) -> Vec<Bucket> {
    let mut order: Vec<String> = Vec::new();
    let mut acc: HashMap<String, (u64, f64)> = HashMap::new();
    for row in rows {
        let k = key(row);
        let entry = acc.entry(k.clone()).or_insert_with(|| {
            order.push(k);
            (0, 0.0)
        });
        entry.0 += 1;
        entry.1 += amount(row);
    }
    order
        .into_iter()
        .filter_map(|k| acc.remove(&k).map(|(count, total)| Bucket { key: k, count, total: round_money(total) }))
        .collect()
}

pub fn sort_by_count_desc(buckets: &mut [Bucket]) {
    buckets.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.key.cmp(&b.key)));
}

pub fn sort_by_total_desc(buckets: &mut [Bucket]) {
    buckets.sort_by(|a, b| b.total.total_cmp(&a.total).then_with(|| a.key.cmp(&b.key)));
}

pub fn sum(amounts: impl IntoIterator<Item = f64>) -> f64 {
    round_money(amounts.into_iter().fold(0.0, |acc, x| acc + x))
}

/// `part / whole` as a percentage rounded to 2 decimals; 0 when `whole` is 0.
pub fn rate(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    round_money(part as f64 / whole as f64 * 100.0)
}

/// Growth from `previous` to `current` in percent; 0 when there is no baseline.
pub fn percent_change(current: u64, previous: u64) -> f64 {
    if previous == 0 {
        return 0.0;
    }
    round_money((current as f64 - previous as f64) / previous as f64 * 100.0)
}

pub fn average(total: f64, count: u64) -> f64 {
    if count == 0 { 0.0 } else { round_money(total / count as f64) }
}

pub fn first_of_month(d: NaiveDate) -> NaiveDate {
    d.with_day(1).unwrap_or(d)
}

/// First day of the month after `(year, month)`.
pub fn next_month(year: i32, month: u32) -> NaiveDate {
    let (y, m) = if month == 12 { (year + 1, 1) } else { (year, month + 1) };
    NaiveDate::from_ymd_opt(y, m, 1).unwrap_or(NaiveDate::MAX)
}

pub fn month_start(year: i32, month: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, 1)
}

/// The `n` months ending with the month of `today`, oldest first.
pub fn trailing_months(today: NaiveDate, n: u32) -> Vec<(i32, u32)> {
    let mut out = Vec::with_capacity(n as usize);
    let (mut y, mut m) = (today.year(), today.month());
    for _ in 0..n {
        out.push((y, m));
        if m == 1 {
            y -= 1;
            m = 12;
        } else {
            m -= 1;
        }
    }
    out.reverse();
    out
}

/// "Jan 2024".
pub fn month_label(year: i32, month: u32) -> String {
    month_start(year, month).map(|d| d.format("%b %Y").to_string()).unwrap_or_default()
}

/// "2024-01".
pub fn month_key(d: NaiveDate) -> String {
    d.format("%Y-%m").to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyRevenue {
    pub date: NaiveDate,
    pub revenue: f64,
}

/// One entry per day in `[start, end]`, zero where nothing was sold.
pub fn daily_series(start: NaiveDate, end: NaiveDate, rows: &[(NaiveDate, f64)]) -> Vec<DailyRevenue> {
    let mut by_day: HashMap<NaiveDate, f64> = HashMap::new();
    for (d, amount) in rows {
        *by_day.entry(*d).or_default() += amount;
    }
    let mut out = Vec::new();
    let mut day = start;
    while day <= end {
        out.push(DailyRevenue { date: day, revenue: round_money(by_day.get(&day).copied().unwrap_or(0.0)) });
        day += Duration::days(1);
    }
    out
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HourCount {
    pub hour: u32,
    pub count: u64,
}

/// Appointment counts per starting hour, busiest first.
pub fn peak_hours(times: &[NaiveTime]) -> Vec<HourCount> {
    let mut counts: HashMap<u32, u64> = HashMap::new();
    for t in times {
        *counts.entry(t.hour()).or_default() += 1;
    }
    let mut out: Vec<HourCount> = counts.into_iter().map(|(hour, count)| HourCount { hour, count }).collect();
    out.sort_by(|a, b| b.count.cmp(&a.count).then(a.hour.cmp(&b.hour)));
    out
}

/// Bookable slot starts from opening to closing time inclusive.
pub fn time_slots() -> Vec<NaiveTime> {
    let (Some(mut t), Some(close)) = (
        NaiveTime::from_hms_opt(DAY_OPENS.0, DAY_OPENS.1, 0),
        NaiveTime::from_hms_opt(DAY_CLOSES.0, DAY_CLOSES.1, 0),
    ) else {
        return Vec::new();
    };
    let mut out = Vec::new();
    while t <= close {
        out.push(t);
        t += Duration::minutes(SLOT_MINUTES);
    }
    out
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SlotAvailability {
    pub time: String,
    pub available: bool,
}

/// Mark each slot free unless `[slot, slot+30)` overlaps a booked interval.
pub fn slot_availability(booked: &[(u32, u32)]) -> Vec<SlotAvailability> {
    time_slots()
        .into_iter()
        .map(|t| {
            let slot = models::appointment::interval(t, SLOT_MINUTES as i32);
            SlotAvailability {
                time: t.format("%H:%M").to_string(),
                available: !booked.iter().any(|b| overlaps(slot, *b)),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn group_counts_and_sums_in_first_seen_order() {
        let rows = vec![("Cut", 100.0), ("Shave", 50.0), ("Cut", 150.555), ("Beard", 80.0), ("Shave", 50.0)];
        let mut b = group(&rows, |r| r.0.to_string(), |r| r.1);
        assert_eq!(b.iter().map(|x| x.key.as_str()).collect::<Vec<_>>(), vec!["Cut", "Shave", "Beard"]);
        assert_eq!(b[0].count, 2);
        assert_eq!(b[0].total, 250.56);
        sort_by_total_desc(&mut b);
        assert_eq!(b[0].key, "Cut");
        sort_by_count_desc(&mut b);
        assert_eq!(b.iter().map(|x| x.key.as_str()).collect::<Vec<_>>(), vec!["Cut", "Shave", "Beard"]);
    }

    #[test]
    fn empty_sets_sum_to_zero() {
        assert_eq!(sum(Vec::<f64>::new()), 0.0);
        assert!(sum(Vec::<f64>::new()).is_sign_positive());
        assert_eq!(serde_json::json!({ "total_sales": sum(Vec::<f64>::new()) }).to_string(), r#"{"total_sales":0.0}"#);
        assert!(round_money(-0.001).is_sign_positive());
        assert_eq!(average(0.0, 0), 0.0);
        assert_eq!(rate(0, 0), 0.0);
        assert!(group(&Vec::<(String, f64)>::new(), |r| r.0.clone(), |r| r.1).is_empty());
    }

    #[test]
    fn growth_and_rates() {
        assert_eq!(percent_change(6, 4), 50.0);
        assert_eq!(percent_change(2, 4), -50.0);
        assert_eq!(percent_change(5, 0), 0.0);
        assert_eq!(rate(1, 3), 33.33);
    }

    #[test]
    fn trailing_months_cross_year_boundary() {
        let months = trailing_months(d(2024, 2, 15), 4);
        assert_eq!(months, vec![(2023, 11), (2023, 12), (2024, 1), (2024, 2)]);
        assert_eq!(month_label(2023, 11), "Nov 2023");
        assert_eq!(next_month(2023, 12), d(2024, 1, 1));
        assert_eq!(month_key(d(2024, 3, 9)), "2024-03");
        assert_eq!(trailing_months(d(2024, 6, 1), 12).len(), 12);
    }

    #[test]
    fn daily_series_is_zero_filled() {
        let rows = vec![(d(2024, 1, 2), 10.0), (d(2024, 1, 2), 5.5), (d(2024, 1, 4), 1.0)];
        let s = daily_series(d(2024, 1, 1), d(2024, 1, 4), &rows);
        assert_eq!(s.len(), 4);
        assert_eq!(s[0].revenue, 0.0);
        assert_eq!(s[1].revenue, 15.5);
        assert_eq!(s[2].revenue, 0.0);
    }

    #[test]
    fn peak_hours_orders_busiest_first() {
        let t = |h, m| NaiveTime::from_hms_opt(h, m, 0).unwrap();
        let p = peak_hours(&[t(10, 0), t(10, 30), t(14, 0), t(9, 0), t(14, 15), t(10, 45)]);
        assert_eq!(p[0], HourCount { hour: 10, count: 3 });
        assert_eq!(p[1], HourCount { hour: 14, count: 2 });
    }

    #[test]
    fn slots_span_opening_hours() {
        let slots = time_slots();
        assert_eq!(slots.len(), 23);
        assert_eq!(slots.first().map(|t| t.format("%H:%M").to_string()).as_deref(), Some("09:00"));
        assert_eq!(slots.last().map(|t| t.format("%H:%M").to_string()).as_deref(), Some("20:00"));
    }

    #[test]
    fn availability_uses_interval_overlap() {
        let ten = NaiveTime::from_hms_opt(10, 0, 0).unwrap();
        let booked = vec![models::appointment::interval(ten, 60)];
        let slots = slot_availability(&booked);
        let state = |label: &str| slots.iter().find(|s| s.time == label).map(|s| s.available);
        assert_eq!(state("09:30"), Some(true));
        assert_eq!(state("10:00"), Some(false));
        assert_eq!(state("10:30"), Some(false));
        assert_eq!(state("11:00"), Some(true));
    }
}
