//! Calendar arithmetic and holiday lookup.
//!
//! Holidays come from built-in rule tables rather than an external service,
//! so every lookup is deterministic and free of I/O.

use std::collections::HashSet;
use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use tracing::warn;

use crate::error::{CycleError, Result};

const DATE_FORMAT: &str = "%Y-%m-%d";

// ── CalendarDate ──────────────────────────────────────────────────────────────

/// A `YYYY-MM-DD` calendar date.
///
/// Ordering matches both chronological and lexicographic order of the text
/// form, so range checks on dates and on their strings agree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CalendarDate(NaiveDate);

impl CalendarDate {
    /// Parse a strict `YYYY-MM-DD` string.
    pub fn parse(s: &str) -> Result<Self> {
        if s.len() != 10 {
            return Err(CycleError::DateFormat(s.to_string()));
        }
        NaiveDate::parse_from_str(s, DATE_FORMAT)
            .map(Self)
            .map_err(|_| CycleError::DateFormat(s.to_string()))
    }

    pub fn from_ymd(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day).map(Self)
    }

    pub fn date(&self) -> NaiveDate {
        self.0
    }

    /// Whether this date lies in `[start, end]`.
    pub fn within(&self, start: CalendarDate, end: CalendarDate) -> bool {
        start <= *self && *self <= end
    }
}

impl From<NaiveDate> for CalendarDate {
    fn from(date: NaiveDate) -> Self {
        Self(date)
    }
}

impl FromStr for CalendarDate {
    type Err = CycleError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for CalendarDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(DATE_FORMAT))
    }
}

impl Serialize for CalendarDate {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for CalendarDate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}

/// Inclusive number of days from `start` to `end` (`end - start + 1`).
pub fn day_count(start: &str, end: &str) -> Result<i64> {
    let start = CalendarDate::parse(start)?;
    let end = CalendarDate::parse(end)?;
    Ok((end.0 - start.0).num_days() + 1)
}

// ── HolidayEntry ──────────────────────────────────────────────────────────────

/// One named holiday on one date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HolidayEntry {
    pub date: CalendarDate,
    pub name: String,
}

impl HolidayEntry {
    /// Whether this entry is a weekday substitute for a weekend holiday.
    pub fn is_observed(&self) -> bool {
        self.name.contains("observed")
    }

    /// The individual holiday names of a merged entry.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.name.split("; ")
    }
}

// ── Holiday rules ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy)]
enum Rule {
    /// Same month and day every year.
    Fixed { month: u32, day: u32 },
    /// The `n`th given weekday of the month (1-based).
    Nth { month: u32, weekday: Weekday, n: u32 },
    /// The last given weekday of the month.
    Last { month: u32, weekday: Weekday },
    /// The given weekday falling on or before a day of the month.
    OnOrBefore { month: u32, day: u32, weekday: Weekday },
    /// Days relative to Easter Sunday.
    Easter(i64),
}

#[derive(Debug, Clone, Copy)]
struct HolidayRule {
    name: &'static str,
    rule: Rule,
    since: i32,
    /// Fixed-date holidays that get a weekday substitute when they land on a
    /// weekend.
    observed: bool,
}

const fn fixed(name: &'static str, month: u32, day: u32, since: i32, observed: bool) -> HolidayRule {
    HolidayRule {
        name,
        rule: Rule::Fixed { month, day },
        since,
        observed,
    }
}

const fn floating(name: &'static str, rule: Rule, since: i32) -> HolidayRule {
    HolidayRule {
        name,
        rule,
        since,
        observed: false,
    }
}

const US_FEDERAL: &[HolidayRule] = &[
    fixed("New Year's Day", 1, 1, 1871, true),
    floating(
        "Martin Luther King Jr. Day",
        Rule::Nth { month: 1, weekday: Weekday::Mon, n: 3 },
        1986,
    ),
    floating(
        "Washington's Birthday",
        Rule::Nth { month: 2, weekday: Weekday::Mon, n: 3 },
        1971,
    ),
    floating("Memorial Day", Rule::Last { month: 5, weekday: Weekday::Mon }, 1971),
    fixed("Juneteenth National Independence Day", 6, 19, 2021, true),
    fixed("Independence Day", 7, 4, 1871, true),
    floating("Labor Day", Rule::Nth { month: 9, weekday: Weekday::Mon, n: 1 }, 1894),
    floating("Columbus Day", Rule::Nth { month: 10, weekday: Weekday::Mon, n: 2 }, 1971),
    fixed("Veterans Day", 11, 11, 1954, true),
    floating("Thanksgiving", Rule::Nth { month: 11, weekday: Weekday::Thu, n: 4 }, 1942),
    fixed("Christmas Day", 12, 25, 1871, true),
];

const US_CA: &[HolidayRule] = &[fixed("Cesar Chavez Day", 3, 31, 1995, true)];

const US_HI: &[HolidayRule] = &[
    fixed("Prince Jonah Kuhio Kalanianaole Day", 3, 26, 1949, true),
    floating("Good Friday", Rule::Easter(-2), 1941),
    fixed("Kamehameha Day", 6, 11, 1872, true),
];

const US_IL: &[HolidayRule] = &[fixed("Lincoln's Birthday", 2, 12, 1971, false)];

const US_MA: &[HolidayRule] = &[floating(
    "Patriots' Day",
    Rule::Nth { month: 4, weekday: Weekday::Mon, n: 3 },
    1969,
)];

const US_NY: &[HolidayRule] = &[
    fixed("Lincoln's Birthday", 2, 12, 1971, false),
    fixed("Susan B. Anthony Day", 2, 15, 2004, false),
];

const US_TX: &[HolidayRule] = &[
    fixed("Texas Independence Day", 3, 2, 1874, false),
    fixed("San Jacinto Day", 4, 21, 1875, false),
    fixed("Emancipation Day In Texas", 6, 19, 1980, false),
    fixed("Lyndon Baines Johnson Day", 8, 27, 1973, false),
];

const CA_NATIONAL: &[HolidayRule] = &[
    fixed("New Year's Day", 1, 1, 1867, true),
    floating("Good Friday", Rule::Easter(-2), 1867),
    floating(
        "Victoria Day",
        Rule::OnOrBefore { month: 5, day: 24, weekday: Weekday::Mon },
        1953,
    ),
    fixed("Canada Day", 7, 1, 1983, true),
    floating("Labour Day", Rule::Nth { month: 9, weekday: Weekday::Mon, n: 1 }, 1894),
    floating(
        "Thanksgiving Day",
        Rule::Nth { month: 10, weekday: Weekday::Mon, n: 2 },
        1957,
    ),
    fixed("Christmas Day", 12, 25, 1867, true),
];

const CA_BC: &[HolidayRule] = &[
    floating("Family Day", Rule::Nth { month: 2, weekday: Weekday::Mon, n: 3 }, 2019),
    floating(
        "British Columbia Day",
        Rule::Nth { month: 8, weekday: Weekday::Mon, n: 1 },
        1974,
    ),
];

const CA_ON: &[HolidayRule] = &[
    floating("Family Day", Rule::Nth { month: 2, weekday: Weekday::Mon, n: 3 }, 2008),
    floating("Civic Holiday", Rule::Nth { month: 8, weekday: Weekday::Mon, n: 1 }, 1900),
    fixed("Boxing Day", 12, 26, 1867, true),
];

const CA_QC: &[HolidayRule] = &[fixed("St. Jean Baptiste Day", 6, 24, 1925, true)];

// ── Country ───────────────────────────────────────────────────────────────────

/// Jurisdictions with built-in holiday rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Country {
    UnitedStates,
    Canada,
}

impl Country {
    fn national_rules(self) -> &'static [HolidayRule] {
        match self {
            Country::UnitedStates => US_FEDERAL,
            Country::Canada => CA_NATIONAL,
        }
    }

    fn subdivision_rules(self, code: &str) -> Option<&'static [HolidayRule]> {
        match (self, code) {
            (Country::UnitedStates, "CA") => Some(US_CA),
            (Country::UnitedStates, "HI") => Some(US_HI),
            (Country::UnitedStates, "IL") => Some(US_IL),
            (Country::UnitedStates, "MA") => Some(US_MA),
            (Country::UnitedStates, "NY") => Some(US_NY),
            (Country::UnitedStates, "TX") => Some(US_TX),
            (Country::Canada, "BC") => Some(CA_BC),
            (Country::Canada, "ON") => Some(CA_ON),
            (Country::Canada, "QC") => Some(CA_QC),
            _ => None,
        }
    }

    /// Weekday substitute for a holiday that falls on a weekend.
    ///
    /// US: Saturday → Friday, Sunday → Monday. Canada: the next weekday that
    /// is not already in `taken`.
    fn observed_date(self, date: NaiveDate, taken: &HashSet<NaiveDate>) -> Option<NaiveDate> {
        match (self, date.weekday()) {
            (Country::UnitedStates, Weekday::Sat) => Some(date - Duration::days(1)),
            (Country::UnitedStates, Weekday::Sun) => Some(date + Duration::days(1)),
            (Country::Canada, Weekday::Sat | Weekday::Sun) => {
                let mut candidate = date + Duration::days(1);
                while is_weekend(candidate) || taken.contains(&candidate) {
                    candidate += Duration::days(1);
                }
                Some(candidate)
            }
            _ => None,
        }
    }
}

fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

impl FromStr for Country {
    type Err = CycleError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_uppercase().as_str() {
            "US" | "USA" | "UNITED STATES" => Ok(Country::UnitedStates),
            "CA" | "CAN" | "CANADA" => Ok(Country::Canada),
            _ => Err(CycleError::UnsupportedCountry(s.to_string())),
        }
    }
}

// ── HolidayCalendar ───────────────────────────────────────────────────────────

/// Holiday lookup for one country and optional subdivision.
#[derive(Debug, Clone)]
pub struct HolidayCalendar {
    country: Country,
    rules: Vec<HolidayRule>,
}

impl HolidayCalendar {
    /// Build a calendar for `country`, adding `subdivision` rules when known.
    ///
    /// An unrecognised subdivision falls back to national holidays only.
    pub fn new(country: &str, subdivision: Option<&str>) -> Result<Self> {
        let country: Country = country.parse()?;
        let mut rules = country.national_rules().to_vec();

        if let Some(code) = subdivision.map(|s| s.trim().to_uppercase()) {
            if !code.is_empty() {
                match country.subdivision_rules(&code) {
                    Some(extra) => rules.extend_from_slice(extra),
                    None => warn!(
                        "HolidayCalendar: no rules for subdivision \"{}\" of {:?}; using national holidays",
                        code, country
                    ),
                }
            }
        }

        Ok(Self { country, rules })
    }

    pub fn country(&self) -> Country {
        self.country
    }

    /// All holidays dated within `years`, ascending by date.
    ///
    /// Holidays sharing a date are merged into one entry whose name joins
    /// theirs with `"; "`. A merged entry naming an observed substitute is
    /// dropped when `exclude_observed` is set. Holidays that coincide with
    /// any of `vacation_dates` are always dropped.
    pub fn holidays_in_range(
        &self,
        years: RangeInclusive<i32>,
        exclude_observed: bool,
        vacation_dates: &[CalendarDate],
    ) -> Vec<HolidayEntry> {
        let vacation: HashSet<CalendarDate> = vacation_dates.iter().copied().collect();
        let mut entries = Vec::new();

        for year in years.clone() {
            let mut actual: Vec<(NaiveDate, &HolidayRule)> = self
                .rules
                .iter()
                .filter(|r| year >= r.since)
                .filter_map(|r| resolve(r.rule, year).map(|date| (date, r)))
                .collect();
            actual.sort_by_key(|(date, _)| *date);
            let mut taken: HashSet<NaiveDate> = actual.iter().map(|(date, _)| *date).collect();

            for (date, rule) in &actual {
                entries.push(HolidayEntry {
                    date: (*date).into(),
                    name: rule.name.to_string(),
                });
            }

            for (date, rule) in actual.iter().filter(|(_, r)| r.observed) {
                let Some(observed) = self.country.observed_date(*date, &taken) else {
                    continue;
                };
                taken.insert(observed);
                if years.contains(&observed.year()) {
                    entries.push(HolidayEntry {
                        date: observed.into(),
                        name: format!("{} (observed)", rule.name),
                    });
                }
            }
        }

        entries.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.name.cmp(&b.name)));
        let mut merged = merge_same_date(entries);
        merged.retain(|h| !(exclude_observed && h.is_observed()) && !vacation.contains(&h.date));
        merged
    }
}

/// Fold date-sorted entries so each date appears once.
fn merge_same_date(entries: Vec<HolidayEntry>) -> Vec<HolidayEntry> {
    let mut merged: Vec<HolidayEntry> = Vec::with_capacity(entries.len());
    for entry in entries {
        match merged.last_mut() {
            Some(last) if last.date == entry.date => {
                if !last.names().any(|n| n == entry.name) {
                    last.name = format!("{}; {}", last.name, entry.name);
                }
            }
            _ => merged.push(entry),
        }
    }
    merged
}

/// Holidays for `country`/`subdivision` over `years`; see
/// [`HolidayCalendar::holidays_in_range`].
pub fn holidays_in_range(
    country: &str,
    subdivision: Option<&str>,
    years: RangeInclusive<i32>,
    exclude_observed: bool,
    vacation_dates: &[CalendarDate],
) -> Result<Vec<HolidayEntry>> {
    Ok(HolidayCalendar::new(country, subdivision)?.holidays_in_range(
        years,
        exclude_observed,
        vacation_dates,
    ))
}

// ── Rule resolution ───────────────────────────────────────────────────────────

fn resolve(rule: Rule, year: i32) -> Option<NaiveDate> {
    match rule {
        Rule::Fixed { month, day } => NaiveDate::from_ymd_opt(year, month, day),
        Rule::Nth { month, weekday, n } => {
            NaiveDate::from_weekday_of_month_opt(year, month, weekday, n as u8)
        }
        Rule::Last { month, weekday } => {
            let last = last_day_of_month(year, month)?;
            Some(last - Duration::days(days_back_to(last, weekday)))
        }
        Rule::OnOrBefore { month, day, weekday } => {
            let anchor = NaiveDate::from_ymd_opt(year, month, day)?;
            Some(anchor - Duration::days(days_back_to(anchor, weekday)))
        }
        Rule::Easter(offset) => easter_sunday(year).map(|d| d + Duration::days(offset)),
    }
}

fn days_back_to(date: NaiveDate, weekday: Weekday) -> i64 {
    let from = date.weekday().num_days_from_monday() as i64;
    let to = weekday.num_days_from_monday() as i64;
    (from - to).rem_euclid(7)
}

fn last_day_of_month(year: i32, month: u32) -> Option<NaiveDate> {
    let (next_year, next_month) = if month == 12 { (year + 1, 1) } else { (year, month + 1) };
    NaiveDate::from_ymd_opt(next_year, next_month, 1).map(|d| d - Duration::days(1))
}

/// Gregorian Easter Sunday (anonymous Meeus/Jones/Butcher algorithm).
fn easter_sunday(year: i32) -> Option<NaiveDate> {
    let a = year % 19;
    let b = year / 100;
    let c = year % 100;
    let d = b / 4;
    let e = b % 4;
    let f = (b + 8) / 25;
    let g = (b - f + 1) / 3;
    let h = (19 * a + b - d - g + 15) % 30;
    let i = c / 4;
    let k = c % 4;
    let l = (32 + 2 * e + 2 * i - h - k) % 7;
    let m = (a + 11 * h + 22 * l) / 451;
    let month = (h + l - 7 * m + 114) / 31;
    let day = (h + l - 7 * m + 114) % 31 + 1;
    NaiveDate::from_ymd_opt(year, month as u32, day as u32)
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> CalendarDate {
        CalendarDate::parse(s).unwrap()
    }

    fn find<'a>(list: &'a [HolidayEntry], name: &str) -> Vec<&'a HolidayEntry> {
        list.iter().filter(|h| h.names().any(|n| n == name)).collect()
    }

    // ── CalendarDate / day_count ─────────────────────────────────────────────

    #[test]
    fn test_day_count_is_inclusive() {
        assert_eq!(day_count("2024-01-01", "2024-01-31").unwrap(), 31);
        assert_eq!(day_count("2024-02-10", "2024-02-10").unwrap(), 1);
        // Leap day is counted.
        assert_eq!(day_count("2024-02-01", "2024-03-01").unwrap(), 30);
    }

    #[test]
    fn test_day_count_rejects_bad_format() {
        assert!(matches!(
            day_count("2024/01/01", "2024-01-31"),
            Err(CycleError::DateFormat(_))
        ));
        assert!(day_count("2024-1-1", "2024-01-31").is_err());
        assert!(day_count("2024-01-01", "2024-02-30").is_err());
    }

    #[test]
    fn test_calendar_date_display_and_serde() {
        let date = d("2023-07-04");
        assert_eq!(date.to_string(), "2023-07-04");
        let json = serde_json::to_string(&date).unwrap();
        assert_eq!(json, r#""2023-07-04""#);
        let back: CalendarDate = serde_json::from_str(&json).unwrap();
        assert_eq!(back, date);
    }

    #[test]
    fn test_calendar_date_within() {
        let date = d("2024-03-15");
        assert!(date.within(d("2024-03-15"), d("2024-03-20")));
        assert!(date.within(d("2024-03-01"), d("2024-03-15")));
        assert!(!date.within(d("2024-03-16"), d("2024-03-20")));
    }

    // ── US rules ─────────────────────────────────────────────────────────────

    #[test]
    fn test_us_federal_2024_dates() {
        let list = holidays_in_range("US", None, 2024..=2024, true, &[]).unwrap();
        assert_eq!(find(&list, "Martin Luther King Jr. Day")[0].date, d("2024-01-15"));
        assert_eq!(find(&list, "Washington's Birthday")[0].date, d("2024-02-19"));
        assert_eq!(find(&list, "Memorial Day")[0].date, d("2024-05-27"));
        assert_eq!(find(&list, "Labor Day")[0].date, d("2024-09-02"));
        assert_eq!(find(&list, "Columbus Day")[0].date, d("2024-10-14"));
        assert_eq!(find(&list, "Thanksgiving")[0].date, d("2024-11-28"));
        assert_eq!(list.len(), 11);
    }

    #[test]
    fn test_juneteenth_starts_2021() {
        let list = holidays_in_range("US", None, 2020..=2021, true, &[]).unwrap();
        let juneteenth = find(&list, "Juneteenth National Independence Day");
        assert_eq!(juneteenth.len(), 1);
        assert_eq!(juneteenth[0].date, d("2021-06-19"));
    }

    #[test]
    fn test_weekend_holiday_gets_observed_entry() {
        // July 4th 2021 was a Sunday.
        let list = holidays_in_range("US", None, 2021..=2021, false, &[]).unwrap();
        let observed = find(&list, "Independence Day (observed)");
        assert_eq!(observed.len(), 1);
        assert_eq!(observed[0].date, d("2021-07-05"));

        // Christmas 2021 was a Saturday.
        let observed = find(&list, "Christmas Day (observed)");
        assert_eq!(observed[0].date, d("2021-12-24"));
    }

    #[test]
    fn test_exclude_observed_drops_substitutes() {
        let list = holidays_in_range("US", None, 2016..=2025, true, &[]).unwrap();
        assert!(list.iter().all(|h| !h.name.contains("observed")));
    }

    #[test]
    fn test_vacation_dates_are_excluded() {
        let vacation = [d("2024-07-04"), d("2024-12-25")];
        let list = holidays_in_range("US", None, 2024..=2024, true, &vacation).unwrap();
        assert!(list.iter().all(|h| !vacation.contains(&h.date)));
        assert_eq!(list.len(), 9);
    }

    #[test]
    fn test_results_are_ascending() {
        let list = holidays_in_range("US", Some("TX"), 2016..=2025, false, &[]).unwrap();
        assert!(list.windows(2).all(|w| w[0].date <= w[1].date));
    }

    #[test]
    fn test_state_rules_are_added() {
        let list = holidays_in_range("us", Some("ma"), 2024..=2024, true, &[]).unwrap();
        assert_eq!(find(&list, "Patriots' Day")[0].date, d("2024-04-15"));

        let list = holidays_in_range("US", Some("HI"), 2024..=2024, true, &[]).unwrap();
        assert_eq!(find(&list, "Good Friday")[0].date, d("2024-03-29"));
    }

    #[test]
    fn test_unknown_subdivision_falls_back_to_national() {
        let national = holidays_in_range("US", None, 2023..=2023, true, &[]).unwrap();
        let unknown = holidays_in_range("US", Some("ZZ"), 2023..=2023, true, &[]).unwrap();
        assert_eq!(national, unknown);
    }

    #[test]
    fn test_unsupported_country() {
        let err = holidays_in_range("FR", None, 2024..=2024, true, &[]).unwrap_err();
        assert!(matches!(err, CycleError::UnsupportedCountry(ref c) if c == "FR"));
    }

    // ── Canada ───────────────────────────────────────────────────────────────

    #[test]
    fn test_canada_floating_holidays() {
        let list = holidays_in_range("CA", Some("ON"), 2024..=2024, true, &[]).unwrap();
        assert_eq!(find(&list, "Victoria Day")[0].date, d("2024-05-20"));
        assert_eq!(find(&list, "Good Friday")[0].date, d("2024-03-29"));
        assert_eq!(find(&list, "Family Day")[0].date, d("2024-02-19"));
        assert_eq!(find(&list, "Thanksgiving Day")[0].date, d("2024-10-14"));
    }

    #[test]
    fn test_canada_observed_moves_to_monday() {
        // Canada Day 2023 was a Saturday.
        let list = holidays_in_range("CA", None, 2023..=2023, false, &[]).unwrap();
        assert_eq!(find(&list, "Canada Day (observed)")[0].date, d("2023-07-03"));
    }

    #[test]
    fn test_canada_colliding_substitutes_move_to_tuesday() {
        // 2021: Christmas on Saturday, Boxing Day on Sunday.
        let list = holidays_in_range("CA", Some("ON"), 2021..=2021, false, &[]).unwrap();
        assert_eq!(find(&list, "Christmas Day (observed)")[0].date, d("2021-12-27"));
        assert_eq!(find(&list, "Boxing Day (observed)")[0].date, d("2021-12-28"));
        assert!(list.windows(2).all(|w| w[0].date < w[1].date));
    }

    // ── Same-date merging ────────────────────────────────────────────────────

    #[test]
    fn test_same_date_holidays_are_merged() {
        let list = holidays_in_range("US", Some("TX"), 2022..=2022, true, &[]).unwrap();
        let june19: Vec<_> = list.iter().filter(|h| h.date == d("2022-06-19")).collect();
        assert_eq!(june19.len(), 1);
        assert_eq!(
            june19[0].name,
            "Emancipation Day In Texas; Juneteenth National Independence Day"
        );
        assert!(list.windows(2).all(|w| w[0].date < w[1].date));
    }

    #[test]
    fn test_merge_keeps_one_entry_per_date() {
        let entry = |date: &str, name: &str| HolidayEntry {
            date: d(date),
            name: name.to_string(),
        };
        let merged = merge_same_date(vec![
            entry("2024-01-01", "A"),
            entry("2024-01-01", "B"),
            entry("2024-01-01", "A"),
            entry("2024-01-02", "C (observed)"),
        ]);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].name, "A; B");
        assert_eq!(merged[0].names().collect::<Vec<_>>(), vec!["A", "B"]);
        assert!(merged[1].is_observed());
    }

    // ── Easter ───────────────────────────────────────────────────────────────

    #[test]
    fn test_easter_sunday_known_years() {
        assert_eq!(easter_sunday(2019), NaiveDate::from_ymd_opt(2019, 4, 21));
        assert_eq!(easter_sunday(2024), NaiveDate::from_ymd_opt(2024, 3, 31));
        assert_eq!(easter_sunday(2025), NaiveDate::from_ymd_opt(2025, 4, 20));
    }
}
