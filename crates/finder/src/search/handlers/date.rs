//! Date/time range handlers.

use chrono::NaiveDate;

use crate::types::{DateParts, Predicate, RangeBound, SearchValue, SqlParam};

use super::number::numeric_comparator;

const DATE_FORMAT: &str = "%Y-%m-%d";
const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Handles date, time, datetime and timestamp columns.
pub struct DateHandler;

impl DateHandler {
    /// Builds SQL for a date range.
    ///
    /// Each bound parses independently; a bound that does not parse is
    /// treated as absent. When neither bound has an hour the comparison is
    /// by calendar date, otherwise by full timestamp.
    pub fn build_sql(sql: &str, value: &SearchValue) -> Option<Predicate> {
        let SearchValue::Range(range) = value else {
            return None;
        };
        let from_parts = range.from.date_parts();
        let to_parts = range.to.date_parts();

        let with_time = [&from_parts, &to_parts]
            .iter()
            .any(|p| p.as_ref().is_some_and(DateParts::has_hour));

        let format = |parts: Option<DateParts>| -> Option<String> {
            let parts = parts?;
            if with_time {
                parts.to_datetime().map(|t| t.format(DATETIME_FORMAT).to_string())
            } else {
                parts.to_date().map(|d| d.format(DATE_FORMAT).to_string())
            }
        };

        match (format(from_parts), format(to_parts)) {
            (None, None) => None,
            (None, Some(to)) => Some(Predicate::compare(sql, "<=", SqlParam::text(to))),
            (Some(from), None) => Some(Predicate::compare(sql, ">=", SqlParam::text(from))),
            (Some(from), Some(to)) => Some(Predicate::between(
                sql,
                SqlParam::text(from),
                SqlParam::text(to),
            )),
        }
    }
}

/// Handles calendar date picker searches: a numeric comparator applied to
/// `YYYY-MM-DD` dates.
pub struct CalendarDateHandler;

impl CalendarDateHandler {
    /// Builds SQL for a calendar date comparison.
    pub fn build_sql(sql: &str, value: &SearchValue) -> Option<Predicate> {
        let SearchValue::Range(range) = value else {
            return None;
        };
        let opt = numeric_comparator(range.opt.as_deref())?;
        let from = Self::parse(&range.from)?;

        if opt == "BETWEEN" {
            let to = Self::parse(&range.to)?;
            return Some(Predicate::between(sql, Self::param(from), Self::param(to)));
        }
        Some(Predicate::compare(sql, opt, Self::param(from)))
    }

    fn parse(bound: &RangeBound) -> Option<NaiveDate> {
        match bound {
            RangeBound::Text(s) => NaiveDate::parse_from_str(s.trim(), DATE_FORMAT)
                .ok()
                .or_else(|| bound.date_parts()?.to_date()),
            RangeBound::Parts(parts) => parts.to_date(),
            RangeBound::Empty => None,
        }
    }

    fn param(date: NaiveDate) -> SqlParam {
        SqlParam::text(date.format(DATE_FORMAT).to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RangeValue;

    fn parts(y: &str, m: &str, d: &str, h: &str) -> RangeBound {
        RangeBound::Parts(DateParts {
            year: Some(y.into()),
            month: Some(m.into()),
            day: Some(d.into()),
            hour: Some(h.into()),
            minutes: Some(String::new()),
            seconds: None,
        })
    }

    fn range(from: RangeBound, to: RangeBound) -> SearchValue {
        SearchValue::Range(RangeValue {
            opt: None,
            from,
            to,
        })
    }

    #[test]
    fn test_date_only_to() {
        let value = range(RangeBound::Empty, parts("2024", "2", "29", ""));
        let pred = DateHandler::build_sql("born_on", &value).unwrap();
        assert_eq!(pred.sql, "born_on <= ?");
        assert_eq!(pred.params, vec![SqlParam::text("2024-02-29")]);
    }

    #[test]
    fn test_date_only_from() {
        let value = range(parts("2024", "1", "5", ""), parts("", "", "", ""));
        let pred = DateHandler::build_sql("born_on", &value).unwrap();
        assert_eq!(pred.sql, "born_on >= ?");
    }

    #[test]
    fn test_datetime_between_when_hour_present() {
        let value = range(parts("2024", "1", "5", "8"), parts("2024", "1", "6", ""));
        let pred = DateHandler::build_sql("created_at", &value).unwrap();
        assert_eq!(pred.sql, "created_at BETWEEN ? AND ?");
        assert_eq!(
            pred.params,
            vec![
                SqlParam::text("2024-01-05 08:00:00"),
                SqlParam::text("2024-01-06 00:00:00")
            ]
        );
    }

    #[test]
    fn test_date_both_blank() {
        let value = range(parts("", "", "", ""), parts("", "", "", ""));
        assert!(DateHandler::build_sql("born_on", &value).is_none());
    }

    #[test]
    fn test_date_invalid_bound_is_absent() {
        let value = range(parts("2024", "13", "40", ""), parts("2024", "3", "1", ""));
        let pred = DateHandler::build_sql("born_on", &value).unwrap();
        assert_eq!(pred.sql, "born_on <= ?");
    }

    #[test]
    fn test_calendar_date_select() {
        let value = SearchValue::range(">", "2024-03-01", "");
        let pred = CalendarDateHandler::build_sql("due_on", &value).unwrap();
        assert_eq!(pred.sql, "due_on > ?");
        assert_eq!(pred.params, vec![SqlParam::text("2024-03-01")]);

        let value = SearchValue::range("BETWEEN", "2024-03-01", "not a date");
        assert!(CalendarDateHandler::build_sql("due_on", &value).is_none());
    }
}
