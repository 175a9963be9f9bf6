//! Submitted search values.
//!
//! Search forms submit loosely-typed payloads whose shape depends on the
//! search control: a plain string for text boxes, `{opt, from, to}` for
//! comparator/range controls, `{id}` for selects, and lists or index maps of
//! ids for multi-selects and checkbox groups. [`SearchValue::from_json`]
//! normalizes all of these into one tagged type.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// A value submitted for one column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum SearchValue {
    /// Plain text/number input.
    Scalar(String),
    /// Comparator plus bounds.
    Range(RangeValue),
    /// A single selected id.
    IdRef(String),
    /// A set of selected ids.
    IdList(Vec<String>),
}

impl SearchValue {
    /// Creates a scalar value.
    pub fn scalar(s: impl Into<String>) -> Self {
        SearchValue::Scalar(s.into())
    }

    /// Creates a range value with text bounds.
    pub fn range(opt: &str, from: &str, to: &str) -> Self {
        SearchValue::Range(RangeValue {
            opt: Some(opt.to_string()),
            from: RangeBound::text(from),
            to: RangeBound::text(to),
        })
    }

    /// Creates a single id reference.
    pub fn id(id: impl Into<String>) -> Self {
        SearchValue::IdRef(id.into())
    }

    /// Creates an id list.
    pub fn ids<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        SearchValue::IdList(ids.into_iter().map(Into::into).collect())
    }

    /// Returns true when the value carries nothing to search for.
    ///
    /// A range is blank when both bounds are blank; a comparator alone does
    /// not make a search. An id list is blank when its ids joined together
    /// are blank.
    pub fn is_blank(&self) -> bool {
        match self {
            SearchValue::Scalar(s) | SearchValue::IdRef(s) => is_blank(s),
            SearchValue::Range(range) => range.from.is_blank() && range.to.is_blank(),
            SearchValue::IdList(ids) => ids.iter().all(|id| is_blank(id)),
        }
    }

    /// Parses a search form payload.
    ///
    /// Returns `None` for `null` and for shapes that carry no usable value.
    pub fn from_json(json: &JsonValue) -> Option<Self> {
        match json {
            JsonValue::Null => None,
            JsonValue::Array(items) => Some(SearchValue::IdList(
                items.iter().filter_map(id_of).collect(),
            )),
            JsonValue::Object(map) => {
                if ["opt", "from", "to"].iter().any(|k| map.contains_key(*k)) {
                    return Some(SearchValue::Range(RangeValue {
                        opt: map.get("opt").and_then(json_scalar),
                        from: map.get("from").map(RangeBound::from_json).unwrap_or_default(),
                        to: map.get("to").map(RangeBound::from_json).unwrap_or_default(),
                    }));
                }
                if let Some(id) = map.get("id") {
                    return match id {
                        JsonValue::Array(_) => SearchValue::from_json(id),
                        other => json_scalar(other).map(SearchValue::IdRef),
                    };
                }
                // Index map from a checkbox group: {"0": {"id": "4"}, "1": ...}
                let mut entries: Vec<(&String, &JsonValue)> = map.iter().collect();
                entries.sort_by(|(a, _), (b, _)| match (a.parse::<u64>(), b.parse::<u64>()) {
                    (Ok(x), Ok(y)) => x.cmp(&y),
                    _ => a.cmp(b),
                });
                Some(SearchValue::IdList(
                    entries.into_iter().filter_map(|(_, v)| id_of(v)).collect(),
                ))
            }
            other => json_scalar(other).map(SearchValue::Scalar),
        }
    }

    /// The comparator of a range value.
    pub fn opt(&self) -> Option<&str> {
        match self {
            SearchValue::Range(range) => range.opt.as_deref(),
            _ => None,
        }
    }
}

/// `{opt, from, to}` submitted by comparator and range controls.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RangeValue {
    /// Comparator token.
    pub opt: Option<String>,
    /// Lower bound, or the single operand of a comparison.
    #[serde(default)]
    pub from: RangeBound,
    /// Upper bound.
    #[serde(default)]
    pub to: RangeBound,
}

/// One side of a range.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RangeBound {
    /// Not provided.
    #[default]
    Empty,
    /// Text input.
    Text(String),
    /// Date/time select parts.
    Parts(DateParts),
}

impl RangeBound {
    /// Creates a text bound; blank text becomes `Empty`.
    pub fn text(s: &str) -> Self {
        if is_blank(s) {
            RangeBound::Empty
        } else {
            RangeBound::Text(s.to_string())
        }
    }

    fn from_json(json: &JsonValue) -> Self {
        match json {
            JsonValue::Object(map) => {
                let part = |names: &[&str]| {
                    names
                        .iter()
                        .find_map(|n| map.get(*n))
                        .and_then(json_scalar)
                };
                RangeBound::Parts(DateParts {
                    year: part(&["year"]),
                    month: part(&["month"]),
                    day: part(&["day"]),
                    hour: part(&["hour"]),
                    minutes: part(&["minutes", "minute"]),
                    seconds: part(&["seconds", "second"]),
                })
            }
            other => json_scalar(other)
                .map(|s| RangeBound::text(&s))
                .unwrap_or_default(),
        }
    }

    /// Returns true if the bound carries no input.
    pub fn is_blank(&self) -> bool {
        match self {
            RangeBound::Empty => true,
            RangeBound::Text(s) => is_blank(s),
            RangeBound::Parts(parts) => parts.is_blank(),
        }
    }

    /// The bound as text, if it is non-blank text.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            RangeBound::Text(s) if !is_blank(s) => Some(s),
            _ => None,
        }
    }

    /// The bound as date parts. Text bounds are parsed as
    /// `YYYY-MM-DD[ HH:MM[:SS]]`.
    pub fn date_parts(&self) -> Option<DateParts> {
        match self {
            RangeBound::Empty => None,
            RangeBound::Parts(parts) => Some(parts.clone()),
            RangeBound::Text(s) => DateParts::parse(s),
        }
    }
}

/// Date/time components as submitted by date select controls.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateParts {
    /// Four-digit year.
    pub year: Option<String>,
    /// Month, 1-12.
    pub month: Option<String>,
    /// Day of month.
    pub day: Option<String>,
    /// Hour, 0-23.
    pub hour: Option<String>,
    /// Minutes.
    pub minutes: Option<String>,
    /// Seconds.
    pub seconds: Option<String>,
}

impl DateParts {
    /// Parses `YYYY-MM-DD`, optionally followed by `HH:MM` or `HH:MM:SS`.
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        let (date, time) = match s.split_once([' ', 'T']) {
            Some((d, t)) => (d, Some(t)),
            None => (s, None),
        };
        let mut ymd = date.splitn(3, '-');
        let mut parts = DateParts {
            year: ymd.next().map(str::to_string),
            month: ymd.next().map(str::to_string),
            day: ymd.next().map(str::to_string),
            ..Default::default()
        };
        if let Some(time) = time {
            let mut hms = time.splitn(3, ':');
            parts.hour = hms.next().map(str::to_string);
            parts.minutes = hms.next().map(str::to_string);
            parts.seconds = hms.next().map(str::to_string);
        }
        Some(parts)
    }

    /// Returns true if no component was provided.
    pub fn is_blank(&self) -> bool {
        [
            &self.year,
            &self.month,
            &self.day,
            &self.hour,
            &self.minutes,
            &self.seconds,
        ]
        .iter()
        .all(|p| p.as_deref().is_none_or(is_blank))
    }

    /// Returns true if the hour component was provided.
    pub fn has_hour(&self) -> bool {
        self.hour.as_deref().is_some_and(|h| !is_blank(h))
    }

    /// The calendar date. Year, month and day are all required.
    pub fn to_date(&self) -> Option<NaiveDate> {
        let year = parse_part::<i32>(&self.year)?;
        let month = parse_part::<u32>(&self.month)?;
        let day = parse_part::<u32>(&self.day)?;
        NaiveDate::from_ymd_opt(year, month, day)
    }

    /// The full timestamp. Missing time components default to zero.
    pub fn to_datetime(&self) -> Option<NaiveDateTime> {
        let date = self.to_date()?;
        let component = |part: &Option<String>| match part.as_deref() {
            Some(s) if !is_blank(s) => s.trim().parse::<u32>().ok(),
            _ => Some(0),
        };
        let time = NaiveTime::from_hms_opt(
            component(&self.hour)?,
            component(&self.minutes)?,
            component(&self.seconds)?,
        )?;
        Some(date.and_time(time))
    }
}

fn parse_part<T: std::str::FromStr>(part: &Option<String>) -> Option<T> {
    part.as_deref()
        .filter(|s| !is_blank(s))
        .and_then(|s| s.trim().parse().ok())
}

pub(crate) fn is_blank(s: &str) -> bool {
    s.trim().is_empty()
}

fn json_scalar(json: &JsonValue) -> Option<String> {
    match json {
        JsonValue::String(s) => Some(s.clone()),
        JsonValue::Number(n) => Some(n.to_string()),
        JsonValue::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn id_of(json: &JsonValue) -> Option<String> {
    match json {
        JsonValue::Object(map) => map.get("id").and_then(json_scalar),
        other => json_scalar(other),
    }
}
