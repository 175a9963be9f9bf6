//! Column metadata.
//!
//! Columns are declared by the host model and are read-only for the
//! duration of a request. They carry everything the engine needs to turn a
//! search value into a predicate (semantic type, search UI, the SQL
//! expression to filter on) and to order results (SQL or method sort key).

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use super::predicate::SqlParam;
use super::record::{Record, Value};

/// Semantic column types.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ColumnType {
    /// Integer numbers.
    Integer,
    /// Fixed-point numbers.
    Decimal,
    /// Floating-point numbers.
    Float,
    /// Money amounts.
    Money,
    /// Short text.
    String,
    /// Long text.
    Text,
    /// Email addresses.
    Email,
    /// Booleans.
    Boolean,
    /// Date and time.
    Datetime,
    /// Calendar date.
    Date,
    /// Time of day.
    Time,
    /// Timestamp.
    Timestamp,
    /// Exact match, no blank handling.
    Exact,
    /// Association picked from a record selector.
    RecordSelect,
    /// Multiple values picked from a list.
    MultiSelect,
    /// Any other host-defined type.
    Other(String),
}

impl ColumnType {
    /// The type tag used for handler lookup.
    pub fn tag(&self) -> &str {
        match self {
            ColumnType::Integer => "integer",
            ColumnType::Decimal => "decimal",
            ColumnType::Float => "float",
            ColumnType::Money => "money",
            ColumnType::String => "string",
            ColumnType::Text => "text",
            ColumnType::Email => "email",
            ColumnType::Boolean => "boolean",
            ColumnType::Datetime => "datetime",
            ColumnType::Date => "date",
            ColumnType::Time => "time",
            ColumnType::Timestamp => "timestamp",
            ColumnType::Exact => "exact",
            ColumnType::RecordSelect => "record_select",
            ColumnType::MultiSelect => "multi_select",
            ColumnType::Other(tag) => tag,
        }
    }

    /// Returns true for textual types.
    pub fn is_text(&self) -> bool {
        matches!(self, ColumnType::String | ColumnType::Text | ColumnType::Email)
    }

    /// Returns true for numeric types.
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            ColumnType::Integer | ColumnType::Decimal | ColumnType::Float | ColumnType::Money
        )
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for ColumnType {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.to_lowercase().as_str() {
            "integer" => ColumnType::Integer,
            "decimal" => ColumnType::Decimal,
            "float" => ColumnType::Float,
            "money" | "usa_money" => ColumnType::Money,
            "string" => ColumnType::String,
            "text" => ColumnType::Text,
            "email" => ColumnType::Email,
            "boolean" => ColumnType::Boolean,
            "datetime" => ColumnType::Datetime,
            "date" => ColumnType::Date,
            "time" => ColumnType::Time,
            "timestamp" => ColumnType::Timestamp,
            "exact" => ColumnType::Exact,
            "record_select" => ColumnType::RecordSelect,
            "multi_select" => ColumnType::MultiSelect,
            other => ColumnType::Other(other.to_string()),
        })
    }
}

/// The search control a column is searched with.
///
/// The search UI decides which compilation rules apply, independently of
/// the column's storage type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SearchUi {
    /// Single select of an id.
    Select,
    /// Checkbox list / multiple select of ids.
    MultiSelect,
    /// Record picker (single id or list of ids).
    RecordSelect,
    /// True/false select.
    Boolean,
    /// Checkbox, searched like a boolean.
    Checkbox,
    /// Comparator plus calendar date inputs.
    CalendarDateSelect,
    /// Use the rules of another column type.
    Type(ColumnType),
    /// Host-defined control, resolved through registered handlers.
    Custom(String),
}

impl SearchUi {
    /// The tag used for handler lookup.
    pub fn tag(&self) -> &str {
        match self {
            SearchUi::Select => "select",
            SearchUi::MultiSelect => "multi_select",
            SearchUi::RecordSelect => "record_select",
            SearchUi::Boolean => "boolean",
            SearchUi::Checkbox => "checkbox",
            SearchUi::CalendarDateSelect => "calendar_date_select",
            SearchUi::Type(t) => t.tag(),
            SearchUi::Custom(tag) => tag,
        }
    }
}

impl FromStr for SearchUi {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.to_lowercase().as_str() {
            "select" => SearchUi::Select,
            "multi_select" => SearchUi::MultiSelect,
            "record_select" => SearchUi::RecordSelect,
            "boolean" => SearchUi::Boolean,
            "checkbox" => SearchUi::Checkbox,
            "calendar_date_select" => SearchUi::CalendarDateSelect,
            other => match other.parse::<ColumnType>() {
                Ok(ColumnType::Other(tag)) => SearchUi::Custom(tag),
                Ok(t) => SearchUi::Type(t),
                Err(never) => match never {},
            },
        })
    }
}

/// Kind of association a column represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssociationMacro {
    /// The row holds a foreign key to one target.
    BelongsTo,
    /// One target row holds a key back to this row.
    HasOne,
    /// Many target rows hold a key back to this row.
    HasMany,
    /// Many-to-many through a join table.
    HasAndBelongsToMany,
}

/// Association shape of a column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Association {
    /// The association kind.
    pub macro_kind: AssociationMacro,
    /// Target entity type / table.
    pub target: String,
    /// Foreign key column.
    pub foreign_key: String,
    /// Name of the reverse relation on the target, if any.
    pub reverse: Option<String>,
    /// JOIN clause required to filter through this association.
    pub join: Option<String>,
}

impl Association {
    /// Creates an association descriptor.
    pub fn new(
        macro_kind: AssociationMacro,
        target: impl Into<String>,
        foreign_key: impl Into<String>,
    ) -> Self {
        Self {
            macro_kind,
            target: target.into(),
            foreign_key: foreign_key.into(),
            reverse: None,
            join: None,
        }
    }

    /// Sets the reverse relation name.
    pub fn with_reverse(mut self, reverse: impl Into<String>) -> Self {
        self.reverse = Some(reverse.into());
        self
    }

    /// Sets the JOIN clause used when filtering through this association.
    pub fn with_join(mut self, join: impl Into<String>) -> Self {
        self.join = Some(join.into());
        self
    }

    /// Returns true for has_many and has_and_belongs_to_many.
    pub fn is_plural(&self) -> bool {
        matches!(
            self.macro_kind,
            AssociationMacro::HasMany | AssociationMacro::HasAndBelongsToMany
        )
    }

    /// Returns true for belongs_to.
    pub fn is_belongs_to(&self) -> bool {
        self.macro_kind == AssociationMacro::BelongsTo
    }
}

/// Computes an in-memory sort key for a record.
#[derive(Clone)]
pub struct SortKeyFn(Arc<dyn Fn(&Record) -> Value + Send + Sync>);

impl SortKeyFn {
    /// Wraps a key-extraction function.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&Record) -> Value + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    /// Computes the key for a record.
    pub fn key(&self, record: &Record) -> Value {
        (self.0)(record)
    }
}

impl fmt::Debug for SortKeyFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SortKeyFn(..)")
    }
}

/// How a column is ordered.
#[derive(Debug, Clone, Default)]
pub enum ColumnSort {
    /// Not sortable.
    #[default]
    None,
    /// Sorted by a SQL expression in ORDER BY.
    Sql(String),
    /// Sorted in memory by a computed key.
    Method(SortKeyFn),
}

impl ColumnSort {
    /// Returns true for method-based sorting.
    pub fn is_method(&self) -> bool {
        matches!(self, ColumnSort::Method(_))
    }

    /// The SQL sort expression, if declared and not blank.
    pub fn sql(&self) -> Option<&str> {
        match self {
            ColumnSort::Sql(sql) if !sql.trim().is_empty() => Some(sql),
            _ => None,
        }
    }
}

/// A column declared by the host model.
#[derive(Debug, Clone)]
pub struct Column {
    /// Column name.
    pub name: String,
    /// Native semantic type; `None` for virtual (computed) columns.
    pub column_type: Option<ColumnType>,
    /// Search UI override.
    pub search_ui: Option<SearchUi>,
    /// True for non-persisted, computed columns.
    pub virtual_column: bool,
    /// Association shape, if this column is an association.
    pub association: Option<Association>,
    /// SQL expression used when filtering on this column.
    pub search_sql: Option<String>,
    /// Sort declaration.
    pub sort: ColumnSort,
}

impl Column {
    /// Creates a persisted column that searches and sorts on its own name.
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        let name = name.into();
        Self {
            search_sql: Some(name.clone()),
            sort: ColumnSort::Sql(name.clone()),
            name,
            column_type: Some(column_type),
            search_ui: None,
            virtual_column: false,
            association: None,
        }
    }

    /// Creates a virtual column. It is neither searchable nor sortable
    /// until a search expression or sort is declared.
    pub fn virtual_column(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            column_type: None,
            search_ui: None,
            virtual_column: true,
            association: None,
            search_sql: None,
            sort: ColumnSort::None,
        }
    }

    /// Creates an association column.
    ///
    /// Belongs-to associations search and sort on their foreign key. Other
    /// kinds have no search expression until one is declared.
    pub fn association(name: impl Into<String>, association: Association) -> Self {
        let name = name.into();
        let (search_sql, sort) = if association.is_belongs_to() {
            (
                Some(association.foreign_key.clone()),
                ColumnSort::Sql(association.foreign_key.clone()),
            )
        } else {
            (None, ColumnSort::None)
        };
        Self {
            name,
            column_type: None,
            search_ui: Some(SearchUi::Select),
            virtual_column: false,
            association: Some(association),
            search_sql,
            sort,
        }
    }

    /// Sets the search UI.
    pub fn with_search_ui(mut self, ui: SearchUi) -> Self {
        self.search_ui = Some(ui);
        self
    }

    /// Sets the SQL expression searched on.
    pub fn with_search_sql(mut self, sql: impl Into<String>) -> Self {
        self.search_sql = Some(sql.into());
        self
    }

    /// Clears the search expression, making the column unsearchable.
    pub fn without_search(mut self) -> Self {
        self.search_sql = None;
        self
    }

    /// Sorts by a SQL expression.
    pub fn with_sort_sql(mut self, sql: impl Into<String>) -> Self {
        self.sort = ColumnSort::Sql(sql.into());
        self
    }

    /// Sorts in memory by a computed key.
    pub fn with_sort_method<F>(mut self, f: F) -> Self
    where
        F: Fn(&Record) -> Value + Send + Sync + 'static,
    {
        self.sort = ColumnSort::Method(SortKeyFn::new(f));
        self
    }

    /// Sets the column type.
    pub fn with_type(mut self, column_type: ColumnType) -> Self {
        self.column_type = Some(column_type);
        self
    }

    /// The search expression, if the column is searchable.
    pub fn search_sql(&self) -> Option<&str> {
        self.search_sql
            .as_deref()
            .filter(|sql| !sql.trim().is_empty())
    }

    /// The tag that selects compilation rules: the search UI if set,
    /// otherwise the native type.
    pub fn search_tag(&self) -> Option<&str> {
        self.search_ui
            .as_ref()
            .map(SearchUi::tag)
            .or_else(|| self.column_type.as_ref().map(ColumnType::tag))
    }

    /// Textual columns are matched with LIKE. Columns with no native type
    /// (virtual or association-only) count as textual.
    pub fn is_text(&self) -> bool {
        self.column_type.as_ref().is_none_or(ColumnType::is_text)
    }

    /// Casts raw input to a parameter of this column's type.
    ///
    /// Numeric input that does not parse is bound as text, so it compares
    /// unequal to every number instead of collapsing to zero.
    pub fn coerce(&self, raw: &str) -> SqlParam {
        let trimmed = raw.trim();
        match &self.column_type {
            Some(ColumnType::Integer) => trimmed
                .parse::<i64>()
                .map(SqlParam::Integer)
                .or_else(|_| trimmed.parse::<f64>().map(|f| SqlParam::Integer(f as i64)))
                .unwrap_or_else(|_| SqlParam::text(raw)),
            Some(ColumnType::Decimal | ColumnType::Float | ColumnType::Money) => trimmed
                .parse::<f64>()
                .map(SqlParam::Float)
                .unwrap_or_else(|_| SqlParam::text(raw)),
            Some(ColumnType::Boolean) => match parse_bool(trimmed) {
                Some(b) => SqlParam::Bool(b),
                None => SqlParam::text(raw),
            },
            _ => SqlParam::text(raw),
        }
    }
}

/// Parses the boolean spellings a search form submits.
pub fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_lowercase().as_str() {
        "1" | "t" | "true" | "y" | "yes" | "on" => Some(true),
        "0" | "f" | "false" | "n" | "no" | "off" => Some(false),
        _ => None,
    }
}
