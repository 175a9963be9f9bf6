//! Select, multi-select and record-select handlers.

use crate::types::{Predicate, SearchValue, SqlParam, is_blank};

/// Handles id-based selection controls.
pub struct SelectHandler;

impl SelectHandler {
    /// Single select: `sql = ?` against the selected id unless it is blank.
    pub fn build_select(sql: &str, value: &SearchValue) -> Option<Predicate> {
        match value {
            SearchValue::IdRef(id) | SearchValue::Scalar(id) if !is_blank(id) => {
                Some(Predicate::eq(sql, SqlParam::text(id.as_str())))
            }
            SearchValue::IdList(ids) => Self::build_in(sql, ids),
            _ => None,
        }
    }

    /// Multi select: `sql IN (...)` over the selected ids.
    pub fn build_multi_select(sql: &str, value: &SearchValue) -> Option<Predicate> {
        match value {
            SearchValue::IdList(ids) => Self::build_in(sql, ids),
            SearchValue::IdRef(id) | SearchValue::Scalar(id) => {
                Self::build_in(sql, std::slice::from_ref(id))
            }
            SearchValue::Range(_) => None,
        }
    }

    /// Record select: `IN (...)` for a list, equality for a single id.
    pub fn build_record_select(sql: &str, value: &SearchValue) -> Option<Predicate> {
        match value {
            SearchValue::IdList(ids) => Self::build_in(sql, ids),
            SearchValue::IdRef(id) | SearchValue::Scalar(id) if !is_blank(id) => {
                Some(Predicate::eq(sql, SqlParam::text(id.as_str())))
            }
            _ => None,
        }
    }

    fn build_in(sql: &str, ids: &[String]) -> Option<Predicate> {
        let params = ids
            .iter()
            .filter(|id| !is_blank(id))
            .map(|id| SqlParam::text(id.as_str()))
            .collect();
        Predicate::in_list(sql, params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_uses_id() {
        let pred = SelectHandler::build_select("owner_id", &SearchValue::id("7")).unwrap();
        assert_eq!(pred.sql, "owner_id = ?");
        assert_eq!(pred.params, vec![SqlParam::text("7")]);

        assert!(SelectHandler::build_select("owner_id", &SearchValue::id(" ")).is_none());
    }

    #[test]
    fn test_multi_select_in_list() {
        let value = SearchValue::ids(["1", "", "3"]);
        let pred = SelectHandler::build_multi_select("tag_id", &value).unwrap();
        assert_eq!(pred.sql, "tag_id IN (?, ?)");
        assert_eq!(pred.params, vec![SqlParam::text("1"), SqlParam::text("3")]);

        assert!(SelectHandler::build_multi_select("tag_id", &SearchValue::ids(Vec::<String>::new())).is_none());
    }

    #[test]
    fn test_record_select_scalar_or_list() {
        let pred = SelectHandler::build_record_select("owner_id", &SearchValue::id("4")).unwrap();
        assert_eq!(pred.sql, "owner_id = ?");

        let pred =
            SelectHandler::build_record_select("owner_id", &SearchValue::ids(["4", "5"])).unwrap();
        assert_eq!(pred.sql, "owner_id IN (?, ?)");
    }
}
