//! Active-record query builder
//!
//! Every SELECT issued by the repositories is built here. [`ActiveQuery::on`]
//! always starts with the table's `status = Active` predicate; there is no way
//! to build a query without it.

use libsql::params::Params;
use libsql::Value;

use crate::db::schema::{TableDef, STATUS_ACTIVE};
use crate::models::DataRequestParams;

#[derive(Debug)]
pub(crate) struct ActiveQuery {
    table: &'static TableDef,
    conditions: Vec<String>,
    values: Vec<Value>,
    order_by: Option<String>,
    limit: Option<(i64, i64)>,
}

impl ActiveQuery {
    pub fn on(table: &'static TableDef) -> Self {
        Self {
            table,
            conditions: vec![format!("{} = {}", table.status, STATUS_ACTIVE)],
            values: Vec::new(),
            order_by: None,
            limit: None,
        }
    }

    pub fn where_eq(mut self, column: &str, value: i64) -> Self {
        self.conditions.push(format!("{} = ?", column));
        self.values.push(Value::Integer(value));
        self
    }

    /// Substring match against a column holding already folded text
    pub fn where_contains(mut self, column: &str, term: &str) -> Self {
        self.conditions.push(format!("instr({}, ?) > 0", column));
        self.values.push(Value::Text(term.to_string()));
        self
    }

    pub fn where_in(mut self, column: &str, ids: &[i64]) -> Self {
        if ids.is_empty() {
            self.conditions.push("0 = 1".to_string());
            return self;
        }
        let placeholders = vec!["?"; ids.len()].join(", ");
        self.conditions
            .push(format!("{} IN ({})", column, placeholders));
        self.values.extend(ids.iter().map(|id| Value::Integer(*id)));
        self
    }

    pub fn order_by(mut self, clause: &str) -> Self {
        self.order_by = Some(clause.to_string());
        self
    }

    pub fn limit(mut self, limit: i64) -> Self {
        self.limit = Some((limit, 0));
        self
    }

    pub fn page(mut self, params: &DataRequestParams) -> Self {
        self.limit = Some((params.take(), params.skip()));
        self
    }

    fn where_clause(&self) -> String {
        self.conditions.join(" AND ")
    }

    /// SELECT of the table projection with ordering and paging applied
    pub fn select(self) -> (String, Params) {
        let columns = self.table.projection();
        self.select_columns(&columns)
    }

    pub fn select_columns(self, columns: &str) -> (String, Params) {
        let mut sql = format!(
            "SELECT {} FROM {} WHERE {}",
            columns,
            self.table.name,
            self.where_clause()
        );
        if let Some(order) = &self.order_by {
            sql.push_str(" ORDER BY ");
            sql.push_str(order);
        }
        if let Some((limit, offset)) = self.limit {
            sql.push_str(&format!(" LIMIT {} OFFSET {}", limit.max(0), offset.max(0)));
        }
        (sql, Params::Positional(self.values))
    }

    /// COUNT(*) over the same predicates; ordering and paging are ignored
    pub fn count(self) -> (String, Params) {
        let sql = format!(
            "SELECT COUNT(*) FROM {} WHERE {}",
            self.table.name,
            self.where_clause()
        );
        (sql, Params::Positional(self.values))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::schema::{NODE_TABLE, VECTOR_TABLE};

    #[test]
    fn test_status_predicate_is_always_present() {
        let (sql, _) = ActiveQuery::on(&NODE_TABLE).count();
        assert_eq!(sql, "SELECT COUNT(*) FROM NODE WHERE NODE_STATUS = 1");
    }

    #[test]
    fn test_paged_search() {
        let params = DataRequestParams::new(3, 10, None);
        let (sql, values) = ActiveQuery::on(&NODE_TABLE)
            .where_contains("NODE_MATCH_NAME", "fr")
            .order_by("NODE_NAME ASC, NODE_ID ASC")
            .page(&params)
            .select_columns("NODE_ID, NODE_NAME");

        assert_eq!(
            sql,
            "SELECT NODE_ID, NODE_NAME FROM NODE WHERE NODE_STATUS = 1 AND instr(NODE_MATCH_NAME, ?) > 0 ORDER BY NODE_NAME ASC, NODE_ID ASC LIMIT 10 OFFSET 20"
        );
        match values {
            Params::Positional(values) => {
                assert!(matches!(values.as_slice(), [Value::Text(term)] if term == "fr"));
            }
            _ => panic!("expected positional params"),
        }
    }

    #[test]
    fn test_page_below_one_has_no_offset() {
        let params = DataRequestParams::new(0, 10, None);
        let (sql, _) = ActiveQuery::on(&NODE_TABLE)
            .page(&params)
            .select_columns("NODE_ID");
        assert!(sql.ends_with("LIMIT 10 OFFSET 0"));

        let params = DataRequestParams::new(i64::MIN, 10, None);
        let (sql, _) = ActiveQuery::on(&NODE_TABLE)
            .page(&params)
            .select_columns("NODE_ID");
        assert!(sql.ends_with("LIMIT 10 OFFSET 0"));
    }

    #[test]
    fn test_where_in_expands_placeholders() {
        let (sql, _) = ActiveQuery::on(&VECTOR_TABLE)
            .where_in("VECTOR_ID", &[3, 1, 2])
            .select_columns("VECTOR_ID");
        assert!(sql.ends_with("VECTOR_STATUS = 1 AND VECTOR_ID IN (?, ?, ?)"));
    }

    #[test]
    fn test_where_in_empty_matches_nothing() {
        let (sql, _) = ActiveQuery::on(&VECTOR_TABLE)
            .where_in("VECTOR_ID", &[])
            .count();
        assert!(sql.ends_with("AND 0 = 1"));
    }
}
