//! Parameterized SELECT construction.
//!
//! Values are bound through `?` placeholders and carried as typed SQLite
//! values, so a year binds as an integer and a country name as text.
//! Builder methods return `&mut Self` for chaining.
//!
//! # Example
//!
//! ```rust
//! use portwatch::SqlBuilder;
//! let (sql, params) = SqlBuilder::new("Ports")
//!     .select(&["ISO3", "SUM(import) AS imports"])
//!     .where_eq("year", 2024)
//!     .group_by(&["ISO3"])
//!     .order_by(&["imports DESC"])
//!     .limit(10)
//!     .build();
//! assert_eq!(params.len(), 1);
//! ```

use rusqlite::types::Value;

/// Builds a single-table SELECT with bound parameters.
#[derive(Debug, Clone)]
pub struct SqlBuilder {
    table: String,
    columns: Vec<String>,
    distinct: bool,
    filters: Vec<String>,
    filter_params: Vec<Value>,
    group_by: Vec<String>,
    having: Vec<String>,
    having_params: Vec<Value>,
    order_by: Vec<String>,
    limit: Option<usize>,
    offset: Option<usize>,
}

impl SqlBuilder {
    /// Start a `SELECT *` over `table`.
    ///
    /// The name is used verbatim; quote it with
    /// [`quote_ident`](crate::schema::quote_ident) if it needs quoting.
    pub fn new(table: &str) -> Self {
        Self {
            table: table.to_string(),
            columns: vec!["*".to_string()],
            distinct: false,
            filters: Vec::new(),
            filter_params: Vec::new(),
            group_by: Vec::new(),
            having: Vec::new(),
            having_params: Vec::new(),
            order_by: Vec::new(),
            limit: None,
            offset: None,
        }
    }

    /// Replace the selected columns.
    pub fn select(&mut self, cols: &[&str]) -> &mut Self {
        self.columns = cols.iter().map(|c| c.to_string()).collect();
        self
    }

    pub fn distinct(&mut self) -> &mut Self {
        self.distinct = true;
        self
    }

    /// Add a raw WHERE condition; `params` fill its `?` placeholders in order.
    pub fn where_clause(&mut self, condition: &str, params: Vec<Value>) -> &mut Self {
        self.filters.push(condition.to_string());
        self.filter_params.extend(params);
        self
    }

    pub fn where_eq(&mut self, column: &str, value: impl Into<Value>) -> &mut Self {
        self.compare(column, "=", value.into())
    }

    pub fn where_gte(&mut self, column: &str, value: impl Into<Value>) -> &mut Self {
        self.compare(column, ">=", value.into())
    }

    pub fn where_lte(&mut self, column: &str, value: impl Into<Value>) -> &mut Self {
        self.compare(column, "<=", value.into())
    }

    /// Case-insensitive `LIKE`; `pattern` keeps its own `%` wildcards.
    pub fn where_like(&mut self, column: &str, pattern: &str) -> &mut Self {
        self.filters
            .push(format!("LOWER({}) LIKE LOWER(?)", column));
        self.filter_params.push(Value::Text(pattern.to_string()));
        self
    }

    /// `column IN (...)`. An empty list matches no rows.
    pub fn where_in<V: Into<Value> + Clone>(&mut self, column: &str, values: &[V]) -> &mut Self {
        if values.is_empty() {
            self.filters.push("0".to_string());
            return self;
        }
        let placeholders = vec!["?"; values.len()].join(", ");
        self.filters
            .push(format!("{} IN ({})", column, placeholders));
        self.filter_params
            .extend(values.iter().cloned().map(Into::into));
        self
    }

    pub fn where_not_null(&mut self, column: &str) -> &mut Self {
        self.filters.push(format!("{} IS NOT NULL", column));
        self
    }

    pub fn group_by(&mut self, cols: &[&str]) -> &mut Self {
        self.group_by.extend(cols.iter().map(|c| c.to_string()));
        self
    }

    /// Add a HAVING condition. Its parameters bind after every WHERE
    /// parameter regardless of call order.
    pub fn having(&mut self, condition: &str, params: Vec<Value>) -> &mut Self {
        self.having.push(condition.to_string());
        self.having_params.extend(params);
        self
    }

    /// Add ORDER BY terms such as `"year ASC"`.
    pub fn order_by(&mut self, terms: &[&str]) -> &mut Self {
        self.order_by.extend(terms.iter().map(|t| t.to_string()));
        self
    }

    pub fn limit(&mut self, n: usize) -> &mut Self {
        self.limit = Some(n);
        self
    }

    /// Skip `n` rows. Without a limit this renders as `LIMIT -1 OFFSET n`,
    /// since SQLite only accepts OFFSET after LIMIT.
    pub fn offset(&mut self, n: usize) -> &mut Self {
        self.offset = Some(n);
        self
    }

    /// Render the statement and its parameters in placeholder order.
    pub fn build(&self) -> (String, Vec<Value>) {
        let mut sql = format!(
            "SELECT {}{}\nFROM {}",
            if self.distinct { "DISTINCT " } else { "" },
            self.columns.join(", "),
            self.table
        );

        let mut clause = |keyword: &str, items: &[String], sep: &str| {
            if !items.is_empty() {
                sql.push_str(&format!("\n{} {}", keyword, items.join(sep)));
            }
        };
        clause("WHERE", &self.filters, " AND ");
        clause("GROUP BY", &self.group_by, ", ");
        clause("HAVING", &self.having, " AND ");
        clause("ORDER BY", &self.order_by, ", ");

        match (self.limit, self.offset) {
            (Some(n), Some(off)) => sql.push_str(&format!("\nLIMIT {}\nOFFSET {}", n, off)),
            (Some(n), None) => sql.push_str(&format!("\nLIMIT {}", n)),
            (None, Some(off)) => sql.push_str(&format!("\nLIMIT -1\nOFFSET {}", off)),
            (None, None) => {}
        }

        let params = self
            .filter_params
            .iter()
            .chain(&self.having_params)
            .cloned()
            .collect();
        (sql, params)
    }

    fn compare(&mut self, column: &str, op: &str, value: Value) -> &mut Self {
        self.filters.push(format!("{} {} ?", column, op));
        self.filter_params.push(value);
        self
    }
}
