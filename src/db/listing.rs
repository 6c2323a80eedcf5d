use rocket::FromForm;
use sqlx::{QueryBuilder, Sqlite};

use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    Asc,
    Desc,
    #[default]
    Default,
}

impl SortOrder {
    pub fn parse(value: Option<&str>) -> Self {
        match value.map(|v| v.trim().to_ascii_lowercase()).as_deref() {
            Some("asc") => SortOrder::Asc,
            Some("desc") => SortOrder::Desc,
            _ => SortOrder::Default,
        }
    }
}

/// Query-string parameters shared by every entity listing.
#[derive(Debug, Default, Clone, FromForm)]
pub struct ListParams {
    pub sort: Option<String>,
    pub sort_by: Option<String>,
    pub search: Option<String>,
    pub search_field: Option<String>,
}

/// Column indirection for one entity listing. Only the column names declared here
/// ever reach the SQL text; everything a caller sends is bound.
pub struct Listing {
    pub select: &'static str,
    pub key_column: &'static str,
    pub sortable: &'static [(&'static str, &'static str)],
    pub searchable: &'static [(&'static str, &'static [&'static str])],
    pub text_columns: &'static [&'static str],
    pub numeric_columns: &'static [&'static str],
}

enum Match {
    Prefix,
    Substring,
}

impl Listing {
    pub fn sort_column(&self, sort_by: Option<&str>) -> &'static str {
        sort_by
            .and_then(|name| {
                self.sortable
                    .iter()
                    .find(|(external, _)| *external == name.trim())
            })
            .map(|(_, column)| *column)
            .unwrap_or(self.key_column)
    }

    fn search_columns(&self, search_field: Option<&str>) -> Option<&'static [&'static str]> {
        let field = search_field.map(str::trim).unwrap_or("all");
        self.searchable
            .iter()
            .find(|(external, _)| *external == field)
            .map(|(_, columns)| *columns)
    }

    /// Starts the query with `WHERE 1=1` so callers can append `AND` clauses freely.
    pub fn query(&self) -> QueryBuilder<'static, Sqlite> {
        let mut query = QueryBuilder::new(self.select);
        query.push(" WHERE 1=1");
        query
    }

    pub fn push_search(&self, query: &mut QueryBuilder<'static, Sqlite>, params: &ListParams) {
        let Some(search) = params.search.as_deref().map(str::trim).filter(|s| !s.is_empty())
        else {
            return;
        };

        // LIKE already folds ASCII case; other characters must match as typed.
        let term = escape_like(search);

        query.push(" AND (");
        match self.search_columns(params.search_field.as_deref()) {
            Some(columns) => {
                for (i, column) in columns.iter().enumerate() {
                    if i > 0 {
                        query.push(" OR ");
                    }
                    push_like(query, column, &term, Match::Prefix);
                }
            }
            None => {
                let mut first = true;
                for column in self.text_columns {
                    if !first {
                        query.push(" OR ");
                    }
                    first = false;
                    push_like(query, column, &term, Match::Substring);
                }
                for column in self.numeric_columns {
                    if !first {
                        query.push(" OR ");
                    }
                    first = false;
                    query.push(format!("CAST({} AS TEXT) LIKE ", column));
                    query.push_bind(format!("{}%", term));
                    query.push(" ESCAPE '\\'");
                }
            }
        }
        query.push(")");
    }

    pub fn push_order(&self, query: &mut QueryBuilder<'static, Sqlite>, params: &ListParams) {
        match SortOrder::parse(params.sort.as_deref()) {
            SortOrder::Asc => {
                query.push(format!(
                    " ORDER BY {} ASC",
                    self.sort_column(params.sort_by.as_deref())
                ));
            }
            SortOrder::Desc => {
                query.push(format!(
                    " ORDER BY {} DESC",
                    self.sort_column(params.sort_by.as_deref())
                ));
            }
            SortOrder::Default => {
                query.push(format!(" ORDER BY {} ASC", self.key_column));
            }
        }
    }
}

fn push_like(query: &mut QueryBuilder<'static, Sqlite>, column: &str, term: &str, mode: Match) {
    let pattern = match mode {
        Match::Prefix => format!("{}%", term),
        Match::Substring => format!("%{}%", term),
    };
    query.push(format!("{} LIKE ", column));
    query.push_bind(pattern);
    query.push(" ESCAPE '\\'");
}

pub fn escape_like(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Splits a comma-separated filter value, dropping blanks.
pub fn split_filter(value: Option<&str>) -> Vec<String> {
    value
        .map(|v| {
            v.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

pub fn split_int_filter(value: Option<&str>, name: &str) -> Result<Vec<i64>, AppError> {
    split_filter(value)
        .into_iter()
        .map(|v| {
            v.parse::<i64>()
                .map_err(|_| AppError::Validation(format!("Invalid {} filter value: {}", name, v)))
        })
        .collect()
}

/// Appends `AND column IN (...)` when at least one value was given.
pub fn push_in_filter<T>(query: &mut QueryBuilder<'static, Sqlite>, column: &str, values: Vec<T>)
where
    T: 'static + Send + sqlx::Encode<'static, Sqlite> + sqlx::Type<Sqlite>,
{
    if values.is_empty() {
        return;
    }

    query.push(format!(" AND {} IN (", column));
    let mut separated = query.separated(", ");
    for value in values {
        separated.push_bind(value);
    }
    separated.push_unseparated(")");
}

#[cfg(test)]
mod tests {
    use super::*;

    static PEOPLE: Listing = Listing {
        select: "SELECT * FROM people",
        key_column: "id",
        sortable: &[("id", "id"), ("name", "name")],
        searchable: &[("name", &["name"]), ("age", &["CAST(age AS TEXT)"])],
        text_columns: &["name", "city"],
        numeric_columns: &["age"],
    };

    fn params(sort: &str, sort_by: &str, search: &str, field: &str) -> ListParams {
        ListParams {
            sort: Some(sort.to_string()),
            sort_by: Some(sort_by.to_string()),
            search: Some(search.to_string()),
            search_field: Some(field.to_string()),
        }
    }

    #[test]
    fn test_unknown_sort_column_falls_back_to_key() {
        assert_eq!(PEOPLE.sort_column(Some("name")), "name");
        assert_eq!(PEOPLE.sort_column(Some("name; DROP TABLE people")), "id");
        assert_eq!(PEOPLE.sort_column(None), "id");
    }

    #[test]
    fn test_default_sort_ignores_sort_by() {
        let mut query = PEOPLE.query();
        PEOPLE.push_order(&mut query, &params("default", "name", "", "all"));
        assert!(query.sql().ends_with("ORDER BY id ASC"));

        let mut query = PEOPLE.query();
        PEOPLE.push_order(&mut query, &params("DESC", "name", "", "all"));
        assert!(query.sql().ends_with("ORDER BY name DESC"));
    }

    #[test]
    fn test_search_all_binds_every_column() {
        let mut query = PEOPLE.query();
        PEOPLE.push_search(&mut query, &params("asc", "id", "Ann", "all"));
        let sql = query.sql();

        assert!(sql.contains("name LIKE ?"));
        assert!(sql.contains("city LIKE ?"));
        assert!(!sql.contains("LOWER("));
        assert!(sql.contains("CAST(age AS TEXT) LIKE ?"));
        assert!(!sql.contains("Ann"));
        assert!(!sql.contains("ann"));
    }

    #[test]
    fn test_named_field_and_unknown_field() {
        let mut query = PEOPLE.query();
        PEOPLE.push_search(&mut query, &params("asc", "id", "x", "name"));
        assert!(!query.sql().contains("city"));

        let mut query = PEOPLE.query();
        PEOPLE.push_search(&mut query, &params("asc", "id", "x", "nickname"));
        assert!(query.sql().contains("city"));
    }

    #[test]
    fn test_blank_search_adds_no_predicate() {
        let mut query = PEOPLE.query();
        PEOPLE.push_search(&mut query, &params("asc", "id", "   ", "all"));
        assert_eq!(query.sql(), "SELECT * FROM people WHERE 1=1");
    }

    #[test]
    fn test_escape_like_and_filters() {
        assert_eq!(escape_like("50%_a\\b"), "50\\%\\_a\\\\b");
        assert_eq!(split_filter(Some("ENG, ,CAS")), vec!["ENG", "CAS"]);
        assert_eq!(split_int_filter(Some("1,3"), "year_levels").unwrap(), vec![1, 3]);
        assert!(split_int_filter(Some("1,x"), "year_levels").is_err());

        let mut query = PEOPLE.query();
        push_in_filter(&mut query, "city", vec!["A".to_string(), "B".to_string()]);
        assert!(query.sql().ends_with("AND city IN (?, ?)"));
    }
}
