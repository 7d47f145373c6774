//! Description of an archive contents query, and its translation to SQL.

use crate::PathFilter;
use crate::error::Result;
use sqlx::{QueryBuilder, Sqlite};

/// What to resolve from the archive.
///
/// The default query returns the latest version of every path with no
/// upper time bound.
///
/// # Examples
///
/// ```
/// use rewind_index::{ContentsQuery, PathFilter};
/// # fn example() -> rewind_index::error::Result<()> {
/// // Full history of text files, as the archive stood at the cutoff.
/// let query = ContentsQuery::from_globs(["*.txt", "*.md"])?
///     .with_cutoff(1_506_297_600)
///     .with_show_all(true);
/// assert_eq!(query.filters().len(), 2);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContentsQuery {
    filters: Vec<PathFilter>,
    cutoff: Option<i64>,
    show_all: bool,
}
impl ContentsQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a query from case-sensitive globs.
    ///
    /// Fails on the first glob that can't be compiled.
    pub fn from_globs(globs: impl IntoIterator<Item = impl AsRef<str>>) -> Result<Self> {
        let filters = globs.into_iter().map(PathFilter::new).collect::<Result<Vec<_>>>()?;
        Ok(Self { filters, ..Self::default() })
    }

    /// Add a filter. A path is included when it matches *any* filter.
    pub fn with_filter(mut self, filter: PathFilter) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn with_filters(mut self, filters: impl IntoIterator<Item = PathFilter>) -> Self {
        self.filters.extend(filters);
        self
    }

    /// Ignore everything captured after `cutoff` (inclusive bound, seconds
    /// since the Unix epoch).
    pub fn with_cutoff(self, cutoff: i64) -> Self {
        self.with_optional_cutoff(Some(cutoff))
    }

    pub fn with_optional_cutoff(mut self, cutoff: Option<i64>) -> Self {
        self.cutoff = cutoff;
        self
    }

    /// Return every version of each path instead of only the latest.
    pub fn with_show_all(mut self, show_all: bool) -> Self {
        self.show_all = show_all;
        self
    }

    pub fn filters(&self) -> &[PathFilter] {
        &self.filters
    }

    pub fn cutoff(&self) -> Option<i64> {
        self.cutoff
    }

    pub fn show_all(&self) -> bool {
        self.show_all
    }

    /// Build the parameterized SELECT for this query.
    ///
    /// Rows come back grouped by path and in timestamp order within each
    /// path, which is what [`collapse`](crate::collapse::collapse) expects.
    /// The trailing sort keys only exist to make ties deterministic.
    pub(crate) fn to_sql(&self) -> QueryBuilder<'static, Sqlite> {
        let mut builder = QueryBuilder::new(include_str!("../queries/archive_contents.sql"));
        let mut keyword = "WHERE ";
        if let Some(cutoff) = self.cutoff {
            builder.push(keyword).push("c.timestamp <= ").push_bind(cutoff);
            keyword = " AND ";
        }
        if !self.filters.is_empty() {
            builder.push(keyword).push("(");
            for (i, filter) in self.filters.iter().enumerate() {
                if i > 0 {
                    builder.push(" OR ");
                }
                match filter {
                    PathFilter::Glob(pattern) => builder.push("c.path GLOB ").push_bind(pattern.clone()),
                    PathFilter::Like(pattern) => {
                        builder.push("c.path LIKE ").push_bind(pattern.clone()).push(" ESCAPE '\\'")
                    },
                };
            }
            builder.push(")");
        }
        builder.push(" ORDER BY c.path ASC, c.timestamp ASC, c.run_name ASC, c.checksum ASC");
        builder
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn where_clause(query: &ContentsQuery) -> String {
        let builder = query.to_sql();
        let sql = builder.sql();
        let start = sql.find("ON l.checksum = c.checksum").unwrap() + "ON l.checksum = c.checksum".len();
        let end = sql.find(" ORDER BY").unwrap();
        sql[start..end].trim().to_string()
    }

    #[test]
    fn test_unfiltered_query_has_no_where_clause() {
        assert_eq!(where_clause(&ContentsQuery::new()), "");
    }

    #[test]
    fn test_cutoff_only() {
        assert_eq!(where_clause(&ContentsQuery::new().with_cutoff(100)), "WHERE c.timestamp <= ?");
    }

    #[test]
    fn test_filters_are_ored_and_bound() {
        let query = ContentsQuery::from_globs(["*a.txt", "*b.txt"]).unwrap().with_cutoff(100);
        assert_eq!(where_clause(&query), "WHERE c.timestamp <= ? AND (c.path GLOB ? OR c.path GLOB ?)");
    }

    #[test]
    fn test_case_insensitive_filter_uses_like() {
        let query = ContentsQuery::new()
            .with_filter(PathFilter::case_insensitive("*.TXT").unwrap())
            .with_filter(PathFilter::exact("/etc/hosts"));
        assert_eq!(where_clause(&query), "WHERE (c.path LIKE ? ESCAPE '\\' OR c.path GLOB ?)");
    }

    #[test]
    fn test_values_are_never_interpolated() {
        let query = ContentsQuery::from_globs(["'; DROP TABLE content; --"]).unwrap();
        assert!(!query.to_sql().sql().contains("DROP TABLE"));
    }

    #[test]
    fn test_ordering_is_fully_specified() {
        let builder = ContentsQuery::new().to_sql();
        assert!(builder.sql().ends_with("ORDER BY c.path ASC, c.timestamp ASC, c.run_name ASC, c.checksum ASC"));
    }

    #[test]
    fn test_from_globs_rejects_bad_glob() {
        assert!(ContentsQuery::from_globs(["*.txt", "[oops"]).is_err());
    }

    #[test]
    fn test_builder_accessors() {
        let query = ContentsQuery::new().with_optional_cutoff(None).with_show_all(true);
        assert_eq!(query.cutoff(), None);
        assert!(query.show_all());
        assert!(query.filters().is_empty());
    }
}
