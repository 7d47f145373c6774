use rewind_index::error::Result as IndexResult;
use rewind_index::{ContentsQuery, PathFilter};
use serde::{Deserialize, Serialize};

/// Defaults applied when turning user input into archive queries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryConfig {
    /// Whether path globs distinguish upper and lower case (ASCII only when
    /// they don't).
    pub case_sensitive: bool,
}
impl Default for QueryConfig {
    fn default() -> Self {
        Self { case_sensitive: true }
    }
}
impl QueryConfig {
    pub fn filter(&self, glob: impl AsRef<str>) -> IndexResult<PathFilter> {
        PathFilter::with_case(glob, self.case_sensitive)
    }

    /// Build a query over the given globs with the configured case handling.
    pub fn query(&self, globs: impl IntoIterator<Item = impl AsRef<str>>) -> IndexResult<ContentsQuery> {
        let filters = globs.into_iter().map(|glob| self.filter(glob)).collect::<IndexResult<Vec<_>>>()?;
        Ok(ContentsQuery::new().with_filters(filters))
    }
}
