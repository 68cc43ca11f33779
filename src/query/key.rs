//! Cache keys for remote queries.

use std::fmt;

/// Identifies one remote query. Two requests with equal keys share a result.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum QueryKey {
    /// The full name index, bounded to `limit` entries.
    NameIndex { limit: u32 },
    /// All entities of one category.
    Category(String),
    /// One page of the paginated index (1-based).
    Page(u32),
    /// Details for an id taken from a link.
    Detail(String),
    /// A by-name lookup of user input.
    Search(String),
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NameIndex { limit } => write!(f, "name-index:{limit}"),
            Self::Category(category) => write!(f, "category:{category}"),
            Self::Page(page) => write!(f, "page:{page}"),
            Self::Detail(id) => write!(f, "detail:{id}"),
            Self::Search(name) => write!(f, "search:{name}"),
        }
    }
}
