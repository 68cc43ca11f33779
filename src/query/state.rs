//! Loading/error/data state of one remote query.

use crate::domain::RemoteError;

/// Observable state of a remote query.
///
/// `data` may be present together with `loading` while a refetch for the
/// same key is running; it is cleared when the key changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryState<T> {
    pub data: Option<T>,
    pub loading: bool,
    pub error: Option<RemoteError>,
}

impl<T> Default for QueryState<T> {
    fn default() -> Self {
        Self::idle()
    }
}

impl<T> QueryState<T> {
    /// A query that has not been started.
    #[must_use]
    pub const fn idle() -> Self {
        Self {
            data: None,
            loading: false,
            error: None,
        }
    }

    /// A query waiting for its first result.
    #[must_use]
    pub const fn loading() -> Self {
        Self {
            data: None,
            loading: true,
            error: None,
        }
    }

    #[must_use]
    pub const fn success(data: T) -> Self {
        Self {
            data: Some(data),
            loading: false,
            error: None,
        }
    }

    #[must_use]
    pub const fn failure(error: RemoteError) -> Self {
        Self {
            data: None,
            loading: false,
            error: Some(error),
        }
    }

    #[must_use]
    pub fn from_result(result: Result<T, RemoteError>) -> Self {
        match result {
            Ok(data) => Self::success(data),
            Err(error) => Self::failure(error),
        }
    }

    /// Resolved data, ignoring loading and error flags.
    #[must_use]
    pub const fn data(&self) -> Option<&T> {
        self.data.as_ref()
    }
}
