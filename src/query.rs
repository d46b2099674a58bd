//! Query-string construction for the dashboard API.
//!
//! Entries keep their insertion order. An entry whose value is absent or the
//! empty string is left out entirely, so the server falls back to its own
//! defaults instead of receiving `key=`.

use chrono::NaiveDate;

/// A single query value. `None` marks an entry to be skipped.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct QueryValue(Option<String>);

impl QueryValue {
    pub fn as_str(&self) -> Option<&str> {
        self.0.as_deref()
    }
}

impl From<&str> for QueryValue {
    fn from(value: &str) -> Self {
        Self::from(value.to_string())
    }
}

impl From<&String> for QueryValue {
    fn from(value: &String) -> Self {
        Self::from(value.as_str())
    }
}

impl From<String> for QueryValue {
    fn from(value: String) -> Self {
        if value.is_empty() {
            Self(None)
        } else {
            Self(Some(value))
        }
    }
}

impl From<NaiveDate> for QueryValue {
    fn from(value: NaiveDate) -> Self {
        Self(Some(value.format("%Y-%m-%d").to_string()))
    }
}

macro_rules! number_query_value {
    ($($ty:ty),*) => {
        $(impl From<$ty> for QueryValue {
            fn from(value: $ty) -> Self {
                Self(Some(value.to_string()))
            }
        })*
    };
}

number_query_value!(u32, u64, usize, i32, i64, f64);

impl<T: Into<QueryValue>> From<Option<T>> for QueryValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or_default()
    }
}

/// Ordered query parameters
#[derive(Debug, Clone, Default)]
pub struct QueryParams {
    entries: Vec<(String, QueryValue)>,
}

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(mut self, key: impl Into<String>, value: impl Into<QueryValue>) -> Self {
        self.entries.push((key.into(), value.into()));
        self
    }

    pub fn build(&self) -> String {
        build_query(self.entries.iter().map(|(k, v)| (k.as_str(), v.clone())))
    }
}

/// Percent-encode the non-empty entries as `k=v` pairs joined with `&`.
pub fn build_query<I, K, V>(entries: I) -> String
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: Into<QueryValue>,
{
    entries
        .into_iter()
        .filter_map(|(key, value)| {
            let value = value.into();
            let value = value.as_str()?;
            Some(format!(
                "{}={}",
                urlencoding::encode(key.as_ref()),
                urlencoding::encode(value)
            ))
        })
        .collect::<Vec<_>>()
        .join("&")
}

/// Join an endpoint path and a query string, skipping the `?` when empty.
pub fn with_query(path: &str, query: &str) -> String {
    if query.is_empty() {
        path.to_string()
    } else {
        format!("{path}?{query}")
    }
}
