//! Shared list-endpoint plumbing: sort direction, `YYYY-MM-DD` day bounds
//! and page-number pagination with the `{count, next, previous, results}`
//! envelope.

use axum::http::{header, HeaderMap, Uri};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::{Map, Value};
use time::{
    macros::{format_description, time},
    Date, OffsetDateTime,
};

use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    pub fn parse(raw: Option<&str>) -> Result<Self, AppError> {
        match raw {
            None | Some("asc") => Ok(SortOrder::Asc),
            Some("desc") => Ok(SortOrder::Desc),
            Some(_) => Err(AppError::BadRequest(
                "Invalid value for 'sort_order'. Use 'asc' or 'desc'.".into(),
            )),
        }
    }

    pub fn keyword(self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

/// Builds list parameters from raw query pairs. A repeated key keeps its
/// last value.
pub fn last_values<T: DeserializeOwned>(pairs: Vec<(String, String)>) -> Result<T, AppError> {
    let map: Map<String, Value> = pairs
        .into_iter()
        .map(|(key, value)| (key, Value::String(value)))
        .collect();
    serde_json::from_value(Value::Object(map)).map_err(|e| AppError::BadRequest(e.to_string()))
}

/// Query values that are present but empty count as absent.
pub fn non_empty(raw: &Option<String>) -> Option<&str> {
    raw.as_deref().filter(|v| !v.is_empty())
}

fn parse_day(raw: &str) -> Option<Date> {
    Date::parse(raw, format_description!("[year]-[month]-[day]")).ok()
}

/// Inclusive lower bound: midnight UTC of the given day.
pub fn day_start(raw: &str) -> Option<OffsetDateTime> {
    parse_day(raw).map(|d| d.midnight().assume_utc())
}

/// Exclusive upper bound covering the whole given day.
pub fn day_end(raw: &str) -> Option<OffsetDateTime> {
    let day = parse_day(raw)?;
    let end = match day.next_day() {
        Some(next) => next.midnight(),
        None => day.with_time(time!(23:59:59.999_999_999)),
    };
    Some(end.assume_utc())
}

/// A page number resolved against the configured page size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub number: i64,
    pub size: i64,
}

impl PageRequest {
    pub fn parse(raw: Option<&str>, size: i64) -> Result<Self, AppError> {
        let number = match raw.filter(|v| !v.is_empty()) {
            None => 1,
            Some(v) => v
                .parse::<i64>()
                .ok()
                .filter(|n| *n >= 1)
                .ok_or_else(invalid_page)?,
        };
        Ok(Self { number, size })
    }

    pub fn limit(&self) -> i64 {
        self.size
    }

    pub fn offset(&self) -> i64 {
        (self.number - 1).saturating_mul(self.size)
    }
}

fn invalid_page() -> AppError {
    AppError::NotFound("Invalid page.".into())
}

/// Where the current list was requested from, used to build page links.
#[derive(Debug, Clone)]
pub struct PageUrl {
    base: String,
    params: Vec<String>,
}

impl PageUrl {
    pub fn from_request(headers: &HeaderMap, uri: &Uri) -> Self {
        let origin = headers
            .get(header::HOST)
            .and_then(|h| h.to_str().ok())
            .map(|host| format!("http://{host}"))
            .unwrap_or_default();
        let params = uri
            .query()
            .unwrap_or_default()
            .split('&')
            .filter(|pair| !pair.is_empty())
            .filter(|pair| pair.split('=').next() != Some("page"))
            .map(str::to_string)
            .collect();
        Self {
            base: format!("{origin}{}", uri.path()),
            params,
        }
    }

    /// Link to `page`; page 1 carries no `page` parameter.
    pub fn link(&self, page: i64) -> String {
        let mut params = self.params.clone();
        if page > 1 {
            params.push(format!("page={page}"));
        }
        if params.is_empty() {
            self.base.clone()
        } else {
            format!("{}?{}", self.base, params.join("&"))
        }
    }
}

#[derive(Debug, Serialize)]
pub struct Paginated<T> {
    pub count: i64,
    pub next: Option<String>,
    pub previous: Option<String>,
    pub results: Vec<T>,
}

impl<T> Paginated<T> {
    /// Wraps one page of rows; a page past the end is `404 Invalid page.`
    pub fn build(
        results: Vec<T>,
        count: i64,
        page: &PageRequest,
        url: &PageUrl,
    ) -> Result<Self, AppError> {
        let last = ((count + page.size - 1) / page.size).max(1);
        if page.number > last {
            return Err(invalid_page());
        }
        Ok(Self {
            count,
            next: (page.number < last).then(|| url.link(page.number + 1)),
            previous: (page.number > 1).then(|| url.link(page.number - 1)),
            results,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn sort_order_defaults_to_ascending() {
        assert_eq!(SortOrder::parse(None).unwrap(), SortOrder::Asc);
        assert_eq!(SortOrder::parse(Some("desc")).unwrap(), SortOrder::Desc);
        let err = SortOrder::parse(Some("DESC")).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid value for 'sort_order'. Use 'asc' or 'desc'."
        );
    }

    #[test]
    fn day_bounds_cover_the_whole_day() {
        let start = day_start("2025-02-15").unwrap();
        let end = day_end("2025-02-15").unwrap();
        assert_eq!(start.date().to_string(), "2025-02-15");
        assert_eq!(end.date().to_string(), "2025-02-16");
        assert_eq!((end - start).whole_hours(), 24);
        assert!(day_start("not-a-date").is_none());
        assert!(day_end("2025-13-01").is_none());
        assert!(day_start("2025-02-30").is_none());
    }

    #[test]
    fn page_request_rejects_non_positive_numbers() {
        assert_eq!(PageRequest::parse(None, 10).unwrap().offset(), 0);
        assert_eq!(PageRequest::parse(Some(""), 10).unwrap().number, 1);
        assert_eq!(PageRequest::parse(Some("3"), 10).unwrap().offset(), 20);
        for bad in ["0", "-1", "two"] {
            let err = PageRequest::parse(Some(bad), 10).unwrap_err();
            assert_eq!(err.to_string(), "Invalid page.");
        }
    }

    #[test]
    fn links_keep_other_parameters() {
        let mut headers = HeaderMap::new();
        headers.insert(header::HOST, HeaderValue::from_static("localhost:8000"));
        let uri: Uri = "/systems/?name=green&page=2&sort_order=desc".parse().unwrap();
        let url = PageUrl::from_request(&headers, &uri);
        assert_eq!(
            url.link(3),
            "http://localhost:8000/systems/?name=green&sort_order=desc&page=3"
        );
        assert_eq!(
            url.link(1),
            "http://localhost:8000/systems/?name=green&sort_order=desc"
        );
    }

    #[test]
    fn envelope_reports_neighbours() {
        let uri: Uri = "/systems/".parse().unwrap();
        let url = PageUrl::from_request(&HeaderMap::new(), &uri);

        let page = PageRequest::parse(Some("2"), 10).unwrap();
        let env = Paginated::build(vec![1, 2, 3], 25, &page, &url).unwrap();
        assert_eq!(env.next.as_deref(), Some("/systems/?page=3"));
        assert_eq!(env.previous.as_deref(), Some("/systems/"));

        let first = PageRequest::parse(None, 10).unwrap();
        let empty = Paginated::<i32>::build(vec![], 0, &first, &url).unwrap();
        assert_eq!(empty.count, 0);
        assert!(empty.next.is_none() && empty.previous.is_none());

        let beyond = PageRequest::parse(Some("4"), 10).unwrap();
        assert!(Paginated::<i32>::build(vec![], 25, &beyond, &url).is_err());
    }

    #[derive(Debug, Default, serde::Deserialize)]
    struct Params {
        name: Option<String>,
        page: Option<String>,
    }

    #[test]
    fn repeated_query_keys_keep_the_last_value() {
        let pairs = vec![
            ("name".to_string(), "x".to_string()),
            ("other".to_string(), "1".to_string()),
            ("name".to_string(), "green".to_string()),
        ];
        let params: Params = last_values(pairs).unwrap();
        assert_eq!(params.name.as_deref(), Some("green"));
        assert!(params.page.is_none());
    }
}
