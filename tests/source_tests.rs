mod common;

use anyhow::anyhow;
use brrtbind::source::Request;
use brrtbind::{Binder, ParamSource, Params, Record, UnmarshalError};
use serde_json::json;

#[derive(Debug, Default, Record)]
pub struct Search {
    #[request(",required")]
    pub q: String,
    #[request("limit,default=20")]
    pub limit: u32,
    pub exact: Option<bool>,
    pub tags: Vec<String>,
}

#[test]
fn test_http_query_and_json_body() {
    common::tracing_util::init();
    let http_request = http::Request::builder()
        .method("POST")
        .uri("/search?q=widgets&limit=5")
        .header("content-type", "application/json; charset=utf-8")
        .body(br#"{"exact": true, "tags": ["a", "b"], "limit": 50}"#.to_vec())
        .unwrap();

    let mut search = Search::default();
    Binder::new()
        .unmarshal(&Request::from_http(&http_request), &mut search)
        .unwrap();

    assert_eq!(search.q, "widgets");
    assert_eq!(search.limit, 50);
    assert_eq!(search.exact, Some(true));
    assert_eq!(search.tags, vec!["a", "b"]);
}

#[test]
fn test_http_query_only() {
    let http_request = http::Request::builder()
        .uri("/search?q=bolts&exact=false")
        .body(Vec::new())
        .unwrap();

    let mut search = Search::default();
    let err = Binder::new()
        .unmarshal(&Request::from_http(&http_request), &mut search)
        .unwrap_err();

    // form values are strings and bool fields only convert from booleans
    let errors = err.input_errors().expect("field errors");
    assert_eq!(errors.names().collect::<Vec<_>>(), vec!["exact"]);
    assert_eq!(search.q, "bolts");
    assert_eq!(search.limit, 20);
}

#[test]
fn test_source_failure_leaves_target_untouched() {
    let request = Request::new()
        .with_query("q=x")
        .with_body("application/json", "not json");
    let mut search = Search {
        q: "before".to_string(),
        ..Search::default()
    };
    let err = Binder::new().unmarshal(&request, &mut search).unwrap_err();

    assert!(matches!(err, UnmarshalError::Params(_)));
    assert!(err.is_structural());
    assert_eq!(search.q, "before");
}

struct Failing;

impl ParamSource for Failing {
    fn params(&self) -> anyhow::Result<Params> {
        Err(anyhow!("connection reset"))
    }
}

#[test]
fn test_custom_source() {
    let mut search = Search::default();
    let err = Binder::new().unmarshal(&Failing, &mut search).unwrap_err();
    assert_eq!(err.to_string(), "failed to read request parameters: connection reset");

    let map = json!({"q": "nuts", "tags": []}).as_object().cloned().unwrap();
    Binder::new().unmarshal(&map, &mut search).unwrap();
    assert_eq!(search.q, "nuts");
}
