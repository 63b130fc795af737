//! The WebDriver client against a mock W3C server.
//!
//! `reqwest::blocking` cannot run on an async worker, so each session is
//! driven from `spawn_blocking` while the mock server runs on the runtime.

use std::time::Duration;

use quota_watch::browser::{ElementHandle, PageClient, SessionOptions, WebDriverSession};
use quota_watch::process::Shutdown;
use quota_watch::WatchError;
use serde_json::{json, Value};
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn value(body: Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({ "value": body }))
}

fn webdriver_error(status: u16, error: &str) -> ResponseTemplate {
    ResponseTemplate::new(status).set_body_json(json!({
        "value": { "error": error, "message": "from mock", "stacktrace": "" }
    }))
}

fn element(reference: &str) -> Value {
    json!({ "element-6066-11e4-a52e-4f735466cecf": reference })
}

async fn start_server() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/session"))
        .respond_with(value(json!({ "sessionId": "s1", "capabilities": {} })))
        .expect(1)
        .mount(&server)
        .await;
    server
}

async fn mount(server: &MockServer, verb: &str, route: &str, response: ResponseTemplate) {
    Mock::given(method(verb))
        .and(path(route))
        .respond_with(response)
        .mount(server)
        .await;
}

/// Open a session on `server` and run `f` against it on a blocking thread.
async fn with_session<T, F>(server: &MockServer, shutdown: Shutdown, f: F) -> T
where
    F: FnOnce(&mut WebDriverSession) -> T + Send + 'static,
    T: Send + 'static,
{
    let url = server.uri();
    tokio::task::spawn_blocking(move || {
        let options = SessionOptions {
            wait_poll_interval: Duration::from_millis(10),
            ..SessionOptions::default()
        };
        let mut session = WebDriverSession::start(&url, options, shutdown).unwrap();
        f(&mut session)
    })
    .await
    .unwrap()
}

#[tokio::test(flavor = "multi_thread")]
async fn test_find_by_id_uses_exact_id_selector() {
    let server = start_server().await;
    Mock::given(method("POST"))
        .and(path("/session/s1/element"))
        .and(body_json(json!({ "using": "css selector", "value": "[id=\"CS 101\"]" })))
        .respond_with(value(element("row-1")))
        .expect(1)
        .mount(&server)
        .await;

    let found = with_session(&server, Shutdown::new(), |s| s.find_by_id("CS 101")).await;

    assert_eq!(found.unwrap(), Some(ElementHandle::new("row-1")));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_find_by_id_no_such_element_is_none() {
    let server = start_server().await;
    mount(&server, "POST", "/session/s1/element", webdriver_error(404, "no such element")).await;

    let found = with_session(&server, Shutdown::new(), |s| s.find_by_id("courses")).await;

    assert_eq!(found.unwrap(), None);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_find_by_id_other_errors_propagate() {
    let server = start_server().await;
    mount(&server, "POST", "/session/s1/element", webdriver_error(404, "invalid session id"))
        .await;

    let err = with_session(&server, Shutdown::new(), |s| s.find_by_id("courses"))
        .await
        .unwrap_err();

    assert!(err.is_webdriver_code("invalid session id"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_wait_until_clickable_retries_until_displayed() {
    let server = start_server().await;
    mount(&server, "POST", "/session/s1/element", value(element("row-1"))).await;
    Mock::given(method("GET"))
        .and(path("/session/s1/element/row-1/displayed"))
        .respond_with(value(json!(false)))
        .up_to_n_times(2)
        .mount(&server)
        .await;
    mount(&server, "GET", "/session/s1/element/row-1/displayed", value(json!(true))).await;
    mount(&server, "GET", "/session/s1/element/row-1/enabled", value(json!(true))).await;

    let row = with_session(&server, Shutdown::new(), |s| {
        s.wait_until_clickable("CS101", None)
    })
    .await;

    assert_eq!(row.unwrap(), ElementHandle::new("row-1"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_wait_until_clickable_skips_stale_element() {
    let server = start_server().await;
    mount(&server, "POST", "/session/s1/element", value(element("row-1"))).await;
    Mock::given(method("GET"))
        .and(path("/session/s1/element/row-1/displayed"))
        .respond_with(webdriver_error(404, "stale element reference"))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    mount(&server, "GET", "/session/s1/element/row-1/displayed", value(json!(true))).await;
    mount(&server, "GET", "/session/s1/element/row-1/enabled", value(json!(true))).await;

    let row = with_session(&server, Shutdown::new(), |s| {
        s.wait_until_clickable("CS101", None)
    })
    .await;

    assert_eq!(row.unwrap(), ElementHandle::new("row-1"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_wait_until_clickable_times_out() {
    let server = start_server().await;
    mount(&server, "POST", "/session/s1/element", value(element("row-1"))).await;
    mount(&server, "GET", "/session/s1/element/row-1/displayed", value(json!(false))).await;

    let err = with_session(&server, Shutdown::new(), |s| {
        s.wait_until_clickable("CS101", Some(Duration::from_millis(50)))
    })
    .await
    .unwrap_err();

    assert!(matches!(err, WatchError::WaitTimeout { ref id } if id == "CS101"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_wait_until_clickable_stops_on_shutdown() {
    let server = start_server().await;
    mount(&server, "POST", "/session/s1/element", webdriver_error(404, "no such element")).await;

    let shutdown = Shutdown::new();
    shutdown.request();
    let err = with_session(&server, shutdown, |s| s.wait_until_clickable("CS101", None))
        .await
        .unwrap_err();

    assert!(matches!(err, WatchError::Interrupted));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_cell_texts_reads_each_cell() {
    let server = start_server().await;
    Mock::given(method("POST"))
        .and(path("/session/s1/element/row-1/elements"))
        .and(body_json(json!({ "using": "tag name", "value": "td" })))
        .respond_with(value(json!([element("td-1"), element("td-2"), element("td-3")])))
        .mount(&server)
        .await;
    mount(&server, "GET", "/session/s1/element/td-1/text", value(json!("CS101-001"))).await;
    mount(&server, "GET", "/session/s1/element/td-2/text", value(json!("12"))).await;
    mount(&server, "GET", "/session/s1/element/td-3/text", value(json!("Mon 08:30"))).await;

    let cells = with_session(&server, Shutdown::new(), |s| {
        s.cell_texts(&ElementHandle::new("row-1"))
    })
    .await;

    assert_eq!(cells.unwrap(), vec!["CS101-001", "12", "Mon 08:30"]);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_page_commands_hit_session_endpoints() {
    let server = start_server().await;
    for (verb, route) in [
        ("POST", "/session/s1/url"),
        ("POST", "/session/s1/element/row-1/click"),
        ("POST", "/session/s1/refresh"),
        ("DELETE", "/session/s1"),
    ] {
        Mock::given(method(verb))
            .and(path(route))
            .respond_with(value(Value::Null))
            .expect(1)
            .mount(&server)
            .await;
    }

    with_session(&server, Shutdown::new(), |s| {
        s.navigate("https://example.edu/offerings.php?COURSE_CODE=CS")?;
        s.click(&ElementHandle::new("row-1"))?;
        s.refresh()?;
        s.close()
    })
    .await
    .unwrap();

    server.verify().await;
}

#[tokio::test(flavor = "multi_thread")]
async fn test_start_reports_session_not_created() {
    let server = MockServer::start().await;
    mount(&server, "POST", "/session", webdriver_error(500, "session not created")).await;

    let url = server.uri();
    let err = tokio::task::spawn_blocking(move || {
        WebDriverSession::start(&url, SessionOptions::default(), Shutdown::new()).err()
    })
    .await
    .unwrap()
    .unwrap();

    assert!(err.is_webdriver_code("session not created"));
}
