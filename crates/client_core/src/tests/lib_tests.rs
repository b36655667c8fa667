use super::*;
use serde_json::{json, Value};
use std::{collections::HashMap, sync::Arc};
use tokio::sync::{Mutex, Notify};

fn wrap(callback: &str, body: &Value) -> String {
    format!("{callback}({body});")
}

enum Reply {
    Wrapped(Value),
    Bare(Value),
    ForeignCallback(Value),
    Unreachable,
}

/// Answers from a fixed table keyed by the requested year.
struct ScriptedTransport {
    replies: HashMap<Option<String>, Reply>,
    seen: Arc<Mutex<Vec<RemoteRequest>>>,
}

impl ScriptedTransport {
    fn new(replies: Vec<(Option<&str>, Reply)>) -> Self {
        Self {
            replies: replies
                .into_iter()
                .map(|(year, reply)| (year.map(str::to_string), reply))
                .collect(),
            seen: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, request: &RemoteRequest) -> Result<String, TransportFailure> {
        self.seen.lock().await.push(request.clone());
        let key = request.year.as_ref().map(|year| year.as_str().to_string());
        match self.replies.get(&key) {
            Some(Reply::Wrapped(body)) => Ok(wrap(&request.callback, body)),
            Some(Reply::Bare(body)) => Ok(body.to_string()),
            Some(Reply::ForeignCallback(body)) => Ok(wrap("insights_someone_else", body)),
            Some(Reply::Unreachable) | None => {
                Err(TransportFailure("connection refused".to_string()))
            }
        }
    }
}

/// Holds every reply until it is that year's turn in `answer_order`.
struct OutOfOrderTransport {
    answer_order: Vec<FiscalYear>,
    next: Mutex<usize>,
    turn: Notify,
    answered: Mutex<Vec<FiscalYear>>,
}

impl OutOfOrderTransport {
    fn new(answer_order: &[&str]) -> Self {
        Self {
            answer_order: answer_order.iter().map(|year| FiscalYear::from(*year)).collect(),
            next: Mutex::new(0),
            turn: Notify::new(),
            answered: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl Transport for OutOfOrderTransport {
    async fn send(&self, request: &RemoteRequest) -> Result<String, TransportFailure> {
        let year = request
            .year
            .clone()
            .ok_or_else(|| TransportFailure("year required".to_string()))?;
        loop {
            let notified = self.turn.notified();
            {
                let mut next = self.next.lock().await;
                if self.answer_order.get(*next) == Some(&year) {
                    *next += 1;
                    self.answered.lock().await.push(year.clone());
                    self.turn.notify_waiters();
                    break;
                }
            }
            notified.await;
        }

        Ok(wrap(
            &request.callback,
            &json!({
                "success": true,
                "fiscalYear": year.as_str(),
                "data": [{ "Client": format!("Client {year}"), "Sales": "1,000", "Status": "completed" }]
            }),
        ))
    }
}

#[tokio::test]
async fn lists_years_in_server_order() {
    let client = RemoteDataClient::new(ScriptedTransport::new(vec![(
        None,
        Reply::Wrapped(json!({ "availableYears": ["2081/82", "2080/81"] })),
    )]));

    let years = client.list_available_years().await.expect("years");
    assert_eq!(
        years,
        vec![FiscalYear::from("2081/82"), FiscalYear::from("2080/81")]
    );

    let seen = client.transport().seen.lock().await;
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].year, None);
    assert!(seen[0].callback.starts_with("insights_"));
}

#[tokio::test]
async fn missing_year_list_is_empty() {
    let client = RemoteDataClient::new(ScriptedTransport::new(vec![(None, Reply::Bare(json!({})))]));
    assert!(client.list_available_years().await.expect("years").is_empty());
}

#[tokio::test]
async fn year_listing_error_is_a_server_error() {
    let client = RemoteDataClient::new(ScriptedTransport::new(vec![(
        None,
        Reply::Wrapped(json!({ "error": "sheet not shared" })),
    )]));
    let err = client.list_available_years().await.expect_err("server error");
    assert_eq!(err, RemoteError::server("sheet not shared"));
}

#[tokio::test]
async fn year_listing_transport_failure_is_network() {
    let client = RemoteDataClient::new(ScriptedTransport::new(vec![(None, Reply::Unreachable)]));
    let err = client.list_available_years().await.expect_err("network");
    assert!(err.is_network());
    assert_eq!(err.to_string(), "Network error: Failed to load available years");
}

#[tokio::test]
async fn fetches_and_normalizes_rows() {
    let client = RemoteDataClient::new(ScriptedTransport::new(vec![(
        Some("2081/82"),
        Reply::Wrapped(json!({
            "success": true,
            "fiscalYear": "2081/82",
            "availableYears": ["2081/82", "2080/81"],
            "data": [
                { "Client": "  ABC Traders  ", "VAT_Returns": "Rs. 1,250.50", "Sales": 5000, "Purchases": "2,000", "Status": "Completed" },
                { "VAT_Returns": null, "Sales": "n/a", "Status": "" }
            ]
        })),
    )]));

    let data = client
        .fetch_year_data(&FiscalYear::from("2081/82"))
        .await
        .expect("year data");
    assert_eq!(data.fiscal_year, FiscalYear::from("2081/82"));
    assert_eq!(data.available_years.len(), 2);
    assert_eq!(data.clients.len(), 2);

    let abc = &data.clients[0];
    assert_eq!(abc.id.as_str(), "abc-traders");
    assert_eq!(abc.vat_returns, 1250.50);
    assert_eq!(abc.purchases, 2000.0);
    assert_eq!(abc.status, "completed");

    let unnamed = &data.clients[1];
    assert_eq!(unnamed.id.as_str(), "unknown");
    assert_eq!(unnamed.name, "Unknown Client");
    assert_eq!(unnamed.sales, 0.0);
    assert_eq!(unnamed.status, "unknown");

    let seen = client.transport().seen.lock().await;
    assert_eq!(seen[0].year, Some(FiscalYear::from("2081/82")));
}

#[tokio::test]
async fn server_echo_wins_over_requested_year() {
    let client = RemoteDataClient::new(ScriptedTransport::new(vec![(
        Some("2079/80"),
        Reply::Bare(json!({ "success": true, "fiscalYear": "2080/81", "data": [] })),
    )]));
    let data = client
        .fetch_year_data(&FiscalYear::from("2079/80"))
        .await
        .expect("year data");
    assert_eq!(data.fiscal_year, FiscalYear::from("2080/81"));
    assert!(data.clients.is_empty());
}

#[tokio::test]
async fn missing_echo_falls_back_to_requested_year() {
    let client = RemoteDataClient::new(ScriptedTransport::new(vec![(
        Some("2080/81"),
        Reply::Bare(json!({ "success": true })),
    )]));
    let data = client
        .fetch_year_data(&FiscalYear::from("2080/81"))
        .await
        .expect("year data");
    assert_eq!(data.fiscal_year, FiscalYear::from("2080/81"));
    assert!(data.clients.is_empty());
}

#[tokio::test]
async fn failure_reply_surfaces_reason() {
    let client = RemoteDataClient::new(ScriptedTransport::new(vec![
        (
            Some("1999/00"),
            Reply::Wrapped(json!({ "success": false, "error": "bad year" })),
        ),
        (Some("2000/01"), Reply::Wrapped(json!({ "success": false }))),
    ]));

    let err = client
        .fetch_year_data(&FiscalYear::from("1999/00"))
        .await
        .expect_err("bad year");
    assert_eq!(err.to_string(), "bad year");
    assert!(!err.is_network());

    let err = client
        .fetch_year_data(&FiscalYear::from("2000/01"))
        .await
        .expect_err("no success flag");
    assert_eq!(err.to_string(), "Invalid data received");
}

#[tokio::test]
async fn transport_failure_is_distinct_network_error() {
    let client = RemoteDataClient::new(ScriptedTransport::new(vec![]));
    let err = client
        .fetch_year_data(&FiscalYear::from("2081/82"))
        .await
        .expect_err("network");
    assert!(err.is_network());
    assert_eq!(err.to_string(), "Network error: Failed to load data");
}

#[tokio::test]
async fn reply_for_another_call_is_rejected() {
    let client = RemoteDataClient::new(ScriptedTransport::new(vec![(
        Some("2081/82"),
        Reply::ForeignCallback(json!({ "success": true, "fiscalYear": "2081/82", "data": [] })),
    )]));
    let err = client
        .fetch_year_data(&FiscalYear::from("2081/82"))
        .await
        .expect_err("mismatch");
    assert!(matches!(err, RemoteError::Mismatch { .. }));
}

#[tokio::test]
async fn every_call_uses_a_fresh_callback() {
    let client = RemoteDataClient::new(ScriptedTransport::new(vec![(
        None,
        Reply::Wrapped(json!({ "availableYears": [] })),
    )]));
    client.list_available_years().await.expect("first");
    client.list_available_years().await.expect("second");

    let seen = client.transport().seen.lock().await;
    assert_eq!(seen.len(), 2);
    assert_ne!(seen[0].callback, seen[1].callback);
}

#[tokio::test]
async fn overlapping_fetches_receive_their_own_year() {
    let client = RemoteDataClient::new(OutOfOrderTransport::new(&["2080/81", "2081/82"]));
    let newer = FiscalYear::from("2081/82");
    let older = FiscalYear::from("2080/81");

    let (newer_data, older_data) = tokio::join!(
        client.fetch_year_data(&newer),
        client.fetch_year_data(&older)
    );
    let newer_data = newer_data.expect("newer");
    let older_data = older_data.expect("older");

    assert_eq!(
        *client.transport().answered.lock().await,
        vec![older.clone(), newer.clone()]
    );
    assert_eq!(newer_data.fiscal_year, newer);
    assert_eq!(newer_data.clients[0].name, "Client 2081/82");
    assert_eq!(older_data.fiscal_year, older);
    assert_eq!(older_data.clients[0].name, "Client 2080/81");
}
