use std::sync::{Arc, Mutex};

use axum::{
	Json, Router,
	extract::{Path, State},
	http::{HeaderMap, StatusCode, header::AUTHORIZATION},
	response::IntoResponse,
	routing,
};
use serde_json::{Value, json};

use eofed_graph::{ArangoExecutor, Error, GraphQuery, GraphQueryExecutor, queries};
use eofed_testkit::FakeServer;

#[derive(Clone, Default)]
struct Recorded {
	bodies: Arc<Mutex<Vec<Value>>>,
	auth: Arc<Mutex<Vec<String>>>,
	continued: Arc<Mutex<Vec<String>>>,
}

fn graph_config(url: String) -> eofed_config::Graph {
	eofed_config::Graph {
		url,
		database: "eo_knowledge".to_string(),
		graph_name: "eo_graph".to_string(),
		username: "root".to_string(),
		password: Some("secret".to_string()),
		timeout_ms: 2_000,
		batch_size: 2,
	}
}

async fn start_arango(recorded: Recorded) -> FakeServer {
	let app = Router::new()
		.route("/_db/eo_knowledge/_api/cursor", routing::post(open_cursor))
		.route("/_db/eo_knowledge/_api/cursor/{id}", routing::post(next_batch))
		.with_state(recorded);

	FakeServer::spawn(app).await.expect("Failed to start fake graph store.")
}

async fn open_cursor(
	State(recorded): State<Recorded>,
	headers: HeaderMap,
	Json(body): Json<Value>,
) -> impl IntoResponse {
	let auth = headers
		.get(AUTHORIZATION)
		.and_then(|value| value.to_str().ok())
		.unwrap_or_default()
		.to_string();

	recorded.auth.lock().expect("Lock poisoned.").push(auth);
	recorded.bodies.lock().expect("Lock poisoned.").push(body.clone());

	let query = body.get("query").and_then(Value::as_str).unwrap_or_default();

	if query.contains("BROKEN") {
		return (
			StatusCode::BAD_REQUEST,
			Json(json!({
				"error": true,
				"code": 400,
				"errorNum": 1501,
				"errorMessage": "syntax error, unexpected identifier"
			})),
		);
	}

	(
		StatusCode::CREATED,
		Json(json!({
			"result": ["Keyword/flood", "Keyword/fire"],
			"hasMore": true,
			"id": "4711",
			"error": false,
			"code": 201
		})),
	)
}

async fn next_batch(State(recorded): State<Recorded>, Path(id): Path<String>) -> impl IntoResponse {
	recorded.continued.lock().expect("Lock poisoned.").push(id);

	(
		StatusCode::OK,
		Json(json!({
			"result": ["Keyword/drought"],
			"hasMore": false,
			"error": false,
			"code": 200
		})),
	)
}

#[tokio::test]
async fn follows_cursor_until_exhausted() {
	let recorded = Recorded::default();
	let server = start_arango(recorded.clone()).await;
	let executor =
		ArangoExecutor::new(&graph_config(server.url())).expect("Failed to build executor.");
	let query = GraphQuery::new(queries::NODES_FROM_KEYWORD).bind("keyword", "Keyword/flood");
	let rows = executor.execute(query).await.expect("Query should succeed.");

	assert_eq!(rows, vec![json!("Keyword/flood"), json!("Keyword/fire"), json!("Keyword/drought")]);
	assert_eq!(*recorded.continued.lock().expect("Lock poisoned."), vec!["4711".to_string()]);

	let bodies = recorded.bodies.lock().expect("Lock poisoned.").clone();

	assert_eq!(bodies.len(), 1);
	assert_eq!(bodies[0]["query"], queries::NODES_FROM_KEYWORD);
	assert_eq!(bodies[0]["bindVars"], json!({ "keyword": "Keyword/flood" }));
	assert_eq!(bodies[0]["batchSize"], 2);

	let auth = recorded.auth.lock().expect("Lock poisoned.").clone();

	// "root:secret" in base64.
	assert_eq!(auth, vec!["Basic cm9vdDpzZWNyZXQ=".to_string()]);
}

#[tokio::test]
async fn per_query_batch_size_overrides_default() {
	let recorded = Recorded::default();
	let server = start_arango(recorded.clone()).await;
	let executor =
		ArangoExecutor::new(&graph_config(server.url())).expect("Failed to build executor.");

	executor
		.execute(GraphQuery::new(queries::ALL_KEYWORDS).with_batch_size(1_000))
		.await
		.expect("Query should succeed.");

	let bodies = recorded.bodies.lock().expect("Lock poisoned.").clone();

	assert_eq!(bodies[0]["batchSize"], 1_000);
	assert_eq!(bodies[0]["bindVars"], json!({}));
}

#[tokio::test]
async fn error_bodies_surface_as_query_errors() {
	let server = start_arango(Recorded::default()).await;
	let executor =
		ArangoExecutor::new(&graph_config(server.url())).expect("Failed to build executor.");
	let err = executor
		.execute(GraphQuery::new("FOR v IN BROKEN RETURN"))
		.await
		.expect_err("Broken query must fail.");

	match err {
		Error::Query { message, error_num } => {
			assert_eq!(message, "syntax error, unexpected identifier");
			assert_eq!(error_num, Some(1501));
		},
		other => panic!("Expected a query error, got {other:?}."),
	}
}

#[tokio::test]
async fn unreachable_store_is_an_http_error() {
	let addr = {
		let listener =
			std::net::TcpListener::bind("127.0.0.1:0").expect("Failed to reserve a local port.");

		listener.local_addr().expect("Failed to read reserved address.")
	};
	let executor = ArangoExecutor::new(&graph_config(format!("http://{addr}")))
		.expect("Failed to build executor.");
	let err = executor
		.execute(GraphQuery::new(queries::ALL_AUTHORS))
		.await
		.expect_err("Unreachable store must fail.");

	assert!(matches!(err, Error::Http(_)));
}
