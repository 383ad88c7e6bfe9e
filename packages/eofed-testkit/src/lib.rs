mod error;

pub use error::{Error, Result};

use std::{
	collections::{HashMap, HashSet},
	future::IntoFuture,
	net::SocketAddr,
	sync::Mutex,
};

use axum::Router;
use serde_json::Value;
use tokio::{
	net::TcpListener,
	sync::{oneshot, oneshot::Sender},
};

use eofed_graph::{BoxFuture, GraphQuery, GraphQueryExecutor};

type Responder = Box<dyn Fn(&GraphQuery) -> Vec<Value> + Send + Sync>;

/// In-memory stand-in for the graph store.
///
/// Answers each template with canned rows (or rows computed from the bound variables), fails the
/// templates marked as failing, and records every query it receives. Unknown templates yield no
/// rows.
#[derive(Default)]
pub struct StubGraph {
	responders: HashMap<&'static str, Responder>,
	failing: HashSet<&'static str>,
	calls: Mutex<Vec<GraphQuery>>,
}
impl StubGraph {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn respond(self, template: &'static str, rows: Vec<Value>) -> Self {
		self.respond_with(template, move |_| rows.clone())
	}

	pub fn respond_with<F>(mut self, template: &'static str, responder: F) -> Self
	where
		F: Fn(&GraphQuery) -> Vec<Value> + Send + Sync + 'static,
	{
		self.responders.insert(template, Box::new(responder));

		self
	}

	pub fn fail(mut self, template: &'static str) -> Self {
		self.failing.insert(template);

		self
	}

	pub fn calls(&self) -> Vec<GraphQuery> {
		self.calls.lock().unwrap_or_else(|err| err.into_inner()).clone()
	}

	pub fn calls_for(&self, template: &str) -> Vec<GraphQuery> {
		self.calls().into_iter().filter(|call| call.template == template).collect()
	}

	fn answer(&self, query: GraphQuery) -> eofed_graph::Result<Vec<Value>> {
		let rows = if self.failing.contains(query.template) {
			Err(eofed_graph::Error::Query {
				message: "Stubbed graph failure.".to_string(),
				error_num: None,
			})
		} else {
			Ok(self
				.responders
				.get(query.template)
				.map(|responder| responder(&query))
				.unwrap_or_default())
		};

		self.calls.lock().unwrap_or_else(|err| err.into_inner()).push(query);

		rows
	}
}

impl GraphQueryExecutor for StubGraph {
	fn execute<'a>(&'a self, query: GraphQuery) -> BoxFuture<'a, eofed_graph::Result<Vec<Value>>> {
		let rows = self.answer(query);

		Box::pin(async move { rows })
	}
}

/// A local HTTP server that shuts down when dropped.
pub struct FakeServer {
	pub addr: SocketAddr,
	shutdown: Option<Sender<()>>,
}
impl FakeServer {
	pub async fn spawn(app: Router) -> Result<Self> {
		let listener = TcpListener::bind("127.0.0.1:0").await?;
		let addr = listener.local_addr()?;
		let (tx, rx) = oneshot::channel();
		let server = axum::serve(listener, app).with_graceful_shutdown(async move {
			let _ = rx.await;
		});

		tokio::spawn(async move {
			let _ = server.into_future().await;
		});

		Ok(Self { addr, shutdown: Some(tx) })
	}

	pub fn url(&self) -> String {
		format!("http://{}", self.addr)
	}
}

impl Drop for FakeServer {
	fn drop(&mut self) {
		if let Some(tx) = self.shutdown.take() {
			let _ = tx.send(());
		}
	}
}
