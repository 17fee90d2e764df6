//! Client side of the graph provider.
//!
//! Free text goes to the `/api/graph` endpoint, which answers with a
//! knowledge graph as JSON. Submissions can overlap; a [`SubmissionTracker`]
//! makes sure only the newest one is ever applied.

use std::cell::Cell;
use std::rc::Rc;

use log::{debug, warn};
use serde::Serialize;
use thiserror::Error;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{Headers, Request, RequestInit, Response};

use crate::components::force_graph::KnowledgeGraph;

/// Endpoint that turns free text into a knowledge graph.
pub const GRAPH_ENDPOINT: &str = "/api/graph";

/// Ways a graph request can fail.
#[derive(Debug, Error)]
pub enum ProviderError {
	/// Nothing to send.
	#[error("input is empty")]
	EmptyInput,
	/// The browser could not build or send the request.
	#[error("request failed: {0}")]
	Request(String),
	/// The endpoint answered with a non-success status.
	#[error("graph endpoint returned HTTP {0}")]
	Status(u16),
	/// The body was not a knowledge graph.
	#[error("malformed graph: {0}")]
	Decode(#[from] serde_json::Error),
}

impl From<JsValue> for ProviderError {
	fn from(value: JsValue) -> Self {
		Self::Request(value.as_string().unwrap_or_else(|| format!("{value:?}")))
	}
}

/// JSON request body. Failures here are request failures, not malformed graphs.
fn encode_body(payload: &impl Serialize) -> Result<String, ProviderError> {
	serde_json::to_string(payload).map_err(|e| ProviderError::Request(e.to_string()))
}

#[derive(Serialize)]
struct GraphRequest<'a> {
	input: &'a str,
}

/// Asks the provider for a graph describing `input`.
pub async fn fetch_graph(input: &str) -> Result<KnowledgeGraph, ProviderError> {
	let input = input.trim();
	if input.is_empty() {
		return Err(ProviderError::EmptyInput);
	}

	let window = web_sys::window().ok_or_else(|| ProviderError::Request("no window".into()))?;

	let headers = Headers::new()?;
	headers.set("Content-Type", "application/json")?;
	let body = encode_body(&GraphRequest { input })?;

	let init = RequestInit::new();
	init.set_method("POST");
	init.set_headers(&headers);
	init.set_body(&JsValue::from_str(&body));
	let request = Request::new_with_str_and_init(GRAPH_ENDPOINT, &init)?;

	let response: Response = JsFuture::from(window.fetch_with_request(&request))
		.await?
		.dyn_into()?;
	if !response.ok() {
		return Err(ProviderError::Status(response.status()));
	}

	let text = JsFuture::from(response.text()?).await?;
	decode_response(&text.as_string().unwrap_or_default())
}

/// Parses a provider response body. Nodes and edges that break the graph
/// invariants are dropped and logged rather than rejected.
pub fn decode_response(body: &str) -> Result<KnowledgeGraph, ProviderError> {
	let graph: KnowledgeGraph = serde_json::from_str(body)?;
	let (graph, issues) = graph.sanitize();
	for issue in &issues {
		warn!("naumu-graph: provider graph: {}", issue);
	}
	Ok(graph)
}

/// Identifies one submission.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Ticket(u64);

/// Last-submission-wins guard for overlapping provider calls.
///
/// Clones share the same counters, so one can live in each async task.
#[derive(Clone, Debug, Default)]
pub struct SubmissionTracker {
	latest: Rc<Cell<u64>>,
	settled: Rc<Cell<u64>>,
}

impl SubmissionTracker {
	/// Creates a tracker with nothing outstanding.
	pub fn new() -> Self {
		Self::default()
	}

	/// Starts a submission, superseding every earlier one.
	pub fn begin(&self) -> Ticket {
		let next = self.latest.get() + 1;
		self.latest.set(next);
		Ticket(next)
	}

	/// Invalidates every outstanding submission.
	pub fn cancel(&self) {
		let next = self.begin();
		self.settled.set(next.0);
	}

	/// Whether the newest submission is still waiting for its result.
	pub fn is_pending(&self) -> bool {
		self.latest.get() != self.settled.get()
	}

	/// Whether `ticket` is still the newest submission.
	pub fn is_current(&self, ticket: Ticket) -> bool {
		self.latest.get() == ticket.0
	}

	/// Filters a finished submission. `None` means a newer one has started
	/// and the result must be discarded; otherwise the result is passed on.
	pub fn accept<T>(
		&self,
		ticket: Ticket,
		result: Result<T, ProviderError>,
	) -> Option<Result<T, ProviderError>> {
		if self.is_current(ticket) {
			self.settled.set(ticket.0);
			Some(result)
		} else {
			debug!("naumu-graph: discarding stale submission {}", ticket.0);
			None
		}
	}
}
