//! naumu-graph: interactive knowledge graph for naumu product definitions.
//!
//! This crate provides a WASM page that turns free text into a knowledge
//! graph via the graph provider and shows it as a physics-based layout with
//! drag, pan and zoom. Before anything is submitted, a label-free ambient graph
//! drifts in the background.

use leptos::prelude::*;
use leptos::task::spawn_local;
use leptos_meta::*;
use log::{Level, info, warn};
use wasm_bindgen::JsCast;
use web_sys::{HtmlScriptElement, KeyboardEvent, Window};

pub mod ambient;
pub mod components;
pub mod provider;
pub mod storage;

pub use components::force_graph::{
	ForceGraphCanvas, ForceOverrides, GraphEdge, GraphNode, GraphView, KnowledgeGraph, NodeType,
};

use ambient::generate_ambient_graph;
use provider::{SubmissionTracker, fetch_graph};

/// Initialize logging and panic hooks for the WASM target.
pub fn init_logging() {
	let _ = console_log::init_with_level(Level::Debug);
	console_error_panic_hook::set_once();
	info!("naumu-graph: logging initialized");
}

/// Load force overrides from a script element with id="force-config".
/// Expected format: JSON object with any of the [`ForceOverrides`] fields.
fn load_force_overrides() -> ForceOverrides {
	let Some(json_text) = force_config_text() else {
		return ForceOverrides::default();
	};

	match serde_json::from_str::<ForceOverrides>(&json_text) {
		Ok(overrides) => {
			info!("naumu-graph: loaded force overrides {:?}", overrides);
			overrides
		}
		Err(e) => {
			warn!("naumu-graph: failed to parse force config: {}", e);
			ForceOverrides::default()
		}
	}
}

fn force_config_text() -> Option<String> {
	let window: Window = web_sys::window()?;
	let document = window.document()?;
	let element = document.get_element_by_id("force-config")?;
	let script: HtmlScriptElement = element.dyn_into().ok()?;
	script.text().ok()
}

/// Fresh ambient graph, different on every call.
fn ambient_graph() -> KnowledgeGraph {
	generate_ambient_graph(js_sys::Date::now() as u64)
}

/// Main application component.
/// Restores the last graph (or starts ambient) and wires the text input to
/// the graph provider.
#[component]
pub fn App() -> impl IntoView {
	provide_meta_context();

	let graph = RwSignal::new(storage::load().unwrap_or_else(ambient_graph));
	let input = RwSignal::new(String::new());
	let loading = RwSignal::new(false);
	let error = RwSignal::new(None::<String>);
	let tracker = StoredValue::new_local(SubmissionTracker::new());
	let overrides = load_force_overrides();

	// The current graph keeps animating until the provider answers.
	let submit = move || {
		let text = input.get_untracked();
		if text.trim().is_empty() || loading.get_untracked() {
			return;
		}
		let Some(ticket) = tracker.try_with_value(SubmissionTracker::begin) else {
			return;
		};
		loading.set(true);
		error.set(None);

		spawn_local(async move {
			let result = fetch_graph(&text).await;
			match tracker.try_with_value(|t| t.accept(ticket, result)).flatten() {
				Some(Ok(next)) => {
					storage::save(&next);
					graph.set(next);
					input.set(String::new());
				}
				Some(Err(e)) => {
					warn!("naumu-graph: graph request failed: {}", e);
					error.set(Some("Error generating graph. Please try again.".into()));
				}
				None => {}
			}
			// A stale result only clears loading if nothing newer is in flight.
			loading.set(tracker.try_with_value(SubmissionTracker::is_pending).unwrap_or(false));
		});
	};

	let on_keydown = move |ev: KeyboardEvent| {
		if ev.key() == "Enter" && !ev.shift_key() {
			ev.prevent_default();
			submit();
		}
	};

	let on_clear = move |_| {
		tracker.with_value(SubmissionTracker::cancel);
		storage::clear();
		graph.set(ambient_graph());
		input.set(String::new());
		error.set(None);
		loading.set(tracker.with_value(SubmissionTracker::is_pending));
	};

	let show_clear = move || !loading.get() && graph.with(KnowledgeGraph::has_labels);

	view! {
		<Html attr:lang="en" attr:dir="ltr" />
		<Title text="naumu" />
		<Meta charset="UTF-8" />
		<Meta name="viewport" content="width=device-width, initial-scale=1.0" />

		<div class="fullscreen-graph">
			<ForceGraphCanvas data=graph overrides=overrides fullscreen=true />
		</div>

		<div class="scene">
			<div class="logo-wrapper">
				<h1>"naumu"</h1>
				<p>"ideas, structured."</p>
			</div>
		</div>

		<Show when=move || loading.get()>
			<div class="result-modal">
				<h2>"Thinking..."</h2>
				<p>"Analyzing your thoughts and building the constellation."</p>
			</div>
		</Show>

		<div class="input-container" class:loading=move || loading.get()>
			<textarea
				id="topic-input"
				placeholder="What's on your mind?"
				rows="1"
				prop:value=move || input.get()
				on:input=move |ev| input.set(event_target_value(&ev))
				on:keydown=on_keydown
				disabled=move || loading.get()
			></textarea>
			<button
				id="submit-btn"
				aria-label="Submit"
				on:click=move |_| submit()
				disabled=move || loading.get()
			>
				"→"
			</button>
			{move || error.get().map(|msg| view! { <p class="error-message">{msg}</p> })}
		</div>

		<Show when=show_clear>
			<button class="clear-graph" on:click=on_clear>
				"Clear Graph"
			</button>
		</Show>
	}
}
