use std::cell::RefCell;
use std::rc::Rc;

use leptos::prelude::*;
use log::{info, warn};
use web_sys::MouseEvent;

use crate::components::graph_editor::{EditorEvent, EditorState, GraphEditorCanvas, Tool};
use crate::components::model::EXPORT_FILE_NAME;
use crate::components::payload::{PlanarityStatus, ResultPayload};
use crate::components::result_graph::{ResultGraphCanvas, ResultView};

const K5_RESPONSE: &str = r#"{
	"status": "non_planar",
	"type": "K5",
	"nodes": [{"id": "1"}, {"id": "2"}, {"id": "3"}, {"id": "4"}, {"id": "5"}],
	"edges": [
		{"source": "1", "target": "2", "is_conflict": true},
		{"source": "1", "target": "3", "is_conflict": true},
		{"source": "1", "target": "4", "is_conflict": true},
		{"source": "1", "target": "5", "is_conflict": true},
		{"source": "2", "target": "3", "is_conflict": true},
		{"source": "2", "target": "4", "is_conflict": true},
		{"source": "2", "target": "5", "is_conflict": true},
		{"source": "3", "target": "4", "is_conflict": true},
		{"source": "3", "target": "5", "is_conflict": true},
		{"source": "4", "target": "5", "is_conflict": true}
	]
}"#;

const K33_RESPONSE: &str = r#"{
	"status": "non_planar",
	"type": "K3,3",
	"nodes": [
		{"id": 1, "is_principal": true}, {"id": 2, "is_principal": true},
		{"id": 3, "is_principal": true}, {"id": 4, "is_principal": true},
		{"id": 5, "is_principal": true}, {"id": 6, "is_principal": true},
		{"id": 7, "is_principal": false}, {"id": 8}
	],
	"edges": [
		{"source": 1, "target": 7, "is_conflict": true},
		{"source": 7, "target": 4, "is_conflict": true},
		{"source": 1, "target": 5, "is_conflict": true},
		{"source": 1, "target": 6, "is_conflict": true},
		{"source": 2, "target": 4, "is_conflict": true},
		{"source": 2, "target": 5, "is_conflict": true},
		{"source": 2, "target": 6, "is_conflict": true},
		{"source": 3, "target": 4, "is_conflict": true},
		{"source": 3, "target": 5, "is_conflict": true},
		{"source": 3, "target": 6, "is_conflict": true},
		{"source": 8, "target": 1}
	]
}"#;

const PLANAR_RESPONSE: &str = r#"{
	"status": "planar",
	"nodes": [
		{"id": "A", "x": 0, "y": -100},
		{"id": "B", "x": -86, "y": 50},
		{"id": "C", "x": 86, "y": 50},
		{"id": "D", "x": 0, "y": 0}
	],
	"edges": [
		{"source": "A", "target": "B"},
		{"source": "B", "target": "C"},
		{"source": "C", "target": "A"},
		{"source": "A", "target": "D"},
		{"source": "B", "target": "D"},
		{"source": "C", "target": "D"}
	]
}"#;

/// Canned tester answer for an uploaded file, chosen by its name.
fn mock_response(file_name: &str) -> &'static str {
	let name = file_name.to_lowercase();
	if name.contains("k33") || name.contains("k3,3") {
		K33_RESPONSE
	} else if name.contains("k5") || name.contains("non") {
		K5_RESPONSE
	} else {
		PLANAR_RESPONSE
	}
}

fn load_sample(file_name: &str) -> Option<ResultPayload> {
	match ResultPayload::from_json(mock_response(file_name)) {
		Ok(payload) => Some(payload),
		Err(err) => {
			warn!("{file_name}: {err}");
			None
		}
	}
}

/// Default Home Page
#[component]
pub fn Home() -> impl IntoView {
	let initial = load_sample("k5.txt").unwrap_or_else(|| ResultPayload {
		status: PlanarityStatus::Planar,
		kind: None,
		graph: Default::default(),
	});
	let result = RwSignal::new(initial);
	let editor = Rc::new(RefCell::new(EditorState::new(
		800.0,
		600.0,
		js_sys::Date::now() as u64,
	)));
	let tool = RwSignal::new(Tool::default());
	let export = RwSignal::new(None::<String>);

	let pick = move |file_name: &'static str| {
		move |_: MouseEvent| {
			if let Some(payload) = load_sample(file_name) {
				info!("loaded sample {file_name}");
				result.set(payload);
			}
		}
	};

	let tool_button = {
		let editor = editor.clone();
		move |label: &'static str, next: Tool| {
			let editor = editor.clone();
			view! {
				<button
					class:active=move || tool.get() == next
					on:click=move |_: MouseEvent| {
						editor.borrow_mut().handle(EditorEvent::SetTool(next));
						tool.set(next);
					}
				>
					{label}
				</button>
			}
		}
	};

	let editor_action = {
		let editor = editor.clone();
		move |label: &'static str, action: fn(&mut EditorState)| {
			let editor = editor.clone();
			view! {
				<button on:click=move |_: MouseEvent| action(&mut editor.borrow_mut())>
					{label}
				</button>
			}
		}
	};

	let editor_export = editor.clone();
	let on_export = move |_: MouseEvent| {
		let text = editor_export.borrow().export();
		match &text {
			Some(text) => info!("exported {EXPORT_FILE_NAME}:\n{text}"),
			None => warn!("nothing to export"),
		}
		export.set(text);
	};

	let editor_load = editor.clone();
	let on_load = move |_: MouseEvent| {
		let payload = result.get_untracked().graph;
		editor_load.borrow_mut().handle(EditorEvent::Load(payload));
	};

	let download_href = move || {
		export.get().map(|text| {
			let encoded: String = js_sys::encode_uri_component(&text).into();
			format!("data:text/plain;charset=utf-8,{encoded}")
		})
	};

	view! {
		<main class="planarity">
			<section class="editor">
				<div class="toolbar">
					{tool_button("Select", Tool::Select)}
					{tool_button("Node", Tool::PlaceNode)}
					{tool_button("Edge", Tool::PlaceEdge)}
					{editor_action("Delete", EditorState::delete_or_clear)}
					{editor_action("Zoom in", EditorState::zoom_in)}
					{editor_action("Zoom out", EditorState::zoom_out)}
					{editor_action("Reset view", EditorState::reset_view)}
					<button on:click=on_export>"Export"</button>
					<button on:click=on_load>"Load result graph"</button>
					<a
						download=EXPORT_FILE_NAME
						href=download_href
						style:display=move || if export.get().is_some() { "inline" } else { "none" }
					>
						"Download " {EXPORT_FILE_NAME}
					</a>
				</div>
				<div class="editor-canvas">
					<GraphEditorCanvas state=editor />
				</div>
			</section>

			<section class="results">
				<div class="toolbar">
					<button on:click=pick("k5.txt")>"K5"</button>
					<button on:click=pick("k33.txt")>"K3,3"</button>
					<button on:click=pick("planar.txt")>"Planar"</button>
				</div>
				<div class="result-panels">
					<div class="result-panel">
						<h2>"Original"</h2>
						<ResultGraphCanvas payload=result side=ResultView::Original />
					</div>
					<div class="result-panel">
						<h2>"Result"</h2>
						<ResultGraphCanvas payload=result side=ResultView::Result />
					</div>
				</div>
			</section>
		</main>
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::payload::CanonicalKind;
	use pretty_assertions::assert_eq;

	#[test]
	fn samples_are_chosen_by_file_name() {
		assert_eq!(mock_response("my_k5.txt"), K5_RESPONSE);
		assert_eq!(mock_response("NonPlanar.txt"), K5_RESPONSE);
		assert_eq!(mock_response("K33.txt"), K33_RESPONSE);
		assert_eq!(mock_response("square.txt"), PLANAR_RESPONSE);
	}

	#[test]
	fn every_sample_parses() {
		let k5 = load_sample("k5").unwrap();
		assert_eq!(k5.canonical_kind(), CanonicalKind::K5);
		assert_eq!(k5.graph.edges.len(), 10);

		let k33 = load_sample("k33").unwrap();
		assert_eq!(k33.canonical_kind(), CanonicalKind::K33);
		assert_eq!(k33.graph.nodes[0].id.as_str(), "1");

		assert!(load_sample("planar").unwrap().is_planar());
	}
}
