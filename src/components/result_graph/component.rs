use std::cell::RefCell;
use std::rc::Rc;

use leptos::prelude::*;
use log::debug;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, MouseEvent, WheelEvent};

use super::animation::Progress;
use super::render;
use super::state::{ResultGraphState, ViewRole};
use crate::components::payload::ResultPayload;

/// Which side of a test result a canvas shows.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ResultView {
	/// The submitted graph, read-only.
	Original,
	/// The tester's answer.
	#[default]
	Result,
}

type SharedState = Rc<RefCell<Option<ResultGraphState>>>;

#[derive(Clone, Copy, Debug)]
struct Pan {
	start_x: f64,
	start_y: f64,
	transform_x: f64,
	transform_y: f64,
}

fn local_position(
	canvas_ref: NodeRef<leptos::html::Canvas>,
	ev: &MouseEvent,
) -> Option<(f64, f64)> {
	let canvas: HtmlCanvasElement = canvas_ref.get()?.into();
	let rect = canvas.get_bounding_client_rect();
	Some((
		ev.client_x() as f64 - rect.left(),
		ev.client_y() as f64 - rect.top(),
	))
}

fn parent_size(canvas: &HtmlCanvasElement) -> (f64, f64) {
	canvas
		.parent_element()
		.map(|p| (p.client_width() as f64, p.client_height() as f64))
		.filter(|&(w, h)| w > 0.0 && h > 0.0)
		.unwrap_or((800.0, 600.0))
}

/// Button handler that runs `action` against the current state, if any.
fn control(
	state: &SharedState,
	action: fn(&mut ResultGraphState),
) -> impl FnMut(MouseEvent) + use<> {
	let state = state.clone();
	move |_| {
		if let Some(ref mut s) = *state.borrow_mut() {
			action(s);
		}
	}
}

/// Canvas for one side of a planarity result, with its view controls.
#[component]
pub fn ResultGraphCanvas(
	#[prop(into)] payload: Signal<ResultPayload>,
	#[prop(default = ResultView::Result)] side: ResultView,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let state: SharedState = Rc::new(RefCell::new(None));
	let animate: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let resize_cb: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let role = RwSignal::new(None::<ViewRole>);
	let progress = RwSignal::new(None::<Progress>);
	let (state_init, animate_init, resize_cb_init) =
		(state.clone(), animate.clone(), resize_cb.clone());

	Effect::new(move |_| {
		let payload = payload.get();
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();
		let Some(window) = web_sys::window() else {
			return;
		};
		let (w, h) = parent_size(&canvas);
		canvas.set_width(w as u32);
		canvas.set_height(h as u32);

		let seed = js_sys::Date::now() as u64;
		let next = match side {
			ResultView::Original => ResultGraphState::original(&payload, w, h, seed),
			ResultView::Result => ResultGraphState::result(&payload, w, h, seed),
		};
		role.set(Some(next.role));
		progress.set(None);
		*state_init.borrow_mut() = Some(next);

		// the frame loop and resize listener outlive payload changes
		if animate_init.borrow().is_some() {
			debug!("result canvas reloaded");
			return;
		}

		let (state_resize, canvas_resize) = (state_init.clone(), canvas.clone());
		*resize_cb_init.borrow_mut() = Some(Closure::new(move || {
			let (nw, nh) = parent_size(&canvas_resize);
			canvas_resize.set_width(nw as u32);
			canvas_resize.set_height(nh as u32);
			if let Some(ref mut s) = *state_resize.borrow_mut() {
				s.resize(nw, nh);
			}
		}));
		if let Some(ref cb) = *resize_cb_init.borrow() {
			let _ = window.add_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
		}

		let Ok(Some(ctx)) = canvas.get_context("2d") else {
			return;
		};
		let Ok(ctx) = ctx.dyn_into::<CanvasRenderingContext2d>() else {
			return;
		};
		let (state_anim, animate_inner) = (state_init.clone(), animate_init.clone());
		*animate_init.borrow_mut() = Some(Closure::new(move || {
			if let Some(ref mut s) = *state_anim.borrow_mut() {
				s.tick(0.016);
				render::render(s, &ctx);
				let current = s.replay_progress();
				if progress.try_get_untracked().is_some_and(|p| p != current) {
					progress.try_set(current);
				}
			}
			if let (Some(cb), Some(win)) = (animate_inner.borrow().as_ref(), web_sys::window()) {
				let _ = win.request_animation_frame(cb.as_ref().unchecked_ref());
			}
		}));
		if let Some(ref cb) = *animate_init.borrow() {
			let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
		}
	});

	let pan: Rc<RefCell<Option<Pan>>> = Rc::new(RefCell::new(None));

	let (state_md, pan_md) = (state.clone(), pan.clone());
	let on_mousedown = move |ev: MouseEvent| {
		let Some((x, y)) = local_position(canvas_ref, &ev) else {
			return;
		};
		if let Some(ref mut s) = *state_md.borrow_mut() {
			let p = s.viewport.screen_to_graph(x, y);
			if !s.pointer_down(p) {
				let t = s.viewport.transform();
				*pan_md.borrow_mut() = Some(Pan {
					start_x: x,
					start_y: y,
					transform_x: t.x,
					transform_y: t.y,
				});
			}
		}
	};

	let (state_mm, pan_mm) = (state.clone(), pan.clone());
	let on_mousemove = move |ev: MouseEvent| {
		let Some((x, y)) = local_position(canvas_ref, &ev) else {
			return;
		};
		if let Some(ref mut s) = *state_mm.borrow_mut() {
			if s.is_dragging() {
				let p = s.viewport.screen_to_graph(x, y);
				s.pointer_move(p);
			} else if let Some(pan) = *pan_mm.borrow() {
				s.viewport.pan_to(
					pan.transform_x + (x - pan.start_x),
					pan.transform_y + (y - pan.start_y),
				);
			}
		}
	};

	let (state_mu, pan_mu) = (state.clone(), pan.clone());
	let release = move || {
		if let Some(ref mut s) = *state_mu.borrow_mut() {
			s.pointer_up();
		}
		pan_mu.borrow_mut().take();
	};
	let release_ml = release.clone();
	let on_mouseup = move |_: MouseEvent| release();
	let on_mouseleave = move |_: MouseEvent| release_ml();

	let state_wh = state.clone();
	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		let Some((x, y)) = local_position(canvas_ref, &ev) else {
			return;
		};
		if let Some(ref mut s) = *state_wh.borrow_mut() {
			let factor = if ev.delta_y() > 0.0 { 0.9 } else { 1.1 };
			s.viewport.zoom_at(x, y, factor);
		}
	};

	let shown = move |visible: bool| if visible { "inline-block" } else { "none" };
	let non_planar = move || role.get() == Some(ViewRole::NonPlanar);
	let planar = move || role.get() == Some(ViewRole::Planar);
	let replaying = move || progress.get().is_some();

	view! {
		<div class="result-graph">
			<canvas
				node_ref=canvas_ref
				class="result-graph-canvas"
				on:mousedown=on_mousedown
				on:mousemove=on_mousemove
				on:mouseup=on_mouseup
				on:mouseleave=on_mouseleave
				on:wheel=on_wheel
				style="display: block; cursor: grab;"
			/>
			<div class="graph-controls">
				<button on:click=control(&state, ResultGraphState::zoom_in)>"+"</button>
				<button on:click=control(&state, ResultGraphState::zoom_out)>"-"</button>
				<button on:click=control(&state, ResultGraphState::fit)>"Fit"</button>
				<button
					style:display=move || shown(non_planar())
					on:click=control(&state, ResultGraphState::reset)
				>
					"Reset"
				</button>
				<button
					style:display=move || shown(non_planar() && !replaying())
					on:click=control(&state, ResultGraphState::play_animation)
				>
					"Play"
				</button>
				<button
					style:display=move || shown(replaying())
					on:click=control(&state, |s| s.step_animation(-1))
				>
					"Prev"
				</button>
				<button
					style:display=move || shown(replaying())
					on:click=control(&state, |s| s.step_animation(1))
				>
					"Next"
				</button>
				<button
					style:display=move || shown(replaying())
					on:click=control(&state, ResultGraphState::cancel_animation)
				>
					"Cancel"
				</button>
				<button
					style:display=move || shown(planar())
					on:click=control(&state, ResultGraphState::enable_physics)
				>
					"Enable physics"
				</button>
				<button
					style:display=move || shown(planar())
					on:click=control(&state, ResultGraphState::reset_planar)
				>
					"Reset layout"
				</button>
				<span class="progress" style:display=move || shown(replaying())>
					{move || progress.get().unwrap_or_default().label()}
				</span>
			</div>
		</div>
	}
}
