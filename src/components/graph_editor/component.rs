use std::cell::RefCell;
use std::rc::Rc;

use leptos::prelude::*;
use wasm_bindgen::prelude::*;
use web_sys::{
	CanvasRenderingContext2d, HtmlCanvasElement, KeyboardEvent, MouseEvent, WheelEvent,
};

use super::render;
use super::state::{EditorEvent, EditorState, Hit};
use crate::components::geometry::Point;

/// Pointer travel, in screen pixels, below which a press counts as a click.
const CLICK_SLOP: f64 = 3.0;

#[derive(Clone, Debug)]
struct Press {
	hit: Hit,
	start_x: f64,
	start_y: f64,
	transform_x: f64,
	transform_y: f64,
	moved: bool,
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

/// Editable graph canvas driven by a shared [`EditorState`].
#[component]
pub fn GraphEditorCanvas(state: Rc<RefCell<EditorState>>) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let animate: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let keydown_cb: Rc<RefCell<Option<Closure<dyn FnMut(KeyboardEvent)>>>> =
		Rc::new(RefCell::new(None));
	let press: Rc<RefCell<Option<Press>>> = Rc::new(RefCell::new(None));
	let (state_init, animate_init, keydown_init) =
		(state.clone(), animate.clone(), keydown_cb.clone());

	Effect::new(move |_| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		if animate_init.borrow().is_some() {
			return;
		}
		let canvas: HtmlCanvasElement = canvas.into();
		let Some(window) = web_sys::window() else {
			return;
		};
		let (w, h) = canvas
			.parent_element()
			.map(|p| (p.client_width() as f64, p.client_height() as f64))
			.filter(|&(w, h)| w > 0.0 && h > 0.0)
			.unwrap_or((800.0, 600.0));
		canvas.set_width(w as u32);
		canvas.set_height(h as u32);
		state_init.borrow_mut().viewport.resize(w, h);

		let state_key = state_init.clone();
		*keydown_init.borrow_mut() = Some(Closure::new(move |ev: KeyboardEvent| {
			if let Some(event) = EditorEvent::from_key(&ev.key()) {
				state_key.borrow_mut().handle(event);
			}
		}));
		if let Some(ref cb) = *keydown_init.borrow() {
			let _ = window.add_event_listener_with_callback("keydown", cb.as_ref().unchecked_ref());
		}

		let Ok(Some(ctx)) = canvas.get_context("2d") else {
			return;
		};
		let Ok(ctx) = ctx.dyn_into::<CanvasRenderingContext2d>() else {
			return;
		};

		let (state_anim, animate_inner) = (state_init.clone(), animate_init.clone());
		*animate_init.borrow_mut() = Some(Closure::new(move || {
			{
				let mut s = state_anim.borrow_mut();
				s.viewport.advance(0.016);
				render::render(&s, &ctx);
			}
			if let (Some(cb), Some(win)) = (animate_inner.borrow().as_ref(), web_sys::window()) {
				let _ = win.request_animation_frame(cb.as_ref().unchecked_ref());
			}
		}));
		if let Some(ref cb) = *animate_init.borrow() {
			let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
		}
	});

	let (state_md, press_md) = (state.clone(), press.clone());
	let on_mousedown = move |ev: MouseEvent| {
		let Some((x, y)) = local_position(canvas_ref, &ev) else {
			return;
		};
		let mut s = state_md.borrow_mut();
		let t = s.viewport.transform();
		let p = s.viewport.screen_to_graph(x, y);
		let hit = s.hit(p);
		if let Hit::Node(ref id) = hit {
			s.handle(EditorEvent::GrabNode(id.clone(), p));
		}
		*press_md.borrow_mut() = Some(Press {
			hit,
			start_x: x,
			start_y: y,
			transform_x: t.x,
			transform_y: t.y,
			moved: false,
		});
	};

	let (state_mm, press_mm) = (state.clone(), press.clone());
	let on_mousemove = move |ev: MouseEvent| {
		let Some((x, y)) = local_position(canvas_ref, &ev) else {
			return;
		};
		let mut s = state_mm.borrow_mut();
		let p = s.viewport.screen_to_graph(x, y);
		s.handle(EditorEvent::PointerMove(p));

		let mut press = press_mm.borrow_mut();
		let Some(press) = press.as_mut() else {
			return;
		};
		if Point::new(x, y).distance(Point::new(press.start_x, press.start_y)) > CLICK_SLOP {
			press.moved = true;
		}
		if !press.moved {
			return;
		}
		match &press.hit {
			Hit::Node(_) => s.handle(EditorEvent::DragTo(p)),
			Hit::Canvas => s.viewport.pan_to(
				press.transform_x + (x - press.start_x),
				press.transform_y + (y - press.start_y),
			),
			_ => {}
		}
	};

	let (state_mu, press_mu) = (state.clone(), press.clone());
	let on_mouseup = move |ev: MouseEvent| {
		let Some(press) = press_mu.borrow_mut().take() else {
			return;
		};
		state_mu.borrow_mut().handle(EditorEvent::Release);
		if press.moved {
			return;
		}
		let Some((x, y)) = local_position(canvas_ref, &ev) else {
			return;
		};
		let mut s = state_mu.borrow_mut();
		let event = match press.hit {
			Hit::Node(id) => EditorEvent::ClickNode(id),
			Hit::Edge(id) => EditorEvent::ClickEdge(id),
			Hit::Canvas => EditorEvent::ClickCanvas(s.viewport.screen_to_graph(x, y)),
		};
		s.handle(event);
	};

	let (state_ml, press_ml) = (state.clone(), press.clone());
	let on_mouseleave = move |_: MouseEvent| {
		press_ml.borrow_mut().take();
		state_ml.borrow_mut().handle(EditorEvent::Release);
	};

	let state_wh = state.clone();
	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		let Some((x, y)) = local_position(canvas_ref, &ev) else {
			return;
		};
		let factor = if ev.delta_y() > 0.0 { 0.9 } else { 1.1 };
		state_wh.borrow_mut().viewport.zoom_at(x, y, factor);
	};

	view! {
		<canvas
			node_ref=canvas_ref
			class="graph-editor-canvas"
			on:mousedown=on_mousedown
			on:mousemove=on_mousemove
			on:mouseup=on_mouseup
			on:mouseleave=on_mouseleave
			on:wheel=on_wheel
			style="display: block; cursor: crosshair;"
		/>
	}
}
