//! Leptos component wrapping the force-directed graph canvas.
//!
//! The component creates an HTML canvas element and forwards mouse, wheel and
//! touch input to a [`GraphView`]. An animation loop runs via
//! `requestAnimationFrame`, stepping the layout and redrawing each frame.
//! The loop, the resize listener and the view itself are torn down when the
//! component is unmounted.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use leptos::prelude::*;
use log::warn;
use wasm_bindgen::prelude::*;
use web_sys::{
	CanvasRenderingContext2d, Element, HtmlCanvasElement, MouseEvent, Touch, TouchEvent,
	WheelEvent, Window,
};

use super::interaction::is_form_control;
use super::render::CanvasSurface;
use super::simulation::ForceOverrides;
use super::types::KnowledgeGraph;
use super::view::GraphView;

type FrameCallback = Rc<RefCell<Option<Closure<dyn FnMut()>>>>;

/// Browser resources held by a mounted canvas.
struct LoopHandles {
	view: Rc<RefCell<GraphView>>,
	raf_id: Rc<Cell<Option<i32>>>,
	animate: FrameCallback,
	resize_cb: FrameCallback,
}

impl LoopHandles {
	fn release(&self) {
		let window = web_sys::window();
		if let (Some(window), Some(id)) = (&window, self.raf_id.take()) {
			let _ = window.cancel_animation_frame(id);
		}
		if let Some(cb) = self.resize_cb.borrow_mut().take() {
			if let Some(window) = &window {
				let _ = window
					.remove_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
			}
		}
		// Breaks the closure's reference to itself.
		self.animate.borrow_mut().take();
		self.view.borrow_mut().unmount();
	}
}

fn window_size(window: &Window) -> Option<(f64, f64)> {
	Some((
		window.inner_width().ok()?.as_f64()?,
		window.inner_height().ok()?.as_f64()?,
	))
}

/// Size the canvas should take. Fullscreen follows the window; otherwise
/// explicit dimensions win over the parent's, with 800x600 as the last resort.
fn target_size(
	fullscreen: bool,
	explicit: (Option<f64>, Option<f64>),
	window: Option<(f64, f64)>,
	parent: Option<(f64, f64)>,
) -> (f64, f64) {
	if let (true, Some(size)) = (fullscreen, window) {
		return size;
	}
	(
		explicit.0.or(parent.map(|p| p.0)).unwrap_or(800.0),
		explicit.1.or(parent.map(|p| p.1)).unwrap_or(600.0),
	)
}

/// Measures and applies the canvas size for the current window and layout.
fn fit_canvas(
	canvas: &HtmlCanvasElement,
	fullscreen: bool,
	explicit: (Option<f64>, Option<f64>),
) -> (f64, f64) {
	let window = web_sys::window().as_ref().and_then(window_size);
	let parent = canvas
		.parent_element()
		.map(|p| (p.client_width() as f64, p.client_height() as f64));
	let (w, h) = target_size(fullscreen, explicit, window, parent);
	canvas.set_width(w as u32);
	canvas.set_height(h as u32);
	(w, h)
}

fn local_point(canvas_ref: NodeRef<leptos::html::Canvas>, cx: i32, cy: i32) -> Option<(f64, f64)> {
	let canvas: HtmlCanvasElement = canvas_ref.get_untracked()?.into();
	let rect = canvas.get_bounding_client_rect();
	Some((cx as f64 - rect.left(), cy as f64 - rect.top()))
}

/// True when the touch started on (or inside) a form control.
fn touch_on_form_control(ev: &TouchEvent) -> bool {
	let mut element = ev.target().and_then(|t| t.dyn_into::<Element>().ok());
	while let Some(el) = element {
		if is_form_control(&el.tag_name()) {
			return true;
		}
		element = el.parent_element();
	}
	false
}

fn touch_distance(a: &Touch, b: &Touch) -> f64 {
	let (dx, dy) = (
		(a.client_x() - b.client_x()) as f64,
		(a.client_y() - b.client_y()) as f64,
	);
	dx.hypot(dy)
}

/// Renders an interactive force-directed graph on a canvas element.
///
/// Every new value of `data` replaces the displayed graph and reheats the
/// layout. The component sizes itself to its parent container by default; set
/// `fullscreen = true` to fill the viewport instead. Either way it re-measures
/// on every window resize. Explicit `width`/`height` override automatic sizing.
#[component]
pub fn ForceGraphCanvas(
	#[prop(into)] data: Signal<KnowledgeGraph>,
	#[prop(optional)] overrides: ForceOverrides,
	#[prop(default = false)] fullscreen: bool,
	#[prop(default = None)] width: Option<f64>,
	#[prop(default = None)] height: Option<f64>,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let handles = Rc::new(LoopHandles {
		view: Rc::new(RefCell::new(GraphView::new(
			overrides,
			Default::default(),
			Default::default(),
		))),
		raf_id: Rc::new(Cell::new(None)),
		animate: Rc::new(RefCell::new(None)),
		resize_cb: Rc::new(RefCell::new(None)),
	});

	let handles_init = handles.clone();
	Effect::new(move |_| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();
		let Some(window) = web_sys::window() else {
			return;
		};
		if handles_init.view.borrow().is_mounted() {
			return;
		}

		let (w, h) = fit_canvas(&canvas, fullscreen, (width, height));

		let ctx: CanvasRenderingContext2d = match canvas
			.get_context("2d")
			.ok()
			.flatten()
			.and_then(|c| c.dyn_into().ok())
		{
			Some(ctx) => ctx,
			None => {
				warn!("naumu-graph: canvas has no 2d context");
				return;
			}
		};

		{
			let mut view = handles_init.view.borrow_mut();
			view.mount(w, h);
			view.replace(&data.get_untracked());
		}

		// Parent-sized canvases can change with the window too.
		let (view_resize, canvas_resize) = (handles_init.view.clone(), canvas.clone());
		*handles_init.resize_cb.borrow_mut() = Some(Closure::new(move || {
			let (nw, nh) = fit_canvas(&canvas_resize, fullscreen, (width, height));
			view_resize.borrow_mut().resize(nw, nh);
		}));
		if let Some(ref cb) = *handles_init.resize_cb.borrow() {
			let _ = window.add_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
		}

		let (view_anim, animate_inner, raf_inner) = (
			handles_init.view.clone(),
			handles_init.animate.clone(),
			handles_init.raf_id.clone(),
		);
		*handles_init.animate.borrow_mut() = Some(Closure::new(move || {
			{
				let mut view = view_anim.borrow_mut();
				if !view.is_mounted() {
					return;
				}
				view.frame();
				view.render(&mut CanvasSurface::new(&ctx));
			}
			if let (Some(window), Some(cb)) = (web_sys::window(), &*animate_inner.borrow()) {
				raf_inner.set(window.request_animation_frame(cb.as_ref().unchecked_ref()).ok());
			}
		}));
		if let Some(ref cb) = *handles_init.animate.borrow() {
			handles_init
				.raf_id
				.set(window.request_animation_frame(cb.as_ref().unchecked_ref()).ok());
		}
	});

	// Every later graph is a full replace.
	let view_data = handles.view.clone();
	Effect::new(move |prev: Option<()>| {
		let graph = data.get();
		if prev.is_some() {
			view_data.borrow_mut().replace(&graph);
		}
	});

	let teardown = StoredValue::new_local(handles.clone());
	on_cleanup(move || {
		teardown.try_with_value(|h| h.release());
	});

	let view_md = handles.view.clone();
	let on_mousedown = move |ev: MouseEvent| {
		if let Some((x, y)) = local_point(canvas_ref, ev.client_x(), ev.client_y()) {
			view_md.borrow_mut().pointer_down(x, y);
		}
	};

	let view_mm = handles.view.clone();
	let on_mousemove = move |ev: MouseEvent| {
		if let Some((x, y)) = local_point(canvas_ref, ev.client_x(), ev.client_y()) {
			view_mm.borrow_mut().pointer_move(x, y);
		}
	};

	let view_mu = handles.view.clone();
	let on_mouseup = move |_: MouseEvent| view_mu.borrow_mut().pointer_up();

	let view_ml = handles.view.clone();
	let on_mouseleave = move |_: MouseEvent| view_ml.borrow_mut().pointer_leave();

	let view_wh = handles.view.clone();
	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		if let Some((x, y)) = local_point(canvas_ref, ev.client_x(), ev.client_y()) {
			view_wh.borrow_mut().wheel(x, y, ev.delta_y());
		}
	};

	let view_ts = handles.view.clone();
	let on_touchstart = move |ev: TouchEvent| {
		if touch_on_form_control(&ev) {
			return;
		}
		ev.prevent_default();
		let touches = ev.touches();
		let mut view = view_ts.borrow_mut();
		match (touches.get(0), touches.get(1)) {
			(Some(a), Some(b)) => view.pinch_start(touch_distance(&a, &b)),
			(Some(a), None) => {
				if let Some((x, y)) = local_point(canvas_ref, a.client_x(), a.client_y()) {
					view.pointer_down(x, y);
					view.pointer_move(x, y);
				}
			}
			_ => {}
		}
	};

	let view_tm = handles.view.clone();
	let on_touchmove = move |ev: TouchEvent| {
		if touch_on_form_control(&ev) {
			return;
		}
		ev.prevent_default();
		let touches = ev.touches();
		let mut view = view_tm.borrow_mut();
		match (touches.get(0), touches.get(1)) {
			(Some(a), Some(b)) => {
				let (mx, my) = (
					(a.client_x() + b.client_x()) / 2,
					(a.client_y() + b.client_y()) / 2,
				);
				if let Some((cx, cy)) = local_point(canvas_ref, mx, my) {
					view.pinch_move(touch_distance(&a, &b), cx, cy);
				}
			}
			(Some(a), None) => {
				if let Some((x, y)) = local_point(canvas_ref, a.client_x(), a.client_y()) {
					view.pointer_move(x, y);
				}
			}
			_ => {}
		}
	};

	let view_te = handles.view.clone();
	let on_touchend = move |ev: TouchEvent| {
		if touch_on_form_control(&ev) {
			return;
		}
		if ev.touches().length() == 0 {
			// Touch has no hover, so the tooltip goes too.
			view_te.borrow_mut().pointer_leave();
		}
	};

	let view_tc = handles.view.clone();
	let on_touchcancel = move |_: TouchEvent| view_tc.borrow_mut().pointer_leave();

	view! {
		<canvas
			node_ref=canvas_ref
			class="force-graph-canvas"
			on:mousedown=on_mousedown
			on:mousemove=on_mousemove
			on:mouseup=on_mouseup
			on:mouseleave=on_mouseleave
			on:wheel=on_wheel
			on:touchstart=on_touchstart
			on:touchmove=on_touchmove
			on:touchend=on_touchend
			on:touchcancel=on_touchcancel
			style="display: block; cursor: grab; touch-action: none;"
		/>
	}
}
