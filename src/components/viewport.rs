//! Pan/zoom transform and the fit-to-bounds controller used by every view.

use super::geometry::{Easing, Lerp, Point, Transition};

pub const MIN_ZOOM: f64 = 0.1;
pub const MAX_ZOOM: f64 = 10.0;
/// Duration of a fit or view reset, in seconds.
pub const FIT_DURATION: f64 = 0.75;
/// Duration of a zoom button press, in seconds.
pub const ZOOM_DURATION: f64 = 0.3;

/// `screen = graph * k + (x, y)`
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewTransform {
	pub x: f64,
	pub y: f64,
	pub k: f64,
}

impl Default for ViewTransform {
	fn default() -> Self {
		Self::IDENTITY
	}
}

impl ViewTransform {
	pub const IDENTITY: Self = Self { x: 0.0, y: 0.0, k: 1.0 };

	pub fn screen_to_graph(&self, sx: f64, sy: f64) -> Point {
		Point::new((sx - self.x) / self.k, (sy - self.y) / self.k)
	}

	/// Scales by `factor` keeping the screen point `(sx, sy)` fixed.
	pub fn zoomed_at(&self, sx: f64, sy: f64, factor: f64) -> Self {
		let k = (self.k * factor).clamp(MIN_ZOOM, MAX_ZOOM);
		let ratio = k / self.k;
		Self {
			x: sx - (sx - self.x) * ratio,
			y: sy - (sy - self.y) * ratio,
			k,
		}
	}
}

impl Lerp for ViewTransform {
	fn lerp(self, to: Self, t: f64) -> Self {
		Self {
			x: self.x.lerp(to.x, t),
			y: self.y.lerp(to.y, t),
			k: self.k.lerp(to.k, t),
		}
	}
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FitOptions {
	pub padding: f64,
	pub max_scale: f64,
}

impl Default for FitOptions {
	fn default() -> Self {
		Self {
			padding: 40.0,
			max_scale: 2.0,
		}
	}
}

/// Computes the transform that frames `points` inside a `width` × `height`
/// viewport. Returns `None` for an empty set.
///
/// A bounding box with zero width or height keeps scale 1 and only centers it.
pub fn fit_to_bounds(
	points: impl IntoIterator<Item = Point>,
	width: f64,
	height: f64,
	options: FitOptions,
) -> Option<ViewTransform> {
	let mut points = points.into_iter();
	let first = points.next()?;
	let (mut min, mut max) = (first, first);
	for p in points {
		min.x = min.x.min(p.x);
		min.y = min.y.min(p.y);
		max.x = max.x.max(p.x);
		max.y = max.y.max(p.y);
	}

	let (bounds_w, bounds_h) = (max.x - min.x, max.y - min.y);
	let (mid_x, mid_y) = ((min.x + max.x) / 2.0, (min.y + max.y) / 2.0);

	if bounds_w == 0.0 || bounds_h == 0.0 {
		return Some(ViewTransform {
			x: width / 2.0 - mid_x,
			y: height / 2.0 - mid_y,
			k: 1.0,
		});
	}

	let scale_x = (width - options.padding * 2.0) / bounds_w;
	let scale_y = (height - options.padding * 2.0) / bounds_h;
	let k = scale_x.min(scale_y).min(options.max_scale);

	Some(ViewTransform {
		x: width / 2.0 - k * mid_x,
		y: height / 2.0 - k * mid_y,
		k,
	})
}

/// Owns the live transform of one canvas and eases it toward new targets.
#[derive(Clone, Debug)]
pub struct Viewport {
	pub width: f64,
	pub height: f64,
	pub options: FitOptions,
	transform: ViewTransform,
	transition: Option<Transition<ViewTransform>>,
}

impl Viewport {
	pub fn new(width: f64, height: f64) -> Self {
		Self {
			width,
			height,
			options: FitOptions::default(),
			transform: ViewTransform::IDENTITY,
			transition: None,
		}
	}

	pub fn transform(&self) -> ViewTransform {
		self.transform
	}

	pub fn is_animating(&self) -> bool {
		self.transition.is_some()
	}

	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
	}

	/// Eases toward a transform framing `points`. No-op on an empty set.
	pub fn fit(&mut self, points: impl IntoIterator<Item = Point>) {
		if let Some(target) = fit_to_bounds(points, self.width, self.height, self.options) {
			self.animate_to(target, FIT_DURATION);
		}
	}

	pub fn reset(&mut self) {
		self.animate_to(ViewTransform::IDENTITY, FIT_DURATION);
	}

	/// Zoom button: scales around the viewport center.
	pub fn scale_by(&mut self, factor: f64) {
		let base = self.transition.as_ref().map_or(self.transform, |t| t.target());
		let target = base.zoomed_at(self.width / 2.0, self.height / 2.0, factor);
		self.animate_to(target, ZOOM_DURATION);
	}

	/// Wheel zoom anchored at the pointer; applied immediately.
	pub fn zoom_at(&mut self, sx: f64, sy: f64, factor: f64) {
		self.transition = None;
		self.transform = self.transform.zoomed_at(sx, sy, factor);
	}

	pub fn pan_to(&mut self, x: f64, y: f64) {
		self.transition = None;
		self.transform.x = x;
		self.transform.y = y;
	}

	pub fn screen_to_graph(&self, sx: f64, sy: f64) -> Point {
		self.transform.screen_to_graph(sx, sy)
	}

	/// Advances any running transition; returns true while one is active.
	pub fn advance(&mut self, dt: f64) -> bool {
		let Some(transition) = self.transition.as_mut() else {
			return false;
		};
		self.transform = transition.advance(dt);
		if transition.is_finished() {
			self.transition = None;
		}
		true
	}

	fn animate_to(&mut self, target: ViewTransform, duration: f64) {
		self.transition = Some(Transition::new(
			self.transform,
			target,
			duration,
			Easing::CubicInOut,
		));
	}
}
