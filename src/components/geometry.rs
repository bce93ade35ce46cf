//! Points, easing curves and abortable tweens shared by every canvas.

use std::ops::{Add, Sub};

/// A position in graph space.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
	pub x: f64,
	pub y: f64,
}

impl Point {
	pub const fn new(x: f64, y: f64) -> Self {
		Self { x, y }
	}

	pub fn distance(self, other: Point) -> f64 {
		let (dx, dy) = (self.x - other.x, self.y - other.y);
		(dx * dx + dy * dy).sqrt()
	}
}

impl Add for Point {
	type Output = Point;

	fn add(self, other: Point) -> Point {
		Point::new(self.x + other.x, self.y + other.y)
	}
}

impl Sub for Point {
	type Output = Point;

	fn sub(self, other: Point) -> Point {
		Point::new(self.x - other.x, self.y - other.y)
	}
}

/// A straight line between two points.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Segment {
	pub from: Point,
	pub to: Point,
}

impl Segment {
	pub const fn new(from: Point, to: Point) -> Self {
		Self { from, to }
	}

	/// Shortest distance from `p` to any point on the segment.
	pub fn distance_to(&self, p: Point) -> f64 {
		let (dx, dy) = (self.to.x - self.from.x, self.to.y - self.from.y);
		let len_sq = dx * dx + dy * dy;
		if len_sq < f64::EPSILON {
			return self.from.distance(p);
		}
		let t = (((p.x - self.from.x) * dx + (p.y - self.from.y) * dy) / len_sq).clamp(0.0, 1.0);
		Point::new(self.from.x + t * dx, self.from.y + t * dy).distance(p)
	}
}

pub fn ease_out_cubic(t: f64) -> f64 {
	1.0 - (1.0 - t).powi(3)
}

pub fn ease_in_out_cubic(t: f64) -> f64 {
	if t < 0.5 {
		4.0 * t * t * t
	} else {
		1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Easing {
	Linear,
	CubicOut,
	CubicInOut,
}

impl Easing {
	pub fn apply(self, t: f64) -> f64 {
		let t = t.clamp(0.0, 1.0);
		match self {
			Easing::Linear => t,
			Easing::CubicOut => ease_out_cubic(t),
			Easing::CubicInOut => ease_in_out_cubic(t),
		}
	}
}

/// Values that can be blended for a tween.
pub trait Lerp: Copy {
	fn lerp(self, to: Self, t: f64) -> Self;
}

impl Lerp for f64 {
	fn lerp(self, to: Self, t: f64) -> Self {
		self + (to - self) * t
	}
}

impl Lerp for Point {
	fn lerp(self, to: Self, t: f64) -> Self {
		Point::new(self.x.lerp(to.x, t), self.y.lerp(to.y, t))
	}
}

impl Lerp for Segment {
	fn lerp(self, to: Self, t: f64) -> Self {
		Segment::new(self.from.lerp(to.from, t), self.to.lerp(to.to, t))
	}
}

/// A time-based tween from one value to another.
///
/// Tweens are never queued: starting a new one from [`Transition::value`]
/// replaces the old one, which is how in-flight animations are superseded.
#[derive(Clone, Debug)]
pub struct Transition<T> {
	from: T,
	to: T,
	elapsed: f64,
	duration: f64,
	easing: Easing,
}

impl<T: Lerp> Transition<T> {
	pub fn new(from: T, to: T, duration: f64, easing: Easing) -> Self {
		Self {
			from,
			to,
			elapsed: 0.0,
			duration,
			easing,
		}
	}

	/// Moves the clock forward and returns the current value.
	pub fn advance(&mut self, dt: f64) -> T {
		self.elapsed = (self.elapsed + dt.max(0.0)).min(self.duration);
		self.value()
	}

	pub fn value(&self) -> T {
		if self.is_finished() {
			return self.to;
		}
		self.from.lerp(self.to, self.easing.apply(self.elapsed / self.duration))
	}

	pub fn target(&self) -> T {
		self.to
	}

	pub fn is_finished(&self) -> bool {
		self.duration <= 0.0 || self.elapsed >= self.duration
	}
}
