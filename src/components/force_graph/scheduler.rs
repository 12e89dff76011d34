//! Cancellable per-frame scheduling for the simulation loop.
//!
//! The loop never stops on convergence: as long as there are nodes, every
//! fired frame schedules the next one. [`TickLoop`] holds the pending handle
//! so the loop can be cancelled when the node set empties or the owner is
//! dropped.

use std::cell::RefCell;
use std::rc::Rc;

use log::debug;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::Closure;

/// Something that can run a callback on the next display frame.
pub trait FrameScheduler {
	/// Identifies a pending request so it can be cancelled.
	type Handle;

	/// Requests one frame. `None` when no frame could be scheduled.
	fn request_frame(&mut self) -> Option<Self::Handle>;

	/// Revokes a previously requested frame.
	fn cancel_frame(&mut self, handle: Self::Handle);
}

/// Owns at most one pending frame request.
pub struct TickLoop<S: FrameScheduler> {
	scheduler: S,
	pending: Option<S::Handle>,
}

impl<S: FrameScheduler> TickLoop<S> {
	/// Idle loop over `scheduler`.
	pub fn new(scheduler: S) -> Self {
		Self {
			scheduler,
			pending: None,
		}
	}

	/// The underlying scheduler.
	pub fn scheduler(&self) -> &S {
		&self.scheduler
	}

	/// True while a frame is pending.
	pub fn is_running(&self) -> bool {
		self.pending.is_some()
	}

	/// Starts the loop when `active` and not already running; cancels it otherwise.
	pub fn sync(&mut self, active: bool) {
		if active {
			if self.pending.is_none() {
				self.pending = self.scheduler.request_frame();
				if self.pending.is_some() {
					debug!("tick loop: started");
				}
			}
		} else {
			self.cancel();
		}
	}

	/// Consumes the pending request when its frame fires. Returns false for
	/// frames that were cancelled before they fired.
	pub fn fire(&mut self) -> bool {
		self.pending.take().is_some()
	}

	/// Revokes the pending frame, if any.
	pub fn cancel(&mut self) {
		if let Some(handle) = self.pending.take() {
			self.scheduler.cancel_frame(handle);
			debug!("tick loop: cancelled");
		}
	}
}

impl<S: FrameScheduler> Drop for TickLoop<S> {
	fn drop(&mut self) {
		self.cancel();
	}
}

/// Frame callback shared between the scheduler and the code that installs it.
pub type FrameCallback = Rc<RefCell<Option<Closure<dyn FnMut()>>>>;

/// Schedules frames with `window.requestAnimationFrame`.
pub struct AnimationFrameScheduler {
	callback: FrameCallback,
}

impl AnimationFrameScheduler {
	/// The callback slot starts empty; install the closure before the first request.
	pub fn new(callback: FrameCallback) -> Self {
		Self { callback }
	}
}

impl FrameScheduler for AnimationFrameScheduler {
	type Handle = i32;

	fn request_frame(&mut self) -> Option<i32> {
		let window = web_sys::window()?;
		let callback = self.callback.borrow();
		let callback = callback.as_ref()?;
		window
			.request_animation_frame(callback.as_ref().unchecked_ref())
			.ok()
	}

	fn cancel_frame(&mut self, handle: i32) {
		if let Some(window) = web_sys::window() {
			let _ = window.cancel_animation_frame(handle);
		}
	}
}

/// Scheduler for headless hosts: frames fire only when the host says so.
#[derive(Debug, Default)]
pub struct ManualScheduler {
	next: u64,
	pending: Option<u64>,
	requested: usize,
	cancelled: usize,
}

impl ManualScheduler {
	/// The outstanding request, if any.
	pub fn pending(&self) -> Option<u64> {
		self.pending
	}

	/// Frames requested so far.
	pub fn requested(&self) -> usize {
		self.requested
	}

	/// Frames cancelled so far.
	pub fn cancelled(&self) -> usize {
		self.cancelled
	}
}

impl FrameScheduler for ManualScheduler {
	type Handle = u64;

	fn request_frame(&mut self) -> Option<u64> {
		self.next += 1;
		self.requested += 1;
		self.pending = Some(self.next);
		Some(self.next)
	}

	fn cancel_frame(&mut self, handle: u64) {
		if self.pending == Some(handle) {
			self.pending = None;
		}
		self.cancelled += 1;
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn sync_starts_once_and_cancels() {
		let mut ticker = TickLoop::new(ManualScheduler::default());
		ticker.sync(true);
		ticker.sync(true);
		assert!(ticker.is_running());
		assert_eq!(ticker.scheduler().requested(), 1);

		ticker.sync(false);
		assert!(!ticker.is_running());
		assert_eq!(ticker.scheduler().cancelled(), 1);
		assert_eq!(ticker.scheduler().pending(), None);
	}

	#[test]
	fn fire_consumes_the_request() {
		let mut ticker = TickLoop::new(ManualScheduler::default());
		assert!(!ticker.fire());
		ticker.sync(true);
		assert!(ticker.fire());
		assert!(!ticker.is_running());
		ticker.sync(true);
		assert_eq!(ticker.scheduler().requested(), 2);
	}

	struct Counting(Rc<RefCell<usize>>);

	impl FrameScheduler for Counting {
		type Handle = ();

		fn request_frame(&mut self) -> Option<()> {
			Some(())
		}

		fn cancel_frame(&mut self, _: ()) {
			*self.0.borrow_mut() += 1;
		}
	}

	#[test]
	fn drop_cancels_pending_frame() {
		let cancels = Rc::new(RefCell::new(0));
		{
			let mut ticker = TickLoop::new(Counting(cancels.clone()));
			ticker.sync(true);
		}
		assert_eq!(*cancels.borrow(), 1);

		{
			let _idle = TickLoop::new(Counting(cancels.clone()));
		}
		assert_eq!(*cancels.borrow(), 1);
	}
}
