//! Animation loop state machine and the frame-scheduling seam.
//!
//! The controller is pure bookkeeping: playback state, the step rate, and
//! which scheduled frame is allowed to run next. The host supplies a
//! [`FrameScheduler`] (requestAnimationFrame in a browser, a loop counter in
//! tests) and the viewport drives the actual frame body.

/// Identifier for one scheduled frame callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameId(pub u64);

/// Host hook for frame scheduling.
pub trait FrameScheduler {
    /// Request one callback at the next frame boundary.
    fn schedule(&mut self) -> FrameId;

    /// Cancel a pending callback. Ignored if it already fired.
    fn cancel(&mut self, id: FrameId);
}

/// Playback state of an animation loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Playback {
    #[default]
    Idle,
    Running,
}

/// Frame-loop bookkeeping.
///
/// At most one frame is ever outstanding: a frame only runs when its id
/// matches the recorded pending one while the loop is `Running`, so stale
/// callbacks from before a pause fall through harmlessly.
#[derive(Debug)]
pub struct AnimationController {
    playback: Playback,
    steps_per_frame: u32,
    pending: Option<FrameId>,
}

impl AnimationController {
    pub fn new(steps_per_frame: u32) -> Self {
        Self {
            playback: Playback::Idle,
            steps_per_frame: steps_per_frame.max(1),
            pending: None,
        }
    }

    #[inline]
    pub fn playback(&self) -> Playback {
        self.playback
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        self.playback == Playback::Running
    }

    #[inline]
    pub fn steps_per_frame(&self) -> u32 {
        self.steps_per_frame
    }

    #[inline]
    pub fn pending(&self) -> Option<FrameId> {
        self.pending
    }

    /// Set the generations advanced per frame. Values below 1 are clamped;
    /// takes effect from the next frame.
    pub fn set_steps_per_frame(&mut self, steps: u32) {
        self.steps_per_frame = steps.max(1);
    }

    /// Idle -> Running. Returns `false` when already running, in which case
    /// the caller must not start a second loop.
    pub fn begin(&mut self) -> bool {
        if self.is_running() {
            return false;
        }
        self.playback = Playback::Running;
        true
    }

    /// Running -> Idle. Yields the pending frame, if any, so the caller can
    /// cancel it with the scheduler. No-op when already idle.
    pub fn halt(&mut self) -> Option<FrameId> {
        self.playback = Playback::Idle;
        self.pending.take()
    }

    /// Record the id of the frame just scheduled.
    pub fn scheduled(&mut self, id: FrameId) {
        self.pending = Some(id);
    }

    /// A scheduled callback fired. Returns `true` when it is the pending
    /// frame of a running loop and the frame body should run; anything else
    /// is stale and must be dropped.
    pub fn frame_fired(&mut self, id: FrameId) -> bool {
        if !self.is_running() || self.pending != Some(id) {
            return false;
        }
        self.pending = None;
        true
    }
}

/// Hand-driven scheduler for tests, demos, and hosts that own their loop.
///
/// Hands out sequential ids and records what is pending and what was
/// cancelled; the host decides when a frame fires.
#[derive(Debug, Default)]
pub struct ManualScheduler {
    next: u64,
    pending: Vec<FrameId>,
    cancelled: Vec<FrameId>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ids requested but neither fired nor cancelled.
    pub fn pending(&self) -> &[FrameId] {
        &self.pending
    }

    /// Ids cancelled before they fired.
    pub fn cancelled(&self) -> &[FrameId] {
        &self.cancelled
    }

    /// Pop the oldest pending frame as fired.
    pub fn fire_next(&mut self) -> Option<FrameId> {
        if self.pending.is_empty() {
            None
        } else {
            Some(self.pending.remove(0))
        }
    }
}

impl FrameScheduler for ManualScheduler {
    fn schedule(&mut self) -> FrameId {
        let id = FrameId(self.next);
        self.next += 1;
        self.pending.push(id);
        id
    }

    fn cancel(&mut self, id: FrameId) {
        if let Some(pos) = self.pending.iter().position(|p| *p == id) {
            self.pending.remove(pos);
            self.cancelled.push(id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_begin_from_idle() {
        let mut ctrl = AnimationController::new(1);
        assert!(!ctrl.is_running());
        assert!(ctrl.begin());
        assert!(ctrl.is_running());
    }

    #[test]
    fn test_begin_while_running_refused() {
        let mut ctrl = AnimationController::new(1);
        assert!(ctrl.begin());
        assert!(!ctrl.begin());
        assert!(ctrl.is_running());
    }

    #[test]
    fn test_halt_while_idle_is_noop() {
        let mut ctrl = AnimationController::new(1);
        assert_eq!(ctrl.halt(), None);
        assert!(!ctrl.is_running());
    }

    #[test]
    fn test_halt_yields_pending_frame() {
        let mut ctrl = AnimationController::new(1);
        ctrl.begin();
        ctrl.scheduled(FrameId(7));
        assert_eq!(ctrl.halt(), Some(FrameId(7)));
        assert_eq!(ctrl.pending(), None);
        assert!(!ctrl.is_running());
    }

    #[test]
    fn test_pending_frame_fires_once() {
        let mut ctrl = AnimationController::new(1);
        ctrl.begin();
        ctrl.scheduled(FrameId(3));
        assert!(ctrl.frame_fired(FrameId(3)));
        assert!(!ctrl.frame_fired(FrameId(3)));
    }

    #[test]
    fn test_stale_frame_dropped() {
        let mut ctrl = AnimationController::new(1);
        ctrl.begin();
        ctrl.scheduled(FrameId(3));
        assert!(!ctrl.frame_fired(FrameId(2)));
        assert_eq!(ctrl.pending(), Some(FrameId(3)));
    }

    #[test]
    fn test_frame_after_halt_dropped() {
        let mut ctrl = AnimationController::new(1);
        ctrl.begin();
        ctrl.scheduled(FrameId(5));
        ctrl.halt();
        assert!(!ctrl.frame_fired(FrameId(5)));
    }

    #[test]
    fn test_steps_per_frame_clamped() {
        let mut ctrl = AnimationController::new(0);
        assert_eq!(ctrl.steps_per_frame(), 1);
        ctrl.set_steps_per_frame(0);
        assert_eq!(ctrl.steps_per_frame(), 1);
        ctrl.set_steps_per_frame(9);
        assert_eq!(ctrl.steps_per_frame(), 9);
    }

    #[test]
    fn test_manual_scheduler_orders_frames() {
        let mut sched = ManualScheduler::new();
        let a = sched.schedule();
        let b = sched.schedule();
        assert_eq!(sched.fire_next(), Some(a));
        assert_eq!(sched.fire_next(), Some(b));
        assert_eq!(sched.fire_next(), None);
    }

    #[test]
    fn test_manual_scheduler_cancel() {
        let mut sched = ManualScheduler::new();
        let a = sched.schedule();
        sched.cancel(a);
        assert_eq!(sched.fire_next(), None);
        assert_eq!(sched.cancelled(), &[a]);
        // Cancelling a fired id is a quiet no-op.
        let b = sched.schedule();
        assert_eq!(sched.fire_next(), Some(b));
        sched.cancel(b);
        assert_eq!(sched.cancelled(), &[a]);
    }
}
