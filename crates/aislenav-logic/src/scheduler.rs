//! Deterministic virtual-time event loop.
//!
//! Stands in for a host's timer and animation-frame queues: single-threaded,
//! cooperative, callbacks run in `(due, seq)` order. Every callback is tagged
//! with the session it was scheduled for, and the simulator drops callbacks
//! whose session is no longer active. Stopping a session therefore never has
//! to reach into the queue. Leftover callbacks fire and do nothing.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::drivers::Millis;
use crate::simulator::{NavigationSimulator, SessionId};

/// What a scheduled callback does when it fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Callback {
    /// Display frame: advance the position driver.
    Frame,
    /// Step ticker period elapsed.
    StepTick,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Scheduled {
    due: Millis,
    seq: u64,
    session: SessionId,
    callback: Callback,
}

impl Ord for Scheduled {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering for min-heap (earliest due, then FIFO)
        other
            .due
            .cmp(&self.due)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for Scheduled {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Source of extra per-frame delay, for irregular frame pacing.
pub type FrameJitter = Box<dyn FnMut() -> Millis>;

pub struct Scheduler {
    now: Millis,
    seq: u64,
    queue: BinaryHeap<Scheduled>,
    frame_interval: Millis,
    jitter: Option<FrameJitter>,
    fired: u64,
    discarded: u64,
}

impl Scheduler {
    pub fn new(frame_interval: Millis, start: Millis) -> Self {
        Self {
            now: start,
            seq: 0,
            queue: BinaryHeap::new(),
            frame_interval: frame_interval.max(1),
            jitter: None,
            fired: 0,
            discarded: 0,
        }
    }

    /// Add `jitter()` milliseconds to every frame interval.
    pub fn with_jitter(mut self, jitter: impl FnMut() -> Millis + 'static) -> Self {
        self.jitter = Some(Box::new(jitter));
        self
    }

    pub fn now(&self) -> Millis {
        self.now
    }

    /// Callbacks waiting in the queue, stale ones included.
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Callbacks that ran against their live session.
    pub fn fired(&self) -> u64 {
        self.fired
    }

    /// Callbacks that fired after their session had ended.
    pub fn discarded(&self) -> u64 {
        self.discarded
    }

    /// Queue the first frame and the first step tick for `session`.
    pub fn attach(&mut self, sim: &NavigationSimulator, session: SessionId) {
        let first_frame = self.now + self.next_frame_gap();
        self.push(first_frame, session, Callback::Frame);
        if let Some(due) = sim.next_step_due(session) {
            self.push(due, session, Callback::StepTick);
        }
    }

    /// Fire every callback due at or before `until`, then advance the clock
    /// to `until`.
    pub fn run_until(&mut self, sim: &mut NavigationSimulator, until: Millis) {
        while let Some(next) = self.queue.peek().copied() {
            if next.due > until {
                break;
            }
            self.queue.pop();
            self.now = self.now.max(next.due);
            self.dispatch(sim, next);
        }
        self.now = self.now.max(until);
    }

    /// Run until `session` ends on its own. Returns the time it ended, or
    /// `None` if the queue drained or `limit` passed first.
    pub fn run_to_completion(
        &mut self,
        sim: &mut NavigationSimulator,
        session: SessionId,
        limit: Millis,
    ) -> Option<Millis> {
        while sim.active_session() == Some(session) {
            let next = self.queue.peek().map(|s| s.due)?;
            if next > limit {
                return None;
            }
            self.run_until(sim, next);
        }
        Some(self.now)
    }

    fn dispatch(&mut self, sim: &mut NavigationSimulator, item: Scheduled) {
        let applied = match item.callback {
            Callback::Frame => sim.on_frame(item.session, self.now),
            Callback::StepTick => sim.on_step_tick(item.session, self.now),
        };
        if !applied {
            self.discarded += 1;
            return;
        }
        self.fired += 1;

        match item.callback {
            Callback::Frame => {
                if sim.wants_frames(item.session) {
                    let due = self.now + self.next_frame_gap();
                    self.push(due, item.session, Callback::Frame);
                }
            }
            Callback::StepTick => {
                if let Some(due) = sim.next_step_due(item.session) {
                    self.push(due, item.session, Callback::StepTick);
                }
            }
        }
    }

    fn next_frame_gap(&mut self) -> Millis {
        let extra = self.jitter.as_mut().map_or(0, |j| j());
        self.frame_interval + extra
    }

    fn push(&mut self, due: Millis, session: SessionId, callback: Callback) {
        self.seq += 1;
        self.queue.push(Scheduled {
            due,
            seq: self.seq,
            session,
            callback,
        });
    }
}
