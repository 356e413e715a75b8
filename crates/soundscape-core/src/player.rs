use crate::constants::FINISH_DELAY_MS;
use crate::scheduler::{Scheduler, TaskHandle};
use crate::sequence::{Event, Sequence};
use std::cell::Cell;
use std::rc::Rc;

/// Called for every event as its trigger time comes up.
pub type Trigger = Rc<dyn Fn(&Event)>;

/// Called once when playback runs to its end (not on `stop`).
pub type OnFinish = Box<dyn FnOnce()>;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PlayOutcome {
    Started { triggers: usize, finishes_at_ms: f64 },
    EmptySequence,
    AlreadyPlaying,
    /// A timer could not be set; nothing is left scheduled.
    SchedulerFailed,
}

/// Replays a sequence against a [`Scheduler`].
///
/// Every playback gets its own `active` flag. Scheduled tasks check it when
/// they fire, so a task that escapes cancellation stays silent after `stop`.
#[derive(Default)]
pub struct Player {
    active: Rc<Cell<bool>>,
    pending: Vec<TaskHandle>,
}

impl Player {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_playing(&self) -> bool {
        self.active.get()
    }

    /// Handles of tasks scheduled by the current playback.
    pub fn pending(&self) -> &[TaskHandle] {
        &self.pending
    }

    pub fn play(
        &mut self,
        sequence: &Sequence,
        scheduler: &mut dyn Scheduler,
        trigger: Trigger,
        on_finish: Option<OnFinish>,
    ) -> PlayOutcome {
        if sequence.is_empty() {
            return PlayOutcome::EmptySequence;
        }
        if self.is_playing() {
            return PlayOutcome::AlreadyPlaying;
        }

        // handles left over from a playback that ran to completion
        self.pending.clear();
        let active = Rc::new(Cell::new(true));
        self.active = Rc::clone(&active);

        for event in sequence {
            let event = *event;
            let active = Rc::clone(&active);
            let trigger = Rc::clone(&trigger);
            let handle = scheduler.schedule_at(
                event.time_offset_ms,
                Box::new(move || {
                    if active.get() {
                        trigger(&event);
                    }
                }),
            );
            let Some(handle) = handle else {
                return self.abort(scheduler);
            };
            self.pending.push(handle);
        }

        let finishes_at_ms = sequence.max_offset_ms() + FINISH_DELAY_MS;
        let finish = scheduler.schedule_at(
            finishes_at_ms,
            Box::new(move || {
                if active.replace(false) {
                    log::info!("[player] finished");
                    if let Some(cb) = on_finish {
                        cb();
                    }
                }
            }),
        );
        let Some(finish) = finish else {
            return self.abort(scheduler);
        };
        self.pending.push(finish);

        log::info!(
            "[player] playing {} events, done at {:.0}ms",
            sequence.len(),
            finishes_at_ms
        );
        PlayOutcome::Started {
            triggers: sequence.len(),
            finishes_at_ms,
        }
    }

    // a partial schedule is unwound so the player never waits on a missing finish
    fn abort(&mut self, scheduler: &mut dyn Scheduler) -> PlayOutcome {
        self.stop(scheduler);
        log::error!("[player] could not schedule playback");
        PlayOutcome::SchedulerFailed
    }

    /// Cancel playback. Returns whether anything was playing.
    pub fn stop(&mut self, scheduler: &mut dyn Scheduler) -> bool {
        let was_playing = self.active.replace(false);
        for handle in self.pending.drain(..) {
            scheduler.cancel(handle);
        }
        if was_playing {
            log::info!("[player] stopped");
        }
        was_playing
    }
}
