/// Deferred work run later on the same thread.
pub type Task = Box<dyn FnOnce()>;

/// Identifies a scheduled task so it can be cancelled.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TaskHandle(pub u64);

/// Timer facility used by the player.
pub trait Scheduler {
    /// Run `task` once, `delay_ms` milliseconds from now.
    ///
    /// `None` means the timer could not be set and `task` will never run.
    fn schedule_at(&mut self, delay_ms: f64, task: Task) -> Option<TaskHandle>;

    /// Drop a pending task. Unknown or already-fired handles are ignored.
    fn cancel(&mut self, handle: TaskHandle);
}

struct Pending {
    handle: TaskHandle,
    due_ms: f64,
    task: Task,
}

/// Scheduler driven by an explicit virtual clock.
///
/// Tasks fire in due-time order, ties in scheduling order. Tests advance the
/// clock by hand; the native player advances it from the wall clock.
#[derive(Default)]
pub struct ManualScheduler {
    now_ms: f64,
    next_id: u64,
    pending: Vec<Pending>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now_ms(&self) -> f64 {
        self.now_ms
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Due time of the earliest pending task.
    pub fn next_due_ms(&self) -> Option<f64> {
        self.pending.iter().map(|p| p.due_ms).reduce(f64::min)
    }

    /// Move the clock to `target_ms`, firing every task due on the way.
    /// Returns how many tasks ran.
    pub fn advance_to(&mut self, target_ms: f64) -> usize {
        let mut fired = 0;
        while let Some(idx) = self.next_index_due_by(target_ms) {
            let Pending { due_ms, task, .. } = self.pending.remove(idx);
            self.now_ms = self.now_ms.max(due_ms);
            task();
            fired += 1;
        }
        self.now_ms = self.now_ms.max(target_ms);
        fired
    }

    pub fn advance_by(&mut self, delta_ms: f64) -> usize {
        self.advance_to(self.now_ms + delta_ms)
    }

    /// Fire everything that is pending.
    pub fn run_until_idle(&mut self) -> usize {
        let last = self
            .pending
            .iter()
            .map(|p| p.due_ms)
            .fold(self.now_ms, f64::max);
        self.advance_to(last)
    }

    // `pending` stays in scheduling order, so the first minimum wins ties.
    fn next_index_due_by(&self, target_ms: f64) -> Option<usize> {
        let mut best: Option<(usize, f64)> = None;
        for (i, p) in self.pending.iter().enumerate() {
            if p.due_ms > target_ms {
                continue;
            }
            match best {
                Some((_, due)) if p.due_ms >= due => {}
                _ => best = Some((i, p.due_ms)),
            }
        }
        best.map(|(i, _)| i)
    }
}

impl Scheduler for ManualScheduler {
    fn schedule_at(&mut self, delay_ms: f64, task: Task) -> Option<TaskHandle> {
        let handle = TaskHandle(self.next_id);
        self.next_id += 1;
        self.pending.push(Pending {
            handle,
            due_ms: self.now_ms + delay_ms.max(0.0),
            task,
        });
        Some(handle)
    }

    fn cancel(&mut self, handle: TaskHandle) {
        self.pending.retain(|p| p.handle != handle);
    }
}
