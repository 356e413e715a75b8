use soundscape_core::{Scheduler, Task, TaskHandle};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys as web;

/// `setTimeout`-backed scheduler.
///
/// A cancelled task's closure is never released by the browser; playback
/// schedules a handful per take so the leak stays small.
pub struct TimeoutScheduler {
    window: web::Window,
}

impl TimeoutScheduler {
    pub fn new(window: web::Window) -> Self {
        Self { window }
    }
}

impl Scheduler for TimeoutScheduler {
    fn schedule_at(&mut self, delay_ms: f64, task: Task) -> Option<TaskHandle> {
        let callback = Closure::once_into_js(move || task());
        let timeout = delay_ms.max(0.0).round() as i32;
        match self
            .window
            .set_timeout_with_callback_and_timeout_and_arguments_0(
                callback.unchecked_ref(),
                timeout,
            ) {
            Ok(id) => Some(TaskHandle(id as u32 as u64)),
            Err(e) => {
                log::error!("[timers] setTimeout failed: {:?}", e);
                None
            }
        }
    }

    fn cancel(&mut self, handle: TaskHandle) {
        self.window.clear_timeout_with_handle(handle.0 as i32);
    }
}
