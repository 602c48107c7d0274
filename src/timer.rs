use lazy_static::lazy_static;
use log::info;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tauri::{AppHandle, Emitter};
use tokio::time::{interval, Duration, MissedTickBehavior};

pub const DEFAULT_DURATION_SECONDS: u64 = 15 * 60;

// Global timer state plus the handle of the tick task driving it. The tick
// task is always aborted before the timer leaves the running state, so a
// paused or reset timer never leaks periodic work.
lazy_static! {
    static ref FOCUS_TIMER: Arc<Mutex<FocusTimer>> = Arc::new(Mutex::new(FocusTimer::new()));
    static ref TICK_TASK: Arc<Mutex<Option<tauri::async_runtime::JoinHandle<()>>>> =
        Arc::new(Mutex::new(None));
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TimerState {
    pub duration_seconds: u64,
    pub remaining_seconds: u64,
    pub running: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Tick arrived while not running; nothing changed.
    Idle,
    /// Normal decrement, countdown continues.
    Running,
    /// Countdown hit zero on this tick; reported exactly once.
    Finished,
}

/// Countdown over a writing session. Invariant: `remaining_seconds` never
/// exceeds `duration_seconds`, and only ticks move it while running.
pub struct FocusTimer {
    duration_seconds: u64,
    remaining_seconds: u64,
    running: bool,
}

impl FocusTimer {
    pub fn new() -> Self {
        Self {
            duration_seconds: DEFAULT_DURATION_SECONDS,
            remaining_seconds: DEFAULT_DURATION_SECONDS,
            running: false,
        }
    }

    /// Change the session length. No-op while the countdown is running;
    /// otherwise the remaining time resets to the new duration.
    pub fn set_duration(&mut self, minutes: u64) -> bool {
        if self.running {
            return false;
        }
        // `minutes` comes straight from the webview; don't let an absurd
        // value overflow the seconds conversion.
        self.duration_seconds = minutes.saturating_mul(60);
        self.remaining_seconds = self.duration_seconds;
        true
    }

    /// Start only makes sense with time left on the clock.
    pub fn start(&mut self) -> bool {
        if self.remaining_seconds == 0 {
            return false;
        }
        self.running = true;
        true
    }

    pub fn pause(&mut self) {
        self.running = false;
    }

    pub fn reset(&mut self) {
        self.running = false;
        self.remaining_seconds = self.duration_seconds;
    }

    pub fn tick(&mut self) -> TickOutcome {
        if !self.running {
            return TickOutcome::Idle;
        }
        self.remaining_seconds = self.remaining_seconds.saturating_sub(1);
        if self.remaining_seconds == 0 {
            self.running = false;
            TickOutcome::Finished
        } else {
            TickOutcome::Running
        }
    }

    pub fn state(&self) -> TimerState {
        TimerState {
            duration_seconds: self.duration_seconds,
            remaining_seconds: self.remaining_seconds,
            running: self.running,
        }
    }

    /// Completion fraction for the circular progress ring.
    pub fn progress(&self) -> f64 {
        if self.duration_seconds == 0 {
            return 0.0;
        }
        self.remaining_seconds as f64 / self.duration_seconds as f64
    }

    /// `MM:SS` label for the remaining time.
    pub fn format_remaining(&self) -> String {
        let minutes = self.remaining_seconds / 60;
        let seconds = self.remaining_seconds % 60;
        format!("{:02}:{:02}", minutes, seconds)
    }
}

impl Default for FocusTimer {
    fn default() -> Self {
        Self::new()
    }
}

/// Deterministically cancel the tick task if one is alive.
fn stop_tick_task() {
    if let Some(handle) = TICK_TASK.lock().take() {
        handle.abort();
    }
}

/// Spawn the 1-second tick driver. Each tick advances the countdown and
/// pushes the new state to the webview; on completion the task emits the
/// one-time finished notification and exits.
fn spawn_tick_task(app: AppHandle) {
    stop_tick_task();

    let handle = tauri::async_runtime::spawn(async move {
        let mut ticker = interval(Duration::from_secs(1));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        // An interval's first tick fires immediately; swallow it so the
        // countdown moves one second per elapsed second.
        ticker.tick().await;

        loop {
            ticker.tick().await;
            let (state, outcome) = {
                let mut timer = FOCUS_TIMER.lock();
                let outcome = timer.tick();
                (timer.state(), outcome)
            };

            let _ = app.emit("timer-tick", &state);

            match outcome {
                TickOutcome::Running => {}
                TickOutcome::Finished => {
                    info!("⏰ Focus timer finished");
                    let _ = app.emit("timer-finished", &state);
                    break;
                }
                TickOutcome::Idle => break,
            }
        }
    });

    *TICK_TASK.lock() = Some(handle);
}

// Tauri commands for the frontend

#[tauri::command]
pub async fn set_timer_duration(minutes: u64) -> Result<TimerState, String> {
    let mut timer = FOCUS_TIMER.lock();
    if timer.set_duration(minutes) {
        info!("⏱️ Focus timer duration set to {} minutes", minutes);
    }
    Ok(timer.state())
}

#[tauri::command]
pub async fn start_focus_timer(app: AppHandle) -> Result<TimerState, String> {
    let state = {
        let mut timer = FOCUS_TIMER.lock();
        if !timer.start() {
            return Err("Timer has no time remaining".to_string());
        }
        timer.state()
    };

    info!("▶️ Focus timer started ({}s remaining)", state.remaining_seconds);
    spawn_tick_task(app);
    Ok(state)
}

#[tauri::command]
pub async fn pause_focus_timer() -> Result<TimerState, String> {
    stop_tick_task();
    let mut timer = FOCUS_TIMER.lock();
    timer.pause();
    info!("⏸️ Focus timer paused");
    Ok(timer.state())
}

#[tauri::command]
pub async fn reset_focus_timer() -> Result<TimerState, String> {
    stop_tick_task();
    let mut timer = FOCUS_TIMER.lock();
    timer.reset();
    info!("⏹️ Focus timer reset");
    Ok(timer.state())
}

#[tauri::command]
pub async fn get_focus_timer_state() -> Result<TimerState, String> {
    Ok(FOCUS_TIMER.lock().state())
}
