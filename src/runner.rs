//! Main loop: logic and draw run as two independent `calloop` timers.

use std::time::{Duration, Instant};

use calloop::timer::{TimeoutAction, Timer};
use calloop::EventLoop;

use crate::app::App;
use crate::error::Result;
use crate::surface::Surface;

/// State owned by the event loop while the app runs.
struct Runner<S> {
    app: App,
    surface: S,
    last_logic: Instant,
}

fn interval(hz: u32) -> Duration {
    Duration::from_secs_f64(1.0 / f64::from(hz.max(1)))
}

impl App {
    /// Run the app until [`App::quit`] is called.
    ///
    /// Logic ticks at `target_fps` with a fixed step, or at `refresh_rate`
    /// with the measured delta when `target_fps` is 0. Frames are drawn to
    /// `surface` at `refresh_rate`.
    pub fn start<S: Surface + 'static>(mut self, surface: S) -> Result<()> {
        // The embedding application may already have installed a logger.
        let _ = env_logger::try_init();

        self.begin();

        let variable_rate = self.config().is_variable_rate();
        let refresh = interval(self.config().refresh_rate);
        let logic = if variable_rate {
            refresh
        } else {
            interval(self.config().target_fps)
        };
        let fixed_dt = logic.as_secs_f32();

        let mut event_loop: EventLoop<Runner<S>> = EventLoop::try_new()?;
        let handle = event_loop.handle();

        handle
            .insert_source(Timer::from_duration(logic), move |_, _, runner| {
                let now = Instant::now();
                let dt = if variable_rate {
                    now.saturating_duration_since(runner.last_logic).as_secs_f32()
                } else {
                    fixed_dt
                };
                runner.last_logic = now;
                runner.app.update(dt);
                TimeoutAction::ToDuration(logic)
            })
            .map_err(|e| e.error)?;

        handle
            .insert_source(Timer::from_duration(refresh), move |_, _, runner| {
                runner.app.draw(&mut runner.surface);
                TimeoutAction::ToDuration(refresh)
            })
            .map_err(|e| e.error)?;

        log::info!(
            "starting main loop: logic {} ({:?}), draw every {:?}",
            if variable_rate { "variable-rate" } else { "fixed-rate" },
            logic,
            refresh
        );

        let signal = event_loop.get_signal();
        let mut runner = Runner {
            app: self,
            surface,
            last_logic: Instant::now(),
        };
        event_loop.run(None, &mut runner, |runner| {
            if runner.app.quit_requested() {
                signal.stop();
            }
        })?;

        log::info!("main loop stopped");
        Ok(())
    }
}
