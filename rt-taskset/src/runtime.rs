/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Wall-clock runner.
//!
//! Every periodic task becomes one tokio task looping on
//! `wait_until(next_release)` followed by `execute`.  Bodies are synchronous
//! and run to completion; the only suspension point is the wait.  On a
//! current-thread runtime this gives the same run-to-completion semantics as
//! the kernel the task set is modelled on, with tokio's timer queue standing
//! in for the tick interrupt.
//!
//! An extra idle loop yields behind every ready task and then fires
//! [`on_idle`](crate::probe::InstrumentationHook::on_idle) once per tick in
//! which it gets to run.

use std::sync::Arc;

use tokio::task::{JoinError, JoinSet};
use tracing::{debug, info};

use crate::clock::{MonotonicClock, Tick, TickClock};
use crate::config::InputEvent;
use crate::io::SimulatedGpio;
use crate::system::SystemContext;
use crate::task::PeriodicTask;

pub struct RealtimeRunner {
    clock: MonotonicClock,
    context: Arc<SystemContext>,
    tasks: Vec<PeriodicTask>,
    stimulus: Option<(Arc<SimulatedGpio>, Vec<InputEvent>)>,
}

impl RealtimeRunner {
    /// `context.clock` must be (a copy of) `clock`.
    pub fn new(
        clock: MonotonicClock,
        context: Arc<SystemContext>,
        tasks: Vec<PeriodicTask>,
    ) -> Self {
        Self {
            clock,
            context,
            tasks,
            stimulus: None,
        }
    }

    /// Apply `events` to `gpio` when the clock reaches them.
    pub fn with_stimulus(mut self, gpio: Arc<SimulatedGpio>, events: Vec<InputEvent>) -> Self {
        self.stimulus = Some((gpio, events));
        self
    }

    /// Run every task until its next release would be at or after `horizon`,
    /// or forever when `horizon` is `None`.
    ///
    /// Dropping the returned future aborts all task loops.  Returns the total
    /// number of releases served.
    ///
    /// # Errors
    /// A [`JoinError`] if a task body panicked.
    pub async fn run(self, horizon: Option<Tick>) -> Result<u64, JoinError> {
        let horizon = horizon.unwrap_or(Tick::MAX);
        let task_count = self.tasks.len();
        let mut set = JoinSet::new();

        if let Some((gpio, events)) = self.stimulus {
            let clock = self.clock;
            set.spawn(async move {
                for event in events.into_iter().take_while(|e| e.at < horizon) {
                    clock.wait_until(event.at).await;
                    gpio.set(event.pin, event.level);
                    debug!(pin = %event.pin, level = ?event.level, "stimulus applied");
                }
                0
            });
        }

        let context = Arc::clone(&self.context);
        let clock = self.clock;
        set.spawn(async move {
            while clock.now() < horizon {
                tokio::task::yield_now().await;
                context.probe.on_idle();
                clock.wait_until(clock.now().saturating_add(1)).await;
            }
            0
        });

        for mut task in self.tasks {
            task.start(&self.context);
            let context = Arc::clone(&self.context);
            let clock = self.clock;
            set.spawn(async move {
                while task.next_release() < horizon {
                    clock.wait_until(task.next_release()).await;
                    task.execute(&context);
                }
                task.releases()
            });
        }

        info!(tasks = task_count, horizon, "task set started");

        let mut served = 0;
        while let Some(joined) = set.join_next().await {
            served += joined?;
        }
        Ok(served)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::bodies::{Announcer, DrainToSink, EdgeMonitor};
    use crate::channel::MessageChannel;
    use crate::config::TaskSetConfig;
    use crate::io::{Level, MemorySink, PinId};
    use crate::monitor::DeadlineMonitor;
    use crate::probe::{GpioProbe, NoProbe};
    use crate::system::{Peripherals, TaskSet, WorkloadMode};
    use crate::task::{TaskBody, TaskId, TaskSpec};

    fn runner(clock: MonotonicClock, tasks: Vec<(TaskSpec, Box<dyn TaskBody>)>) -> RealtimeRunner {
        let specs: Vec<TaskSpec> = tasks.iter().map(|(s, _)| s.clone()).collect();
        let context = Arc::new(SystemContext::new(
            Arc::new(clock),
            MessageChannel::new(10).unwrap(),
            DeadlineMonitor::for_tasks(&specs),
            Arc::new(NoProbe),
        ));
        let tasks = tasks
            .into_iter()
            .enumerate()
            .map(|(i, (spec, body))| PeriodicTask::new(TaskId::new(i), spec, body))
            .collect();
        RealtimeRunner::new(clock, context, tasks)
    }

    #[tokio::test(start_paused = true)]
    async fn one_payload_reaches_the_sink_per_announcer_period() {
        let clock = MonotonicClock::start(Duration::from_millis(1)).unwrap();
        let sink = MemorySink::new();
        let runner = runner(
            clock,
            vec![
                (
                    TaskSpec::new("announcer", 100, 2),
                    Box::new(Announcer::new("Periodic MSG!\n")),
                ),
                (
                    TaskSpec::new("drain", 20, 2),
                    Box::new(DrainToSink::new(Box::new(sink.clone()))),
                ),
            ],
        );

        let served = runner.run(Some(100)).await.unwrap();
        assert_eq!(served, 6);
        assert_eq!(sink.writes(), vec!["Periodic MSG!\n"]);
    }

    #[tokio::test(start_paused = true)]
    async fn stimulus_edges_are_observed_at_the_next_release() {
        let clock = MonotonicClock::start(Duration::from_millis(1)).unwrap();
        let gpio = Arc::new(SimulatedGpio::new());
        let button = PinId::new(1, 0);
        let runner = runner(
            clock,
            vec![(
                TaskSpec::new("button", 50, 2),
                Box::new(EdgeMonitor::new(gpio.clone(), button, "Button 1")),
            )],
        )
        .with_stimulus(
            gpio.clone(),
            vec![InputEvent {
                at: 75,
                pin: button,
                level: Level::High,
            }],
        );
        let context = Arc::clone(&runner.context);

        runner.run(Some(150)).await.unwrap();

        let message = context.channel.try_receive().unwrap();
        assert_eq!(message.text, "Rising Edge Button 1\n");
        assert_eq!(message.sent_at, 100);
        assert!(context.channel.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn default_task_set_runs_one_hyperperiod_without_misses() {
        let clock = MonotonicClock::start(Duration::from_millis(1)).unwrap();
        let gpio = Arc::new(SimulatedGpio::new());
        let sink = MemorySink::new();
        let set = TaskSet::build(
            &TaskSetConfig::default_config(),
            Arc::new(clock),
            Peripherals {
                inputs: gpio,
                sink: Box::new(sink.clone()),
                probe: Arc::new(NoProbe),
                workload: WorkloadMode::Busy,
            },
        )
        .unwrap();
        let (context, tasks) = set.into_parts();

        let served = RealtimeRunner::new(clock, Arc::clone(&context), tasks)
            .run(Some(100))
            .await
            .unwrap();

        assert_eq!(served, 2 + 2 + 1 + 5 + 10 + 1);
        assert_eq!(sink.writes(), vec!["Periodic MSG!\n"]);
        // Paused time does not advance while bodies spin.
        assert_eq!(context.monitor.snapshot().total_misses(), 0);
        assert_eq!(context.clock.now(), 100);
    }

    #[tokio::test(start_paused = true)]
    async fn idle_pin_pulses_between_releases() {
        let clock = MonotonicClock::start(Duration::from_millis(1)).unwrap();
        let gpio = Arc::new(SimulatedGpio::new());
        let idle = PinId::new(0, 0);
        let specs = vec![TaskSpec::new("announcer", 10, 2)];
        let context = Arc::new(SystemContext::new(
            Arc::new(clock),
            MessageChannel::new(1).unwrap(),
            DeadlineMonitor::for_tasks(&specs),
            Arc::new(GpioProbe::new(gpio.clone()).with_idle_pin(idle)),
        ));
        let tasks = vec![PeriodicTask::new(
            TaskId::new(0),
            specs[0].clone(),
            Box::new(Announcer::new("x")),
        )];

        RealtimeRunner::new(clock, context, tasks)
            .run(Some(30))
            .await
            .unwrap();

        let writes = gpio.write_count(idle);
        assert!(writes >= 2, "idle pin never pulsed");
        assert_eq!(writes % 2, 0, "every pulse returns the pin low");
        assert_eq!(gpio.level(idle), Level::Low);
    }
}
