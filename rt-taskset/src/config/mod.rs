//! Task-set configuration loading.
//!
//! The expected YAML structure is:
//! ```yaml
//! tick_us: 1000            # length of one tick (default 1000 µs)
//! channel_capacity: 10     # message slots (default 10)
//! probe:
//!   port: 0
//!   idle_pin: 0
//! tasks:
//!   - name: button_1
//!     period: 50
//!     priority: 2
//!     deadline: 50         # optional, defaults to period
//!     probe_pin: 1         # optional
//!     body:
//!       kind: edge_monitor
//!       input: { port: 1, pin: 0 }
//!       label: "Button 1"
//!   - name: load_1
//!     period: 10
//!     priority: 2
//!     cost: 5              # optional estimated execution ticks
//!     body:
//!       kind: load
//!       iterations: 33220
//!       # spin_us: 5000      # optional: spin for a wall-clock duration instead
//! stimulus:                # optional scripted input changes
//!   - { at: 120, port: 1, pin: 0, level: high }
//! ```
//!
//! Parsing only checks structure.  Semantic checks (periods, names, single
//! consumer) live in [`TaskSetConfig::validate`] and produce a
//! [`SetupError`].

use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::{debug, info};

use crate::channel::DEFAULT_CHANNEL_CAPACITY;
use crate::clock::Tick;
use crate::error::SetupError;
use crate::io::{Level, PinId};
use crate::task::TaskSpec;

/// Default tick length in microseconds.
pub const DEFAULT_TICK_US: u64 = 1_000;

/// Priority shared by every task of the default set.
pub const DEFAULT_PRIORITY: u8 = 2;

// ── Private YAML deserialization types ────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct TaskSetFile {
    #[serde(default = "default_tick_us")]
    tick_us: u64,
    #[serde(default = "default_channel_capacity")]
    channel_capacity: usize,
    #[serde(default)]
    probe: ProbeConfig,
    #[serde(default)]
    tasks: Vec<TaskEntry>,
    #[serde(default)]
    stimulus: Vec<StimulusEntry>,
}

#[derive(Debug, Deserialize)]
struct TaskEntry {
    name: String,
    period: Tick,
    #[serde(default = "default_priority")]
    priority: u8,
    deadline: Option<Tick>,
    probe_pin: Option<u8>,
    cost: Option<Tick>,
    body: BodyConfig,
}

#[derive(Debug, Deserialize)]
struct StimulusEntry {
    at: Tick,
    port: u8,
    pin: u8,
    level: Level,
}

fn default_tick_us() -> u64 {
    DEFAULT_TICK_US
}

fn default_channel_capacity() -> usize {
    DEFAULT_CHANNEL_CAPACITY
}

fn default_priority() -> u8 {
    DEFAULT_PRIORITY
}

// ── Public data structures ────────────────────────────────────────────────────

/// What a task does on each release.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BodyConfig {
    /// Report level changes of `input`, naming it `label`.
    EdgeMonitor { input: PinId, label: String },
    /// Send `text` once per release.
    Announcer { text: String },
    /// Drain the channel to the output sink.
    Drain,
    /// Burn CPU for `iterations` loop turns, or for `spin_us` microseconds of
    /// wall-clock time when given.
    Load {
        #[serde(default)]
        iterations: u32,
        #[serde(default)]
        spin_us: Option<u64>,
    },
}

/// One configured task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskConfig {
    pub spec: TaskSpec,
    /// Trace-probe pin on the probe port, if any.
    pub probe_pin: Option<u8>,
    /// Estimated execution time in ticks; drives the utilisation check and
    /// the simulated cost of load tasks.
    pub cost: Option<Tick>,
    pub body: BodyConfig,
}

/// Trace-probe wiring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub struct ProbeConfig {
    #[serde(default)]
    pub port: u8,
    pub idle_pin: Option<u8>,
}

impl ProbeConfig {
    pub fn idle(&self) -> Option<PinId> {
        self.idle_pin.map(|pin| PinId::new(self.port, pin))
    }
}

/// A scripted change of an input level at an absolute tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputEvent {
    pub at: Tick,
    pub pin: PinId,
    pub level: Level,
}

/// Complete description of a task set.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskSetConfig {
    pub tick: Duration,
    pub channel_capacity: usize,
    pub probe: ProbeConfig,
    pub tasks: Vec<TaskConfig>,
    /// Sorted by `at`.
    pub stimulus: Vec<InputEvent>,
}

impl TaskSetConfig {
    /// The six-task application: two button monitors, a periodic announcer,
    /// the output drain and two synthetic loads, all at priority 2.
    pub fn default_config() -> Self {
        let task = |name: &str, period: Tick, probe: u8, cost: Option<Tick>, body| TaskConfig {
            spec: TaskSpec::new(name, period, DEFAULT_PRIORITY),
            probe_pin: Some(probe),
            cost,
            body,
        };

        Self {
            tick: Duration::from_micros(DEFAULT_TICK_US),
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
            probe: ProbeConfig {
                port: 0,
                idle_pin: Some(0),
            },
            tasks: vec![
                task(
                    "button_1_monitor",
                    50,
                    1,
                    None,
                    BodyConfig::EdgeMonitor {
                        input: PinId::new(1, 0),
                        label: "Button 1".into(),
                    },
                ),
                task(
                    "button_2_monitor",
                    50,
                    2,
                    None,
                    BodyConfig::EdgeMonitor {
                        input: PinId::new(1, 1),
                        label: "Button 2".into(),
                    },
                ),
                task(
                    "periodic_transmitter",
                    100,
                    3,
                    None,
                    BodyConfig::Announcer {
                        text: "Periodic MSG!\n".into(),
                    },
                ),
                task("uart_receiver", 20, 4, None, BodyConfig::Drain),
                task(
                    "load_1_simulation",
                    10,
                    5,
                    Some(5),
                    BodyConfig::Load {
                        iterations: 33_220,
                        spin_us: None,
                    },
                ),
                task(
                    "load_2_simulation",
                    100,
                    6,
                    Some(12),
                    BodyConfig::Load {
                        iterations: 79_740,
                        spin_us: None,
                    },
                ),
            ],
            stimulus: Vec::new(),
        }
    }

    /// Parse a configuration file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or is not valid YAML of
    /// the expected shape.  Semantic validation is separate.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        info!("Loading task-set configuration from: {}", path.display());

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Cannot open configuration file: {}", path.display()))?;

        Self::from_yaml_str(&content)
            .with_context(|| format!("Failed to parse YAML file: {}", path.display()))
    }

    /// Parse configuration text.
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let file: TaskSetFile = serde_yaml::from_str(content)?;

        let tasks: Vec<TaskConfig> = file
            .tasks
            .into_iter()
            .map(|entry| {
                let mut spec = TaskSpec::new(entry.name, entry.period, entry.priority);
                if let Some(deadline) = entry.deadline {
                    spec = spec.with_deadline(deadline);
                }
                debug!(
                    "  Task: {} | period: {} | deadline: {} | priority: {}",
                    spec.name, spec.period, spec.deadline, spec.priority
                );
                TaskConfig {
                    spec,
                    probe_pin: entry.probe_pin,
                    cost: entry.cost,
                    body: entry.body,
                }
            })
            .collect();

        let mut stimulus: Vec<InputEvent> = file
            .stimulus
            .into_iter()
            .map(|s| InputEvent {
                at: s.at,
                pin: PinId::new(s.port, s.pin),
                level: s.level,
            })
            .collect();
        stimulus.sort_by_key(|e| e.at);

        info!(
            tasks = tasks.len(),
            tick_us = file.tick_us,
            channel_capacity = file.channel_capacity,
            stimulus_events = stimulus.len(),
            "Task-set configuration loaded"
        );

        Ok(Self {
            tick: Duration::from_micros(file.tick_us),
            channel_capacity: file.channel_capacity,
            probe: file.probe,
            tasks,
            stimulus,
        })
    }

    /// Check everything the task set needs before it can start.
    ///
    /// # Errors
    /// The first [`SetupError`] found, in task order.
    pub fn validate(&self) -> Result<(), SetupError> {
        if self.tasks.is_empty() {
            return Err(SetupError::NoTasks);
        }
        if self.tick.is_zero() {
            return Err(SetupError::ZeroTickQuantum);
        }
        if self.channel_capacity == 0 {
            return Err(SetupError::ZeroCapacity);
        }

        let mut names = HashSet::new();
        let mut consumer: Option<&str> = None;
        for task in &self.tasks {
            task.spec.validate()?;
            if !names.insert(task.spec.name.as_str()) {
                return Err(SetupError::DuplicateTask(task.spec.name.clone()));
            }
            if task.body == BodyConfig::Drain {
                if let Some(first) = consumer {
                    return Err(SetupError::MultipleConsumers {
                        first: first.to_owned(),
                        second: task.spec.name.clone(),
                    });
                }
                consumer = Some(task.spec.name.as_str());
            }
        }
        Ok(())
    }

    /// Specs of all tasks, in order.
    pub fn specs(&self) -> Vec<TaskSpec> {
        self.tasks.iter().map(|t| t.spec.clone()).collect()
    }
}

impl Default for TaskSetConfig {
    fn default() -> Self {
        Self::default_config()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn yaml_tempfile(content: &str) -> NamedTempFile {
        let mut f = NamedTempFile::new().unwrap();
        f.write_all(content.as_bytes()).unwrap();
        f
    }

    const FULL_YAML: &str = r#"
tick_us: 500
channel_capacity: 4
probe:
  port: 0
  idle_pin: 0
tasks:
  - name: button
    period: 50
    priority: 3
    probe_pin: 1
    body:
      kind: edge_monitor
      input: { port: 1, pin: 0 }
      label: "Button 1"
  - name: heartbeat
    period: 100
    deadline: 80
    body:
      kind: announcer
      text: "Periodic MSG!\n"
  - name: uart
    period: 20
    body:
      kind: drain
  - name: load
    period: 10
    cost: 5
    body:
      kind: load
      iterations: 1000
stimulus:
  - { at: 300, port: 1, pin: 0, level: low }
  - { at: 120, port: 1, pin: 0, level: high }
"#;

    // ── default_config ────────────────────────────────────────────────────────

    #[test]
    fn default_config_matches_the_six_task_application() {
        let cfg = TaskSetConfig::default_config();
        assert_eq!(cfg.tasks.len(), 6);
        assert_eq!(cfg.channel_capacity, 10);

        let periods: Vec<Tick> = cfg.tasks.iter().map(|t| t.spec.period).collect();
        assert_eq!(periods, vec![50, 50, 100, 20, 10, 100]);
        let deadlines: Vec<Tick> = cfg.tasks.iter().map(|t| t.spec.deadline).collect();
        assert_eq!(deadlines, periods);
        assert!(cfg.tasks.iter().all(|t| t.spec.priority == DEFAULT_PRIORITY));
        assert!(cfg.validate().is_ok());
    }

    // ── load_from_file ────────────────────────────────────────────────────────

    #[test]
    fn load_full_yaml() {
        let f = yaml_tempfile(FULL_YAML);
        let cfg = TaskSetConfig::load_from_file(f.path()).unwrap();

        assert_eq!(cfg.tick, Duration::from_micros(500));
        assert_eq!(cfg.channel_capacity, 4);
        assert_eq!(cfg.probe.idle(), Some(PinId::new(0, 0)));
        assert_eq!(cfg.tasks.len(), 4);

        let button = &cfg.tasks[0];
        assert_eq!(button.spec.priority, 3);
        assert_eq!(button.spec.deadline, 50);
        assert_eq!(button.probe_pin, Some(1));
        assert_eq!(
            button.body,
            BodyConfig::EdgeMonitor {
                input: PinId::new(1, 0),
                label: "Button 1".into()
            }
        );

        let heartbeat = &cfg.tasks[1];
        assert_eq!(heartbeat.spec.deadline, 80);
        assert_eq!(heartbeat.spec.priority, DEFAULT_PRIORITY);
        assert_eq!(
            heartbeat.body,
            BodyConfig::Announcer {
                text: "Periodic MSG!\n".into()
            }
        );

        assert_eq!(cfg.tasks[2].body, BodyConfig::Drain);
        assert_eq!(cfg.tasks[3].cost, Some(5));
        assert_eq!(
            cfg.tasks[3].body,
            BodyConfig::Load {
                iterations: 1000,
                spin_us: None
            }
        );
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn load_can_spin_for_a_duration_instead_of_counting() {
        let yaml = r#"
tasks:
  - name: spinner
    period: 10
    body:
      kind: load
      spin_us: 2500
"#;
        let cfg = TaskSetConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(
            cfg.tasks[0].body,
            BodyConfig::Load {
                iterations: 0,
                spin_us: Some(2500)
            }
        );
    }

    #[test]
    fn stimulus_is_sorted_by_tick() {
        let cfg = TaskSetConfig::from_yaml_str(FULL_YAML).unwrap();
        let ats: Vec<Tick> = cfg.stimulus.iter().map(|e| e.at).collect();
        assert_eq!(ats, vec![120, 300]);
        assert_eq!(cfg.stimulus[0].level, Level::High);
    }

    #[test]
    fn optional_top_level_fields_use_defaults() {
        let yaml = r#"
tasks:
  - name: only
    period: 10
    body: { kind: drain }
"#;
        let cfg = TaskSetConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(cfg.tick, Duration::from_micros(DEFAULT_TICK_US));
        assert_eq!(cfg.channel_capacity, DEFAULT_CHANNEL_CAPACITY);
        assert_eq!(cfg.probe.idle(), None);
        assert!(cfg.stimulus.is_empty());
    }

    #[test]
    fn missing_file_returns_error() {
        assert!(TaskSetConfig::load_from_file(Path::new("/nonexistent/taskset.yaml")).is_err());
    }

    #[test]
    fn malformed_yaml_returns_error() {
        let f = yaml_tempfile("this is: not: valid: yaml: content:::");
        assert!(TaskSetConfig::load_from_file(f.path()).is_err());
    }

    #[test]
    fn unknown_body_kind_returns_error() {
        let yaml = "tasks:\n  - name: x\n    period: 10\n    body: { kind: teleport }\n";
        assert!(TaskSetConfig::from_yaml_str(yaml).is_err());
    }

    // ── validate ──────────────────────────────────────────────────────────────

    #[test]
    fn empty_task_list_is_invalid() {
        let cfg = TaskSetConfig::from_yaml_str("tasks: []\n").unwrap();
        assert_eq!(cfg.validate().unwrap_err(), SetupError::NoTasks);
    }

    #[test]
    fn zero_period_is_invalid() {
        let mut cfg = TaskSetConfig::default_config();
        cfg.tasks[2].spec.period = 0;
        assert_eq!(
            cfg.validate().unwrap_err(),
            SetupError::ZeroPeriod {
                task: "periodic_transmitter".into()
            }
        );
    }

    #[test]
    fn zero_capacity_is_invalid() {
        let mut cfg = TaskSetConfig::default_config();
        cfg.channel_capacity = 0;
        assert_eq!(cfg.validate().unwrap_err(), SetupError::ZeroCapacity);
    }

    #[test]
    fn duplicate_names_are_invalid() {
        let mut cfg = TaskSetConfig::default_config();
        cfg.tasks[1].spec.name = cfg.tasks[0].spec.name.clone();
        assert_eq!(
            cfg.validate().unwrap_err(),
            SetupError::DuplicateTask("button_1_monitor".into())
        );
    }

    #[test]
    fn second_drain_is_invalid() {
        let mut cfg = TaskSetConfig::default_config();
        cfg.tasks[5].body = BodyConfig::Drain;
        assert_eq!(
            cfg.validate().unwrap_err(),
            SetupError::MultipleConsumers {
                first: "uart_receiver".into(),
                second: "load_2_simulation".into()
            }
        );
    }

    #[test]
    fn shipped_config_describes_the_default_application() {
        let shipped =
            TaskSetConfig::from_yaml_str(include_str!("../../config/taskset.yaml")).unwrap();
        let builtin = TaskSetConfig::default_config();
        assert_eq!(shipped.tasks, builtin.tasks);
        assert_eq!(shipped.probe, builtin.probe);
        assert_eq!(shipped.tick, builtin.tick);
        assert_eq!(shipped.stimulus.len(), 4);
        assert!(shipped.validate().is_ok());
    }
}
