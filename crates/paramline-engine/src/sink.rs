use serde::{Deserialize, Serialize};

use crate::scheduler::ParamId;

/// Primitive automation instruction understood by the host's parameter
/// surface. The scheduler emits exactly the sequence of these that
/// reproduces the shadow timeline's committed state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum SinkCommand {
    /// Discard everything the host has scheduled at or after `time`.
    CancelFuture { time: f64 },
    SetImmediate { value: f64, time: f64 },
    RampLinear { value: f64, time: f64 },
    RampExponential { value: f64, time: f64 },
    DecayToward {
        value: f64,
        time: f64,
        time_constant: f64,
    },
}

/// Host-provided automation surface. Implementations must apply commands
/// in the order pushed; the scheduler relies on `CancelFuture` preceding
/// each new point.
pub trait ParameterSink {
    fn push(&mut self, param: ParamId, command: SinkCommand);
}

/// Sink that discards every command, for hosts that only want the shadow
/// timeline.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl ParameterSink for NullSink {
    fn push(&mut self, _param: ParamId, _command: SinkCommand) {}
}

/// Sink that records every command, in order.
#[derive(Debug, Default, Clone)]
pub struct CommandLog {
    commands: Vec<(ParamId, SinkCommand)>,
}

impl CommandLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> &[(ParamId, SinkCommand)] {
        &self.commands
    }

    pub fn clear(&mut self) {
        self.commands.clear();
    }
}

impl ParameterSink for CommandLog {
    fn push(&mut self, param: ParamId, command: SinkCommand) {
        self.commands.push((param, command));
    }
}
