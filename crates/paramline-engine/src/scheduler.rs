use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::curve::{CurveKind, MIN_EXP_VALUE};
use crate::error::AutomationError;
use crate::sink::{ParameterSink, SinkCommand};
use crate::time::Clock;
use crate::timeline::{AutomationEvent, Timeline, Truncation};

/// Fallback ramp duration, in seconds, when a parameter spec does not name
/// one. Short enough to read as immediate, long enough to avoid zipper
/// noise on the host side.
pub const DEFAULT_DURATION: f64 = 0.008;

/// Opaque handle for one automated parameter within a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ParamId(pub u64);

/// Registration-time description of a parameter: its initial value plus the
/// curve and duration used when a caller schedules without overrides.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParameterSpec {
    pub id: ParamId,
    pub name: String,
    pub initial: f64,
    pub default_curve: CurveKind,
    pub default_duration: f64,
}

impl ParameterSpec {
    pub fn new(id: ParamId, name: impl Into<String>, initial: f64) -> Self {
        Self {
            id,
            name: name.into(),
            initial,
            default_curve: CurveKind::Linear,
            default_duration: DEFAULT_DURATION,
        }
    }

    pub fn with_default_curve(mut self, curve: CurveKind) -> Self {
        self.default_curve = curve;
        self
    }

    pub fn with_default_duration(mut self, duration: f64) -> Self {
        self.default_duration = duration;
        self
    }
}

/// Where a parameter sits in its automation lifecycle at a point in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutomationPhase {
    /// No pending automation; the value is steady.
    Idle,
    /// Future events remain on the timeline.
    Scheduled,
    /// A decay tail is active; it never terminates on its own.
    Decaying,
}

struct ParamState {
    spec: ParameterSpec,
    timeline: Timeline,
}

/// The public automation surface: one shadow timeline per registered
/// parameter, every committed event mirrored to the host's sink.
///
/// All mutation goes through `&mut self`; the engine carries no internal
/// locking and is owned by the session thread.
pub struct Scheduler<S: ParameterSink, C: Clock> {
    sink: S,
    clock: C,
    params: HashMap<ParamId, ParamState>,
}

impl<S: ParameterSink, C: Clock> Scheduler<S, C> {
    pub fn new(sink: S, clock: C) -> Self {
        Self {
            sink,
            clock,
            params: HashMap::new(),
        }
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn register_parameter(&mut self, spec: ParameterSpec) -> Result<(), AutomationError> {
        if self.params.contains_key(&spec.id) {
            return Err(AutomationError::DuplicateParameter(spec.id));
        }
        tracing::debug!(id = spec.id.0, name = %spec.name, initial = spec.initial, "registered parameter");
        let timeline = Timeline::new(spec.initial);
        self.params.insert(spec.id, ParamState { spec, timeline });
        Ok(())
    }

    pub fn spec(&self, param: ParamId) -> Result<&ParameterSpec, AutomationError> {
        self.state(param).map(|state| &state.spec)
    }

    pub fn timeline(&self, param: ParamId) -> Result<&Timeline, AutomationError> {
        self.state(param).map(|state| &state.timeline)
    }

    /// Schedule `value` to be reached at `time` along `curve`. `duration`
    /// is the decay time constant for TargetDecay and a validity gate for
    /// the ramp curves: a non-positive duration downgrades them to Step,
    /// since no ramp is meaningful over zero time.
    ///
    /// On any rejection the timeline is untouched and no sink traffic is
    /// emitted.
    pub fn schedule(
        &mut self,
        param: ParamId,
        time: f64,
        value: f64,
        curve: CurveKind,
        duration: f64,
    ) -> Result<(), AutomationError> {
        let state = self
            .params
            .get_mut(&param)
            .ok_or(AutomationError::UnknownParameter(param))?;

        if curve == CurveKind::Exponential && value < 0.0 {
            return Err(AutomationError::InvalidExponentialTarget(value));
        }
        let event = match curve {
            CurveKind::TargetDecay => {
                if duration <= 0.0 {
                    return Err(AutomationError::InvalidDuration(duration));
                }
                AutomationEvent::new(time, value, curve).with_duration(duration)
            }
            CurveKind::Linear | CurveKind::Exponential if duration <= 0.0 => {
                AutomationEvent::new(time, value, CurveKind::Step)
            }
            _ => AutomationEvent::new(time, value, curve),
        };

        tracing::trace!(id = param.0, time, value, curve = ?event.curve, "schedule");
        state.timeline.insert(event);
        self.sink.push(param, SinkCommand::CancelFuture { time });
        push_event(&mut self.sink, param, &event);
        Ok(())
    }

    /// Begin a change at the clock's current time. For the ramp curves the
    /// current value is anchored at `now` and the target is reached at
    /// `now + duration`; a step lands at `now` and a decay starts there
    /// with `duration` as its time constant.
    pub fn automate(
        &mut self,
        param: ParamId,
        value: f64,
        curve: CurveKind,
        duration: f64,
    ) -> Result<(), AutomationError> {
        let now = self.clock.now();
        if curve.is_ramp() && duration > 0.0 {
            if curve == CurveKind::Exponential && value < 0.0 {
                return Err(AutomationError::InvalidExponentialTarget(value));
            }
            let current = self.value_at(param, now)?;
            self.schedule(param, now, current, CurveKind::Step, 0.0)?;
            self.schedule(param, now + duration, value, curve, duration)
        } else {
            self.schedule(param, now, value, curve, duration)
        }
    }

    /// `automate` with the parameter's registered default curve and
    /// duration.
    pub fn schedule_default(&mut self, param: ParamId, value: f64) -> Result<(), AutomationError> {
        let spec = self.spec(param)?;
        let (curve, duration) = (spec.default_curve, spec.default_duration);
        self.automate(param, value, curve, duration)
    }

    /// Value the parameter holds at `time`, including times between and
    /// beyond scheduled events.
    pub fn value_at(&self, param: ParamId, time: f64) -> Result<f64, AutomationError> {
        self.state(param).map(|state| state.timeline.value_at(time))
    }

    pub fn value_now(&self, param: ParamId) -> Result<f64, AutomationError> {
        self.value_at(param, self.clock.now())
    }

    /// Value the parameter settles on once all pending automation resolves.
    pub fn resting_value(&self, param: ParamId) -> Result<f64, AutomationError> {
        self.state(param).map(|state| state.timeline.resting_value())
    }

    /// Cut the schedule at `time`. No-op when nothing is pending past that
    /// instant; otherwise the sink receives the matching cancel, plus the
    /// synthetic continuation event when a segment was in progress.
    pub fn truncate(&mut self, param: ParamId, time: f64) -> Result<(), AutomationError> {
        let state = self
            .params
            .get_mut(&param)
            .ok_or(AutomationError::UnknownParameter(param))?;

        match state.timeline.truncate_at(time) {
            Truncation::Unchanged => {}
            Truncation::Dropped => {
                tracing::trace!(id = param.0, time, "truncate dropped pending events");
                self.sink.push(param, SinkCommand::CancelFuture { time });
            }
            Truncation::Continued(event) => {
                tracing::trace!(id = param.0, time, value = event.value, "truncate mid-segment");
                self.sink.push(param, SinkCommand::CancelFuture { time });
                push_event(&mut self.sink, param, &event);
            }
        }
        Ok(())
    }

    pub fn truncate_now(&mut self, param: ParamId) -> Result<(), AutomationError> {
        let now = self.clock.now();
        self.truncate(param, now)
    }

    /// Lifecycle phase of the parameter as of `time`.
    pub fn phase(&self, param: ParamId, time: f64) -> Result<AutomationPhase, AutomationError> {
        let state = self.state(param)?;
        if state.timeline.scheduled_after(time) {
            Ok(AutomationPhase::Scheduled)
        } else if state.timeline.decaying_at(time) {
            Ok(AutomationPhase::Decaying)
        } else {
            Ok(AutomationPhase::Idle)
        }
    }

    fn state(&self, param: ParamId) -> Result<&ParamState, AutomationError> {
        self.params
            .get(&param)
            .ok_or(AutomationError::UnknownParameter(param))
    }
}

/// Mirror one committed event to the sink. An exponential target below the
/// representable floor becomes a floored ramp followed by an exact set at
/// the ramp end, because the host surface cannot ramp exponentially to
/// zero.
fn push_event<S: ParameterSink>(sink: &mut S, param: ParamId, event: &AutomationEvent) {
    match event.curve {
        CurveKind::Step => sink.push(
            param,
            SinkCommand::SetImmediate {
                value: event.value,
                time: event.time,
            },
        ),
        CurveKind::Linear => sink.push(
            param,
            SinkCommand::RampLinear {
                value: event.value,
                time: event.time,
            },
        ),
        CurveKind::Exponential => {
            if event.value < MIN_EXP_VALUE {
                sink.push(
                    param,
                    SinkCommand::RampExponential {
                        value: MIN_EXP_VALUE,
                        time: event.time,
                    },
                );
                sink.push(
                    param,
                    SinkCommand::SetImmediate {
                        value: event.value,
                        time: event.time,
                    },
                );
            } else {
                sink.push(
                    param,
                    SinkCommand::RampExponential {
                        value: event.value,
                        time: event.time,
                    },
                );
            }
        }
        CurveKind::TargetDecay => sink.push(
            param,
            SinkCommand::DecayToward {
                value: event.value,
                time: event.time,
                time_constant: event.duration,
            },
        ),
    }
}
