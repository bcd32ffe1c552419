//! Paramline Engine
//! ================
//! Shadow timeline engine for scheduled parameter automation. The host's
//! automation surface is write-only: it accepts scheduled changes and
//! reports only the current sample value. This crate keeps an ordered
//! event timeline per parameter so that the value at any instant, past or
//! future, can be evaluated, while mirroring every committed event back to
//! the host surface.

pub mod binding;
pub mod curve;
pub mod error;
pub mod scheduler;
pub mod sink;
pub mod time;
pub mod timeline;

pub use binding::{PropertyBinding, DEFAULT_EPSILON};
pub use curve::{CurveKind, MIN_EXP_VALUE};
pub use error::AutomationError;
pub use scheduler::{AutomationPhase, ParamId, ParameterSpec, Scheduler, DEFAULT_DURATION};
pub use sink::{CommandLog, NullSink, ParameterSink, SinkCommand};
pub use time::{Clock, ManualClock, SystemClock};
pub use timeline::{AutomationEvent, Timeline, Truncation};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn note_off_damping_round_trip() {
        // The flow every instrument wrapper relies on: ramp a gain up, let
        // a note-off decay take over mid-ramp, then damp by truncating and
        // stepping to silence.
        let mut sched = Scheduler::new(CommandLog::new(), ManualClock::new(0.0));
        let gain = ParamId(1);
        sched
            .register_parameter(ParameterSpec::new(gain, "gain", 0.0))
            .unwrap();

        sched.schedule(gain, 0.02, 1.0, CurveKind::Linear, 0.02).unwrap();
        sched
            .schedule(gain, 0.5, 0.0, CurveKind::TargetDecay, 0.2)
            .unwrap();

        let mid_decay = sched.value_at(gain, 0.7).unwrap();
        assert!(mid_decay > 0.0);
        assert!(mid_decay < 1.0);

        sched.truncate(gain, 0.7).unwrap();
        let frozen = sched.value_at(gain, 0.7).unwrap();
        assert!((frozen - mid_decay).abs() < 1e-12);

        sched.clock().set(0.7);
        sched.automate(gain, 0.0, CurveKind::Step, 0.0).unwrap();
        assert_eq!(sched.value_at(gain, 0.71).unwrap(), 0.0);
    }

    #[test]
    fn events_survive_serde_round_trip() {
        let event = AutomationEvent::new(1.5, 0.25, CurveKind::TargetDecay).with_duration(0.08);
        let json = serde_json::to_string(&event).unwrap();
        let back: AutomationEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(event, back);
    }
}
