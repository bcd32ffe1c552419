use serde::{Deserialize, Serialize};

use crate::curve::{decay_value, exponential_value, linear_value, CurveKind};

/// One committed automation point: the parameter reaches `value` at `time`
/// along `curve`. `duration` is the decay time constant for TargetDecay and
/// zero for every other kind.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AutomationEvent {
    pub time: f64,
    pub value: f64,
    pub curve: CurveKind,
    pub duration: f64,
}

impl AutomationEvent {
    pub fn new(time: f64, value: f64, curve: CurveKind) -> Self {
        Self {
            time,
            value,
            curve,
            duration: 0.0,
        }
    }

    pub fn with_duration(mut self, duration: f64) -> Self {
        self.duration = duration;
        self
    }
}

/// Result of cutting a timeline's tail.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Truncation {
    /// Nothing was scheduled at or after the cut point.
    Unchanged,
    /// Pending events were dropped; the value at the cut point is unchanged.
    Dropped,
    /// A segment was in progress; the tail was replaced by this synthetic
    /// continuation event so the value stays continuous at the cut.
    Continued(AutomationEvent),
}

/// Ordered event history shadowing one automated parameter.
///
/// Always holds at least one event: a Step at time zero carrying the
/// parameter's initial value. Event times are non-decreasing and each
/// `(time, curve)` pair appears at most once; events sharing a time keep
/// insertion order (a decay can be anchored at the same instant as the
/// step that precedes it).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "RawTimeline")]
pub struct Timeline {
    events: Vec<AutomationEvent>,
}

/// Unvalidated wire form; `TryFrom` enforces the non-empty and ordering
/// invariants the rest of the crate indexes on.
#[derive(Deserialize)]
struct RawTimeline {
    events: Vec<AutomationEvent>,
}

impl TryFrom<RawTimeline> for Timeline {
    type Error = String;

    fn try_from(raw: RawTimeline) -> Result<Self, Self::Error> {
        if raw.events.is_empty() {
            return Err("timeline must hold at least one event".to_string());
        }
        if raw.events.windows(2).any(|pair| pair[0].time > pair[1].time) {
            return Err("timeline events must be ordered by time".to_string());
        }
        Ok(Self { events: raw.events })
    }
}

impl Timeline {
    pub fn new(initial_value: f64) -> Self {
        Self {
            events: vec![AutomationEvent::new(0.0, initial_value, CurveKind::Step)],
        }
    }

    pub fn events(&self) -> &[AutomationEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    fn last(&self) -> &AutomationEvent {
        // Invariant: the timeline is never empty.
        &self.events[self.events.len() - 1]
    }

    /// Value the timeline settles on once all ramps complete (the decay
    /// target for an open decay tail).
    pub fn resting_value(&self) -> f64 {
        self.last().value
    }

    /// True while automation is still pending or moving at `time`.
    pub fn scheduled_after(&self, time: f64) -> bool {
        self.last().time > time
    }

    /// True when the tail of the timeline is a decay that has begun by
    /// `time`; such a tail never finishes on its own.
    pub fn decaying_at(&self, time: f64) -> bool {
        let last = self.last();
        last.curve == CurveKind::TargetDecay && time >= last.time
    }

    /// Commit an event. Edits cluster near "now", so the position scan
    /// walks from the end. An existing event with the same time and curve
    /// is replaced in place (last write wins); everything after the
    /// committed position is discarded, mirroring the sink's own
    /// schedule-cancels-the-future contract.
    pub fn insert(&mut self, event: AutomationEvent) {
        let mut position = self.events.len();
        while position > 0 && self.events[position - 1].time > event.time {
            position -= 1;
        }

        // Same-instant events of the same kind collapse to one.
        let mut probe = position;
        while probe > 0 && self.events[probe - 1].time == event.time {
            if self.events[probe - 1].curve == event.curve {
                self.events[probe - 1] = event;
                self.events.truncate(probe);
                return;
            }
            probe -= 1;
        }

        self.events.truncate(position);
        self.events.push(event);
    }

    /// Cut the schedule at `time`, preserving the value the parameter holds
    /// at that instant.
    pub fn truncate_at(&mut self, time: f64) -> Truncation {
        // The time-zero anchor is never cut away.
        let cut = self.events.partition_point(|event| event.time < time).max(1);

        if cut == self.events.len() {
            // Nothing scheduled at or after `time`; only an open decay tail
            // can still be moving.
            if self.decaying_at(time) {
                let value = self.value_at(time);
                self.events
                    .push(AutomationEvent::new(time, value, CurveKind::Step));
                return Truncation::Continued(self.events[self.events.len() - 1]);
            }
            return Truncation::Unchanged;
        }

        // The value at the cut comes from what survives it, never from the
        // events being cancelled: a ramp in progress resolves against its
        // own segment, everything else against the surviving prefix.
        let governing = self.events[cut].curve;
        let synthetic = if governing.is_ramp() {
            // Re-schedule the in-progress ramp as a continuation of the
            // same curve kind, so forward queries see a seamless extension.
            let value = value_in(&self.events[..=cut], time);
            Some(AutomationEvent::new(time, value, governing))
        } else {
            // A pending step or not-yet-started decay is dropped outright.
            // If the surviving prefix ends in a decay that has already
            // begun, freeze it at its instantaneous value.
            let prefix = &self.events[..cut];
            let last = prefix[prefix.len() - 1];
            if last.curve == CurveKind::TargetDecay && time >= last.time {
                let value = value_in(prefix, time);
                Some(AutomationEvent::new(time, value, CurveKind::Step))
            } else {
                None
            }
        };

        // Cutting the tail down to an event identical to its replacement
        // is a no-op; report it as one so no redundant sink traffic flows.
        if cut + 1 == self.events.len() && synthetic == Some(self.events[cut]) {
            return Truncation::Unchanged;
        }

        self.events.truncate(cut);
        match synthetic {
            Some(event) => {
                self.events.push(event);
                Truncation::Continued(event)
            }
            None => Truncation::Dropped,
        }
    }

    /// Value the parameter holds at `time`.
    pub fn value_at(&self, time: f64) -> f64 {
        value_in(&self.events, time)
    }
}

/// Piecewise evaluation over a sorted event slice. The curve of the later
/// event governs each segment; a decay's starting value is the value the
/// earlier events held at the instant the decay begins, resolved
/// recursively.
fn value_in(events: &[AutomationEvent], time: f64) -> f64 {
    let Some(first) = events.first() else {
        return 0.0;
    };
    if time < first.time {
        return first.value;
    }

    // Index of the last event at or before `time`, scanning from the end.
    let mut n = events.len();
    while n > 0 && events[n - 1].time > time {
        n -= 1;
    }
    let e0 = &events[n - 1];

    if let Some(e1) = events.get(n) {
        match e1.curve {
            CurveKind::Linear => {
                return linear_value(e0.time, e0.value, e1.time, e1.value, time);
            }
            CurveKind::Exponential => {
                return exponential_value(e0.time, e0.value, e1.time, e1.value, time);
            }
            // Step and TargetDecay only take effect from their own time;
            // until then the earlier event governs.
            CurveKind::Step | CurveKind::TargetDecay => {}
        }
    }

    match e0.curve {
        CurveKind::TargetDecay => {
            let start = if n > 1 {
                value_in(&events[..n - 1], e0.time)
            } else {
                e0.value
            };
            decay_value(start, e0.value, e0.time, e0.duration, time)
        }
        _ => e0.value,
    }
}
