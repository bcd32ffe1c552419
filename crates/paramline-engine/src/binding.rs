use crate::curve::CurveKind;
use crate::error::AutomationError;
use crate::scheduler::{AutomationPhase, ParamId, Scheduler};
use crate::sink::ParameterSink;
use crate::time::Clock;

/// Convergence tolerance for the polling tick. A decay tail approaches its
/// target asymptotically, so settlement is a bounded comparison, never an
/// exact one.
pub const DEFAULT_EPSILON: f64 = 1e-6;

/// Callback invoked when the cached value moves: `(old, new)`.
pub type ChangeListener = Box<dyn FnMut(f64, f64)>;

/// Binds a host-visible property to one scheduled parameter.
///
/// Writes schedule automation with the binding's defaults and update the
/// cache immediately, so reads reflect the latest intended value while the
/// automation still runs underneath. The host drives `tick` from its own
/// frame or timer loop to reconcile the cache with the timeline until the
/// value settles.
pub struct PropertyBinding {
    param: ParamId,
    curve: CurveKind,
    duration: f64,
    epsilon: f64,
    cached: f64,
    settled: bool,
    listener: Option<ChangeListener>,
}

impl PropertyBinding {
    /// Bind to a registered parameter, taking the defaults and current
    /// value from its registration spec.
    pub fn bind<S: ParameterSink, C: Clock>(
        scheduler: &Scheduler<S, C>,
        param: ParamId,
    ) -> Result<Self, AutomationError> {
        let spec = scheduler.spec(param)?;
        let (curve, duration) = (spec.default_curve, spec.default_duration);
        Ok(Self {
            param,
            curve,
            duration,
            epsilon: DEFAULT_EPSILON,
            cached: scheduler.value_now(param)?,
            settled: true,
            listener: None,
        })
    }

    pub fn with_defaults(mut self, curve: CurveKind, duration: f64) -> Self {
        self.curve = curve;
        self.duration = duration;
        self
    }

    pub fn with_epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = epsilon;
        self
    }

    pub fn with_listener(mut self, listener: ChangeListener) -> Self {
        self.listener = Some(listener);
        self
    }

    pub fn param(&self) -> ParamId {
        self.param
    }

    /// Last cached value. Deliberately not a fresh evaluation: a value that
    /// was just written reads back immediately.
    pub fn get(&self) -> f64 {
        self.cached
    }

    pub fn is_settled(&self) -> bool {
        self.settled
    }

    /// Write the property: schedule with the binding defaults at the
    /// clock's current time and reflect the intended value at once.
    pub fn set<S: ParameterSink, C: Clock>(
        &mut self,
        scheduler: &mut Scheduler<S, C>,
        value: f64,
    ) -> Result<(), AutomationError> {
        let (curve, duration) = (self.curve, self.duration);
        self.set_with(scheduler, value, curve, duration)
    }

    /// Write with a caller-supplied curve and duration override.
    pub fn set_with<S: ParameterSink, C: Clock>(
        &mut self,
        scheduler: &mut Scheduler<S, C>,
        value: f64,
        curve: CurveKind,
        duration: f64,
    ) -> Result<(), AutomationError> {
        scheduler.automate(self.param, value, curve, duration)?;
        self.update_cache(value);
        self.settled = false;
        Ok(())
    }

    /// Polling refresh: pull the timeline's current value into the cache
    /// and report whether the parameter has settled. Reads only; safe to
    /// run on the scheduling thread between writes.
    pub fn tick<S: ParameterSink, C: Clock>(
        &mut self,
        scheduler: &Scheduler<S, C>,
    ) -> Result<bool, AutomationError> {
        let now = scheduler.clock().now();
        let current = scheduler.value_at(self.param, now)?;
        self.update_cache(current);

        let resting = scheduler.resting_value(self.param)?;
        let pending = scheduler.phase(self.param, now)? == AutomationPhase::Scheduled;
        self.settled = !pending && (current - resting).abs() <= self.epsilon;
        Ok(self.settled)
    }

    fn update_cache(&mut self, value: f64) {
        if value == self.cached {
            return;
        }
        let old = self.cached;
        self.cached = value;
        if let Some(listener) = self.listener.as_mut() {
            listener(old, value);
        }
    }
}

impl std::fmt::Debug for PropertyBinding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PropertyBinding")
            .field("param", &self.param)
            .field("curve", &self.curve)
            .field("duration", &self.duration)
            .field("epsilon", &self.epsilon)
            .field("cached", &self.cached)
            .field("settled", &self.settled)
            .finish()
    }
}
