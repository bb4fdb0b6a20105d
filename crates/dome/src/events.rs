//! The `on` / `off` event sub-protocol.
//!
//! An [`EventProtocol`] is obtained fresh from every `on` / `off` read of a
//! handle. It accepts four calling conventions:
//!
//! - `bind(event, handler)`: the two-argument form,
//! - `event(name).bind(handler)`: the named-event form,
//! - `assign(event, handler)`: the property-write form,
//! - `bind_map(mapping)`: one handler per event name.
//!
//! Handlers passed through the first two forms are remembered. Calling a
//! subscribing protocol that remembers handlers with fewer than two
//! arguments replays them against every resolved object.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use dome_host::{Function, HostError, IndexMap, Value};
use tracing::debug;

use crate::{DomeError, Handle};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventMode {
    Subscribe,
    Unsubscribe,
}

impl fmt::Display for EventMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            EventMode::Subscribe => "on",
            EventMode::Unsubscribe => "off",
        })
    }
}

/// One step of the sub-protocol.
#[derive(Debug, Clone)]
pub enum EventOp {
    Subscribe { event: String, handler: Function },
    Unsubscribe { event: String, handler: Function },
    ReplayOrSubscribeMapping(Vec<Value>),
}

#[derive(Debug, Clone, Default)]
enum EventState {
    #[default]
    Idle,
    HasStoredHandlers(Vec<Function>),
}

#[derive(Debug, Clone)]
pub struct EventProtocol {
    handle: Handle,
    mode: EventMode,
    state: Rc<RefCell<EventState>>,
}

impl EventProtocol {
    pub fn new(handle: Handle, mode: EventMode) -> Self {
        Self {
            handle,
            mode,
            state: Rc::default(),
        }
    }

    pub fn mode(&self) -> EventMode {
        self.mode
    }

    pub fn handle(&self) -> &Handle {
        &self.handle
    }

    /// Handlers remembered so far, in registration order.
    pub fn stored_handlers(&self) -> Vec<Function> {
        match &*self.state.borrow() {
            EventState::Idle => Vec::new(),
            EventState::HasStoredHandlers(handlers) => handlers.clone(),
        }
    }

    fn record(&self, handler: &Function) {
        let mut state = self.state.borrow_mut();
        match &mut *state {
            EventState::Idle => *state = EventState::HasStoredHandlers(vec![handler.clone()]),
            EventState::HasStoredHandlers(handlers) => handlers.push(handler.clone()),
        }
    }

    fn mode_op(&self, event: &str, handler: &Function) -> EventOp {
        let event = event.to_owned();
        let handler = handler.clone();
        match self.mode {
            EventMode::Subscribe => EventOp::Subscribe { event, handler },
            EventMode::Unsubscribe => EventOp::Unsubscribe { event, handler },
        }
    }

    /// Attaches or detaches `handler` on every object resolved by the handle,
    /// without recording it.
    fn apply_listener(
        &self,
        mode: EventMode,
        event: &str,
        handler: &Function,
    ) -> Result<(), DomeError> {
        let targets = self.handle.values();
        debug!(%mode, event, targets = targets.len(), "event binding");
        for target in &targets {
            match (target, mode) {
                (Value::Object(obj), EventMode::Subscribe) => {
                    obj.add_event_listener(event, handler.clone())?
                }
                (Value::Object(obj), EventMode::Unsubscribe) => {
                    obj.remove_event_listener(event, handler)?
                }
                (other, EventMode::Subscribe) => {
                    return Err(HostError::not_callable(
                        other.type_name(),
                        "addEventListener",
                    )
                    .into())
                }
                (other, EventMode::Unsubscribe) => {
                    return Err(HostError::not_callable(
                        other.type_name(),
                        "removeEventListener",
                    )
                    .into())
                }
            }
        }
        Ok(())
    }

    /// Executes one protocol step.
    pub fn apply(&self, op: EventOp) -> Result<(), DomeError> {
        match op {
            EventOp::Subscribe { event, handler } => {
                self.apply_listener(EventMode::Subscribe, &event, &handler)?;
                self.record(&handler);
                Ok(())
            }
            EventOp::Unsubscribe { event, handler } => {
                self.apply_listener(EventMode::Unsubscribe, &event, &handler)?;
                self.record(&handler);
                Ok(())
            }
            EventOp::ReplayOrSubscribeMapping(args) => self.replay_or_map(&args),
        }
    }

    fn replay_or_map(&self, args: &[Value]) -> Result<(), DomeError> {
        let stored = self.stored_handlers();
        if self.mode == EventMode::Subscribe && !stored.is_empty() {
            let targets = self.handle.values();
            debug!(handlers = stored.len(), targets = targets.len(), "event replay");
            for target in &targets {
                for handler in &stored {
                    handler.call(target, args)?;
                }
            }
            return Ok(());
        }
        match args {
            [Value::Map(map)] => self.bind_map(map).map(drop),
            _ => Err(DomeError::InvalidEventArguments(format!(
                "`{}` expects (event, handler) or a mapping of events to handlers",
                self.mode
            ))),
        }
    }

    /// `on(event, handler)`.
    pub fn bind(&self, event: &str, handler: &Function) -> Result<Self, DomeError> {
        self.apply(self.mode_op(event, handler))?;
        Ok(self.clone())
    }

    /// `on.event`: a binder whose call subscribes to `event`.
    pub fn event(&self, name: impl Into<String>) -> EventBinder {
        EventBinder {
            protocol: self.clone(),
            event: name.into(),
        }
    }

    /// `on.event = handler`. The handler is not recorded for replay.
    pub fn assign(&self, event: &str, handler: &Function) -> Result<(), DomeError> {
        self.apply_listener(self.mode, event, handler)
    }

    /// `on({event: handler, ..})`. Every value must be a function; nothing is
    /// bound if one is not.
    pub fn bind_map(&self, mapping: &IndexMap<String, Value>) -> Result<Self, DomeError> {
        let mut pairs = Vec::with_capacity(mapping.len());
        for (event, value) in mapping {
            let handler = value.as_function().ok_or_else(|| {
                DomeError::InvalidEventArguments(format!(
                    "handler for `{event}` is a {}, not a function",
                    value.type_name()
                ))
            })?;
            pairs.push((event.as_str(), handler));
        }
        for (event, handler) in pairs {
            self.apply_listener(self.mode, event, handler)?;
        }
        Ok(self.clone())
    }

    /// Calls the protocol with dynamic arguments.
    pub fn call(&self, args: &[Value]) -> Result<Self, DomeError> {
        let op = match args {
            [event, handler, ..] => {
                let event = event.as_str().ok_or_else(|| {
                    DomeError::InvalidEventArguments(format!(
                        "event name must be a string, got {}",
                        event.type_name()
                    ))
                })?;
                let handler = handler.as_function().ok_or_else(|| {
                    DomeError::InvalidEventArguments(format!(
                        "handler must be a function, got {}",
                        handler.type_name()
                    ))
                })?;
                self.mode_op(event, handler)
            }
            _ => EventOp::ReplayOrSubscribeMapping(args.to_vec()),
        };
        self.apply(op)?;
        Ok(self.clone())
    }
}

/// The named-event form, `on.click(handler)`.
#[derive(Debug, Clone)]
pub struct EventBinder {
    protocol: EventProtocol,
    event: String,
}

impl EventBinder {
    pub fn name(&self) -> &str {
        &self.event
    }

    pub fn bind(&self, handler: &Function) -> Result<EventProtocol, DomeError> {
        self.protocol.bind(&self.event, handler)
    }

    /// `on.click(handler)` with dynamic arguments.
    pub fn call(&self, args: &[Value]) -> Result<EventProtocol, DomeError> {
        let handler = args.first().and_then(Value::as_function).ok_or_else(|| {
            DomeError::InvalidEventArguments(format!("`{}` expects a handler function", self.event))
        })?;
        self.bind(handler)
    }

    /// `on.click = handler`.
    pub fn assign(&self, handler: &Function) -> Result<(), DomeError> {
        self.protocol.assign(&self.event, handler)
    }
}
