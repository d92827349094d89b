//! Test helpers: a handler that records every notification it receives.

use std::{any::Any, cell::RefCell, rc::Rc};

use crate::{
    NodeId,
    geom::{Rect, Size},
    handler::{Handler, ViewRef},
    layout::Constraint,
    mapper::{ChildUpdate, CommandArgs},
    property::Key,
};

/// One handler notification.
#[derive(Debug, Clone, PartialEq)]
pub enum HandlerEvent {
    /// `connect` was called.
    Connect {
        /// Handler name.
        handler: String,
        /// Node the handler was attached to.
        node: NodeId,
    },
    /// `disconnect` was called.
    Disconnect {
        /// Handler name.
        handler: String,
        /// Node the handler was last attached to.
        node: Option<NodeId>,
    },
    /// `update_value` was called.
    Update {
        /// Handler name.
        handler: String,
        /// Node being updated.
        node: NodeId,
        /// Property key.
        key: Key,
    },
    /// `invoke` was called.
    Invoke {
        /// Handler name.
        handler: String,
        /// Node receiving the command.
        node: NodeId,
        /// Command name.
        command: Key,
        /// Command arguments.
        args: Option<CommandArgs>,
    },
    /// `desired_size` was called.
    Measure {
        /// Handler name.
        handler: String,
        /// Node being measured.
        node: NodeId,
    },
    /// `platform_arrange` was called.
    Arrange {
        /// Handler name.
        handler: String,
        /// Node being arranged.
        node: NodeId,
        /// Assigned frame.
        frame: Rect,
    },
    /// `pre_remove` was called.
    PreRemove {
        /// Handler name.
        handler: String,
        /// Node about to be removed.
        node: NodeId,
    },
}

impl HandlerEvent {
    /// An `Update` event.
    pub fn update(handler: &str, node: NodeId, key: &Key) -> Self {
        Self::Update {
            handler: handler.into(),
            node,
            key: key.clone(),
        }
    }

    /// An `Invoke` event.
    pub fn invoke(handler: &str, node: NodeId, command: &Key, args: Option<CommandArgs>) -> Self {
        Self::Invoke {
            handler: handler.into(),
            node,
            command: command.clone(),
            args,
        }
    }

    /// An `Invoke` event for a structural command.
    pub fn child(handler: &str, node: NodeId, command: &Key, index: usize, child: NodeId) -> Self {
        Self::invoke(
            handler,
            node,
            command,
            Some(CommandArgs::Child(ChildUpdate { index, child })),
        )
    }

    /// A `Connect` event.
    pub fn connect(handler: &str, node: NodeId) -> Self {
        Self::Connect {
            handler: handler.into(),
            node,
        }
    }

    /// A `Disconnect` event.
    pub fn disconnect(handler: &str, node: Option<NodeId>) -> Self {
        Self::Disconnect {
            handler: handler.into(),
            node,
        }
    }

    /// A `PreRemove` event.
    pub fn pre_remove(handler: &str, node: NodeId) -> Self {
        Self::PreRemove {
            handler: handler.into(),
            node,
        }
    }

    /// The name of the handler that recorded the event.
    pub fn handler(&self) -> &str {
        match self {
            Self::Connect { handler, .. }
            | Self::Disconnect { handler, .. }
            | Self::Update { handler, .. }
            | Self::Invoke { handler, .. }
            | Self::Measure { handler, .. }
            | Self::Arrange { handler, .. }
            | Self::PreRemove { handler, .. } => handler,
        }
    }

    /// The command name, for `Invoke` events.
    pub fn command(&self) -> Option<&Key> {
        match self {
            Self::Invoke { command, .. } => Some(command),
            _ => None,
        }
    }
}

/// Shared, ordered log of handler events.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    /// Recorded events.
    events: Rc<RefCell<Vec<HandlerEvent>>>,
}

impl EventLog {
    /// Create an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an event.
    pub fn push(&self, event: HandlerEvent) {
        self.events.borrow_mut().push(event);
    }

    /// A copy of all recorded events.
    pub fn events(&self) -> Vec<HandlerEvent> {
        self.events.borrow().clone()
    }

    /// Events recorded by one handler.
    pub fn events_for(&self, handler: &str) -> Vec<HandlerEvent> {
        self.events
            .borrow()
            .iter()
            .filter(|e| e.handler() == handler)
            .cloned()
            .collect()
    }

    /// Invoke events for one command name.
    pub fn commands(&self, command: &Key) -> Vec<HandlerEvent> {
        self.events
            .borrow()
            .iter()
            .filter(|e| e.command() == Some(command))
            .cloned()
            .collect()
    }

    /// Number of recorded events.
    pub fn len(&self) -> usize {
        self.events.borrow().len()
    }

    /// True if nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.events.borrow().is_empty()
    }

    /// Discard all recorded events.
    pub fn clear(&self) {
        self.events.borrow_mut().clear();
    }
}

/// A handler that logs every call to a shared [`EventLog`].
#[derive(Debug)]
pub struct RecordingHandler {
    /// Name used to tag events.
    name: String,
    /// Destination log.
    log: EventLog,
    /// Intrinsic size reported from `desired_size`.
    intrinsic: Option<Size>,
    /// Node of the most recent `connect`.
    bound: Option<NodeId>,
    /// Number of `connect` calls not yet matched by `disconnect`.
    connections: usize,
}

impl RecordingHandler {
    /// Create a handler that logs to `log`.
    pub fn new(name: impl Into<String>, log: &EventLog) -> Self {
        Self {
            name: name.into(),
            log: log.clone(),
            intrinsic: None,
            bound: None,
            connections: 0,
        }
    }

    /// Report `size` as the platform element's intrinsic size.
    pub fn with_intrinsic(mut self, size: Size) -> Self {
        self.intrinsic = Some(size);
        self
    }

    /// Handler name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// True if connected and not yet disconnected.
    pub fn is_connected(&self) -> bool {
        self.connections > 0
    }

    /// Record an event.
    fn record(&self, event: HandlerEvent) {
        self.log.push(event);
    }
}

impl Handler for RecordingHandler {
    fn invoke(&mut self, view: &ViewRef<'_>, command: &Key, args: Option<&CommandArgs>) {
        self.record(HandlerEvent::invoke(
            &self.name,
            view.id(),
            command,
            args.cloned(),
        ));
    }

    fn update_value(&mut self, view: &ViewRef<'_>, key: &Key) {
        self.record(HandlerEvent::update(&self.name, view.id(), key));
    }

    fn connect(&mut self, view: &ViewRef<'_>) {
        self.connections += 1;
        self.bound = Some(view.id());
        self.record(HandlerEvent::connect(&self.name, view.id()));
    }

    fn disconnect(&mut self) {
        self.connections = self.connections.saturating_sub(1);
        self.record(HandlerEvent::disconnect(&self.name, self.bound));
    }

    fn desired_size(
        &mut self,
        view: &ViewRef<'_>,
        _width: Constraint,
        _height: Constraint,
    ) -> Option<Size> {
        self.record(HandlerEvent::Measure {
            handler: self.name.clone(),
            node: view.id(),
        });
        self.intrinsic
    }

    fn platform_arrange(&mut self, view: &ViewRef<'_>, frame: Rect) {
        self.record(HandlerEvent::Arrange {
            handler: self.name.clone(),
            node: view.id(),
            frame,
        });
    }

    fn pre_remove(&mut self, view: &ViewRef<'_>) {
        self.record(HandlerEvent::pre_remove(&self.name, view.id()));
    }

    fn as_any_mut(&mut self) -> Option<&mut dyn Any> {
        Some(self)
    }
}
