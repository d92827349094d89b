//! Keyed dispatch tables from abstract properties and commands to handler actions.
//!
//! A [`Mapper`] is an ordered table. Tables are extended by snapshotting a
//! base table and registering entries on top; later registrations win, and
//! mutating the base afterwards never reaches a derived table.

use std::{fmt, rc::Rc};

use indexmap::{IndexMap, IndexSet};

use crate::{
    NodeId,
    handler::{Handler, ViewRef},
    property::{self, Key},
    value::Value,
};

/// Action run for a property update.
pub type PropertyAction = Rc<dyn Fn(&ViewRef<'_>, &mut dyn Handler)>;

/// Action run for a command.
pub type CommandAction = Rc<dyn Fn(&ViewRef<'_>, &mut dyn Handler, Option<&CommandArgs>)>;

/// Wrap a closure as a [`PropertyAction`].
pub fn property_action<F>(f: F) -> PropertyAction
where
    F: Fn(&ViewRef<'_>, &mut dyn Handler) + 'static,
{
    Rc::new(f)
}

/// Wrap a closure as a [`CommandAction`].
pub fn command_action<F>(f: F) -> CommandAction
where
    F: Fn(&ViewRef<'_>, &mut dyn Handler, Option<&CommandArgs>) + 'static,
{
    Rc::new(f)
}

/// Payload of a structural command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChildUpdate {
    /// Index of the child in the container at the time of the notification.
    pub index: usize,
    /// The child.
    pub child: NodeId,
}

/// Arguments accompanying a command.
#[derive(Debug, Clone, PartialEq)]
pub enum CommandArgs {
    /// A structural change to a container's children.
    Child(ChildUpdate),
    /// An arbitrary value.
    Value(Value),
}

impl CommandArgs {
    /// The structural payload, if this is one.
    pub fn child(&self) -> Option<ChildUpdate> {
        match self {
            Self::Child(update) => Some(*update),
            Self::Value(_) => None,
        }
    }
}

/// An ordered table from keys to actions.
pub struct Mapper<A> {
    /// Entries in registration order.
    entries: IndexMap<Key, A>,
}

/// Property update table.
pub type PropertyMapper = Mapper<PropertyAction>;

/// Command table.
pub type CommandMapper = Mapper<CommandAction>;

impl<A> Default for Mapper<A> {
    fn default() -> Self {
        Self {
            entries: IndexMap::new(),
        }
    }
}

impl<A: Clone> Clone for Mapper<A> {
    fn clone(&self) -> Self {
        Self {
            entries: self.entries.clone(),
        }
    }
}

impl<A> fmt::Debug for Mapper<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.entries.keys()).finish()
    }
}

impl<A: Clone> Mapper<A> {
    /// An empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// A snapshot copy of `base`.
    pub fn from_base(base: &Self) -> Self {
        base.clone()
    }

    /// A new table seeded from `base` with this table's entries applied on top.
    pub fn merge(&self, base: &Self) -> Self {
        let mut merged = Self::from_base(base);
        for (key, action) in &self.entries {
            merged.entries.insert(key.clone(), action.clone());
        }
        merged
    }

    /// Register an action, returning the one it replaced.
    ///
    /// A replaced key keeps its original position in the iteration order.
    pub fn set(&mut self, key: impl Into<Key>, action: A) -> Option<A> {
        self.entries.insert(key.into(), action)
    }

    /// Builder form of [`Mapper::set`].
    pub fn with(mut self, key: impl Into<Key>, action: A) -> Self {
        self.set(key, action);
        self
    }

    /// Remove an entry.
    pub fn unset(&mut self, key: &Key) -> Option<A> {
        self.entries.shift_remove(key)
    }

    /// Look up an action.
    pub fn get(&self, key: &Key) -> Option<&A> {
        self.entries.get(key)
    }

    /// True if the key is registered.
    pub fn contains(&self, key: &Key) -> bool {
        self.entries.contains_key(key)
    }

    /// Registered keys in order.
    pub fn keys(&self) -> impl Iterator<Item = &Key> {
        self.entries.keys()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if the table is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Which registry entry a node uses when it has no override.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MapperKind {
    /// Leaf views.
    View,
    /// Containers.
    Container,
}

/// The property and command tables for one kind of view.
#[derive(Clone, Debug, Default)]
pub struct Mappers {
    /// Property update table.
    pub properties: PropertyMapper,
    /// Command table.
    pub commands: CommandMapper,
    /// Platform keys whose changes alter a handler's intrinsic size.
    ///
    /// The core layout keys always invalidate and need not be listed.
    pub measure_keys: IndexSet<Key>,
}

impl Mappers {
    /// Empty tables.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot both tables for an override chain.
    pub fn derive(&self) -> Self {
        self.clone()
    }

    /// Both tables seeded from `base` with these entries on top.
    pub fn merge(&self, base: &Self) -> Self {
        Self {
            properties: self.properties.merge(&base.properties),
            commands: self.commands.merge(&base.commands),
            measure_keys: base.measure_keys.union(&self.measure_keys).cloned().collect(),
        }
    }

    /// Declare that changes to `key` invalidate the node's measurement.
    pub fn measure_key(&mut self, key: impl Into<Key>) -> &mut Self {
        self.measure_keys.insert(key.into());
        self
    }

    /// Return true if a change to `key` can change a node's measured size.
    pub fn affects_measure(&self, key: &Key) -> bool {
        property::affects_measure(key) || self.measure_keys.contains(key)
    }

    /// Run the property action for `key`. Returns false if none is registered.
    pub fn update_property(&self, view: &ViewRef<'_>, handler: &mut dyn Handler, key: &Key) -> bool {
        match self.properties.get(key) {
            Some(action) => {
                action(view, handler);
                true
            }
            None => false,
        }
    }

    /// Run every property action in registration order.
    pub fn update_properties(&self, view: &ViewRef<'_>, handler: &mut dyn Handler) {
        for action in self.properties.entries.values() {
            action(view, handler);
        }
    }

    /// Run the command action for `command`. Returns false if none is registered.
    pub fn invoke(
        &self,
        view: &ViewRef<'_>,
        handler: &mut dyn Handler,
        command: &Key,
        args: Option<&CommandArgs>,
    ) -> bool {
        match self.commands.get(command) {
            Some(action) => {
                action(view, handler, args);
                true
            }
            None => false,
        }
    }
}

/// Default tables used by a fresh tree.
pub mod defaults {
    use super::{CommandMapper, Mappers, PropertyMapper, command_action, property_action};
    use crate::property::{Key, commands, keys};

    /// Property keys every view forwards to its handler.
    const VIEW_KEYS: &[Key] = &[
        keys::AUTOMATION_ID,
        keys::IS_VISIBLE,
        keys::INPUT_TRANSPARENT,
        keys::OPACITY,
        keys::WIDTH_REQUEST,
        keys::HEIGHT_REQUEST,
        keys::HORIZONTAL_OPTIONS,
        keys::VERTICAL_OPTIONS,
    ];

    /// Additional property keys containers forward.
    const CONTAINER_KEYS: &[Key] = &[
        keys::PADDING,
        keys::SPACING,
        keys::CLIPS_TO_BOUNDS,
        keys::CASCADE_INPUT_TRANSPARENT,
        keys::IGNORE_SAFE_AREA,
    ];

    /// Structural commands containers forward.
    const CONTAINER_COMMANDS: &[Key] = &[
        commands::ADD,
        commands::INSERT,
        commands::REMOVE,
        commands::CLEAR,
    ];

    /// Register forwarding actions for `keys` on a property table.
    fn forward_properties(mut table: PropertyMapper, keys: &[Key]) -> PropertyMapper {
        for key in keys {
            let forwarded = key.clone();
            table.set(
                key.clone(),
                property_action(move |view, handler| handler.update_value(view, &forwarded)),
            );
        }
        table
    }

    /// Register forwarding actions for `names` on a command table.
    fn forward_commands(mut table: CommandMapper, names: &[Key]) -> CommandMapper {
        for name in names {
            let forwarded = name.clone();
            table.set(
                name.clone(),
                command_action(move |view, handler, args| {
                    handler.invoke(view, &forwarded, args)
                }),
            );
        }
        table
    }

    /// Tables for leaf views.
    pub fn view() -> Mappers {
        Mappers {
            properties: forward_properties(PropertyMapper::new(), VIEW_KEYS),
            commands: forward_commands(CommandMapper::new(), &[commands::INVALIDATE_MEASURE]),
            ..Mappers::new()
        }
    }

    /// Tables for containers, derived from the view tables.
    pub fn container() -> Mappers {
        let base = view();
        Mappers {
            properties: forward_properties(base.properties, CONTAINER_KEYS),
            commands: forward_commands(base.commands, CONTAINER_COMMANDS),
            measure_keys: base.measure_keys,
        }
    }
}
