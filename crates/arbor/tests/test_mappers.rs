//! Integration tests for mapper override chains and handler binding.

#[cfg(test)]
mod tests {
    use std::{any::Any, cell::RefCell, rc::Rc};

    use arbor::{
        Handler, Tree, ViewRef,
        error::{Error, Result},
        layout::LayoutKind,
        mapper::{CommandArgs, MapperKind, Mappers, PropertyAction, PropertyMapper, property_action},
        property::{Key, keys},
        testing::{EventLog, HandlerEvent, RecordingHandler},
    };
    use proptest::prelude::*;

    /// Shared record of which action fired.
    type Hits = Rc<RefCell<Vec<(String, usize)>>>;

    /// An action that records its key and layer.
    fn tagged(hits: &Hits, key: &str, layer: usize) -> PropertyAction {
        let hits = Rc::clone(hits);
        let key = key.to_string();
        property_action(move |_, _| hits.borrow_mut().push((key.clone(), layer)))
    }

    /// Keys used by the override chain property.
    const KEYS: [&str; 4] = ["A", "B", "C", "D"];

    proptest! {
        #[test]
        fn last_registration_wins_through_any_chain(
            layers in prop::collection::vec(prop::collection::vec(0..KEYS.len(), 0..4), 1..6),
            merge_style in any::<bool>(),
        ) {
            let hits: Hits = Rc::default();
            let mut expected: Vec<Option<usize>> = vec![None; KEYS.len()];

            let mut table = PropertyMapper::new();
            for (layer, keys) in layers.iter().enumerate() {
                let mut overlay = PropertyMapper::new();
                for k in keys {
                    overlay.set(KEYS[*k], tagged(&hits, KEYS[*k], layer));
                    expected[*k] = Some(layer);
                }
                table = if merge_style {
                    overlay.merge(&table)
                } else {
                    let mut derived = PropertyMapper::from_base(&table);
                    for k in keys {
                        derived.set(KEYS[*k], tagged(&hits, KEYS[*k], layer));
                    }
                    derived
                };
            }

            let mut tree = Tree::new();
            let v = tree.create_view();
            let view = tree.view(v).ok_or_else(|| TestCaseError::fail("missing view"))?;
            let log = EventLog::new();
            let mut handler = RecordingHandler::new("h", &log);
            let mappers = Mappers {
                properties: table,
                ..Mappers::new()
            };
            for (i, name) in KEYS.iter().enumerate() {
                hits.borrow_mut().clear();
                let ran = mappers.update_property(&view, &mut handler, &Key::from(*name));
                prop_assert_eq!(ran, expected[i].is_some());
                let fired: Vec<_> = hits.borrow().clone();
                match expected[i] {
                    Some(layer) => prop_assert_eq!(fired, vec![(name.to_string(), layer)]),
                    None => prop_assert!(fired.is_empty()),
                }
            }
        }
    }

    #[test]
    fn derived_tables_ignore_later_base_changes() -> Result<()> {
        let hits: Hits = Rc::default();
        let mut tree = Tree::new();
        let base = tree.mappers(MapperKind::View);
        let mut derived = base.derive();
        derived
            .properties
            .set(keys::OPACITY, tagged(&hits, "Opacity", 1));

        let mut replaced = base.derive();
        replaced.properties.set(keys::OPACITY, tagged(&hits, "Opacity", 2));
        tree.set_kind_mappers(MapperKind::View, replaced);

        let v = tree.create_view();
        tree.set_mappers(v, Some(derived))?;
        let log = EventLog::new();
        tree.attach_handler(v, Box::new(RecordingHandler::new("h", &log)))?;
        hits.borrow_mut().clear();
        tree.set_property(v, keys::OPACITY, 0.5)?;
        assert_eq!(*hits.borrow(), vec![("Opacity".to_string(), 1)]);
        Ok(())
    }

    /// Registers a platform-specific action on top of the shared table.
    fn platform_mappers(tree: &Tree) -> Mappers {
        #[allow(unused_mut)]
        let mut mappers = tree.mappers(MapperKind::Container).derive();
        #[cfg(target_os = "macos")]
        mappers.properties.set(
            keys::CLIPS_TO_BOUNDS,
            property_action(|view, handler| {
                handler.update_value(view, &Key::from("macos.ClipsToBounds"));
            }),
        );
        mappers
    }

    #[test]
    fn platform_override_extends_shared_table() -> Result<()> {
        let mut tree = Tree::new();
        let mappers = platform_mappers(&tree);
        tree.set_kind_mappers(MapperKind::Container, mappers);
        let c = tree.create_container(LayoutKind::Overlay);
        let log = EventLog::new();
        tree.attach_handler(c, Box::new(RecordingHandler::new("c", &log)))?;
        log.clear();

        tree.set_property(c, keys::CLIPS_TO_BOUNDS, true)?;
        let expected = if cfg!(target_os = "macos") {
            Key::from("macos.ClipsToBounds")
        } else {
            keys::CLIPS_TO_BOUNDS
        };
        assert_eq!(log.events(), vec![HandlerEvent::update("c", c, &expected)]);
        Ok(())
    }

    /// A handler that tracks connection state and rejects double connects.
    #[derive(Default)]
    struct Exclusive {
        /// Currently connected.
        connected: bool,
        /// Number of connects observed.
        connects: usize,
        /// Keys delivered through `update_value`.
        seen: Vec<Key>,
    }

    impl Handler for Exclusive {
        fn invoke(&mut self, _: &ViewRef<'_>, _: &Key, _: Option<&CommandArgs>) {
            assert!(self.connected, "invoke while disconnected");
        }

        fn update_value(&mut self, _: &ViewRef<'_>, key: &Key) {
            assert!(self.connected, "update while disconnected");
            self.seen.push(key.clone());
        }

        fn connect(&mut self, _: &ViewRef<'_>) {
            assert!(!self.connected, "connected twice");
            self.connected = true;
            self.connects += 1;
        }

        fn disconnect(&mut self) {
            assert!(self.connected, "disconnected twice");
            self.connected = false;
        }

        fn as_any_mut(&mut self) -> Option<&mut dyn Any> {
            Some(self)
        }
    }

    #[test]
    fn handler_moves_between_nodes_exclusively() -> Result<()> {
        let mut tree = Tree::new();
        let a = tree.build_view().set(keys::AUTOMATION_ID, "first").build()?;
        let b = tree.create_container(LayoutKind::VerticalStack);
        tree.attach_handler(a, Box::<Exclusive>::default())?;
        tree.set_property(a, keys::OPACITY, 0.5)?;

        tree.move_handler(a, b)?;
        tree.set_property(a, keys::OPACITY, 0.25)?;
        tree.set_property(b, keys::PADDING, 2.0)?;

        let handler = tree
            .handler_mut::<Exclusive>(b)
            .ok_or(Error::NodeNotFound(b))?;
        assert!(handler.connected);
        assert_eq!(handler.connects, 2);
        assert_eq!(handler.seen.last(), Some(&keys::PADDING));
        Ok(())
    }

    #[test]
    fn replay_delivers_values_set_before_attach() -> Result<()> {
        let mut tree = Tree::new();
        let v = tree
            .build_view()
            .set(keys::OPACITY, 0.3)
            .visible(false)
            .build()?;
        tree.attach_handler(v, Box::<Exclusive>::default())?;
        let handler = tree
            .handler_mut::<Exclusive>(v)
            .ok_or(Error::NodeNotFound(v))?;
        let replayed: Vec<_> = tree_keys(&handler.seen);
        assert!(replayed.contains(&"Opacity".to_string()));
        assert!(replayed.contains(&"IsVisible".to_string()));
        Ok(())
    }

    /// Key names as owned strings.
    fn tree_keys(keys: &[Key]) -> Vec<String> {
        keys.iter().map(|k| k.as_str().to_string()).collect()
    }
}
