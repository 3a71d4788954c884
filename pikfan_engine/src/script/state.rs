//! Script states and the two-pass script loader.

use log::debug;
use pikfan_data::DataNode;

use super::action::Action;
use super::error::{ErrorSink, Origin, ScriptError};
use super::event::{Event, EventType};
use super::special::SpecialFunctionRegistry;
use crate::animation::AnimationDb;

/// A named bucket of event handlers. At most one handler per event type.
#[derive(Debug, Clone, PartialEq)]
pub struct State {
    /// Index of this state in its mob type's state list.
    pub id: usize,
    pub name: String,
    pub events: Vec<Event>,
}

impl State {
    pub fn event(&self, kind: EventType) -> Option<&Event> {
        self.events.iter().find(|e| e.kind == kind)
    }

    pub fn has_event(&self, kind: EventType) -> bool {
        self.event(kind).is_some()
    }
}

/// What the owning mob type offers the script loader for resolving names.
#[derive(Debug, Clone, Copy)]
pub struct ScriptContext<'a> {
    pub animations: &'a AnimationDb,
    pub specials: &'a SpecialFunctionRegistry,
    /// Accept `eat = N`.
    pub allow_partial_eat: bool,
}

/// Index of the first state called `name`.
pub fn state_index(states: &[State], name: &str) -> Option<usize> {
    states.iter().position(|s| s.name == name)
}

/// Build the state list of a mob type from its script tree.
///
/// The tree is shaped `{ state { event { action = args ... } ... } ... }`. All state names are
/// collected before any action is parsed so that `state = X` can refer to states defined further
/// down. Problems are reported to `sink`; the returned list is always usable.
pub fn load_script(root: &DataNode, ctx: &ScriptContext<'_>, sink: &mut dyn ErrorSink) -> Vec<State> {
    let mut names: Vec<String> = Vec::with_capacity(root.child_count());
    for state_node in &root.children {
        if names.contains(&state_node.name) {
            sink.report(ScriptError::DuplicateState {
                name: state_node.name.clone(),
                origin: Origin::of(state_node),
            });
        }
        names.push(state_node.name.clone());
    }

    let states: Vec<State> = root
        .children
        .iter()
        .enumerate()
        .map(|(id, state_node)| State {
            id,
            name: state_node.name.clone(),
            events: load_events(state_node, &names, ctx, sink),
        })
        .collect();
    debug!("script loaded: {} states", states.len());
    states
}

fn load_events(
    state_node: &DataNode,
    state_names: &[String],
    ctx: &ScriptContext<'_>,
    sink: &mut dyn ErrorSink,
) -> Vec<Event> {
    let mut events: Vec<Event> = Vec::new();
    for event_node in &state_node.children {
        let Some(kind) = EventType::from_key(&event_node.name) else {
            sink.report(ScriptError::UnknownEvent {
                name: event_node.name.clone(),
                origin: Origin::of(event_node),
            });
            continue;
        };
        if events.iter().any(|e| e.kind == kind) {
            sink.report(ScriptError::DuplicateEvent {
                name: event_node.name.clone(),
                state: state_node.name.clone(),
                origin: Origin::of(event_node),
            });
            continue;
        }
        let actions = event_node
            .children
            .iter()
            .map(|action_node| Action::parse(action_node, state_names, ctx, kind, sink))
            .collect();
        events.push(Event { kind, actions });
    }
    events
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(name: &str, value: &str) -> DataNode {
        DataNode::leaf(name, value)
    }

    fn branch(name: &str, children: Vec<DataNode>) -> DataNode {
        DataNode::branch(name, children)
    }

    fn load(root: &DataNode) -> (Vec<State>, Vec<ScriptError>) {
        let animations = AnimationDb::default();
        let specials = SpecialFunctionRegistry::with_builtins();
        let ctx = ScriptContext {
            animations: &animations,
            specials: &specials,
            allow_partial_eat: false,
        };
        let mut errors = Vec::new();
        let states = load_script(root, &ctx, &mut errors);
        (states, errors)
    }

    #[test]
    fn forward_state_references_resolve() {
        let root = branch(
            "script",
            vec![
                branch("idle", vec![branch("on_timer", vec![leaf("state", "angry")])]),
                branch("angry", vec![branch("on_enter", vec![leaf("state", "idle")])]),
            ],
        );
        let (states, errors) = load(&root);
        assert!(errors.is_empty(), "{errors:?}");
        assert_eq!(states.len(), 2);
        assert_eq!(states[1].id, 1);
        assert_eq!(
            states[0].event(EventType::Timer).map(|e| e.actions.clone()),
            Some(vec![Action::SetState(1)])
        );
        assert_eq!(
            states[1].event(EventType::OnEnter).map(|e| e.actions.clone()),
            Some(vec![Action::SetState(0)])
        );
    }

    #[test]
    fn unknown_and_duplicate_events_are_reported_and_dropped() {
        let root = branch(
            "script",
            vec![branch(
                "idle",
                vec![
                    branch("on_sneeze", vec![leaf("var", "a b")]),
                    branch("on_timer", vec![leaf("var", "a b")]),
                    branch("on_timer", vec![leaf("var", "c d")]),
                ],
            )],
        );
        let (states, errors) = load(&root);
        assert_eq!(errors.len(), 2);
        assert!(matches!(errors[0], ScriptError::UnknownEvent { .. }));
        assert!(matches!(errors[1], ScriptError::DuplicateEvent { .. }));
        assert_eq!(states[0].events.len(), 1);
        assert_eq!(
            states[0].events[0].actions,
            vec![Action::SetVar {
                key: "a".into(),
                value: "b".into()
            }]
        );
    }

    #[test]
    fn duplicate_state_names_resolve_to_first() {
        let root = branch(
            "script",
            vec![
                branch("idle", vec![]),
                branch("idle", vec![]),
                branch("other", vec![branch("on_enter", vec![leaf("state", "idle")])]),
            ],
        );
        let (states, errors) = load(&root);
        assert_eq!(errors.len(), 1);
        assert!(matches!(errors[0], ScriptError::DuplicateState { .. }));
        assert_eq!(state_index(&states, "idle"), Some(0));
        assert_eq!(states[2].events[0].actions, vec![Action::SetState(0)]);
    }
}
