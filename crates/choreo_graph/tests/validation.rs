//! Graph validation tests.
//!
//! `Graph::validate` reports every structural problem at once; these tests
//! build graphs with one or more defects and check the full report.


use choreo_graph::prelude::*;
use test_utils::{attack_chain, state};

/// A state id that does not exist in a four-state graph.
fn foreign_state() -> StateId {
    let mut other = Graph::new("other");
    for name in ["a", "b", "c", "d", "e", "f"] {
        other.create_state(name, "").expect("fresh");
    }
    other.find_state("f").expect("created")
}

/// A variable id that does not exist in a graph without variables.
fn foreign_variable() -> VariableId {
    let mut other = Graph::new("other");
    other.declare_variable("x", 0_i64).expect("new");
    other.declare_variable("y", 0_i64).expect("new")
}

#[test]
fn well_formed_graph_passes() {
    let events = EventRegistry::new();
    let mut graph = attack_chain(&events);
    let flag = graph.declare_variable("armed", false).expect("new");
    let prepare = state(&graph, "Prepare");
    let state = graph.state_mut(prepare).expect("exists");
    state.add_action(Action::set_variable(flag, true));
    state.add_action(Action::weighted_dispatch(vec![Candidate::new(
        EventId::FINISHED,
        1.0,
    )]));
    assert_eq!(graph.validate(), Ok(()));
}

#[test]
fn empty_graph_has_no_entry() {
    let graph = Graph::new("empty");
    assert_eq!(graph.validate(), Err(vec![ValidationError::NoEntryPoint]));
}

#[test]
fn dangling_transition_targets_are_reported() {
    let events = EventRegistry::new();
    let mut graph = attack_chain(&events);
    let missing = foreign_state();
    let bad = graph
        .add_state(State::new("Broken").with_transition(EventId::FINISHED, missing))
        .expect("fresh name");

    let errors = graph.validate().expect_err("dangling target");
    assert_eq!(
        errors,
        vec![ValidationError::InvalidTransitionTarget {
            state: bad,
            event: EventId::FINISHED,
            target: missing,
        }]
    );
    assert!(errors[0].to_string().contains("invalid state"));
}

#[test]
fn every_problem_is_reported() {
    let events = EventRegistry::new();
    let mut graph = attack_chain(&events);
    let prepare = state(&graph, "Prepare");
    let ghost = foreign_variable();
    {
        let state = graph.state_mut(prepare).expect("exists");
        state.add_action(Action::set_variable(ghost, 1_i64));
        state.add_action(Action::weighted_dispatch(Vec::new()));
        state.add_action(Action::weighted_dispatch(vec![
            Candidate::new(EventId::FINISHED, 2.0),
            Candidate::new(EventId::RECYCLE, 0.0),
            Candidate::new(EventId::RECYCLE, f32::NAN),
        ]));
    }

    let errors = graph.validate().expect_err("three defects");
    assert_eq!(
        errors,
        vec![
            ValidationError::UnknownVariable {
                state: prepare,
                action: 0,
                variable: ghost,
            },
            ValidationError::EmptyDispatch {
                state: prepare,
                action: 1,
            },
            ValidationError::NonPositiveWeight {
                state: prepare,
                action: 2,
                candidate: 1,
            },
            ValidationError::NonPositiveWeight {
                state: prepare,
                action: 2,
                candidate: 2,
            },
        ]
    );
}

#[test]
fn host_arguments_are_checked_for_variables() {
    let events = EventRegistry::new();
    let mut graph = attack_chain(&events);
    let attack = state(&graph, "Attack");
    let ghost = foreign_variable();
    graph
        .state_mut(attack)
        .expect("exists")
        .add_action(Action::invoke_host(
            "spawn",
            vec![HostArg::Text("orb".into()), HostArg::Variable(ghost)],
        ));

    assert_eq!(
        graph.validate(),
        Err(vec![ValidationError::UnknownVariable {
            state: attack,
            action: 0,
            variable: ghost,
        }])
    );
}

#[test]
fn validation_errors_display() {
    assert_eq!(
        ValidationError::NoEntryPoint.to_string(),
        "graph has no entry state"
    );
    let error: Box<dyn core::error::Error> = Box::new(ValidationError::NoEntryPoint);
    assert!(!error.to_string().is_empty());
}
