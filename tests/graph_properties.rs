mod common;

use std::collections::{BTreeSet, HashSet};

use common::{names, StepBuilder, StepSetBuilder};
use pipedag::dag::queries::{
    all_dependents, all_steps_finished, all_steps_submitted, copy_steps, dependencies,
    immediate_dependents, reset_steps, step_for_name,
};
use pipedag::dag::StepSet;
use pipedag::types::StepState;
use proptest::prelude::*;

// Acyclic by construction: step N may only depend on steps 0..N-1.
fn dag_strategy(max_steps: usize) -> impl Strategy<Value = StepSet> {
    (1..=max_steps).prop_flat_map(|num_steps| {
        let deps_strat = proptest::collection::vec(
            proptest::collection::vec(any::<usize>(), 0..num_steps),
            num_steps,
        );

        deps_strat.prop_map(move |raw_deps| {
            let mut builder = StepSetBuilder::new();
            for (i, potential_deps) in raw_deps.into_iter().enumerate() {
                let mut step = StepBuilder::batch(&format!("step_{}", i));

                let mut valid_deps = HashSet::new();
                for dep_idx in potential_deps {
                    if i > 0 {
                        valid_deps.insert(dep_idx % i);
                    }
                }
                for dep_idx in valid_deps {
                    step = step.after(&format!("step_{}", dep_idx));
                }
                builder = builder.with_step(step);
            }
            builder.build()
        })
    })
}

fn state_strategy() -> impl Strategy<Value = StepState> {
    prop_oneof![
        Just(StepState::Waiting),
        Just(StepState::Submitted),
        Just(StepState::Finished),
    ]
}

/// Dependents found by repeatedly following immediate dependents.
fn dependents_fixpoint(root: &str, steps: &StepSet) -> BTreeSet<String> {
    let mut found: BTreeSet<String> = BTreeSet::new();
    let mut frontier = vec![root.to_string()];
    while let Some(name) = frontier.pop() {
        let step = step_for_name(&name, steps).unwrap();
        for dependent in immediate_dependents(step, steps) {
            if found.insert(dependent.name().to_string()) {
                frontier.push(dependent.name().to_string());
            }
        }
    }
    found
}

proptest! {
    #[test]
    fn dependencies_resolve_declared_names(steps in dag_strategy(12)) {
        for step in steps.iter() {
            let resolved = names(&dependencies(step, &steps));
            prop_assert_eq!(&resolved, step.dependency_names());
        }
    }

    #[test]
    fn all_dependents_is_fixpoint_of_immediate_dependents(steps in dag_strategy(12)) {
        for step in steps.iter() {
            let closure = names(&all_dependents(step, &steps).unwrap());
            prop_assert!(!closure.contains(step.name()));
            prop_assert_eq!(closure, dependents_fixpoint(step.name(), &steps));
        }
    }

    #[test]
    fn submitted_and_finished_predicates_follow_states(
        steps in dag_strategy(10),
        states in proptest::collection::vec(state_strategy(), 10),
    ) {
        let mut steps = steps;
        for (step, state) in steps.iter_mut().zip(states.iter().copied()) {
            step.set_state(state).unwrap();
        }

        let expect_submitted = steps.iter().all(|s| s.state() >= StepState::Submitted);
        let expect_finished = steps.iter().all(|s| s.state() == StepState::Finished);
        prop_assert_eq!(all_steps_submitted(&steps), expect_submitted);
        prop_assert_eq!(all_steps_finished(&steps), expect_finished);
    }

    #[test]
    fn reset_is_idempotent(
        steps in dag_strategy(10),
        states in proptest::collection::vec(state_strategy(), 10),
    ) {
        let mut steps = steps;
        for (step, state) in steps.iter_mut().zip(states.iter().copied()) {
            step.set_state(state).unwrap();
        }

        reset_steps(&mut steps);
        prop_assert!(steps.iter().all(|s| s.state() == StepState::Waiting && !s.has_data()));
        reset_steps(&mut steps);
        prop_assert!(steps.iter().all(|s| s.state() == StepState::Waiting && !s.has_data()));
    }

    #[test]
    fn copy_preserves_names_and_wiring(steps in dag_strategy(12)) {
        let copied = copy_steps(&steps);
        prop_assert_eq!(
            copied.names().collect::<Vec<_>>(),
            steps.names().collect::<Vec<_>>()
        );
        for step in steps.iter() {
            let copy = copied.get(step.name()).unwrap();
            prop_assert_eq!(copy.dependency_names(), step.dependency_names());
        }
    }
}
