#![allow(dead_code)]

extern crate std;

use crate::types::Project;

/// INV-1: The total never exceeds the final milestone goal and is never negative.
pub fn assert_total_within_cap(project: &Project) {
    let cap = project.milestones.last().map(|m| m.goal).unwrap_or(0);
    assert!(
        project.total_funded >= 0 && project.total_funded <= cap,
        "INV-1 violated: project {} total {} outside [0, {}]",
        project.id,
        project.total_funded,
        cap
    );
}

/// INV-2: Milestone goals are strictly increasing and positive.
pub fn assert_goals_strictly_increasing(project: &Project) {
    let mut previous = 0i128;
    for (i, milestone) in project.milestones.iter().enumerate() {
        assert!(
            milestone.goal > previous,
            "INV-2 violated: project {} milestone {} goal {} does not exceed {}",
            project.id,
            i,
            milestone.goal,
            previous
        );
        previous = milestone.goal;
    }
}

/// INV-3: The milestone pointer is the first goal the total has not met, or
/// the last milestone once everything is met.
pub fn assert_milestone_index_consistent(project: &Project) {
    let mut expected = project.milestones.len() - 1;
    for (i, milestone) in project.milestones.iter().enumerate() {
        if project.total_funded < milestone.goal {
            expected = i as u32;
            break;
        }
    }
    assert_eq!(
        project.current_milestone, expected,
        "INV-3 violated: project {} at total {} points at milestone {}, expected {}",
        project.id, project.total_funded, project.current_milestone, expected
    );
}

/// INV-4: A project that reached its cap is no longer active.
pub fn assert_completed_is_inactive(project: &Project) {
    let cap = project.milestones.last().map(|m| m.goal).unwrap_or(0);
    if project.total_funded == cap {
        assert!(
            !project.is_active,
            "INV-4 violated: project {} reached cap {} but is still active",
            project.id,
            cap
        );
    }
}

/// INV-5: Totals never decrease while a project stays active.
pub fn assert_total_monotonic(before: &Project, after: &Project) {
    if after.is_active {
        assert!(
            after.total_funded >= before.total_funded,
            "INV-5 violated: project {} total decreased from {} to {}",
            after.id,
            before.total_funded,
            after.total_funded
        );
    }
}

/// INV-6: An inactive project never becomes active again.
pub fn assert_no_reactivation(before: &Project, after: &Project) {
    assert!(
        before.is_active || !after.is_active,
        "INV-6 violated: project {} was reactivated",
        after.id
    );
}

/// INV-7: A stopped project holds nothing.
pub fn assert_stopped_is_empty(project: &Project) {
    assert!(!project.is_active, "INV-7 violated: project {} still active", project.id);
    assert_eq!(
        project.total_funded, 0,
        "INV-7 violated: stopped project {} still holds {}",
        project.id, project.total_funded
    );
}

/// INV-8: Fields fixed at creation never change; milestones only grow.
pub fn assert_project_immutable_fields(original: &Project, current: &Project) {
    assert_eq!(original.id, current.id, "INV-8 violated: project id changed");
    assert_eq!(
        original.creator, current.creator,
        "INV-8 violated: project creator changed"
    );
    assert_eq!(original.title, current.title, "INV-8 violated: title changed");
    assert_eq!(
        original.image_ref, current.image_ref,
        "INV-8 violated: image_ref changed"
    );
    assert_eq!(
        original.description, current.description,
        "INV-8 violated: description changed"
    );
    assert!(
        current.milestones.len() >= original.milestones.len(),
        "INV-8 violated: milestones were removed"
    );
    for (i, milestone) in original.milestones.iter().enumerate() {
        assert_eq!(
            current.milestones.get(i as u32),
            Some(milestone),
            "INV-8 violated: milestone {} changed",
            i
        );
    }
}

/// Run all stateless project invariants.
pub fn assert_all_project_invariants(project: &Project) {
    assert_total_within_cap(project);
    assert_goals_strictly_increasing(project);
    assert_milestone_index_consistent(project);
    assert_completed_is_inactive(project);
}

/// Run all invariants that relate a project to its previous snapshot.
pub fn assert_transition_invariants(before: &Project, after: &Project) {
    assert_total_monotonic(before, after);
    assert_no_reactivation(before, after);
    assert_project_immutable_fields(before, after);
    assert_all_project_invariants(after);
}
