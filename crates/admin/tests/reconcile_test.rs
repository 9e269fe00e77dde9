#![allow(clippy::unwrap_used, clippy::expect_used)]
//! Integration tests for the relationship reconciliation engine.
//!
//! These drive the public reconcile API through the same row shapes the
//! managers feed it.

use rostrum_admin::content::reconcile::{AgendaPair, reconcile};
use rostrum_admin::models::{AgendaRelationship, SpeakerAgenda};

// ============================================================================
// Symmetric agenda-to-agenda relationships
// ============================================================================

fn edge(id: i32, from: i32, to: i32) -> AgendaRelationship {
    AgendaRelationship {
        id,
        agenda_from: from,
        agenda_to: to,
    }
}

#[test]
fn replacing_a_related_agenda_swaps_exactly_one_row() {
    // Owner 1 is related to 2; the edit wants only 3.
    let current = vec![edge(100, 1, 2)];
    let desired = [3].iter().map(|&to| AgendaPair::new(1, to));

    let plan = reconcile(desired, &current, |row| (row.id, row.pair()));

    assert_eq!(plan.insert, vec![AgendaPair::new(1, 3)]);
    assert_eq!(plan.delete, vec![100]);
}

#[test]
fn both_endpoints_resolve_the_same_row() {
    let current = vec![edge(1, 4, 9)];

    // Saving agenda 4 with 9 still related.
    let from_four = reconcile(
        [9].iter().map(|&to| AgendaPair::new(4, to)),
        &current,
        |row| (row.id, row.pair()),
    );
    assert!(from_four.is_noop());

    // Saving agenda 9 with 4 still related.
    let from_nine = reconcile(
        [4].iter().map(|&to| AgendaPair::new(9, to)),
        &current,
        |row| (row.id, row.pair()),
    );
    assert!(from_nine.is_noop());
}

#[test]
fn desired_duplicates_produce_one_canonical_insert() {
    // 7 listed twice, plus the owner-swapped spelling of the same edge.
    let desired = [
        AgendaPair::new(3, 7),
        AgendaPair::new(3, 7),
        AgendaPair::new(7, 3),
    ];
    let plan = reconcile(desired, &[] as &[AgendaRelationship], |row| {
        (row.id, row.pair())
    });

    assert_eq!(plan.insert, vec![AgendaPair::new(3, 7)]);
}

#[test]
fn reconcile_is_idempotent_once_applied() {
    let desired: Vec<AgendaPair> = [2, 8].iter().map(|&to| AgendaPair::new(5, to)).collect();

    let first = reconcile(
        desired.iter().copied(),
        &[] as &[AgendaRelationship],
        |row| (row.id, row.pair()),
    );
    assert_eq!(first.insert.len(), 2);

    // Pretend the inserts landed as rows 1 and 2.
    let stored: Vec<AgendaRelationship> = first
        .insert
        .iter()
        .enumerate()
        .map(|(i, pair)| edge(i as i32 + 1, pair.from, pair.to))
        .collect();

    let second = reconcile(desired.iter().copied(), &stored, |row| {
        (row.id, row.pair())
    });
    assert!(second.is_noop());
}

// ============================================================================
// Speaker-to-agenda associations
// ============================================================================

fn association(id: i32, speaker: i32, agenda: i32) -> SpeakerAgenda {
    SpeakerAgenda {
        id,
        speaker,
        agenda,
    }
}

#[test]
fn new_speaker_is_added_and_existing_kept() {
    // Agenda 5 currently has speaker 7; the edit wants speakers 7 and 8.
    let current = vec![association(10, 7, 5)];

    let plan = reconcile([7, 8], &current, |row| (row.id, row.speaker));

    assert_eq!(plan.insert, vec![8]);
    assert!(plan.delete.is_empty());
}

#[test]
fn clearing_the_speaker_list_deletes_every_association() {
    let current = vec![association(1, 7, 5), association(2, 8, 5)];

    let plan = reconcile(std::iter::empty(), &current, |row| (row.id, row.speaker));

    assert!(plan.insert.is_empty());
    assert_eq!(plan.delete, vec![1, 2]);
}

#[test]
fn association_keyed_from_the_speaker_side() {
    // Speaker 7 appears in agendas 5 and 6; the edit drops 5 and adds 9.
    let current = vec![association(1, 7, 5), association(2, 7, 6)];

    let plan = reconcile([6, 9], &current, |row| (row.id, row.agenda));

    assert_eq!(plan.insert, vec![9]);
    assert_eq!(plan.delete, vec![1]);
}

#[test]
fn plans_never_overlap() {
    let current = vec![
        association(1, 2, 5),
        association(2, 3, 5),
        association(3, 4, 5),
    ];
    let plan = reconcile([3, 4, 5, 6], &current, |row| (row.id, row.speaker));

    // Deleted rows' keys must not reappear as inserts.
    let deleted_keys: Vec<i32> = current
        .iter()
        .filter(|row| plan.delete.contains(&row.id))
        .map(|row| row.speaker)
        .collect();
    for key in &plan.insert {
        assert!(!deleted_keys.contains(key));
    }

    assert_eq!(plan.insert, vec![5, 6]);
    assert_eq!(plan.delete, vec![1]);
}
