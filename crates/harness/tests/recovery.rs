use mapedit_core::{
    ActionKind, Billboard, CollisionSphere, Editable, EntityRef, Gate, MeshObject, Portal, Vec3,
};
use mapedit_engine::{Editor, EditorConfig, Notice};
use mapedit_harness::TestSession;

/// Loads the same saved map into whatever editor the session holds.
fn load_saved_map(session: &mut TestSession) -> (EntityRef, EntityRef) {
    let gate = session.editor.load_entity(Gate::new(Vec3::ONE, 1));
    let object = session
        .editor
        .load_entity(MeshObject::new(Vec3::ZERO, "rock.obj"));
    (gate, object)
}

// ============================================================================
// Journal contents
// ============================================================================

#[test]
fn journal_lists_new_and_saved_entities() -> Result<(), Box<dyn std::error::Error>> {
    let mut session = TestSession::new()?;
    let (gate, _) = load_saved_map(&mut session);

    session.editor.create_entity(CollisionSphere::new(Vec3::new(2.0, 0.0, 0.0), 1.5));
    session.editor.set_attribute(&gate, ActionKind::GateLink, "7")?;

    assert_eq!(
        session.journal_lines()?,
        vec![
            "CollSphere;2;0;0;1.5".to_string(),
            "Gate|1,1,1|Gate;1;1;1;0;0;0;7".to_string(),
        ]
    );
    Ok(())
}

#[test]
fn position_edit_is_journaled_under_pre_edit_identity() -> Result<(), Box<dyn std::error::Error>> {
    let mut session = TestSession::new()?;
    let (_, object) = load_saved_map(&mut session);

    session.editor.set_attribute(&object, ActionKind::Position, "5,0,0")?;

    assert_eq!(
        session.journal_lines()?,
        vec!["Object|rock.obj|0,0,0|Object;5;0;0;rock.obj;0;0;0;1;1;1".to_string()]
    );
    Ok(())
}

#[test]
fn deleted_new_entity_is_not_written() -> Result<(), Box<dyn std::error::Error>> {
    let mut session = TestSession::new()?;
    let portal = session.editor.create_entity(Portal::new(Vec3::ZERO, "dungeon"));
    assert_eq!(session.journal_lines()?.len(), 1);

    session.editor.delete_entity(&portal)?;
    assert!(session.journal_lines()?.is_empty());
    assert!(session.editor.journal().contains(&portal));

    session.editor.undo();
    assert_eq!(session.journal_lines()?, vec!["Portal;0;0;0;0;0;0;dungeon".to_string()]);
    Ok(())
}

#[test]
fn mark_saved_clears_the_journal() -> Result<(), Box<dyn std::error::Error>> {
    let mut session = TestSession::new()?;
    session.editor.create_entity(Billboard::new(Vec3::ZERO, "sign.png"));
    assert!(session.journal_path().exists());

    session.editor.mark_saved()?;
    assert!(!session.journal_path().exists());
    assert!(session.journal_lines()?.is_empty());
    Ok(())
}

// ============================================================================
// Crash and recover
// ============================================================================

#[test]
fn recovery_creates_new_and_updates_saved_without_duplicates()
-> Result<(), Box<dyn std::error::Error>> {
    let mut session = TestSession::new()?;
    let (gate, _) = load_saved_map(&mut session);
    session.editor.create_entity(CollisionSphere::new(Vec3::new(2.0, 0.0, 0.0), 1.5));
    session.editor.set_attribute(&gate, ActionKind::GateLink, "7")?;

    session.crash_and_reopen()?;
    let (gate, object) = load_saved_map(&mut session);
    let report = session.editor.recover()?;

    assert_eq!(report.created.len(), 1);
    assert_eq!(report.created[0].canonical_attributes(), "CollSphere;2;0;0;1.5");
    assert_eq!(report.updated, vec![(gate.clone(), "Gate|1,1,1".to_string())]);
    assert!(report.skipped.is_empty());

    assert_eq!(session.editor.world().len(), 3);
    assert_eq!(gate.canonical_attributes(), "Gate;1;1;1;0;0;0;7");
    assert_eq!(object.canonical_attributes(), "Object;0;0;0;rock.obj;0;0;0;1;1;1");
    // Recovery itself is not undoable.
    assert!(!session.editor.can_undo());
    Ok(())
}

#[test]
fn moved_saved_entity_is_found_by_its_old_identity() -> Result<(), Box<dyn std::error::Error>> {
    let mut session = TestSession::new()?;
    let (_, object) = load_saved_map(&mut session);
    session.editor.set_attribute(&object, ActionKind::Position, "5,0,0")?;
    session.editor.set_attribute(&object, ActionKind::Mesh, "boulder.obj")?;

    session.crash_and_reopen()?;
    let (_, object) = load_saved_map(&mut session);
    let report = session.editor.recover()?;

    assert_eq!(report.updated.len(), 1);
    assert_eq!(object.identity(), "Object|boulder.obj|5,0,0");
    assert_eq!(session.editor.world().len(), 2);
    Ok(())
}

#[test]
fn new_entity_at_saved_identity_does_not_absorb_saved_edit()
-> Result<(), Box<dyn std::error::Error>> {
    let mut session = TestSession::new()?;
    let (gate, _) = load_saved_map(&mut session);
    session.editor.create_entity(Gate::new(Vec3::ONE, 2));
    session.editor.set_attribute(&gate, ActionKind::Position, "5,5,5")?;

    session.crash_and_reopen()?;
    let (gate, _) = load_saved_map(&mut session);
    let report = session.editor.recover()?;

    assert!(report.skipped.is_empty());
    assert_eq!(report.updated, vec![(gate.clone(), "Gate|1,1,1".to_string())]);
    assert_eq!(gate.canonical_attributes(), "Gate;5;5;5;0;0;0;1");
    assert_eq!(report.created.len(), 1);
    assert_eq!(report.created[0].canonical_attributes(), "Gate;1;1;1;0;0;0;2");
    assert_eq!(session.editor.world().len(), 3);
    Ok(())
}

#[test]
fn recovered_changes_survive_a_second_crash() -> Result<(), Box<dyn std::error::Error>> {
    let mut session = TestSession::new()?;
    let (_, object) = load_saved_map(&mut session);
    session.editor.set_attribute(&object, ActionKind::Position, "5,0,0")?;
    session.editor.create_entity(CollisionSphere::new(Vec3::ZERO, 3.0));
    let before = session.journal_lines()?;

    session.crash_and_reopen()?;
    load_saved_map(&mut session);
    session.editor.recover()?;
    assert_eq!(session.journal_lines()?.len(), before.len());

    session.crash_and_reopen()?;
    let (_, object) = load_saved_map(&mut session);
    let report = session.editor.recover()?;
    assert_eq!(report.created.len(), 1);
    assert_eq!(object.identity(), "Object|rock.obj|5,0,0");
    assert_eq!(session.editor.world().len(), 3);
    Ok(())
}

#[test]
fn undone_edit_recovers_to_original_value() -> Result<(), Box<dyn std::error::Error>> {
    let mut session = TestSession::new()?;
    let (gate, _) = load_saved_map(&mut session);
    session.editor.set_attribute(&gate, ActionKind::Position, "3,3,3")?;
    session.editor.undo();
    assert_eq!(
        session.journal_lines()?,
        vec!["Gate|1,1,1|Gate;1;1;1;0;0;0;1".to_string()]
    );

    session.crash_and_reopen()?;
    let (gate, _) = load_saved_map(&mut session);
    let report = session.editor.recover()?;
    assert_eq!(report.updated.len(), 1);
    assert_eq!(gate.borrow().presence().generation(), 1, "nothing differed");
    Ok(())
}

#[test]
fn malformed_lines_become_notices() -> Result<(), Box<dyn std::error::Error>> {
    let mut session = TestSession::new()?;
    std::fs::write(
        session.journal_path(),
        "Teapot;0;0;0\nGate|9,9,9|Gate;0;0;0;0;0;0;1\nCollSphere;0;0;0;nan?\nCollSphere;1;2;3;4\n",
    )?;
    load_saved_map(&mut session);

    let report = session.editor.recover()?;
    assert_eq!(report.created.len(), 1);
    let lines: Vec<usize> = report.skipped.iter().map(|s| s.line).collect();
    assert_eq!(lines, vec![1, 2, 3]);

    let notices = session.editor.take_notices();
    assert_eq!(notices.len(), 3);
    assert!(notices
        .iter()
        .all(|n| matches!(n, Notice::RecoveryLineSkipped { .. })));

    // Only the line that applied is carried forward.
    assert_eq!(session.journal_lines()?, vec!["CollSphere;1;2;3;4".to_string()]);
    Ok(())
}

#[test]
fn missing_journal_recovers_nothing() -> Result<(), Box<dyn std::error::Error>> {
    let mut session = TestSession::new()?;
    load_saved_map(&mut session);
    let report = session.editor.recover()?;
    assert!(report.is_empty());
    assert!(!session.journal_path().exists());
    Ok(())
}

// ============================================================================
// Failure reporting
// ============================================================================

#[test]
fn unwritable_journal_reports_but_keeps_edit() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let blocked = dir.path().join("recovery.journal");
    // A directory where the journal file should be makes every rename fail.
    std::fs::create_dir(&blocked)?;
    std::fs::write(blocked.join("keep"), "")?;

    let config = EditorConfig {
        history_capacity: 10,
        journal_path: blocked,
    };
    let mut editor = Editor::open(&config)?;
    let sphere = editor.create_entity(CollisionSphere::new(Vec3::ZERO, 1.0));
    editor.set_attribute(&sphere, ActionKind::CollisionRadius, "2")?;

    assert_eq!(sphere.canonical_attributes(), "CollSphere;0;0;0;2");
    let notices = editor.take_notices();
    assert_eq!(notices.len(), 2);
    assert!(notices
        .iter()
        .all(|n| matches!(n, Notice::JournalWriteFailed(_))));
    assert!(!dir.path().join("recovery.journal.tmp").exists());
    Ok(())
}
