//! Concurrency and fan-out tests.

use super::*;
use std::sync::Arc;
use std::thread;

#[test]
fn many_tags_resolve_in_edge_order_with_narrow_fanout() {
    let options = DatabaseOptions {
        max_tag_lookups: 2,
        ..DatabaseOptions::default()
    };
    let (db, _temp) = setup_temp_db_with(options);
    let tx = db.transaction("t1").expect("tenant");

    let note = tx.create_note(NewNote::new("busy", "")).expect("note");
    let mut expected = Vec::new();
    for i in 0..17 {
        let tag = tx.create_tag(NewTag::new(format!("tag-{:02}", i))).expect("tag");
        tx.tag_note(note.id, tag.id).expect("tag note");
        expected.push(tag.name);
    }

    let found = tx.find_note_by_id(note.id).expect("find").expect("note");
    assert_eq!(tag_names(&found), expected);
}

#[test]
fn concurrent_creates_get_unique_ids() {
    let options = DatabaseOptions {
        id_lease_size: 3,
        ..DatabaseOptions::default()
    };
    let (db, _temp) = setup_temp_db_with(options);
    let db = Arc::new(db);

    let handles: Vec<_> = (0..4)
        .map(|worker| {
            let db = db.clone();
            thread::spawn(move || {
                let tx = db.transaction("t1").expect("tenant");
                (0..10)
                    .map(|i| {
                        tx.create_note(NewNote::new(format!("w{}-{}", worker, i), ""))
                            .expect("create")
                            .id
                    })
                    .collect::<Vec<u64>>()
            })
        })
        .collect();

    let mut ids = HashSet::new();
    for handle in handles {
        for id in handle.join().expect("worker") {
            assert_ne!(id, 0);
            assert!(ids.insert(id), "duplicate id {}", id);
        }
    }
    assert_eq!(ids.len(), 40);

    let tx = db.transaction("t1").expect("tenant");
    assert_eq!(tx.find_all_notes().expect("list").len(), 40);
}

#[test]
fn concurrent_readers_and_tagging_do_not_fail() {
    let (db, _temp) = setup_temp_db();
    let db = Arc::new(db);
    let (note_id, tag_ids) = {
        let tx = db.transaction("t1").expect("tenant");
        let note = tx.create_note(NewNote::new("n", "")).expect("note");
        let tags: Vec<u64> = (0..6)
            .map(|i| tx.create_tag(NewTag::new(format!("t{}", i))).expect("tag").id)
            .collect();
        (note.id, tags)
    };

    let writer = {
        let db = db.clone();
        let tag_ids = tag_ids.clone();
        thread::spawn(move || {
            let tx = db.transaction("t1").expect("tenant");
            for tag_id in tag_ids {
                tx.tag_note(note_id, tag_id).expect("tag");
            }
        })
    };
    let reader = {
        let db = db.clone();
        thread::spawn(move || {
            let tx = db.transaction("t1").expect("tenant");
            for _ in 0..20 {
                let note = tx.find_note_by_id(note_id).expect("find").expect("note");
                assert!(note.tags.len() <= 6);
            }
        })
    };

    writer.join().expect("writer");
    reader.join().expect("reader");

    let tx = db.transaction("t1").expect("tenant");
    let note = tx.find_note_by_id(note_id).expect("find").expect("note");
    assert_eq!(note.tags.len(), tag_ids.len());
}
