//! Tenant isolation tests.

use super::*;

#[test]
fn tenants_never_see_each_others_rows() {
    let (db, _temp) = setup_temp_db();
    let alpha = db.transaction("alpha").expect("alpha");
    let beta = db.transaction("beta").expect("beta");

    let note = alpha
        .create_note(NewNote::new("private", "alpha only"))
        .expect("create");
    let tag = alpha.create_tag(NewTag::new("secret")).expect("tag");
    alpha.tag_note(note.id, tag.id).expect("tag note");

    assert!(beta.find_all_notes().expect("list").is_empty());
    assert!(beta.find_all_tags().expect("list").is_empty());
    assert!(beta.find_note_by_id(note.id).expect("find").is_none());
    assert!(beta.find_tag_by_id(tag.id).expect("find").is_none());
    assert!(beta.tag_ids_for_note(note.id).expect("edges").is_empty());
    assert!(beta.note_ids_for_tag(tag.id).expect("edges").is_empty());

    assert!(!beta.delete_note(note.id).expect("delete"));
    assert!(alpha.find_note_by_id(note.id).expect("find").is_some());
}

#[test]
fn tenant_prefixes_do_not_collide() {
    let (db, _temp) = setup_temp_db();
    let short = db.transaction("t").expect("t");
    let long = db.transaction("t1").expect("t1");

    short.create_note(NewNote::new("short", "")).expect("create");
    long.create_note(NewNote::new("long", "")).expect("create");

    let short_titles: Vec<String> = short
        .find_all_notes()
        .expect("list")
        .into_iter()
        .map(|n| n.title)
        .collect();
    assert_eq!(short_titles, vec!["short".to_string()]);

    let long_titles: Vec<String> = long
        .find_all_notes()
        .expect("list")
        .into_iter()
        .map(|n| n.title)
        .collect();
    assert_eq!(long_titles, vec!["long".to_string()]);
}

#[test]
fn ids_are_unique_across_tenants() {
    let (db, _temp) = setup_temp_db();
    let alpha = db.transaction("alpha").expect("alpha");
    let beta = db.transaction("beta").expect("beta");

    let mut seen = HashSet::new();
    for i in 0..10 {
        let tx = if i % 2 == 0 { &alpha } else { &beta };
        let id = tx.create_note(NewNote::new("n", "")).expect("create").id;
        assert!(seen.insert(id), "duplicate id {}", id);
    }
}
