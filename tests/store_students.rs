use schoold::store::StudentInput;
use schoold::{DataStore, StoreError};
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

fn temp_dir(prefix: &str) -> PathBuf {
    let p = std::env::temp_dir().join(format!(
        "{}-{}",
        prefix,
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock")
            .as_nanos()
    ));
    std::fs::create_dir_all(&p).expect("create temp dir");
    p
}

fn input<'a>(roll: &'a str, name: &'a str) -> StudentInput<'a> {
    StudentInput {
        roll,
        name,
        class_label: "7B",
        contact: "555-0100",
    }
}

#[test]
fn create_trims_fields_and_opens_fee_account() {
    let dir = temp_dir("schoold-students-create");
    let mut store = DataStore::open(&dir).expect("open store");

    let s = store
        .create_student(StudentInput {
            roll: "  R1 ",
            name: " Alice ",
            class_label: " 7B ",
            contact: " 555 ",
        })
        .expect("create student");
    assert_eq!(s.id, 1);
    assert_eq!(s.roll, "R1");
    assert_eq!(s.name, "Alice");
    assert_eq!(s.class_label, "7B");
    assert_eq!(s.contact, "555");
    assert!(store.collections().fees.contains_key(&1));

    let _ = std::fs::remove_dir_all(dir);
}

#[test]
fn create_requires_roll_and_name() {
    let dir = temp_dir("schoold-students-required");
    let mut store = DataStore::open(&dir).expect("open store");

    let e = store.create_student(input("   ", "Alice")).unwrap_err();
    assert!(matches!(e, StoreError::Validation(_)), "{e:?}");
    let e = store.create_student(input("R1", "")).unwrap_err();
    assert!(matches!(e, StoreError::Validation(_)), "{e:?}");
    assert!(store.list_students().is_empty());

    let _ = std::fs::remove_dir_all(dir);
}

#[test]
fn duplicate_roll_is_rejected_and_leaves_collection_unchanged() {
    let dir = temp_dir("schoold-students-dup");
    let mut store = DataStore::open(&dir).expect("open store");
    store.create_student(input("R1", "Alice")).expect("alice");
    let before = store.collections().clone();

    let e = store.create_student(input("R1", "Bob")).unwrap_err();
    assert!(matches!(e, StoreError::DuplicateRoll(ref r) if r == "R1"), "{e:?}");
    assert_eq!(store.collections(), &before);

    // The counter did not advance either.
    let bob = store.create_student(input("R2", "Bob")).expect("bob");
    assert_eq!(bob.id, 2);

    let _ = std::fs::remove_dir_all(dir);
}

#[test]
fn update_checks_roll_against_other_students_only() {
    let dir = temp_dir("schoold-students-update");
    let mut store = DataStore::open(&dir).expect("open store");
    let alice = store.create_student(input("R1", "Alice")).expect("alice");
    let bob = store.create_student(input("R2", "Bob")).expect("bob");

    // Keeping one's own roll is fine.
    let updated = store
        .update_student(
            alice.id,
            StudentInput {
                roll: "R1",
                name: "Alice Smith",
                class_label: "8A",
                contact: "",
            },
        )
        .expect("update alice");
    assert_eq!(updated.name, "Alice Smith");
    assert_eq!(updated.class_label, "8A");

    let e = store.update_student(bob.id, input("R1", "Bob")).unwrap_err();
    assert!(matches!(e, StoreError::DuplicateRoll(_)), "{e:?}");
    assert_eq!(store.student(bob.id).map(|s| s.roll.as_str()), Some("R2"));

    let e = store.update_student(99, input("R9", "Ghost")).unwrap_err();
    assert!(matches!(e, StoreError::NotFound { id: 99, .. }), "{e:?}");

    let _ = std::fs::remove_dir_all(dir);
}

#[test]
fn ids_are_never_reused_after_delete() {
    let dir = temp_dir("schoold-students-ids");
    let mut store = DataStore::open(&dir).expect("open store");

    let a = store.create_student(input("A", "Alice")).expect("a");
    assert_eq!(a.id, 1);
    store.delete_student(a.id).expect("delete a");
    let b = store.create_student(input("B", "Bob")).expect("b");
    assert_eq!(b.id, 2);

    let mut last = b.id;
    for i in 0..5 {
        let roll = format!("X{i}");
        let s = store.create_student(input(&roll, "Someone")).expect("create");
        assert!(s.id > last);
        last = s.id;
        if i % 2 == 0 {
            store.delete_student(s.id).expect("delete");
        }
    }

    let _ = std::fs::remove_dir_all(dir);
}

#[test]
fn delete_unknown_student_is_not_found() {
    let dir = temp_dir("schoold-students-delete-missing");
    let mut store = DataStore::open(&dir).expect("open store");
    let e = store.delete_student(42).unwrap_err();
    assert!(matches!(e, StoreError::NotFound { id: 42, .. }), "{e:?}");

    let _ = std::fs::remove_dir_all(dir);
}

#[test]
fn search_matches_name_or_roll_case_insensitively() {
    let dir = temp_dir("schoold-students-search");
    let mut store = DataStore::open(&dir).expect("open store");
    store.create_student(input("R-100", "Alice")).expect("alice");
    store.create_student(input("R-200", "Bob")).expect("bob");
    store.create_student(input("ALI-9", "Carol")).expect("carol");

    let names: Vec<String> = store
        .search_students("ali")
        .into_iter()
        .map(|s| s.name)
        .collect();
    assert_eq!(names, vec!["Alice", "Carol"]);

    let by_roll = store.search_students("r-2");
    assert_eq!(by_roll.len(), 1);
    assert_eq!(by_roll[0].name, "Bob");

    assert_eq!(store.search_students("  ").len(), 3);
    assert!(store.search_students("zzz").is_empty());

    let _ = std::fs::remove_dir_all(dir);
}

#[test]
fn default_accounts_authenticate_by_exact_match() {
    let dir = temp_dir("schoold-auth");
    let store = DataStore::open(&dir).expect("open store");

    assert_eq!(
        store.authenticate("admin", "1234").expect("admin"),
        schoold::model::Role::Admin
    );
    assert_eq!(
        store.authenticate("teacher", "1234").expect("teacher"),
        schoold::model::Role::Teacher
    );
    for (u, p) in [("admin", "12345"), ("Admin", "1234"), ("nobody", "1234"), ("admin", " 1234")] {
        let e = store.authenticate(u, p).unwrap_err();
        assert!(matches!(e, StoreError::InvalidCredentials), "{u}/{p}");
    }

    let _ = std::fs::remove_dir_all(dir);
}
