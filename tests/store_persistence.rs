use schoold::db::{Collection, LoadOutcome};
use schoold::model::Role;
use schoold::store::StudentInput;
use schoold::{DataStore, StoreError};
use std::collections::BTreeMap;
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

fn populate(store: &mut DataStore) {
    let a = store
        .create_student(StudentInput {
            roll: "R1",
            name: "Alice",
            class_label: "10A",
            contact: "alice@example.org",
        })
        .expect("alice")
        .id;
    let b = store
        .create_student(StudentInput {
            roll: "R2",
            name: "Bob",
            class_label: "10A",
            contact: "",
        })
        .expect("bob")
        .id;
    let day: BTreeMap<u64, String> = [(a, "P".to_string()), (b, "A".to_string())].into();
    store.set_attendance("2024-01-10", &day).expect("attendance");
    store
        .add_exam_record(a, "History", "38.5", "40", "2024-01-15")
        .expect("exam");
    store.set_total_fee(b, "300").expect("total");
    store.add_payment(b, "120.25").expect("payment");
}

#[test]
fn first_open_creates_dir_and_seeds_only_credentials() {
    let root = temp_dir("schoold-first-open");
    let dir = root.join("data");
    let store = DataStore::open(&dir).expect("open store");

    assert!(dir.is_dir());
    assert!(dir.join("users.json").is_file());
    for c in [Collection::Students, Collection::Attendance, Collection::Exams, Collection::Fees] {
        assert!(!c.path_in(&dir).exists(), "{} written early", c.as_str());
        assert_eq!(store.load_report().outcome(c), Some(&LoadOutcome::Absent));
    }
    let creds = &store.collections().credentials;
    assert_eq!(creds.len(), 2);
    assert_eq!(creds["admin"].role, Role::Admin);
    assert_eq!(creds["teacher"].role, Role::Teacher);

    let _ = std::fs::remove_dir_all(root);
}

#[test]
fn reload_yields_identical_collections_and_counters() {
    let dir = temp_dir("schoold-roundtrip");
    let mut store = DataStore::open(&dir).expect("open store");
    populate(&mut store);
    let saved = store.collections().clone();
    drop(store);

    let mut reopened = DataStore::open(&dir).expect("reopen");
    assert_eq!(reopened.collections(), &saved);
    assert!(reopened.load_report().is_clean());
    for c in Collection::ALL {
        assert_eq!(reopened.load_report().outcome(c), Some(&LoadOutcome::Loaded));
    }

    let next = reopened
        .create_student(StudentInput {
            roll: "R3",
            name: "Carol",
            ..Default::default()
        })
        .expect("carol");
    assert_eq!(next.id, 3);
    let exam = reopened
        .add_exam_record(next.id, "Art", "1", "1", "2024-01-20")
        .expect("exam");
    assert_eq!(exam.id, 2);

    let _ = std::fs::remove_dir_all(dir);
}

#[test]
fn existing_credentials_are_not_reseeded() {
    let dir = temp_dir("schoold-no-reseed");
    std::fs::write(
        dir.join("users.json"),
        r#"{ "principal": { "password": "s3cret", "role": "admin" } }"#,
    )
    .expect("write users");

    let store = DataStore::open(&dir).expect("open store");
    let creds = &store.collections().credentials;
    assert_eq!(creds.len(), 1);
    assert!(!creds.contains_key("admin"));
    assert_eq!(store.authenticate("principal", "s3cret").expect("login"), Role::Admin);
    assert!(matches!(
        store.authenticate("admin", "1234"),
        Err(StoreError::InvalidCredentials)
    ));

    let _ = std::fs::remove_dir_all(dir);
}

#[test]
fn corrupt_file_loads_empty_and_is_reported() {
    let dir = temp_dir("schoold-corrupt");
    let mut store = DataStore::open(&dir).expect("open store");
    populate(&mut store);
    drop(store);

    std::fs::write(dir.join("students.json"), b"\x80\x04not json at all").expect("corrupt");

    let reopened = DataStore::open(&dir).expect("reopen despite corruption");
    assert!(reopened.list_students().is_empty());
    assert!(matches!(
        reopened.load_report().outcome(Collection::Students),
        Some(LoadOutcome::Corrupt(_))
    ));
    assert!(!reopened.load_report().is_clean());
    let corrupt: Vec<Collection> = reopened.load_report().corrupt().map(|(c, _)| c).collect();
    assert_eq!(corrupt, vec![Collection::Students]);
    // Other collections still loaded.
    assert_eq!(reopened.collections().exams.len(), 1);
    // Opening did not overwrite the damaged file.
    assert_eq!(
        std::fs::read(dir.join("students.json")).expect("read back"),
        b"\x80\x04not json at all"
    );

    let _ = std::fs::remove_dir_all(dir);
}

#[test]
fn failed_write_leaves_memory_unchanged() {
    let root = temp_dir("schoold-write-failure");
    let dir = root.join("data");
    let mut store = DataStore::open(&dir).expect("open store");
    populate(&mut store);
    let before = store.collections().clone();

    // Swap the data directory for a plain file so every write fails.
    std::fs::remove_dir_all(&dir).expect("remove data dir");
    std::fs::write(&dir, b"not a directory").expect("block data dir");

    let e = store
        .create_student(StudentInput {
            roll: "R9",
            name: "Zed",
            ..Default::default()
        })
        .unwrap_err();
    assert!(matches!(e, StoreError::Storage(_)), "{e:?}");
    let e = store.add_payment(1, "5").unwrap_err();
    assert!(matches!(e, StoreError::Storage(_)), "{e:?}");
    let e = store.delete_student(1).unwrap_err();
    assert!(matches!(e, StoreError::Storage(_)), "{e:?}");

    assert_eq!(store.collections(), &before);
    assert!(store.student(1).is_some());

    let _ = std::fs::remove_dir_all(root);
}

#[test]
fn files_are_plain_json() {
    let dir = temp_dir("schoold-json-layout");
    let mut store = DataStore::open(&dir).expect("open store");
    populate(&mut store);

    let students: serde_json::Value = serde_json::from_str(
        &std::fs::read_to_string(dir.join("students.json")).expect("read students"),
    )
    .expect("students json");
    assert_eq!(students[0]["roll"], "R1");
    assert_eq!(students[0]["class"], "10A");

    let attendance: serde_json::Value = serde_json::from_str(
        &std::fs::read_to_string(dir.join("attendance.json")).expect("read attendance"),
    )
    .expect("attendance json");
    assert_eq!(attendance["1"]["2024-01-10"], "P");
    assert_eq!(attendance["2"]["2024-01-10"], "A");

    let fees: serde_json::Value = serde_json::from_str(
        &std::fs::read_to_string(dir.join("fees.json")).expect("read fees"),
    )
    .expect("fees json");
    assert_eq!(fees["2"]["total"], 300.0);
    assert_eq!(fees["2"]["history"].as_array().map(|h| h.len()), Some(1));

    assert!(!dir.join("students.json.tmp").exists());

    let _ = std::fs::remove_dir_all(dir);
}

#[test]
fn float_fields_survive_reload_bit_for_bit() {
    let dir = temp_dir("schoold-float-roundtrip");
    let mut store = DataStore::open(&dir).expect("open store");
    let sid = store
        .create_student(StudentInput {
            roll: "F1",
            name: "Fiona",
            ..Default::default()
        })
        .expect("fiona")
        .id;

    let awkward = [
        "207643.68438649282",
        "0.1",
        "0.30000000000000004",
        "1e-7",
        "98765.4321098765",
        "3.141592653589793",
    ];
    store.set_total_fee(sid, "1000000.0000001").expect("total");
    for raw in awkward {
        store
            .add_exam_record(sid, "Math", raw, raw, "2024-06-01")
            .expect("exam");
        store.add_payment(sid, raw).expect("payment");
    }
    // Repeated additions make `paid` an arbitrary binary value.
    for i in 0..50 {
        store
            .add_payment(sid, &format!("{}.{:02}", i * 7, i))
            .expect("small payment");
    }
    let saved = store.collections().clone();
    drop(store);

    let reopened = DataStore::open(&dir).expect("reopen");
    assert_eq!(reopened.collections(), &saved);
    assert_eq!(
        reopened.collections().exams[0].marks.to_bits(),
        "207643.68438649282".parse::<f64>().expect("f64").to_bits()
    );
    assert_eq!(
        reopened.get_fee_view(sid).paid.to_bits(),
        saved.fees[&sid].paid.to_bits()
    );

    let _ = std::fs::remove_dir_all(dir);
}
