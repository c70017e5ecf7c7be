use async_trait::async_trait;
use seatsmart::{
    Config, FileStore, NameError, NameGenerator, PlanStore, ReassignStatus, Session, TableId,
};

fn config_in(dir: &std::path::Path) -> Config {
    Config {
        store_dir: dir.join("plans"),
        table_count: 2,
        table_capacity: 2,
        ..Config::default()
    }
}

fn open(dir: &std::path::Path) -> Session<FileStore> {
    let config = config_in(dir);
    let store = FileStore::new(&config.store_dir);
    Session::open(store, "party", config).unwrap()
}

fn seated_names(session: &Session<FileStore>, table: &str) -> Vec<String> {
    let plan = session.plan();
    plan.table(&TableId::from(table))
        .unwrap()
        .guests
        .iter()
        .map(|id| plan.guest(id).unwrap().display_name.clone())
        .collect()
}

#[test]
fn import_auto_assign_and_reload() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = open(dir.path());

    session
        .import_guests("Eve\nbob, Alice\nDan\nCarol\nBob")
        .unwrap();
    let unassigned = session.auto_assign().unwrap();

    assert_eq!(seated_names(&session, "table-1"), ["Alice", "bob"]);
    assert_eq!(seated_names(&session, "table-2"), ["Bob (2)", "Carol"]);
    let left: Vec<_> = unassigned.iter().map(|g| g.display_name.as_str()).collect();
    assert_eq!(left, ["Dan", "Eve"]);

    // A second session sees the saved state.
    let reopened = open(dir.path());
    assert!(!reopened.is_new());
    assert_eq!(reopened.plan(), session.plan());
    assert!(reopened.plan().validate().is_ok());
}

#[test]
fn add_guests_reports_duplicates_and_keeps_seating() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = open(dir.path());
    session.import_guests("Alice, Bob").unwrap();
    session.auto_assign().unwrap();

    let outcome = session.add_guests("ALICE\nZed").unwrap();
    assert_eq!(outcome.skipped, ["ALICE"]);
    assert_eq!(outcome.added, ["Zed"]);

    let plan = session.plan();
    assert_eq!(plan.guests.len(), 3);
    assert_eq!(plan.unassigned_count(), 1);
    assert_eq!(seated_names(&session, "table-1"), ["Alice", "Bob"]);
}

#[test]
fn manual_moves_persist_partial_results() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = open(dir.path());
    session.import_guests("A, B, C").unwrap();
    session.auto_assign().unwrap();

    // table-2 holds C; only one of A and B fits.
    let out = session
        .assign_to_table(&["A", "B"], &TableId::from("table-2"))
        .unwrap();
    assert!(matches!(out.status, ReassignStatus::CapacityReached { seated: 1, .. }));

    let reopened = open(dir.path());
    assert_eq!(seated_names(&reopened, "table-1"), Vec::<String>::new());
    assert_eq!(seated_names(&reopened, "table-2"), ["C", "A"]);
    assert!(!reopened.plan().resolve_guest("B").unwrap().is_assigned());
}

#[test]
fn missing_target_table_unseats_and_saves() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = open(dir.path());
    session.import_guests("A, B").unwrap();
    session.auto_assign().unwrap();

    let out = session
        .assign_to_table(&["A"], &TableId::from("table-9"))
        .unwrap();
    assert!(matches!(out.status, ReassignStatus::TableNotFound { .. }));

    let store = FileStore::new(dir.path().join("plans"));
    let stored = store.load("party").unwrap().unwrap();
    assert_eq!(stored.unassigned_count(), 1);
    assert_eq!(stored.tables[0].guests.len(), 1);
}

#[test]
fn regenerating_tables_unseats_everyone() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = open(dir.path());
    session.import_guests("A, B, C").unwrap();
    session.auto_assign().unwrap();

    session.regenerate_tables(4, 6).unwrap();
    assert_eq!(session.plan().tables.len(), 4);
    assert_eq!(session.plan().unassigned_count(), 3);
}

struct FixedNames(Vec<&'static str>);

#[async_trait]
impl NameGenerator for FixedNames {
    async fn generate(&self, _theme: &str, count: usize) -> Result<Vec<String>, NameError> {
        Ok(self.0.iter().take(count).map(|s| s.to_string()).collect())
    }
}

struct Offline;

#[async_trait]
impl NameGenerator for Offline {
    async fn generate(&self, _theme: &str, _count: usize) -> Result<Vec<String>, NameError> {
        Err(NameError::Http("offline".to_string()))
    }
}

#[tokio::test]
async fn generated_names_apply_in_order() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = open(dir.path());

    let changed = session
        .name_tables(&FixedNames(vec!["Rose", "Lily", "Tulip"]), "Flowers")
        .await
        .unwrap();
    assert_eq!(changed, 2);

    let names: Vec<_> = session.plan().tables.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, ["Rose", "Lily"]);
}

#[tokio::test]
async fn failed_generation_changes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = open(dir.path());
    session.import_guests("A").unwrap();
    session.auto_assign().unwrap();
    let before = session.plan().clone();

    let err = session.name_tables(&Offline, "Movies").await.unwrap_err();
    assert!(matches!(err, seatsmart::Error::Names(_)));
    assert_eq!(session.plan(), &before);
}

#[test]
fn lookup_after_reload() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = open(dir.path());
    session.import_guests("Jane Doe, John Smith").unwrap();
    session.auto_assign().unwrap();
    session
        .rename_table(&TableId::from("table-1"), "Head Table")
        .unwrap();

    let reopened = open(dir.path());
    let found = reopened.plan().lookup("smith");
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].table_name, "Head Table");
    assert_eq!(found[0].seat_number, 2);
}
