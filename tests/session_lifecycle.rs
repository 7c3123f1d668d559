use tempfile::TempDir;
use visionsync::config::Config;
use visionsync::journal::Journal;
use visionsync::{AuthError, AuthSettings, FileStore, Registration, SessionState, SessionStore};

fn open(dir: &TempDir) -> SessionStore<FileStore> {
    SessionStore::new(
        FileStore::open(dir.path()).unwrap(),
        AuthSettings::default(),
    )
}

#[test]
fn test_sign_up_sign_in_sign_out_across_restarts() {
    let dir = TempDir::new().unwrap();

    let store = open(&dir);
    assert_eq!(store.restore_session(), None);

    let form = Registration::new("a@x.com", "secret1", "A", "B");
    let user = store.register(&form).unwrap();
    assert_eq!(user.email, "a@x.com");
    assert!(matches!(
        store.register(&form),
        Err(AuthError::DuplicateEmail)
    ));
    drop(store);

    // Restart: the registration session survives
    let store = open(&dir);
    assert_eq!(store.restore_session(), Some(user.clone()));
    assert_eq!(store.state(), SessionState::Authenticated(user.clone()));

    assert!(matches!(
        store.authenticate("a@x.com", "wrong"),
        Err(AuthError::InvalidCredentials)
    ));
    // A failed sign-in leaves the existing session alone
    assert_eq!(store.current_user(), Some(user.clone()));

    store.sign_out().unwrap();
    store.sign_out().unwrap();
    drop(store);

    let store = open(&dir);
    assert_eq!(store.restore_session(), None);

    let signed_in = store.authenticate("a@x.com", "secret1").unwrap();
    assert_eq!(signed_in, user);
    drop(store);

    let store = open(&dir);
    assert_eq!(store.restore_session(), Some(user));
}

#[test]
fn test_corrupt_session_file_means_signed_out() {
    let dir = TempDir::new().unwrap();
    let store = open(&dir);
    store
        .register(&Registration::new("a@x.com", "secret1", "A", "B"))
        .unwrap();
    drop(store);

    std::fs::write(dir.path().join("user.json"), "\u{0}\u{1}not json").unwrap();

    let store = open(&dir);
    assert_eq!(store.restore_session(), None);
    assert_eq!(store.users().unwrap().len(), 1);
    assert!(store.authenticate("a@x.com", "secret1").is_ok());
}

#[test]
fn test_store_built_from_config() {
    let dir = TempDir::new().unwrap();
    let config: Config = toml::from_str(&format!(
        "[storage]\ndir = {:?}\n\n[auth]\nseed_demo_user = true\n",
        dir.path().join("data")
    ))
    .unwrap();

    let journal_path = config.journal_path().unwrap();
    let store = SessionStore::new(
        FileStore::open(config.data_dir()).unwrap(),
        config.auth_settings(),
    )
    .with_journal(Journal::open(&journal_path).unwrap());

    let demo = store
        .authenticate(visionsync::demo::DEMO_EMAIL, visionsync::demo::DEMO_PASSWORD)
        .unwrap();
    assert_eq!(demo.id, visionsync::demo::DEMO_USER_ID);

    let journal = std::fs::read_to_string(journal_path).unwrap();
    let types: Vec<String> = journal
        .lines()
        .map(|l| {
            let v: serde_json::Value = serde_json::from_str(l).unwrap();
            v["type"].as_str().unwrap().to_string()
        })
        .collect();
    assert_eq!(types, vec!["demo_seeded", "sign_in"]);
    assert!(!journal.contains(visionsync::demo::DEMO_PASSWORD));
}
