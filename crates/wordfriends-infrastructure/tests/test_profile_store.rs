use std::fs;
use tempfile::TempDir;
use wordfriends_core::profile::{EndpointProfile, ProfileRepository, ProfileSource};
use wordfriends_infrastructure::ProfileStore;
use wordfriends_infrastructure::default_profiles::FALLBACK_PROFILE_ID;

const DEFAULTS: &str = "\
[siliconflow]
name = SiliconFlow
baseUrl = https://api.siliconflow.cn/v1/chat/completions
model = deepseek-ai/DeepSeek-V3
isDefault = false

[doubao]
baseUrl = https://ark.example.com/api/v3/chat/completions
model = doubao-lite
isDefault = true
";

fn open_store(temp_dir: &TempDir) -> ProfileStore {
    let defaults = temp_dir.path().join("defaults.ini");
    fs::write(&defaults, DEFAULTS).unwrap();
    ProfileStore::open(defaults, temp_dir.path().join("profiles.toml"))
}

fn user_profile(id: &str) -> EndpointProfile {
    EndpointProfile {
        id: id.to_string(),
        name: format!("Profile {id}"),
        base_url: "https://local.example.com/v1/chat/completions".to_string(),
        model: "local-model".to_string(),
        credential: String::new(),
        is_default: false,
        source: ProfileSource::User,
    }
}

#[test]
fn test_list_all_orders_builtin_before_user() {
    let temp_dir = TempDir::new().unwrap();
    let store = open_store(&temp_dir);

    store.upsert_user_profile(user_profile("user_b"), None).unwrap();
    store.upsert_user_profile(user_profile("user_a"), None).unwrap();

    let ids: Vec<String> = store.list_all().into_iter().map(|p| p.id).collect();
    assert_eq!(ids, vec!["siliconflow", "doubao", "user_b", "user_a"]);
}

#[test]
fn test_current_defaults_to_default_flagged_builtin() {
    let temp_dir = TempDir::new().unwrap();
    let store = open_store(&temp_dir);

    assert_eq!(store.get_current().unwrap().id, "doubao");
}

#[test]
fn test_set_current_is_not_validated_and_resolves_lazily() {
    let temp_dir = TempDir::new().unwrap();
    let store = open_store(&temp_dir);

    store.set_current("does-not-exist").unwrap();
    assert_eq!(store.get_current().unwrap().id, "doubao");

    store.upsert_user_profile(user_profile("does-not-exist"), None).unwrap();
    assert_eq!(store.get_current().unwrap().id, "does-not-exist");
}

#[test]
fn test_plaintext_credential_is_encoded_before_storage() {
    let temp_dir = TempDir::new().unwrap();
    let store = open_store(&temp_dir);

    let saved = store
        .upsert_user_profile(user_profile("user_x"), Some("sk-secret"))
        .unwrap();
    assert_ne!(saved.credential, "sk-secret");
    assert_eq!(store.decoded_credential(&saved), "sk-secret");

    let on_disk = fs::read_to_string(temp_dir.path().join("profiles.toml")).unwrap();
    assert!(!on_disk.contains("sk-secret"));
}

#[test]
fn test_upsert_replaces_by_id() {
    let temp_dir = TempDir::new().unwrap();
    let store = open_store(&temp_dir);

    store.upsert_user_profile(user_profile("user_x"), Some("one")).unwrap();
    let mut edited = user_profile("user_x");
    edited.model = "bigger-model".to_string();
    store.upsert_user_profile(edited, Some("two")).unwrap();

    let users: Vec<EndpointProfile> = store
        .list_all()
        .into_iter()
        .filter(|p| p.is_user_defined())
        .collect();
    assert_eq!(users.len(), 1);
    assert_eq!(users[0].model, "bigger-model");
    assert_eq!(store.decoded_credential(&users[0]), "two");
}

#[test]
fn test_builtin_profiles_are_read_only() {
    let temp_dir = TempDir::new().unwrap();
    let store = open_store(&temp_dir);

    let err = store
        .upsert_user_profile(user_profile("siliconflow"), None)
        .unwrap_err();
    assert!(err.is_read_only());
    assert!(store.delete_user_profile("doubao").unwrap_err().is_read_only());
}

#[test]
fn test_deleting_current_reassigns_to_default_builtin() {
    let temp_dir = TempDir::new().unwrap();
    let store = open_store(&temp_dir);

    store.upsert_user_profile(user_profile("user_x"), None).unwrap();
    store.set_current("user_x").unwrap();
    assert_eq!(store.get_current().unwrap().id, "user_x");

    store.delete_user_profile("user_x").unwrap();
    assert_eq!(store.get_current().unwrap().id, "doubao");

    let on_disk = fs::read_to_string(temp_dir.path().join("profiles.toml")).unwrap();
    assert!(on_disk.contains("current_profile_id = \"doubao\""));
}

#[test]
fn test_delete_absent_is_noop() {
    let temp_dir = TempDir::new().unwrap();
    let store = open_store(&temp_dir);

    store.delete_user_profile("ghost").unwrap();
    assert!(!temp_dir.path().join("profiles.toml").exists());
}

#[test]
fn test_unreachable_defaults_use_placeholder_in_memory_only() {
    let temp_dir = TempDir::new().unwrap();
    let store = ProfileStore::open(
        temp_dir.path().join("missing.ini"),
        temp_dir.path().join("profiles.toml"),
    );

    let current = store.get_current().unwrap();
    assert_eq!(current.id, FALLBACK_PROFILE_ID);
    assert!(!temp_dir.path().join("profiles.toml").exists());
}

#[test]
fn test_create_user_profile_and_reset() {
    let temp_dir = TempDir::new().unwrap();
    let store = open_store(&temp_dir);

    let created = store
        .create_user_profile("Local Box", "http://127.0.0.1:8080/v1/chat/completions", "qwen", "k")
        .unwrap();
    assert!(created.id.starts_with("user_local_box_"));
    assert!(created.is_user_defined());
    assert_eq!(store.list_all().len(), 3);

    store.reset_all().unwrap();
    assert_eq!(store.list_all().len(), 2);
}

#[test]
fn test_corrupt_profile_file_lists_builtins_only() {
    let temp_dir = TempDir::new().unwrap();
    let store = open_store(&temp_dir);
    fs::write(temp_dir.path().join("profiles.toml"), "[[profile]\nbroken").unwrap();

    let all = store.list_all();
    assert_eq!(all.len(), 2);
    assert!(all.iter().all(|p| p.source == ProfileSource::BuiltIn));
}
