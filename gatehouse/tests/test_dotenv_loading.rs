use std::env;
use std::fs;
use tempfile::TempDir;

/// .env.local is loaded before .env, the process environment wins over both
#[test]
fn test_dotenv_overrides_store_settings() {
    let temp_dir = TempDir::new().unwrap();

    env::remove_var("GATEHOUSE__STORE__SEED_ACTOR");
    env::remove_var("GATEHOUSE__STORE__SNAPSHOT_PATH");
    env::set_var("GATEHOUSE__API__BIND_ADDRESS", "127.0.0.1:9999");

    let env_path = temp_dir.path().join(".env");
    fs::write(
        &env_path,
        "GATEHOUSE__STORE__SEED_ACTOR=from_env\n\
         GATEHOUSE__STORE__SNAPSHOT_PATH=/tmp/from_env.yaml\n\
         GATEHOUSE__API__BIND_ADDRESS=0.0.0.0:1\n",
    )
    .unwrap();
    let env_local_path = temp_dir.path().join(".env.local");
    fs::write(&env_local_path, "GATEHOUSE__STORE__SEED_ACTOR=from_env_local\n").unwrap();

    dotenvy::from_path(&env_local_path).ok();
    dotenvy::from_path(&env_path).ok();

    assert_eq!(
        env::var("GATEHOUSE__STORE__SEED_ACTOR").unwrap(),
        "from_env_local"
    );
    assert_eq!(
        env::var("GATEHOUSE__STORE__SNAPSHOT_PATH").unwrap(),
        "/tmp/from_env.yaml"
    );
    assert_eq!(
        env::var("GATEHOUSE__API__BIND_ADDRESS").unwrap(),
        "127.0.0.1:9999"
    );

    env::remove_var("GATEHOUSE__STORE__SEED_ACTOR");
    env::remove_var("GATEHOUSE__STORE__SNAPSHOT_PATH");
    env::remove_var("GATEHOUSE__API__BIND_ADDRESS");
}

#[test]
fn test_missing_dotenv_files_are_ignored() {
    let temp_dir = TempDir::new().unwrap();
    assert!(dotenvy::from_path(temp_dir.path().join(".env")).is_err());
    assert!(dotenvy::from_path(temp_dir.path().join(".env.local")).is_err());
}
