use super::test_helpers::FailingStore;
use super::*;

/// A fresh directory under the system temp dir, unique per test.
fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("livewall-store-{name}-{}", uuid::Uuid::new_v4()));
    std::fs::create_dir_all(&dir).expect("create scratch dir");
    dir
}

fn words(list: &[&str]) -> Vec<String> {
    list.iter().map(|w| (*w).to_owned()).collect()
}

#[tokio::test]
async fn missing_file_loads_empty() {
    let store = FileModerationStore::new(scratch_dir("missing").join("moderation.json"));
    assert_eq!(store.load().await.expect("load"), Vec::<String>::new());
}

#[tokio::test]
async fn save_then_load_returns_same_list() {
    let store = FileModerationStore::new(scratch_dir("save").join("moderation.json"));
    let list = words(&["damn", "spoiler", "ばか"]);
    store.save(&list).await.expect("save");
    assert_eq!(store.load().await.expect("load"), list);
}

#[tokio::test]
async fn save_replaces_previous_list_wholesale() {
    let store = FileModerationStore::new(scratch_dir("replace").join("moderation.json"));
    store.save(&words(&["a", "b", "c"])).await.expect("save");
    store.save(&words(&["z"])).await.expect("save");
    assert_eq!(store.load().await.expect("load"), words(&["z"]));
}

#[tokio::test]
async fn save_leaves_no_temp_file_behind() {
    let dir = scratch_dir("temp");
    let store = FileModerationStore::new(dir.join("moderation.json"));
    store.save(&words(&["x"])).await.expect("save");
    let names: Vec<String> = std::fs::read_dir(&dir)
        .expect("read dir")
        .flatten()
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, ["moderation.json"]);
}

#[tokio::test]
async fn file_is_a_plain_json_array() {
    let dir = scratch_dir("format");
    let path = dir.join("moderation.json");
    FileModerationStore::new(&path).save(&words(&["one", "two"])).await.expect("save");
    let raw = std::fs::read_to_string(&path).expect("read");
    let parsed: serde_json::Value = serde_json::from_str(&raw).expect("json");
    assert_eq!(parsed, serde_json::json!(["one", "two"]));
}

#[tokio::test]
async fn save_creates_missing_parent_directories() {
    let path = scratch_dir("nested").join("a").join("b").join("moderation.json");
    let store = FileModerationStore::new(&path);
    store.save(&words(&["x"])).await.expect("save");
    assert!(path.exists());
}

#[tokio::test]
async fn corrupt_file_is_a_format_error() {
    let path = scratch_dir("corrupt").join("moderation.json");
    std::fs::write(&path, "{not json").expect("write");
    let err = FileModerationStore::new(&path).load().await.expect_err("corrupt");
    assert!(matches!(err, StoreError::Format(_)));
}

#[tokio::test]
async fn load_or_empty_falls_back_on_corrupt_file() {
    let path = scratch_dir("fallback").join("moderation.json");
    std::fs::write(&path, r#"{"words": 3}"#).expect("write");
    let store = FileModerationStore::new(&path);
    assert!(load_or_empty(&store).await.is_empty());
}

#[tokio::test]
async fn load_or_empty_falls_back_on_io_error() {
    assert!(load_or_empty(&FailingStore).await.is_empty());
}

#[test]
fn temp_path_is_a_sibling() {
    let store = FileModerationStore::new("/var/lib/livewall/moderation.json");
    assert_eq!(store.temp_path(), PathBuf::from("/var/lib/livewall/moderation.json.tmp"));
    assert_eq!(store.path(), Path::new("/var/lib/livewall/moderation.json"));
}
