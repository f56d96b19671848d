use dekdekapp::model::Collection;
use dekdekapp::store::backend::StorageBackend;
use dekdekapp::store::fs_backend::FsBackend;
use std::fs;
use tempfile::TempDir;

fn setup() -> (TempDir, FsBackend) {
    let dir = TempDir::new().unwrap();
    let backend = FsBackend::new(dir.path().join("data"));
    (dir, backend)
}

#[test]
fn test_missing_collection_reads_as_none() {
    let (_dir, backend) = setup();
    assert_eq!(backend.read_collection(Collection::Books).unwrap(), None);
}

#[test]
fn test_write_creates_data_dir_and_roundtrips() {
    let (_dir, backend) = setup();
    assert!(!backend.data_dir().exists());

    backend
        .write_collection(Collection::Quotes, "[{\"id\": 1}]")
        .unwrap();
    assert!(backend.data_dir().is_dir());
    assert_eq!(
        backend.read_collection(Collection::Quotes).unwrap().as_deref(),
        Some("[{\"id\": 1}]")
    );
    assert_eq!(
        backend.collection_path(Collection::Quotes),
        backend.data_dir().join("quotes.json")
    );
}

#[test]
fn test_atomic_write_leaves_no_artifacts() {
    let (_dir, backend) = setup();
    backend.write_collection(Collection::Books, "[]").unwrap();
    backend.write_collection(Collection::Books, "[ ]").unwrap();

    let names: Vec<String> = fs::read_dir(backend.data_dir())
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["books.json".to_string()]);
}

#[test]
fn test_collections_are_separate_files() {
    let (_dir, backend) = setup();
    backend.write_collection(Collection::Books, "[1]").unwrap();
    backend.write_collection(Collection::Quotes, "[2]").unwrap();
    assert_eq!(
        fs::read_to_string(backend.data_dir().join("books.json")).unwrap(),
        "[1]"
    );
    assert_eq!(
        fs::read_to_string(backend.data_dir().join("quotes.json")).unwrap(),
        "[2]"
    );
}
