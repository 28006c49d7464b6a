use super::*;

fn name(s: &str) -> ProjectName {
    ProjectName::parse(s).unwrap()
}

fn store() -> (tempfile::TempDir, RasterStore) {
    let dir = tempfile::tempdir().unwrap();
    let store = RasterStore::new(dir.path().join("projects"));
    (dir, store)
}

#[test]
fn ensure_directory_is_idempotent() {
    let (_tmp, store) = store();
    let p = name("parkA");
    let a = store.ensure_directory(&p).unwrap();
    let b = store.ensure_directory(&p).unwrap();
    assert_eq!(a, b);
    assert!(store.exists(&p));
}

#[test]
fn write_then_read_and_overwrite() {
    let (_tmp, store) = store();
    let p = name("parkA");
    store.ensure_directory(&p).unwrap();

    store.write(&p, ArtifactKind::Source, b"first").unwrap();
    assert_eq!(store.read(&p, ArtifactKind::Source).unwrap(), b"first");

    store.write(&p, ArtifactKind::Source, b"second").unwrap();
    assert_eq!(store.read(&p, ArtifactKind::Source).unwrap(), b"second");
    assert!(store.artifact_path(&p, ArtifactKind::Source).ends_with("parkA/image.png"));
}

#[test]
fn write_leaves_no_temp_files() {
    let (_tmp, store) = store();
    let p = name("parkA");
    let dir = store.ensure_directory(&p).unwrap();
    for kind in ArtifactKind::ALL {
        store.write(&p, kind, b"x").unwrap();
    }

    let mut names: Vec<String> = fs::read_dir(&dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    assert_eq!(names, vec!["heatmap.png", "image.png", "mask.png"]);
}

#[test]
fn write_requires_directory() {
    let (_tmp, store) = store();
    let err = store
        .write(&name("ghost"), ArtifactKind::Mask, b"x")
        .unwrap_err();
    assert!(matches!(err, TerraError::NotFound(_)));
}

#[test]
fn read_missing_project_or_artifact_is_not_found() {
    let (_tmp, store) = store();
    let p = name("parkA");
    assert!(matches!(
        store.read(&p, ArtifactKind::Source).unwrap_err(),
        TerraError::NotFound(_)
    ));

    store.ensure_directory(&p).unwrap();
    assert!(matches!(
        store.read(&p, ArtifactKind::Heatmap).unwrap_err(),
        TerraError::NotFound(_)
    ));
}

#[test]
fn remove_deletes_everything() {
    let (_tmp, store) = store();
    let p = name("parkA");
    store.ensure_directory(&p).unwrap();
    store.write(&p, ArtifactKind::Source, b"x").unwrap();

    store.remove(&p).unwrap();
    assert!(!store.exists(&p));
    assert!(matches!(
        store.remove(&p).unwrap_err(),
        TerraError::NotFound(_)
    ));
}

#[test]
fn rename_moves_directory() {
    let (_tmp, store) = store();
    let (a, b) = (name("parkA"), name("parkB"));
    store.ensure_directory(&a).unwrap();
    store.write(&a, ArtifactKind::Source, b"bytes").unwrap();

    store.rename(&a, &b).unwrap();
    assert!(!store.exists(&a));
    assert_eq!(store.read(&b, ArtifactKind::Source).unwrap(), b"bytes");
}

#[test]
fn rename_conflict_and_missing() {
    let (_tmp, store) = store();
    let (a, b) = (name("parkA"), name("parkB"));
    assert!(matches!(
        store.rename(&a, &b).unwrap_err(),
        TerraError::NotFound(_)
    ));

    store.ensure_directory(&a).unwrap();
    store.ensure_directory(&b).unwrap();
    assert!(matches!(
        store.rename(&a, &b).unwrap_err(),
        TerraError::Conflict(_)
    ));
    assert!(store.exists(&a));
}

#[test]
fn list_directories_sorted_and_empty_when_root_missing() {
    let (_tmp, store) = store();
    assert!(store.list_directories().unwrap().is_empty());

    store.ensure_directory(&name("zeta")).unwrap();
    store.ensure_directory(&name("alpha")).unwrap();
    fs::write(store.projects_dir().join("stray.txt"), b"x").unwrap();
    assert_eq!(store.list_directories().unwrap(), vec!["alpha", "zeta"]);
}

/// Drop write permission on `dir`. Returns false, with permissions restored, when the current
/// user can write regardless (for example when running as root).
#[cfg(unix)]
fn deny_writes(dir: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;

    fs::set_permissions(dir, fs::Permissions::from_mode(0o555)).unwrap();
    let check = dir.join(".write-check");
    if fs::write(&check, b"").is_ok() {
        fs::remove_file(&check).unwrap();
        allow_writes(dir);
        return false;
    }
    true
}

#[cfg(unix)]
fn allow_writes(dir: &Path) {
    use std::os::unix::fs::PermissionsExt;

    fs::set_permissions(dir, fs::Permissions::from_mode(0o755)).unwrap();
}

#[cfg(unix)]
#[test]
fn remove_lists_surviving_entries_when_it_stops_part_way() {
    let (_tmp, store) = store();
    let p = name("parkA");
    let dir = store.ensure_directory(&p).unwrap();
    store.write(&p, ArtifactKind::Source, b"x").unwrap();
    let locked = dir.join("locked");
    fs::create_dir(&locked).unwrap();
    fs::write(locked.join("kept.png"), b"y").unwrap();

    if !deny_writes(&locked) {
        return;
    }
    let result = store.remove(&p);
    allow_writes(&locked);

    let err = result.unwrap_err();
    let TerraError::Io { context, .. } = &err else {
        panic!("expected io error, got {err:?}");
    };
    assert!(context.contains("surviving entries"), "{context}");
    assert!(context.contains("kept.png"), "{context}");
    assert!(store.exists(&p));
}

#[test]
fn survivor_listing_recurses_into_subdirectories() {
    let tmp = tempfile::tempdir().unwrap();
    fs::create_dir_all(tmp.path().join("a/b")).unwrap();
    fs::write(tmp.path().join("a/b/mask.png"), b"m").unwrap();

    let mut found = Vec::new();
    collect_entries(tmp.path(), &mut found);
    found.sort();
    assert_eq!(found.len(), 3);
    assert!(found.iter().any(|e| e.ends_with("mask.png")));
}
