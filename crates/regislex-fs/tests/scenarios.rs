//! End-to-end filesystem scenarios.

use regislex_fs::{
    copy_file, exists, file_size, is_directory, mkdir, path_join, rename, rmdir, write_file,
    DirIter,
};
use tempfile::TempDir;

fn scratch() -> (TempDir, String) {
    let dir = TempDir::new().expect("create scratch dir");
    let root = dir.path().to_str().expect("utf-8 temp path").to_string();
    (dir, root)
}

#[test]
fn recursive_mkdir_then_exists() {
    let (_guard, root) = scratch();
    let deep = ["x", "y", "z", "w"]
        .iter()
        .fold(root.clone(), |acc, part| path_join(&acc, part));

    mkdir(&deep, true).unwrap();
    assert!(exists(&deep));
    assert!(is_directory(&deep));

    // Second pass meets "already exists" at every level
    mkdir(&deep, true).unwrap();
}

#[test]
fn recursive_rmdir_removes_whole_tree() {
    for (files, dirs) in [(0usize, 0usize), (3, 0), (0, 3), (4, 2)] {
        let (_guard, root) = scratch();
        let tree = path_join(&root, "tree");
        mkdir(&tree, false).unwrap();

        for d in 0..dirs {
            let sub = path_join(&tree, &format!("dir{d}"));
            mkdir(&sub, false).unwrap();
            write_file(path_join(&sub, "nested.txt"), b"nested").unwrap();
            mkdir(path_join(&sub, "deeper"), false).unwrap();
        }
        for f in 0..files {
            write_file(path_join(&tree, &format!("file{f}.txt")), b"data").unwrap();
        }

        rmdir(&tree, true).unwrap();
        assert!(!exists(&tree), "tree with {files} files / {dirs} dirs survived");
    }
}

#[test]
fn directory_iterator_sees_every_entry_once() {
    let (_guard, root) = scratch();
    for name in ["b", "a", "c"] {
        write_file(path_join(&root, name), name).unwrap();
    }

    let mut iter = DirIter::open(&root).unwrap();
    let mut names = Vec::new();
    while let Some(entry) = iter.next_entry().unwrap() {
        names.push(entry.name);
    }
    iter.close();

    names.sort();
    assert_eq!(names, ["a", "b", "c"]);
}

#[test]
fn copy_rename_remove_end_to_end() {
    let (_guard, scratch_root) = scratch();
    let t1 = path_join(&scratch_root, "t1");
    let leaf = path_join(&path_join(&t1, "a"), "b");

    mkdir(&leaf, true).unwrap();

    let source = path_join(&scratch_root, "source.bin");
    write_file(&source, [7u8; 100]).unwrap();

    let f = path_join(&leaf, "f");
    assert_eq!(copy_file(&source, &f).unwrap(), 100);
    assert_eq!(file_size(&f).unwrap(), 100);

    let g = path_join(&leaf, "g");
    rename(&f, &g).unwrap();
    assert!(!exists(&f));
    assert!(exists(&g));
    assert_eq!(file_size(&g).unwrap(), 100);

    rmdir(&t1, true).unwrap();
    assert!(!exists(&t1));
}
