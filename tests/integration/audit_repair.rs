//! Audit and repair passes over an on-disk notebook tree.

use super::test_utils::write_notebook;
use nbforge::artifact::store::{read_artifact, write_artifact};
use nbforge::artifact::{Artifact, Block};
use nbforge::audit::{audit, repair_all, AuditPolicy, AuditSummary, RepairAction, RepairSummary};
use nbforge::catalog::TitleTable;
use std::collections::BTreeMap;
use std::path::Path;
use tempfile::TempDir;
use walkdir::WalkDir;

fn titles() -> TitleTable {
    [
        ("042", "Widgets"),
        ("079", "RAG (Retrieval-Augmented Generation) Fundamentals"),
        ("085", "Vector Databases"),
    ]
    .into_iter()
    .map(|(id, title)| (id.to_string(), title.to_string()))
    .collect()
}

/// Every file under `root` with its bytes.
fn snapshot(root: &Path) -> BTreeMap<String, Vec<u8>> {
    WalkDir::new(root)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .map(|e| {
            (
                e.path().display().to_string(),
                std::fs::read(e.path()).unwrap(),
            )
        })
        .collect()
}

fn store(dir: &TempDir) {
    let root = dir.path();
    write_notebook(root, "08_Modern_AI/079_RAG_Fundamentals.ipynb", "# 079: RAG Fundamentals");
    write_notebook(root, "08_Modern_AI/085_Vector_Databases.ipynb", "# 085 - Vector Databases");
    write_notebook(root, "03_Widgets/042_Widgets.ipynb", "Some old heading\n\nBody text");
    write_notebook(root, "03_Widgets/043_Gadgets.ipynb", "Gadget notes");
    write_notebook(
        root,
        "03_Widgets/.ipynb_checkpoints/042_Widgets-checkpoint.ipynb",
        "Stale checkpoint",
    );
    write_notebook(root, "03_Widgets/X042_Widgets_old.ipynb", "Retired");
    std::fs::write(root.join("03_Widgets/notes.md"), "# not a notebook").unwrap();
}

#[test]
fn audit_reports_conformance_and_skips_excluded_paths() {
    let dir = TempDir::new().unwrap();
    store(&dir);

    let results = audit(dir.path(), &AuditPolicy::default()).unwrap();
    let names: Vec<_> = results.iter().map(|r| r.file_name.as_str()).collect();
    assert_eq!(
        names,
        vec![
            "042_Widgets.ipynb",
            "043_Gadgets.ipynb",
            "079_RAG_Fundamentals.ipynb",
            "085_Vector_Databases.ipynb",
        ]
    );

    let conforming: Vec<_> = results
        .iter()
        .filter(|r| r.conforms)
        .map(|r| r.id.as_deref().unwrap())
        .collect();
    assert_eq!(conforming, vec!["079", "085"]);

    let summary = AuditSummary::from_results(&results);
    assert_eq!(summary.total, 4);
    assert_eq!(summary.non_conforming, 2);
    assert!((summary.conforming_percent() - 50.0).abs() < f64::EPSILON);
}

#[test]
fn audit_never_mutates_storage() {
    let dir = TempDir::new().unwrap();
    store(&dir);
    let before = snapshot(dir.path());

    audit(dir.path(), &AuditPolicy::default()).unwrap();

    assert_eq!(before, snapshot(dir.path()));
}

#[test]
fn repair_all_rewrites_only_known_non_conforming_notebooks() {
    let dir = TempDir::new().unwrap();
    store(&dir);
    let conforming_path = dir.path().join("08_Modern_AI/085_Vector_Databases.ipynb");
    let conforming_before = std::fs::read(&conforming_path).unwrap();

    let records = repair_all(dir.path(), &titles(), &AuditPolicy::default(), false).unwrap();
    let summary = RepairSummary::from_records(&records);
    assert_eq!(summary.repaired, 1);
    assert_eq!(summary.unknown_title, 1);
    assert_eq!(summary.already_conforming, 2);

    let repaired = read_artifact(&dir.path().join("03_Widgets/042_Widgets.ipynb")).unwrap();
    assert_eq!(repaired.blocks[0].text(), "# 042: Widgets\n\nBody text");
    assert_eq!(repaired.blocks[1].text(), "print('hello')");
    assert_eq!(repaired.blocks[2].text(), "## Next");

    let unknown = records
        .iter()
        .find(|r| r.file_name == "043_Gadgets.ipynb")
        .unwrap();
    assert_eq!(unknown.action, RepairAction::UnknownTitle);
    assert!(unknown.heading.is_none());
    assert!(unknown.action.detail().contains("no canonical title"));

    // The loose "# 085 -" heading conforms to the audit and is left alone.
    assert_eq!(conforming_before, std::fs::read(&conforming_path).unwrap());

    let checkpoint = read_artifact(
        &dir
            .path()
            .join("03_Widgets/.ipynb_checkpoints/042_Widgets-checkpoint.ipynb"),
    )
    .unwrap();
    assert_eq!(checkpoint.blocks[0].text(), "Stale checkpoint");
}

#[test]
fn second_repair_pass_is_a_no_op() {
    let dir = TempDir::new().unwrap();
    store(&dir);

    repair_all(dir.path(), &titles(), &AuditPolicy::default(), false).unwrap();
    let after_first = snapshot(dir.path());
    let records = repair_all(dir.path(), &titles(), &AuditPolicy::default(), false).unwrap();

    assert_eq!(after_first, snapshot(dir.path()));
    assert_eq!(RepairSummary::from_records(&records).repaired, 0);
}

#[test]
fn dry_run_reports_without_writing() {
    let dir = TempDir::new().unwrap();
    store(&dir);
    let before = snapshot(dir.path());

    let records = repair_all(dir.path(), &titles(), &AuditPolicy::default(), true).unwrap();

    assert_eq!(before, snapshot(dir.path()));
    let widget = records
        .iter()
        .find(|r| r.file_name == "042_Widgets.ipynb")
        .unwrap();
    assert_eq!(
        widget.action,
        RepairAction::WouldRepair {
            previous_first_line: "Some old heading".to_string()
        }
    );
    assert_eq!(widget.heading.as_deref(), Some("# 042: Widgets"));
}

#[test]
fn repair_keeps_body_of_unterminated_line_sources() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("03_Widgets/042_Widgets.ipynb");
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(
        &path,
        r##"{"cells": [
  {"cell_type": "markdown", "metadata": {}, "source": ["Widget notes", "", "Body text"]},
  {"cell_type": "code", "execution_count": null, "metadata": {}, "outputs": [], "source": ["import os", "print(os.name)"]}
 ], "metadata": {}, "nbformat": 4, "nbformat_minor": 2}"##,
    )
    .unwrap();

    let records = repair_all(dir.path(), &titles(), &AuditPolicy::default(), false).unwrap();
    assert_eq!(
        records[0].action,
        RepairAction::Repaired {
            previous_first_line: "Widget notes".to_string()
        }
    );

    let repaired = read_artifact(&path).unwrap();
    assert_eq!(repaired.blocks[0].text(), "# 042: Widgets\n\nBody text");
    assert_eq!(repaired.blocks[1].lines, vec!["import os", "print(os.name)"]);
    assert_eq!(repaired.blocks[1].line_count(), 2);
    assert!(audit(dir.path(), &AuditPolicy::default()).unwrap()[0].conforms);
}

#[test]
fn non_narrative_first_block_is_reported_not_rewritten() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("042_Widgets.ipynb");
    let artifact = Artifact::new(vec![Block::executable("import os"), Block::narrative("Text")]);
    write_artifact(&artifact, &path).unwrap();
    let before = std::fs::read(&path).unwrap();

    let records = repair_all(dir.path(), &titles(), &AuditPolicy::default(), false).unwrap();

    assert!(matches!(records[0].action, RepairAction::Anomaly { .. }));
    assert_eq!(before, std::fs::read(&path).unwrap());
}

#[test]
fn unreadable_notebook_is_an_anomaly() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("042_Widgets.ipynb"), "{ not json").unwrap();

    let results = audit(dir.path(), &AuditPolicy::default()).unwrap();
    assert!(results[0].error.is_some());
    assert!(!results[0].conforms);

    let records = repair_all(dir.path(), &titles(), &AuditPolicy::default(), false).unwrap();
    assert!(matches!(records[0].action, RepairAction::Anomaly { .. }));
}

#[test]
fn missing_root_is_an_error() {
    let dir = TempDir::new().unwrap();
    assert!(audit(&dir.path().join("absent"), &AuditPolicy::default()).is_err());
}
