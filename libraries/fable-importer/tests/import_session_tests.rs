//! End-to-end import sessions over real directories


use fable_core::SessionStatus;
use fable_importer::session::REASON_EXTRACTION_FAILED;
use fable_importer::{ImportError, ImportService};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use test_helpers::{write_corrupt, write_epub, write_zip, Workspace};

#[tokio::test]
async fn test_imports_good_file_and_quarantines_corrupt_one() {
    let ws = Workspace::new();
    let import_dir = ws.config.import_dir.clone();
    write_epub(&import_dir, "Alice - Wonderland.epub", "Wonderland", "Alice");
    let corrupt = write_corrupt(&import_dir, "corrupt.epub");

    let service = ImportService::new(ws.config.clone());
    service.start_import(false).unwrap();
    let session = service.wait().await.unwrap();

    assert_eq!(session.status, SessionStatus::Completed);
    assert_eq!(session.total_files, 2);
    assert_eq!(session.processed_files, 2);
    assert_eq!(session.imported_files, 1);
    assert_eq!(session.quarantined_files, 1);
    assert_eq!(session.skipped_files, 0);

    let target = ws.config.scan_dir.join("Alice/Wonderland/Wonderland - Alice.epub");
    assert!(target.exists());

    let quarantined = ws.config.quarantine_dir.join("corrupt.epub");
    assert!(quarantined.exists());
    // Copied, never moved
    assert!(corrupt.exists());

    assert_eq!(session.quarantined_books.len(), 1);
    let record = &session.quarantined_books[0];
    assert_eq!(record.reason, REASON_EXTRACTION_FAILED);
    assert_eq!(record.quarantine_path, quarantined.display().to_string());
    assert!(!record.error_detail.is_empty());

    assert_eq!(session.errors.len(), 1);
    assert!(session.errors[0].contains("corrupt.epub"));
}

#[tokio::test]
async fn test_second_import_skips_everything() {
    let ws = Workspace::new();
    write_epub(&ws.config.import_dir, "a.epub", "Dune", "Frank Herbert");
    write_epub(&ws.config.import_dir, "nested/b.epub", "Emma", "Jane Austen");

    let service = ImportService::new(ws.config.clone());

    service.start_import(false).unwrap();
    let first = service.wait().await.unwrap();
    assert_eq!(first.imported_files, 2);

    service.start_import(false).unwrap();
    let second = service.wait().await.unwrap();
    assert_ne!(second.id, first.id);
    assert_eq!(second.imported_files, 0);
    assert_eq!(second.skipped_files, 2);
    // Skips are not errors
    assert!(second.errors.is_empty());
}

#[tokio::test]
async fn test_start_while_running_is_refused() {
    let ws = Workspace::new();
    write_epub(&ws.config.import_dir, "a.epub", "Dune", "Frank Herbert");

    let service = ImportService::new(ws.config.clone());
    let first = service.start_import(false).unwrap();

    // Worker has not been polled on the current-thread runtime yet
    let before = service.status().unwrap();
    let err = service.start_import(false).unwrap_err();
    assert!(matches!(err, ImportError::SessionInProgress(ref id) if *id == first.id));
    assert_eq!(service.status().unwrap(), before);

    let done = service.wait().await.unwrap();
    assert_eq!(done.id, first.id);
    assert_eq!(done.imported_files, 1);
}

#[tokio::test]
async fn test_dry_run_leaves_filesystem_untouched() {
    let ws = Workspace::new();
    write_epub(&ws.config.import_dir, "a.epub", "Dune", "Frank Herbert");
    write_corrupt(&ws.config.import_dir, "broken.epub");

    let service = ImportService::new(ws.config.clone());
    service.start_import(true).unwrap();
    let session = service.wait().await.unwrap();

    assert!(session.dry_run);
    assert_eq!(session.imported_files, 1);
    assert_eq!(session.quarantined_files, 1);
    assert_eq!(
        session.quarantined_books[0].quarantine_path,
        ws.config.quarantine_dir.join("broken.epub").display().to_string()
    );

    assert!(!ws.config.scan_dir.exists());
    assert!(!ws.config.quarantine_dir.exists());

    // The session itself is still logged
    assert_eq!(service.get_log(&session.id).unwrap(), session);
}

#[tokio::test]
async fn test_completion_hook_runs_once_for_real_runs_only() {
    let ws = Workspace::new();
    write_epub(&ws.config.import_dir, "a.epub", "Dune", "Frank Herbert");

    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();
    let service = ImportService::new(ws.config.clone()).on_complete(move |session| {
        let counter = counter.clone();
        async move {
            assert!(!session.dry_run);
            counter.fetch_add(1, Ordering::SeqCst);
        }
    });

    service.start_import(true).unwrap();
    service.wait().await;
    assert_eq!(calls.load(Ordering::SeqCst), 0);

    service.start_import(false).unwrap();
    service.wait().await;
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_missing_import_dir_fails_and_is_logged() {
    let ws = Workspace::new();
    std::fs::remove_dir(&ws.config.import_dir).unwrap();

    let service = ImportService::new(ws.config.clone());
    service.start_import(false).unwrap();
    let session = service.wait().await.unwrap();

    assert_eq!(session.status, SessionStatus::Failed);
    assert_eq!(session.processed_files, 0);

    let logs = service.list_logs().unwrap();
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].session_id, session.id);
    assert_eq!(logs[0].status, SessionStatus::Failed);
}

#[tokio::test]
async fn test_package_without_root_document_is_quarantined() {
    let ws = Workspace::new();
    write_zip(
        &ws.config.import_dir,
        "no-opf.epub",
        &[("text/ch1.xhtml", "<p>hello</p>")],
    );

    let service = ImportService::new(ws.config.clone());
    service.start_import(false).unwrap();
    let session = service.wait().await.unwrap();

    assert_eq!(session.quarantined_files, 1);
    assert_eq!(session.quarantined_books[0].reason, REASON_EXTRACTION_FAILED);
    assert!(ws.config.quarantine_dir.join("no-opf.epub").exists());
}

#[tokio::test]
async fn test_other_extensions_are_ignored() {
    let ws = Workspace::new();
    std::fs::write(ws.config.import_dir.join("notes.txt"), b"hi").unwrap();
    write_epub(&ws.config.import_dir, "UPPER.EPUB", "Dune", "Frank Herbert");

    let service = ImportService::new(ws.config.clone());
    service.start_import(false).unwrap();
    let session = service.wait().await.unwrap();

    assert_eq!(session.total_files, 1);
    assert_eq!(session.imported_files, 1);
}

#[tokio::test]
async fn test_multibyte_identifier_does_not_stop_the_batch() {
    let ws = Workspace::new();
    let opf = r#"<?xml version="1.0" encoding="UTF-8"?>
<package xmlns="http://www.idpf.org/2007/opf" version="2.0">
  <metadata xmlns:dc="http://purl.org/dc/elements/1.1/">
    <dc:title>Accents</dc:title>
    <dc:creator>Zoé</dc:creator>
    <dc:identifier>12345678é</dc:identifier>
  </metadata>
  <manifest/>
</package>"#;
    write_zip(
        &ws.config.import_dir,
        "a_accents.epub",
        &[
            (
                "META-INF/container.xml",
                r#"<?xml version="1.0"?>
<container version="1.0" xmlns="urn:oasis:names:tc:opendocument:xmlns:container">
  <rootfiles>
    <rootfile full-path="content.opf" media-type="application/oebps-package+xml"/>
  </rootfiles>
</container>"#,
            ),
            ("content.opf", opf),
        ],
    );
    write_epub(&ws.config.import_dir, "b_dune.epub", "Dune", "Frank Herbert");

    let service = ImportService::new(ws.config.clone());
    service.start_import(false).unwrap();
    let session = service.wait().await.unwrap();

    assert_eq!(session.status, SessionStatus::Completed);
    assert_eq!(session.processed_files, 2);
    assert_eq!(session.imported_files, 2);
    assert!(session.errors.is_empty());
    assert!(ws
        .config
        .scan_dir
        .join("Frank Herbert/Dune/Dune - Frank Herbert.epub")
        .exists());
}

#[tokio::test]
async fn test_library_copy_failure_is_recorded_and_batch_continues() {
    let ws = Workspace::new();
    // A plain file where the library root should be makes every copy fail
    std::fs::write(&ws.config.scan_dir, b"not a directory").unwrap();
    write_epub(&ws.config.import_dir, "a.epub", "Dune", "Frank Herbert");
    write_epub(&ws.config.import_dir, "b.epub", "Emma", "Jane Austen");

    let service = ImportService::new(ws.config.clone());
    service.start_import(false).unwrap();
    let session = service.wait().await.unwrap();

    assert_eq!(session.status, SessionStatus::Completed);
    assert_eq!(session.processed_files, 2);
    assert_eq!(session.imported_files, 0);
    assert_eq!(session.skipped_files, 0);
    assert_eq!(session.errors.len(), 2);
    assert!(session.errors.iter().all(|e| e.starts_with("failed to copy")));

    // Failed copies are logged like any other session
    assert_eq!(service.get_log(&session.id).unwrap(), session);
}

#[tokio::test]
async fn test_quarantine_copy_failure_leaves_no_record() {
    let ws = Workspace::new();
    std::fs::write(&ws.config.quarantine_dir, b"not a directory").unwrap();
    write_corrupt(&ws.config.import_dir, "a_corrupt.epub");
    write_epub(&ws.config.import_dir, "b.epub", "Dune", "Frank Herbert");

    let service = ImportService::new(ws.config.clone());
    service.start_import(false).unwrap();
    let session = service.wait().await.unwrap();

    assert_eq!(session.status, SessionStatus::Completed);
    assert_eq!(session.processed_files, 2);
    assert_eq!(session.imported_files, 1);
    assert_eq!(session.quarantined_files, 0);
    assert!(session.quarantined_books.is_empty());
    // Extraction failure plus the failed quarantine copy
    assert_eq!(session.errors.len(), 2);
    assert!(session
        .errors
        .iter()
        .any(|e| e.starts_with("failed to quarantine") && e.contains("a_corrupt.epub")));
}

#[tokio::test]
async fn test_dry_run_counts_duplicate_targets_as_skipped() {
    let ws = Workspace::new();
    write_epub(&ws.config.import_dir, "a.epub", "Dune", "Frank Herbert");
    write_epub(&ws.config.import_dir, "copy/a.epub", "Dune", "Frank Herbert");

    let service = ImportService::new(ws.config.clone());

    service.start_import(true).unwrap();
    let preview = service.wait().await.unwrap();
    assert_eq!(preview.imported_files, 1);
    assert_eq!(preview.skipped_files, 1);
    assert!(!ws.config.scan_dir.exists());

    // The real run agrees with the preview
    service.start_import(false).unwrap();
    let real = service.wait().await.unwrap();
    assert_eq!(real.imported_files, preview.imported_files);
    assert_eq!(real.skipped_files, preview.skipped_files);
}

#[tokio::test]
async fn test_back_to_back_sessions_keep_separate_logs() {
    let ws = Workspace::new();
    let service = ImportService::new(ws.config.clone());

    let mut ids = Vec::new();
    for _ in 0..3 {
        service.start_import(true).unwrap();
        ids.push(service.wait().await.unwrap().id);
    }

    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), 3);
    assert_eq!(service.list_logs().unwrap().len(), 3);
}
