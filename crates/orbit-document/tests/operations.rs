// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// End-to-end scenarios through the `Engine` facade.

mod common;

use std::io::Cursor;

use orbit_core::{EngineError, Margins, MetadataFields, ProtectionIntent};
use orbit_document::pdf::handle::DocumentHandle;
use orbit_document::{Engine, RepairStage};
use zip::ZipArchive;

use common::{BlankRasterizer, labelled_pdf, labels, numbered_pdf, page_count, test_engine};

// -- Structure ----------------------------------------------------------------

#[test]
fn merge_keeps_input_order() {
    let engine = Engine::default();
    let first = numbered_pdf("a", 3);
    let second = numbered_pdf("b", 2);
    let merged = engine.merge(&[&first, &second]).unwrap();
    assert_eq!(labels(&merged), vec!["a1", "a2", "a3", "b1", "b2"]);
}

#[test]
fn merge_names_the_broken_input() {
    let engine = Engine::default();
    let good = numbered_pdf("a", 1);
    let err = engine.merge(&[&good, b"not a pdf"]).unwrap_err();
    match err {
        EngineError::Load(reason) => assert!(reason.contains("input #2"), "{}", reason),
        other => panic!("unexpected error: {:?}", other),
    }
}

#[test]
fn split_range_selects_sorted_pages() {
    let engine = Engine::default();
    let doc = numbered_pdf("p", 10);
    let out = engine.split_range(&doc, "10, 3-4, 1, 3").unwrap();
    assert_eq!(labels(&out), vec!["p1", "p3", "p4", "p10"]);

    assert!(matches!(
        engine.split_range(&doc, "11-20"),
        Err(EngineError::InvalidRange(_))
    ));
}

#[test]
fn burst_split_is_a_zip_of_single_pages() {
    let engine = Engine::default();
    let archive = engine
        .split_burst(&numbered_pdf("p", 3), "/home/me/contract.pdf")
        .unwrap();
    let mut zip = ZipArchive::new(Cursor::new(archive)).unwrap();
    assert_eq!(zip.len(), 3);
    let names: Vec<String> = (0..zip.len())
        .map(|i| zip.by_index(i).unwrap().name().to_string())
        .collect();
    assert_eq!(
        names,
        vec!["contract_page_1.pdf", "contract_page_2.pdf", "contract_page_3.pdf"]
    );

    let mut second = Vec::new();
    std::io::copy(&mut zip.by_index(1).unwrap(), &mut second).unwrap();
    assert_eq!(labels(&second), vec!["p2"]);
}

#[test]
fn organize_reorders_drops_and_duplicates() {
    let engine = Engine::default();
    let out = engine.organize(&numbered_pdf("p", 3), &[2, 0, 0]).unwrap();
    assert_eq!(labels(&out), vec!["p3", "p1", "p1"]);
}

#[test]
fn organize_reverses_and_empties() {
    let engine = Engine::default();
    let doc = numbered_pdf("p", 3);
    let reversed = engine.organize(&doc, &[2, 1, 0]).unwrap();
    assert_eq!(labels(&reversed), vec!["p3", "p2", "p1"]);

    let empty = engine.organize(&doc, &[]).unwrap();
    assert_eq!(page_count(&empty), 0);
}

#[test]
fn rotation_accumulates_and_wraps() {
    let engine = Engine::default();
    let doc = numbered_pdf("p", 2);
    let once = engine.rotate(&doc, 90).unwrap();
    let back = engine.rotate(&once, 270).unwrap();

    let rotated = DocumentHandle::load(&once).unwrap();
    assert_eq!(rotated.page_geometry(1).unwrap().rotation, 90);
    let restored = DocumentHandle::load(&back).unwrap();
    assert_eq!(restored.page_geometry(0).unwrap().rotation, 0);
    assert_eq!(labels(&back), vec!["p1", "p2"]);
}

#[test]
fn trim_shrinks_the_crop_box_only() {
    let engine = Engine::default();
    let margins = Margins {
        top: 10.0,
        bottom: 20.0,
        left: 30.0,
        right: 40.0,
    };
    let out = engine.trim(&numbered_pdf("p", 1), &margins).unwrap();
    let geometry = DocumentHandle::load(&out).unwrap().page_geometry(0).unwrap();
    assert_eq!(geometry.media_box.width, 612.0);
    assert_eq!(geometry.crop_box.x, 30.0);
    assert_eq!(geometry.crop_box.y, 20.0);
    assert_eq!(geometry.crop_box.width, 542.0);
    assert_eq!(geometry.crop_box.height, 762.0);
}

#[test]
fn metadata_round_trips() {
    let engine = Engine::default();
    let fields = MetadataFields {
        title: Some("Quarterly report".to_string()),
        author: Some("Finance".to_string()),
        ..Default::default()
    };
    let out = engine.edit_metadata(&numbered_pdf("p", 1), &fields).unwrap();
    let read = DocumentHandle::load(&out).unwrap().metadata();
    assert_eq!(read.title.as_deref(), Some("Quarterly report"));
    assert_eq!(read.author.as_deref(), Some("Finance"));
}

// -- Text ---------------------------------------------------------------------

#[test]
fn extracted_text_is_framed_per_page() {
    let engine = Engine::default();
    let text = engine.extract_text(&labelled_pdf(&["hello", "world"])).unwrap();
    assert_eq!(
        String::from_utf8(text).unwrap(),
        "--- Page 1 ---\n\nhello\n\n--- Page 2 ---\n\nworld\n\n"
    );
}

#[test]
fn diff_reports_changed_and_missing_pages() {
    let engine = Engine::default();
    let first = labelled_pdf(&["intro", "payment due"]);
    let second = labelled_pdf(&["intro", "payment overdue", "appendix"]);
    let pages = engine.diff(&first, &second).unwrap();

    assert_eq!(pages.len(), 3);
    assert!(pages[0].diff.is_unchanged());
    assert_eq!(pages[1].diff.removed[0].text, "payment due");
    assert_eq!(pages[1].diff.added[0].text, "payment overdue");
    assert!(pages[2].is_missing_page());
    assert!(!pages[2].in_first);
}

#[test]
fn compare_builds_one_report_page_per_source_page() {
    let engine = Engine::default();
    let first = labelled_pdf(&["same"]);
    let second = labelled_pdf(&["same", "extra"]);
    let report = engine
        .compare(&[("old.pdf", first.as_slice()), ("new.pdf", second.as_slice())])
        .unwrap();
    let handle = DocumentHandle::load(&report).unwrap();
    assert_eq!(handle.page_count(), 2);
    assert_eq!(handle.page_geometry(0).unwrap().size().width, 1250.0);
}

// -- Rasterization ------------------------------------------------------------

#[test]
fn grayscale_rebuild_removes_the_text_layer() {
    let engine = test_engine(BlankRasterizer::default());
    let out = engine.grayscale(&numbered_pdf("p", 2)).unwrap();
    assert_eq!(labels(&out), vec!["", ""]);
}

#[test]
fn redaction_leaves_no_extractable_text() {
    let engine = test_engine(BlankRasterizer::default());
    let doc = labelled_pdf(&["Account 4711", "public"]);
    let out = engine
        .redact(&doc, &["account".to_string()], true)
        .unwrap();
    assert_eq!(page_count(&out), 2);
    assert!(labels(&out).iter().all(String::is_empty));
}

#[test]
fn redaction_fails_when_it_cannot_rasterize() {
    let engine = test_engine(BlankRasterizer {
        failing_pages: vec![0],
        ..Default::default()
    });
    let err = engine
        .redact(&labelled_pdf(&["secret"]), &["secret".to_string()], false)
        .unwrap_err();
    assert!(matches!(err, EngineError::Rasterizer(_)));
}

#[test]
fn repair_recovers_a_document_behind_garbage() {
    let engine = Engine::default();
    let mut damaged = b"\x00\x00garbage before the header\n".to_vec();
    damaged.extend(numbered_pdf("p", 2));

    let (bytes, stage) = engine.repair(&damaged, false);
    assert_eq!(stage, RepairStage::Rebuilt);
    assert_eq!(labels(&bytes), vec!["p1", "p2"]);
}

#[test]
fn deep_repair_rasterizes_when_possible() {
    let engine = test_engine(BlankRasterizer::default());
    let (bytes, stage) = engine.repair(&numbered_pdf("p", 1), true);
    assert_eq!(stage, RepairStage::Rasterized);
    assert_eq!(page_count(&bytes), 1);
}

#[test]
fn protected_document_needs_its_password() {
    let engine = test_engine(BlankRasterizer::default());
    let protected = engine
        .protect(&numbered_pdf("p", 1), &ProtectionIntent::with_password("hunter2"))
        .unwrap();

    assert!(matches!(
        engine.unlock(&protected, "wrong"),
        Err(EngineError::Encrypted(_))
    ));
    let unlocked = engine.unlock(&protected, "hunter2").unwrap();
    assert_eq!(page_count(&unlocked), 1);
}

#[test]
fn export_archive_names_pages_after_the_source() {
    let engine = test_engine(BlankRasterizer::default());
    let archive = engine
        .pdf_to_images(&numbered_pdf("p", 2), None, "scan.pdf", orbit_core::ExportFormat::Jpeg)
        .unwrap();
    let zip = ZipArchive::new(Cursor::new(archive)).unwrap();
    let names: Vec<&str> = zip.file_names().collect();
    assert!(names.contains(&"scan_page_1.jpg"));
    assert!(names.contains(&"scan_page_2.jpg"));
}

#[test]
fn locked_document_is_not_exported_without_its_password() {
    let engine = test_engine(BlankRasterizer {
        ignores_lock: true,
        ..Default::default()
    });
    let protected = engine
        .protect(&numbered_pdf("p", 2), &ProtectionIntent::with_password("hunter2"))
        .unwrap();

    assert!(matches!(
        engine.pdf_to_images(&protected, None, "scan.pdf", orbit_core::ExportFormat::Png),
        Err(EngineError::Encrypted(_))
    ));
    assert!(matches!(
        engine.thumbnails(&protected, None),
        Err(EngineError::Encrypted(_))
    ));
    assert_eq!(engine.thumbnails(&protected, Some("hunter2")).unwrap().len(), 2);
}
