use std::fs;
use std::path::Path;

use interleaved_doc::bundle::Bundle;
use interleaved_doc::model::{AssemblyStrategy, Book, ChunkSize, LangDirection, ResourceRequest};
use interleaved_doc::request::DocumentRequest;
use predicates::prelude::*;

mod fixtures;

fn write_bundle(path: &Path, lang_codes: &[&str]) -> anyhow::Result<()> {
    let bundle = Bundle {
        request: DocumentRequest {
            resource_requests: lang_codes
                .iter()
                .map(|lang| ResourceRequest::new(lang, "ulb", "col"))
                .collect(),
            assembly_strategy: AssemblyStrategy::LanguageBookOrder,
            assembly_layout: None,
            layout_for_print: false,
            chunk_size: ChunkSize::Chapter,
        },
        books: lang_codes
            .iter()
            .map(|lang| {
                Book::Usfm(fixtures::usfm_book(
                    lang,
                    "col",
                    LangDirection::Ltr,
                    &[(1, &["Paul, an apostle"])],
                ))
            })
            .collect(),
    };
    fs::write(path, serde_json::to_string_pretty(&bundle)?)?;
    Ok(())
}

#[test]
fn assemble_writes_document() -> anyhow::Result<()> {
    let temp = tempfile::TempDir::new()?;
    let bundle = temp.path().join("bundle.json");
    write_bundle(&bundle, &["en"])?;
    let out = temp.path().join("out").join("doc.html");

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("interleaved-doc");
    cmd.arg("assemble")
        .arg("--bundle")
        .arg(&bundle)
        .arg("--out")
        .arg(&out)
        .assert()
        .success();

    let html = fs::read_to_string(&out)?;
    assert!(html.starts_with("<!DOCTYPE html>"));
    assert!(html.contains("<h2 style='text-align:center;'>Colossians</h2>"));
    assert!(html.contains("Paul, an apostle"));
    Ok(())
}

#[test]
fn assemble_refuses_to_overwrite_without_force() -> anyhow::Result<()> {
    let temp = tempfile::TempDir::new()?;
    let bundle = temp.path().join("bundle.json");
    write_bundle(&bundle, &["en"])?;
    let out = temp.path().join("doc.html");
    fs::write(&out, "old")?;

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("interleaved-doc");
    cmd.arg("assemble")
        .arg("--bundle")
        .arg(&bundle)
        .arg("--out")
        .arg(&out)
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
    assert_eq!(fs::read_to_string(&out)?, "old");

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("interleaved-doc");
    cmd.arg("assemble")
        .arg("--bundle")
        .arg(&bundle)
        .arg("--out")
        .arg(&out)
        .arg("--force")
        .assert()
        .success();
    assert!(fs::read_to_string(&out)?.contains("Colossians"));
    Ok(())
}

#[test]
fn two_column_layout_needs_paired_languages() -> anyhow::Result<()> {
    let temp = tempfile::TempDir::new()?;
    let bundle = temp.path().join("bundle.json");
    write_bundle(&bundle, &["en"])?;

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("interleaved-doc");
    cmd.arg("assemble")
        .arg("--bundle")
        .arg(&bundle)
        .arg("--out")
        .arg(temp.path().join("doc.html"))
        .args(["--strategy", "blo", "--layout", "2c_sl_sr"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("even number of scripture languages"));
    assert!(!temp.path().join("doc.html").exists());
    Ok(())
}

#[test]
fn key_prints_request_key() -> anyhow::Result<()> {
    let temp = tempfile::TempDir::new()?;
    let bundle = temp.path().join("bundle.json");
    write_bundle(&bundle, &["en", "sw"])?;

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("interleaved-doc");
    cmd.arg("key")
        .arg("--bundle")
        .arg(&bundle)
        .assert()
        .success()
        .stdout("en-ulb-col_sw-ulb-col_lbo_1c\n");

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("interleaved-doc");
    cmd.arg("key")
        .arg("--bundle")
        .arg(&bundle)
        .args(["--strategy", "blo", "--layout", "2c_sl_sr"])
        .assert()
        .success()
        .stdout("en-ulb-col_sw-ulb-col_blo_2c_sl_sr\n");
    Ok(())
}

#[test]
fn batch_assembles_every_job() -> anyhow::Result<()> {
    let temp = tempfile::TempDir::new()?;
    let en = temp.path().join("en.json");
    let pair = temp.path().join("pair.json");
    write_bundle(&en, &["en"])?;
    write_bundle(&pair, &["en", "sw"])?;

    let en_out = temp.path().join("en.html");
    let pair_out = temp.path().join("pair.html");
    let jobs = [
        serde_json::json!({"bundle": en, "out": en_out}),
        serde_json::json!({"bundle": pair, "out": pair_out, "strategy": "blo", "layout": "2c_sl_sr"}),
    ]
    .iter()
    .map(|job| job.to_string())
    .collect::<Vec<_>>()
    .join("\n");
    let jobs_path = temp.path().join("jobs.jsonl");
    fs::write(&jobs_path, jobs)?;

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("interleaved-doc");
    cmd.arg("batch")
        .arg("--jobs")
        .arg(&jobs_path)
        .args(["--concurrency", "2"])
        .assert()
        .success();

    assert!(fs::read_to_string(&en_out)?.contains("Colossians"));
    assert!(fs::read_to_string(&pair_out)?.contains("<div class='row'>"));
    Ok(())
}

#[test]
fn tw_book_writes_bundle_entry() -> anyhow::Result<()> {
    let temp = tempfile::TempDir::new()?;
    let kt = temp.path().join("en_tw").join("bible").join("kt");
    fs::create_dir_all(&kt)?;
    fs::write(kt.join("god.md"), "# God\n\nThe creator.\n")?;
    let out = temp.path().join("tw.json");

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("interleaved-doc");
    cmd.arg("tw-book")
        .arg("--dir")
        .arg(temp.path().join("en_tw"))
        .args(["--lang-code", "en", "--book-code", "col"])
        .arg("--out")
        .arg(&out)
        .assert()
        .success();

    let book: Book = serde_json::from_str(&fs::read_to_string(&out)?)?;
    let Book::Tw(tw_book) = book else {
        anyhow::bail!("expected a tw book entry");
    };
    assert_eq!(tw_book.name_content_pairs.len(), 1);
    assert_eq!(tw_book.name_content_pairs[0].localized_word, "God");
    Ok(())
}

#[test]
fn rust_log_debug_emits_debug_line_to_stderr() -> anyhow::Result<()> {
    let temp = tempfile::TempDir::new()?;
    let bundle = temp.path().join("bundle.json");
    write_bundle(&bundle, &["en"])?;

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("interleaved-doc");
    cmd.env("RUST_LOG", "debug")
        .arg("key")
        .arg("--bundle")
        .arg(&bundle)
        .assert()
        .success()
        .stderr(predicate::str::contains("parsed cli"));
    Ok(())
}
