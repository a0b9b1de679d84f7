use std::io::{BufWriter, Write as _};
use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::bundle::Bundle;
use crate::cli::{AssembleArgs, KeyArgs};
use crate::document;
use crate::model::{AssemblyLayout, AssemblyStrategy, ResourceBundle};
use crate::request::{self, DocumentRequest};
use crate::tw::{self, TwBookSource};

/// What one assembly produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssembleOutcome {
    pub key: String,
    pub out: PathBuf,
    pub bytes: u64,
}

/// Request overrides applied, then the layout chosen for it.
fn resolve(
    mut request: DocumentRequest,
    strategy: Option<AssemblyStrategy>,
    layout: Option<AssemblyLayout>,
) -> anyhow::Result<(DocumentRequest, AssemblyLayout)> {
    if let Some(strategy) = strategy {
        request.assembly_strategy = strategy;
    }
    if layout.is_some() {
        request.assembly_layout = layout;
    }
    let layout = request::select_assembly_layout_kind(&request);
    request::validate_layout(&request, layout)?;
    Ok((request, layout))
}

/// Loads a TW book from `{assets_dir}/{lang}_{resource_type}` for every TW
/// request whose language has none in the bundle.
fn provision_tw_books(
    request: &DocumentRequest,
    resources: &mut ResourceBundle,
    assets_dir: &Path,
) -> anyhow::Result<()> {
    for tw_request in request.resource_requests.iter().filter(|r| r.is_tw()) {
        let lang_code = tw_request.lang_code.as_str();
        if resources.tw_books.iter().any(|book| book.lang_code == lang_code) {
            continue;
        }
        let tw_dir = assets_dir.join(format!("{lang_code}_{}", tw_request.resource_type));
        if !tw_dir.is_dir() {
            tracing::debug!(dir = %tw_dir.display(), "no translation words checkout");
            continue;
        }

        let lang_direction = resources
            .usfm_books
            .iter()
            .find(|book| book.lang_code == lang_code)
            .map(|book| book.lang_direction)
            .unwrap_or_default();
        let source = TwBookSource {
            tw_dir: &tw_dir,
            lang_code,
            lang_name: lang_code,
            book_code: &tw_request.book_code,
            resource_type_name: "Translation Words",
            lang_direction,
            assets_dir,
        };
        let tw_book = tw::load_tw_book(&source, &request.resource_requests)
            .with_context(|| format!("load translation words: {}", tw_dir.display()))?;
        resources.tw_books.push(tw_book);
    }
    Ok(())
}

pub fn run(args: AssembleArgs) -> anyhow::Result<AssembleOutcome> {
    let bundle_path = PathBuf::from(&args.bundle);
    let out_path = PathBuf::from(&args.out);
    if out_path.exists() && !args.force {
        anyhow::bail!("document output already exists: {}", out_path.display());
    }

    let (request, mut resources) = Bundle::load(&bundle_path)?.into_parts();
    let (request, layout) = resolve(request, args.strategy, args.layout)?;
    if let Some(assets_dir) = &args.assets_dir {
        provision_tw_books(&request, &mut resources, Path::new(assets_dir))?;
    }
    if resources.is_empty() {
        tracing::warn!(bundle = %bundle_path.display(), "bundle has no books");
    }

    let key = request::document_request_key(
        &request.resource_requests,
        request.assembly_strategy,
        layout,
    );
    tracing::info!(key = %key, out = %out_path.display(), "assemble");

    let parent = match out_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    std::fs::create_dir_all(&parent)
        .with_context(|| format!("create output dir: {}", parent.display()))?;

    let tmp = tempfile::NamedTempFile::new_in(&parent)
        .with_context(|| format!("create temp file in: {}", parent.display()))?;
    let mut writer = BufWriter::new(tmp);
    let bytes = document::write_document(
        &mut writer,
        &resources,
        request.assembly_strategy,
        layout,
    )
    .with_context(|| format!("write document: {}", out_path.display()))?;
    writer.flush().context("flush document")?;
    let tmp = writer
        .into_inner()
        .map_err(|err| anyhow::anyhow!("finish document buffer: {}", err.error()))?;

    if args.force {
        tmp.persist(&out_path)
            .map_err(|err| err.error)
            .with_context(|| format!("persist document: {}", out_path.display()))?;
    } else {
        tmp.persist_noclobber(&out_path)
            .map_err(|err| err.error)
            .with_context(|| format!("persist document: {}", out_path.display()))?;
    }

    tracing::info!(out = %out_path.display(), bytes, "wrote document");
    Ok(AssembleOutcome {
        key,
        out: out_path,
        bytes,
    })
}

/// The key `assemble` would use for this bundle.
pub fn key(args: KeyArgs) -> anyhow::Result<String> {
    let (request, _) = Bundle::load(Path::new(&args.bundle))?.into_parts();
    let (request, layout) = resolve(request, args.strategy, args.layout)?;
    Ok(request::document_request_key(
        &request.resource_requests,
        request.assembly_strategy,
        layout,
    ))
}
