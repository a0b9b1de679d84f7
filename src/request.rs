use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use sha2::Digest as _;

use crate::model::{AssemblyLayout, AssemblyStrategy, ChunkSize, ResourceRequest};

/// Keys at or beyond this length are replaced by a hash.
const MAX_KEY_LEN: usize = 240;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentRequest {
    pub resource_requests: Vec<ResourceRequest>,
    #[serde(default = "default_strategy")]
    pub assembly_strategy: AssemblyStrategy,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assembly_layout: Option<AssemblyLayout>,
    #[serde(default)]
    pub layout_for_print: bool,
    #[serde(default)]
    pub chunk_size: ChunkSize,
}

fn default_strategy() -> AssemblyStrategy {
    AssemblyStrategy::LanguageBookOrder
}

/// Language code to the set of books requested in a scripture resource.
fn usfm_books_by_language(requests: &[ResourceRequest]) -> BTreeMap<&str, BTreeSet<&str>> {
    let mut books: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
    for request in requests.iter().filter(|request| request.is_usfm()) {
        books
            .entry(request.lang_code.as_str())
            .or_default()
            .insert(request.book_code.as_str());
    }
    books
}

/// True when an even, non-zero number of languages request scripture and every
/// one of them requests the same books.
fn languages_pair_up(requests: &[ResourceRequest]) -> bool {
    let books = usfm_books_by_language(requests);
    let mut book_sets = books.values();
    let Some(first) = book_sets.next() else {
        return false;
    };
    books.len() % 2 == 0 && book_sets.all(|set| set == first)
}

/// The layout to assemble with when the request does not name one.
pub fn select_assembly_layout_kind(request: &DocumentRequest) -> AssemblyLayout {
    if let Some(layout) = request.assembly_layout {
        return layout;
    }
    if request.layout_for_print {
        return AssemblyLayout::OneColumnCompact;
    }
    if request.assembly_strategy == AssemblyStrategy::BookLanguageOrder
        && languages_pair_up(&request.resource_requests)
    {
        return AssemblyLayout::TwoColumnScriptureLeftScriptureRight;
    }
    AssemblyLayout::OneColumn
}

/// Rejects request shapes the assemblers cannot lay out.
pub fn validate_layout(request: &DocumentRequest, layout: AssemblyLayout) -> anyhow::Result<()> {
    if request.resource_requests.is_empty() {
        anyhow::bail!("document request has no resource requests");
    }
    if layout.is_two_column() && !languages_pair_up(&request.resource_requests) {
        let langs = usfm_books_by_language(&request.resource_requests);
        anyhow::bail!(
            "layout {} needs an even number of scripture languages requesting the same books (got {})",
            layout.as_str(),
            langs.len()
        );
    }
    Ok(())
}

/// Deterministic name for the document a request produces.
pub fn document_request_key(
    requests: &[ResourceRequest],
    strategy: AssemblyStrategy,
    layout: AssemblyLayout,
) -> String {
    let resources = requests
        .iter()
        .map(|request| {
            format!(
                "{}-{}-{}",
                request.lang_code, request.resource_type, request.book_code
            )
        })
        .collect::<Vec<_>>()
        .join("_");
    let key = format!("{resources}_{}_{}", strategy.as_str(), layout.as_str());
    if key.len() < MAX_KEY_LEN {
        return key;
    }

    let digest = sha2::Sha256::digest(key.as_bytes());
    format!("doc_{}", &hex::encode(digest)[..32])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(requests: &[(&str, &str, &str)], strategy: AssemblyStrategy) -> DocumentRequest {
        DocumentRequest {
            resource_requests: requests
                .iter()
                .map(|(lang, resource_type, book)| ResourceRequest::new(lang, resource_type, book))
                .collect(),
            assembly_strategy: strategy,
            assembly_layout: None,
            layout_for_print: false,
            chunk_size: ChunkSize::Chapter,
        }
    }

    #[test]
    fn key_joins_requests_then_strategy_and_layout() {
        let requests = vec![
            ResourceRequest::new("en", "ulb", "col"),
            ResourceRequest::new("en", "tn", "col"),
        ];
        assert_eq!(
            document_request_key(
                &requests,
                AssemblyStrategy::LanguageBookOrder,
                AssemblyLayout::OneColumn
            ),
            "en-ulb-col_en-tn-col_lbo_1c"
        );
    }

    #[test]
    fn long_key_falls_back_to_stable_hash() {
        let requests: Vec<_> = (0..40)
            .map(|idx| ResourceRequest::new("en", "ulb", &format!("b{idx:02}")))
            .collect();
        let key = document_request_key(
            &requests,
            AssemblyStrategy::BookLanguageOrder,
            AssemblyLayout::OneColumn,
        );
        assert!(key.starts_with("doc_"));
        assert_eq!(key.len(), 4 + 32);
        assert_eq!(
            key,
            document_request_key(
                &requests,
                AssemblyStrategy::BookLanguageOrder,
                AssemblyLayout::OneColumn
            )
        );
    }

    #[test]
    fn paired_languages_select_two_columns_under_book_order() {
        let paired = request(
            &[("en", "ulb", "col"), ("sw", "ulb", "col"), ("en", "tn", "col")],
            AssemblyStrategy::BookLanguageOrder,
        );
        assert_eq!(
            select_assembly_layout_kind(&paired),
            AssemblyLayout::TwoColumnScriptureLeftScriptureRight
        );

        let lang_first = DocumentRequest {
            assembly_strategy: AssemblyStrategy::LanguageBookOrder,
            ..paired.clone()
        };
        assert_eq!(
            select_assembly_layout_kind(&lang_first),
            AssemblyLayout::OneColumn
        );

        let print = DocumentRequest {
            layout_for_print: true,
            ..paired
        };
        assert_eq!(
            select_assembly_layout_kind(&print),
            AssemblyLayout::OneColumnCompact
        );
    }

    #[test]
    fn two_columns_reject_odd_or_mismatched_languages() {
        let odd = request(
            &[("en", "ulb", "col"), ("sw", "ulb", "col"), ("fr", "f10", "col")],
            AssemblyStrategy::BookLanguageOrder,
        );
        assert!(validate_layout(&odd, AssemblyLayout::TwoColumnScriptureLeftScriptureRight).is_err());
        assert!(validate_layout(&odd, AssemblyLayout::OneColumn).is_ok());

        let mismatched = request(
            &[("en", "ulb", "col"), ("sw", "ulb", "eph")],
            AssemblyStrategy::BookLanguageOrder,
        );
        assert!(
            validate_layout(
                &mismatched,
                AssemblyLayout::TwoColumnScriptureLeftScriptureRightCompact
            )
            .is_err()
        );
    }
}
