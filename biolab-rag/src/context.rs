//! Assembly of retrieved entries into the context block handed to the
//! generation model.
//!
//! Both assemblers preserve retrieval order (best match first) and cap the
//! block at `limit` entries. No re-ranking happens here.

use crate::analysis::AnalysisRecord;
use crate::retriever::Retrieved;

/// Format retrieved document chunks as a context block.
pub fn document_context(results: &[Retrieved], limit: usize) -> String {
    results
        .iter()
        .take(limit)
        .map(|result| {
            let title = result.metadata.get("title").cloned().unwrap_or_default();
            format!("Document: {title}\n{}", result.document)
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Format retrieved analyses as a detailed context block.
///
/// Each entry is rendered with all record fields and its relevance score
/// to three decimals.
pub fn analysis_context(results: &[Retrieved], limit: usize) -> String {
    results
        .iter()
        .take(limit)
        .enumerate()
        .map(|(i, result)| {
            let record = AnalysisRecord::from_metadata(&result.metadata);
            format!(
                "=== ANALYSE {} ===\n\
                 Titre: {}\n\
                 Laboratoire: {}\n\
                 Code: {}\n\
                 Lien direct: {}\n\
                 Description: {}\n\
                 Indication clinique: {}\n\
                 Type de prélèvement: {}\n\
                 Technique utilisée: {}\n\
                 Valeurs de référence: {}\n\
                 Score de pertinence: {:.3}",
                i + 1,
                record.titre,
                record.laboratoire,
                record.code,
                record.lien,
                record.description,
                record.indication,
                record.prelevement,
                record.technique,
                record.reference,
                result.score,
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}
