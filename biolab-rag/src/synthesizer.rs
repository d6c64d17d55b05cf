//! Answer synthesis: prompt construction, generation, and citation
//! packaging.
//!
//! The synthesizer never propagates a provider failure: an empty retrieval
//! short-circuits to a fixed not-found answer without calling the model,
//! and a generation failure degrades to an answer string carrying the
//! failure reason. Both outcomes are normal responses for the caller.

use std::sync::Arc;

use biolab_model::{ChatModel, ChatRequest, Message};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::analysis::AnalysisRecord;
use crate::context;
use crate::retriever::Retrieved;

/// Fixed answer when document retrieval produced nothing.
pub const DOCUMENTS_NOT_FOUND: &str =
    "Je n'ai pas trouvé d'informations pertinentes dans la base de données.";

/// Fixed answer when analysis retrieval produced nothing.
pub const ANALYSES_NOT_FOUND: &str =
    "Je n'ai pas trouvé d'analyses pertinentes dans le compendium belge.";

const DOCUMENT_SYSTEM_PROMPT: &str = "Vous êtes un assistant médical français spécialisé en \
     biologie clinique. Répondez uniquement en français et basez-vous uniquement sur les \
     documents fournis.";

const ANALYSIS_SYSTEM_PROMPT: &str = "Vous êtes un assistant médical expert en biologie \
     clinique, spécialisé dans les analyses de laboratoire belges. Votre expertise couvre la \
     biochimie, la microbiologie, l'hématologie, l'immunologie et la biologie moléculaire. \
     Répondez avec un niveau scientifique élevé adapté aux professionnels de santé.";

/// A citation for a document-pipeline answer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DocumentSource {
    /// The source document title.
    pub title: String,
    /// The source file name.
    pub filename: String,
    /// Relevance score, rounded to three decimals.
    pub score: f32,
}

/// A citation for an analysis-pipeline answer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnalysisSource {
    /// The analysis title, with its code in parentheses when present.
    pub title: String,
    /// The laboratory offering the analysis.
    pub lab: String,
    /// Direct link to the laboratory's analysis page.
    pub url: String,
    /// The laboratory's analysis code.
    pub code: String,
    /// Description snippet, capped at 100 characters.
    pub description: String,
    /// Sampling snippet, capped at 50 characters.
    pub prelevement: String,
    /// Technique snippet, capped at 50 characters.
    pub technique: String,
    /// Relevance score, rounded to three decimals.
    pub score: f32,
}

/// The complete response to one question: answer, citations, and the
/// question echoed back. Constructed fresh per request, never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryResponse<S> {
    /// The synthesized (or degraded) answer text.
    pub answer: String,
    /// Citations for the top assembled results, best match first.
    pub sources: Vec<S>,
    /// The original question.
    pub query: String,
}

/// Synthesizes grounded answers from retrieved entries.
pub struct Synthesizer {
    model: Arc<dyn ChatModel>,
    max_output_tokens: u32,
    temperature: f32,
}

impl Synthesizer {
    /// Create a synthesizer over the given generation model.
    pub fn new(model: Arc<dyn ChatModel>, max_output_tokens: u32, temperature: f32) -> Self {
        Self { model, max_output_tokens, temperature }
    }

    /// Answer a question from retrieved document chunks.
    ///
    /// At most `limit` results are assembled into the context and cited.
    pub async fn documents(
        &self,
        query: &str,
        results: &[Retrieved],
        limit: usize,
    ) -> (String, Vec<DocumentSource>) {
        if results.is_empty() {
            info!("no documents retrieved, skipping generation");
            return (DOCUMENTS_NOT_FOUND.to_string(), Vec::new());
        }

        let context_block = context::document_context(results, limit);
        let prompt = format!(
            "Vous êtes un assistant médical spécialisé pour biologiste en laboratoire clinique.\n\
             Répondez UNIQUEMENT en français et basez-vous UNIQUEMENT sur les documents fournis.\n\
             \n\
             Question: {query}\n\
             \n\
             Contexte (documents du laboratoire):\n\
             {context_block}\n\
             \n\
             Instructions:\n\
             1. Répondez de manière claire et précise en français\n\
             2. Utilisez UNIQUEMENT les informations des documents fournis\n\
             3. Si l'information n'est pas dans les documents, dites-le clairement\n\
             4. Citez vos sources en mentionnant le document pertinent\n\
             5. Structurez votre réponse de manière professionnelle\n\
             6. Utilisez le vocabulaire médical approprié\n\
             \n\
             Réponse:"
        );

        match self.complete(DOCUMENT_SYSTEM_PROMPT, prompt).await {
            Ok(answer) => {
                let sources = results
                    .iter()
                    .take(limit)
                    .map(|result| DocumentSource {
                        title: result.metadata.get("title").cloned().unwrap_or_default(),
                        filename: result.metadata.get("filename").cloned().unwrap_or_default(),
                        score: round3(result.score),
                    })
                    .collect();
                (answer, sources)
            }
            Err(e) => {
                error!(error = %e, "answer generation failed");
                (format!("Erreur lors de la génération de la réponse: {e}"), Vec::new())
            }
        }
    }

    /// Answer a question from retrieved laboratory analyses.
    ///
    /// At most `limit` results are assembled into the context and cited.
    pub async fn analyses(
        &self,
        query: &str,
        results: &[Retrieved],
        limit: usize,
    ) -> (String, Vec<AnalysisSource>) {
        if results.is_empty() {
            info!("no analyses retrieved, skipping generation");
            return (ANALYSES_NOT_FOUND.to_string(), Vec::new());
        }

        let context_block = context::analysis_context(results, limit);
        let prompt = format!(
            "Vous êtes un assistant médical spécialisé dans les analyses de laboratoire \
             belges, avec une expertise approfondie en biologie médicale.\n\
             \n\
             QUESTION DU BIOLOGISTE: {query}\n\
             \n\
             ANALYSES TROUVÉES DANS LES LABORATOIRES BELGES:\n\
             {context_block}\n\
             \n\
             INSTRUCTIONS POUR VOTRE RÉPONSE:\n\
             1. **Contexte biologique approfondi**: Expliquez l'importance clinique et \
             biologique de l'analyse demandée\n\
             2. **Recommandations pratiques**: Donnez des conseils sur le prélèvement, la \
             conservation, les interférences possibles\n\
             3. **Interprétation clinique**: Expliquez comment interpréter les résultats et \
             leur signification\n\
             4. **Laboratoires disponibles**: Présentez clairement les laboratoires belges \
             qui proposent cette analyse\n\
             5. **Liens directs**: Mentionnez que les liens directs vers les laboratoires \
             sont fournis pour plus de détails\n\
             6. **Considérations techniques**: Expliquez les méthodes utilisées et leurs \
             avantages/limites\n\
             \n\
             STRUCTURE DE RÉPONSE ATTENDUE:\n\
             - Introduction avec contexte biologique\n\
             - Présentation des analyses disponibles par laboratoire\n\
             - Conseils pratiques pour le biologiste\n\
             - Considérations techniques et méthodologiques\n\
             - Interprétation clinique\n\
             \n\
             Répondez en français médical professionnel, adapté à un biologiste médical \
             expérimenté."
        );

        match self.complete(ANALYSIS_SYSTEM_PROMPT, prompt).await {
            Ok(answer) => {
                let sources = results
                    .iter()
                    .take(limit)
                    .map(|result| {
                        let record = AnalysisRecord::from_metadata(&result.metadata);
                        let mut title = record.titre.clone();
                        if !record.code.is_empty() {
                            title.push_str(&format!(" ({})", record.code));
                        }
                        AnalysisSource {
                            title,
                            lab: record.laboratoire,
                            url: record.lien,
                            code: record.code,
                            description: truncate_chars(&record.description, 100),
                            prelevement: truncate_chars(&record.prelevement, 50),
                            technique: truncate_chars(&record.technique, 50),
                            score: round3(result.score),
                        }
                    })
                    .collect();
                (answer, sources)
            }
            Err(e) => {
                error!(error = %e, "answer generation failed");
                (format!("Erreur lors de la génération de la réponse: {e}"), Vec::new())
            }
        }
    }

    async fn complete(&self, system: &str, prompt: String) -> biolab_model::Result<String> {
        let request = ChatRequest {
            messages: vec![Message::system(system), Message::user(prompt)],
            max_output_tokens: Some(self.max_output_tokens),
            temperature: Some(self.temperature),
        };
        self.model.complete(request).await
    }
}

/// Round a score to three decimals for citation display.
fn round3(score: f32) -> f32 {
    (score * 1000.0).round() / 1000.0
}

/// Cap a snippet at `max` characters, appending `...` when truncated.
/// Operates on characters, not bytes, so accented text never splits.
fn truncate_chars(text: &str, max: usize) -> String {
    if text.chars().count() > max {
        let mut truncated: String = text.chars().take(max).collect();
        truncated.push_str("...");
        truncated
    } else {
        text.to_string()
    }
}
