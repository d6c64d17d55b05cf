//! Normalization of heterogeneous laboratory records into a flat analysis
//! schema.
//!
//! Source files carry one JSON array of records per laboratory, and the
//! record shape varies by origin: some laboratories publish flat fields,
//! others nest details in per-stage blocks (`pre_analytique`, `analytique`,
//! `post_analytique`). [`AnalysisRecord::from_raw`] folds both shapes into
//! one flat record. Nested blocks are extracted first; flat fields of the
//! same purpose overwrite them when present.

use std::collections::HashMap;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};

/// Ordered filename-pattern table for laboratory attribution.
///
/// Matched case-insensitively as substrings of the source filename;
/// first match wins.
const LAB_TABLE: &[(&str, &str)] = &[
    ("lhub", "LHUB-ULB"),
    ("uza", "UZA"),
    ("citadelle", "CHR Citadelle"),
    ("chu_ulg", "CHU ULG"),
];

/// Sentinel laboratory for filenames that match no known pattern.
pub const UNKNOWN_LABORATORY: &str = "Laboratoire inconnu";

/// Attribute a laboratory to a source filename. Never fails.
pub fn laboratory_for_filename(filename: &str) -> &'static str {
    let lowered = filename.to_lowercase();
    LAB_TABLE
        .iter()
        .find(|(pattern, _)| lowered.contains(pattern))
        .map(|(_, lab)| *lab)
        .unwrap_or(UNKNOWN_LABORATORY)
}

/// Deserialize a value leniently: a type mismatch yields `None` instead of
/// failing the whole record, mirroring the tolerance of the source feeds.
fn lenient<'de, D, T>(deserializer: D) -> std::result::Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

/// The `analyse` block of detailed records.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AnalyseBlock {
    #[serde(rename = "Service", default)]
    pub service: String,
    #[serde(rename = "Matrice", default)]
    pub matrice: String,
}

/// The pre-analytic stage block.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PreAnalytiqueBlock {
    #[serde(rename = "type d'échantillon approprié", default)]
    pub type_echantillon: String,
    #[serde(rename = "Récipient", default)]
    pub recipient: String,
}

/// The analytic stage block.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AnalytiqueBlock {
    #[serde(rename = "Méthode analytique", default)]
    pub methode_analytique: String,
}

/// The post-analytic stage block.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PostAnalytiqueBlock {
    #[serde(rename = "Valeurs de référence", default)]
    pub valeurs_de_reference: String,
}

/// A record as it appears in a source file: flat fields plus optional
/// per-stage blocks. Unknown fields are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawAnalysis {
    #[serde(default, deserialize_with = "lenient")]
    pub titre: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub code: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub lien: Option<String>,

    #[serde(default, deserialize_with = "lenient")]
    pub analyse: Option<AnalyseBlock>,
    #[serde(default, deserialize_with = "lenient")]
    pub pre_analytique: Option<PreAnalytiqueBlock>,
    #[serde(default, deserialize_with = "lenient")]
    pub analytique: Option<AnalytiqueBlock>,
    #[serde(default, deserialize_with = "lenient")]
    pub post_analytique: Option<PostAnalytiqueBlock>,

    #[serde(default, deserialize_with = "lenient")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub indication: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub methode: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub types_echantillons: Option<String>,
}

/// A normalized laboratory analysis.
///
/// All fields are plain text; optional fields hold the empty string when
/// the source carries no value, never a null.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AnalysisRecord {
    pub titre: String,
    pub code: String,
    pub lien: String,
    pub laboratoire: String,
    pub description: String,
    pub indication: String,
    pub prelevement: String,
    pub technique: String,
    pub reference: String,
}

impl AnalysisRecord {
    /// Normalize a raw record, attributing it to `laboratoire`.
    ///
    /// Nested per-stage blocks are consulted first, then flat fields of the
    /// same purpose overwrite the extracted values. Returns `None` when the
    /// record fails the admission filter: an empty `titre` or `lien`.
    pub fn from_raw(raw: RawAnalysis, laboratoire: &str) -> Option<Self> {
        let titre = raw.titre.unwrap_or_default();
        let code = raw.code.unwrap_or_default();
        let lien = raw.lien.unwrap_or_default();

        // Stage blocks first.
        let mut description = String::new();
        if let Some(block) = raw.analyse {
            description.push_str(&format!("Service: {}\n", block.service));
            description.push_str(&format!("Matrice: {}\n", block.matrice));
        }
        let mut prelevement = raw
            .pre_analytique
            .map(|block| {
                if block.type_echantillon.is_empty() {
                    block.recipient
                } else {
                    block.type_echantillon
                }
            })
            .unwrap_or_default();
        let mut technique =
            raw.analytique.map(|block| block.methode_analytique).unwrap_or_default();
        let mut reference =
            raw.post_analytique.map(|block| block.valeurs_de_reference).unwrap_or_default();
        let mut indication = String::new();

        // Flat fields overwrite.
        if let Some(value) = raw.description {
            description = value;
        }
        if let Some(value) = raw.indication {
            indication = value;
        }
        if let Some(value) = raw.methode {
            technique = value;
        }
        if let Some(value) = raw.types_echantillons {
            prelevement = value;
        }

        if titre.is_empty() || lien.is_empty() {
            return None;
        }

        Some(Self {
            titre,
            code,
            lien,
            laboratoire: laboratoire.to_string(),
            description,
            indication,
            prelevement,
            technique,
            reference,
        })
    }

    /// The labeled text embedded for similarity search.
    ///
    /// Mandatory fields are always present; optional fields are included
    /// only when non-empty.
    pub fn search_text(&self) -> String {
        let mut parts = vec![format!("Titre: {}", self.titre)];
        if !self.code.is_empty() {
            parts.push(format!("Code: {}", self.code));
        }
        parts.push(format!("Laboratoire: {}", self.laboratoire));
        if !self.description.is_empty() {
            parts.push(format!("Description: {}", self.description));
        }
        if !self.indication.is_empty() {
            parts.push(format!("Indication: {}", self.indication));
        }
        if !self.prelevement.is_empty() {
            parts.push(format!("Prélèvement: {}", self.prelevement));
        }
        if !self.technique.is_empty() {
            parts.push(format!("Technique: {}", self.technique));
        }
        if !self.reference.is_empty() {
            parts.push(format!("Référence: {}", self.reference));
        }
        parts.join("\n")
    }

    /// The metadata map stored alongside the record's embedding.
    ///
    /// All nine fields are always present (empty strings for absent
    /// values), so [`from_metadata`](Self::from_metadata) reconstructs the
    /// record exactly.
    pub fn metadata(&self) -> HashMap<String, String> {
        HashMap::from([
            ("titre".to_string(), self.titre.clone()),
            ("code".to_string(), self.code.clone()),
            ("lien".to_string(), self.lien.clone()),
            ("laboratoire".to_string(), self.laboratoire.clone()),
            ("description".to_string(), self.description.clone()),
            ("indication".to_string(), self.indication.clone()),
            ("prelevement".to_string(), self.prelevement.clone()),
            ("technique".to_string(), self.technique.clone()),
            ("reference".to_string(), self.reference.clone()),
        ])
    }

    /// Reconstruct a record from a stored metadata map.
    pub fn from_metadata(metadata: &HashMap<String, String>) -> Self {
        let field = |key: &str| metadata.get(key).cloned().unwrap_or_default();
        Self {
            titre: field("titre"),
            code: field("code"),
            lien: field("lien"),
            laboratoire: field("laboratoire"),
            description: field("description"),
            indication: field("indication"),
            prelevement: field("prelevement"),
            technique: field("technique"),
            reference: field("reference"),
        }
    }
}
