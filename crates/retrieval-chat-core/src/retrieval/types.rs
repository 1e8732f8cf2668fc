use serde::{Deserialize, Serialize};

/// Search strategy understood by the retrieval service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchType {
    #[default]
    Focused,
    Detailed,
    Timeline,
}

impl SearchType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchType::Focused => "focused",
            SearchType::Detailed => "detailed",
            SearchType::Timeline => "timeline",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "focused" => Some(SearchType::Focused),
            "detailed" => Some(SearchType::Detailed),
            "timeline" => Some(SearchType::Timeline),
            _ => None,
        }
    }

    pub fn all() -> Vec<SearchType> {
        vec![SearchType::Focused, SearchType::Detailed, SearchType::Timeline]
    }

    /// Next search type in [`SearchType::all`] order, wrapping around.
    pub fn next(&self) -> SearchType {
        match self {
            SearchType::Focused => SearchType::Detailed,
            SearchType::Detailed => SearchType::Timeline,
            SearchType::Timeline => SearchType::Focused,
        }
    }
}

/// Structured source reference attached to an answer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Citation {
    pub document: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
}

impl Citation {
    pub fn new(document: impl Into<String>) -> Self {
        Self {
            document: document.into(),
            date: None,
            section: None,
        }
    }

    /// `Source: <document>[ (<date>)][ - <section>]`
    pub fn display_line(&self) -> String {
        let mut line = format!("Source: {}", self.document);
        if let Some(date) = self.date.as_deref().filter(|d| !d.is_empty()) {
            line.push_str(&format!(" ({})", date));
        }
        if let Some(section) = self.section.as_deref().filter(|s| !s.is_empty()) {
            line.push_str(&format!(" - {}", section));
        }
        line
    }
}

/// Body of `GET /retrieve/search`. Only `answer` is required.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchResponse {
    pub answer: String,
    #[serde(default)]
    pub citations: Option<Vec<Citation>>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub query: Option<String>,
    #[serde(default)]
    pub doc_types: Option<Vec<String>>,
    /// Echoed verbatim; the service may know more types than [`SearchType`]
    #[serde(default)]
    pub search_type: Option<String>,
}

/// Body of `GET /retrieve/conversation/history`
#[derive(Debug, Clone, Deserialize)]
pub struct HistoryResponse {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub history: String,
    #[serde(default)]
    pub session_id: Option<String>,
}

/// Query options sent along with every search.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchParams {
    pub search_type: SearchType,
    pub doc_types: Vec<String>,
    pub include_relationships: bool,
    pub model: Option<String>,
}

impl SearchParams {
    /// Query string pairs for a search of `query`.
    pub fn to_query_pairs(&self, query: &str) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("query", query.to_string()),
            ("search_type", self.search_type.as_str().to_string()),
        ];
        for doc_type in &self.doc_types {
            pairs.push(("doc_types", doc_type.clone()));
        }
        if self.include_relationships {
            pairs.push(("include_relationships", "true".to_string()));
        }
        if let Some(model) = &self.model {
            pairs.push(("model", model.clone()));
        }
        pairs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_citation_with_date() {
        let citation = Citation {
            document: "geo.txt".to_string(),
            date: Some("2023".to_string()),
            section: None,
        };
        assert_eq!(citation.display_line(), "Source: geo.txt (2023)");
    }

    #[test]
    fn test_citation_with_date_and_section() {
        let citation = Citation {
            document: "report.pdf".to_string(),
            date: Some("2021-04-01".to_string()),
            section: Some("Findings".to_string()),
        };
        assert_eq!(
            citation.display_line(),
            "Source: report.pdf (2021-04-01) - Findings"
        );
    }

    #[test]
    fn test_citation_document_only() {
        assert_eq!(Citation::new("notes.md").display_line(), "Source: notes.md");
    }

    #[test]
    fn test_response_without_citations_field() {
        let response: SearchResponse =
            serde_json::from_str(r#"{"answer":"No information found for this query."}"#).unwrap();
        assert!(response.citations.is_none());
        assert_eq!(response.answer, "No information found for this query.");
    }

    #[test]
    fn test_response_ignores_unknown_fields() {
        let response: SearchResponse = serde_json::from_str(
            r#"{"status":"success","answer":"x","citations":[],"query":"q","search_type":"timeline","extra":1}"#,
        )
        .unwrap();
        assert_eq!(response.search_type.as_deref(), Some("timeline"));
        assert_eq!(response.citations, Some(Vec::new()));
    }

    #[test]
    fn test_response_with_unfamiliar_search_type_still_parses() {
        let response: SearchResponse = serde_json::from_str(
            r#"{"answer":"Paris is the capital","citations":[],"search_type":"hybrid"}"#,
        )
        .unwrap();
        assert_eq!(response.answer, "Paris is the capital");
        assert_eq!(response.search_type.as_deref(), Some("hybrid"));
    }

    #[test]
    fn test_default_query_pairs() {
        let pairs = SearchParams::default().to_query_pairs("capital of France");
        assert_eq!(
            pairs,
            vec![
                ("query", "capital of France".to_string()),
                ("search_type", "focused".to_string()),
            ]
        );
    }

    #[test]
    fn test_query_pairs_with_options() {
        let params = SearchParams {
            search_type: SearchType::Detailed,
            doc_types: vec!["pdf".to_string(), "md".to_string()],
            include_relationships: true,
            model: Some("gpt-4o-mini".to_string()),
        };
        let pairs = params.to_query_pairs("q");
        assert_eq!(pairs.len(), 6);
        assert_eq!(pairs[1], ("search_type", "detailed".to_string()));
        assert_eq!(pairs[2], ("doc_types", "pdf".to_string()));
        assert_eq!(pairs[4], ("include_relationships", "true".to_string()));
        assert_eq!(pairs[5], ("model", "gpt-4o-mini".to_string()));
    }

    #[test]
    fn test_search_type_cycle_returns_to_start() {
        let mut search_type = SearchType::Focused;
        for _ in 0..SearchType::all().len() {
            search_type = search_type.next();
        }
        assert_eq!(search_type, SearchType::Focused);
        assert_eq!(SearchType::from_str("TIMELINE"), Some(SearchType::Timeline));
        assert_eq!(SearchType::from_str("fuzzy"), None);
    }
}
