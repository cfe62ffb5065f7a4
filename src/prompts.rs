use serde::{Deserialize, Serialize};

/// Literal marker in a prompt template replaced by transcript text
pub const TRANSCRIPTION_PLACEHOLDER: &str = "{transcription}";

/// A predefined prompt the client can choose from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptTemplate {
    pub id: String,
    pub title: String,
    pub template: String,
}

/// Fixed, ordered catalog of prompt templates. Read-only; there are no
/// mutation operations.
#[derive(Debug, Clone)]
pub struct PromptCatalog {
    prompts: Vec<PromptTemplate>,
}

impl PromptCatalog {
    pub fn new() -> Self {
        Self {
            prompts: vec![
                PromptTemplate {
                    id: "youtube-title".to_string(),
                    title: "YouTube title".to_string(),
                    template: "Generate three catchy, SEO-friendly YouTube titles for the \
                               video whose transcription is below. Each title should have at \
                               most 60 characters. Answer with a plain list, one title per \
                               line.\n\nTranscription:\n{transcription}"
                        .to_string(),
                },
                PromptTemplate {
                    id: "youtube-description".to_string(),
                    title: "YouTube description".to_string(),
                    template: "Generate a succinct YouTube description for the video whose \
                               transcription is below. Start with a short summary paragraph, \
                               then list the main topics covered as bullet points, and finish \
                               with three relevant hashtags.\n\nTranscription:\n{transcription}"
                        .to_string(),
                },
            ],
        }
    }

    /// Ordered sequence of available prompt templates
    pub fn list(&self) -> &[PromptTemplate] {
        &self.prompts
    }
}

impl Default for PromptCatalog {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_order_is_stable() {
        let catalog = PromptCatalog::new();
        let ids: Vec<&str> = catalog.list().iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["youtube-title", "youtube-description"]);
    }

    #[test]
    fn test_templates_carry_placeholder() {
        let catalog = PromptCatalog::new();
        for prompt in catalog.list() {
            assert!(prompt.template.contains(TRANSCRIPTION_PLACEHOLDER));
        }
    }
}
