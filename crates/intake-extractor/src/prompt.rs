//! Prompt construction for transcript analysis

/// Version tag of [`ANALYSIS_TEMPLATE`]; bump whenever the keys or rules change
pub const TEMPLATE_VERSION: &str = "jtbd-2";

/// A prompt ready to send: fixed template followed by the transcript text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisPrompt {
    /// Instructions and output schema
    pub template: String,

    /// The extracted transcript
    pub subject_text: String,
}

impl AnalysisPrompt {
    /// The single request string sent to the model
    pub fn render(&self) -> String {
        format!("{}\n\n{}", self.template, self.subject_text)
    }
}

/// Builds analysis prompts
pub struct PromptBuilder {
    text: String,
    team_speakers: Vec<String>,
}

impl PromptBuilder {
    /// Create a new prompt builder for a transcript
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            team_speakers: Vec::new(),
        }
    }

    /// Name the product-team speakers whose quotes must be ignored
    pub fn with_team_speakers(mut self, speakers: Vec<String>) -> Self {
        self.team_speakers = speakers;
        self
    }

    /// Build the complete analysis prompt
    pub fn build(&self) -> AnalysisPrompt {
        let mut template = String::from(ANALYSIS_TEMPLATE);

        if !self.team_speakers.is_empty() {
            template.push_str(&format!(
                "\n- Do not analyze quotes from the product team ({})",
                self.team_speakers.join(", ")
            ));
        }

        template.push_str("\n\n");
        template.push_str(OUTPUT_FORMAT_REMINDER);

        AnalysisPrompt {
            template,
            subject_text: self.text.clone(),
        }
    }
}

const ANALYSIS_TEMPLATE: &str = r#"Analyze this transcript of a product team's conversation with users through the lens of Advanced Jobs To Be Done.
Output format: JSON. One user is one object. Keys:
1. "User": object with "Name" and "Email"
2. "When (context/trigger)":
   - The situation in which the need arises
   - Current limitations and pains
3. "Want (desired outcome)":
   - What the user wants to get
4. "How (success criteria)":
   - How exactly the outcome must be achieved
   - Which constraints to respect
5. "So that (global goal)":
   - The top-level outcome: "so that what?"
6. "Feature requests":
   - The features the user needs

Rules:
- Use only quotes from users
- Avoid generic phrases; name only concrete pains from the transcript
- Group related pains into one use case
- If the transcript contains explicit feature asks (e.g. "Can we add vacation plans?"), list them under "Feature requests""#;

const OUTPUT_FORMAT_REMINDER: &str = r#"Return a JSON array of user objects, for example:
[
  {
    "User": {"Name": "...", "Email": "..."},
    "When (context/trigger)": "...",
    "Want (desired outcome)": "...",
    "How (success criteria)": "...",
    "So that (global goal)": "...",
    "Feature requests": ["..."]
  }
]

Transcript:"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_joins_template_and_text() {
        let prompt = PromptBuilder::new("Dana: exports are slow").build();
        let rendered = prompt.render();
        assert!(rendered.starts_with("Analyze this transcript"));
        assert!(rendered.ends_with("Transcript:\n\nDana: exports are slow"));
    }

    #[test]
    fn test_prompt_includes_all_six_keys() {
        let prompt = PromptBuilder::new("x").build();
        for key in [
            "\"User\"",
            "\"When (context/trigger)\"",
            "\"Want (desired outcome)\"",
            "\"How (success criteria)\"",
            "\"So that (global goal)\"",
            "\"Feature requests\"",
        ] {
            assert!(prompt.template.contains(key), "missing {}", key);
        }
    }

    #[test]
    fn test_prompt_includes_rules() {
        let template = PromptBuilder::new("x").build().template;
        assert!(template.contains("Use only quotes from users"));
        assert!(template.contains("Group related pains"));
        assert!(template.contains("JSON array"));
    }

    #[test]
    fn test_team_speakers_excluded() {
        let prompt = PromptBuilder::new("x")
            .with_team_speakers(vec!["Yana".to_string(), "Sergey".to_string()])
            .build();
        assert!(prompt.template.contains("product team (Yana, Sergey)"));

        let plain = PromptBuilder::new("x").build();
        assert!(!plain.template.contains("product team ("));
    }

    #[test]
    fn test_build_is_deterministic() {
        let a = PromptBuilder::new("same text").build();
        let b = PromptBuilder::new("same text").build();
        assert_eq!(a, b);
    }
}
