//! Grounded-answer prompt template for the search path.
//!
//! The instruction block, few-shot examples, and epilogue exchange are all
//! configuration with defaults reproducing the shipped deployment, so the
//! template can be swapped without touching code. `render` interpolates the
//! question and the serialized retrieval result into one completion prompt
//! wrapped in the Human/Assistant turn markers the completion model expects.

use serde::{Deserialize, Serialize};

/// One worked question/answer exchange embedded in the prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FewShotExample {
    pub question: String,
    pub answer: String,
}

impl FewShotExample {
    pub fn new(question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            answer: answer.into(),
        }
    }
}

/// Injectable prompt template: instruction block, few-shot examples, and a
/// closing epilogue exchange.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptTemplate {
    #[serde(default = "default_instruction")]
    pub instruction: String,
    #[serde(default = "default_examples")]
    pub examples: Vec<FewShotExample>,
    #[serde(default = "default_epilogue")]
    pub epilogue: FewShotExample,
}

fn default_instruction() -> String {
    "Answer the following question in a manner and only if it can be answered \
     from the connected search index.\n\
     Do not include information that is not relevant to the question.\n\
     Only provide information based on the data available with you and do not \
     make assumptions.\n\
     Avoid all the non related questions to Echo business.\n\
     Use the provided examples as reference."
        .to_string()
}

fn default_examples() -> Vec<FewShotExample> {
    vec![
        FewShotExample::new("What is Kendra", "I dont know"),
        FewShotExample::new(
            "Give me the list of all available wiki documents?",
            "Sure, Let me search and collect the information",
        ),
        FewShotExample::new("How many different documents do you have?", "500+"),
    ]
}

fn default_epilogue() -> FewShotExample {
    FewShotExample::new("How many different authors do you find?", "I dont know")
}

impl Default for PromptTemplate {
    fn default() -> Self {
        Self {
            instruction: default_instruction(),
            examples: default_examples(),
            epilogue: default_epilogue(),
        }
    }
}

impl PromptTemplate {
    /// Interpolate the question and retrieval context into one completion
    /// prompt. The output starts with the `Human:` turn marker and ends with
    /// the `Assistant:` cue.
    pub fn render(&self, question: &str, context: &str) -> String {
        let mut prompt = String::from("\n\nHuman:\n");
        prompt.push_str(&self.instruction);
        prompt.push('\n');

        for example in &self.examples {
            prompt.push_str("###\nHere is an example\n<example>\n");
            prompt.push_str(&format!("Question: {}\n", example.question));
            prompt.push_str(&format!("Assistant: {}\n", example.answer));
            prompt.push_str("</example>\n###\n");
        }

        prompt.push_str(&format!("Question: {}\n", self.epilogue.question));
        prompt.push_str(&format!("Assistant: {}\n", self.epilogue.answer));

        prompt.push_str(&format!("\nQuestion: {}\n", question));
        prompt.push_str(&format!("\nContext: {}\n", context));
        prompt.push_str("\n###\n\n\n\nAssistant:\n");

        prompt
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_render_contains_guardrail() {
        let prompt = PromptTemplate::default().render("", "{}");
        assert!(prompt.contains("Echo business"));
        assert!(prompt.contains("Use the provided examples as reference"));
    }

    #[test]
    fn test_default_render_has_three_examples() {
        let prompt = PromptTemplate::default().render("", "{}");
        assert_eq!(prompt.matches("<example>").count(), 3);
        assert_eq!(prompt.matches("</example>").count(), 3);
        assert!(prompt.contains("Question: What is Kendra\nAssistant: I dont know"));
        assert!(prompt.contains("Assistant: 500+"));
    }

    #[test]
    fn test_default_render_has_epilogue() {
        let prompt = PromptTemplate::default().render("", "{}");
        assert!(prompt.contains("Question: How many different authors do you find?"));
    }

    #[test]
    fn test_render_interpolates_question_and_context() {
        let prompt = PromptTemplate::default().render(
            "what is the rate?",
            r#"{"ResultItems":[{"Content":"rates are 5%"}]}"#,
        );
        assert!(prompt.contains("\nQuestion: what is the rate?\n"));
        assert!(prompt.contains(r#"Context: {"ResultItems":[{"Content":"rates are 5%"}]}"#));
    }

    #[test]
    fn test_render_turn_markers() {
        let prompt = PromptTemplate::default().render("q", "c");
        assert!(prompt.starts_with("\n\nHuman:"));
        assert!(prompt.contains("\n\nAssistant:"));
        // The answer cue comes last, after the interpolated content.
        let cue = prompt.rfind("\n\nAssistant:").unwrap();
        assert!(cue > prompt.rfind("Context:").unwrap());
    }

    #[test]
    fn test_custom_template_replaces_examples() {
        let template = PromptTemplate {
            instruction: "Answer about fish only.".into(),
            examples: vec![FewShotExample::new("What is a trout?", "A fish")],
            epilogue: FewShotExample::new("What is a brick?", "Not a fish"),
        };
        let prompt = template.render("q", "c");
        assert_eq!(prompt.matches("<example>").count(), 1);
        assert!(prompt.contains("Answer about fish only."));
        assert!(!prompt.contains("Echo business"));
    }

    #[test]
    fn test_template_deserializes_with_defaults() {
        let template: PromptTemplate = serde_json::from_str("{}").unwrap();
        assert_eq!(template.examples.len(), 3);
        assert_eq!(template.epilogue, default_epilogue());
    }

    #[test]
    fn test_template_partial_override() {
        let template: PromptTemplate =
            serde_json::from_str(r#"{"instruction": "Be terse."}"#).unwrap();
        assert_eq!(template.instruction, "Be terse.");
        assert_eq!(template.examples.len(), 3);
    }
}
