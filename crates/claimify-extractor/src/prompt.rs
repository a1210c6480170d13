//! Stage prompts
//!
//! Each stage has one fixed system prompt and shares the user prompt layout
//! built by [`PromptBuilder`]. The system prompts end with the output schema
//! the parsers in [`crate::parser`] expect.

use claimify_domain::Stage;

/// Header introducing the Selection verdict
pub const SELECTION_VERDICT_HEADER: &str = "Final submission:";

/// Header introducing the revised sentence
pub const SELECTION_REVISION_HEADER: &str = "Sentence with only verifiable information:";

/// Positive Selection verdict
pub const VERIFIABLE: &str = "Contains a specific and verifiable proposition";

/// Negative Selection verdict
pub const NOT_VERIFIABLE: &str = "Does NOT contain a specific and verifiable proposition";

/// Field holding the Disambiguation result
pub const DECONTEXTUALIZED_FIELD: &str = "DecontextualizedSentence:";

/// Disambiguation value for irreducible ambiguity
pub const CANNOT_DECONTEXTUALIZE: &str = "Cannot be decontextualized";

/// Header of the final Decomposition list
pub const PROPOSITIONS_WITH_CONTEXT_HEADER: &str =
    "Specific, Verifiable, and Decontextualized Propositions with Essential Context/Clarifications:";

/// Builds the user prompt for one stage invocation
///
/// # Examples
///
/// ```
/// use claimify_domain::Stage;
/// use claimify_extractor::PromptBuilder;
///
/// let prompt = PromptBuilder::new(Stage::Selection, "What did John do?")
///     .context("John joined in 2010. Growth followed.")
///     .sentence("He led the team.")
///     .build();
/// assert!(prompt.starts_with("You are now performing a SELECTION task."));
/// assert!(prompt.ends_with("Sentence:\nHe led the team."));
/// ```
#[derive(Debug, Clone)]
pub struct PromptBuilder<'a> {
    stage: Stage,
    question: &'a str,
    context: &'a str,
    sentence: &'a str,
}

impl<'a> PromptBuilder<'a> {
    /// Create a new prompt builder for `stage`
    pub fn new(stage: Stage, question: &'a str) -> Self {
        Self {
            stage,
            question,
            context: "",
            sentence: "",
        }
    }

    /// Set the rendered context window
    pub fn context(mut self, context: &'a str) -> Self {
        self.context = context;
        self
    }

    /// Set the sentence under analysis
    pub fn sentence(mut self, sentence: &'a str) -> Self {
        self.sentence = sentence;
        self
    }

    /// System prompt of this builder's stage
    pub fn system_prompt(&self) -> &'static str {
        system_prompt(self.stage)
    }

    /// Build the user prompt
    pub fn build(&self) -> String {
        format!(
            "You are now performing a {} task.\n\nQuestion:\n{}\n\nContext:\n{}\n\nSentence:\n{}",
            self.stage.task_label(),
            self.question.trim(),
            self.context.trim(),
            self.sentence.trim(),
        )
    }
}

/// Fixed system prompt for `stage`
pub fn system_prompt(stage: Stage) -> &'static str {
    match stage {
        Stage::Selection => SELECTION_PROMPT,
        Stage::Disambiguation => DISAMBIGUATION_PROMPT,
        Stage::Decomposition => DECOMPOSITION_PROMPT,
    }
}

const SELECTION_PROMPT: &str = r#"You assist a fact-checker. You receive a question about a source text, an excerpt of an answer to that question (a "[...]" marks omitted sentences), and one sentence of interest from that answer. Decide whether the sentence contains at least one specific and verifiable proposition. If it does, rewrite it as a complete sentence that keeps only the verifiable information.

Rules:
- A sentence about missing information ("the dataset does not mention X") does NOT contain a specific and verifiable proposition.
- Truth does not matter. Relevance to the question does not matter.
- Ambiguous terms such as pronouns do not matter; assume the fact-checker can resolve them.
- Citations do not matter.

Use the surrounding sentences. An answer fragment such as "John" after the question "Who is the CEO of Company X?" is verifiable. A sentence that only introduces points expanded by the following sentences, or only summarizes points detailed by the preceding ones, is NOT verifiable.

Not verifiable:
- Technological progress should be inclusive.
- AI could lead to advancements in healthcare.
- This implies that John Smith is a courageous person.

Verifiable, with revisions:
- "Smith's advocacy for renewable energy is crucial in addressing these challenges" -> "Smith advocates for renewable energy."
- "John, the CEO of Company X, is a notable example of effective leadership" -> "John is the CEO of Company X."
- "Jane emphasizes the importance of collaboration and perseverance" -> remains unchanged

Your output must follow this format exactly. Replace only the <insert> parts and keep every header.

Sentence:
<insert>
4-step stream of consciousness (1. reflect on the criteria, 2. describe the sentence and its context, 3. decide whether it is verifiable, 4. rewrite it if needed):
<insert>
Final submission:
<insert 'Contains a specific and verifiable proposition' or 'Does NOT contain a specific and verifiable proposition'>
Sentence with only verifiable information:
<insert the changed sentence, or 'remains unchanged', or 'None'>"#;

const DISAMBIGUATION_PROMPT: &str = r#"You help fact-checkers by rewriting a sentence so it can be understood without the question or the surrounding text ("decontextualizing").

You receive a question about a source text, a context (text around the sentence, possibly with "[...]"), and a sentence from an answer to the question.

1. Incomplete names, acronyms and abbreviations: if the full form appears in the question or context, use it. If it appears nowhere, leave it as it is; this is NOT ambiguity.
2. Linguistic ambiguity: resolve referential ambiguity (who is "he", what is "it", when is "last year", what do "this" and "these" point to) and structural ambiguity (who said what). Do not resolve vagueness such as "early days".

Use only the sentence, question and context. Never add outside knowledge. Do not assume the sentence answers the question unless that is clearly implied. If a group of readers would not agree on one interpretation, the sentence cannot be decontextualized.

Output format:
Incomplete Names, Acronyms, Abbreviations:
<step-by-step check>

Linguistic Ambiguity in '<original sentence>':
<step-by-step reasoning, ending with whether readers would agree on the meaning>

If readers would NOT agree, end with:
DecontextualizedSentence: Cannot be decontextualized

Otherwise end with:
Changes Needed to Decontextualize the Sentence:
- <specific edits>

DecontextualizedSentence:
<the final sentence with all changes applied>"#;

const DECOMPOSITION_PROMPT: &str = r#"You help a team of fact-checkers. You receive a question about a source text, a sentence from a longer answer, and the context around that sentence (possibly truncated with "[...]").

Extract every specific, verifiable proposition from the sentence. Each proposition must:
- be fully self-contained, so it can be judged true or false on its own;
- keep the meaning it has when read with the question and context;
- state one simple fact.

Avoid generic or unverifiable statements, and never turn a belief into a fact: if the sentence says "John believes AI improves lives", do not output "AI improves lives". Keep attribution ("<entity> states that ...").

Steps: identify referential terms, clarify the sentence, estimate how many propositions it holds, then list them. Add essential context in brackets [...] so each proposition stands alone.

Output format:
Sentence:
<original sentence>

Referential terms whose referents must be clarified:
<list or "None">

MaxClarifiedSentence:
<clarified sentence>

The range of the possible number of propositions (with some margin for variation) is:
<X-Y>

Specific, Verifiable, and Decontextualized Propositions:
[
  "<proposition 1>",
  "<proposition 2>"
]

Specific, Verifiable, and Decontextualized Propositions with Essential Context/Clarifications:
[
  "<proposition 1 with [essential context]> - true or false?",
  "<proposition 2 with [essential context]> - true or false?"
]

Every fact-checker sees only ONE proposition. Use only the information given. If there is nothing to extract, output an empty list: []"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_prompt_layout() {
        let prompt = PromptBuilder::new(Stage::Disambiguation, "What did John do?")
            .context("John joined in 2010. Growth followed.")
            .sentence("He led the team.")
            .build();

        assert_eq!(
            prompt,
            "You are now performing a DISAMBIGUATION task.\n\n\
             Question:\nWhat did John do?\n\n\
             Context:\nJohn joined in 2010. Growth followed.\n\n\
             Sentence:\nHe led the team."
        );
    }

    #[test]
    fn test_empty_context_keeps_header() {
        let prompt = PromptBuilder::new(Stage::Decomposition, "Q?")
            .sentence("Only one.")
            .build();
        assert!(prompt.contains("Context:\n\n\nSentence:"));
    }

    #[test]
    fn test_system_prompts_carry_output_schema() {
        let selection = system_prompt(Stage::Selection);
        assert!(selection.contains(SELECTION_VERDICT_HEADER));
        assert!(selection.contains(SELECTION_REVISION_HEADER));
        assert!(selection.contains(VERIFIABLE));
        assert!(selection.contains(NOT_VERIFIABLE));

        let disambiguation = system_prompt(Stage::Disambiguation);
        assert!(disambiguation.contains(DECONTEXTUALIZED_FIELD));
        assert!(disambiguation.contains(CANNOT_DECONTEXTUALIZE));

        assert!(system_prompt(Stage::Decomposition).contains(PROPOSITIONS_WITH_CONTEXT_HEADER));
    }

    #[test]
    fn test_builder_exposes_stage_system_prompt() {
        let builder = PromptBuilder::new(Stage::Selection, "Q?");
        assert_eq!(builder.system_prompt(), system_prompt(Stage::Selection));
    }
}
