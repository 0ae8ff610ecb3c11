//! Instruction strings and request framing for each action.

use crate::error::AssistError;

use super::model::{Action, TemplateKind};

/// Separator between a custom instruction and the text it applies to.
pub const CUSTOM_SEPARATOR: &str = "\n\n";

const REFINE_INSTRUCTION: &str = "You are a writing assistant. Rewrite the user's text so it is \
clearer, more fluent and better organised. Keep the original meaning, language and tone. \
Return only the rewritten text without explanations.";

const SUMMARIZE_INSTRUCTION: &str = "You are a writing assistant. Summarize the user's text as a \
concise bulleted list of its key points, written in the same language as the text. Return only \
the bullet list.";

const TRANSLATE_INSTRUCTION: &str = "You are a professional translator. If the user's text is \
Chinese, translate it into English; otherwise translate it into Simplified Chinese. Preserve \
formatting and return only the translation.";

const CONTINUE_INSTRUCTION: &str = "You are a writing assistant. Continue the user's text in the \
same style, voice and language, picking up exactly where it stops. Do not repeat the existing \
text; return only the continuation.";

const CUSTOM_INSTRUCTION: &str = "You are a helpful writing assistant embedded in a note editor. \
Follow the user's instruction and return only the text to insert into the note.";

const MEETING_TEMPLATE: &str = "Generate a structured meeting notes template in Markdown with \
sections for topic, date, attendees, agenda, discussion, decisions and action items (owner, \
due date). Return only the template.";

const BRAINSTORM_TEMPLATE: &str = "Generate a structured brainstorming template in Markdown with \
sections for the central question, idea list, pros and cons, evaluation criteria and next \
steps. Return only the template.";

const CODE_TEMPLATE: &str = "Generate a structured code documentation template in Markdown with \
sections for purpose, usage example in a fenced code block, parameters, return values, edge \
cases and related notes. Return only the template.";

/// A model request: system instruction plus the framed user message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatRequest {
    pub instruction: String,
    pub input: String,
}

/// Maps actions to instruction strings and frames user text as a request.
#[derive(Debug, Clone, Default)]
pub struct ActionCatalog;

impl ActionCatalog {
    /// Creates the catalog.
    pub fn new() -> Self {
        Self
    }

    /// Returns the effective instruction for an action.
    ///
    /// For `Custom` this is the caller's instruction, not a catalog string.
    pub fn instruction_for(&self, action: &Action) -> Result<String, AssistError> {
        let instruction = match action {
            Action::Refine => REFINE_INSTRUCTION,
            Action::Summarize => SUMMARIZE_INSTRUCTION,
            Action::Translate => TRANSLATE_INSTRUCTION,
            Action::Continue => CONTINUE_INSTRUCTION,
            Action::Custom(prompt) => {
                let prompt = prompt.trim();
                if prompt.is_empty() {
                    return Err(AssistError::EmptyInput {
                        action: action.kind(),
                    });
                }
                return Ok(prompt.to_string());
            }
            Action::Template(id) => match TemplateKind::parse(id)? {
                TemplateKind::Meeting => MEETING_TEMPLATE,
                TemplateKind::Brainstorm => BRAINSTORM_TEMPLATE,
                TemplateKind::Code => CODE_TEMPLATE,
            },
        };
        Ok(instruction.to_string())
    }

    /// Frames the user's text as the request body for an action.
    pub fn frame(&self, action: &Action, text: &str) -> Result<String, AssistError> {
        let framed = match action {
            Action::Refine | Action::Summarize | Action::Translate | Action::Continue => {
                text.to_string()
            }
            Action::Custom(_) => {
                let prompt = self.instruction_for(action)?;
                if text.is_empty() {
                    prompt
                } else {
                    format!("{prompt}{CUSTOM_SEPARATOR}{text}")
                }
            }
            Action::Template(id) => {
                let template = TemplateKind::parse(id)?;
                if text.trim().is_empty() {
                    format!("Create a {} template.", template.title())
                } else {
                    format!("Create a {} template about:{CUSTOM_SEPARATOR}{text}", template.title())
                }
            }
        };
        Ok(framed)
    }

    /// Builds the full request, rejecting blank input.
    ///
    /// A custom instruction is already part of the framed input, so the
    /// system message for `Custom` is the free-form assistant persona.
    pub fn build_request(&self, action: &Action, text: &str) -> Result<ChatRequest, AssistError> {
        let effective = self.instruction_for(action)?;
        let instruction = match action {
            Action::Custom(_) => CUSTOM_INSTRUCTION.to_string(),
            _ => effective,
        };
        let input = self.frame(action, text)?;
        if input.trim().is_empty() {
            return Err(AssistError::EmptyInput {
                action: action.kind(),
            });
        }
        Ok(ChatRequest { instruction, input })
    }
}
