//! Prompt composition.
//!
//! Renders the instruction sent to the completion model: the alternating
//! history as `Usuario:` / `Asistente:` lines, a delimited emotional context
//! block and a fixed answering instruction. An optional trailer asks the
//! model to annotate the tone it chose; [`parse_response_affect`] reads that
//! annotation back, leniently.

mod annotation;

pub use annotation::{Intensity, ResponseAffect, parse_response_affect};

use crate::models::{ConversationTurn, ExtendedEmotion, PromptContext};

/// System instruction for the completion model.
pub const SYSTEM_INSTRUCTION: &str = "Eres un asistente psicológico empático.";

/// Header of the emotional context block.
pub const CONTEXT_HEADER: &str = "Contexto emocional detectado:";

/// Fixed answering instruction.
pub const ANSWER_INSTRUCTION: &str = "Responde como psicólogo profesional, de forma empática y breve, considerando el contexto anterior.";

/// Trailer requesting machine-parseable tone metadata.
pub const AFFECT_ANNOTATION_TRAILER: &str = "Al final de tu respuesta, añade exactamente estas dos líneas, sin texto adicional:
emotion-response: <emoción con la que respondes>
intensity-response: <low|medium|high>";

/// Composes the prompt text.
///
/// Deterministic: identical inputs produce identical text.
#[must_use]
pub fn compose_prompt(
    history: &[ConversationTurn],
    emotion: &ExtendedEmotion,
    techniques: &str,
    warnings: &str,
    request_affect_annotation: bool,
) -> String {
    let history_block: String = history
        .iter()
        .map(|turn| format!("{}: {}\n", turn.role.localized(), turn.content))
        .collect();
    let separator = if history.is_empty() { "" } else { "\n" };
    let trailer = if request_affect_annotation {
        format!("\n{AFFECT_ANNOTATION_TRAILER}\n")
    } else {
        String::new()
    };

    format!(
        "{history_block}{separator}{CONTEXT_HEADER}\n\
         - Emoción principal: {emotion}\n\
         - Técnicas recomendadas: {techniques}\n\
         - Advertencias: {warnings}\n\
         \n\
         {ANSWER_INSTRUCTION}\n\
         {trailer}"
    )
}

impl PromptContext {
    /// Renders this context with [`compose_prompt`].
    #[must_use]
    pub fn render(&self, request_affect_annotation: bool) -> String {
        compose_prompt(
            &self.history,
            &self.emotion,
            &self.techniques,
            &self.warnings,
            request_affect_annotation,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NO_TECHNIQUES, NO_WARNINGS};

    #[test]
    fn test_full_prompt() {
        let history = vec![
            ConversationTurn::user("Hola"),
            ConversationTurn::assistant("Hola, ¿cómo te sientes hoy?"),
        ];
        let prompt = compose_prompt(
            &history,
            &ExtendedEmotion::from("ansiedad"),
            "Respiración diafragmática",
            "No minimizar",
            false,
        );

        let expected = "Usuario: Hola
Asistente: Hola, ¿cómo te sientes hoy?

Contexto emocional detectado:
- Emoción principal: ansiedad
- Técnicas recomendadas: Respiración diafragmática
- Advertencias: No minimizar

Responde como psicólogo profesional, de forma empática y breve, considerando el contexto anterior.
";
        assert_eq!(prompt, expected);
    }

    #[test]
    fn test_empty_history() {
        let prompt = compose_prompt(
            &[],
            &ExtendedEmotion::calm(),
            NO_TECHNIQUES,
            NO_WARNINGS,
            false,
        );
        assert!(prompt.starts_with(CONTEXT_HEADER));
        assert!(prompt.contains("- Emoción principal: tranquilidad"));
        assert!(prompt.contains(NO_TECHNIQUES));
    }

    #[test]
    fn test_affect_trailer() {
        let without = compose_prompt(&[], &ExtendedEmotion::calm(), "t", "w", false);
        let with = compose_prompt(&[], &ExtendedEmotion::calm(), "t", "w", true);
        assert!(!without.contains("emotion-response:"));
        assert!(with.starts_with(&without));
        assert!(with.contains("emotion-response: <"));
        assert!(with.contains("intensity-response: <low|medium|high>"));
    }

    #[test]
    fn test_trailer_layout() {
        let with = compose_prompt(&[], &ExtendedEmotion::calm(), "t", "w", true);
        assert!(with.ends_with(&format!("{ANSWER_INSTRUCTION}\n\n{AFFECT_ANNOTATION_TRAILER}\n")));
    }

    #[test]
    fn test_deterministic() {
        let history = vec![ConversationTurn::user("uno")];
        let emotion = ExtendedEmotion::from("duelo");
        assert_eq!(
            compose_prompt(&history, &emotion, "a", "b", true),
            compose_prompt(&history, &emotion, "a", "b", true)
        );
    }

    #[test]
    fn test_context_render() {
        let context = PromptContext {
            history: vec![ConversationTurn::user("uno")],
            emotion: ExtendedEmotion::from("culpa"),
            techniques: "t".to_string(),
            warnings: "w".to_string(),
        };
        assert_eq!(
            context.render(false),
            compose_prompt(&context.history, &context.emotion, "t", "w", false)
        );
    }
}
