//! Prompt assembly
//!
//! Serializes the analysis summary and the artist-submitted context into the
//! fixed request payload shape the feedback service expects. Every section
//! label is always emitted, so the prompt stays parseable no matter which
//! fields the caller supplied.

/// Artist-submitted creative context. All fields are free text and may be
/// empty; the extractor never inspects them.
#[derive(Debug, Clone, Default)]
pub struct ContextBundle {
    pub lyrics: String,
    pub chords: String,
    pub vocal_notes: String,
    pub goals: String,
}

const PREAMBLE: &str = "You are an expert audio engineer and music producer. \
Analyze the following audio features and artist-submitted context, \
and give specific, constructive feedback about how to improve the track. \
Include comments on mix/mastering, vocals, delivery, harmony, lyrics, and creative intent.";

/// Assemble the full prompt: instructional preamble plus five labeled
/// sections in fixed order
pub fn build_prompt(analysis: &str, context: &ContextBundle) -> String {
    format!(
        "{PREAMBLE}\n\n\
         Audio Analysis:\n{analysis}\n\n\
         Lyrics:\n{lyrics}\n\n\
         Chord Progression:\n{chords}\n\n\
         Vocal Style / Delivery Notes:\n{vocal_notes}\n\n\
         Artist Goals:\n{goals}",
        analysis = analysis,
        lyrics = context.lyrics,
        chords = context.chords,
        vocal_notes = context.vocal_notes,
        goals = context.goals,
    )
}
