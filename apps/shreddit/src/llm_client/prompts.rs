// Shared prompt fragments. Each caller keeps its own prompts.rs alongside it;
// this file holds the pieces every caption prompt ends with.

/// Output contract for every caption prompt. `captions::parser` depends on it.
pub const CAPTION_FORMAT_INSTRUCTION: &str = "\
    Return ONLY the text in the format 'TOP TEXT: [your text here]\nBOTTOM TEXT: [your text here]'. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// Keeps captions short enough to stay legible at meme font sizes.
pub const BREVITY_INSTRUCTION: &str = "\
    Keep each line under ten words. Classic meme rhythm: setup on top, punchline on the bottom.";
