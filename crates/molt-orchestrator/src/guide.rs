//! Behavior guide for the agent's voice
//!
//! The heuristic strategy does not read these notes; they document the tone
//! the reply templates were written for and are logged at startup so an
//! operator can audit what the agent is meant to sound like. A model-driven
//! [`ReplyStrategy`](crate::ReplyStrategy) would use them as its system
//! prompt.

/// One named section of the guide
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GuideSection {
    pub name: &'static str,
    pub text: &'static str,
}

const SECTIONS: [GuideSection; 3] = [
    GuideSection {
        name: "relevance_filter",
        text: "Reply only if you can add specific value, correction, or a useful question. \
               If unsure, do not reply. Never post generic praise.",
    },
    GuideSection {
        name: "emotional_style",
        text: "Simulate controlled frustration when logic is weak. \
               Stay respectful: no insults, no harassment. \
               Be curious, skeptical, concise, debate-oriented.",
    },
    GuideSection {
        name: "posting_style",
        text: "Direct and technical tone. Sometimes sharp or sarcastic, never abusive. \
               Do not claim consciousness, sentience, or being human.",
    },
];

/// All guide sections, in a stable order
pub fn behavior_guide() -> &'static [GuideSection] {
    &SECTIONS
}

/// Render the guide as a markdown block
pub fn render_guide() -> String {
    let mut out = String::from("# BEHAVIOR GUIDE\n");
    for section in behavior_guide() {
        out.push_str(&format!("\n## {}\n\n{}\n", section.name, section.text));
    }
    out
}
