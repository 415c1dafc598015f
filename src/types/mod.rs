pub mod content;
pub mod gemini;
pub mod view;
