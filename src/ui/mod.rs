//! Console presentation: prompts and the ranked table.

pub mod prompt;
pub mod table;
