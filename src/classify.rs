//! # Terminal Command Classifier
//!
//! Decides whether a code block is a shell command to run in a terminal or
//! file content to apply to the current file.
//!
//! ## Rules
//!
//! 1. A block tagged `bash` or `sh` is always a terminal command.
//! 2. An untagged block is a terminal command when it is a single line, or
//!    when it starts with a common CLI program (`npm`, `git`, `curl`, ...).
//! 3. Anything else is file content.
//!
//! Multi-line untagged shell scripts that don't start with a known program
//! are classified as file content. That is a known limitation of the
//! heuristic.

/// Languages that always denote a shell command.
pub const TERMINAL_LANGUAGES: &[&str] = &["bash", "sh"];

/// Programs that mark an untagged multi-line block as a shell command.
pub const COMMON_TERMINAL_COMMANDS: &[&str] = &[
    "npm", "pnpm", "yarn", "bun", "deno", "npx", "cd", "ls", "pwd", "pip", "python", "node",
    "git", "curl", "wget", "rbenv", "gem", "ruby", "bundle",
];

/// Prompt marker stripped before a command is sent to the terminal.
pub const PROMPT_PREFIX: &str = "$ ";

/// Returns true when the block should be run in a terminal rather than
/// applied as file content.
pub fn is_terminal_code_block(language: Option<&str>, text: &str) -> bool {
    if let Some(lang) = language {
        if TERMINAL_LANGUAGES.contains(&lang) {
            return true;
        }
        if !lang.is_empty() {
            return false;
        }
    }

    let trimmed = text.trim();
    !trimmed.contains('\n')
        || COMMON_TERMINAL_COMMANDS
            .iter()
            .any(|cmd| trimmed.starts_with(cmd))
}

/// Remove a single leading `"$ "` prompt marker, if present.
pub fn strip_prompt(text: &str) -> &str {
    text.strip_prefix(PROMPT_PREFIX).unwrap_or(text)
}
