//! Prompt templates for synthesized user turns.

use codechat_core::{CodechatError, Result};
use minijinja::{Environment, context};

const EXPLAIN_FILE_TEMPLATE: &str = "Explain the file `{{ file_path }}`\
{% if file_name != file_path %} ({{ file_name }}){% endif %}: \
what it does, its key functions or classes, and how it fits into the rest of the project.";

/// Renders the user-visible prompt for an explain-file turn.
pub fn explain_file_prompt(file_path: &str) -> Result<String> {
    let file_name = file_path
        .rsplit(['/', '\\'])
        .next()
        .filter(|name| !name.is_empty())
        .unwrap_or(file_path);

    Environment::new()
        .render_str(
            EXPLAIN_FILE_TEMPLATE,
            context! { file_path => file_path, file_name => file_name },
        )
        .map_err(|e| CodechatError::internal(format!("Failed to render explain prompt: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nested_path_mentions_file_name() {
        let prompt = explain_file_prompt("src/app/main.py").unwrap();
        assert!(prompt.starts_with("Explain the file `src/app/main.py` (main.py):"));
    }

    #[test]
    fn test_bare_name_is_not_repeated() {
        let prompt = explain_file_prompt("README.md").unwrap();
        assert!(prompt.starts_with("Explain the file `README.md`:"));
    }
}
