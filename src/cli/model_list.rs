//! Model listing functionality

use crate::core::config::Config;

/// One line per model, numbered the way `/model <number>` expects. The
/// configured default is marked.
pub fn list_models(config: &Config) -> String {
    let mut out = String::from("Available models:\n");
    for (index, option) in config.model_options().iter().enumerate() {
        let marker = if config.default_model.as_deref() == Some(option.id.as_str()) {
            " (default)"
        } else {
            ""
        };
        out.push_str(&format!(
            "  {}. {} ({}){marker}\n",
            index + 1,
            option.display_name,
            option.id
        ));
    }
    out
}
