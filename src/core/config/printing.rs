use crate::core::config::data::Config;
use crate::core::document::format_file_size;

impl Config {
    pub fn print_all(&self) {
        println!("Current configuration:");
        println!("  backend-url: {}", self.backend_url());
        match &self.default_model {
            Some(model) => println!("  default-model: {model}"),
            None => println!("  default-model: (unset)"),
        }
        println!("  reveal-delay: {}ms", self.reveal_delay().as_millis());
        println!("  query-results: {}", self.query_results());
        println!(
            "  max-upload: {}",
            format_file_size(self.upload.max_bytes)
        );
        let accepted: Vec<String> = self
            .upload
            .accepted
            .iter()
            .map(|accepted| format!(".{} ({})", accepted.extension, accepted.mime))
            .collect();
        println!("  accepted-types: {}", accepted.join(", "));
    }
}
