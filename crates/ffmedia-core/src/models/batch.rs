/// Aggregated outcome of applying one operation to every matching file of a directory
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchResult {
    pub total: usize,
    pub succeeded: Vec<String>,
    /// (file name, failure reason)
    pub failed: Vec<(String, String)>,
}

impl BatchResult {
    pub fn record_success(&mut self, file_name: impl Into<String>) {
        self.succeeded.push(file_name.into());
    }

    pub fn record_failure(&mut self, file_name: impl Into<String>, reason: impl Into<String>) {
        self.failed.push((file_name.into(), reason.into()));
    }

    pub fn failed_entries(&self) -> Vec<String> {
        self.failed
            .iter()
            .map(|(name, reason)| format!("{}: {}", name, reason))
            .collect()
    }

    /// Summary text: counts, plus the failed files when there are any.
    pub fn summary(&self, title: &str) -> String {
        let mut message = format!(
            "{} complete!\nTotal: {} files\nSucceeded: {}\nFailed: {}",
            title,
            self.total,
            self.succeeded.len(),
            self.failed.len()
        );
        if !self.failed.is_empty() {
            message.push_str(&format!("\nFailed files: {}", self.failed_entries().join(", ")));
        }
        message
    }
}
