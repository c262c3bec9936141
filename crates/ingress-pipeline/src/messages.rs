//! Submitter-facing message templates and diagnostic text.

use std::error::Error;

/// Subject line and body of a message to the submitter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailContent {
    pub subject: String,
    pub message: String,
}

impl EmailContent {
    fn new(subject: &str, message: String) -> Self {
        Self {
            subject: subject.to_string(),
            message,
        }
    }
}

pub fn file_not_found(file_name: &str) -> EmailContent {
    EmailContent::new(
        "Data Submission Error: Missing Required File",
        format!(
            "The file {file_name} that you submitted could not be found. \
             Please check the file and try again."
        ),
    )
}

pub fn supplementary_distribution_not_found(distribution: &str) -> EmailContent {
    EmailContent::new(
        "Data Submission Error: Missing Supplementary Distribution",
        format!(
            "The supplementary distribution {distribution} that you submitted could not be \
             found. Please check your submission and try again."
        ),
    )
}

pub fn submission_processed() -> EmailContent {
    EmailContent::new(
        "Data Submission: Processed Successfully",
        "Your data submission has been processed. If there were any issues, you will \
         receive a separate email with the details."
            .to_string(),
    )
}

pub fn submission_failed() -> EmailContent {
    EmailContent::new(
        "Data Submission Error: Processing Failed",
        "Your data submission could not be processed. The data engineering team has been \
         notified and will be in touch."
            .to_string(),
    )
}

/// Diagnostic text for a file the pipeline expected but could not find.
pub fn expected_local_file_missing(
    msg: &str,
    pattern: &str,
    pipeline: &str,
    listing: &[String],
) -> String {
    format!(
        "A pipeline has encountered an issue finding a local file.\n\
         Pipeline's name: {pipeline}\n\
         File: {pattern}\n\
         Message: {msg}\n\
         Files in directory: [{}]",
        listing.join(", ")
    )
}

/// Diagnostic text for an error with no dedicated template.
pub fn unexpected_error(msg: &str, error: &dyn Error) -> String {
    let mut text = format!("{msg}\nError: {error}");
    let mut source = error.source();
    while let Some(cause) = source {
        text.push_str(&format!("\nCaused by: {cause}"));
        source = cause.source();
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn templates_name_the_file() {
        let content = file_not_found("^data.xml$");
        assert_eq!(content.subject, "Data Submission Error: Missing Required File");
        assert!(content.message.contains("^data.xml$"));
        assert!(
            supplementary_distribution_not_found("^extra.csv$")
                .message
                .contains("^extra.csv$")
        );
    }

    #[test]
    fn diagnostics_include_listing_and_causes() {
        let text = expected_local_file_missing(
            "Required file not found",
            "^data.xml$",
            "dataset_ingress_v1",
            &["manifest.json".to_string()],
        );
        assert!(text.contains("Pipeline's name: dataset_ingress_v1"));
        assert!(text.contains("[manifest.json]"));

        let io = std::io::Error::other("disk full");
        let text = unexpected_error("Upload failed", &io);
        assert_eq!(text, "Upload failed\nError: disk full");
    }
}
