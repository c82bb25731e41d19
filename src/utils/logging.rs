use crate::core::speech::SpeechRequest;
use chrono::Local;
use std::fs::OpenOptions;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Append-only transcript of every announcement the speech channel emits.
pub struct LoggingState {
    file_path: Option<String>,
    is_active: bool,
}

impl LoggingState {
    pub fn new(log_file: Option<String>) -> Result<Self, Box<dyn std::error::Error>> {
        let mut logging = LoggingState {
            file_path: None,
            is_active: false,
        };

        if let Some(path) = log_file {
            logging.set_log_file(path)?;
        }

        Ok(logging)
    }

    pub fn set_log_file(&mut self, path: String) -> Result<String, Box<dyn std::error::Error>> {
        // Test if we can create/write to the file
        self.test_file_access(&path)?;

        self.file_path = Some(path.clone());
        self.is_active = true;

        Ok(format!("Transcript enabled to: {path}"))
    }

    pub fn toggle_logging(&mut self) -> Result<String, Box<dyn std::error::Error>> {
        match &self.file_path {
            Some(path) => {
                if self.is_active {
                    self.write_line("## transcript paused")?;
                    self.is_active = false;
                    Ok(format!("Transcript paused (file: {path})"))
                } else {
                    self.is_active = true;
                    Ok(format!("Transcript resumed to: {path}"))
                }
            }
            None => Err(
                "No transcript file configured. Run murmur set transcript <file> first.".into(),
            ),
        }
    }

    pub fn log_announcement(
        &self,
        request: &SpeechRequest,
    ) -> Result<(), Box<dyn std::error::Error>> {
        if !self.is_active {
            return Ok(());
        }

        let stamp = Local::now().format("%H:%M:%S");
        self.write_line(&format!(
            "{stamp} [{}] {}",
            request.priority.as_str(),
            request.text
        ))
    }

    fn write_line(&self, line: &str) -> Result<(), Box<dyn std::error::Error>> {
        let Some(file_path) = self.file_path.as_ref() else {
            return Ok(());
        };

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(file_path)?;
        let mut writer = BufWriter::new(file);

        // Announcements never span lines in the transcript
        let flat = line.lines().collect::<Vec<_>>().join(" ");
        writeln!(writer, "{flat}")?;

        writer.flush()?;
        Ok(())
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }

    pub fn get_status_string(&self) -> String {
        match (&self.file_path, self.is_active) {
            (None, _) => "disabled".to_string(),
            (Some(path), true) => format!(
                "active ({})",
                Path::new(path)
                    .file_name()
                    .unwrap_or_default()
                    .to_string_lossy()
            ),
            (Some(path), false) => format!(
                "paused ({})",
                Path::new(path)
                    .file_name()
                    .unwrap_or_default()
                    .to_string_lossy()
            ),
        }
    }

    fn test_file_access(&self, path: &str) -> Result<(), Box<dyn std::error::Error>> {
        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        file.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::speech::Priority;
    use tempfile::TempDir;

    fn request(text: &str, priority: Priority) -> SpeechRequest {
        SpeechRequest {
            text: text.to_string(),
            priority,
        }
    }

    #[test]
    fn transcript_records_priority_and_text() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("transcript.log");
        let logging = LoggingState::new(Some(path.to_string_lossy().into_owned())).unwrap();

        logging
            .log_announcement(&request("Mod list. Core, 1 of 3, enabled", Priority::Normal))
            .unwrap();
        logging
            .log_announcement(&request("Cannot enable Foo", Priority::High))
            .unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].ends_with("[normal] Mod list. Core, 1 of 3, enabled"));
        assert!(lines[1].contains("[high] Cannot enable Foo"));
    }

    #[test]
    fn paused_transcript_skips_announcements() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("transcript.log");
        let mut logging = LoggingState::new(Some(path.to_string_lossy().into_owned())).unwrap();

        let status = logging.toggle_logging().unwrap();
        assert!(status.starts_with("Transcript paused"));
        assert!(logging.get_status_string().starts_with("paused"));
        logging
            .log_announcement(&request("ignored", Priority::Low))
            .unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents.trim(), "## transcript paused");
    }

    #[test]
    fn toggle_without_file_is_an_error() {
        let mut logging = LoggingState::new(None).unwrap();
        let err = logging.toggle_logging().unwrap_err();
        assert!(err.to_string().starts_with("No transcript file configured"));
        assert_eq!(logging.get_status_string(), "disabled");
    }
}
