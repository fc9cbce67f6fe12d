use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusLevel {
    Info,
    Success,
    Error,
    Loading,
}

/// The single line of feedback shown under the canvas.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    level: StatusLevel,
    text: String,
    started_at: Option<Instant>,
}

impl StatusMessage {
    pub fn new(level: StatusLevel, text: impl Into<String>) -> Self {
        Self {
            level,
            text: text.into(),
            started_at: (level == StatusLevel::Loading).then(Instant::now),
        }
    }

    pub fn info(text: impl Into<String>) -> Self {
        Self::new(StatusLevel::Info, text)
    }

    pub fn success(text: impl Into<String>) -> Self {
        Self::new(StatusLevel::Success, text)
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self::new(StatusLevel::Error, text)
    }

    pub fn loading(text: impl Into<String>) -> Self {
        Self::new(StatusLevel::Loading, text)
    }

    pub fn level(&self) -> StatusLevel {
        self.level
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Time spent in a loading status; `None` for every other level.
    pub fn elapsed(&self) -> Option<Duration> {
        self.started_at.map(|started| started.elapsed())
    }

    pub fn elapsed_label(&self) -> Option<String> {
        self.elapsed().map(format_elapsed)
    }
}

impl Default for StatusMessage {
    fn default() -> Self {
        Self::info("Upload an image to begin.")
    }
}

impl std::fmt::Display for StatusMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.text)
    }
}

pub fn format_elapsed(elapsed: Duration) -> String {
    let seconds = elapsed.as_secs();
    let minutes = seconds / 60;
    if minutes > 0 {
        format!("{minutes}m {}s", seconds % 60)
    } else {
        format!("{seconds}s")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn elapsed_label_switches_to_minutes() {
        assert_eq!(format_elapsed(Duration::from_millis(999)), "0s");
        assert_eq!(format_elapsed(Duration::from_secs(59)), "59s");
        assert_eq!(format_elapsed(Duration::from_secs(125)), "2m 5s");
    }

    #[test]
    fn only_loading_status_tracks_time() {
        assert!(StatusMessage::loading("working").elapsed().is_some());
        assert!(StatusMessage::error("nope").elapsed().is_none());
        assert_eq!(StatusMessage::default().level(), StatusLevel::Info);
    }
}
