//! User-visible notifications raised by the mutation layer.

use std::sync::{Arc, Mutex};
use tracing::{error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
  Success,
  Info,
  Warning,
  Error,
}

/// One toast: a headline plus an optional detail line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
  pub level: Level,
  pub title: String,
  pub description: Option<String>,
}

impl Notification {
  pub fn success(title: impl Into<String>) -> Self {
    Self {
      level: Level::Success,
      title: title.into(),
      description: None,
    }
  }

  pub fn error(title: impl Into<String>, description: impl Into<String>) -> Self {
    Self {
      level: Level::Error,
      title: title.into(),
      description: Some(description.into()),
    }
  }

  pub fn warning(title: impl Into<String>, description: impl Into<String>) -> Self {
    Self {
      level: Level::Warning,
      title: title.into(),
      description: Some(description.into()),
    }
  }
}

impl std::fmt::Display for Notification {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match &self.description {
      // The detail often repeats the title when the server had nothing to add
      Some(d) if d != &self.title => write!(f, "{}: {}", self.title, d),
      _ => f.write_str(&self.title),
    }
  }
}

/// Where notifications go. Front ends supply their own.
pub trait Notifier: Send + Sync {
  fn notify(&self, notification: Notification);
}

/// Writes notifications to the log only.
#[derive(Debug, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
  fn notify(&self, n: Notification) {
    match n.level {
      Level::Error => error!("{}", n),
      Level::Warning => warn!("{}", n),
      Level::Success | Level::Info => info!("{}", n),
    }
  }
}

/// Prints notifications to the terminal (errors to stderr).
#[derive(Debug, Default)]
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
  fn notify(&self, n: Notification) {
    LogNotifier.notify(n.clone());
    match n.level {
      Level::Error => eprintln!("error: {}", n),
      Level::Warning => eprintln!("warning: {}", n),
      Level::Success | Level::Info => println!("{}", n),
    }
  }
}

/// Keeps every notification for inspection.
#[derive(Debug, Clone, Default)]
pub struct RecordingNotifier {
  seen: Arc<Mutex<Vec<Notification>>>,
}

impl RecordingNotifier {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn notifications(&self) -> Vec<Notification> {
    self
      .seen
      .lock()
      .map(|seen| seen.clone())
      .unwrap_or_default()
  }

  pub fn errors(&self) -> Vec<Notification> {
    self
      .notifications()
      .into_iter()
      .filter(|n| n.level == Level::Error)
      .collect()
  }
}

impl Notifier for RecordingNotifier {
  fn notify(&self, notification: Notification) {
    if let Ok(mut seen) = self.seen.lock() {
      seen.push(notification);
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_display_skips_repeated_detail() {
    let n = Notification::error("Failed to add item", "Failed to add item");
    assert_eq!(n.to_string(), "Failed to add item");

    let n = Notification::error("Failed to add item", "Name is required");
    assert_eq!(n.to_string(), "Failed to add item: Name is required");
  }

  #[test]
  fn test_recording_notifier() {
    let notifier = RecordingNotifier::new();
    notifier.notify(Notification::success("Saved"));
    notifier.notify(Notification::error("Failed", "boom"));
    assert_eq!(notifier.notifications().len(), 2);
    assert_eq!(notifier.errors(), vec![Notification::error("Failed", "boom")]);
  }
}
