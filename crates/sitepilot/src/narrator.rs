use std::sync::Mutex;

use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use sitepilot_core::narration::{Narration, Speaker};

use crate::prelude::{eprintln, println};

/// Receives progress lines as a request runs
pub trait Narrator {
    fn narrate(&self, message: Narration);
}

/// Prints narration to the terminal, with a spinner while the model thinks
#[derive(Default)]
pub struct TerminalNarrator {
    spinner: Mutex<Option<ProgressBar>>,
    json: bool,
}

impl TerminalNarrator {
    pub fn new(json: bool) -> Self {
        Self {
            spinner: Mutex::new(None),
            json,
        }
    }

    fn stop_spinner(&self) {
        let mut spinner = self.spinner.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(spinner) = spinner.take() {
            spinner.finish_and_clear();
        }
    }

    fn start_spinner(&self, message: String) {
        let spinner = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
            spinner.set_style(style);
        }
        spinner.set_message(message);
        spinner.enable_steady_tick(std::time::Duration::from_millis(100));

        *self.spinner.lock().unwrap_or_else(|e| e.into_inner()) = Some(spinner);
    }
}

impl Narrator for TerminalNarrator {
    fn narrate(&self, message: Narration) {
        self.stop_spinner();

        if message.is_failure() {
            log::error!("{}", message);
        } else {
            log::info!("{}", message);
        }

        if self.json {
            if let Ok(line) = serde_json::to_string(&message) {
                println!("{}", line);
            }
            return;
        }

        match (&message, message.speaker()) {
            (Narration::Thinking, _) => self.start_spinner(message.to_string()),
            (_, Speaker::User) => println!("{} {}", ">".bold().cyan(), message.to_string().bold()),
            (Narration::Updated { .. } | Narration::Created { .. } | Narration::PushComplete, _) => {
                println!("{} {}", "✓".green(), message.to_string().green())
            }
            (Narration::Preview { url }, _) => println!("{} {}", "Preview:".dimmed(), url.underline()),
            _ if message.is_failure() => eprintln!("{}", message.to_string().red()),
            _ => println!("{}", message.to_string().dimmed()),
        }
    }
}

impl Drop for TerminalNarrator {
    fn drop(&mut self) {
        self.stop_spinner();
    }
}

#[cfg(test)]
pub use recording::RecordingNarrator;
