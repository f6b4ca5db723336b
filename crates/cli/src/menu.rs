//! Select-one agent menu.

use dialoguer::Select;
use dialoguer::theme::ColorfulTheme;
use std::io;

pub const MENU_PROMPT: &str = "Choose an agent to chat with";

/// Picks one entry from a list. `None` means the user dismissed the menu.
pub trait AgentPicker {
    fn pick(&self, prompt: &str, items: &[&str]) -> io::Result<Option<usize>>;
}

/// Arrow-key menu on the controlling terminal.
pub struct DialoguerPicker;

impl AgentPicker for DialoguerPicker {
    fn pick(&self, prompt: &str, items: &[&str]) -> io::Result<Option<usize>> {
        Select::with_theme(&ColorfulTheme::default())
            .with_prompt(prompt)
            .items(items)
            .default(0)
            .interact_opt()
            .map_err(|e| io::Error::other(e.to_string()))
    }
}
