//! Keyboard shortcut registry and documentation.

use blockdraft_core::Modifiers;

/// What a shortcut does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Undo,
    Redo,
    Save,
    /// Abandon the gesture in progress or close the new-block dialog.
    Cancel,
    /// Delete the block under the pointer.
    DeleteBlock,
}

/// A keyboard shortcut definition.
#[derive(Debug, Clone)]
pub struct Shortcut {
    pub key: &'static str,
    pub ctrl: bool,
    pub shift: bool,
    pub action: Action,
    pub description: &'static str,
}

impl Shortcut {
    pub const fn new(
        key: &'static str,
        ctrl: bool,
        shift: bool,
        action: Action,
        description: &'static str,
    ) -> Self {
        Self {
            key,
            ctrl,
            shift,
            action,
            description,
        }
    }

    /// Format the shortcut for display (e.g., "Ctrl+S").
    pub fn format(&self) -> String {
        let mut parts = Vec::new();
        if self.ctrl {
            parts.push("Ctrl");
        }
        if self.shift {
            parts.push("Shift");
        }
        parts.push(self.key);
        parts.join("+")
    }

    /// Whether a key press with these modifiers triggers the shortcut.
    pub fn matches(&self, key: &str, modifiers: Modifiers) -> bool {
        self.key.eq_ignore_ascii_case(key)
            && self.ctrl == modifiers.command()
            && self.shift == modifiers.shift
    }
}

/// Registry of all keyboard shortcuts.
pub struct ShortcutRegistry;

impl ShortcutRegistry {
    pub fn all() -> Vec<Shortcut> {
        vec![
            Shortcut::new("Z", true, false, Action::Undo, "Undo"),
            Shortcut::new("Z", true, true, Action::Redo, "Redo"),
            Shortcut::new("Y", true, false, Action::Redo, "Redo"),
            Shortcut::new("S", true, false, Action::Save, "Save design"),
            Shortcut::new(
                "Delete",
                false,
                false,
                Action::DeleteBlock,
                "Delete block under pointer",
            ),
            Shortcut::new(
                "Backspace",
                false,
                false,
                Action::DeleteBlock,
                "Delete block under pointer",
            ),
            Shortcut::new("Escape", false, false, Action::Cancel, "Cancel current action"),
        ]
    }

    /// Action bound to a key press, if any.
    pub fn action_for(key: &str, modifiers: Modifiers) -> Option<Action> {
        Self::all()
            .into_iter()
            .find(|s| s.matches(key, modifiers))
            .map(|s| s.action)
    }

    /// Print all shortcuts to console.
    pub fn print_all() {
        println!("\n=== Keyboard Shortcuts ===");
        for shortcut in Self::all() {
            println!("  {:20} {}", shortcut.format(), shortcut.description);
        }
        println!("  {:20} {}", "Right click", "Add block");
        println!("  {:20} {}", "Drag from port", "Connect ports");
        println!();
    }
}
