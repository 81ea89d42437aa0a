//! Application state and event routing.

use crate::shortcuts::{Action, ShortcutRegistry};
use blockdraft_core::storage::{load_from_path, save_to_path};
use blockdraft_core::{
    BlockId, BlockRequest, DesignFile, Editor, EditorConfig, FileStorage, InteractionHandler,
    KeyEvent, LoadReport, Modifiers, PointerEvent, RequestError, SceneSurface, Storage,
    StorageError,
};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Application errors.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Request(#[from] RequestError),
    #[error("Invalid config {path}: {message}")]
    Config { path: String, message: String },
    #[error("No design name set; save with a name first")]
    Unnamed,
}

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub title: String,
    /// Where named designs are stored. Defaults to the user data directory.
    pub storage_dir: Option<PathBuf>,
    pub editor: EditorConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            title: "Blockdraft".to_string(),
            storage_dir: None,
            editor: EditorConfig::default(),
        }
    }
}

impl AppConfig {
    /// Read a JSON config file. Missing fields take their defaults.
    pub fn from_file(path: &Path) -> Result<Self, AppError> {
        let config_error = |message: String| AppError::Config {
            path: path.display().to_string(),
            message,
        };
        let json = fs::read_to_string(path).map_err(|e| config_error(e.to_string()))?;
        serde_json::from_str(&json).map_err(|e| config_error(e.to_string()))
    }

    fn open_storage(&self) -> Result<FileStorage, StorageError> {
        match &self.storage_dir {
            Some(dir) => FileStorage::new(dir.clone()),
            None => FileStorage::default_location(),
        }
    }
}

/// The editor plus everything around it that a front end talks to.
pub struct App {
    editor: Editor<SceneSurface>,
    handler: InteractionHandler,
    storage: Box<dyn Storage>,
    config: AppConfig,
    /// Name the current design was last opened or saved under.
    design_name: Option<String>,
    /// New-block dialog waiting for confirmation.
    pending_request: Option<BlockRequest>,
}

impl App {
    /// App backed by file storage in the configured directory.
    pub fn new(config: AppConfig) -> Result<Self, AppError> {
        let storage = config.open_storage()?;
        log::info!("Designs stored in {}", storage.base_path().display());
        Ok(Self::with_storage(config, Box::new(storage)))
    }

    pub fn with_storage(config: AppConfig, storage: Box<dyn Storage>) -> Self {
        Self {
            editor: Editor::new(SceneSurface::new(), config.editor.clone()),
            handler: InteractionHandler::new(),
            storage,
            config,
            design_name: None,
            pending_request: None,
        }
    }

    pub fn editor(&self) -> &Editor<SceneSurface> {
        &self.editor
    }

    pub fn handler(&self) -> &InteractionHandler {
        &self.handler
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn design_name(&self) -> Option<&str> {
        self.design_name.as_deref()
    }

    /// Window title, with the design name when there is one.
    pub fn title(&self) -> String {
        match &self.design_name {
            Some(name) => format!("{} - {}", name, self.config.title),
            None => self.config.title.clone(),
        }
    }

    /// Route a pointer event. The canvas ignores input while the new-block dialog is open.
    ///
    /// Opening the dialog abandons any drag or connection in progress.
    pub fn handle_pointer(&mut self, event: PointerEvent) {
        if self.pending_request.is_some() {
            self.handler.input_mut().handle_pointer_event(event);
            return;
        }
        if let Some(request) = self.handler.handle_pointer_event(&mut self.editor, event) {
            self.handler.cancel(&mut self.editor);
            self.pending_request = Some(request);
        }
    }

    pub fn pending_request(&self) -> Option<&BlockRequest> {
        self.pending_request.as_ref()
    }

    /// Confirm the open dialog with the text of its two fields.
    ///
    /// On a parse error the dialog stays open.
    pub fn confirm_request(
        &mut self,
        inputs: &str,
        outputs: &str,
    ) -> Result<Option<BlockId>, AppError> {
        let Some(request) = self.pending_request else {
            return Ok(None);
        };
        let request = request.with_fields(inputs, outputs)?;
        self.pending_request = None;
        Ok(Some(self.editor.confirm_block(&request)))
    }

    pub fn cancel_request(&mut self) {
        self.pending_request = None;
    }

    /// Route a key event to its shortcut. Returns the action performed.
    pub fn handle_key(&mut self, event: KeyEvent) -> Result<Option<Action>, AppError> {
        let pressed = match &event {
            KeyEvent::Pressed(key) => Some(key.clone()),
            KeyEvent::Released(_) => None,
        };
        // False on release and on auto-repeat.
        let went_down = self.handler.input_mut().handle_key_event(event);
        let Some(key) = pressed.filter(|_| went_down) else {
            return Ok(None);
        };
        let modifiers = self.handler.input().modifiers;
        let Some(action) = ShortcutRegistry::action_for(&key, modifiers) else {
            return Ok(None);
        };
        self.perform(action)?;
        Ok(Some(action))
    }

    pub fn set_modifiers(&mut self, modifiers: Modifiers) {
        self.handler.input_mut().set_modifiers(modifiers);
    }

    /// Run one action.
    pub fn perform(&mut self, action: Action) -> Result<(), AppError> {
        match action {
            Action::Undo => {
                if !self.editor.undo() {
                    log::debug!("Nothing to undo");
                }
            }
            Action::Redo => {
                if !self.editor.redo() {
                    log::debug!("Nothing to redo");
                }
            }
            Action::Save => {
                let name = self.design_name.clone().ok_or(AppError::Unnamed)?;
                self.save(&name)?;
            }
            Action::Cancel => {
                self.pending_request = None;
                self.handler.cancel(&mut self.editor);
            }
            Action::DeleteBlock => {
                let pointer = self.handler.input().pointer_position;
                if self.handler.is_idle() {
                    if let Some(block) = self.editor.block_at(pointer) {
                        self.editor.delete_block(block);
                    }
                }
            }
        }
        Ok(())
    }

    /// Save under a name in the configured storage.
    pub fn save(&mut self, name: &str) -> Result<(), AppError> {
        self.editor.save(self.storage.as_ref(), name)?;
        self.design_name = Some(name.to_string());
        Ok(())
    }

    /// Open a named design from the configured storage.
    pub fn open(&mut self, name: &str) -> Result<LoadReport, AppError> {
        let design = self.storage.load(name)?;
        let report = self.replace_design(&design);
        self.design_name = Some(name.to_string());
        Ok(report)
    }

    /// Names of all stored designs.
    pub fn designs(&self) -> Result<Vec<String>, AppError> {
        Ok(self.storage.list()?)
    }

    /// Write the design to an arbitrary file.
    pub fn export(&self, path: &Path) -> Result<(), AppError> {
        save_to_path(path, &self.editor.to_design())?;
        log::info!("Wrote {}", path.display());
        Ok(())
    }

    /// Load a design from an arbitrary file.
    pub fn import(&mut self, path: &Path) -> Result<LoadReport, AppError> {
        let design = load_from_path(path)?;
        let report = self.replace_design(&design);
        self.design_name = path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .map(str::to_string);
        Ok(report)
    }

    fn replace_design(&mut self, design: &DesignFile) -> LoadReport {
        self.pending_request = None;
        self.handler.cancel(&mut self.editor);
        self.editor.load_design(design)
    }
}
