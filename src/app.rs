use eframe::egui;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{channel, TryRecvError};
use std::sync::Arc;
use std::thread;
use tracing::{debug, error, info, warn};

use crate::config::AppConfig;
use crate::core::{
    ClassifyError, Direction, LabelSet, LabelState, LocalMover, Mover, SortingSession,
};
use crate::state::{JobMessage, JobState, Settings, SettingsError, Tone, UIState};
use crate::ui;
use crate::ui::thumbnails::ThumbnailCache;

pub struct ImageSorterApp {
    // Core application state
    pub config: AppConfig,
    pub settings: Settings,
    /// Where settings are written; `None` when no config dir is available
    pub settings_path: Option<PathBuf>,
    pub labels: LabelSet,
    pub session: SortingSession,
    pub mover: Arc<dyn Mover>,

    // Presentation state
    pub thumbnails: ThumbnailCache,
    pub ui: UIState,
    pub jobs: JobState,
}

impl ImageSorterApp {
    pub fn new(settings: Settings) -> Self {
        Self::with_mover(
            settings,
            Settings::get_config_path(),
            Arc::new(LocalMover::new()),
        )
    }

    pub fn with_mover(
        settings: Settings,
        settings_path: Option<PathBuf>,
        mover: Arc<dyn Mover>,
    ) -> Self {
        let labels = settings.label_set();
        let mut app = Self {
            config: AppConfig::default(),
            settings,
            settings_path,
            labels,
            session: SortingSession::new(),
            mover,
            thumbnails: ThumbnailCache::new(),
            ui: UIState::new(),
            jobs: JobState::new(),
        };

        // Reopen the last folder if it is still there
        if let Some(folder) = app.settings.target_folder.clone() {
            if folder.is_dir() {
                app.open_folder(folder);
            } else {
                warn!("Last folder no longer exists: {:?}", folder);
            }
        }

        app
    }

    /// List `folder` and make it the target folder. Returns `false` when the
    /// folder could not be opened; the previous folder then stays in place.
    pub fn open_folder(&mut self, folder: PathBuf) -> bool {
        if self.jobs.is_running() {
            self.ui
                .notify("Wait for the current file operation to finish", Tone::Info);
            return false;
        }

        match self
            .session
            .open_folder(&folder, self.mover.as_ref(), self.settings.grid())
        {
            Ok(count) => {
                self.thumbnails.clear();
                if self.settings.target_folder.as_ref() != Some(&folder) {
                    self.settings.target_folder = Some(folder);
                    self.save_settings();
                }
                self.ui.notify(format!("Loaded {} images", count), Tone::Info);
                true
            }
            Err(e) => {
                error!("Failed to open folder {:?}: {}", folder, e);
                self.ui.notify(e.to_string(), Tone::Error);
                false
            }
        }
    }

    pub fn handle_image_click(&mut self, path: &str, direction: Direction) {
        match self.session.toggle(path, direction, &self.labels) {
            Ok(state) => debug!("{} -> state {}", path, state),
            Err(e) => debug!("Ignoring click on {}: {}", path, e),
        }
    }

    /// Put one image back to unclassified
    pub fn clear_label(&mut self, path: &str) {
        if let Err(e) = self.session.set_state(path, LabelState::Unclassified) {
            debug!("Ignoring clear on {}: {}", path, e);
        }
    }

    /// Send the labeled images of the current page to the mover
    pub fn classify(&mut self) {
        let ticket = match self
            .session
            .begin_classify(&self.labels, self.settings.target_folder.as_deref())
        {
            Ok(ticket) => ticket,
            Err(e) => {
                self.report(&e);
                return;
            }
        };

        info!("Committing {} images", ticket.classified());
        let (tx, rx) = channel();
        self.jobs.receiver = Some(rx);
        let mover = Arc::clone(&self.mover);
        thread::spawn(move || {
            let result = mover.relocate(&ticket.request);
            let _ = tx.send(JobMessage::Classified(ticket, result));
        });
    }

    /// Move the files of the last commit back
    pub fn undo(&mut self) {
        let ticket = match self.session.begin_undo() {
            Ok(ticket) => ticket,
            Err(e) => {
                self.report(&e);
                return;
            }
        };

        info!("Undoing {} moves", ticket.request.moved_files.len());
        let (tx, rx) = channel();
        self.jobs.receiver = Some(rx);
        let mover = Arc::clone(&self.mover);
        thread::spawn(move || {
            let result = mover.reverse_relocate(&ticket.request);
            let _ = tx.send(JobMessage::Undone(ticket, result));
        });
    }

    /// Apply a finished background job, if any
    pub fn poll_jobs(&mut self) {
        let Some(receiver) = &self.jobs.receiver else {
            return;
        };
        let message = match receiver.try_recv() {
            Ok(message) => message,
            Err(TryRecvError::Empty) => return,
            Err(TryRecvError::Disconnected) => {
                // Worker died without answering; the ticket went with it
                error!("File operation worker exited without a result");
                self.jobs.receiver = None;
                self.session = SortingSession::new();
                self.thumbnails.clear();
                self.ui
                    .notify("File operation failed unexpectedly; reopen the folder", Tone::Error);
                return;
            }
        };
        self.jobs.receiver = None;

        match message {
            JobMessage::Classified(ticket, result) => {
                match self
                    .session
                    .finish_classify(ticket, result, self.settings.grid())
                {
                    Ok(outcome) => {
                        self.thumbnails.retain_page(self.session.page());
                        self.ui.notify(
                            format!("Sorted {} images", outcome.moved),
                            Tone::Success,
                        );
                    }
                    Err(e) => self.report(&e),
                }
            }
            JobMessage::Undone(ticket, result) => {
                match self.session.finish_undo(
                    ticket,
                    result,
                    self.mover.as_ref(),
                    self.settings.grid(),
                ) {
                    Ok(report) => {
                        self.thumbnails.retain_page(self.session.page());
                        let restored = report.outcome.restored;
                        match report.reload {
                            Ok(_) => self.ui.notify(
                                format!("Restored {} file(s)", restored),
                                Tone::Success,
                            ),
                            Err(e) => {
                                error!("Failed to reload after undo: {}", e);
                                self.ui.notify(
                                    format!(
                                        "Restored {} file(s), but reloading the folder failed: {}",
                                        restored, e
                                    ),
                                    Tone::Error,
                                );
                            }
                        }
                    }
                    Err(e) => self.report(&e),
                }
            }
        }
    }

    /// Replace the settings with the edited copy from the settings window.
    ///
    /// The target folder only changes once the new folder has been listed, so
    /// the listed folder and the label root never diverge. Returns `false` when
    /// nothing or only part of the change was applied.
    pub fn apply_settings(&mut self, new_settings: Settings) -> bool {
        if self.jobs.is_running() {
            self.ui
                .notify("Wait for the current file operation to finish", Tone::Info);
            return false;
        }

        let mut new_settings = new_settings.normalized();
        let requested_folder = new_settings.target_folder.take();
        new_settings.target_folder = self.settings.target_folder.clone();

        let grid_changed = new_settings.grid() != self.settings.grid();
        let folder_changed = requested_folder != self.settings.target_folder;

        self.labels = new_settings.label_set();
        self.settings = new_settings;
        self.save_settings();

        let reset = self.session.apply_labels(&self.labels);
        if reset > 0 {
            info!("{} images lost their label after the label list changed", reset);
        }

        let reopened = folder_changed
            && match requested_folder {
                // Writes the folder to settings only when the listing succeeds
                Some(folder) => self.open_folder(folder),
                None => {
                    self.session.close_folder();
                    self.thumbnails.clear();
                    self.settings.target_folder = None;
                    self.save_settings();
                    true
                }
            };

        if grid_changed && !reopened {
            self.session.regrid(self.settings.grid());
            self.thumbnails.retain_page(self.session.page());
        }

        !folder_changed || reopened
    }

    fn save_settings(&self) {
        let result = self
            .settings_path
            .as_deref()
            .ok_or(SettingsError::NoConfigDir)
            .and_then(|path: &Path| self.settings.save_to(path));
        if let Err(e) = result {
            warn!("Settings not saved: {}", e);
        }
    }

    fn report(&mut self, error: &ClassifyError) {
        if error.is_user_error() {
            info!("{}", error);
            self.ui.notify(error.to_string(), Tone::Info);
        } else {
            error!("{}", error);
            self.ui.notify(error.to_string(), Tone::Error);
        }
    }
}

impl eframe::App for ImageSorterApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_jobs();
        if self.jobs.is_running() {
            ctx.request_repaint();
        }

        ui::render_top_panel(self, ctx);
        ui::render_bottom_panel(self, ctx);
        ui::render_central_panel(self, ctx);
        ui::render_settings_window(self, ctx);
        ui::render_toast_notification(self, ctx);
        ui::handle_keyboard_shortcuts(self, ctx);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::mover::{RelocateRequest, RelocateResponse, ReverseRequest, ReverseResponse};
    use crate::core::{ImageRef, MoverError};
    use std::fs;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::time::{Duration, Instant};
    use tempfile::TempDir;

    fn settings_for(dir: &Path) -> Settings {
        Settings {
            target_folder: Some(dir.to_path_buf()),
            grid_cols: 2,
            grid_rows: 1,
            ..Settings::default()
        }
    }

    fn folder_with(names: &[&str]) -> TempDir {
        let dir = TempDir::new().unwrap();
        for name in names {
            fs::write(dir.path().join(name), name).unwrap();
        }
        dir
    }

    /// App over `dir` that keeps its settings file inside `config`
    fn app_for(dir: &Path, config: &TempDir, mover: Arc<dyn Mover>) -> ImageSorterApp {
        ImageSorterApp::with_mover(
            settings_for(dir),
            Some(config.path().join("settings.json")),
            mover,
        )
    }

    fn wait_for_job(app: &mut ImageSorterApp) {
        let deadline = Instant::now() + Duration::from_secs(5);
        while app.jobs.is_running() && Instant::now() < deadline {
            app.poll_jobs();
            thread::sleep(Duration::from_millis(5));
        }
        assert!(!app.jobs.is_running());
    }

    /// Local mover whose listing breaks once an undo has gone through
    struct ListingBreaksAfterUndo {
        inner: LocalMover,
        broken: AtomicBool,
    }

    impl Mover for ListingBreaksAfterUndo {
        fn list_images(&self, folder: &Path) -> Result<Vec<ImageRef>, MoverError> {
            if self.broken.load(Ordering::SeqCst) {
                return Err(MoverError::PermissionDenied(folder.to_path_buf()));
            }
            self.inner.list_images(folder)
        }

        fn relocate(&self, request: &RelocateRequest) -> Result<RelocateResponse, MoverError> {
            self.inner.relocate(request)
        }

        fn reverse_relocate(&self, request: &ReverseRequest) -> Result<ReverseResponse, MoverError> {
            let response = self.inner.reverse_relocate(request);
            self.broken.store(true, Ordering::SeqCst);
            response
        }
    }

    #[test]
    fn test_commit_and_undo_through_worker() {
        let dir = folder_with(&["a.png", "b.png", "c.png"]);
        let config = TempDir::new().unwrap();
        let mut app = app_for(dir.path(), &config, Arc::new(LocalMover::new()));
        assert_eq!(app.session.page().len(), 2);

        let first = app.session.page()[0].path.clone();
        app.handle_image_click(&first, Direction::Forward);
        app.classify();
        assert!(app.session.is_busy());

        // Clicks are ignored while the commit is in flight
        let second = app.session.page()[1].path.clone();
        app.handle_image_click(&second, Direction::Forward);

        wait_for_job(&mut app);
        assert!(dir.path().join("text").join("a.png").exists());
        assert_eq!(app.session.total_processed(), 1);
        assert_eq!(app.session.page().len(), 1);

        app.undo();
        wait_for_job(&mut app);
        assert!(dir.path().join("a.png").exists());
        assert_eq!(app.session.total_processed(), 0);
        assert_eq!(app.session.page().len(), 2);
        let notification = app.ui.notification.as_ref().unwrap();
        assert_eq!(notification.tone, Tone::Success);
        assert_eq!(notification.message, "Restored 1 file(s)");
    }

    #[test]
    fn test_classify_without_selection_notifies() {
        let dir = folder_with(&["a.png"]);
        let config = TempDir::new().unwrap();
        let mut app = app_for(dir.path(), &config, Arc::new(LocalMover::new()));

        app.classify();

        assert!(!app.jobs.is_running());
        let notification = app.ui.notification.as_ref().unwrap();
        assert_eq!(notification.tone, Tone::Info);
        assert_eq!(notification.message, ClassifyError::NothingSelected.to_string());
    }

    #[test]
    fn test_clear_label_resets_one_image() {
        let dir = folder_with(&["a.png", "b.png"]);
        let config = TempDir::new().unwrap();
        let mut app = app_for(dir.path(), &config, Arc::new(LocalMover::new()));
        let first = app.session.page()[0].path.clone();

        app.handle_image_click(&first, Direction::Forward);
        assert_eq!(app.session.assigned_count(), 1);
        app.clear_label(&first);
        assert_eq!(app.session.assigned_count(), 0);
    }

    #[test]
    fn test_folder_change_refused_while_commit_in_flight() {
        let dir = folder_with(&["a.png", "b.png", "c.png"]);
        let other = folder_with(&["z.png"]);
        let config = TempDir::new().unwrap();
        let mut app = app_for(dir.path(), &config, Arc::new(LocalMover::new()));

        let first = app.session.page()[0].path.clone();
        app.handle_image_click(&first, Direction::Forward);
        app.classify();
        assert!(!app.apply_settings(settings_for(other.path())));
        wait_for_job(&mut app);

        assert_eq!(app.session.folder(), Some(dir.path()));
        assert_eq!(app.settings.target_folder.as_deref(), Some(dir.path()));

        // The next commit still lands under the listed folder
        let next = app.session.page()[0].path.clone();
        app.handle_image_click(&next, Direction::Forward);
        app.classify();
        wait_for_job(&mut app);
        assert!(dir.path().join("text").join("c.png").exists());
        assert!(!other.path().join("text").exists());
    }

    #[test]
    fn test_folder_change_to_missing_folder_keeps_current_one() {
        let dir = folder_with(&["a.png"]);
        let config = TempDir::new().unwrap();
        let mut app = app_for(dir.path(), &config, Arc::new(LocalMover::new()));

        let mut draft = settings_for(&dir.path().join("missing"));
        draft.grid_cols = 3;
        assert!(!app.apply_settings(draft));

        assert_eq!(app.session.folder(), Some(dir.path()));
        assert_eq!(app.settings.target_folder.as_deref(), Some(dir.path()));
        assert_eq!(app.settings.grid_cols, 3);
        assert_eq!(app.session.page().len(), 1);
        assert_eq!(app.ui.notification.as_ref().unwrap().tone, Tone::Error);

        let saved = Settings::load_from(&config.path().join("settings.json"));
        assert_eq!(saved.target_folder.as_deref(), Some(dir.path()));
    }

    #[test]
    fn test_folder_change_opens_and_saves_new_folder() {
        let dir = folder_with(&["a.png"]);
        let other = folder_with(&["x.png", "y.png"]);
        let config = TempDir::new().unwrap();
        let mut app = app_for(dir.path(), &config, Arc::new(LocalMover::new()));

        assert!(app.apply_settings(settings_for(other.path())));

        assert_eq!(app.session.folder(), Some(other.path()));
        assert_eq!(app.settings.target_folder.as_deref(), Some(other.path()));
        assert_eq!(app.session.total_images(), 2);
        let saved = Settings::load_from(&config.path().join("settings.json"));
        assert_eq!(saved.target_folder.as_deref(), Some(other.path()));
    }

    #[test]
    fn test_undo_with_failed_reload_notifies_error() {
        let dir = folder_with(&["a.png", "b.png"]);
        let config = TempDir::new().unwrap();
        let mover = Arc::new(ListingBreaksAfterUndo {
            inner: LocalMover::new(),
            broken: AtomicBool::new(false),
        });
        let mut app = app_for(dir.path(), &config, mover);

        let first = app.session.page()[0].path.clone();
        app.handle_image_click(&first, Direction::Forward);
        app.classify();
        wait_for_job(&mut app);

        app.undo();
        wait_for_job(&mut app);

        assert!(dir.path().join("a.png").exists());
        assert_eq!(app.session.total_processed(), 0);
        let notification = app.ui.notification.as_ref().unwrap();
        assert_eq!(notification.tone, Tone::Error);
        assert!(notification.message.starts_with("Restored 1 file(s), but reloading"));
    }
}
