//! Application state and logic.

use crate::config::Config;
use crate::groups::GroupIndex;
use crate::keys;
use crate::loader::{self, LoadHandle, LoadPoll};
use crate::models::{Dataset, GroupId};
use crate::session::{SessionController, SessionState};
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::{Position, Rect};
use std::path::PathBuf;
use tracing::{info, warn};

pub struct App {
    pub config: Config,
    pub data: DataStatus,
    pub session: SessionController,
    pub word_count: usize,
    pub group_cursor: usize,
    pub word_list: bool,
    pub word_cursor: usize,
    pub pending_load: Option<LoadHandle>,
    pub editing: bool,
    pub input_buffer: String,
    pub message: Option<String>,
    pub show_help: bool,
    /// Last drawn card area, for click-to-reveal.
    pub card_area: Option<Rect>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataStatus {
    Loading(String),
    NoData(String),
    Ready,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Groups,
    Study,
    WordList,
}

impl App {
    pub fn new(config: Config) -> anyhow::Result<Self> {
        config.validate()?;
        Ok(Self {
            data: DataStatus::Loading(config.data.source.clone()),
            config,
            session: SessionController::new(GroupIndex::default()),
            word_count: 0,
            group_cursor: 0,
            word_list: false,
            word_cursor: 0,
            pending_load: None,
            editing: false,
            input_buffer: String::new(),
            message: None,
            show_help: false,
            card_area: None,
        })
    }

    /// Kick off the background load of the configured source. Must run
    /// inside a tokio runtime.
    pub fn start_load(&mut self) {
        if let Some(previous) = self.pending_load.take() {
            previous.cancel();
        }
        let source = self.config.data.source.clone();
        self.data = DataStatus::Loading(source.clone());
        self.pending_load = Some(loader::spawn_load(source, self.config.data.timeout()));
    }

    /// Apply a finished background load, if any.
    pub fn tick(&mut self) {
        let Some(handle) = self.pending_load.as_mut() else { return };
        match handle.poll() {
            LoadPoll::Pending => {}
            LoadPoll::Discarded => self.pending_load = None,
            LoadPoll::Ready(Ok(dataset)) => {
                self.pending_load = None;
                self.replace_dataset(dataset);
            }
            LoadPoll::Ready(Err(e)) => {
                self.pending_load = None;
                self.data = DataStatus::NoData(e.to_string());
                self.message = Some("No data loaded. Press 'o' to open a vocabulary file.".to_string());
            }
        }
    }

    /// Swap in a new dataset. Stale loads are cancelled and the session
    /// returns to the group list.
    pub fn replace_dataset(&mut self, dataset: Dataset) {
        if let Some(stale) = self.pending_load.take() {
            stale.cancel();
        }
        if dataset.is_empty() {
            warn!("dataset has no words");
        }
        let index = GroupIndex::build(&dataset);
        info!(words = dataset.len(), groups = index.group_ids().len(), "dataset replaced");
        self.word_count = dataset.len();
        self.session = SessionController::new(index);
        self.group_cursor = 0;
        self.word_list = false;
        self.word_cursor = 0;
        self.data = DataStatus::Ready;
    }

    pub fn view(&self) -> View {
        match self.session.state() {
            SessionState::NoGroupSelected => View::Groups,
            SessionState::GroupSelected(_) if self.word_list => View::WordList,
            SessionState::GroupSelected(_) => View::Study,
        }
    }

    pub fn group_ids(&self) -> &[GroupId] {
        self.session.index().group_ids()
    }

    pub fn can_quit(&self) -> bool {
        !self.editing && self.view() == View::Groups
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }
        self.message = None;

        if self.show_help {
            self.show_help = false;
            return;
        }

        if self.editing {
            self.handle_edit_key(key);
            return;
        }

        match self.view() {
            View::Groups => self.handle_groups_key(key),
            View::Study => self.handle_study_key(key),
            View::WordList => self.handle_word_list_key(key),
        }
    }

    pub fn handle_mouse(&mut self, mouse: MouseEvent) {
        if mouse.kind != MouseEventKind::Down(MouseButton::Left) || self.view() != View::Study {
            return;
        }
        let hit = self
            .card_area
            .is_some_and(|area| area.contains(Position::new(mouse.column, mouse.row)));
        if hit {
            self.session.toggle_reveal();
        }
    }

    fn handle_edit_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => {
                self.editing = false;
                self.input_buffer.clear();
            }
            KeyCode::Enter => self.finish_upload(),
            KeyCode::Backspace => { self.input_buffer.pop(); }
            KeyCode::Char(c) => self.input_buffer.push(c),
            _ => {}
        }
    }

    fn handle_groups_key(&mut self, key: KeyEvent) {
        let count = self.group_ids().len();
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => {
                if count > 0 {
                    self.group_cursor = (self.group_cursor + 1).min(count - 1);
                }
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.group_cursor = self.group_cursor.saturating_sub(1);
            }
            KeyCode::Enter if self.data == DataStatus::Ready => self.select_group_at(self.group_cursor),
            KeyCode::Char(c @ '1'..='9') if self.data == DataStatus::Ready => {
                let position = c as usize - '1' as usize;
                if position < count {
                    self.group_cursor = position;
                    self.select_group_at(position);
                }
            }
            KeyCode::Char('o') => self.begin_upload(),
            KeyCode::Char('r') => self.start_load(),
            KeyCode::Char('?') => self.show_help = true,
            _ => {}
        }
    }

    fn handle_study_key(&mut self, key: KeyEvent) {
        if let Some(result) = keys::handle_key(&mut self.session, &key) {
            if let Err(e) = result {
                self.message = Some(e.to_string());
            }
            return;
        }

        let len = self.session.state().active().map_or(0, |a| a.len());
        let result = match key.code {
            KeyCode::Char('s') => self.session.shuffle_current_group(),
            KeyCode::Home => self.session.jump_to(0),
            KeyCode::End => self.session.jump_to(len.saturating_sub(1)),
            KeyCode::Char('w') => {
                if len > 0 {
                    self.word_cursor = self.session.state().cursor();
                    self.word_list = true;
                }
                Ok(())
            }
            KeyCode::Char('o') => {
                self.begin_upload();
                Ok(())
            }
            KeyCode::Char('?') => {
                self.show_help = true;
                Ok(())
            }
            _ => Ok(()),
        };
        if let Err(e) = result {
            self.message = Some(e.to_string());
        }
    }

    fn handle_word_list_key(&mut self, key: KeyEvent) {
        let len = self.session.state().active().map_or(0, |a| a.len());
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => {
                if len > 0 {
                    self.word_cursor = (self.word_cursor + 1).min(len - 1);
                }
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.word_cursor = self.word_cursor.saturating_sub(1);
            }
            KeyCode::Enter => {
                if let Err(e) = self.session.jump_to(self.word_cursor) {
                    self.message = Some(e.to_string());
                }
                self.word_list = false;
            }
            KeyCode::Esc | KeyCode::Char('w') | KeyCode::Char('q') => self.word_list = false,
            _ => {}
        }
    }

    fn select_group_at(&mut self, position: usize) {
        let Some(&group) = self.group_ids().get(position) else { return };
        match self.session.select_group(Some(group)) {
            Ok(()) => self.word_list = false,
            Err(e) => self.message = Some(e.to_string()),
        }
    }

    fn begin_upload(&mut self) {
        self.editing = true;
        self.input_buffer.clear();
    }

    fn finish_upload(&mut self) {
        let path = PathBuf::from(self.input_buffer.trim());
        self.editing = false;
        self.input_buffer.clear();
        if path.as_os_str().is_empty() {
            return;
        }

        match loader::load_upload(&path) {
            Ok(dataset) => {
                let words = dataset.len();
                self.replace_dataset(dataset);
                self.message = Some(format!("Loaded {} words from {}", words, path.display()));
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "upload rejected");
                self.message = Some(e.to_string());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::VocabError;
    use crate::models::{Definition, VocabItem};
    use crossterm::event::KeyModifiers;
    use std::io::Write;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            app.handle_key(press(KeyCode::Char(c)));
        }
    }

    fn animals() -> Dataset {
        Dataset::new(vec![
            VocabItem::new(1, 1, "cat", Definition::new("noun", "a small feline")),
            VocabItem::new(2, 1, "dog", Definition::new("noun", "a loyal canine")),
            VocabItem::new(3, 2, "fox", Definition::new("noun", "a sly canid")),
        ])
        .unwrap()
    }

    fn ready_app() -> App {
        let mut app = App::new(Config::default()).unwrap();
        app.replace_dataset(animals());
        app
    }

    fn current_word(app: &App) -> Option<String> {
        app.session.current_item().map(|i| i.word.clone())
    }

    #[test]
    fn test_select_and_navigate() {
        let mut app = ready_app();
        assert_eq!(app.view(), View::Groups);
        app.handle_key(press(KeyCode::Enter));
        assert_eq!(app.view(), View::Study);
        app.handle_key(press(KeyCode::Right));
        app.handle_key(press(KeyCode::Right));
        assert_eq!(app.session.state().cursor(), 1);
        assert_eq!(current_word(&app).as_deref(), Some("dog"));
    }

    #[test]
    fn test_reveal_then_advance_hides() {
        let mut app = ready_app();
        app.handle_key(press(KeyCode::Char('1')));
        app.handle_key(press(KeyCode::Char(' ')));
        assert!(app.session.state().revealed());
        app.handle_key(press(KeyCode::Right));
        assert!(!app.session.state().revealed());
    }

    #[test]
    fn test_digit_selects_nth_group() {
        let mut app = ready_app();
        app.handle_key(press(KeyCode::Char('2')));
        assert_eq!(app.session.state().selected_group(), Some(2));
        assert_eq!(current_word(&app).as_deref(), Some("fox"));
        app.handle_key(press(KeyCode::Esc));
        app.handle_key(press(KeyCode::Char('9')));
        assert_eq!(app.view(), View::Groups);
    }

    #[test]
    fn test_escape_returns_to_groups() {
        let mut app = ready_app();
        app.handle_key(press(KeyCode::Enter));
        app.handle_key(press(KeyCode::Esc));
        assert_eq!(app.view(), View::Groups);
        assert!(app.can_quit());
    }

    #[test]
    fn test_word_list_jump() {
        let mut app = ready_app();
        app.handle_key(press(KeyCode::Enter));
        app.handle_key(press(KeyCode::Char(' ')));
        app.handle_key(press(KeyCode::Char('w')));
        assert_eq!(app.view(), View::WordList);
        app.handle_key(press(KeyCode::Down));
        app.handle_key(press(KeyCode::Enter));
        assert_eq!(app.view(), View::Study);
        assert_eq!(current_word(&app).as_deref(), Some("dog"));
        assert!(!app.session.state().revealed());
    }

    #[test]
    fn test_home_end() {
        let mut app = ready_app();
        app.handle_key(press(KeyCode::Enter));
        app.handle_key(press(KeyCode::End));
        assert_eq!(app.session.state().cursor(), 1);
        app.handle_key(press(KeyCode::Home));
        assert_eq!(app.session.state().cursor(), 0);
    }

    #[test]
    fn test_shuffle_keeps_group() {
        let mut app = ready_app();
        app.handle_key(press(KeyCode::Enter));
        app.handle_key(press(KeyCode::Char('s')));
        let active = app.session.state().active().unwrap();
        assert!(active.is_shuffled());
        assert_eq!(active.group(), 1);
        assert_eq!(active.len(), 2);
    }

    #[test]
    fn test_invalid_upload_leaves_session() {
        let mut app = ready_app();
        app.handle_key(press(KeyCode::Enter));
        app.handle_key(press(KeyCode::Right));
        let before = app.session.state().clone();

        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(br#""not an array""#).unwrap();

        app.handle_key(press(KeyCode::Char('o')));
        assert!(app.editing);
        type_text(&mut app, &file.path().to_string_lossy());
        app.handle_key(press(KeyCode::Enter));

        assert!(!app.editing);
        assert_eq!(app.session.state(), &before);
        let expected = VocabError::InvalidUploadFormat("expected a JSON array of vocabulary items".to_string());
        assert_eq!(app.message.as_deref(), Some(expected.to_string().as_str()));
    }

    #[test]
    fn test_valid_upload_resets_session() {
        let mut app = ready_app();
        app.handle_key(press(KeyCode::Enter));

        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(
            br#"[{"key": 7, "group": 3, "word": "owl", "definitions": [{"part_of_speech": "noun", "definition": "a night bird"}]}]"#,
        )
        .unwrap();

        app.handle_key(press(KeyCode::Char('o')));
        type_text(&mut app, &file.path().to_string_lossy());
        app.handle_key(press(KeyCode::Enter));

        assert_eq!(app.view(), View::Groups);
        assert_eq!(app.group_ids(), &[3]);
        assert_eq!(app.word_count, 1);
        assert_eq!(app.data, DataStatus::Ready);
    }

    #[test]
    fn test_selection_waits_for_ready_data() {
        let mut app = ready_app();
        app.data = DataStatus::Loading("vocab-data.json".to_string());
        app.handle_key(press(KeyCode::Enter));
        app.handle_key(press(KeyCode::Char('1')));
        assert_eq!(app.view(), View::Groups);

        app.data = DataStatus::NoData("load failed".to_string());
        app.handle_key(press(KeyCode::Char('2')));
        assert_eq!(app.view(), View::Groups);
        assert_eq!(app.session.state().selected_group(), None);
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let mut config = Config::default();
        config.data.timeout_secs = 0;
        assert!(App::new(config).is_err());

        let mut config = Config::default();
        config.data.source = String::new();
        assert!(App::new(config).is_err());
    }

    #[test]
    fn test_help_swallows_next_key() {
        let mut app = ready_app();
        app.handle_key(press(KeyCode::Char('?')));
        assert!(app.show_help);
        app.handle_key(press(KeyCode::Enter));
        assert!(!app.show_help);
        assert_eq!(app.view(), View::Groups);
    }

    #[test]
    fn test_click_on_card_toggles_reveal() {
        let mut app = ready_app();
        app.handle_key(press(KeyCode::Enter));
        app.card_area = Some(Rect::new(0, 0, 20, 10));
        let click = |column, row| MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column,
            row,
            modifiers: KeyModifiers::NONE,
        };
        app.handle_mouse(click(5, 5));
        assert!(app.session.state().revealed());
        app.handle_mouse(click(50, 50));
        assert!(app.session.state().revealed());
    }

    #[tokio::test]
    async fn test_replacing_dataset_cancels_pending_load() {
        let mut app = App::new(Config::default()).unwrap();
        app.config.data.source = "/definitely/not/here.json".to_string();
        app.start_load();
        app.replace_dataset(animals());
        assert!(app.pending_load.is_none());

        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        app.tick();
        assert_eq!(app.data, DataStatus::Ready);
        assert_eq!(app.group_ids(), &[1, 2]);
    }

    #[tokio::test]
    async fn test_failed_startup_load_enters_no_data() {
        let mut app = App::new(Config::default()).unwrap();
        app.config.data.source = "/definitely/not/here.json".to_string();
        app.start_load();
        for _ in 0..200 {
            app.tick();
            if app.pending_load.is_none() {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
        assert!(matches!(app.data, DataStatus::NoData(_)));
        assert!(app.message.is_some());
        assert_eq!(app.view(), View::Groups);
    }
}
