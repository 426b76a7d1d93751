use super::events::{key_to_action, Action, AppEvent, EventHandler};
use super::TerminalManager;
use crate::audio::{AudioTransport, MusicScanner, PlaybackSession, PlaybackState, PlaylistStore, Progress};
use crate::config::Config;
use crate::error::PlayerError;
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Clear, Gauge, List, ListItem, ListState, Paragraph, Sparkline},
    Frame,
};
use std::cell::Cell;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

const STATUS_TIMEOUT: Duration = Duration::from_secs(3);

/// Which prompt, if any, is reading keys
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Filter,
    Search,
    GoTo,
    LoadDirectory,
    AddSongs,
    SavePlaylist,
    ChoosePlaylist,
}

impl InputMode {
    fn prompt(&self) -> &'static str {
        match self {
            InputMode::Normal | InputMode::ChoosePlaylist => "",
            InputMode::Filter => "Filter",
            InputMode::Search => "Search",
            InputMode::GoTo => "Go to position",
            InputMode::LoadDirectory => "Load directory",
            InputMode::AddSongs => "Add file or directory",
            InputMode::SavePlaylist => "Save playlist as",
        }
    }
}

pub struct App<T: AudioTransport> {
    config: Config,
    session: PlaybackSession<T>,
    scanner: MusicScanner,
    store: PlaylistStore,

    // Fed by the tracklist's position callback
    position: Rc<Cell<(usize, usize)>>,
    list_state: ListState,
    mode: InputMode,
    input: String,
    playlist_choices: Vec<PathBuf>,
    choice_state: ListState,
    progress: Option<Progress>,
    status: Option<(String, Instant)>,
    should_quit: bool,
}

impl<T: AudioTransport> App<T> {
    pub fn new(config: Config, mut session: PlaybackSession<T>, scanner: MusicScanner, store: PlaylistStore) -> Self {
        let position = Rc::new(Cell::new(session.tracklist().position()));
        let sink = Rc::clone(&position);
        session
            .tracklist_mut()
            .set_on_position_changed(Box::new(move |index, total| sink.set((index, total))));

        Self {
            config,
            session,
            scanner,
            store,
            position,
            list_state: ListState::default(),
            mode: InputMode::Normal,
            input: String::new(),
            playlist_choices: Vec::new(),
            choice_state: ListState::default(),
            progress: None,
            status: None,
            should_quit: false,
        }
    }

    pub fn session(&self) -> &PlaybackSession<T> {
        &self.session
    }

    pub fn mode(&self) -> InputMode {
        self.mode
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_ref().map(|(message, _)| message.as_str())
    }

    pub async fn run(&mut self, terminal: &mut TerminalManager, events: &mut EventHandler) -> Result<()> {
        while !self.should_quit {
            terminal.draw(|f| self.render(f))?;

            match events.next().await {
                Some(AppEvent::Key(key)) => self.handle_key(key),
                Some(AppEvent::Tick) => self.on_tick(),
                Some(AppEvent::Resize) => {}
                None => break,
            }
        }

        self.session.stop();
        info!("Player closed");
        Ok(())
    }

    pub fn on_tick(&mut self) {
        match self.session.tick() {
            Some(progress) => self.progress = Some(progress),
            // a paused track keeps its name and position on screen
            None if self.session.state() == PlaybackState::Paused => {}
            None => self.progress = None,
        }
    }

    fn notify(&mut self, message: impl Into<String>) {
        self.status = Some((message.into(), Instant::now()));
    }

    fn report(&mut self, what: &str, err: PlayerError) {
        warn!("{} failed: {}", what, err);
        if err.is_user_visible() {
            self.notify(format!("{what} failed: {err}"));
        }
    }

    fn persist_config(&mut self) {
        if let Err(e) = self.config.save() {
            warn!("Could not save config: {:#}", e);
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        match self.mode {
            InputMode::Normal => {
                if let Some(action) = key_to_action(key) {
                    self.handle_action(action);
                }
            }
            InputMode::ChoosePlaylist => self.handle_choice_key(key),
            mode => self.handle_prompt_key(mode, key),
        }
    }

    fn open_prompt(&mut self, mode: InputMode) {
        self.mode = mode;
        self.input.clear();
    }

    fn handle_prompt_key(&mut self, mode: InputMode, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => {
                if mode == InputMode::Filter {
                    self.session.tracklist_mut().filter("");
                }
                self.mode = InputMode::Normal;
            }
            KeyCode::Enter => {
                self.mode = InputMode::Normal;
                let text = std::mem::take(&mut self.input);
                self.submit(mode, text.trim());
            }
            KeyCode::Backspace => {
                self.input.pop();
                if mode == InputMode::Filter {
                    let pattern = self.input.clone();
                    self.session.tracklist_mut().filter(&pattern);
                }
            }
            KeyCode::Char(c) if !c.is_control() => {
                self.input.push(c);
                if mode == InputMode::Filter {
                    let pattern = self.input.clone();
                    self.session.tracklist_mut().filter(&pattern);
                }
            }
            _ => {}
        }
    }

    fn handle_choice_key(&mut self, key: KeyEvent) {
        let last = self.playlist_choices.len().saturating_sub(1);
        let selected = self.choice_state.selected().unwrap_or(0);
        match key.code {
            KeyCode::Esc => self.mode = InputMode::Normal,
            KeyCode::Up => self.choice_state.select(Some(selected.saturating_sub(1))),
            KeyCode::Down => self.choice_state.select(Some((selected + 1).min(last))),
            KeyCode::Enter => {
                self.mode = InputMode::Normal;
                if let Some(path) = self.playlist_choices.get(selected).cloned() {
                    self.open_playlist(&path);
                }
            }
            _ => {}
        }
    }

    fn submit(&mut self, mode: InputMode, text: &str) {
        match mode {
            InputMode::Search => self.session.tracklist_mut().search(text),
            InputMode::GoTo => {
                if let Err(e) = self.session.tracklist_mut().go_to_input(text) {
                    self.report("Go to", e);
                }
            }
            InputMode::LoadDirectory => match self.session.load_directory(&self.scanner, Path::new(text)) {
                Ok(count) => self.notify(format!("Loaded {count} tracks")),
                Err(e) => self.report("Loading directory", e),
            },
            InputMode::AddSongs => match self.session.add_songs(&self.scanner, Path::new(text)) {
                Ok(count) => self.notify(format!("Added {count} tracks")),
                Err(e) => self.report("Adding songs", e),
            },
            InputMode::SavePlaylist => match self.session.save_playlist(&self.store, text) {
                Ok(path) => {
                    self.notify(format!("Saved playlist {text}"));
                    self.config.playlist.selected = Some(path);
                    self.persist_config();
                }
                Err(e) => self.report("Saving playlist", e),
            },
            InputMode::Filter | InputMode::Normal | InputMode::ChoosePlaylist => {}
        }
    }

    fn open_playlist(&mut self, path: &Path) {
        let result = self.store.open(path).and_then(|playlist| self.session.load_playlist(playlist));
        match result {
            Ok(()) => {
                let name = path.file_stem().map(|s| s.to_string_lossy().into_owned()).unwrap_or_default();
                self.notify(format!("Loaded playlist {name}"));
                self.config.playlist.selected = Some(path.to_path_buf());
                self.persist_config();
            }
            Err(e) => self.report("Loading playlist", e),
        }
    }

    /// Startup load: an explicit directory wins over the last selected playlist.
    /// Failures end up in the status line and the player starts with what it has.
    pub fn restore_library(&mut self, directory: Option<&Path>) {
        if let Some(directory) = directory {
            if let Err(e) = self.session.load_directory(&self.scanner, directory) {
                self.report("Loading directory", e);
            }
            return;
        }

        let Some(selected) = self.config.playlist.selected.clone() else {
            debug!("Nothing to restore, starting empty");
            return;
        };
        let result = self.store.open(&selected).and_then(|playlist| self.session.load_playlist(playlist));
        if let Err(e) = result {
            self.report("Restoring playlist", e);
        }
    }

    pub fn handle_action(&mut self, action: Action) {
        match action {
            Action::Quit => self.should_quit = true,

            Action::TogglePlayPause => self.session.toggle_play_pause(),
            Action::NextSong => self.session.next_song(),
            Action::PreviousSong => self.session.previous_song(),
            Action::SeekForward => self.session.seek_forward(),
            Action::SeekBackward => self.session.seek_backward(),
            Action::Restart => self.session.reset(),
            Action::VolumeUp => self.session.increase_volume(),
            Action::VolumeDown => self.session.decrease_volume(),
            Action::ToggleMute => self.session.toggle_mute(),

            Action::CursorUp => {
                self.session.tracklist_mut().move_cursor(-1);
            }
            Action::CursorDown => {
                self.session.tracklist_mut().move_cursor(1);
            }
            Action::Select => self.session.select_cursor(),

            Action::Filter => {
                self.open_prompt(InputMode::Filter);
                if let Some(pattern) = self.session.tracklist().filter_pattern() {
                    self.input = pattern.to_string();
                }
            }
            Action::Search => self.open_prompt(InputMode::Search),
            Action::GoTo => self.open_prompt(InputMode::GoTo),
            Action::LoadDirectory => self.open_prompt(InputMode::LoadDirectory),
            Action::AddSongs => self.open_prompt(InputMode::AddSongs),
            Action::SavePlaylist => self.open_prompt(InputMode::SavePlaylist),
            Action::LoadPlaylist => match self.store.list() {
                Ok(choices) if choices.is_empty() => self.notify("No saved playlists"),
                Ok(choices) => {
                    self.playlist_choices = choices;
                    self.choice_state.select(Some(0));
                    self.mode = InputMode::ChoosePlaylist;
                }
                Err(e) => self.report("Listing playlists", e),
            },

            Action::CycleOrder => {
                let order = self.session.tracklist().order().next();
                self.session.change_order(order);
                self.config.playlist.order = order;
                self.persist_config();
                self.notify(format!("Order: {}", order.label()));
            }
            Action::MoveSongUp | Action::MoveSongDown => {
                if let Some(cursor) = self.session.tracklist().cursor() {
                    let step = if action == Action::MoveSongUp { -1 } else { 1 };
                    self.session.tracklist_mut().swap(cursor as isize + step);
                }
            }
            Action::DeleteSong => {
                if let Some(removed) = self.session.tracklist_mut().delete_current() {
                    self.notify(format!("Removed {}", removed.name()));
                }
            }
        }
    }

    fn render(&mut self, f: &mut Frame) {
        let mut constraints = vec![Constraint::Min(3), Constraint::Length(3)];
        if self.config.appearance.spectrum {
            constraints.push(Constraint::Length(6));
        }
        if self.config.appearance.footer {
            constraints.push(Constraint::Length(1));
        }

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints(constraints)
            .split(f.area());

        self.render_tracklist(f, chunks[0]);
        self.render_progress(f, chunks[1]);
        let mut next = 2;
        if self.config.appearance.spectrum {
            self.render_spectrum(f, chunks[next]);
            next += 1;
        }
        if self.config.appearance.footer {
            self.render_footer(f, chunks[next]);
        }

        match self.mode {
            InputMode::Normal => {}
            InputMode::ChoosePlaylist => self.render_playlist_choices(f),
            mode => self.render_prompt(f, mode),
        }
    }

    fn render_tracklist(&mut self, f: &mut Frame, area: Rect) {
        let tracklist = self.session.tracklist();
        let current = tracklist.current_path();

        let items: Vec<ListItem> = tracklist
            .items()
            .iter()
            .map(|track| {
                let is_current = current == Some(track.path());
                let prefix = if is_current { "♪ " } else { "  " };
                let style = if is_current {
                    Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
                } else {
                    Style::default()
                };
                ListItem::new(format!("{}{}", prefix, track.name())).style(style)
            })
            .collect();

        let (index, total) = self.position.get();
        let mut title = format!(" Tracks {index}/{total} [{}] ", tracklist.order().label());
        if let Some(pattern) = tracklist.filter_pattern() {
            title.push_str(&format!("filter: {pattern} "));
        }
        if let Some(playlist) = self.session.playlist() {
            title.push_str(&format!("playlist: {} ", playlist.name));
        }

        let list = List::new(items)
            .block(Block::default().borders(Borders::ALL).title(title))
            .highlight_style(Style::default().bg(Color::DarkGray))
            .highlight_symbol("► ");

        self.list_state.select(tracklist.cursor());
        f.render_stateful_widget(list, area, &mut self.list_state);
    }

    fn render_progress(&self, f: &mut Frame, area: Rect) {
        let state = match self.session.state() {
            PlaybackState::Playing => "▶",
            PlaybackState::Paused => "⏸",
            PlaybackState::Stopped => "⏹",
        };

        let (title, label, ratio) = match &self.progress {
            Some(progress) => (format!(" {state} {} ", progress.name), progress.label(), progress.ratio()),
            None => (format!(" {state} "), "--:--/--:--".to_string(), 0.0),
        };

        let gauge = Gauge::default()
            .block(Block::default().borders(Borders::ALL).title(title))
            .gauge_style(Style::default().fg(Color::Cyan))
            .label(label)
            .ratio(ratio);
        f.render_widget(gauge, area);
    }

    fn render_spectrum(&self, f: &mut Frame, area: Rect) {
        let width = area.width.saturating_sub(2) as usize;
        let data: Vec<u64> = self
            .progress
            .as_ref()
            .and_then(|progress| {
                let track = self.session.tracklist().current_track()?;
                track.sample_window(progress.position_seconds, width)
            })
            .map(|window| window.iter().map(|s| (s.abs() * 100.0) as u64).collect())
            .unwrap_or_default();

        let sparkline = Sparkline::default()
            .block(Block::default().borders(Borders::ALL))
            .style(Style::default().fg(Color::Green))
            .max(100)
            .data(&data);
        f.render_widget(sparkline, area);
    }

    fn render_footer(&mut self, f: &mut Frame, area: Rect) {
        if self
            .status
            .as_ref()
            .map_or(false, |(_, shown)| shown.elapsed() >= STATUS_TIMEOUT)
        {
            self.status = None;
        }

        let volume = if self.session.is_muted() {
            "muted".to_string()
        } else {
            format!("vol {:.0}%", self.session.volume() * 100.0)
        };
        let text = match &self.status {
            Some((message, _)) => format!(" {message} | {volume}"),
            None => format!(" space play/pause  n/p next/prev  f filter  s search  S save  l load  q quit | {volume}"),
        };

        f.render_widget(Paragraph::new(text).style(Style::default().fg(Color::Green)), area);
    }

    fn render_prompt(&self, f: &mut Frame, mode: InputMode) {
        let area = f.area();
        let popup = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(area.height.saturating_sub(4)),
                Constraint::Length(3),
                Constraint::Length(1),
            ])
            .split(area)[1];

        let input = Paragraph::new(format!("{}: {}", mode.prompt(), self.input))
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(" Enter to confirm, Esc to cancel ")
                    .border_style(Style::default().fg(Color::Green)),
            )
            .style(Style::default().fg(Color::White).bg(Color::Black));

        f.render_widget(Clear, popup);
        f.render_widget(input, popup);
    }

    fn render_playlist_choices(&mut self, f: &mut Frame) {
        let popup = centered_rect(50, 50, f.area());
        let items: Vec<ListItem> = self
            .playlist_choices
            .iter()
            .map(|p| ListItem::new(p.file_stem().map(|s| s.to_string_lossy().into_owned()).unwrap_or_default()))
            .collect();

        let list = List::new(items)
            .block(Block::default().borders(Borders::ALL).title(" Load playlist "))
            .highlight_style(Style::default().bg(Color::DarkGray))
            .highlight_symbol("► ");

        f.render_widget(Clear, popup);
        f.render_stateful_widget(list, popup, &mut self.choice_state);
    }
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}
