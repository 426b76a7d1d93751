use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, error};

const INPUT_POLL: Duration = Duration::from_millis(50);

#[derive(Debug, Clone)]
pub enum AppEvent {
    Key(KeyEvent),
    Tick,
    Resize,
}

/// What a key press asks the player to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Quit,

    // Playback
    TogglePlayPause,
    NextSong,
    PreviousSong,
    SeekForward,
    SeekBackward,
    Restart,
    VolumeUp,
    VolumeDown,
    ToggleMute,

    // Cursor
    CursorUp,
    CursorDown,
    Select,

    // Prompts
    Filter,
    Search,
    GoTo,
    LoadDirectory,
    AddSongs,
    SavePlaylist,
    LoadPlaylist,

    // Editing
    CycleOrder,
    MoveSongUp,
    MoveSongDown,
    DeleteSong,
}

pub fn key_to_action(key: KeyEvent) -> Option<Action> {
    match (key.code, key.modifiers) {
        (KeyCode::Char('q'), _) | (KeyCode::Char('c'), KeyModifiers::CONTROL) => Some(Action::Quit),

        (KeyCode::Up, KeyModifiers::CONTROL) => Some(Action::MoveSongUp),
        (KeyCode::Down, KeyModifiers::CONTROL) => Some(Action::MoveSongDown),
        (KeyCode::Up, _) => Some(Action::CursorUp),
        (KeyCode::Down, _) => Some(Action::CursorDown),
        (KeyCode::Enter, _) => Some(Action::Select),
        (KeyCode::Delete, _) => Some(Action::DeleteSong),

        (KeyCode::Char(' '), _) => Some(Action::TogglePlayPause),
        (KeyCode::Char('n'), _) => Some(Action::NextSong),
        (KeyCode::Char('p'), _) => Some(Action::PreviousSong),
        (KeyCode::Right, _) => Some(Action::SeekForward),
        (KeyCode::Left, _) => Some(Action::SeekBackward),
        (KeyCode::Char('r'), _) => Some(Action::Restart),
        (KeyCode::Char('+'), _) | (KeyCode::Char('='), _) => Some(Action::VolumeUp),
        (KeyCode::Char('-'), _) => Some(Action::VolumeDown),
        (KeyCode::Char('m'), _) => Some(Action::ToggleMute),

        (KeyCode::Char('f'), _) => Some(Action::Filter),
        (KeyCode::Char('s'), _) => Some(Action::Search),
        (KeyCode::Char('g'), _) => Some(Action::GoTo),
        (KeyCode::Char('d'), _) => Some(Action::LoadDirectory),
        (KeyCode::Char('A'), _) => Some(Action::AddSongs),
        (KeyCode::Char('S'), _) => Some(Action::SavePlaylist),
        (KeyCode::Char('l'), _) => Some(Action::LoadPlaylist),
        (KeyCode::Char('o'), _) => Some(Action::CycleOrder),

        _ => None,
    }
}

/// Merges terminal input and the playback tick into one stream
pub struct EventHandler {
    receiver: mpsc::UnboundedReceiver<AppEvent>,
}

impl EventHandler {
    /// Spawns the input reader and the ticker; both stop once the handler is dropped
    pub fn new(tick_interval: Duration) -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();

        let input_sender = sender.clone();
        tokio::task::spawn_blocking(move || {
            while !input_sender.is_closed() {
                match event::poll(INPUT_POLL) {
                    Ok(false) => continue,
                    Ok(true) => {}
                    Err(e) => {
                        error!("Terminal input failed: {}", e);
                        break;
                    }
                }
                let forwarded = match event::read() {
                    Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => AppEvent::Key(key),
                    Ok(Event::Resize(_, _)) => AppEvent::Resize,
                    Ok(_) => continue,
                    Err(e) => {
                        error!("Terminal input failed: {}", e);
                        break;
                    }
                };
                if input_sender.send(forwarded).is_err() {
                    break;
                }
            }
            debug!("Input reader stopped");
        });

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(tick_interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;
                if sender.send(AppEvent::Tick).is_err() {
                    break;
                }
            }
        });

        Self { receiver }
    }

    pub async fn next(&mut self) -> Option<AppEvent> {
        self.receiver.recv().await
    }
}
