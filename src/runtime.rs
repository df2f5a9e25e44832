use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::time::Duration;

use crossterm::event::{self, Event as CtEvent, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

/// Everything the event loop reacts to
#[derive(Clone, Debug)]
pub enum KstatsEvent {
    Key(KeyEvent),
    Resize,
    /// The refresh interval passed without input
    Tick,
}

/// What a key event means for the session
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    Type(char),
    Quit,
}

impl Action {
    /// Map a key event to an action; key releases and unbound keys give `None`
    pub fn from_key(key: &KeyEvent) -> Option<Self> {
        if key.kind == KeyEventKind::Release {
            return None;
        }
        match key.code {
            KeyCode::Esc => Some(Action::Quit),
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                Some(Action::Quit)
            }
            KeyCode::Char(_) if key.modifiers.contains(KeyModifiers::CONTROL) => None,
            KeyCode::Char(c) => Some(Action::Type(c)),
            _ => None,
        }
    }
}

/// Source of terminal events
pub trait EventSource: Send + 'static {
    /// Block for up to `timeout` waiting for an event
    fn recv_timeout(&self, timeout: Duration) -> Result<KstatsEvent, RecvTimeoutError>;
}

/// Reads crossterm events on a background thread and hands them over a
/// channel, so the event loop stays the only place touching the session.
pub struct CrosstermEventSource {
    rx: Receiver<KstatsEvent>,
}

impl CrosstermEventSource {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();

        std::thread::spawn(move || loop {
            let ev = match event::read() {
                Ok(CtEvent::Key(key)) => KstatsEvent::Key(key),
                Ok(CtEvent::Resize(_, _)) => KstatsEvent::Resize,
                Ok(_) => continue,
                Err(e) => {
                    tracing::warn!(error = %e, "terminal event reader stopped");
                    break;
                }
            };
            if tx.send(ev).is_err() {
                break;
            }
        });

        Self { rx }
    }
}

impl Default for CrosstermEventSource {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSource for CrosstermEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<KstatsEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Channel-fed source for tests and headless drivers
pub struct ChannelEventSource {
    rx: Receiver<KstatsEvent>,
}

impl ChannelEventSource {
    pub fn new(rx: Receiver<KstatsEvent>) -> Self {
        Self { rx }
    }
}

impl EventSource for ChannelEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<KstatsEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

pub trait Ticker: Send + Sync + 'static {
    fn interval(&self) -> Duration;
}

#[derive(Clone, Copy, Debug)]
pub struct FixedTicker {
    interval: Duration,
}

impl FixedTicker {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }
}

impl Ticker for FixedTicker {
    fn interval(&self) -> Duration {
        self.interval
    }
}

/// Single-threaded event loop driver: input and report refreshes arrive one
/// at a time through [`Runner::step`].
pub struct Runner<E: EventSource, T: Ticker> {
    event_source: E,
    ticker: T,
}

impl<E: EventSource, T: Ticker> Runner<E, T> {
    pub fn new(event_source: E, ticker: T) -> Self {
        Self {
            event_source,
            ticker,
        }
    }

    /// Waits up to one tick interval; yields `Tick` on timeout or once the
    /// source has hung up.
    pub fn step(&self) -> KstatsEvent {
        match self.event_source.recv_timeout(self.ticker.interval()) {
            Ok(ev) => ev,
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => {
                KstatsEvent::Tick
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn key(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    #[test]
    fn step_returns_tick_on_timeout() {
        let (_tx, rx) = mpsc::channel();
        let runner = Runner::new(
            ChannelEventSource::new(rx),
            FixedTicker::new(Duration::from_millis(1)),
        );
        assert_matches!(runner.step(), KstatsEvent::Tick);
    }

    #[test]
    fn step_returns_tick_when_disconnected() {
        let (tx, rx) = mpsc::channel::<KstatsEvent>();
        drop(tx);
        let runner = Runner::new(
            ChannelEventSource::new(rx),
            FixedTicker::new(Duration::from_millis(1)),
        );
        assert_matches!(runner.step(), KstatsEvent::Tick);
    }

    #[test]
    fn step_passes_through_events() {
        let (tx, rx) = mpsc::channel();
        tx.send(KstatsEvent::Resize).unwrap();
        let runner = Runner::new(
            ChannelEventSource::new(rx),
            FixedTicker::new(Duration::from_millis(10)),
        );
        assert_matches!(runner.step(), KstatsEvent::Resize);
    }

    #[test]
    fn characters_become_typing() {
        let ev = key(KeyCode::Char('a'), KeyModifiers::NONE);
        assert_eq!(Action::from_key(&ev), Some(Action::Type('a')));

        let ev = key(KeyCode::Char('A'), KeyModifiers::SHIFT);
        assert_eq!(Action::from_key(&ev), Some(Action::Type('A')));

        let ev = key(KeyCode::Char(' '), KeyModifiers::NONE);
        assert_eq!(Action::from_key(&ev), Some(Action::Type(' ')));
    }

    #[test]
    fn escape_and_ctrl_c_quit() {
        assert_eq!(
            Action::from_key(&key(KeyCode::Esc, KeyModifiers::NONE)),
            Some(Action::Quit)
        );
        assert_eq!(
            Action::from_key(&key(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Some(Action::Quit)
        );
    }

    #[test]
    fn other_keys_are_unbound() {
        assert_eq!(
            Action::from_key(&key(KeyCode::Backspace, KeyModifiers::NONE)),
            None
        );
        assert_eq!(
            Action::from_key(&key(KeyCode::Char('w'), KeyModifiers::CONTROL)),
            None
        );

        let mut release = key(KeyCode::Char('a'), KeyModifiers::NONE);
        release.kind = KeyEventKind::Release;
        assert_eq!(Action::from_key(&release), None);
    }
}
