use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::time::{Duration, Instant};

use crossterm::event::{self, Event as CtEvent, KeyEvent, KeyEventKind};

/// One game clock tick per second
pub const TICK_INTERVAL: Duration = Duration::from_secs(1);

/// Unified event type consumed by the app runner
#[derive(Clone, Debug)]
pub enum GameEvent {
    Key(KeyEvent),
    Resize,
    Tick,
}

/// Source of terminal events (keyboard, resize, etc.)
pub trait EventSource: Send + 'static {
    /// Block for up to `timeout` waiting for an event.
    fn recv_timeout(&self, timeout: Duration) -> Result<GameEvent, RecvTimeoutError>;
}

/// Production event source using crossterm
pub struct CrosstermEventSource {
    rx: Receiver<GameEvent>,
}

impl CrosstermEventSource {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();

        std::thread::spawn(move || loop {
            let evt = match event::read() {
                // ignore key releases on platforms that report them
                Ok(CtEvent::Key(key)) if key.kind != KeyEventKind::Release => {
                    Some(GameEvent::Key(key))
                }
                Ok(CtEvent::Resize(_, _)) => Some(GameEvent::Resize),
                Ok(_) => None,
                Err(_) => break,
            };

            if let Some(evt) = evt {
                if tx.send(evt).is_err() {
                    break;
                }
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
    fn recv_timeout(&self, timeout: Duration) -> Result<GameEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Configurable ticker interface
pub trait Ticker: Send + Sync + 'static {
    fn interval(&self) -> Duration;
}

/// Fixed interval ticker
#[derive(Clone, Copy, Debug)]
pub struct FixedTicker {
    interval: Duration,
}

impl FixedTicker {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }
}

impl Default for FixedTicker {
    fn default() -> Self {
        Self::new(TICK_INTERVAL)
    }
}

impl Ticker for FixedTicker {
    fn interval(&self) -> Duration {
        self.interval
    }
}

/// Test event source for unit tests
pub struct TestEventSource {
    rx: Receiver<GameEvent>,
}

impl TestEventSource {
    pub fn new(rx: Receiver<GameEvent>) -> Self {
        Self { rx }
    }
}

impl EventSource for TestEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<GameEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Merges input events and clock ticks into one ordered stream, so the game
/// only ever handles one of them at a time.
///
/// Ticks are scheduled against a deadline rather than emitted on receive
/// timeouts, so a steady stream of key presses cannot stall the clock.
pub struct Runner<E: EventSource, T: Ticker> {
    event_source: E,
    ticker: T,
    next_tick: Instant,
}

impl<E: EventSource, T: Ticker> Runner<E, T> {
    pub fn new(event_source: E, ticker: T) -> Self {
        let next_tick = Instant::now() + ticker.interval();
        Self {
            event_source,
            ticker,
            next_tick,
        }
    }

    /// Restart the tick schedule, e.g. when a new game begins
    pub fn reset_clock(&mut self) {
        self.next_tick = Instant::now() + self.ticker.interval();
    }

    /// Blocks until the next event or the next tick deadline, whichever is first
    pub fn step(&mut self) -> GameEvent {
        let now = Instant::now();
        if now >= self.next_tick {
            return self.emit_tick();
        }

        let wait = self.next_tick - now;
        match self.event_source.recv_timeout(wait) {
            Ok(ev) => ev,
            Err(RecvTimeoutError::Timeout) => self.emit_tick(),
            Err(RecvTimeoutError::Disconnected) => {
                std::thread::sleep(wait);
                self.emit_tick()
            }
        }
    }

    fn emit_tick(&mut self) -> GameEvent {
        self.next_tick += self.ticker.interval();
        GameEvent::Tick
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyModifiers};
    use std::sync::mpsc;

    fn key(c: char) -> GameEvent {
        GameEvent::Key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE))
    }

    #[test]
    fn step_returns_tick_on_timeout() {
        let (_tx, rx) = mpsc::channel();
        let es = TestEventSource::new(rx);
        let ticker = FixedTicker::new(Duration::from_millis(1));
        let mut runner = Runner::new(es, ticker);

        // With no events available, step should yield Tick
        let ev = runner.step();
        match ev {
            GameEvent::Tick => {}
            _ => panic!("expected Tick on timeout"),
        }
    }

    #[test]
    fn step_passes_through_events() {
        let (tx, rx) = mpsc::channel();
        tx.send(GameEvent::Resize).unwrap();
        let es = TestEventSource::new(rx);
        let ticker = FixedTicker::new(Duration::from_secs(10));
        let mut runner = Runner::new(es, ticker);

        match runner.step() {
            GameEvent::Resize => {}
            _ => panic!("expected Resize event"),
        }
    }

    #[test]
    fn queued_keys_do_not_delay_due_tick() {
        let (tx, rx) = mpsc::channel();
        for c in "12345".chars() {
            tx.send(key(c)).unwrap();
        }
        let es = TestEventSource::new(rx);
        let ticker = FixedTicker::new(Duration::from_millis(1));
        let mut runner = Runner::new(es, ticker);

        std::thread::sleep(Duration::from_millis(5));

        // the deadline has passed, so the tick comes before the queued keys
        assert!(matches!(runner.step(), GameEvent::Tick));

        let mut keys = 0;
        for _ in 0..1000u32 {
            if let GameEvent::Key(_) = runner.step() {
                keys += 1;
                if keys == 5 {
                    break;
                }
            }
        }
        assert_eq!(keys, 5);
    }

    #[test]
    fn disconnected_source_still_ticks() {
        let (tx, rx) = mpsc::channel::<GameEvent>();
        drop(tx);
        let es = TestEventSource::new(rx);
        let mut runner = Runner::new(es, FixedTicker::new(Duration::from_millis(1)));

        assert!(matches!(runner.step(), GameEvent::Tick));
        assert!(matches!(runner.step(), GameEvent::Tick));
    }

    #[test]
    fn default_ticker_is_one_second() {
        assert_eq!(FixedTicker::default().interval(), Duration::from_secs(1));
    }
}
