//! The event dispatch and concurrency core: a single background
//! producer feeding a merged channel that the single-threaded main loop
//! drains. One receiver preserves arrival order across terminal events,
//! scheduled callbacks, interrupt tokens and redraw ticks.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, SyncSender};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use anyhow::Result;
use crossterm::event::Event as TermEvent;

use crate::app::App;

/// How long the poller's blocking wait is before it re-checks the stop
/// flag; bounds shutdown latency well below the shutdown timeout.
pub const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Bounded wait for the producer to finish at quit. Must stay within
/// one to five seconds to keep exit snappy but not lossy.
pub const POLLER_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(2);

/// A closure executed by the main loop on behalf of another thread.
pub type AppCallback = Box<dyn FnOnce(&mut App) + Send>;

pub enum Event {
  /// Raw terminal input from the poller.
  Term(TermEvent),
  /// A synchronous callback; `done` releases the scheduling thread.
  Callback { f: AppCallback, done: SyncSender<()> },
  /// One token of the two-token interrupt handshake.
  Interrupt,
  /// Periodic redraw request while a difference search runs.
  Tick,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownOutcome {
  /// Producer confirmed exit within the timeout.
  Clean,
  /// Producer did not confirm in time; exit proceeds anyway.
  TimedOut,
  /// A previous call already ran the protocol.
  AlreadyDown,
}

/// Lifecycle handle for the background producer: stop flag, completion
/// channel and a mutex-guarded once-flag so shutdown is idempotent
/// under both repeated and concurrent calls.
pub struct Poller {
  stop: Arc<AtomicBool>,
  done: Mutex<Receiver<()>>,
  closed: Mutex<bool>,
  timeout: Duration,
}

impl Poller {
  /// Spawns the terminal-event producer.
  pub fn spawn_terminal(tx: Sender<Event>, timeout: Duration) -> Arc<Self> {
    Self::spawn_with(timeout, move |stop| {
      while !stop.load(Ordering::SeqCst) {
        match crossterm::event::poll(POLL_INTERVAL) {
          Ok(true) => match crossterm::event::read() {
            Ok(ev) => {
              if tx.send(Event::Term(ev)).is_err() {
                break;
              }
            }
            Err(_) => break,
          },
          Ok(false) => {}
          Err(_) => break,
        }
      }
    })
  }

  /// Spawns an arbitrary producer body; the seam the shutdown tests
  /// drive fake producers through.
  pub fn spawn_with<F>(timeout: Duration, producer: F) -> Arc<Self>
  where
    F: FnOnce(Arc<AtomicBool>) + Send + 'static,
  {
    let stop = Arc::new(AtomicBool::new(false));
    let (done_tx, done_rx) = mpsc::channel();
    let producer_stop = stop.clone();
    thread::spawn(move || {
      producer(producer_stop);
      let _ = done_tx.send(());
    });
    Arc::new(Self {
      stop,
      done: Mutex::new(done_rx),
      closed: Mutex::new(false),
      timeout,
    })
  }

  /// Runs the shutdown protocol: raise the stop signal at most once,
  /// then wait for producer completion with a bounded timeout. Every
  /// later call observes `AlreadyDown` without waiting.
  pub fn shutdown(&self) -> ShutdownOutcome {
    {
      let mut closed = self.closed.lock().unwrap();
      if *closed {
        return ShutdownOutcome::AlreadyDown;
      }
      *closed = true;
      self.stop.store(true, Ordering::SeqCst);
    }
    let done = self.done.lock().unwrap();
    match done.recv_timeout(self.timeout) {
      Ok(()) | Err(RecvTimeoutError::Disconnected) => ShutdownOutcome::Clean,
      Err(RecvTimeoutError::Timeout) => ShutdownOutcome::TimedOut,
    }
  }

  #[allow(dead_code)] // used in tests
  pub fn is_closed(&self) -> bool {
    *self.closed.lock().unwrap()
  }
}

/// Cloneable handle other threads use to reach the main loop.
#[derive(Clone)]
pub struct EventSender {
  tx: Sender<Event>,
}

impl EventSender {
  /// Schedules `f` on the main loop and blocks until it has run. The
  /// rendezvous channel is the unbuffered handshake: the ack arrives
  /// only after the closure finished (or was abandoned at loop exit).
  pub fn schedule_sync<F>(&self, f: F)
  where
    F: FnOnce(&mut App) + Send + 'static,
  {
    let (done, ack) = mpsc::sync_channel(0);
    if self
      .tx
      .send(Event::Callback { f: Box::new(f), done })
      .is_err()
    {
      return;
    }
    let _ = ack.recv();
  }

  /// Two-token interrupt: the pair releases the main loop to draw one
  /// frame between long-running foreground steps.
  pub fn interrupt(&self) {
    let _ = self.tx.send(Event::Interrupt);
    let _ = self.tx.send(Event::Interrupt);
  }

  pub fn send_tick(&self) -> bool {
    self.tx.send(Event::Tick).is_ok()
  }
}

/// The merged event source the main loop blocks on.
pub struct EventLoop {
  tx: Sender<Event>,
  rx: Receiver<Event>,
  poller: Arc<Poller>,
  /// Events buffered while waiting out an interrupt pair.
  pending: RefCell<VecDeque<Event>>,
}

impl EventLoop {
  pub fn new() -> Self {
    let (tx, rx) = mpsc::channel();
    let poller = Poller::spawn_terminal(tx.clone(), POLLER_SHUTDOWN_TIMEOUT);
    Self { tx, rx, poller, pending: RefCell::new(VecDeque::new()) }
  }

  /// A loop over a custom producer, for tests.
  #[allow(dead_code)] // used in tests
  pub fn with_producer<F>(producer: F) -> Self
  where
    F: FnOnce(Arc<AtomicBool>) + Send + 'static,
  {
    let (tx, rx) = mpsc::channel();
    let poller = Poller::spawn_with(POLLER_SHUTDOWN_TIMEOUT, producer);
    Self { tx, rx, poller, pending: RefCell::new(VecDeque::new()) }
  }

  pub fn sender(&self) -> EventSender {
    EventSender { tx: self.tx.clone() }
  }

  /// Blocks for the next event. An interrupt token is consumed here
  /// together with its matching partner; events arriving between the
  /// two are buffered and replayed in order.
  pub fn next(&self) -> Result<Event> {
    if let Some(ev) = self.pending.borrow_mut().pop_front() {
      return Ok(ev);
    }
    loop {
      let ev = self.rx.recv()?;
      if !matches!(ev, Event::Interrupt) {
        return Ok(ev);
      }
      // Drain until the matching token, buffering bystanders.
      loop {
        let ev = self.rx.recv()?;
        if matches!(ev, Event::Interrupt) {
          break;
        }
        self.pending.borrow_mut().push_back(ev);
      }
      if let Some(ev) = self.pending.borrow_mut().pop_front() {
        return Ok(ev);
      }
    }
  }

  /// Drains queued events, then stops the producer.
  pub fn shutdown(&self) -> ShutdownOutcome {
    self.pending.borrow_mut().clear();
    while self.rx.try_recv().is_ok() {}
    self.poller.shutdown()
  }
}

/// The 1 Hz redraw ticker that runs while a difference search is in
/// progress. Dropping it closes the stop channel and ends the thread.
pub struct Ticker {
  stop_tx: Sender<()>,
}

impl Ticker {
  pub fn start(sender: EventSender, period: Duration) -> Self {
    let (stop_tx, stop_rx) = mpsc::channel();
    thread::spawn(move || loop {
      match stop_rx.recv_timeout(period) {
        Err(RecvTimeoutError::Timeout) => {
          if !sender.send_tick() {
            break;
          }
        }
        _ => break,
      }
    });
    Self { stop_tx }
  }

  pub fn stop(self) {
    let _ = self.stop_tx.send(());
  }
}
