use chrono::Duration;
use flume::{Receiver, Sender};

#[derive(Debug, Clone, Copy, PartialEq)]
enum WaitResult {
    Exit,
    Continue,
}

/// Ticks at a fixed interval on a separate thread. Ticks are handed over
/// one at a time, a slow receiver does not make them pile up. The thread
/// exits once the timer is dropped.
#[derive(Debug)]
pub struct Timer {
    interval: Duration,
    _stop_tx: Sender<()>,
    timer_rx: Receiver<()>,
}

impl Timer {
    pub fn with_interval(interval: Duration) -> Self {
        let (stop_tx, stop_rx) = flume::bounded(1);
        let (timer_tx, timer_rx) = flume::bounded(0);
        let wait_timeout = interval.to_std().unwrap_or_default();

        let _timer_thread = std::thread::spawn(move || {
            debug!(
                "timer thread started, ticking every {}",
                crate::duration::duration_pretty(interval)
            );
            while let WaitResult::Continue = wait(wait_timeout, &stop_rx, &timer_tx) {}
            debug!("timer thread exiting");
        });

        Self {
            interval,
            _stop_tx: stop_tx,
            timer_rx,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn timer_rx(&self) -> Receiver<()> {
        self.timer_rx.clone()
    }
}

fn wait(timeout: std::time::Duration, stop_rx: &Receiver<()>, timer_tx: &Sender<()>) -> WaitResult {
    match stop_rx.recv_timeout(timeout) {
        Err(flume::RecvTimeoutError::Timeout) => {
            trace!("tick");
            if timer_tx.send(()).is_err() {
                debug!("timer channel closed, exiting");
                return WaitResult::Exit;
            }
            WaitResult::Continue
        }
        Ok(()) | Err(flume::RecvTimeoutError::Disconnected) => {
            debug!("timer stopped, exiting");
            WaitResult::Exit
        }
    }
}
