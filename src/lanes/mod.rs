//! Background fetch lanes.
//!
//! A [`FetchLane`] is one worker thread fed through an mpsc channel. Requests
//! run one at a time in submission order and each produces exactly one
//! response, which the event loop drains with [`FetchLane::try_recv`]
//! between frames.

use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// A serial worker running `Req -> Resp` off the UI thread.
pub struct FetchLane<Req, Resp> {
    name: &'static str,
    requests: Option<Sender<Req>>,
    responses: Receiver<Resp>,
    worker: Option<JoinHandle<()>>,
}

impl<Req, Resp> FetchLane<Req, Resp>
where
    Req: Send + 'static,
    Resp: Send + 'static,
{
    /// Start a worker that answers each request with `handler`.
    pub fn spawn<F>(name: &'static str, mut handler: F) -> Self
    where
        F: FnMut(Req) -> Resp + Send + 'static,
    {
        let (req_tx, req_rx) = mpsc::channel::<Req>();
        let (resp_tx, resp_rx) = mpsc::channel::<Resp>();

        let worker = thread::Builder::new()
            .name(format!("photofeed-{name}"))
            .spawn(move || {
                while let Ok(request) = req_rx.recv() {
                    if resp_tx.send(handler(request)).is_err() {
                        break;
                    }
                }
                tracing::trace!(lane = name, "lane worker exiting");
            });

        let worker = match worker {
            Ok(handle) => Some(handle),
            Err(err) => {
                tracing::error!(lane = name, error = %err, "failed to spawn lane worker");
                None
            }
        };

        Self {
            name,
            requests: worker.as_ref().map(|_| req_tx),
            responses: resp_rx,
            worker,
        }
    }

    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Queue a request. Returns false when the worker is gone.
    pub fn submit(&self, request: Req) -> bool {
        let Some(tx) = &self.requests else {
            return false;
        };
        if tx.send(request).is_err() {
            tracing::warn!(lane = self.name, "lane worker is gone, request dropped");
            return false;
        }
        true
    }

    /// Next finished response, if one is ready.
    pub fn try_recv(&self) -> Option<Resp> {
        self.responses.try_recv().ok()
    }

    /// Wait up to `timeout` for the next response.
    pub fn recv_timeout(&self, timeout: Duration) -> Option<Resp> {
        self.responses.recv_timeout(timeout).ok()
    }
}

impl<Req, Resp> Drop for FetchLane<Req, Resp> {
    fn drop(&mut self) {
        // Closing the request side ends the worker's recv loop. The worker is
        // not joined: it may be blocked on a slow request.
        self.requests.take();
        self.worker.take();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    const WAIT: Duration = Duration::from_secs(2);

    #[test]
    fn test_each_request_gets_one_response() {
        let lane = FetchLane::spawn("double", |n: u32| n * 2);
        assert!(lane.submit(21));
        assert_eq!(lane.recv_timeout(WAIT), Some(42));
        assert_eq!(lane.try_recv(), None);
    }

    #[test]
    fn test_requests_run_in_submission_order() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let log = Arc::clone(&seen);
        let lane = FetchLane::spawn("order", move |n: u32| {
            log.lock().unwrap().push(n);
            n
        });

        for n in 0..5 {
            lane.submit(n);
        }
        let responses: Vec<u32> = (0..5).filter_map(|_| lane.recv_timeout(WAIT)).collect();

        assert_eq!(responses, vec![0, 1, 2, 3, 4]);
        assert_eq!(*seen.lock().unwrap(), vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_try_recv_without_work_is_none() {
        let lane: FetchLane<(), ()> = FetchLane::spawn("idle", |()| ());
        assert_eq!(lane.try_recv(), None);
        assert_eq!(lane.name(), "idle");
    }

    #[test]
    fn test_dropping_lane_stops_worker() {
        let (done_tx, done_rx) = mpsc::channel();
        let lane = FetchLane::spawn("drop", move |()| {
            let _ = done_tx.send(());
        });
        lane.submit(());
        drop(lane);
        assert!(done_rx.recv_timeout(WAIT).is_ok());
        // Worker exited and dropped its sender.
        assert!(done_rx.recv_timeout(WAIT).is_err());
    }
}
