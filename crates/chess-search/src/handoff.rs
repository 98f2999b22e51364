//! Running a search on a worker thread.
//!
//! The worker owns the [`Searcher`] and its own copy of the position for the
//! duration of the search, then sends the chosen move back exactly once
//! together with the searcher, so its tables carry over to the next move.
//! A started search always runs to completion.

use std::thread::{self, JoinHandle};

use chess_core::Move;
use chess_engine::Position;
use crossbeam_channel::{Receiver, TryRecvError};
use thiserror::Error;

use crate::Searcher;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SearchError {
    /// The worker ended without delivering a result.
    #[error("search worker exited without a result")]
    WorkerLost,
}

/// What a finished search hands back.
#[derive(Debug)]
pub struct SearchOutcome {
    pub best_move: Option<Move>,
    pub searcher: Searcher,
}

/// Handle to a search running on another thread.
#[derive(Debug)]
pub struct SearchTask {
    receiver: Receiver<SearchOutcome>,
    worker: Option<JoinHandle<()>>,
}

/// Starts searching `moves` of `position` to `depth` plies on a new thread.
pub fn spawn_search(searcher: Searcher, position: Position, moves: Vec<Move>, depth: u32) -> SearchTask {
    let (sender, receiver) = crossbeam_channel::bounded(1);
    let worker = thread::spawn(move || {
        let mut searcher = searcher;
        let mut position = position;
        let best_move = searcher.find_best_move(&mut position, &moves, depth);
        if sender.send(SearchOutcome { best_move, searcher }).is_err() {
            tracing::debug!("search result dropped, task handle is gone");
        }
    });

    SearchTask {
        receiver,
        worker: Some(worker),
    }
}

impl SearchTask {
    /// Blocks until the search has finished.
    pub fn wait(mut self) -> Result<SearchOutcome, SearchError> {
        let outcome = self.receiver.recv().map_err(|_| SearchError::WorkerLost);
        self.join_worker();
        outcome
    }

    /// Returns the outcome if the search has finished, or the task itself if
    /// it is still running.
    pub fn try_finish(mut self) -> Result<Result<SearchOutcome, SearchError>, SearchTask> {
        match self.receiver.try_recv() {
            Ok(outcome) => {
                self.join_worker();
                Ok(Ok(outcome))
            }
            Err(TryRecvError::Empty) => Err(self),
            Err(TryRecvError::Disconnected) => {
                self.join_worker();
                Ok(Err(SearchError::WorkerLost))
            }
        }
    }

    fn join_worker(&mut self) {
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                tracing::warn!("search worker panicked");
            }
        }
    }
}
