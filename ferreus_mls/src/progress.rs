/////////////////////////////////////////////////////////////////////////////////////////////
//
// Defines progress reporting messages, sinks, and helper functions for reconstruction runs.
//
// Created on: 15 Nov 2025     Author: Daniel Owen
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

//! Progress reporting primitives for reconstruction runs.

use std::fmt::Debug;
use std::sync::{mpsc, Arc};
use std::thread;

/// Progress events emitted while building and testing a reconstruction.
#[derive(Debug, Clone)]
pub enum ProgressMsg {
    /// The polynomial basis has been enumerated.
    IndexSetBuilt {
        dimension: usize,
        degree: usize,
        size: usize,
    },

    /// One entry of the basis, emitted only when `verbose` is set.
    MultiIndex { position: usize, exponents: Vec<usize> },

    /// Particles have been scattered into the grid cells.
    ParticlesScattered {
        num_particles: usize,
        num_cells: usize,
        cells_with_particles: usize,
    },

    /// A node saw fewer particles than basis terms, so its basis was truncated.
    BasisTruncated {
        node: usize,
        incidence: usize,
        basis_count: usize,
    },

    /// A node's moment matrix could not be solved.
    SingularMatrix { node: usize, column: usize },

    /// Fraction of nodes processed so far.
    NodeProgress {
        completed: usize,
        total: usize,
        progress: f64,
    },

    /// A node's reconstructed value missed the exact value by more than the tolerance.
    ToleranceExceeded {
        node: usize,
        exact: f64,
        reconstructed: f64,
    },

    /// Arbitrary informational message.
    Message { message: String },
}

/// Sink that consumes progress messages.
pub trait ProgressSink: Send + Sync + Debug {
    fn emit(&self, msg: ProgressMsg);
}

/// Progress sink that forwards messages over a channel.
#[derive(Debug)]
pub struct ClosureSink {
    tx: mpsc::SyncSender<ProgressMsg>,
}

impl ProgressSink for ClosureSink {
    #[inline]
    fn emit(&self, msg: ProgressMsg) {
        let _ = self.tx.try_send(msg);
    }
}

/// Spawns a listener thread that runs a handler closure for each progress message.
///
/// The listener exits once every clone of the returned sink has been dropped.
pub fn closure_sink<F>(
    buffer: usize,
    mut handler: F,
) -> (Arc<dyn ProgressSink>, thread::JoinHandle<()>)
where
    F: FnMut(ProgressMsg) + Send + 'static,
{
    let (tx, rx) = mpsc::sync_channel::<ProgressMsg>(buffer.max(1));
    let sink: Arc<dyn ProgressSink> = Arc::new(ClosureSink { tx });

    let handle = thread::spawn(move || {
        while let Ok(msg) = rx.recv() {
            handler(msg);
        }
    });

    (sink, handle)
}

/// Sink that prints each message on its own line to stdout.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdoutSink;

impl ProgressSink for StdoutSink {
    fn emit(&self, msg: ProgressMsg) {
        println!("{}", format_message(&msg));
    }
}

/// Renders a progress message as a single human readable line.
pub fn format_message(msg: &ProgressMsg) -> String {
    match msg {
        ProgressMsg::IndexSetBuilt {
            dimension,
            degree,
            size,
        } => format!("Index set: dimension {dimension}, degree {degree}, {size} terms"),
        ProgressMsg::MultiIndex {
            position,
            exponents,
        } => format!("alpha[{position}] = {exponents:?}"),
        ProgressMsg::ParticlesScattered {
            num_particles,
            num_cells,
            cells_with_particles,
        } => format!(
            "Scattered {num_particles} particles into {cells_with_particles} of {num_cells} cells"
        ),
        ProgressMsg::BasisTruncated {
            node,
            incidence,
            basis_count,
        } => format!("Node {node}: {incidence} incidences, basis truncated to {basis_count}"),
        ProgressMsg::SingularMatrix { node, column } => {
            format!("Node {node}: singular moment matrix at column {column}")
        }
        ProgressMsg::NodeProgress {
            completed,
            total,
            progress,
        } => format!("Nodes: {completed:>6}/{total:<6} {:>5.1}%", progress * 100.0),
        ProgressMsg::ToleranceExceeded {
            node,
            exact,
            reconstructed,
        } => format!(
            "Error at node = {node} exact value = {exact} reconstructed value = {reconstructed}"
        ),
        ProgressMsg::Message { message } => message.clone(),
    }
}

/// Fraction of `total` that `completed` represents, in [0, 1].
#[inline]
pub(crate) fn progress_fraction(completed: usize, total: usize) -> f64 {
    match total {
        0 => 1.0,
        _ => (completed as f64 / total as f64).min(1.0),
    }
}

/// Emits a message if a sink is installed.
#[inline]
pub(crate) fn emit(sink: &Option<Arc<dyn ProgressSink>>, msg: ProgressMsg) {
    if let Some(sink) = sink {
        sink.emit(msg);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use equator::assert;

    #[test]
    fn closure_sink_delivers_messages_in_order() {
        let (collector_tx, collector_rx) = mpsc::channel::<String>();
        let (sink, handle) = closure_sink(16, move |msg| {
            let _ = collector_tx.send(format_message(&msg));
        });

        sink.emit(ProgressMsg::Message {
            message: "first".to_string(),
        });
        sink.emit(ProgressMsg::SingularMatrix { node: 3, column: 1 });
        drop(sink);
        let _ = handle.join();

        let received: Vec<String> = collector_rx.iter().collect();
        assert!(
            received
                == vec![
                    "first".to_string(),
                    "Node 3: singular moment matrix at column 1".to_string()
                ]
        );
    }

    #[test]
    fn progress_fraction_is_clamped() {
        assert!(progress_fraction(0, 0) == 1.0);
        assert!(progress_fraction(5, 10) == 0.5);
        assert!(progress_fraction(12, 10) == 1.0);
    }

    #[test]
    fn tolerance_message_matches_report_wording() {
        let line = format_message(&ProgressMsg::ToleranceExceeded {
            node: 7,
            exact: 1.0,
            reconstructed: 0.5,
        });
        assert!(line == "Error at node = 7 exact value = 1 reconstructed value = 0.5");
    }
}
