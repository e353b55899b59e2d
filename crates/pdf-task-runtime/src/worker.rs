//! Worker loop and submission handle.
//!
//! Requests travel over an unbounded channel to a single worker task;
//! each submission carries a oneshot sender for its terminal response.
//! Document work runs under `spawn_blocking` so the async runtime stays
//! responsive while lopdf churns.

use chrono::Local;
use tokio::sync::{mpsc, oneshot};

use pdf_edit as ops;
use pdf_edit::{DocumentInfo, EditError};

use crate::{OperationKind, TaskRequest, TaskResponse};

pub struct Submission {
    pub request: TaskRequest,
    pub reply: oneshot::Sender<TaskResponse>,
}

/// Handle for submitting requests to a spawned worker.
#[derive(Clone)]
pub struct TaskQueue {
    tx: mpsc::UnboundedSender<Submission>,
}

impl TaskQueue {
    /// Spawn the worker on the current tokio runtime.
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(worker_task(rx));
        Self { tx }
    }

    /// Queue a request without blocking. The returned receiver resolves
    /// to the single terminal response; it errors only if the worker is
    /// gone.
    pub fn submit(&self, request: TaskRequest) -> oneshot::Receiver<TaskResponse> {
        let (reply, receiver) = oneshot::channel();
        let _ = self.tx.send(Submission { request, reply });
        receiver
    }
}

impl Default for TaskQueue {
    fn default() -> Self {
        Self::new()
    }
}

/// Process submissions one at a time until every sender is dropped.
pub async fn worker_task(mut rx: mpsc::UnboundedReceiver<Submission>) {
    while let Some(Submission { request, reply }) = rx.recv().await {
        let response = process_request(request).await;
        // The caller may have given up waiting; that is not our problem.
        let _ = reply.send(response);
    }
}

async fn process_request(request: TaskRequest) -> TaskResponse {
    let operation = request.operation();
    log::debug!("processing {operation} request");

    let outcome = tokio::task::spawn_blocking(move || execute(request)).await;
    match outcome {
        Ok(Ok(TaskOutcome::Document(data))) => TaskResponse::Success {
            data,
            file_name: output_file_name(operation),
        },
        Ok(Ok(TaskOutcome::Info(info))) => TaskResponse::Info { info },
        Ok(Err(err)) => {
            log::warn!("{operation} failed: {err}");
            TaskResponse::Error {
                message: err.to_string(),
            }
        }
        Err(join_err) => TaskResponse::Error {
            message: EditError::TaskJoin(join_err).to_string(),
        },
    }
}

enum TaskOutcome {
    Document(Vec<u8>),
    Info(DocumentInfo),
}

fn execute(request: TaskRequest) -> Result<TaskOutcome, EditError> {
    let outcome = match request {
        TaskRequest::Merge { documents } => {
            TaskOutcome::Document(ops::merge_documents(&documents)?)
        }
        TaskRequest::Rotate { document, degrees } => {
            TaskOutcome::Document(ops::rotate_pages(&document, degrees)?)
        }
        TaskRequest::Protect { document, password } => {
            TaskOutcome::Document(ops::protect_document(&document, &password)?)
        }
        TaskRequest::Unlock { document, password } => {
            TaskOutcome::Document(ops::unlock_document(&document, &password)?)
        }
        TaskRequest::Remove { document, pages } => {
            TaskOutcome::Document(ops::remove_pages(&document, &pages)?)
        }
        TaskRequest::Extract { document, pages } => {
            TaskOutcome::Document(ops::extract_pages(&document, &pages)?)
        }
        TaskRequest::Reorder { document, order } => {
            TaskOutcome::Document(ops::reorder_pages(&document, &order)?)
        }
        TaskRequest::Number { document } => {
            TaskOutcome::Document(ops::add_page_numbers(&document)?)
        }
        TaskRequest::Watermark { document, text } => {
            TaskOutcome::Document(ops::add_watermark(&document, &text)?)
        }
        TaskRequest::Metadata { document, update } => {
            TaskOutcome::Document(ops::set_metadata(&document, &update)?)
        }
        TaskRequest::Flatten { document } => {
            TaskOutcome::Document(ops::flatten_document(&document)?)
        }
        TaskRequest::Info { document } => TaskOutcome::Info(ops::document_info(&document)?),
    };
    Ok(outcome)
}

/// Suggested download name, `<operation>_<timestamp>.pdf`. Generated
/// for display only and never parsed back.
fn output_file_name(operation: OperationKind) -> String {
    format!("{}_{}.pdf", operation, Local::now().format("%Y%m%d_%H%M%S"))
}
