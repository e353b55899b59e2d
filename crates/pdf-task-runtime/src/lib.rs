//! Request/response protocol for running document edits off the caller's
//! thread. A host submits one [`TaskRequest`] and receives exactly one
//! terminal [`TaskResponse`]; no error escapes the worker boundary.

mod worker;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub use pdf_edit::{DocumentInfo, EditError, MetadataUpdate};
pub use worker::{Submission, TaskQueue, worker_task};

/// One dispatched operation with its input documents and options.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum TaskRequest {
    Merge {
        documents: Vec<Vec<u8>>,
    },
    Rotate {
        document: Vec<u8>,
        degrees: i32,
    },
    Protect {
        document: Vec<u8>,
        password: String,
    },
    Unlock {
        document: Vec<u8>,
        password: String,
    },
    Remove {
        document: Vec<u8>,
        pages: String,
    },
    Extract {
        document: Vec<u8>,
        pages: String,
    },
    Reorder {
        document: Vec<u8>,
        order: String,
    },
    Number {
        document: Vec<u8>,
    },
    Watermark {
        document: Vec<u8>,
        text: String,
    },
    Metadata {
        document: Vec<u8>,
        update: MetadataUpdate,
    },
    Flatten {
        document: Vec<u8>,
    },
    Info {
        document: Vec<u8>,
    },
}

impl TaskRequest {
    pub fn operation(&self) -> OperationKind {
        match self {
            TaskRequest::Merge { .. } => OperationKind::Merge,
            TaskRequest::Rotate { .. } => OperationKind::Rotate,
            TaskRequest::Protect { .. } => OperationKind::Protect,
            TaskRequest::Unlock { .. } => OperationKind::Unlock,
            TaskRequest::Remove { .. } => OperationKind::Remove,
            TaskRequest::Extract { .. } => OperationKind::Extract,
            TaskRequest::Reorder { .. } => OperationKind::Reorder,
            TaskRequest::Number { .. } => OperationKind::Number,
            TaskRequest::Watermark { .. } => OperationKind::Watermark,
            TaskRequest::Metadata { .. } => OperationKind::Metadata,
            TaskRequest::Flatten { .. } => OperationKind::Flatten,
            TaskRequest::Info { .. } => OperationKind::Info,
        }
    }
}

/// The terminal response for a request. Exactly one variant, exactly once.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum TaskResponse {
    Success {
        data: Vec<u8>,
        file_name: String,
    },
    Info {
        info: DocumentInfo,
    },
    Error {
        message: String,
    },
}

/// Operation names for the boundary where requests still arrive as
/// strings. Inside the runtime everything is matched on [`TaskRequest`]
/// variants, so adding an operation is a compile-time change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationKind {
    Merge,
    Rotate,
    Protect,
    Unlock,
    Remove,
    Extract,
    Reorder,
    Number,
    Watermark,
    Metadata,
    Flatten,
    Info,
}

impl OperationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            OperationKind::Merge => "merge",
            OperationKind::Rotate => "rotate",
            OperationKind::Protect => "protect",
            OperationKind::Unlock => "unlock",
            OperationKind::Remove => "remove",
            OperationKind::Extract => "extract",
            OperationKind::Reorder => "reorder",
            OperationKind::Number => "number",
            OperationKind::Watermark => "watermark",
            OperationKind::Metadata => "metadata",
            OperationKind::Flatten => "flatten",
            OperationKind::Info => "info",
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OperationKind {
    type Err = EditError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name {
            "merge" => Ok(OperationKind::Merge),
            "rotate" => Ok(OperationKind::Rotate),
            "protect" => Ok(OperationKind::Protect),
            "unlock" => Ok(OperationKind::Unlock),
            "remove" => Ok(OperationKind::Remove),
            "extract" => Ok(OperationKind::Extract),
            "reorder" => Ok(OperationKind::Reorder),
            "number" => Ok(OperationKind::Number),
            "watermark" => Ok(OperationKind::Watermark),
            "metadata" => Ok(OperationKind::Metadata),
            "flatten" => Ok(OperationKind::Flatten),
            "info" => Ok(OperationKind::Info),
            other => Err(EditError::UnsupportedOperation(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn operation_name_round_trip() {
        for op in [
            OperationKind::Merge,
            OperationKind::Rotate,
            OperationKind::Protect,
            OperationKind::Unlock,
            OperationKind::Remove,
            OperationKind::Extract,
            OperationKind::Reorder,
            OperationKind::Number,
            OperationKind::Watermark,
            OperationKind::Metadata,
            OperationKind::Flatten,
            OperationKind::Info,
        ] {
            assert_eq!(op.as_str().parse::<OperationKind>().unwrap(), op);
        }
    }

    #[test]
    fn unknown_operation_name_is_rejected_by_name() {
        let err = "shrink".parse::<OperationKind>().unwrap_err();
        assert!(err.to_string().contains("shrink"));
    }

    #[test]
    fn response_serializes_with_status_tag() {
        let response = TaskResponse::Error {
            message: "boom".to_string(),
        };
        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains(r#""status":"error""#));
    }
}
