use lopdf::{Dictionary, Document, Object, Stream};
use pdf_task_runtime::{MetadataUpdate, TaskQueue, TaskRequest, TaskResponse};

fn test_pdf_bytes(num_pages: usize) -> Vec<u8> {
    let mut doc = Document::with_version("1.7");

    let pages_id = doc.new_object_id();

    let mut kids = Vec::new();
    for _ in 0..num_pages {
        let content_id = doc.add_object(Stream::new(Dictionary::new(), b"q Q".to_vec()));

        let page_id = doc.add_object(Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Page".to_vec())),
            ("Parent", Object::Reference(pages_id)),
            (
                "MediaBox",
                Object::Array(vec![
                    Object::Integer(0),
                    Object::Integer(0),
                    Object::Integer(612),
                    Object::Integer(792),
                ]),
            ),
            ("Resources", Object::Dictionary(Dictionary::new())),
            ("Contents", Object::Reference(content_id)),
        ]));
        kids.push(Object::Reference(page_id));
    }

    let pages_dict = Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Pages".to_vec())),
        ("Kids", Object::Array(kids)),
        ("Count", Object::Integer(num_pages as i64)),
    ]);
    doc.objects.insert(pages_id, Object::Dictionary(pages_dict));

    let catalog_id = doc.add_object(Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Catalog".to_vec())),
        ("Pages", Object::Reference(pages_id)),
    ]));

    doc.trailer.set("Root", catalog_id);

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer).unwrap();
    buffer
}

fn page_count(bytes: &[u8]) -> usize {
    Document::load_mem(bytes).unwrap().get_pages().len()
}

#[tokio::test]
async fn merge_request_succeeds_with_suggested_name() {
    let queue = TaskQueue::new();

    let request = TaskRequest::Merge {
        documents: vec![test_pdf_bytes(2), test_pdf_bytes(3)],
    };
    let response = queue.submit(request).await.unwrap();

    match response {
        TaskResponse::Success { data, file_name } => {
            assert_eq!(page_count(&data), 5);
            assert!(file_name.starts_with("merge_"), "got {file_name}");
            assert!(file_name.ends_with(".pdf"));
        }
        other => panic!("expected success, got {other:?}"),
    }
}

#[tokio::test]
async fn info_request_routes_to_info_response() {
    let queue = TaskQueue::new();

    let response = queue
        .submit(TaskRequest::Info {
            document: test_pdf_bytes(4),
        })
        .await
        .unwrap();

    match response {
        TaskResponse::Info { info } => {
            assert_eq!(info.page_count, 4);
            assert!(!info.encrypted);
        }
        other => panic!("expected info, got {other:?}"),
    }
}

#[tokio::test]
async fn edit_failure_becomes_error_response() {
    let queue = TaskQueue::new();

    // Unparseable page spec never panics the worker.
    let response = queue
        .submit(TaskRequest::Remove {
            document: test_pdf_bytes(3),
            pages: "nonsense".to_string(),
        })
        .await
        .unwrap();

    match response {
        TaskResponse::Error { message } => {
            assert!(!message.is_empty());
        }
        other => panic!("expected error, got {other:?}"),
    }
}

#[tokio::test]
async fn reorder_mismatch_is_reported_not_thrown() {
    let queue = TaskQueue::new();

    let response = queue
        .submit(TaskRequest::Reorder {
            document: test_pdf_bytes(3),
            order: "1,2".to_string(),
        })
        .await
        .unwrap();

    match response {
        TaskResponse::Error { message } => {
            assert!(message.contains('3'), "got {message}");
        }
        other => panic!("expected error, got {other:?}"),
    }
}

#[tokio::test]
async fn queue_survives_a_failed_request() {
    let queue = TaskQueue::new();

    let failed = queue
        .submit(TaskRequest::Merge { documents: vec![] })
        .await
        .unwrap();
    assert!(matches!(failed, TaskResponse::Error { .. }));

    // The same worker keeps serving after reporting an error.
    let response = queue
        .submit(TaskRequest::Rotate {
            document: test_pdf_bytes(2),
            degrees: 180,
        })
        .await
        .unwrap();
    assert!(matches!(response, TaskResponse::Success { .. }));
}

#[tokio::test]
async fn metadata_request_applies_update() {
    let queue = TaskQueue::new();

    let response = queue
        .submit(TaskRequest::Metadata {
            document: test_pdf_bytes(1),
            update: MetadataUpdate {
                title: Some("Stamped".to_string()),
                author: None,
                subject: None,
            },
        })
        .await
        .unwrap();

    let data = match response {
        TaskResponse::Success { data, .. } => data,
        other => panic!("expected success, got {other:?}"),
    };

    let info = queue
        .submit(TaskRequest::Info { document: data })
        .await
        .unwrap();
    match info {
        TaskResponse::Info { info } => assert_eq!(info.title.as_deref(), Some("Stamped")),
        other => panic!("expected info, got {other:?}"),
    }
}
