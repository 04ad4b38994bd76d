//! Client calls against an in-process stub of the backend

use axum::extract::{Multipart, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};
use pdfdesk_client::{ApiClient, ClientError};
use pdfdesk_core::raster::encode_png_data_url;
use pdfdesk_core::{
    BlankReport, BrushStyle, CompressionLevel, EditorSession, FileList, PageSelection, RgbaImage,
    SplitMode, SplitPlan, Tool,
};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};

const TINY_PDF: &[u8] = b"%PDF-1.4\n1 0 obj\n<< >>\nendobj\ntrailer\n<< >>\n%%EOF\n";

fn page_image() -> String {
    encode_png_data_url(&RgbaImage::filled(4, 4, [255, 255, 255, 255])).unwrap()
}

/// (field name, file name, body) for every multipart field received
#[derive(Clone, Default)]
struct Seen(Arc<Mutex<Vec<(String, Option<String>, Vec<u8>)>>>);

impl Seen {
    fn fields(&self) -> Vec<(String, Option<String>, Vec<u8>)> {
        self.0.lock().unwrap().clone()
    }

    fn text(&self, name: &str) -> Option<String> {
        self.fields()
            .into_iter()
            .find(|(n, _, _)| n == name)
            .map(|(_, _, body)| String::from_utf8(body).unwrap())
    }

    fn count(&self, name: &str) -> usize {
        self.fields().iter().filter(|(n, _, _)| n == name).count()
    }
}

async fn record(seen: &Seen, mut multipart: Multipart) {
    while let Some(field) = multipart.next_field().await.unwrap() {
        let name = field.name().unwrap_or_default().to_string();
        let file_name = field.file_name().map(str::to_string);
        let body = field.bytes().await.unwrap().to_vec();
        seen.0.lock().unwrap().push((name, file_name, body));
    }
}

async fn compress(State(seen): State<Seen>, multipart: Multipart) -> impl IntoResponse {
    record(&seen, multipart).await;
    (
        [
            (header::CONTENT_TYPE, "application/zip"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"compressed_files_20240101_120000.zip\"",
            ),
        ],
        b"PK\x03\x04zip".to_vec(),
    )
}

async fn merge(State(seen): State<Seen>, multipart: Multipart) -> impl IntoResponse {
    record(&seen, multipart).await;
    ([(header::CONTENT_TYPE, "application/pdf")], TINY_PDF.to_vec())
}

async fn split_rejects(State(seen): State<Seen>, multipart: Multipart) -> impl IntoResponse {
    record(&seen, multipart).await;
    (
        StatusCode::BAD_REQUEST,
        Json(json!({
            "error": "Validation errors",
            "details": ["Range 1: End page 9 is invalid (must be 1-3)"]
        })),
    )
}

async fn pdf_info(State(seen): State<Seen>, multipart: Multipart) -> impl IntoResponse {
    record(&seen, multipart).await;
    Json(json!({"total_pages": 3, "filename": "doc.pdf", "size": 1234}))
}

async fn previews(State(seen): State<Seen>, multipart: Multipart) -> impl IntoResponse {
    record(&seen, multipart).await;
    Json(json!({
        "previews": [{"page": 1, "image": page_image()}, {"page": 2, "image": page_image()}],
        "has_more": true
    }))
}

async fn pdf_to_images(State(seen): State<Seen>, multipart: Multipart) -> impl IntoResponse {
    record(&seen, multipart).await;
    Json(json!({"pages": [page_image(), page_image()], "total_pages": 2}))
}

async fn save_edited(State(seen): State<Seen>, Json(body): Json<Value>) -> impl IntoResponse {
    seen.0
        .lock()
        .unwrap()
        .push(("json".to_string(), None, serde_json::to_vec(&body).unwrap()));
    ([(header::CONTENT_TYPE, "application/pdf")], TINY_PDF.to_vec())
}

async fn remove_blanks(State(seen): State<Seen>, multipart: Multipart) -> impl IntoResponse {
    record(&seen, multipart).await;
    ([(header::CONTENT_TYPE, "application/pdf")], TINY_PDF.to_vec())
}

async fn broken_gateway() -> impl IntoResponse {
    (StatusCode::BAD_GATEWAY, "<html>Bad Gateway</html>")
}

async fn spawn_backend(seen: Seen) -> String {
    let app = Router::new()
        .route("/compress", post(compress))
        .route("/merge", post(merge))
        .route("/split-pdf", post(split_rejects))
        .route("/pdf-info", post(pdf_info))
        .route("/pdf-previews", post(previews))
        .route("/pdf-to-images", post(pdf_to_images))
        .route("/save-edited-pdf", post(save_edited))
        .route("/remove-blank-pages", post(remove_blanks))
        .with_state(seen);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

async fn spawn_broken_backend() -> String {
    let app = Router::new().route("/merge", post(broken_gateway));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

fn two_files() -> FileList {
    let mut files = FileList::new();
    files.add_file("b.pdf", TINY_PDF.to_vec()).unwrap();
    files.add_file("a.pdf", TINY_PDF.to_vec()).unwrap();
    files
}

#[tokio::test]
async fn test_compress_sends_files_in_order_with_level() {
    let seen = Seen::default();
    let client = ApiClient::new(&spawn_backend(seen.clone()).await).unwrap();

    let download = client
        .compress(&two_files(), CompressionLevel::Extreme)
        .await
        .unwrap();

    assert_eq!(download.filename, "compressed_files_20240101_120000.zip");
    assert!(download.is_zip());
    assert_eq!(seen.count("files"), 2);
    assert_eq!(seen.text("level").as_deref(), Some("extreme"));
    assert_eq!(seen.text("file_order_1").as_deref(), Some("1"));

    let names: Vec<_> = seen
        .fields()
        .into_iter()
        .filter(|(n, _, _)| n == "files")
        .filter_map(|(_, f, _)| f)
        .collect();
    assert_eq!(names, vec!["b.pdf", "a.pdf"]);
}

#[tokio::test]
async fn test_compress_without_files_never_calls_backend() {
    let client = ApiClient::new("http://127.0.0.1:9").unwrap();
    let err = client
        .compress(&FileList::new(), CompressionLevel::default())
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Core(_)));
}

#[tokio::test]
async fn test_merge_sends_rotation_metadata() {
    let seen = Seen::default();
    let client = ApiClient::new(&spawn_backend(seen.clone()).await).unwrap();

    let mut files = two_files();
    let second = files.as_slice()[1].id;
    files.rotate(second).unwrap();

    let download = client.merge(&files).await.unwrap();
    assert_eq!(download.filename, "merged_pdf.pdf");

    let metadata: Value = serde_json::from_str(&seen.text("metadata").unwrap()).unwrap();
    assert_eq!(metadata, json!({"1": {"rotation": 90, "name": "a.pdf"}}));
}

#[tokio::test]
async fn test_merge_without_rotation_omits_metadata() {
    let seen = Seen::default();
    let client = ApiClient::new(&spawn_backend(seen.clone()).await).unwrap();

    client.merge(&two_files()).await.unwrap();
    assert_eq!(seen.count("metadata"), 0);
}

#[tokio::test]
async fn test_split_surfaces_validation_details() {
    let seen = Seen::default();
    let client = ApiClient::new(&spawn_backend(seen.clone()).await).unwrap();

    let plan = SplitPlan::build(&SplitMode::Range(vec![(1, 2)]), 3, &PageSelection::default(), true)
        .unwrap();
    let err = client.split("doc.pdf", TINY_PDF, &plan).await.unwrap_err();

    match &err {
        ClientError::Api {
            status,
            error,
            details,
        } => {
            assert_eq!(*status, 400);
            assert_eq!(error, "Validation errors");
            assert_eq!(details.len(), 1);
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(err.to_string().contains("End page 9 is invalid"));

    assert_eq!(seen.text("ranges").as_deref(), Some("[[1,2]]"));
    assert_eq!(seen.text("mergeAll").as_deref(), Some("true"));
}

#[tokio::test]
async fn test_non_json_error_is_unknown() {
    let client = ApiClient::new(&spawn_broken_backend().await).unwrap();
    let err = client.merge(&two_files()).await.unwrap_err();
    match err {
        ClientError::Api { status, error, .. } => {
            assert_eq!(status, 502);
            assert_eq!(error, "Unknown error");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_pdf_info_and_previews() {
    let seen = Seen::default();
    let client = ApiClient::new(&spawn_backend(seen.clone()).await).unwrap();

    let info = client.pdf_info("doc.pdf", TINY_PDF).await.unwrap();
    assert_eq!(info.total_pages, 3);
    assert_eq!(info.filename, "doc.pdf");

    let previews = client.pdf_previews("doc.pdf", TINY_PDF).await.unwrap();
    assert!(previews.has_more);
    assert!(!previews.text_only);
    assert_eq!(previews.images().count(), 2);
    assert_eq!(seen.count("file"), 2);
}

#[tokio::test]
async fn test_edit_round_trip() {
    let seen = Seen::default();
    let client = ApiClient::new(&spawn_backend(seen.clone()).await).unwrap();

    let images = client.pdf_to_images("doc.pdf", TINY_PDF).await.unwrap();
    assert_eq!(images.total_pages, 2);

    let mut editor = EditorSession::new();
    editor.load(images.pages).unwrap();
    editor.set_tool(Tool::Draw);
    editor.begin_stroke(0.0, 0.0, &BrushStyle::default());
    editor.end_stroke();

    let download = client
        .save_edited_pdf(&editor.save_payload().unwrap())
        .await
        .unwrap();
    assert_eq!(download.filename, "edited-document.pdf");

    let body: Value = serde_json::from_str(&seen.text("json").unwrap()).unwrap();
    assert_eq!(body["pages"].as_array().unwrap().len(), 2);
    assert_eq!(body["drawingPaths"][0]["type"], "draw");
}

#[tokio::test]
async fn test_remove_blank_pages() {
    let seen = Seen::default();
    let client = ApiClient::new(&spawn_backend(seen.clone()).await).unwrap();

    let report = BlankReport {
        blank_pages: vec![2, 4],
        total_pages: 5,
    };
    let download = client
        .remove_blank_pages("report.pdf", TINY_PDF, &report)
        .await
        .unwrap();

    assert!(download.filename.starts_with("report_no_blanks_"));
    assert!(download.filename.ends_with(".pdf"));
    assert_eq!(seen.text("removeBlankPages").as_deref(), Some("true"));
    assert_eq!(seen.text("blankPages").as_deref(), Some("[2,4]"));
}

#[tokio::test]
async fn test_remove_blank_pages_needs_blank_pages() {
    let client = ApiClient::new("http://127.0.0.1:9").unwrap();
    let report = BlankReport {
        blank_pages: vec![],
        total_pages: 2,
    };
    assert!(client
        .remove_blank_pages("x.pdf", TINY_PDF, &report)
        .await
        .is_err());
}
