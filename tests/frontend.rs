//! The chat client against a live server backed by fake models.

mod common;

use std::sync::Arc;

use common::{build_test_app, FakeImages, FakeText, ImageBehavior};
use deckgen::ai::Role;
use deckgen::frontend::{BackendClient, ChatFrontend};

const SLIDES: &str = r#"[
  {"slide_no": 1, "slide_category": "Title Slide", "slide_content": {"title": "Bees"}},
  {"slide_no": 2, "slide_category": "Quote Slide", "slide_content": {"quote": "Buzz"}},
  {"slide_no": 3, "slide_category": "Bullet Slide", "slide_content": {"title": "Facts", "bullets": ["Honey"]}}
]"#;

async fn spawn_server(text: Arc<FakeText>) -> String {
    let app = build_test_app(text, Arc::new(FakeImages::new(ImageBehavior::NoImage)));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

#[tokio::test]
async fn prompt_preview_then_create() {
    let text = Arc::new(FakeText::structured(SLIDES));
    let url = spawn_server(text.clone()).await;
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("deck.pptx");
    let frontend = ChatFrontend::new(BackendClient::new(&url), output.clone());

    let preview = frontend.submit("Three slides on bees").await.unwrap();
    assert!(preview.contains("### Slide 1"));
    assert!(preview.contains("**Bullets:**\n- Honey"));
    assert_eq!(frontend.session().latest_slides().len(), 3);

    // The second prompt carries the first exchange as history.
    frontend.submit("Make it shorter").await.unwrap();
    let sent = text.last_history.lock().clone();
    assert_eq!(sent[0].role, Role::System);
    assert_eq!(sent[1].content, "Three slides on bees");
    assert_eq!(sent[2].role, Role::Assistant);
    assert_eq!(sent.len(), 3);

    let download = frontend.create_deck().await.unwrap();
    assert_eq!(download.rendered, Some(2));
    assert_eq!(download.skipped, vec![2]);
    let saved = std::fs::read(&output).unwrap();
    assert_eq!(saved, download.bytes);
    assert_eq!(&saved[..2], b"PK");
}

#[tokio::test]
async fn backend_errors_carry_the_server_message() {
    let text = Arc::new(FakeText {
        unavailable: true,
        ..Default::default()
    });
    let url = spawn_server(text).await;
    let client = BackendClient::new(&url);

    let err = client.content("bees", &[]).await.unwrap_err();
    let message = format!("{err:#}");
    assert!(message.contains("502"), "{message}");
    assert!(message.contains("overloaded"), "{message}");
}

#[tokio::test]
async fn failed_prompt_is_not_recorded() {
    let text = Arc::new(FakeText {
        unavailable: true,
        ..Default::default()
    });
    let url = spawn_server(text).await;
    let dir = tempfile::tempdir().unwrap();
    let frontend = ChatFrontend::new(BackendClient::new(&url), dir.path().join("x.pptx"));

    assert!(frontend.submit("bees").await.is_err());
    assert!(frontend.session().history().is_empty());
}
