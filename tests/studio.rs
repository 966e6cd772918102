use async_trait::async_trait;
use genstudio::{
    AnalysisRequest, AnalyzeMsg, ChatMsg, ChatSession, EditMsg, EditRequest, ErrorClass,
    GenerateMsg, GenerationRequest, ImageReference, Intensity, Mode, Msg, Phase, Role,
    SelectedFile, Studio, StudioClient, StudioError, UpscaleMsg, UpscaleRequest,
};
use std::collections::VecDeque;
use std::io::Write;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Client that answers from queued outcomes and records what it was asked.
#[derive(Default)]
struct ScriptedClient {
    chat_replies: Mutex<VecDeque<genstudio::Result<String>>>,
    images: Mutex<VecDeque<genstudio::Result<ImageReference>>>,
    texts: Mutex<VecDeque<genstudio::Result<String>>>,
    upscale_requests: Mutex<Vec<UpscaleRequest>>,
    generation_requests: Mutex<Vec<GenerationRequest>>,
    calls: AtomicUsize,
}

impl ScriptedClient {
    fn with_image(self, outcome: genstudio::Result<ImageReference>) -> Self {
        self.images.lock().unwrap().push_back(outcome);
        self
    }

    fn with_chat(self, outcome: genstudio::Result<String>) -> Self {
        self.chat_replies.lock().unwrap().push_back(outcome);
        self
    }

    fn with_text(self, outcome: genstudio::Result<String>) -> Self {
        self.texts.lock().unwrap().push_back(outcome);
        self
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn next_image(&self) -> genstudio::Result<ImageReference> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.images
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(StudioError::NoResult("No image generated.".into())))
    }
}

#[async_trait]
impl StudioClient for ScriptedClient {
    fn open_chat_session(&self) -> ChatSession {
        ChatSession::new("scripted-chat", 32768)
    }

    async fn send_chat_turn(&self, session: &mut ChatSession, text: &str) -> genstudio::Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let reply = self
            .chat_replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(format!("echo: {text}")))?;
        session.record_exchange(text, reply.clone());
        Ok(reply)
    }

    async fn analyze(&self, _request: &AnalysisRequest) -> genstudio::Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.texts
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(StudioError::NoResult("Could not analyze image.".into())))
    }

    async fn generate(&self, request: &GenerationRequest) -> genstudio::Result<ImageReference> {
        self.generation_requests.lock().unwrap().push(request.clone());
        self.next_image()
    }

    async fn edit(&self, _request: &EditRequest) -> genstudio::Result<ImageReference> {
        self.next_image()
    }

    async fn upscale(&self, request: &UpscaleRequest) -> genstudio::Result<ImageReference> {
        self.upscale_requests.lock().unwrap().push(request.clone());
        self.next_image()
    }
}

// Header of a tiny baseline JPEG; enough for MIME sniffing and upload.
const JPEG_10X10: [u8; 20] = [
    0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, 0x4A, 0x46, 0x49, 0x46, 0x00, 0x01, 0x01, 0x00, 0x00,
    0x01, 0x00, 0x01, 0x00, 0x00,
];

fn jpeg_file() -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(".jpg").tempfile().unwrap();
    file.write_all(&JPEG_10X10).unwrap();
    file
}

fn png_image() -> ImageReference {
    ImageReference::from_base64("iVBORw0KGgo=")
}

#[tokio::test]
async fn upscale_end_to_end() {
    let tmp = jpeg_file();
    let client = ScriptedClient::default().with_image(Ok(png_image()));
    let mut studio = Studio::new();

    let file = SelectedFile::from_path(tmp.path()).unwrap();
    assert_eq!(file.mime_type, "image/jpeg");
    studio.update(Msg::Upscale(UpscaleMsg::SelectFile(file)));
    studio.update(Msg::Upscale(UpscaleMsg::SetIntensity(Intensity::new(85))));
    studio.dispatch(&client, Msg::Upscale(UpscaleMsg::Run)).await;

    let requests = client.upscale_requests.lock().unwrap();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].source.mime_type, "image/jpeg");
    assert!(!requests[0].source.data.is_empty());
    assert!(requests[0].instruction().contains("extreme and ultra-sharp"));
    assert!(requests[0].instruction().contains("4K"));

    let upscale = studio.upscale();
    assert_eq!(upscale.phase(), Phase::HasResult);
    assert!(upscale
        .slot()
        .result()
        .unwrap()
        .data_uri()
        .starts_with("data:image/png;base64,"));
}

#[tokio::test]
async fn second_trigger_while_pending_issues_one_call() {
    let tmp = jpeg_file();
    let client = ScriptedClient::default().with_image(Ok(png_image()));
    let mut studio = Studio::new();
    studio.update(Msg::Upscale(UpscaleMsg::SelectFile(
        SelectedFile::from_path(tmp.path()).unwrap(),
    )));

    let first = studio.update(Msg::Upscale(UpscaleMsg::Run));
    let second = studio.update(Msg::Upscale(UpscaleMsg::Run));
    assert!(first.is_some());
    assert!(second.is_none());

    let done = first.unwrap().run(&client).await;
    studio.update(done);

    assert_eq!(client.calls(), 1);
    assert_eq!(studio.upscale().phase(), Phase::HasResult);
}

#[tokio::test]
async fn chat_turns_interleave_in_send_order() {
    let client = ScriptedClient::default();
    let mut studio = Studio::new();
    studio.dispatch(&client, Msg::SelectMode(Mode::Chat)).await;
    let session_id = studio.chat().session().unwrap().id();

    for text in ["a", "b"] {
        studio.update(Msg::Chat(ChatMsg::SetInput(text.into())));
        studio.dispatch(&client, Msg::Chat(ChatMsg::Send)).await;
    }

    let log: Vec<(Role, &str)> = studio
        .chat()
        .messages()
        .iter()
        .map(|m| (m.role, m.text.as_str()))
        .collect();
    assert_eq!(
        log,
        vec![
            (Role::User, "a"),
            (Role::Model, "echo: a"),
            (Role::User, "b"),
            (Role::Model, "echo: b"),
        ]
    );

    let session = studio.chat().session().unwrap();
    assert_eq!(session.id(), session_id);
    assert_eq!(session.history().len(), 4);
}

#[tokio::test]
async fn chat_failure_becomes_placeholder_turn() {
    let client = ScriptedClient::default().with_chat(Err(StudioError::Api {
        status: 503,
        message: "overloaded".into(),
    }));
    let mut studio = Studio::new();
    studio.dispatch(&client, Msg::SelectMode(Mode::Chat)).await;

    studio.update(Msg::Chat(ChatMsg::SetInput("hello".into())));
    studio.dispatch(&client, Msg::Chat(ChatMsg::Send)).await;

    let chat = studio.chat();
    assert_eq!(chat.messages().len(), 2);
    assert_eq!(chat.messages()[1].role, Role::Model);
    assert_eq!(chat.messages()[1].text, "Sorry, I encountered an error.");
    assert_eq!(chat.phase(), Phase::HasError);
    assert_eq!(chat.last_error().unwrap().class, ErrorClass::RemoteService);
    assert!(chat.session().unwrap().history().is_empty());

    studio.update(Msg::Chat(ChatMsg::SetInput("again".into())));
    studio.dispatch(&client, Msg::Chat(ChatMsg::Send)).await;
    assert_eq!(studio.chat().messages().len(), 4);
    assert_eq!(studio.chat().messages()[3].text, "echo: again");
}

#[tokio::test]
async fn generate_without_image_ends_in_error() {
    let client = ScriptedClient::default();
    let mut studio = Studio::new();
    studio.update(Msg::SelectMode(Mode::Generate));
    studio.update(Msg::Generate(GenerateMsg::SetPrompt("a lighthouse".into())));
    studio.dispatch(&client, Msg::Generate(GenerateMsg::Run)).await;

    let generate = studio.generate();
    assert_eq!(generate.phase(), Phase::HasError);
    assert!(generate.slot().result().is_none());
    assert_eq!(generate.slot().error().unwrap().class, ErrorClass::NoResult);
    assert_eq!(client.generation_requests.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn unreadable_file_fails_before_any_call() {
    let client = ScriptedClient::default();
    let mut studio = Studio::new();
    let missing = SelectedFile::with_mime_type("/nonexistent/photo.jpg", "image/jpeg").unwrap();

    studio.update(Msg::Edit(EditMsg::SelectFile(missing)));
    studio.update(Msg::Edit(EditMsg::SetInstruction("Make it snowy".into())));
    studio.dispatch(&client, Msg::Edit(EditMsg::Run)).await;

    assert_eq!(client.calls(), 0);
    assert_eq!(studio.edit().phase(), Phase::HasError);
    assert_eq!(studio.edit().slot().error().unwrap().class, ErrorClass::Io);
    assert_eq!(studio.edit().slot().error().unwrap().message, "Editing failed");
}

#[tokio::test]
async fn switching_modes_preserves_controller_state() {
    let tmp = jpeg_file();
    let client = ScriptedClient::default().with_text(Ok("A small square.".into()));
    let mut studio = Studio::new();

    studio.update(Msg::SelectMode(Mode::Analyze));
    studio.update(Msg::Analyze(AnalyzeMsg::SelectFile(
        SelectedFile::from_path(tmp.path()).unwrap(),
    )));
    studio.dispatch(&client, Msg::Analyze(AnalyzeMsg::Run)).await;
    assert_eq!(studio.analyze().phase(), Phase::HasResult);

    studio.dispatch(&client, Msg::SelectMode(Mode::Chat)).await;
    studio.update(Msg::Chat(ChatMsg::SetInput("hi".into())));
    studio.dispatch(&client, Msg::Chat(ChatMsg::Send)).await;

    for mode in Mode::ALL {
        studio.dispatch(&client, Msg::SelectMode(mode)).await;
    }
    studio.dispatch(&client, Msg::SelectMode(Mode::Analyze)).await;

    assert_eq!(studio.mode(), Mode::Analyze);
    assert_eq!(studio.analyze().phase(), Phase::HasResult);
    assert_eq!(
        studio.analyze().slot().result().map(String::as_str),
        Some("A small square.")
    );
    assert_eq!(studio.chat().messages().len(), 2);
    assert_eq!(studio.upscale().phase(), Phase::Idle);
}
