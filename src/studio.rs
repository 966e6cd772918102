//! The single store that owns the router and every controller.
//!
//! [`Studio::update`] is the only way state changes. It returns the adapter
//! call a message asks for, if any, as an [`Effect`]; running the effect
//! yields the [`Msg`] that settles it.

use crate::client::{ChatSession, Role, StudioClient};
use crate::controller::{
    AnalyzeController, AnalyzeJob, ChatController, ChatJob, EditController, EditJob,
    FeatureResult, GenerateController, UpscaleController, UpscaleJob,
};
use crate::error::Result;
use crate::image::{
    AnalysisRequest, AspectRatio, EditRequest, GenerationRequest, ImageReference, ImageSize,
    Intensity, UpscaleRequest,
};
use crate::media::SelectedFile;
use crate::router::{Mode, ModeRouter};

/// Inputs to the upscale view.
#[derive(Debug, Clone)]
pub enum UpscaleMsg {
    /// A new source image was picked.
    SelectFile(SelectedFile),
    /// The intensity slider moved.
    SetIntensity(Intensity),
    /// The upscale button was pressed.
    Run,
}

/// Inputs to the chat view.
#[derive(Debug, Clone)]
pub enum ChatMsg {
    /// The composed text changed.
    SetInput(String),
    /// The send button was pressed.
    Send,
    /// The chat view was torn down.
    Close,
}

/// Inputs to the analysis view.
#[derive(Debug, Clone)]
pub enum AnalyzeMsg {
    /// A new image was picked.
    SelectFile(SelectedFile),
    /// The question changed.
    SetPrompt(String),
    /// The analyze button was pressed.
    Run,
}

/// Inputs to the generation view.
#[derive(Debug, Clone)]
pub enum GenerateMsg {
    /// The prompt changed.
    SetPrompt(String),
    /// A ratio was chosen.
    SetAspectRatio(AspectRatio),
    /// A resolution was chosen.
    SetImageSize(ImageSize),
    /// The generate button was pressed.
    Run,
}

/// Inputs to the edit view.
#[derive(Debug, Clone)]
pub enum EditMsg {
    /// A new image was picked.
    SelectFile(SelectedFile),
    /// The instruction changed.
    SetInstruction(String),
    /// The edit button was pressed.
    Run,
}

/// Outcome of one effect.
#[derive(Debug)]
#[allow(missing_docs)]
pub enum Completion {
    /// A chat session was constructed.
    ChatOpened(ChatSession),
    /// A chat turn settled; the session comes back with it.
    Chat {
        session: ChatSession,
        epoch: u64,
        outcome: Result<String>,
    },
    Upscale(Result<ImageReference>),
    Analyze(Result<String>),
    Generate(Result<ImageReference>),
    Edit(Result<ImageReference>),
}

/// Everything that can happen to the studio.
#[derive(Debug)]
#[allow(missing_docs)]
pub enum Msg {
    /// The user picked a mode in the navigation.
    SelectMode(Mode),
    Upscale(UpscaleMsg),
    Chat(ChatMsg),
    Analyze(AnalyzeMsg),
    Generate(GenerateMsg),
    Edit(EditMsg),
    Completed(Completion),
}

/// One pending adapter call.
#[derive(Debug)]
#[must_use = "effects do nothing unless run"]
#[allow(missing_docs)]
pub enum Effect {
    /// Construct the chat session for this activation.
    OpenChat,
    Chat(ChatJob),
    Upscale(UpscaleJob),
    Analyze(AnalyzeJob),
    Generate(GenerationRequest),
    Edit(EditJob),
}

impl Effect {
    /// Performs the call and returns the message that settles it.
    pub async fn run<C: StudioClient + ?Sized>(self, client: &C) -> Msg {
        let completion = match self {
            Effect::OpenChat => Completion::ChatOpened(client.open_chat_session()),
            Effect::Chat(mut job) => {
                let outcome = client.send_chat_turn(&mut job.session, &job.text).await;
                Completion::Chat {
                    session: job.session,
                    epoch: job.epoch,
                    outcome,
                }
            }
            Effect::Upscale(job) => Completion::Upscale(upscale(client, job).await),
            Effect::Analyze(job) => Completion::Analyze(analyze(client, job).await),
            Effect::Generate(request) => Completion::Generate(client.generate(&request).await),
            Effect::Edit(job) => Completion::Edit(edit(client, job).await),
        };
        Msg::Completed(completion)
    }
}

async fn upscale<C: StudioClient + ?Sized>(client: &C, job: UpscaleJob) -> Result<ImageReference> {
    let source = client.encode_media(&job.file).await?;
    client
        .upscale(&UpscaleRequest {
            source,
            intensity: job.intensity,
        })
        .await
}

async fn analyze<C: StudioClient + ?Sized>(client: &C, job: AnalyzeJob) -> Result<String> {
    let source = client.encode_media(&job.file).await?;
    client
        .analyze(&AnalysisRequest {
            source,
            prompt: job.prompt,
        })
        .await
}

async fn edit<C: StudioClient + ?Sized>(client: &C, job: EditJob) -> Result<ImageReference> {
    let source = client.encode_media(&job.file).await?;
    client
        .edit(&EditRequest {
            source,
            instruction: job.instruction,
        })
        .await
}

/// Router plus the five feature controllers.
///
/// Controllers live as long as the studio, so switching modes never
/// resets them.
#[derive(Debug, Default)]
pub struct Studio {
    router: ModeRouter,
    upscale: UpscaleController,
    chat: ChatController,
    analyze: AnalyzeController,
    generate: GenerateController,
    edit: EditController,
}

impl Studio {
    /// Creates a studio showing the default mode.
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies a message and returns the adapter call it asks for, if any.
    pub fn update(&mut self, msg: Msg) -> Option<Effect> {
        match msg {
            Msg::SelectMode(mode) => {
                let previous = self.router.select(mode);
                tracing::debug!(from = %previous, to = %mode, "mode switched");
                (mode == Mode::Chat && !self.chat.is_open()).then_some(Effect::OpenChat)
            }
            Msg::Upscale(msg) => match msg {
                UpscaleMsg::SelectFile(file) => {
                    self.upscale.select_file(file);
                    None
                }
                UpscaleMsg::SetIntensity(intensity) => {
                    self.upscale.set_intensity(intensity);
                    None
                }
                UpscaleMsg::Run => self.upscale.trigger().map(Effect::Upscale),
            },
            Msg::Chat(msg) => match msg {
                ChatMsg::SetInput(text) => {
                    self.chat.set_input(text);
                    None
                }
                ChatMsg::Send => self.chat.trigger().map(Effect::Chat),
                ChatMsg::Close => {
                    self.chat.close();
                    None
                }
            },
            Msg::Analyze(msg) => match msg {
                AnalyzeMsg::SelectFile(file) => {
                    self.analyze.select_file(file);
                    None
                }
                AnalyzeMsg::SetPrompt(prompt) => {
                    self.analyze.set_prompt(prompt);
                    None
                }
                AnalyzeMsg::Run => self.analyze.trigger().map(Effect::Analyze),
            },
            Msg::Generate(msg) => match msg {
                GenerateMsg::SetPrompt(prompt) => {
                    self.generate.set_prompt(prompt);
                    None
                }
                GenerateMsg::SetAspectRatio(ratio) => {
                    self.generate.set_aspect_ratio(ratio);
                    None
                }
                GenerateMsg::SetImageSize(size) => {
                    self.generate.set_image_size(size);
                    None
                }
                GenerateMsg::Run => self.generate.trigger().map(Effect::Generate),
            },
            Msg::Edit(msg) => match msg {
                EditMsg::SelectFile(file) => {
                    self.edit.select_file(file);
                    None
                }
                EditMsg::SetInstruction(instruction) => {
                    self.edit.set_instruction(instruction);
                    None
                }
                EditMsg::Run => self.edit.trigger().map(Effect::Edit),
            },
            Msg::Completed(completion) => {
                self.complete(completion);
                None
            }
        }
    }

    // Completions land on their own controller even when it is not visible.
    fn complete(&mut self, completion: Completion) {
        match completion {
            Completion::ChatOpened(session) => self.chat.open(session),
            Completion::Chat {
                session,
                epoch,
                outcome,
            } => self.chat.settle(session, epoch, outcome),
            Completion::Upscale(outcome) => self.upscale.settle(outcome),
            Completion::Analyze(outcome) => self.analyze.settle(outcome),
            Completion::Generate(outcome) => self.generate.settle(outcome),
            Completion::Edit(outcome) => self.edit.settle(outcome),
        }
    }

    /// Applies `msg`, then runs every effect it leads to until none remain.
    pub async fn dispatch<C: StudioClient + ?Sized>(&mut self, client: &C, msg: Msg) {
        let mut next = self.update(msg);
        while let Some(effect) = next {
            let msg = effect.run(client).await;
            next = self.update(msg);
        }
    }

    /// Currently visible mode.
    pub fn mode(&self) -> Mode {
        self.router.current()
    }

    /// What `mode`'s controller currently holds.
    ///
    /// For chat this is the latest model turn.
    pub fn result(&self, mode: Mode) -> Option<FeatureResult<'_>> {
        match mode {
            Mode::Upscale => self.upscale.slot().result().map(FeatureResult::Image),
            Mode::Chat => self
                .chat
                .messages()
                .iter()
                .rev()
                .find(|m| m.role == Role::Model)
                .map(|m| FeatureResult::Text(&m.text)),
            Mode::Analyze => self
                .analyze
                .slot()
                .result()
                .map(|text| FeatureResult::Text(text)),
            Mode::Generate => self.generate.slot().result().map(FeatureResult::Image),
            Mode::Edit => self.edit.slot().result().map(FeatureResult::Image),
        }
    }

    /// Upscale view state.
    pub fn upscale(&self) -> &UpscaleController {
        &self.upscale
    }

    /// Chat view state.
    pub fn chat(&self) -> &ChatController {
        &self.chat
    }

    /// Analysis view state.
    pub fn analyze(&self) -> &AnalyzeController {
        &self.analyze
    }

    /// Generation view state.
    pub fn generate(&self) -> &GenerateController {
        &self.generate
    }

    /// Edit view state.
    pub fn edit(&self) -> &EditController {
        &self.edit
    }
}
