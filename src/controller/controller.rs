//! The session turn-taking controller.
//!
//! A single-flow state machine that owns the conversational cursor: it arms
//! and disarms the capture unit, forwards results to the Remote Turn Service
//! in order, and drives playback of synthesized speech. Intents that arrive
//! while the machine cannot accept them are ignored or answered with a
//! notification, never queued. Reset bumps a session epoch; any in-flight
//! completion that observes a stale epoch is discarded silently, so late
//! responses from a discarded session can never corrupt the machine.

use crate::audio::{AudioClip, CaptureUnit, SpeechPlayer};
use crate::controller::events::{PresentationSink, Severity};
use crate::controller::state::{ControllerState, InputMode, StatusKind};
use crate::error::ClientError;
use crate::service::{TurnReply, TurnService};
use crate::session::{Profile, Session, SessionId, Turn};
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// User intents accepted from the presentation layer
#[derive(Debug, Clone)]
pub enum UserIntent {
    StartInterview { profile: Profile, stack: String },
    ToggleRecord,
    SubmitCode(String),
    RequestEvaluation,
    ResetSession,
    SwitchInputMode(InputMode),
}

#[derive(Default)]
struct Inner {
    state: ControllerState,
    session: Option<Session>,
    input_mode: InputMode,

    /// Bumped on every reset; pipeline completions carrying an older epoch
    /// are discarded on arrival.
    epoch: u64,

    /// The in-flight turn pipeline (transcribe/advance/synthesize/play)
    pipeline: Option<JoinHandle<()>>,

    /// The in-flight evaluation call, tracked separately so a reset can
    /// abort it without touching a concurrent playback pipeline.
    evaluation: Option<JoinHandle<()>>,

    /// State to restore when an evaluation resolves
    resume_after_eval: ControllerState,
}

/// The turn-taking state machine (see module docs).
///
/// Cheap to clone; all clones share the same session state.
#[derive(Clone)]
pub struct TurnController {
    service: Arc<dyn TurnService>,
    capture: Arc<Mutex<Box<dyn CaptureUnit>>>,
    player: Arc<dyn SpeechPlayer>,
    sink: Arc<dyn PresentationSink>,
    inner: Arc<Mutex<Inner>>,
}

impl TurnController {
    pub fn new(
        service: Arc<dyn TurnService>,
        capture: Box<dyn CaptureUnit>,
        player: Arc<dyn SpeechPlayer>,
        sink: Arc<dyn PresentationSink>,
    ) -> Self {
        Self {
            service,
            capture: Arc::new(Mutex::new(capture)),
            player,
            sink,
            inner: Arc::new(Mutex::new(Inner::default())),
        }
    }

    pub async fn state(&self) -> ControllerState {
        self.inner.lock().await.state
    }

    pub async fn session_id(&self) -> Option<SessionId> {
        self.inner.lock().await.session.as_ref().map(|s| s.id.clone())
    }

    pub async fn input_mode(&self) -> InputMode {
        self.inner.lock().await.input_mode
    }

    pub async fn dispatch(&self, intent: UserIntent) {
        match intent {
            UserIntent::StartInterview { profile, stack } => {
                self.start_interview(profile, stack).await
            }
            UserIntent::ToggleRecord => self.toggle_record().await,
            UserIntent::SubmitCode(code) => self.submit_code(code).await,
            UserIntent::RequestEvaluation => self.request_evaluation().await,
            UserIntent::ResetSession => self.reset_session().await,
            UserIntent::SwitchInputMode(mode) => self.switch_input_mode(mode).await,
        }
    }

    /// Begin a new interview: Idle -> Thinking, then deliver the backend's
    /// opening reply like any other assistant turn.
    pub async fn start_interview(&self, profile: Profile, stack: String) {
        let epoch = {
            let mut inner = self.inner.lock().await;
            if inner.state != ControllerState::Idle || inner.session.is_some() {
                debug!("start-interview ignored in state {:?}", inner.state);
                self.sink
                    .notify("an interview is already in progress", Severity::Warning);
                return;
            }
            self.set_state(&mut inner, ControllerState::Thinking);
            inner.epoch
        };

        let ctrl = self.clone();
        let handle = tokio::spawn(async move {
            match ctrl.service.start_session(profile, &stack).await {
                Ok(start) => {
                    {
                        let mut inner = ctrl.inner.lock().await;
                        if inner.epoch != epoch {
                            debug!("discarding start response from a reset session");
                            return;
                        }
                        info!("interview started, session {}", start.session_id);
                        inner.session = Some(Session::new(start.session_id, profile, stack));
                    }
                    ctrl.deliver_reply(start.reply, epoch).await;
                }
                Err(e) => {
                    ctrl.fail(
                        epoch,
                        format!("failed to start interview: {}", e),
                        Severity::Error,
                        true,
                    )
                    .await;
                }
            }
        });
        self.store_pipeline(handle).await;
    }

    /// Arm the capture unit from Idle, or disarm it from Recording and run
    /// the voice turn pipeline on the resulting clip. Any other state is a
    /// no-op.
    pub async fn toggle_record(&self) {
        let mut inner = self.inner.lock().await;
        match inner.state {
            ControllerState::Idle => {
                if inner.session.is_none() {
                    self.sink
                        .notify("start an interview before recording", Severity::Warning);
                    return;
                }
                let armed = {
                    let mut capture = self.capture.lock().await;
                    capture.arm().await
                };
                match armed {
                    Ok(()) => {
                        self.set_state(&mut inner, ControllerState::Recording);
                    }
                    Err(e @ ClientError::PermissionDenied)
                    | Err(e @ ClientError::DeviceUnavailable) => {
                        error!("cannot arm capture: {}", e);
                        self.sink.notify(
                            &format!("could not access microphone: {}", e),
                            Severity::Error,
                        );
                    }
                    Err(e) => {
                        error!("cannot arm capture: {}", e);
                        self.sink
                            .notify(&format!("could not start recording: {}", e), Severity::Error);
                    }
                }
            }
            ControllerState::Recording => {
                let disarmed = {
                    let mut capture = self.capture.lock().await;
                    capture.disarm().await
                };
                match disarmed {
                    Ok(clip) => {
                        self.set_state(&mut inner, ControllerState::Transcribing);
                        let epoch = inner.epoch;
                        let ctrl = self.clone();
                        let handle =
                            tokio::spawn(async move { ctrl.run_voice_turn(clip, epoch).await });
                        Self::replace_pipeline(&mut inner, handle);
                    }
                    Err(e) => {
                        error!("cannot disarm capture: {}", e);
                        self.set_state(&mut inner, ControllerState::Idle);
                        self.sink
                            .notify(&format!("could not stop recording: {}", e), Severity::Error);
                    }
                }
            }
            other => {
                debug!("toggle-record ignored in state {:?}", other);
            }
        }
    }

    /// Submit typed code as a user turn: Idle -> Thinking
    pub async fn submit_code(&self, code: String) {
        let code = code.trim().to_string();
        if code.is_empty() {
            self.sink
                .notify("type some code before submitting", Severity::Warning);
            return;
        }

        let mut inner = self.inner.lock().await;
        if inner.state != ControllerState::Idle {
            debug!("submit-code ignored in state {:?}", inner.state);
            self.sink
                .notify("still processing the previous turn", Severity::Warning);
            return;
        }
        let session_id = match &inner.session {
            Some(session) => session.id.clone(),
            None => {
                self.sink
                    .notify("start an interview before submitting code", Severity::Warning);
                return;
            }
        };

        self.sink.turn_rendered(&Turn::user_code(&code));
        self.set_state(&mut inner, ControllerState::Thinking);
        let epoch = inner.epoch;
        let ctrl = self.clone();
        let handle =
            tokio::spawn(async move { ctrl.run_advance(session_id, code, true, epoch).await });
        Self::replace_pipeline(&mut inner, handle);
    }

    /// Request the final evaluation report.
    ///
    /// Accepted only while no Remote Turn Service call is outstanding (Idle
    /// or Speaking): evaluation reads accumulated state without moving the
    /// conversational cursor, but remote calls for one session are strictly
    /// serialized. Always rejected while Recording.
    pub async fn request_evaluation(&self) {
        let mut inner = self.inner.lock().await;
        let session_id = match &inner.session {
            Some(session) => session.id.clone(),
            None => {
                self.sink
                    .notify("no active interview to evaluate", Severity::Warning);
                return;
            }
        };

        match inner.state {
            ControllerState::Recording => {
                self.sink.notify(
                    "stop recording before requesting an evaluation",
                    Severity::Warning,
                );
            }
            state if state.has_outstanding_call() => {
                self.sink.notify(
                    "evaluation is unavailable while a turn is being processed",
                    Severity::Warning,
                );
            }
            prior => {
                inner.resume_after_eval = prior;
                self.set_state(&mut inner, ControllerState::Evaluating);
                let epoch = inner.epoch;
                let ctrl = self.clone();
                let handle =
                    tokio::spawn(async move { ctrl.run_evaluation(session_id, epoch).await });
                if let Some(prev) = inner.evaluation.take() {
                    prev.abort();
                }
                inner.evaluation = Some(handle);
            }
        }
    }

    /// Discard the session and return to Idle.
    ///
    /// Abrupt: in-flight pipeline and evaluation tasks are aborted, an armed
    /// capture unit is disarmed so the microphone is released, and the epoch
    /// is bumped so any response that still lands is filtered out.
    pub async fn reset_session(&self) {
        let mut inner = self.inner.lock().await;
        inner.epoch += 1;
        if let Some(task) = inner.pipeline.take() {
            task.abort();
        }
        if let Some(task) = inner.evaluation.take() {
            task.abort();
        }

        {
            let mut capture = self.capture.lock().await;
            if capture.is_armed() {
                // Clip discarded; only the device release matters here.
                if let Err(e) = capture.disarm().await {
                    warn!("failed to release capture on reset: {}", e);
                }
            }
        }

        inner.session = None;
        inner.resume_after_eval = ControllerState::Idle;
        self.set_state(&mut inner, ControllerState::Idle);
        self.sink.transcript_cleared();
        info!("session reset");
    }

    /// Switch between the voice and code input surfaces
    pub async fn switch_input_mode(&self, mode: InputMode) {
        let mut inner = self.inner.lock().await;
        if inner.state == ControllerState::Recording && mode == InputMode::Code {
            self.sink.notify(
                "stop recording before switching to code input",
                Severity::Warning,
            );
            return;
        }
        if inner.input_mode != mode {
            debug!("input mode: {:?} -> {:?}", inner.input_mode, mode);
            inner.input_mode = mode;
        }
    }

    // ------------------------------------------------------------------
    // Pipeline stages (run on spawned tasks, epoch-guarded at every step)
    // ------------------------------------------------------------------

    /// Transcribing -> Thinking on non-empty text, or back to Idle on an
    /// empty transcription (a recognized outcome, not an error).
    async fn run_voice_turn(self, clip: AudioClip, epoch: u64) {
        let session_id = match self.current_session(epoch).await {
            Some(id) => id,
            None => return,
        };

        match self.service.transcribe(&session_id, clip).await {
            Ok(text) if text.trim().is_empty() => {
                let mut inner = self.inner.lock().await;
                if inner.epoch != epoch {
                    return;
                }
                self.set_state(&mut inner, ControllerState::Idle);
                self.sink.notify("no speech detected", Severity::Warning);
            }
            Ok(text) => {
                let text = text.trim().to_string();
                {
                    let mut inner = self.inner.lock().await;
                    if inner.epoch != epoch {
                        debug!("discarding transcription from a reset session");
                        return;
                    }
                    self.sink.turn_rendered(&Turn::user_speech(&text));
                    self.set_state(&mut inner, ControllerState::Thinking);
                }
                self.run_advance(session_id, text, false, epoch).await;
            }
            Err(e) => {
                self.fail(
                    epoch,
                    format!("transcription failed: {}", e),
                    Severity::Error,
                    false,
                )
                .await;
            }
        }
    }

    /// Thinking -> (Synthesizing -> Speaking ->) Idle
    async fn run_advance(self, session_id: SessionId, text: String, is_code: bool, epoch: u64) {
        match self.service.advance_turn(&session_id, &text, is_code).await {
            Ok(reply) => self.deliver_reply(reply, epoch).await,
            Err(e) => {
                self.fail(
                    epoch,
                    format!("failed to send message: {}", e),
                    Severity::Error,
                    false,
                )
                .await;
            }
        }
    }

    /// Render the assistant turn, then synthesize and play it. A synthesis
    /// failure degrades to text-only: the turn stays rendered, only the
    /// audio is skipped.
    async fn deliver_reply(&self, reply: TurnReply, epoch: u64) {
        let turn = Turn::assistant(reply.spoken_text.clone(), reply.code_block);
        {
            let inner = self.inner.lock().await;
            if inner.epoch != epoch {
                debug!("discarding assistant reply from a reset session");
                return;
            }
            self.sink.turn_rendered(&turn);
        }

        let text = match reply.spoken_text {
            Some(text) => text,
            None => {
                // Code-only reply, nothing to speak.
                self.finish_turn(epoch).await;
                return;
            }
        };

        let session_id = match self.current_session(epoch).await {
            Some(id) => id,
            None => return,
        };

        if !self.transition(epoch, ControllerState::Synthesizing).await {
            return;
        }
        match self.service.synthesize_speech(&session_id, &text).await {
            Ok(clip) => {
                if !self.transition(epoch, ControllerState::Speaking).await {
                    return;
                }
                if let Err(e) = self.player.play(clip).await {
                    warn!("playback failed: {}", e);
                    self.sink
                        .notify(&format!("audio playback failed: {}", e), Severity::Warning);
                }
                self.finish_speaking(epoch).await;
            }
            Err(e) => {
                self.fail(
                    epoch,
                    format!("speech synthesis failed, continuing without audio: {}", e),
                    Severity::Warning,
                    false,
                )
                .await;
            }
        }
    }

    async fn run_evaluation(self, session_id: SessionId, epoch: u64) {
        match self.service.evaluate(&session_id).await {
            Ok(report) => {
                {
                    let mut inner = self.inner.lock().await;
                    if inner.epoch != epoch {
                        debug!("discarding evaluation from a reset session");
                        return;
                    }
                    let resume = inner.resume_after_eval;
                    if inner.state == ControllerState::Evaluating {
                        self.set_state(&mut inner, resume);
                    }
                }
                self.sink.evaluation_ready(&report);
            }
            Err(e) => {
                self.fail(
                    epoch,
                    format!("evaluation failed: {}", e),
                    Severity::Error,
                    false,
                )
                .await;
            }
        }
    }

    // ------------------------------------------------------------------
    // Shared transition helpers
    // ------------------------------------------------------------------

    /// Apply a state change and emit the status event. Callers hold the lock.
    fn set_state(&self, inner: &mut Inner, next: ControllerState) {
        let prev = inner.state;
        inner.state = next;
        if prev != next {
            info!("controller state: {:?} -> {:?}", prev, next);
        }
        self.sink
            .status_changed(next, next.status(inner.session.is_some()));
    }

    /// Epoch-guarded state change from a pipeline task; false means the
    /// session was reset and the pipeline must stop.
    async fn transition(&self, epoch: u64, next: ControllerState) -> bool {
        let mut inner = self.inner.lock().await;
        if inner.epoch != epoch {
            debug!("skipping transition to {:?} after reset", next);
            return false;
        }
        self.set_state(&mut inner, next);
        true
    }

    /// End the turn back at Idle
    async fn finish_turn(&self, epoch: u64) {
        self.transition(epoch, ControllerState::Idle).await;
    }

    /// Playback completed. Normally Speaking -> Idle; if an evaluation is
    /// running concurrently, collapse its resume target to Idle instead.
    async fn finish_speaking(&self, epoch: u64) {
        let mut inner = self.inner.lock().await;
        if inner.epoch != epoch {
            return;
        }
        if inner.state == ControllerState::Speaking {
            self.set_state(&mut inner, ControllerState::Idle);
        } else if inner.state == ControllerState::Evaluating
            && inner.resume_after_eval == ControllerState::Speaking
        {
            inner.resume_after_eval = ControllerState::Idle;
        }
    }

    /// Remote-call failure: notify the user and return the machine to Idle.
    /// No automatic retry; a failed call needs a new user-initiated action.
    async fn fail(&self, epoch: u64, message: String, severity: Severity, error_status: bool) {
        let mut inner = self.inner.lock().await;
        if inner.epoch != epoch {
            debug!("discarding stale failure: {}", message);
            return;
        }
        match severity {
            Severity::Error => error!("{}", message),
            _ => warn!("{}", message),
        }
        if error_status {
            let prev = inner.state;
            inner.state = ControllerState::Idle;
            if prev != ControllerState::Idle {
                info!("controller state: {:?} -> Idle", prev);
            }
            self.sink
                .status_changed(ControllerState::Idle, StatusKind::Error);
        } else {
            self.set_state(&mut inner, ControllerState::Idle);
        }
        self.sink.notify(&message, severity);
    }

    async fn current_session(&self, epoch: u64) -> Option<SessionId> {
        let inner = self.inner.lock().await;
        if inner.epoch != epoch {
            return None;
        }
        inner.session.as_ref().map(|s| s.id.clone())
    }

    async fn store_pipeline(&self, handle: JoinHandle<()>) {
        let mut inner = self.inner.lock().await;
        Self::replace_pipeline(&mut inner, handle);
    }

    fn replace_pipeline(inner: &mut Inner, handle: JoinHandle<()>) {
        if let Some(prev) = inner.pipeline.take() {
            prev.abort();
        }
        inner.pipeline = Some(handle);
    }
}
