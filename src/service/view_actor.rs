use crate::error::ProjectError;
use crate::types::view::{ChatMessage, Sender, Theme, Transcript};

use ractor::{Actor, ActorProcessingErr, ActorRef, RpcReplyPort};
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tracing::{debug, info};
use uuid::Uuid;

/// Identifies one browser's view of the app.
pub type ViewId = Uuid;

/// How long a view survives without being touched; matches the view cookie's max age.
pub const VIEW_IDLE_TTL: Duration = Duration::from_secs(24 * 60 * 60);

const SWEEP_EVERY: Duration = Duration::from_secs(10 * 60);

/// Messages handled by the view-state actor.
#[derive(Debug)]
pub enum ViewStateMessage {
    GetTheme(ViewId, RpcReplyPort<Theme>),
    ToggleTheme(ViewId, RpcReplyPort<Theme>),
    SetTheme(ViewId, Theme, RpcReplyPort<Theme>),
    /// Append one message; replies with the stored entry.
    Append(ViewId, String, Sender, RpcReplyPort<ChatMessage>),
    Messages(ViewId, RpcReplyPort<Vec<ChatMessage>>),
    /// Discard the transcript; replies with how many entries were dropped.
    Clear(ViewId, RpcReplyPort<usize>),
    /// Drop views idle longer than the TTL; replies with how many were dropped.
    Sweep(Option<RpcReplyPort<usize>>),
}

#[derive(Debug)]
struct ViewState {
    theme: Theme,
    transcript: Transcript,
    touched: Instant,
}

impl ViewState {
    fn new() -> Self {
        Self {
            theme: Theme::default(),
            transcript: Transcript::default(),
            touched: Instant::now(),
        }
    }
}

/// Views by id, each stamped with its last use.
struct Views {
    views: HashMap<ViewId, ViewState>,
    idle_ttl: Duration,
}

impl Views {
    /// Existing view, refreshed.
    fn get(&mut self, view: &ViewId) -> Option<&mut ViewState> {
        let entry = self.views.get_mut(view)?;
        entry.touched = Instant::now();
        Some(entry)
    }

    /// Existing or new view, refreshed.
    fn entry(&mut self, view: ViewId) -> &mut ViewState {
        let entry = self.views.entry(view).or_insert_with(ViewState::new);
        entry.touched = Instant::now();
        entry
    }

    fn sweep(&mut self) -> usize {
        let before = self.views.len();
        let ttl = self.idle_ttl;
        self.views.retain(|_, v| v.touched.elapsed() < ttl);
        before - self.views.len()
    }
}

/// Handle for interacting with the view-state actor.
#[derive(Clone)]
pub struct ViewStateHandle {
    actor: ActorRef<ViewStateMessage>,
}

impl ViewStateHandle {
    pub async fn theme(&self, view: ViewId) -> Result<Theme, ProjectError> {
        ractor::call!(self.actor, ViewStateMessage::GetTheme, view)
            .map_err(|e| ProjectError::RactorError(format!("GetTheme RPC failed: {e}")))
    }

    pub async fn toggle_theme(&self, view: ViewId) -> Result<Theme, ProjectError> {
        ractor::call!(self.actor, ViewStateMessage::ToggleTheme, view)
            .map_err(|e| ProjectError::RactorError(format!("ToggleTheme RPC failed: {e}")))
    }

    pub async fn set_theme(&self, view: ViewId, theme: Theme) -> Result<Theme, ProjectError> {
        ractor::call!(self.actor, ViewStateMessage::SetTheme, view, theme)
            .map_err(|e| ProjectError::RactorError(format!("SetTheme RPC failed: {e}")))
    }

    pub async fn append(
        &self,
        view: ViewId,
        text: impl Into<String>,
        sender: Sender,
    ) -> Result<ChatMessage, ProjectError> {
        ractor::call!(self.actor, ViewStateMessage::Append, view, text.into(), sender)
            .map_err(|e| ProjectError::RactorError(format!("Append RPC failed: {e}")))
    }

    pub async fn messages(&self, view: ViewId) -> Result<Vec<ChatMessage>, ProjectError> {
        ractor::call!(self.actor, ViewStateMessage::Messages, view)
            .map_err(|e| ProjectError::RactorError(format!("Messages RPC failed: {e}")))
    }

    pub async fn clear(&self, view: ViewId) -> Result<usize, ProjectError> {
        ractor::call!(self.actor, ViewStateMessage::Clear, view)
            .map_err(|e| ProjectError::RactorError(format!("Clear RPC failed: {e}")))
    }

    /// Run an eviction pass now instead of waiting for the next tick.
    pub async fn sweep(&self) -> Result<usize, ProjectError> {
        ractor::call!(self.actor, |rp: RpcReplyPort<usize>| {
            ViewStateMessage::Sweep(Some(rp))
        })
            .map_err(|e| ProjectError::RactorError(format!("Sweep RPC failed: {e}")))
    }
}

/// Eviction timing for the view-state actor.
#[derive(Debug, Clone, Copy)]
pub struct ViewStateArgs {
    pub idle_ttl: Duration,
    pub sweep_every: Duration,
}

impl Default for ViewStateArgs {
    fn default() -> Self {
        Self {
            idle_ttl: VIEW_IDLE_TTL,
            sweep_every: SWEEP_EVERY,
        }
    }
}

struct ViewStateActor;

#[ractor::async_trait]
impl Actor for ViewStateActor {
    type Msg = ViewStateMessage;
    type State = Views;
    type Arguments = ViewStateArgs;

    async fn pre_start(
        &self,
        myself: ActorRef<Self::Msg>,
        args: Self::Arguments,
    ) -> Result<Self::State, ActorProcessingErr> {
        myself.send_interval(args.sweep_every, || ViewStateMessage::Sweep(None));
        info!(idle_ttl = ?args.idle_ttl, "ViewStateActor started");
        Ok(Views {
            views: HashMap::new(),
            idle_ttl: args.idle_ttl,
        })
    }

    async fn handle(
        &self,
        _myself: ActorRef<Self::Msg>,
        message: Self::Msg,
        state: &mut Self::State,
    ) -> Result<(), ActorProcessingErr> {
        match message {
            ViewStateMessage::GetTheme(view, rp) => {
                let theme = state.get(&view).map(|v| v.theme).unwrap_or_default();
                let _ = rp.send(theme);
            }
            ViewStateMessage::ToggleTheme(view, rp) => {
                let entry = state.entry(view);
                entry.theme = entry.theme.toggled();
                debug!(%view, theme = ?entry.theme, "theme toggled");
                let _ = rp.send(entry.theme);
            }
            ViewStateMessage::SetTheme(view, theme, rp) => {
                state.entry(view).theme = theme;
                let _ = rp.send(theme);
            }
            ViewStateMessage::Append(view, text, sender, rp) => {
                let message = state.entry(view).transcript.push(text, sender);
                let _ = rp.send(message);
            }
            ViewStateMessage::Messages(view, rp) => {
                let messages = state
                    .get(&view)
                    .map(|v| v.transcript.messages().to_vec())
                    .unwrap_or_default();
                let _ = rp.send(messages);
            }
            ViewStateMessage::Clear(view, rp) => {
                let dropped = match state.get(&view) {
                    Some(v) => {
                        let n = v.transcript.len();
                        v.transcript.clear();
                        n
                    }
                    None => 0,
                };
                debug!(%view, dropped, "transcript cleared");
                let _ = rp.send(dropped);
            }
            ViewStateMessage::Sweep(rp) => {
                let dropped = state.sweep();
                if dropped > 0 {
                    debug!(dropped, remaining = state.views.len(), "idle views evicted");
                }
                if let Some(rp) = rp {
                    let _ = rp.send(dropped);
                }
            }
        }
        Ok(())
    }
}

/// Async spawn of the view-state actor and return a handle.
pub async fn spawn() -> Result<ViewStateHandle, ProjectError> {
    spawn_with(ViewStateArgs::default()).await
}

pub async fn spawn_with(args: ViewStateArgs) -> Result<ViewStateHandle, ProjectError> {
    let (actor, _jh) = Actor::spawn(None, ViewStateActor, args)
        .await
        .map_err(|e| ProjectError::RactorError(format!("failed to spawn ViewStateActor: {e}")))?;
    Ok(ViewStateHandle { actor })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn theme_is_per_view_and_toggles_back() {
        let handle = spawn().await.unwrap();
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();

        assert_eq!(handle.theme(a).await.unwrap(), Theme::Light);
        assert_eq!(handle.toggle_theme(a).await.unwrap(), Theme::Dark);
        assert_eq!(handle.theme(b).await.unwrap(), Theme::Light);
        assert_eq!(handle.toggle_theme(a).await.unwrap(), Theme::Light);
        assert_eq!(handle.set_theme(b, Theme::Dark).await.unwrap(), Theme::Dark);
        assert_eq!(handle.theme(b).await.unwrap(), Theme::Dark);
    }

    #[tokio::test]
    async fn transcript_appends_in_order_and_clears() {
        let handle = spawn().await.unwrap();
        let view = Uuid::new_v4();

        handle.append(view, "hello", Sender::User).await.unwrap();
        handle.append(view, "hi there", Sender::Bot).await.unwrap();
        let messages = handle.messages(view).await.unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].sender, Sender::User);
        assert_eq!(messages[1].text, "hi there");

        assert_eq!(handle.clear(view).await.unwrap(), 2);
        assert!(handle.messages(view).await.unwrap().is_empty());
        assert_eq!(handle.clear(Uuid::new_v4()).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn idle_views_are_swept_and_touched_ones_kept() {
        let handle = spawn_with(ViewStateArgs {
            idle_ttl: Duration::from_millis(50),
            sweep_every: Duration::from_secs(3600),
        })
        .await
        .unwrap();
        let stale = Uuid::new_v4();
        let fresh = Uuid::new_v4();

        handle.toggle_theme(stale).await.unwrap();
        handle.append(fresh, "hello", Sender::User).await.unwrap();
        tokio::time::sleep(Duration::from_millis(80)).await;
        assert_eq!(handle.messages(fresh).await.unwrap().len(), 1);

        assert_eq!(handle.sweep().await.unwrap(), 1);
        assert_eq!(handle.theme(stale).await.unwrap(), Theme::Light);
        assert_eq!(handle.messages(fresh).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn reads_of_unknown_views_store_nothing() {
        let handle = spawn_with(ViewStateArgs {
            idle_ttl: Duration::ZERO,
            sweep_every: Duration::from_secs(3600),
        })
        .await
        .unwrap();

        handle.theme(Uuid::new_v4()).await.unwrap();
        handle.messages(Uuid::new_v4()).await.unwrap();
        assert_eq!(handle.sweep().await.unwrap(), 0);

        handle.set_theme(Uuid::new_v4(), Theme::Dark).await.unwrap();
        assert_eq!(handle.sweep().await.unwrap(), 1);
    }
}
