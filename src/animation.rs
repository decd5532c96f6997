use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

/// Step interval of the typewriter reveal.
pub const TYPE_INTERVAL: Duration = Duration::from_millis(66);
/// Total duration of the rainbow effect.
pub const RAINBOW_DURATION: Duration = Duration::from_millis(2000);
/// Total duration of the zoom effect.
pub const ZOOM_DURATION: Duration = Duration::from_millis(500);

/// Single-resolution completion signal returned by every `start_*` call.
///
/// Resolution is sticky: once done it stays done, and resolving twice is a
/// no-op. Callers poll it (or park on it in their own scheduler); there is no
/// callback chain to keep alive.
#[derive(Clone)]
pub struct Completion(Arc<AtomicBool>);

impl Completion {
    fn new() -> Self {
        Self(Arc::new(AtomicBool::new(false)))
    }

    /// A completion that is already done.
    pub(crate) fn resolved() -> Self {
        Self(Arc::new(AtomicBool::new(true)))
    }

    pub fn is_done(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }

    fn resolve(&self) {
        self.0.store(true, Ordering::Relaxed);
    }
}

/// Cancellation token checked before any timed step mutates state.
///
/// Starting a new animation cancels the token of the previous one, so a tick
/// that races a state change in the same frame can never apply a stale step.
#[derive(Clone)]
struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    fn new() -> Self {
        Self(Arc::new(AtomicBool::new(false)))
    }

    fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Which animation currently occupies the skin's single slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AnimationKind {
    Idle,
    Typing,
    Rainbow,
    Zooming,
}

enum Phase {
    Idle,
    Typing {
        revealed: usize,
        total: usize,
        next_step: Duration,
        token: CancelToken,
    },
    Rainbow {
        started: Duration,
        token: CancelToken,
    },
    Zooming {
        started: Duration,
        token: CancelToken,
    },
}

/// Invalidation produced by an animation tick.
///
/// `content` means the line-break table must be rebuilt (revealed text or
/// font size changed); `style` means pixels only.
#[derive(Clone, Copy, Debug, Default)]
pub struct Invalidation {
    pub content: bool,
    pub style: bool,
}

impl Invalidation {
    pub fn any(&self) -> bool {
        self.content || self.style
    }
}

/// Per-skin animation sequencer.
///
/// All three animation kinds share one slot: entering any non-idle state
/// first cancels and synchronously resolves whatever was running. Timing is
/// driven entirely by the host's per-frame tick against the injected clock;
/// nothing here owns a thread or timer.
pub struct AnimationState {
    phase: Phase,
    pending: Option<Completion>,
}

impl AnimationState {
    pub fn new() -> Self {
        Self {
            phase: Phase::Idle,
            pending: None,
        }
    }

    pub fn kind(&self) -> AnimationKind {
        match self.phase {
            Phase::Idle => AnimationKind::Idle,
            Phase::Typing { .. } => AnimationKind::Typing,
            Phase::Rainbow { .. } => AnimationKind::Rainbow,
            Phase::Zooming { .. } => AnimationKind::Zooming,
        }
    }

    /// Rainbow and zoom change output every frame purely from elapsed time.
    pub fn is_continuous(&self) -> bool {
        matches!(self.phase, Phase::Rainbow { .. } | Phase::Zooming { .. })
    }

    /// Number of characters the typewriter has revealed so far, when typing.
    pub fn visible_chars(&self) -> Option<usize> {
        match self.phase {
            Phase::Typing { revealed, .. } => Some(revealed),
            _ => None,
        }
    }

    /// Zoom ramp in `[0, 1]`, when zooming.
    ///
    /// Elapsed time is measured from the timestamp captured at start; if the
    /// clock had already advanced past that instant when the first frame is
    /// queried, the ramp starts visibly above zero.
    pub fn zoom_progress(&self, now: Duration) -> Option<f32> {
        match self.phase {
            Phase::Zooming { started, .. } => {
                let elapsed = now.saturating_sub(started).as_secs_f32();
                Some((elapsed / ZOOM_DURATION.as_secs_f32()).clamp(0.0, 1.0))
            }
            _ => None,
        }
    }

    /// Gradient phase of the rainbow effect, when active.
    pub fn rainbow_phase(&self, now: Duration) -> Option<f32> {
        match self.phase {
            Phase::Rainbow { started, .. } => {
                let elapsed = now.saturating_sub(started).as_secs_f32();
                Some(elapsed / RAINBOW_DURATION.as_secs_f32())
            }
            _ => None,
        }
    }

    /// Starts the typewriter reveal over `total` characters.
    pub fn start_typing(&mut self, total: usize, now: Duration) -> Completion {
        self.cancel();
        let completion = Completion::new();

        if total == 0 {
            // Nothing to reveal; resolve in the same call.
            completion.resolve();
            return completion;
        }

        self.phase = Phase::Typing {
            revealed: 0,
            total,
            next_step: now + TYPE_INTERVAL,
            token: CancelToken::new(),
        };
        self.pending = Some(completion.clone());
        completion
    }

    pub fn start_rainbow(&mut self, now: Duration) -> Completion {
        self.cancel();
        let completion = Completion::new();
        self.phase = Phase::Rainbow {
            started: now,
            token: CancelToken::new(),
        };
        self.pending = Some(completion.clone());
        completion
    }

    pub fn start_zoom(&mut self, now: Duration) -> Completion {
        self.cancel();
        let completion = Completion::new();
        self.phase = Phase::Zooming {
            started: now,
            token: CancelToken::new(),
        };
        self.pending = Some(completion.clone());
        completion
    }

    /// Cancels whatever is running, resolving its completion synchronously.
    ///
    /// Returns `true` if an animation was actually cancelled, in which case
    /// the caller must force one invalidation so the skin settles into a
    /// valid steady-state display.
    pub fn cancel(&mut self) -> bool {
        let token = match &self.phase {
            Phase::Idle => None,
            Phase::Typing { token, .. }
            | Phase::Rainbow { token, .. }
            | Phase::Zooming { token, .. } => Some(token.clone()),
        };

        if let Some(completion) = self.pending.take() {
            completion.resolve();
        }

        match token {
            Some(token) => {
                token.cancel();
                self.phase = Phase::Idle;
                true
            }
            None => false,
        }
    }

    /// Advances timed steps up to `now`.
    ///
    /// Called once per frame from the host's pre-execution hook, before the
    /// draw pass queries any texture.
    pub fn tick(&mut self, now: Duration) -> Invalidation {
        let mut invalidation = Invalidation::default();
        let mut finished = false;

        match &mut self.phase {
            Phase::Idle => {}
            Phase::Typing {
                revealed,
                total,
                next_step,
                token,
            } => {
                if token.is_cancelled() {
                    return invalidation;
                }
                while now >= *next_step && *revealed < *total {
                    *revealed += 1;
                    *next_step += TYPE_INTERVAL;
                    invalidation.content = true;
                }
                if *revealed >= *total {
                    finished = true;
                    invalidation.content = true;
                }
            }
            Phase::Rainbow { started, token } => {
                if token.is_cancelled() {
                    return invalidation;
                }
                if now.saturating_sub(*started) >= RAINBOW_DURATION {
                    finished = true;
                    invalidation.style = true;
                }
            }
            Phase::Zooming { started, token } => {
                if token.is_cancelled() {
                    return invalidation;
                }
                if now.saturating_sub(*started) >= ZOOM_DURATION {
                    finished = true;
                    invalidation.content = true;
                }
            }
        }

        if finished {
            self.finish();
        }

        invalidation
    }

    fn finish(&mut self) {
        if let Some(completion) = self.pending.take() {
            completion.resolve();
        }
        self.phase = Phase::Idle;
    }
}

impl Default for AnimationState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn typing_reveals_one_char_per_interval() {
        let mut state = AnimationState::new();
        let done = state.start_typing(3, ms(0));

        assert_eq!(state.visible_chars(), Some(0));

        let inv = state.tick(ms(66));
        assert!(inv.content);
        assert_eq!(state.visible_chars(), Some(1));

        // A late frame catches up on missed steps.
        state.tick(ms(200));
        assert_eq!(state.kind(), AnimationKind::Idle);
        assert!(done.is_done());
    }

    #[test]
    fn typing_empty_text_resolves_immediately() {
        let mut state = AnimationState::new();
        let done = state.start_typing(0, ms(0));
        assert!(done.is_done());
        assert_eq!(state.kind(), AnimationKind::Idle);
    }

    #[test]
    fn starting_rainbow_resolves_typing_first() {
        let mut state = AnimationState::new();
        let typing = state.start_typing(10, ms(0));
        state.tick(ms(66));
        assert!(!typing.is_done());

        let rainbow = state.start_rainbow(ms(100));
        assert!(typing.is_done());
        assert!(!rainbow.is_done());
        assert_eq!(state.kind(), AnimationKind::Rainbow);
        assert_eq!(state.visible_chars(), None);
    }

    #[test]
    fn cancel_stops_typing_without_revealing_remainder() {
        let mut state = AnimationState::new();
        let done = state.start_typing(10, ms(0));
        state.tick(ms(66));
        assert_eq!(state.visible_chars(), Some(1));

        assert!(state.cancel());
        assert!(done.is_done());
        assert_eq!(state.kind(), AnimationKind::Idle);
        // No steps fire after cancellation.
        let inv = state.tick(ms(1000));
        assert!(!inv.any());
    }

    #[test]
    fn cancel_when_idle_is_a_no_op() {
        let mut state = AnimationState::new();
        assert!(!state.cancel());
    }

    #[test]
    fn rainbow_expires_after_duration() {
        let mut state = AnimationState::new();
        let done = state.start_rainbow(ms(0));
        assert!(state.is_continuous());

        let inv = state.tick(ms(1999));
        assert!(!inv.any());
        assert!(!done.is_done());

        let inv = state.tick(ms(2000));
        assert!(inv.style);
        assert!(done.is_done());
        assert!(!state.is_continuous());
    }

    #[test]
    fn zoom_progress_clamps_and_expires() {
        let mut state = AnimationState::new();
        let done = state.start_zoom(ms(100));

        assert_eq!(state.zoom_progress(ms(100)), Some(0.0));
        assert_eq!(state.zoom_progress(ms(350)), Some(0.5));
        assert_eq!(state.zoom_progress(ms(10_000)), Some(1.0));

        let inv = state.tick(ms(600));
        assert!(inv.content);
        assert!(done.is_done());
        assert_eq!(state.kind(), AnimationKind::Idle);
    }

    #[test]
    fn completion_resolves_only_once_per_start() {
        let mut state = AnimationState::new();
        let first = state.start_zoom(ms(0));
        let second = state.start_zoom(ms(10));
        assert!(first.is_done());
        assert!(!second.is_done());

        state.tick(ms(510));
        assert!(second.is_done());
    }
}
