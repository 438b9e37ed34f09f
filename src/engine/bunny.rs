//! The bunny's animation state machine.
//!
//! Exactly one state is active, and exactly one timer runs: the one that
//! belongs to the active state. Every state change goes through
//! [`Bunny::enter`], which stops all timers and starts the new state's timer
//! in the same call, so no stale timer can keep advancing frames.
//!
//! ```text
//!            walk                      walk (same way) / idle
//!   Idle ───────────────► Walk ─────────────────────────────► WalkToIdle ──► Idle
//!    │                      │                                   ▲   │
//!    │ jump                 │ jump                     walk/idle│   │walk
//!    ▼                      ▼                                   │   ▼
//!   Jump{Idle} ──land──► WalkToIdle                         IdleToWalk ──► Walk
//!   Jump{Walk} ──land──► Walk
//! ```
//!
//! A jump requested during a transition is queued and fires when the
//! transition settles.

use log::debug;

use super::timer::Timer;
use crate::config::Settings;
use crate::sprites::{MirroredFrames, SpriteFrame};
use crate::types::Facing;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resume {
    Idle,
    Walk,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionKind {
    WalkToIdle,
    IdleToWalk,
}

impl TransitionKind {
    pub fn settles_into(self) -> Resume {
        match self {
            TransitionKind::WalkToIdle => Resume::Idle,
            TransitionKind::IdleToWalk => Resume::Walk,
        }
    }

    fn reversed(self) -> Self {
        match self {
            TransitionKind::WalkToIdle => TransitionKind::IdleToWalk,
            TransitionKind::IdleToWalk => TransitionKind::WalkToIdle,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingAction {
    Jump,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BunnyState {
    Idle,
    Walk,
    Jump { return_to: Resume },
    Transition {
        kind: TransitionKind,
        pending: Option<PendingAction>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TimerSlot {
    Idle,
    Walk,
    Jump,
    Transition,
}

impl BunnyState {
    fn timer_slot(&self) -> TimerSlot {
        match self {
            BunnyState::Idle => TimerSlot::Idle,
            BunnyState::Walk => TimerSlot::Walk,
            BunnyState::Jump { .. } => TimerSlot::Jump,
            BunnyState::Transition { .. } => TimerSlot::Transition,
        }
    }
}

/// All of the bunny's animations, each with a mirrored twin.
///
/// `idle_to_walk` is `walk_to_idle` played backwards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BunnyFrames {
    pub idle: MirroredFrames,
    pub walk: MirroredFrames,
    pub jump: MirroredFrames,
    pub walk_to_idle: MirroredFrames,
}

#[derive(Debug, Clone, PartialEq)]
struct BunnyTimers {
    idle: Timer,
    walk: Timer,
    jump: Timer,
    transition: Timer,
}

impl BunnyTimers {
    fn from_settings(settings: &Settings) -> Self {
        BunnyTimers {
            idle: Timer::new(settings.idle_frame_ms),
            walk: Timer::new(settings.walk_frame_ms),
            jump: Timer::new(settings.jump_frame_ms),
            transition: Timer::new(settings.transition_frame_ms),
        }
    }

    fn slot(&mut self, slot: TimerSlot) -> &mut Timer {
        match slot {
            TimerSlot::Idle => &mut self.idle,
            TimerSlot::Walk => &mut self.walk,
            TimerSlot::Jump => &mut self.jump,
            TimerSlot::Transition => &mut self.transition,
        }
    }

    fn stop_all(&mut self) {
        self.idle.stop();
        self.walk.stop();
        self.jump.stop();
        self.transition.stop();
    }

    fn running(&self) -> usize {
        [&self.idle, &self.walk, &self.jump, &self.transition]
            .iter()
            .filter(|t| t.is_running())
            .count()
    }
}

/// The single scripted vertical motion in the scene.
///
/// Height is in rows above the ground line. Gravity is picked at launch so
/// the bunny lands just as the jump frames run out.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct JumpArc {
    pub height: f64,
    pub velocity: f64,
    gravity: f64,
    airborne: bool,
}

impl JumpArc {
    fn launch(&mut self, speed: f64, duration_ms: f64) {
        self.height = 0.0;
        self.velocity = speed;
        self.gravity = if duration_ms > 0.0 { 2.0 * speed / (duration_ms / 1000.0) } else { 0.0 };
        self.airborne = true;
    }

    fn advance(&mut self, delta_ms: f64) {
        if !self.airborne {
            return;
        }
        let dt = delta_ms.max(0.0) / 1000.0;
        self.height = (self.height + self.velocity * dt).max(0.0);
        self.velocity -= self.gravity * dt;
    }

    fn land(&mut self) {
        *self = JumpArc::default();
    }

    pub fn is_airborne(&self) -> bool {
        self.airborne
    }
}

#[derive(Debug, Clone)]
pub struct Bunny {
    state: BunnyState,
    frame_idx: usize,
    facing: Facing,
    frames: BunnyFrames,
    timers: BunnyTimers,
    arc: JumpArc,
    jump_speed: f64,
}

impl Bunny {
    /// A bunny idling, facing right, with the idle timer running.
    pub fn new(frames: BunnyFrames, settings: &Settings) -> Self {
        let mut timers = BunnyTimers::from_settings(settings);
        timers.idle.start();
        Bunny {
            state: BunnyState::Idle,
            frame_idx: 0,
            facing: Facing::Right,
            frames,
            timers,
            arc: JumpArc::default(),
            jump_speed: settings.jump_speed,
        }
    }

    pub fn state(&self) -> BunnyState {
        self.state
    }

    pub fn frame_idx(&self) -> usize {
        self.frame_idx
    }

    pub fn facing(&self) -> Facing {
        self.facing
    }

    pub fn facing_right(&self) -> bool {
        self.facing.is_right()
    }

    pub fn arc(&self) -> &JumpArc {
        &self.arc
    }

    pub fn is_jumping(&self) -> bool {
        matches!(self.state, BunnyState::Jump { .. })
    }

    /// Walking, or in the air on a jump taken while walking.
    pub fn is_moving(&self) -> bool {
        matches!(
            self.state,
            BunnyState::Walk | BunnyState::Jump { return_to: Resume::Walk }
        )
    }

    /// Whole rows the bunny currently floats above the ground.
    pub fn height_offset(&self) -> usize {
        self.arc.height.round().max(0.0) as usize
    }

    pub fn running_timers(&self) -> usize {
        self.timers.running()
    }

    // -----------------------------------------------------------------------
    // Input
    // -----------------------------------------------------------------------

    /// Walk toward `right`. Repeating the current direction stops walking.
    pub fn walk(&mut self, right: bool) {
        let facing = Facing::from_right(right);
        match self.state {
            BunnyState::Idle => {
                self.facing = facing;
                self.enter(BunnyState::Walk, 0);
            }
            BunnyState::Walk => {
                if self.facing == facing {
                    self.begin_transition(TransitionKind::WalkToIdle, None, 0);
                } else {
                    self.facing = facing;
                }
            }
            BunnyState::Jump { return_to } => {
                let return_to = if return_to == Resume::Walk && self.facing == facing {
                    Resume::Idle
                } else {
                    self.facing = facing;
                    Resume::Walk
                };
                self.state = BunnyState::Jump { return_to };
            }
            BunnyState::Transition { kind, pending } => {
                let heading_to_walk = kind == TransitionKind::IdleToWalk;
                if heading_to_walk && self.facing == facing {
                    self.reverse_transition(kind, pending);
                } else {
                    self.facing = facing;
                    if !heading_to_walk {
                        self.reverse_transition(kind, pending);
                    }
                }
            }
        }
    }

    /// Settle into idle.
    pub fn idle(&mut self) {
        match self.state {
            BunnyState::Walk => self.begin_transition(TransitionKind::WalkToIdle, None, 0),
            BunnyState::Jump { .. } => {
                self.state = BunnyState::Jump {
                    return_to: Resume::Idle,
                }
            }
            BunnyState::Transition {
                kind: TransitionKind::IdleToWalk,
                pending,
            } => self.reverse_transition(TransitionKind::IdleToWalk, pending),
            BunnyState::Idle
            | BunnyState::Transition {
                kind: TransitionKind::WalkToIdle,
                ..
            } => {}
        }
    }

    /// Start a jump, or queue one behind a running transition.
    ///
    /// Returns `false` when the request was ignored because the bunny is
    /// already in the air; the arc is left untouched.
    pub fn jump(&mut self) -> bool {
        match self.state {
            BunnyState::Jump { .. } => false,
            BunnyState::Transition { kind, .. } => {
                self.state = BunnyState::Transition {
                    kind,
                    pending: Some(PendingAction::Jump),
                };
                true
            }
            BunnyState::Idle => {
                self.start_jump(Resume::Idle);
                true
            }
            BunnyState::Walk => {
                self.start_jump(Resume::Walk);
                true
            }
        }
    }

    // -----------------------------------------------------------------------
    // Time
    // -----------------------------------------------------------------------

    /// Advance the active timer and the jump arc by `delta_ms`.
    pub fn tick(&mut self, delta_ms: f64) {
        self.arc.advance(delta_ms);

        let slot = self.state.timer_slot();
        let fires = self.timers.slot(slot).advance(delta_ms);
        for _ in 0..fires {
            // A fire may switch state; the leftover time belongs to a timer
            // that was not running when this tick began.
            if self.state.timer_slot() != slot {
                break;
            }
            self.on_timer(slot);
        }
    }

    fn on_timer(&mut self, slot: TimerSlot) {
        match (slot, self.state) {
            (TimerSlot::Idle, BunnyState::Idle) => {
                self.frame_idx = next_looping(self.frame_idx, self.frames.idle.len());
            }
            (TimerSlot::Walk, BunnyState::Walk) => {
                self.frame_idx = next_looping(self.frame_idx, self.frames.walk.len());
            }
            (TimerSlot::Jump, BunnyState::Jump { return_to }) => {
                self.frame_idx += 1;
                if self.frame_idx >= self.frames.jump.len() {
                    self.land(return_to);
                }
            }
            (TimerSlot::Transition, BunnyState::Transition { kind, pending }) => {
                self.frame_idx += 1;
                if self.frame_idx >= self.frames.walk_to_idle.len() {
                    self.settle(kind, pending);
                }
            }
            // Guarded: a timer for an inactive state does nothing.
            _ => {}
        }
    }

    // -----------------------------------------------------------------------
    // State changes
    // -----------------------------------------------------------------------

    fn enter(&mut self, state: BunnyState, frame_idx: usize) {
        debug!("bunny {:?} -> {:?}", self.state, state);
        self.timers.stop_all();
        self.timers.slot(state.timer_slot()).start();
        self.state = state;
        self.frame_idx = frame_idx;
    }

    fn begin_transition(&mut self, kind: TransitionKind, pending: Option<PendingAction>, frame_idx: usize) {
        self.enter(BunnyState::Transition { kind, pending }, frame_idx);
    }

    /// Turn a transition around, continuing from the mirrored frame.
    fn reverse_transition(&mut self, kind: TransitionKind, pending: Option<PendingAction>) {
        let len = self.frames.walk_to_idle.len();
        let mirrored = len.saturating_sub(1).saturating_sub(self.frame_idx);
        self.begin_transition(kind.reversed(), pending, mirrored);
    }

    fn start_jump(&mut self, return_to: Resume) {
        let duration = self.frames.jump.len() as f64 * self.timers.jump.interval_ms();
        self.arc.launch(self.jump_speed, duration);
        self.enter(BunnyState::Jump { return_to }, 0);
    }

    fn land(&mut self, return_to: Resume) {
        self.arc.land();
        match return_to {
            Resume::Walk => self.enter(BunnyState::Walk, 0),
            Resume::Idle => self.begin_transition(TransitionKind::WalkToIdle, None, 0),
        }
    }

    fn settle(&mut self, kind: TransitionKind, pending: Option<PendingAction>) {
        let resume = kind.settles_into();
        match resume {
            Resume::Idle => self.enter(BunnyState::Idle, 0),
            Resume::Walk => self.enter(BunnyState::Walk, 0),
        }
        if pending == Some(PendingAction::Jump) {
            self.start_jump(resume);
        }
    }

    // -----------------------------------------------------------------------
    // Frame lookup
    // -----------------------------------------------------------------------

    /// The frame to draw right now, or `None` when that animation has no
    /// frame at this index (e.g. still loading).
    pub fn current_frame(&self) -> Option<&SpriteFrame> {
        let right = self.facing.is_right();
        match self.state {
            BunnyState::Idle => self.frames.idle.frame(self.frame_idx, right),
            BunnyState::Walk => self.frames.walk.frame(self.frame_idx, right),
            BunnyState::Jump { .. } => self.frames.jump.frame(self.frame_idx, right),
            BunnyState::Transition {
                kind: TransitionKind::WalkToIdle,
                ..
            } => self.frames.walk_to_idle.frame(self.frame_idx, right),
            BunnyState::Transition {
                kind: TransitionKind::IdleToWalk,
                ..
            } => {
                let len = self.frames.walk_to_idle.len();
                let idx = len.checked_sub(1 + self.frame_idx)?;
                self.frames.walk_to_idle.frame(idx, right)
            }
        }
    }
}

fn next_looping(idx: usize, len: usize) -> usize {
    if len == 0 { 0 } else { (idx + 1) % len }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frames(tag: char, n: usize) -> MirroredFrames {
        MirroredFrames::from_right(
            (0..n)
                .map(|i| SpriteFrame::from_text(&format!("{tag}{i}>")))
                .collect(),
        )
    }

    fn settings() -> Settings {
        Settings {
            idle_frame_ms: 400.0,
            walk_frame_ms: 100.0,
            jump_frame_ms: 50.0,
            transition_frame_ms: 80.0,
            jump_speed: 10.0,
            ..Settings::default()
        }
    }

    fn bunny() -> Bunny {
        Bunny::new(
            BunnyFrames {
                idle: frames('i', 2),
                walk: frames('w', 4),
                jump: frames('j', 6),
                walk_to_idle: frames('t', 3),
            },
            &settings(),
        )
    }

    fn text(b: &Bunny) -> String {
        b.current_frame().map(SpriteFrame::to_text).unwrap_or_default()
    }

    #[test]
    fn starts_idle_with_one_timer() {
        let b = bunny();
        assert_eq!(b.state(), BunnyState::Idle);
        assert!(b.facing_right());
        assert_eq!(b.running_timers(), 1);
    }

    #[test]
    fn walk_toggle_settles_back_to_idle() {
        let mut b = bunny();
        b.walk(true);
        assert_eq!(b.state(), BunnyState::Walk);
        assert!(b.facing_right());

        b.walk(true);
        assert_eq!(
            b.state(),
            BunnyState::Transition {
                kind: TransitionKind::WalkToIdle,
                pending: None
            }
        );

        b.tick(80.0 * 3.0);
        assert_eq!(b.state(), BunnyState::Idle);
        assert_eq!(b.running_timers(), 1);
    }

    #[test]
    fn walking_the_other_way_turns_around() {
        let mut b = bunny();
        b.walk(true);
        b.tick(250.0);
        let idx = b.frame_idx();
        b.walk(false);
        assert_eq!(b.state(), BunnyState::Walk);
        assert!(!b.facing_right());
        assert_eq!(b.frame_idx(), idx);
        assert_eq!(text(&b), format!("<{idx}w"));
    }

    #[test]
    fn idle_and_walk_cadences_differ() {
        let mut b = bunny();
        b.tick(399.0);
        assert_eq!(b.frame_idx(), 0);
        b.tick(1.0);
        assert_eq!(b.frame_idx(), 1);

        b.walk(true);
        b.tick(100.0);
        assert_eq!(b.frame_idx(), 1);
        b.tick(300.0);
        assert_eq!(b.frame_idx(), 0);
    }

    #[test]
    fn jump_from_walk_resumes_walking() {
        let mut b = bunny();
        b.walk(true);
        assert!(b.jump());
        assert_eq!(b.state(), BunnyState::Jump { return_to: Resume::Walk });
        assert!(b.is_moving());
        assert_eq!(b.running_timers(), 1);

        b.tick(50.0 * 6.0);
        assert_eq!(b.state(), BunnyState::Walk);
        assert_eq!(b.height_offset(), 0);
    }

    #[test]
    fn jump_from_idle_lands_through_walk_to_idle() {
        let mut b = bunny();
        b.jump();
        for _ in 0..6 {
            b.tick(50.0);
        }
        assert!(matches!(
            b.state(),
            BunnyState::Transition {
                kind: TransitionKind::WalkToIdle,
                ..
            }
        ));
        for _ in 0..3 {
            b.tick(80.0);
        }
        assert_eq!(b.state(), BunnyState::Idle);
    }

    #[test]
    fn jump_while_jumping_changes_nothing() {
        let mut b = bunny();
        b.jump();
        b.tick(50.0);
        b.tick(30.0);
        let arc = *b.arc();
        let idx = b.frame_idx();
        assert!(arc.height > 0.0);

        assert!(!b.jump());
        assert_eq!(*b.arc(), arc);
        assert_eq!(b.frame_idx(), idx);
        assert_eq!(b.state(), BunnyState::Jump { return_to: Resume::Idle });
    }

    #[test]
    fn jump_arc_rises_then_lands() {
        let mut b = bunny();
        b.jump();
        let mut peak = 0.0f64;
        for _ in 0..5 {
            b.tick(50.0);
            peak = peak.max(b.arc().height);
        }
        assert!(peak > 0.5);
        b.tick(50.0);
        assert!(!b.arc().is_airborne());
        assert_eq!(b.arc().height, 0.0);
    }

    #[test]
    fn jump_during_transition_is_queued() {
        let mut b = bunny();
        b.walk(true);
        b.idle();
        assert!(b.jump());
        assert_eq!(
            b.state(),
            BunnyState::Transition {
                kind: TransitionKind::WalkToIdle,
                pending: Some(PendingAction::Jump)
            }
        );

        b.tick(80.0);
        assert!(!b.is_jumping());
        b.tick(80.0);
        b.tick(80.0);
        assert_eq!(b.state(), BunnyState::Jump { return_to: Resume::Idle });
        assert_eq!(b.running_timers(), 1);
    }

    #[test]
    fn walk_during_jump_updates_return_state() {
        let mut b = bunny();
        b.jump();
        b.walk(false);
        assert_eq!(b.state(), BunnyState::Jump { return_to: Resume::Walk });
        assert!(!b.facing_right());
        b.walk(false);
        assert_eq!(b.state(), BunnyState::Jump { return_to: Resume::Idle });
        b.walk(true);
        b.idle();
        assert_eq!(b.state(), BunnyState::Jump { return_to: Resume::Idle });
    }

    #[test]
    fn reversing_a_transition_mirrors_the_frame() {
        let mut b = bunny();
        b.walk(true);
        b.walk(true);
        b.tick(80.0);
        assert_eq!(b.frame_idx(), 1);
        assert_eq!(text(&b), "t1>");

        b.walk(true);
        assert_eq!(
            b.state(),
            BunnyState::Transition {
                kind: TransitionKind::IdleToWalk,
                pending: None
            }
        );
        // Frame 1 of 3 mirrors onto frame 1, drawn from the reversed sequence.
        assert_eq!(b.frame_idx(), 1);
        assert_eq!(text(&b), "t1>");

        b.tick(80.0);
        assert_eq!(text(&b), "t0>");
        b.tick(80.0);
        assert_eq!(b.state(), BunnyState::Walk);
    }

    #[test]
    fn exactly_one_timer_runs_through_a_busy_sequence() {
        let mut b = bunny();
        let steps: [fn(&mut Bunny); 6] = [
            |b: &mut Bunny| b.walk(true),
            |b: &mut Bunny| {
                b.jump();
            },
            |b: &mut Bunny| b.walk(true),
            |b: &mut Bunny| b.idle(),
            |b: &mut Bunny| b.walk(false),
            |b: &mut Bunny| {
                b.jump();
            },
        ];
        for step in steps {
            step(&mut b);
            assert_eq!(b.running_timers(), 1);
            for _ in 0..5 {
                b.tick(45.0);
                assert_eq!(b.running_timers(), 1);
            }
        }
    }

    #[test]
    fn missing_frames_draw_nothing_but_still_advance() {
        let mut b = Bunny::new(BunnyFrames::default(), &settings());
        assert!(b.current_frame().is_none());
        b.jump();
        b.tick(50.0);
        assert!(matches!(b.state(), BunnyState::Transition { .. }));
        b.tick(80.0);
        assert_eq!(b.state(), BunnyState::Idle);
    }
}
