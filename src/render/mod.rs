//! Equation rendering with bounded engine polling.
//!
//! Each piece of markup (a preview row or a derivation step) is bound to a
//! render surface. When the typesetting engine is not yet available, the
//! surface polls it on a fixed schedule; once the attempt budget is spent the
//! surface settles on the raw markup, silently. A typeset-pass failure is
//! logged and the surface likewise falls back to raw markup; rendering is
//! best-effort and never surfaces an error. Reassigning or removing a
//! surface cancels its schedule, so no orphaned timers survive a task or
//! solution change.

pub mod typeset;

use std::collections::HashMap;
use std::time::{Duration, Instant};

use tracing::{debug, warn};

pub use typeset::{MathTypesetter, NullTypesetter, Typesetter};

/// Fixed polling interval while the engine loads.
pub const POLL_INTERVAL: Duration = Duration::from_millis(500);
/// Polling attempt budget per surface.
pub const MAX_POLL_ATTEMPTS: u32 = 10;

/// Identifies a render target: one equation-preview row of the active task,
/// or one derivation step of the fetched solution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Surface {
    Preview(usize),
    Step(usize),
}

struct PollSchedule {
    attempts: u32,
    next_due: Instant,
}

struct RenderSlot {
    markup: String,
    /// Typeset output; `None` means the raw markup is displayed.
    output: Option<String>,
    poll: Option<PollSchedule>,
}

pub struct EquationRenderer {
    engine: Box<dyn Typesetter>,
    slots: HashMap<Surface, RenderSlot>,
}

impl EquationRenderer {
    pub fn new(engine: Box<dyn Typesetter>) -> Self {
        Self {
            engine,
            slots: HashMap::new(),
        }
    }

    /// Bind markup to a surface. Any previous content and polling schedule
    /// for that surface are dropped first.
    pub fn assign(&mut self, surface: Surface, markup: &str, now: Instant) {
        if let Some(slot) = self.slots.get(&surface) {
            if slot.markup == markup {
                return;
            }
        }
        let mut slot = RenderSlot {
            markup: markup.to_string(),
            output: None,
            poll: None,
        };
        if self.engine.is_available() {
            slot.output = run_typeset(self.engine.as_ref(), &slot.markup);
        } else {
            slot.poll = Some(PollSchedule {
                attempts: 0,
                next_due: now + POLL_INTERVAL,
            });
        }
        self.slots.insert(surface, slot);
    }

    /// Tear down everything. Used when the active task changes.
    pub fn clear(&mut self) {
        self.slots.clear();
    }

    /// Drop all derivation-step surfaces, keeping preview rows.
    pub fn clear_steps(&mut self) {
        self.slots.retain(|surface, _| !matches!(surface, Surface::Step(_)));
    }

    /// Advance due polling schedules. Returns true when any surface changed
    /// and the screen needs a redraw.
    pub fn poll_due(&mut self, now: Instant) -> bool {
        let mut changed = false;
        for (surface, slot) in self.slots.iter_mut() {
            let Some(poll) = slot.poll.as_mut() else { continue };
            if now < poll.next_due {
                continue;
            }
            if self.engine.is_available() {
                slot.output = run_typeset(self.engine.as_ref(), &slot.markup);
                slot.poll = None;
                changed = true;
            } else {
                poll.attempts += 1;
                if poll.attempts >= MAX_POLL_ATTEMPTS {
                    // Budget spent: settle on raw markup, no error surfaced.
                    debug!(?surface, "typeset engine unavailable, rendering raw markup");
                    slot.poll = None;
                    changed = true;
                } else {
                    poll.next_due = now + POLL_INTERVAL;
                }
            }
        }
        changed
    }

    /// Text to display for a surface: typeset output when the pass
    /// succeeded, raw markup otherwise.
    pub fn display(&self, surface: Surface) -> Option<&str> {
        let slot = self.slots.get(&surface)?;
        Some(slot.output.as_deref().unwrap_or(&slot.markup))
    }

    /// True while any surface is still waiting for the engine.
    pub fn has_pending(&self) -> bool {
        self.slots.values().any(|s| s.poll.is_some())
    }
}

fn run_typeset(engine: &dyn Typesetter, markup: &str) -> Option<String> {
    match engine.typeset(markup) {
        Ok(output) => Some(output),
        Err(e) => {
            // Recorded, never surfaced; the raw markup is shown instead.
            warn!(error = %e, "typeset pass failed");
            None
        }
    }
}
