//! Per-event translation and state reconciliation
//!
//! # Why events are synthesized
//!
//! Native input systems deliver an imperfect signal: modifier state arrives
//! as a bitmask on every event rather than as press/release events of its
//! own, lock transitions are ambiguous between press and release, and focus
//! loss silently drops releases. The translator keeps its own belief about
//! pressed keys and enabled lock modes, and on every raw event reconciles
//! that belief against the event's declared bitmask by synthesizing the
//! press/release events needed to close the gap, *before* emitting the
//! event that genuinely corresponds to the native signal.
//!
//! # Per-event pipeline
//!
//! ```text
//!  raw event
//!      │
//!      ▼
//!  ┌──────────────────────┐   resolve physical/logical ids, correct
//!  │ Key identity          │   ambiguous physical codes shared across
//!  │ resolution            │   left/right modifier pairs
//!  └──────────┬───────────┘
//!             ▼
//!  ┌──────────────────────┐   walk each tracked lock key forward through
//!  │ Lock synchronizer     │   its 4-stage cycle to the stage implied by
//!  └──────────┬───────────┘   the event, synthesizing one event per step
//!             ▼
//!  ┌──────────────────────┐   synthesize up/down events until pressing
//!  │ Modifier synchronizer │   records agree with every tracked family's
//!  └──────────┬───────────┘   bitmask bit
//!             ▼
//!  ┌──────────────────────┐   classify down / up / repeat / stale release,
//!  │ Genuine event         │   update records, dispatch, await the
//!  └──────────────────────┘   runtime's "handled" verdict
//! ```
//!
//! All record mutation happens synchronously inside
//! [`EventTranslator::handle_event`]; the returned [`EventDisposition`] is
//! the only piece that outlives the call. `&mut self` is the mutual
//! exclusion domain: one event is fully reconciled before the next one can
//! touch the tables.

use std::collections::HashMap;
use std::sync::Weak;

use keysync_keymap::{tracked_locks, tracked_modifiers, CheckedKey, LogicalKeyId, PhysicalKeyId};

use crate::error::{SinkError, TranslateError};
use crate::event::{KeyEvent, KeyEventKind, RawKeyEvent, US_PER_MS};
use crate::records::{MappingRecords, PressingRecords};
use crate::resolver;
use crate::sink::{EventAck, EventSink};
use crate::stage::LockStage;

/// Safety cap on synthesized lock-stage steps per lock key per event. The
/// forward distance around the 4-stage cycle is at most 3; anything above
/// two full cycles means the stage arithmetic itself has gone wrong.
const STAGE_STEP_CAP: usize = 8;

/// Whether this platform reports CapsLock transitions with the documented
/// polarity or reversed.
///
/// Most platforms report the enabled bit as 0-1-1-1 across the four stages
/// of the cycle; some remote-desktop pipelines deliver 1-1-0-1 instead.
/// The verdict is decided once, on the first CapsLock press this translator
/// observes, and never revisited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockPolarity {
    Undecided,
    Normal,
    Reversed,
}

/// Outcome of one [`EventTranslator::handle_event`] call.
///
/// State mutation is already complete when this is returned; awaiting
/// [`handled`](Self::handled) only waits for the runtime's verdict on the
/// genuine event. Dropping an unawaited disposition is safe and mutates
/// nothing further.
#[derive(Debug)]
pub struct EventDisposition {
    inner: Disposition,
}

#[derive(Debug)]
enum Disposition {
    /// No genuine event was dispatched; the verdict is already known.
    Settled(bool),
    /// A genuine event is in flight.
    Awaiting(EventAck),
}

impl EventDisposition {
    fn settled(handled: bool) -> Self {
        Self {
            inner: Disposition::Settled(handled),
        }
    }

    fn awaiting(ack: EventAck) -> Self {
        Self {
            inner: Disposition::Awaiting(ack),
        }
    }

    /// Await the runtime's "handled" verdict for the genuine event.
    ///
    /// Resolves immediately for calls that dispatched no genuine event: a
    /// stale release reports `true`, a dead sink reports `false`. A
    /// cancelled acknowledgment resolves to `false` rather than an error.
    pub async fn handled(self) -> Result<bool, SinkError> {
        match self.inner {
            Disposition::Settled(handled) => Ok(handled),
            Disposition::Awaiting(ack) => ack.handled().await,
        }
    }
}

/// Translates raw platform key events into the canonical event stream.
///
/// Owns all reconciliation state for one native event-source attachment.
/// The sink is held weakly: once the consuming runtime is gone, dispatch
/// becomes a silent no-op and the translator can be dropped at leisure.
pub struct EventTranslator {
    sink: Weak<dyn EventSink>,

    /// Physical key → logical key, present iff believed pressed.
    pressing: PressingRecords,
    /// Logical key → physical key last seen producing it.
    mapping: MappingRecords,
    /// Bitmask of lock modes believed enabled.
    lock_state: u32,
    caps_lock_polarity: LockPolarity,

    tracked_modifiers: Vec<CheckedKey>,
    tracked_locks: Vec<CheckedKey>,
    /// Reverse of the lock descriptors: which bit a lock logical key
    /// toggles.
    lock_bit_for_logical: HashMap<LogicalKeyId, u32>,

    /// Whether the current `handle_event` call has dispatched anything yet.
    sent_any_events: bool,
}

impl EventTranslator {
    /// Create a translator tracking the default modifier and lock families.
    pub fn new(sink: Weak<dyn EventSink>) -> Self {
        Self::with_tracked_keys(sink, tracked_modifiers(), tracked_locks())
    }

    /// Create a translator with caller-supplied tracked families. The
    /// descriptors are assumed correct and complete; they are not
    /// validated.
    pub fn with_tracked_keys(
        sink: Weak<dyn EventSink>,
        modifiers: Vec<CheckedKey>,
        locks: Vec<CheckedKey>,
    ) -> Self {
        let lock_bit_for_logical = locks
            .iter()
            .map(|checked| (checked.primary_logical, checked.mask))
            .collect();
        Self {
            sink,
            pressing: PressingRecords::new(),
            mapping: MappingRecords::new(),
            lock_state: 0,
            caps_lock_polarity: LockPolarity::Undecided,
            tracked_modifiers: modifiers,
            tracked_locks: locks,
            lock_bit_for_logical,
            sent_any_events: false,
        }
    }

    /// Translate one raw event, synthesizing whatever corrective events the
    /// declared bitmask demands, and dispatch everything to the sink.
    ///
    /// Always dispatches at least one event per call: when neither
    /// synthesis nor the genuine event produced output, the reserved empty
    /// event is sent so a downstream reply protocol never stalls.
    ///
    /// # Errors
    ///
    /// Invariant violations ([`TranslateError`]) mean the internal model
    /// has diverged unrecoverably; the translator should be discarded.
    pub fn handle_event(
        &mut self,
        event: &RawKeyEvent,
    ) -> Result<EventDisposition, TranslateError> {
        self.sent_any_events = false;
        let result = self.handle_event_impl(event);
        if result.is_ok() && !self.sent_any_events {
            if let Some(sink) = self.sink.upgrade() {
                drop(sink.deliver(KeyEvent::empty()));
            }
        }
        result
    }

    /// Reconcile modifier pressing state against a bitmask outside of key
    /// event handling (e.g. on focus or pointer events that carry a state
    /// snapshot). Idempotent for an unchanged bitmask.
    pub fn sync_modifiers(&mut self, state: u32, time_ms: u32) -> Result<(), TranslateError> {
        self.sync_pressed_states(state, u64::from(time_ms) * US_PER_MS)
    }

    /// Read-only view of which physical keys are currently believed
    /// pressed and the logical key each produces.
    pub fn pressed_state(&self) -> &HashMap<PhysicalKeyId, LogicalKeyId> {
        self.pressing.as_map()
    }

    /// The CapsLock polarity verdict for this translator.
    pub fn caps_lock_polarity(&self) -> LockPolarity {
        self.caps_lock_polarity
    }

    fn handle_event_impl(
        &mut self,
        event: &RawKeyEvent,
    ) -> Result<EventDisposition, TranslateError> {
        let logical_key = event
            .specified_logical
            .unwrap_or_else(|| resolver::logical_key(event));
        let physical_from_event = resolver::physical_key(event);
        let physical_key = self.corrected_physical_key(physical_from_event, logical_key);
        let timestamp_us = event.timestamp_us();

        self.sync_lock_states(event.state, timestamp_us, event.is_press, logical_key)?;
        self.sync_pressed_states(event.state, timestamp_us)?;

        // What this physical key was already producing, if anything. For
        // up and repeat events the runtime must see the logical key it saw
        // go down, not whatever the keyval resolves to now.
        let prior_logical = self.pressing.logical_for(physical_key);

        let kind;
        let mut character = None;
        if event.is_press {
            kind = if prior_logical.is_some() {
                KeyEventKind::Repeat
            } else {
                KeyEventKind::Down
            };
            character = resolver::character(event);
        } else if prior_logical.is_some() {
            kind = KeyEventKind::Up;
        } else {
            // Released twice, or released after a focus change swallowed
            // the matching press. Benign: report handled, emit nothing.
            tracing::debug!(%physical_key, "stale release with no pressing record");
            return Ok(EventDisposition::settled(true));
        }

        if kind != KeyEventKind::Repeat {
            if event.is_press {
                self.pressing.press(physical_key, logical_key)?;
            } else {
                self.pressing.release(physical_key)?;
            }
        }
        self.toggle_lock_bit_on_press(logical_key, event.is_press);
        if event.is_press {
            self.mapping.record(logical_key, physical_key);
        }

        let out = KeyEvent {
            kind,
            physical: physical_key,
            logical: prior_logical.unwrap_or(logical_key),
            character,
            timestamp_us,
            synthesized: false,
        };
        self.sent_any_events = true;
        let Some(sink) = self.sink.upgrade() else {
            tracing::debug!("sink gone, dropping genuine event");
            return Ok(EventDisposition::settled(false));
        };
        tracing::debug!(kind = ?out.kind, physical = %out.physical, logical = %out.logical, "dispatching genuine event");
        Ok(EventDisposition::awaiting(sink.deliver(out)))
    }

    /// Synthesize up/down events until the pressing records agree with the
    /// bitmask for every tracked modifier family.
    fn sync_pressed_states(
        &mut self,
        state: u32,
        timestamp_us: u64,
    ) -> Result<(), TranslateError> {
        let tracked = self.tracked_modifiers.clone();
        for checked in tracked {
            let family = [Some(checked.primary_logical), checked.secondary_logical];
            let any_pressed_by_state = state & checked.mask != 0;
            let mut any_pressed_by_record = false;

            // Release pass: every family member the records believe
            // pressed must go up when the bit is clear.
            for logical in family.into_iter().flatten() {
                let pressed_before_event = self.pressing.physical_for(logical).is_some();
                any_pressed_by_record |= pressed_before_event;

                if pressed_before_event && !any_pressed_by_state {
                    // A pressed key must have been mapped by the press
                    // that recorded it.
                    let recorded_physical = self
                        .mapping
                        .physical_for(logical)
                        .ok_or(TranslateError::MissingMapping(logical))?;
                    // The recorded physical key can be producing a
                    // different logical key than the one that led us here.
                    let recorded_logical = self.pressing.release(recorded_physical)?;
                    self.dispatch_synthesized(
                        KeyEventKind::Up,
                        recorded_physical,
                        recorded_logical,
                        timestamp_us,
                    );
                }
            }

            // Press pass: a set bit with no pressed family member gets a
            // down for the primary logical key, on the physical key the
            // mapping record last associated with it if there is one.
            if any_pressed_by_state && !any_pressed_by_record {
                let logical = checked.primary_logical;
                let recorded_physical = self.mapping.physical_for(logical);
                let physical = recorded_physical.unwrap_or(checked.primary_physical);
                if recorded_physical.is_none() {
                    self.mapping.record(logical, physical);
                }
                self.pressing.press(physical, logical)?;
                self.dispatch_synthesized(KeyEventKind::Down, physical, logical, timestamp_us);
            }
        }
        Ok(())
    }

    /// Walk each tracked lock key forward through its cycle to the stage
    /// the event implies, synthesizing one event per step.
    fn sync_lock_states(
        &mut self,
        state: u32,
        timestamp_us: u64,
        is_press: bool,
        event_logical: LogicalKeyId,
    ) -> Result<(), TranslateError> {
        let tracked = self.tracked_locks.clone();
        for checked in tracked {
            let logical = checked.primary_logical;
            let recorded_physical = self.mapping.physical_for(logical);
            let physical = recorded_physical.unwrap_or(checked.primary_physical);

            let pressed_logical = recorded_physical.and_then(|p| self.pressing.logical_for(p));
            if let Some(found) = pressed_logical {
                if found != logical {
                    return Err(TranslateError::InconsistentRecord {
                        physical,
                        found,
                        expected: logical,
                    });
                }
            }
            let stage_by_record = LockStage::from_record(
                pressed_logical.is_some(),
                self.lock_state & checked.mask != 0,
            );
            let enabled_by_state = state & checked.mask != 0;
            let is_event_key = logical == event_logical;

            if is_event_key && checked.is_caps_lock {
                self.update_caps_lock_polarity(is_press, enabled_by_state, stage_by_record);
                if self.caps_lock_polarity == LockPolarity::Undecided {
                    return Err(TranslateError::UndecidedInference);
                }
            }
            let reversed =
                checked.is_caps_lock && self.caps_lock_polarity == LockPolarity::Reversed;
            let stage_by_event = if is_event_key {
                LockStage::from_own_event(stage_by_record, is_press, enabled_by_state, reversed)
            } else {
                LockStage::from_others_event(stage_by_record, enabled_by_state)
            };

            let steps = LockStage::forward_distance(stage_by_record, stage_by_event);
            if steps > STAGE_STEP_CAP {
                return Err(TranslateError::StageOverflow {
                    from: stage_by_record,
                    to: stage_by_event,
                    cap: STAGE_STEP_CAP,
                });
            }

            let mut stage = stage_by_record;
            for _ in 0..steps {
                let press_step = stage.exits_with_press();
                if press_step {
                    if recorded_physical.is_none() {
                        self.mapping.record(logical, physical);
                    }
                    self.pressing.press(physical, logical)?;
                } else {
                    self.pressing.release(physical)?;
                }
                self.toggle_lock_bit_on_press(logical, press_step);
                let kind = if press_step {
                    KeyEventKind::Down
                } else {
                    KeyEventKind::Up
                };
                self.dispatch_synthesized(kind, physical, logical, timestamp_us);
                stage = stage.next();
            }
        }
        Ok(())
    }

    /// Decide CapsLock polarity on the key's first press.
    ///
    /// Computed under the non-reversed assumption: landing exactly two
    /// stages away from the record, in either direction across the cycle,
    /// is the signature of a platform reporting the enabled bit with
    /// inverted press/release semantics.
    fn update_caps_lock_polarity(
        &mut self,
        is_press: bool,
        enabled_by_state: bool,
        stage_by_record: LockStage,
    ) {
        if self.caps_lock_polarity != LockPolarity::Undecided {
            return;
        }
        if !is_press {
            return;
        }
        let stage_by_event =
            LockStage::from_own_event(stage_by_record, true, enabled_by_state, false);
        self.caps_lock_polarity = match (stage_by_event, stage_by_record) {
            (LockStage::ReleasedDisabled, LockStage::ReleasedEnabled)
            | (LockStage::ReleasedEnabled, LockStage::ReleasedDisabled) => LockPolarity::Reversed,
            _ => LockPolarity::Normal,
        };
        tracing::debug!(polarity = ?self.caps_lock_polarity, "caps lock polarity inferred");
    }

    /// Correct an ambiguous physical code shared across a left/right
    /// modifier pair: when the event's physical key is some family's
    /// primary physical key, trust the logical key to pick the family.
    fn corrected_physical_key(
        &self,
        physical_from_event: PhysicalKeyId,
        logical: LogicalKeyId,
    ) -> PhysicalKeyId {
        let known_modifier_physical = self
            .tracked_modifiers
            .iter()
            .any(|checked| checked.primary_physical == physical_from_event);
        if !known_modifier_physical {
            return physical_from_event;
        }
        self.tracked_modifiers
            .iter()
            .find(|checked| {
                checked.primary_logical == logical || checked.secondary_logical == Some(logical)
            })
            .map(|checked| checked.primary_physical)
            .unwrap_or(physical_from_event)
    }

    /// Flip the lock bit a logical key controls, on press events only.
    /// No-op for keys that are not tracked locks.
    fn toggle_lock_bit_on_press(&mut self, logical: LogicalKeyId, is_press: bool) {
        if !is_press {
            return;
        }
        if let Some(mask) = self.lock_bit_for_logical.get(&logical) {
            self.lock_state ^= mask;
        }
    }

    /// Send a synthesized event with no demand for its acknowledgment.
    fn dispatch_synthesized(
        &mut self,
        kind: KeyEventKind,
        physical: PhysicalKeyId,
        logical: LogicalKeyId,
        timestamp_us: u64,
    ) {
        self.sent_any_events = true;
        let event = KeyEvent {
            kind,
            physical,
            logical,
            character: None,
            timestamp_us,
            synthesized: true,
        };
        let Some(sink) = self.sink.upgrade() else {
            tracing::debug!(%physical, %logical, "sink gone, dropping synthesized event");
            return;
        };
        tracing::debug!(?kind, %physical, %logical, "synthesizing corrective event");
        drop(sink.deliver(event));
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use keysync_keymap::{logical, physical, state_bits};

    use super::*;

    /// Sink that records everything it is handed and acknowledges
    /// immediately.
    #[derive(Default)]
    struct RecordingSink {
        events: Mutex<Vec<KeyEvent>>,
        handled: bool,
    }

    impl RecordingSink {
        fn take(&self) -> Vec<KeyEvent> {
            std::mem::take(&mut self.events.lock().unwrap())
        }
    }

    impl EventSink for RecordingSink {
        fn deliver(&self, event: KeyEvent) -> EventAck {
            self.events.lock().unwrap().push(event);
            let (tx, ack) = EventAck::channel();
            tx.resolve(self.handled);
            ack
        }
    }

    fn translator_with_sink() -> (Arc<RecordingSink>, EventTranslator) {
        let sink = Arc::new(RecordingSink::default());
        let weak = Arc::downgrade(&sink) as Weak<dyn EventSink>;
        (sink, EventTranslator::new(weak))
    }

    fn raw(keycode: u32, keyval: u32, state: u32, is_press: bool) -> RawKeyEvent {
        RawKeyEvent {
            keycode,
            keyval,
            state,
            time_ms: 1,
            is_press,
            specified_logical: None,
        }
    }

    #[test]
    fn corrected_physical_key_picks_the_family_of_the_logical_key() {
        let (_sink, translator) = translator_with_sink();
        // A right-control keyval arriving on the left-control physical
        // code resolves to the control family's primary physical key.
        let corrected = translator
            .corrected_physical_key(physical::CONTROL_LEFT, logical::CONTROL_RIGHT);
        assert_eq!(corrected, physical::CONTROL_LEFT);
        // A non-modifier physical key passes through untouched.
        let untouched = translator.corrected_physical_key(physical::KEY_A, LogicalKeyId(0x61));
        assert_eq!(untouched, physical::KEY_A);
    }

    #[test]
    fn modifier_sync_is_idempotent() {
        let (sink, mut translator) = translator_with_sink();

        translator.sync_modifiers(state_bits::SHIFT, 1).expect("sync");
        let first = sink.take();
        assert_eq!(first.len(), 1);
        assert_eq!(first[0].kind, KeyEventKind::Down);
        assert_eq!(first[0].logical, logical::SHIFT_LEFT);
        assert!(first[0].synthesized);

        translator.sync_modifiers(state_bits::SHIFT, 2).expect("sync");
        assert!(sink.take().is_empty(), "second sync must synthesize nothing");
    }

    #[test]
    fn modifier_sync_uses_the_default_physical_key_without_a_mapping() {
        let (sink, mut translator) = translator_with_sink();
        translator.sync_modifiers(state_bits::SHIFT, 1).expect("sync");

        let events = sink.take();
        assert_eq!(events[0].physical, physical::SHIFT_LEFT);
        assert_eq!(
            translator.pressed_state().get(&physical::SHIFT_LEFT),
            Some(&logical::SHIFT_LEFT)
        );
    }

    #[test]
    fn modifier_sync_prefers_the_last_recorded_physical_key() {
        let (sink, mut translator) = translator_with_sink();

        // A remapped keyboard: the key at the right-shift position
        // produced the shift-left logical key, and the mapping record
        // remembers that.
        let mut remapped = raw(62, 0xffe2, 0, true);
        remapped.specified_logical = Some(logical::SHIFT_LEFT);
        translator.handle_event(&remapped).expect("down");
        let mut release = raw(62, 0xffe2, state_bits::SHIFT, false);
        release.specified_logical = Some(logical::SHIFT_LEFT);
        translator.handle_event(&release).expect("up");
        sink.take();

        // The bitmask claims shift with nothing pressed: the synthesized
        // press lands on the recorded physical key, not the family
        // default.
        translator.sync_modifiers(state_bits::SHIFT, 3).expect("sync");
        let events = sink.take();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].logical, logical::SHIFT_LEFT);
        assert_eq!(events[0].physical, physical::SHIFT_RIGHT);
    }

    #[test]
    fn clear_bit_releases_every_pressed_family_member() {
        let (sink, mut translator) = translator_with_sink();

        translator
            .handle_event(&raw(50, 0xffe1, 0, true))
            .expect("left down");
        translator
            .handle_event(&raw(62, 0xffe2, state_bits::SHIFT, true))
            .expect("right down");
        sink.take();

        translator.sync_modifiers(0, 5).expect("sync");
        let events = sink.take();
        assert_eq!(events.len(), 2);
        assert!(events.iter().all(|e| e.kind == KeyEventKind::Up && e.synthesized));
        assert!(translator.pressed_state().is_empty());
    }

    #[test]
    fn lock_bit_toggles_on_press_only() {
        let (_sink, mut translator) = translator_with_sink();

        translator.toggle_lock_bit_on_press(logical::CAPS_LOCK, true);
        assert_eq!(translator.lock_state, state_bits::CAPS_LOCK);
        translator.toggle_lock_bit_on_press(logical::CAPS_LOCK, false);
        assert_eq!(translator.lock_state, state_bits::CAPS_LOCK);
        translator.toggle_lock_bit_on_press(logical::CAPS_LOCK, true);
        assert_eq!(translator.lock_state, 0);
        // Non-lock keys never touch the bits.
        translator.toggle_lock_bit_on_press(logical::SHIFT_LEFT, true);
        assert_eq!(translator.lock_state, 0);
    }

    #[tokio::test]
    async fn dead_sink_settles_unhandled_without_error() {
        let sink = Arc::new(RecordingSink::default());
        let weak = Arc::downgrade(&sink) as Weak<dyn EventSink>;
        let mut translator = EventTranslator::new(weak);
        drop(sink);

        let disposition = translator
            .handle_event(&raw(38, 0x61, 0, true))
            .expect("handle");
        // State is still tracked even though nothing could be delivered.
        assert_eq!(translator.pressed_state().len(), 1);
        assert_eq!(disposition.handled().await, Ok(false));
    }
}
