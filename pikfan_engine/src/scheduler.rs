//! Event Scheduler
//!
//! Script events deferred to a later tick. The `loop` special function uses this to re-fire the
//! event it was called from on the next tick, which gives scripts a cheap per-tick heartbeat
//! without having to set a timer.
//!
//! Events are kept in a reversed binary heap keyed on `(tick_due, slot)`, so events due on the same
//! tick come out in the order they were scheduled. Popped slots are left as placeholders to keep
//! heap indices stable, and the storage is compacted once enough of them pile up.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::mob::MobId;
use crate::script::EventType;

#[cfg(test)]
const PLACEHOLDER_THRESHOLD: usize = 4;
#[cfg(not(test))]
const PLACEHOLDER_THRESHOLD: usize = 64;

/// The event scheduler.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Scheduler {
    pub heap: BinaryHeap<Reverse<(u64, usize)>>, /* (tick_due, event_idx) */
    pub events: Vec<ScheduledEvent>,
}

impl Scheduler {
    /// Schedule `event` of `state` for `mob`, `ticks_ahead` ticks from `now`. Dropped if it can't
    /// be delivered when due.
    pub fn schedule_in(
        &mut self,
        now: u64,
        ticks_ahead: u64,
        mob: MobId,
        state: usize,
        event: EventType,
        note: Option<String>,
    ) -> bool {
        self.schedule_on_if(now + ticks_ahead, mob, state, event, OnBlockedPolicy::Cancel, note)
    }

    /// Schedule an event on a specific tick with a policy for when the mob is busy at that time.
    ///
    /// Returns false if an identical event (same mob, state, event and tick) is already pending,
    /// in which case nothing new is queued.
    pub fn schedule_on_if(
        &mut self,
        on_tick: u64,
        mob: MobId,
        state: usize,
        event: EventType,
        on_blocked: OnBlockedPolicy,
        note: Option<String>,
    ) -> bool {
        let duplicate = self.events.iter().any(|e| {
            !e.is_placeholder() && e.on_tick == on_tick && e.mob == mob && e.state == state && e.event == Some(event)
        });
        if duplicate {
            return false;
        }
        let idx = self.events.len();
        let log_msg = match &note {
            Some(note) => note.as_str(),
            None => "<no note provided>",
        };
        debug!("scheduling {} for mob {mob} (tick due = {on_tick}): \"{log_msg}\"", event.as_key());
        self.heap.push(Reverse((on_tick, idx)));
        self.events.push(ScheduledEvent {
            on_tick,
            mob,
            state,
            event: Some(event),
            note,
            on_blocked,
        });
        true
    }

    /// Pop the next due event, if any.
    ///
    /// Returns `None` when the earliest scheduled event is still in the future.
    pub fn pop_due(&mut self, now: u64) -> Option<ScheduledEvent> {
        if let Some(Reverse((tick_due, idx))) = self.heap.peek().copied()
            && now >= tick_due
        {
            self.heap.pop();
            // take, not remove: heap entries refer to slots by index
            let event = std::mem::take(&mut self.events[idx]);
            self.compact_if_needed();
            return Some(event);
        }
        None
    }

    /// Number of events still waiting.
    pub fn pending(&self) -> usize {
        self.heap.len()
    }

    /// Rebuild the underlying storage when too many placeholders accumulate.
    fn compact_if_needed(&mut self) {
        let placeholder_count = self.events.iter().filter(|e| e.is_placeholder()).count();
        if placeholder_count > PLACEHOLDER_THRESHOLD {
            let old_events = std::mem::take(&mut self.events);
            let mut index_map = vec![0; old_events.len()];
            for (old_idx, event) in old_events.into_iter().enumerate() {
                if event.is_placeholder() {
                    continue;
                }
                index_map[old_idx] = self.events.len();
                self.events.push(event);
            }
            let mut new_heap = BinaryHeap::with_capacity(self.heap.len());
            while let Some(Reverse((tick_due, old_idx))) = self.heap.pop() {
                new_heap.push(Reverse((tick_due, index_map[old_idx])));
            }
            self.heap = new_heap;
        }
    }
}

/// A script event deferred to a particular tick.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduledEvent {
    pub on_tick: u64,
    pub mob: MobId,
    /// State the mob must still be in for the event to be delivered.
    pub state: usize,
    pub event: Option<EventType>,
    pub note: Option<String>,
    pub on_blocked: OnBlockedPolicy,
}

impl ScheduledEvent {
    /// Placeholder events mark consumed slots within the scheduler.
    fn is_placeholder(&self) -> bool {
        self.event.is_none() && self.mob.is_nil()
    }
}

impl Default for ScheduledEvent {
    fn default() -> Self {
        Self {
            on_tick: 0,
            mob: MobId::nil(),
            state: 0,
            event: None,
            note: None,
            on_blocked: OnBlockedPolicy::Cancel,
        }
    }
}

/// What to do with a due event whose mob is still busy with a suspended script.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum OnBlockedPolicy {
    /// Drop the event.
    #[default]
    Cancel,
    /// Try again after the given number of ticks.
    RetryAfter(u64),
    /// Try again on the next tick.
    RetryNextTick,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::idgen::new_id;

    #[test]
    fn scheduler_new_is_empty() {
        let scheduler = Scheduler::default();
        assert!(scheduler.heap.is_empty());
        assert!(scheduler.events.is_empty());
        assert_eq!(scheduler.pending(), 0);
    }

    #[test]
    fn schedule_in_adds_event_correctly() {
        let mut scheduler = Scheduler::default();
        let mob = new_id();
        assert!(scheduler.schedule_in(5, 3, mob, 1, EventType::Timer, Some("test".into())));

        assert_eq!(scheduler.events.len(), 1);
        let event = &scheduler.events[0];
        assert_eq!(event.on_tick, 8);
        assert_eq!(event.mob, mob);
        assert_eq!(event.event, Some(EventType::Timer));
        assert_eq!(event.on_blocked, OnBlockedPolicy::Cancel);
    }

    #[test]
    fn duplicates_are_merged() {
        let mut scheduler = Scheduler::default();
        let mob = new_id();
        assert!(scheduler.schedule_on_if(4, mob, 0, EventType::Idle, OnBlockedPolicy::RetryNextTick, None));
        assert!(!scheduler.schedule_on_if(4, mob, 0, EventType::Idle, OnBlockedPolicy::RetryNextTick, None));
        assert!(scheduler.schedule_on_if(5, mob, 0, EventType::Idle, OnBlockedPolicy::RetryNextTick, None));
        assert_eq!(scheduler.pending(), 2);

        // Once popped, the same event can be queued again.
        assert!(scheduler.pop_due(4).is_some());
        assert!(scheduler.schedule_on_if(4, mob, 0, EventType::Idle, OnBlockedPolicy::RetryNextTick, None));
    }

    #[test]
    fn pop_due_returns_none_when_nothing_due() {
        let mut scheduler = Scheduler::default();
        scheduler.schedule_in(5, 5, new_id(), 0, EventType::Timer, None);
        assert!(scheduler.pop_due(8).is_none());
        assert_eq!(scheduler.heap.len(), 1);
        assert!(scheduler.pop_due(12).is_some_and(|e| e.on_tick == 10));
    }

    #[test]
    fn events_with_same_tick_fire_in_fifo_order() {
        let mut scheduler = Scheduler::default();
        scheduler.schedule_on_if(15, new_id(), 0, EventType::Timer, OnBlockedPolicy::Cancel, Some("Third".into()));
        scheduler.schedule_on_if(10, new_id(), 0, EventType::Timer, OnBlockedPolicy::Cancel, Some("First".into()));
        scheduler.schedule_on_if(10, new_id(), 0, EventType::Timer, OnBlockedPolicy::Cancel, Some("Second".into()));

        let notes: Vec<_> = std::iter::from_fn(|| scheduler.pop_due(20)).filter_map(|e| e.note).collect();
        assert_eq!(notes, vec!["First", "Second", "Third"]);
    }

    #[test]
    fn compaction_keeps_order_and_drops_placeholders() {
        let mut scheduler = Scheduler::default();
        for tick in 0..10 {
            scheduler.schedule_on_if(tick, new_id(), 0, EventType::Timer, OnBlockedPolicy::Cancel, Some(tick.to_string()));
        }
        for tick in 0..6 {
            let event = scheduler.pop_due(tick).expect("due");
            assert_eq!(event.on_tick, tick);
        }
        assert!(scheduler.events.len() < 10, "placeholders compacted");
        let rest: Vec<_> = std::iter::from_fn(|| scheduler.pop_due(100)).map(|e| e.on_tick).collect();
        assert_eq!(rest, vec![6, 7, 8, 9]);
    }
}
