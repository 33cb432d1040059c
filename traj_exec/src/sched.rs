//! # Periodic scheduler
//!
//! The trajectory manager only needs to register and remove a periodic event, which is captured
//! by the [`Scheduler`] trait. [`PeriodicScheduler`] is a cooperative implementation of it: the
//! executable's main loop asks it which events are due and dispatches each due [`EventId`] to the
//! object which registered it.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use std::time::Duration;
use log::{debug, warn};
use serde::Serialize;
use thiserror::Error;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Identifier of a registered event, never reused within a scheduler.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct EventId(pub usize);

/// A cooperative scheduler of periodic events with a fixed number of slots.
#[derive(Debug)]
pub struct PeriodicScheduler {
    /// Event slots, `None` when free.
    slots: Vec<Option<Event>>,

    /// Time of the last call to `due_events`, relative to the scheduler start.
    now: Duration,

    /// Id given to the next registered event.
    next_id: usize
}

/// A registered periodic event.
#[derive(Debug, Copy, Clone)]
struct Event {
    id: EventId,
    period: Duration,
    priority: u8,
    next_due: Duration
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Errors which can occur when registering an event.
#[derive(Debug, Error, PartialEq)]
pub enum SchedulerError {
    #[error("No free slot left in the scheduler")]
    NoFreeSlot,

    #[error("Event period must be a positive finite duration")]
    InvalidPeriod
}

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// The ability to register and remove periodic events.
pub trait Scheduler {
    /// Register a new event executed every `period`.
    ///
    /// When several events are due at once the one with the highest `priority` goes first.
    fn add_periodic_event(
        &mut self, 
        period: Duration, 
        priority: u8
    ) -> Result<EventId, SchedulerError>;

    /// Remove an event. Removing an event which isn't registered does nothing.
    fn del_event(&mut self, id: EventId);
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl PeriodicScheduler {
    /// Create a new scheduler able to hold `capacity` events.
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: vec![None; capacity],
            now: Duration::default(),
            next_id: 0
        }
    }

    /// Return the events due at `now`, highest priority first.
    ///
    /// Each returned event is rescheduled one period later. If an event has fallen more than a
    /// period behind, the missed executions are dropped rather than run back to back.
    pub fn due_events(&mut self, now: Duration) -> Vec<EventId> {
        self.now = now;

        let mut due: Vec<(u8, usize, EventId)> = vec![];

        for (i, slot) in self.slots.iter_mut().enumerate() {
            let evt = match slot {
                Some(e) => e,
                None => continue
            };

            if evt.next_due > now {
                continue;
            }

            due.push((evt.priority, i, evt.id));

            evt.next_due += evt.period;
            if evt.next_due <= now {
                warn!(
                    "Event {} overran, skipping to {:.06} s", 
                    evt.id.0, 
                    (now + evt.period).as_secs_f64()
                );
                evt.next_due = now + evt.period;
            }
        }

        // Highest priority first, ties in registration slot order
        due.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));

        due.into_iter().map(|(_, _, id)| id).collect()
    }

    /// Number of registered events.
    pub fn num_events(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    /// True if the event is currently registered.
    pub fn is_registered(&self, id: EventId) -> bool {
        self.slot_of(id).is_some()
    }

    /// Index of the slot holding the event.
    fn slot_of(&self, id: EventId) -> Option<usize> {
        self.slots
            .iter()
            .position(|s| matches!(s, Some(e) if e.id == id))
    }
}

impl Scheduler for PeriodicScheduler {
    fn add_periodic_event(
        &mut self, 
        period: Duration, 
        priority: u8
    ) -> Result<EventId, SchedulerError> {
        if period == Duration::default() {
            return Err(SchedulerError::InvalidPeriod);
        }

        let index = self.slots
            .iter()
            .position(|s| s.is_none())
            .ok_or(SchedulerError::NoFreeSlot)?;

        let id = EventId(self.next_id);
        self.next_id += 1;

        self.slots[index] = Some(Event {
            id,
            period,
            priority,
            next_due: self.now + period
        });

        debug!(
            "Added event {} in slot {} (period {:.03} s, priority {})", 
            id.0,
            index, 
            period.as_secs_f64(), 
            priority
        );

        Ok(id)
    }

    fn del_event(&mut self, id: EventId) {
        match self.slot_of(id) {
            Some(index) => {
                self.slots[index] = None;
                debug!("Deleted event {}", id.0);
            },
            None => debug!("Event {} is not registered, nothing to delete", id.0)
        }
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn test_add_del() {
        let mut sched = PeriodicScheduler::new(2);

        let a = sched.add_periodic_event(ms(10), 1).unwrap();
        let b = sched.add_periodic_event(ms(10), 1).unwrap();
        assert_ne!(a, b);
        assert_eq!(
            sched.add_periodic_event(ms(10), 1), 
            Err(SchedulerError::NoFreeSlot)
        );

        sched.del_event(a);
        assert!(!sched.is_registered(a));
        assert_eq!(sched.num_events(), 1);

        // Deleting twice, or deleting nonsense, is harmless
        sched.del_event(a);
        sched.del_event(EventId(42));
        assert_eq!(sched.num_events(), 1);

        // The freed slot is reused under a new id, so the stale id stays dead
        let c = sched.add_periodic_event(ms(5), 1).unwrap();
        assert_ne!(c, a);
        assert_ne!(c, b);
        assert!(sched.is_registered(c));
        assert!(!sched.is_registered(a));
        assert_eq!(sched.num_events(), 2);

        sched.del_event(a);
        assert!(sched.is_registered(c));
        assert_eq!(sched.due_events(ms(5)), vec![c]);

        assert_eq!(
            PeriodicScheduler::new(1).add_periodic_event(ms(0), 1), 
            Err(SchedulerError::InvalidPeriod)
        );
    }

    #[test]
    fn test_due_events() {
        let mut sched = PeriodicScheduler::new(4);

        let slow = sched.add_periodic_event(ms(20), 50).unwrap();
        let fast = sched.add_periodic_event(ms(10), 10).unwrap();
        let urgent = sched.add_periodic_event(ms(10), 90).unwrap();

        assert!(sched.due_events(ms(5)).is_empty());
        assert_eq!(sched.due_events(ms(10)), vec![urgent, fast]);
        assert_eq!(sched.due_events(ms(20)), vec![urgent, slow, fast]);
        assert!(sched.due_events(ms(25)).is_empty());

        // A long stall runs each event once only
        assert_eq!(sched.due_events(ms(100)), vec![urgent, slow, fast]);
        assert!(sched.due_events(ms(105)).is_empty());
        assert_eq!(sched.due_events(ms(110)), vec![urgent, fast]);
    }
}
