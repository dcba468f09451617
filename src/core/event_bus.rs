//! Typed pub/sub event bus with a deferred queue.
//!
//! Widgets never mutate the document directly: they emit events (cue
//! timing commits, zoom changes, ...) through a dispatch closure, and the
//! main loop drains the queue once per frame and applies them. Subscribers
//! registered with [`EventBus::subscribe`] additionally run synchronously
//! at emit time.
//!
//! Callback order is FIFO within one event type; ordering across types is
//! whatever emission order was.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};

use log::warn;

/// Queue bound; oldest half is dropped if the main loop stops draining.
const MAX_QUEUE: usize = 1024;

/// Marker trait for events; blanket-implemented for any qualifying type.
pub trait Event: Any + Send + Sync + 'static {
    fn as_any(&self) -> &dyn Any;
    fn type_name(&self) -> &'static str;
}

impl<T: Any + Send + Sync + 'static> Event for T {
    fn as_any(&self) -> &dyn Any {
        self
    }
    fn type_name(&self) -> &'static str {
        std::any::type_name::<T>()
    }
}

pub type BoxedEvent = Box<dyn Event>;

type Callback = Arc<dyn Fn(&dyn Any) + Send + Sync>;
type Subscribers = Arc<RwLock<HashMap<TypeId, Vec<Callback>>>>;
type Queue = Arc<Mutex<Vec<BoxedEvent>>>;

/// Run immediate callbacks for `event`, then park it in the queue.
fn publish(subscribers: &Subscribers, queue: &Queue, event: BoxedEvent) {
    let type_id = (*event).as_any().type_id();
    if let Some(cbs) = subscribers
        .read()
        .unwrap_or_else(|e| e.into_inner())
        .get(&type_id)
    {
        for cb in cbs {
            cb((*event).as_any());
        }
    }

    let mut queue = queue.lock().unwrap_or_else(|e| e.into_inner());
    if queue.len() >= MAX_QUEUE {
        let drop_count = queue.len() / 2;
        warn!("event queue full, dropping {} oldest events", drop_count);
        queue.drain(0..drop_count);
    }
    queue.push(event);
}

/// Event bus owned by the application.
#[derive(Clone, Default)]
pub struct EventBus {
    subscribers: Subscribers,
    queue: Queue,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe to events of type `E`; the callback runs synchronously on
    /// every emit of that type.
    pub fn subscribe<E, F>(&self, callback: F)
    where
        E: Event,
        F: Fn(&E) + Send + Sync + 'static,
    {
        let wrapped: Callback = Arc::new(move |any: &dyn Any| {
            if let Some(event) = any.downcast_ref::<E>() {
                callback(event);
            }
        });
        self.subscribers
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .entry(TypeId::of::<E>())
            .or_default()
            .push(wrapped);
    }

    pub fn emit<E: Event>(&self, event: E) {
        publish(&self.subscribers, &self.queue, Box::new(event));
    }

    pub fn emit_boxed(&self, event: BoxedEvent) {
        publish(&self.subscribers, &self.queue, event);
    }

    /// Drain everything emitted since the last poll, in emission order.
    pub fn poll(&self) -> Vec<BoxedEvent> {
        std::mem::take(&mut *self.queue.lock().unwrap_or_else(|e| e.into_inner()))
    }

    /// Cheap clonable handle for widgets that only need to emit.
    pub fn emitter(&self) -> EventEmitter {
        EventEmitter {
            subscribers: Arc::clone(&self.subscribers),
            queue: Arc::clone(&self.queue),
        }
    }

    pub fn queue_len(&self) -> usize {
        self.queue.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}

/// Emit-only handle passed down to UI components.
#[derive(Clone)]
pub struct EventEmitter {
    subscribers: Subscribers,
    queue: Queue,
}

impl EventEmitter {
    pub fn emit<E: Event>(&self, event: E) {
        publish(&self.subscribers, &self.queue, Box::new(event));
    }

    pub fn emit_boxed(&self, event: BoxedEvent) {
        publish(&self.subscribers, &self.queue, event);
    }
}

impl std::fmt::Debug for EventEmitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventEmitter")
            .field(
                "queue_len",
                &self.queue.lock().map(|q| q.len()).unwrap_or(0),
            )
            .finish()
    }
}

/// Downcast a queued event to a concrete type.
///
/// The explicit deref matters: `Box<dyn Event>` itself satisfies the
/// blanket `Event` impl, and calling `as_any()` on the box instead of the
/// inner value would yield the box's `TypeId` and fail every downcast.
#[inline]
pub fn downcast_event<E: Event>(event: &BoxedEvent) -> Option<&E> {
    (**event).as_any().downcast_ref::<E>()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicI32, Ordering};

    #[derive(Clone, Debug)]
    struct Ping(i32);

    #[derive(Clone, Debug)]
    struct Pong(String);

    #[test]
    fn test_subscribe_runs_immediately() {
        let bus = EventBus::new();
        let total = Arc::new(AtomicI32::new(0));
        let t = Arc::clone(&total);
        bus.subscribe::<Ping, _>(move |e| {
            t.fetch_add(e.0, Ordering::SeqCst);
        });

        bus.emit(Ping(4));
        bus.emit(Ping(6));
        assert_eq!(total.load(Ordering::SeqCst), 10);
    }

    #[test]
    fn test_poll_drains_in_order() {
        let bus = EventBus::new();
        bus.emit(Ping(1));
        bus.emit(Pong("a".into()));
        bus.emit(Ping(2));

        let events = bus.poll();
        assert_eq!(events.len(), 3);
        assert_eq!(downcast_event::<Ping>(&events[0]).unwrap().0, 1);
        assert!(downcast_event::<Pong>(&events[1]).is_some());
        assert_eq!(downcast_event::<Ping>(&events[2]).unwrap().0, 2);
        assert!(bus.poll().is_empty());
    }

    #[test]
    fn test_emitter_reaches_subscribers_and_queue() {
        let bus = EventBus::new();
        let count = Arc::new(AtomicI32::new(0));
        let c = Arc::clone(&count);
        bus.subscribe::<Ping, _>(move |_| {
            c.fetch_add(1, Ordering::SeqCst);
        });

        let emitter = bus.emitter();
        emitter.emit(Ping(0));
        emitter.emit_boxed(Box::new(Ping(1)));
        assert_eq!(count.load(Ordering::SeqCst), 2);
        assert_eq!(bus.poll().len(), 2);
    }

    #[test]
    fn test_boxed_emit_downcasts_to_inner_type() {
        let bus = EventBus::new();
        bus.emit_boxed(Box::new(Ping(42)));
        let events = bus.poll();
        assert_eq!(downcast_event::<Ping>(&events[0]).unwrap().0, 42);
    }
}
