//! In-memory event capture for logging assertions
//!
//! Every field of an event is recorded as a string, so assertions compare
//! against the rendered value (`"42"`, `"true"`, the `Display` form of a
//! `%`-formatted id).

use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, Mutex, OnceLock};

use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::Layer;
use unitwork_core_types::schema::{FIELD_COMPONENT, FIELD_EVENT, FIELD_OP, FIELD_UOW_ID};
use unitwork_core_types::UnitOfWorkId;

/// One recorded event
#[derive(Debug, Clone)]
pub struct CapturedEvent {
    pub level: Level,
    pub fields: BTreeMap<String, String>,
}

impl CapturedEvent {
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    pub fn component(&self) -> Option<&str> {
        self.field(FIELD_COMPONENT)
    }

    pub fn op(&self) -> Option<&str> {
        self.field(FIELD_OP)
    }

    pub fn event(&self) -> Option<&str> {
        self.field(FIELD_EVENT)
    }

    /// True if this is the `event` boundary event of `op`
    pub fn is(&self, op: &str, event: &str) -> bool {
        self.op() == Some(op) && self.event() == Some(event)
    }

    pub fn belongs_to(&self, uow_id: &UnitOfWorkId) -> bool {
        self.field(FIELD_UOW_ID) == Some(uow_id.to_string().as_str())
    }
}

struct FieldCollector<'a>(&'a mut BTreeMap<String, String>);

impl Visit for FieldCollector<'_> {
    fn record_str(&mut self, field: &Field, value: &str) {
        self.0.insert(field.name().to_string(), value.to_string());
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.0.insert(field.name().to_string(), format!("{:?}", value));
    }
}

type Sink = Arc<Mutex<Vec<CapturedEvent>>>;

/// Layer appending every event to a shared buffer
pub struct TestCaptureLayer {
    sink: Sink,
}

impl TestCaptureLayer {
    /// Create a layer and the handle that reads what it records
    pub fn new() -> (Self, TestCapture) {
        let sink = Sink::default();
        (
            Self {
                sink: Arc::clone(&sink),
            },
            TestCapture { sink },
        )
    }
}

impl<S: Subscriber> Layer<S> for TestCaptureLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut fields = BTreeMap::new();
        event.record(&mut FieldCollector(&mut fields));
        let captured = CapturedEvent {
            level: *event.metadata().level(),
            fields,
        };
        if let Ok(mut events) = self.sink.lock() {
            events.push(captured);
        }
    }
}

/// Read handle over captured events
#[derive(Clone)]
pub struct TestCapture {
    sink: Sink,
}

impl TestCapture {
    pub fn events(&self) -> Vec<CapturedEvent> {
        self.sink
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }

    /// Events carrying the given unit-of-work id
    pub fn events_for(&self, uow_id: &UnitOfWorkId) -> Vec<CapturedEvent> {
        self.events()
            .into_iter()
            .filter(|e| e.belongs_to(uow_id))
            .collect()
    }

    pub fn count_events<F>(&self, predicate: F) -> usize
    where
        F: Fn(&CapturedEvent) -> bool,
    {
        self.events().iter().filter(|e| predicate(e)).count()
    }

    /// # Panics
    ///
    /// Panics if no event matches `op` and `event`.
    pub fn assert_event_exists(&self, op: &str, event: &str) {
        let events = self.events();
        assert!(
            events.iter().any(|e| e.is(op, event)),
            "no op={} event={} among {} captured events",
            op,
            event,
            events.len()
        );
    }

    pub fn clear(&self) {
        if let Ok(mut events) = self.sink.lock() {
            events.clear();
        }
    }
}

static GLOBAL_CAPTURE: OnceLock<TestCapture> = OnceLock::new();

/// Install the capture layer as the global subscriber and return its handle
///
/// The handle is process-wide and shared by tests running in parallel, so
/// assertions should filter on something unique to the test: an op name or a
/// unit-of-work id.
///
/// ```
/// use unitwork_core::logging_facility::test_capture::init_test_capture;
/// use unitwork_core::log_op_start;
///
/// let capture = init_test_capture();
/// log_op_start!("my_operation");
/// capture.assert_event_exists("my_operation", "start");
/// ```
pub fn init_test_capture() -> TestCapture {
    GLOBAL_CAPTURE
        .get_or_init(|| {
            let (layer, capture) = TestCaptureLayer::new();
            if tracing_subscriber::registry().with(layer).try_init().is_err() {
                tracing::warn!("another global subscriber is installed; capture stays empty");
            }
            capture
        })
        .clone()
}
