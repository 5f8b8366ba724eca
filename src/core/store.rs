// Session parameter store: map and dirty flag behind one non-reentrant guard.
// Every public operation holds the guard for its whole duration and never calls
// back into the store; closures given to `read`/`update` must not either.
use std::fmt;

use parking_lot::Mutex;
use tracing::Span;

use crate::core::caps::{self, CapabilityRecord};
use crate::core::codec::{self, ParameterMap};

/// Map and dirty flag as seen from inside the guard.
#[derive(Debug, Default)]
pub struct ParamState {
    params: ParameterMap,
    dirty: bool,
}

impl ParamState {
    pub fn params(&self) -> &ParameterMap {
        &self.params
    }

    /// Mutable access to the map. Callers that change the map are expected
    /// to call `mark_dirty` themselves; this accessor does not.
    pub fn params_mut(&mut self) -> &mut ParameterMap {
        &mut self.params
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub fn clear_dirty(&mut self) {
        self.dirty = false;
    }

    pub(crate) fn get_int(&self, key: &str) -> i32 {
        caps::int_value(&self.params, key)
    }
}

pub struct ParameterStore {
    state: Mutex<ParamState>,
    span: Span,
}

impl ParameterStore {
    pub fn new(text: &str) -> Self {
        Self::with_span(text, Span::none())
    }

    /// Builds a store whose diagnostic events are parented on `span`.
    pub fn with_span(text: &str, span: Span) -> Self {
        let params = span.in_scope(|| codec::parse(text));
        tracing::debug!(parent: &span, params = params.len(), "params new");
        Self {
            state: Mutex::new(ParamState {
                params,
                dirty: false,
            }),
            span,
        }
    }

    pub fn span(&self) -> &Span {
        &self.span
    }

    pub fn is_dirty(&self) -> bool {
        self.state.lock().dirty
    }

    /// First value of `key`, as supplied by the HAL.
    pub fn value(&self, key: &str) -> Option<String> {
        self.state.lock().params.first(key).map(str::to_string)
    }

    pub fn values(&self, key: &str) -> Option<Vec<String>> {
        self.state.lock().params.get(key).map(<[String]>::to_vec)
    }

    pub fn snapshot(&self) -> ParameterMap {
        self.state.lock().params.clone()
    }

    /// Runs `f` with shared access to the guarded state.
    pub fn read<R>(&self, f: impl FnOnce(&ParamState) -> R) -> R {
        let state = self.state.lock();
        f(&*state)
    }

    /// Runs `f` with exclusive access to the guarded state. This is the path
    /// external mutators use; they flip the dirty flag via
    /// `ParamState::mark_dirty` when they change the map.
    pub fn update<R>(&self, f: impl FnOnce(&mut ParamState) -> R) -> R {
        let mut state = self.state.lock();
        f(&mut *state)
    }

    pub fn get_viewfinder_caps(&self) -> Vec<CapabilityRecord> {
        let state = self.state.lock();
        let fps = state.get_int(caps::PREVIEW_FRAME_RATE);
        if fps == -1 {
            tracing::debug!(parent: &self.span, "no preview frame rate; no viewfinder caps");
            return Vec::new();
        }
        self.span.in_scope(|| caps::viewfinder_caps(fps, &state.params))
    }

    pub fn get_video_caps(&self) -> Vec<CapabilityRecord> {
        let _state = self.state.lock();
        Vec::new()
    }

    pub fn get_image_caps(&self) -> Vec<CapabilityRecord> {
        let _state = self.state.lock();
        Vec::new()
    }
}

impl fmt::Display for ParameterStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let serialized = codec::serialize(&self.state.lock().params);
        f.write_str(&serialized)
    }
}

impl fmt::Debug for ParameterStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = f.debug_struct("ParameterStore");
        match self.state.try_lock() {
            Some(state) => out
                .field("params", &state.params.len())
                .field("dirty", &state.dirty),
            None => out.field("state", &"<locked>"),
        };
        out.finish()
    }
}

impl Drop for ParameterStore {
    fn drop(&mut self) {
        tracing::debug!(parent: &self.span, "params destroy");
    }
}

#[cfg(test)]
mod tests {
    use super::ParameterStore;
    use crate::core::caps::MemoryKind;
    use crate::core::codec::parse;
    use parking_lot::Mutex;
    use std::fmt;
    use std::sync::Arc;
    use tracing::field::{Field, Visit};
    use tracing::{Event, Subscriber};
    use tracing_subscriber::layer::{Context, Layer, SubscriberExt};
    use tracing_subscriber::registry::LookupSpan;

    #[test]
    fn fresh_store_is_clean() {
        for text in ["", "a=1", "garbage", "preview-frame-rate=30"] {
            assert!(!ParameterStore::new(text).is_dirty(), "text: {text:?}");
        }
    }

    #[test]
    fn empty_store_serializes_to_empty_string() {
        let store = ParameterStore::new("");
        assert_eq!(store.to_string(), "");
        assert!(store.snapshot().is_empty());
    }

    #[test]
    fn to_string_round_trips_semantically() {
        let text = "flash-mode=off;preview-size-values=640x480,1280x720;zoom=0";
        let store = ParameterStore::new(text);
        assert_eq!(parse(&store.to_string()), parse(text));
    }

    #[test]
    fn value_accessors_read_first_and_all() {
        let store = ParameterStore::new("a=1,2,3;b=x");
        assert_eq!(store.value("a").as_deref(), Some("1"));
        assert_eq!(
            store.values("a"),
            Some(vec!["1".to_string(), "2".to_string(), "3".to_string()])
        );
        assert_eq!(store.value("missing"), None);
        assert_eq!(store.values("missing"), None);
    }

    #[test]
    fn get_int_uses_sentinel_and_permissive_parse() {
        let store = ParameterStore::new("fps=30;name=abc");
        store.read(|state| {
            assert_eq!(state.get_int("fps"), 30);
            assert_eq!(state.get_int("name"), 0);
            assert_eq!(state.get_int("missing"), -1);
        });
    }

    #[test]
    fn update_does_not_mark_dirty_on_its_own() {
        let store = ParameterStore::new("a=1");
        store.update(|state| {
            state.params_mut().insert_value("a", "2");
        });
        assert!(!store.is_dirty());
        assert_eq!(store.to_string(), "a=2");

        store.update(|state| state.mark_dirty());
        assert!(store.is_dirty());
        store.update(|state| state.clear_dirty());
        assert!(!store.is_dirty());
    }

    #[test]
    fn viewfinder_caps_follow_size_order() {
        let store = ParameterStore::new(
            "preview-frame-rate=30;preview-size-values=640x480,1280x720,bogus",
        );
        let caps = store.get_viewfinder_caps();
        let dims: Vec<_> = caps.iter().map(|c| (c.width, c.height)).collect();
        assert_eq!(dims, vec![(640, 480), (1280, 720)]);
        assert!(caps.iter().all(|c| c.framerate_num == 30 && c.framerate_den == 1));
        assert!(caps.iter().all(|c| c.memory == MemoryKind::DroidSurface));
    }

    #[test]
    fn viewfinder_caps_empty_without_frame_rate() {
        let store = ParameterStore::new("preview-size-values=640x480,1280x720");
        assert!(store.get_viewfinder_caps().is_empty());
    }

    #[test]
    fn viewfinder_caps_see_updates() {
        let store = ParameterStore::new("preview-size-values=640x480");
        store.update(|state| {
            state.params_mut().insert_value("preview-frame-rate", "15");
            state.mark_dirty();
        });
        let caps = store.get_viewfinder_caps();
        assert_eq!(caps.len(), 1);
        assert_eq!(caps[0].framerate_num, 15);
    }

    #[test]
    fn video_and_image_caps_are_empty() {
        let store = ParameterStore::new(
            "preview-frame-rate=30;preview-size-values=640x480;video-size-values=1920x1080",
        );
        assert!(store.get_video_caps().is_empty());
        assert!(store.get_image_caps().is_empty());
        // Guard is released: a later call still completes.
        assert!(!store.is_dirty());
    }

    #[derive(Clone, Default)]
    struct CaptureLayer {
        events: Arc<Mutex<Vec<(Option<String>, String)>>>,
    }

    struct MessageVisitor(String);

    impl Visit for MessageVisitor {
        fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
            if field.name() == "message" {
                self.0 = format!("{value:?}");
            }
        }
    }

    impl<S> Layer<S> for CaptureLayer
    where
        S: Subscriber + for<'a> LookupSpan<'a>,
    {
        fn on_event(&self, event: &Event<'_>, ctx: Context<'_, S>) {
            let mut visitor = MessageVisitor(String::new());
            event.record(&mut visitor);
            let span = ctx.event_span(event).map(|span| span.name().to_string());
            self.events.lock().push((span, visitor.0));
        }
    }

    fn span_of(events: &[(Option<String>, String)], message: &str) -> Vec<Option<String>> {
        events
            .iter()
            .filter(|(_, msg)| msg == message)
            .map(|(span, _)| span.clone())
            .collect()
    }

    #[test]
    fn with_span_parents_diagnostics_on_given_span() {
        let layer = CaptureLayer::default();
        let subscriber = tracing_subscriber::registry().with(layer.clone());
        tracing::subscriber::with_default(subscriber, || {
            let span = tracing::info_span!("camera-session", id = 1);
            let store = ParameterStore::with_span("a=1;b=2,3;broken", span);
            assert_eq!(store.to_string().len(), "a=1;b=2,3".len());
            drop(store);

            let unscoped = ParameterStore::new("c=4");
            drop(unscoped);
        });

        let events = layer.events.lock().clone();
        let session = Some("camera-session".to_string());
        assert_eq!(span_of(&events, "param"), vec![session.clone(), session.clone(), None]);
        assert_eq!(span_of(&events, "params new"), vec![session.clone(), None]);
        assert_eq!(span_of(&events, "params destroy"), vec![session, None]);
    }

    #[test]
    fn debug_output_reports_counts() {
        let store = ParameterStore::new("a=1;b=2");
        assert_eq!(format!("{store:?}"), "ParameterStore { params: 2, dirty: false }");
    }
}
