//! Focus Sync Service
//!
//! Drives the remote focus operation log: composes verb-tagged log entries
//! from cached session state, submits them through the transport seam, and
//! ingests the reply back into the store. Stateless request handlers call
//! these methods concurrently; the store's mutex is the only coordination,
//! and it is never held across a remote round trip.
//!
//! Concurrent pause/continue on the same session are deliberately left
//! unserialized: submissions may interleave and the last ingest to run
//! determines cached state. The service mirrors a single operator's timer,
//! not a multi-writer log.

use chrono::Utc;
use log::{debug, warn};
use serde_json::Value;
use std::sync::Arc;

use crate::remote::transport::{AuthTokens, FocusTransport};

use super::error::{FocusError, FocusResult};
use super::ingest::apply_response;
use super::object_id::ObjectIdGenerator;
use super::state::FocusStateStore;
use super::types::{
    ControlOptions, FocusBatchRequest, FocusOp, FocusOperation, StartOptions, StopOptions,
    FOCUS_OBJECT_TYPE,
};

/// Per-call field overrides for the composer. Override wins, else the
/// stored value, else the verb default already in the store.
#[derive(Debug, Default, Clone)]
struct ComposeOverrides {
    manual: Option<bool>,
    duration: Option<i64>,
    auto_pomo_left: Option<i64>,
    pomo_count: Option<i64>,
    note: Option<String>,
}

impl ComposeOverrides {
    fn from_control(options: &ControlOptions) -> Self {
        Self {
            manual: options.manual,
            note: options.note.clone(),
            ..Self::default()
        }
    }
}

/// Synchronizer for the remote focus session log
pub struct FocusSyncService {
    store: FocusStateStore,
    ids: ObjectIdGenerator,
    transport: Arc<dyn FocusTransport>,
}

impl FocusSyncService {
    pub fn new(store: FocusStateStore, transport: Arc<dyn FocusTransport>) -> Self {
        Self {
            store,
            ids: ObjectIdGenerator::new(),
            transport,
        }
    }

    pub fn store(&self) -> &FocusStateStore {
        &self.store
    }

    /// UTC timestamp in the exact shape the batch endpoint expects:
    /// millisecond precision with a literal `+0000` suffix.
    fn utc_time_string() -> String {
        Utc::now().format("%Y-%m-%dT%H:%M:%S%.3f+0000").to_string()
    }

    fn build_request(
        &self,
        op_list: Vec<FocusOperation>,
        last_point: Option<i64>,
    ) -> FocusBatchRequest {
        let last_point = last_point.unwrap_or_else(|| self.store.read(|s| s.last_point));
        FocusBatchRequest {
            last_point,
            op_list,
        }
    }

    /// Build one log entry against the cached session. Pure read of the
    /// store; fails when no session is mirrored.
    fn compose(&self, op: FocusOp, overrides: ComposeOverrides) -> FocusResult<FocusOperation> {
        let state = self.store.snapshot();
        let focus_id = state.focus_id.ok_or(FocusError::NoActiveSession)?;
        let first_focus_id = state.first_focus_id.unwrap_or_else(|| focus_id.clone());

        Ok(FocusOperation {
            id: self.ids.generate(),
            o_id: focus_id,
            o_type: FOCUS_OBJECT_TYPE,
            op,
            duration: overrides.duration.unwrap_or(state.duration),
            first_focus_id,
            focus_on_id: state.focus_on_id,
            focus_on_type: state.focus_on_type,
            focus_on_title: state.focus_on_title,
            auto_pomo_left: overrides.auto_pomo_left.unwrap_or(state.auto_pomo_left),
            pomo_count: overrides.pomo_count.unwrap_or(state.pomo_count),
            manual: overrides.manual.unwrap_or(state.manual),
            note: overrides.note.unwrap_or(state.note),
            time: Self::utc_time_string(),
            created_time: Some(Utc::now().timestamp_millis()),
        })
    }

    /// Copy caller-supplied session attributes into the cache.
    fn apply_control_options(&self, options: &ControlOptions) {
        self.store.with_state(|state| {
            if let Some(manual) = options.manual {
                state.manual = manual;
            }
            if let Some(ref note) = options.note {
                state.note = note.clone();
            }
            if let Some(focus_on_type) = options.focus_on_type {
                state.focus_on_type = Some(focus_on_type);
            }
            if let Some(ref title) = options.focus_on_title {
                state.focus_on_title = Some(title.clone());
            }
        });
    }

    /// Submit outside the lock, then fold the reply into the store. A
    /// transport failure leaves the store untouched, which can leave a
    /// locally-started session unmirrored remotely; the next ensure pass
    /// reconciles.
    async fn submit_and_ingest(
        &self,
        auth: &AuthTokens,
        request: FocusBatchRequest,
    ) -> FocusResult<Value> {
        let reply = self.transport.submit(auth, &request).await?;
        apply_response(&self.store, &reply);
        Ok(reply)
    }

    /// Guarantee a mirrored session before a continuation verb. Cached
    /// session: immediate success with no remote call. Otherwise one
    /// state-only query, ingest, re-check. Transport failures during
    /// recovery are absorbed; the caller only ever sees `NoActiveSession`.
    async fn ensure_context(&self, auth: &AuthTokens, last_point: Option<i64>) -> FocusResult<()> {
        if self.store.read(|s| s.has_session()) {
            return Ok(());
        }

        debug!("[ensure_context] no cached session, querying remote state");
        match self.query(auth, last_point).await {
            Ok(_) => {}
            Err(err) => debug!("[ensure_context] recovery query failed: {err}"),
        }

        if self.store.read(|s| s.has_session()) {
            debug!("[ensure_context] recovered session from remote");
            Ok(())
        } else {
            warn!("[ensure_context] no session cached or recoverable");
            Err(FocusError::NoActiveSession)
        }
    }

    /// Start a new focus session. Bypasses the ensurer: a fresh chain is
    /// being created, so prior context is irrelevant.
    pub async fn start(&self, auth: &AuthTokens, options: StartOptions) -> FocusResult<Value> {
        let focus_id = self.ids.generate();

        self.store.with_state(|state| {
            state.focus_id = Some(focus_id.clone());
            state.first_focus_id = Some(focus_id.clone());
            state.duration = options.duration;
            state.auto_pomo_left = options.auto_pomo_left;
            state.pomo_count = options.pomo_count;
            state.manual = options.manual;
            state.note = options.note.clone();
            state.focus_on_id = options.focus_on_id.clone();
            state.focus_on_type = options.focus_on_type;
            state.focus_on_title = options.focus_on_title.clone();
        });

        debug!(
            "[focus_start] focusId={} duration={} autoPomoLeft={} pomoCount={} focusOnId={:?}",
            focus_id, options.duration, options.auto_pomo_left, options.pomo_count,
            options.focus_on_id
        );

        let operation = FocusOperation {
            id: self.ids.generate(),
            o_id: focus_id.clone(),
            o_type: FOCUS_OBJECT_TYPE,
            op: FocusOp::Start,
            duration: options.duration,
            first_focus_id: focus_id,
            focus_on_id: options.focus_on_id,
            focus_on_type: options.focus_on_type,
            focus_on_title: options.focus_on_title,
            auto_pomo_left: options.auto_pomo_left,
            pomo_count: options.pomo_count,
            manual: options.manual,
            note: options.note,
            time: Self::utc_time_string(),
            created_time: Some(Utc::now().timestamp_millis()),
        };

        let request = self.build_request(vec![operation], options.last_point);
        self.submit_and_ingest(auth, request).await
    }

    pub async fn pause(&self, auth: &AuthTokens, options: ControlOptions) -> FocusResult<Value> {
        self.control_verb(auth, FocusOp::Pause, options).await
    }

    pub async fn resume(&self, auth: &AuthTokens, options: ControlOptions) -> FocusResult<Value> {
        self.control_verb(auth, FocusOp::Continue, options).await
    }

    pub async fn finish(&self, auth: &AuthTokens, options: ControlOptions) -> FocusResult<Value> {
        self.control_verb(auth, FocusOp::Finish, options).await
    }

    /// Shared path for pause/continue/finish: ensure, compose one entry,
    /// fold the caller's attribute overrides into the cache, submit.
    async fn control_verb(
        &self,
        auth: &AuthTokens,
        op: FocusOp,
        options: ControlOptions,
    ) -> FocusResult<Value> {
        self.ensure_context(auth, options.last_point).await?;

        let operation = self.compose(op, ComposeOverrides::from_control(&options))?;
        self.apply_control_options(&options);

        debug!("[focus_{op}] submitting oId={}", operation.o_id);
        let request = self.build_request(vec![operation], options.last_point);
        self.submit_and_ingest(auth, request).await
    }

    /// Terminate the session: one `drop` with duration forced to 0 and,
    /// unless disabled, one `exit` with the counters zeroed. Both entries
    /// are composed against the pre-drop context. If that context vanishes
    /// between the two compositions the exit is skipped silently; the drop
    /// going through matters more than the exit.
    pub async fn stop(&self, auth: &AuthTokens, options: StopOptions) -> FocusResult<Value> {
        let control = options.control();
        self.ensure_context(auth, control.last_point).await?;

        let drop_op = self.compose(
            FocusOp::Drop,
            ComposeOverrides {
                duration: Some(0),
                ..ComposeOverrides::from_control(&control)
            },
        )?;

        let mut op_list = vec![drop_op];

        if options.include_exit {
            match self.compose(
                FocusOp::Exit,
                ComposeOverrides {
                    duration: Some(0),
                    auto_pomo_left: Some(0),
                    pomo_count: Some(0),
                    ..ComposeOverrides::from_control(&control)
                },
            ) {
                Ok(exit_op) => op_list.push(exit_op),
                Err(FocusError::NoActiveSession) => {
                    debug!("[focus_stop] context cleared after drop, skipping exit")
                }
                Err(err) => return Err(err),
            }
        }

        debug!("[focus_stop] submitting {} operation(s)", op_list.len());
        let request = self.build_request(op_list, control.last_point);
        self.submit_and_ingest(auth, request).await
    }

    /// State-only sync: empty operation list, cached (or overridden)
    /// pointer. Requires no local session.
    pub async fn query(&self, auth: &AuthTokens, last_point: Option<i64>) -> FocusResult<Value> {
        let request = self.build_request(Vec::new(), last_point);
        debug!("[focus_current] lastPoint={}", request.last_point);
        self.submit_and_ingest(auth, request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use serde_json::json;
    use std::collections::VecDeque;

    /// Records every submitted batch and plays back canned replies.
    struct MockTransport {
        requests: Mutex<Vec<FocusBatchRequest>>,
        replies: Mutex<VecDeque<FocusResult<Value>>>,
    }

    impl MockTransport {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                requests: Mutex::new(Vec::new()),
                replies: Mutex::new(VecDeque::new()),
            })
        }

        fn push_reply(&self, reply: FocusResult<Value>) {
            self.replies.lock().push_back(reply);
        }

        fn requests(&self) -> Vec<FocusBatchRequest> {
            self.requests.lock().clone()
        }
    }

    #[async_trait]
    impl FocusTransport for MockTransport {
        async fn submit(
            &self,
            _auth: &AuthTokens,
            payload: &FocusBatchRequest,
        ) -> FocusResult<Value> {
            self.requests.lock().push(payload.clone());
            self.replies
                .lock()
                .pop_front()
                .unwrap_or_else(|| Ok(json!({})))
        }
    }

    fn auth() -> AuthTokens {
        AuthTokens::new("token", "csrf")
    }

    fn service_with(transport: Arc<MockTransport>) -> FocusSyncService {
        FocusSyncService::new(FocusStateStore::new(), transport)
    }

    #[tokio::test]
    async fn test_start_composes_expected_operation() {
        let transport = MockTransport::new();
        transport.push_reply(Ok(json!({
            "point": 42,
            "current": {"id": "abc123abc123abc123abc123", "status": 1}
        })));
        let service = service_with(transport.clone());

        service.start(&auth(), StartOptions::default()).await.unwrap();

        let requests = transport.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].op_list.len(), 1);

        let op = &requests[0].op_list[0];
        assert_eq!(op.op, FocusOp::Start);
        assert_eq!(op.duration, 25);
        assert_eq!(op.auto_pomo_left, 5);
        assert_eq!(op.pomo_count, 1);
        assert_eq!(op.o_id, op.first_focus_id);
        assert_eq!(op.id.len(), 24);
        assert_ne!(op.id, op.o_id);
        assert!(op.time.ends_with("+0000"));

        // Ingest of the echo moved the pointer and adopted the remote id
        let snapshot = service.store().snapshot();
        assert_eq!(snapshot.last_point, 42);
        assert_eq!(
            snapshot.focus_id.as_deref(),
            Some("abc123abc123abc123abc123")
        );
    }

    #[tokio::test]
    async fn test_session_ids_stable_across_pause_continue() {
        let transport = MockTransport::new();
        let service = service_with(transport.clone());

        service.start(&auth(), StartOptions::default()).await.unwrap();
        let started = service.store().snapshot();
        let focus_id = started.focus_id.clone().unwrap();
        assert_eq!(started.first_focus_id.as_deref(), Some(focus_id.as_str()));

        service.pause(&auth(), ControlOptions::default()).await.unwrap();
        service.resume(&auth(), ControlOptions::default()).await.unwrap();
        service.pause(&auth(), ControlOptions::default()).await.unwrap();

        let snapshot = service.store().snapshot();
        assert_eq!(snapshot.focus_id.as_deref(), Some(focus_id.as_str()));
        assert_eq!(snapshot.first_focus_id.as_deref(), Some(focus_id.as_str()));

        for request in transport.requests().iter().skip(1) {
            assert_eq!(request.op_list[0].o_id, focus_id);
            assert_eq!(request.op_list[0].first_focus_id, focus_id);
        }
    }

    #[tokio::test]
    async fn test_pointer_never_decreases_via_echo() {
        let transport = MockTransport::new();
        transport.push_reply(Ok(json!({"point": 10})));
        transport.push_reply(Ok(json!({"point": 25})));
        let service = service_with(transport.clone());

        service.start(&auth(), StartOptions::default()).await.unwrap();
        assert_eq!(service.store().snapshot().last_point, 10);
        service.pause(&auth(), ControlOptions::default()).await.unwrap();
        assert_eq!(service.store().snapshot().last_point, 25);
    }

    #[tokio::test]
    async fn test_continuation_on_empty_store_yields_no_active_session() {
        let transport = MockTransport::new();
        transport.push_reply(Ok(json!({"error": "HTTP 401", "text": ""})));
        let service = service_with(transport.clone());

        let err = service
            .pause(&auth(), ControlOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, FocusError::NoActiveSession));

        // Exactly one recovery submission, and it was state-only
        let requests = transport.requests();
        assert_eq!(requests.len(), 1);
        assert!(requests[0].op_list.is_empty());
    }

    #[tokio::test]
    async fn test_ensure_context_recovers_from_remote() {
        let transport = MockTransport::new();
        transport.push_reply(Ok(json!({
            "point": 7,
            "current": {"id": "remote-session", "firstId": "remote-session", "status": 1}
        })));
        let service = service_with(transport.clone());

        service.pause(&auth(), ControlOptions::default()).await.unwrap();

        let requests = transport.requests();
        assert_eq!(requests.len(), 2);
        assert!(requests[0].op_list.is_empty());
        assert_eq!(requests[1].op_list[0].op, FocusOp::Pause);
        assert_eq!(requests[1].op_list[0].o_id, "remote-session");
        // The recovered pointer rides along on the follow-up submission
        assert_eq!(requests[1].last_point, 7);
    }

    #[tokio::test]
    async fn test_ensure_context_skips_remote_when_cached() {
        let transport = MockTransport::new();
        let service = service_with(transport.clone());

        service.start(&auth(), StartOptions::default()).await.unwrap();
        service.pause(&auth(), ControlOptions::default()).await.unwrap();

        // start + pause only; no recovery query in between
        assert_eq!(transport.requests().len(), 2);
    }

    #[tokio::test]
    async fn test_stop_without_exit_submits_single_drop() {
        let transport = MockTransport::new();
        let service = service_with(transport.clone());

        service.start(&auth(), StartOptions::default()).await.unwrap();
        let focus_id = service.store().snapshot().focus_id.unwrap();

        let options = StopOptions {
            include_exit: false,
            ..StopOptions::default()
        };
        service.stop(&auth(), options).await.unwrap();

        let requests = transport.requests();
        let stop_request = &requests[1];
        assert_eq!(stop_request.op_list.len(), 1);
        assert_eq!(stop_request.op_list[0].op, FocusOp::Drop);
        assert_eq!(stop_request.op_list[0].duration, 0);
        assert_eq!(stop_request.op_list[0].o_id, focus_id);
    }

    #[tokio::test]
    async fn test_stop_with_exit_submits_drop_then_exit() {
        let transport = MockTransport::new();
        let service = service_with(transport.clone());

        let options = StartOptions {
            pomo_count: 3,
            ..StartOptions::default()
        };
        service.start(&auth(), options).await.unwrap();
        let focus_id = service.store().snapshot().focus_id.unwrap();

        service.stop(&auth(), StopOptions::default()).await.unwrap();

        let requests = transport.requests();
        let stop_request = &requests[1];
        assert_eq!(stop_request.op_list.len(), 2);

        let drop_op = &stop_request.op_list[0];
        assert_eq!(drop_op.op, FocusOp::Drop);
        assert_eq!(drop_op.duration, 0);
        assert_eq!(drop_op.pomo_count, 3);

        let exit_op = &stop_request.op_list[1];
        assert_eq!(exit_op.op, FocusOp::Exit);
        assert_eq!(exit_op.duration, 0);
        assert_eq!(exit_op.auto_pomo_left, 0);
        assert_eq!(exit_op.pomo_count, 0);

        // Both reference the pre-drop session
        assert_eq!(drop_op.o_id, focus_id);
        assert_eq!(exit_op.o_id, focus_id);
    }

    #[tokio::test]
    async fn test_query_on_empty_store_sends_state_only_batch() {
        let transport = MockTransport::new();
        transport.push_reply(Ok(json!({
            "point": 100,
            "current": {"id": "srv", "status": 1}
        })));
        let service = service_with(transport.clone());
        service.store().set_point(33);

        service.query(&auth(), None).await.unwrap();

        let requests = transport.requests();
        assert_eq!(requests.len(), 1);
        assert!(requests[0].op_list.is_empty());
        assert_eq!(requests[0].last_point, 33);

        let snapshot = service.store().snapshot();
        assert_eq!(snapshot.focus_id.as_deref(), Some("srv"));
        assert_eq!(snapshot.last_point, 100);
    }

    #[tokio::test]
    async fn test_transport_failure_leaves_store_unchanged() {
        let transport = MockTransport::new();
        let service = service_with(transport.clone());

        service.start(&auth(), StartOptions::default()).await.unwrap();
        let before = service.store().snapshot();

        transport.push_reply(Err(FocusError::Transport("connect timeout".to_string())));
        let err = service
            .pause(&auth(), ControlOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, FocusError::Transport(_)));

        let after = service.store().snapshot();
        assert_eq!(after.focus_id, before.focus_id);
        assert_eq!(after.last_point, before.last_point);
        assert_eq!(after.pomo_count, before.pomo_count);
    }

    #[tokio::test]
    async fn test_control_overrides_update_cache_and_operation() {
        let transport = MockTransport::new();
        let service = service_with(transport.clone());

        service.start(&auth(), StartOptions::default()).await.unwrap();

        let options = ControlOptions {
            manual: Some(false),
            note: Some("switching tasks".to_string()),
            focus_on_title: Some("写周报".to_string()),
            ..ControlOptions::default()
        };
        service.pause(&auth(), options).await.unwrap();

        let pause_op = &transport.requests()[1].op_list[0];
        assert!(!pause_op.manual);
        assert_eq!(pause_op.note, "switching tasks");

        let snapshot = service.store().snapshot();
        assert!(!snapshot.manual);
        assert_eq!(snapshot.note, "switching tasks");
        assert_eq!(snapshot.focus_on_title.as_deref(), Some("写周报"));
    }

    #[tokio::test]
    async fn test_last_point_override_wins_over_cache() {
        let transport = MockTransport::new();
        let service = service_with(transport.clone());
        service.store().set_point(5);

        let options = StartOptions {
            last_point: Some(1234),
            ..StartOptions::default()
        };
        service.start(&auth(), options).await.unwrap();

        assert_eq!(transport.requests()[0].last_point, 1234);
    }

    #[tokio::test]
    async fn test_terminal_reply_resets_session_but_keeps_pointer() {
        let transport = MockTransport::new();
        let service = service_with(transport.clone());

        service.start(&auth(), StartOptions::default()).await.unwrap();
        transport.push_reply(Ok(json!({
            "point": 50,
            "current": {"id": "abc", "status": 2}
        })));
        service.finish(&auth(), ControlOptions::default()).await.unwrap();

        let snapshot = service.store().snapshot();
        assert!(snapshot.focus_id.is_none());
        assert_eq!(snapshot.last_point, 50);
    }
}
