use async_trait::async_trait;
use bson::oid::ObjectId;
use carewise_chat::{ChatError, ChatService, MessageRole, ThreadSelector};
use carewise_history::{HistoryError, HistoryStore, StoredMessage, ThreadIdentity};
use carewise_llm::{ChatMessage, CompletionClient, CompletionError, Role};
use carewise_records::{BloodPressure, HealthRecord, NewHealthRecord, RecordStore, Symptoms};
use chrono::{TimeZone, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

// ---------------------------------------------------------------------------
// In-memory fakes
// ---------------------------------------------------------------------------

#[derive(Default)]
struct MemoryHistoryStore {
    threads: Mutex<HashMap<ThreadIdentity, Vec<StoredMessage>>>,
}

impl MemoryHistoryStore {
    async fn thread_count(&self) -> usize {
        self.threads.lock().await.len()
    }
}

#[async_trait]
impl HistoryStore for MemoryHistoryStore {
    async fn get_or_create(
        &self,
        identity: &ThreadIdentity,
    ) -> Result<Vec<StoredMessage>, HistoryError> {
        let mut threads = self.threads.lock().await;
        Ok(threads.entry(identity.clone()).or_default().clone())
    }

    async fn append(
        &self,
        identity: &ThreadIdentity,
        messages: Vec<StoredMessage>,
    ) -> Result<(), HistoryError> {
        let mut threads = self.threads.lock().await;
        let transcript = threads
            .get_mut(identity)
            .ok_or_else(|| HistoryError::ThreadNotFound(identity.to_string()))?;
        transcript.extend(messages);
        Ok(())
    }

    async fn clear(&self, identity: &ThreadIdentity) -> Result<(), HistoryError> {
        let mut threads = self.threads.lock().await;
        let transcript = threads
            .get_mut(identity)
            .ok_or_else(|| HistoryError::ThreadNotFound(identity.to_string()))?;
        transcript.clear();
        Ok(())
    }

    async fn read(&self, identity: &ThreadIdentity) -> Result<Vec<StoredMessage>, HistoryError> {
        let threads = self.threads.lock().await;
        Ok(threads.get(identity).cloned().unwrap_or_default())
    }
}

#[derive(Default)]
struct MemoryRecordStore {
    records: Mutex<Vec<HealthRecord>>,
}

impl MemoryRecordStore {
    async fn insert(&self, record: HealthRecord) {
        self.records.lock().await.push(record);
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn create(
        &self,
        user_id: &str,
        record: NewHealthRecord,
    ) -> Result<HealthRecord, carewise_records::RecordError> {
        let now = Utc::now();
        let record = HealthRecord {
            id: ObjectId::new(),
            user_id: user_id.to_string(),
            heart_rate: record.heart_rate,
            spo2: record.spo2,
            temperature: record.temperature,
            blood_pressure: record.blood_pressure,
            symptoms: record.symptoms,
            created_at: now,
            updated_at: now,
        };
        self.insert(record.clone()).await;
        Ok(record)
    }

    async fn find_by_id(
        &self,
        user_id: &str,
        record_id: &str,
    ) -> Result<Option<HealthRecord>, carewise_records::RecordError> {
        let records = self.records.lock().await;
        Ok(records
            .iter()
            .find(|r| r.id.to_hex() == record_id && r.user_id == user_id)
            .cloned())
    }

    async fn find_latest_for_user(
        &self,
        user_id: &str,
    ) -> Result<Option<HealthRecord>, carewise_records::RecordError> {
        let records = self.records.lock().await;
        Ok(records
            .iter()
            .filter(|r| r.user_id == user_id)
            .max_by_key(|r| r.created_at)
            .cloned())
    }

    async fn list_for_user(
        &self,
        user_id: &str,
    ) -> Result<Vec<HealthRecord>, carewise_records::RecordError> {
        let records = self.records.lock().await;
        let mut matching: Vec<_> = records
            .iter()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(matching)
    }
}

/// Scripted completion client that records every request it receives.
struct StubCompletion {
    reply: String,
    echo: bool,
    fail: std::sync::atomic::AtomicBool,
    requests: Mutex<Vec<Vec<ChatMessage>>>,
}

impl StubCompletion {
    fn replying(reply: &str) -> Self {
        Self {
            reply: reply.to_string(),
            echo: false,
            fail: std::sync::atomic::AtomicBool::new(false),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Reply with "echo: <last user message>" so tests can match each
    /// assistant reply back to the turn that produced it.
    fn echoing() -> Self {
        let mut stub = Self::replying("");
        stub.echo = true;
        stub
    }

    fn failing() -> Self {
        let stub = Self::replying("");
        stub.fail.store(true, std::sync::atomic::Ordering::SeqCst);
        stub
    }

    async fn last_request(&self) -> Vec<ChatMessage> {
        self.requests.lock().await.last().cloned().unwrap()
    }
}

#[async_trait]
impl CompletionClient for StubCompletion {
    async fn complete(&self, messages: Vec<ChatMessage>) -> Result<String, CompletionError> {
        if self.fail.load(std::sync::atomic::Ordering::SeqCst) {
            return Err(CompletionError::Unavailable);
        }
        let reply = if self.echo {
            let last = messages.last().map(|m| m.content.as_str()).unwrap_or("");
            format!("echo: {}", last)
        } else {
            self.reply.clone()
        };
        self.requests.lock().await.push(messages);
        Ok(reply)
    }
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

fn throat_record(user_id: &str) -> HealthRecord {
    HealthRecord {
        id: ObjectId::new(),
        user_id: user_id.to_string(),
        heart_rate: 88,
        spo2: 97,
        temperature: 99.2,
        blood_pressure: BloodPressure {
            systolic: 120,
            diastolic: 80,
        },
        symptoms: Symptoms::Throat {
            difficulty_swallowing: true,
            throat_pain: true,
        },
        created_at: Utc.with_ymd_and_hms(2026, 3, 14, 9, 30, 0).unwrap(),
        updated_at: Utc.with_ymd_and_hms(2026, 3, 14, 9, 30, 0).unwrap(),
    }
}

struct Harness {
    history: Arc<MemoryHistoryStore>,
    records: Arc<MemoryRecordStore>,
    completion: Arc<StubCompletion>,
    service: ChatService,
}

fn harness(completion: StubCompletion) -> Harness {
    let history = Arc::new(MemoryHistoryStore::default());
    let records = Arc::new(MemoryRecordStore::default());
    let completion = Arc::new(completion);
    let service = ChatService::new(history.clone(), records.clone(), completion.clone());
    Harness {
        history,
        records,
        completion,
        service,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[tokio::test]
async fn transcript_alternates_user_assistant() {
    let h = harness(StubCompletion::replying("sure"));

    for i in 0..3 {
        h.service
            .send_turn("u1", ThreadSelector::Main, &format!("question {}", i))
            .await
            .unwrap();
    }

    let transcript = h
        .service
        .get_history("u1", ThreadSelector::Main)
        .await
        .unwrap();

    assert_eq!(transcript.len(), 6);
    for (i, message) in transcript.iter().enumerate() {
        let expected = if i % 2 == 0 {
            MessageRole::User
        } else {
            MessageRole::Assistant
        };
        assert_eq!(message.role, expected);
    }
}

#[tokio::test]
async fn send_turn_returns_full_updated_transcript() {
    let h = harness(StubCompletion::replying("hello!"));

    let first = h
        .service
        .send_turn("u1", ThreadSelector::Main, "hi")
        .await
        .unwrap();
    assert_eq!(first.len(), 2);

    let second = h
        .service
        .send_turn("u1", ThreadSelector::Main, "again")
        .await
        .unwrap();
    assert_eq!(second.len(), 4);
    assert_eq!(second[2].content, "again");
    assert_eq!(second[3].content, "hello!");
}

#[tokio::test]
async fn clear_then_get_returns_empty() {
    let h = harness(StubCompletion::replying("ok"));

    for _ in 0..2 {
        h.service
            .send_turn("u1", ThreadSelector::Main, "hi")
            .await
            .unwrap();
    }

    h.service
        .clear_history("u1", ThreadSelector::Main)
        .await
        .unwrap();

    let transcript = h
        .service
        .get_history("u1", ThreadSelector::Main)
        .await
        .unwrap();
    assert!(transcript.is_empty());
}

#[tokio::test]
async fn clear_before_any_turn_fails_with_thread_not_found() {
    let h = harness(StubCompletion::replying("ok"));

    let result = h.service.clear_history("u1", ThreadSelector::Main).await;
    assert!(matches!(result, Err(ChatError::ThreadNotFound(_))));
}

#[tokio::test]
async fn get_history_tolerates_missing_thread() {
    let h = harness(StubCompletion::replying("ok"));

    let transcript = h
        .service
        .get_history("u1", ThreadSelector::Main)
        .await
        .unwrap();
    assert!(transcript.is_empty());
}

#[tokio::test]
async fn identities_do_not_share_state() {
    let h = harness(StubCompletion::replying("ok"));
    let record_a = throat_record("u1");
    let record_b = throat_record("u1");
    let id_a = record_a.id.to_hex();
    let id_b = record_b.id.to_hex();
    h.records.insert(record_a).await;
    h.records.insert(record_b).await;

    h.service
        .send_turn("u1", ThreadSelector::Main, "main q")
        .await
        .unwrap();
    h.service
        .send_turn("u1", ThreadSelector::FormSpecific(id_a.clone()), "form q")
        .await
        .unwrap();

    let main = h
        .service
        .get_history("u1", ThreadSelector::Main)
        .await
        .unwrap();
    let form_a = h
        .service
        .get_history("u1", ThreadSelector::FormSpecific(id_a))
        .await
        .unwrap();
    let form_b = h
        .service
        .get_history("u1", ThreadSelector::FormSpecific(id_b))
        .await
        .unwrap();

    assert_eq!(main.len(), 2);
    assert_eq!(form_a.len(), 2);
    assert!(form_b.is_empty());
    assert_eq!(main[0].content, "main q");
    assert_eq!(form_a[0].content, "form q");
}

#[tokio::test]
async fn failed_completion_persists_nothing() {
    let h = harness(StubCompletion::failing());

    let result = h.service.send_turn("u1", ThreadSelector::Main, "hi").await;
    assert!(matches!(result, Err(ChatError::CompletionUnavailable)));

    let transcript = h
        .service
        .get_history("u1", ThreadSelector::Main)
        .await
        .unwrap();
    assert!(transcript.is_empty());
}

#[tokio::test]
async fn foreign_record_fails_without_store_mutation() {
    let h = harness(StubCompletion::replying("ok"));
    let foreign = throat_record("someone-else");
    let foreign_id = foreign.id.to_hex();
    h.records.insert(foreign).await;

    let result = h
        .service
        .send_turn("u1", ThreadSelector::FormSpecific(foreign_id), "hi")
        .await;

    assert!(matches!(result, Err(ChatError::RecordNotFound(_))));
    assert_eq!(h.history.thread_count().await, 0);
}

#[tokio::test]
async fn empty_message_rejected_before_io() {
    let h = harness(StubCompletion::replying("ok"));

    let result = h.service.send_turn("u1", ThreadSelector::Main, "   ").await;
    assert!(matches!(result, Err(ChatError::Validation(_))));
    assert_eq!(h.history.thread_count().await, 0);
}

#[tokio::test]
async fn form_turn_composes_prompt_from_bound_record() {
    let h = harness(StubCompletion::replying("eat warm soup"));
    let record = throat_record("u1");
    let record_id = record.id.to_hex();
    h.records.insert(record).await;

    let transcript = h
        .service
        .send_turn(
            "u1",
            ThreadSelector::FormSpecific(record_id.clone()),
            "What should I eat?",
        )
        .await
        .unwrap();

    // Outbound sequence starts with the freshly composed system prompt
    let request = h.completion.last_request().await;
    assert_eq!(request[0].role, Role::System);
    assert!(request[0].content.contains("88 bpm"));
    assert!(request[0].content.contains("throat"));
    assert_eq!(request.last().unwrap().content, "What should I eat?");

    assert_eq!(transcript.len(), 2);
    assert_eq!(transcript[0].role, MessageRole::User);
    assert_eq!(transcript[0].content, "What should I eat?");
    assert_eq!(transcript[1].role, MessageRole::Assistant);
    assert_eq!(transcript[1].content, "eat warm soup");
}

#[tokio::test]
async fn main_turn_uses_latest_record_or_generic_prompt() {
    let h = harness(StubCompletion::replying("ok"));

    // No records yet: generic framing, no vitals
    h.service
        .send_turn("u1", ThreadSelector::Main, "hello")
        .await
        .unwrap();
    let request = h.completion.last_request().await;
    assert!(!request[0].content.contains("bpm"));

    // With a record on file, the main prompt reflects it on the next turn
    h.records.insert(throat_record("u1")).await;
    h.service
        .send_turn("u1", ThreadSelector::Main, "and now?")
        .await
        .unwrap();
    let request = h.completion.last_request().await;
    assert!(request[0].content.contains("88 bpm"));
    assert!(request[0].content.contains("throat"));
}

#[tokio::test]
async fn system_prompt_is_never_persisted() {
    let h = harness(StubCompletion::replying("ok"));
    h.records.insert(throat_record("u1")).await;

    h.service
        .send_turn("u1", ThreadSelector::Main, "hi")
        .await
        .unwrap();

    let transcript = h
        .service
        .get_history("u1", ThreadSelector::Main)
        .await
        .unwrap();
    assert_eq!(transcript.len(), 2);
    assert!(transcript
        .iter()
        .all(|m| matches!(m.role, MessageRole::User | MessageRole::Assistant)));
    assert!(transcript.iter().all(|m| !m.content.contains("88 bpm")));
}

#[tokio::test]
async fn concurrent_turns_keep_each_pair_adjacent() {
    let h = harness(StubCompletion::echoing());
    let service = Arc::new(h.service);

    let mut tasks = tokio::task::JoinSet::new();
    for i in 0..8 {
        let service = service.clone();
        tasks.spawn(async move {
            service
                .send_turn("u1", ThreadSelector::Main, &format!("turn {}", i))
                .await
        });
    }
    while let Some(result) = tasks.join_next().await {
        result.unwrap().unwrap();
    }

    let transcript = service
        .get_history("u1", ThreadSelector::Main)
        .await
        .unwrap();

    // Every turn lands as an adjacent (user, assistant) pair regardless of
    // interleaving, and the racing creations share one thread.
    assert_eq!(transcript.len(), 16);
    for pair in transcript.chunks(2) {
        assert_eq!(pair[0].role, MessageRole::User);
        assert_eq!(pair[1].role, MessageRole::Assistant);
        assert_eq!(pair[1].content, format!("echo: {}", pair[0].content));
    }
    assert_eq!(h.history.thread_count().await, 1);
}

#[tokio::test]
async fn replay_includes_prior_turns_in_order() {
    let h = harness(StubCompletion::replying("reply"));

    h.service
        .send_turn("u1", ThreadSelector::Main, "first")
        .await
        .unwrap();
    h.service
        .send_turn("u1", ThreadSelector::Main, "second")
        .await
        .unwrap();

    let request = h.completion.last_request().await;
    // [system, user "first", assistant "reply", user "second"]
    assert_eq!(request.len(), 4);
    assert_eq!(request[1].content, "first");
    assert_eq!(request[2].content, "reply");
    assert_eq!(request[3].content, "second");
}
