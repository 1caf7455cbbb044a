//! End-to-end reminder sweep scenarios against a real on-disk store.

use std::path::PathBuf;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::NaiveDateTime;

use schedulite::models::{Event, User};
use schedulite::schedule::{self, Status, DATETIME_FORMAT};
use schedulite::services::mailer::{MailError, Mailer};
use schedulite::services::reminder::ReminderSweep;
use schedulite::store::Store;

static DIR_SEQ: AtomicU32 = AtomicU32::new(0);

struct RecordingMailer {
    sent: Mutex<Vec<String>>,
}

impl RecordingMailer {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            sent: Mutex::new(Vec::new()),
        })
    }

    fn sent_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, to: &str, _subject: &str, _html_body: &str) -> Result<(), MailError> {
        self.sent.lock().unwrap().push(to.to_string());
        Ok(())
    }
}

fn temp_store() -> (Store, PathBuf) {
    let dir = std::env::temp_dir().join(format!(
        "schedulite-scenario-test-{}-{}",
        std::process::id(),
        DIR_SEQ.fetch_add(1, Ordering::SeqCst)
    ));
    (Store::new(&dir), dir)
}

fn at(s: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(s, DATETIME_FORMAT).expect("test datetime must parse")
}

fn event(id: u64, datetime: &str, duration_minutes: u32) -> Event {
    Event {
        id,
        title: format!("event-{}", id),
        date: String::new(),
        time: String::new(),
        datetime: datetime.to_string(),
        location: None,
        duration_minutes,
        notes: None,
        owner_user_id: 1,
        owner_email: "alice@example.com".to_string(),
        reminder_sent: false,
        status: Status::default(),
    }
}

fn alice() -> User {
    User {
        id: 1,
        username: "alice".to_string(),
        email: "alice@example.com".to_string(),
        password_hash: String::new(),
    }
}

// Status classification at fixed instants.
#[test]
fn status_worked_examples() {
    assert_eq!(
        schedule::classify("2024-01-01 10:00", 30, at("2024-01-01 10:15")),
        Status::Now
    );
    assert_eq!(
        schedule::classify("2024-01-01 10:00", 30, at("2024-01-01 10:31")),
        Status::Past
    );
    assert_eq!(
        schedule::classify("2024-01-01 23:00", 0, at("2024-01-01 09:00")),
        Status::Upcoming
    );
}

// An event just after midnight is Later (different calendar date) yet still
// inside the reminder window at 23:50 the evening before.
#[tokio::test]
async fn later_event_across_midnight_still_gets_a_reminder() {
    let (store, dir) = temp_store();
    store.save_users(&[alice()]).await.unwrap();
    store
        .save_events(&[event(1, "2024-01-02 00:05", 30)])
        .await
        .unwrap();

    let now = at("2024-01-01 23:50");
    assert_eq!(schedule::classify("2024-01-02 00:05", 30, now), Status::Later);

    let mailer = RecordingMailer::new();
    let sweep = ReminderSweep::new(store.clone(), mailer.clone(), 15);
    sweep.run_tick(now).await;

    assert_eq!(mailer.sent_count(), 1);
    assert!(store.load_events().await[0].reminder_sent);

    let _ = tokio::fs::remove_dir_all(dir).await;
}

// Pending -> Sent -> (edit) -> Pending -> Sent: editing the start time
// resets eligibility for the new occurrence.
#[tokio::test]
async fn editing_the_event_makes_it_eligible_again() {
    let (store, dir) = temp_store();
    store.save_users(&[alice()]).await.unwrap();
    store
        .save_events(&[event(1, "2024-01-01 10:10", 30)])
        .await
        .unwrap();

    let mailer = RecordingMailer::new();
    let sweep = ReminderSweep::new(store.clone(), mailer.clone(), 15);

    sweep.run_tick(at("2024-01-01 10:00")).await;
    assert_eq!(mailer.sent_count(), 1);

    // Rescheduled to the afternoon; the web layer resets the flag on edit
    let mut events = store.load_events().await;
    events[0].datetime = "2024-01-01 15:10".to_string();
    events[0].reminder_sent = false;
    store.save_events(&events).await.unwrap();

    // Not yet inside the new window
    sweep.run_tick(at("2024-01-01 14:00")).await;
    assert_eq!(mailer.sent_count(), 1);

    // Inside the new window: second occurrence, second reminder
    sweep.run_tick(at("2024-01-01 15:00")).await;
    assert_eq!(mailer.sent_count(), 2);

    // And never a third for the same occurrence
    sweep.run_tick(at("2024-01-01 15:01")).await;
    assert_eq!(mailer.sent_count(), 2);

    let _ = tokio::fs::remove_dir_all(dir).await;
}

// A deleted event is simply gone before the next tick can act on it.
#[tokio::test]
async fn deleted_event_is_never_notified() {
    let (store, dir) = temp_store();
    store.save_users(&[alice()]).await.unwrap();
    store
        .save_events(&[event(1, "2024-01-01 10:10", 30)])
        .await
        .unwrap();

    store.save_events(&[]).await.unwrap();

    let mailer = RecordingMailer::new();
    let sweep = ReminderSweep::new(store.clone(), mailer.clone(), 15);
    sweep.run_tick(at("2024-01-01 10:00")).await;

    assert_eq!(mailer.sent_count(), 0);

    let _ = tokio::fs::remove_dir_all(dir).await;
}

// Mixed store: one event inside the window, one already started, one far
// out. Exactly one reminder goes out and exactly one flag flips.
#[tokio::test]
async fn mixed_store_sends_only_for_the_window() {
    let (store, dir) = temp_store();
    store.save_users(&[alice()]).await.unwrap();
    store
        .save_events(&[
            event(1, "2024-01-01 09:55", 30), // already started
            event(2, "2024-01-01 10:10", 30), // inside window
            event(3, "2024-01-01 18:00", 30), // far out
        ])
        .await
        .unwrap();

    let mailer = RecordingMailer::new();
    let sweep = ReminderSweep::new(store.clone(), mailer.clone(), 15);
    sweep.run_tick(at("2024-01-01 10:00")).await;

    assert_eq!(mailer.sent_count(), 1);

    let events = store.load_events().await;
    assert!(!events[0].reminder_sent);
    assert!(events[1].reminder_sent);
    assert!(!events[2].reminder_sent);

    let _ = tokio::fs::remove_dir_all(dir).await;
}
