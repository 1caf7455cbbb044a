use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{Local, NaiveDateTime};
use tracing::{debug, error, info, warn};

use crate::models::Event;
use crate::services::mailer::Mailer;
use crate::store::Store;

/// Periodic reminder sweep.
///
/// Scans every stored event on a fixed cadence and sends at most one email
/// per event occurrence shortly before it starts. The sent flag is
/// persisted back to the store, so re-running a tick (or restarting the
/// process) never produces a duplicate notification.
pub struct ReminderSweep {
    store: Store,
    mailer: Arc<dyn Mailer>,
    window_minutes: u64,
}

impl ReminderSweep {
    pub fn new(store: Store, mailer: Arc<dyn Mailer>, window_minutes: u64) -> Self {
        Self {
            store,
            mailer,
            window_minutes,
        }
    }

    /// Run the sweep loop until the process exits.
    ///
    /// One loop, each tick awaited to completion before the next interval
    /// fires, so two ticks can never overlap. A tick that overruns the
    /// interval causes later ticks to be skipped, not queued.
    pub async fn run(self, interval_secs: u64) {
        info!(
            interval_secs,
            window_minutes = self.window_minutes,
            "reminder sweep started"
        );

        let mut interval = tokio::time::interval(Duration::from_secs(interval_secs));
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        loop {
            interval.tick().await;
            self.run_tick(Local::now().naive_local()).await;
        }
    }

    /// One full evaluation pass over all events.
    ///
    /// `now` is injected so tests can pin the clock. Nothing in here is
    /// fatal to the loop: delivery failures leave the event pending for the
    /// next tick, unresolvable recipients are skipped.
    pub async fn run_tick(&self, now: NaiveDateTime) {
        let mut events = self.store.load_events().await;
        let users = self.store.load_users().await;

        let emails_by_user: HashMap<u64, &str> =
            users.iter().map(|u| (u.id, u.email.as_str())).collect();

        let window_secs = (self.window_minutes * 60) as i64;
        let mut changed = false;

        for event in events.iter_mut() {
            let Some(start) = event.start() else {
                continue;
            };

            let seconds_until_start = (start - now).num_seconds();
            let eligible =
                seconds_until_start > 0 && seconds_until_start <= window_secs && !event.reminder_sent;
            if !eligible {
                continue;
            }

            // Prefer the live user record; fall back to the denormalized
            // copy taken at creation time
            let recipient = emails_by_user
                .get(&event.owner_user_id)
                .map(|e| e.to_string())
                .or_else(|| {
                    if event.owner_email.is_empty() {
                        None
                    } else {
                        Some(event.owner_email.clone())
                    }
                });

            let Some(recipient) = recipient else {
                warn!(
                    event_id = event.id,
                    owner_user_id = event.owner_user_id,
                    "no recipient address resolvable, skipping reminder"
                );
                continue;
            };

            let subject = format!("Reminder: {}", event.title);
            let body = render_reminder_html(event);

            match self.mailer.send(&recipient, &subject, &body).await {
                Ok(()) => {
                    event.reminder_sent = true;
                    changed = true;
                    info!(
                        event_id = event.id,
                        to = %recipient,
                        seconds_until_start,
                        "reminder delivered"
                    );
                }
                Err(e) => {
                    // Left pending; retried next tick while still inside
                    // the window
                    error!(event_id = event.id, "reminder delivery failed: {}", e);
                }
            }
        }

        if changed {
            if let Err(e) = self.store.save_events(&events).await {
                error!("failed to persist reminder flags: {}", e);
            }
        } else {
            debug!("sweep tick complete, nothing to send");
        }
    }
}

fn render_reminder_html(event: &Event) -> String {
    format!(
        "<h2>{}</h2>\
         <p><b>Starts:</b> {}</p>\
         <p><b>Location:</b> {}</p>\
         <p><b>Duration:</b> {} minutes</p>\
         <p>{}</p>",
        event.title,
        event.datetime,
        event.location.as_deref().unwrap_or("not specified"),
        event.duration_minutes,
        event.notes.as_deref().unwrap_or(""),
    )
}
