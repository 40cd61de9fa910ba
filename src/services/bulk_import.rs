//! Bulk import pipeline
//!
//! Fan-out of input lines into creation messages over the broker, fan-in
//! of results into one report plus a primary redirect target.
//!
//! The publisher does not assume eventual consistency: consumers ack each
//! hash on a completion tracker after persisting, and the pipeline waits
//! (bounded) on those acks before its final store read pass. A message
//! that never acks keeps its row, marked still processing.

use std::collections::HashSet;
use std::io::BufRead;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tokio::sync::Notify;
use tokio::time::timeout;
use tracing::{debug, error, warn};

use crate::broker::{BulkCreateMessage, MessageBroker, MessageHandler};
use crate::config::get_config;
use crate::errors::{Result, ShortUrlError};
use crate::services::classification::ClassificationService;
use crate::storage::{Link, LinkProperties, LinkStore, RedirectMode};
use crate::utils::compute_hash;
use crate::utils::url_validator::is_valid_url;

/// Sentinel primary hash when no input line was valid
pub const EMPTY_PRIMARY_HASH: &str = "";

const INVALID_LINE_DIAGNOSTIC: &str = "must be an http/https URI";
const PENDING_DIAGNOSTIC: &str = "still processing";
const PUBLISH_FAILED_DIAGNOSTIC: &str = "could not be queued";

/// Caller-supplied properties applied to every imported link
#[derive(Debug, Clone)]
pub struct BulkImportProperties {
    pub ip: Option<String>,
    pub sponsor: Option<String>,
    pub safe: bool,
}

impl Default for BulkImportProperties {
    fn default() -> Self {
        Self {
            ip: None,
            sponsor: None,
            safe: true,
        }
    }
}

/// One report row per input line, in input order
#[derive(Debug, Clone)]
pub struct ReportRow {
    /// The original input line, verbatim
    pub input: String,
    /// Hash assigned to the line, empty when the line was invalid
    pub hash: String,
    /// Human-readable diagnostic, empty when the link was confirmed
    pub message: String,
}

#[derive(Debug, Clone)]
pub struct BulkImportReport {
    /// Hash of the first valid input line whose record was confirmed, or
    /// [`EMPTY_PRIMARY_HASH`]
    pub primary_hash: String,
    pub rows: Vec<ReportRow>,
}

impl BulkImportReport {
    /// Render the report as CSV: `input,hash,message` per line
    pub fn body(&self) -> Result<String> {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(Vec::new());
        for row in &self.rows {
            writer.write_record([&row.input, &row.hash, &row.message])?;
        }
        let bytes = writer
            .into_inner()
            .map_err(|e| ShortUrlError::serialization(e.to_string()))?;
        String::from_utf8(bytes).map_err(|e| ShortUrlError::serialization(e.to_string()))
    }
}

/// Read bulk input lines from a reader.
///
/// I/O failures surface as a generic `Import` error; the underlying cause
/// is logged here and never leaks to the client.
pub fn read_lines<R: BufRead>(reader: R) -> Result<Vec<String>> {
    let mut lines = Vec::new();
    for line in reader.lines() {
        match line {
            Ok(line) => lines.push(line),
            Err(e) => {
                warn!("Failed to read bulk input: {}", e);
                return Err(ShortUrlError::import("could not read bulk input"));
            }
        }
    }
    Ok(lines)
}

/// Per-hash completion channel between consumers and the import pipeline.
///
/// Waiters register before the message is published, so a consumer that
/// finishes first leaves a stored permit rather than a lost wakeup.
/// Registrations are counted per hash: duplicate lines in a batch and
/// concurrent imports of the same URL share one entry, and the entry is
/// removed only when the last registration releases it. Acks for hashes
/// nobody is waiting on (late re-deliveries) are dropped.
#[derive(Default)]
pub struct CompletionTracker {
    waiters: DashMap<String, Waiter>,
}

struct Waiter {
    notify: Arc<Notify>,
    registrations: usize,
}

impl CompletionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    fn register(&self, hash: &str) -> Arc<Notify> {
        let mut entry = self
            .waiters
            .entry(hash.to_string())
            .or_insert_with(|| Waiter {
                notify: Arc::new(Notify::new()),
                registrations: 0,
            });
        entry.registrations += 1;
        entry.notify.clone()
    }

    /// Ack one processed message for `hash`
    pub fn complete(&self, hash: &str) {
        if let Some(entry) = self.waiters.get(hash) {
            entry.notify.notify_one();
        }
    }

    /// Release one registration; the entry survives until the last one
    fn deregister(&self, hash: &str) {
        if let Entry::Occupied(mut entry) = self.waiters.entry(hash.to_string()) {
            if entry.get().registrations <= 1 {
                entry.remove();
            } else {
                entry.get_mut().registrations -= 1;
            }
        }
    }
}

pub struct BulkImportService {
    store: Arc<dyn LinkStore>,
    broker: Arc<dyn MessageBroker>,
    tracker: Arc<CompletionTracker>,
    topic: String,
    ack_timeout: Duration,
}

impl BulkImportService {
    /// Build with topic and ack timeout from the process configuration
    pub fn new(
        store: Arc<dyn LinkStore>,
        broker: Arc<dyn MessageBroker>,
        tracker: Arc<CompletionTracker>,
    ) -> Self {
        let bulk = &get_config().bulk;
        Self::with_settings(
            store,
            broker,
            tracker,
            bulk.topic.clone(),
            Duration::from_millis(bulk.ack_timeout_ms),
        )
    }

    pub fn with_settings(
        store: Arc<dyn LinkStore>,
        broker: Arc<dyn MessageBroker>,
        tracker: Arc<CompletionTracker>,
        topic: String,
        ack_timeout: Duration,
    ) -> Self {
        Self {
            store,
            broker,
            tracker,
            topic,
            ack_timeout,
        }
    }

    /// Import a batch of candidate URLs.
    ///
    /// Produces exactly one row per input line, in input order. Invalid
    /// lines are never published. Valid lines are published as
    /// [`BulkCreateMessage`]s; the pipeline then waits for consumer acks
    /// and confirms each hash against the store before assembling the
    /// report.
    pub async fn import_bulk<I>(
        &self,
        lines: I,
        properties: &BulkImportProperties,
    ) -> Result<BulkImportReport>
    where
        I: IntoIterator<Item = String>,
    {
        let mut rows: Vec<ReportRow> = Vec::new();
        // (row index, hash) for every published line
        let mut published: Vec<(usize, String)> = Vec::new();
        // one waiter per distinct hash; duplicate lines share the record
        let mut waiters: Vec<(String, Arc<Notify>)> = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();

        for line in lines {
            if !is_valid_url(&line) {
                rows.push(ReportRow {
                    input: line,
                    hash: String::new(),
                    message: INVALID_LINE_DIAGNOSTIC.to_string(),
                });
                continue;
            }

            let hash = compute_hash(&line);
            let message = BulkCreateMessage {
                target: line.clone(),
                hash: hash.clone(),
                safe: properties.safe,
                ip: properties.ip.clone(),
                sponsor: properties.sponsor.clone(),
            };
            let payload = message.encode()?;

            // register before publish: a consumer may ack before we wait
            let notify = self.tracker.register(&hash);

            match self.broker.publish(&self.topic, payload).await {
                Ok(()) => {
                    published.push((rows.len(), hash.clone()));
                    if seen.insert(hash.clone()) {
                        waiters.push((hash.clone(), notify));
                    }
                    rows.push(ReportRow {
                        input: line,
                        hash,
                        message: String::new(),
                    });
                }
                Err(e) => {
                    warn!("Failed to publish bulk creation for {}: {}", hash, e);
                    self.tracker.deregister(&hash);
                    rows.push(ReportRow {
                        input: line,
                        hash: String::new(),
                        message: PUBLISH_FAILED_DIAGNOSTIC.to_string(),
                    });
                }
            }
        }

        // fan-in: bounded wait for one ack per distinct hash
        for (hash, notify) in &waiters {
            if timeout(self.ack_timeout, notify.notified()).await.is_err() {
                debug!(
                    "No ack for {} within {:?}, reporting from store state",
                    hash, self.ack_timeout
                );
            }
        }
        // one release per registration, i.e. per published line
        for (_, hash) in &published {
            self.tracker.deregister(hash);
        }

        // confirm persistence; the store is the authority, not the ack
        let mut primary_hash = EMPTY_PRIMARY_HASH.to_string();
        for (index, hash) in published {
            match self.store.get(&hash).await? {
                Some(_) => {
                    if primary_hash.is_empty() {
                        primary_hash = hash;
                    }
                }
                None => {
                    rows[index].message = PENDING_DIAGNOSTIC.to_string();
                }
            }
        }

        Ok(BulkImportReport { primary_hash, rows })
    }
}

/// Queue consumer for bulk creation messages.
///
/// Persists the link exactly as `create()` would, classifies it
/// synchronously, then acks the hash. Idempotent under re-delivery: the
/// store's `put` is insert-if-absent by hash and classification re-applies
/// the same terminal values.
pub struct BulkConsumer {
    store: Arc<dyn LinkStore>,
    classifier: Arc<ClassificationService>,
    tracker: Arc<CompletionTracker>,
}

impl BulkConsumer {
    pub fn new(
        store: Arc<dyn LinkStore>,
        classifier: Arc<ClassificationService>,
        tracker: Arc<CompletionTracker>,
    ) -> Self {
        Self {
            store,
            classifier,
            tracker,
        }
    }
}

#[async_trait]
impl MessageHandler for BulkConsumer {
    async fn handle(&self, payload: String) {
        let message = match BulkCreateMessage::decode(&payload) {
            Ok(message) => message,
            Err(e) => {
                warn!("Dropping malformed bulk creation message: {}", e);
                return;
            }
        };

        let link = Link {
            hash: message.hash.clone(),
            target: message.target.clone(),
            mode: RedirectMode::default(),
            created_at: Utc::now(),
            properties: LinkProperties {
                owner_ip: message.ip.clone(),
                sponsor: message.sponsor.clone(),
                safe: message.safe,
                spam: false,
                processing: true,
            },
        };

        if let Err(e) = self.store.put(link).await {
            // no ack: the import report will show the row as pending
            error!("Bulk creation failed for {}: {}", message.hash, e);
            return;
        }

        if let Err(e) = self
            .classifier
            .classify(message.ip.as_deref(), &message.target, &message.hash)
            .await
        {
            error!("Bulk classification failed for {}: {}", message.hash, e);
        }

        // ack only after the record is visible in the store
        self.tracker.complete(&message.hash);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_body_renders_csv() {
        let report = BulkImportReport {
            primary_hash: "AbC".to_string(),
            rows: vec![
                ReportRow {
                    input: "http://a.example/".to_string(),
                    hash: "AbC".to_string(),
                    message: String::new(),
                },
                ReportRow {
                    input: "not-a-url".to_string(),
                    hash: String::new(),
                    message: INVALID_LINE_DIAGNOSTIC.to_string(),
                },
            ],
        };
        let body = report.body().unwrap();
        let lines: Vec<&str> = body.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("http://a.example/,AbC,"));
        assert!(lines[1].contains("must be an http/https URI"));
    }

    #[test]
    fn test_report_body_quotes_commas() {
        let report = BulkImportReport {
            primary_hash: EMPTY_PRIMARY_HASH.to_string(),
            rows: vec![ReportRow {
                input: "http://a.example/a,b".to_string(),
                hash: String::new(),
                message: INVALID_LINE_DIAGNOSTIC.to_string(),
            }],
        };
        let body = report.body().unwrap();
        assert!(body.starts_with("\"http://a.example/a,b\""));
    }

    #[test]
    fn test_read_lines() {
        let input = b"http://a.example/\nnot-a-url\n" as &[u8];
        let lines = read_lines(input).unwrap();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], "http://a.example/");
    }

    #[test]
    fn test_read_lines_io_failure_yields_generic_import_error() {
        struct BrokenReader;

        impl std::io::Read for BrokenReader {
            fn read(&mut self, _buf: &mut [u8]) -> std::io::Result<usize> {
                Err(std::io::Error::new(
                    std::io::ErrorKind::Other,
                    "disk read failed on /dev/sda1",
                ))
            }
        }

        let result = read_lines(std::io::BufReader::new(BrokenReader));
        match result {
            Err(ShortUrlError::Import(msg)) => {
                // generic diagnostic only; the cause goes to the log
                assert_eq!(msg, "could not read bulk input");
                assert!(!msg.contains("/dev/sda1"));
            }
            other => panic!("expected an Import error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_tracker_ack_before_wait_is_not_lost() {
        let tracker = CompletionTracker::new();
        let notify = tracker.register("abc");
        tracker.complete("abc");
        // permit was stored, so this returns immediately
        timeout(Duration::from_millis(100), notify.notified())
            .await
            .expect("stored permit should wake the waiter");
    }

    #[test]
    fn test_ack_without_waiter_is_dropped() {
        let tracker = CompletionTracker::new();
        tracker.complete("nobody-waiting");
        assert!(tracker.waiters.is_empty());
    }

    #[tokio::test]
    async fn test_waiter_survives_until_last_registration_released() {
        let tracker = CompletionTracker::new();
        let notify = tracker.register("abc");
        let _shared = tracker.register("abc");

        // one registration released (failed publish, or another batch
        // finishing): the remaining waiter must still receive the ack
        tracker.deregister("abc");
        tracker.complete("abc");
        timeout(Duration::from_millis(100), notify.notified())
            .await
            .expect("surviving waiter should be woken by the ack");

        tracker.deregister("abc");
        assert!(tracker.waiters.is_empty());
    }
}
