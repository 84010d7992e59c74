//! The monitoring loop.
//!
//! Contract: never terminate because of a failed iteration. Each attribute
//! read is defaulted independently, the sink push happens exactly once per
//! tick, and a failed push costs a short backoff before the next tick. Only
//! the stop channel ends the loop.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, watch};
use tokio::time::MissedTickBehavior;

use lockbox_client::{ClientError, LockboxClient, Transport};

use crate::sample::{self, TelemetrySample};
use crate::sink::TelemetrySink;

pub struct Monitor {
    pub interval: Duration,
    pub backoff: Duration,
}

impl Default for Monitor {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(2),
            backoff: Duration::from_secs(1),
        }
    }
}

impl Monitor {
    /// Poll `client` and push to `sink` until `stop` turns true (or the stop
    /// sender is dropped). The client is shared with the command dispatcher;
    /// the mutex serializes at attribute-operation granularity.
    pub async fn run<T: Transport, S: TelemetrySink>(
        &self,
        client: Arc<Mutex<LockboxClient<T>>>,
        sink: S,
        mut stop: watch::Receiver<bool>,
    ) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {}
                changed = stop.changed() => {
                    if changed.is_err() || *stop.borrow() {
                        break;
                    }
                    continue;
                }
            }

            let sample = capture(&client).await;
            if let Err(e) = sink.push(&sample).await {
                tracing::warn!(error = %e, "telemetry push failed");
                tokio::time::sleep(self.backoff).await;
            }
        }

        tracing::info!("monitor stopped");
    }
}

/// Assemble a sample from whatever reads succeed. A single failing attribute
/// never blocks the others.
async fn capture<T: Transport>(client: &Arc<Mutex<LockboxClient<T>>>) -> TelemetrySample {
    let client = client.lock().await;

    let username = match client.read_username().await {
        Ok(name) => name,
        Err(e) => {
            warn_read("username", &e);
            "unknown".to_string()
        }
    };
    let lock_status = ok_or_warn("lock status", client.read_lock_status().await);
    let user_status = ok_or_warn("user status", client.read_user_status().await);
    let voc = ok_or_warn("voc reading", client.read_voc().await);

    TelemetrySample {
        captured_at: sample::current_timestamp(),
        username,
        lock_status,
        user_status,
        voc,
    }
}

fn ok_or_warn<V>(what: &str, result: Result<V, ClientError>) -> Option<V> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            warn_read(what, &e);
            None
        }
    }
}

fn warn_read(what: &str, error: &ClientError) {
    tracing::warn!(what, error = %error, "attribute read failed, defaulting");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::SinkError;
    use lockbox_client::{Session, TransportError};
    use lockbox_proto::{AttributeId, LockStatus, VocReading, codec};
    use std::sync::Mutex as StdMutex;

    /// Healthy peripheral except the VOC read, which fails every third call.
    #[derive(Default)]
    struct FlakyVocTransport {
        voc_reads: StdMutex<u32>,
    }

    impl Transport for FlakyVocTransport {
        type Peripheral = ();
        type Connection = ();

        async fn scan(&self, _target_name: &str) -> Result<Option<()>, TransportError> {
            Ok(Some(()))
        }

        async fn connect(&self, _peripheral: &()) -> Result<(), TransportError> {
            Ok(())
        }

        async fn read_attribute(&self, _conn: &(), id: AttributeId) -> Result<Vec<u8>, TransportError> {
            match id {
                AttributeId::Username => Ok(b"PC_CLIENT".to_vec()),
                AttributeId::LockStatus => Ok(vec![0]),
                AttributeId::UserStatus => Ok(vec![0, 0, 0, 0]),
                AttributeId::VocSensor => {
                    let mut reads = self.voc_reads.lock().unwrap();
                    *reads += 1;
                    if *reads % 3 == 0 {
                        Err(TransportError::Failed("voc read timeout".into()))
                    } else {
                        Ok(codec::encode_voc(&VocReading {
                            current_voc: 250,
                            threshold: 1000,
                            timestamp: *reads,
                        })
                        .to_vec())
                    }
                }
                other => Err(TransportError::MissingAttribute(other)),
            }
        }

        async fn write_attribute(
            &self,
            _conn: &(),
            _id: AttributeId,
            _data: &[u8],
        ) -> Result<(), TransportError> {
            Ok(())
        }

        async fn disconnect(&self, _conn: ()) {}
    }

    #[derive(Clone, Default)]
    struct VecSink {
        samples: Arc<StdMutex<Vec<TelemetrySample>>>,
    }

    impl TelemetrySink for VecSink {
        async fn push(&self, sample: &TelemetrySample) -> Result<(), SinkError> {
            self.samples.lock().unwrap().push(sample.clone());
            Ok(())
        }
    }

    #[derive(Clone, Default)]
    struct FailingSink {
        attempts: Arc<StdMutex<u32>>,
    }

    impl TelemetrySink for FailingSink {
        async fn push(&self, _sample: &TelemetrySample) -> Result<(), SinkError> {
            *self.attempts.lock().unwrap() += 1;
            Err(SinkError::Status(reqwest::StatusCode::INTERNAL_SERVER_ERROR))
        }
    }

    async fn shared_client<T: Transport>(transport: T) -> Arc<Mutex<LockboxClient<T>>> {
        let mut client = LockboxClient::new(Session::new(transport));
        let peripheral = client.discover("SecureLockbox", 1).await.unwrap();
        client.connect(&peripheral).await.unwrap();
        Arc::new(Mutex::new(client))
    }

    #[tokio::test(start_paused = true)]
    async fn loop_defaults_voc_on_failing_ticks_and_keeps_running() {
        let client = shared_client(FlakyVocTransport::default()).await;
        let sink = VecSink::default();
        let samples = sink.samples.clone();
        let (stop_tx, stop_rx) = watch::channel(false);

        let monitor = Monitor {
            interval: Duration::from_millis(100),
            backoff: Duration::from_millis(10),
        };

        tokio::join!(monitor.run(client, sink, stop_rx), async {
            loop {
                if samples.lock().unwrap().len() >= 6 {
                    let _ = stop_tx.send(true);
                    break;
                }
                tokio::time::sleep(Duration::from_millis(20)).await;
            }
        });

        let samples = samples.lock().unwrap();
        assert!(samples.len() >= 5, "expected at least 5 ticks, got {}", samples.len());
        for (i, sample) in samples.iter().enumerate() {
            let failing_tick = (i + 1) % 3 == 0;
            assert_eq!(
                sample.voc.is_none(),
                failing_tick,
                "tick {} voc defaulting mismatch",
                i + 1
            );
            assert_eq!(sample.username, "PC_CLIENT");
            assert_eq!(sample.lock_status, Some(LockStatus::Closed));
            assert!(sample.user_status.is_some());
        }
    }

    #[tokio::test(start_paused = true)]
    async fn loop_survives_a_failing_sink() {
        let client = shared_client(FlakyVocTransport::default()).await;
        let sink = FailingSink::default();
        let attempts = sink.attempts.clone();
        let (stop_tx, stop_rx) = watch::channel(false);

        let monitor = Monitor {
            interval: Duration::from_millis(100),
            backoff: Duration::from_millis(10),
        };

        tokio::join!(monitor.run(client, sink, stop_rx), async {
            loop {
                if *attempts.lock().unwrap() >= 3 {
                    let _ = stop_tx.send(true);
                    break;
                }
                tokio::time::sleep(Duration::from_millis(20)).await;
            }
        });

        assert!(*attempts.lock().unwrap() >= 3);
    }

    #[tokio::test(start_paused = true)]
    async fn stop_flag_ends_the_loop_promptly() {
        let client = shared_client(FlakyVocTransport::default()).await;
        let sink = VecSink::default();
        let (stop_tx, stop_rx) = watch::channel(false);

        let monitor = Monitor::default();
        tokio::join!(monitor.run(client, sink, stop_rx), async {
            tokio::time::sleep(Duration::from_millis(50)).await;
            let _ = stop_tx.send(true);
        });
        // Reaching here is the assertion: run returned on the stop signal.
    }
}
