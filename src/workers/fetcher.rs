//! Region and station-history fetches on tokio tasks

use super::core::EventSender;
use crate::dispatch::{FetchQuery, UiEvent};
use crate::events::EventType;
use crate::logging::LogLevel;
use crate::model::Pollutant;
use crate::network::NetworkClient;
use tokio::task::JoinHandle;

/// Runs one region fetch and posts [`UiEvent::FetchCompleted`] with `seq`.
pub fn spawn_fetch(
    client: NetworkClient,
    sender: EventSender,
    seq: u64,
    query: FetchQuery,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        sender
            .send_fetch_event(
                format!("Fetch #{}: requesting stations...", seq),
                EventType::Waiting,
                LogLevel::Debug,
            )
            .await;
        let result = client.fetch_region(query.bbox, query.parameter).await;
        sender
            .send_completion(UiEvent::FetchCompleted { seq, result })
            .await;
    })
}

/// Runs one history fetch and posts [`UiEvent::HistoryCompleted`] with `seq`.
pub fn spawn_history(
    client: NetworkClient,
    sender: EventSender,
    seq: u64,
    station_id: u64,
    pollutant: Pollutant,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        sender
            .send_history_event(
                format!("Requesting {} history for station {}", pollutant, station_id),
                EventType::Waiting,
                LogLevel::Debug,
            )
            .await;
        let result = client.fetch_history(station_id, pollutant).await;
        sender
            .send_completion(UiEvent::HistoryCompleted {
                seq,
                station_id,
                result,
            })
            .await;
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::BoundingBox;
    use crate::network::FetchSettings;
    use crate::openaq::error::ApiError;
    use crate::openaq::{LocationPage, MockOpenAq};
    use crate::workers::WorkerMessage;
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::sync::mpsc;

    fn client(api: MockOpenAq) -> NetworkClient {
        NetworkClient::new(
            Arc::new(api),
            FetchSettings {
                page_limit: 100,
                max_pages: 2,
                backoff: Duration::from_millis(10),
                min_request_interval: Duration::ZERO,
                history_days: 7,
            },
        )
    }

    async fn next_completion(rx: &mut mpsc::Receiver<WorkerMessage>) -> UiEvent {
        loop {
            match rx.recv().await {
                Some(WorkerMessage::Completed(event)) => return event,
                Some(WorkerMessage::Activity(_)) => continue,
                None => panic!("channel closed before completion"),
            }
        }
    }

    #[tokio::test]
    async fn fetch_completion_carries_its_sequence_number() {
        let mut api = MockOpenAq::new();
        api.expect_locations()
            .returning(|_, _| Ok(LocationPage::default()));
        let (tx, mut rx) = mpsc::channel(8);

        let query = FetchQuery {
            bbox: BoundingBox::world(),
            parameter: None,
        };
        spawn_fetch(client(api), EventSender::new(tx), 42, query)
            .await
            .unwrap();

        match next_completion(&mut rx).await {
            UiEvent::FetchCompleted { seq, result } => {
                assert_eq!(seq, 42);
                assert!(result.unwrap().stations.is_empty());
            }
            other => panic!("unexpected event {:?}", other),
        }
    }

    #[tokio::test]
    async fn history_failure_is_posted_back() {
        let mut api = MockOpenAq::new();
        api.expect_measurements().returning(|_| {
            Err(ApiError::Http {
                status: 404,
                message: "Not Found".to_string(),
            })
        });
        let (tx, mut rx) = mpsc::channel(8);

        spawn_history(client(api), EventSender::new(tx), 3, 9, Pollutant::Pm10)
            .await
            .unwrap();

        match next_completion(&mut rx).await {
            UiEvent::HistoryCompleted {
                seq,
                station_id,
                result,
            } => {
                assert_eq!((seq, station_id), (3, 9));
                assert!(result.is_err());
            }
            other => panic!("unexpected event {:?}", other),
        }
    }
}
