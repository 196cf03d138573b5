use std::sync::Arc;

use tokio::sync::mpsc;

use super::Broker;
use super::engine::DeliveryReport;
use super::message::{Frame, LinkEvent};
use super::topic::Topic;
use crate::client::Subscriber;
use crate::utils::error::RelayError;

fn subscriber(topic: &str, buffer: usize) -> (Subscriber, mpsc::Receiver<Frame>) {
    let (tx, rx) = mpsc::channel(buffer);
    (Subscriber::new(topic, tx), rx)
}

#[test]
fn test_topic_new() {
    let topic = Topic::new("initialSetup");
    assert_eq!(topic.name, "initialSetup");
    assert!(topic.is_empty());
}

#[test]
fn test_topic_subscribe_is_unique_per_connection() {
    let topic = Topic::new("t");
    let (sub, _rx) = subscriber("t", 1);
    let id = sub.id.clone();

    topic.subscribe(sub.clone());
    topic.subscribe(sub);
    assert_eq!(topic.len(), 1);
    assert!(topic.contains(&id));
}

#[test]
fn test_topic_unsubscribe() {
    let topic = Topic::new("t");
    let (sub, _rx) = subscriber("t", 1);
    let id = sub.id.clone();
    topic.subscribe(sub);

    assert!(topic.unsubscribe(&id));
    assert!(!topic.unsubscribe(&id));
    assert!(topic.is_empty());
}

#[test]
fn test_broker_new() {
    let broker = Broker::default();
    assert_eq!(broker.topic_count(), 0);
}

#[test]
fn test_topic_created_once() {
    let broker = Broker::new();
    let a = broker.topic("t");
    let b = broker.topic("t");
    assert!(Arc::ptr_eq(&a, &b));
    assert_eq!(broker.topic_count(), 1);
}

#[test]
fn test_broker_subscribe_and_unsubscribe() {
    let broker = Broker::new();
    let (sub, _rx) = subscriber("initialSetup", 4);
    let id = sub.id.clone();

    broker.subscribe(sub);
    assert_eq!(broker.subscriber_count("initialSetup"), 1);

    assert!(broker.unsubscribe("initialSetup", &id));
    assert!(!broker.unsubscribe("initialSetup", &id));
    assert!(!broker.unsubscribe("never-seen", &id));
    assert_eq!(broker.subscriber_count("initialSetup"), 0);
}

#[test]
fn test_publish_without_subscribers_creates_empty_topic() {
    let broker = Broker::new();
    let event = LinkEvent::new("42", "initialSetup");

    assert!(broker.publish("initialSetup", &event).is_ok());
    assert_eq!(broker.topic_count(), 1);
    assert_eq!(broker.subscriber_count("initialSetup"), 0);
}

#[test]
fn test_publish_rejects_invalid_event() {
    let broker = Broker::new();
    let event = LinkEvent::new("", "initialSetup");

    assert!(matches!(
        broker.publish("initialSetup", &event),
        Err(RelayError::InvalidEvent(_))
    ));
}

#[test]
fn test_broker_publish() {
    let broker = Broker::new();
    let (sub, mut rx) = subscriber("initialSetup", 4);
    broker.subscribe(sub);

    let mut event = LinkEvent::new("42", "initialSetup");
    event.org_id = Some("7".to_string());
    broker.publish("initialSetup", &event).unwrap();

    match rx.try_recv().unwrap() {
        Frame::Event(json) => {
            let value: serde_json::Value = serde_json::from_str(&json).unwrap();
            assert_eq!(value["projectID"], "42");
            assert_eq!(value["orgID"], "7");
            assert_eq!(value["action"], "initialSetup");
        }
        other => panic!("Expected an event frame, got {other:?}"),
    }
}

#[test]
fn test_fan_out_attempts_every_subscriber() {
    let broker = Broker::new();
    let mut receivers = Vec::new();
    for _ in 0..5 {
        let (sub, rx) = subscriber("t", 4);
        broker.subscribe(sub);
        receivers.push(rx);
    }

    let report = broker.fan_out("t", Frame::Heartbeat);
    assert_eq!(
        report,
        DeliveryReport {
            attempted: 5,
            delivered: 5,
            evicted: 0
        }
    );
    for rx in receivers.iter_mut() {
        assert_eq!(rx.try_recv().unwrap(), Frame::Heartbeat);
    }
}

#[test]
fn test_failed_subscriber_does_not_affect_others() {
    let broker = Broker::new();
    let (gone, gone_rx) = subscriber("t", 4);
    let (live, mut live_rx) = subscriber("t", 4);
    broker.subscribe(gone);
    broker.subscribe(live);
    drop(gone_rx);

    let report = broker.fan_out("t", Frame::Heartbeat);
    assert_eq!(report.attempted, 2);
    assert_eq!(report.delivered, 1);
    assert_eq!(live_rx.try_recv().unwrap(), Frame::Heartbeat);
    assert_eq!(broker.subscriber_count("t"), 1);
}

#[test]
fn test_lagging_subscriber_is_evicted() {
    let broker = Broker::new();
    let (slow, _slow_rx) = subscriber("t", 1);
    let (fast, mut fast_rx) = subscriber("t", 8);
    let slow_id = slow.id.clone();
    broker.subscribe(slow);
    broker.subscribe(fast);

    broker.fan_out("t", Frame::Heartbeat);
    let report = broker.fan_out("t", Frame::Heartbeat);

    assert_eq!(report.evicted, 1);
    assert!(!broker.topic("t").contains(&slow_id));
    assert_eq!(fast_rx.try_recv().unwrap(), Frame::Heartbeat);
    assert_eq!(fast_rx.try_recv().unwrap(), Frame::Heartbeat);
}

#[test]
fn test_no_cross_topic_delivery() {
    let broker = Broker::new();
    let (a, mut a_rx) = subscriber("a", 4);
    let (b, mut b_rx) = subscriber("b", 4);
    broker.subscribe(a);
    broker.subscribe(b);

    broker.publish("a", &LinkEvent::new("1", "a")).unwrap();

    assert!(a_rx.try_recv().is_ok());
    assert!(b_rx.try_recv().is_err());
}

#[test]
fn test_close_all_releases_every_subscriber() {
    let broker = Broker::new();
    let (a, mut a_rx) = subscriber("a", 4);
    let (b, mut b_rx) = subscriber("b", 4);
    broker.subscribe(a);
    broker.subscribe(b);

    broker.close_all();

    assert_eq!(broker.subscriber_count("a"), 0);
    assert_eq!(broker.subscriber_count("b"), 0);
    assert_eq!(a_rx.try_recv(), Err(mpsc::error::TryRecvError::Disconnected));
    assert_eq!(b_rx.try_recv(), Err(mpsc::error::TryRecvError::Disconnected));
}

#[test]
fn test_event_json_shape() {
    let mut event = LinkEvent::new("42", "initialSetup");
    event.user_agent = Some("curl/8".to_string());

    let value = serde_json::to_value(&event).unwrap();
    assert_eq!(value["projectID"], "42");
    assert_eq!(value["userAgent"], "curl/8");
    assert!(value.get("orgID").is_none());
    assert!(value.get("fromIp").is_none());

    let received_at = value["receivedAt"].as_str().unwrap();
    assert!(received_at.ends_with('Z'));
    assert_eq!(received_at.len(), "2025-01-01T00:00:00.000Z".len());
}

#[tokio::test]
async fn test_concurrent_subscribe_and_publish() {
    let broker = Arc::new(Broker::new());
    let mut handles = Vec::new();

    for i in 0..16 {
        let broker = broker.clone();
        handles.push(tokio::spawn(async move {
            let (sub, rx) = subscriber("t", 64);
            broker.subscribe(sub);
            broker
                .publish("t", &LinkEvent::new(i.to_string(), "t"))
                .unwrap();
            rx
        }));
    }

    for handle in handles {
        let mut rx = handle.await.unwrap();
        assert!(rx.try_recv().is_ok());
    }
    assert_eq!(broker.subscriber_count("t"), 16);
}
