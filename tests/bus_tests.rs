//! Message bus ordering, filtering and async receive.

use playctl::event::Structure;
use playctl::pipeline::{Bus, Message, MessageMask, MessageSource, MessageView};
use std::thread;
use std::time::{Duration, Instant};

fn tagged(thread: &str, n: u64) -> Message {
    Message::application(
        MessageSource::Element(thread.to_string()),
        Structure::new("seq").with_field("n", n),
    )
}

fn sequence(msg: &Message) -> (String, u64) {
    match msg.view() {
        MessageView::Application(s) => (msg.source().name().to_string(), s.get_u64("n").unwrap()),
        other => panic!("unexpected message {other:?}"),
    }
}

#[test]
fn test_drained_in_post_order() {
    let bus = Bus::new();
    for n in 1..=3 {
        bus.post(tagged("main", n)).unwrap();
    }

    let drained: Vec<Message> = std::iter::from_fn(|| bus.timed_pop(Duration::ZERO)).collect();
    let order: Vec<u64> = drained.iter().map(|m| sequence(m).1).collect();
    assert_eq!(order, vec![1, 2, 3]);
    let seqnums: Vec<u64> = drained.iter().map(Message::seqnum).collect();
    assert_eq!(seqnums, vec![1, 2, 3]);
}

#[test]
fn test_order_follows_posts_across_threads() {
    let bus = Bus::new();
    let first = bus.clone();
    thread::spawn(move || first.post(tagged("a", 1)).unwrap())
        .join()
        .unwrap();
    let second = bus.clone();
    thread::spawn(move || second.post(tagged("b", 2)).unwrap())
        .join()
        .unwrap();
    bus.post(tagged("main", 3)).unwrap();

    let drained: Vec<(String, u64)> = std::iter::from_fn(|| bus.timed_pop(Duration::ZERO))
        .map(|m| sequence(&m))
        .collect();
    assert_eq!(
        drained,
        vec![("a".to_string(), 1), ("b".to_string(), 2), ("main".to_string(), 3)]
    );
}

#[test]
fn test_order_preserved_per_posting_thread() {
    let bus = Bus::new();
    let handles: Vec<_> = ["a", "b", "c"]
        .into_iter()
        .map(|name| {
            let bus = bus.clone();
            thread::spawn(move || {
                for n in 0..200 {
                    bus.post(tagged(name, n)).unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let mut last = std::collections::HashMap::new();
    let mut total = 0;
    while let Some(msg) = bus.timed_pop(Duration::ZERO) {
        let (thread, n) = sequence(&msg);
        if let Some(prev) = last.insert(thread, n) {
            assert!(n > prev, "out of order: {prev} then {n}");
        }
        total += 1;
    }
    assert_eq!(total, 600);
}

#[test]
fn test_timeout_returns_none() {
    let bus = Bus::new();
    let start = Instant::now();
    assert!(bus.timed_pop(Duration::from_millis(20)).is_none());
    assert!(start.elapsed() >= Duration::from_millis(20));
}

#[test]
fn test_filtered_pop_skips_other_kinds() {
    let bus = Bus::new();
    let src = MessageSource::Element("src".into());
    bus.post(tagged("src", 1)).unwrap();
    bus.post(Message::eos(src.clone())).unwrap();
    bus.post(Message::error(src, "late", None)).unwrap();

    let msg = bus
        .timed_pop_filtered(Some(Duration::from_millis(50)), MessageMask::EOS | MessageMask::ERROR)
        .unwrap();
    assert!(matches!(msg.view(), MessageView::Eos));
    let msg = bus.timed_pop(Duration::ZERO).unwrap();
    assert!(matches!(msg.view(), MessageView::Error { .. }));
}

#[test]
fn test_blocking_pop_ends_with_bus() {
    let bus = Bus::new();
    let closer = bus.clone();
    let handle = thread::spawn(move || {
        thread::sleep(Duration::from_millis(10));
        closer.close();
    });
    assert!(bus.timed_pop_filtered(None, MessageMask::ALL).is_none());
    handle.join().unwrap();
    assert!(bus.is_closed());
    assert!(bus.post(tagged("late", 0)).is_err());
}

#[tokio::test]
async fn test_async_pop_from_element_thread() {
    let bus = Bus::new();
    let poster = bus.clone();
    thread::spawn(move || {
        for n in 0..3 {
            poster.post(tagged("worker", n)).unwrap();
        }
    });

    for expected in 0..3 {
        let msg = tokio::time::timeout(Duration::from_secs(2), bus.pop_async())
            .await
            .expect("timed out")
            .expect("bus closed");
        assert_eq!(sequence(&msg).1, expected);
    }
}
