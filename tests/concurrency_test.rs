use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Barrier, mpsc};
use std::thread;
use std::time::Duration;
use timegraph::prelude::*;

const SETTLE: Duration = Duration::from_millis(100);

fn populated() -> (Arc<MemoryGraph>, TimestampDictionary<Node, Edge>, Node) {
    let graph = MemoryGraph::new();
    let dict = TimestampDictionary::<Node, Edge>::new();
    let a = graph.create_node("a");
    let slot = dict.add_element(1.0, ElementRef::Node(&a)).unwrap();
    a.set_value(slot, TemporalValue::Boolean(true)).unwrap();
    (graph, dict, a)
}

#[test]
fn test_writer_waits_for_open_query_result() {
    let (graph, dict, a) = populated();
    let index = dict.main_index().unwrap();
    let nodes = index.get_nodes(1.0).unwrap();
    assert!(nodes.contains(&a));

    let wrote = Arc::new(AtomicBool::new(false));
    let barrier = Arc::new(Barrier::new(2));
    let writer = {
        let dict = dict.clone();
        let wrote = Arc::clone(&wrote);
        let barrier = Arc::clone(&barrier);
        let b = graph.create_node("b");
        thread::spawn(move || {
            barrier.wait();
            dict.add_element(2.0, ElementRef::Node(&b)).unwrap();
            wrote.store(true, Ordering::SeqCst);
        })
    };

    barrier.wait();
    thread::sleep(SETTLE);
    assert!(!wrote.load(Ordering::SeqCst), "writer ran while a result was open");

    nodes.done();
    writer.join().unwrap();
    assert!(wrote.load(Ordering::SeqCst));
    assert!(dict.contains(2.0).unwrap());
}

#[test]
fn test_readers_wait_for_writer() {
    let (_graph, dict, _a) = populated();
    let writer = dict.write();

    let (tx, rx) = mpsc::channel();
    let reader = {
        let dict = dict.clone();
        thread::spawn(move || {
            let index = dict.main_index().unwrap();
            let count = index.get_nodes(1.0).unwrap().len();
            tx.send(count).unwrap();
        })
    };

    assert!(rx.recv_timeout(SETTLE).is_err(), "reader ran while a writer was active");
    drop(writer);
    assert_eq!(rx.recv_timeout(Duration::from_secs(5)).unwrap(), 1);
    reader.join().unwrap();
}

#[test]
fn test_concurrent_readers_share_lock() {
    let (_graph, dict, a) = populated();
    let index = dict.main_index().unwrap();
    let held = index.get_nodes_between(0.0, 5.0).unwrap();

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let index = index.clone();
            let a = a.clone();
            thread::spawn(move || index.get_nodes(1.0).unwrap().contains(&a))
        })
        .collect();

    for handle in handles {
        assert!(handle.join().unwrap());
    }
    held.done();
}

#[test]
fn test_observer_refresh_waits_for_writer() {
    let (graph, dict, _a) = populated();
    let observer = dict.create_observer(graph.clone(), graph.version(), true);
    assert!(observer.has_changed().unwrap());
    observer.get_diff().unwrap();

    let writer = dict.write();
    graph.create_node("b");

    let (tx, rx) = mpsc::channel();
    let handle = thread::spawn(move || {
        let changed = observer.has_changed().unwrap();
        let added = observer.get_diff().unwrap().added_nodes().len();
        tx.send((changed, added)).unwrap();
    });

    assert!(rx.recv_timeout(SETTLE).is_err(), "observer diffed during a write");
    drop(writer);
    assert_eq!(rx.recv_timeout(Duration::from_secs(5)).unwrap(), (true, 1));
    handle.join().unwrap();
}

#[test]
fn test_parallel_writers_keep_counts_consistent() {
    let graph = MemoryGraph::new();
    let dict = TimestampDictionary::<Node, Edge>::new();

    let handles: Vec<_> = (0..4)
        .map(|worker| {
            let dict = dict.clone();
            let nodes: Vec<Node> = (0..25)
                .map(|i| graph.create_node(format!("n{worker}-{i}")))
                .collect();
            thread::spawn(move || {
                for (i, node) in nodes.iter().enumerate() {
                    dict.add_element(i as f64, ElementRef::Node(node)).unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let index = dict.main_index().unwrap();
    assert_eq!(dict.len(), 25);
    assert_eq!(index.node_count(), 100);
    assert_eq!(index.get_nodes_between(0.0, 24.0).unwrap().len(), 100);
}
