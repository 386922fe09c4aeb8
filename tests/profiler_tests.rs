use pretty_assertions::assert_eq;
use probe_trace::profiler::{ManualClock, Profiler};
use probe_trace::utils::error::ProfilerError;
use std::time::Duration;

fn manual(root: &str) -> (Profiler<ManualClock>, ManualClock) {
    let clock = ManualClock::new();
    (Profiler::with_clock(root, clock.clone()), clock)
}

#[test]
fn test_depth_tracks_unmatched_pushes_and_never_goes_negative() {
    let (mut profiler, _) = manual("root");

    profiler.push("a");
    profiler.push("b");
    profiler.push("c");
    profiler.pop().unwrap();
    assert_eq!(profiler.depth(), 2);

    profiler.pop().unwrap();
    profiler.pop().unwrap();
    assert_eq!(profiler.depth(), 0);

    assert!(matches!(
        profiler.pop(),
        Err(ProfilerError::PopAtRoot { .. })
    ));
    assert_eq!(profiler.depth(), 0);
}

#[test]
fn test_same_label_under_same_parent_is_one_node() {
    let (mut profiler, _) = manual("root");

    for _ in 0..2 {
        profiler.push("A");
        profiler.pop().unwrap();
    }

    let tree = profiler.tree();
    let root = tree.get(tree.root()).unwrap();
    assert_eq!(root.children().len(), 1);

    let a = tree.find(&["A"]).unwrap();
    assert_eq!(tree.get(a).unwrap().samples().len(), 2);
}

#[test]
fn test_nested_same_label_builds_a_path() {
    let (mut profiler, _) = manual("root");

    for _ in 0..2 {
        profiler.push("A");
        profiler.push("A");
        profiler.pop().unwrap();
        profiler.pop().unwrap();
    }

    let tree = profiler.tree();
    let outer = tree.find(&["A"]).unwrap();
    let inner = tree.find(&["A", "A"]).unwrap();
    assert_eq!(tree.get(tree.root()).unwrap().children(), &[outer]);
    assert_eq!(tree.get(outer).unwrap().samples().len(), 2);
    assert_eq!(tree.get(inner).unwrap().samples().len(), 2);
}

#[test]
fn test_average_of_real_sleeps() {
    let mut profiler = Profiler::new("root");

    for _ in 0..3 {
        profiler
            .profile("X", |_| std::thread::sleep(Duration::from_millis(10)))
            .unwrap();
    }

    let dump = profiler.dump();
    let line = dump.lines().find(|l| l.contains("|=> X : ")).unwrap();
    let average: u64 = line
        .split(" : ")
        .nth(1)
        .and_then(|rest| rest.strip_suffix(" ns"))
        .and_then(|n| n.parse().ok())
        .unwrap();

    assert!(average >= 10_000_000, "average {} below sleep time", average);
    assert!(average < 200_000_000, "average {} far above sleep time", average);
}

#[test]
fn test_percentage_relative_to_parent() {
    let (mut profiler, clock) = manual("root");

    profiler.push("P");
    clock.advance(40);
    profiler.push("C");
    clock.advance(25);
    profiler.pop().unwrap();
    clock.advance(35);
    profiler.pop().unwrap();

    let expected = "\
|=> root
|   |=> P : 100 ns
|   |   |=> C : 25 ns - 25.00%";
    assert_eq!(profiler.dump(), expected);
}

#[test]
fn test_average_is_cumulative() {
    let (mut profiler, clock) = manual("root");

    for elapsed in [10, 20, 60] {
        profiler.push("step");
        clock.advance(elapsed);
        profiler.pop().unwrap();
    }

    assert_eq!(profiler.dump(), "|=> root\n|   |=> step : 30 ns");
}

#[test]
fn test_pending_nodes_render_without_statistics() {
    let (mut profiler, clock) = manual("root");

    profiler.push("outer");
    profiler.push("inner");
    clock.advance(5);

    let expected = "\
|=> root
|   |=> outer
|   |   |=> inner";
    assert_eq!(profiler.dump(), expected);
}

#[test]
fn test_child_of_pending_parent_has_no_percentage() {
    let (mut profiler, clock) = manual("root");

    profiler.push("outer");
    profiler.push("done");
    clock.advance(5);
    profiler.pop().unwrap();

    assert_eq!(
        profiler.dump(),
        "|=> root\n|   |=> outer\n|   |   |=> done : 5 ns"
    );
}

#[test]
fn test_clear_resets_to_bare_root() {
    let (mut profiler, clock) = manual("session");

    profiler.push("a");
    clock.advance(3);
    profiler.push("b");
    clock.advance(3);
    profiler.pop().unwrap();
    profiler.push("c");
    profiler.clear();

    assert_eq!(profiler.dump(), "|=> session");
    assert_eq!(profiler.depth(), 0);

    // Fresh state after a clear behaves like a new profiler
    profiler.push("a");
    clock.advance(7);
    profiler.pop().unwrap();
    assert_eq!(profiler.dump(), "|=> session\n|   |=> a : 7 ns");

    profiler.clear();
    profiler.clear();
    assert_eq!(profiler.dump(), "|=> session");
}

#[test]
fn test_children_render_in_creation_order() {
    let (mut profiler, clock) = manual("root");

    for label in ["zeta", "alpha", "mid"] {
        profiler.push(label);
        clock.advance(1);
        profiler.pop().unwrap();
    }

    let labels: Vec<_> = profiler.dump().lines().skip(1).map(str::to_string).collect();
    assert_eq!(
        labels,
        vec![
            "|   |=> zeta : 1 ns",
            "|   |=> alpha : 1 ns",
            "|   |=> mid : 1 ns"
        ]
    );
}

#[test]
fn test_unbalanced_push_shifts_later_pops() {
    let (mut profiler, clock) = manual("root");

    // "leak" is pushed and never popped; the next pop closes "work" and
    // the one after that closes "leak" instead of the intended outer frame
    profiler.push("outer");
    profiler.push("leak");
    profiler.push("work");
    clock.advance(10);
    profiler.pop().unwrap();
    profiler.pop().unwrap();

    assert_eq!(profiler.active_path(), vec!["outer"]);
    let leak = profiler.tree().find(&["outer", "leak"]).unwrap();
    assert_eq!(profiler.tree().get(leak).unwrap().samples(), &[10]);
}

#[test]
fn test_profile_does_not_pop_when_body_panics() {
    let (mut profiler, _) = manual("root");

    let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        profiler
            .profile("explodes", |_| panic!("boom"))
            .unwrap();
    }));

    assert!(outcome.is_err());
    assert_eq!(profiler.depth(), 1);
}

#[test]
fn test_frame_guard_pops_during_unwind() {
    let (mut profiler, _) = manual("root");

    let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        let _guard = profiler.enter("explodes");
        panic!("boom");
    }));

    assert!(outcome.is_err());
    assert_eq!(profiler.depth(), 0);
    let node = profiler.tree().find(&["explodes"]).unwrap();
    assert_eq!(profiler.tree().get(node).unwrap().samples().len(), 1);
}

#[test]
fn test_separate_profilers_per_thread() {
    let handles: Vec<_> = (0..4)
        .map(|i| {
            std::thread::spawn(move || {
                let mut profiler = Profiler::new(format!("thread-{}", i));
                profiler.profile("job", |_| ()).unwrap();
                profiler.dump()
            })
        })
        .collect();

    for (i, handle) in handles.into_iter().enumerate() {
        let dump = handle.join().unwrap();
        assert!(dump.starts_with(&format!("|=> thread-{}\n|   |=> job : ", i)));
    }
}
