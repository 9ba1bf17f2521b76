use spool::{JoinSet, Runtime, RuntimeBuilder, Task};
use std::sync::{Arc, Mutex};

#[test]
fn run_with_no_tasks_returns_immediately() {
    let mut rt = Runtime::new();
    rt.run();
}

#[test]
fn task_without_suspension_runs_during_spawn() {
    let rt = Runtime::new();
    let completed = Arc::new(Mutex::new(false));
    let completed_clone = completed.clone();

    rt.spawn(async move {
        *completed_clone.lock().unwrap() = true;
        Ok(())
    });

    assert!(
        *completed.lock().unwrap(),
        "Task should start inline on the submitting thread"
    );
}

#[test]
fn run_drives_multiple_tasks() {
    let mut rt = Runtime::new();
    let counter = Arc::new(Mutex::new(0));

    for _ in 0..5 {
        let counter_clone = counter.clone();
        rt.spawn(async move {
            *counter_clone.lock().unwrap() += 1;
            Ok(())
        });
    }

    rt.run();

    assert_eq!(*counter.lock().unwrap(), 5, "All 5 tasks should have run");
}

#[test]
fn spawned_children_resume_in_fifo_order() {
    let mut rt = Runtime::new();
    let order = Arc::new(Mutex::new(Vec::new()));

    let o = order.clone();
    rt.spawn(async move {
        for k in 0..3 {
            let o = o.clone();
            Task::spawn(async move {
                o.lock().unwrap().push(k);
            });
        }

        Ok(())
    });

    rt.run();

    assert_eq!(
        *order.lock().unwrap(),
        vec![0, 1, 2],
        "Children should run in spawn order"
    );
}

#[test]
fn join_handle_returns_task_output() {
    let mut rt = Runtime::new();
    let result = Arc::new(Mutex::new(None));

    let r = result.clone();
    rt.spawn(async move {
        let handle = Task::spawn(async { 21 * 2 });
        let value = handle.await;

        *r.lock().unwrap() = Some(value);
        Ok(())
    });

    rt.run();

    assert_eq!(*result.lock().unwrap(), Some(42));
}

#[test]
fn join_set_awaits_all_children() {
    let mut rt = Runtime::new();
    let counter = Arc::new(Mutex::new(0));
    let seen_after_join = Arc::new(Mutex::new(0));

    let c = counter.clone();
    let after = seen_after_join.clone();
    rt.spawn(async move {
        let mut set = JoinSet::new();

        for _ in 0..4 {
            let c = c.clone();
            set.push(Task::spawn(async move {
                *c.lock().unwrap() += 1;
            }));
        }

        set.await_all().await;
        *after.lock().unwrap() = *c.lock().unwrap();

        Ok(())
    });

    rt.run();

    assert_eq!(
        *seen_after_join.lock().unwrap(),
        4,
        "await_all should observe every child's effect"
    );
}

#[test]
fn spawn_from_within_spawned_task() {
    let mut rt = Runtime::new();
    let counter = Arc::new(Mutex::new(0));

    let c1 = counter.clone();
    rt.spawn(async move {
        let c2 = c1.clone();

        Task::spawn(async move {
            *c2.lock().unwrap() += 1;

            let c3 = c2.clone();
            Task::spawn(async move {
                *c3.lock().unwrap() += 10;
            });
        });

        Ok(())
    });

    rt.run();

    assert_eq!(*counter.lock().unwrap(), 11, "Nested spawn should work");
}

#[test]
#[should_panic(expected = "Task::spawn() called outside of a runtime context")]
fn global_spawn_panics_outside_runtime() {
    Task::spawn(async {
        println!("This should never run");
    });
}

#[test]
fn failing_task_does_not_block_others() {
    let mut rt = Runtime::new();
    let succeeded = Arc::new(Mutex::new(false));

    rt.spawn(async {
        Err(std::io::Error::new(std::io::ErrorKind::Other, "boom").into())
    });

    let s = succeeded.clone();
    rt.spawn(async move {
        *s.lock().unwrap() = true;
        Ok(())
    });

    rt.run();

    assert!(
        *succeeded.lock().unwrap(),
        "A failing sibling must not prevent completion"
    );
}

#[test]
fn detached_child_keeps_runtime_alive() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("lines.txt");
    std::fs::write(&path, "one\ntwo\n").expect("write fixture");

    let mut rt = RuntimeBuilder::new().worker_threads(2).build();
    let seen = Arc::new(Mutex::new(Vec::new()));

    let sink = seen.clone();
    rt.spawn(async move {
        // The parent finishes right away; only the child still has work,
        // and that work suspends on a blocking read.
        Task::spawn(async move {
            let reader = spool::fs::AsyncLineReader::open(&path).expect("open fixture");

            while let Some(line) = reader.next_line().await.expect("read fixture") {
                sink.lock().unwrap().push(line);
            }
        });

        Ok(())
    });

    rt.run();

    assert_eq!(*seen.lock().unwrap(), vec!["one", "two"]);
}

#[test]
fn builder_multiple_instances() {
    let mut rt1 = RuntimeBuilder::new().worker_threads(1).build();
    let mut rt2 = RuntimeBuilder::new().worker_threads(2).build();

    rt1.run();
    rt2.run();
}
