//! Read failures must surface in the task that awaited them, and nowhere else.

use spool::RuntimeBuilder;
use spool::fs::{AsyncLineReader, LineSource};
use std::io;
use std::sync::{Arc, Mutex};

/// Yields a fixed number of lines, then fails every further read.
struct FailingSource {
    remaining: usize,
}

impl LineSource for FailingSource {
    fn next_line(&mut self) -> io::Result<Option<String>> {
        if self.remaining == 0 {
            return Err(io::Error::new(
                io::ErrorKind::Other,
                "simulated read failure",
            ));
        }

        self.remaining -= 1;
        Ok(Some(format!("line-{}", self.remaining)))
    }
}

#[test]
fn read_failure_surfaces_in_the_awaiting_task() {
    let mut rt = RuntimeBuilder::new().worker_threads(2).build();
    let lines_seen = Arc::new(Mutex::new(0));
    let failure = Arc::new(Mutex::new(None));

    let reader = AsyncLineReader::from_source(FailingSource { remaining: 2 }, rt.handle());

    let seen = lines_seen.clone();
    let observed = failure.clone();
    rt.spawn(async move {
        loop {
            match reader.next_line().await {
                Ok(Some(_)) => *seen.lock().unwrap() += 1,
                Ok(None) => break,
                Err(error) => {
                    *observed.lock().unwrap() = Some(error.to_string());
                    break;
                }
            }
        }

        Ok(())
    });

    rt.run();

    assert_eq!(*lines_seen.lock().unwrap(), 2);
    assert_eq!(
        failure.lock().unwrap().as_deref(),
        Some("simulated read failure")
    );
}

#[test]
fn failure_in_one_task_leaves_others_untouched() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("good.txt");
    std::fs::write(&path, "a\nb\nc\n").expect("write fixture");

    let mut rt = RuntimeBuilder::new().worker_threads(2).build();
    let collected = Arc::new(Mutex::new(Vec::new()));

    let failing = AsyncLineReader::from_source(FailingSource { remaining: 1 }, rt.handle());
    rt.spawn(async move {
        // The simulated failure propagates out of this task body.
        while failing.next_line().await?.is_some() {}

        Ok(())
    });

    let sink = collected.clone();
    rt.spawn(async move {
        let reader = AsyncLineReader::open(&path)?;

        while let Some(line) = reader.next_line().await? {
            sink.lock().unwrap().push(line);
        }

        Ok(())
    });

    rt.run();

    assert_eq!(
        *collected.lock().unwrap(),
        vec!["a", "b", "c"],
        "The healthy task should finish despite the failing sibling"
    );
}
