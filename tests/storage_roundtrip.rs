use tk::storage::{decode, encode};
use tk::{Session, Storage, Task, When};

#[test]
fn event_marked_then_reloaded() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tasks.txt");

    let before = {
        let mut session = Session::open(Storage::new(&path));
        session.execute("event trip /from 2024-06-01 /to 2024-06-03");
        session.execute("mark 1");
        session.tasks().tasks()[0].to_string()
    };
    assert_eq!(before, "[E][X] trip (from: Jun 01 2024 to: Jun 03 2024)");

    let mut reloaded = Session::open(Storage::new(&path));
    assert!(reloaded.take_warning().is_none());
    assert_eq!(reloaded.tasks().tasks()[0].to_string(), before);
}

#[test]
fn hand_written_record_loads() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tasks.txt");
    std::fs::write(&path, "D | 1 | pay rent | Mar 05 2024\n").unwrap();

    let tasks = Storage::new(&path).load().unwrap();
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].to_string(), "[D][X] pay rent (by: Mar 05 2024)");
}

#[test]
fn file_has_one_record_per_line() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tasks.txt");
    let mut session = Session::open(Storage::new(&path));
    session.execute("todo read book");
    session.execute("deadline submit /by 31/1/2024 2359");
    session.execute("event talk /from 2024-02-01 1400 /to 2024-02-01 1530");

    let content = std::fs::read_to_string(&path).unwrap();
    assert_eq!(
        content,
        "T | 0 | read book\n\
         D | 0 | submit | Jan 31 2024, 23:59\n\
         E | 0 | talk | Feb 01 2024, 14:00 | Feb 01 2024, 15:30\n"
    );
}

#[test]
fn round_trip_every_kind() {
    let when = |raw: &str| When::parse_input(raw).unwrap();
    let mut done = Task::todo("done todo").unwrap();
    done.mark_done();
    let tasks = vec![
        Task::todo("plain").unwrap(),
        done,
        Task::deadline("due", when("2024-12-04")).unwrap(),
        Task::deadline("due at", when("4/12/2024 1800")).unwrap(),
        Task::event("span", when("2024-12-04"), when("2024-12-06 0900")).unwrap(),
    ];

    for task in &tasks {
        let line = encode(task);
        let back = decode(&line).unwrap();
        assert_eq!(back.to_string(), task.to_string());
        assert_eq!(encode(&back), line);
    }
}

#[test]
fn corrupt_file_recovers_to_empty_list() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tasks.txt");
    std::fs::write(&path, "T | 0 | fine\nD | 0 | broken\n").unwrap();

    let mut session = Session::open(Storage::new(&path));
    assert!(session.tasks().is_empty());
    let warning = session.take_warning().unwrap();
    assert!(warning.contains("line 2"));
    assert_eq!(session.execute("list"), tk::task_list::EMPTY_LIST);
}
