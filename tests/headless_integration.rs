use std::sync::mpsc;
use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use rand::{rngs::StdRng, SeedableRng};

use study_casino::app::{App, Control, Settings, View};
use study_casino::countdown::Phase;
use study_casino::runtime::{AppEvent, ChannelEventSource, FixedTicker, Runner};
use study_casino::stats::MemoryStatsStore;

fn key(c: KeyCode) -> AppEvent {
    AppEvent::Key(KeyEvent::new(c, KeyModifiers::NONE))
}

// Drives the whole welcome -> roulette -> session -> dashboard flow through the
// real runner and session clock, with a countdown second shortened to 100µs.
#[test]
fn headless_full_flow_reaches_dashboard() {
    let (tx, rx) = mpsc::channel();
    let runner = Runner::new(
        ChannelEventSource::new(rx),
        FixedTicker::new(Duration::from_millis(1)),
    );
    let mut app = App::new(
        Settings {
            spin_ticks: 3,
            reveal_ticks: 2,
            second: Duration::from_micros(100),
            ..Settings::default()
        },
        Box::new(MemoryStatsStore::new()),
        Box::new(StdRng::seed_from_u64(2024)),
        tx.clone(),
    );

    tx.send(key(KeyCode::Enter)).unwrap();
    tx.send(key(KeyCode::Enter)).unwrap();

    // spin, reveal and open the session
    for _ in 0..1_000u32 {
        app.handle(runner.step());
        if app.session().is_some() {
            break;
        }
    }
    let total = app.session().expect("session opened").countdown().total_secs();
    assert!(total >= 15 * 60);

    tx.send(key(KeyCode::Enter)).unwrap();
    for _ in 0..(total * 20) {
        app.handle(runner.step());
        if app.session().map(|s| s.phase()) == Some(Phase::Expired) {
            break;
        }
    }
    let session = app.session().expect("still in session");
    assert_eq!(session.phase(), Phase::Expired);
    assert!(!session.has_clock());

    for c in "memorised the unit circle and derived sin(a+b)".chars() {
        tx.send(key(KeyCode::Char(c))).unwrap();
    }
    tx.send(key(KeyCode::Enter)).unwrap();
    for _ in 0..200u32 {
        app.handle(runner.step());
        if matches!(app.view(), View::Dashboard(_)) {
            break;
        }
    }

    match app.view() {
        View::Dashboard(dashboard) => {
            assert_eq!(dashboard.stats.total_sessions, 1);
            assert_eq!(dashboard.stats.total_minutes * 60, total);
            assert_eq!(dashboard.stats.jackpot_tokens, 5);
        }
        other => panic!("expected dashboard, got {other}"),
    }

    tx.send(key(KeyCode::Char('q'))).unwrap();
    let mut quit = false;
    for _ in 0..50u32 {
        if app.handle(runner.step()) == Control::Quit {
            quit = true;
            break;
        }
    }
    assert!(quit);
}

// Leaving a running session must stop its clock: nothing ticks afterwards.
#[test]
fn leaving_a_running_session_stops_its_clock() {
    let (tx, rx) = mpsc::channel();
    let mut app = App::new(
        Settings {
            spin_ticks: 0,
            reveal_ticks: 0,
            second: Duration::from_millis(2),
            ..Settings::default()
        },
        Box::new(MemoryStatsStore::new()),
        Box::new(StdRng::seed_from_u64(9)),
        tx,
    );

    app.handle(key(KeyCode::Enter));
    app.handle(key(KeyCode::Enter));
    app.handle(AppEvent::Tick);
    app.handle(AppEvent::Tick);
    app.handle(key(KeyCode::Enter));
    assert!(app.session().unwrap().has_clock());

    // the clock is alive and ticking
    match rx.recv_timeout(Duration::from_secs(2)) {
        Ok(AppEvent::SessionTick(_)) => {}
        other => panic!("expected a session tick, got {other:?}"),
    }

    // emergency exit back to the wheel
    app.handle(key(KeyCode::Esc));
    assert!(app.session().is_none());

    while rx.try_recv().is_ok() {}
    std::thread::sleep(Duration::from_millis(40));
    assert!(rx.try_recv().is_err(), "clock kept ticking after leaving the session");
}

#[test]
fn abandoning_stops_the_clock_and_keeps_the_spin() {
    let (tx, rx) = mpsc::channel();
    let mut app = App::new(
        Settings {
            spin_ticks: 0,
            reveal_ticks: 0,
            second: Duration::from_millis(2),
            ..Settings::default()
        },
        Box::new(MemoryStatsStore::new()),
        Box::new(StdRng::seed_from_u64(10)),
        tx,
    );

    app.handle(key(KeyCode::Enter));
    app.handle(key(KeyCode::Enter));
    app.handle(AppEvent::Tick);
    app.handle(AppEvent::Tick);
    let spin = app.session().unwrap().spin().clone();
    app.handle(key(KeyCode::Enter));

    let ev = rx.recv_timeout(Duration::from_secs(2)).unwrap();
    app.handle(ev);
    app.handle(key(KeyCode::Char('x')));

    let session = app.session().unwrap();
    assert_eq!(session.phase(), Phase::Idle);
    assert_eq!(session.spin(), &spin);
    assert_eq!(session.countdown().remaining_secs(), spin.minutes * 60);

    while rx.try_recv().is_ok() {}
    std::thread::sleep(Duration::from_millis(40));
    assert!(rx.try_recv().is_err());
}
