//! Integration tests for the focus cycle.
//!
//! Drives a full session through the public API the way a UI would:
//! commands in, sounds and saved snapshots out.

use focusweek_core::notify::Notification;
use focusweek_core::{
    Command, MemoryGateway, RecordingSink, Session, Sound, SoundKind, TimerMode, TimerSettings,
};

fn session(settings: TimerSettings) -> (Session, MemoryGateway, RecordingSink) {
    let gateway = MemoryGateway::new();
    let sink = RecordingSink::new();
    let session = Session::new(settings, Box::new(gateway.clone()), Box::new(sink.clone()));
    (session, gateway, sink)
}

fn finish_countdown(session: &mut Session) {
    session.dispatch(Command::Start).unwrap();
    let remaining = session.engine().remaining_secs();
    for _ in 0..remaining {
        session.dispatch(Command::Tick).unwrap();
    }
}

#[test]
fn test_classic_pomodoro_scenario() {
    let (mut session, gateway, sink) = session(TimerSettings::default());
    session.dispatch(Command::Start).unwrap();
    for _ in 0..1500 {
        session.dispatch(Command::Tick).unwrap();
    }

    let state = session.engine().state();
    assert_eq!(state.mode, TimerMode::Short);
    assert_eq!(state.remaining_seconds, 5 * 60);
    assert_eq!(state.cycle_count, 1);
    assert!(!state.is_running);

    let chimes = sink.sounds().into_iter().filter(|s| *s == Sound::Chime).count();
    assert_eq!(chimes, 1);
    assert_eq!(gateway.stored().unwrap().cycle_count, 1);
}

#[test]
fn test_four_sessions_then_long_break() {
    let settings = TimerSettings {
        focus_time: 1,
        short_break: 1,
        long_break: 3,
        sound_type: SoundKind::Bell,
        ..TimerSettings::default()
    };
    let (mut session, gateway, sink) = session(settings);

    for _ in 0..3 {
        finish_countdown(&mut session);
        assert_eq!(session.engine().mode(), TimerMode::Short);
        finish_countdown(&mut session);
        assert_eq!(session.engine().mode(), TimerMode::Focus);
    }
    finish_countdown(&mut session);
    assert_eq!(session.engine().mode(), TimerMode::Long);
    assert_eq!(session.engine().cycle_count(), 4);
    assert_eq!(session.engine().remaining_secs(), 180);
    assert_eq!(gateway.stored().unwrap().cycle_count, 4);

    finish_countdown(&mut session);
    assert_eq!(session.engine().mode(), TimerMode::Focus);
    assert_eq!(session.engine().cycle_count(), 0);
    assert_eq!(session.engine().remaining_secs(), 60);
    assert_eq!(gateway.stored().unwrap().cycle_count, 0);

    let completions: Vec<Notification> = sink
        .notifications()
        .into_iter()
        .filter(|n| matches!(n, Notification::Completed { .. }))
        .collect();
    assert_eq!(completions.len(), 8);
    assert_eq!(
        completions[6],
        Notification::Completed {
            finished: TimerMode::Focus,
            next: TimerMode::Long,
            cycle_count: 4,
        }
    );
    assert_eq!(sink.sounds().iter().filter(|s| **s == Sound::Bell).count(), 8);
}

#[test]
fn test_manual_switches_never_count() {
    let (mut session, _gateway, _sink) = session(TimerSettings::default());
    finish_countdown(&mut session);
    assert_eq!(session.engine().cycle_count(), 1);

    for mode in [TimerMode::Long, TimerMode::Focus, TimerMode::Short, TimerMode::Focus] {
        session.dispatch(Command::SwitchMode(mode)).unwrap();
        assert_eq!(session.engine().cycle_count(), 1);
        assert_eq!(session.engine().mode(), mode);
        assert!(!session.engine().is_running());
    }
}

#[test]
fn test_focus_task_workflow() {
    let (mut session, gateway, _sink) = session(TimerSettings::default());
    let first = session.add_task(0, "Draft chapter").unwrap();
    let second = session.add_task(0, "Email editor").unwrap();

    session.dispatch(Command::AttachTask(first.id.clone())).unwrap();
    for _ in 0..100 {
        session.dispatch(Command::Tick).unwrap();
    }
    assert_eq!(session.engine().remaining_secs(), 1400);

    // Same task: pause, keep the time.
    session.dispatch(Command::AttachTask(first.id.clone())).unwrap();
    assert!(!session.engine().is_running());
    assert_eq!(session.engine().remaining_secs(), 1400);

    // Other task: fresh focus session.
    session.dispatch(Command::AttachTask(second.id.clone())).unwrap();
    assert!(session.engine().is_running());
    assert_eq!(session.engine().remaining_secs(), 1500);
    assert_eq!(session.active_task().unwrap().content, "Email editor");

    session.delete_task(&second.id).unwrap();
    assert!(session.active_task().is_none());
    assert!(!session.engine().is_running());

    let stored = gateway.stored().unwrap();
    assert_eq!(stored.tasks.len(), 1);
    assert!(stored.timer.unwrap().active_task_id.is_none());
}

#[test]
fn test_detach_other_task_is_noop() {
    let (mut session, _gateway, _sink) = session(TimerSettings::default());
    let task = session.add_task(4, "Review PR").unwrap();
    session.dispatch(Command::AttachTask(task.id.clone())).unwrap();

    let events = session.dispatch(Command::DetachTask("someone-else".into())).unwrap();
    assert!(events.is_empty());
    assert!(session.engine().is_running());

    session.dispatch(Command::DetachTask(task.id.clone())).unwrap();
    assert!(session.engine().active_task().is_none());
    assert!(!session.engine().is_running());
}
