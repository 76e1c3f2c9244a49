use std::{cell::RefCell, rc::Rc};

use futures::executor::block_on;
use host_bridge::{
    app,
    mocks::MockTransport,
    path::{self, BaseDirectory},
    window::{self, ProgressBarState, ProgressBarStatus, Theme},
    Channel, Event, HostClient, HostError, ListenOptions, LogicalSize, PhysicalPosition,
    PhysicalSize, Position, Size, Window,
};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

#[test]
fn each_wrapper_issues_exactly_one_call_with_its_command() {
    let mock = Rc::new(MockTransport::with_handler(|command, _| match command {
        "plugin:window|cursor_position" => Ok(json!({"x": 12, "y": 40})),
        "plugin:path|resolve_directory" => Ok(json!("/home/u/.local/share/notes")),
        _ => Ok(Value::Null),
    }));
    let client = HostClient::from_rc(Rc::clone(&mock));
    let main_window = Window::from_label(&client, "main");

    block_on(main_window.set_title("Inbox")).expect("title");
    block_on(main_window.set_theme(Some(Theme::Dark))).expect("theme");
    block_on(main_window.set_progress_bar(ProgressBarState {
        status: Some(ProgressBarStatus::Indeterminate),
        progress: None,
    }))
    .expect("progress");
    block_on(main_window.minimize()).expect("minimize");
    let cursor = block_on(window::cursor_position(&client)).expect("cursor");
    let data = block_on(path::resolve_directory(&client, BaseDirectory::AppData, None))
        .expect("app data");
    block_on(app::set_theme(&client, Some(Theme::Light))).expect("app theme");

    assert_eq!(cursor, PhysicalPosition::new(12.0, 40.0));
    assert_eq!(data, "/home/u/.local/share/notes");
    let expected: Vec<(&str, Value)> = vec![
        ("plugin:window|set_title", json!({"label": "main", "value": "Inbox"})),
        ("plugin:window|set_theme", json!({"label": "main", "value": "dark"})),
        (
            "plugin:window|set_progress_bar",
            json!({"label": "main", "value": {"status": "indeterminate"}}),
        ),
        ("plugin:window|minimize", json!({"label": "main"})),
        ("plugin:window|cursor_position", json!({})),
        ("plugin:path|resolve_directory", json!({"directory": 14})),
        ("plugin:app|set_app_theme", json!({"theme": "light"})),
    ];
    let calls = mock.calls();
    assert_eq!(calls.len(), expected.len());
    for (call, (command, args)) in calls.iter().zip(expected) {
        assert_eq!(call.command, command);
        assert_eq!(call.args, args);
    }
}

#[test]
fn malformed_geometry_never_reaches_the_host() {
    let mock = Rc::new(MockTransport::new());
    let client = HostClient::from_rc(Rc::clone(&mock));
    let window = Window::from_label(&client, "main");

    for raw in [
        json!({"width": 10, "height": 10}),
        json!({"Logical": {"width": -1, "height": 10}}),
        json!({"type": "Pixels", "width": 10, "height": 10}),
    ] {
        assert!(matches!(
            Size::try_from(raw),
            Err(HostError::InvalidArgument(_))
        ));
    }
    assert!(Position::try_from(json!({"x": 1, "y": 2})).is_err());

    let err = block_on(window.set_size(Size::Logical(LogicalSize::new(f64::INFINITY, 1.0))))
        .expect_err("infinite width");
    assert!(matches!(err, HostError::InvalidArgument(_)));
    let err = block_on(window.set_max_size(Some(Size::Physical(PhysicalSize::new(1.0, -2.0)))))
        .expect_err("negative height");
    assert!(matches!(err, HostError::InvalidArgument(_)));
    let err = block_on(window.set_cursor_position(PhysicalPosition::new(f64::NAN, 0.0)))
        .expect_err("nan cursor");
    assert!(matches!(err, HostError::InvalidArgument(_)));

    assert!(mock.calls().is_empty());
}

#[test]
fn scale_conversion_round_trips_through_window_values() {
    let physical = PhysicalSize::new(2560.0, 1440.0);
    for scale in [1.0, 1.25, 1.75, 2.0] {
        let back = Size::Logical(physical.to_logical(scale)).to_physical(scale);
        assert!((back.width - physical.width).abs() < 1e-9);
        assert!((back.height - physical.height).abs() < 1e-9);
    }
}

#[test]
fn unregistered_channels_and_listeners_stop_receiving() {
    let mock = Rc::new(MockTransport::new().with_event_emulation());
    let client = HostClient::from_rc(Rc::clone(&mock));
    let seen = Rc::new(RefCell::new(Vec::<String>::new()));

    let sink = Rc::clone(&seen);
    let channel = Channel::with_handler(&client, move |message: String| {
        sink.borrow_mut().push(format!("channel:{message}"))
    });
    let sink = Rc::clone(&seen);
    let listener = block_on(host_bridge::listen(
        &client,
        "sync://progress",
        move |event: Event<u8>| sink.borrow_mut().push(format!("event:{}", event.payload)),
        ListenOptions::default(),
    ))
    .expect("listen");

    mock.deliver(channel.id(), json!({"index": 0, "message": "a"}));
    mock.emit_event("sync://progress", json!(1));

    channel.unregister();
    block_on(listener.unlisten()).expect("unlisten");

    assert!(!mock.deliver(channel.id(), json!({"index": 1, "message": "b"})));
    assert_eq!(mock.emit_event("sync://progress", json!(2)), 0);
    assert_eq!(
        *seen.borrow(),
        vec!["channel:a".to_string(), "event:1".to_string()]
    );
    assert_eq!(mock.callback_count(), 0);
}
