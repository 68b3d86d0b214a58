use std::net::TcpListener;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use drydock_console::{CommandIndex, ConsoleSession, SubmitOutcome};
use smol_str::SmolStr;

use drydock_harness::{AssetManifest, ControlClient, ControlServer, PanelApp, ServerConfig};

fn make_project(name: &str) -> PathBuf {
    let stamp = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .expect("clock")
        .as_nanos();
    let root = std::env::temp_dir().join(format!("drydock-console-{name}-{stamp}"));
    let build = root.join("build");
    std::fs::create_dir_all(build.join("static/css")).expect("create css dir");
    std::fs::write(build.join("static/css/main.abc123.css"), "body { margin: 0; }")
        .expect("write stylesheet");
    std::fs::write(
        build.join("asset-manifest.json"),
        r#"{"files": {"main.css": "static/css/main.abc123.css"}}"#,
    )
    .expect("write manifest");
    root
}

fn reserve_loopback_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind local port");
    let port = listener.local_addr().expect("read local addr").port();
    drop(listener);
    port
}

fn start_test_server(root: &Path) -> (ControlServer, String) {
    let port = reserve_loopback_port();
    let listen = format!("127.0.0.1:{port}");
    let config = ServerConfig {
        listen: SmolStr::new(&listen),
        poll_interval: Duration::from_millis(10),
        assets_dir: root.join("build"),
        manifest: root.join("build/asset-manifest.json"),
        stylesheets: vec![SmolStr::new("main.css")],
    };
    let manifest = AssetManifest::load(&config.manifest).expect("load manifest");
    let server = ControlServer::start(&config, Box::new(PanelApp::new()), manifest)
        .expect("start control server");
    let base = format!("http://{listen}");
    wait_for_server(&base);
    (server, base)
}

fn wait_for_server(base: &str) {
    for _ in 0..80 {
        if ureq::get(&format!("{base}/commands")).call().is_ok() {
            return;
        }
        thread::sleep(Duration::from_millis(25));
    }
    panic!("control server did not become reachable at {base}");
}

fn submit(session: &mut ConsoleSession, client: &ControlClient, command: &str) -> Option<String> {
    session.set_buffer(command);
    let sent = session.begin_submit().expect("no submission outstanding");
    let outcome = match client.submit(&sent) {
        Ok(response) => SubmitOutcome::from(response),
        Err(err) => SubmitOutcome::transport_failure(err.to_string()),
    };
    session.finish_submit(outcome)
}

#[test]
fn a_session_drives_the_live_server_end_to_end() {
    let project = make_project("drive");
    let (server, base) = start_test_server(&project);
    let client = ControlClient::new(&base);

    let index = client.commands().expect("fetch command index").into_index();
    let objects: Vec<&str> = index.objects().map(|object| object.as_str()).collect();
    assert_eq!(objects, vec!["lamp", "counter", "log"]);
    let mut session = ConsoleSession::new(index);

    let initial = client.load().expect("load initial snapshot");
    assert!(
        initial.html.contains("Lamp: OFF"),
        "expected the untouched panel, got:\n{}",
        initial.html
    );
    assert_eq!(initial.css_files, vec!["static/css/main.abc123.css"]);

    let html = submit(&mut session, &client, "lamp.turn_on()")
        .expect("snapshot from a resolved submission");
    assert!(html.contains("Lamp: ON"), "got:\n{html}");
    assert_eq!(session.buffer(), "");
    assert!(!session.in_flight());

    // A rejected command still lands in history, error attached.
    submit(&mut session, &client, "valve.open()");
    let entries = session.history().entries();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].command, "lamp.turn_on()");
    assert!(entries[0].error.is_none());
    assert_eq!(entries[1].command, "valve.open()");
    assert_eq!(entries[1].error.as_deref(), Some("unknown object 'valve'"));

    // Recall walks newest first and forward steps back to fresh input.
    session.history_previous();
    assert_eq!(session.buffer(), "valve.open()");
    session.history_previous();
    assert_eq!(session.buffer(), "lamp.turn_on()");
    session.history_next();
    assert_eq!(session.buffer(), "valve.open()");
    session.history_next();
    assert_eq!(session.buffer(), "");

    let reply = client.stop().expect("request stop");
    assert_eq!(reply, "stopping");
    server.wait();

    let _ = std::fs::remove_dir_all(project);
}

#[test]
fn transport_failures_land_in_history_with_the_command() {
    // Reserved and released, so nothing listens on it.
    let port = reserve_loopback_port();
    let client = ControlClient::new(format!("http://127.0.0.1:{port}"));
    let mut session = ConsoleSession::new(CommandIndex::new());

    session.set_buffer("lamp.toggle()");
    let sent = session.begin_submit().expect("no submission outstanding");
    let err = client.submit(&sent).expect_err("no server is listening");
    let html = session.finish_submit(SubmitOutcome::transport_failure(err.to_string()));

    assert!(html.is_none(), "a dead endpoint cannot produce a snapshot");
    let entries = session.history().entries();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].command, "lamp.toggle()");
    assert!(
        entries[0].error.is_some(),
        "the failure must be recorded with the command"
    );
    assert!(!session.in_flight());

    // The failed command is recallable like any other.
    session.history_previous();
    assert_eq!(session.buffer(), "lamp.toggle()");
}

#[test]
fn styling_round_trips_through_the_client() {
    let project = make_project("styling");
    let (server, base) = start_test_server(&project);
    let client = ControlClient::new(&base);

    assert_eq!(client.styling().expect("fetch styling"), "body { margin: 0; }");

    let _ = client.stop();
    server.wait();
    let _ = std::fs::remove_dir_all(project);
}
