use once_cell::sync::Lazy;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::net::TcpListener;
use std::process::{Child, Command, Stdio};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tokio::time::sleep;

struct TestServer {
    base_url: String,
    child: Child,
}

impl Drop for TestServer {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

static TEST_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));
static SERVER: Lazy<Mutex<Option<Arc<TestServer>>>> = Lazy::new(|| Mutex::new(None));

#[cfg(unix)]
mod cleanup {
    use std::sync::atomic::{AtomicI32, Ordering};
    use std::sync::Once;

    static REGISTER: Once = Once::new();
    static PID: AtomicI32 = AtomicI32::new(0);

    pub fn register(pid: u32) {
        REGISTER.call_once(|| {
            PID.store(pid as i32, Ordering::SeqCst);
            unsafe {
                libc::atexit(on_exit);
            }
        });
    }

    extern "C" fn on_exit() {
        let pid = PID.load(Ordering::SeqCst);
        if pid > 0 {
            unsafe {
                libc::kill(pid, libc::SIGTERM);
            }
        }
    }
}

fn pick_free_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind random port");
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    port
}

fn unique_data_path() -> String {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let mut path = std::env::temp_dir();
    path.push(format!("day_dashboard_http_{}_{}.json", std::process::id(), nanos));
    path.to_string_lossy().to_string()
}

async fn wait_until_ready(base_url: &str) {
    let client = Client::new();
    let deadline = Instant::now() + Duration::from_secs(3);
    loop {
        if let Ok(resp) = client.get(format!("{base_url}/api/board")).send().await {
            if resp.status().is_success() {
                return;
            }
        }
        if Instant::now() > deadline {
            panic!("server did not become ready");
        }
        sleep(Duration::from_millis(100)).await;
    }
}

async fn spawn_server() -> TestServer {
    let port = pick_free_port();
    let data_path = unique_data_path();
    let child = Command::new(env!("CARGO_BIN_EXE_day_dashboard"))
        .env("PORT", port.to_string())
        .env("APP_DATA_PATH", data_path)
        .env_remove("DASHBOARD_REMOTE_URL")
        .env("RUST_LOG", "info")
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .spawn()
        .expect("failed to spawn server");

    #[cfg(unix)]
    cleanup::register(child.id());

    let base_url = format!("http://127.0.0.1:{port}");
    wait_until_ready(&base_url).await;

    TestServer { base_url, child }
}

async fn shared_server() -> Arc<TestServer> {
    let mut guard = SERVER.lock().await;
    if let Some(server) = guard.as_ref() {
        return Arc::clone(server);
    }
    let server = Arc::new(spawn_server().await);
    *guard = Some(Arc::clone(&server));
    server
}

async fn board(client: &Client, base_url: &str) -> Value {
    client
        .get(format!("{base_url}/api/board"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap()
}

fn find_task<'a>(board: &'a Value, id: &str) -> &'a Value {
    board["columns"]
        .as_array()
        .unwrap()
        .iter()
        .flat_map(|column| column["tasks"].as_array().unwrap())
        .find(|task| task["id"] == id)
        .expect("task on board")
}

#[tokio::test]
async fn http_board_serves_builtin_timetable() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let board = board(&client, &server.base_url).await;
    assert!(!board["date_key"].as_str().unwrap().is_empty());
    let progress = board["day_progress"].as_f64().unwrap();
    assert!((0.0..=1.0).contains(&progress));

    let columns = board["columns"].as_array().unwrap();
    assert_eq!(columns.len(), 5);
    let first = find_task(&board, "task_0");
    assert_eq!(first["time"], "05:50 - 06:30");
    assert!(["Later", "Now", "Done"].contains(&first["label"].as_str().unwrap()));
}

#[tokio::test]
async fn http_toggle_twice_restores_completion() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let before = find_task(&board(&client, &server.base_url).await, "task_1")["completed"]
        .as_bool()
        .unwrap();

    for expected in [!before, before] {
        let response: Value = client
            .post(format!("{}/api/tasks/task_1/toggle", server.base_url))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(response["persisted"], "local");
        assert_eq!(response["task"]["completed"], expected);
    }

    let subtask: Value = client
        .post(format!("{}/api/subtasks/subtask-1-0/toggle", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(subtask["task"]["id"], "task_1");
    assert_eq!(subtask["task"]["completed"], before);
}

#[tokio::test]
async fn http_unknown_task_is_not_found() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let response = client
        .post(format!("{}/api/tasks/nope/toggle", server.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn http_task_edit_validates_and_keeps_position() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let rejected = client
        .put(format!("{}/api/tasks/task_4", server.base_url))
        .json(&serde_json::json!({ "time": "11:00 - 09:00" }))
        .send()
        .await
        .unwrap();
    assert_eq!(rejected.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        find_task(&board(&client, &server.base_url).await, "task_4")["time"],
        "09:00 - 11:00"
    );

    let accepted: Value = client
        .put(format!("{}/api/tasks/task_4", server.base_url))
        .json(&serde_json::json!({ "name": "Focus block", "time": "09:00 - 10:45" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(accepted["name"], "Focus block");
    assert_eq!(accepted["time"], "09:00 - 10:45");

    let board = board(&client, &server.base_url).await;
    let lane_ids: Vec<_> = board["columns"][1]["tasks"]
        .as_array()
        .unwrap()
        .iter()
        .map(|task| task["id"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(lane_ids, ["task_4", "task_5", "task_6"]);
}

#[tokio::test]
async fn http_ledger_requires_remote_after_parsing() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let ledger: Value = client
        .get(format!("{}/api/ledger", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(ledger["transactions"].as_array().unwrap().len(), 0);
    assert_eq!(ledger["summary"]["net_amount"], "0.00");

    let malformed = client
        .post(format!("{}/api/ledger", server.base_url))
        .json(&serde_json::json!({ "text": "bad input" }))
        .send()
        .await
        .unwrap();
    assert_eq!(malformed.status(), StatusCode::BAD_REQUEST);

    let no_remote = client
        .post(format!("{}/api/ledger", server.base_url))
        .json(&serde_json::json!({ "text": "Lunch - 12.50" }))
        .send()
        .await
        .unwrap();
    assert_eq!(no_remote.status(), StatusCode::SERVICE_UNAVAILABLE);
}
