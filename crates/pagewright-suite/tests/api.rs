//! Account API client against a local HTTP stub.

use pagewright_suite::{AccountApi, Error};
use reqwest::Client;
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

/// One request the stub received.
#[derive(Debug, Clone)]
struct Request {
    method: String,
    path: String,
    headers: Vec<(String, String)>,
    body: String,
}

impl Request {
    fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    fn json(&self) -> Value {
        serde_json::from_str(&self.body).unwrap()
    }
}

type Route = dyn Fn(&Request) -> (u16, Value) + Send + Sync;

/// Serve `route` on an ephemeral port; returns the base URL and the request log.
async fn serve(
    route: impl Fn(&Request) -> (u16, Value) + Send + Sync + 'static,
) -> (String, Arc<Mutex<Vec<Request>>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let log = Arc::new(Mutex::new(Vec::new()));
    let route: Arc<Route> = Arc::new(route);

    let requests = log.clone();
    tokio::spawn(async move {
        while let Ok((stream, _)) = listener.accept().await {
            let requests = requests.clone();
            let route = route.clone();
            tokio::spawn(async move { handle(stream, &*route, &requests).await });
        }
    });

    (format!("http://{addr}"), log)
}

async fn handle(mut stream: TcpStream, route: &Route, log: &Mutex<Vec<Request>>) {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    let head_end = loop {
        let n = stream.read(&mut chunk).await.unwrap();
        if n == 0 {
            return;
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&buf[..head_end]).to_string();
    let mut lines = head.split("\r\n");
    let mut start = lines.next().unwrap().split(' ');
    let method = start.next().unwrap().to_string();
    let path = start.next().unwrap().to_string();
    let headers: Vec<(String, String)> = lines
        .filter_map(|line| line.split_once(':'))
        .map(|(key, value)| (key.trim().to_string(), value.trim().to_string()))
        .collect();

    let length = headers
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case("content-length"))
        .map_or(0, |(_, value)| value.parse::<usize>().unwrap());
    while buf.len() < head_end + length {
        let n = stream.read(&mut chunk).await.unwrap();
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }
    let body = String::from_utf8_lossy(&buf[head_end..]).to_string();

    let request = Request {
        method,
        path,
        headers,
        body,
    };
    let (status, payload) = route(&request);
    log.lock().unwrap().push(request);

    let payload = payload.to_string();
    let response = format!(
        "HTTP/1.1 {status} Stub\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{payload}",
        payload.len()
    );
    stream.write_all(response.as_bytes()).await.unwrap();
    stream.shutdown().await.ok();
}

/// The account service: users created by POST are readable by GET.
fn account_service() -> impl Fn(&Request) -> (u16, Value) + Send + Sync + 'static {
    let users = Mutex::new(Vec::<(String, String)>::new());
    move |request: &Request| match (request.method.as_str(), request.path.as_str()) {
        ("POST", "/Account/v1/User") => {
            let name = request.json()["userName"].as_str().unwrap().to_string();
            let mut users = users.lock().unwrap();
            let id = format!("id-{}", users.len() + 1);
            users.push((id.clone(), name.clone()));
            (201, json!({"userID": id, "username": name, "books": []}))
        }
        ("POST", "/Account/v1/GenerateToken") => (
            200,
            json!({
                "token": "tok-123",
                "expires": "2030-01-01T00:00:00.000Z",
                "status": "Success",
                "result": "User authorized successfully."
            }),
        ),
        ("GET", path) => {
            let id = path.trim_start_matches("/Account/v1/User/");
            match users.lock().unwrap().iter().find(|(uid, _)| uid == id) {
                Some((uid, name)) => (200, json!({"userId": uid, "username": name, "books": []})),
                None => (401, json!({"code": "1207", "message": "User not found!"})),
            }
        }
        _ => (404, json!({})),
    }
}

#[tokio::test]
async fn test_created_user_can_be_read_back() {
    let (base_url, log) = serve(account_service()).await;
    let mut api = AccountApi::with_client(Client::new(), &format!("{base_url}/"));
    let password = api.password().to_string();

    let created = api.create_user("user_4821", &password).await.unwrap();
    assert_eq!(created.user_id, "id-1");
    assert_eq!(created.username, "user_4821");

    let token = api.generate_token("user_4821", &password).await.unwrap();
    assert_eq!(token.token.as_deref(), Some("tok-123"));
    assert_eq!(api.token(), Some("tok-123"));

    let fetched = api.get_user(&created.user_id).await.unwrap();
    assert_eq!(fetched.user_id, created.user_id);
    assert_eq!(fetched.username, "user_4821");

    let requests = log.lock().unwrap().clone();
    assert_eq!(requests.len(), 3);
    assert_eq!(
        requests[0].json(),
        json!({"userName": "user_4821", "password": password})
    );
    assert_eq!(requests[0].header("authorization"), None);
    assert_eq!(requests[2].method, "GET");
    assert_eq!(requests[2].path, "/Account/v1/User/id-1");
    assert_eq!(requests[2].header("authorization"), Some("Bearer tok-123"));
}

#[tokio::test]
async fn test_rejected_create_is_unexpected_status() {
    let (base_url, _log) =
        serve(|_| (406, json!({"code": "1204", "message": "User exists!"}))).await;
    let api = AccountApi::with_client(Client::new(), &base_url);

    let err = api.create_user("user_1", api.password()).await.unwrap_err();
    match err {
        Error::UnexpectedStatus {
            endpoint,
            expected,
            actual,
        } => {
            assert_eq!(endpoint, format!("{base_url}/Account/v1/User"));
            assert_eq!(expected, 201);
            assert_eq!(actual, 406);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_null_token_is_not_stored() {
    let (base_url, log) = serve(|request| match request.method.as_str() {
        "POST" => (
            200,
            json!({
                "token": null,
                "expires": null,
                "status": "Failed",
                "result": "User authorization failed."
            }),
        ),
        _ => (401, json!({"code": "1200", "message": "User not authorized!"})),
    })
    .await;
    let mut api = AccountApi::with_client(Client::new(), &base_url);

    let token = api.generate_token("user_1", "wrong").await.unwrap();
    assert_eq!(token.token, None);
    assert_eq!(token.status, "Failed");
    assert_eq!(api.token(), None);

    let err = api.get_user("id-1").await.unwrap_err();
    assert!(matches!(err, Error::UnexpectedStatus { actual: 401, .. }));
    let requests = log.lock().unwrap().clone();
    assert_eq!(requests[1].header("authorization"), None);
}
