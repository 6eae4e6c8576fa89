use odap_clean::clients::{OdapClient, ProblemQuery};
use odap_clean::config::Config;
use odap_clean::error::{ApiError, AppError};
use odap_clean::infrastructure::session_context::TOKEN_KEY;
use odap_clean::infrastructure::{ApiTransport, FileStore, KeyValueStore, MemoryStore, SessionContext};
use odap_clean::logger;
use odap_clean::models::StatusFilter;
use odap_clean::services::{AuthService, PlaylistStore, SolvePlaylist};
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio_test::{assert_err, assert_ok};

fn client_at(base_url: &str, store: Arc<dyn KeyValueStore>) -> (OdapClient, SessionContext) {
    let session = SessionContext::init(store);
    (OdapClient::new(ApiTransport::new(base_url, session.clone())), session)
}

#[test]
fn test_token_and_playlist_survive_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("storage.json");

    {
        let store: Arc<dyn KeyValueStore> = Arc::new(FileStore::open(&path).unwrap());
        let session = SessionContext::init(store.clone());
        assert!(!session.is_authenticated());
        assert_ok!(session.set_token("abc"));

        let playlist = SolvePlaylist::new(vec![3, 4], StatusFilter::Wrong).unwrap();
        assert_ok!(PlaylistStore::new(store).save(&playlist));
    }

    let store: Arc<dyn KeyValueStore> = Arc::new(FileStore::open(&path).unwrap());
    let session = SessionContext::init(store.clone());
    assert_eq!(session.token().as_deref(), Some("abc"));

    let playlists = PlaylistStore::new(store);
    assert_eq!(playlists.load().unwrap().unwrap().current(), Some(3));
    assert_eq!(playlists.peek_next().unwrap(), Some(4));

    assert_ok!(session.teardown());
    assert!(!session.is_authenticated());
}

#[test]
fn test_unreachable_backend_is_request_failed() {
    let (client, _) = client_at("http://127.0.0.1:1/api/v1", Arc::new(MemoryStore::new()));
    let result = tokio_test::block_on(client.list_problems(&ProblemQuery::default()));
    let err = assert_err!(result);
    assert!(matches!(err, AppError::Api(ApiError::RequestFailed { .. })));
}

/// 对第一个连接返回固定的 HTTP 响应
async fn serve_once(response: &'static str) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut buf = [0u8; 4096];
        let _ = socket.read(&mut buf).await;
        socket.write_all(response.as_bytes()).await.unwrap();
        let _ = socket.shutdown().await;
    });
    format!("http://{}/api/v1", addr)
}

#[tokio::test]
async fn test_401_clears_token_centrally() {
    let base_url = serve_once(
        "HTTP/1.1 401 Unauthorized\r\ncontent-type: application/json\r\ncontent-length: 2\r\nconnection: close\r\n\r\n{}",
    )
    .await;
    let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
    let (client, session) = client_at(&base_url, store.clone());
    assert_ok!(session.set_token("expired"));
    assert!(session.is_authenticated());

    let err = assert_err!(client.list_folders().await);
    assert!(err.is_unauthorized());
    assert!(!session.is_authenticated());
    assert_eq!(store.get(TOKEN_KEY), None);
}

#[tokio::test]
async fn test_error_status_keeps_token() {
    let base_url = serve_once(
        "HTTP/1.1 404 Not Found\r\ncontent-type: application/json\r\ncontent-length: 22\r\nconnection: close\r\n\r\n{\"detail\":\"Not found\"}",
    )
    .await;
    let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
    let (client, session) = client_at(&base_url, store.clone());
    assert_ok!(session.set_token("valid"));

    let err = assert_err!(client.get_problem(9).await);
    match err {
        AppError::Api(ApiError::BadResponse { status, detail, .. }) => {
            assert_eq!(status, 404);
            assert_eq!(detail.as_deref(), Some("Not found"));
        }
        other => panic!("应为 BadResponse: {:?}", other),
    }
    assert_eq!(store.get(TOKEN_KEY).as_deref(), Some("valid"));
}

#[tokio::test]
async fn test_login_validation_happens_before_request() {
    let (client, session) = client_at("http://127.0.0.1:1/api/v1", Arc::new(MemoryStore::new()));
    let auth = AuthService::new(client, session);

    let err = assert_err!(auth.login("  ", "pw", false, false).await);
    assert!(matches!(err, AppError::Validation(_)));
    assert!(!auth.is_authenticated());
}

#[tokio::test]
#[ignore] // 需要本地后端：cargo test -- --ignored
async fn test_login_and_list_against_local_backend() {
    logger::init();
    let config = Config::from_env();

    let (client, session) = client_at(&config.api_base_url, Arc::new(MemoryStore::new()));
    let auth = AuthService::new(client.clone(), session);

    let username = std::env::var("ODAP_TEST_USER").unwrap_or_else(|_| "test".to_string());
    let password = std::env::var("ODAP_TEST_PASSWORD").unwrap_or_else(|_| "test".to_string());
    auth.login(&username, &password, false, false)
        .await
        .expect("登录失败");
    assert!(auth.is_authenticated());

    let folders = client.list_folders().await.expect("读取文件夹失败");
    println!("文件夹 {} 个", folders.len());

    let problems = client
        .list_problems(&ProblemQuery::default())
        .await
        .expect("读取题目失败");
    println!("题目 {} 道", problems.len());
}
