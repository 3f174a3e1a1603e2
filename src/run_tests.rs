//! Tests for the run module.

use super::*;

use std::io::Cursor;

use tempfile::tempdir;
use webhook_worker::config::Cli;
use webhook_worker::delivery::{HttpRequest, HttpResponse, StatusPolicy};
use webhook_worker::log::{LogItem, LogStatus};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config(args: &[&str]) -> ValidatedConfig {
    let mut full_args = vec!["webhook-worker"];
    full_args.extend(args);
    ValidatedConfig::from_raw(&Cli::parse_from_iter(full_args), None).unwrap()
}

fn input(lines: &[String]) -> JobInput {
    let mut text = lines.join("\n");
    text.push('\n');
    Box::new(Cursor::new(text.into_bytes()))
}

fn job_line(request_id: &str, url: &str) -> String {
    serde_json::json!({
        "projectId": "project-1",
        "functionId": "function-1",
        "requestId": request_id,
        "url": url,
        "payload": r#"{"event":"created"}"#,
        "headers": [["X-Signature", "abc"]],
    })
    .to_string()
}

fn read_logs(path: &Path) -> Vec<LogItem> {
    std::fs::read_to_string(path)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect()
}

fn test_client() -> ReqwestClient {
    ReqwestClient::from_client(reqwest::Client::builder().no_proxy().build().unwrap())
}

/// Answers immediately, except for URLs under `/hang`, which never complete.
struct HangingClient {
    started: tokio::sync::mpsc::UnboundedSender<String>,
}

impl HttpClient for HangingClient {
    async fn request(&self, req: HttpRequest) -> Result<HttpResponse, HttpError> {
        let _ = self.started.send(req.url.path().to_string());
        if req.url.path().starts_with("/hang") {
            std::future::pending::<()>().await;
        }
        Ok(HttpResponse::new(
            ::http::StatusCode::OK,
            ::http::HeaderMap::new(),
            b"{}".to_vec(),
        ))
    }
}

mod run_error {
    use super::*;

    #[test]
    fn shutdown_timeout_displays_seconds() {
        let error = RunError::ShutdownTimeout(Duration::from_secs(30));
        assert_eq!(
            error.to_string(),
            "Shutdown timed out after 30s with deliveries still in flight"
        );
    }

    #[test]
    fn worker_error_converts() {
        let error = RunError::from(WorkerError::AlreadyStarted);
        assert_eq!(error.to_string(), "Worker failed: Worker has already been started");
    }

    #[test]
    fn open_jobs_displays_path() {
        let error = RunError::OpenJobs {
            path: PathBuf::from("/missing/jobs.ndjson"),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        };
        assert!(error.to_string().starts_with("Failed to open job input '/missing/jobs.ndjson'"));
    }
}

mod client_setup {
    use super::*;

    #[test]
    fn default_config_accepts_all_statuses() {
        let client = create_client(&config(&[])).unwrap();
        assert_eq!(client.status_policy(), StatusPolicy::AcceptAll);
    }

    #[test]
    fn flag_enables_reject_policy() {
        let client = create_client(&config(&["--fail-on-error-status"])).unwrap();
        assert_eq!(client.status_policy(), StatusPolicy::RejectErrorStatus);
    }
}

mod io_setup {
    use super::*;

    #[tokio::test]
    async fn missing_job_file_is_reported() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing.ndjson");

        let result = open_jobs(Some(&path)).await;

        assert!(matches!(result, Err(RunError::OpenJobs { .. })));
    }

    #[tokio::test]
    async fn log_file_is_created_and_appended() {
        use tokio::io::AsyncWriteExt;

        let dir = tempdir().unwrap();
        let path = dir.path().join("logs.ndjson");
        std::fs::write(&path, "existing\n").unwrap();

        let mut output = open_logs(Some(&path)).await.unwrap();
        output.write_all(b"appended\n").await.unwrap();
        output.flush().await.unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "existing\nappended\n");
    }

    #[tokio::test]
    async fn log_directory_must_exist() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing").join("logs.ndjson");

        let result = open_logs(Some(&path)).await;

        assert!(matches!(result, Err(RunError::OpenLogs { .. })));
    }
}

mod end_to_end {
    use super::*;

    #[tokio::test]
    async fn delivers_every_job_and_writes_one_log_each() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/ok"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"logs":["handled"]}"#))
            .expect(2)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/broken"))
            .respond_with(ResponseTemplate::new(500).set_body_string("oops"))
            .expect(1)
            .mount(&server)
            .await;

        let dir = tempdir().unwrap();
        let logs_path = dir.path().join("logs.ndjson");
        let lines = vec![
            job_line("a", &format!("{}/ok", server.uri())),
            "not json".to_string(),
            job_line("b", &format!("{}/broken", server.uri())),
            job_line("c", &format!("{}/ok", server.uri())),
        ];

        let written = run_worker(
            &config(&[]),
            test_client(),
            input(&lines),
            open_logs(Some(&logs_path)).await.unwrap(),
            std::future::pending(),
        )
        .await
        .unwrap();

        assert_eq!(written, 3);
        let mut logs = read_logs(&logs_path);
        logs.sort_by(|x, y| x.request_id.cmp(&y.request_id));
        assert_eq!(logs.len(), 3);
        assert!(logs.iter().all(|item| item.status == LogStatus::Success));
        assert_eq!(logs[0].request_id, "a");
        assert_eq!(
            serde_json::to_value(&logs[0].message).unwrap()["logs"],
            serde_json::json!(["handled"])
        );
        assert_eq!(
            serde_json::to_value(&logs[1].message).unwrap()["returnValue"],
            serde_json::json!({"rawResponse": "oops"})
        );
    }

    #[tokio::test]
    async fn reject_policy_logs_error_status_as_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503).set_body_string("down"))
            .mount(&server)
            .await;

        let dir = tempdir().unwrap();
        let logs_path = dir.path().join("logs.ndjson");
        let url = format!("{}/hook", server.uri());

        run_worker(
            &config(&[]),
            test_client().with_status_policy(StatusPolicy::RejectErrorStatus),
            input(&[job_line("a", &url)]),
            open_logs(Some(&logs_path)).await.unwrap(),
            std::future::pending(),
        )
        .await
        .unwrap();

        let logs = read_logs(&logs_path);
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].status, LogStatus::Failure);
        let error = serde_json::to_value(&logs[0].message).unwrap()["error"]
            .as_str()
            .unwrap()
            .to_string();
        assert!(error.starts_with(&format!(
            "Call to {url} failed with status 503, response body 'down' and headers ["
        )));
    }

    #[tokio::test]
    async fn immediate_shutdown_writes_only_accepted_jobs() {
        let dir = tempdir().unwrap();
        let logs_path = dir.path().join("logs.ndjson");
        let (_tx, rx) = tokio::io::duplex(64);
        let never_ending: JobInput = Box::new(BufReader::new(rx));

        let written = run_worker(
            &config(&[]),
            test_client(),
            never_ending,
            open_logs(Some(&logs_path)).await.unwrap(),
            std::future::ready(()),
        )
        .await
        .unwrap();

        assert_eq!(written, 0);
        assert!(read_logs(&logs_path).is_empty());
    }

    #[tokio::test]
    async fn shutdown_timeout_still_writes_finished_deliveries() {
        use tokio::io::AsyncReadExt;

        let dir = tempdir().unwrap();
        let logs_path = dir.path().join("logs.ndjson");
        let (tx, mut started) = tokio::sync::mpsc::unbounded_channel();
        let (_keep_open, rx) = tokio::io::duplex(64);
        let lines = format!(
            "{}\n{}\n",
            job_line("fast", "https://example.test/ok"),
            job_line("slow", "https://example.test/hang")
        );
        let jobs: JobInput = Box::new(BufReader::new(
            Cursor::new(lines.into_bytes()).chain(rx),
        ));
        let both_started = async move {
            started.recv().await;
            started.recv().await;
        };

        let result = run_worker(
            &config(&["--shutdown-timeout", "1"]),
            HangingClient { started: tx },
            jobs,
            open_logs(Some(&logs_path)).await.unwrap(),
            both_started,
        )
        .await;

        assert!(matches!(result, Err(RunError::ShutdownTimeout(_))));
        let logs = read_logs(&logs_path);
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].request_id, "fast");
        assert_eq!(logs[0].status, LogStatus::Success);
    }
}
