//! Command dispatch for the `videointel` binary.

use std::io::Write;
use std::path::PathBuf;

use videointel_lib::core::annotations::{format_annotation, AnalysisRequest, FeatureKind};
use videointel_lib::core::jobs::AnnotationClient;

pub const USAGE: &str = "\
Usage: videointel [command] [arguments]

Commands:
  analyze_labels       <gcs_path>   Detects labels given a remote storage path.
  analyze_labels_local <local_path> Detects labels given a local file path.
  analyze_faces        <gcs_path>   Detects faces given a remote storage path.
  analyze_safe_search  <gcs_path>   Detects safe-search features for the path.
  analyze_shots        <gcs_path>   Detects camera shot changes.
";

/// A recognized sample command
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    AnalyzeLabels { uri: String },
    AnalyzeLabelsLocal { path: PathBuf },
    AnalyzeFaces { uri: String },
    AnalyzeSafeSearch { uri: String },
    AnalyzeShots { uri: String },
}

impl Command {
    /// Parses `<command> <path>`; anything else is `None` (print usage).
    /// Arguments after the path are ignored.
    pub fn parse(args: &[String]) -> Option<Self> {
        let (name, target) = match args {
            [name, target, ..] if !target.trim().is_empty() => (name.as_str(), target.clone()),
            _ => return None,
        };

        let command = match name {
            "analyze_labels" => Command::AnalyzeLabels { uri: target },
            "analyze_labels_local" => Command::AnalyzeLabelsLocal {
                path: PathBuf::from(target),
            },
            "analyze_faces" => Command::AnalyzeFaces { uri: target },
            "analyze_safe_search" => Command::AnalyzeSafeSearch { uri: target },
            "analyze_shots" => Command::AnalyzeShots { uri: target },
            _ => return None,
        };
        Some(command)
    }

    /// Feature requested by the command
    pub fn feature(&self) -> FeatureKind {
        match self {
            Command::AnalyzeLabels { .. } | Command::AnalyzeLabelsLocal { .. } => {
                FeatureKind::LabelDetection
            }
            Command::AnalyzeFaces { .. } => FeatureKind::FaceDetection,
            Command::AnalyzeSafeSearch { .. } => FeatureKind::SafeSearchDetection,
            Command::AnalyzeShots { .. } => FeatureKind::ShotChangeDetection,
        }
    }

    async fn request(&self) -> anyhow::Result<AnalysisRequest> {
        let features = [self.feature()];
        let request = match self {
            Command::AnalyzeLabelsLocal { path } => {
                AnalysisRequest::from_local_file(path, features).await?
            }
            Command::AnalyzeLabels { uri }
            | Command::AnalyzeFaces { uri }
            | Command::AnalyzeSafeSearch { uri }
            | Command::AnalyzeShots { uri } => AnalysisRequest::remote(uri.as_str(), features),
        };
        Ok(request)
    }
}

/// Runs the command named by `args`, or writes `USAGE` when there is none.
///
/// The client is only built once a command is recognized, so usage output
/// never needs credentials and never reaches the service.
pub async fn dispatch<W, F>(args: &[String], make_client: F, out: &mut W) -> anyhow::Result<()>
where
    W: Write,
    F: FnOnce() -> anyhow::Result<AnnotationClient>,
{
    let Some(command) = Command::parse(args) else {
        write!(out, "{}", USAGE)?;
        return Ok(());
    };

    let client = make_client()?;
    tracing::debug!("Using {:?}", client);
    run(&command, &client, out).await
}

/// Submits the command's request, waits for it, and writes the formatted result
pub async fn run<W: Write>(
    command: &Command,
    client: &AnnotationClient,
    out: &mut W,
) -> anyhow::Result<()> {
    let feature = command.feature();
    let request = command.request().await?;

    let operation = client
        .submit(request, move |completed| {
            let result = completed.into_first_result()?;
            Ok(format_annotation(&result.annotation_for(feature)))
        })
        .await?;

    writeln!(out, "Processing video for {} annotations:", feature)?;
    out.flush()?;

    let lines = operation.wait_until_done().await?;

    writeln!(out, "Finished processing.")?;
    for line in lines {
        writeln!(out, "{}", line)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;
    use videointel_lib::core::annotations::{
        AnnotationApi, LabelAnnotation, LabelLocation, Likelihood, SafeSearchAnnotation,
        TimeSegment, VideoAnnotationResults, VideoSource,
    };
    use videointel_lib::core::jobs::{OperationSnapshot, PollConfig};
    use videointel_lib::core::{CoreError, CoreResult, OperationName};

    /// Records requests and answers every poll with a fixed snapshot
    struct FakeApi {
        snapshot: OperationSnapshot,
        requests: Mutex<Vec<AnalysisRequest>>,
        polls: AtomicUsize,
    }

    impl FakeApi {
        fn new(snapshot: OperationSnapshot) -> Arc<Self> {
            Arc::new(Self {
                snapshot,
                requests: Mutex::new(Vec::new()),
                polls: AtomicUsize::new(0),
            })
        }

        fn with_results(results: VideoAnnotationResults) -> Arc<Self> {
            Self::new(OperationSnapshot::succeeded("op-7", vec![results]))
        }
    }

    #[async_trait]
    impl AnnotationApi for FakeApi {
        fn name(&self) -> &str {
            "fake"
        }

        async fn annotate(&self, request: &AnalysisRequest) -> CoreResult<OperationName> {
            self.requests.lock().unwrap().push(request.clone());
            Ok("op-7".to_string())
        }

        async fn get_operation(&self, _name: &str) -> CoreResult<OperationSnapshot> {
            self.polls.fetch_add(1, Ordering::SeqCst);
            Ok(self.snapshot.clone())
        }
    }

    fn client(api: Arc<FakeApi>) -> AnnotationClient {
        AnnotationClient::new(
            api,
            PollConfig {
                interval: Duration::from_millis(5),
                max_wait: Some(Duration::from_secs(5)),
            },
        )
    }

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    async fn run_to_string(command: &Command, api: Arc<FakeApi>) -> anyhow::Result<String> {
        let mut out = Vec::new();
        run(command, &client(api), &mut out).await?;
        Ok(String::from_utf8(out)?)
    }

    #[test]
    fn test_parse_known_commands() {
        assert_eq!(
            Command::parse(&args(&["analyze_shots", "gs://demomaker/gbikes_dinosaur.mp4"])),
            Some(Command::AnalyzeShots {
                uri: "gs://demomaker/gbikes_dinosaur.mp4".to_string()
            })
        );
        assert_eq!(
            Command::parse(&args(&["analyze_labels_local", "resources/cat.mp4"])),
            Some(Command::AnalyzeLabelsLocal {
                path: PathBuf::from("resources/cat.mp4")
            })
        );
        assert_eq!(
            Command::parse(&args(&["analyze_safe_search", "gs://b/v.mp4"]))
                .map(|c| c.feature()),
            Some(FeatureKind::SafeSearchDetection)
        );
    }

    #[test]
    fn test_parse_rejects_unknown_or_incomplete() {
        assert_eq!(Command::parse(&[]), None);
        assert_eq!(Command::parse(&args(&["analyze_labels"])), None);
        assert_eq!(Command::parse(&args(&["analyze_labels", " "])), None);
        assert_eq!(Command::parse(&args(&["analyze_everything", "gs://b/v.mp4"])), None);
    }

    #[test]
    fn test_usage_lists_every_command() {
        for name in [
            "analyze_labels ",
            "analyze_labels_local",
            "analyze_faces",
            "analyze_safe_search",
            "analyze_shots",
        ] {
            assert!(USAGE.contains(name), "usage is missing {}", name);
        }
    }

    #[tokio::test]
    async fn test_dispatch_prints_usage_without_calling_service() {
        for input in [
            args(&["analyze_everything", "gs://b/v.mp4"]),
            args(&["analyze_labels"]),
            Vec::new(),
        ] {
            let api = FakeApi::with_results(VideoAnnotationResults::default());
            let factory_calls = AtomicUsize::new(0);
            let mut out = Vec::new();

            dispatch(
                &input,
                || {
                    factory_calls.fetch_add(1, Ordering::SeqCst);
                    Ok(client(api.clone()))
                },
                &mut out,
            )
            .await
            .unwrap();

            assert_eq!(String::from_utf8(out).unwrap(), USAGE, "input: {:?}", input);
            assert_eq!(factory_calls.load(Ordering::SeqCst), 0);
            assert!(api.requests.lock().unwrap().is_empty());
            assert_eq!(api.polls.load(Ordering::SeqCst), 0);
        }
    }

    #[tokio::test]
    async fn test_dispatch_runs_recognized_command() {
        let api = FakeApi::with_results(VideoAnnotationResults {
            shot_annotations: vec![TimeSegment::new(0, 2_000_000)],
            ..Default::default()
        });
        let mut out = Vec::new();

        dispatch(
            &args(&["analyze_shots", "gs://bucket/bikes.mp4"]),
            || Ok(client(api.clone())),
            &mut out,
        )
        .await
        .unwrap();

        let output = String::from_utf8(out).unwrap();
        assert!(output.ends_with("Scenes:\n0.0 through 2.0\n"));
        assert_eq!(api.requests.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_dispatch_propagates_client_errors() {
        let mut out = Vec::new();
        let result = dispatch(
            &args(&["analyze_faces", "gs://bucket/v.mp4"]),
            || Err(anyhow::anyhow!("no credential configured")),
            &mut out,
        )
        .await;

        assert!(result.is_err());
        assert!(out.is_empty());
    }

    #[tokio::test]
    async fn test_run_shots() {
        let api = FakeApi::with_results(VideoAnnotationResults {
            shot_annotations: vec![
                TimeSegment::new(0, 1_500_000),
                TimeSegment::new(1_500_000, 3_000_000),
            ],
            ..Default::default()
        });
        let command = Command::AnalyzeShots {
            uri: "gs://bucket/bikes.mp4".to_string(),
        };

        let output = run_to_string(&command, api.clone()).await.unwrap();
        assert_eq!(
            output,
            "Processing video for shot change annotations:\n\
             Finished processing.\n\
             Scenes:\n\
             0.0 through 1.5\n\
             1.5 through 3.0\n"
        );

        let requests = api.requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(
            requests[0].source,
            VideoSource::RemoteUri("gs://bucket/bikes.mp4".to_string())
        );
    }

    #[tokio::test]
    async fn test_run_labels() {
        let api = FakeApi::with_results(VideoAnnotationResults {
            label_annotations: vec![LabelAnnotation {
                description: "Bird".to_string(),
                locations: vec![
                    LabelLocation::whole_video(),
                    LabelLocation::segment(2_000_000, 5_000_000),
                ],
                ..Default::default()
            }],
            ..Default::default()
        });
        let command = Command::AnalyzeLabels {
            uri: "gs://bucket/bird.mp4".to_string(),
        };

        let output = run_to_string(&command, api).await.unwrap();
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(
            lines,
            vec![
                "Processing video for label annotations:",
                "Finished processing.",
                "Label description: Bird",
                "Locations:",
                "Entire video",
                "2.0 through 5.0",
            ]
        );
    }

    #[tokio::test]
    async fn test_run_safe_search() {
        let api = FakeApi::with_results(VideoAnnotationResults {
            safe_search_annotations: vec![SafeSearchAnnotation {
                time_offset: 0,
                adult: Likelihood::VeryUnlikely,
                spoof: Likelihood::Unlikely,
                medical: Likelihood::Possible,
                racy: Likelihood::Likely,
                violent: Likelihood::VeryLikely,
            }],
            ..Default::default()
        });
        let command = Command::AnalyzeSafeSearch {
            uri: "gs://bucket/clip.mp4".to_string(),
        };

        let output = run_to_string(&command, api).await.unwrap();
        assert!(output.starts_with("Processing video for safe search annotations:\n"));
        assert!(output.contains("Time:    0.0\n"));
        assert!(output.contains("violent: VERY_LIKELY\n"));
    }

    #[tokio::test]
    async fn test_run_local_file_sends_inline_bytes() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"fake video bytes").unwrap();

        let api = FakeApi::with_results(VideoAnnotationResults::default());
        let command = Command::AnalyzeLabelsLocal {
            path: file.path().to_path_buf(),
        };

        let output = run_to_string(&command, api.clone()).await.unwrap();
        assert!(output.ends_with("Finished processing.\n"));

        let requests = api.requests.lock().unwrap();
        assert_eq!(
            requests[0].source,
            VideoSource::InlineBytes(b"fake video bytes".to_vec())
        );
    }

    #[tokio::test]
    async fn test_run_missing_local_file_makes_no_call() {
        let dir = tempfile::TempDir::new().unwrap();
        let api = FakeApi::with_results(VideoAnnotationResults::default());
        let command = Command::AnalyzeLabelsLocal {
            path: dir.path().join("absent.mp4"),
        };

        let err = run_to_string(&command, api.clone()).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<CoreError>(),
            Some(CoreError::LocalFileRead { .. })
        ));
        assert!(api.requests.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_run_operation_error_prints_no_results() {
        let api = FakeApi::new(OperationSnapshot::failed("op-7", 3, "Invalid input URI"));
        let command = Command::AnalyzeFaces {
            uri: "gs://bucket/missing.mp4".to_string(),
        };

        let mut out = Vec::new();
        let err = run(&command, &client(api), &mut out).await.unwrap_err();
        let output = String::from_utf8(out).unwrap();

        assert!(err.to_string().contains("Invalid input URI"));
        assert!(!output.contains("Finished processing."));
    }
}
