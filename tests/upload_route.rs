use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use mixcritic::error::ServiceError;
use mixcritic::feedback::FeedbackService;
use mixcritic::server::router;
use mixcritic::{CritiquePipeline, FeatureConfig};
use std::io::Cursor;
use std::sync::Arc;
use tower::ServiceExt;

const BOUNDARY: &str = "mixcritic-test-boundary";

struct CannedFeedback;

#[async_trait]
impl FeedbackService for CannedFeedback {
    async fn generate(&self, _prompt: &str) -> Result<String, ServiceError> {
        Ok("Nice tone, push the chorus harder.".to_string())
    }
}

struct UnreachableFeedback;

#[async_trait]
impl FeedbackService for UnreachableFeedback {
    async fn generate(&self, _prompt: &str) -> Result<String, ServiceError> {
        Err(ServiceError::Connection("connection refused".to_string()))
    }
}

/// Render a sine tone WAV fully in memory
fn sine_wav_bytes(frequency: f32, duration_secs: f32, sample_rate: u32) -> Vec<u8> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = hound::WavWriter::new(&mut cursor, spec).expect("create wav");
        let num_samples = (duration_secs * sample_rate as f32) as usize;
        for i in 0..num_samples {
            let t = i as f32 / sample_rate as f32;
            let sample = (2.0 * std::f32::consts::PI * frequency * t).sin() * 0.5;
            writer
                .write_sample((sample * i16::MAX as f32) as i16)
                .expect("write sample");
        }
        writer.finalize().expect("finalize wav");
    }
    cursor.into_inner()
}

/// Build a multipart/form-data body; `filename` is set for binary parts
fn multipart_body(parts: &[(&str, Option<&str>, &[u8])]) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, filename, data) in parts {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        match filename {
            Some(fname) => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n\
                         Content-Type: application/octet-stream\r\n\r\n",
                        name, fname
                    )
                    .as_bytes(),
                );
            }
            None => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", name).as_bytes(),
                );
            }
        }
        body.extend_from_slice(data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}

fn upload_request(body: Vec<u8>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/upload")
        .header(
            "content-type",
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .expect("build request")
}

async fn response_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    serde_json::from_slice(&bytes).expect("parse json")
}

#[tokio::test]
async fn test_upload_returns_analysis_and_feedback() {
    let pipeline = Arc::new(CritiquePipeline::new(
        FeatureConfig::default(),
        CannedFeedback,
    ));
    let app = router(pipeline);

    let wav = sine_wav_bytes(440.0, 1.0, 44100);
    let body = multipart_body(&[
        ("file", Some("tone.wav"), &wav),
        ("lyrics", None, b"la la"),
        ("chords", None, b""),
        ("vocal_notes", None, b""),
        ("goals", None, b"be louder"),
    ]);

    let response = app.oneshot(upload_request(body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = response_json(response).await;
    let analysis = json["analysis"].as_str().expect("analysis string");
    assert!(analysis.starts_with("Duration: 1.00s"));
    assert_eq!(json["feedback"], "Nice tone, push the chorus harder.");
}

#[tokio::test]
async fn test_upload_without_file_is_rejected() {
    let pipeline = Arc::new(CritiquePipeline::new(
        FeatureConfig::default(),
        CannedFeedback,
    ));
    let app = router(pipeline);

    let body = multipart_body(&[("lyrics", None, b"la la")]);
    let response = app.oneshot(upload_request(body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = response_json(response).await;
    assert!(json["error"].as_str().is_some());
}

#[tokio::test]
async fn test_upload_with_undecodable_audio_reports_error() {
    let pipeline = Arc::new(CritiquePipeline::new(
        FeatureConfig::default(),
        CannedFeedback,
    ));
    let app = router(pipeline);

    let body = multipart_body(&[("file", Some("junk.wav"), b"not audio at all")]);
    let response = app.oneshot(upload_request(body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let json = response_json(response).await;
    assert!(json["error"].as_str().is_some());
}

#[tokio::test]
async fn test_upload_reports_service_failure_as_error() {
    let pipeline = Arc::new(CritiquePipeline::new(
        FeatureConfig::default(),
        UnreachableFeedback,
    ));
    let app = router(pipeline);

    let wav = sine_wav_bytes(440.0, 0.5, 44100);
    let body = multipart_body(&[("file", Some("tone.wav"), &wav)]);
    let response = app.oneshot(upload_request(body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let json = response_json(response).await;
    let error = json["error"].as_str().expect("error string");
    assert!(error.contains("feedback service"), "got error: {}", error);
}
