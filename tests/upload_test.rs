//! Upload API integration tests.
//!
//! Drive `POST /api/videos` over real HTTP against a server whose encoder
//! is scripted, then check the response shape and what landed on disk.

mod common;

use std::collections::HashSet;
use std::time::Duration;

use common::{ScriptedRunner, TestHarness};
use reqwest::StatusCode;
use serde_json::Value;
use vp_core::JobKind;

const CLIP: &[u8] = b"\x00\x00\x00\x18ftypmp42not really a video";

#[tokio::test]
async fn upload_returns_urls_and_timings() {
    let h = TestHarness::start().await;

    let resp = h.upload("", "holiday.mp4", CLIP).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.headers().contains_key("x-request-id"));

    let json: Value = resp.json().await.unwrap();
    let id = json["id"].as_str().unwrap();
    assert!(uuid::Uuid::parse_str(id).is_ok());

    assert_eq!(
        json["hlsUrl"],
        format!("http://{}/hls/{id}/playlist.m3u8", h.addr)
    );
    assert_eq!(
        json["dashUrl"],
        format!("http://{}/dash/{id}/manifest.mpd", h.addr)
    );

    let timings = &json["timings"];
    for key in ["uploadDuration", "hlsTranscode", "dashTranscode", "totalDuration"] {
        assert!(timings[key].as_f64().unwrap() >= 0.0, "{key} missing");
    }
    assert!(
        timings["totalDuration"].as_f64().unwrap() >= timings["uploadDuration"].as_f64().unwrap()
    );
}

#[tokio::test]
async fn upload_is_stored_with_its_extension() {
    let h = TestHarness::start().await;

    let json: Value = h.upload("", "clip.mov", CLIP).await.json().await.unwrap();
    let id = json["id"].as_str().unwrap();

    let stored = h.root().join("uploads").join(format!("{id}.mov"));
    assert_eq!(std::fs::read(&stored).unwrap(), CLIP);

    // Both jobs read the stored upload, not the client's file name.
    let jobs = h.runner.jobs();
    assert_eq!(jobs.len(), 2);
    assert!(jobs.iter().all(|j| j.input == stored));
}

#[tokio::test]
async fn codec_reaches_the_encoder() {
    let h = TestHarness::start().await;

    let resp = h.upload("?codec=hevc", "a.mp4", CLIP).await;
    assert_eq!(resp.status(), StatusCode::OK);

    for job in h.runner.jobs() {
        assert!(job.args.output.windows(2).any(|w| w == ["-c:v", "libx265"]));
    }
}

#[tokio::test]
async fn invalid_codec_is_rejected_before_encoding() {
    let h = TestHarness::start().await;

    let resp = h.upload("?codec=h264", "a.mp4", CLIP).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let json: Value = resp.json().await.unwrap();
    assert_eq!(json["error"], "Invalid codec. Use av1, hevc, or avc");
    assert!(h.runner.jobs().is_empty());
    assert!(h.uploads().is_empty());
}

#[tokio::test]
async fn missing_video_field_is_rejected() {
    let h = TestHarness::start().await;

    let form = reqwest::multipart::Form::new().text("title", "no file here");
    let resp = reqwest::Client::new()
        .post(h.url("/api/videos"))
        .multipart(form)
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let json: Value = resp.json().await.unwrap();
    assert_eq!(json["error"], "No video file uploaded");
    assert_eq!(json["code"], "validation_error");
    assert!(h.runner.jobs().is_empty());
}

#[tokio::test]
async fn text_field_named_video_is_not_an_upload() {
    let h = TestHarness::start().await;

    let form = reqwest::multipart::Form::new().text("video", "just a string");
    let resp = reqwest::Client::new()
        .post(h.url("/api/videos"))
        .multipart(form)
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let json: Value = resp.json().await.unwrap();
    assert_eq!(json["error"], "No video file uploaded");
    assert!(h.uploads().is_empty());
    assert!(h.runner.jobs().is_empty());
}

#[tokio::test]
async fn upload_over_body_limit_is_413_and_leaves_nothing() {
    let h = TestHarness::with_config(ScriptedRunner::default(), |config| {
        config.server.max_upload_bytes = 1024;
    })
    .await;

    let resp = h.upload("", "big.mp4", &[7u8; 4 * 1024]).await;
    assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);

    let json: Value = resp.json().await.unwrap();
    assert_eq!(json["code"], "payload_too_large");
    assert!(h.uploads().is_empty());
    assert!(h.runner.jobs().is_empty());
}

#[tokio::test]
async fn upload_under_body_limit_is_accepted() {
    let h = TestHarness::with_config(ScriptedRunner::default(), |config| {
        config.server.max_upload_bytes = 64 * 1024;
    })
    .await;

    let resp = h.upload("", "small.mp4", &[7u8; 8 * 1024]).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(h.uploads().len(), 1);
}

#[tokio::test]
async fn encode_failure_is_500_and_keeps_partial_output() {
    let h = TestHarness::with_runner(ScriptedRunner::failing(JobKind::Dash)).await;

    let resp = h.upload("", "a.mp4", CLIP).await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let json: Value = resp.json().await.unwrap();
    assert_eq!(json["error"], "Failed to transcode video");
    assert_eq!(json["code"], "encode_error");

    // The HLS job still ran to completion and nothing was cleaned up.
    let jobs = h.runner.jobs();
    assert_eq!(jobs.len(), 2);
    let hls = jobs.iter().find(|j| j.kind() == JobKind::Hls).unwrap();
    assert!(hls.output_path().exists());
    assert_eq!(h.uploads().len(), 1);
}

#[tokio::test]
async fn packaged_output_is_served_at_returned_urls() {
    let h = TestHarness::start().await;

    let json: Value = h.upload("", "a.mp4", CLIP).await.json().await.unwrap();

    let playlist = reqwest::get(json["hlsUrl"].as_str().unwrap()).await.unwrap();
    assert_eq!(playlist.status(), StatusCode::OK);
    assert!(playlist.text().await.unwrap().starts_with("#EXTM3U"));

    let manifest = reqwest::get(json["dashUrl"].as_str().unwrap()).await.unwrap();
    assert_eq!(manifest.status(), StatusCode::OK);
    assert!(manifest.text().await.unwrap().starts_with("<MPD"));
}

#[tokio::test]
async fn unknown_output_is_404() {
    let h = TestHarness::start().await;
    let resp = reqwest::get(h.url("/hls/nope/playlist.m3u8")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn concurrent_uploads_stay_isolated() {
    let h = TestHarness::with_runner(ScriptedRunner::delayed(Duration::from_millis(50))).await;

    let mut tasks = tokio::task::JoinSet::new();
    for i in 0..6 {
        let url = h.url("/api/videos");
        tasks.spawn(async move {
            let part = reqwest::multipart::Part::bytes(format!("clip number {i}").into_bytes())
                .file_name("a.mp4");
            let form = reqwest::multipart::Form::new().part("video", part);
            let resp = reqwest::Client::new()
                .post(url)
                .multipart(form)
                .send()
                .await
                .unwrap();
            assert_eq!(resp.status(), StatusCode::OK);
            resp.json::<Value>().await.unwrap()
        });
    }

    let mut ids = HashSet::new();
    while let Some(json) = tasks.join_next().await {
        ids.insert(json.unwrap()["id"].as_str().unwrap().to_string());
    }
    assert_eq!(ids.len(), 6);

    for id in &ids {
        // Each output references only its own upload.
        let playlist = h.output_dir(JobKind::Hls, id).join("playlist.m3u8");
        let manifest = h.output_dir(JobKind::Dash, id).join("manifest.mpd");
        assert!(std::fs::read_to_string(playlist).unwrap().contains(id.as_str()));
        assert!(std::fs::read_to_string(manifest).unwrap().contains(id.as_str()));
    }
    assert_eq!(h.runner.jobs().len(), 12);
}

#[tokio::test]
async fn admin_tools_reports_ffmpeg() {
    let h = TestHarness::start().await;
    let json: Value = reqwest::get(h.url("/api/admin/tools"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(json[0]["name"], "ffmpeg");
    // The harness registry is empty.
    assert_eq!(json[0]["available"], false);
}
