use httpmock::prelude::*;
use latency::Mode;
use serde_json::json;
use tts::{
    ElevenLabsConfig, ElevenLabsDriver, OpenAiTtsConfig, OpenAiTtsDriver, SynthesisDriver,
    SynthesisInput, TTSError, Vendor,
};

fn eleven_config(api_url: String) -> ElevenLabsConfig {
    ElevenLabsConfig {
        api_key: "test-key".into(),
        voice_id: "test-voice".into(),
        model_id: "eleven_turbo_v2".into(),
        api_url,
        ws_url: "ws://127.0.0.1:9".into(),
    }
}

fn openai_config(api_url: String) -> OpenAiTtsConfig {
    OpenAiTtsConfig {
        api_key: "test-key".into(),
        model: "tts-1".into(),
        voice: "alloy".into(),
        api_url,
    }
}

#[tokio::test]
async fn eleven_labs_streams_audio_to_file() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/v1/text-to-speech/test-voice/stream")
                .header("xi-api-key", "test-key")
                .json_body(json!({ "text": "Hello", "model_id": "eleven_turbo_v2" }));
            then.status(200)
                .header("content-type", "audio/mpeg")
                .body("ID3audio");
        })
        .await;
    let dir = tempfile::tempdir().unwrap();

    let driver = ElevenLabsDriver::new(eleven_config(server.base_url()), dir.path());
    let record = driver.run("Hello".into(), Mode::FullStreaming).await.unwrap();

    mock.assert_async().await;
    let connection = record.connection_time().unwrap();
    assert!(record.first_chunk_time().is_some());
    assert!(record.total_time().unwrap() >= connection);
    assert_eq!(record.header_time(), None);
    let audio = std::fs::read(dir.path().join(Vendor::ElevenLabs.audio_file_name())).unwrap();
    assert_eq!(audio, b"ID3audio");
}

#[tokio::test]
async fn eleven_labs_rejection_returns_no_record() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/v1/text-to-speech/test-voice/stream");
            then.status(401).body("invalid api key");
        })
        .await;
    let dir = tempfile::tempdir().unwrap();

    let driver = ElevenLabsDriver::new(eleven_config(server.base_url()), dir.path());
    match driver.run("Hello".into(), Mode::FullStreaming).await {
        Err(TTSError::Synthesis { vendor, status, body }) => {
            assert_eq!(vendor, Vendor::ElevenLabs);
            assert_eq!(status, 401);
            assert_eq!(body, "invalid api key");
        }
        other => panic!("unexpected result: {other:?}"),
    }
    assert!(!dir.path().join(Vendor::ElevenLabs.audio_file_name()).exists());
}

#[tokio::test]
async fn full_streaming_requires_complete_text() {
    let driver = ElevenLabsDriver::new(eleven_config("http://127.0.0.1:9".into()), ".");
    let fragments = Box::pin(tokio_stream::iter(vec!["Hello".to_string()]));
    let err = driver
        .run(SynthesisInput::Fragments(fragments), Mode::FullStreaming)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        TTSError::UnsupportedInput { mode: Mode::FullStreaming, .. }
    ));
}

#[tokio::test]
async fn openai_streams_audio_to_file() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/v1/audio/speech")
                .header("authorization", "Bearer test-key")
                .json_body(json!({ "model": "tts-1", "voice": "alloy", "input": "Hello" }));
            then.status(200).body("mp3-bytes");
        })
        .await;
    let dir = tempfile::tempdir().unwrap();

    let driver = OpenAiTtsDriver::new(openai_config(server.base_url()), dir.path());
    let record = driver.run("Hello".into(), Mode::FullStreaming).await.unwrap();

    mock.assert_async().await;
    assert!(record.connection_time().is_some());
    assert!(record.first_chunk_time().is_some());
    assert!(record.total_time().is_some());
    let audio = std::fs::read(dir.path().join(Vendor::OpenAi.audio_file_name())).unwrap();
    assert_eq!(audio, b"mp3-bytes");
}

#[tokio::test]
async fn openai_rejects_input_streaming() {
    let driver = OpenAiTtsDriver::new(openai_config("http://127.0.0.1:9".into()), ".");
    assert!(!driver.supports(Mode::InputStreaming));
    let err = driver
        .run("Hello".into(), Mode::InputStreaming)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        TTSError::UnsupportedMode { vendor: Vendor::OpenAi, mode: Mode::InputStreaming }
    ));
}

#[tokio::test]
async fn openai_server_error_is_reported() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/v1/audio/speech");
            then.status(500).body("overloaded");
        })
        .await;
    let dir = tempfile::tempdir().unwrap();

    let driver = OpenAiTtsDriver::new(openai_config(server.base_url()), dir.path());
    let err = driver.run("Hello".into(), Mode::FullStreaming).await.unwrap_err();
    assert!(matches!(
        err,
        TTSError::Synthesis { vendor: Vendor::OpenAi, status: 500, .. }
    ));
}
