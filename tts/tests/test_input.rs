use std::time::Duration;

use latency::Mode;
use llm::PacedTokens;
use tokio_stream::StreamExt;
use tts::audio::{drain_audio, AudioWriter};
use tts::{driver_for, SynthesisDriver, SynthesisInput, TTSError, Vendor, VendorConfig};

#[tokio::test]
async fn blocking_fragments_are_bridged_in_order() {
    let tokens = PacedTokens::greeting(Duration::from_millis(1));
    let input = SynthesisInput::Blocking(Box::new(tokens.iter()));
    assert_eq!(input.kind(), "blocking fragment");

    let fragments: Vec<String> = input.into_stream().collect().await;
    assert_eq!(fragments, tokens.fragments());
    assert_eq!(fragments.concat(), "Hello sir, what can I do for you?");
}

#[tokio::test]
async fn complete_text_becomes_a_single_fragment() {
    let fragments: Vec<String> = SynthesisInput::from("Hello.").into_stream().collect().await;
    assert_eq!(fragments, vec!["Hello.".to_string()]);
}

#[test]
fn streamed_input_is_not_complete_text() {
    let tokens = PacedTokens::greeting(Duration::ZERO);
    let input = SynthesisInput::Blocking(Box::new(tokens.iter()));
    let err = input.into_text(Mode::FullStreaming).unwrap_err();
    assert!(matches!(
        err,
        TTSError::UnsupportedInput { mode: Mode::FullStreaming, input: "blocking fragment" }
    ));
}

#[tokio::test(start_paused = true)]
async fn first_chunk_is_timed_from_start_of_iteration() {
    let chunks = Box::pin(async_stream::stream! {
        tokio::time::sleep(Duration::from_millis(30)).await;
        yield Ok::<_, TTSError>(b"ab".to_vec());
        tokio::time::sleep(Duration::from_millis(10)).await;
        yield Ok(b"cd".to_vec());
        tokio::time::sleep(Duration::from_millis(10)).await;
        yield Ok(b"ef".to_vec());
    });
    let mut out = AudioWriter::new(Vec::new());
    let drained = drain_audio(chunks, &mut out).await.unwrap();

    assert_eq!(drained.first_chunk, Some(Duration::from_millis(30)));
    assert_eq!(drained.chunks, 3);
    assert_eq!(drained.bytes, 6);
    assert_eq!(out.finish().await.unwrap(), b"abcdef".to_vec());
}

#[tokio::test]
async fn empty_audio_stream_has_no_first_chunk() {
    let chunks = tokio_stream::iter(Vec::<Result<Vec<u8>, TTSError>>::new());
    let mut out = AudioWriter::new(Vec::new());
    let drained = drain_audio(chunks, &mut out).await.unwrap();
    assert_eq!(drained.first_chunk, None);
    assert_eq!(drained.bytes, 0);
}

#[test]
fn drivers_report_their_vendor() {
    let config = VendorConfig::from_env();
    for vendor in [Vendor::ElevenLabs, Vendor::PlayHt, Vendor::OpenAi] {
        let driver = driver_for(vendor, &config, ".");
        assert_eq!(driver.vendor(), vendor);
        assert!(driver.supports(Mode::FullStreaming));
    }
    assert!(!driver_for(Vendor::OpenAi, &config, ".").supports(Mode::InputStreaming));
}
