use std::time::{Duration, Instant as StdInstant};

use llm::PacedTokens;
use tokio::time::Instant;
use tokio_stream::StreamExt;

#[test]
fn blocking_iter_paces_fragments() {
    let delay = Duration::from_millis(20);
    let tokens = PacedTokens::new(["a", "b", "c"], delay);
    let mut iter = tokens.iter();

    let start = StdInstant::now();
    assert_eq!(iter.next().as_deref(), Some("a"));
    assert_eq!(iter.next().as_deref(), Some("b"));
    assert_eq!(iter.next().as_deref(), Some("c"));
    assert!(start.elapsed() >= 2 * delay);
    assert_eq!(iter.next(), None);
    assert_eq!(iter.next(), None);
}

#[test]
fn iter_restarts_from_first_fragment() {
    let tokens = PacedTokens::new(["x", "y"], Duration::ZERO);
    let first: Vec<_> = tokens.iter().collect();
    let second: Vec<_> = tokens.iter().collect();
    assert_eq!(first, vec!["x", "y"]);
    assert_eq!(first, second);
}

#[tokio::test(start_paused = true)]
async fn stream_never_delivers_early() {
    let delay = Duration::from_millis(10);
    let tokens = PacedTokens::new(["a", "b", "c"], delay);
    let mut stream = tokens.stream();

    let start = Instant::now();
    let mut seen = Vec::new();
    while let Some(fragment) = stream.next().await {
        seen.push((fragment, start.elapsed()));
    }

    assert_eq!(seen.len(), 3);
    assert_eq!(seen[0], ("a".to_string(), Duration::ZERO));
    assert!(seen[1].1 >= delay);
    assert!(seen[2].1 >= 2 * delay);
}

#[test]
fn greeting_reassembles() {
    let tokens = PacedTokens::greeting(Duration::ZERO);
    assert_eq!(tokens.fragments().len(), 8);
    assert_eq!(tokens.text(), "Hello sir, what can I do for you?");
}
