//! End-to-end capture pipeline tests: mock source in, encoded blocks out.

use micstream::audio::source::{MockAudioSource, SampleBlock};
use micstream::capture::{CaptureEvent, CapturePipeline, FlushPolicy};
use micstream::transport::{EncodedBlock, MockSink, TransportSink, WavFileSink};

fn event_channel() -> (
    crossbeam_channel::Sender<CaptureEvent>,
    crossbeam_channel::Receiver<CaptureEvent>,
) {
    crossbeam_channel::bounded(256)
}

#[tokio::test]
async fn streaming_mode_flushes_at_threshold() {
    // 2000 + 2000 + 96 frames: the third block crosses 4096 and the flush
    // carries everything accumulated so far.
    let source = MockAudioSource::new().with_blocks(vec![
        SampleBlock::mono(vec![0.5; 2000]),
        SampleBlock::mono(vec![0.5; 2000]),
        SampleBlock::mono(vec![0.5; 96]),
    ]);
    let sink = MockSink::new();
    let (events_tx, events_rx) = event_channel();

    let pipeline = CapturePipeline::new(8000, FlushPolicy::Threshold(4096));
    let (_handle, join) = pipeline.start(source, sink.clone(), events_tx).unwrap();
    join.await.unwrap().unwrap();

    let sent = sink.sent_blocks();
    assert_eq!(sent.len(), 1);
    assert!(!sent[0].is_wav());
    assert_eq!(sent[0].len(), 4096 * 2);

    // Every encoded sample is 0.5 scaled by the positive-side factor.
    let bytes = sent[0].bytes();
    let first = i16::from_le_bytes([bytes[0], bytes[1]]);
    assert_eq!(first, (0.5f32 * 32767.0) as i16);

    assert!(sink.is_closed());
    let events: Vec<CaptureEvent> = events_rx.try_iter().collect();
    assert!(events.contains(&CaptureEvent::Flushed { bytes: 8192 }));
    assert_eq!(events.last(), Some(&CaptureEvent::Stopped));
}

#[tokio::test]
async fn streaming_mode_emits_remainder_on_stop() {
    // 4096 + 300 frames: one threshold flush plus a final partial one.
    let source = MockAudioSource::new().with_blocks(vec![
        SampleBlock::mono(vec![0.0; 4096]),
        SampleBlock::mono(vec![0.0; 300]),
    ]);
    let sink = MockSink::new();
    let (events_tx, _events_rx) = event_channel();

    let pipeline = CapturePipeline::new(44100, FlushPolicy::Threshold(4096));
    let (_handle, join) = pipeline.start(source, sink.clone(), events_tx).unwrap();
    join.await.unwrap().unwrap();

    let sent = sink.sent_blocks();
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[0].len(), 4096 * 2);
    assert_eq!(sent[1].len(), 300 * 2);
    assert!(!sent[1].is_wav());
}

#[tokio::test]
async fn batch_mode_emits_one_wav_at_stop() {
    let source = MockAudioSource::new().with_blocks(vec![
        SampleBlock::mono(vec![0.25; 5000]),
        SampleBlock::mono(vec![-0.25; 5000]),
    ]);
    let sink = MockSink::new();
    let (events_tx, _events_rx) = event_channel();

    let pipeline = CapturePipeline::new(16000, FlushPolicy::OnStop);
    let (_handle, join) = pipeline.start(source, sink.clone(), events_tx).unwrap();
    join.await.unwrap().unwrap();

    let sent = sink.sent_blocks();
    assert_eq!(sent.len(), 1);
    assert!(sent[0].is_wav());

    // The artifact parses as mono 16kHz 16-bit with all 10000 frames.
    let mut reader =
        hound::WavReader::new(std::io::Cursor::new(sent[0].bytes().to_vec())).unwrap();
    let spec = reader.spec();
    assert_eq!(spec.channels, 1);
    assert_eq!(spec.sample_rate, 16000);
    assert_eq!(spec.bits_per_sample, 16);
    assert_eq!(reader.len(), 10000);

    let samples: Vec<i16> = reader
        .samples::<i16>()
        .collect::<Result<Vec<_>, _>>()
        .unwrap();
    assert_eq!(samples[0], (0.25f32 * 32767.0) as i16);
    assert_eq!(samples[5000], (-0.25f32 * 32768.0) as i16);
}

#[tokio::test]
async fn stereo_batch_interleaves_channels_in_artifact() {
    let block = SampleBlock::stereo(vec![0.5; 1000], vec![-0.5; 1000]).unwrap();
    let source = MockAudioSource::new()
        .with_channels(2)
        .with_blocks(vec![block]);
    let sink = MockSink::new();
    let (events_tx, _events_rx) = event_channel();

    let pipeline = CapturePipeline::new(44100, FlushPolicy::OnStop);
    let (_handle, join) = pipeline.start(source, sink.clone(), events_tx).unwrap();
    join.await.unwrap().unwrap();

    let sent = sink.sent_blocks();
    let mut reader =
        hound::WavReader::new(std::io::Cursor::new(sent[0].bytes().to_vec())).unwrap();
    assert_eq!(reader.spec().channels, 2);

    let samples: Vec<i16> = reader
        .samples::<i16>()
        .collect::<Result<Vec<_>, _>>()
        .unwrap();
    // Frame-major: left sample then right sample.
    assert_eq!(samples[0], (0.5f32 * 32767.0) as i16);
    assert_eq!(samples[1], (-0.5f32 * 32768.0) as i16);
}

#[tokio::test]
async fn transport_failures_do_not_stop_capture() {
    let source = MockAudioSource::new().with_blocks(vec![
        SampleBlock::mono(vec![0.0; 4096]),
        SampleBlock::mono(vec![0.0; 4096]),
        SampleBlock::mono(vec![0.0; 4096]),
    ]);
    let sink = MockSink::new().with_send_failure();
    let (events_tx, events_rx) = event_channel();

    let pipeline = CapturePipeline::new(8000, FlushPolicy::Threshold(4096));
    let (_handle, join) = pipeline.start(source, sink, events_tx).unwrap();
    join.await.unwrap().unwrap();

    let events: Vec<CaptureEvent> = events_rx.try_iter().collect();
    let failures = events
        .iter()
        .filter(|e| matches!(e, CaptureEvent::TransportError { .. }))
        .count();
    assert_eq!(failures, 3);
    assert_eq!(events.last(), Some(&CaptureEvent::Stopped));
}

#[tokio::test]
async fn silent_session_writes_no_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.wav");
    let source = MockAudioSource::new();
    let sink = WavFileSink::to_path(&path, 44100, 1);
    let (events_tx, _events_rx) = event_channel();

    let pipeline = CapturePipeline::new(44100, FlushPolicy::OnStop);
    let (_handle, join) = pipeline.start(source, sink, events_tx).unwrap();
    join.await.unwrap().unwrap();

    assert!(!path.exists());
}

#[tokio::test]
async fn record_to_file_produces_playable_wav() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("take.wav");
    let source =
        MockAudioSource::new().with_blocks(vec![SampleBlock::mono(vec![0.1; 2048])]);
    let sink = WavFileSink::to_path(&path, 22050, 1);
    let (events_tx, _events_rx) = event_channel();

    let pipeline = CapturePipeline::new(22050, FlushPolicy::OnStop);
    let (_handle, join) = pipeline.start(source, sink, events_tx).unwrap();
    join.await.unwrap().unwrap();

    let reader = hound::WavReader::open(&path).unwrap();
    assert_eq!(reader.spec().sample_rate, 22050);
    assert_eq!(reader.len(), 2048);
}

#[tokio::test]
async fn sink_close_failure_does_not_break_shutdown() {
    struct CloseFailSink;

    #[async_trait::async_trait]
    impl TransportSink for CloseFailSink {
        async fn send(&mut self, _block: EncodedBlock) -> micstream::Result<()> {
            Ok(())
        }
        async fn close(&mut self) -> micstream::Result<()> {
            Err(micstream::MicstreamError::Transport {
                message: "close refused".to_string(),
            })
        }
        fn name(&self) -> &str {
            "close-fail"
        }
    }

    let source = MockAudioSource::new().with_blocks(vec![SampleBlock::mono(vec![0.0; 10])]);
    let (events_tx, events_rx) = event_channel();

    let pipeline = CapturePipeline::new(44100, FlushPolicy::OnStop);
    let (_handle, join) = pipeline.start(source, CloseFailSink, events_tx).unwrap();
    join.await.unwrap().unwrap();

    let events: Vec<CaptureEvent> = events_rx.try_iter().collect();
    assert_eq!(events.last(), Some(&CaptureEvent::Stopped));
}
