//! Property-based tests for the stage queue and the audio ring buffer.
//!
//! Uses proptest to verify the ordering and prefix guarantees the pipeline
//! relies on.

use proptest::collection::vec;
use proptest::prelude::*;
use retime_core::queue::Queue;
use retime_core::ring::AudioRingBuffer;
use std::sync::Arc;
use std::thread;

proptest! {
    /// Reads concatenated across `read_frame` calls are always a prefix of
    /// the concatenated writes, in order.
    #[test]
    fn ring_reads_are_prefix_of_writes(
        chunks in vec(vec(-1.0f32..1.0, 1..64), 1..20),
        frame_size in 2usize..32,
    ) {
        let channels = 2;
        let mut ring = AudioRingBuffer::new(frame_size, channels);
        let mut written: Vec<f32> = Vec::new();
        let mut read: Vec<f32> = Vec::new();
        let mut frame = vec![0.0f32; frame_size * channels];

        for chunk in &chunks {
            if ring.write(chunk) {
                written.extend_from_slice(chunk);
            }
            // Drain eagerly, the way the audio stage does.
            while ring.read_frame(&mut frame) {
                read.extend_from_slice(&frame);
            }
        }
        let n = ring.drain_remainder(&mut frame);
        read.extend_from_slice(&frame[..n]);

        prop_assert_eq!(read.len(), written.len());
        prop_assert_eq!(&read, &written);
    }

    /// Whole-frame reads never return a partial frame.
    #[test]
    fn ring_reads_are_whole_frames(
        lens in vec(1usize..48, 1..16),
        frame_size in 2usize..24,
    ) {
        let mut ring = AudioRingBuffer::new(frame_size, 1);
        let mut frame = vec![0.0f32; frame_size];
        let mut frames_read = 0usize;
        let mut written = 0usize;

        for len in lens {
            let chunk = vec![0.25f32; len];
            if ring.write(&chunk) {
                written += len;
            }
            while ring.read_frame(&mut frame) {
                frames_read += 1;
            }
        }

        prop_assert!(frames_read * frame_size <= written);
        prop_assert!(written - frames_read * frame_size < frame_size);
    }

    /// A threaded producer/consumer pair preserves FIFO order for any
    /// item count and capacity.
    #[test]
    fn queue_threaded_fifo(count in 0usize..200, capacity in 1usize..16) {
        let q = Arc::new(Queue::new(capacity));
        let producer = {
            let q = Arc::clone(&q);
            thread::spawn(move || {
                for i in 0..count {
                    q.push(i);
                }
                q.finish();
            })
        };

        let mut popped = Vec::new();
        while let Some(i) = q.pop() {
            popped.push(i);
        }
        producer.join().unwrap();

        prop_assert_eq!(popped, (0..count).collect::<Vec<_>>());
        prop_assert!(q.is_finished());
        prop_assert!(q.is_empty());
    }
}
