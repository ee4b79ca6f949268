use byte_ring_buffer::RingBuffer;
use rand::Rng;
use std::env;

const DEFAULT_CAPACITY: usize = 64;
const DEFAULT_FRAME: usize = 16;

fn arg_or(index: usize, default: usize) -> usize {
    env::args()
        .nth(index)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn main() {
    env_logger::init();

    let capacity = arg_or(1, DEFAULT_CAPACITY);
    let frame_len = arg_or(2, DEFAULT_FRAME).max(1);
    let mut buffer = RingBuffer::new(capacity);
    let mut rng = rand::thread_rng();

    let mut produced = 0usize;
    let mut consumed = 0usize;
    let mut frame = vec![0u8; frame_len];

    for round in 0..100 {
        // Producer writes bursts of uneven size, sometimes faster than we read.
        let burst = rng.gen_range(0..frame_len * 3);
        let data: Vec<u8> = (0..burst).map(|i| (produced + i) as u8).collect();
        buffer.add(&data);
        produced += burst;

        if buffer.size() < frame_len {
            continue;
        }

        let read = buffer.pop(&mut frame);
        consumed += read;

        if round % 10 == 0 {
            let mut segments = 0;
            buffer.peek_with(|_| segments += 1);
            log::info!(
                "round {} : held {}/{} bytes in {} segment(s), first frame byte {}",
                round,
                buffer.size(),
                buffer.capacity(),
                segments,
                frame[0]
            );
        }
    }

    let lost = produced - consumed - buffer.size();
    println!(
        "produced {} bytes, consumed {}, still held {}, overwritten {}",
        produced,
        consumed,
        buffer.size(),
        lost
    );
}
