//! Feed a moving test pattern through a headless sink
//!
//! Run with: `cargo run -p yuvsink-present --example synthetic`
//!
//! Generates two seconds of a scrolling luma ramp in the two-plane layout
//! (luma plus interleaved chroma) at 30 fps and prints the sink counters.

use std::time::{Duration, Instant};

use yuvsink_present::{ChannelLayout, MemorySurfaceHandle, SinkConfig, VideoSink, WorkStatus};

const WIDTH: u32 = 320;
const HEIGHT: u32 = 240;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt().with_env_filter("yuvsink=debug,info").init();

    let config = SinkConfig::builder()
        .framerate(30.0)
        .size(WIDTH, HEIGHT)
        .destination(WIDTH * 2, HEIGHT * 2)
        .layout(ChannelLayout::Biplanar2)
        .title("synthetic")
        .build();

    let surface = MemorySurfaceHandle::new();
    let mut sink = VideoSink::new(config, surface.factory())?;
    let chunk = sink.chunk_size();
    let row = WIDTH as usize;
    println!("Chunk: {} samples ({} lines)", chunk, chunk / row);

    let mut luma = vec![0u8; chunk];
    let chroma: Vec<u8> = [96u8, 160].repeat(chunk / 2);
    let mut line = 0usize;

    let started = Instant::now();
    while started.elapsed() < Duration::from_secs(2) {
        for (i, sample) in luma.iter_mut().enumerate() {
            let (r, c) = (line + i / row, i % row);
            *sample = ((r + c) % 256) as u8;
        }

        match sink.work(&[&luma, &chroma])? {
            WorkStatus::Produced(n) => line = (line + n / row) % HEIGHT as usize,
            WorkStatus::Done => break,
        }
        std::thread::sleep(Duration::from_millis(2));
    }

    let stats = sink.stats();
    println!("Frames completed:  {}", stats.assembler.frames_completed);
    println!("Frames published:  {}", stats.assembler.frames_published);
    println!("Dropped (busy):    {}", stats.assembler.frames_dropped_busy);
    println!("Average delay:     {:.2} ms", stats.avg_delay_ms);

    let presented = sink.shutdown()?;
    println!("Frames presented:  {}", presented.frames_presented);
    println!("Surface presents:  {}", surface.presents());
    Ok(())
}
