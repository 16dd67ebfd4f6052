mod support;

use std::time::Instant;

use terracap::runtime::frame_clock::FrameClock;

// Headless adapter probe. Needs a working GPU stack, so it only runs
// when TERRACAP_RUN_GPU_TESTS is set.
#[test]
fn gpu_probe_is_opt_in() {
    if !support::gpu_tests_enabled() {
        eprintln!(
            "Skipping GPU probe. Set TERRACAP_RUN_GPU_TESTS=1 to enable."
        );
        return;
    }

    let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::default());

    let adapter = pollster::block_on(instance.request_adapter(
        &wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::LowPower,
            force_fallback_adapter: true,
            compatible_surface: None,
        },
    ))
    .expect("expected a fallback adapter for the GPU probe");

    let info = adapter.get_info();
    assert!(!info.name.is_empty());
}

#[test]
fn poll_clock_schedules_the_next_deadline() {
    let start = Instant::now();
    let mut clock = FrameClock::with_start(30.0, start);

    let tick = clock.tick(start + clock.interval());

    assert!(tick.should_poll);
    assert_eq!(clock.next_deadline(), start + clock.interval() * 2);
}
