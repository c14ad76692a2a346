/// Interactive splat viewer
/// Handles window creation, input, and the render/present loop
use anyhow::{Context as _, Result};
use glam::Vec3;
use mimalloc::MiMalloc;
use splat_engine::*;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Instant;
use tracing_subscriber::EnvFilter;
use winit::{
    event::*,
    event_loop::{ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowBuilder},
};

const WIDTH: usize = 800;
const HEIGHT: usize = 600;
/// World units per second before the camera's movement multiplier
const CAMERA_SPEED: f32 = 1.5;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    println!("=== Splat Viewer - Software Rasterizer ===");
    println!("Controls:");
    println!("  Click - Capture mouse");
    println!("  WASD - Move camera");
    println!("  Mouse - Look around");
    println!("  P - Toggle parallel stripes");
    println!("  T - Toggle per-splat tracing");
    println!("  ESC - Release mouse / exit");
    println!();

    // Create event loop and window
    let event_loop = EventLoop::new().context("failed to create event loop")?;
    let window = Arc::new(
        WindowBuilder::new()
            .with_title("Splat Viewer")
            .with_inner_size(winit::dpi::PhysicalSize::new(WIDTH as u32, HEIGHT as u32))
            .build(&event_loop)
            .context("failed to create window")?,
    );

    // Initialize software presentation context
    let context = softbuffer::Context::new(window.clone())
        .map_err(|e| anyhow::anyhow!("failed to create softbuffer context: {e}"))?;
    let mut surface = softbuffer::Surface::new(&context, window.clone())
        .map_err(|e| anyhow::anyhow!("failed to create softbuffer surface: {e}"))?;

    let window_size = window.inner_size();
    let mut renderer = SplatRenderer::new(
        (window_size.width as usize).max(1),
        (window_size.height as usize).max(1),
        RenderConfig::default(),
    )
    .context("failed to allocate frame buffers")?;

    let mut camera = Camera::default();
    camera.position = Vec3::new(0.0, 0.0, 3.0);
    let mut camera_controller = CameraController::new();

    let scene_start = Instant::now();
    let splats = generate_cloud(&SceneConfig::default());
    tracing::info!(
        splats = splats.len(),
        elapsed_ms = scene_start.elapsed().as_millis() as u64,
        "generated splat cloud"
    );

    // Timing
    let mut last_frame = Instant::now();
    let mut fps_timer = Instant::now();
    let mut frame_stats = perf::FrameStats::default();
    let mut last_stats = RenderStats::default();

    #[cfg(feature = "profiling")]
    let mut hardware_counters = {
        let mut counters = perf::profiling::hardware::PerfCounters::new();
        counters.reset_all();
        counters.enable_all();
        counters
    };

    // Mouse state
    let mut mouse_captured = false;
    let mut last_mouse_pos: Option<(f64, f64)> = None;

    event_loop
        .run(move |event, elwt| {
            elwt.set_control_flow(ControlFlow::Poll);

            match event {
                Event::WindowEvent { event, .. } => match event {
                    WindowEvent::CloseRequested => {
                        elwt.exit();
                    }
                    WindowEvent::Resized(new_size) => {
                        let width = (new_size.width as usize).max(1);
                        let height = (new_size.height as usize).max(1);
                        if let Err(err) = renderer.resize(width, height) {
                            tracing::error!(%err, "resize failed");
                            elwt.exit();
                        }
                    }
                    WindowEvent::KeyboardInput { event, .. } => {
                        let pressed = event.state == ElementState::Pressed;

                        if let PhysicalKey::Code(keycode) = event.physical_key {
                            match keycode {
                                KeyCode::KeyW => camera_controller.forward_pressed = pressed,
                                KeyCode::KeyS => camera_controller.backward_pressed = pressed,
                                KeyCode::KeyA => camera_controller.left_pressed = pressed,
                                KeyCode::KeyD => camera_controller.right_pressed = pressed,
                                KeyCode::KeyP if pressed && !event.repeat => {
                                    let config = renderer.config_mut();
                                    config.parallel = !config.parallel;
                                    println!(
                                        "Rasterization: {}",
                                        if config.parallel { "parallel stripes" } else { "sequential" }
                                    );
                                }
                                KeyCode::KeyT if pressed && !event.repeat => {
                                    let config = renderer.config_mut();
                                    config.debug_mode = if config.debug_mode.is_enabled() {
                                        DebugMode::NONE
                                    } else {
                                        DebugMode::ALL
                                    };
                                    println!("Tracing: {:?}", config.debug_mode);
                                }
                                KeyCode::Escape if pressed => {
                                    if mouse_captured {
                                        mouse_captured = false;
                                        last_mouse_pos = None;
                                        window.set_cursor_visible(true);
                                    } else {
                                        elwt.exit();
                                    }
                                }
                                _ => {}
                            }
                        }
                    }
                    WindowEvent::MouseInput { state, button, .. } => {
                        if button == MouseButton::Left && state == ElementState::Pressed {
                            mouse_captured = true;
                            window.set_cursor_visible(false);
                        }
                    }
                    WindowEvent::CursorMoved { position, .. } => {
                        if mouse_captured {
                            if let Some(last_pos) = last_mouse_pos {
                                let delta_x = position.x - last_pos.0;
                                // Screen y grows downward; pitch grows upward
                                let delta_y = last_pos.1 - position.y;
                                camera.apply_look_delta(delta_x as f32, delta_y as f32, true);
                            }
                            last_mouse_pos = Some((position.x, position.y));
                        }
                    }
                    WindowEvent::RedrawRequested => {
                        // Calculate delta time
                        let now = Instant::now();
                        let dt = (now - last_frame).as_secs_f32();
                        last_frame = now;

                        camera_controller.update_camera(&mut camera, CAMERA_SPEED * dt);

                        let render_start = Instant::now();
                        last_stats = renderer.render(&splats, &camera);
                        let render_time = render_start.elapsed();

                        let present_start = Instant::now();
                        if let Err(err) = present(&mut surface, renderer.framebuffer()) {
                            tracing::error!(%err, "present failed");
                            elwt.exit();
                            return;
                        }
                        frame_stats.record(render_time, present_start.elapsed());

                        // FPS counter with splat stats
                        if fps_timer.elapsed().as_secs() >= 1 {
                            let (render_us, present_us) = frame_stats.averages();
                            println!(
                                "FPS: {} | render {:.2}ms | present {:.2}ms | visible {} | behind {} | off-screen {}",
                                frame_stats.frames,
                                render_us / 1000.0,
                                present_us / 1000.0,
                                last_stats.visible,
                                last_stats.behind_camera,
                                last_stats.outside_screen,
                            );
                            frame_stats.reset();
                            fps_timer = Instant::now();
                        }
                    }
                    _ => {}
                },
                Event::AboutToWait => {
                    window.request_redraw();
                }
                Event::LoopExiting => {
                    #[cfg(feature = "profiling")]
                    {
                        FUNCTION_COUNTERS.snapshot().print_report();
                        hardware_counters.disable_all();
                        hardware_counters.read_all().print_report();
                    }
                }
                _ => {}
            }
        })
        .context("event loop terminated with an error")?;

    Ok(())
}

/// Copy the finished RGB frame onto the window surface
fn present(
    surface: &mut softbuffer::Surface<Arc<Window>, Arc<Window>>,
    framebuffer: &Framebuffer,
) -> Result<()> {
    let width = NonZeroU32::new(framebuffer.width() as u32).context("zero-width framebuffer")?;
    let height = NonZeroU32::new(framebuffer.height() as u32).context("zero-height framebuffer")?;
    surface
        .resize(width, height)
        .map_err(|e| anyhow::anyhow!("surface resize failed: {e}"))?;

    let mut buffer = surface
        .buffer_mut()
        .map_err(|e| anyhow::anyhow!("surface buffer unavailable: {e}"))?;
    framebuffer.write_xrgb(&mut buffer);
    buffer
        .present()
        .map_err(|e| anyhow::anyhow!("surface present failed: {e}"))?;
    Ok(())
}
