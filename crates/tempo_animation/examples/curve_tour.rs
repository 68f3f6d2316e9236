//! Curve Tour
//!
//! Headless walk through the animation engine:
//! - A color and a position tween looping forever with auto-reverse
//! - One curve family compared side by side (In, Out, InOut)
//! - Stopping and restarting the looping animations
//!
//! Run with: cargo run -p tempo_animation --example curve_tour -- bounce

use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use tempo_animation::{
    AnimationScheduler, Color, Easing, Position, Repeat, SchedulerConfig, Timeline,
};

fn main() -> tempo_animation::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let family = std::env::args().nth(1).unwrap_or_else(|| "ease".to_string());
    let [ease_in, ease_out, ease_in_out] = Easing::family(&family)
        .ok_or_else(|| tempo_animation::AnimationError::UnknownEasing(family.clone()))?;

    let mut scheduler = AnimationScheduler::with_config(SchedulerConfig { target_fps: 60 });
    scheduler.start_background();

    let fill = Arc::new(Mutex::new(Color::default()));
    let sink = fill.clone();
    let color = Timeline::tween(
        scheduler.handle(),
        Color::rgb(0.0, 0.47, 0.84),
        Color::rgb(0.26, 0.63, 0.28),
        Duration::from_secs(3),
        move |c| *sink.lock().unwrap() = c,
    )
    .with_repeat(Repeat::Forever)
    .with_auto_reverse(true);

    let icon = Arc::new(Mutex::new(Position::default()));
    let sink = icon.clone();
    let mover = Timeline::tween(
        scheduler.handle(),
        Position::new(0.0, 0.0),
        Position::new(350.0, 80.0),
        Duration::from_secs(3),
        move |p| *sink.lock().unwrap() = p,
    )
    .with_curve(ease_out)
    .with_repeat(Repeat::Forever)
    .with_auto_reverse(true);

    color.start();
    mover.start();

    let boxes: Vec<(Easing, Arc<Mutex<f32>>, Timeline)> = [ease_in_out, ease_in, ease_out]
        .into_iter()
        .map(|curve| {
            let x = Arc::new(Mutex::new(0.0f32));
            let sink = x.clone();
            let timeline = Timeline::tween(
                scheduler.handle(),
                0.0f32,
                380.0,
                Duration::from_millis(1500),
                move |v| *sink.lock().unwrap() = v,
            )
            .with_curve(curve);
            (curve, x, timeline)
        })
        .collect();

    for (_, _, timeline) in &boxes {
        timeline.start();
    }

    for frame in 0..20 {
        thread::sleep(Duration::from_millis(100));
        let row: Vec<String> = boxes
            .iter()
            .map(|(curve, x, _)| format!("{curve}={:6.1}", *x.lock().unwrap()))
            .collect();
        let p = *icon.lock().unwrap();
        let c = *fill.lock().unwrap();
        tracing::info!(
            frame,
            "{} | icon=({:5.1}, {:5.1}) fill=({:.2}, {:.2}, {:.2})",
            row.join(" "),
            p.x,
            p.y,
            c.r,
            c.g,
            c.b
        );
    }

    color.stop();
    mover.stop();
    tracing::info!(active = scheduler.has_active_animations(), "looping animations stopped");

    color.start();
    mover.start();
    thread::sleep(Duration::from_millis(300));
    tracing::info!(active = scheduler.has_active_animations(), "looping animations restarted");

    scheduler.stop_background();
    Ok(())
}
