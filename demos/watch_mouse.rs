use shared_mouse::{init_logging, install, FallbackProvider, Listener, MouseEvent, Observable};

fn main() {
    init_logging();

    let handle = install(FallbackProvider(shared_mouse::default_provider()))
        .expect("failed to install mouse handle");

    if !handle.is_supported() {
        println!("Pointer input is not available on this host.");
        return;
    }

    for name in ["down", "up", "click", "dblclick"] {
        handle.on(
            name,
            Listener::from_fn(move |e: &MouseEvent| {
                println!(
                    "{:<8} button={} buttons={:#04x} at ({}, {})",
                    name,
                    e.button.code(),
                    e.buttons.0,
                    e.screen_x,
                    e.screen_y
                );
            }),
        );
    }

    handle.once(
        "move",
        Listener::from_fn(|e: &MouseEvent| {
            println!("first move: {}", serde_json::to_string(e).unwrap_or_default());
        }),
    );

    println!("Watching the mouse for 30 seconds...");
    std::thread::sleep(std::time::Duration::from_secs(30));
}
