//! Demonstration of shared loading indicators

use statecast::{LoadingBehaviorService, LoadingService, Observable};

struct Overlay {
    name: &'static str,
}

impl Overlay {
    fn render(&self, open: bool) {
        let state = if open { "open" } else { "closed" };
        println!("   [{}] overlay {}", self.name, state);
    }
}

fn main() {
    println!("=== Loading Example ===\n");

    println!("1. LoadingService: the overlay only reacts to toggles after it subscribes");
    let loading = LoadingService::new();
    loading.show_loading();
    let overlay = Overlay { name: "plain" };
    let sub = loading.status().subscribe(move |open: &bool| overlay.render(*open));
    loading.show_loading();
    loading.hide_loading();
    sub.unsubscribe();

    println!("\n2. LoadingBehaviorService: the overlay opens immediately");
    let loading = LoadingBehaviorService::new();
    let component = loading.clone();
    let overlay = Overlay { name: "behavior" };
    let _guard = loading
        .status()
        .subscribe(move |open: &bool| overlay.render(*open))
        .into_guard();
    component.hide_loading();
    println!("   still loading: {}", loading.is_loading());

    println!("\n✓ Example complete!");
}
