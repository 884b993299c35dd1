//! Demonstration of the subject family

use statecast::operators::{share, share_replay};
use statecast::{
    AsyncSubject, BehaviorSubject, Observable, Observer, ReplaySubject, Sink, StreamError, Subject,
};

fn printer(label: &'static str) -> Observer<String> {
    Observer::new(move |v: &String| println!("   [{}] next {}", label, v))
        .on_complete(move || println!("   [{}] complete", label))
        .on_error(move |e: &StreamError| println!("   [{}] error {}", label, e))
}

fn main() {
    println!("=== Subjects Example ===\n");

    println!("1. Subject: late subscribers miss earlier values");
    let subject = Subject::new();
    let one = subject.subscribe_observer(printer("one"));
    subject.next("Hello".to_string());
    let two = subject.subscribe_observer(printer("two"));
    subject.next("World".to_string());
    one.unsubscribe();
    two.unsubscribe();

    println!("\n2. BehaviorSubject: subscribers get the current value");
    let behavior = BehaviorSubject::new("Hello".to_string());
    let _a = behavior.subscribe_observer(printer("a"));
    behavior.next("World".to_string());
    let _b = behavior.subscribe_observer(printer("b"));

    println!("\n3. ReplaySubject: late subscribers get the last two values");
    let replay = ReplaySubject::new(2);
    for word in ["Hello", "World", "Goodbye"] {
        replay.next(word.to_string());
    }
    let _r = replay.subscribe_observer(printer("replay"));

    println!("\n4. AsyncSubject: only the last value, on completion");
    let last = AsyncSubject::new();
    let _l = last.subscribe_observer(printer("async"));
    last.next("Hello".to_string());
    last.next("Goodbye".to_string());
    last.complete();

    println!("\n5. Errors end a subject just like completion");
    let failing = Subject::new();
    let _f = failing.subscribe_observer(printer("failing"));
    failing.next("Hello".to_string());
    failing.error("connection lost");
    failing.next("ignored".to_string());

    println!("\n6. A subject can observe another source and relay it");
    let ticks = Subject::new();
    let relay = Subject::new();
    let _x = relay.subscribe_observer(printer("relay x"));
    let _y = relay.subscribe_observer(printer("relay y"));
    let _link = ticks.subscribe_observer(relay.clone().into_observer());
    for n in 0..3 {
        ticks.next(format!("tick {}", n));
    }
    ticks.complete();

    println!("\n7. share: one upstream subscription for every subscriber");
    let ticks: Subject<String> = Subject::new();
    let shared = share(ticks.as_feed());
    let one = shared.subscribe_observer(printer("shared one"));
    let two = shared.subscribe_observer(printer("shared two"));
    println!("   upstream observers: {}", ticks.observer_count());
    ticks.next("tick 0".to_string());
    one.unsubscribe();
    two.unsubscribe();
    println!("   upstream observers after both left: {}", ticks.observer_count());

    println!("\n8. share_replay: late subscribers get the latest value");
    let ticks: Subject<String> = Subject::new();
    let replayed = share_replay(ticks.as_feed(), 1);
    let _early = replayed.subscribe_observer(printer("early"));
    ticks.next("tick 0".to_string());
    ticks.next("tick 1".to_string());
    let _late = replayed.subscribe_observer(printer("late"));
    ticks.complete();

    println!("\n✓ Example complete!");
}
